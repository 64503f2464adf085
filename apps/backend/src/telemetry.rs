use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Quiet the query loggers by default; league_backend itself stays at debug so
// promotion runs and group assignment are traceable out of the box.
const DEFAULT_FILTER: &str = "info,league_backend=debug,sqlx=warn,sea_orm=warn,actix_http=warn";

pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
