//! League tuning knobs, read once at startup.

use tracing::warn;

/// Cohort size and promotion/demotion cutoffs for the weekly cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueConfig {
    /// Soft cap on members per group at assignment time.
    pub group_capacity: u32,
    /// Ranks 1..=promotion_slots move up (where a next tier exists).
    pub promotion_slots: u32,
    /// Ranks above group_size - demotion_slots move down (where a previous tier exists).
    pub demotion_slots: u32,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            group_capacity: 30,
            promotion_slots: 10,
            demotion_slots: 5,
        }
    }
}

impl LeagueConfig {
    /// Build from `LEAGUE_GROUP_CAPACITY`, `LEAGUE_PROMOTION_SLOTS` and
    /// `LEAGUE_DEMOTION_SLOTS`, falling back to defaults on missing or
    /// unparseable values (logged, not fatal).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            group_capacity: read_var("LEAGUE_GROUP_CAPACITY", defaults.group_capacity),
            promotion_slots: read_var("LEAGUE_PROMOTION_SLOTS", defaults.promotion_slots),
            demotion_slots: read_var("LEAGUE_DEMOTION_SLOTS", defaults.demotion_slots),
        }
    }
}

fn read_var(name: &str, default: u32) -> u32 {
    match std::env::var(name) {
        Ok(raw) => match raw.parse::<u32>() {
            Ok(v) if v > 0 => v,
            _ => {
                warn!(var = name, value = %raw, "invalid league config value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_product_constants() {
        let cfg = LeagueConfig::default();
        assert_eq!(cfg.group_capacity, 30);
        assert_eq!(cfg.promotion_slots, 10);
        assert_eq!(cfg.demotion_slots, 5);
    }
}
