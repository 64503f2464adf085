pub mod league;
pub mod promotion;
