//! The fixed, ordered tier table.
//!
//! Five tiers, Bronze at the bottom and Champion at the top. The order is a
//! deploy-time constant; adjacency lookups cannot fail, they only run off the
//! ends of the table.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum LeagueTier {
    #[sea_orm(string_value = "bronze")]
    Bronze,
    #[sea_orm(string_value = "silver")]
    Silver,
    #[sea_orm(string_value = "gold")]
    Gold,
    #[sea_orm(string_value = "diamond")]
    Diamond,
    #[sea_orm(string_value = "champion")]
    Champion,
}

impl LeagueTier {
    /// All tiers, bottom to top.
    pub const ALL: [LeagueTier; 5] = [
        LeagueTier::Bronze,
        LeagueTier::Silver,
        LeagueTier::Gold,
        LeagueTier::Diamond,
        LeagueTier::Champion,
    ];

    /// The tier immediately above, or None at the top.
    pub fn next(self) -> Option<LeagueTier> {
        let idx = self.index() + 1;
        Self::ALL.get(idx).copied()
    }

    /// The tier immediately below, or None at the bottom.
    pub fn previous(self) -> Option<LeagueTier> {
        let idx = self.index();
        idx.checked_sub(1).map(|i| Self::ALL[i])
    }

    /// 0-based ordinal in the fixed order. Display/tie-breaking only.
    pub fn index(self) -> usize {
        match self {
            LeagueTier::Bronze => 0,
            LeagueTier::Silver => 1,
            LeagueTier::Gold => 2,
            LeagueTier::Diamond => 3,
            LeagueTier::Champion => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LeagueTier::Bronze => "bronze",
            LeagueTier::Silver => "silver",
            LeagueTier::Gold => "gold",
            LeagueTier::Diamond => "diamond",
            LeagueTier::Champion => "champion",
        }
    }
}

impl fmt::Display for LeagueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeagueTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bronze" => Ok(LeagueTier::Bronze),
            "silver" => Ok(LeagueTier::Silver),
            "gold" => Ok(LeagueTier::Gold),
            "diamond" => Ok(LeagueTier::Diamond),
            "champion" => Ok(LeagueTier::Champion),
            other => Err(format!("unknown league tier: {other}")),
        }
    }
}
