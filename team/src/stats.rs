//! Effort and individual value spreads, and the budget rules that gate edits

use serde::{Deserialize, Serialize};
use thiserror::Error;
use winrate_protocol::Stat;

/// Maximum effort values in a single stat
pub const MAX_STAT_EV: u16 = 252;

/// Maximum effort values across all six stats
pub const MAX_TOTAL_EV: u16 = 510;

/// Maximum individual value in a single stat
pub const MAX_IV: u8 = 31;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatError {
    #[error("{stat} EVs must be between 0 and 252, got {value}")]
    EvOutOfRange { stat: Stat, value: u16 },

    #[error("EV total would be {total}, above the limit of 510")]
    OverBudget { total: u16 },

    #[error("{stat} IVs must be between 0 and 31, got {value}")]
    IvOutOfRange { stat: Stat, value: u8 },
}

/// Effort values per stat. Stats missing from a serialized spread count as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvSpread {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

impl EvSpread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: Stat) -> u16 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
        }
    }

    /// Set a stat without any budget check; use [`propose_ev`] for edits
    pub fn set(&mut self, stat: Stat, value: u16) {
        match stat {
            Stat::Hp => self.hp = value,
            Stat::Atk => self.atk = value,
            Stat::Def => self.def = value,
            Stat::Spa => self.spa = value,
            Stat::Spd => self.spd = value,
            Stat::Spe => self.spe = value,
        }
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, stat: Stat, value: u16) -> Self {
        self.set(stat, value);
        self
    }

    pub fn total(&self) -> u16 {
        Stat::ALL
            .iter()
            .fold(0u16, |acc, s| acc.saturating_add(self.get(*s)))
    }

    /// EVs still available before the total budget is reached
    pub fn remaining(&self) -> u16 {
        MAX_TOTAL_EV.saturating_sub(self.total())
    }
}

/// Individual values per stat. Stats missing from a serialized spread are 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IvSpread {
    pub hp: u8,
    pub atk: u8,
    pub def: u8,
    pub spa: u8,
    pub spd: u8,
    pub spe: u8,
}

impl Default for IvSpread {
    fn default() -> Self {
        Self {
            hp: MAX_IV,
            atk: MAX_IV,
            def: MAX_IV,
            spa: MAX_IV,
            spd: MAX_IV,
            spe: MAX_IV,
        }
    }
}

impl IvSpread {
    pub fn get(&self, stat: Stat) -> u8 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
        }
    }

    pub fn set(&mut self, stat: Stat, value: u8) {
        match stat {
            Stat::Hp => self.hp = value,
            Stat::Atk => self.atk = value,
            Stat::Def => self.def = value,
            Stat::Spa => self.spa = value,
            Stat::Spd => self.spd = value,
            Stat::Spe => self.spe = value,
        }
    }
}

/// Check a single-stat EV edit against the per-stat and total budgets.
///
/// Returns the spread with only `stat` replaced, or the reason the edit was
/// refused. `current` is never modified.
pub fn propose_ev(current: &EvSpread, stat: Stat, value: u16) -> Result<EvSpread, StatError> {
    if value > MAX_STAT_EV {
        return Err(StatError::EvOutOfRange { stat, value });
    }

    // u32 so a corrupt stored spread cannot overflow the sum
    let total: u32 = Stat::ALL
        .iter()
        .map(|s| u32::from(current.get(*s)))
        .sum::<u32>()
        - u32::from(current.get(stat))
        + u32::from(value);

    if total > u32::from(MAX_TOTAL_EV) {
        return Err(StatError::OverBudget {
            total: u16::try_from(total).unwrap_or(u16::MAX),
        });
    }

    Ok(current.with(stat, value))
}

/// Check a single-stat IV edit, returning the updated spread
pub fn propose_iv(current: &IvSpread, stat: Stat, value: u8) -> Result<IvSpread, StatError> {
    if value > MAX_IV {
        return Err(StatError::IvOutOfRange { stat, value });
    }

    let mut next = *current;
    next.set(stat, value);
    Ok(next)
}
