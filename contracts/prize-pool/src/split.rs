//! Prize Splits
//!
//! Fixed shares of each captured prize routed to configured targets before
//! the remainder is distributed to winners.

use std::vec::Vec;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use yieldpool_common::{
    constants::{splits, ZERO_ADDRESS},
    errors::{YieldPoolError, YieldPoolResult},
    types::Address,
};

/// One prize split target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PrizeSplitConfig {
    /// Recipient of the split
    pub target: Address,
    /// Share of the prize in basis points
    pub percentage_bps: u16,
}

/// Sum of all split percentages in basis points
pub fn total_percentage_bps(configs: &[PrizeSplitConfig]) -> u64 {
    configs.iter().map(|c| c.percentage_bps as u64).sum()
}

pub fn validate_prize_splits(configs: &[PrizeSplitConfig]) -> YieldPoolResult<()> {
    if configs.len() > splits::MAX_PRIZE_SPLITS {
        return Err(YieldPoolError::InvalidPrizeSplit {
            reason: "too many prize splits",
        });
    }
    if configs.iter().any(|c| c.target == ZERO_ADDRESS) {
        return Err(YieldPoolError::InvalidPrizeSplit {
            reason: "split target cannot be the zero address",
        });
    }
    if total_percentage_bps(configs) > splits::BPS_DENOMINATOR {
        return Err(YieldPoolError::InvalidPrizeSplit {
            reason: "split percentages exceed 100%",
        });
    }
    Ok(())
}

/// Amount owed to each target out of `prize`, rounded down
pub fn split_amounts(configs: &[PrizeSplitConfig], prize: u64) -> Vec<(Address, u64)> {
    configs
        .iter()
        .map(|c| {
            let amount = prize as u128 * c.percentage_bps as u128 / splits::BPS_DENOMINATOR as u128;
            (c.target, amount as u64)
        })
        .collect()
}
