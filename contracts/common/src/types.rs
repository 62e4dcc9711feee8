//! Core Types for YieldPool Protocol
//!
//! This module defines the data structures shared across the YieldPool
//! crates: the TWAB checkpoint model and the per-crate action enums.

use crate::{vec, Vec};
use crate::constants::twab;
use crate::errors::{YieldPoolError, YieldPoolResult};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for addresses (32-byte hash)
pub type Address = [u8; 32];

/// Seconds since the unix epoch, wrapping at 2^32
pub type Timestamp = u32;

// ============ TWAB Types ============

/// Snapshot of an account's cumulative time-weighted balance.
///
/// `cumulative_balance` is the running sum of `balance * elapsed_seconds`,
/// modulo 2^128. It is only meaningful as a difference between two
/// checkpoints of the same account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Checkpoint {
    /// Time the checkpoint was written
    pub timestamp: Timestamp,
    /// Wrapping accumulator of balance * seconds
    pub cumulative_balance: u128,
}

/// Per-account ring metadata
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct AccountDetails {
    /// Live balance, not yet folded into any checkpoint
    pub balance: u64,
    /// Slot that receives the next new checkpoint
    pub next_checkpoint_index: u32,
    /// Checkpoints written so far, capped at the ring capacity
    pub cardinality: u32,
}

/// History of one holder (or of the total supply).
///
/// The checkpoint ring is allocated once at its full capacity and never
/// resized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Account {
    /// Balance and ring cursor
    pub details: AccountDetails,
    /// Fixed-capacity checkpoint ring
    pub checkpoints: Vec<Checkpoint>,
}

impl Account {
    /// Creates an all-zero account with `capacity` checkpoint slots
    pub fn new(capacity: u32) -> YieldPoolResult<Self> {
        validate_capacity(capacity)?;
        Ok(Self {
            details: AccountDetails::default(),
            checkpoints: vec![Checkpoint::default(); capacity as usize],
        })
    }

    /// Number of checkpoint slots
    pub fn capacity(&self) -> u32 {
        self.checkpoints.len() as u32
    }

    /// Live balance
    pub fn balance(&self) -> u64 {
        self.details.balance
    }

    /// True once the ring has wrapped at least once
    pub fn is_full(&self) -> bool {
        self.details.cardinality == self.capacity()
    }
}

/// Checks a ring capacity against the protocol bounds
pub fn validate_capacity(capacity: u32) -> YieldPoolResult<()> {
    if capacity < twab::MIN_CAPACITY {
        return Err(YieldPoolError::InvalidInput {
            param: "twab_capacity",
            reason: "below minimum ring capacity",
        });
    }
    if capacity > twab::MAX_CAPACITY {
        return Err(YieldPoolError::InvalidInput {
            param: "twab_capacity",
            reason: "above maximum ring capacity",
        });
    }
    Ok(())
}

// ============ Action Types ============

/// Actions for the share ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum ShareAction {
    /// Transfer shares between holders
    Transfer { from: Address, to: Address, amount: u64 },
    /// Mint new shares (controller only)
    Mint { to: Address, amount: u64 },
    /// Burn shares (controller only)
    Burn { from: Address, amount: u64 },
    /// Route a holder's history to another account (zero address opts out)
    Delegate { delegator: Address, delegate: Address },
}

/// Actions for the prize pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PrizePoolAction {
    /// Deposit the underlying asset and mint shares to `to`
    Deposit { operator: Address, to: Address, amount: u64 },
    /// Burn shares and redeem the underlying asset
    Withdraw { from: Address, amount: u64 },
    /// Move accrued yield into the award balance
    CaptureAward,
    /// Award captured yield as shares
    Award { to: Address, amount: u64 },
    /// Pay out the configured prize splits
    DistributePrizeSplits,
}
