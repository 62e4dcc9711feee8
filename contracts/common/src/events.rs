//! Protocol Events for YieldPool
//!
//! Events are emitted during share and pool operations and can be indexed
//! off-chain to rebuild balances, TWAB histories and prize payouts.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, Checkpoint, Timestamp};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Share Events (0x01 - 0x1F)
    ShareMinted = 0x01,
    ShareBurned = 0x02,
    ShareTransferred = 0x03,
    Delegated = 0x04,

    // TWAB Events (0x20 - 0x3F)
    NewUserCheckpoint = 0x20,
    NewTotalSupplyCheckpoint = 0x21,

    // Prize Pool Events (0x40 - 0x5F)
    Deposited = 0x40,
    Withdrawn = 0x41,
    AwardCaptured = 0x42,
    Awarded = 0x43,
    PrizeSplitAwarded = 0x44,

    // Admin Events (0x60 - 0x7F)
    BalanceCapSet = 0x60,
    LiquidityCapSet = 0x61,
}

/// Main event enum containing all possible protocol events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum YieldPoolEvent {
    // ============ Share Events ============

    /// Emitted when shares are minted
    ShareMinted {
        to: Address,
        amount: u64,
        new_total_supply: u64,
        timestamp: Timestamp,
    },

    /// Emitted when shares are burned
    ShareBurned {
        from: Address,
        amount: u64,
        new_total_supply: u64,
        timestamp: Timestamp,
    },

    /// Emitted on share transfer
    ShareTransferred {
        from: Address,
        to: Address,
        amount: u64,
        timestamp: Timestamp,
    },

    /// Emitted when a holder routes its history to a new delegate
    Delegated {
        delegator: Address,
        delegate: Address,
        timestamp: Timestamp,
    },

    // ============ TWAB Events ============

    /// Emitted when a new checkpoint is appended to a history ring.
    ///
    /// Amending the newest checkpoint in the same second emits nothing.
    NewUserCheckpoint {
        holder: Address,
        checkpoint: Checkpoint,
    },

    /// Emitted when a new total-supply checkpoint is appended
    NewTotalSupplyCheckpoint { checkpoint: Checkpoint },

    // ============ Prize Pool Events ============

    /// Emitted when the underlying asset is deposited
    Deposited {
        operator: Address,
        to: Address,
        token: Address,
        amount: u64,
        timestamp: Timestamp,
    },

    /// Emitted when shares are redeemed for the underlying asset
    Withdrawn {
        from: Address,
        amount: u64,
        redeemed: u64,
        timestamp: Timestamp,
    },

    /// Emitted when accrued yield is moved into the award balance
    AwardCaptured {
        amount: u64,
        award_balance: u64,
        timestamp: Timestamp,
    },

    /// Emitted when captured yield is paid out as shares
    Awarded {
        winner: Address,
        amount: u64,
        timestamp: Timestamp,
    },

    /// Emitted for each configured prize split paid out
    PrizeSplitAwarded {
        target: Address,
        amount: u64,
        timestamp: Timestamp,
    },

    // ============ Admin Events ============

    /// Emitted when the per-holder balance cap changes
    BalanceCapSet { cap: u64, timestamp: Timestamp },

    /// Emitted when the total liquidity cap changes
    LiquidityCapSet { cap: u64, timestamp: Timestamp },
}

impl YieldPoolEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::ShareMinted { .. } => EventType::ShareMinted,
            Self::ShareBurned { .. } => EventType::ShareBurned,
            Self::ShareTransferred { .. } => EventType::ShareTransferred,
            Self::Delegated { .. } => EventType::Delegated,
            Self::NewUserCheckpoint { .. } => EventType::NewUserCheckpoint,
            Self::NewTotalSupplyCheckpoint { .. } => EventType::NewTotalSupplyCheckpoint,
            Self::Deposited { .. } => EventType::Deposited,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::AwardCaptured { .. } => EventType::AwardCaptured,
            Self::Awarded { .. } => EventType::Awarded,
            Self::PrizeSplitAwarded { .. } => EventType::PrizeSplitAwarded,
            Self::BalanceCapSet { .. } => EventType::BalanceCapSet,
            Self::LiquidityCapSet { .. } => EventType::LiquidityCapSet,
        }
    }

    /// Get the time the event occurred
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::ShareMinted { timestamp, .. }
            | Self::ShareBurned { timestamp, .. }
            | Self::ShareTransferred { timestamp, .. }
            | Self::Delegated { timestamp, .. }
            | Self::Deposited { timestamp, .. }
            | Self::Withdrawn { timestamp, .. }
            | Self::AwardCaptured { timestamp, .. }
            | Self::Awarded { timestamp, .. }
            | Self::PrizeSplitAwarded { timestamp, .. }
            | Self::BalanceCapSet { timestamp, .. }
            | Self::LiquidityCapSet { timestamp, .. } => *timestamp,
            Self::NewUserCheckpoint { checkpoint, .. }
            | Self::NewTotalSupplyCheckpoint { checkpoint } => checkpoint.timestamp,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting multiple events during execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<YieldPoolEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: YieldPoolEvent) {
        self.events.push(event);
    }

    /// Move every event out of `other` into this log
    pub fn append(&mut self, other: &mut EventLog) {
        self.events.append(&mut other.events);
    }

    /// Get all events
    pub fn events(&self) -> &[YieldPoolEvent] {
        &self.events
    }

    /// Drain all events, leaving the log empty
    pub fn take(&mut self) -> Vec<YieldPoolEvent> {
        core::mem::take(&mut self.events)
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&YieldPoolEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
