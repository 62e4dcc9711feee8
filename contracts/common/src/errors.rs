//! Error Types for YieldPool Protocol
//!
//! Typed errors with stable codes, shared by the TWAB core, the share
//! ledger and the prize pool. A failed operation never leaves partial
//! state behind: every variant is raised before the first write.

use thiserror::Error;

/// Result type alias for YieldPool operations
pub type YieldPoolResult<T> = Result<T, YieldPoolError>;

/// Main error enum for all YieldPool protocol errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YieldPoolError {
    // ============ Amount Errors ============
    /// Invalid amount provided (zero where a positive amount is required)
    #[error("invalid amount {amount}: {reason:?}")]
    InvalidAmount { amount: u64, reason: AmountErrorReason },

    /// Decrease exceeds the current balance
    #[error("insufficient balance: {context} (available {available}, requested {requested})")]
    InsufficientBalance {
        available: u64,
        requested: u64,
        /// Caller-supplied label for the failing scenario
        context: &'static str,
    },

    // ============ Query Errors ============
    /// Paired interval query given start/end arrays of different lengths
    #[error("mismatched query lengths: {starts} start times, {ends} end times")]
    MismatchedQueryLengths { starts: usize, ends: usize },

    // ============ Authorization Errors ============
    /// Caller is not authorized for this operation
    #[error("unauthorized caller {actual:?}, expected {expected:?}")]
    Unauthorized { expected: [u8; 32], actual: [u8; 32] },

    /// Invalid address (e.g., zero address)
    #[error("invalid address: {reason}")]
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    // ============ Prize Pool Errors ============
    /// Deposit would push the recipient above the per-holder cap
    #[error("balance cap exceeded: {balance} > {cap}")]
    ExceedsBalanceCap { balance: u64, cap: u64 },

    /// Deposit would push total share supply above the liquidity cap
    #[error("liquidity cap exceeded: {supply} > {cap}")]
    ExceedsLiquidityCap { supply: u64, cap: u64 },

    /// Award exceeds the captured award balance
    #[error("insufficient award balance (available {available}, requested {requested})")]
    InsufficientAwardBalance { available: u64, requested: u64 },

    /// Yield source cannot cover a redemption
    #[error("yield source shortfall (requested {requested}, available {available})")]
    YieldSourceShortfall { requested: u64, available: u64 },

    /// Prize split configuration rejected
    #[error("invalid prize split: {reason}")]
    InvalidPrizeSplit { reason: &'static str },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    #[error("arithmetic overflow")]
    Overflow,

    // ============ Input Validation Errors ============
    /// Invalid input parameter
    #[error("invalid {param}: {reason}")]
    InvalidInput { param: &'static str, reason: &'static str },
}

/// Reasons for amount-related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountErrorReason {
    /// Amount is zero when non-zero required
    Zero,
}

impl YieldPoolError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "E010_INVALID_AMOUNT",
            Self::InsufficientBalance { .. } => "E011_INSUFFICIENT_BALANCE",
            Self::MismatchedQueryLengths { .. } => "E020_MISMATCHED_QUERY_LENGTHS",
            Self::Unauthorized { .. } => "E030_UNAUTHORIZED",
            Self::InvalidAddress { .. } => "E031_INVALID_ADDRESS",
            Self::ExceedsBalanceCap { .. } => "E040_BALANCE_CAP",
            Self::ExceedsLiquidityCap { .. } => "E041_LIQUIDITY_CAP",
            Self::InsufficientAwardBalance { .. } => "E042_AWARD_INSUFFICIENT",
            Self::YieldSourceShortfall { .. } => "E043_YIELD_SHORTFALL",
            Self::InvalidPrizeSplit { .. } => "E044_INVALID_SPLIT",
            Self::Overflow => "E080_OVERFLOW",
            Self::InvalidInput { .. } => "E090_INVALID_INPUT",
        }
    }

    /// Returns true if this error is recoverable (user can fix it)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientBalance { .. } => true, // Get more shares
            Self::ExceedsBalanceCap { .. } => true,   // Deposit less
            Self::ExceedsLiquidityCap { .. } => true, // Wait for withdrawals
            _ => false,
        }
    }
}
