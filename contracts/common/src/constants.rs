//! Protocol Constants
//!
//! All fixed configuration values for the YieldPool protocol.
//!
//! # Network Configuration
//!
//! Use feature flags to compile for different networks:
//! - `mainnet` - Production values (a full year of daily checkpoints)
//! - Default (no feature) - Testnet values (smaller history rings)
//!
//! ```toml
//! # For mainnet deployment:
//! yieldpool-common = { path = "...", features = ["mainnet"] }
//! ```

/// Share Token Metadata
pub mod token {
    /// Token name
    pub const NAME: &str = "YieldPool Share";
    /// Token symbol
    pub const SYMBOL: &str = "ypSHARE";
    /// Decimal places (matches the deposit asset)
    pub const DECIMALS: u8 = 8;
    /// One unit with decimals (1 share = 100_000_000 base units)
    pub const ONE: u64 = 100_000_000;
}

/// TWAB History Configuration
///
/// The capacity is fixed at deployment and must be identical for every
/// account, including the total-supply account.
pub mod twab {
    /// Default number of checkpoint slots per account
    /// - Mainnet: 365 (one checkpoint per day for a year)
    /// - Testnet: 32
    #[cfg(feature = "mainnet")]
    pub const DEFAULT_CAPACITY: u32 = 365;
    #[cfg(not(feature = "mainnet"))]
    pub const DEFAULT_CAPACITY: u32 = 32;

    /// Smallest usable ring (one retained interval)
    pub const MIN_CAPACITY: u32 = 2;

    /// Largest ring a single account may allocate
    pub const MAX_CAPACITY: u32 = u16::MAX as u32;

    /// Accumulator width in bits. All accumulator arithmetic wraps modulo 2^128.
    pub const ACCUMULATOR_BITS: u32 = u128::BITS;

    /// Context label for a burn that exceeds the holder's balance
    pub const BURN_EXCEEDS_BALANCE: &str = "burn amount exceeds balance";

    /// Context label for a transfer that exceeds the sender's balance
    pub const TRANSFER_EXCEEDS_BALANCE: &str = "transfer amount exceeds balance";

    /// Context label for a delegation move that exceeds the delegate's history balance
    pub const DELEGATION_EXCEEDS_BALANCE: &str = "delegated amount exceeds balance";
}

/// Prize Pool Configuration
pub mod pool {
    /// Per-holder share balance cap when none is configured
    pub const UNLIMITED_BALANCE_CAP: u64 = u64::MAX;

    /// Total share supply cap when none is configured
    pub const UNLIMITED_LIQUIDITY_CAP: u64 = u64::MAX;
}

/// Prize Split Configuration
pub mod splits {
    /// Maximum number of prize split targets
    pub const MAX_PRIZE_SPLITS: usize = 16;

    /// Basis points denominator (10_000 = 100%)
    pub const BPS_DENOMINATOR: u64 = 10_000;
}

/// Zero address sentinel (never a valid holder)
pub const ZERO_ADDRESS: [u8; 32] = [0u8; 32];
