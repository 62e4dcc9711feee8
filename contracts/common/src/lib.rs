//! YieldPool Common Library
//!
//! Shared types, constants, and the TWAB history engine for all YieldPool
//! crates. This module provides the accounting foundation for the protocol.
//!
//! ## Key Features
//!
//! - **Ring Index Math**: Wrapping cursor arithmetic for fixed-capacity rings
//! - **Overflow-Safe Time**: u32 timestamp ordering that survives the 2^32 wrap
//! - **TWAB Engine**: Checkpointed balance history with wrapping accumulators
//! - **Historical Queries**: Point-in-time and time-weighted average balances
//! - **Events**: Borsh-encoded protocol events for off-chain indexing
//!
//! This crate is `no_std` compatible for WASM compilation when built
//! without the default `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{vec, vec::Vec};
#[cfg(feature = "std")]
pub use std::{vec, vec::Vec};

pub mod constants;
pub mod errors;
pub mod types;
pub mod events;
pub mod ring;
pub mod time;
pub mod twab;

#[cfg(test)]
mod integration_tests;

// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use types::*;
pub use events::*;
pub use twab::TwabUpdate;
