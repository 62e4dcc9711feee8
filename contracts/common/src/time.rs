//! Overflow-Safe Timestamp Comparison
//!
//! Timestamps are u32 seconds and wrap at 2^32. Two timestamps are ordered
//! relative to `now`: a value numerically greater than `now` was written
//! before the last wrap, so it sorts before every value `<= now`.

use crate::types::Timestamp;

/// Shifts a timestamp onto a 64-bit line where `now` is the latest point
fn unwrap(timestamp: Timestamp, now: Timestamp) -> u64 {
    if timestamp > now {
        timestamp as u64
    } else {
        timestamp as u64 + (1u64 << 32)
    }
}

/// `a` is strictly before `b`
pub fn lt(a: Timestamp, b: Timestamp, now: Timestamp) -> bool {
    if a <= now && b <= now {
        return a < b;
    }
    unwrap(a, now) < unwrap(b, now)
}

/// `a` is at or before `b`
pub fn lte(a: Timestamp, b: Timestamp, now: Timestamp) -> bool {
    if a <= now && b <= now {
        return a <= b;
    }
    unwrap(a, now) <= unwrap(b, now)
}

/// Seconds from `earlier` to `later`, for `later` chronologically at or after `earlier`
pub fn elapsed(later: Timestamp, earlier: Timestamp) -> u32 {
    later.wrapping_sub(earlier)
}
