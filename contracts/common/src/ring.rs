//! Ring Buffer Index Math
//!
//! Index arithmetic for a fixed-capacity circular array. The array itself
//! lives elsewhere; these functions only move a cursor around it. Every
//! function is total for `cardinality > 0` (and `newest_index` also for
//! `cardinality == 0`).

/// Reduces `index` into `[0, cardinality)`
pub fn wrap(index: u32, cardinality: u32) -> u32 {
    index % cardinality
}

/// Index `amount` steps behind `index`.
///
/// Both operands are reduced first, so `amount` may exceed `cardinality`
/// without underflowing.
pub fn offset(index: u32, amount: u32, cardinality: u32) -> u32 {
    let index = wrap(index, cardinality) as u64;
    let amount = wrap(amount, cardinality) as u64;
    let cardinality = cardinality as u64;
    ((index + cardinality - amount) % cardinality) as u32
}

/// Slot holding the most recent write, given the next-write cursor.
///
/// Returns 0 when nothing has been written yet.
pub fn newest_index(next_index: u32, cardinality: u32) -> u32 {
    if cardinality == 0 {
        return 0;
    }
    offset(next_index, 1, cardinality)
}

/// Slot after `index`
pub fn next_index(index: u32, cardinality: u32) -> u32 {
    wrap(wrap(index, cardinality) + 1, cardinality)
}
