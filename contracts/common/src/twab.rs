//! TWAB History Engine
//!
//! Time-weighted average balance history for a single account. Each
//! balance change folds the interval since the newest checkpoint into a
//! wrapping `balance * seconds` accumulator and stores the result in a
//! fixed-capacity checkpoint ring.
//!
//! ## Reads
//!
//! Historical queries binary-search the ring in chronological order:
//! logical position 0 is the oldest retained checkpoint and
//! `cardinality - 1` the newest. The balance held between two adjacent
//! checkpoints is the accumulator difference divided by the seconds between
//! them, so no balance is stored per checkpoint.
//!
//! - At or after the newest checkpoint the live balance applies.
//! - Strictly between two checkpoints the earlier checkpoint's interval
//!   balance applies (balances only change at checkpoints).
//! - Before the oldest retained checkpoint the answer is clamped: zero when
//!   its accumulator is still zero (nothing was ever held before it),
//!   otherwise the balance held from the oldest retained checkpoint.
//!
//! Query targets later than `now` are clamped to `now`.
//!
//! Nothing here logs or allocates outside the batch queries.

use crate::Vec;
use crate::errors::{AmountErrorReason, YieldPoolError, YieldPoolResult};
use crate::ring;
use crate::time;
use crate::types::{Account, AccountDetails, Checkpoint, Timestamp};

/// Result of a balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwabUpdate {
    /// Metadata after the mutation
    pub details: AccountDetails,
    /// Checkpoint written (new or amended)
    pub checkpoint: Checkpoint,
    /// False when the newest checkpoint was amended in place
    pub is_new: bool,
}

// ============================================================================
// Mutation
// ============================================================================

/// Adds `amount` to the account balance, checkpointing the prior interval
pub fn increase_balance(
    account: &mut Account,
    amount: u64,
    current_time: Timestamp,
) -> YieldPoolResult<TwabUpdate> {
    if amount == 0 {
        return Err(YieldPoolError::InvalidAmount {
            amount,
            reason: AmountErrorReason::Zero,
        });
    }
    ensure_ring(account)?;

    let balance = account
        .details
        .balance
        .checked_add(amount)
        .ok_or(YieldPoolError::Overflow)?;

    Ok(write_checkpoint(account, balance, current_time))
}

/// Subtracts `amount` from the account balance, checkpointing the prior interval.
///
/// `context` labels the calling scenario in `InsufficientBalance`.
pub fn decrease_balance(
    account: &mut Account,
    amount: u64,
    context: &'static str,
    current_time: Timestamp,
) -> YieldPoolResult<TwabUpdate> {
    if amount == 0 {
        return Err(YieldPoolError::InvalidAmount {
            amount,
            reason: AmountErrorReason::Zero,
        });
    }
    ensure_ring(account)?;

    let available = account.details.balance;
    if amount > available {
        return Err(YieldPoolError::InsufficientBalance {
            available,
            requested: amount,
            context,
        });
    }

    Ok(write_checkpoint(account, available - amount, current_time))
}

fn ensure_ring(account: &Account) -> YieldPoolResult<()> {
    if account.checkpoints.is_empty() {
        return Err(YieldPoolError::InvalidInput {
            param: "checkpoints",
            reason: "empty checkpoint ring",
        });
    }
    let capacity = account.capacity();
    let details = &account.details;
    let cursor_outside = details.cardinality > capacity || details.next_checkpoint_index >= capacity;
    // Until the ring fills, the write cursor sits right after the newest slot
    let cursor_detached =
        details.cardinality < capacity && details.next_checkpoint_index != details.cardinality;
    if cursor_outside || cursor_detached {
        return Err(YieldPoolError::InvalidInput {
            param: "account_details",
            reason: "ring cursor inconsistent with checkpoint ring",
        });
    }
    Ok(())
}

/// Checkpoints the interval ending at `current_time` and installs `new_balance`.
///
/// At most one checkpoint exists per timestamp: a second write in the same
/// second amends the newest slot instead of advancing the ring.
fn write_checkpoint(account: &mut Account, new_balance: u64, current_time: Timestamp) -> TwabUpdate {
    let capacity = account.capacity();
    let details = account.details;

    let (slot, checkpoint, is_new) = if details.cardinality == 0 {
        let first = Checkpoint {
            timestamp: current_time,
            cumulative_balance: 0,
        };
        (details.next_checkpoint_index, first, true)
    } else {
        let (newest_slot, newest) = newest_checkpoint(&account.checkpoints, &details);
        let checkpoint = extrapolate(newest, details.balance, current_time);
        if newest.timestamp == current_time {
            (newest_slot, checkpoint, false)
        } else {
            (details.next_checkpoint_index, checkpoint, true)
        }
    };

    account.checkpoints[slot as usize] = checkpoint;

    let mut updated = AccountDetails {
        balance: new_balance,
        ..details
    };
    if is_new {
        updated.next_checkpoint_index = ring::next_index(details.next_checkpoint_index, capacity);
        updated.cardinality = (details.cardinality + 1).min(capacity);
    }
    account.details = updated;

    TwabUpdate {
        details: updated,
        checkpoint,
        is_new,
    }
}

/// Carries `checkpoint` forward to `timestamp` at a constant `balance`
fn extrapolate(checkpoint: Checkpoint, balance: u64, timestamp: Timestamp) -> Checkpoint {
    let seconds = time::elapsed(timestamp, checkpoint.timestamp);
    Checkpoint {
        timestamp,
        cumulative_balance: checkpoint
            .cumulative_balance
            .wrapping_add(balance as u128 * seconds as u128),
    }
}

// ============================================================================
// Ring Access
// ============================================================================

fn read(checkpoints: &[Checkpoint], slot: u32) -> Checkpoint {
    checkpoints.get(slot as usize).copied().unwrap_or_default()
}

/// Ring slot of chronological `position` (0 = oldest retained)
fn slot_at(details: &AccountDetails, position: u32) -> u32 {
    ring::offset(
        details.next_checkpoint_index,
        details.cardinality - position,
        details.cardinality,
    )
}

fn at_position(checkpoints: &[Checkpoint], details: &AccountDetails, position: u32) -> Checkpoint {
    read(checkpoints, slot_at(details, position))
}

/// Most recent checkpoint and its slot
pub fn newest_checkpoint(checkpoints: &[Checkpoint], details: &AccountDetails) -> (u32, Checkpoint) {
    let slot = ring::newest_index(details.next_checkpoint_index, details.cardinality);
    (slot, read(checkpoints, slot))
}

/// Oldest retained checkpoint and its slot
pub fn oldest_checkpoint(checkpoints: &[Checkpoint], details: &AccountDetails) -> (u32, Checkpoint) {
    if details.cardinality == 0 {
        return (0, Checkpoint::default());
    }
    let slot = slot_at(details, 0);
    (slot, read(checkpoints, slot))
}

// ============================================================================
// Historical Queries
// ============================================================================

/// Balance held between two adjacent checkpoints
fn held_balance(before: Checkpoint, after: Checkpoint) -> u64 {
    let seconds = time::elapsed(after.timestamp, before.timestamp);
    if seconds == 0 {
        return 0;
    }
    (after.cumulative_balance.wrapping_sub(before.cumulative_balance) / seconds as u128) as u64
}

/// Balance assumed for any time before the oldest retained checkpoint
fn balance_before_oldest(checkpoints: &[Checkpoint], details: &AccountDetails) -> u64 {
    let oldest = at_position(checkpoints, details, 0);
    if oldest.cumulative_balance == 0 {
        return 0;
    }
    if details.cardinality == 1 {
        return details.balance;
    }
    held_balance(oldest, at_position(checkpoints, details, 1))
}

/// Adjacent checkpoints bracketing `target`.
///
/// Requires `cardinality >= 2` and `oldest <= target < newest`.
fn binary_search(
    checkpoints: &[Checkpoint],
    details: &AccountDetails,
    target: Timestamp,
    now: Timestamp,
) -> (Checkpoint, Checkpoint) {
    // Invariant: position `low` is at or before `target`, `high` is after it
    let mut low = 0;
    let mut high = details.cardinality - 1;

    while high - low > 1 {
        let mid = low + (high - low) / 2;
        let candidate = at_position(checkpoints, details, mid);
        if time::lte(candidate.timestamp, target, now) {
            low = mid;
        } else {
            high = mid;
        }
    }

    (
        at_position(checkpoints, details, low),
        at_position(checkpoints, details, high),
    )
}

/// Balance of the account at `target`
pub fn balance_at(
    checkpoints: &[Checkpoint],
    details: &AccountDetails,
    target: Timestamp,
    now: Timestamp,
) -> u64 {
    if details.cardinality == 0 {
        return 0;
    }
    let target = target.min(now);

    let (_, newest) = newest_checkpoint(checkpoints, details);
    if time::lte(newest.timestamp, target, now) {
        return details.balance;
    }

    let oldest = at_position(checkpoints, details, 0);
    if time::lt(target, oldest.timestamp, now) {
        return balance_before_oldest(checkpoints, details);
    }

    let (before, after) = binary_search(checkpoints, details, target, now);
    held_balance(before, after)
}

/// Accumulator value the account would have had at `target`
fn cumulative_at(
    checkpoints: &[Checkpoint],
    details: &AccountDetails,
    target: Timestamp,
    now: Timestamp,
) -> u128 {
    let (_, newest) = newest_checkpoint(checkpoints, details);
    if time::lte(newest.timestamp, target, now) {
        return extrapolate(newest, details.balance, target).cumulative_balance;
    }

    let oldest = at_position(checkpoints, details, 0);
    if time::lt(target, oldest.timestamp, now) {
        let balance = balance_before_oldest(checkpoints, details) as u128;
        let seconds = time::elapsed(oldest.timestamp, target) as u128;
        return oldest.cumulative_balance.wrapping_sub(balance * seconds);
    }

    let (before, after) = binary_search(checkpoints, details, target, now);
    extrapolate(before, held_balance(before, after), target).cumulative_balance
}

/// Time-weighted average balance over `[start, end]`.
///
/// Returns 0 when `start > end`, and the point balance when they are equal.
pub fn average_balance_between(
    checkpoints: &[Checkpoint],
    details: &AccountDetails,
    start: Timestamp,
    end: Timestamp,
    now: Timestamp,
) -> u64 {
    if start > end {
        return 0;
    }
    let start = start.min(now);
    let end = end.min(now);
    if start == end {
        return balance_at(checkpoints, details, start, now);
    }
    if details.cardinality == 0 {
        return 0;
    }

    let start_cumulative = cumulative_at(checkpoints, details, start, now);
    let end_cumulative = cumulative_at(checkpoints, details, end, now);
    let seconds = time::elapsed(end, start) as u128;

    (end_cumulative.wrapping_sub(start_cumulative) / seconds) as u64
}

/// `balance_at` for each target, in input order
pub fn balances_at(
    checkpoints: &[Checkpoint],
    details: &AccountDetails,
    targets: &[Timestamp],
    now: Timestamp,
) -> Vec<u64> {
    targets
        .iter()
        .map(|&target| balance_at(checkpoints, details, target, now))
        .collect()
}

/// `average_balance_between` for each `(starts[i], ends[i])` pair
pub fn average_balances_between(
    checkpoints: &[Checkpoint],
    details: &AccountDetails,
    starts: &[Timestamp],
    ends: &[Timestamp],
    now: Timestamp,
) -> YieldPoolResult<Vec<u64>> {
    if starts.len() != ends.len() {
        return Err(YieldPoolError::MismatchedQueryLengths {
            starts: starts.len(),
            ends: ends.len(),
        });
    }

    Ok(starts
        .iter()
        .zip(ends)
        .map(|(&start, &end)| average_balance_between(checkpoints, details, start, end, now))
        .collect())
}

// ============================================================================
// Account Convenience
// ============================================================================

impl Account {
    /// See [`increase_balance`]
    pub fn increase(&mut self, amount: u64, current_time: Timestamp) -> YieldPoolResult<TwabUpdate> {
        increase_balance(self, amount, current_time)
    }

    /// See [`decrease_balance`]
    pub fn decrease(
        &mut self,
        amount: u64,
        context: &'static str,
        current_time: Timestamp,
    ) -> YieldPoolResult<TwabUpdate> {
        decrease_balance(self, amount, context, current_time)
    }

    /// See [`balance_at`]
    pub fn balance_at(&self, target: Timestamp, now: Timestamp) -> u64 {
        balance_at(&self.checkpoints, &self.details, target, now)
    }

    /// See [`average_balance_between`]
    pub fn average_balance_between(&self, start: Timestamp, end: Timestamp, now: Timestamp) -> u64 {
        average_balance_between(&self.checkpoints, &self.details, start, end, now)
    }

    /// Newest checkpoint, if any was written
    pub fn newest_checkpoint(&self) -> Option<Checkpoint> {
        (self.details.cardinality > 0).then(|| newest_checkpoint(&self.checkpoints, &self.details).1)
    }

    /// Oldest retained checkpoint, if any was written
    pub fn oldest_checkpoint(&self) -> Option<Checkpoint> {
        (self.details.cardinality > 0).then(|| oldest_checkpoint(&self.checkpoints, &self.details).1)
    }

    /// Raw ring slot, if it has been written
    pub fn checkpoint(&self, index: u32) -> Option<Checkpoint> {
        if index >= self.details.cardinality {
            return None;
        }
        self.checkpoints.get(index as usize).copied()
    }
}
