//! Keyed TWAB Store
//!
//! Owns one history [`Account`] per delegate plus the total-supply account,
//! all sharing a single ring capacity. Holder accounts are created on their
//! first successful increase; a failed record never creates or touches an
//! account.

use std::collections::BTreeMap;
use std::vec::Vec;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::trace;

use yieldpool_common::{
    errors::{AmountErrorReason, YieldPoolError, YieldPoolResult},
    events::{EventLog, YieldPoolEvent},
    twab::{self, TwabUpdate},
    types::{validate_capacity, Account, AccountDetails, Address, Checkpoint, Timestamp},
};

/// Selects a history account in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TwabKey {
    /// History recorded for a delegate address
    Holder(Address),
    /// History of the total delegated supply
    TotalSupply,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TwabStore {
    capacity: u32,
    holders: BTreeMap<Address, Account>,
    total_supply: Account,
}

impl TwabStore {
    pub fn new(capacity: u32) -> YieldPoolResult<Self> {
        validate_capacity(capacity)?;
        Ok(Self {
            capacity,
            holders: BTreeMap::new(),
            total_supply: Account::new(capacity)?,
        })
    }

    /// Ring capacity of every account in the store
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn account(&self, key: &TwabKey) -> Option<&Account> {
        match key {
            TwabKey::Holder(holder) => self.holders.get(holder),
            TwabKey::TotalSupply => Some(&self.total_supply),
        }
    }

    /// Live history balance (0 for an unknown holder)
    pub fn balance(&self, key: &TwabKey) -> u64 {
        self.account_details(key).balance
    }

    pub fn account_details(&self, key: &TwabKey) -> AccountDetails {
        self.account(key).map(|a| a.details).unwrap_or_default()
    }

    pub fn checkpoint(&self, key: &TwabKey, index: u32) -> Option<Checkpoint> {
        self.account(key).and_then(|a| a.checkpoint(index))
    }

    // ============ Mutation ============

    pub fn record_increase(
        &mut self,
        key: TwabKey,
        amount: u64,
        now: Timestamp,
        events: &mut EventLog,
    ) -> YieldPoolResult<TwabUpdate> {
        let update = match key {
            TwabKey::TotalSupply => twab::increase_balance(&mut self.total_supply, amount, now)?,
            TwabKey::Holder(holder) => match self.holders.get_mut(&holder) {
                Some(account) => twab::increase_balance(account, amount, now)?,
                None => {
                    let mut account = Account::new(self.capacity)?;
                    let update = twab::increase_balance(&mut account, amount, now)?;
                    self.holders.insert(holder, account);
                    update
                }
            },
        };
        emit_checkpoint(key, &update, events);
        Ok(update)
    }

    pub fn record_decrease(
        &mut self,
        key: TwabKey,
        amount: u64,
        context: &'static str,
        now: Timestamp,
        events: &mut EventLog,
    ) -> YieldPoolResult<TwabUpdate> {
        let account = match key {
            TwabKey::TotalSupply => Some(&mut self.total_supply),
            TwabKey::Holder(holder) => self.holders.get_mut(&holder),
        };
        let update = match account {
            Some(account) => twab::decrease_balance(account, amount, context, now)?,
            None if amount == 0 => {
                return Err(YieldPoolError::InvalidAmount {
                    amount,
                    reason: AmountErrorReason::Zero,
                })
            }
            None => {
                return Err(YieldPoolError::InsufficientBalance {
                    available: 0,
                    requested: amount,
                    context,
                })
            }
        };
        emit_checkpoint(key, &update, events);
        Ok(update)
    }

    // ============ Queries ============

    fn with_history<T>(&self, key: &TwabKey, query: impl FnOnce(&[Checkpoint], &AccountDetails) -> T) -> T {
        match self.account(key) {
            Some(account) => query(&account.checkpoints, &account.details),
            None => query(&[], &AccountDetails::default()),
        }
    }

    pub fn query_balance_at(&self, key: &TwabKey, target: Timestamp, now: Timestamp) -> u64 {
        self.with_history(key, |checkpoints, details| {
            twab::balance_at(checkpoints, details, target, now)
        })
    }

    pub fn query_average_balance_between(
        &self,
        key: &TwabKey,
        start: Timestamp,
        end: Timestamp,
        now: Timestamp,
    ) -> u64 {
        self.with_history(key, |checkpoints, details| {
            twab::average_balance_between(checkpoints, details, start, end, now)
        })
    }

    pub fn query_balances_at(&self, key: &TwabKey, targets: &[Timestamp], now: Timestamp) -> Vec<u64> {
        self.with_history(key, |checkpoints, details| {
            twab::balances_at(checkpoints, details, targets, now)
        })
    }

    pub fn query_average_balances_between(
        &self,
        key: &TwabKey,
        starts: &[Timestamp],
        ends: &[Timestamp],
        now: Timestamp,
    ) -> YieldPoolResult<Vec<u64>> {
        self.with_history(key, |checkpoints, details| {
            twab::average_balances_between(checkpoints, details, starts, ends, now)
        })
    }
}

/// Emits the checkpoint event for a newly appended checkpoint
fn emit_checkpoint(key: TwabKey, update: &TwabUpdate, events: &mut EventLog) {
    if !update.is_new {
        return;
    }
    trace!(
        ?key,
        timestamp = update.checkpoint.timestamp,
        cardinality = update.details.cardinality,
        "new twab checkpoint"
    );
    let checkpoint = update.checkpoint;
    events.emit(match key {
        TwabKey::Holder(holder) => YieldPoolEvent::NewUserCheckpoint { holder, checkpoint },
        TwabKey::TotalSupply => YieldPoolEvent::NewTotalSupplyCheckpoint { checkpoint },
    });
}
