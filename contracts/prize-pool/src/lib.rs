//! YieldPool Prize Pool
//!
//! Deposits flow into a yield source and are represented 1:1 by shares on
//! a TWAB-tracked [`ShareLedger`]. Yield earned above the share supply is
//! captured as the award balance and paid out as newly minted shares.
//!
//! ## Key Features
//!
//! - **Caps**: per-holder balance cap and total liquidity cap on deposits
//! - **Award capture**: `yield balance - share supply`, never double-counted
//! - **Prize splits**: fixed basis-point shares of each prize to set targets

use std::vec::Vec;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod split;

pub use split::{split_amounts, validate_prize_splits, PrizeSplitConfig};

use yieldpool_common::{
    constants::{pool, twab, ZERO_ADDRESS},
    errors::{AmountErrorReason, YieldPoolError, YieldPoolResult},
    events::{EventLog, YieldPoolEvent},
    types::{validate_capacity, Address, PrizePoolAction, Timestamp},
};
use yieldpool_share::{ShareConfig, ShareLedger};

// ============ Yield Source ============

/// Where deposited assets earn yield
pub trait YieldSource {
    /// Asset accepted by the source
    fn deposit_token(&self) -> Address;

    /// Assets held for the pool, including accrued yield
    fn balance_of_token(&self) -> u64;

    /// Supplies `amount` of the deposit token
    fn supply_token_to(&mut self, amount: u64) -> YieldPoolResult<()>;

    /// Redeems `amount` of the deposit token, returning the amount actually released
    fn redeem_token(&mut self, amount: u64) -> YieldPoolResult<u64>;
}

// ============ Prize Pool Config ============

/// Configuration for the Prize Pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PrizePoolConfig {
    /// Pool address; controls the share ledger and authorizes awards
    pub pool_id: Address,
    /// Maximum share balance of a single holder
    pub balance_cap: u64,
    /// Maximum total share supply
    pub liquidity_cap: u64,
    /// Checkpoint slots per history account
    pub twab_capacity: u32,
}

impl PrizePoolConfig {
    /// Uncapped configuration with the default ring capacity
    pub fn new(pool_id: Address) -> Self {
        Self {
            pool_id,
            balance_cap: pool::UNLIMITED_BALANCE_CAP,
            liquidity_cap: pool::UNLIMITED_LIQUIDITY_CAP,
            twab_capacity: twab::DEFAULT_CAPACITY,
        }
    }

    pub fn validate(&self) -> YieldPoolResult<()> {
        if self.pool_id == ZERO_ADDRESS {
            return Err(YieldPoolError::InvalidAddress {
                reason: "pool id cannot be the zero address",
            });
        }
        validate_capacity(self.twab_capacity)
    }
}

// ============ Prize Pool State ============

pub struct PrizePool<Y: YieldSource> {
    config: PrizePoolConfig,
    ledger: ShareLedger,
    yield_source: Y,
    award_balance: u64,
    prize_splits: Vec<PrizeSplitConfig>,
    events: EventLog,
}

impl<Y: YieldSource> PrizePool<Y> {
    pub fn new(config: PrizePoolConfig, yield_source: Y) -> YieldPoolResult<Self> {
        config.validate()?;
        let ledger = ShareLedger::new(ShareConfig {
            controller: config.pool_id,
            twab_capacity: config.twab_capacity,
        })?;
        Ok(Self {
            config,
            ledger,
            yield_source,
            award_balance: 0,
            prize_splits: Vec::new(),
            events: EventLog::new(),
        })
    }

    pub fn config(&self) -> &PrizePoolConfig {
        &self.config
    }

    /// Share ledger and its histories
    pub fn ledger(&self) -> &ShareLedger {
        &self.ledger
    }

    pub fn yield_source(&self) -> &Y {
        &self.yield_source
    }

    pub fn yield_source_mut(&mut self) -> &mut Y {
        &mut self.yield_source
    }

    /// Assets held by the yield source for the pool
    pub fn balance(&self) -> u64 {
        self.yield_source.balance_of_token()
    }

    /// Captured yield not yet awarded
    pub fn award_balance(&self) -> u64 {
        self.award_balance
    }

    pub fn prize_splits(&self) -> &[PrizeSplitConfig] {
        &self.prize_splits
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<YieldPoolEvent> {
        self.events.take()
    }

    // ============ Operations ============

    /// Dispatches an action on behalf of `caller`
    pub fn execute(&mut self, caller: Address, action: &PrizePoolAction, now: Timestamp) -> YieldPoolResult<()> {
        match action {
            PrizePoolAction::Deposit { operator, to, amount } => {
                ensure_caller(*operator, caller)?;
                self.deposit_to(*operator, *to, *amount, now)
            }
            PrizePoolAction::Withdraw { from, amount } => {
                ensure_caller(*from, caller)?;
                self.withdraw_from(*from, *amount, now).map(|_| ())
            }
            PrizePoolAction::CaptureAward => {
                self.capture_award_balance(now);
                Ok(())
            }
            PrizePoolAction::Award { to, amount } => {
                ensure_caller(self.config.pool_id, caller)?;
                self.award(*to, *amount, now)
            }
            PrizePoolAction::DistributePrizeSplits => {
                ensure_caller(self.config.pool_id, caller)?;
                self.distribute_prize_splits(now).map(|_| ())
            }
        }
    }

    /// Deposit `amount` of the underlying asset and mint shares to `to`
    pub fn deposit_to(&mut self, operator: Address, to: Address, amount: u64, now: Timestamp) -> YieldPoolResult<()> {
        if amount == 0 {
            return Err(YieldPoolError::InvalidAmount {
                amount,
                reason: AmountErrorReason::Zero,
            });
        }
        if to == ZERO_ADDRESS {
            return Err(YieldPoolError::InvalidAddress {
                reason: "cannot deposit to the zero address",
            });
        }

        let balance = self
            .ledger
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(YieldPoolError::Overflow)?;
        if balance > self.config.balance_cap {
            return Err(YieldPoolError::ExceedsBalanceCap {
                balance,
                cap: self.config.balance_cap,
            });
        }
        let supply = self
            .ledger
            .total_supply()
            .checked_add(amount)
            .ok_or(YieldPoolError::Overflow)?;
        if supply > self.config.liquidity_cap {
            return Err(YieldPoolError::ExceedsLiquidityCap {
                supply,
                cap: self.config.liquidity_cap,
            });
        }

        let snapshot = self.ledger.clone();
        self.ledger.mint(self.config.pool_id, to, amount, now)?;
        if let Err(err) = self.yield_source.supply_token_to(amount) {
            self.ledger = snapshot;
            return Err(err);
        }
        self.ledger.drain_events_into(&mut self.events);

        let token = self.yield_source.deposit_token();
        debug!(?operator, ?to, ?token, amount, "deposit");
        self.events.emit(YieldPoolEvent::Deposited {
            operator,
            to,
            token,
            amount,
            timestamp: now,
        });
        Ok(())
    }

    /// Burn `amount` shares of `from` and redeem the underlying asset
    pub fn withdraw_from(&mut self, from: Address, amount: u64, now: Timestamp) -> YieldPoolResult<u64> {
        if amount == 0 {
            return Err(YieldPoolError::InvalidAmount {
                amount,
                reason: AmountErrorReason::Zero,
            });
        }
        let available = self.ledger.balance_of(&from);
        if amount > available {
            return Err(YieldPoolError::InsufficientBalance {
                available,
                requested: amount,
                context: twab::BURN_EXCEEDS_BALANCE,
            });
        }

        // Shares go first; the ledger is restored if the source cannot pay out
        let snapshot = self.ledger.clone();
        self.ledger.burn(self.config.pool_id, from, amount, now)?;
        let redeemed = match self.yield_source.redeem_token(amount) {
            Ok(redeemed) => redeemed,
            Err(err) => {
                self.ledger = snapshot;
                return Err(err);
            }
        };
        self.ledger.drain_events_into(&mut self.events);

        debug!(?from, amount, redeemed, "withdraw");
        self.events.emit(YieldPoolEvent::Withdrawn {
            from,
            amount,
            redeemed,
            timestamp: now,
        });
        Ok(redeemed)
    }

    /// Moves accrued yield into the award balance and returns it
    pub fn capture_award_balance(&mut self, now: Timestamp) -> u64 {
        let total_interest = self
            .yield_source
            .balance_of_token()
            .saturating_sub(self.ledger.total_supply());

        if total_interest > self.award_balance {
            let captured = total_interest - self.award_balance;
            self.award_balance = total_interest;

            debug!(captured, award_balance = total_interest, "award captured");
            self.events.emit(YieldPoolEvent::AwardCaptured {
                amount: captured,
                award_balance: total_interest,
                timestamp: now,
            });
        }
        self.award_balance
    }

    /// Pays `amount` of the award balance to `to` as new shares
    pub fn award(&mut self, to: Address, amount: u64, now: Timestamp) -> YieldPoolResult<()> {
        if amount == 0 {
            return Ok(());
        }
        if amount > self.award_balance {
            return Err(YieldPoolError::InsufficientAwardBalance {
                available: self.award_balance,
                requested: amount,
            });
        }

        self.ledger.mint(self.config.pool_id, to, amount, now)?;
        self.ledger.drain_events_into(&mut self.events);
        self.award_balance -= amount;

        debug!(winner = ?to, amount, "awarded");
        self.events.emit(YieldPoolEvent::Awarded {
            winner: to,
            amount,
            timestamp: now,
        });
        Ok(())
    }

    // ============ Prize Splits ============

    pub fn set_prize_splits(&mut self, configs: Vec<PrizeSplitConfig>) -> YieldPoolResult<()> {
        validate_prize_splits(&configs)?;
        self.prize_splits = configs;
        Ok(())
    }

    /// Captures the award balance and pays every split its share.
    ///
    /// Returns what is left in the award balance for winners.
    pub fn distribute_prize_splits(&mut self, now: Timestamp) -> YieldPoolResult<u64> {
        let prize = self.capture_award_balance(now);

        for (target, amount) in split_amounts(&self.prize_splits, prize) {
            if amount == 0 {
                continue;
            }
            self.award(target, amount, now)?;
            self.events.emit(YieldPoolEvent::PrizeSplitAwarded {
                target,
                amount,
                timestamp: now,
            });
        }
        Ok(self.award_balance)
    }

    // ============ Admin ============

    pub fn set_balance_cap(&mut self, cap: u64, now: Timestamp) {
        self.config.balance_cap = cap;
        self.events.emit(YieldPoolEvent::BalanceCapSet { cap, timestamp: now });
    }

    pub fn set_liquidity_cap(&mut self, cap: u64, now: Timestamp) {
        self.config.liquidity_cap = cap;
        self.events.emit(YieldPoolEvent::LiquidityCapSet { cap, timestamp: now });
    }
}

fn ensure_caller(expected: Address, actual: Address) -> YieldPoolResult<()> {
    if expected != actual {
        return Err(YieldPoolError::Unauthorized { expected, actual });
    }
    Ok(())
}

// ============ Tests ============
