//! YieldPool Share Ledger
//!
//! Fungible share token issued by a prize pool, with a time-weighted
//! balance history per delegate and for the total supply.
//! Only the configured controller (the prize pool) can mint/burn.
//!
//! ## Delegation
//!
//! A holder's balance is recorded in the history of its delegate. Holders
//! are their own delegate until they choose otherwise; delegating to the
//! zero address removes the balance from every history, including the
//! total supply, while the share balance itself is untouched.

use std::collections::BTreeMap;
use std::vec::Vec;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod store;

pub use store::{TwabKey, TwabStore};

use yieldpool_common::{
    constants::{token, twab, ZERO_ADDRESS},
    errors::{AmountErrorReason, YieldPoolError, YieldPoolResult},
    events::{EventLog, YieldPoolEvent},
    types::{validate_capacity, AccountDetails, Address, Checkpoint, ShareAction, Timestamp},
};

// ============ Configuration ============

/// Share ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ShareConfig {
    /// Only address allowed to mint and burn
    pub controller: Address,
    /// Checkpoint slots per history account
    pub twab_capacity: u32,
}

impl ShareConfig {
    /// Configuration with the default ring capacity
    pub fn new(controller: Address) -> Self {
        Self {
            controller,
            twab_capacity: twab::DEFAULT_CAPACITY,
        }
    }

    pub fn validate(&self) -> YieldPoolResult<()> {
        if self.controller == ZERO_ADDRESS {
            return Err(YieldPoolError::InvalidAddress {
                reason: "controller cannot be the zero address",
            });
        }
        validate_capacity(self.twab_capacity)
    }
}

// ============ Ledger State ============

/// Share balances, delegation and history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ShareLedger {
    config: ShareConfig,
    balances: BTreeMap<Address, u64>,
    total_supply: u64,
    /// Explicit delegations; absent means self
    delegates: BTreeMap<Address, Address>,
    twabs: TwabStore,
    #[serde(skip)]
    #[borsh(skip)]
    events: EventLog,
}

impl ShareLedger {
    pub fn new(config: ShareConfig) -> YieldPoolResult<Self> {
        config.validate()?;
        Ok(Self {
            twabs: TwabStore::new(config.twab_capacity)?,
            config,
            balances: BTreeMap::new(),
            total_supply: 0,
            delegates: BTreeMap::new(),
            events: EventLog::new(),
        })
    }

    /// Get token name
    pub fn name() -> &'static str {
        token::NAME
    }

    /// Get token symbol
    pub fn symbol() -> &'static str {
        token::SYMBOL
    }

    /// Get token decimals
    pub fn decimals() -> u8 {
        token::DECIMALS
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    pub fn balance_of(&self, holder: &Address) -> u64 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Address whose history records `holder`'s balance (zero when opted out)
    pub fn delegate_of(&self, holder: &Address) -> Address {
        self.delegates.get(holder).copied().unwrap_or(*holder)
    }

    pub fn twabs(&self) -> &TwabStore {
        &self.twabs
    }

    /// Events emitted since the last `take_events`
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<YieldPoolEvent> {
        self.events.take()
    }

    /// Moves pending events into an outer log
    pub fn drain_events_into(&mut self, log: &mut EventLog) {
        log.append(&mut self.events);
    }

    // ============ Operations ============

    /// Dispatches an action on behalf of `caller`
    pub fn apply(&mut self, caller: Address, action: &ShareAction, now: Timestamp) -> YieldPoolResult<()> {
        match action {
            ShareAction::Transfer { from, to, amount } => self.transfer(caller, *from, *to, *amount, now),
            ShareAction::Mint { to, amount } => self.mint(caller, *to, *amount, now),
            ShareAction::Burn { from, amount } => self.burn(caller, *from, *amount, now),
            ShareAction::Delegate { delegator, delegate } => {
                if caller != *delegator {
                    return Err(YieldPoolError::Unauthorized {
                        expected: *delegator,
                        actual: caller,
                    });
                }
                self.delegate(*delegator, *delegate, now)
            }
        }
    }

    /// Mint new shares (controller only)
    pub fn mint(&mut self, caller: Address, to: Address, amount: u64, now: Timestamp) -> YieldPoolResult<()> {
        self.ensure_controller(caller)?;
        ensure_positive(amount)?;
        if to == ZERO_ADDRESS {
            return Err(YieldPoolError::InvalidAddress {
                reason: "cannot mint to the zero address",
            });
        }

        let new_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(YieldPoolError::Overflow)?;
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(YieldPoolError::Overflow)?;

        let delegate = self.delegate_of(&to);
        if delegate != ZERO_ADDRESS {
            self.twabs
                .record_increase(TwabKey::Holder(delegate), amount, now, &mut self.events)?;
            self.twabs
                .record_increase(TwabKey::TotalSupply, amount, now, &mut self.events)?;
        }

        self.balances.insert(to, new_balance);
        self.total_supply = new_supply;

        debug!(?to, amount, total_supply = new_supply, "shares minted");
        self.events.emit(YieldPoolEvent::ShareMinted {
            to,
            amount,
            new_total_supply: new_supply,
            timestamp: now,
        });
        Ok(())
    }

    /// Burn shares (controller only)
    pub fn burn(&mut self, caller: Address, from: Address, amount: u64, now: Timestamp) -> YieldPoolResult<()> {
        self.ensure_controller(caller)?;
        ensure_positive(amount)?;

        let available = self.balance_of(&from);
        if amount > available {
            return Err(YieldPoolError::InsufficientBalance {
                available,
                requested: amount,
                context: twab::BURN_EXCEEDS_BALANCE,
            });
        }

        let delegate = self.delegate_of(&from);
        if delegate != ZERO_ADDRESS {
            self.ensure_history(TwabKey::Holder(delegate), amount, twab::BURN_EXCEEDS_BALANCE)?;
            self.ensure_history(TwabKey::TotalSupply, amount, twab::BURN_EXCEEDS_BALANCE)?;
            self.twabs.record_decrease(
                TwabKey::Holder(delegate),
                amount,
                twab::BURN_EXCEEDS_BALANCE,
                now,
                &mut self.events,
            )?;
            self.twabs.record_decrease(
                TwabKey::TotalSupply,
                amount,
                twab::BURN_EXCEEDS_BALANCE,
                now,
                &mut self.events,
            )?;
        }

        self.set_balance(from, available - amount);
        self.total_supply -= amount;

        debug!(?from, amount, total_supply = self.total_supply, "shares burned");
        self.events.emit(YieldPoolEvent::ShareBurned {
            from,
            amount,
            new_total_supply: self.total_supply,
            timestamp: now,
        });
        Ok(())
    }

    /// Move shares between holders (signed by the sender)
    pub fn transfer(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: u64,
        now: Timestamp,
    ) -> YieldPoolResult<()> {
        if caller != from {
            return Err(YieldPoolError::Unauthorized {
                expected: from,
                actual: caller,
            });
        }
        ensure_positive(amount)?;
        if to == ZERO_ADDRESS {
            return Err(YieldPoolError::InvalidAddress {
                reason: "cannot transfer to the zero address",
            });
        }
        if to == from {
            return Err(YieldPoolError::InvalidInput {
                param: "to",
                reason: "cannot transfer to self",
            });
        }

        let available = self.balance_of(&from);
        if amount > available {
            return Err(YieldPoolError::InsufficientBalance {
                available,
                requested: amount,
                context: twab::TRANSFER_EXCEEDS_BALANCE,
            });
        }
        let recipient_balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(YieldPoolError::Overflow)?;

        let from_delegate = self.delegate_of(&from);
        let to_delegate = self.delegate_of(&to);
        if from_delegate != to_delegate {
            self.move_history(from_delegate, to_delegate, amount, twab::TRANSFER_EXCEEDS_BALANCE, now)?;
        }

        self.set_balance(from, available - amount);
        self.balances.insert(to, recipient_balance);

        debug!(?from, ?to, amount, "shares transferred");
        self.events.emit(YieldPoolEvent::ShareTransferred {
            from,
            to,
            amount,
            timestamp: now,
        });
        Ok(())
    }

    /// Route `holder`'s history to `to` (the zero address opts out)
    pub fn delegate(&mut self, holder: Address, to: Address, now: Timestamp) -> YieldPoolResult<()> {
        let current = self.delegate_of(&holder);
        if to == current {
            return Err(YieldPoolError::InvalidInput {
                param: "delegate",
                reason: "already delegated to this address",
            });
        }

        let balance = self.balance_of(&holder);
        if balance > 0 {
            self.move_history(current, to, balance, twab::DELEGATION_EXCEEDS_BALANCE, now)?;
        }

        if to == holder {
            self.delegates.remove(&holder);
        } else {
            self.delegates.insert(holder, to);
        }

        debug!(?holder, delegate = ?to, balance, "delegate changed");
        self.events.emit(YieldPoolEvent::Delegated {
            delegator: holder,
            delegate: to,
            timestamp: now,
        });
        Ok(())
    }

    // ============ History Queries ============

    pub fn balance_at(&self, holder: &Address, target: Timestamp, now: Timestamp) -> u64 {
        self.twabs.query_balance_at(&TwabKey::Holder(*holder), target, now)
    }

    pub fn balances_at(&self, holder: &Address, targets: &[Timestamp], now: Timestamp) -> Vec<u64> {
        self.twabs.query_balances_at(&TwabKey::Holder(*holder), targets, now)
    }

    pub fn average_balance_between(
        &self,
        holder: &Address,
        start: Timestamp,
        end: Timestamp,
        now: Timestamp,
    ) -> u64 {
        self.twabs
            .query_average_balance_between(&TwabKey::Holder(*holder), start, end, now)
    }

    pub fn average_balances_between(
        &self,
        holder: &Address,
        starts: &[Timestamp],
        ends: &[Timestamp],
        now: Timestamp,
    ) -> YieldPoolResult<Vec<u64>> {
        self.twabs
            .query_average_balances_between(&TwabKey::Holder(*holder), starts, ends, now)
    }

    pub fn total_supply_at(&self, target: Timestamp, now: Timestamp) -> u64 {
        self.twabs.query_balance_at(&TwabKey::TotalSupply, target, now)
    }

    pub fn total_supplies_at(&self, targets: &[Timestamp], now: Timestamp) -> Vec<u64> {
        self.twabs.query_balances_at(&TwabKey::TotalSupply, targets, now)
    }

    pub fn average_total_supplies_between(
        &self,
        starts: &[Timestamp],
        ends: &[Timestamp],
        now: Timestamp,
    ) -> YieldPoolResult<Vec<u64>> {
        self.twabs
            .query_average_balances_between(&TwabKey::TotalSupply, starts, ends, now)
    }

    pub fn account_details(&self, holder: &Address) -> AccountDetails {
        self.twabs.account_details(&TwabKey::Holder(*holder))
    }

    pub fn checkpoint(&self, holder: &Address, index: u32) -> Option<Checkpoint> {
        self.twabs.checkpoint(&TwabKey::Holder(*holder), index)
    }

    // ============ Helpers ============

    fn ensure_controller(&self, caller: Address) -> YieldPoolResult<()> {
        if caller != self.config.controller {
            return Err(YieldPoolError::Unauthorized {
                expected: self.config.controller,
                actual: caller,
            });
        }
        Ok(())
    }

    fn ensure_history(&self, key: TwabKey, amount: u64, context: &'static str) -> YieldPoolResult<()> {
        let available = self.twabs.balance(&key);
        if amount > available {
            return Err(YieldPoolError::InsufficientBalance {
                available,
                requested: amount,
                context,
            });
        }
        Ok(())
    }

    /// Moves `amount` of history from one delegate to another.
    ///
    /// A zero-address side is outside the total supply, so the total-supply
    /// history grows or shrinks accordingly.
    fn move_history(
        &mut self,
        from: Address,
        to: Address,
        amount: u64,
        context: &'static str,
        now: Timestamp,
    ) -> YieldPoolResult<()> {
        if from != ZERO_ADDRESS {
            self.ensure_history(TwabKey::Holder(from), amount, context)?;
        }
        if to == ZERO_ADDRESS {
            self.ensure_history(TwabKey::TotalSupply, amount, context)?;
        }

        if from != ZERO_ADDRESS {
            self.twabs
                .record_decrease(TwabKey::Holder(from), amount, context, now, &mut self.events)?;
        } else {
            self.twabs
                .record_increase(TwabKey::TotalSupply, amount, now, &mut self.events)?;
        }

        if to != ZERO_ADDRESS {
            self.twabs
                .record_increase(TwabKey::Holder(to), amount, now, &mut self.events)?;
        } else {
            self.twabs
                .record_decrease(TwabKey::TotalSupply, amount, context, now, &mut self.events)?;
        }
        Ok(())
    }

    fn set_balance(&mut self, holder: Address, balance: u64) {
        if balance == 0 {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, balance);
        }
    }
}

fn ensure_positive(amount: u64) -> YieldPoolResult<()> {
    if amount == 0 {
        return Err(YieldPoolError::InvalidAmount {
            amount,
            reason: AmountErrorReason::Zero,
        });
    }
    Ok(())
}

/// Format amount for display (whole, fractional)
pub fn format_amount(amount: u64) -> (u64, u64) {
    (amount / token::ONE, amount % token::ONE)
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use yieldpool_common::events::EventType;

    const CONTROLLER: Address = [1u8; 32];
    const ALICE: Address = [2u8; 32];
    const BOB: Address = [3u8; 32];
    const CAROL: Address = [4u8; 32];

    fn ledger() -> ShareLedger {
        ShareLedger::new(ShareConfig::new(CONTROLLER)).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(ShareConfig::new(ZERO_ADDRESS).validate().is_err());
        let config = ShareConfig { controller: CONTROLLER, twab_capacity: 1 };
        assert!(ShareLedger::new(config).is_err());
        assert!(ShareConfig::new(CONTROLLER).validate().is_ok());
    }

    #[test]
    fn test_metadata() {
        assert_eq!(ShareLedger::symbol(), token::SYMBOL);
        assert_eq!(ShareLedger::decimals(), 8);
        assert_eq!(format_amount(3 * token::ONE + 5), (3, 5));
    }

    #[test]
    fn test_mint_records_history() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 50, 100).unwrap();
        ledger.mint(CONTROLLER, ALICE, 30, 200).unwrap();

        assert_eq!(ledger.balance_of(&ALICE), 80);
        assert_eq!(ledger.total_supply(), 80);
        assert_eq!(ledger.balance_at(&ALICE, 150, 300), 50);
        assert_eq!(ledger.average_balance_between(&ALICE, 100, 200, 300), 50);
        assert_eq!(ledger.balance_at(&ALICE, 250, 300), 80);
        assert_eq!(ledger.total_supply_at(150, 300), 50);
        assert_eq!(ledger.account_details(&ALICE).cardinality, 2);
        assert_eq!(
            ledger.checkpoint(&ALICE, 1),
            Some(Checkpoint { timestamp: 200, cumulative_balance: 5_000 })
        );
    }

    #[test]
    fn test_mint_unauthorized() {
        let mut ledger = ledger();
        let attacker = [99u8; 32];

        let result = ledger.mint(attacker, ALICE, 1000, 100);
        assert_eq!(
            result,
            Err(YieldPoolError::Unauthorized { expected: CONTROLLER, actual: attacker })
        );
        assert!(ledger.burn(attacker, ALICE, 1, 100).is_err());
        assert!(!ledger.events().has_events());
    }

    #[test]
    fn test_mint_rejects_zero_and_zero_address() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.mint(CONTROLLER, ALICE, 0, 100),
            Err(YieldPoolError::InvalidAmount { .. })
        ));
        assert!(matches!(
            ledger.mint(CONTROLLER, ZERO_ADDRESS, 10, 100),
            Err(YieldPoolError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_burn_exceeding_balance() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 100, 100).unwrap();
        let before = ledger.clone();

        let result = ledger.burn(CONTROLLER, ALICE, 101, 200);
        assert_eq!(
            result,
            Err(YieldPoolError::InsufficientBalance {
                available: 100,
                requested: 101,
                context: twab::BURN_EXCEEDS_BALANCE,
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_burn_updates_history() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 100, 100).unwrap();
        ledger.burn(CONTROLLER, ALICE, 40, 200).unwrap();

        assert_eq!(ledger.balance_of(&ALICE), 60);
        assert_eq!(ledger.total_supply(), 60);
        assert_eq!(ledger.balance_at(&ALICE, 199, 300), 100);
        assert_eq!(ledger.total_supply_at(250, 300), 60);
    }

    #[test]
    fn test_transfer_moves_history() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 100, 100).unwrap();
        ledger.transfer(ALICE, ALICE, BOB, 60, 200).unwrap();

        assert_eq!(ledger.balance_of(&ALICE), 40);
        assert_eq!(ledger.balance_of(&BOB), 60);
        assert_eq!(ledger.balance_at(&ALICE, 150, 300), 100);
        assert_eq!(ledger.balance_at(&ALICE, 250, 300), 40);
        assert_eq!(ledger.balance_at(&BOB, 150, 300), 0);
        assert_eq!(ledger.balance_at(&BOB, 250, 300), 60);
        assert_eq!(ledger.total_supply_at(250, 300), 100);
        assert_eq!(ledger.events().filter_by_type(EventType::ShareTransferred).len(), 1);
    }

    #[test]
    fn test_transfer_rejections() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 100, 100).unwrap();

        assert!(matches!(
            ledger.transfer(BOB, ALICE, BOB, 10, 200),
            Err(YieldPoolError::Unauthorized { .. })
        ));
        assert!(matches!(
            ledger.transfer(ALICE, ALICE, BOB, 0, 200),
            Err(YieldPoolError::InvalidAmount { .. })
        ));
        assert!(matches!(
            ledger.transfer(ALICE, ALICE, ALICE, 10, 200),
            Err(YieldPoolError::InvalidInput { param: "to", .. })
        ));
        assert!(matches!(
            ledger.transfer(ALICE, ALICE, ZERO_ADDRESS, 10, 200),
            Err(YieldPoolError::InvalidAddress { .. })
        ));
        assert_eq!(
            ledger.transfer(ALICE, ALICE, BOB, 101, 200),
            Err(YieldPoolError::InsufficientBalance {
                available: 100,
                requested: 101,
                context: twab::TRANSFER_EXCEEDS_BALANCE,
            })
        );
        assert_eq!(ledger.balance_of(&ALICE), 100);
    }

    #[test]
    fn test_delegation_moves_history() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 100, 100).unwrap();
        ledger.delegate(ALICE, BOB, 200).unwrap();

        assert_eq!(ledger.delegate_of(&ALICE), BOB);
        assert_eq!(ledger.balance_of(&ALICE), 100);
        assert_eq!(ledger.balance_at(&ALICE, 250, 300), 0);
        assert_eq!(ledger.balance_at(&BOB, 250, 300), 100);
        assert_eq!(ledger.total_supply_at(250, 300), 100);

        // Later mints follow the delegate
        ledger.mint(CONTROLLER, ALICE, 20, 300).unwrap();
        assert_eq!(ledger.balance_at(&BOB, 300, 300), 120);

        // Back to self
        ledger.delegate(ALICE, ALICE, 400).unwrap();
        assert_eq!(ledger.delegate_of(&ALICE), ALICE);
        assert_eq!(ledger.balance_at(&ALICE, 400, 400), 120);
        assert_eq!(ledger.balance_at(&BOB, 400, 400), 0);
    }

    #[test]
    fn test_delegation_to_current_rejected() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.delegate(ALICE, ALICE, 100),
            Err(YieldPoolError::InvalidInput { param: "delegate", .. })
        ));
        ledger.delegate(ALICE, BOB, 100).unwrap();
        assert!(ledger.delegate(ALICE, BOB, 200).is_err());
    }

    #[test]
    fn test_opt_out_leaves_total_supply_history() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 100, 100).unwrap();
        ledger.mint(CONTROLLER, BOB, 50, 100).unwrap();
        ledger.delegate(ALICE, ZERO_ADDRESS, 200).unwrap();

        assert_eq!(ledger.total_supply(), 150);
        assert_eq!(ledger.total_supply_at(250, 300), 50);
        assert_eq!(ledger.balance_at(&ALICE, 250, 300), 0);

        // Transfers across the opt-out boundary adjust the total-supply history
        ledger.transfer(ALICE, ALICE, BOB, 30, 300).unwrap();
        assert_eq!(ledger.total_supply_at(300, 400), 80);
        assert_eq!(ledger.balance_at(&BOB, 300, 400), 80);

        ledger.transfer(BOB, BOB, CAROL, 80, 400).unwrap();
        ledger.delegate(CAROL, ZERO_ADDRESS, 450).unwrap();
        assert_eq!(ledger.total_supply_at(450, 500), 0);

        // Burning an opted-out balance leaves every history alone
        ledger.burn(CONTROLLER, ALICE, 70, 500).unwrap();
        assert_eq!(ledger.total_supply(), 80);
        assert_eq!(ledger.total_supply_at(500, 500), 0);
    }

    #[test]
    fn test_transfer_between_shared_delegate_keeps_history() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 100, 100).unwrap();
        ledger.delegate(BOB, ALICE, 100).unwrap();
        ledger.take_events();

        ledger.transfer(ALICE, ALICE, BOB, 40, 200).unwrap();
        assert_eq!(ledger.balance_at(&ALICE, 200, 300), 100);
        assert!(ledger.events().filter_by_type(EventType::NewUserCheckpoint).is_empty());
    }

    #[test]
    fn test_apply_dispatch() {
        let mut ledger = ledger();
        ledger
            .apply(CONTROLLER, &ShareAction::Mint { to: ALICE, amount: 10 }, 100)
            .unwrap();
        ledger
            .apply(ALICE, &ShareAction::Transfer { from: ALICE, to: BOB, amount: 4 }, 110)
            .unwrap();
        assert!(ledger
            .apply(BOB, &ShareAction::Delegate { delegator: ALICE, delegate: BOB }, 120)
            .is_err());
        ledger
            .apply(CONTROLLER, &ShareAction::Burn { from: BOB, amount: 4 }, 130)
            .unwrap();

        assert_eq!(ledger.balance_of(&ALICE), 6);
        assert_eq!(ledger.balance_of(&BOB), 0);
        assert_eq!(ledger.total_supply(), 6);
    }

    #[test]
    fn test_batch_queries() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 10, 100).unwrap();
        ledger.mint(CONTROLLER, BOB, 30, 200).unwrap();

        assert_eq!(ledger.balances_at(&ALICE, &[50, 150], 300), vec![0, 10]);
        assert_eq!(ledger.total_supplies_at(&[150, 250], 300), vec![10, 40]);
        assert_eq!(
            ledger.average_total_supplies_between(&[100], &[300], 300),
            Ok(vec![25])
        );
        assert_eq!(
            ledger.average_balances_between(&ALICE, &[100, 200], &[300], 300),
            Err(YieldPoolError::MismatchedQueryLengths { starts: 2, ends: 1 })
        );
    }

    #[test]
    fn test_events_emitted() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 10, 100).unwrap();
        ledger.mint(CONTROLLER, ALICE, 10, 100).unwrap();

        let events = ledger.take_events();
        let kinds: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            kinds,
            vec![
                EventType::NewUserCheckpoint,
                EventType::NewTotalSupplyCheckpoint,
                EventType::ShareMinted,
                EventType::ShareMinted,
            ]
        );
        assert!(ledger.take_events().is_empty());
    }

    #[test]
    fn test_state_persists_through_cbor() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 100, 100).unwrap();
        ledger.delegate(ALICE, BOB, 150).unwrap();
        ledger.mint(CONTROLLER, CAROL, 25, 200).unwrap();
        ledger.take_events();

        let mut bytes = Vec::new();
        ciborium::into_writer(&ledger, &mut bytes).unwrap();
        let restored: ShareLedger = ciborium::from_reader(bytes.as_slice()).unwrap();

        assert_eq!(restored, ledger);
        assert_eq!(restored.balance_at(&BOB, 175, 300), 100);
        assert_eq!(restored.delegate_of(&ALICE), BOB);
    }

    proptest! {
        #[test]
        fn histories_sum_to_total_supply_history(
            ops in prop::collection::vec((0u8..4, 0usize..3, 0usize..4, 1u64..1_000), 1..40),
        ) {
            let holders = [ALICE, BOB, CAROL];
            let delegates = [ALICE, BOB, CAROL, ZERO_ADDRESS];
            let mut ledger = ledger();
            let mut now = 100u32;

            for (kind, holder, other, amount) in ops {
                now += 7;
                let holder = holders[holder];
                let _ = match kind {
                    0 => ledger.mint(CONTROLLER, holder, amount, now),
                    1 => ledger.burn(CONTROLLER, holder, amount, now),
                    2 => ledger.transfer(holder, holder, holders[other % 3], amount, now),
                    _ => ledger.delegate(holder, delegates[other], now),
                };

                let delegated: u64 = holders
                    .iter()
                    .map(|h| ledger.twabs().balance(&TwabKey::Holder(*h)))
                    .sum();
                let opted_in: u64 = holders
                    .iter()
                    .filter(|h| ledger.delegate_of(h) != ZERO_ADDRESS)
                    .map(|h| ledger.balance_of(h))
                    .sum();
                prop_assert_eq!(delegated, ledger.twabs().balance(&TwabKey::TotalSupply));
                prop_assert_eq!(delegated, opted_in);
            }
        }
    }

    #[test]
    fn test_state_persists_through_borsh() {
        let mut ledger = ledger();
        ledger.mint(CONTROLLER, ALICE, 100, 100).unwrap();
        ledger.take_events();

        let bytes = borsh::to_vec(&ledger).unwrap();
        let restored: ShareLedger = borsh::from_slice(&bytes).unwrap();
        assert_eq!(restored, ledger);
    }
}
