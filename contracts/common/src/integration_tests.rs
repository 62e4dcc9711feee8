//! Integration Tests
//!
//! End-to-end tests that drive the TWAB engine through the ring and time
//! modules the way the share ledger does.

#[cfg(test)]
mod tests {
    use crate::constants::twab::{
        BURN_EXCEEDS_BALANCE, DEFAULT_CAPACITY, TRANSFER_EXCEEDS_BALANCE,
    };
    use crate::twab::{average_balance_between, balance_at, decrease_balance, increase_balance};
    use crate::*;
    use proptest::prelude::*;

    fn fresh(capacity: u32) -> Account {
        Account::new(capacity).unwrap()
    }

    // ============================================================================
    // Lifecycle Scenarios
    // ============================================================================

    #[test]
    fn test_deposit_then_top_up() {
        let mut account = fresh(DEFAULT_CAPACITY);

        let first = increase_balance(&mut account, 50, 100).unwrap();
        assert_eq!(first.details.balance, 50);
        assert_eq!(first.checkpoint, Checkpoint { timestamp: 100, cumulative_balance: 0 });

        let second = increase_balance(&mut account, 30, 200).unwrap();
        assert_eq!(second.details.balance, 80);
        assert_eq!(second.checkpoint, Checkpoint { timestamp: 200, cumulative_balance: 50 * 100 });
        assert_eq!(account.details.cardinality, 2);

        let now = 300;
        assert_eq!(account.balance_at(150, now), 50);
        assert_eq!(account.average_balance_between(100, 200, now), 50);
        assert_eq!(account.balance_at(250, now), 80);
    }

    #[test]
    fn test_ring_overwrite_clamps_evicted_history() {
        let mut account = fresh(4);
        let times = [10u32, 20, 30, 40, 50, 60];
        for (i, t) in times.iter().enumerate() {
            increase_balance(&mut account, i as u64 + 1, *t).unwrap();
        }
        // balances after each change: 1, 3, 6, 10, 15, 21
        assert_eq!(account.details.cardinality, 4);
        assert!(account.is_full());
        assert_eq!(account.oldest_checkpoint().map(|c| c.timestamp), Some(30));

        let now = 100;
        // Evicted timestamps see the balance held from the oldest retained checkpoint
        assert_eq!(account.balance_at(10, now), 6);
        assert_eq!(account.balance_at(20, now), 6);

        assert_eq!(account.balance_at(30, now), 6);
        assert_eq!(account.balance_at(45, now), 10);
        assert_eq!(account.balance_at(55, now), 15);
        assert_eq!(account.balance_at(60, now), 21);
        assert_eq!(account.average_balance_between(10, 40, now), 6);
    }

    #[test]
    fn test_history_before_first_mutation_is_zero() {
        let mut account = fresh(4);
        increase_balance(&mut account, 500, 1_000).unwrap();
        increase_balance(&mut account, 500, 2_000).unwrap();

        assert_eq!(account.balance_at(0, 3_000), 0);
        assert_eq!(account.balance_at(999, 3_000), 0);
        assert_eq!(account.average_balance_between(0, 1_000, 3_000), 0);
        assert_eq!(account.average_balance_between(500, 1_500, 3_000), 250);
    }

    #[test]
    fn test_full_withdrawal_and_return() {
        let mut account = fresh(8);
        increase_balance(&mut account, 100, 100).unwrap();
        decrease_balance(&mut account, 100, BURN_EXCEEDS_BALANCE, 200).unwrap();
        increase_balance(&mut account, 40, 400).unwrap();

        let now = 500;
        assert_eq!(account.balance_at(150, now), 100);
        assert_eq!(account.balance_at(300, now), 0);
        assert_eq!(account.balance_at(450, now), 40);
        // 100 * 100 + 0 * 200 + 40 * 100 over 400 seconds
        assert_eq!(account.average_balance_between(100, 500, now), 35);
    }

    #[test]
    fn test_insufficient_balance_keeps_history() {
        let mut account = fresh(8);
        increase_balance(&mut account, 10, 100).unwrap();
        let snapshot = account.clone();

        let err = decrease_balance(&mut account, 11, TRANSFER_EXCEEDS_BALANCE, 150).unwrap_err();
        assert_eq!(err.code(), "E011_INSUFFICIENT_BALANCE");
        assert_eq!(account, snapshot);
        assert_eq!(account.balance_at(150, 150), 10);
    }

    #[test]
    fn test_total_supply_uses_same_engine() {
        // A holder and the total supply are two instances of the same account shape
        let mut holder = fresh(8);
        let mut supply = fresh(8);
        for (amount, t) in [(10u64, 100u32), (20, 200)] {
            increase_balance(&mut holder, amount, t).unwrap();
            increase_balance(&mut supply, amount, t).unwrap();
        }
        increase_balance(&mut supply, 70, 300).unwrap();

        let now = 400;
        assert_eq!(holder.average_balance_between(100, 300, now), 20);
        assert_eq!(supply.average_balance_between(100, 300, now), 20);
        assert_eq!(supply.balance_at(now, now), 100);
    }

    #[test]
    fn test_long_history_wraps_ring_many_times() {
        let capacity = 5;
        let mut account = fresh(capacity);
        for step in 0..23u32 {
            increase_balance(&mut account, 1, 1_000 + step * 10).unwrap();
        }

        assert_eq!(account.details.cardinality, capacity);
        assert_eq!(account.details.next_checkpoint_index, 23 % capacity);
        assert_eq!(account.newest_checkpoint().map(|c| c.timestamp), Some(1_220));
        assert_eq!(account.oldest_checkpoint().map(|c| c.timestamp), Some(1_180));
        assert_eq!(account.balance_at(1_195, 2_000), 20);
    }

    // ============================================================================
    // Properties
    // ============================================================================

    proptest! {
        #[test]
        fn live_balance_after_last_mutation(
            ops in prop::collection::vec((1u64..10_000, 0u32..100), 1..30),
            later in 0u32..1_000,
        ) {
            let mut account = fresh(4);
            let mut now = 1_000u32;
            for (amount, step) in ops {
                now += step;
                increase_balance(&mut account, amount, now).unwrap();
            }
            let query = now + later;
            prop_assert_eq!(
                balance_at(&account.checkpoints, &account.details, query, query),
                account.balance()
            );
        }

        #[test]
        fn degenerate_average_equals_point(
            ops in prop::collection::vec((any::<bool>(), 1u64..500, 1u32..50), 1..30),
            t in 0u32..3_000,
        ) {
            let mut account = fresh(6);
            let mut now = 500u32;
            for (is_increase, amount, step) in ops {
                now += step;
                let _ = if is_increase {
                    increase_balance(&mut account, amount, now)
                } else {
                    decrease_balance(&mut account, amount, BURN_EXCEEDS_BALANCE, now)
                };
            }
            let query_now = now + 100;
            prop_assert_eq!(
                average_balance_between(&account.checkpoints, &account.details, t, t, query_now),
                balance_at(&account.checkpoints, &account.details, t, query_now)
            );
        }

        #[test]
        fn one_second_average_equals_point(
            ops in prop::collection::vec((any::<bool>(), 1u64..500, 1u32..50), 1..30),
            t in any::<u32>(),
        ) {
            let mut account = fresh(6);
            let mut now = 500u32;
            for (is_increase, amount, step) in ops {
                now += step;
                let _ = if is_increase {
                    increase_balance(&mut account, amount, now)
                } else {
                    decrease_balance(&mut account, amount, BURN_EXCEEDS_BALANCE, now)
                };
            }
            let query_now = now + 100;
            let t = t % query_now;
            prop_assert_eq!(
                average_balance_between(&account.checkpoints, &account.details, t, t + 1, query_now),
                balance_at(&account.checkpoints, &account.details, t, query_now)
            );
        }
    }

    #[test]
    fn test_one_second_average_between_checkpoints() {
        let mut account = fresh(4);
        increase_balance(&mut account, 40, 100).unwrap();
        increase_balance(&mut account, 60, 200).unwrap();
        decrease_balance(&mut account, 30, BURN_EXCEEDS_BALANCE, 300).unwrap();

        let now = 400;
        for (t, expected) in [(99u32, 0u64), (100, 40), (150, 40), (199, 40), (200, 100), (250, 100), (300, 70), (398, 70)] {
            assert_eq!(account.balance_at(t, now), expected);
            assert_eq!(account.average_balance_between(t, t + 1, now), expected);
        }
    }
}
