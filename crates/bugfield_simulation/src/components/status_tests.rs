//! Tests for StatusLedger and StatusTable.

#[cfg(test)]
mod tests {
    use super::super::status::{HpChange, StatusLedger, StatusProfile, StatusTable};
    use proptest::prelude::*;

    fn ledger(max_hp: i32) -> StatusLedger {
        StatusLedger::new(StatusProfile { max_hp, attack: 5 })
    }

    #[test]
    fn test_new_ledger_is_full() {
        let status = ledger(10);
        assert_eq!(status.current_hp(), 10);
        assert_eq!(status.max_hp(), 10);
        assert_eq!(status.attack(), 5);
        assert!(!status.has_pending_changes());
    }

    #[test]
    fn test_damage_clamps_to_zero() {
        let mut status = ledger(10);

        assert!(status.apply_damage(12));
        assert_eq!(status.current_hp(), 0);
        assert_eq!(
            status.take_changes(),
            vec![HpChange { previous: 10, current: 0, max: 10 }]
        );
    }

    #[test]
    fn test_negative_damage_is_noop() {
        let mut status = ledger(10);

        assert!(!status.apply_damage(-5));
        assert!(!status.apply_damage(0));
        assert_eq!(status.current_hp(), 10);
        assert!(status.take_changes().is_empty());
    }

    #[test]
    fn test_damage_at_floor_does_not_notify() {
        let mut status = ledger(10);
        status.apply_damage(10);
        status.take_changes();

        // HP уже 0 → значение не меняется → без уведомления
        assert!(status.apply_damage(3));
        assert!(status.take_changes().is_empty());
    }

    #[test]
    fn test_restore_full_notifies_once() {
        let mut status = ledger(20);
        status.apply_damage(15);
        status.take_changes();

        status.restore_full();
        status.restore_full();

        assert_eq!(status.current_hp(), 20);
        assert_eq!(status.take_changes().len(), 1);
    }

    #[test]
    fn test_status_table_fallback() {
        let table = StatusTable::new(vec![StatusProfile { max_hp: 30, attack: 4 }]);

        assert_eq!(table.profile(0), StatusProfile { max_hp: 30, attack: 4 });
        assert_eq!(table.profile(7), StatusProfile::FALLBACK);
        assert_eq!(StatusProfile::FALLBACK.max_hp, 100);
        assert_eq!(StatusProfile::FALLBACK.attack, 2);
    }

    proptest! {
        #[test]
        fn prop_hp_stays_in_bounds(max_hp in 0i32..500, hits in prop::collection::vec(-50i32..200, 0..30)) {
            let mut status = ledger(max_hp);
            for amount in hits {
                let before = status.current_hp();
                let depleted = status.apply_damage(amount);

                prop_assert!(status.current_hp() >= 0);
                prop_assert!(status.current_hp() <= status.max_hp());
                if amount <= 0 {
                    prop_assert_eq!(status.current_hp(), before);
                    prop_assert!(!depleted);
                }

                // Уведомление только при реальном изменении
                let changes = status.take_changes();
                prop_assert_eq!(changes.is_empty(), before == status.current_hp());
            }
        }
    }
}
