//! Inventory lifecycle tests
//!
//! Covers item creation from a purchase or standalone, the sale transition,
//! and the ownership check every mutation goes through.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    check_sellable, draft_from_purchase, draft_standalone, ensure_owned, transition,
    GradingAttributes, GradingInfo, InventoryFields, InventoryStatus, LedgerError, LifecycleEvent,
    NewExpense, NewPurchase, NewSale, PurchaseRecord, UnverifiedPurchaseRef,
};
use std::str::FromStr;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn purchase(amount: &str) -> PurchaseRecord {
    let new = NewPurchase::new(
        Uuid::new_v4(),
        "Blue Sapphire",
        None,
        dec(amount),
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        Some("Ratnapura Traders"),
    )
    .unwrap();

    PurchaseRecord {
        id: Uuid::new_v4(),
        owner_id: new.owner_id,
        description: new.description,
        amount: new.amount,
        date: new.date,
        vendor: new.vendor,
        created_at: Utc::now(),
    }
}

fn grading(gem_name: &str, weight: &str) -> GradingInfo {
    GradingInfo {
        gem_name: gem_name.to_string(),
        weight: dec(weight),
        grading: GradingAttributes {
            color: Some("Royal Blue".to_string()),
            origin: Some("Sri Lanka".to_string()),
            ..Default::default()
        },
        description: None,
    }
}

fn field_of(err: LedgerError) -> String {
    match err {
        LedgerError::Validation { field, .. } => field,
        other => panic!("expected validation error, got {:?}", other),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_purchase_materializes_available_item() {
        let purchase = purchase("500");
        let item = draft_from_purchase(&purchase, grading("Blue Sapphire", "2.35")).unwrap();

        assert_eq!(item.owner_id, purchase.owner_id);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.status, InventoryStatus::Available);
        assert_eq!(item.purchase_price, dec("500"));
        assert_eq!(item.current_value, dec("500"));
        assert_eq!(item.purchase_id, Some(purchase.id));
        assert_eq!(item.grading.color.as_deref(), Some("Royal Blue"));
    }

    #[test]
    fn test_purchase_description_defaults_to_gem_name() {
        assert_eq!(purchase("500").description, "Purchase of Blue Sapphire");
    }

    #[test]
    fn test_blank_gem_name_rejected() {
        let err = draft_from_purchase(&purchase("500"), grading("   ", "2")).unwrap_err();
        assert_eq!(field_of(err), "gem_name");
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        for weight in ["0", "-1.5"] {
            let err = draft_from_purchase(&purchase("500"), grading("Ruby", weight)).unwrap_err();
            assert_eq!(field_of(err), "weight");
        }
    }

    #[test]
    fn test_non_positive_purchase_amount_rejected() {
        let err = NewPurchase::new(
            Uuid::new_v4(),
            "Ruby",
            None,
            Decimal::ZERO,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
        )
        .unwrap_err();
        assert_eq!(field_of(err), "amount");
    }

    #[test]
    fn test_amounts_finer_than_cents_rejected() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        for raw in ["0.001", "10.005"] {
            let err = NewExpense::new(Uuid::new_v4(), Uuid::new_v4(), dec(raw), day, None, None)
                .unwrap_err();
            assert_eq!(field_of(err), "amount", "expense {}", raw);

            let err = NewSale::new(Uuid::new_v4(), Uuid::new_v4(), dec(raw), day, None, None)
                .unwrap_err();
            assert_eq!(field_of(err), "amount", "sale {}", raw);
        }
    }

    #[test]
    fn test_weight_outside_column_rejected() {
        for weight in ["0.0001", "12345678"] {
            let err = draft_from_purchase(&purchase("500"), grading("Ruby", weight)).unwrap_err();
            assert_eq!(field_of(err), "weight", "weight {}", weight);
        }
    }

    #[test]
    fn test_standalone_current_value_precision() {
        let err = draft_standalone(
            Uuid::new_v4(),
            InventoryFields {
                gem_name: "Topaz".to_string(),
                weight: dec("4.2"),
                purchase_price: dec("90"),
                current_value: Some(dec("95.555")),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(field_of(err), "current_value");
    }

    #[test]
    fn test_standalone_defaults() {
        let owner = Uuid::new_v4();
        let item = draft_standalone(
            owner,
            InventoryFields {
                gem_name: "Spinel".to_string(),
                weight: dec("1.2"),
                purchase_price: dec("120"),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(item.owner_id, owner);
        assert_eq!(item.current_value, dec("120"));
        assert_eq!(item.quantity, 1);
        assert_eq!(item.purchase_id, None);
        assert_eq!(item.status, InventoryStatus::Available);
    }

    #[test]
    fn test_standalone_keeps_unverified_purchase_reference() {
        let reference = Uuid::new_v4();
        let item = draft_standalone(
            Uuid::new_v4(),
            InventoryFields {
                gem_name: "Garnet".to_string(),
                weight: dec("3"),
                purchase_price: dec("40"),
                purchase_ref: Some(UnverifiedPurchaseRef::new(reference)),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(item.purchase_id, Some(reference));
    }

    #[test]
    fn test_standalone_rejects_negative_price_and_zero_quantity() {
        let base = InventoryFields {
            gem_name: "Garnet".to_string(),
            weight: dec("3"),
            purchase_price: dec("40"),
            ..Default::default()
        };

        let err = draft_standalone(
            Uuid::new_v4(),
            InventoryFields {
                purchase_price: dec("-1"),
                ..base.clone()
            },
        )
        .unwrap_err();
        assert_eq!(field_of(err), "purchase_price");

        let err = draft_standalone(
            Uuid::new_v4(),
            InventoryFields {
                quantity: Some(0),
                ..base
            },
        )
        .unwrap_err();
        assert_eq!(field_of(err), "quantity");
    }

    #[test]
    fn test_sale_transition() {
        let event = LifecycleEvent::Sold { amount: dec("800") };
        assert_eq!(
            transition(InventoryStatus::Available, event).unwrap(),
            InventoryStatus::Sold
        );
        assert_eq!(event.current_value(), dec("800"));
    }

    #[test]
    fn test_sold_is_terminal_and_reserved_cannot_sell() {
        let event = LifecycleEvent::Sold { amount: dec("800") };
        assert!(matches!(
            transition(InventoryStatus::Sold, event),
            Err(LedgerError::InvalidState(_))
        ));
        assert!(matches!(
            transition(InventoryStatus::Reserved, event),
            Err(LedgerError::InvalidState(_))
        ));
    }

    #[test]
    fn test_ownership_checked_before_status() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert!(check_sellable(owner, InventoryStatus::Available, owner).is_ok());
        assert!(matches!(
            check_sellable(owner, InventoryStatus::Sold, stranger),
            Err(LedgerError::Forbidden(_))
        ));
        assert!(matches!(
            check_sellable(owner, InventoryStatus::Sold, owner),
            Err(LedgerError::InvalidState(_))
        ));
    }

    #[test]
    fn test_ensure_owned() {
        let owner = Uuid::new_v4();
        assert!(ensure_owned("Expense", owner, owner).is_ok());
        assert_eq!(
            ensure_owned("Expense", owner, Uuid::new_v4()).unwrap_err(),
            LedgerError::Forbidden("Expense")
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for positive money amounts
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 100000.00
    }

    /// Strategy for positive weights in carats
    fn weight_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 3)) // 0.001 to 100.000
    }

    fn status_strategy() -> impl Strategy<Value = InventoryStatus> {
        prop_oneof![
            Just(InventoryStatus::Available),
            Just(InventoryStatus::Sold),
            Just(InventoryStatus::Reserved),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// An item created from a purchase always starts available at the
        /// purchase amount
        #[test]
        fn prop_purchase_item_mirrors_amount(amount in amount_strategy(), weight in weight_strategy()) {
            let mut record = purchase("1");
            record.amount = amount;

            let item = draft_from_purchase(&record, GradingInfo {
                gem_name: "Tourmaline".to_string(),
                weight,
                ..Default::default()
            }).unwrap();

            prop_assert_eq!(item.status, InventoryStatus::Available);
            prop_assert_eq!(item.purchase_price, amount);
            prop_assert_eq!(item.current_value, amount);
            prop_assert_eq!(item.quantity, 1);
        }

        /// Only an available item can be sold, and only into `sold`
        #[test]
        fn prop_only_available_sells(status in status_strategy(), amount in amount_strategy()) {
            let result = transition(status, LifecycleEvent::Sold { amount });
            match status {
                InventoryStatus::Available => prop_assert_eq!(result.unwrap(), InventoryStatus::Sold),
                _ => prop_assert!(matches!(result, Err(LedgerError::InvalidState(_)))),
            }
        }

        /// Amounts with sub-cent digits never reach the database
        #[test]
        fn prop_sub_cent_amounts_rejected(cents in 1i64..=10_000_000i64, extra in 1i64..=9i64) {
            let amount = Decimal::new(cents * 10 + extra, 3);
            let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
            let result = NewExpense::new(Uuid::new_v4(), Uuid::new_v4(), amount, day, None, None);
            prop_assert!(result.is_err());
        }

        /// A second sale of the same item always fails
        #[test]
        fn prop_second_sale_fails(first in amount_strategy(), second in amount_strategy()) {
            let sold = transition(InventoryStatus::Available, LifecycleEvent::Sold { amount: first }).unwrap();
            let second_sale = LifecycleEvent::Sold { amount: second };
            prop_assert!(transition(sold, second_sale).is_err());
        }
    }
}
