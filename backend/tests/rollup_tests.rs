//! Cost and profit rollup tests
//!
//! Includes the full purchase → expense → sale walk-through and the
//! algebraic properties the rollups must keep.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    cost_of_ownership, draft_from_purchase, expenses_total, net_profit, profit_margin_percent,
    transition, Aggregate, BusinessReport, ExpenseTotals, GradingInfo, InventoryStatus,
    LedgerError, LifecycleEvent, NewExpense, NewPurchase, NewSale, PurchaseRecord, SaleProfit,
};
use std::str::FromStr;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Purchase 500, one expense of 25, sold for 800
    #[test]
    fn test_purchase_expense_sale_walkthrough() {
        let owner = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();

        let new_purchase = NewPurchase::new(owner, "Padparadscha", None, dec("500"), day, None).unwrap();
        let purchase = PurchaseRecord {
            id: Uuid::new_v4(),
            owner_id: owner,
            description: new_purchase.description,
            amount: new_purchase.amount,
            date: new_purchase.date,
            vendor: new_purchase.vendor,
            created_at: Utc::now(),
        };

        let item = draft_from_purchase(
            &purchase,
            GradingInfo {
                gem_name: "Padparadscha".to_string(),
                weight: dec("1.8"),
                ..Default::default()
            },
        )
        .unwrap();
        let item_id = Uuid::new_v4();

        let expense = NewExpense::new(owner, item_id, dec("25"), day, Some("certification"), None).unwrap();
        let total = expenses_total([&expense.amount]);
        assert_eq!(total, dec("25"));
        assert_eq!(cost_of_ownership(item.purchase_price, total), dec("525"));

        let sale = NewSale::new(owner, item_id, dec("800"), day, Some("Collector"), None).unwrap();
        let status = transition(item.status, LifecycleEvent::Sold { amount: sale.amount }).unwrap();
        assert_eq!(status, InventoryStatus::Sold);

        let profit = SaleProfit::compute(sale.amount, item.purchase_price, total);
        assert_eq!(profit.net_profit, dec("275"));
        assert_eq!(profit.profit_margin_percent, dec("52.38"));

        // The item is sold now; a second sale must be refused
        let second = transition(status, LifecycleEvent::Sold { amount: dec("900") });
        assert!(matches!(second, Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn test_no_expenses_totals_zero() {
        let none: [Decimal; 0] = [];
        assert_eq!(expenses_total(&none), Decimal::ZERO);
        assert_eq!(ExpenseTotals::default().get(&Uuid::new_v4()), Decimal::ZERO);
    }

    #[test]
    fn test_zero_cost_margin_is_zero() {
        assert_eq!(profit_margin_percent(dec("100"), Decimal::ZERO), Decimal::ZERO);
        let profit = SaleProfit::compute(dec("100"), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(profit.net_profit, dec("100"));
        assert_eq!(profit.profit_margin_percent, Decimal::ZERO);
    }

    #[test]
    fn test_loss_has_negative_margin() {
        let profit = SaleProfit::compute(dec("400"), dec("500"), dec("0"));
        assert_eq!(profit.net_profit, dec("-100"));
        assert_eq!(profit.profit_margin_percent, dec("-20"));
    }

    #[test]
    fn test_expense_totals_group_by_item() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let totals: ExpenseTotals = vec![(a, dec("10")), (b, dec("5")), (a, dec("2.5"))]
            .into_iter()
            .collect();

        assert_eq!(totals.get(&a), dec("12.5"));
        assert_eq!(totals.get(&b), dec("5"));
    }

    #[test]
    fn test_business_report_assembly() {
        let report = BusinessReport::new(
            Aggregate { count: 3, total: dec("2100") },
            Aggregate { count: 2, total: dec("900") },
            Aggregate::ZERO,
            Aggregate { count: 4, total: dec("60") },
            Decimal::ZERO,
        );

        assert_eq!(report.inventory_count, 3);
        assert_eq!(report.inventory_value, dec("2100"));
        assert_eq!(report.purchase_total, dec("900"));
        assert_eq!(report.sale_count, 0);
        assert_eq!(report.sale_total, Decimal::ZERO);
        assert_eq!(report.expense_count, 4);
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

    /// Strategy for non-negative purchase prices
    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The expense total equals the plain sum of the amounts
        #[test]
        fn prop_expenses_total_is_sum(amounts in prop::collection::vec(amount_strategy(), 0..20)) {
            let expected = amounts.iter().fold(Decimal::ZERO, |acc, a| acc + a);
            prop_assert_eq!(expenses_total(&amounts), expected);
        }

        /// Net profit plus cost of ownership gives back the sale amount
        #[test]
        fn prop_profit_identity(
            sale in amount_strategy(),
            price in price_strategy(),
            expenses in prop::collection::vec(amount_strategy(), 0..10)
        ) {
            let total = expenses_total(&expenses);
            let cost = cost_of_ownership(price, total);
            prop_assert_eq!(net_profit(sale, cost) + cost, sale);
        }

        /// Margin is zero when cost is zero and otherwise has the sign of
        /// the profit
        #[test]
        fn prop_margin_sign_matches_profit(sale in amount_strategy(), price in price_strategy()) {
            let profit = SaleProfit::compute(sale, price, Decimal::ZERO);
            if profit.cost_of_ownership == Decimal::ZERO {
                prop_assert_eq!(profit.profit_margin_percent, Decimal::ZERO);
            } else if profit.net_profit > Decimal::ZERO {
                prop_assert!(profit.profit_margin_percent >= Decimal::ZERO);
            } else if profit.net_profit < Decimal::ZERO {
                prop_assert!(profit.profit_margin_percent <= Decimal::ZERO);
            }
            prop_assert!(profit.profit_margin_percent.scale() <= 2);
        }

        /// Grouped totals match per-item sums, and items without rows read zero
        #[test]
        fn prop_grouped_totals_match(
            rows in prop::collection::vec((0usize..4, amount_strategy()), 0..30)
        ) {
            let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
            let totals: ExpenseTotals = rows.iter().map(|(i, amount)| (ids[*i], *amount)).collect();

            for (index, id) in ids.iter().enumerate() {
                let expected = rows
                    .iter()
                    .filter(|(i, _)| *i == index)
                    .fold(Decimal::ZERO, |acc, (_, amount)| acc + amount);
                prop_assert_eq!(totals.get(id), expected);
            }
        }
    }
}
