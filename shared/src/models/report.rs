//! Business-wide report

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A count and a sum over one entity type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Aggregate {
    pub count: i64,
    pub total: Decimal,
}

impl Aggregate {
    pub const ZERO: Aggregate = Aggregate {
        count: 0,
        total: Decimal::ZERO,
    };
}

/// Per-owner business summary. Every figure is zero when there is no data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BusinessReport {
    pub inventory_count: i64,
    /// Sum of current_value over all items
    pub inventory_value: Decimal,
    pub purchase_count: i64,
    pub purchase_total: Decimal,
    pub sale_count: i64,
    pub sale_total: Decimal,
    pub expense_count: i64,
    pub expense_total: Decimal,
    /// Sum of net profit over every sold item
    pub realized_profit: Decimal,
}

impl BusinessReport {
    pub fn new(
        inventory: Aggregate,
        purchases: Aggregate,
        sales: Aggregate,
        expenses: Aggregate,
        realized_profit: Decimal,
    ) -> Self {
        Self {
            inventory_count: inventory.count,
            inventory_value: inventory.total,
            purchase_count: purchases.count,
            purchase_total: purchases.total,
            sale_count: sales.count,
            sale_total: sales.total,
            expense_count: expenses.count,
            expense_total: expenses.total,
            realized_profit,
        }
    }
}
