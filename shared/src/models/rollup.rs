//! Cost and profit rollups
//!
//! Nothing here is persisted: totals are recomputed from the raw expense and
//! sale rows on every read.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sum of expense amounts. Zero for no expenses.
pub fn expenses_total<'a, I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = &'a Decimal>,
{
    amounts.into_iter().copied().sum()
}

/// Purchase price plus all accumulated expenses
pub fn cost_of_ownership(purchase_price: Decimal, expenses_total: Decimal) -> Decimal {
    purchase_price + expenses_total
}

pub fn net_profit(sale_amount: Decimal, cost_of_ownership: Decimal) -> Decimal {
    sale_amount - cost_of_ownership
}

/// Net profit as a percentage of cost, rounded to two places.
/// Zero when there is no cost to divide by.
pub fn profit_margin_percent(net_profit: Decimal, cost_of_ownership: Decimal) -> Decimal {
    if cost_of_ownership <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (net_profit / cost_of_ownership * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Profit figures for a single sale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleProfit {
    pub expenses_total: Decimal,
    pub cost_of_ownership: Decimal,
    pub net_profit: Decimal,
    pub profit_margin_percent: Decimal,
}

impl SaleProfit {
    pub fn compute(sale_amount: Decimal, purchase_price: Decimal, expenses_total: Decimal) -> Self {
        let cost = cost_of_ownership(purchase_price, expenses_total);
        let profit = net_profit(sale_amount, cost);
        Self {
            expenses_total,
            cost_of_ownership: cost,
            net_profit: profit,
            profit_margin_percent: profit_margin_percent(profit, cost),
        }
    }
}

/// Per-item expense totals as returned by one grouped query. Items with no
/// expenses are absent from the map and read as zero.
#[derive(Debug, Clone, Default)]
pub struct ExpenseTotals(HashMap<Uuid, Decimal>);

impl ExpenseTotals {
    pub fn get(&self, inventory_id: &Uuid) -> Decimal {
        self.0.get(inventory_id).copied().unwrap_or(Decimal::ZERO)
    }
}

impl FromIterator<(Uuid, Decimal)> for ExpenseTotals {
    fn from_iter<T: IntoIterator<Item = (Uuid, Decimal)>>(iter: T) -> Self {
        let mut totals = HashMap::new();
        for (id, amount) in iter {
            *totals.entry(id).or_insert(Decimal::ZERO) += amount;
        }
        Self(totals)
    }
}
