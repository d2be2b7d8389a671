//! Expense models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::validation::{optional_text, validate_positive_amount};

/// A cost incurred against an inventory item after acquisition
/// (cutting, certification, ...). Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub inventory_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub owner_id: Uuid,
    pub inventory_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl NewExpense {
    pub fn new(
        owner_id: Uuid,
        inventory_id: Uuid,
        amount: Decimal,
        date: NaiveDate,
        category: Option<&str>,
        description: Option<&str>,
    ) -> LedgerResult<Self> {
        validate_positive_amount("amount", amount)?;
        Ok(Self {
            owner_id,
            inventory_id,
            amount,
            date,
            category: optional_text(category),
            description: optional_text(description),
        })
    }
}
