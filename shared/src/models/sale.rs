//! Sale models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::validation::{optional_text, validate_positive_amount};

/// A disposal event. At most one per inventory item in practice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub inventory_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub buyer: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub owner_id: Uuid,
    pub inventory_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub buyer: Option<String>,
    pub description: Option<String>,
}

impl NewSale {
    pub fn new(
        owner_id: Uuid,
        inventory_id: Uuid,
        amount: Decimal,
        date: NaiveDate,
        buyer: Option<&str>,
        description: Option<&str>,
    ) -> LedgerResult<Self> {
        validate_positive_amount("amount", amount)?;
        Ok(Self {
            owner_id,
            inventory_id,
            amount,
            date,
            buyer: optional_text(buyer),
            description: optional_text(description),
        })
    }
}
