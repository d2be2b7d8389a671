//! Purchase (acquisition) models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::validation::{optional_text, validate_positive_amount};

/// An acquisition event. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub vendor: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated purchase ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchase {
    pub owner_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub vendor: Option<String>,
}

impl NewPurchase {
    /// Validate a purchase. A blank description falls back to
    /// "Purchase of {gem_name}".
    pub fn new(
        owner_id: Uuid,
        gem_name: &str,
        description: Option<&str>,
        amount: Decimal,
        date: NaiveDate,
        vendor: Option<&str>,
    ) -> LedgerResult<Self> {
        validate_positive_amount("amount", amount)?;

        let description = optional_text(description)
            .unwrap_or_else(|| format!("Purchase of {}", gem_name.trim()));

        Ok(Self {
            owner_id,
            description,
            amount,
            date,
            vendor: optional_text(vendor),
        })
    }
}
