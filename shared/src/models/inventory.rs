//! Inventory item models

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::validation::optional_text;

/// Raw lifecycle status of an inventory item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    Available,
    Sold,
    /// Present in the schema, but nothing transitions into it yet
    Reserved,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Available => "available",
            InventoryStatus::Sold => "sold",
            InventoryStatus::Reserved => "reserved",
        }
    }
}

impl FromStr for InventoryStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(InventoryStatus::Available),
            "sold" => Ok(InventoryStatus::Sold),
            "reserved" => Ok(InventoryStatus::Reserved),
            other => Err(LedgerError::validation(
                "status",
                format!("unknown inventory status '{}'", other),
            )),
        }
    }
}

impl std::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional grading attributes of a stone
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradingAttributes {
    pub color: Option<String>,
    pub clarity: Option<String>,
    pub cut: Option<String>,
    pub shape: Option<String>,
    pub origin: Option<String>,
}

impl GradingAttributes {
    /// Trim every attribute and drop blank ones
    pub fn normalized(self) -> Self {
        Self {
            color: optional_text(self.color.as_deref()),
            clarity: optional_text(self.clarity.as_deref()),
            cut: optional_text(self.cut.as_deref()),
            shape: optional_text(self.shape.as_deref()),
            origin: optional_text(self.origin.as_deref()),
        }
    }
}

/// A purchase id supplied by the caller that has not been checked against the
/// purchases table. Standalone items may carry one; nothing guarantees the
/// purchase exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct UnverifiedPurchaseRef(Uuid);

impl UnverifiedPurchaseRef {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

/// A unit (or quantity-grouped lot) of gem stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub gem_name: String,
    /// Carats
    pub weight: Decimal,
    #[serde(flatten)]
    pub grading: GradingAttributes,
    pub purchase_price: Decimal,
    pub current_value: Decimal,
    pub quantity: i32,
    pub description: Option<String>,
    pub status: InventoryStatus,
    pub purchase_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a standalone inventory item
#[derive(Debug, Clone, Default)]
pub struct InventoryFields {
    pub gem_name: String,
    pub weight: Decimal,
    pub grading: GradingAttributes,
    pub purchase_price: Decimal,
    pub current_value: Option<Decimal>,
    pub quantity: Option<i32>,
    pub description: Option<String>,
    pub purchase_ref: Option<UnverifiedPurchaseRef>,
}

/// Grading information captured alongside a purchase
#[derive(Debug, Clone, Default)]
pub struct GradingInfo {
    pub gem_name: String,
    pub weight: Decimal,
    pub grading: GradingAttributes,
    pub description: Option<String>,
}

/// A validated inventory item ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryItem {
    pub owner_id: Uuid,
    pub gem_name: String,
    pub weight: Decimal,
    pub grading: GradingAttributes,
    pub purchase_price: Decimal,
    pub current_value: Decimal,
    pub quantity: i32,
    pub description: Option<String>,
    pub status: InventoryStatus,
    /// Set from a persisted purchase when created through the purchase flow
    pub purchase_id: Option<Uuid>,
}

/// Filters accepted by the inventory list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryFilter {
    /// Case-insensitive substring match
    pub gem_name: Option<String>,
    pub weight_min: Option<Decimal>,
    pub weight_max: Option<Decimal>,
    /// Case-insensitive substring match
    pub color: Option<String>,
    pub status: Option<InventoryStatus>,
}

impl InventoryFilter {
    /// Trim text filters and drop blank ones so that `?gem_name=` does not
    /// turn into a match-everything pattern with a different shape
    pub fn normalized(self) -> Self {
        Self {
            gem_name: optional_text(self.gem_name.as_deref()),
            color: optional_text(self.color.as_deref()),
            ..self
        }
    }

    /// Whether an item satisfies the filter. Mirrors the SQL predicate used
    /// by the repository.
    pub fn matches(&self, item: &InventoryItem) -> bool {
        let contains = |haystack: Option<&str>, needle: &Option<String>| match needle {
            Some(needle) => haystack
                .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            None => true,
        };

        contains(Some(&item.gem_name), &self.gem_name)
            && contains(item.grading.color.as_deref(), &self.color)
            && self.weight_min.map_or(true, |min| item.weight >= min)
            && self.weight_max.map_or(true, |max| item.weight <= max)
            && self.status.map_or(true, |status| item.status == status)
    }
}

/// Escape `%`, `_` and `\` so user input is matched literally in `ILIKE`
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
