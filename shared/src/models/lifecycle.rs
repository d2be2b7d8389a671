//! Inventory lifecycle rules
//!
//! ```text
//! (purchase | standalone) --> available --sale--> sold
//! ```
//!
//! `sold` is terminal. `reserved` is a valid status value but no event leads
//! into it; a reservation feature has to add its own event here.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::inventory::{
    GradingInfo, InventoryFields, InventoryStatus, NewInventoryItem,
};
use super::purchase::PurchaseRecord;
use crate::error::{LedgerError, LedgerResult};
use crate::validation::{
    optional_text, require_text, validate_non_negative, validate_quantity, validate_weight,
};

/// Events that move an item between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Sold { amount: Decimal },
}

impl LifecycleEvent {
    /// Value the item carries after the event
    pub fn current_value(&self) -> Decimal {
        match self {
            LifecycleEvent::Sold { amount } => *amount,
        }
    }
}

/// Apply an event to a status, returning the next status
pub fn transition(current: InventoryStatus, event: LifecycleEvent) -> LedgerResult<InventoryStatus> {
    match (current, event) {
        (InventoryStatus::Available, LifecycleEvent::Sold { .. }) => Ok(InventoryStatus::Sold),
        (InventoryStatus::Sold, LifecycleEvent::Sold { .. }) => Err(LedgerError::InvalidState(
            "inventory item has already been sold".to_string(),
        )),
        (InventoryStatus::Reserved, LifecycleEvent::Sold { .. }) => Err(LedgerError::InvalidState(
            "inventory item is reserved and cannot be sold".to_string(),
        )),
    }
}

/// Reject access to an entity owned by someone else
pub fn ensure_owned(resource: &'static str, owner_id: Uuid, actor_id: Uuid) -> LedgerResult<()> {
    if owner_id != actor_id {
        return Err(LedgerError::Forbidden(resource));
    }
    Ok(())
}

/// Precondition for recording a sale: the actor owns the item and the item is
/// still available. Ownership is checked first so that a foreign item never
/// reveals its status.
pub fn check_sellable(owner_id: Uuid, status: InventoryStatus, actor_id: Uuid) -> LedgerResult<()> {
    ensure_owned("Inventory item", owner_id, actor_id)?;
    transition(status, LifecycleEvent::Sold { amount: Decimal::ZERO }).map(|_| ())
}

fn validate_stone(gem_name: &str, weight: Decimal) -> LedgerResult<String> {
    let gem_name = require_text("gem_name", Some(gem_name))?;
    validate_weight(weight)?;
    Ok(gem_name)
}

/// Validate the grading half of a purchase before anything is written
pub fn validate_grading_info(info: &GradingInfo) -> LedgerResult<()> {
    validate_stone(&info.gem_name, info.weight).map(|_| ())
}

/// Materialize the inventory item for a persisted purchase: quantity 1,
/// available, purchase price and current value equal to the purchase amount.
pub fn draft_from_purchase(purchase: &PurchaseRecord, info: GradingInfo) -> LedgerResult<NewInventoryItem> {
    let gem_name = validate_stone(&info.gem_name, info.weight)?;
    validate_non_negative("purchase_price", purchase.amount)?;

    Ok(NewInventoryItem {
        owner_id: purchase.owner_id,
        gem_name,
        weight: info.weight,
        grading: info.grading.normalized(),
        purchase_price: purchase.amount,
        current_value: purchase.amount,
        quantity: 1,
        description: optional_text(info.description.as_deref()),
        status: InventoryStatus::Available,
        purchase_id: Some(purchase.id),
    })
}

/// Validate a standalone item. The purchase reference, if any, is carried
/// through without an existence check.
pub fn draft_standalone(owner_id: Uuid, fields: InventoryFields) -> LedgerResult<NewInventoryItem> {
    let gem_name = validate_stone(&fields.gem_name, fields.weight)?;
    validate_non_negative("purchase_price", fields.purchase_price)?;

    let current_value = fields.current_value.unwrap_or(fields.purchase_price);
    validate_non_negative("current_value", current_value)?;

    let quantity = fields.quantity.unwrap_or(1);
    validate_quantity("quantity", quantity)?;

    Ok(NewInventoryItem {
        owner_id,
        gem_name,
        weight: fields.weight,
        grading: fields.grading.normalized(),
        purchase_price: fields.purchase_price,
        current_value,
        quantity,
        description: optional_text(fields.description.as_deref()),
        status: InventoryStatus::Available,
        purchase_id: fields.purchase_ref.map(|r| r.id()),
    })
}
