//! Business logic services for the Gem Business Ledger
//!
//! Services own the SQL. Rules that do not need the database live in the
//! `shared` crate and are called from here.

use std::str::FromStr;

use shared::LedgerError;

use crate::error::{AppError, AppResult};

pub mod attachment;
pub mod expense;
pub mod inventory;
pub mod purchase;
pub mod reporting;
pub mod sale;
pub mod tracking;

#[cfg(test)]
pub(crate) mod fixtures;

pub use expense::ExpenseService;
pub use inventory::InventoryService;
pub use purchase::PurchaseService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use tracking::TrackingService;

/// Decode an enum stored as text. A bad value here is a corrupt row, not
/// bad input, so it maps to an internal error.
pub(crate) fn decode_stored<T>(column: &str, raw: &str) -> AppResult<T>
where
    T: FromStr<Err = LedgerError>,
{
    raw.parse::<T>()
        .map_err(|_| AppError::Internal(format!("unexpected {} value '{}' in database", column, raw)))
}
