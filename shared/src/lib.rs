//! Shared domain types and rules for the Gem Business Ledger
//!
//! This crate holds everything about the ledger that does not need a database:
//! the entity models, the inventory lifecycle, cost and profit rollups, derived
//! status resolution, input coercion and pagination. The backend crate wires
//! these rules to PostgreSQL and HTTP.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
