//! Domain models for the Gem Business Ledger

mod attachment;
mod derived_status;
mod expense;
mod inventory;
mod lifecycle;
mod purchase;
mod report;
mod rollup;
mod sale;
mod tracking;

pub use attachment::*;
pub use derived_status::*;
pub use expense::*;
pub use inventory::*;
pub use lifecycle::*;
pub use purchase::*;
pub use report::*;
pub use rollup::*;
pub use sale::*;
pub use tracking::*;
