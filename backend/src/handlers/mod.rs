//! HTTP handlers

pub mod expense;
pub mod extract;
pub mod health;
pub mod inventory;
pub mod purchase;
pub mod reporting;
pub mod sale;
pub mod tracking;
pub mod upload;

pub use expense::{create_expense, list_expenses};
pub use health::health_check;
pub use inventory::{create_inventory_item, get_inventory_item, list_inventory, upload_inventory_images};
pub use purchase::{create_purchase, get_purchase, list_purchases};
pub use reporting::get_summary;
pub use sale::{create_sale, get_sale, list_sales};
pub use tracking::{create_tracking, list_tracking, update_tracking};
