//! Route definitions for the Gem Business Ledger

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::upload::MAX_FILES_PER_REQUEST;
use crate::{handlers, middleware::auth_middleware, AppState};

/// Headroom on top of the file bytes for the text fields of a form
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(
        state
            .config
            .uploads
            .max_file_bytes
            .saturating_mul(MAX_FILES_PER_REQUEST)
            .saturating_add(FORM_OVERHEAD_BYTES),
    );

    let protected = Router::new()
        .nest("/purchases", purchase_routes())
        .nest("/inventory", inventory_routes())
        .nest("/expenses", expense_routes())
        .nest("/sales", sale_routes())
        .nest("/tracking", tracking_routes())
        .nest("/reports", report_routes())
        .layer(upload_limit)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        .merge(protected)
}

/// Purchase routes (protected)
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_purchases).post(handlers::create_purchase))
        .route("/:purchase_id", get(handlers::get_purchase))
}

/// Inventory routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inventory).post(handlers::create_inventory_item))
        .route("/:item_id", get(handlers::get_inventory_item))
        .route("/:item_id/images", post(handlers::upload_inventory_images))
}

/// Expense routes (protected)
fn expense_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_expenses).post(handlers::create_expense))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/:sale_id", get(handlers::get_sale))
}

/// Tracking routes (protected)
fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tracking).post(handlers::create_tracking))
        .route("/:tracking_id", put(handlers::update_tracking))
}

/// Report routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new().route("/summary", get(handlers::get_summary))
}
