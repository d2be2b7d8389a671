//! HTTP handlers for sale endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use shared::{Page, SaleRecord};
use uuid::Uuid;
use validator::Validate;

use super::extract::{pagination, AppJson, AppPath, AppQuery};
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{CreateSaleInput, SaleView};
use crate::services::SaleService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Sell an available item
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<CreateSaleInput>,
) -> AppResult<(StatusCode, Json<SaleRecord>)> {
    input.validate()?;
    let service = SaleService::new(state.db);
    let sale = service.record_sale(current_user.owner_id(), input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// List sales with their profit
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Page<SaleView>>> {
    let pagination = pagination(query.page.as_deref(), query.limit.as_deref())?;
    let service = SaleService::new(state.db);
    let page = service.list(current_user.owner_id(), pagination).await?;
    Ok(Json(page))
}

/// Get one sale with its profit
pub async fn get_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(sale_id): AppPath<Uuid>,
) -> AppResult<Json<SaleView>> {
    let service = SaleService::new(state.db);
    let sale = service.get(current_user.owner_id(), sale_id).await?;
    Ok(Json(sale))
}
