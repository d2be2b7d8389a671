//! HTTP handlers for expense endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use shared::{parse_uuid, ExpenseRecord, Page};
use validator::Validate;

use super::extract::{pagination, AppJson, AppQuery};
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::expense::CreateExpenseInput;
use crate::services::ExpenseService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    pub inventory_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Record an expense against an item
pub async fn create_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<CreateExpenseInput>,
) -> AppResult<(StatusCode, Json<ExpenseRecord>)> {
    input.validate()?;
    let service = ExpenseService::new(state.db);
    let expense = service.create(current_user.owner_id(), input).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// List expenses, optionally for one item
pub async fn list_expenses(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppQuery(query): AppQuery<ExpenseQuery>,
) -> AppResult<Json<Page<ExpenseRecord>>> {
    let inventory_id = query
        .inventory_id
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_uuid("inventory_id", raw))
        .transpose()?;
    let pagination = pagination(query.page.as_deref(), query.limit.as_deref())?;

    let service = ExpenseService::new(state.db);
    let page = service
        .list(current_user.owner_id(), inventory_id, pagination)
        .await?;
    Ok(Json(page))
}
