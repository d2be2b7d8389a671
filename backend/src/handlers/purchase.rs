//! HTTP handlers for purchase endpoints

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use shared::{parse_date, parse_decimal, GradingAttributes, GradingInfo, NewPurchase, Page, PurchaseRecord};
use uuid::Uuid;

use super::extract::{pagination, AppPath, AppQuery};
use super::upload::UploadForm;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::purchase::{CreatedPurchase, PurchaseDetail};
use crate::services::PurchaseService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Grading attributes shared by the purchase and standalone item forms
pub(crate) fn grading_from(form: &UploadForm) -> GradingAttributes {
    GradingAttributes {
        color: form.text("color").map(str::to_string),
        clarity: form.text("clarity").map(str::to_string),
        cut: form.text("cut").map(str::to_string),
        shape: form.text("shape").map(str::to_string),
        origin: form.text("origin").map(str::to_string),
    }
    .normalized()
}

/// Record a purchase (multipart, with optional images) and create its item
pub async fn create_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<CreatedPurchase>)> {
    let form = UploadForm::read(multipart, &state.config.uploads).await?;

    let gem_name = form.required("gem_name")?;
    let amount = parse_decimal("amount", form.required("amount")?)?;
    let weight = parse_decimal("weight", form.required("weight")?)?;
    let date = match form.non_blank("date") {
        Some(raw) => parse_date("date", raw)?,
        None => Utc::now().date_naive(),
    };

    let purchase = NewPurchase::new(
        current_user.owner_id(),
        gem_name,
        form.text("purchase_description"),
        amount,
        date,
        form.text("vendor"),
    )?;

    let grading = GradingInfo {
        gem_name: gem_name.to_string(),
        weight,
        grading: grading_from(&form),
        description: form.text("description").map(str::to_string),
    };

    let service = PurchaseService::new(state.db, state.attachments);
    let created = service.create_with_item(purchase, grading, &form.files).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List purchases
pub async fn list_purchases(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Page<PurchaseRecord>>> {
    let pagination = pagination(query.page.as_deref(), query.limit.as_deref())?;
    let service = PurchaseService::new(state.db, state.attachments);
    let page = service.list(current_user.owner_id(), pagination).await?;
    Ok(Json(page))
}

/// Get one purchase
pub async fn get_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(purchase_id): AppPath<Uuid>,
) -> AppResult<Json<PurchaseDetail>> {
    let service = PurchaseService::new(state.db, state.attachments);
    let purchase = service.get(current_user.owner_id(), purchase_id).await?;
    Ok(Json(purchase))
}
