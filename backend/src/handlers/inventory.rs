//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{
    parse_decimal, parse_quantity, parse_uuid, ImageAttachment, InventoryFields, InventoryFilter,
    InventoryStatus, Page, UnverifiedPurchaseRef,
};
use uuid::Uuid;

use super::extract::{optional_decimal, pagination, AppPath, AppQuery};
use super::purchase::grading_from;
use super::upload::UploadForm;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::inventory::{InventoryDetail, InventoryListItem, InventoryWithImages};
use crate::services::InventoryService;
use crate::AppState;

/// Inventory list query. Values stay strings so a bad number is reported
/// against the field that carried it.
#[derive(Debug, Deserialize)]
pub struct InventoryQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub gem_name: Option<String>,
    pub weight_min: Option<String>,
    pub weight_max: Option<String>,
    pub color: Option<String>,
    pub status: Option<String>,
}

impl InventoryQuery {
    fn filter(&self) -> AppResult<InventoryFilter> {
        let status = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<InventoryStatus>()?),
            None => None,
        };

        Ok(InventoryFilter {
            gem_name: self.gem_name.clone(),
            weight_min: optional_decimal("weight_min", self.weight_min.as_deref())?,
            weight_max: optional_decimal("weight_max", self.weight_max.as_deref())?,
            color: self.color.clone(),
            status,
        })
    }
}

fn fields_from(form: &UploadForm) -> AppResult<InventoryFields> {
    Ok(InventoryFields {
        gem_name: form.required("gem_name")?.to_string(),
        weight: parse_decimal("weight", form.required("weight")?)?,
        grading: grading_from(form),
        purchase_price: parse_decimal("purchase_price", form.required("purchase_price")?)?,
        current_value: form
            .non_blank("current_value")
            .map(|raw| parse_decimal("current_value", raw))
            .transpose()?,
        quantity: form
            .non_blank("quantity")
            .map(|raw| parse_quantity("quantity", raw))
            .transpose()?,
        description: form.text("description").map(str::to_string),
        purchase_ref: form
            .non_blank("purchase_id")
            .map(|raw| parse_uuid("purchase_id", raw).map(UnverifiedPurchaseRef::new))
            .transpose()?,
    })
}

/// Create an inventory item directly (multipart, with optional images)
pub async fn create_inventory_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<InventoryWithImages>)> {
    let form = UploadForm::read(multipart, &state.config.uploads).await?;
    let fields = fields_from(&form)?;

    let service = InventoryService::new(state.db, state.attachments);
    let created = service
        .create_standalone(current_user.owner_id(), fields, &form.files)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List inventory items with filters
pub async fn list_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppQuery(query): AppQuery<InventoryQuery>,
) -> AppResult<Json<Page<InventoryListItem>>> {
    let filter = query.filter()?;
    let pagination = pagination(query.page.as_deref(), query.limit.as_deref())?;

    let service = InventoryService::new(state.db, state.attachments);
    let page = service.list(current_user.owner_id(), filter, pagination).await?;
    Ok(Json(page))
}

/// Get one item with its full history
pub async fn get_inventory_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(item_id): AppPath<Uuid>,
) -> AppResult<Json<InventoryDetail>> {
    let service = InventoryService::new(state.db, state.attachments);
    let detail = service.get_detail(current_user.owner_id(), item_id).await?;
    Ok(Json(detail))
}

/// Attach more images to an item
pub async fn upload_inventory_images(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(item_id): AppPath<Uuid>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Vec<ImageAttachment>>)> {
    let form = UploadForm::read(multipart, &state.config.uploads).await?;

    let service = InventoryService::new(state.db, state.attachments);
    let images = service
        .add_images(current_user.owner_id(), item_id, &form.files)
        .await?;
    Ok((StatusCode::CREATED, Json(images)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn query() -> InventoryQuery {
        InventoryQuery {
            page: None,
            limit: None,
            gem_name: None,
            weight_min: None,
            weight_max: None,
            color: None,
            status: None,
        }
    }

    #[test]
    fn test_query_builds_filter() {
        let filter = InventoryQuery {
            gem_name: Some("sapphire".to_string()),
            weight_min: Some("1.5".to_string()),
            status: Some("available".to_string()),
            ..query()
        }
        .filter()
        .unwrap();

        assert_eq!(filter.gem_name.as_deref(), Some("sapphire"));
        assert_eq!(filter.weight_min, Some(Decimal::new(15, 1)));
        assert_eq!(filter.weight_max, None);
        assert_eq!(filter.status, Some(InventoryStatus::Available));
    }

    #[test]
    fn test_query_rejects_bad_values() {
        let bad_weight = InventoryQuery {
            weight_max: Some("big".to_string()),
            ..query()
        };
        assert!(bad_weight.filter().is_err());

        let bad_status = InventoryQuery {
            status: Some("lost".to_string()),
            ..query()
        };
        assert!(bad_status.filter().is_err());
    }
}
