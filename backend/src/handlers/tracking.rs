//! HTTP handlers for tracking endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use shared::{parse_uuid, Page, TrackingRecord, TrackingStatus};
use uuid::Uuid;
use validator::Validate;

use super::extract::{pagination, AppJson, AppPath, AppQuery};
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::tracking::{CreateTrackingInput, TrackingFilter, UpdateTrackingInput};
use crate::services::TrackingService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TrackingQuery {
    pub inventory_id: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl TrackingQuery {
    fn filter(&self) -> AppResult<TrackingFilter> {
        let present = |raw: &Option<String>| {
            raw.as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Ok(TrackingFilter {
            inventory_id: present(&self.inventory_id)
                .map(|raw| parse_uuid("inventory_id", &raw))
                .transpose()?,
            status: present(&self.status)
                .map(|raw| raw.parse::<TrackingStatus>())
                .transpose()?,
        })
    }
}

/// Start a tracking engagement
pub async fn create_tracking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<CreateTrackingInput>,
) -> AppResult<(StatusCode, Json<TrackingRecord>)> {
    input.validate()?;
    let service = TrackingService::new(state.db);
    let record = service.create(current_user.owner_id(), input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Complete a tracking engagement
pub async fn update_tracking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(tracking_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateTrackingInput>,
) -> AppResult<Json<TrackingRecord>> {
    input.validate()?;
    let service = TrackingService::new(state.db);
    let record = service
        .complete(current_user.owner_id(), tracking_id, input)
        .await?;
    Ok(Json(record))
}

/// List tracking engagements
pub async fn list_tracking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppQuery(query): AppQuery<TrackingQuery>,
) -> AppResult<Json<Page<TrackingRecord>>> {
    let filter = query.filter()?;
    let pagination = pagination(query.page.as_deref(), query.limit.as_deref())?;

    let service = TrackingService::new(state.db);
    let page = service
        .list(current_user.owner_id(), filter, pagination)
        .await?;
    Ok(Json(page))
}
