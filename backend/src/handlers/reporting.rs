//! Reporting handlers for the business summary

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::extract::AppQuery;
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::ReportingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

/// Business summary for the caller
pub async fn get_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppQuery(query): AppQuery<ReportQuery>,
) -> AppResult<Response> {
    let format = query.format.as_deref().unwrap_or("json");
    if format != "json" && format != "csv" {
        return Err(AppError::validation("format", "format must be json or csv"));
    }

    let service = ReportingService::new(state.db);
    let report = service.summary(current_user.owner_id()).await;

    if format == "csv" {
        let csv = ReportingService::export_to_csv(&[report])?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"summary.csv\""),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(report).into_response())
    }
}
