//! Extractors that reject with the ledger's error shape instead of axum's
//! plain-text rejections

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use shared::{parse_decimal, Pagination};

use crate::error::{AppError, AppResult};

/// JSON body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation("id", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation("query", rejection.body_text())
    }
}

/// Parse `page` / `limit` query values
pub fn pagination(page: Option<&str>, limit: Option<&str>) -> AppResult<Pagination> {
    Ok(Pagination::new(
        parse_count("page", page)?,
        parse_count("limit", limit)?,
    ))
}

fn parse_count(field: &str, raw: Option<&str>) -> AppResult<Option<u32>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<u32>().map(Some).map_err(|_| {
            AppError::validation(field, format!("{} must be a non-negative whole number", field))
        }),
    }
}

/// Parse an optional decimal query value
pub fn optional_decimal(field: &str, raw: Option<&str>) -> AppResult<Option<rust_decimal::Decimal>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => Ok(Some(parse_decimal(field, value)?)),
    }
}
