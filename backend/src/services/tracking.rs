//! Tracking service for consignment, processing and note engagements

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use shared::{
    complete_tracking, ensure_owned, NewTracking, Page, Pagination, TrackingAction, TrackingInput,
    TrackingRecord, TrackingSnapshot, TrackingStatus,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::decode_stored;
use super::inventory::load_owned_item;
use crate::error::{AppError, AppResult};

/// Tracking service
#[derive(Clone)]
pub struct TrackingService {
    db: PgPool,
}

/// Input for starting (or logging) an engagement
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTrackingInput {
    pub inventory_id: Uuid,
    pub action_type: TrackingAction,
    #[validate(length(max = 200, message = "party is too long"))]
    pub party: Option<String>,
    pub status: Option<TrackingStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 4000, message = "notes are too long"))]
    pub notes: Option<String>,
}

/// Input for completing an engagement
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTrackingInput {
    pub status: TrackingStatus,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 4000, message = "notes are too long"))]
    pub notes: Option<String>,
}

/// Filters for the tracking list
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackingFilter {
    pub inventory_id: Option<Uuid>,
    pub status: Option<TrackingStatus>,
}

const TRACKING_COLUMNS: &str = "id, owner_id, inventory_id, action_type, party, status, \
     start_date, end_date, notes, created_at, updated_at";

#[derive(Debug, FromRow)]
struct TrackingRow {
    id: Uuid,
    owner_id: Uuid,
    inventory_id: Uuid,
    action_type: String,
    party: Option<String>,
    status: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TrackingRow {
    fn into_record(self) -> AppResult<TrackingRecord> {
        Ok(TrackingRecord {
            action_type: decode_stored("action_type", &self.action_type)?,
            status: decode_stored("status", &self.status)?,
            id: self.id,
            owner_id: self.owner_id,
            inventory_id: self.inventory_id,
            party: self.party,
            start_date: self.start_date,
            end_date: self.end_date,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_records(rows: Vec<TrackingRow>) -> AppResult<Vec<TrackingRecord>> {
    rows.into_iter().map(TrackingRow::into_record).collect()
}

/// Ongoing engagements for a page of items, in one query
pub(crate) async fn ongoing_for(db: &PgPool, inventory_ids: &[Uuid]) -> AppResult<Vec<TrackingSnapshot>> {
    if inventory_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, TrackingRow>(&format!(
        "SELECT {} FROM tracking_records WHERE inventory_id = ANY($1) AND status = 'ongoing'",
        TRACKING_COLUMNS
    ))
    .bind(inventory_ids)
    .fetch_all(db)
    .await?;

    Ok(into_records(rows)?.iter().map(TrackingSnapshot::from).collect())
}

/// Full tracking history of one item, most recent first
pub(crate) async fn tracking_for_item(db: &PgPool, inventory_id: Uuid) -> AppResult<Vec<TrackingRecord>> {
    let rows = sqlx::query_as::<_, TrackingRow>(&format!(
        "SELECT {} FROM tracking_records WHERE inventory_id = $1 \
         ORDER BY start_date DESC, created_at DESC, id DESC",
        TRACKING_COLUMNS
    ))
    .bind(inventory_id)
    .fetch_all(db)
    .await?;

    into_records(rows)
}

impl TrackingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Start an engagement on an owned item. Several may be ongoing at once.
    pub async fn create(&self, owner_id: Uuid, input: CreateTrackingInput) -> AppResult<TrackingRecord> {
        let item = load_owned_item(&self.db, input.inventory_id, owner_id).await?;

        let tracking = NewTracking::new(
            owner_id,
            item.id,
            TrackingInput {
                action_type: input.action_type,
                party: input.party.as_deref(),
                status: input.status,
                start_date: input.start_date,
                end_date: input.end_date,
                notes: input.notes.as_deref(),
            },
            Utc::now().date_naive(),
        )?;

        let row = sqlx::query_as::<_, TrackingRow>(&format!(
            r#"
            INSERT INTO tracking_records (
                owner_id, inventory_id, action_type, party, status, start_date, end_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TRACKING_COLUMNS
        ))
        .bind(tracking.owner_id)
        .bind(tracking.inventory_id)
        .bind(tracking.action_type.as_str())
        .bind(&tracking.party)
        .bind(tracking.status.as_str())
        .bind(tracking.start_date)
        .bind(tracking.end_date)
        .bind(&tracking.notes)
        .fetch_one(&self.db)
        .await?;

        let record = row.into_record()?;
        tracing::info!(
            "Started {} tracking {} on item {} ({})",
            record.action_type.as_str(),
            record.id,
            record.inventory_id,
            record.status.as_str()
        );
        Ok(record)
    }

    /// Complete an ongoing engagement
    pub async fn complete(
        &self,
        owner_id: Uuid,
        tracking_id: Uuid,
        input: UpdateTrackingInput,
    ) -> AppResult<TrackingRecord> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, TrackingRow>(&format!(
            "SELECT {} FROM tracking_records WHERE id = $1 FOR UPDATE",
            TRACKING_COLUMNS
        ))
        .bind(tracking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Tracking record".to_string()))?
        .into_record()?;

        ensure_owned("Tracking record", current.owner_id, owner_id)?;

        let completion = complete_tracking(
            &current,
            input.status,
            input.end_date,
            input.notes.as_deref(),
            Utc::now().date_naive(),
        )?;

        let row = sqlx::query_as::<_, TrackingRow>(&format!(
            r#"
            UPDATE tracking_records
            SET status = 'completed', end_date = $2, notes = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TRACKING_COLUMNS
        ))
        .bind(tracking_id)
        .bind(completion.end_date)
        .bind(&completion.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Completed tracking {} on item {}", row.id, row.inventory_id);
        row.into_record()
    }

    /// List engagements, optionally for one item and/or one status
    pub async fn list(
        &self,
        owner_id: Uuid,
        filter: TrackingFilter,
        pagination: Pagination,
    ) -> AppResult<Page<TrackingRecord>> {
        if let Some(inventory_id) = filter.inventory_id {
            load_owned_item(&self.db, inventory_id, owner_id).await?;
        }
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tracking_records
            WHERE owner_id = $1
              AND ($2::uuid IS NULL OR inventory_id = $2)
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(owner_id)
        .bind(filter.inventory_id)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, TrackingRow>(&format!(
            r#"
            SELECT {} FROM tracking_records
            WHERE owner_id = $1
              AND ($2::uuid IS NULL OR inventory_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY start_date DESC, created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
            TRACKING_COLUMNS
        ))
        .bind(owner_id)
        .bind(filter.inventory_id)
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(into_records(rows)?, total, pagination))
    }
}
