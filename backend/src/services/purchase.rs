//! Purchase service
//!
//! Creating a purchase also materializes its inventory item. The purchase
//! row, the item row and the image rows commit in one transaction.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    draft_from_purchase, ensure_owned, validate_grading_info, GradingInfo, ImageAttachment,
    InventoryItem, NewPurchase, Page, Pagination, PurchaseRecord,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::attachment::insert_images;
use super::inventory::insert_item;
use crate::error::{AppError, AppResult};
use crate::external::attachment_store::with_attachments;
use crate::external::{AttachmentStore, UploadedFile};

/// Purchase service
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
    attachments: Arc<dyn AttachmentStore>,
}

/// Result of creating a purchase
#[derive(Debug, Serialize)]
pub struct CreatedPurchase {
    #[serde(flatten)]
    pub purchase: PurchaseRecord,
    pub inventory_id: Uuid,
    pub inventory: InventoryItem,
    pub images: Vec<ImageAttachment>,
}

/// A purchase and the item it produced, if that item still exists
#[derive(Debug, Serialize)]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: PurchaseRecord,
    pub inventory_id: Option<Uuid>,
}

const PURCHASE_COLUMNS: &str = "id, owner_id, description, amount, date, vendor, created_at";

#[derive(Debug, FromRow)]
struct PurchaseRow {
    id: Uuid,
    owner_id: Uuid,
    description: String,
    amount: Decimal,
    date: NaiveDate,
    vendor: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PurchaseRow> for PurchaseRecord {
    fn from(row: PurchaseRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            description: row.description,
            amount: row.amount,
            date: row.date,
            vendor: row.vendor,
            created_at: row.created_at,
        }
    }
}

async fn insert_purchase(conn: &mut PgConnection, purchase: &NewPurchase) -> AppResult<PurchaseRecord> {
    let row = sqlx::query_as::<_, PurchaseRow>(&format!(
        r#"
        INSERT INTO purchases (owner_id, description, amount, date, vendor)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        PURCHASE_COLUMNS
    ))
    .bind(purchase.owner_id)
    .bind(&purchase.description)
    .bind(purchase.amount)
    .bind(purchase.date)
    .bind(&purchase.vendor)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

impl PurchaseService {
    pub fn new(db: PgPool, attachments: Arc<dyn AttachmentStore>) -> Self {
        Self { db, attachments }
    }

    /// Record a purchase and create its inventory item.
    ///
    /// Everything is validated before any image reaches the store. If the
    /// database write fails afterwards the stored images are removed.
    pub async fn create_with_item(
        &self,
        purchase: NewPurchase,
        grading: GradingInfo,
        uploads: &[UploadedFile],
    ) -> AppResult<CreatedPurchase> {
        validate_grading_info(&grading)?;

        let created = with_attachments(self.attachments.as_ref(), uploads, |files| async move {
            let mut tx = self.db.begin().await?;
            let record = insert_purchase(&mut tx, &purchase).await?;
            let draft = draft_from_purchase(&record, grading)?;
            let item = insert_item(&mut tx, &draft).await?;
            let images = insert_images(&mut tx, item.id, item.owner_id, &files).await?;
            tx.commit().await?;

            Ok(CreatedPurchase {
                inventory_id: item.id,
                purchase: record,
                inventory: item,
                images,
            })
        })
        .await?;

        tracing::info!(
            "Recorded purchase {} ({}) creating inventory item {}",
            created.purchase.id,
            created.purchase.amount,
            created.inventory_id
        );

        Ok(created)
    }

    /// Purchases newest first
    pub async fn list(&self, owner_id: Uuid, pagination: Pagination) -> AppResult<Page<PurchaseRecord>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM purchases WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {} FROM purchases WHERE owner_id = $1 \
             ORDER BY date DESC, created_at DESC LIMIT $2 OFFSET $3",
            PURCHASE_COLUMNS
        ))
        .bind(owner_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            total,
            pagination,
        ))
    }

    /// One purchase with the id of the item it created
    pub async fn get(&self, owner_id: Uuid, purchase_id: Uuid) -> AppResult<PurchaseDetail> {
        let purchase: PurchaseRecord = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {} FROM purchases WHERE id = $1",
            PURCHASE_COLUMNS
        ))
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?
        .into();

        ensure_owned("Purchase", purchase.owner_id, owner_id)?;

        let inventory_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM inventory_items WHERE purchase_id = $1 AND owner_id = $2 ORDER BY created_at LIMIT 1",
        )
        .bind(purchase.id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(PurchaseDetail {
            purchase,
            inventory_id,
        })
    }
}
