//! Inventory service: item creation, filtered listing and item detail

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    derive_status, draft_standalone, ensure_owned, expenses_total, group_by_inventory,
    latest_ongoing, like_pattern, DerivedStatus, ExpenseRecord, ExpenseTotals, GradingAttributes,
    ImageAttachment, InventoryFields, InventoryFilter, InventoryItem, InventoryStatus,
    NewInventoryItem, Page, Pagination, SaleProfit, SaleRecord, TrackingAction, TrackingRecord,
    TrackingSnapshot, TrackingStatus,
};
use sqlx::{Executor, FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::attachment::{images_for, insert_images};
use super::decode_stored;
use super::expense::{expense_totals, expenses_for_item};
use super::sale::sale_for_item;
use super::tracking::{ongoing_for, tracking_for_item};
use crate::error::{AppError, AppResult};
use crate::external::attachment_store::with_attachments;
use crate::external::{AttachmentStore, UploadedFile};

pub(crate) const INVENTORY_COLUMNS: &str = "id, owner_id, gem_name, weight, color, clarity, cut, \
     shape, origin, purchase_price, current_value, quantity, description, status, purchase_id, \
     created_at, updated_at";

/// Inventory service
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
    attachments: Arc<dyn AttachmentStore>,
}

#[derive(Debug, FromRow)]
pub(crate) struct InventoryRow {
    id: Uuid,
    owner_id: Uuid,
    gem_name: String,
    weight: Decimal,
    color: Option<String>,
    clarity: Option<String>,
    cut: Option<String>,
    shape: Option<String>,
    origin: Option<String>,
    purchase_price: Decimal,
    current_value: Decimal,
    quantity: i32,
    description: Option<String>,
    status: String,
    purchase_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InventoryRow {
    pub(crate) fn into_item(self) -> AppResult<InventoryItem> {
        Ok(InventoryItem {
            status: decode_stored("status", &self.status)?,
            id: self.id,
            owner_id: self.owner_id,
            gem_name: self.gem_name,
            weight: self.weight,
            grading: GradingAttributes {
                color: self.color,
                clarity: self.clarity,
                cut: self.cut,
                shape: self.shape,
                origin: self.origin,
            },
            purchase_price: self.purchase_price,
            current_value: self.current_value,
            quantity: self.quantity,
            description: self.description,
            purchase_id: self.purchase_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A freshly created item with the images stored alongside it
#[derive(Debug, Serialize)]
pub struct InventoryWithImages {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub images: Vec<ImageAttachment>,
}

/// One row of the inventory list
#[derive(Debug, Serialize)]
pub struct InventoryListItem {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub images: Vec<ImageAttachment>,
    pub expenses_total: Decimal,
    pub tracking_action_type: Option<TrackingAction>,
    pub tracking_status: Option<TrackingStatus>,
    pub tracking_start_date: Option<NaiveDate>,
    pub derived_status: DerivedStatus,
}

/// Full history of one item with its rollups
#[derive(Debug, Serialize)]
pub struct InventoryDetail {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub images: Vec<ImageAttachment>,
    pub expenses: Vec<ExpenseRecord>,
    pub sale: Option<SaleRecord>,
    pub tracking: Vec<TrackingRecord>,
    pub expenses_total: Decimal,
    pub cost_of_ownership: Decimal,
    pub net_profit: Option<Decimal>,
    pub profit_margin_percent: Option<Decimal>,
    pub derived_status: DerivedStatus,
}

/// Load an item by id alone, then check it belongs to `owner_id`.
/// Missing is NotFound; someone else's is Forbidden.
pub(crate) async fn load_owned_item<'e, E>(
    executor: E,
    item_id: Uuid,
    owner_id: Uuid,
) -> AppResult<InventoryItem>
where
    E: Executor<'e, Database = Postgres>,
{
    let item = sqlx::query_as::<_, InventoryRow>(&format!(
        "SELECT {} FROM inventory_items WHERE id = $1",
        INVENTORY_COLUMNS
    ))
    .bind(item_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?
    .into_item()?;

    ensure_owned("Inventory item", item.owner_id, owner_id)?;
    Ok(item)
}

/// Insert a validated item on the caller's transaction
pub(crate) async fn insert_item(conn: &mut PgConnection, new: &NewInventoryItem) -> AppResult<InventoryItem> {
    let row = sqlx::query_as::<_, InventoryRow>(&format!(
        r#"
        INSERT INTO inventory_items (
            owner_id, gem_name, weight, color, clarity, cut, shape, origin,
            purchase_price, current_value, quantity, description, status, purchase_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {}
        "#,
        INVENTORY_COLUMNS
    ))
    .bind(new.owner_id)
    .bind(&new.gem_name)
    .bind(new.weight)
    .bind(&new.grading.color)
    .bind(&new.grading.clarity)
    .bind(&new.grading.cut)
    .bind(&new.grading.shape)
    .bind(&new.grading.origin)
    .bind(new.purchase_price)
    .bind(new.current_value)
    .bind(new.quantity)
    .bind(&new.description)
    .bind(new.status.as_str())
    .bind(new.purchase_id)
    .fetch_one(&mut *conn)
    .await?;

    row.into_item()
}

/// Append the owner scope and the list filters. Used by both the count and
/// the page query so `total` always matches what the pages walk through.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, owner_id: Uuid, filter: &InventoryFilter) {
    builder.push(" WHERE owner_id = ").push_bind(owner_id);

    if let Some(gem_name) = &filter.gem_name {
        builder
            .push(" AND gem_name ILIKE ")
            .push_bind(like_pattern(gem_name))
            .push(" ESCAPE '\\'");
    }
    if let Some(color) = &filter.color {
        builder
            .push(" AND color ILIKE ")
            .push_bind(like_pattern(color))
            .push(" ESCAPE '\\'");
    }
    if let Some(weight_min) = filter.weight_min {
        builder.push(" AND weight >= ").push_bind(weight_min);
    }
    if let Some(weight_max) = filter.weight_max {
        builder.push(" AND weight <= ").push_bind(weight_max);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
}

impl InventoryService {
    pub fn new(db: PgPool, attachments: Arc<dyn AttachmentStore>) -> Self {
        Self { db, attachments }
    }

    /// Create an item that is not tied to a recorded purchase
    pub async fn create_standalone(
        &self,
        owner_id: Uuid,
        fields: InventoryFields,
        uploads: &[UploadedFile],
    ) -> AppResult<InventoryWithImages> {
        let draft = draft_standalone(owner_id, fields)?;

        let created = with_attachments(self.attachments.as_ref(), uploads, |files| async move {
            let mut tx = self.db.begin().await?;
            let item = insert_item(&mut tx, &draft).await?;
            let images = insert_images(&mut tx, item.id, owner_id, &files).await?;
            tx.commit().await?;
            Ok(InventoryWithImages { item, images })
        })
        .await?;

        tracing::info!(
            "Created inventory item {} ({}) with {} image(s)",
            created.item.id,
            created.item.gem_name,
            created.images.len()
        );

        Ok(created)
    }

    /// Attach more images to an existing item
    pub async fn add_images(
        &self,
        owner_id: Uuid,
        item_id: Uuid,
        uploads: &[UploadedFile],
    ) -> AppResult<Vec<ImageAttachment>> {
        if uploads.is_empty() {
            return Err(AppError::validation("images", "at least one image is required"));
        }

        let item = load_owned_item(&self.db, item_id, owner_id).await?;

        let images = with_attachments(self.attachments.as_ref(), uploads, |files| async move {
            let mut tx = self.db.begin().await?;
            let images = insert_images(&mut tx, item.id, owner_id, &files).await?;
            tx.commit().await?;
            Ok(images)
        })
        .await?;

        tracing::info!("Attached {} image(s) to inventory item {}", images.len(), item_id);
        Ok(images)
    }

    /// List items matching `filter`, one page at a time, with per-item
    /// rollups and derived status resolved for the whole page at once
    pub async fn list(
        &self,
        owner_id: Uuid,
        filter: InventoryFilter,
        pagination: Pagination,
    ) -> AppResult<Page<InventoryListItem>> {
        let filter = filter.normalized();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM inventory_items");
        push_filters(&mut count, owner_id, &filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM inventory_items",
            INVENTORY_COLUMNS
        ));
        push_filters(&mut query, owner_id, &filter);
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let items = query
            .build_query_as::<InventoryRow>()
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(InventoryRow::into_item)
            .collect::<AppResult<Vec<_>>>()?;

        let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
        let totals = expense_totals(&self.db, &ids).await?;
        let ongoing = ongoing_for(&self.db, &ids).await?;
        let latest = latest_ongoing(&ongoing);
        let mut images = group_by_inventory(images_for(&self.db, &ids).await?);

        let rows = items
            .into_iter()
            .map(|item| {
                let item_images = images.remove(&item.id).unwrap_or_default();
                let engagement = latest.get(&item.id);
                list_item(item, item_images, &totals, engagement)
            })
            .collect();

        Ok(Page::new(rows, total, pagination))
    }

    /// One item with its images, expenses, sale, tracking history and rollups
    pub async fn get_detail(&self, owner_id: Uuid, item_id: Uuid) -> AppResult<InventoryDetail> {
        let item = load_owned_item(&self.db, item_id, owner_id).await?;

        let images = images_for(&self.db, &[item.id]).await?;
        let expenses = expenses_for_item(&self.db, item.id).await?;
        let sale = sale_for_item(&self.db, item.id).await?;
        let tracking = tracking_for_item(&self.db, item.id).await?;

        let total = expenses_total(expenses.iter().map(|e| &e.amount));
        let snapshots: Vec<TrackingSnapshot> = tracking.iter().map(TrackingSnapshot::from).collect();
        let latest = latest_ongoing(&snapshots);
        let derived_status = derive_status(item.status, latest.get(&item.id));

        let profit = sale
            .as_ref()
            .map(|sale| SaleProfit::compute(sale.amount, item.purchase_price, total));
        let cost_of_ownership = shared::cost_of_ownership(item.purchase_price, total);

        Ok(InventoryDetail {
            item,
            images,
            expenses,
            sale,
            tracking,
            expenses_total: total,
            cost_of_ownership,
            net_profit: profit.map(|p| p.net_profit),
            profit_margin_percent: profit.map(|p| p.profit_margin_percent),
            derived_status,
        })
    }
}

fn list_item(
    item: InventoryItem,
    images: Vec<ImageAttachment>,
    totals: &ExpenseTotals,
    engagement: Option<&TrackingSnapshot>,
) -> InventoryListItem {
    let derived_status = derive_status(item.status, engagement);
    // A sold item reports no engagement even if one was left open
    let engagement = engagement.filter(|_| item.status != InventoryStatus::Sold);

    InventoryListItem {
        expenses_total: totals.get(&item.id),
        tracking_action_type: engagement.map(|e| e.action_type),
        tracking_status: engagement.map(|e| e.status),
        tracking_start_date: engagement.map(|e| e.start_date),
        derived_status,
        images,
        item,
    }
}
