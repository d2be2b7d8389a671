//! Sale service
//!
//! Recording a sale is the only way an item becomes `sold`. The status check
//! and the flip happen under a row lock in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    ensure_owned, transition, GradingAttributes, InventoryStatus, LifecycleEvent, NewSale, Page,
    Pagination, SaleProfit, SaleRecord,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::decode_stored;
use super::expense::expense_totals;
use crate::error::{AppError, AppResult};

/// Sale service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Input for recording a sale
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleInput {
    pub inventory_id: Uuid,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 200, message = "buyer is too long"))]
    pub buyer: Option<String>,
    #[validate(length(max = 2000, message = "description is too long"))]
    pub description: Option<String>,
}

/// A sale with the item it sold and the resulting profit
#[derive(Debug, Serialize)]
pub struct SaleView {
    #[serde(flatten)]
    pub sale: SaleRecord,
    pub gem_name: String,
    pub weight: Decimal,
    #[serde(flatten)]
    pub grading: GradingAttributes,
    pub purchase_price: Decimal,
    #[serde(flatten)]
    pub profit: SaleProfit,
}

const SALE_COLUMNS: &str = "id, owner_id, inventory_id, amount, date, buyer, description, created_at";

#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    owner_id: Uuid,
    inventory_id: Uuid,
    amount: Decimal,
    date: NaiveDate,
    buyer: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SaleRow> for SaleRecord {
    fn from(row: SaleRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            inventory_id: row.inventory_id,
            amount: row.amount,
            date: row.date,
            buyer: row.buyer,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Sale joined with the grading of the item it sold
#[derive(Debug, FromRow)]
struct SaleItemRow {
    #[sqlx(flatten)]
    sale: SaleRow,
    gem_name: String,
    weight: Decimal,
    color: Option<String>,
    clarity: Option<String>,
    cut: Option<String>,
    shape: Option<String>,
    origin: Option<String>,
    purchase_price: Decimal,
}

impl SaleItemRow {
    fn into_view(self, expenses_total: Decimal) -> SaleView {
        let sale: SaleRecord = self.sale.into();
        SaleView {
            profit: SaleProfit::compute(sale.amount, self.purchase_price, expenses_total),
            sale,
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
        }
    }
}

const SALE_ITEM_SELECT: &str = r#"
    SELECT s.id, s.owner_id, s.inventory_id, s.amount, s.date, s.buyer, s.description, s.created_at,
           i.gem_name, i.weight, i.color, i.clarity, i.cut, i.shape, i.origin, i.purchase_price
    FROM sales s
    JOIN inventory_items i ON i.id = s.inventory_id
"#;

/// The sale recorded against an item, if any
pub(crate) async fn sale_for_item(db: &PgPool, inventory_id: Uuid) -> AppResult<Option<SaleRecord>> {
    let row = sqlx::query_as::<_, SaleRow>(&format!(
        "SELECT {} FROM sales WHERE inventory_id = $1 ORDER BY created_at LIMIT 1",
        SALE_COLUMNS
    ))
    .bind(inventory_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(Into::into))
}

impl SaleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale and mark the item sold.
    ///
    /// Missing item is NotFound, another owner's item is Forbidden, and an
    /// item that is not `available` is InvalidState. Of two concurrent sales
    /// for the same item exactly one commits.
    pub async fn record_sale(&self, owner_id: Uuid, input: CreateSaleInput) -> AppResult<SaleRecord> {
        let sale = NewSale::new(
            owner_id,
            input.inventory_id,
            input.amount,
            input.date.unwrap_or_else(|| Utc::now().date_naive()),
            input.buyer.as_deref(),
            input.description.as_deref(),
        )?;

        let mut tx = self.db.begin().await?;

        let (item_owner, raw_status) = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT owner_id, status FROM inventory_items WHERE id = $1 FOR UPDATE",
        )
        .bind(sale.inventory_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        ensure_owned("Inventory item", item_owner, owner_id)?;
        let status: InventoryStatus = decode_stored("status", &raw_status)?;
        let event = LifecycleEvent::Sold { amount: sale.amount };
        let next = transition(status, event)?;

        let row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            INSERT INTO sales (owner_id, inventory_id, amount, date, buyer, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(sale.owner_id)
        .bind(sale.inventory_id)
        .bind(sale.amount)
        .bind(sale.date)
        .bind(&sale.buyer)
        .bind(&sale.description)
        .fetch_one(&mut *tx)
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE inventory_items
            SET status = $2, current_value = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'available'
            "#,
        )
        .bind(sale.inventory_id)
        .bind(next.as_str())
        .bind(event.current_value())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls back the sale insert
            return Err(AppError::InvalidState(
                "inventory item has already been sold".to_string(),
            ));
        }

        tx.commit().await?;

        tracing::info!(
            "Recorded sale {} of item {} for {}",
            row.id,
            row.inventory_id,
            row.amount
        );

        Ok(row.into())
    }

    /// Sales newest first, each with its profit
    pub async fn list(&self, owner_id: Uuid, pagination: Pagination) -> AppResult<Page<SaleView>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, SaleItemRow>(&format!(
            "{} WHERE s.owner_id = $1 ORDER BY s.date DESC, s.created_at DESC LIMIT $2 OFFSET $3",
            SALE_ITEM_SELECT
        ))
        .bind(owner_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.sale.inventory_id).collect();
        let totals = expense_totals(&self.db, &ids).await?;

        let views = rows
            .into_iter()
            .map(|row| {
                let expenses = totals.get(&row.sale.inventory_id);
                row.into_view(expenses)
            })
            .collect();

        Ok(Page::new(views, total, pagination))
    }

    /// One sale with its profit
    pub async fn get(&self, owner_id: Uuid, sale_id: Uuid) -> AppResult<SaleView> {
        let row = sqlx::query_as::<_, SaleItemRow>(&format!("{} WHERE s.id = $1", SALE_ITEM_SELECT))
            .bind(sale_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        ensure_owned("Sale", row.sale.owner_id, owner_id)?;

        let totals = expense_totals(&self.db, &[row.sale.inventory_id]).await?;
        let expenses = totals.get(&row.sale.inventory_id);
        Ok(row.into_view(expenses))
    }
}
