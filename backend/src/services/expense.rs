//! Expense service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{ExpenseRecord, ExpenseTotals, NewExpense, Page, Pagination};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::inventory::load_owned_item;
use crate::error::AppResult;

/// Expense service
#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
}

/// Input for recording an expense
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseInput {
    pub inventory_id: Uuid,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 100, message = "category is too long"))]
    pub category: Option<String>,
    #[validate(length(max = 2000, message = "description is too long"))]
    pub description: Option<String>,
}

#[derive(Debug, FromRow)]
struct ExpenseRow {
    id: Uuid,
    owner_id: Uuid,
    inventory_id: Uuid,
    amount: Decimal,
    date: NaiveDate,
    category: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ExpenseRow> for ExpenseRecord {
    fn from(row: ExpenseRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            inventory_id: row.inventory_id,
            amount: row.amount,
            date: row.date,
            category: row.category,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Sum of expenses per item for a page of items, in one grouped query.
/// Items with no expenses are simply absent and read back as zero.
pub(crate) async fn expense_totals(db: &PgPool, inventory_ids: &[Uuid]) -> AppResult<ExpenseTotals> {
    if inventory_ids.is_empty() {
        return Ok(ExpenseTotals::default());
    }

    let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
        r#"
        SELECT inventory_id, SUM(amount)
        FROM expenses
        WHERE inventory_id = ANY($1)
        GROUP BY inventory_id
        "#,
    )
    .bind(inventory_ids)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Every expense recorded against one item, newest first
pub(crate) async fn expenses_for_item(db: &PgPool, inventory_id: Uuid) -> AppResult<Vec<ExpenseRecord>> {
    let rows = sqlx::query_as::<_, ExpenseRow>(
        r#"
        SELECT id, owner_id, inventory_id, amount, date, category, description, created_at
        FROM expenses
        WHERE inventory_id = $1
        ORDER BY date DESC, created_at DESC
        "#,
    )
    .bind(inventory_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

impl ExpenseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record an expense against an owned item
    pub async fn create(&self, owner_id: Uuid, input: CreateExpenseInput) -> AppResult<ExpenseRecord> {
        let item = load_owned_item(&self.db, input.inventory_id, owner_id).await?;

        let expense = NewExpense::new(
            owner_id,
            item.id,
            input.amount,
            input.date.unwrap_or_else(|| Utc::now().date_naive()),
            input.category.as_deref(),
            input.description.as_deref(),
        )?;

        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expenses (owner_id, inventory_id, amount, date, category, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, inventory_id, amount, date, category, description, created_at
            "#,
        )
        .bind(expense.owner_id)
        .bind(expense.inventory_id)
        .bind(expense.amount)
        .bind(expense.date)
        .bind(&expense.category)
        .bind(&expense.description)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Recorded expense {} of {} on item {}", row.id, row.amount, item.id);
        Ok(row.into())
    }

    /// List expenses, optionally for one item
    pub async fn list(
        &self,
        owner_id: Uuid,
        inventory_id: Option<Uuid>,
        pagination: Pagination,
    ) -> AppResult<Page<ExpenseRecord>> {
        if let Some(inventory_id) = inventory_id {
            load_owned_item(&self.db, inventory_id, owner_id).await?;
        }

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM expenses WHERE owner_id = $1 AND ($2::uuid IS NULL OR inventory_id = $2)",
        )
        .bind(owner_id)
        .bind(inventory_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT id, owner_id, inventory_id, amount, date, category, description, created_at
            FROM expenses
            WHERE owner_id = $1 AND ($2::uuid IS NULL OR inventory_id = $2)
            ORDER BY date DESC, created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id)
        .bind(inventory_id)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::fixtures::{count_rows, seed_item};

    fn expense_input(inventory_id: Uuid, amount: Decimal) -> CreateExpenseInput {
        CreateExpenseInput {
            inventory_id,
            amount,
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            category: Some("Recutting".to_string()),
            description: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_expense_on_foreign_item_is_forbidden(pool: PgPool) {
        let item_id = seed_item(&pool, Uuid::new_v4(), 500).await.id;
        let service = ExpenseService::new(pool.clone());

        let err = service
            .create(Uuid::new_v4(), expense_input(item_id, Decimal::from(25)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(count_rows(&pool, "expenses", item_id).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_sub_cent_expense_is_rejected_before_insert(pool: PgPool) {
        let owner = Uuid::new_v4();
        let item_id = seed_item(&pool, owner, 500).await.id;
        let service = ExpenseService::new(pool.clone());

        for amount in [Decimal::new(1, 3), Decimal::new(10_005, 3)] {
            let err = service.create(owner, expense_input(item_id, amount)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { ref field, .. } if field == "amount"));
        }
        assert_eq!(count_rows(&pool, "expenses", item_id).await, 0);

        let recorded = service
            .create(owner, expense_input(item_id, Decimal::new(1_050, 2)))
            .await
            .unwrap();
        assert_eq!(recorded.amount, Decimal::new(1_050, 2));
    }
}
