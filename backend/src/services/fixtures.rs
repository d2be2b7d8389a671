//! Database fixtures for service tests

use rust_decimal::Decimal;
use shared::{draft_standalone, InventoryFields, InventoryItem};
use sqlx::PgPool;
use uuid::Uuid;

use super::inventory::insert_item;

/// Insert an available item owned by `owner_id`
pub(crate) async fn seed_item(db: &PgPool, owner_id: Uuid, purchase_price: i64) -> InventoryItem {
    let draft = draft_standalone(
        owner_id,
        InventoryFields {
            gem_name: "Blue Sapphire".to_string(),
            weight: Decimal::new(235, 2),
            purchase_price: Decimal::from(purchase_price),
            ..Default::default()
        },
    )
    .unwrap();

    let mut conn = db.acquire().await.unwrap();
    insert_item(&mut conn, &draft).await.unwrap()
}

pub(crate) async fn count_rows(db: &PgPool, table: &str, inventory_id: Uuid) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE inventory_id = $1", table))
        .bind(inventory_id)
        .fetch_one(db)
        .await
        .unwrap()
}
