//! Image attachment rows
//!
//! The bytes live in the attachment store; these rows only record where.

use chrono::{DateTime, Utc};
use shared::{ImageAttachment, StoredFile};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Debug, FromRow)]
struct ImageRow {
    id: Uuid,
    inventory_id: Uuid,
    owner_id: Uuid,
    stored_name: String,
    original_name: String,
    size_bytes: i64,
    mime_type: String,
    url: String,
    uploaded_at: DateTime<Utc>,
}

impl From<ImageRow> for ImageAttachment {
    fn from(row: ImageRow) -> Self {
        Self {
            id: row.id,
            inventory_id: row.inventory_id,
            owner_id: row.owner_id,
            stored_name: row.stored_name,
            original_name: row.original_name,
            size_bytes: row.size_bytes,
            mime_type: row.mime_type,
            url: row.url,
            uploaded_at: row.uploaded_at,
        }
    }
}

/// Insert metadata for files already in the store. Runs on the caller's
/// transaction so the rows commit together with the item they belong to.
pub async fn insert_images(
    conn: &mut PgConnection,
    inventory_id: Uuid,
    owner_id: Uuid,
    files: &[StoredFile],
) -> AppResult<Vec<ImageAttachment>> {
    let mut images = Vec::with_capacity(files.len());

    for file in files {
        let row = sqlx::query_as::<_, ImageRow>(
            r#"
            INSERT INTO inventory_images (
                inventory_id, owner_id, stored_name, original_name, size_bytes, mime_type, url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, inventory_id, owner_id, stored_name, original_name, size_bytes,
                      mime_type, url, uploaded_at
            "#,
        )
        .bind(inventory_id)
        .bind(owner_id)
        .bind(&file.stored_name)
        .bind(&file.original_name)
        .bind(file.size_bytes)
        .bind(&file.mime_type)
        .bind(&file.url)
        .fetch_one(&mut *conn)
        .await?;

        images.push(row.into());
    }

    Ok(images)
}

/// All images for a set of items, oldest first
pub async fn images_for(db: &PgPool, inventory_ids: &[Uuid]) -> AppResult<Vec<ImageAttachment>> {
    if inventory_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, ImageRow>(
        r#"
        SELECT id, inventory_id, owner_id, stored_name, original_name, size_bytes,
               mime_type, url, uploaded_at
        FROM inventory_images
        WHERE inventory_id = ANY($1)
        ORDER BY uploaded_at, id
        "#,
    )
    .bind(inventory_ids)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}
