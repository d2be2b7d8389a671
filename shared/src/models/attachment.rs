//! Image attachment metadata

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata returned by the attachment store for one saved file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    pub stored_name: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub mime_type: String,
    /// Relative URL the file can be fetched from
    pub url: String,
}

/// An image bound to exactly one inventory item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageAttachment {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub owner_id: Uuid,
    pub stored_name: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Group a flat list of images by their inventory item, keeping input order
pub fn group_by_inventory(images: Vec<ImageAttachment>) -> HashMap<Uuid, Vec<ImageAttachment>> {
    let mut grouped: HashMap<Uuid, Vec<ImageAttachment>> = HashMap::new();
    for image in images {
        grouped.entry(image.inventory_id).or_default().push(image);
    }
    grouped
}

/// File extension for an accepted image mime type
pub fn image_extension(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
