//! Derived (user-facing) status of inventory items

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::inventory::InventoryStatus;
use super::tracking::{TrackingAction, TrackingRecord, TrackingStatus};

/// The status shown to users: the raw status, unless an ongoing engagement
/// overrides it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStatus {
    Available,
    Reserved,
    Sold,
    Burning,
    Broker,
    Note,
}

impl DerivedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedStatus::Available => "available",
            DerivedStatus::Reserved => "reserved",
            DerivedStatus::Sold => "sold",
            DerivedStatus::Burning => "burning",
            DerivedStatus::Broker => "broker",
            DerivedStatus::Note => "note",
        }
    }
}

impl From<InventoryStatus> for DerivedStatus {
    fn from(status: InventoryStatus) -> Self {
        match status {
            InventoryStatus::Available => DerivedStatus::Available,
            InventoryStatus::Sold => DerivedStatus::Sold,
            InventoryStatus::Reserved => DerivedStatus::Reserved,
        }
    }
}

impl From<TrackingAction> for DerivedStatus {
    fn from(action: TrackingAction) -> Self {
        match action {
            TrackingAction::Burning => DerivedStatus::Burning,
            TrackingAction::Broker => DerivedStatus::Broker,
            TrackingAction::Note => DerivedStatus::Note,
        }
    }
}

/// The subset of a tracking record needed to resolve derived status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackingSnapshot {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub action_type: TrackingAction,
    pub status: TrackingStatus,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl TrackingSnapshot {
    /// Ordering key: later start date wins, then the later-created record,
    /// then the larger id so the choice is total
    fn recency_key(&self) -> (NaiveDate, DateTime<Utc>, Uuid) {
        (self.start_date, self.created_at, self.id)
    }
}

impl From<&TrackingRecord> for TrackingSnapshot {
    fn from(record: &TrackingRecord) -> Self {
        Self {
            id: record.id,
            inventory_id: record.inventory_id,
            action_type: record.action_type,
            status: record.status,
            start_date: record.start_date,
            created_at: record.created_at,
        }
    }
}

/// Pick the most recent ongoing engagement per inventory item
pub fn latest_ongoing<'a, I>(records: I) -> HashMap<Uuid, TrackingSnapshot>
where
    I: IntoIterator<Item = &'a TrackingSnapshot>,
{
    let mut latest: HashMap<Uuid, TrackingSnapshot> = HashMap::new();
    for record in records {
        if record.status != TrackingStatus::Ongoing {
            continue;
        }
        latest
            .entry(record.inventory_id)
            .and_modify(|current| {
                if record.recency_key() > current.recency_key() {
                    *current = *record;
                }
            })
            .or_insert(*record);
    }
    latest
}

/// Resolve the derived status of one item
pub fn derive_status(status: InventoryStatus, latest: Option<&TrackingSnapshot>) -> DerivedStatus {
    if status == InventoryStatus::Sold {
        return DerivedStatus::Sold;
    }
    match latest {
        Some(engagement) if engagement.status == TrackingStatus::Ongoing => {
            engagement.action_type.into()
        }
        _ => status.into(),
    }
}
