//! Tracking engagement models (consignment, processing, notes)

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::validation::optional_text;

/// What kind of engagement an item is in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrackingAction {
    /// Heat treatment or another processing step
    Burning,
    /// Out with a broker on consignment
    Broker,
    Note,
}

impl TrackingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingAction::Burning => "burning",
            TrackingAction::Broker => "broker",
            TrackingAction::Note => "note",
        }
    }
}

impl FromStr for TrackingAction {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "burning" => Ok(TrackingAction::Burning),
            "broker" => Ok(TrackingAction::Broker),
            "note" => Ok(TrackingAction::Note),
            other => Err(LedgerError::validation(
                "action_type",
                format!("unknown action type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    #[default]
    Ongoing,
    Completed,
}

impl TrackingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::Ongoing => "ongoing",
            TrackingStatus::Completed => "completed",
        }
    }
}

impl FromStr for TrackingStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ongoing" => Ok(TrackingStatus::Ongoing),
            "completed" => Ok(TrackingStatus::Completed),
            other => Err(LedgerError::validation(
                "status",
                format!("unknown tracking status '{}'", other),
            )),
        }
    }
}

/// An engagement of an inventory item with a third party or process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub inventory_id: Uuid,
    pub action_type: TrackingAction,
    pub party: Option<String>,
    pub status: TrackingStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTracking {
    pub owner_id: Uuid,
    pub inventory_id: Uuid,
    pub action_type: TrackingAction,
    pub party: Option<String>,
    pub status: TrackingStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Raw input for a new tracking record
#[derive(Debug, Clone)]
pub struct TrackingInput<'a> {
    pub action_type: TrackingAction,
    pub party: Option<&'a str>,
    pub status: Option<TrackingStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<&'a str>,
}

impl NewTracking {
    /// Validate a new engagement. Start date defaults to `today`; a record
    /// created as completed without an end date ends `today`. An ongoing
    /// record never carries an end date.
    pub fn new(
        owner_id: Uuid,
        inventory_id: Uuid,
        input: TrackingInput<'_>,
        today: NaiveDate,
    ) -> LedgerResult<Self> {
        let status = input.status.unwrap_or_default();
        let start_date = input.start_date.unwrap_or(today);

        let end_date = match status {
            TrackingStatus::Ongoing => {
                if input.end_date.is_some() {
                    return Err(LedgerError::validation(
                        "end_date",
                        "an ongoing record cannot have an end date",
                    ));
                }
                None
            }
            TrackingStatus::Completed => Some(input.end_date.unwrap_or(today)),
        };

        if let Some(end) = end_date {
            validate_date_order(start_date, end)?;
        }

        Ok(Self {
            owner_id,
            inventory_id,
            action_type: input.action_type,
            party: optional_text(input.party),
            status,
            start_date,
            end_date,
            notes: optional_text(input.notes),
        })
    }
}

/// Field values to write when an ongoing record is completed
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingCompletion {
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

/// Compute the `ongoing -> completed` transition. This is the only mutation a
/// tracking record supports.
pub fn complete_tracking(
    record: &TrackingRecord,
    requested_status: TrackingStatus,
    end_date: Option<NaiveDate>,
    notes: Option<&str>,
    today: NaiveDate,
) -> LedgerResult<TrackingCompletion> {
    if requested_status != TrackingStatus::Completed {
        return Err(LedgerError::validation(
            "status",
            "tracking records can only be updated to completed",
        ));
    }
    if record.status == TrackingStatus::Completed {
        return Err(LedgerError::InvalidState(
            "tracking record is already completed".to_string(),
        ));
    }

    let end_date = end_date.unwrap_or(today);
    validate_date_order(record.start_date, end_date)?;

    Ok(TrackingCompletion {
        end_date,
        notes: merge_notes(record.notes.as_deref(), notes),
    })
}

/// Append new notes to existing ones on a new line
pub fn merge_notes(existing: Option<&str>, new: Option<&str>) -> Option<String> {
    match (optional_text(existing), optional_text(new)) {
        (Some(existing), Some(new)) => Some(format!("{}\n{}", existing, new)),
        (existing, None) => existing,
        (None, new) => new,
    }
}

fn validate_date_order(start: NaiveDate, end: NaiveDate) -> LedgerResult<()> {
    if end < start {
        return Err(LedgerError::validation(
            "end_date",
            "end date cannot be before start date",
        ));
    }
    Ok(())
}
