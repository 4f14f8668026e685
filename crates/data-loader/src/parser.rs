//! Parser for meeting fixture files.
//!
//! A fixture directory holds three JSON arrays:
//! - users.json: `[{ "id"?, "name", "email" }]`
//! - meetings.json: `[{ "id"?, "title", "organizerId", "estimatedDuration",
//!   "proposedSlots", "participantIds" }]`
//! - availabilities.json: `[{ "id"?, "participantId", "meetingId", "availableSlots" }]`
//!
//! Records reference each other by id; resolving those references happens
//! in `index.rs` once every file has been parsed.

use crate::error::{DataError, Result};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// A user as written in users.json
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
}

impl UserRecord {
    pub fn into_user(self) -> User {
        User {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name,
            email: self.email,
        }
    }
}

/// A slot as written in any fixture file. The id is optional because
/// submitted availability is matched by time, not by id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    #[serde(default)]
    pub id: Option<SlotId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl SlotRecord {
    pub fn into_slot(self) -> TimeSlot {
        TimeSlot {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// A meeting as written in meetings.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    #[serde(default)]
    pub id: Option<MeetingId>,
    pub title: String,
    pub organizer_id: UserId,
    pub estimated_duration: u32,
    pub proposed_slots: Vec<SlotRecord>,
    #[serde(default)]
    pub participant_ids: Vec<UserId>,
}

/// An availability submission as written in availabilities.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    #[serde(default)]
    pub id: Option<AvailabilityId>,
    #[serde(alias = "userId")]
    pub participant_id: UserId,
    pub meeting_id: MeetingId,
    pub available_slots: Vec<SlotRecord>,
}

/// Read a JSON array of records, tagging errors with the file name
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !path.exists() {
        return Err(DataError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| DataError::JsonError { file, source })
}

/// Parse the users.json file
pub fn parse_users(path: &Path) -> Result<Vec<UserRecord>> {
    let records: Vec<UserRecord> = read_records(path)?;

    for (idx, record) in records.iter().enumerate() {
        if record.name.trim().is_empty() {
            return Err(DataError::validation(format!(
                "users.json entry {}: name is required",
                idx + 1
            )));
        }
        if record.email.trim().is_empty() {
            return Err(DataError::validation(format!(
                "users.json entry {}: email is required",
                idx + 1
            )));
        }
    }

    Ok(records)
}

/// Parse the meetings.json file
pub fn parse_meetings(path: &Path) -> Result<Vec<MeetingRecord>> {
    read_records(path)
}

/// Parse the availabilities.json file
pub fn parse_availabilities(path: &Path) -> Result<Vec<AvailabilityRecord>> {
    read_records(path)
}
