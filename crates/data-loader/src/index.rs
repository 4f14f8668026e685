//! MeetingIndex: the in-memory store behind the scheduling service.
//!
//! This module owns:
//! - Primary maps (users, meetings, availabilities)
//! - Secondary indices (email lookup, availabilities per meeting)
//! - Fixture loading from a directory of JSON files
//!
//! The index itself is not synchronised. Callers that share it across
//! threads wrap it in a lock and copy out what they need.

use crate::error::{DataError, Result};
use crate::parser::{self, AvailabilityRecord, MeetingRecord};
use crate::types::*;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Main data structure that holds all users, meetings and availability.
///
/// Rust concepts demonstrated:
/// - HashMap<K, V> for O(1) lookups
/// - Secondary index kept as `Vec` to preserve insertion order
/// - Borrowing: getters return `&T`, removals hand back owned values
#[derive(Debug, Default)]
pub struct MeetingIndex {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) meetings: HashMap<MeetingId, Meeting>,
    pub(crate) availabilities: HashMap<AvailabilityId, Availability>,

    /// Lower-cased email -> user id
    pub(crate) email_index: HashMap<String, UserId>,
    /// Availability ids per meeting, in submission order
    pub(crate) meeting_availabilities: HashMap<MeetingId, Vec<AvailabilityId>>,
}

impl MeetingIndex {
    /// Creates a new, empty MeetingIndex
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a user. Emails are unique, compared case-insensitively.
    pub fn insert_user(&mut self, user: User) -> Result<()> {
        if self.users.contains_key(&user.id) {
            return Err(DataError::Conflict(format!("User {} already exists", user.id)));
        }

        let email_key = user.email.to_lowercase();
        if self.email_index.contains_key(&email_key) {
            return Err(DataError::Conflict("Email is already in use".to_string()));
        }

        self.email_index.insert(email_key, user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<&User> {
        self.email_index
            .get(&email.to_lowercase())
            .and_then(|id| self.users.get(id))
    }

    /// All users ordered by name, then id
    pub fn list_users(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        users
    }

    // =========================================================================
    // Meetings
    // =========================================================================

    /// Insert a meeting whose organizer and participants are already indexed
    pub fn insert_meeting(&mut self, meeting: Meeting) -> Result<()> {
        if self.meetings.contains_key(&meeting.id) {
            return Err(DataError::Conflict(format!(
                "Meeting {} already exists",
                meeting.id
            )));
        }
        self.check_meeting_references(&meeting)?;

        self.meeting_availabilities.entry(meeting.id).or_default();
        self.meetings.insert(meeting.id, meeting);
        Ok(())
    }

    pub fn get_meeting(&self, id: MeetingId) -> Option<&Meeting> {
        self.meetings.get(&id)
    }

    /// All meetings ordered by title, then id
    pub fn list_meetings(&self) -> Vec<&Meeting> {
        let mut meetings: Vec<&Meeting> = self.meetings.values().collect();
        meetings.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        meetings
    }

    /// Overwrite an existing meeting, keeping its availability
    pub fn replace_meeting(&mut self, meeting: Meeting) -> Result<()> {
        if !self.meetings.contains_key(&meeting.id) {
            return Err(DataError::NotFound {
                entity: "Meeting",
                id: meeting.id,
            });
        }
        self.check_meeting_references(&meeting)?;

        self.meetings.insert(meeting.id, meeting);
        Ok(())
    }

    /// Remove a meeting together with every availability submitted for it
    pub fn remove_meeting(&mut self, id: MeetingId) -> Result<Meeting> {
        let meeting = self
            .meetings
            .remove(&id)
            .ok_or(DataError::NotFound { entity: "Meeting", id })?;

        let availability_ids = self.meeting_availabilities.remove(&id).unwrap_or_default();
        for availability_id in &availability_ids {
            self.availabilities.remove(availability_id);
        }
        debug!(
            "Removed meeting {} and {} availability records",
            id,
            availability_ids.len()
        );

        Ok(meeting)
    }

    fn check_meeting_references(&self, meeting: &Meeting) -> Result<()> {
        std::iter::once(&meeting.organizer)
            .chain(meeting.participants.iter())
            .try_for_each(|user| {
                if self.users.contains_key(&user.id) {
                    Ok(())
                } else {
                    Err(DataError::MissingReference {
                        entity: "User",
                        id: user.id,
                    })
                }
            })
    }

    // =========================================================================
    // Availability
    // =========================================================================

    /// Insert an availability record for an indexed meeting and user
    pub fn insert_availability(&mut self, availability: Availability) -> Result<()> {
        if self.availabilities.contains_key(&availability.id) {
            return Err(DataError::Conflict(format!(
                "Availability {} already exists",
                availability.id
            )));
        }
        if !self.meetings.contains_key(&availability.meeting_id) {
            return Err(DataError::MissingReference {
                entity: "Meeting",
                id: availability.meeting_id,
            });
        }
        if !self.users.contains_key(&availability.participant_id) {
            return Err(DataError::MissingReference {
                entity: "User",
                id: availability.participant_id,
            });
        }

        self.meeting_availabilities
            .entry(availability.meeting_id)
            .or_default()
            .push(availability.id);
        self.availabilities.insert(availability.id, availability);
        Ok(())
    }

    pub fn get_availability(&self, id: AvailabilityId) -> Option<&Availability> {
        self.availabilities.get(&id)
    }

    /// The first availability `user_id` submitted for `meeting_id`
    pub fn find_availability(
        &self,
        user_id: UserId,
        meeting_id: MeetingId,
    ) -> Option<&Availability> {
        self.get_meeting_availabilities(meeting_id)
            .into_iter()
            .find(|a| a.participant_id == user_id)
    }

    /// Overwrite an existing availability record. It may not move meetings.
    pub fn replace_availability(&mut self, availability: Availability) -> Result<()> {
        let existing = self
            .availabilities
            .get(&availability.id)
            .ok_or(DataError::NotFound {
                entity: "Availability",
                id: availability.id,
            })?;

        if existing.meeting_id != availability.meeting_id {
            return Err(DataError::validation(
                "Availability cannot be moved to a different meeting",
            ));
        }

        self.availabilities.insert(availability.id, availability);
        Ok(())
    }

    pub fn remove_availability(&mut self, id: AvailabilityId) -> Result<Availability> {
        let availability = self.availabilities.remove(&id).ok_or(DataError::NotFound {
            entity: "Availability",
            id,
        })?;

        if let Some(ids) = self.meeting_availabilities.get_mut(&availability.meeting_id) {
            ids.retain(|existing| *existing != id);
        }

        Ok(availability)
    }

    /// Every availability submitted for a meeting, in submission order
    pub fn get_meeting_availabilities(&self, meeting_id: MeetingId) -> Vec<&Availability> {
        self.meeting_availabilities
            .get(&meeting_id)
            .map(|ids| ids.iter().filter_map(|id| self.availabilities.get(id)).collect())
            .unwrap_or_default()
    }

    /// Get counts for debugging/validation: (users, meetings, availabilities)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.users.len(), self.meetings.len(), self.availabilities.len())
    }

    // =========================================================================
    // Loading & Validation
    // =========================================================================

    /// Load a fixture directory containing users.json, meetings.json and
    /// availabilities.json.
    ///
    /// Steps:
    /// 1. Parse all three files in parallel
    /// 2. Insert users
    /// 3. Resolve and insert meetings
    /// 4. Resolve and insert availability, snapping slots onto proposed slots
    /// 5. Validate integrity
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading meeting data from {:?}", data_dir);

        let users_path = data_dir.join("users.json");
        let meetings_path = data_dir.join("meetings.json");
        let availabilities_path = data_dir.join("availabilities.json");

        // Rayon's `join` runs two closures in parallel; nesting gives three-way
        let ((users, meetings), availabilities) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_meetings(&meetings_path),
                )
            },
            || parser::parse_availabilities(&availabilities_path),
        );

        let users = users?;
        let meetings = meetings?;
        let availabilities = availabilities?;

        let mut index = MeetingIndex::new();

        for record in users {
            index.insert_user(record.into_user())?;
        }

        for record in meetings {
            let meeting = index.resolve_meeting(record)?;
            index.insert_meeting(meeting)?;
        }

        for record in availabilities {
            let availability = index.resolve_availability(record)?;
            index.insert_availability(availability)?;
        }

        index.validate()?;

        let (users, meetings, availabilities) = index.counts();
        info!(
            "Loaded {} users, {} meetings, {} availability records",
            users, meetings, availabilities
        );
        Ok(index)
    }

    fn resolve_user(&self, id: UserId) -> Result<User> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(DataError::MissingReference { entity: "User", id })
    }

    fn resolve_meeting(&self, record: MeetingRecord) -> Result<Meeting> {
        let organizer = self.resolve_user(record.organizer_id)?;
        let participants = record
            .participant_ids
            .iter()
            .map(|&id| self.resolve_user(id))
            .collect::<Result<Vec<User>>>()?;

        let now = Utc::now();
        Ok(Meeting {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            title: record.title,
            organizer,
            estimated_duration: record.estimated_duration,
            proposed_slots: record.proposed_slots.into_iter().map(|s| s.into_slot()).collect(),
            participants,
            created_at: now,
            updated_at: now,
        })
    }

    /// Slots are stored as the meeting's own proposed slots (same id), so a
    /// submission that names no id still lines up with the proposal.
    fn resolve_availability(&self, record: AvailabilityRecord) -> Result<Availability> {
        let meeting = self
            .meetings
            .get(&record.meeting_id)
            .ok_or(DataError::MissingReference {
                entity: "Meeting",
                id: record.meeting_id,
            })?;
        self.resolve_user(record.participant_id)?;

        let available_slots = record
            .available_slots
            .into_iter()
            .map(|slot| {
                let slot = slot.into_slot();
                meeting.matching_slot(&slot).cloned().ok_or_else(|| {
                    DataError::validation(format!(
                        "Available slot {} - {} does not match any proposed slot of meeting {}",
                        slot.start_time, slot.end_time, meeting.id
                    ))
                })
            })
            .collect::<Result<Vec<TimeSlot>>>()?;

        let now = Utc::now();
        Ok(Availability {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            participant_id: record.participant_id,
            meeting_id: record.meeting_id,
            available_slots,
            created_at: now,
            updated_at: now,
        })
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every meeting's organizer and participants exist
    /// - Every meeting has at least one proposed slot, each ending after it starts
    /// - Every availability references an existing meeting and user
    pub fn validate(&self) -> Result<()> {
        for meeting in self.meetings.values() {
            self.check_meeting_references(meeting)?;

            if meeting.proposed_slots.is_empty() {
                return Err(DataError::validation(format!(
                    "Meeting {} has no proposed slots",
                    meeting.id
                )));
            }
            if let Some(slot) = meeting
                .proposed_slots
                .iter()
                .find(|slot| slot.end_time <= slot.start_time)
            {
                return Err(DataError::validation(format!(
                    "Slot {} of meeting {} ends before it starts",
                    slot.id, meeting.id
                )));
            }
        }

        for availability in self.availabilities.values() {
            if !self.meetings.contains_key(&availability.meeting_id) {
                return Err(DataError::MissingReference {
                    entity: "Meeting",
                    id: availability.meeting_id,
                });
            }
            if !self.users.contains_key(&availability.participant_id) {
                return Err(DataError::MissingReference {
                    entity: "User",
                    id: availability.participant_id,
                });
            }
        }

        Ok(())
    }
}
