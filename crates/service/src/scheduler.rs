//! # Meeting Scheduling Service
//!
//! This module coordinates the data layer and the recommendation engine:
//! 1. Validate and apply user, meeting and availability mutations
//! 2. Copy a meeting and its availability out of the shared index
//! 3. Run the recommendation engine on that owned snapshot
//! 4. Return the ranked slots
//!
//! ## Concurrency
//!
//! The index lives behind `Arc<parking_lot::RwLock<_>>`. Readers clone what
//! they need while holding the read guard and drop it before doing any
//! work, so ranking never blocks writers and never sees a half-applied
//! update.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use data_loader::parser::SlotRecord;
use data_loader::{
    Availability, AvailabilityId, DataError, Meeting, MeetingId, MeetingIndex, RecommendedSlot,
    TimeSlot, User, UserId,
};
use pipeline::RecommendationEngine;

type DataResult<T> = data_loader::Result<T>;

/// Input for [`MeetingService::create_meeting`]
#[derive(Debug, Clone)]
pub struct NewMeeting {
    pub title: String,
    pub organizer_id: UserId,
    /// Estimated duration in minutes
    pub estimated_duration: u32,
    pub proposed_slots: Vec<SlotRecord>,
    pub participant_ids: Vec<UserId>,
}

/// Partial update for [`MeetingService::update_meeting`]. `None` leaves the
/// field unchanged.
#[derive(Debug, Clone, Default)]
pub struct MeetingUpdate {
    pub title: Option<String>,
    pub estimated_duration: Option<u32>,
    pub proposed_slots: Option<Vec<SlotRecord>>,
    pub participant_ids: Option<Vec<UserId>>,
}

/// Owned copy of one meeting and every availability submitted for it
#[derive(Debug, Clone)]
pub struct MeetingSnapshot {
    pub meeting: Meeting,
    pub availabilities: Vec<Availability>,
}

/// Main entry point for scheduling operations
#[derive(Clone)]
pub struct MeetingService {
    index: Arc<RwLock<MeetingIndex>>,
    engine: RecommendationEngine,
}

impl MeetingService {
    /// Wrap an already populated index
    pub fn new(index: MeetingIndex) -> Self {
        Self::with_engine(index, RecommendationEngine::new())
    }

    pub fn with_engine(index: MeetingIndex, engine: RecommendationEngine) -> Self {
        Self {
            index: Arc::new(RwLock::new(index)),
            engine,
        }
    }

    /// Load a fixture directory and serve it
    pub fn load(data_dir: &Path) -> Result<Self> {
        let index = MeetingIndex::load_from_dir(data_dir)
            .with_context(|| format!("Failed to load meeting data from {}", data_dir.display()))?;
        Ok(Self::new(index))
    }

    /// (users, meetings, availabilities)
    pub fn counts(&self) -> (usize, usize, usize) {
        self.index.read().counts()
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn create_user(&self, name: &str, email: &str) -> DataResult<User> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(DataError::validation("Name and email are required"));
        }

        let user = User::new(name, email);
        self.index.write().insert_user(user.clone())?;

        info!("Created user {} ({})", user.id, user.email);
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> DataResult<User> {
        self.index
            .read()
            .get_user(id)
            .cloned()
            .ok_or(DataError::NotFound { entity: "User", id })
    }

    pub fn list_users(&self) -> Vec<User> {
        self.index.read().list_users().into_iter().cloned().collect()
    }

    // ========================================================================
    // Meetings
    // ========================================================================

    pub fn create_meeting(&self, request: NewMeeting) -> DataResult<Meeting> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(DataError::validation("Title is required"));
        }
        check_duration(request.estimated_duration)?;
        let proposed_slots = build_proposed_slots(request.proposed_slots)?;

        let mut index = self.index.write();
        let organizer = lookup_user(&index, request.organizer_id)?;
        let participants = resolve_participants(&index, organizer.id, &request.participant_ids)?;

        let meeting = Meeting::new(
            title,
            organizer,
            request.estimated_duration,
            proposed_slots,
            participants,
        );
        index.insert_meeting(meeting.clone())?;

        info!(
            "Created meeting {} '{}' with {} proposed slots and {} participants",
            meeting.id,
            meeting.title,
            meeting.proposed_slots.len(),
            meeting.participants.len()
        );
        Ok(meeting)
    }

    pub fn get_meeting(&self, id: MeetingId) -> DataResult<Meeting> {
        self.index
            .read()
            .get_meeting(id)
            .cloned()
            .ok_or(DataError::NotFound { entity: "Meeting", id })
    }

    pub fn list_meetings(&self) -> Vec<Meeting> {
        self.index.read().list_meetings().into_iter().cloned().collect()
    }

    /// Apply a partial update.
    ///
    /// Replacing the proposed slots gives every slot a new id. Existing
    /// availability is kept: it matches the new slots by time, so submitted
    /// windows that are still proposed keep counting.
    pub fn update_meeting(&self, id: MeetingId, update: MeetingUpdate) -> DataResult<Meeting> {
        let mut index = self.index.write();
        let mut meeting = index
            .get_meeting(id)
            .cloned()
            .ok_or(DataError::NotFound { entity: "Meeting", id })?;

        if let Some(title) = update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(DataError::validation("Title cannot be empty"));
            }
            meeting.title = title.to_string();
        }

        if let Some(duration) = update.estimated_duration {
            check_duration(duration)?;
            meeting.estimated_duration = duration;
        }

        if let Some(slots) = update.proposed_slots {
            let fresh = slots
                .into_iter()
                .map(|slot| SlotRecord { id: None, ..slot })
                .collect();
            meeting.proposed_slots = build_proposed_slots(fresh)?;
        }

        if let Some(participant_ids) = update.participant_ids {
            meeting.participants =
                resolve_participants(&index, meeting.organizer.id, &participant_ids)?;
        }

        meeting.updated_at = Utc::now();
        index.replace_meeting(meeting.clone())?;

        info!("Updated meeting {}", id);
        Ok(meeting)
    }

    pub fn delete_meeting(&self, id: MeetingId) -> DataResult<()> {
        self.index.write().remove_meeting(id)?;
        info!("Deleted meeting {}", id);
        Ok(())
    }

    // ========================================================================
    // Availability
    // ========================================================================

    /// Record which proposed slots `user_id` can attend.
    ///
    /// Each submitted slot must share its window with a proposed slot and
    /// is stored as that proposed slot. A user gets one record per meeting.
    pub fn add_availability(
        &self,
        user_id: UserId,
        meeting_id: MeetingId,
        slots: Vec<SlotRecord>,
    ) -> DataResult<Availability> {
        let mut index = self.index.write();
        lookup_user(&index, user_id)?;
        let meeting = index
            .get_meeting(meeting_id)
            .ok_or(DataError::NotFound { entity: "Meeting", id: meeting_id })?;

        if index.find_availability(user_id, meeting_id).is_some() {
            return Err(DataError::Conflict(format!(
                "User {} already submitted availability for meeting {}",
                user_id, meeting_id
            )));
        }
        if !meeting.is_eligible(user_id) {
            warn!(
                "User {} is not invited to meeting {}; their availability will not be counted",
                user_id, meeting_id
            );
        }

        let available_slots = snap_to_proposed(meeting, slots)?;
        let availability = Availability::new(user_id, meeting_id, available_slots);
        index.insert_availability(availability.clone())?;

        info!(
            "User {} submitted {} slots for meeting {}",
            user_id,
            availability.available_slots.len(),
            meeting_id
        );
        Ok(availability)
    }

    /// Replace the slots of an existing availability record
    pub fn update_availability(
        &self,
        id: AvailabilityId,
        slots: Vec<SlotRecord>,
    ) -> DataResult<Availability> {
        let mut index = self.index.write();
        let mut availability = index
            .get_availability(id)
            .cloned()
            .ok_or(DataError::NotFound { entity: "Availability", id })?;
        let meeting = index.get_meeting(availability.meeting_id).ok_or(
            DataError::MissingReference {
                entity: "Meeting",
                id: availability.meeting_id,
            },
        )?;

        availability.available_slots = snap_to_proposed(meeting, slots)?;
        availability.updated_at = Utc::now();
        index.replace_availability(availability.clone())?;

        info!("Updated availability {}", id);
        Ok(availability)
    }

    pub fn delete_availability(&self, id: AvailabilityId) -> DataResult<()> {
        self.index.write().remove_availability(id)?;
        info!("Deleted availability {}", id);
        Ok(())
    }

    pub fn get_availability(
        &self,
        user_id: UserId,
        meeting_id: MeetingId,
    ) -> DataResult<Availability> {
        let index = self.index.read();
        index
            .get_meeting(meeting_id)
            .ok_or(DataError::NotFound { entity: "Meeting", id: meeting_id })?;

        index
            .find_availability(user_id, meeting_id)
            .cloned()
            .ok_or(DataError::NoAvailability { user_id, meeting_id })
    }

    // ========================================================================
    // Recommendations
    // ========================================================================

    /// Copy a meeting and its availability out of the index.
    ///
    /// The read guard lives only for the duration of the copy.
    pub fn snapshot(&self, meeting_id: MeetingId) -> DataResult<MeetingSnapshot> {
        let index = self.index.read();
        let meeting = index
            .get_meeting(meeting_id)
            .cloned()
            .ok_or(DataError::NotFound { entity: "Meeting", id: meeting_id })?;
        let availabilities = index
            .get_meeting_availabilities(meeting_id)
            .into_iter()
            .cloned()
            .collect();

        Ok(MeetingSnapshot {
            meeting,
            availabilities,
        })
    }

    /// Rank the proposed slots of `meeting_id`, best first.
    ///
    /// The ranking runs on tokio's blocking pool so a large meeting does
    /// not stall the async runtime.
    pub async fn get_recommendations(&self, meeting_id: MeetingId) -> Result<Vec<RecommendedSlot>> {
        let start_time = Instant::now();

        let snapshot = self
            .snapshot(meeting_id)
            .context("Failed to snapshot meeting")?;
        debug!(
            "Snapshot of meeting {}: {} proposed slots, {} submissions",
            meeting_id,
            snapshot.meeting.proposed_slots.len(),
            snapshot.availabilities.len()
        );

        let engine = self.engine.clone();
        let recommendations = tokio::task::spawn_blocking(move || {
            engine.recommend(&snapshot.meeting, &snapshot.availabilities)
        })
        .await
        .context("Recommendation task panicked")?
        .with_context(|| format!("Failed to rank slots for meeting {}", meeting_id))?;

        info!(
            "Ranked {} slots for meeting {} in {:.2?}",
            recommendations.len(),
            meeting_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

fn check_duration(minutes: u32) -> DataResult<()> {
    if minutes == 0 {
        return Err(DataError::validation("Estimated duration must be positive"));
    }
    Ok(())
}

fn lookup_user(index: &MeetingIndex, id: UserId) -> DataResult<User> {
    index
        .get_user(id)
        .cloned()
        .ok_or(DataError::NotFound { entity: "User", id })
}

/// Resolve invited users, dropping duplicates and the organizer
fn resolve_participants(
    index: &MeetingIndex,
    organizer_id: UserId,
    participant_ids: &[UserId],
) -> DataResult<Vec<User>> {
    let mut seen = HashSet::from([organizer_id]);
    participant_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|&id| lookup_user(index, id))
        .collect()
}

/// Turn slot input into proposed slots, assigning ids where missing
fn build_proposed_slots(records: Vec<SlotRecord>) -> DataResult<Vec<TimeSlot>> {
    if records.is_empty() {
        return Err(DataError::validation("At least one proposed slot is required"));
    }

    let mut ids = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .map(|record| {
            let slot = record.into_slot();
            if slot.end_time <= slot.start_time {
                return Err(DataError::validation(format!(
                    "Slot {} must end after it starts",
                    slot.id
                )));
            }
            if !ids.insert(slot.id) {
                return Err(DataError::validation(format!("Slot id {} is used twice", slot.id)));
            }
            Ok(slot)
        })
        .collect()
}

/// Replace each submitted slot with the proposed slot sharing its window
fn snap_to_proposed(meeting: &Meeting, records: Vec<SlotRecord>) -> DataResult<Vec<TimeSlot>> {
    if records.is_empty() {
        return Err(DataError::validation("At least one available slot is required"));
    }

    let mut chosen: HashSet<Uuid> = HashSet::new();
    let mut slots = Vec::with_capacity(records.len());
    for record in records {
        let submitted = record.into_slot();
        let proposed = meeting.matching_slot(&submitted).ok_or_else(|| {
            DataError::validation(format!(
                "Slot {} - {} is not one of the proposed slots",
                submitted.start_time, submitted.end_time
            ))
        })?;
        if chosen.insert(proposed.id) {
            slots.push(proposed.clone());
        }
    }
    Ok(slots)
}
