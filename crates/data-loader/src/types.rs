//! Core domain types for meeting scheduling.
//!
//! This module defines the fundamental data structures shared by the data
//! layer, the recommendation engine and the CLI.
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (UserId, MeetingId)
//! - Structs with public fields and serde attributes
//! - Tuple keys for exact-equality matching

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (organizer or participant)
pub type UserId = Uuid;

/// Unique identifier for a meeting
pub type MeetingId = Uuid;

/// Unique identifier for a proposed time slot
pub type SlotId = Uuid;

/// Unique identifier for an availability submission
pub type AvailabilityId = Uuid;

/// The `(start, end)` pair two slots must share to be the same opportunity.
pub type SlotWindow = (DateTime<Utc>, DateTime<Utc>);

// =============================================================================
// User
// =============================================================================

/// A user who can organize or participate in meetings.
///
/// The recommendation engine treats this as an opaque identity and only
/// ever compares `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
        }
    }
}

// =============================================================================
// Time Slots
// =============================================================================

/// A candidate meeting time.
///
/// Rust concept: `DateTime<Utc>` is `Copy`, so comparing windows never
/// allocates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: SlotId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl TimeSlot {
    /// Create a slot with a freshly generated id
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time,
        }
    }

    /// The matching key for this slot
    pub fn window(&self) -> SlotWindow {
        (self.start_time, self.end_time)
    }

    /// True when both instants are exactly equal. Overlap is not considered.
    pub fn same_window(&self, other: &TimeSlot) -> bool {
        self.window() == other.window()
    }

    /// Length of the slot in whole minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

// =============================================================================
// Meetings
// =============================================================================

/// A meeting with its organizer-proposed slots.
///
/// `participants` never contains the organizer; the organizer is always
/// eligible anyway (see [`Meeting::eligible_participants`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: MeetingId,
    pub title: String,
    pub organizer: User,
    /// Estimated duration in minutes
    pub estimated_duration: u32,
    pub proposed_slots: Vec<TimeSlot>,
    pub participants: Vec<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    pub fn new(
        title: impl Into<String>,
        organizer: User,
        estimated_duration: u32,
        proposed_slots: Vec<TimeSlot>,
        participants: Vec<User>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            organizer,
            estimated_duration,
            proposed_slots,
            participants,
            created_at: now,
            updated_at: now,
        }
    }

    /// Organizer first, then invited participants in meeting order,
    /// deduplicated by id.
    pub fn eligible_participants(&self) -> Vec<&User> {
        let mut seen: HashSet<UserId> = HashSet::new();
        std::iter::once(&self.organizer)
            .chain(self.participants.iter())
            .filter(|user| seen.insert(user.id))
            .collect()
    }

    /// Whether `user_id` is the organizer or an invited participant
    pub fn is_eligible(&self, user_id: UserId) -> bool {
        self.organizer.id == user_id || self.participants.iter().any(|p| p.id == user_id)
    }

    /// Find the proposed slot sharing `slot`'s window, if any
    pub fn matching_slot(&self, slot: &TimeSlot) -> Option<&TimeSlot> {
        self.proposed_slots.iter().find(|proposed| proposed.same_window(slot))
    }
}

// =============================================================================
// Availability
// =============================================================================

/// A participant's declaration of which proposed slots they can attend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub id: AvailabilityId,
    pub participant_id: UserId,
    pub meeting_id: MeetingId,
    pub available_slots: Vec<TimeSlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Availability {
    pub fn new(
        participant_id: UserId,
        meeting_id: MeetingId,
        available_slots: Vec<TimeSlot>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            participant_id,
            meeting_id,
            available_slots,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Recommendation Output
// =============================================================================

/// One proposed slot annotated with attendance statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedSlot {
    pub time_slot: TimeSlot,
    pub available_count: usize,
    pub total_participants: usize,
    pub unavailable_participants: Vec<User>,
}

impl RecommendedSlot {
    /// Share of eligible participants who can attend, 0.0 when nobody is eligible
    pub fn attendance_ratio(&self) -> f64 {
        if self.total_participants == 0 {
            0.0
        } else {
            self.available_count as f64 / self.total_participants as f64
        }
    }
}
