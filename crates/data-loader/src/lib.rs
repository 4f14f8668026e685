//! # Data Loader Crate
//!
//! This crate is the data layer for MeetSync: domain types, the in-memory
//! meeting index and loading of JSON fixture directories.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (User, TimeSlot, Meeting, Availability, RecommendedSlot)
//! - **parser**: Parse fixture files into records
//! - **index**: MeetingIndex store, reference resolution and validation
//! - **error**: Error types for the data layer
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::MeetingIndex;
//! use std::path::Path;
//!
//! let index = MeetingIndex::load_from_dir(Path::new("data/sample"))?;
//!
//! for meeting in index.list_meetings() {
//!     let submissions = index.get_meeting_availabilities(meeting.id);
//!     println!("{}: {} submissions", meeting.title, submissions.len());
//! }
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataError, Result};
pub use index::MeetingIndex;
pub use types::{
    // Type aliases
    AvailabilityId,
    MeetingId,
    SlotId,
    SlotWindow,
    UserId,
    // Core types
    Availability,
    Meeting,
    RecommendedSlot,
    TimeSlot,
    User,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_meeting_index_creation() {
        let index = MeetingIndex::new();
        let (users, meetings, availabilities) = index.counts();

        assert_eq!(users, 0);
        assert_eq!(meetings, 0);
        assert_eq!(availabilities, 0);
    }

    #[test]
    fn test_insert_user() {
        let mut index = MeetingIndex::new();
        let user = User::new("Alice", "alice@example.com");

        index.insert_user(user.clone()).unwrap();

        let retrieved = index.get_user(user.id).unwrap();
        assert_eq!(retrieved.name, "Alice");
        assert_eq!(index.list_users().len(), 1);
    }

    #[test]
    fn test_insert_meeting() {
        let mut index = MeetingIndex::new();
        let organizer = User::new("Olivia", "olivia@example.com");
        index.insert_user(organizer.clone()).unwrap();

        let start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 10, 11, 0, 0).unwrap();
        let slots = vec![TimeSlot::new(start, end)];
        let meeting = Meeting::new("Standup", organizer, 15, slots, vec![]);

        index.insert_meeting(meeting.clone()).unwrap();

        let retrieved = index.get_meeting(meeting.id).unwrap();
        assert_eq!(retrieved.title, "Standup");
        assert_eq!(retrieved.proposed_slots.len(), 1);
        assert!(index.validate().is_ok());
    }
}
