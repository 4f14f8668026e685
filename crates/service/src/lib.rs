//! Service crate for the MeetSync scheduling engine.
//!
//! This crate contains the MeetingService that owns the shared meeting
//! index, validates mutations and serves slot recommendations.

pub mod scheduler;

pub use scheduler::{MeetingService, MeetingSnapshot, MeetingUpdate, NewMeeting};
