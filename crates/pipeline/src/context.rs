//! Build a MeetingContext from a Meeting
//!
//! The context gathers everything the filters and the aggregation step
//! need to know about a meeting, so they never walk the meeting itself:
//! - Eligible participants in their stable enumeration order
//! - A HashSet of eligible ids for O(1) membership checks
//! - A HashSet of proposed (start, end) windows

use anyhow::{bail, Result};
use data_loader::{Meeting, MeetingId, SlotWindow, TimeSlot, User, UserId};
use std::collections::HashSet;

/// Precomputed view of a meeting used throughout the pipeline
#[derive(Debug, Clone, Default)]
pub struct MeetingContext {
    pub meeting_id: MeetingId,
    /// Organizer first, then invited participants in meeting order
    pub eligible: Vec<User>,
    pub eligible_ids: HashSet<UserId>,
    pub proposed_windows: HashSet<SlotWindow>,
}

impl MeetingContext {
    /// An empty context with nobody eligible and nothing proposed
    pub fn new(meeting_id: MeetingId) -> Self {
        Self {
            meeting_id,
            ..Self::default()
        }
    }

    /// Add a participant unless their id is already present
    pub fn add_participant(&mut self, user: &User) {
        if self.eligible_ids.insert(user.id) {
            self.eligible.push(user.clone());
        }
    }

    pub fn is_eligible(&self, user_id: UserId) -> bool {
        self.eligible_ids.contains(&user_id)
    }

    /// Whether `slot` has exactly the same window as some proposed slot
    pub fn is_proposed(&self, slot: &TimeSlot) -> bool {
        self.proposed_windows.contains(&slot.window())
    }

    pub fn total_participants(&self) -> usize {
        self.eligible.len()
    }
}

/// Build a MeetingContext, rejecting meetings that break the data model.
///
/// Errors when a proposed slot ends before it starts, or when two proposed
/// slots share an id. Both mean the caller handed over corrupt data, and
/// ranking it would produce misleading output.
pub fn build_meeting_context(meeting: &Meeting) -> Result<MeetingContext> {
    let mut context = MeetingContext::new(meeting.id);

    context.add_participant(&meeting.organizer);
    for participant in &meeting.participants {
        context.add_participant(participant);
    }

    let mut slot_ids = HashSet::with_capacity(meeting.proposed_slots.len());
    for slot in &meeting.proposed_slots {
        if slot.end_time < slot.start_time {
            bail!(
                "Proposed slot {} of meeting {} ends ({}) before it starts ({})",
                slot.id,
                meeting.id,
                slot.end_time,
                slot.start_time
            );
        }
        if !slot_ids.insert(slot.id) {
            bail!("Meeting {} proposes slot id {} twice", meeting.id, slot.id);
        }
        context.proposed_windows.insert(slot.window());
    }

    Ok(context)
}
