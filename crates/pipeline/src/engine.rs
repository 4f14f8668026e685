//! Recommendation engine: rank a meeting's proposed slots by attendance.
//!
//! ## Algorithm
//! 1. Build a MeetingContext (eligible participants, proposed windows)
//! 2. Run the FilterPipeline over the availability submissions
//! 3. Union each participant's windows across all of their records
//! 4. For every proposed slot, split the eligible participants into
//!    available and unavailable
//! 5. Stable sort by available count, highest first
//!
//! Ties keep the order in which the organizer proposed the slots, so the
//! output is fully determined by the inputs.

use crate::context::{build_meeting_context, MeetingContext};
use crate::filter_pipeline::FilterPipeline;
use anyhow::{Context, Result};
use data_loader::{Availability, Meeting, RecommendedSlot, SlotWindow, TimeSlot, User, UserId};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Stateless recommendation engine.
///
/// Cloning is cheap: the filter pipeline is shared behind an Arc, so one
/// engine can be handed to every worker thread.
#[derive(Clone)]
pub struct RecommendationEngine {
    filter_pipeline: Arc<FilterPipeline>,
}

impl RecommendationEngine {
    /// Engine running the standard filter pipeline
    pub fn new() -> Self {
        Self::with_pipeline(FilterPipeline::standard())
    }

    /// Engine running a caller-supplied pipeline
    pub fn with_pipeline(filter_pipeline: FilterPipeline) -> Self {
        Self {
            filter_pipeline: Arc::new(filter_pipeline),
        }
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filter_pipeline.filter_names()
    }

    /// Produce one RecommendedSlot per proposed slot, best first.
    ///
    /// # Arguments
    /// * `meeting` - The meeting whose proposed slots are ranked
    /// * `availabilities` - Submissions for this meeting, in any order
    ///
    /// # Errors
    /// Fails when the meeting has a slot ending before it starts or two
    /// proposed slots sharing an id.
    #[instrument(
        skip(self, meeting, availabilities),
        fields(meeting_id = %meeting.id, submissions = availabilities.len())
    )]
    pub fn recommend(
        &self,
        meeting: &Meeting,
        availabilities: &[Availability],
    ) -> Result<Vec<RecommendedSlot>> {
        if meeting.proposed_slots.is_empty() {
            debug!("Meeting {} has no proposed slots", meeting.id);
            return Ok(Vec::new());
        }

        let context = build_meeting_context(meeting)
            .with_context(|| format!("Invalid meeting {}", meeting.id))?;
        debug!(
            "Built meeting context: {} eligible participants, {} proposed windows",
            context.total_participants(),
            context.proposed_windows.len()
        );

        let filtered = self
            .filter_pipeline
            .apply(availabilities.to_vec(), &context)
            .context("Failed to apply availability filters")?;

        let recommendations = rank(aggregate(&meeting.proposed_slots, &context, &filtered));
        debug!("Ranked {} proposed slots", recommendations.len());

        Ok(recommendations)
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank `meeting`'s proposed slots with the standard pipeline
pub fn compute_recommendations(
    meeting: &Meeting,
    availabilities: &[Availability],
) -> Result<Vec<RecommendedSlot>> {
    RecommendationEngine::new().recommend(meeting, availabilities)
}

/// Count attendance for each proposed slot, in proposed order.
///
/// Only participants in `context.eligible` are counted, so submissions
/// from anyone else have no effect even when no filter removed them.
/// `unavailable_participants` follows the eligible enumeration order.
pub fn aggregate(
    proposed_slots: &[TimeSlot],
    context: &MeetingContext,
    availabilities: &[Availability],
) -> Vec<RecommendedSlot> {
    let mut windows_by_participant: HashMap<UserId, HashSet<SlotWindow>> = HashMap::new();
    for availability in availabilities {
        windows_by_participant
            .entry(availability.participant_id)
            .or_default()
            .extend(availability.available_slots.iter().map(TimeSlot::window));
    }

    let total_participants = context.total_participants();

    // Rayon's indexed collect keeps the proposed order
    proposed_slots
        .par_iter()
        .map(|slot| {
            let window = slot.window();
            let (available, unavailable): (Vec<&User>, Vec<&User>) =
                context.eligible.iter().partition(|user| {
                    windows_by_participant
                        .get(&user.id)
                        .is_some_and(|windows| windows.contains(&window))
                });

            RecommendedSlot {
                time_slot: slot.clone(),
                available_count: available.len(),
                total_participants,
                unavailable_participants: unavailable.into_iter().cloned().collect(),
            }
        })
        .collect()
}

/// Stable sort by available count, highest first
pub fn rank(mut recommendations: Vec<RecommendedSlot>) -> Vec<RecommendedSlot> {
    recommendations.sort_by(|a, b| b.available_count.cmp(&a.available_count));
    recommendations
}
