//! Filter to drop submitted slots that were never proposed.
//!
//! Submissions are matched to proposals by exact (start, end) equality.
//! A slot whose window matches nothing cannot count toward any proposal,
//! so it is dropped here rather than carried into aggregation.

use crate::context::MeetingContext;
use crate::traits::Filter;
use anyhow::Result;
use data_loader::Availability;
use tracing::debug;

/// Keeps only slots whose window is one of the meeting's proposed windows.
///
/// ## Algorithm
/// 1. For each record, retain slots found in MeetingContext.proposed_windows
/// 2. Drop records that end up with no slots at all
pub struct ProposedSlotFilter;

impl Filter for ProposedSlotFilter {
    fn name(&self) -> &str {
        "ProposedSlotFilter"
    }

    fn apply(
        &self,
        availabilities: Vec<Availability>,
        context: &MeetingContext,
    ) -> Result<Vec<Availability>> {
        let filtered: Vec<Availability> = availabilities
            .into_iter()
            .filter_map(|mut availability| {
                let submitted = availability.available_slots.len();
                availability
                    .available_slots
                    .retain(|slot| context.is_proposed(slot));

                let dropped = submitted - availability.available_slots.len();
                if dropped > 0 {
                    debug!(
                        "Dropped {} unmatched slots from availability {}",
                        dropped, availability.id
                    );
                }

                (!availability.available_slots.is_empty()).then_some(availability)
            })
            .collect();

        Ok(filtered)
    }
}
