//! Ordered chain of availability filters.
//!
//! Each stage hands its surviving records to the next one. The standard
//! chain is eligibility first, then slot matching, so the slot filter
//! never spends time on submissions that would be discarded anyway.

use crate::context::MeetingContext;
use crate::filters::{EligibleParticipantFilter, ProposedSlotFilter};
use crate::traits::Filter;
use anyhow::{Context, Result};
use data_loader::Availability;
use tracing::debug;

/// A sequence of filters applied in insertion order.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(EligibleParticipantFilter)
///     .add_filter(ProposedSlotFilter);
///
/// let kept = pipeline.apply(availabilities, &context)?;
/// ```
pub struct FilterPipeline {
    stages: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// A pipeline with no stages; `apply` returns its input untouched
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Eligibility, then proposed-slot matching
    pub fn standard() -> Self {
        Self::new()
            .add_filter(EligibleParticipantFilter)
            .add_filter(ProposedSlotFilter)
    }

    /// Append a stage (builder pattern)
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.stages.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names, in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage over `availabilities`.
    ///
    /// Stops at the first failing stage; the error names the stage.
    pub fn apply(
        &self,
        availabilities: Vec<Availability>,
        context: &MeetingContext,
    ) -> Result<Vec<Availability>> {
        self.stages
            .iter()
            .try_fold(availabilities, |records, stage| -> Result<Vec<Availability>> {
                let before = records.len();
                let kept = stage
                    .apply(records, context)
                    .with_context(|| format!("Filter {} failed", stage.name()))?;

                debug!(
                    "{}: kept {} of {} availability records for meeting {}",
                    stage.name(),
                    kept.len(),
                    before,
                    context.meeting_id
                );
                Ok(kept)
            })
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::build_meeting_context;
    use anyhow::bail;
    use chrono::{TimeZone, Utc};
    use data_loader::{Meeting, TimeSlot, User};
    use uuid::Uuid;

    struct RejectAll;

    impl Filter for RejectAll {
        fn name(&self) -> &str {
            "RejectAll"
        }

        fn apply(&self, _: Vec<Availability>, _: &MeetingContext) -> Result<Vec<Availability>> {
            bail!("refusing every record")
        }
    }

    fn meeting_with_guest() -> (Meeting, User) {
        let organizer = User::new("Olivia", "olivia@example.com");
        let guest = User::new("Gina", "gina@example.com");
        let slot = TimeSlot::new(
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap(),
        );
        let meeting = Meeting::new("Sync", organizer, 30, vec![slot], vec![guest.clone()]);
        (meeting, guest)
    }

    fn submissions(meeting: &Meeting, guest: &User) -> Vec<Availability> {
        vec![
            Availability::new(guest.id, meeting.id, meeting.proposed_slots.clone()),
            Availability::new(Uuid::new_v4(), meeting.id, meeting.proposed_slots.clone()),
        ]
    }

    #[test]
    fn test_no_stages_is_identity() {
        let (meeting, guest) = meeting_with_guest();
        let context = build_meeting_context(&meeting).unwrap();
        let pipeline = FilterPipeline::new();

        assert!(pipeline.is_empty());
        let kept = pipeline.apply(submissions(&meeting, &guest), &context).unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_standard_pipeline() {
        let (meeting, guest) = meeting_with_guest();
        let context = build_meeting_context(&meeting).unwrap();
        let pipeline = FilterPipeline::default();

        let kept = pipeline.apply(submissions(&meeting, &guest), &context).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].participant_id, guest.id);
        assert_eq!(
            pipeline.filter_names(),
            vec!["EligibleParticipantFilter", "ProposedSlotFilter"]
        );
    }

    #[test]
    fn test_failing_stage_is_named() {
        let (meeting, guest) = meeting_with_guest();
        let context = build_meeting_context(&meeting).unwrap();
        let pipeline = FilterPipeline::standard().add_filter(RejectAll);

        let err = pipeline
            .apply(submissions(&meeting, &guest), &context)
            .unwrap_err();
        assert_eq!(pipeline.len(), 3);
        assert!(err.to_string().contains("RejectAll"));
    }
}
