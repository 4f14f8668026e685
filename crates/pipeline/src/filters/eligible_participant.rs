//! Filter to remove availability submitted by users who were not invited.
//!
//! This is the first filter in the standard pipeline. A submission from
//! someone who is neither the organizer nor an invited participant must not
//! affect any count.

use crate::context::MeetingContext;
use crate::traits::Filter;
use anyhow::Result;
use data_loader::Availability;
use tracing::warn;

/// Removes availability records whose participant is not eligible.
///
/// ## Algorithm
/// Uses the HashSet in MeetingContext.eligible_ids for O(1) lookups.
pub struct EligibleParticipantFilter;

impl Filter for EligibleParticipantFilter {
    fn name(&self) -> &str {
        "EligibleParticipantFilter"
    }

    fn apply(
        &self,
        availabilities: Vec<Availability>,
        context: &MeetingContext,
    ) -> Result<Vec<Availability>> {
        let (eligible, ineligible): (Vec<Availability>, Vec<Availability>) = availabilities
            .into_iter()
            .partition(|availability| context.is_eligible(availability.participant_id));

        for availability in &ineligible {
            warn!(
                "Ignoring availability {} from user {}: not invited to meeting {}",
                availability.id, availability.participant_id, context.meeting_id
            );
        }

        Ok(eligible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::User;
    use uuid::Uuid;

    #[test]
    fn test_eligible_participant_filter() {
        let organizer = User::new("Olivia", "olivia@example.com");
        let alice = User::new("Alice", "alice@example.com");

        let mut context = MeetingContext::new(Uuid::new_v4());
        context.add_participant(&organizer);
        context.add_participant(&alice);

        let stranger = Uuid::new_v4();
        let availabilities = vec![
            Availability::new(organizer.id, context.meeting_id, vec![]),
            Availability::new(stranger, context.meeting_id, vec![]),
            Availability::new(alice.id, context.meeting_id, vec![]),
        ];

        let filtered = EligibleParticipantFilter.apply(availabilities, &context).unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].participant_id, organizer.id);
        assert_eq!(filtered[1].participant_id, alice.id);
    }
}
