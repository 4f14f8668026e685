//! Concrete availability filters.
//!
//! Both run in the standard pipeline, eligibility first.

pub mod eligible_participant;
pub mod proposed_slot;

pub use eligible_participant::EligibleParticipantFilter;
pub use proposed_slot::ProposedSlotFilter;
