//! The Filter trait: one stage of availability clean-up.
//!
//! Filters see every submission for a meeting before aggregation and
//! decide what may count toward a slot.

use crate::context::MeetingContext;
use anyhow::Result;
use data_loader::Availability;

/// A single stage of the FilterPipeline.
///
/// Implementations must be `Send + Sync`: one engine, and therefore one
/// pipeline, is shared by every request. A stage owns the records it is
/// given and may drop whole records or trim slots out of them.
pub trait Filter: Send + Sync {
    /// Stable identifier used in logs and error context
    fn name(&self) -> &str;

    /// Return the records that survive this stage.
    ///
    /// `context` holds the meeting's eligible participants and proposed
    /// windows; stages never look at the meeting itself.
    fn apply(
        &self,
        availabilities: Vec<Availability>,
        context: &MeetingContext,
    ) -> Result<Vec<Availability>>;
}
