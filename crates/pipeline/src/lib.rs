//! Pipeline for filtering availability and ranking proposed meeting slots.
//!
//! This crate provides:
//! - MeetingContext, the precomputed view of a meeting
//! - Filter trait and implementations for cleaning up submissions
//! - FilterPipeline for composing filters
//! - RecommendationEngine for aggregating and ranking slots
//!
//! ## Architecture
//! The engine processes a meeting in stages:
//! 1. Build the context (eligible participants, proposed windows)
//! 2. Filters remove submissions that must not count (uninvited users, unproposed slots)
//! 3. Aggregation counts attendance per proposed slot
//! 4. Ranking orders slots by attendance, keeping proposed order on ties
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::RecommendationEngine;
//!
//! let engine = RecommendationEngine::new();
//! let ranked = engine.recommend(&meeting, &availabilities)?;
//!
//! for slot in &ranked {
//!     println!(
//!         "{}: {}/{}",
//!         slot.time_slot.start_time, slot.available_count, slot.total_participants
//!     );
//! }
//! ```

pub mod context;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod engine;

// Re-export main types
pub use context::{build_meeting_context, MeetingContext};
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use engine::{aggregate, compute_recommendations, rank, RecommendationEngine};
