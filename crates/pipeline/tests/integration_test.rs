//! Integration tests for the pipeline.
//!
//! These tests run the filters, aggregation and ranking together on
//! realistic meetings.

use chrono::{DateTime, TimeZone, Utc};
use data_loader::{Availability, Meeting, RecommendedSlot, TimeSlot, User};
use pipeline::filters::*;
use pipeline::{compute_recommendations, FilterPipeline, RecommendationEngine};
use uuid::Uuid;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
}

struct Team {
    organizer: User,
    alice: User,
    bob: User,
}

fn create_team() -> Team {
    Team {
        organizer: User::new("Olivia", "olivia@example.com"),
        alice: User::new("Alice", "alice@example.com"),
        bob: User::new("Bob", "bob@example.com"),
    }
}

fn create_meeting(team: &Team, slots: Vec<TimeSlot>) -> Meeting {
    Meeting::new(
        "Quarterly planning",
        team.organizer.clone(),
        60,
        slots,
        vec![team.alice.clone(), team.bob.clone()],
    )
}

fn assert_counts_consistent(recommendations: &[RecommendedSlot]) {
    for slot in recommendations {
        assert_eq!(
            slot.available_count + slot.unavailable_participants.len(),
            slot.total_participants,
            "available + unavailable must cover every eligible participant"
        );
    }
}

#[test]
fn test_everyone_available_for_single_slot() {
    let team = create_team();
    let slot = TimeSlot::new(at(10), at(11));
    let meeting = create_meeting(&team, vec![slot.clone()]);

    let availabilities: Vec<Availability> = [&team.organizer, &team.alice, &team.bob]
        .iter()
        .map(|user| Availability::new(user.id, meeting.id, vec![slot.clone()]))
        .collect();

    let recommendations = compute_recommendations(&meeting, &availabilities).unwrap();

    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].available_count, 3);
    assert_eq!(recommendations[0].total_participants, 3);
    assert!(recommendations[0].unavailable_participants.is_empty());
}

#[test]
fn test_tied_slots_keep_proposed_order() {
    let team = create_team();
    let morning = TimeSlot::new(at(9), at(10));
    let afternoon = TimeSlot::new(at(14), at(15));
    let meeting = create_meeting(&team, vec![morning.clone(), afternoon.clone()]);

    let availabilities = vec![
        Availability::new(team.organizer.id, meeting.id, vec![morning.clone(), afternoon.clone()]),
        Availability::new(team.alice.id, meeting.id, vec![morning.clone()]),
        Availability::new(team.bob.id, meeting.id, vec![afternoon.clone()]),
    ];

    let recommendations = compute_recommendations(&meeting, &availabilities).unwrap();

    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0].time_slot.id, morning.id);
    assert_eq!(recommendations[1].time_slot.id, afternoon.id);
    for slot in &recommendations {
        assert_eq!(slot.available_count, 2);
        assert_eq!(slot.total_participants, 3);
    }
    assert_eq!(recommendations[0].unavailable_participants, vec![team.bob.clone()]);
    assert_eq!(recommendations[1].unavailable_participants, vec![team.alice.clone()]);
}

#[test]
fn test_no_submissions_lists_everyone_unavailable() {
    let team = create_team();
    let meeting = create_meeting(&team, vec![TimeSlot::new(at(10), at(11))]);

    let recommendations = compute_recommendations(&meeting, &[]).unwrap();

    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].available_count, 0);
    assert_eq!(recommendations[0].total_participants, 3);
    assert_eq!(
        recommendations[0].unavailable_participants,
        vec![team.organizer.clone(), team.alice.clone(), team.bob.clone()]
    );
}

#[test]
fn test_uninvited_submission_is_ignored() {
    let team = create_team();
    let slot = TimeSlot::new(at(10), at(11));
    let meeting = create_meeting(&team, vec![slot.clone()]);

    let baseline = vec![Availability::new(team.alice.id, meeting.id, vec![slot.clone()])];
    let mut with_stranger = baseline.clone();
    with_stranger.push(Availability::new(Uuid::new_v4(), meeting.id, vec![slot.clone()]));

    let expected = compute_recommendations(&meeting, &baseline).unwrap();
    let actual = compute_recommendations(&meeting, &with_stranger).unwrap();

    assert_eq!(actual, expected);
    assert_eq!(actual[0].available_count, 1);
    assert_eq!(actual[0].total_participants, 3);
}

#[test]
fn test_matching_uses_times_not_ids() {
    let team = create_team();
    let proposed = TimeSlot::new(at(10), at(11));
    let meeting = create_meeting(&team, vec![proposed.clone()]);

    // Same window, fresh id
    let resubmitted = TimeSlot::new(at(10), at(11));
    let overlapping = TimeSlot::new(at(10), at(12));
    let availabilities = vec![
        Availability::new(team.alice.id, meeting.id, vec![resubmitted]),
        Availability::new(team.bob.id, meeting.id, vec![overlapping]),
    ];

    let recommendations = compute_recommendations(&meeting, &availabilities).unwrap();

    assert_eq!(recommendations[0].time_slot.id, proposed.id);
    assert_eq!(recommendations[0].available_count, 1);
    assert_eq!(
        recommendations[0].unavailable_participants,
        vec![team.organizer.clone(), team.bob.clone()]
    );
}

#[test]
fn test_duplicate_records_are_unioned() {
    let team = create_team();
    let morning = TimeSlot::new(at(9), at(10));
    let afternoon = TimeSlot::new(at(14), at(15));
    let meeting = create_meeting(&team, vec![morning.clone(), afternoon.clone()]);

    let availabilities = vec![
        Availability::new(team.alice.id, meeting.id, vec![morning.clone()]),
        Availability::new(team.alice.id, meeting.id, vec![afternoon.clone(), morning.clone()]),
    ];

    let recommendations = compute_recommendations(&meeting, &availabilities).unwrap();

    for slot in &recommendations {
        assert_eq!(slot.available_count, 1, "Alice must be counted once per slot");
    }
    assert_counts_consistent(&recommendations);
}

#[test]
fn test_ranking_is_descending_and_idempotent() {
    let team = create_team();
    let slots = vec![
        TimeSlot::new(at(8), at(9)),
        TimeSlot::new(at(10), at(11)),
        TimeSlot::new(at(12), at(13)),
        TimeSlot::new(at(15), at(16)),
    ];
    let meeting = create_meeting(&team, slots.clone());

    let availabilities = vec![
        Availability::new(
            team.organizer.id,
            meeting.id,
            vec![slots[1].clone(), slots[2].clone(), slots[3].clone()],
        ),
        Availability::new(team.alice.id, meeting.id, vec![slots[2].clone(), slots[3].clone()]),
        Availability::new(team.bob.id, meeting.id, vec![slots[2].clone()]),
    ];

    let engine = RecommendationEngine::new();
    let first = engine.recommend(&meeting, &availabilities).unwrap();
    let second = engine.recommend(&meeting, &availabilities).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), meeting.proposed_slots.len());

    let counts: Vec<usize> = first.iter().map(|r| r.available_count).collect();
    assert_eq!(counts, vec![3, 2, 1, 0]);
    let order: Vec<_> = first.iter().map(|r| r.time_slot.id).collect();
    assert_eq!(order, vec![slots[2].id, slots[3].id, slots[1].id, slots[0].id]);

    assert!(first.iter().all(|r| r.total_participants == 3));
    assert_counts_consistent(&first);
}

#[test]
fn test_custom_pipeline_without_eligibility_filter() {
    let team = create_team();
    let slot = TimeSlot::new(at(10), at(11));
    let meeting = create_meeting(&team, vec![slot.clone()]);

    let availabilities = vec![
        Availability::new(team.bob.id, meeting.id, vec![slot.clone()]),
        Availability::new(Uuid::new_v4(), meeting.id, vec![slot.clone()]),
    ];

    let engine =
        RecommendationEngine::with_pipeline(FilterPipeline::new().add_filter(ProposedSlotFilter));
    let recommendations = engine.recommend(&meeting, &availabilities).unwrap();

    // Aggregation only walks eligible participants
    assert_eq!(recommendations[0].available_count, 1);
    assert_counts_consistent(&recommendations);
}
