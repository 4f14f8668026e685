use data_loader::MeetingIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/sample");

    println!("Loading meeting fixtures...\n");

    let start = Instant::now();
    let index = MeetingIndex::load_from_dir(data_dir)
        .expect("Failed to load fixtures");
    let elapsed = start.elapsed();

    let (users, meetings, availabilities) = index.counts();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Meetings: {}", meetings);
    println!("Availability records: {}", availabilities);

    for meeting in index.list_meetings() {
        println!(
            "  {} ({} slots, {} submissions)",
            meeting.title,
            meeting.proposed_slots.len(),
            index.get_meeting_availabilities(meeting.id).len()
        );
    }
}
