use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{MeetingId, RecommendedSlot, TimeSlot, UserId};
use service::MeetingService;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::debug;

/// MeetSync - Meeting slot recommendation engine
#[derive(Parser)]
#[command(name = "meetsync")]
#[command(about = "Rank proposed meeting times by participant availability", long_about = None)]
struct Cli {
    /// Directory containing users.json, meetings.json and availabilities.json
    #[arg(short, long, env = "MEETSYNC_DATA_DIR", default_value = "data/sample")]
    data_dir: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "MEETSYNC_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a meeting's proposed slots
    Recommend {
        /// Meeting to rank
        #[arg(long)]
        meeting_id: MeetingId,

        /// Show only the best N slots
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        limit: Option<usize>,

        /// Print the ranking as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a meeting and who has responded
    Meeting {
        #[arg(long)]
        meeting_id: MeetingId,
    },

    /// List all users
    Users,

    /// Show one participant's availability for a meeting
    Availability {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        meeting_id: MeetingId,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "16")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level. Logs and status lines go to stderr so
    // stdout carries only command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    eprintln!("Loading meeting data from {}...", cli.data_dir.display());
    let start = Instant::now();
    let service = MeetingService::load(&cli.data_dir)?;
    let (users, meetings, availabilities) = service.counts();
    eprintln!(
        "{} Loaded {} users, {} meetings, {} availability records in {:?}",
        "✓".green(),
        users,
        meetings,
        availabilities,
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend {
            meeting_id,
            limit,
            json,
        } => handle_recommend(&service, meeting_id, limit, json).await?,
        Commands::Meeting { meeting_id } => handle_meeting(&service, meeting_id)?,
        Commands::Users => handle_users(&service),
        Commands::Availability {
            user_id,
            meeting_id,
        } => handle_availability(&service, user_id, meeting_id)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(service, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    service: &MeetingService,
    meeting_id: MeetingId,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let meeting = service.get_meeting(meeting_id)?;
    let mut recommendations = service.get_recommendations(meeting_id).await?;

    if let Some(limit) = limit {
        recommendations.truncate(limit);
    }

    if json {
        let output = serde_json::to_string_pretty(&recommendations)
            .context("Failed to serialize recommendations")?;
        println!("{}", output);
        return Ok(());
    }

    println!(
        "{}",
        format!("Recommended slots for '{}':", meeting.title).bold().blue()
    );
    print_recommendations(&recommendations);
    Ok(())
}

/// Handle the 'meeting' command
fn handle_meeting(service: &MeetingService, meeting_id: MeetingId) -> Result<()> {
    let snapshot = service.snapshot(meeting_id)?;
    let meeting = &snapshot.meeting;

    println!("{}", format!("Meeting: {}", meeting.title).bold().blue());
    println!("{}Id: {}", "• ".green(), meeting.id);
    println!(
        "{}Organizer: {} <{}>",
        "• ".green(),
        meeting.organizer.name,
        meeting.organizer.email
    );
    println!("{}Duration: {} minutes", "• ".green(), meeting.estimated_duration);

    println!("Proposed slots:");
    for slot in &meeting.proposed_slots {
        println!("  - {}", format_slot(slot));
    }

    println!("Responses:");
    for participant in meeting.eligible_participants() {
        let submitted: Vec<&TimeSlot> = snapshot
            .availabilities
            .iter()
            .filter(|a| a.participant_id == participant.id)
            .flat_map(|a| a.available_slots.iter())
            .collect();

        if submitted.is_empty() {
            println!("  {} {} (no response)", "✗".red(), participant.name);
        } else {
            println!(
                "  {} {} ({} slots)",
                "✓".green(),
                participant.name,
                submitted.len()
            );
        }
    }

    let uninvited = snapshot
        .availabilities
        .iter()
        .filter(|a| !meeting.is_eligible(a.participant_id))
        .count();
    if uninvited > 0 {
        println!(
            "{}",
            format!("{} submissions from uninvited users are ignored", uninvited).yellow()
        );
    }
    Ok(())
}

/// Handle the 'users' command
fn handle_users(service: &MeetingService) {
    let users = service.list_users();
    println!("{}", format!("Users ({}):", users.len()).bold().blue());
    for user in users {
        println!("  {} {} <{}>", user.id.to_string().dimmed(), user.name, user.email);
    }
}

/// Handle the 'availability' command
fn handle_availability(
    service: &MeetingService,
    user_id: UserId,
    meeting_id: MeetingId,
) -> Result<()> {
    let user = service.get_user(user_id)?;
    let meeting = service.get_meeting(meeting_id)?;
    let availability = service
        .get_availability(user_id, meeting_id)
        .with_context(|| format!("{} has not responded to '{}'", user.name, meeting.title))?;

    println!(
        "{}",
        format!("{} for '{}':", user.name, meeting.title).bold().blue()
    );
    for slot in &meeting.proposed_slots {
        let available = availability
            .available_slots
            .iter()
            .any(|chosen| chosen.same_window(slot));
        let mark = if available { "✓".green() } else { "✗".red() };
        println!("  {} {}", mark, format_slot(slot));
    }
    println!(
        "{}Last updated: {}",
        "• ".cyan(),
        availability.updated_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: MeetingService,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let meeting_ids: Vec<MeetingId> = service.list_meetings().iter().map(|m| m.id).collect();
    if meeting_ids.is_empty() {
        bail!("No meetings loaded; nothing to benchmark");
    }
    if requests == 0 || concurrent == 0 {
        bail!("--requests and --concurrent must both be positive");
    }

    println!(
        "Running {} requests across {} meetings ({} concurrent)...",
        requests,
        meeting_ids.len(),
        concurrent
    );

    let semaphore = Arc::new(Semaphore::new(concurrent));
    let wall_clock = Instant::now();

    let mut handles = Vec::with_capacity(requests);
    for _ in 0..requests {
        let meeting_id = meeting_ids[rand::random_range(0..meeting_ids.len())];
        let service = service.clone();
        let semaphore = semaphore.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            service.get_recommendations(meeting_id).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();
    debug!("Collected {} timings", timings.len());

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Nearest-rank percentile of an ascending, non-empty slice
fn percentile(sorted: &[Duration], quantile: f64) -> Duration {
    let rank = (sorted.len() as f64 * quantile).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn format_slot(slot: &TimeSlot) -> String {
    format!(
        "{} - {} ({} min)",
        slot.start_time.format("%a %Y-%m-%d %H:%M"),
        slot.end_time.format("%H:%M"),
        slot.duration_minutes()
    )
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[RecommendedSlot]) {
    if recommendations.is_empty() {
        println!("{}", "No proposed slots.".yellow());
        return;
    }

    for (i, rec) in recommendations.iter().enumerate() {
        let attendance = format!(
            "{}/{} available ({:.0}%)",
            rec.available_count,
            rec.total_participants,
            rec.attendance_ratio() * 100.0
        );
        let attendance = if rec.unavailable_participants.is_empty() {
            attendance.green()
        } else {
            attendance.yellow()
        };

        println!(
            "{}. {} - {}",
            (i + 1).to_string().green(),
            format_slot(&rec.time_slot),
            attendance
        );

        if !rec.unavailable_participants.is_empty() {
            let names: Vec<&str> = rec
                .unavailable_participants
                .iter()
                .map(|u| u.name.as_str())
                .collect();
            println!("   Unavailable: {}", names.join(", ").dimmed());
        }
    }
}
