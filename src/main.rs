use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use outing_rotation::display::{
    print_issues, print_rotation_plan, print_stats, print_week_schedule, write_schedules_json,
    write_schedules_to_file,
};
use outing_rotation::parser::{load_houses, load_vendors};
use outing_rotation::{
    check_conflict, rotation_plan, validate_rotation, CsvHistoryRepository, EngineConfig, HistoryTracker, Roster,
    ScheduleGenerator, ScheduleStats, WeekSchedule,
};

/// Share of houses each priority vendor should reach over a run
const MIN_ROTATION_COVERAGE: f64 = 0.7;

#[derive(Parser)]
#[command(name = "outing-rotation")]
#[command(about = "Weekly house outing schedules with fair priority vendor rotation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate weekly schedules
    Generate {
        /// Houses CSV
        #[arg(long)]
        houses: PathBuf,

        /// Vendors CSV
        #[arg(long)]
        vendors: PathBuf,

        /// First anchor date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        #[arg(long, default_value = "52")]
        weeks: usize,

        /// Rotation history CSV, read before and written after a successful run
        #[arg(long)]
        history: Option<PathBuf>,

        /// Engine config JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write the schedules as JSON
        #[arg(long)]
        out: Option<PathBuf>,

        /// Text schedule output
        #[arg(long, default_value = "schedule.txt")]
        text: PathBuf,
    },
    /// Preview the pure priority rotation without capacity or conflicts
    Plan {
        #[arg(long)]
        houses: PathBuf,

        #[arg(long)]
        vendors: PathBuf,

        #[arg(long)]
        start: NaiveDate,

        #[arg(long, default_value = "8")]
        weeks: usize,
    },
    /// Check whether a vendor can take a house's slot in a saved schedule week
    Check {
        /// Schedule JSON written by `generate --out`
        #[arg(long)]
        schedule: PathBuf,

        #[arg(long)]
        houses: PathBuf,

        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        house: String,

        #[arg(long)]
        vendor: String,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "outing_rotation=info".into()),
    );

    // Logs go to stderr so stdout stays the schedule
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Generate {
            houses,
            vendors,
            start,
            weeks,
            history,
            config,
            out,
            text,
        } => {
            let config = match config {
                Some(path) => EngineConfig::from_json_file(path)?,
                None => EngineConfig::default(),
            };

            println!("Loading houses and vendors from CSV...");
            let roster = Roster::new(load_houses(&houses)?, load_vendors(&vendors)?)?;
            println!(
                "Loaded {} houses, {} active vendors ({} priority)",
                roster.houses().len(),
                roster.active_vendors().count(),
                roster.priority_vendors().count()
            );

            let mut generator = ScheduleGenerator::new(config, HistoryTracker::new());
            let schedules = match &history {
                Some(path) => {
                    let repository = CsvHistoryRepository::new(path);
                    generator.generate_with_repository(&repository, &roster, start, weeks)?
                }
                None => generator.generate_for_roster(&roster, start, weeks)?,
            };

            for week in &schedules {
                print_week_schedule(week);
            }
            print_stats(&ScheduleStats::from_schedules(&schedules));

            let priority: Vec<&str> = roster.priority_vendors().map(|v| v.name.as_str()).collect();
            print_issues(&validate_rotation(
                &schedules,
                roster.houses(),
                &priority,
                MIN_ROTATION_COVERAGE,
            ));

            println!("\n=== Writing Schedules to Files ===");
            write_schedules_to_file(&schedules, &text)?;
            println!("Schedule saved to {}", text.display());
            if let Some(path) = out {
                write_schedules_json(&schedules, &path)?;
                println!("JSON saved to {}", path.display());
            }
            if let Some(path) = history {
                println!("History saved to {} ({} entries)", path.display(), generator.history().len());
            }
        }
        Commands::Plan {
            houses,
            vendors,
            start,
            weeks,
        } => {
            let roster = Roster::new(load_houses(&houses)?, load_vendors(&vendors)?)?;
            let house_names: Vec<&str> = roster.houses().iter().map(|h| h.name.as_str()).collect();
            let priority: Vec<&str> = roster.priority_vendors().map(|v| v.name.as_str()).collect();

            let plan = rotation_plan(&house_names, &priority, start, weeks)?;
            print_rotation_plan(&house_names, &plan);
        }
        Commands::Check {
            schedule,
            houses,
            date,
            house,
            vendor,
        } => {
            let houses = load_houses(&houses)?;
            let file = std::fs::File::open(&schedule)?;
            let schedules: Vec<WeekSchedule> = serde_json::from_reader(file)?;

            let existing = schedules
                .iter()
                .find(|w| w.date == date)
                .map(|w| w.assignments.as_slice())
                .unwrap_or_default();
            if existing.is_empty() {
                tracing::warn!(%date, "no saved week on this date; checking against an empty week");
            }

            let report = check_conflict(&houses, date, &house, &vendor, existing)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
