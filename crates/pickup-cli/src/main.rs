//! `pickup` CLI: expand schedules and generate apartment units from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Expand a schedule request into pickup dates (stdin → stdout)
//! cat request.json | pickup expand
//!
//! # Build the unsaved parent/child records for a request
//! pickup plan -i request.json --created-by 0190f5a0-0000-7000-8000-000000000001
//!
//! # Validate, expand, and write a request to an in-memory store
//! pickup materialize -i request.json --session session.json
//! pickup materialize -i request.json --role admin
//!
//! # Completion rate, monthly activity, and status counts for stored records
//! pickup analytics -i records.json --today 2024-03-15
//!
//! # Generate unit labels for a building
//! pickup units -i building.json
//! pickup units -i building.json --preview 10
//!
//! # Convert old single-date schedules into requests
//! pickup import-legacy -i legacy.json
//!
//! # Override pickup hours from a TOML file (PICKUP_* env vars win over it)
//! pickup --config policy.toml expand -i request.json
//! ```

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use pickup_engine::legacy::LegacySchedule;
use pickup_engine::{
    BulkApartmentSpec, MemoryStore, Role, ScheduleRecord, ScheduleRequest, SchedulingPolicy,
    Session, UserId, WeekdaySet,
};
use serde::Serialize;
use std::io::{self, Read};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pickup",
    version,
    about = "Valet pickup schedule expansion and bulk apartment generation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with scheduling policy overrides
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a schedule request into concrete pickup dates
    Expand {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Build the parent/child records for a request without saving them
    Plan {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// User id stamped on every record (random if omitted)
        #[arg(long)]
        created_by: Option<UserId>,
    },
    /// Validate, expand, and persist a request into an in-memory store
    Materialize {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Session JSON file
        #[arg(long, required_unless_present = "role")]
        session: Option<String>,
        /// Act as a fresh user with this role and no property assignments
        #[arg(long, value_enum, conflicts_with = "session")]
        role: Option<RoleArg>,
    },
    /// Generate apartment unit labels for a building
    Units {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Only show the first N labels from the first two floors
        #[arg(long)]
        preview: Option<usize>,
    },
    /// Summarize schedule records: completion rate, monthly activity, status counts
    Analytics {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Reference date (YYYY-MM-DD) for the monthly window; defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Convert legacy single-date schedules into schedule requests
    ImportLegacy {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the day indices of a named preset
    Preset {
        /// weekdays, sun-thurs, or weekends
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    EliteValet,
    Resident,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Role::Admin,
            RoleArg::EliteValet => Role::EliteValet,
            RoleArg::Resident => Role::Resident,
        }
    }
}

#[derive(Serialize)]
struct UnitsOutput {
    labels: Vec<String>,
    count: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let policy = load_policy(cli.config.as_deref())?;

    match cli.command {
        Commands::Expand { input, output } => {
            let request = read_request(input.as_deref())?;
            request
                .validate(&policy)
                .context("Schedule request failed validation")?;
            let occurrences =
                pickup_engine::expand_request(&request).context("Failed to expand schedule")?;
            info!(occurrences = occurrences.len(), "expanded schedule");
            write_json(output.as_deref(), &occurrences)?;
        }
        Commands::Plan {
            input,
            output,
            created_by,
        } => {
            let request = read_request(input.as_deref())?;
            let plan = pickup_engine::plan(&request, &policy, created_by.unwrap_or_default())
                .context("Failed to plan schedule")?;
            let records: Vec<_> = std::iter::once(&plan.parent)
                .chain(plan.children.iter())
                .collect();
            write_json(output.as_deref(), &records)?;
        }
        Commands::Materialize {
            input,
            output,
            session,
            role,
        } => {
            let request = read_request(input.as_deref())?;
            let session = match (session, role) {
                (Some(path), _) => {
                    let raw = read_input(Some(&path))?;
                    serde_json::from_str::<Session>(&raw)
                        .with_context(|| format!("Invalid session JSON in {}", path))?
                }
                (None, Some(role)) => Session::new(UserId::new(), role.into()),
                (None, None) => anyhow::bail!("Pass --session <file> or --role <role>"),
            };

            let store = MemoryStore::new();
            let group = pickup_engine::materialize(&store, &session, &request, &policy)
                .await
                .context("Failed to materialize schedule")?;
            info!(parent_id = %group.parent_id, records = group.len(), "materialized schedule");
            write_json(output.as_deref(), &store.schedules())?;
        }
        Commands::Units {
            input,
            output,
            preview,
        } => {
            let raw = read_input(input.as_deref())?;
            let spec: BulkApartmentSpec =
                serde_json::from_str(&raw).context("Invalid bulk apartment spec JSON")?;
            let labels = match preview {
                Some(limit) => pickup_engine::preview(&spec, limit),
                None => pickup_engine::generate_labels(&spec),
            }
            .context("Failed to generate apartment units")?;
            let count = labels.len();
            write_json(output.as_deref(), &UnitsOutput { labels, count })?;
        }
        Commands::Analytics {
            input,
            output,
            today,
        } => {
            let raw = read_input(input.as_deref())?;
            let records: Vec<ScheduleRecord> =
                serde_json::from_str(&raw).context("Invalid schedule records JSON")?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let summary = pickup_engine::summarize(&records, today);
            info!(records = summary.total, "summarized schedules");
            write_json(output.as_deref(), &summary)?;
        }
        Commands::ImportLegacy { input, output } => {
            let raw = read_input(input.as_deref())?;
            let rows: Vec<LegacySchedule> =
                serde_json::from_str(&raw).context("Invalid legacy schedule JSON")?;
            let requests = rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| {
                    row.into_request(&policy)
                        .with_context(|| format!("Legacy schedule #{} cannot be converted", i))
                })
                .collect::<Result<Vec<ScheduleRequest>>>()?;
            write_json(output.as_deref(), &requests)?;
        }
        Commands::Preset { name } => {
            let set = WeekdaySet::preset(&name).with_context(|| {
                format!(
                    "Unknown day preset: '{}'. Available presets: weekdays, sun-thurs, weekends",
                    name
                )
            })?;
            write_json(None, &set)?;
        }
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pickup=info,pickup_engine=info")),
        )
        .with_writer(io::stderr)
        .init();
}

/// Load the scheduling policy: built-in defaults, then the TOML file, then
/// `PICKUP_*` environment variables.
fn load_policy(path: Option<&str>) -> Result<SchedulingPolicy> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::new(path, config::FileFormat::Toml));
    }
    builder = builder.add_source(config::Environment::with_prefix("PICKUP").try_parsing(true));

    builder
        .build()
        .context("Failed to load scheduling policy")?
        .try_deserialize()
        .context("Invalid scheduling policy")
}

fn read_request(path: Option<&str>) -> Result<ScheduleRequest> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Invalid schedule request JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: Option<&str>, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
