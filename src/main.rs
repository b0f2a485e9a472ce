use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{value_parser, Arg, ArgMatches, Command};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use thiserror::Error;

use clinic_analytics::config;
use clinic_analytics::db::{open_database, DatabaseError};
use clinic_analytics::goals::{self, GoalError, GoalRequest};
use clinic_analytics::models::DateRange;
use clinic_analytics::period;
use clinic_analytics::synthesizer::{self, SeedError, SeedOptions, SeedSummary};

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Goal(#[from] GoalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn db_arg() -> Arg {
    Arg::new("db")
        .long("db")
        .value_parser(value_parser!(PathBuf))
        .help("SQLite database file (defaults to $CLINIC_ANALYTICS_DB or ~/ClinicAnalytics/clinic.db)")
}

fn month_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).value_name("YYYY-MM").help(help)
}

fn cli() -> Command {
    Command::new("clinic-analytics")
        .version(config::APP_VERSION)
        .about("Dental clinic analytics seeding and goal tracking")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("seed")
                .about("Replace analytics data with a generated history")
                .arg(db_arg())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for a reproducible run"),
                )
                .arg(month_arg("from", "First month to generate (default: 12 months ago)"))
                .arg(month_arg("to", "Last month to generate (default: current month)")),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Write progress snapshots for every goal over a month range")
                .arg(db_arg())
                .arg(month_arg("from", "First month to evaluate").required(true))
                .arg(month_arg("to", "Last month to evaluate").required(true)),
        )
        .subcommand(
            Command::new("create-goal")
                .about("Create a performance goal from a JSON request")
                .arg(db_arg())
                .arg(
                    Arg::new("payload")
                        .long("payload")
                        .required(true)
                        .help(r#"e.g. {"period_type":"month","period_start":"2025-06","metric":"revenue","target_value":500000}"#),
                ),
        )
        .subcommand(
            Command::new("goals")
                .about("List the goals of a month with their progress")
                .arg(db_arg())
                .arg(month_arg("period", "Month to list").required(true)),
        )
        .subcommand(
            Command::new("summary")
                .about("Print analytics table counts and total revenue")
                .arg(db_arg())
                .arg(month_arg("from", "Start of the reported period"))
                .arg(month_arg("to", "End of the reported period")),
        )
}

fn open(args: &ArgMatches) -> Result<Connection, CliError> {
    let path = args
        .get_one::<PathBuf>("db")
        .cloned()
        .unwrap_or_else(config::database_path);
    tracing::debug!(path = %path.display(), "Opening database");
    Ok(open_database(&path)?)
}

fn parse_month_arg(args: &ArgMatches, name: &str) -> Result<Option<DateRange>, CliError> {
    args.get_one::<String>(name)
        .map(|value| {
            period::parse_month(value)
                .ok_or_else(|| CliError::Usage(format!("--{name}: '{value}' is not a YYYY-MM month")))
        })
        .transpose()
}

/// `--from`/`--to` as an inclusive month span, defaulting to the trailing year.
fn month_span(args: &ArgMatches, today: NaiveDate) -> Result<DateRange, CliError> {
    let default = period::trailing_year(today);
    let start = parse_month_arg(args, "from")?.map_or(default.start, |m| m.start);
    let end = parse_month_arg(args, "to")?.map_or(default.end, |m| m.end);
    DateRange::new(start, end)
        .ok_or_else(|| CliError::Usage(format!("--from {start} is after --to {end}")))
}

fn run(matches: &ArgMatches, today: NaiveDate) -> Result<(), CliError> {
    match matches.subcommand() {
        Some(("seed", args)) => {
            let conn = open(args)?;
            let options = SeedOptions {
                range: month_span(args, today)?,
                ..SeedOptions::trailing_year(today)
            };
            let summary = match args.get_one::<u64>("seed") {
                Some(seed) => {
                    synthesizer::seed_analytics(&conn, &mut StdRng::seed_from_u64(*seed), &options)?
                }
                None => synthesizer::seed_analytics(&conn, &mut rand::thread_rng(), &options)?,
            };
            println!("{summary}");
        }
        Some(("evaluate", args)) => {
            let conn = open(args)?;
            let range = month_span(args, today)?;
            let snapshots = goals::snapshot_goals(&conn, &range)?;
            let settled = goals::settle_goal_statuses(&conn, today)?;
            println!(
                "Wrote {} snapshots for {} to {}; settled {} goals",
                snapshots.len(),
                range.start,
                range.end,
                settled
            );
        }
        Some(("create-goal", args)) => {
            let conn = open(args)?;
            let payload = args
                .get_one::<String>("payload")
                .ok_or_else(|| CliError::Usage("--payload is required".into()))?;
            let request: GoalRequest = serde_json::from_str(payload)?;
            let admin = goals::goal_owner(&conn)?;
            let goal = goals::create_goal(&conn, &admin, &request)?;
            println!("{}", serde_json::to_string_pretty(&goal)?);
        }
        Some(("goals", args)) => {
            let conn = open(args)?;
            let month = args
                .get_one::<String>("period")
                .ok_or_else(|| CliError::Usage("--period is required".into()))?;
            let overviews = goals::list_goals_for_month(&conn, month, today)?;
            if overviews.is_empty() {
                println!("No goals for {month}");
            }
            for overview in overviews {
                let goal = &overview.goal;
                println!(
                    "#{:<4} {:<28} {:>12} / {:<12} {:>3}%  {:?}  [{}]",
                    goal.id,
                    goal.metric,
                    overview.progress.actual,
                    goal.target_value,
                    overview.progress.percent,
                    overview.progress.label,
                    goal.status
                );
            }
        }
        Some(("summary", args)) => {
            let conn = open(args)?;
            let summary = SeedSummary::collect(&conn, month_span(args, today)?)?;
            println!("{summary}");
        }
        _ => return Err(CliError::Usage("unknown subcommand".into())),
    }
    Ok(())
}

fn main() {
    clinic_analytics::init_tracing();

    let matches = cli().get_matches();
    let today = Local::now().date_naive();
    if let Err(e) = run(&matches, today) {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
