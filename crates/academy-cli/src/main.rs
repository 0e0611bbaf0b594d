mod cmd;
mod output;
mod root;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cmd::{
    briefing::BriefingSubcommand, intel::IntelSubcommand, mastery::MasterySubcommand,
    member::MemberSubcommand, recognition::RecognitionSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "academy",
    about = "Cohort academy operator tool: roster, readiness, mastery, intel and briefings",
    version,
    propagate_version = true
)]
struct Cli {
    /// Program root (default: auto-detect from .academy/)
    #[arg(long, global = true, env = "ACADEMY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a program in the current directory
    Init {
        /// Program name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
        /// First day of the program, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Program length in days
        #[arg(long)]
        length_days: Option<u32>,
    },

    /// Manage the participant roster
    Member {
        #[command(subcommand)]
        subcommand: MemberSubcommand,
    },

    /// Show team readiness against the program-day target
    Readiness {
        /// Previous overall readiness, to report a trend
        #[arg(long)]
        previous: Option<u32>,
        /// Limit to one task force
        #[arg(long)]
        task_force: Option<String>,
        /// Break readiness down per task force
        #[arg(long, conflicts_with = "task_force")]
        by_task_force: bool,
        /// Evaluate as of this date instead of today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Rank participants by mastery and progress
    Leaderboard {
        #[arg(long)]
        task_force: Option<String>,
    },

    /// Evaluate mastery thresholds
    Mastery {
        #[command(subcommand)]
        subcommand: MasterySubcommand,
    },

    /// Grant recognition awards
    Recognition {
        #[command(subcommand)]
        subcommand: RecognitionSubcommand,
    },

    /// Manage intel drops
    Intel {
        #[command(subcommand)]
        subcommand: IntelSubcommand,
    },

    /// Look up and store daily briefings
    Briefing {
        #[command(subcommand)]
        subcommand: BriefingSubcommand,
    },

    /// Run the HTTP API server
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3141")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init {
            name,
            start_date,
            length_days,
        } => cmd::init::run(&root, name, start_date, length_days, cli.json),
        Commands::Member { subcommand } => cmd::member::run(&root, subcommand, cli.json),
        Commands::Readiness {
            previous,
            task_force,
            by_task_force,
            as_of,
        } => {
            if by_task_force {
                cmd::readiness::run_by_task_force(&root, as_of, cli.json)
            } else {
                cmd::readiness::run(&root, previous, task_force.as_deref(), as_of, cli.json)
            }
        }
        Commands::Leaderboard { task_force } => {
            cmd::leaderboard::run(&root, task_force.as_deref(), cli.json)
        }
        Commands::Mastery { subcommand } => cmd::mastery::run(&root, subcommand, cli.json),
        Commands::Recognition { subcommand } => {
            cmd::recognition::run(&root, subcommand, cli.json)
        }
        Commands::Intel { subcommand } => cmd::intel::run(&root, subcommand, cli.json),
        Commands::Briefing { subcommand } => cmd::briefing::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
