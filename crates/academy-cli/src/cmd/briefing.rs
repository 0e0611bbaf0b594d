use crate::output::print_json;
use academy_core::config::Config;
use academy_core::content::{BriefingResolver, BriefingStore};
use anyhow::Context;
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum BriefingSubcommand {
    /// Print the briefing for a program day
    Show {
        day: u32,
        /// Prefer the instructor variant
        #[arg(long)]
        admin: bool,
    },

    /// Store a briefing in the program store (the last-resort source)
    Set {
        day: u32,
        /// Markdown file to store
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        admin: bool,
    },
}

pub fn run(root: &Path, subcmd: BriefingSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    match subcmd {
        BriefingSubcommand::Show { day, admin } => {
            config.validate_day(day)?;
            let briefing = BriefingResolver::from_config(root, &config).resolve(day, admin)?;
            if json {
                print_json(&briefing)?;
            } else {
                print!("{}", briefing.body);
                if !briefing.body.ends_with('\n') {
                    println!();
                }
            }
            Ok(())
        }
        BriefingSubcommand::Set { day, file, admin } => {
            config.validate_day(day)?;
            let body = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let mut store = BriefingStore::load(root)?;
            store.upsert(day, admin, body);
            store.save(root).context("failed to save briefing store")?;
            if json {
                print_json(&serde_json::json!({ "day": day, "admin": admin, "stored": true }))?;
            } else {
                println!("Stored briefing for day {day}");
            }
            Ok(())
        }
    }
}
