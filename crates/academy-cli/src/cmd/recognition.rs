use crate::output::print_json;
use academy_core::config::Config;
use academy_core::sweep;
use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum RecognitionSubcommand {
    /// Grant every award participants have earned but not yet received
    Sweep {
        /// Evaluate attendance as of this date instead of today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

pub fn run(root: &Path, subcmd: RecognitionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RecognitionSubcommand::Sweep { as_of } => {
            let config = Config::load(root).context("failed to load config")?;
            let day = config.program_day(super::effective_date(as_of));
            let result = sweep::run_recognition_sweep(root, day)?;

            if json {
                print_json(&result)?;
                return Ok(());
            }
            println!(
                "Processed {} participant(s), {} recognized",
                result.summary.processed, result.summary.updated
            );
            for g in &result.granted {
                let kinds: Vec<String> = g.awards.iter().map(|k| k.to_string()).collect();
                println!("  {}: {}", g.participant_id, kinds.join(", "));
            }
            for err in &result.summary.errors {
                eprintln!("  {}: {}", err.participant_id, err.error);
            }
            Ok(())
        }
    }
}
