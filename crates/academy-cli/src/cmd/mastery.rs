use crate::output::print_json;
use academy_core::mastery;
use academy_core::sweep;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum MasterySubcommand {
    /// Evaluate one participant and apply any level-up
    Check { id: String },

    /// Evaluate every participant (the scheduled mastery job)
    Sweep,
}

pub fn run(root: &Path, subcmd: MasterySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MasterySubcommand::Check { id } => check(root, &id, json),
        MasterySubcommand::Sweep => run_sweep(root, json),
    }
}

fn check(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let level_up = mastery::check_participant(root, id)?;
    if json {
        print_json(&serde_json::json!({ "id": id, "level_up": level_up }))?;
        return Ok(());
    }
    match level_up {
        Some(up) => println!("{id}: level {} -> {} ({})", up.from, up.to, up.to.clearance()),
        None => println!("{id}: no change"),
    }
    Ok(())
}

fn run_sweep(root: &Path, json: bool) -> anyhow::Result<()> {
    let result = sweep::run_mastery_sweep(root)?;
    if json {
        print_json(&result)?;
        return Ok(());
    }

    println!(
        "Processed {} participant(s), {} updated",
        result.summary.processed, result.summary.updated
    );
    for up in &result.level_ups {
        println!("  {}: level {} -> {}", up.participant_id, up.from, up.to);
    }
    for err in &result.summary.errors {
        eprintln!("  {}: {}", err.participant_id, err.error);
    }
    Ok(())
}
