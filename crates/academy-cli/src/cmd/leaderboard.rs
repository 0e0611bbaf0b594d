use crate::output::{print_json, print_table};
use academy_core::leaderboard;
use academy_core::roster::Roster;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, task_force: Option<&str>, json: bool) -> anyhow::Result<()> {
    let roster = Roster::load(root).context("failed to load roster")?;
    let board = leaderboard::rank(roster.in_task_force(task_force));

    if json {
        print_json(&board)?;
        return Ok(());
    }
    if board.is_empty() {
        println!("No participants.");
        return Ok(());
    }

    let rows = board
        .iter()
        .map(|e| {
            vec![
                e.rank.to_string(),
                e.id.clone(),
                e.name.clone(),
                e.clearance.to_string(),
                e.days_completed.to_string(),
                e.artifacts_submitted.to_string(),
                e.awards.to_string(),
            ]
        })
        .collect();
    print_table(
        &["#", "ID", "NAME", "CLEARANCE", "DAYS", "ARTIFACTS", "AWARDS"],
        rows,
    );
    Ok(())
}
