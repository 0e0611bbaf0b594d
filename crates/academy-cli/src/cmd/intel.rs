use crate::output::{print_json, print_table};
use academy_core::intel::{self, IntelBoard, IntelDrop, IntelEdit};
use academy_core::types::Priority;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum IntelSubcommand {
    /// Draft a new intel drop (unreleased)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        /// routine | priority | flash
        #[arg(long)]
        priority: Option<Priority>,
        /// Restrict to a team; repeat for several. Omit to target everyone.
        #[arg(long = "team")]
        teams: Vec<String>,
    },

    /// List drops visible to a team, or all drops with --admin
    List {
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        admin: bool,
    },

    /// Edit a drop
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long, conflicts_with = "clear_priority")]
        priority: Option<Priority>,
        /// Remove the priority
        #[arg(long)]
        clear_priority: bool,
        /// Replace the target teams
        #[arg(long = "team")]
        teams: Vec<String>,
    },

    /// Release a drop to its targeted teams
    Release { id: String },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: IntelSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        IntelSubcommand::Create {
            title,
            body,
            priority,
            teams,
        } => {
            let mut drop = IntelDrop::new(title, body);
            drop.priority = priority;
            drop.target_teams = (!teams.is_empty()).then_some(teams);
            let drop = intel::create(root, drop).context("failed to create intel")?;
            report(&drop, json, "Created intel")
        }
        IntelSubcommand::List { team, admin } => list(root, team.as_deref(), admin, json),
        IntelSubcommand::Edit {
            id,
            title,
            body,
            priority,
            clear_priority,
            teams,
        } => {
            let priority = if clear_priority {
                Some(None)
            } else {
                priority.map(Some)
            };
            let edit = IntelEdit {
                title,
                body,
                priority,
                target_teams: (!teams.is_empty()).then_some(teams),
            };
            let drop = intel::edit(root, &id, edit)?;
            report(&drop, json, "Updated intel")
        }
        IntelSubcommand::Release { id } => {
            let (drop, changed) = intel::release(root, &id)?;
            if json {
                print_json(&serde_json::json!({ "intel": drop, "changed": changed }))?;
            } else if changed {
                println!("Released intel: {}", drop.id);
            } else {
                println!("Intel {} was already released", drop.id);
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(root: &Path, team: Option<&str>, admin: bool, json: bool) -> anyhow::Result<()> {
    let board = IntelBoard::load(root).context("failed to load intel")?;
    let drops: Vec<&IntelDrop> = board.visible_to(team, admin).collect();

    if json {
        print_json(&drops)?;
        return Ok(());
    }
    if drops.is_empty() {
        println!("No intel.");
        return Ok(());
    }

    let rows = drops
        .iter()
        .map(|d| {
            vec![
                d.id.clone(),
                d.title.clone(),
                d.priority
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                d.target_teams
                    .as_ref()
                    .map(|t| t.join(","))
                    .unwrap_or_else(|| "all".to_string()),
                if d.released { "released" } else { "draft" }.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "PRIORITY", "TEAMS", "STATUS"], rows);
    Ok(())
}

fn report(drop: &IntelDrop, json: bool, verb: &str) -> anyhow::Result<()> {
    if json {
        print_json(drop)?;
    } else {
        println!("{verb}: {}", drop.id);
    }
    Ok(())
}
