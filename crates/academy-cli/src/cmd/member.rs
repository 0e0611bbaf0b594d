use crate::output::{print_fields, print_json, print_table};
use academy_core::mastery;
use academy_core::notice::NoticeLog;
use academy_core::roster::{Activity, Participant, Roster};
use academy_core::types::MasteryLevel;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum MemberSubcommand {
    /// Add a participant to the roster
    Add {
        /// Participant id (lowercase letters, digits and hyphens)
        id: String,
        #[arg(long)]
        name: String,
        /// Role, e.g. analyst or operator
        #[arg(long)]
        role: String,
        #[arg(long)]
        task_force: Option<String>,
        /// Starting mastery level (1-4)
        #[arg(long)]
        level: Option<u8>,
    },

    /// List participants
    List {
        #[arg(long)]
        task_force: Option<String>,
    },

    /// Show one participant with counters, awards and notices
    Show { id: String },

    /// Record an activity and evaluate mastery
    Log {
        id: String,
        /// day_completed | artifact_submitted | tutor_session | peer_assist
        activity: Activity,
        /// Record the activity this many times
        #[arg(long, default_value = "1")]
        count: u32,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: MemberSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MemberSubcommand::Add {
            id,
            name,
            role,
            task_force,
            level,
        } => add(root, id, name, role, task_force, level, json),
        MemberSubcommand::List { task_force } => list(root, task_force.as_deref(), json),
        MemberSubcommand::Show { id } => show(root, &id, json),
        MemberSubcommand::Log {
            id,
            activity,
            count,
        } => log(root, &id, activity, count, json),
    }
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

fn add(
    root: &Path,
    id: String,
    name: String,
    role: String,
    task_force: Option<String>,
    level: Option<u8>,
    json: bool,
) -> anyhow::Result<()> {
    let mut roster = Roster::load(root).context("failed to load roster")?;
    let mut participant = Participant::new(id, name, role);
    if let Some(tf) = task_force {
        participant = participant.with_task_force(tf);
    }
    if let Some(level) = level {
        participant.mastery_level = MasteryLevel::new(level)?;
    }
    let id = participant.id.clone();
    roster.add(participant)?;
    roster.save(root).context("failed to save roster")?;

    if json {
        print_json(roster.get(&id)?)?;
    } else {
        println!("Added participant: {id}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(root: &Path, task_force: Option<&str>, json: bool) -> anyhow::Result<()> {
    let roster = Roster::load(root).context("failed to load roster")?;
    let members: Vec<&Participant> = roster.in_task_force(task_force).collect();

    if json {
        print_json(&members)?;
        return Ok(());
    }
    if members.is_empty() {
        println!("No participants.");
        return Ok(());
    }

    let rows = members
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.role.clone(),
                p.task_force.clone().unwrap_or_else(|| "-".to_string()),
                p.mastery_level.to_string(),
                p.clearance().to_string(),
                p.days_completed.to_string(),
            ]
        })
        .collect();
    print_table(
        &["ID", "NAME", "ROLE", "TASK FORCE", "LEVEL", "CLEARANCE", "DAYS"],
        rows,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let roster = Roster::load(root).context("failed to load roster")?;
    let p = roster.get(id)?;
    let notices = NoticeLog::load(root)?;
    let mine: Vec<_> = notices.for_participant(id).collect();

    if json {
        print_json(&serde_json::json!({
            "participant": p,
            "clearance": p.clearance(),
            "notices": mine,
        }))?;
        return Ok(());
    }

    let awards: Vec<String> = p.awards.iter().map(|a| a.kind.to_string()).collect();
    print_fields(&[
        ("id", p.id.clone()),
        ("name", p.name.clone()),
        ("role", p.role.clone()),
        (
            "task force",
            p.task_force.clone().unwrap_or_else(|| "-".to_string()),
        ),
        (
            "level",
            format!("{} ({})", p.mastery_level, p.clearance()),
        ),
        ("days", p.days_completed.to_string()),
        ("artifacts", p.artifacts_submitted.to_string()),
        ("tutor sessions", p.ai_tutor_sessions.to_string()),
        ("peer assists", p.peer_assists.to_string()),
        (
            "awards",
            if awards.is_empty() {
                "-".to_string()
            } else {
                awards.join(", ")
            },
        ),
    ]);
    for n in mine {
        println!(
            "  notice: level {} -> {} ({}) at {}",
            n.from,
            n.to,
            n.clearance,
            n.created_at.to_rfc3339()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// log
// ---------------------------------------------------------------------------

fn log(root: &Path, id: &str, activity: Activity, count: u32, json: bool) -> anyhow::Result<()> {
    if count == 0 {
        anyhow::bail!("--count must be at least 1");
    }

    let (p, level_up) = mastery::record_activity(root, id, activity, count)
        .with_context(|| format!("failed to record {activity} for {id}"))?;

    if json {
        print_json(&serde_json::json!({
            "id": p.id,
            "counters": p.counters(),
            "clearance": p.clearance(),
            "level_up": level_up,
        }))?;
        return Ok(());
    }

    println!("Recorded {activity} x{count} for {id}");
    if let Some(up) = level_up {
        println!(
            "Level up: {} -> {} ({})",
            up.from,
            up.to,
            up.to.clearance()
        );
    }
    Ok(())
}
