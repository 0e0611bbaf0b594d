use crate::output::{print_json, print_table};
use academy_core::config::Config;
use academy_core::readiness::{self, TaskForceReadiness};
use academy_core::roster::Roster;
use anyhow::Context;
use chrono::NaiveDate;
use std::path::Path;

pub fn run(
    root: &Path,
    previous: Option<u32>,
    task_force: Option<&str>,
    as_of: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let roster = Roster::load(root).context("failed to load roster")?;
    let members: Vec<_> = roster.in_task_force(task_force).map(|p| p.mastery()).collect();
    let day = config.program_day(super::effective_date(as_of));
    let r = readiness::compute(&members, previous, day);

    if json {
        print_json(&serde_json::json!({
            "task_force": task_force,
            "readiness": r,
        }))?;
        return Ok(());
    }

    print_summary(task_force.unwrap_or("all"), &r);
    if !r.role_breakdown.is_empty() {
        println!();
        let rows = r
            .role_breakdown
            .iter()
            .map(|role| {
                vec![
                    role.role.clone(),
                    format!("{}%", role.readiness),
                    role.member_count.to_string(),
                ]
            })
            .collect();
        print_table(&["ROLE", "READINESS", "MEMBERS"], rows);
    }
    Ok(())
}

pub fn run_by_task_force(root: &Path, as_of: Option<NaiveDate>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let roster = Roster::load(root).context("failed to load roster")?;
    let day = config.program_day(super::effective_date(as_of));
    let forces = readiness::readiness_by_task_force(&roster.participants, day);

    if json {
        print_json(&forces)?;
        return Ok(());
    }
    if forces.is_empty() {
        println!("No task forces.");
        return Ok(());
    }

    let rows = forces
        .iter()
        .map(|f| {
            let r = &f.readiness;
            vec![
                f.task_force.clone(),
                format!("{}%", r.overall_readiness),
                format!("{}%", r.target_readiness),
                on_track_label(r).to_string(),
                r.weakest_role.clone().unwrap_or_else(|| "-".to_string()),
                r.member_count.to_string(),
            ]
        })
        .collect();
    print_table(
        &["TASK FORCE", "READINESS", "TARGET", "STATUS", "WEAKEST", "MEMBERS"],
        rows,
    );
    Ok(())
}

fn print_summary(label: &str, r: &TaskForceReadiness) {
    println!(
        "Readiness ({label}, day {}): {}% / target {}% [{}]",
        r.program_day,
        r.overall_readiness,
        r.target_readiness,
        on_track_label(r)
    );
    if let Some(trend) = r.trend {
        println!("Trend: {trend:+}");
    }
    if let (Some(weak), Some(strong)) = (&r.weakest_role, &r.strongest_role) {
        println!("Weakest role: {weak}  Strongest role: {strong}");
    }
}

fn on_track_label(r: &TaskForceReadiness) -> &'static str {
    if r.is_on_track {
        "on track"
    } else {
        "behind"
    }
}
