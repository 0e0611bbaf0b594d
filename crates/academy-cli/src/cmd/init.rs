use crate::output::print_json;
use academy_core::config::Config;
use academy_core::{io, paths};
use chrono::NaiveDate;
use std::path::Path;

pub fn run(
    root: &Path,
    name: Option<String>,
    start_date: Option<NaiveDate>,
    length_days: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    io::ensure_dir(&paths::academy_dir(root))?;

    let created = match Config::load(root) {
        Ok(_) => false,
        Err(academy_core::AcademyError::NotInitialized) => {
            let name = name.unwrap_or_else(|| default_name(root));
            let start = super::effective_date(start_date);
            let mut config = Config::new(name, start);
            if let Some(days) = length_days {
                if days == 0 {
                    anyhow::bail!("--length-days must be at least 1");
                }
                config.program.length_days = days;
            }
            config.save(root)?;
            true
        }
        Err(e) => return Err(e.into()),
    };

    io::write_if_missing(&paths::roster_path(root), b"participants: []\n")?;
    io::ensure_dir(&root.join(paths::CONTENT_DIR))?;

    let config = Config::load(root)?;
    if json {
        print_json(&serde_json::json!({
            "created": created,
            "program": config.program,
        }))?;
    } else if created {
        println!(
            "Initialized program '{}' starting {} ({} days)",
            config.program.name, config.program.start_date, config.program.length_days
        );
    } else {
        println!("Program '{}' already initialized", config.program.name);
    }
    Ok(())
}

fn default_name(root: &Path) -> String {
    root.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "academy".to_string())
}
