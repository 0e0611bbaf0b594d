use crate::error::{AcademyError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ACADEMY_DIR: &str = ".academy";
pub const CONTENT_DIR: &str = "content";

pub const CONFIG_FILE: &str = ".academy/config.yaml";
pub const ROSTER_FILE: &str = ".academy/roster.yaml";
pub const INTEL_FILE: &str = ".academy/intel.yaml";
pub const NOTICES_FILE: &str = ".academy/notices.yaml";
pub const BRIEFINGS_FILE: &str = ".academy/briefings.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn academy_dir(root: &Path) -> PathBuf {
    root.join(ACADEMY_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn roster_path(root: &Path) -> PathBuf {
    root.join(ROSTER_FILE)
}

pub fn intel_path(root: &Path) -> PathBuf {
    root.join(INTEL_FILE)
}

pub fn notices_path(root: &Path) -> PathBuf {
    root.join(NOTICES_FILE)
}

pub fn briefings_store_path(root: &Path) -> PathBuf {
    root.join(BRIEFINGS_FILE)
}

/// File name of the briefing for `day`, e.g. `day-03.md` or `day-03.admin.md`.
pub fn briefing_filename(day: u32, admin: bool) -> String {
    if admin {
        format!("day-{day:02}.admin.md")
    } else {
        format!("day-{day:02}.md")
    }
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").expect("static regex is valid")
    })
}

pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id_re().is_match(id) {
        return Err(AcademyError::InvalidId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
