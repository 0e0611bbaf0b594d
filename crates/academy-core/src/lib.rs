pub mod config;
pub mod content;
pub mod error;
pub mod intel;
pub mod io;
pub mod leaderboard;
pub mod mastery;
pub mod notice;
pub mod paths;
pub mod readiness;
pub mod recognition;
pub mod roster;
pub mod session;
pub mod sweep;
pub mod types;

pub use error::{AcademyError, Result};
