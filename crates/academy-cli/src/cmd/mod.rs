pub mod briefing;
pub mod init;
pub mod intel;
pub mod leaderboard;
pub mod mastery;
pub mod member;
pub mod readiness;
pub mod recognition;
pub mod serve;

use chrono::{NaiveDate, Utc};

/// `as_of` when given, otherwise today (UTC).
pub(crate) fn effective_date(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Utc::now().date_naive())
}
