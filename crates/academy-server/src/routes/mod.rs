pub mod briefings;
pub mod cron;
pub mod events;
pub mod intel;
pub mod participants;
pub mod readiness;
pub mod sessions;

use chrono::{NaiveDate, Utc};

/// The date a request is evaluated on: `as_of` when given, otherwise today (UTC).
pub(crate) fn effective_date(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Utc::now().date_naive())
}
