use crate::auth::CronAuth;
use crate::live::LiveHub;
use academy_core::config::{Config, ContentConfig, CronConfig};
use academy_core::content::BriefingCache;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub live: Arc<LiveHub>,
    pub briefings: Arc<Mutex<BriefingCache>>,
    pub cron: CronAuth,
    /// Held by every handler that writes the `.academy/` store, for its whole
    /// load-modify-save cycle.
    pub store: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    /// Build state for `root`. Cache TTL and cron secret come from the
    /// project config when present, defaults otherwise.
    pub fn new(root: PathBuf) -> Self {
        let (content, cron) = match Config::load(&root) {
            Ok(config) => (config.content, config.cron),
            Err(e) => {
                tracing::warn!(error = %e, "config unavailable, using defaults");
                (ContentConfig::default(), CronConfig::default())
            }
        };
        let cron = match cron.secret() {
            Some(secret) => CronAuth::with_secret(secret),
            None => CronAuth::none(),
        };
        Self {
            root,
            live: Arc::new(LiveHub::new()),
            briefings: Arc::new(Mutex::new(BriefingCache::new(Duration::from_secs(
                content.cache_ttl_secs,
            )))),
            cron,
            store: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn with_cron(mut self, cron: CronAuth) -> Self {
        self.cron = cron;
        self
    }
}
