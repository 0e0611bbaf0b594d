//! Per-day briefing lookup.
//!
//! Sources are tried in order (local files, remote repository, store
//! fallback) and the first hit wins. A failing source is logged and skipped.
//! [`BriefingCache`] keeps resolved briefings for a fixed TTL, keyed by
//! `(day, admin)`.

use crate::config::{Config, RemoteContentConfig};
use crate::error::{AcademyError, Result};
use crate::paths;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Briefing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Local,
    Remote,
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    pub day: u32,
    pub admin: bool,
    pub source: SourceKind,
    pub body: String,
}

/// Variants to try for a request: the admin edition first when asked for.
fn variants(admin: bool) -> &'static [bool] {
    if admin {
        &[true, false]
    } else {
        &[false]
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

pub trait BriefingSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Briefing text for exactly this `(day, admin)` variant, if present.
    fn fetch(&self, day: u32, admin: bool) -> Result<Option<String>>;
}

/// Markdown files in the project's content directory.
#[derive(Debug, Clone)]
pub struct LocalFiles {
    dir: PathBuf,
}

impl LocalFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl BriefingSource for LocalFiles {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    fn fetch(&self, day: u32, admin: bool) -> Result<Option<String>> {
        crate::io::read_optional(&self.dir.join(paths::briefing_filename(day, admin)))
    }
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// GitHub-style repository contents API.
#[derive(Debug, Clone)]
pub struct RemoteRepo {
    config: RemoteContentConfig,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl RemoteRepo {
    pub fn new(config: RemoteContentConfig) -> Result<Self> {
        let token = config
            .token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|t| !t.is_empty());
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("academy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AcademyError::RemoteContent(e.to_string()))?;
        Ok(Self {
            config,
            token,
            client,
        })
    }

    fn url(&self, day: u32, admin: bool) -> String {
        let prefix = self.config.path_prefix.trim_matches('/');
        let file = paths::briefing_filename(day, admin);
        let path = if prefix.is_empty() {
            file
        } else {
            format!("{prefix}/{file}")
        };
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            path
        )
    }
}

impl BriefingSource for RemoteRepo {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    fn fetch(&self, day: u32, admin: bool) -> Result<Option<String>> {
        let mut req = self
            .client
            .get(self.url(day, admin))
            .query(&[("ref", self.config.branch.as_str())])
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .map_err(|e| AcademyError::RemoteContent(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(AcademyError::RemoteContent(format!(
                "unexpected status {}",
                resp.status()
            )));
        }
        let body: ContentsResponse = resp
            .json()
            .map_err(|e| AcademyError::RemoteContent(e.to_string()))?;
        decode_contents(body).map(Some)
    }
}

fn decode_contents(body: ContentsResponse) -> Result<String> {
    match body.encoding.as_deref() {
        None | Some("base64") => {
            let compact: String = body
                .content
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| AcademyError::RemoteContent(e.to_string()))?;
            String::from_utf8(bytes).map_err(|e| AcademyError::RemoteContent(e.to_string()))
        }
        Some("utf-8") => Ok(body.content),
        Some(other) => Err(AcademyError::RemoteContent(format!(
            "unsupported encoding '{other}'"
        ))),
    }
}

/// A briefing row kept in the project store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredBriefing {
    pub day: u32,
    #[serde(default)]
    pub admin: bool,
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefingStore {
    #[serde(default)]
    pub briefings: Vec<StoredBriefing>,
}

impl BriefingStore {
    pub fn load(root: &Path) -> Result<Self> {
        match crate::io::read_optional(&paths::briefings_store_path(root))? {
            Some(data) => Ok(serde_yaml::from_str(&data)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::briefings_store_path(root), data.as_bytes())
    }

    /// Insert or replace the row for `(day, admin)`.
    pub fn upsert(&mut self, day: u32, admin: bool, body: impl Into<String>) {
        let body = body.into();
        match self
            .briefings
            .iter_mut()
            .find(|b| b.day == day && b.admin == admin)
        {
            Some(existing) => existing.body = body,
            None => self.briefings.push(StoredBriefing { day, admin, body }),
        }
    }
}

/// Store fallback, read fresh on every lookup.
#[derive(Debug, Clone)]
pub struct StoreRows {
    root: PathBuf,
}

impl StoreRows {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BriefingSource for StoreRows {
    fn kind(&self) -> SourceKind {
        SourceKind::Store
    }

    fn fetch(&self, day: u32, admin: bool) -> Result<Option<String>> {
        let store = BriefingStore::load(&self.root)?;
        Ok(store
            .briefings
            .into_iter()
            .find(|b| b.day == day && b.admin == admin)
            .map(|b| b.body))
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

pub struct BriefingResolver {
    sources: Vec<Box<dyn BriefingSource>>,
}

impl std::fmt::Debug for BriefingResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<SourceKind> = self.sources.iter().map(|s| s.kind()).collect();
        f.debug_struct("BriefingResolver")
            .field("sources", &kinds)
            .finish()
    }
}

impl BriefingResolver {
    pub fn new(sources: Vec<Box<dyn BriefingSource>>) -> Self {
        Self { sources }
    }

    /// Local files, then the remote repository if configured, then the store.
    pub fn from_config(root: &Path, config: &Config) -> Self {
        let mut sources: Vec<Box<dyn BriefingSource>> =
            vec![Box::new(LocalFiles::new(config.content_dir(root)))];
        if let Some(remote) = &config.content.remote {
            match RemoteRepo::new(remote.clone()) {
                Ok(repo) => sources.push(Box::new(repo)),
                Err(e) => tracing::warn!(error = %e, "remote briefing source disabled"),
            }
        }
        sources.push(Box::new(StoreRows::new(root)));
        Self::new(sources)
    }

    pub fn resolve(&self, day: u32, admin: bool) -> Result<Briefing> {
        for source in &self.sources {
            for &variant in variants(admin) {
                match source.fetch(day, variant) {
                    Ok(Some(body)) => {
                        tracing::debug!(day, admin, source = ?source.kind(), "briefing resolved");
                        return Ok(Briefing {
                            day,
                            admin: variant,
                            source: source.kind(),
                            body,
                        });
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(day, source = ?source.kind(), error = %e, "briefing source failed");
                    }
                }
            }
        }
        Err(AcademyError::BriefingNotFound(day))
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CacheEntry {
    briefing: Briefing,
    expires_at: Instant,
}

/// In-memory TTL cache keyed by `(day, admin)`.
#[derive(Debug, Clone)]
pub struct BriefingCache {
    ttl: Duration,
    entries: HashMap<(u32, bool), CacheEntry>,
}

impl BriefingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, day: u32, admin: bool) -> Option<Briefing> {
        self.get_at(day, admin, Instant::now())
    }

    /// Lookup as of `now`; expired entries are evicted on read.
    pub fn get_at(&mut self, day: u32, admin: bool, now: Instant) -> Option<Briefing> {
        let key = (day, admin);
        match self.entries.get(&key) {
            Some(entry) if entry.expires_at > now => Some(entry.briefing.clone()),
            Some(_) => {
                self.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, briefing: Briefing, admin: bool) {
        self.insert_at(briefing, admin, Instant::now());
    }

    pub fn insert_at(&mut self, briefing: Briefing, admin: bool, now: Instant) {
        self.entries.insert(
            (briefing.day, admin),
            CacheEntry {
                briefing,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn invalidate(&mut self, day: u32) {
        self.entries.retain(|(d, _), _| *d != day);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
