use academy_core::error::{AcademyError, Result};
use academy_core::intel::IntelDrop;
use academy_core::session::{InstructorSession, PresenceEntry, PresenceRoster, SessionState};
use academy_core::types::{Priority, Section};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

/// Per-channel broadcast buffer. Slow subscribers lag and skip ahead.
const CHANNEL_CAPACITY: usize = 64;

/// Heartbeats older than this no longer count as online.
pub fn presence_window() -> Duration {
    Duration::seconds(45)
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Instructor command on a live session.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionControl {
    Start {
        #[serde(default = "default_section")]
        section: Section,
    },
    Advance,
    NextSection,
    Set {
        step: u32,
        section: Section,
    },
    End,
}

fn default_section() -> Section {
    Section::Briefing
}

#[derive(Debug, Clone, Serialize)]
pub struct IntelReleased {
    pub id: String,
    pub title: String,
    pub priority: Option<Priority>,
    pub target_teams: Option<Vec<String>>,
    pub released_at: Option<DateTime<Utc>>,
}

impl From<&IntelDrop> for IntelReleased {
    fn from(d: &IntelDrop) -> Self {
        Self {
            id: d.id.clone(),
            title: d.title.clone(),
            priority: d.priority,
            target_teams: d.target_teams.clone(),
            released_at: d.released_at,
        }
    }
}

// ---------------------------------------------------------------------------
// LiveHub
// ---------------------------------------------------------------------------

struct SessionChannel {
    instructor: InstructorSession,
    tx: broadcast::Sender<SessionState>,
}

impl SessionChannel {
    fn new(code: &str) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            instructor: InstructorSession::new(code),
            tx,
        }
    }
}

/// Realtime fan-out: one channel per session code, one presence roster per
/// context and a global intel-release channel.
pub struct LiveHub {
    sessions: RwLock<HashMap<String, SessionChannel>>,
    presence: RwLock<HashMap<String, PresenceRoster>>,
    intel_tx: broadcast::Sender<IntelReleased>,
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveHub {
    pub fn new() -> Self {
        let (intel_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sessions: RwLock::new(HashMap::new()),
            presence: RwLock::new(HashMap::new()),
            intel_tx,
        }
    }

    /// Apply an instructor command and broadcast the resulting state.
    ///
    /// Only `Start` opens a channel. `End` publishes the final state and then
    /// drops the channel, which closes every subscriber's stream; the code is
    /// free to be started again afterwards.
    pub async fn control(&self, code: &str, cmd: SessionControl) -> Result<SessionState> {
        let mut sessions = self.sessions.write().await;
        if matches!(cmd, SessionControl::Start { .. }) && !sessions.contains_key(code) {
            sessions.insert(code.to_string(), SessionChannel::new(code));
        }
        let channel = sessions
            .get_mut(code)
            .ok_or_else(|| AcademyError::SessionNotStarted(code.to_string()))?;
        let inst = &mut channel.instructor;
        let state = match cmd {
            SessionControl::Start { section } => inst.start(section)?,
            SessionControl::Advance => inst.advance()?,
            SessionControl::NextSection => inst.force_advance_section()?,
            SessionControl::Set { step, section } => inst.set_position(step, section)?,
            SessionControl::End => inst.end()?,
        };
        // No receivers is fine: nobody is watching yet.
        let receivers = channel.tx.send(state).unwrap_or(0);
        tracing::debug!(session = code, ?state, receivers, "session state published");
        if !state.is_active {
            sessions.remove(code);
        }
        Ok(state)
    }

    pub async fn current(&self, code: &str) -> Option<SessionState> {
        self.sessions
            .read()
            .await
            .get(code)
            .and_then(|c| c.instructor.state())
    }

    /// Subscribe to a live session, returning its current state alongside.
    /// `None` when no session with this code is running.
    pub async fn subscribe(
        &self,
        code: &str,
    ) -> Option<(SessionState, broadcast::Receiver<SessionState>)> {
        let sessions = self.sessions.read().await;
        let channel = sessions.get(code)?;
        let state = channel.instructor.state()?;
        Some((state, channel.tx.subscribe()))
    }

    pub async fn heartbeat(&self, context: &str, participant_id: &str) {
        self.heartbeat_at(context, participant_id, Utc::now()).await;
    }

    /// Record a heartbeat, expiring stale entries in every context and
    /// dropping contexts nobody is left in.
    async fn heartbeat_at(&self, context: &str, participant_id: &str, now: DateTime<Utc>) {
        let mut presence = self.presence.write().await;
        presence.retain(|_, roster| {
            roster.prune(now, presence_window());
            !roster.is_empty()
        });
        presence
            .entry(context.to_string())
            .or_default()
            .heartbeat(participant_id, now);
    }

    pub async fn leave(&self, context: &str, participant_id: &str) {
        let mut presence = self.presence.write().await;
        if let Some(roster) = presence.get_mut(context) {
            roster.leave(participant_id);
            if roster.is_empty() {
                presence.remove(context);
            }
        }
    }

    pub async fn online(&self, context: &str) -> Vec<PresenceEntry> {
        self.presence
            .read()
            .await
            .get(context)
            .map(|r| r.online(Utc::now(), presence_window()))
            .unwrap_or_default()
    }

    pub fn publish_intel(&self, event: IntelReleased) {
        let receivers = self.intel_tx.send(event).unwrap_or(0);
        tracing::debug!(receivers, "intel release broadcast");
    }

    pub fn subscribe_intel(&self) -> broadcast::Receiver<IntelReleased> {
        self.intel_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn start(hub: &LiveHub, code: &str, section: Section) {
        hub.control(code, SessionControl::Start { section })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn control_broadcasts_to_subscribers() {
        let hub = LiveHub::new();
        start(&hub, "day-03", Section::Briefing).await;
        let (initial, mut rx) = hub.subscribe("day-03").await.unwrap();
        assert_eq!(initial.current_step, 0);

        hub.control("day-03", SessionControl::Advance).await.unwrap();
        hub.control("day-03", SessionControl::Advance).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().current_step, 1);
        assert_eq!(rx.recv().await.unwrap().current_step, 2);
        assert_eq!(hub.current("day-03").await.unwrap().current_step, 2);
    }

    #[tokio::test]
    async fn late_subscriber_gets_current_state() {
        let hub = LiveHub::new();
        start(&hub, "s", Section::Exercise).await;
        let (initial, _rx) = hub.subscribe("s").await.unwrap();
        assert_eq!(initial.current_section, Section::Exercise);
    }

    #[tokio::test]
    async fn unknown_codes_leave_no_channels_behind() {
        let hub = LiveHub::new();
        for i in 0..100 {
            let code = format!("junk-{i}");
            assert!(hub.subscribe(&code).await.is_none());
            assert!(matches!(
                hub.control(&code, SessionControl::Advance).await,
                Err(AcademyError::SessionNotStarted(_))
            ));
            assert!(hub.control(&code, SessionControl::End).await.is_err());
        }
        assert!(hub.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn ending_closes_subscribers_and_drops_the_channel() {
        let hub = LiveHub::new();
        start(&hub, "s", Section::Briefing).await;
        let (_, mut rx) = hub.subscribe("s").await.unwrap();

        hub.control("s", SessionControl::End).await.unwrap();
        assert!(!rx.recv().await.unwrap().is_active);
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
        assert!(hub.sessions.read().await.is_empty());
        assert!(hub.current("s").await.is_none());
        assert!(hub.subscribe("s").await.is_none());
    }

    #[tokio::test]
    async fn sessions_are_isolated_by_code() {
        let hub = LiveHub::new();
        start(&hub, "a", Section::Briefing).await;
        assert!(hub.current("b").await.is_none());
        assert!(hub.control("b", SessionControl::Advance).await.is_err());
    }

    #[tokio::test]
    async fn ended_session_rejects_commands() {
        let hub = LiveHub::new();
        start(&hub, "s", Section::Briefing).await;
        let last = hub.control("s", SessionControl::End).await.unwrap();
        assert!(!last.is_active);
        assert!(hub.control("s", SessionControl::Advance).await.is_err());
        assert!(hub.control("s", SessionControl::End).await.is_err());
    }

    #[tokio::test]
    async fn presence_tracks_heartbeats() {
        let hub = LiveHub::new();
        hub.heartbeat("day-03", "ada").await;
        hub.heartbeat("day-03", "bo").await;
        hub.heartbeat("day-04", "cy").await;
        let online = hub.online("day-03").await;
        let ids: Vec<&str> = online.iter().map(|e| e.participant_id.as_str()).collect();
        assert_eq!(ids, ["ada", "bo"]);

        hub.leave("day-03", "ada").await;
        assert_eq!(hub.online("day-03").await.len(), 1);
        assert!(hub.online("nowhere").await.is_empty());

        hub.leave("day-04", "cy").await;
        assert!(!hub.presence.read().await.contains_key("day-04"));
    }

    #[tokio::test]
    async fn heartbeats_expire_stale_contexts() {
        let hub = LiveHub::new();
        let long_ago = Utc::now() - Duration::hours(1);
        for i in 0..50 {
            hub.heartbeat_at(&format!("ctx-{i}"), "ada", long_ago).await;
        }
        assert_eq!(hub.presence.read().await.len(), 50);

        hub.heartbeat("day-03", "bo").await;
        let presence = hub.presence.read().await;
        assert_eq!(presence.len(), 1);
        assert!(presence.contains_key("day-03"));
    }

    #[tokio::test]
    async fn intel_release_reaches_subscribers() {
        let hub = LiveHub::new();
        let mut rx = hub.subscribe_intel();
        let mut drop = IntelDrop::new("Op Nightjar", "body");
        drop.release();
        hub.publish_intel(IntelReleased::from(&drop));
        assert_eq!(rx.recv().await.unwrap().title, "Op Nightjar");
    }

    #[test]
    fn control_parses_from_json() {
        let cmd: SessionControl =
            serde_json::from_str(r#"{"action":"set","step":4,"section":"exercise"}"#).unwrap();
        assert!(matches!(
            cmd,
            SessionControl::Set {
                step: 4,
                section: Section::Exercise
            }
        ));
        let start: SessionControl = serde_json::from_str(r#"{"action":"start"}"#).unwrap();
        assert!(matches!(
            start,
            SessionControl::Start {
                section: Section::Briefing
            }
        ));
    }
}
