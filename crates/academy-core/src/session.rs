//! Live-session synchronization.
//!
//! One instructor writes [`SessionState`]; students mirror it. Delivery order
//! is whatever the broadcast channel gives and the last write wins. A student
//! that misses an update stays on stale state until the next one arrives.

use crate::error::{AcademyError, Result};
use crate::types::Section;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_step: u32,
    pub current_section: Section,
    pub is_active: bool,
}

impl SessionState {
    pub fn start(section: Section) -> Self {
        Self {
            current_step: 0,
            current_section: section,
            is_active: true,
        }
    }

    pub fn position(&self) -> (u32, Section) {
        (self.current_step, self.current_section)
    }
}

// ---------------------------------------------------------------------------
// Instructor
// ---------------------------------------------------------------------------

/// The single writer of a session's state.
#[derive(Debug, Clone)]
pub struct InstructorSession {
    code: String,
    state: Option<SessionState>,
}

impl InstructorSession {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            state: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self) -> Option<SessionState> {
        self.state
    }

    fn active(&mut self) -> Result<&mut SessionState> {
        match self.state.as_mut() {
            None => Err(AcademyError::SessionNotStarted(self.code.clone())),
            Some(s) if !s.is_active => Err(AcademyError::SessionEnded(self.code.clone())),
            Some(s) => Ok(s),
        }
    }

    /// Begin (or restart) the walkthrough at step 0 of `section`.
    pub fn start(&mut self, section: Section) -> Result<SessionState> {
        if matches!(self.state, Some(s) if !s.is_active) {
            return Err(AcademyError::SessionEnded(self.code.clone()));
        }
        let state = SessionState::start(section);
        self.state = Some(state);
        Ok(state)
    }

    pub fn set_position(&mut self, step: u32, section: Section) -> Result<SessionState> {
        let s = self.active()?;
        s.current_step = step;
        s.current_section = section;
        Ok(*s)
    }

    /// Next step within the current section. Fails without mutating at the
    /// step ceiling.
    pub fn advance(&mut self) -> Result<SessionState> {
        let code = self.code.clone();
        let s = self.active()?;
        s.current_step = s
            .current_step
            .checked_add(1)
            .ok_or(AcademyError::StepOverflow(code))?;
        Ok(*s)
    }

    /// Force everyone to step 0 of the next section. Stays on the last section.
    pub fn force_advance_section(&mut self) -> Result<SessionState> {
        let s = self.active()?;
        if let Some(next) = s.current_section.next() {
            s.current_section = next;
            s.current_step = 0;
        }
        Ok(*s)
    }

    /// Terminal: no further mutation is accepted.
    pub fn end(&mut self) -> Result<SessionState> {
        let s = self.active()?;
        s.is_active = false;
        Ok(*s)
    }
}

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    NotConnected,
    Subscribed,
    Receiving,
    Ended,
}

/// A follower's view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct StudentSync {
    phase: SyncPhase,
    paused: bool,
    /// Where the student is looking.
    local: Option<SessionState>,
    /// The most recent state heard from the instructor.
    remote: Option<SessionState>,
}

impl Default for StudentSync {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentSync {
    pub fn new() -> Self {
        Self {
            phase: SyncPhase::NotConnected,
            paused: false,
            local: None,
            remote: None,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn local(&self) -> Option<SessionState> {
        self.local
    }

    pub fn remote(&self) -> Option<SessionState> {
        self.remote
    }

    /// True when following and on the instructor's position.
    pub fn is_in_sync(&self) -> bool {
        !self.paused && self.local == self.remote
    }

    pub fn subscribe(&mut self) {
        if self.phase == SyncPhase::NotConnected {
            self.phase = SyncPhase::Subscribed;
        }
    }

    /// Apply a broadcast update. Ignored before subscribing and after the end.
    pub fn apply(&mut self, update: SessionState) {
        match self.phase {
            SyncPhase::NotConnected | SyncPhase::Ended => return,
            SyncPhase::Subscribed | SyncPhase::Receiving => {}
        }
        self.remote = Some(update);
        if !self.paused || !update.is_active {
            self.local = Some(update);
        }
        self.phase = if update.is_active {
            SyncPhase::Receiving
        } else {
            SyncPhase::Ended
        };
    }

    /// Stop mirroring; local navigation diverges until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Move the local view while paused. Ignored while following.
    pub fn navigate(&mut self, step: u32, section: Section) {
        if !self.paused {
            return;
        }
        let base = self
            .local
            .or(self.remote)
            .unwrap_or_else(|| SessionState::start(section));
        self.local = Some(SessionState {
            current_step: step,
            current_section: section,
            ..base
        });
    }

    /// Rejoin the instructor: snap to the latest remote state.
    pub fn resume(&mut self) {
        self.paused = false;
        if self.remote.is_some() {
            self.local = self.remote;
        }
    }

    /// Leave the session (view torn down).
    pub fn unsubscribe(&mut self) {
        if self.phase != SyncPhase::Ended {
            self.phase = SyncPhase::NotConnected;
        }
    }
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// Advisory liveness from heartbeats. Never used to reconcile session state.
#[derive(Debug, Clone, Default)]
pub struct PresenceRoster {
    last_seen: HashMap<String, DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceEntry {
    pub participant_id: String,
    pub last_seen: DateTime<Utc>,
}

impl PresenceRoster {
    pub fn heartbeat(&mut self, participant_id: &str, at: DateTime<Utc>) {
        self.last_seen.insert(participant_id.to_string(), at);
    }

    pub fn leave(&mut self, participant_id: &str) {
        self.last_seen.remove(participant_id);
    }

    /// Participants seen within `window` of `now`, sorted by id.
    pub fn online(&self, now: DateTime<Utc>, window: Duration) -> Vec<PresenceEntry> {
        let mut out: Vec<PresenceEntry> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now - **seen <= window)
            .map(|(id, seen)| PresenceEntry {
                participant_id: id.clone(),
                last_seen: *seen,
            })
            .collect();
        out.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));
        out
    }

    /// Drop entries older than `window`.
    pub fn prune(&mut self, now: DateTime<Utc>, window: Duration) {
        self.last_seen.retain(|_, seen| now - *seen <= window);
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> InstructorSession {
        let mut s = InstructorSession::new("day-03");
        s.start(Section::Briefing).unwrap();
        s
    }

    #[test]
    fn instructor_requires_start() {
        let mut s = InstructorSession::new("day-03");
        assert!(matches!(
            s.advance(),
            Err(AcademyError::SessionNotStarted(_))
        ));
    }

    #[test]
    fn instructor_advances_and_changes_section() {
        let mut s = started();
        assert_eq!(s.advance().unwrap().current_step, 1);
        assert_eq!(s.advance().unwrap().current_step, 2);
        let next = s.force_advance_section().unwrap();
        assert_eq!(next.position(), (0, Section::Walkthrough));
        let set = s.set_position(4, Section::Exercise).unwrap();
        assert_eq!(set.position(), (4, Section::Exercise));
    }

    #[test]
    fn advance_at_step_ceiling_is_rejected() {
        let mut s = started();
        s.set_position(u32::MAX, Section::Exercise).unwrap();
        assert!(matches!(s.advance(), Err(AcademyError::StepOverflow(_))));
        let st = s.state().unwrap();
        assert_eq!(st.position(), (u32::MAX, Section::Exercise));
        assert!(st.is_active);
        assert_eq!(s.force_advance_section().unwrap().position(), (0, Section::Debrief));
    }

    #[test]
    fn force_advance_stays_on_last_section() {
        let mut s = started();
        s.set_position(3, Section::Debrief).unwrap();
        let st = s.force_advance_section().unwrap();
        assert_eq!(st.position(), (3, Section::Debrief));
    }

    #[test]
    fn ended_session_rejects_mutation() {
        let mut s = started();
        let last = s.end().unwrap();
        assert!(!last.is_active);
        assert!(matches!(s.advance(), Err(AcademyError::SessionEnded(_))));
        assert!(matches!(
            s.start(Section::Briefing),
            Err(AcademyError::SessionEnded(_))
        ));
        assert!(s.end().is_err());
    }

    #[test]
    fn student_lifecycle() {
        let mut st = StudentSync::new();
        assert_eq!(st.phase(), SyncPhase::NotConnected);
        st.apply(SessionState::start(Section::Briefing));
        assert!(st.local().is_none(), "updates before subscribe are ignored");

        st.subscribe();
        assert_eq!(st.phase(), SyncPhase::Subscribed);

        let mut inst = started();
        st.apply(inst.state().unwrap());
        assert_eq!(st.phase(), SyncPhase::Receiving);
        assert!(st.is_in_sync());

        st.apply(inst.end().unwrap());
        assert_eq!(st.phase(), SyncPhase::Ended);

        st.apply(SessionState::start(Section::Exercise));
        assert_eq!(st.phase(), SyncPhase::Ended, "ended is terminal");
    }

    #[test]
    fn student_mirrors_while_following() {
        let mut inst = started();
        let mut st = StudentSync::new();
        st.subscribe();
        st.apply(inst.advance().unwrap());
        st.apply(inst.advance().unwrap());
        assert_eq!(st.local(), inst.state());
    }

    #[test]
    fn paused_student_diverges_then_converges_on_resume() {
        let mut inst = started();
        let mut st = StudentSync::new();
        st.subscribe();
        st.apply(inst.advance().unwrap());

        st.pause();
        st.navigate(0, Section::Briefing);
        st.apply(inst.force_advance_section().unwrap());
        st.apply(inst.advance().unwrap());
        assert_eq!(st.local().unwrap().position(), (0, Section::Briefing));
        assert_eq!(st.remote(), inst.state());
        assert!(!st.is_in_sync());

        st.resume();
        assert_eq!(st.local(), inst.state());
        assert!(st.is_in_sync());
    }

    #[test]
    fn resume_converges_from_any_divergence() {
        for (step, section) in [
            (0, Section::Briefing),
            (9, Section::Debrief),
            (2, Section::Exercise),
        ] {
            let mut inst = started();
            let mut st = StudentSync::new();
            st.subscribe();
            st.apply(inst.set_position(5, Section::Walkthrough).unwrap());
            st.pause();
            st.navigate(step, section);
            st.resume();
            assert_eq!(st.local(), inst.state());
        }
    }

    #[test]
    fn navigate_ignored_while_following() {
        let inst = started();
        let mut st = StudentSync::new();
        st.subscribe();
        st.apply(inst.state().unwrap());
        st.navigate(7, Section::Debrief);
        assert_eq!(st.local(), inst.state());
    }

    #[test]
    fn paused_student_still_sees_end() {
        let mut inst = started();
        let mut st = StudentSync::new();
        st.subscribe();
        st.apply(inst.state().unwrap());
        st.pause();
        st.apply(inst.end().unwrap());
        assert_eq!(st.phase(), SyncPhase::Ended);
        assert!(!st.local().unwrap().is_active);
    }

    #[test]
    fn presence_window() {
        let now = Utc::now();
        let mut roster = PresenceRoster::default();
        roster.heartbeat("ada", now - Duration::seconds(10));
        roster.heartbeat("bo", now - Duration::seconds(120));
        let online = roster.online(now, Duration::seconds(60));
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].participant_id, "ada");

        roster.prune(now, Duration::seconds(60));
        assert_eq!(roster.online(now, Duration::days(1)).len(), 1);
        roster.leave("ada");
        assert!(roster.online(now, Duration::days(1)).is_empty());
        assert!(roster.is_empty());
    }
}
