use crate::error::AcademyError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MasteryLevel
// ---------------------------------------------------------------------------

/// Proficiency tier, always within 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MasteryLevel(u8);

impl MasteryLevel {
    pub const MIN: MasteryLevel = MasteryLevel(1);
    pub const MAX: MasteryLevel = MasteryLevel(4);

    pub fn new(level: u8) -> Result<Self, AcademyError> {
        if (1..=4).contains(&level) {
            Ok(Self(level))
        } else {
            Err(AcademyError::InvalidLevel(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn clearance(self) -> Clearance {
        match self.0 {
            1 => Clearance::Recruit,
            2 => Clearance::FieldTrainee,
            3 => Clearance::FieldAgent,
            _ => Clearance::SpecialAgent,
        }
    }
}

impl Default for MasteryLevel {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for MasteryLevel {
    type Error = AcademyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MasteryLevel> for u8 {
    fn from(level: MasteryLevel) -> u8 {
        level.0
    }
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Clearance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Clearance {
    Recruit,
    FieldTrainee,
    FieldAgent,
    SpecialAgent,
}

impl Clearance {
    pub fn as_str(self) -> &'static str {
        match self {
            Clearance::Recruit => "RECRUIT",
            Clearance::FieldTrainee => "FIELD_TRAINEE",
            Clearance::FieldAgent => "FIELD_AGENT",
            Clearance::SpecialAgent => "SPECIAL_AGENT",
        }
    }
}

impl fmt::Display for Clearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// Segment of a live session's material, in walkthrough order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Briefing,
    Walkthrough,
    Exercise,
    Debrief,
}

impl Section {
    pub fn all() -> &'static [Section] {
        &[
            Section::Briefing,
            Section::Walkthrough,
            Section::Exercise,
            Section::Debrief,
        ]
    }

    pub fn next(self) -> Option<Section> {
        Section::all().get(self as usize + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Briefing => "briefing",
            Section::Walkthrough => "walkthrough",
            Section::Exercise => "exercise",
            Section::Debrief => "debrief",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Section {
    type Err = AcademyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "briefing" => Ok(Section::Briefing),
            "walkthrough" => Ok(Section::Walkthrough),
            "exercise" => Ok(Section::Exercise),
            "debrief" => Ok(Section::Debrief),
            _ => Err(AcademyError::InvalidSection(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Routine,
    Priority,
    Flash,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Routine => "routine",
            Priority::Priority => "priority",
            Priority::Flash => "flash",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = AcademyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "routine" => Ok(Priority::Routine),
            "priority" => Ok(Priority::Priority),
            "flash" => Ok(Priority::Flash),
            _ => Err(AcademyError::InvalidPriority(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AwardKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKind {
    PerfectAttendance,
    ArtifactAce,
    PeerMentor,
    TutorRegular,
    TopClearance,
}

impl AwardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AwardKind::PerfectAttendance => "perfect_attendance",
            AwardKind::ArtifactAce => "artifact_ace",
            AwardKind::PeerMentor => "peer_mentor",
            AwardKind::TutorRegular => "tutor_regular",
            AwardKind::TopClearance => "top_clearance",
        }
    }
}

impl fmt::Display for AwardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
