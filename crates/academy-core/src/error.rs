use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcademyError {
    #[error("not initialized: run 'academy init'")]
    NotInitialized,

    #[error("participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("participant already exists: {0}")]
    ParticipantExists(String),

    #[error("intel drop not found: {0}")]
    IntelNotFound(String),

    #[error("invalid participant id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidId(String),

    #[error("invalid mastery level {0}: must be between 1 and 4")]
    InvalidLevel(u8),

    #[error("invalid section: {0}")]
    InvalidSection(String),

    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid program day {day}: must be between 1 and {max}")]
    InvalidDay { day: u32, max: u32 },

    #[error("session '{0}' has ended")]
    SessionEnded(String),

    #[error("session '{0}' has not started")]
    SessionNotStarted(String),

    #[error("session '{0}' is already on the last step")]
    StepOverflow(String),

    #[error("invalid intel title: must not be empty")]
    InvalidTitle,

    #[error("no briefing found for day {0}")]
    BriefingNotFound(u32),

    #[error("remote content error: {0}")]
    RemoteContent(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AcademyError>;
