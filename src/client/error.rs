use thiserror::Error;

use crate::db::types::AttemptStatus;
use crate::services::attempt_timing::ScheduleIssue;

/// Everything a call against the attempts API can end in, sorted by how the caller reacts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The server refused because an attempt already exists or is already closed.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("test is misconfigured: {0}")]
    Misconfigured(String),
    #[error("not authenticated: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
    #[error("result is not available yet: {0}")]
    ResultNotReady(String),
    /// A submit answered with an attempt that is still open.
    #[error("server left the attempt {}", .0.as_str())]
    NotSubmitted(AttemptStatus),
}

impl ClientError {
    pub(crate) fn from_status(status: u16, detail: String) -> Self {
        match status {
            401 => Self::Unauthorized(detail),
            403 => Self::Forbidden(detail),
            404 => Self::NotFound(detail),
            409 => Self::Conflict(detail),
            422 => Self::Misconfigured(detail),
            _ => Self::Status { status, detail },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<ScheduleIssue> for ClientError {
    fn from(issue: ScheduleIssue) -> Self {
        Self::Misconfigured(issue.to_string())
    }
}

/// An answer edit arriving after the session stopped accepting edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnswerRejected {
    #[error("no attempt has been started for this test")]
    NotStarted,
    #[error("answers are locked while a submission is in flight")]
    Submitting,
    #[error("answers are locked after an automatic submission")]
    TimeUp,
    #[error("the attempt is already {}", .0.as_str())]
    Closed(AttemptStatus),
}

/// A submit trigger refused by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateRejected {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("the attempt has already been submitted")]
    AlreadySubmitted,
    #[error("the attempt is already {}", .0.as_str())]
    Closed(AttemptStatus),
    #[error("automatic submission already failed; only a manual retry is allowed")]
    AutoRetryRefused,
}

/// Failure of a session action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ClientError),
    #[error(transparent)]
    Gate(#[from] GateRejected),
    #[error(transparent)]
    Answer(#[from] AnswerRejected),
    #[error("no attempt has been started for this test")]
    NotStarted,
    #[error("an attempt is already open for this test")]
    AlreadyStarted,
}
