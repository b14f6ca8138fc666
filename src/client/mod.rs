//! Student-side lifecycle of a timed attempt, driven against the attempts API.
//!
//! `TakeTestSession` resolves the starting state from the server, runs the countdown, holds
//! the working answers and funnels every submit through one gate. `ResultSummary` is the
//! read-only view of a graded attempt.

pub mod answers;
pub mod api;
pub mod clock;
pub mod context;
pub mod countdown;
pub mod error;
pub mod gate;
pub mod navigation;
pub mod resolver;
pub mod result;
pub mod session;

pub use answers::AnswerBuffer;
pub use api::{AttemptApi, ClientSettings, HttpAttemptApi};
pub use clock::{AnchoredClock, Clock, SystemClock};
pub use context::RequestContext;
pub use countdown::Countdown;
pub use error::{AnswerRejected, ClientError, GateRejected, SessionError};
pub use gate::{GateState, SubmissionGate, SubmitTrigger};
pub use navigation::{Home, TestRoute, View};
pub use resolver::{derive_phase, resolve, Resolution, ResolvedPhase};
pub use result::ResultSummary;
pub use session::TakeTestSession;
