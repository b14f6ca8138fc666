use crate::client::error::{AnswerRejected, GateRejected};
use crate::db::types::AttemptStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The student confirmed a submit.
    Manual,
    /// The countdown reached zero.
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Submitting(SubmitTrigger),
    Submitted,
    Failed { trigger: SubmitTrigger, message: String },
    /// The attempt was already terminal when the session opened.
    Closed(AttemptStatus),
}

impl GateState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted | Self::Closed(_))
    }
}

/// At most one submission per attempt is ever in flight. Every trigger passes through
/// `try_begin`, which checks and transitions in one step.
#[derive(Debug, Clone)]
pub struct SubmissionGate {
    state: GateState,
    time_up: bool,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self { state: GateState::Idle, time_up: false }
    }

    pub fn closed(status: AttemptStatus) -> Self {
        Self { state: GateState::Closed(status), time_up: false }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn try_begin(&mut self, trigger: SubmitTrigger) -> Result<(), GateRejected> {
        match (&self.state, trigger) {
            (GateState::Idle, _) | (GateState::Failed { .. }, SubmitTrigger::Manual) => {}
            (GateState::Failed { .. }, SubmitTrigger::Automatic) => {
                return Err(GateRejected::AutoRetryRefused)
            }
            (GateState::Submitting(_), _) => return Err(GateRejected::InFlight),
            (GateState::Submitted, _) => return Err(GateRejected::AlreadySubmitted),
            (GateState::Closed(status), _) => return Err(GateRejected::Closed(*status)),
        }

        if trigger == SubmitTrigger::Automatic {
            self.time_up = true;
        }
        self.state = GateState::Submitting(trigger);
        Ok(())
    }

    /// Records the server's verdict. `status` is the status the server returned; an attempt
    /// the server left in progress was not submitted.
    pub(crate) fn accept(&mut self, status: AttemptStatus) {
        let GateState::Submitting(trigger) = self.state else {
            tracing::warn!(state = ?self.state, "Submission result arrived outside of submitting");
            return;
        };
        self.state = match status {
            AttemptStatus::Completed => GateState::Submitted,
            AttemptStatus::Expired => GateState::Closed(AttemptStatus::Expired),
            AttemptStatus::InProgress => GateState::Failed {
                trigger,
                message: "server left the attempt in progress".to_string(),
            },
        };
    }

    /// Locks the answers for good once no time is left, whatever triggered the submit.
    pub(crate) fn mark_time_up(&mut self) {
        self.time_up = true;
    }

    pub(crate) fn fail(&mut self, message: String) {
        let GateState::Submitting(trigger) = self.state else {
            tracing::warn!(state = ?self.state, "Submission failure arrived outside of submitting");
            return;
        };
        self.state = GateState::Failed { trigger, message };
    }

    /// Whether the answer buffer may still change.
    pub fn check_editable(&self) -> Result<(), AnswerRejected> {
        match &self.state {
            GateState::Idle | GateState::Failed { .. } if !self.time_up => Ok(()),
            GateState::Idle | GateState::Failed { .. } => Err(AnswerRejected::TimeUp),
            GateState::Submitting(_) => Err(AnswerRejected::Submitting),
            GateState::Submitted => Err(AnswerRejected::Closed(AttemptStatus::Completed)),
            GateState::Closed(status) => Err(AnswerRejected::Closed(*status)),
        }
    }
}

impl Default for SubmissionGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_trigger_wins() {
        let mut gate = SubmissionGate::new();
        assert_eq!(gate.try_begin(SubmitTrigger::Manual), Ok(()));
        assert_eq!(gate.try_begin(SubmitTrigger::Automatic), Err(GateRejected::InFlight));
        assert_eq!(gate.try_begin(SubmitTrigger::Manual), Err(GateRejected::InFlight));
        assert_eq!(gate.state(), &GateState::Submitting(SubmitTrigger::Manual));
    }

    #[test]
    fn manual_failure_returns_to_editable() {
        let mut gate = SubmissionGate::new();
        gate.try_begin(SubmitTrigger::Manual).unwrap();
        gate.fail("network down".to_string());

        assert!(gate.check_editable().is_ok());
        assert_eq!(gate.try_begin(SubmitTrigger::Automatic), Err(GateRejected::AutoRetryRefused));
        assert_eq!(gate.try_begin(SubmitTrigger::Manual), Ok(()));
    }

    #[test]
    fn automatic_failure_stays_locked_but_allows_manual_retry() {
        let mut gate = SubmissionGate::new();
        gate.try_begin(SubmitTrigger::Automatic).unwrap();
        gate.fail("timeout".to_string());

        assert_eq!(
            gate.state(),
            &GateState::Failed { trigger: SubmitTrigger::Automatic, message: "timeout".to_string() }
        );
        assert_eq!(gate.check_editable(), Err(AnswerRejected::TimeUp));

        gate.try_begin(SubmitTrigger::Manual).unwrap();
        gate.fail("still down".to_string());
        assert_eq!(gate.check_editable(), Err(AnswerRejected::TimeUp));
    }

    #[test]
    fn success_is_terminal() {
        let mut gate = SubmissionGate::new();
        gate.try_begin(SubmitTrigger::Manual).unwrap();
        gate.accept(AttemptStatus::Completed);

        assert!(gate.state().is_terminal());
        assert_eq!(gate.try_begin(SubmitTrigger::Manual), Err(GateRejected::AlreadySubmitted));
        assert_eq!(gate.check_editable(), Err(AnswerRejected::Closed(AttemptStatus::Completed)));
    }

    #[test]
    fn in_progress_verdict_is_a_failure() {
        let mut gate = SubmissionGate::new();
        gate.try_begin(SubmitTrigger::Manual).unwrap();
        gate.accept(AttemptStatus::InProgress);

        assert!(matches!(gate.state(), GateState::Failed { trigger: SubmitTrigger::Manual, .. }));
        assert!(!gate.state().is_terminal());
        assert_eq!(gate.try_begin(SubmitTrigger::Manual), Ok(()));
    }

    #[test]
    fn expired_verdict_closes_the_gate() {
        let mut gate = SubmissionGate::new();
        gate.try_begin(SubmitTrigger::Automatic).unwrap();
        gate.accept(AttemptStatus::Expired);
        assert_eq!(gate.state(), &GateState::Closed(AttemptStatus::Expired));
    }

    #[test]
    fn time_up_locks_a_failed_manual_submit() {
        let mut gate = SubmissionGate::new();
        gate.try_begin(SubmitTrigger::Manual).unwrap();
        gate.mark_time_up();
        gate.fail("deadline passed".to_string());

        assert_eq!(gate.check_editable(), Err(AnswerRejected::TimeUp));
        assert_eq!(gate.try_begin(SubmitTrigger::Manual), Ok(()));
    }

    #[test]
    fn closed_gate_refuses_everything() {
        let mut gate = SubmissionGate::closed(AttemptStatus::Expired);
        assert_eq!(
            gate.try_begin(SubmitTrigger::Automatic),
            Err(GateRejected::Closed(AttemptStatus::Expired))
        );
        assert_eq!(gate.check_editable(), Err(AnswerRejected::Closed(AttemptStatus::Expired)));
    }

    #[test]
    fn late_verdicts_are_ignored() {
        let mut gate = SubmissionGate::new();
        gate.accept(AttemptStatus::Completed);
        gate.fail("late".to_string());
        assert_eq!(gate.state(), &GateState::Idle);
    }
}
