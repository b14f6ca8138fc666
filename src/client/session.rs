use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::watch;

use crate::client::answers::AnswerBuffer;
use crate::client::api::AttemptApi;
use crate::client::clock::Clock;
use crate::client::context::RequestContext;
use crate::client::countdown::Countdown;
use crate::client::error::{AnswerRejected, ClientError, SessionError};
use crate::client::gate::{GateState, SubmissionGate, SubmitTrigger};
use crate::client::navigation::View;
use crate::client::resolver::{derive_phase, resolve, Resolution, ResolvedPhase};
use crate::db::types::AttemptStatus;
use crate::schemas::assessment::{AssessmentResponse, QuestionResponse};
use crate::schemas::attempt::{AnswerMap, AttemptResponse};
use crate::services::attempt_timing;

/// One student's taking view for one test: resolution, countdown, answers and the
/// submission gate wired together. Must be used inside a tokio runtime.
pub struct TakeTestSession {
    shared: Arc<Shared>,
}

struct Shared {
    api: Arc<dyn AttemptApi>,
    ctx: RequestContext,
    clock: Arc<dyn Clock>,
    test: AssessmentResponse,
    questions: Vec<QuestionResponse>,
    inner: Mutex<Inner>,
    gate_tx: watch::Sender<GateState>,
    remaining_tx: Arc<watch::Sender<u64>>,
}

struct Inner {
    phase: ResolvedPhase,
    attempt: Option<AttemptResponse>,
    answers: AnswerBuffer,
    gate: SubmissionGate,
    countdown: Option<Countdown>,
}

impl TakeTestSession {
    /// Resolves the test and arms the session. An attempt whose time is already up enters
    /// `Submitting` before this returns.
    pub async fn open(
        api: Arc<dyn AttemptApi>,
        ctx: RequestContext,
        clock: Arc<dyn Clock>,
        test_id: &str,
    ) -> Result<Self, ClientError> {
        let resolution = resolve(api.as_ref(), &ctx, clock.as_ref(), test_id).await?;
        Ok(Self::from_resolution(api, ctx, clock, resolution))
    }

    pub fn from_resolution(
        api: Arc<dyn AttemptApi>,
        ctx: RequestContext,
        clock: Arc<dyn Clock>,
        resolution: Resolution,
    ) -> Self {
        let Resolution { test, questions, attempt, phase } = resolution;
        let gate = gate_for(phase);
        let remaining = match phase {
            ResolvedPhase::InProgress { remaining_seconds } => remaining_seconds,
            _ => 0,
        };
        let (gate_tx, _) = watch::channel(gate.state().clone());
        let (remaining_tx, _) = watch::channel(remaining);

        let shared = Arc::new(Shared {
            api,
            ctx,
            clock,
            test,
            questions,
            inner: Mutex::new(Inner {
                phase,
                answers: AnswerBuffer::seeded(attempt.as_ref()),
                attempt,
                gate,
                countdown: None,
            }),
            gate_tx,
            remaining_tx: Arc::new(remaining_tx),
        });
        shared.arm();

        Self { shared }
    }

    pub fn test(&self) -> &AssessmentResponse {
        &self.shared.test
    }

    pub fn questions(&self) -> &[QuestionResponse] {
        &self.shared.questions
    }

    pub fn attempt(&self) -> Option<AttemptResponse> {
        self.shared.lock().attempt.clone()
    }

    pub fn phase(&self) -> ResolvedPhase {
        self.shared.lock().phase
    }

    pub fn gate_state(&self) -> GateState {
        self.shared.lock().gate.state().clone()
    }

    /// Seconds left, republished on every countdown tick.
    pub fn remaining(&self) -> watch::Receiver<u64> {
        self.shared.remaining_tx.subscribe()
    }

    /// Gate transitions as they happen.
    pub fn state(&self) -> watch::Receiver<GateState> {
        self.shared.gate_tx.subscribe()
    }

    pub fn view(&self) -> View {
        let inner = self.shared.lock();
        match inner.gate.state() {
            GateState::Submitting(_) => View::Submitting,
            GateState::Submitted | GateState::Closed(AttemptStatus::Completed) => View::Result,
            GateState::Closed(status) => View::Closed(*status),
            GateState::Failed { .. } => {
                View::SubmitFailed { can_edit: inner.gate.check_editable().is_ok() }
            }
            GateState::Idle => match inner.phase {
                ResolvedPhase::NotStarted => View::Start,
                ResolvedPhase::Misconfigured(issue) => View::Misconfigured(issue),
                _ => View::Taking,
            },
        }
    }

    pub fn answer(&self, question_id: &str) -> Option<Value> {
        self.shared.lock().answers.get(question_id).cloned()
    }

    pub fn answers(&self) -> AnswerMap {
        self.shared.lock().answers.snapshot()
    }

    pub fn set_answer(
        &self,
        question_id: impl Into<String>,
        value: Value,
    ) -> Result<(), AnswerRejected> {
        let mut inner = self.shared.lock();
        if inner.attempt.is_none() {
            return Err(AnswerRejected::NotStarted);
        }
        let Inner { answers, gate, .. } = &mut *inner;
        answers.set(gate, question_id, value)
    }

    pub fn clear_answer(&self, question_id: &str) -> Result<Option<Value>, AnswerRejected> {
        let mut inner = self.shared.lock();
        if inner.attempt.is_none() {
            return Err(AnswerRejected::NotStarted);
        }
        let Inner { answers, gate, .. } = &mut *inner;
        answers.clear(gate, question_id)
    }

    /// The explicit start action. A conflict means an attempt already exists, so the session
    /// resumes it (or shows it as closed) instead of reporting a failure.
    pub async fn start(&self) -> Result<View, SessionError> {
        {
            let inner = self.shared.lock();
            if inner.attempt.is_some() {
                return Err(SessionError::AlreadyStarted);
            }
            if let ResolvedPhase::Misconfigured(issue) = inner.phase {
                return Err(ClientError::from(issue).into());
            }
        }

        let shared = &self.shared;
        let attempt = match shared.api.start_attempt(&shared.ctx, &shared.test.id).await {
            Ok(attempt) => {
                tracing::info!(test_id = %shared.test.id, attempt_id = %attempt.id, "Attempt started");
                attempt
            }
            Err(err) if err.is_conflict() => {
                tracing::info!(test_id = %shared.test.id, detail = %err, "Attempt exists; resuming");
                match shared.api.fetch_attempt(&shared.ctx, &shared.test.id).await? {
                    Some(existing) => existing,
                    None => return Err(err.into()),
                }
            }
            Err(err) => return Err(err.into()),
        };

        shared.adopt(attempt);
        Ok(self.view())
    }

    /// Manual submit. Refused while another submission is in flight or after success.
    pub async fn submit(&self) -> Result<View, SessionError> {
        let answers = self.shared.begin(SubmitTrigger::Manual)?;
        self.shared.finish(answers).await?;
        Ok(self.view())
    }

    /// Sends the current answers as a partial save. Returns the server's save time.
    pub async fn save_progress(&self) -> Result<Option<OffsetDateTime>, SessionError> {
        let answers = {
            let inner = self.shared.lock();
            if inner.attempt.is_none() {
                return Err(SessionError::NotStarted);
            }
            inner.gate.check_editable()?;
            inner.answers.snapshot()
        };

        let shared = &self.shared;
        let saved = shared.api.save_progress(&shared.ctx, &shared.test.id, &answers).await?;

        let mut inner = shared.lock();
        if let Some(current) = inner.attempt.as_mut() {
            if current.status == AttemptStatus::InProgress {
                current.last_saved_at = saved.last_saved_at;
            }
        }
        tracing::debug!(test_id = %shared.test.id, answers = answers.len(), "Progress saved");
        Ok(saved.last_saved_at)
    }

    /// Stops the countdown. An in-flight submission still completes.
    pub fn close(&self) {
        if let Some(countdown) = self.shared.lock().countdown.take() {
            countdown.cancel();
        }
    }
}

impl Drop for TakeTestSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn gate_for(phase: ResolvedPhase) -> SubmissionGate {
    match phase {
        ResolvedPhase::Terminal(status) => SubmissionGate::closed(status),
        _ => SubmissionGate::new(),
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_gate(&self, inner: &Inner) {
        self.gate_tx.send_replace(inner.gate.state().clone());
    }

    /// Starts the countdown for an in-progress attempt, or submits at once when none is left.
    fn arm(self: &Arc<Self>) {
        let mut inner = self.lock();
        let started_at = inner.attempt.as_ref().map(|attempt| attempt.start_time);
        let started_at = match (inner.phase, started_at) {
            (ResolvedPhase::InProgress { .. }, Some(started_at)) => started_at,
            (ResolvedPhase::TimeUp, Some(_)) => {
                drop(inner);
                self.remaining_tx.send_replace(0);
                self.auto_submit();
                return;
            }
            _ => return,
        };
        let Ok(duration) = attempt_timing::validate_duration(self.test.duration_minutes) else {
            return;
        };

        let weak = Arc::downgrade(self);
        let countdown = Countdown::start(
            self.clock.clone(),
            duration,
            started_at,
            self.remaining_tx.clone(),
            move || {
                if let Some(shared) = weak.upgrade() {
                    shared.auto_submit();
                }
            },
        );

        match countdown {
            Some(countdown) => inner.countdown = Some(countdown),
            None => {
                inner.phase = ResolvedPhase::TimeUp;
                drop(inner);
                self.auto_submit();
            }
        }
    }

    /// Takes the gate for an automatic submit right now and sends the request in the background.
    fn auto_submit(self: &Arc<Self>) {
        match self.begin(SubmitTrigger::Automatic) {
            Ok(answers) => {
                let shared = Arc::clone(self);
                tokio::spawn(async move {
                    let _ = shared.finish(answers).await;
                });
            }
            Err(rejected) => {
                tracing::debug!(test_id = %self.test.id, reason = %rejected, "Auto-submit suppressed");
            }
        }
    }

    /// The single check-and-transition in front of every submit request. The countdown is torn
    /// down here, before any network call.
    fn begin(&self, trigger: SubmitTrigger) -> Result<AnswerMap, SessionError> {
        let mut inner = self.lock();
        if inner.attempt.is_none() {
            return Err(SessionError::NotStarted);
        }
        inner.gate.try_begin(trigger)?;
        if let Some(countdown) = inner.countdown.take() {
            countdown.cancel();
        }
        let answers = inner.answers.snapshot();
        self.publish_gate(&inner);
        drop(inner);

        tracing::info!(
            test_id = %self.test.id,
            trigger = ?trigger,
            answers = answers.len(),
            "Submitting attempt"
        );
        Ok(answers)
    }

    async fn finish(&self, answers: AnswerMap) -> Result<AttemptResponse, ClientError> {
        let result = self.api.submit_attempt(&self.ctx, &self.test.id, &answers).await.and_then(
            |attempt| match attempt.status.is_terminal() {
                true => Ok(attempt),
                false => Err(ClientError::NotSubmitted(attempt.status)),
            },
        );
        let result = match result {
            Err(err) => self.reconcile(err).await,
            ok => ok,
        };

        let mut inner = self.lock();
        match &result {
            Ok(attempt) => {
                inner.gate.accept(attempt.status);
                inner.phase = ResolvedPhase::Terminal(attempt.status);
                inner.answers = AnswerBuffer::seeded(Some(attempt));
                inner.attempt = Some(attempt.clone());
                tracing::info!(
                    test_id = %self.test.id,
                    attempt_id = %attempt.id,
                    status = attempt.status.as_str(),
                    "Attempt submitted"
                );
            }
            Err(err) => {
                if self.time_exhausted(&inner) {
                    inner.gate.mark_time_up();
                    inner.phase = ResolvedPhase::TimeUp;
                    self.remaining_tx.send_replace(0);
                }
                inner.gate.fail(err.to_string());
                tracing::warn!(test_id = %self.test.id, error = %err, "Attempt submission failed");
            }
        }
        self.publish_gate(&inner);

        result
    }

    /// A failed submit may still have landed, or the attempt may have been expired meanwhile.
    /// A terminal attempt on the server wins over the local error.
    async fn reconcile(&self, err: ClientError) -> Result<AttemptResponse, ClientError> {
        match self.api.fetch_attempt(&self.ctx, &self.test.id).await {
            Ok(Some(attempt)) if attempt.status.is_terminal() => {
                tracing::info!(
                    test_id = %self.test.id,
                    status = attempt.status.as_str(),
                    error = %err,
                    "Submit failed but the server already closed the attempt"
                );
                Ok(attempt)
            }
            Ok(_) => Err(err),
            Err(lookup) => {
                tracing::debug!(test_id = %self.test.id, error = %lookup, "Attempt re-read failed");
                Err(err)
            }
        }
    }

    fn time_exhausted(&self, inner: &Inner) -> bool {
        let (Some(attempt), Some(minutes)) = (inner.attempt.as_ref(), self.test.duration_minutes) else {
            return false;
        };
        attempt_timing::remaining_seconds(minutes, attempt.start_time, self.clock.now()) == 0
    }

    /// Replaces the local attempt after an explicit start and arms the session for it.
    fn adopt(self: &Arc<Self>, attempt: AttemptResponse) {
        {
            let mut inner = self.lock();
            let phase = derive_phase(&self.test, Some(&attempt), self.clock.now());
            inner.phase = phase;
            inner.gate = gate_for(phase);
            inner.answers = AnswerBuffer::seeded(Some(&attempt));
            inner.attempt = Some(attempt);
            if let ResolvedPhase::InProgress { remaining_seconds } = phase {
                self.remaining_tx.send_replace(remaining_seconds);
            }
            self.publish_gate(&inner);
        }
        self.arm();
    }
}
