use serde_json::Value;

use crate::client::error::AnswerRejected;
use crate::client::gate::SubmissionGate;
use crate::schemas::attempt::{AnswerMap, AttemptResponse};

/// The in-memory working copy of a student's answers. Nothing here is persisted locally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerBuffer {
    answers: AnswerMap,
}

impl AnswerBuffer {
    /// Seeds from whatever the server already holds for the attempt.
    pub fn seeded(attempt: Option<&AttemptResponse>) -> Self {
        Self { answers: attempt.map(|attempt| attempt.submitted_answers.clone()).unwrap_or_default() }
    }

    pub fn get(&self, question_id: &str) -> Option<&Value> {
        self.answers.get(question_id)
    }

    pub fn set(
        &mut self,
        gate: &SubmissionGate,
        question_id: impl Into<String>,
        value: Value,
    ) -> Result<(), AnswerRejected> {
        gate.check_editable()?;
        self.answers.insert(question_id.into(), value);
        Ok(())
    }

    pub fn clear(
        &mut self,
        gate: &SubmissionGate,
        question_id: &str,
    ) -> Result<Option<Value>, AnswerRejected> {
        gate.check_editable()?;
        Ok(self.answers.remove(question_id))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn snapshot(&self) -> AnswerMap {
        self.answers.clone()
    }
}
