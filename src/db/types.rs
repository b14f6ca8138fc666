use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Lifecycle of a student's attempt. Transitions only leave `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "attemptstatus", rename_all = "kebab-case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Expired,
}

impl AttemptStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    pub fn can_transition_to(self, next: AttemptStatus) -> bool {
        matches!((self, next), (Self::InProgress, Self::Completed) | (Self::InProgress, Self::Expired))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "questionkind", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice,
    Descriptive,
}

/// The closed set of accounts the school system knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Teacher,
    Student,
    Superadmin,
}

/// What a role may do, resolved once per request instead of comparing role names in handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub take_tests: bool,
    pub author_tests: bool,
    pub see_answer_keys: bool,
    pub view_all_scores: bool,
}

impl UserRole {
    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Student => Capabilities {
                take_tests: true,
                author_tests: false,
                see_answer_keys: false,
                view_all_scores: false,
            },
            Self::Teacher => Capabilities {
                take_tests: false,
                author_tests: true,
                see_answer_keys: true,
                view_all_scores: true,
            },
            Self::Admin | Self::Superadmin => Capabilities {
                take_tests: false,
                author_tests: true,
                see_answer_keys: true,
                view_all_scores: true,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Superadmin => "superadmin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_status_only_moves_forward() {
        assert!(AttemptStatus::InProgress.can_transition_to(AttemptStatus::Completed));
        assert!(AttemptStatus::InProgress.can_transition_to(AttemptStatus::Expired));
        assert!(!AttemptStatus::Completed.can_transition_to(AttemptStatus::InProgress));
        assert!(!AttemptStatus::Expired.can_transition_to(AttemptStatus::Completed));
        assert!(!AttemptStatus::Completed.can_transition_to(AttemptStatus::Expired));
        assert!(!AttemptStatus::InProgress.can_transition_to(AttemptStatus::InProgress));
    }

    #[test]
    fn attempt_status_wire_names() {
        assert_eq!(serde_json::to_value(AttemptStatus::InProgress).unwrap(), "in-progress");
        let parsed: AttemptStatus = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(parsed, AttemptStatus::Expired);
        assert_eq!(AttemptStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn question_kind_wire_names() {
        assert_eq!(serde_json::to_value(QuestionKind::MultipleChoice).unwrap(), "multiple-choice");
        assert_eq!(serde_json::to_value(QuestionKind::Descriptive).unwrap(), "descriptive");
    }

    #[test]
    fn only_students_take_tests() {
        for role in [UserRole::Admin, UserRole::Teacher, UserRole::Superadmin] {
            assert!(!role.capabilities().take_tests, "{}", role.as_str());
            assert!(role.capabilities().see_answer_keys);
        }
        let student = UserRole::Student.capabilities();
        assert!(student.take_tests);
        assert!(!student.author_tests);
        assert!(!student.see_answer_keys);
    }
}
