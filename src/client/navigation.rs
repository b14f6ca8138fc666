use crate::db::types::{AttemptStatus, UserRole};
use crate::services::attempt_timing::ScheduleIssue;

/// What the taking flow should render next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// No attempt yet; offer the explicit start action.
    Start,
    Taking,
    Submitting,
    /// Submission failed. `can_edit` is false once time has run out.
    SubmitFailed { can_edit: bool },
    Result,
    Closed(AttemptStatus),
    Misconfigured(ScheduleIssue),
}

/// Landing screen for each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Home {
    StudentDashboard,
    TeacherDashboard,
    AdminDashboard,
    SuperadminDashboard,
}

/// Where opening a test leads for a given role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestRoute {
    Take { test_id: String },
    Review { test_id: String },
}

impl UserRole {
    pub fn home(self) -> Home {
        match self {
            Self::Student => Home::StudentDashboard,
            Self::Teacher => Home::TeacherDashboard,
            Self::Admin => Home::AdminDashboard,
            Self::Superadmin => Home::SuperadminDashboard,
        }
    }

    pub fn test_route(self, test_id: impl Into<String>) -> TestRoute {
        let test_id = test_id.into();
        if self.capabilities().take_tests {
            TestRoute::Take { test_id }
        } else {
            TestRoute::Review { test_id }
        }
    }
}
