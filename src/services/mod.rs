pub mod attempt_timing;
pub(crate) mod grading;
