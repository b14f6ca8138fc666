use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::models::{AnswerMap, Assessment, Attempt, Question, Score};
use crate::db::types::QuestionKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GradeSummary {
    pub(crate) obtained_marks: f64,
    pub(crate) total_marks: f64,
    pub(crate) percentage: f64,
    pub(crate) passed: bool,
}

/// All-or-nothing marking. Multiple-choice answers earn the question's marks on an exact
/// option match; descriptive answers are recorded but earn nothing here.
pub(crate) fn grade(assessment: &Assessment, questions: &[Question], answers: &AnswerMap) -> GradeSummary {
    let obtained_marks: f64 = questions
        .iter()
        .filter(|question| question.kind == QuestionKind::MultipleChoice)
        .filter(|question| {
            match (answers.get(&question.id), question.correct_option.as_deref()) {
                (Some(answer), Some(correct)) => answer_text(answer).as_deref() == Some(correct),
                _ => false,
            }
        })
        .map(|question| question.marks)
        .sum();

    let total_marks = assessment.total_marks;
    let percentage =
        if total_marks > 0.0 { (obtained_marks / total_marks * 100.0).min(100.0) } else { 0.0 };

    GradeSummary {
        obtained_marks,
        total_marks,
        percentage,
        passed: obtained_marks >= assessment.passing_marks,
    }
}

pub(crate) fn score_for(attempt: &Attempt, summary: GradeSummary, graded_at: OffsetDateTime) -> Score {
    Score {
        id: Uuid::new_v4().to_string(),
        assessment_id: attempt.assessment_id.clone(),
        student_id: attempt.student_id.clone(),
        attempt_id: attempt.id.clone(),
        obtained_marks: summary.obtained_marks,
        total_marks: summary.total_marks,
        percentage: summary.percentage,
        passed: summary.passed,
        graded_at,
    }
}

fn answer_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use time::macros::datetime;

    fn assessment(total: f64, passing: f64) -> Assessment {
        Assessment {
            id: "t-1".to_string(),
            title: "Fractions quiz".to_string(),
            subject: "Maths".to_string(),
            class_id: "7b".to_string(),
            total_marks: total,
            passing_marks: passing,
            duration_minutes: Some(30),
            scheduled_date: None,
            start_time: None,
            end_time: None,
            created_by: "teacher-1".to_string(),
            created_at: datetime!(2025-03-01 08:00:00 UTC),
        }
    }

    fn choice(id: &str, marks: f64, correct: &str) -> Question {
        Question {
            id: id.to_string(),
            assessment_id: "t-1".to_string(),
            kind: QuestionKind::MultipleChoice,
            text: format!("question {id}"),
            marks,
            position: 0,
            options: Json(vec!["1/2".to_string(), "1/3".to_string(), "2/3".to_string()]),
            correct_option: Some(correct.to_string()),
        }
    }

    fn essay(id: &str, marks: f64) -> Question {
        Question {
            id: id.to_string(),
            assessment_id: "t-1".to_string(),
            kind: QuestionKind::Descriptive,
            text: "Explain".to_string(),
            marks,
            position: 1,
            options: Json(Vec::new()),
            correct_option: None,
        }
    }

    #[test]
    fn grades_exact_multiple_choice_matches() {
        let questions = vec![choice("q1", 4.0, "1/2"), choice("q2", 6.0, "2/3"), essay("q3", 10.0)];
        let mut answers = AnswerMap::new();
        answers.insert("q1".to_string(), Value::String(" 1/2 ".to_string()));
        answers.insert("q2".to_string(), Value::String("1/3".to_string()));
        answers.insert("q3".to_string(), Value::String("because".to_string()));

        let summary = grade(&assessment(20.0, 4.0), &questions, &answers);

        assert_eq!(summary.obtained_marks, 4.0);
        assert_eq!(summary.total_marks, 20.0);
        assert_eq!(summary.percentage, 20.0);
        assert!(summary.passed);
    }

    #[test]
    fn unanswered_test_scores_zero() {
        let questions = vec![choice("q1", 5.0, "1/2")];
        let summary = grade(&assessment(5.0, 3.0), &questions, &AnswerMap::new());

        assert_eq!(summary.obtained_marks, 0.0);
        assert_eq!(summary.percentage, 0.0);
        assert!(!summary.passed);
    }

    #[test]
    fn zero_total_marks_does_not_divide() {
        let summary = grade(&assessment(0.0, 0.0), &[], &AnswerMap::new());
        assert_eq!(summary.percentage, 0.0);
        assert!(summary.passed);
    }

    #[test]
    fn numeric_answers_compare_as_text() {
        let mut question = choice("q1", 2.0, "42");
        question.options = Json(vec!["41".to_string(), "42".to_string()]);
        let mut answers = AnswerMap::new();
        answers.insert("q1".to_string(), serde_json::json!(42));

        let summary = grade(&assessment(2.0, 1.0), &[question], &answers);
        assert_eq!(summary.obtained_marks, 2.0);
    }
}
