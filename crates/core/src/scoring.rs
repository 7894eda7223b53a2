use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{MarkScheme, QuestionId, SessionConfig, SessionEntry, QuestionSet};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("entry count {found} does not match question set of {expected}")]
    EntryCountMismatch { expected: usize, found: usize },

    #[error("too many questions for a single attempt: {len}")]
    TooManyQuestions { len: usize },
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Per-question submission outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    Skipped,
}

/// Session type transmitted with the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Practice,
    MockTest,
}

/// One evaluated (or skipped) question in the submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub user_answer: Option<String>,
    pub outcome: Outcome,
    pub time_taken_seconds: i64,
}

/// Write-once submission payload for one attempt.
///
/// Carries per-question detail sufficient for the receiving system to
/// independently recompute the same score from the same evaluation rule; the
/// score here is a client-side preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub questions: Vec<QuestionResult>,
    pub score: i32,
    pub total_time_seconds: i64,
    pub total_questions: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub skipped_count: u32,
    pub session_type: SessionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_test_id: Option<String>,
}

//
// ─── EVALUATION ────────────────────────────────────────────────────────────────
//

/// Apply the evaluation rule and build the submission payload.
///
/// A question is evaluated iff its status is `answered`, or it is marked for
/// review while holding an answer; everything else is skipped and excluded
/// from the correct/incorrect counts while still counting toward the total.
///
/// Scoring is unweighted (`round(100 * correct / total)`) unless the config
/// carries default marks or any question carries an override, in which case
/// `round(100 * Σ awarded / Σ max)` with the per-question override winning.
///
/// `question_times` is the per-question elapsed map captured at the moment of
/// submission; values convert to whole seconds by floor division.
///
/// # Errors
///
/// Returns `ScoringError::EntryCountMismatch` if `entries` is not aligned
/// with the question set.
pub fn evaluate(
    set: &QuestionSet,
    entries: &[SessionEntry],
    question_times: &BTreeMap<usize, i64>,
    main_elapsed_ms: i64,
    config: &SessionConfig,
) -> Result<SubmissionRecord, ScoringError> {
    if entries.len() != set.len() {
        return Err(ScoringError::EntryCountMismatch {
            expected: set.len(),
            found: entries.len(),
        });
    }

    let weighted =
        config.default_marks.is_some() || set.iter().any(|question| question.marks.is_some());

    let mut questions = Vec::with_capacity(set.len());
    let mut correct_count = 0_u32;
    let mut incorrect_count = 0_u32;
    let mut skipped_count = 0_u32;
    let mut awarded = 0.0_f64;
    let mut max_marks = 0.0_f64;

    for (index, (question, entry)) in set.iter().zip(entries).enumerate() {
        let marks = question
            .marks
            .or(config.default_marks)
            .unwrap_or(MarkScheme {
                correct: 1.0,
                incorrect: 0.0,
            });
        max_marks += marks.correct;

        let outcome = if entry.is_evaluated() {
            if entry.user_answer.as_deref() == Some(question.correct_option.as_str()) {
                correct_count += 1;
                awarded += marks.correct;
                Outcome::Correct
            } else {
                incorrect_count += 1;
                awarded += marks.incorrect;
                Outcome::Incorrect
            }
        } else {
            skipped_count += 1;
            Outcome::Skipped
        };

        questions.push(QuestionResult {
            question_id: question.id.clone(),
            user_answer: entry.user_answer.clone(),
            outcome,
            time_taken_seconds: question_times.get(&index).copied().unwrap_or(0) / 1000,
        });
    }

    let total = u32::try_from(set.len())
        .map_err(|_| ScoringError::TooManyQuestions { len: set.len() })?;
    let score = if weighted {
        if max_marks > 0.0 {
            (100.0 * awarded / max_marks).round() as i32
        } else {
            0
        }
    } else {
        (100.0 * f64::from(correct_count) / f64::from(total)).round() as i32
    };

    let session_type = if config.mock_test_id.is_some() || config.mode.is_timed() {
        SessionType::MockTest
    } else {
        SessionType::Practice
    };

    Ok(SubmissionRecord {
        questions,
        score,
        total_time_seconds: main_elapsed_ms / 1000,
        total_questions: total,
        correct_count,
        incorrect_count,
        skipped_count,
        session_type,
        mock_test_id: config.mock_test_id.clone(),
    })
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
