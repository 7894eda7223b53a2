use std::sync::Arc;

use chrono::{DateTime, Utc};

use exam_core::model::AttemptId;
use exam_core::scoring::SubmissionRecord;
use storage::repository::SubmissionRepository;

use crate::error::SubmissionError;

//
// ─── SUBMIT PHASE ──────────────────────────────────────────────────────────────
//

/// Lifecycle of the submission flow.
///
/// `Confirming` only exists for manual submission (the confirmation dialog);
/// auto-submission on time-up jumps straight to `Submitting`. `Completed` is
/// terminal; `Failed` returns control to the session so the user can retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Confirming,
    Submitting { auto: bool },
    Completed { attempt_id: AttemptId },
    Failed { message: String },
}

impl SubmitPhase {
    /// True once a submission has been accepted; the session is read-only.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }
}

//
// ─── SUBMISSION ENGINE ─────────────────────────────────────────────────────────
//

/// Drives the submission phase machine and appends accepted results.
///
/// Phase transitions are strict one-way guards: once `Submitting`, new begin
/// requests are ignored (not errors), and once `Completed`, everything is.
/// That property is what makes the time-up auto-submit racing a manual
/// confirm produce exactly one stored attempt.
pub struct SubmissionEngine {
    submissions: Arc<dyn SubmissionRepository>,
    phase: SubmitPhase,
}

impl SubmissionEngine {
    #[must_use]
    pub fn new(submissions: Arc<dyn SubmissionRepository>) -> Self {
        Self {
            submissions,
            phase: SubmitPhase::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    /// Open the manual confirmation dialog. Ignored unless idle (a retry
    /// after failure counts as idle).
    pub fn request_manual(&mut self) -> bool {
        match self.phase {
            SubmitPhase::Idle | SubmitPhase::Failed { .. } => {
                self.phase = SubmitPhase::Confirming;
                true
            }
            _ => false,
        }
    }

    /// Dismiss the confirmation dialog without submitting.
    pub fn cancel(&mut self) {
        if self.phase == SubmitPhase::Confirming {
            self.phase = SubmitPhase::Idle;
        }
    }

    /// Claim the single submission slot. Returns false if a submission is
    /// already in flight or completed, in which case the caller must do
    /// nothing.
    pub fn try_begin(&mut self, auto: bool) -> bool {
        match self.phase {
            SubmitPhase::Idle | SubmitPhase::Confirming | SubmitPhase::Failed { .. } => {
                self.phase = SubmitPhase::Submitting { auto };
                true
            }
            SubmitPhase::Submitting { .. } | SubmitPhase::Completed { .. } => false,
        }
    }

    /// Append the scored record to the attempt history.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::Transport` if the append fails; the phase is
    /// left untouched so the caller decides between retry and abandon.
    pub async fn persist(
        &self,
        record: &SubmissionRecord,
        submitted_at: DateTime<Utc>,
    ) -> Result<AttemptId, SubmissionError> {
        Ok(self.submissions.append(record, submitted_at).await?)
    }

    /// Enter the terminal completed phase.
    pub fn complete(&mut self, attempt_id: AttemptId) {
        self.phase = SubmitPhase::Completed { attempt_id };
    }

    /// Record a failed attempt; the user may retry from here.
    pub fn fail(&mut self, message: String) {
        if !self.phase.is_completed() {
            self.phase = SubmitPhase::Failed { message };
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
