use thiserror::Error;

use crate::model::{
    QuestionSet, QuestionStatus, RestoreSource, SessionEntry, StatusCounts,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Precondition violations on the session state store.
///
/// These indicate a caller bug (bad index, mismatched restore payload) rather
/// than a user-recoverable condition; they are surfaced instead of silently
/// leaving entries and questions misaligned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("question index {index} out of range for a set of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("restored snapshot has {found} entries for a set of {expected}")]
    EntryCountMismatch { expected: usize, found: usize },
}

//
// ─── ADVANCE ───────────────────────────────────────────────────────────────────
//

/// Result of a Save/Mark commit: either the cursor moved to the next
/// question, or the committed question was the last one in the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    EndOfSet,
}

//
// ─── SESSION STATE STORE ───────────────────────────────────────────────────────
//

/// Owns the per-question status array and the current-question cursor.
///
/// All operations are pure in-memory mutations. Invariant at all times after
/// construction: `entries.len() == question_set.len()`, with index `i` of the
/// entries always describing `question_set[i]`.
///
/// Answer selection (`set_answer`) is provisional; only the explicit Save and
/// Mark commitments persist an answer across direct navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStateStore {
    question_set: QuestionSet,
    entries: Vec<SessionEntry>,
    current_index: usize,
}

impl SessionStateStore {
    /// Build the store, consuming the restore source exactly once.
    ///
    /// Fresh sessions start with every entry `not_visited` and no answers;
    /// ephemeral and durable sources rehydrate entries and cursor. The
    /// question that ends up current is visited immediately.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EntryCountMismatch` if an ephemeral snapshot does
    /// not cover the set, or `StoreError::IndexOutOfRange` if a restored
    /// cursor falls outside it.
    pub fn new(question_set: QuestionSet, restore: RestoreSource) -> Result<Self, StoreError> {
        let len = question_set.len();
        let (entries, current_index) = match restore {
            RestoreSource::Fresh => (vec![SessionEntry::fresh(); len], 0),
            RestoreSource::Ephemeral(snapshot) => {
                if snapshot.entries.len() != len {
                    return Err(StoreError::EntryCountMismatch {
                        expected: len,
                        found: snapshot.entries.len(),
                    });
                }
                (snapshot.entries, snapshot.current_index)
            }
            RestoreSource::Durable(saved) => {
                (saved.entries_aligned(&question_set), saved.current_index)
            }
        };

        if current_index >= len {
            return Err(StoreError::IndexOutOfRange {
                index: current_index,
                len,
            });
        }

        let mut store = Self {
            question_set,
            entries,
            current_index,
        };
        store.visit(current_index)?;
        Ok(store)
    }

    // ─── Accessors ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn question_set(&self) -> &QuestionSet {
        &self.question_set
    }

    #[must_use]
    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; the question set is validated non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for the given question index.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` for an invalid index.
    pub fn entry(&self, index: usize) -> Result<&SessionEntry, StoreError> {
        self.entries.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Counts of each status plus the compound marked-and-answered count.
    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.entries)
    }

    // ─── Mutations ─────────────────────────────────────────────────────────

    /// Store a provisional answer (or clear it with `None`).
    ///
    /// Never alters status: status transitions are explicit user commitments
    /// (Save, Mark), not incidental to option selection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` for an invalid index.
    pub fn set_answer(&mut self, index: usize, answer: Option<String>) -> Result<(), StoreError> {
        self.entry_mut(index)?.user_answer = answer;
        Ok(())
    }

    /// Mark a question as seen: `not_visited` becomes `unanswered`.
    ///
    /// Idempotent; called whenever a question becomes the active question.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` for an invalid index.
    pub fn visit(&mut self, index: usize) -> Result<(), StoreError> {
        let entry = self.entry_mut(index)?;
        if entry.status == QuestionStatus::NotVisited {
            entry.status = QuestionStatus::Unanswered;
        }
        Ok(())
    }

    /// Clear the answer; status is left untouched and resolved at the next
    /// Save/Mark commit.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` for an invalid index.
    pub fn clear_answer(&mut self, index: usize) -> Result<(), StoreError> {
        self.entry_mut(index)?.user_answer = None;
        Ok(())
    }

    /// Commit the current answer state via Save and advance the cursor.
    ///
    /// A question already marked for review keeps that status while it holds
    /// an answer and falls back to `unanswered` otherwise; any other status
    /// becomes `answered` or `unanswered` by answer presence.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` for an invalid index.
    pub fn commit_save_and_advance(&mut self, index: usize) -> Result<Advance, StoreError> {
        let entry = self.entry_mut(index)?;
        let has_answer = entry.user_answer.is_some();
        entry.status = match entry.status {
            QuestionStatus::MarkedForReview if has_answer => QuestionStatus::MarkedForReview,
            _ if has_answer => QuestionStatus::Answered,
            _ => QuestionStatus::Unanswered,
        };
        self.advance_from(index)
    }

    /// Commit via Mark-for-review and advance the cursor.
    ///
    /// Status becomes `marked_for_review` unconditionally; an existing answer
    /// is preserved unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` for an invalid index.
    pub fn commit_mark_and_advance(&mut self, index: usize) -> Result<Advance, StoreError> {
        self.entry_mut(index)?.status = QuestionStatus::MarkedForReview;
        self.advance_from(index)
    }

    /// Jump directly to a question (palette navigation).
    ///
    /// Discards an uncommitted provisional answer on the question being left:
    /// if its answer is set but its status is not a Save/Mark commitment, the
    /// answer is cleared (promoting `not_visited` to `unanswered` if needed).
    /// The target question is then visited.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` for an invalid target index.
    pub fn navigate_direct(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.entries.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }

        let leaving = &mut self.entries[self.current_index];
        if leaving.user_answer.is_some() && !leaving.status.is_committed() {
            leaving.user_answer = None;
            if leaving.status == QuestionStatus::NotVisited {
                leaving.status = QuestionStatus::Unanswered;
            }
        }

        self.current_index = index;
        self.visit(index)
    }

    /// Toggle the bookmark flag, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` for an invalid index.
    pub fn toggle_bookmark(&mut self, index: usize) -> Result<bool, StoreError> {
        let entry = self.entry_mut(index)?;
        entry.is_bookmarked = !entry.is_bookmarked;
        Ok(entry.is_bookmarked)
    }

    /// Force the bookmark flag to a specific state (used for rollback).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` for an invalid index.
    pub fn set_bookmarked(&mut self, index: usize, bookmarked: bool) -> Result<(), StoreError> {
        self.entry_mut(index)?.is_bookmarked = bookmarked;
        Ok(())
    }

    fn advance_from(&mut self, index: usize) -> Result<Advance, StoreError> {
        if index + 1 >= self.entries.len() {
            return Ok(Advance::EndOfSet);
        }
        self.current_index = index + 1;
        self.visit(self.current_index)?;
        Ok(Advance::Moved(self.current_index))
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut SessionEntry, StoreError> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
