use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Difficulty tag carried by a question; informational only, scoring ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Marks awarded for a correct answer and the (typically negative) marks
/// applied for an incorrect one.
///
/// A question-level `MarkScheme` overrides the session-level default when
/// present; skipped questions always award zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkScheme {
    pub correct: f64,
    pub incorrect: f64,
}

/// A single exam question as supplied by the question bank.
///
/// Read-only from the engine's perspective. `options` maps option keys
/// (e.g. "a".."d") to display text; `correct_option` must be one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: BTreeMap<String, String>,
    pub correct_option: String,
    pub difficulty: Difficulty,
    /// Per-question marking override for weighted tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<MarkScheme>,
}

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("question set is empty")]
    Empty,

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),

    #[error("question {id} does not list its correct option {key:?}")]
    UnknownCorrectOption { id: QuestionId, key: String },
}

/// Immutable ordered sequence of questions for one session.
///
/// Validated on construction: non-empty, unique ids, and every question's
/// `correct_option` present among its options. Index `i` here is the index
/// every other engine component aligns to.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSet {
    questions: Vec<Question>,
    index_by_id: HashMap<QuestionId, usize>,
}

impl QuestionSet {
    /// Build a validated question set.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::Empty` for an empty input,
    /// `QuestionSetError::DuplicateId` for a repeated id, and
    /// `QuestionSetError::UnknownCorrectOption` when a question's correct
    /// option key is not among its options.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }

        let mut index_by_id = HashMap::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            if index_by_id.insert(question.id.clone(), index).is_some() {
                return Err(QuestionSetError::DuplicateId(question.id.clone()));
            }
            if !question.options.contains_key(&question.correct_option) {
                return Err(QuestionSetError::UnknownCorrectOption {
                    id: question.id.clone(),
                    key: question.correct_option.clone(),
                });
            }
        }

        Ok(Self {
            questions,
            index_by_id,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; an empty set cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn index_of(&self, id: &QuestionId) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Ids in set order.
    #[must_use]
    pub fn ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|q| q.id.clone()).collect()
    }

    /// Deterministic key for the ephemeral snapshot slot.
    ///
    /// Derived from the sorted id list so the same question set resolves to
    /// the same slot across remounts. Each id is length-prefixed, which keeps
    /// the encoding unambiguous even when ids contain separator characters;
    /// two different sets can therefore never share a slot.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut ids: Vec<&str> = self.questions.iter().map(|q| q.id.as_str()).collect();
        ids.sort_unstable();
        ids.iter().map(|id| format!("{}:{id}", id.len())).collect()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, correct: &str) -> Question {
        let options = [("a", "first"), ("b", "second")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Question {
            id: QuestionId::new(id),
            text: format!("Question {id}"),
            options,
            correct_option: correct.to_string(),
            difficulty: Difficulty::Medium,
            marks: None,
        }
    }

    #[test]
    fn rejects_empty_set() {
        let err = QuestionSet::new(Vec::new()).unwrap_err();
        assert!(matches!(err, QuestionSetError::Empty));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = QuestionSet::new(vec![question("q1", "a"), question("q1", "b")]).unwrap_err();
        assert!(matches!(err, QuestionSetError::DuplicateId(_)));
    }

    #[test]
    fn rejects_unknown_correct_option() {
        let err = QuestionSet::new(vec![question("q1", "z")]).unwrap_err();
        assert!(matches!(
            err,
            QuestionSetError::UnknownCorrectOption { .. }
        ));
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let forward = QuestionSet::new(vec![question("q1", "a"), question("q2", "a")]).unwrap();
        let reversed = QuestionSet::new(vec![question("q2", "a"), question("q1", "a")]).unwrap();
        assert_eq!(forward.fingerprint(), reversed.fingerprint());
    }

    #[test]
    fn fingerprint_distinguishes_sets() {
        let one = QuestionSet::new(vec![question("q1", "a")]).unwrap();
        let other = QuestionSet::new(vec![question("q9", "a")]).unwrap();
        assert_ne!(one.fingerprint(), other.fingerprint());
    }

    #[test]
    fn fingerprint_distinguishes_sets_with_separator_ids() {
        // Ids are opaque external strings; one containing a separator must
        // not fold two sets onto the same slot.
        let joined = QuestionSet::new(vec![question("a:b", "a")]).unwrap();
        let split = QuestionSet::new(vec![question("a", "a"), question("b", "a")]).unwrap();
        assert_ne!(joined.fingerprint(), split.fingerprint());
    }

    #[test]
    fn index_of_finds_position() {
        let set = QuestionSet::new(vec![question("q1", "a"), question("q2", "b")]).unwrap();
        assert_eq!(set.index_of(&QuestionId::new("q2")), Some(1));
        assert_eq!(set.index_of(&QuestionId::new("missing")), None);
    }
}
