use serde::{Deserialize, Serialize};

use crate::model::status::QuestionStatus;

/// Mutable per-question session state, index-aligned with the question set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub status: QuestionStatus,
    pub user_answer: Option<String>,
    pub is_bookmarked: bool,
}

impl SessionEntry {
    /// Entry for a question that has never been shown.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            status: QuestionStatus::NotVisited,
            user_answer: None,
            is_bookmarked: false,
        }
    }

    /// Whether this entry counts toward scoring: committed as answered, or
    /// marked for review with an answer present.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        match self.status {
            QuestionStatus::Answered => true,
            QuestionStatus::MarkedForReview => self.user_answer.is_some(),
            QuestionStatus::NotVisited | QuestionStatus::Unanswered => false,
        }
    }
}

impl Default for SessionEntry {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Status tally used by palette legends and the submit confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub not_visited: usize,
    pub unanswered: usize,
    pub answered: usize,
    pub marked_for_review: usize,
    /// Derived compound state: marked for review AND holding an answer.
    pub marked_and_answered: usize,
    pub bookmarked: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn tally(entries: &[SessionEntry]) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry.status {
                QuestionStatus::NotVisited => counts.not_visited += 1,
                QuestionStatus::Unanswered => counts.unanswered += 1,
                QuestionStatus::Answered => counts.answered += 1,
                QuestionStatus::MarkedForReview => {
                    counts.marked_for_review += 1;
                    if entry.user_answer.is_some() {
                        counts.marked_and_answered += 1;
                    }
                }
            }
            if entry.is_bookmarked {
                counts.bookmarked += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: QuestionStatus, answer: Option<&str>) -> SessionEntry {
        SessionEntry {
            status,
            user_answer: answer.map(str::to_string),
            is_bookmarked: false,
        }
    }

    #[test]
    fn fresh_entry_is_not_evaluated() {
        assert!(!SessionEntry::fresh().is_evaluated());
    }

    #[test]
    fn marked_counts_only_with_answer() {
        assert!(!entry(QuestionStatus::MarkedForReview, None).is_evaluated());
        assert!(entry(QuestionStatus::MarkedForReview, Some("a")).is_evaluated());
        assert!(entry(QuestionStatus::Answered, Some("a")).is_evaluated());
        assert!(!entry(QuestionStatus::Unanswered, Some("a")).is_evaluated());
    }

    #[test]
    fn tally_tracks_compound_marked_state() {
        let mut bookmarked = entry(QuestionStatus::Answered, Some("a"));
        bookmarked.is_bookmarked = true;
        let entries = vec![
            bookmarked,
            entry(QuestionStatus::MarkedForReview, Some("b")),
            entry(QuestionStatus::MarkedForReview, None),
            entry(QuestionStatus::Unanswered, None),
            entry(QuestionStatus::NotVisited, None),
        ];

        let counts = StatusCounts::tally(&entries);
        assert_eq!(counts.answered, 1);
        assert_eq!(counts.marked_for_review, 2);
        assert_eq!(counts.marked_and_answered, 1);
        assert_eq!(counts.unanswered, 1);
        assert_eq!(counts.not_visited, 1);
        assert_eq!(counts.bookmarked, 1);
    }
}
