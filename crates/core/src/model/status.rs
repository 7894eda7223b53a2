use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-question status as tracked by the session palette.
///
/// "Marked for review with an answer" is a derived compound state (it counts
/// toward scoring), not a fifth variant; see `SessionEntry::is_evaluated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    NotVisited,
    Unanswered,
    Answered,
    MarkedForReview,
}

impl QuestionStatus {
    /// True for statuses produced by an explicit Save/Mark commitment.
    ///
    /// Only committed answers survive direct (palette) navigation.
    #[must_use]
    pub fn is_committed(self) -> bool {
        matches!(self, Self::Answered | Self::MarkedForReview)
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotVisited => "not_visited",
            Self::Unanswered => "unanswered",
            Self::Answered => "answered",
            Self::MarkedForReview => "marked_for_review",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_display() {
        for status in [
            QuestionStatus::NotVisited,
            QuestionStatus::Unanswered,
            QuestionStatus::Answered,
            QuestionStatus::MarkedForReview,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn only_save_and_mark_statuses_are_committed() {
        assert!(QuestionStatus::Answered.is_committed());
        assert!(QuestionStatus::MarkedForReview.is_committed());
        assert!(!QuestionStatus::NotVisited.is_committed());
        assert!(!QuestionStatus::Unanswered.is_committed());
    }
}
