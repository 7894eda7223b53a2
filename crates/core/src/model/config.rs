use serde::{Deserialize, Serialize};

use crate::model::question::MarkScheme;

/// Timing mode fixed at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionMode {
    /// Untimed practice; the main timer counts up with no limit.
    Practice,
    /// Graded test with a fixed budget; the main timer counts down and the
    /// session auto-submits at zero.
    Timed { time_limit_minutes: u32 },
}

impl SessionMode {
    #[must_use]
    pub fn is_timed(&self) -> bool {
        matches!(self, Self::Timed { .. })
    }

    /// Time budget in milliseconds, `None` for practice mode.
    #[must_use]
    pub fn time_limit_ms(&self) -> Option<i64> {
        match self {
            Self::Practice => None,
            Self::Timed { time_limit_minutes } => {
                Some(i64::from(*time_limit_minutes) * 60 * 1000)
            }
        }
    }
}

/// Session-level configuration supplied at start and carried through saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: SessionMode,
    /// Default marking for weighted tests; a question-level override wins.
    /// `None` together with no per-question overrides means unweighted
    /// percentage scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_marks: Option<MarkScheme>,
    /// Reference to the mock test this session belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_test_id: Option<String>,
}

impl SessionConfig {
    /// Untimed practice configuration.
    #[must_use]
    pub fn practice() -> Self {
        Self {
            mode: SessionMode::Practice,
            default_marks: None,
            mock_test_id: None,
        }
    }

    /// Timed configuration with the given budget in minutes.
    #[must_use]
    pub fn timed(time_limit_minutes: u32) -> Self {
        Self {
            mode: SessionMode::Timed { time_limit_minutes },
            default_marks: None,
            mock_test_id: None,
        }
    }
}
