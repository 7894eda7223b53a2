use exam_core::model::{Question, QuestionStatus, SessionEntry, StatusCounts};
use exam_core::timer::TimerDisplay;

use crate::submission::SubmitPhase;

/// Exit dialog state as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitDialogView {
    /// Error from the last failed save-and-exit, if any.
    pub error: Option<String>,
}

/// Read model of the running session.
///
/// This is the only surface a presentation layer consumes; it is rebuilt on
/// every read and never retains references into the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub current_index: usize,
    pub question: Question,
    pub entry: SessionEntry,
    /// Status of every question, indexed like the question set, for the
    /// navigation palette.
    pub palette: Vec<QuestionStatus>,
    pub timer: TimerDisplay,
    pub is_paused: bool,
    pub submit_phase: SubmitPhase,
    pub exit_dialog: Option<ExitDialogView>,
    pub counts: StatusCounts,
}

/// Format whole seconds as `MM:SS`, growing to `H:MM:SS` past an hour.
#[must_use]
pub fn format_clock(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(29 * 60 + 59), "29:59");
    }

    #[test]
    fn clock_grows_past_an_hour() {
        assert_eq!(format_clock(3600), "1:00:00");
        assert_eq!(format_clock(2 * 3600 + 5 * 60 + 9), "2:05:09");
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        assert_eq!(format_clock(-3), "00:00");
    }
}
