/// Every way the outside world can mutate a running session.
///
/// All intents funnel through `SessionController::dispatch`, which serializes
/// mutation: there is no other write path into the store or the timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIntent {
    /// Provisionally select an answer option for the current question.
    SelectAnswer { option: String },
    /// Clear the current question's answer.
    ClearAnswer,
    /// Commit the current answer state and move to the next question.
    SaveAndNext,
    /// Flag the current question for review and move on.
    MarkAndNext,
    /// Jump directly to a question from the palette.
    Navigate { index: usize },
    /// Flip the bookmark flag on the current question.
    ToggleBookmark,
    Pause,
    Resume,
    OpenExitDialog,
    CancelExit,
    /// Persist the full session under `name` and leave.
    SaveAndExit { name: String },
    /// Open the submit confirmation dialog.
    RequestSubmit,
    /// Confirm and perform the manual submission.
    ConfirmSubmit,
    CancelSubmit,
    /// Periodic timer tick; drives the time-up check.
    Tick,
}
