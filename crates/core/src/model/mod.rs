mod config;
mod entry;
mod ids;
mod question;
mod snapshot;
mod status;

pub use config::{SessionConfig, SessionMode};
pub use entry::{SessionEntry, StatusCounts};
pub use ids::{AttemptId, ParseIdError, QuestionId, SavedSessionId};
pub use question::{Difficulty, MarkScheme, Question, QuestionSet, QuestionSetError};
pub use snapshot::{EphemeralSnapshot, RestoreSource, SavedSession, TimerSnapshot};
pub use status::QuestionStatus;
