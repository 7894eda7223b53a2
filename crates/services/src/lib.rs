#![forbid(unsafe_code)]

pub mod bookmarks;
pub mod error;
pub mod persistence;
pub mod session;
pub mod submission;
pub mod ticker;
pub mod transaction;

pub use exam_core::Clock;

pub use bookmarks::BookmarkSink;
pub use error::{PersistenceError, SessionError, SubmissionError};
pub use persistence::PersistenceGateway;
pub use session::{ExitDialogView, SessionController, SessionIntent, SessionView, format_clock};
pub use submission::{SubmissionEngine, SubmitPhase};
pub use ticker::{SessionTicker, TICK_PERIOD};
pub use transaction::with_rollback;
