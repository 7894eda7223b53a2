#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod scoring;
pub mod store;
pub mod time;
pub mod timer;

pub use error::Error;
pub use time::Clock;

pub use scoring::{Outcome, QuestionResult, ScoringError, SessionType, SubmissionRecord};
pub use store::{Advance, SessionStateStore, StoreError};
pub use timer::{TimerDisplay, TimerEngine};
