use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::model::{SessionMode, TimerSnapshot};

//
// ─── DISPLAY ───────────────────────────────────────────────────────────────────
//

/// Whole-second values ready for the clock faces.
///
/// `main_seconds` is remaining time in countdown mode and elapsed time in
/// stopwatch mode; `question_seconds` is always elapsed time on the active
/// question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerDisplay {
    pub main_seconds: i64,
    pub question_seconds: i64,
    pub is_countdown: bool,
    pub is_paused: bool,
}

//
// ─── TIMER ENGINE ──────────────────────────────────────────────────────────────
//

/// Dual-clock engine: one session-level clock and one per-question clock,
/// both derived from the same running window.
///
/// The engine holds no ticking process of its own; every operation takes the
/// caller's `now`, and elapsed values are recomputed from timestamp deltas on
/// each read. Skipped ticks therefore never lose time.
///
/// Pause freezes both clocks atomically: accumulated milliseconds are
/// committed and the running window closes until `resume`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerEngine {
    mode: SessionMode,
    /// Open running window; `None` while paused.
    running_since: Option<DateTime<Utc>>,
    /// Committed main-clock milliseconds (excludes the open window).
    main_ms: i64,
    /// Committed per-question milliseconds (excludes the open window).
    question_ms: BTreeMap<usize, i64>,
    active_index: usize,
    time_up_fired: bool,
    /// Countdown displays round up on the very first frame only.
    first_frame: bool,
}

impl TimerEngine {
    /// Start both clocks at zero against the given active question.
    #[must_use]
    pub fn start(mode: SessionMode, active_index: usize, now: DateTime<Utc>) -> Self {
        Self {
            mode,
            running_since: Some(now),
            main_ms: 0,
            question_ms: BTreeMap::new(),
            active_index,
            time_up_fired: false,
            first_frame: true,
        }
    }

    /// Seed both clocks from a snapshot (durable resume); they continue
    /// accruing from the seeded baseline.
    #[must_use]
    pub fn restore(
        snapshot: TimerSnapshot,
        mode: SessionMode,
        active_index: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            mode,
            running_since: Some(now),
            main_ms: snapshot.main_elapsed_ms,
            question_ms: snapshot.per_question_elapsed_ms,
            active_index,
            time_up_fired: false,
            first_frame: true,
        }
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.running_since.is_none()
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Milliseconds of the open running window as of `now`.
    fn open_window_ms(&self, now: DateTime<Utc>) -> i64 {
        match self.running_since {
            // Clamp: a clock stepping backwards must not produce negative time.
            Some(since) => (now - since).num_milliseconds().max(0),
            None => 0,
        }
    }

    /// Commit the open window into both accumulators and reopen it at `now`.
    fn commit(&mut self, now: DateTime<Utc>) {
        let delta = self.open_window_ms(now);
        if delta > 0 {
            self.main_ms += delta;
            *self.question_ms.entry(self.active_index).or_insert(0) += delta;
        }
        if self.running_since.is_some() {
            self.running_since = Some(now);
        }
    }

    /// Total elapsed session time in milliseconds.
    #[must_use]
    pub fn main_elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        self.main_ms + self.open_window_ms(now)
    }

    /// Total elapsed session time, alias used by persistence and submission.
    #[must_use]
    pub fn total_session_time_ms(&self, now: DateTime<Utc>) -> i64 {
        self.main_elapsed_ms(now)
    }

    /// Per-question elapsed milliseconds including the open window of the
    /// active question.
    #[must_use]
    pub fn question_time_map(&self, now: DateTime<Utc>) -> BTreeMap<usize, i64> {
        let mut map = self.question_ms.clone();
        let delta = self.open_window_ms(now);
        if delta > 0 {
            *map.entry(self.active_index).or_insert(0) += delta;
        }
        map
    }

    /// Freeze both clocks into a snapshot for persistence.
    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        TimerSnapshot {
            main_elapsed_ms: self.main_elapsed_ms(now),
            per_question_elapsed_ms: self.question_time_map(now),
        }
    }

    /// Remaining main-timer milliseconds; `None` in stopwatch mode.
    #[must_use]
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> Option<i64> {
        let limit = self.mode.time_limit_ms()?;
        Some((limit - self.main_elapsed_ms(now)).max(0))
    }

    /// Freeze accumulated time for the outgoing question and start accruing
    /// against `new_index`.
    pub fn switch_active_question(&mut self, new_index: usize, now: DateTime<Utc>) {
        self.commit(now);
        self.active_index = new_index;
    }

    /// Freeze both clocks atomically. Idempotent.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.running_since.is_some() {
            self.commit(now);
            self.running_since = None;
        }
    }

    /// Reopen the running window. Idempotent.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// True exactly once, when countdown remaining time reaches zero.
    ///
    /// Suppressed while paused; latched after firing so later ticks never
    /// re-fire for the same session.
    pub fn poll_time_up(&mut self, now: DateTime<Utc>) -> bool {
        if self.time_up_fired || self.is_paused() {
            return false;
        }
        match self.remaining_ms(now) {
            Some(0) => {
                self.time_up_fired = true;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn time_up_fired(&self) -> bool {
        self.time_up_fired
    }

    /// Displayable whole-second values.
    ///
    /// Countdown remaining time uses ceiling-rounding on the very first frame
    /// so a 30-minute budget reads 30:00 rather than 29:59 right after start;
    /// every later frame floors. Stopwatch and per-question values always
    /// floor.
    pub fn display(&mut self, now: DateTime<Utc>) -> TimerDisplay {
        let first = self.first_frame;
        self.first_frame = false;

        let question_ms = self
            .question_time_map(now)
            .get(&self.active_index)
            .copied()
            .unwrap_or(0);

        let (main_seconds, is_countdown) = match self.remaining_ms(now) {
            Some(remaining) => {
                let seconds = if first {
                    div_ceil_ms(remaining)
                } else {
                    remaining / 1000
                };
                (seconds, true)
            }
            None => (self.main_elapsed_ms(now) / 1000, false),
        };

        TimerDisplay {
            main_seconds,
            question_seconds: question_ms / 1000,
            is_countdown,
            is_paused: self.is_paused(),
        }
    }
}

fn div_ceil_ms(ms: i64) -> i64 {
    (ms + 999) / 1000
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
