//! Redraw scheduling for interactive mode.
//!
//! While the face is visible and interactive, a wake is kept armed at the
//! next whole-second boundary. Every fired wake re-arms relative to the
//! time it actually fired, so wakes stay aligned to the second instead of
//! drifting by the handling latency.

use log::debug;

/// Redraw period while interactive
pub const INTERACTIVE_UPDATE_RATE_MS: u64 = 1000;

/// Period of the host time tick while ambient
pub const AMBIENT_UPDATE_RATE_MS: u64 = 60 * 1000;

/// Milliseconds from `now_ms` until the next multiple of `interval_ms`.
///
/// A time already on a boundary waits a full interval.
pub fn next_boundary(now_ms: u64, interval_ms: u64) -> u64 {
    interval_ms - (now_ms % interval_ms)
}

/// Armed state of the redraw timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Armed { wake_at: u64 },
}

/// Observable scheduling inputs and outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub visible: bool,
    pub ambient: bool,
    pub pending_wake_at: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RedrawScheduler {
    visible: bool,
    ambient: bool,
    timer: TimerState,
    interval_ms: u64,
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new(INTERACTIVE_UPDATE_RATE_MS)
    }
}

impl RedrawScheduler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            visible: false,
            ambient: false,
            timer: TimerState::Idle,
            interval_ms: interval_ms.max(1),
        }
    }

    /// Periodic redraws only run while visible and interactive
    pub fn should_run(&self) -> bool {
        self.visible && !self.ambient
    }

    /// Apply new visibility/ambient inputs.
    ///
    /// Arms an immediate wake if the timer should run and is idle, and
    /// cancels a pending wake if it should not. An already armed wake is
    /// left untouched.
    pub fn recompute(&mut self, visible: bool, ambient: bool, now_ms: u64) -> TimerState {
        self.visible = visible;
        self.ambient = ambient;
        match (self.should_run(), self.timer) {
            (true, TimerState::Idle) => {
                self.timer = TimerState::Armed { wake_at: now_ms };
                debug!("redraw timer armed at {now_ms}");
            },
            (false, TimerState::Armed { .. }) => {
                self.timer = TimerState::Idle;
                debug!("redraw timer cancelled");
            },
            _ => {},
        }
        self.timer
    }

    /// Handle a fired wake.
    ///
    /// Returns the next wake instant if the timer re-armed. A fire while
    /// idle is spurious and returns `None`.
    pub fn fire(&mut self, now_ms: u64) -> Option<u64> {
        if self.timer == TimerState::Idle {
            return None;
        }
        self.timer = TimerState::Idle;
        if !self.should_run() {
            return None;
        }
        let wake_at = now_ms + next_boundary(now_ms, self.interval_ms);
        self.timer = TimerState::Armed { wake_at };
        Some(wake_at)
    }

    /// Drop any pending wake unconditionally
    pub fn cancel(&mut self) {
        self.timer = TimerState::Idle;
    }

    pub fn timer(&self) -> TimerState {
        self.timer
    }

    pub fn pending_wake_at(&self) -> Option<u64> {
        match self.timer {
            TimerState::Armed { wake_at } => Some(wake_at),
            TimerState::Idle => None,
        }
    }

    pub fn state(&self) -> ScheduleState {
        ScheduleState {
            visible: self.visible,
            ambient: self.ambient,
            pending_wake_at: self.pending_wake_at(),
        }
    }
}
