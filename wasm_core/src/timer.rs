//! Tick-driven timer state for the countdown, stopwatch and pomodoro tools.
//!
//! The host owns the `setInterval` and feeds the elapsed milliseconds of each
//! tick in; these types only do the bookkeeping.
use serde::Serialize;

use crate::error::{Result, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub remaining_ms: u64,
    pub display: String,
}

/// `mm:ss`, or `h:mm:ss` from one hour up.
pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms.div_ceil(1000);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[derive(Debug, Clone)]
pub struct Countdown {
    duration_ms: u64,
    remaining_ms: u64,
    state: TimerState,
}

impl Countdown {
    pub fn new(duration_ms: u64) -> Result<Self> {
        if duration_ms == 0 {
            return Err(ToolError::invalid("duration must be greater than zero"));
        }
        Ok(Self {
            duration_ms,
            remaining_ms: duration_ms,
            state: TimerState::Idle,
        })
    }

    pub fn start(&mut self) {
        if matches!(self.state, TimerState::Idle | TimerState::Paused) {
            self.state = TimerState::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    pub fn reset(&mut self) {
        self.remaining_ms = self.duration_ms;
        self.state = TimerState::Idle;
    }

    /// Advances by `elapsed_ms`. Returns `true` on the tick that finishes.
    pub fn tick(&mut self, elapsed_ms: u64) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        if self.remaining_ms == 0 {
            self.state = TimerState::Finished;
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            remaining_ms: self.remaining_ms,
            display: format_duration(self.remaining_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lap {
    pub number: usize,
    pub lap_ms: u64,
    pub total_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Stopwatch {
    elapsed_ms: u64,
    running: bool,
    laps: Vec<Lap>,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            elapsed_ms: 0,
            running: false,
            laps: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
        self.running = false;
        self.laps.clear();
    }

    pub fn tick(&mut self, elapsed_ms: u64) {
        if self.running {
            self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        }
    }

    pub fn lap(&mut self) -> Option<&Lap> {
        if !self.running {
            return None;
        }
        let previous = self.laps.last().map_or(0, |lap| lap.total_ms);
        self.laps.push(Lap {
            number: self.laps.len() + 1,
            lap_ms: self.elapsed_ms - previous,
            total_ms: self.elapsed_ms,
        });
        self.laps.last()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PomodoroPhase {
    Work,
    ShortBreak,
    LongBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSettings {
    pub work_ms: u64,
    pub short_break_ms: u64,
    pub long_break_ms: u64,
    /// A long break replaces the short one after this many work sessions.
    pub sessions_before_long_break: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        const MINUTE: u64 = 60_000;
        Self {
            work_ms: 25 * MINUTE,
            short_break_ms: 5 * MINUTE,
            long_break_ms: 15 * MINUTE,
            sessions_before_long_break: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pomodoro {
    settings: PomodoroSettings,
    phase: PomodoroPhase,
    completed_sessions: u32,
    countdown: Countdown,
}

impl Pomodoro {
    pub fn new(settings: PomodoroSettings) -> Result<Self> {
        if settings.sessions_before_long_break == 0 {
            return Err(ToolError::invalid(
                "sessions before a long break must be at least 1",
            ));
        }
        let countdown = Countdown::new(settings.work_ms)?;
        // Validate the break durations up front.
        Countdown::new(settings.short_break_ms)?;
        Countdown::new(settings.long_break_ms)?;
        Ok(Self {
            settings,
            phase: PomodoroPhase::Work,
            completed_sessions: 0,
            countdown,
        })
    }

    pub fn start(&mut self) {
        self.countdown.start();
    }

    pub fn pause(&mut self) {
        self.countdown.pause();
    }

    /// Advances the current phase. When it runs out the next phase is loaded
    /// and started; the new phase is returned.
    pub fn tick(&mut self, elapsed_ms: u64) -> Option<PomodoroPhase> {
        if !self.countdown.tick(elapsed_ms) {
            return None;
        }
        Some(self.advance())
    }

    /// Ends the current phase early.
    pub fn skip(&mut self) -> PomodoroPhase {
        self.advance()
    }

    fn advance(&mut self) -> PomodoroPhase {
        let next = match self.phase {
            PomodoroPhase::Work => {
                self.completed_sessions += 1;
                if self.completed_sessions % self.settings.sessions_before_long_break == 0 {
                    PomodoroPhase::LongBreak
                } else {
                    PomodoroPhase::ShortBreak
                }
            }
            PomodoroPhase::ShortBreak | PomodoroPhase::LongBreak => PomodoroPhase::Work,
        };
        let duration = match next {
            PomodoroPhase::Work => self.settings.work_ms,
            PomodoroPhase::ShortBreak => self.settings.short_break_ms,
            PomodoroPhase::LongBreak => self.settings.long_break_ms,
        };
        self.phase = next;
        self.countdown = Countdown {
            duration_ms: duration,
            remaining_ms: duration,
            state: TimerState::Running,
        };
        next
    }

    pub fn phase(&self) -> PomodoroPhase {
        self.phase
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.countdown.snapshot()
    }
}
