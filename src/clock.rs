//! Frame clock
//!
//! All timing logic (ability windows, invincibility, animation) reads the
//! millisecond [`GameClock`] rather than Bevy's `Time` directly. The clock is
//! advanced exactly once per frame by [`tick_game_clock`], either by a fixed
//! step (deterministic headless runs), by real elapsed time, or not at all
//! (tests drive it by hand).

use bevy::prelude::*;

/// Monotonic simulation time in milliseconds plus the delta of the current frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameClock {
    now_ms: u64,
    delta_ms: u64,
}

impl GameClock {
    /// A clock that already reads `now_ms`, with a zero delta.
    pub fn starting_at(now_ms: u64) -> Self {
        Self { now_ms, delta_ms: 0 }
    }

    /// Current simulation time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Milliseconds elapsed during the current frame
    pub fn delta_ms(&self) -> u64 {
        self.delta_ms
    }

    /// Move time forward by one frame of `delta_ms`.
    pub fn advance(&mut self, delta_ms: u64) {
        self.delta_ms = delta_ms;
        self.now_ms += delta_ms;
    }
}

/// How [`tick_game_clock`] advances the clock.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// Never advanced automatically
    Manual,
    /// Advanced by the same step every frame
    Fixed { step_ms: u64 },
    /// Advanced by Bevy's virtual time delta
    RealTime,
}

impl Default for ClockMode {
    fn default() -> Self {
        ClockMode::Fixed { step_ms: 16 }
    }
}

/// Advance the [`GameClock`] once per frame according to [`ClockMode`].
///
/// In real-time mode sub-millisecond remainders are carried over so the
/// clock never drifts behind wall time.
pub fn tick_game_clock(
    mode: Res<ClockMode>,
    time: Res<Time>,
    mut clock: ResMut<GameClock>,
    mut carry_ms: Local<f64>,
) {
    match *mode {
        ClockMode::Manual => {}
        ClockMode::Fixed { step_ms } => clock.advance(step_ms),
        ClockMode::RealTime => {
            let total = *carry_ms + time.delta_secs_f64() * 1000.0;
            let whole = total.floor();
            *carry_ms = total - whole;
            clock.advance(whole as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut clock = GameClock::default();
        clock.advance(16);
        clock.advance(17);
        assert_eq!(clock.now_ms(), 33);
        assert_eq!(clock.delta_ms(), 17);
    }

    #[test]
    fn test_starting_at_has_zero_delta() {
        let clock = GameClock::starting_at(1200);
        assert_eq!(clock.now_ms(), 1200);
        assert_eq!(clock.delta_ms(), 0);
    }
}
