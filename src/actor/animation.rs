//! Sprite-sheet animation bookkeeping
//!
//! The core decides *which* frames play and how fast; blitting them is the
//! renderer's job.

use bevy::prelude::*;

/// Selects a run of frames on a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationCycle {
    /// First frame of the cycle (1-based, matching the sheet layout)
    pub start_frame: u16,
    pub frame_count: u16,
    /// Milliseconds each frame stays on screen
    pub frame_delay_ms: u64,
}

impl AnimationCycle {
    pub const fn new(start_frame: u16, frame_count: u16, frame_delay_ms: u64) -> Self {
        Self {
            start_frame,
            frame_count,
            frame_delay_ms,
        }
    }
}

/// Plays an [`AnimationCycle`] forward in time.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct AnimationPlayer {
    cycle: AnimationCycle,
    frame_offset: u16,
    elapsed_ms: u64,
}

impl AnimationPlayer {
    pub fn new(cycle: AnimationCycle) -> Self {
        Self {
            cycle,
            frame_offset: 0,
            elapsed_ms: 0,
        }
    }

    pub fn cycle(&self) -> AnimationCycle {
        self.cycle
    }

    /// Sheet frame currently shown
    pub fn current_frame(&self) -> u16 {
        self.cycle.start_frame + self.frame_offset
    }

    /// Switch to a new cycle, restarting from its first frame.
    pub fn set_cycle(&mut self, cycle: AnimationCycle) {
        self.cycle = cycle;
        self.frame_offset = 0;
        self.elapsed_ms = 0;
    }

    pub fn advance(&mut self, delta_ms: u64) {
        if self.cycle.frame_count <= 1 || self.cycle.frame_delay_ms == 0 {
            return;
        }
        self.elapsed_ms += delta_ms;
        let steps = self.elapsed_ms / self.cycle.frame_delay_ms;
        self.elapsed_ms %= self.cycle.frame_delay_ms;
        let count = u64::from(self.cycle.frame_count);
        self.frame_offset = ((u64::from(self.frame_offset) + steps) % count) as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_inside_cycle() {
        let mut player = AnimationPlayer::new(AnimationCycle::new(5, 3, 100));
        assert_eq!(player.current_frame(), 5);
        player.advance(250);
        assert_eq!(player.current_frame(), 7);
        player.advance(60);
        assert_eq!(player.current_frame(), 5);
    }

    #[test]
    fn test_single_frame_cycle_never_moves() {
        let mut player = AnimationPlayer::new(AnimationCycle::new(4, 1, 100));
        player.advance(10_000);
        assert_eq!(player.current_frame(), 4);
    }

    #[test]
    fn test_set_cycle_restarts() {
        let mut player = AnimationPlayer::new(AnimationCycle::new(1, 3, 50));
        player.advance(120);
        player.set_cycle(AnimationCycle::new(5, 3, 50));
        assert_eq!(player.current_frame(), 5);
    }
}
