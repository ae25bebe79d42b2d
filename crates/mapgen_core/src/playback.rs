//! Playback state for frame-driven generation.
//!
//! Controls play/pause and single steps for watching a map being generated.

use bevy::prelude::*;

/// Playback state for step-by-step generation.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlaybackState {
    /// Whether generation is currently playing (auto-advancing).
    pub playing: bool,
    /// Single steps requested while paused, consumed one per frame.
    pub pending_steps: usize,
    /// Whether the current run has completed.
    pub completed: bool,
}

impl PlaybackState {
    pub fn playing() -> Self {
        Self {
            playing: true,
            ..Default::default()
        }
    }

    /// Toggle between playing and paused.
    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Ask for one scheduler step while paused.
    pub fn request_step(&mut self) {
        self.pending_steps += 1;
    }

    /// Reset for a new run, keeping the play/pause choice.
    pub fn reset(&mut self) {
        self.pending_steps = 0;
        self.completed = false;
    }

    /// Mark the run done and stop auto-advancing.
    pub fn mark_completed(&mut self) {
        self.completed = true;
        self.playing = false;
        self.pending_steps = 0;
    }

    /// How many steps to take this frame.
    pub fn steps_this_frame(&mut self, steps_per_frame: usize) -> usize {
        if self.completed {
            return 0;
        }
        if self.playing {
            return steps_per_frame.max(1);
        }
        if self.pending_steps > 0 {
            self.pending_steps -= 1;
            return 1;
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playing_uses_steps_per_frame() {
        let mut playback = PlaybackState::playing();
        assert_eq!(playback.steps_this_frame(4), 4);
        assert_eq!(playback.steps_this_frame(0), 1);
    }

    #[test]
    fn test_paused_consumes_requested_steps() {
        let mut playback = PlaybackState::default();
        assert_eq!(playback.steps_this_frame(8), 0);
        playback.request_step();
        playback.request_step();
        assert_eq!(playback.steps_this_frame(8), 1);
        assert_eq!(playback.steps_this_frame(8), 1);
        assert_eq!(playback.steps_this_frame(8), 0);
    }

    #[test]
    fn test_completed_stops_everything() {
        let mut playback = PlaybackState::playing();
        playback.request_step();
        playback.mark_completed();
        assert!(!playback.playing);
        assert_eq!(playback.steps_this_frame(3), 0);

        playback.reset();
        playback.play();
        assert_eq!(playback.steps_this_frame(3), 3);
    }
}
