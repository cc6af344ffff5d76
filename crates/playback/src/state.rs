//! Streaming / playback state machine.
//!
//! Pure flag logic with no I/O, in the same spirit as the rest of the
//! playback crate: the session decides what to reset and what to post based
//! on the transitions reported here.
//!
//! ```text
//!            start_streaming             fill ≥ target
//!   Idle ──────────────────────▶ Buffering ───────────▶ Playing
//!    ▲                              │  ▲                   │
//!    │        stop_streaming        │  └───────────────────┤ release_playback
//!    └──────────────────────────────┴──────────────────────┘ stop_streaming
//! ```
//!
//! Playback is a one-way latch per session: once Playing, the fill level is
//! no longer checked.

/// Observable state, derived from the two mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    /// USB is not streaming and I2S is stopped.
    #[default]
    Idle,
    /// USB is streaming, waiting for the target fill level.
    Buffering,
    /// USB is streaming and I2S is consuming.
    Playing,
}

impl PlaybackState {
    /// Short label for status output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Buffering => "buffering",
            Self::Playing => "playing",
        }
    }
}

/// The two mode flags and their allowed transitions.
///
/// `playback_enabled` is never true while `streaming_enabled` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackStateMachine {
    streaming_enabled: bool,
    playback_enabled: bool,
}

impl PlaybackStateMachine {
    /// Idle machine.
    pub const fn new() -> Self {
        Self {
            streaming_enabled: false,
            playback_enabled: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        match (self.streaming_enabled, self.playback_enabled) {
            (true, true) => PlaybackState::Playing,
            (true, false) => PlaybackState::Buffering,
            (false, _) => PlaybackState::Idle,
        }
    }

    /// USB side is receiving.
    pub fn is_streaming_enabled(&self) -> bool {
        self.streaming_enabled
    }

    /// I2S side is consuming.
    pub fn is_playback_enabled(&self) -> bool {
        self.playback_enabled
    }

    /// Idle → Buffering. Returns `false` (no change) if already streaming.
    pub fn start_streaming(&mut self) -> bool {
        if self.streaming_enabled {
            return false;
        }
        self.streaming_enabled = true;
        true
    }

    /// Buffering → Playing once `fill_size` reaches `target_fill_size`.
    ///
    /// Returns `true` only on the transition itself.
    pub fn try_latch_playback(&mut self, fill_size: usize, target_fill_size: usize) -> bool {
        if !self.streaming_enabled || self.playback_enabled || fill_size < target_fill_size {
            return false;
        }
        self.playback_enabled = true;
        true
    }

    /// Playing → Buffering. Returns `false` if playback was not enabled.
    pub fn release_playback(&mut self) -> bool {
        if !self.playback_enabled {
            return false;
        }
        self.playback_enabled = false;
        true
    }

    /// Buffering → Idle. Returns `false` if not streaming.
    ///
    /// Playback must already have been released; the flag is cleared here
    /// as well so the pair can never be left inconsistent.
    pub fn stop_streaming(&mut self) -> bool {
        if !self.streaming_enabled {
            return false;
        }
        self.playback_enabled = false;
        self.streaming_enabled = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let sm = PlaybackStateMachine::new();
        assert_eq!(sm.state(), PlaybackState::Idle);
        assert!(!sm.is_streaming_enabled());
        assert!(!sm.is_playback_enabled());
    }

    #[test]
    fn start_streaming_is_idempotent() {
        let mut sm = PlaybackStateMachine::new();
        assert!(sm.start_streaming());
        assert!(!sm.start_streaming());
        assert_eq!(sm.state(), PlaybackState::Buffering);
    }

    #[test]
    fn latch_requires_target_and_streaming() {
        let mut sm = PlaybackStateMachine::new();
        assert!(!sm.try_latch_playback(1000, 864), "idle must not latch");

        sm.start_streaming();
        assert!(!sm.try_latch_playback(768, 864));
        assert!(sm.try_latch_playback(960, 864));
        assert_eq!(sm.state(), PlaybackState::Playing);
    }

    #[test]
    fn latch_fires_once_and_holds_below_target() {
        let mut sm = PlaybackStateMachine::new();
        sm.start_streaming();
        assert!(sm.try_latch_playback(864, 864));
        assert!(!sm.try_latch_playback(2000, 864));
        assert!(!sm.try_latch_playback(0, 864));
        assert!(sm.is_playback_enabled());
    }

    #[test]
    fn start_streaming_while_playing_keeps_latch() {
        let mut sm = PlaybackStateMachine::new();
        sm.start_streaming();
        sm.try_latch_playback(900, 864);
        assert!(!sm.start_streaming());
        assert_eq!(sm.state(), PlaybackState::Playing);
    }

    #[test]
    fn release_returns_to_buffering() {
        let mut sm = PlaybackStateMachine::new();
        assert!(!sm.release_playback());
        sm.start_streaming();
        sm.try_latch_playback(900, 864);
        assert!(sm.release_playback());
        assert_eq!(sm.state(), PlaybackState::Buffering);
    }

    #[test]
    fn stop_streaming_collapses_to_idle() {
        let mut sm = PlaybackStateMachine::new();
        assert!(!sm.stop_streaming());
        sm.start_streaming();
        sm.try_latch_playback(900, 864);
        assert!(sm.stop_streaming());
        assert_eq!(sm.state(), PlaybackState::Idle);
        assert!(!sm.is_playback_enabled());
    }

    #[test]
    fn state_labels() {
        assert_eq!(PlaybackState::Idle.as_str(), "idle");
        assert_eq!(PlaybackState::Buffering.as_str(), "buffering");
        assert_eq!(PlaybackState::Playing.as_str(), "playing");
    }
}
