//! Ambient audio playback
//!
//! Each therapy scene loops one ambient track while its player is open. The
//! device is abstracted behind [`AmbientPlayer`] so the therapy room can run
//! headless; a rodio-backed implementation is available with the `audio`
//! feature.

#[cfg(feature = "audio")]
mod rodio_backend;

#[cfg(feature = "audio")]
pub use rodio_backend::{fetch_audio, RodioAmbientPlayer, RodioToneSink};

use crate::error::WellnessError;

/// Looping ambient track player
pub trait AmbientPlayer {
    /// Start looping the track at `url` from the beginning.
    ///
    /// An error means playback was refused (device missing, platform policy,
    /// track unavailable); the caller shows a paused state.
    fn play(&mut self, url: &str) -> Result<(), WellnessError>;

    fn pause(&mut self);

    /// Continue the current track after [`AmbientPlayer::pause`]
    fn resume(&mut self) -> Result<(), WellnessError>;

    fn stop(&mut self);
}

/// Player with no output device. Always succeeds.
#[derive(Debug, Default)]
pub struct SilentPlayer {
    current: Option<String>,
    paused: bool,
}

impl SilentPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track currently loaded, if any
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl AmbientPlayer for SilentPlayer {
    fn play(&mut self, url: &str) -> Result<(), WellnessError> {
        self.current = Some(url.to_string());
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) -> Result<(), WellnessError> {
        if self.current.is_none() {
            return Err(WellnessError::Audio("nothing to resume".to_string()));
        }
        self.paused = false;
        Ok(())
    }

    fn stop(&mut self) {
        self.current = None;
        self.paused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_player_lifecycle() {
        let mut player = SilentPlayer::new();
        assert!(player.resume().is_err());

        player.play("https://example.test/rain.mp3").unwrap();
        assert_eq!(player.current(), Some("https://example.test/rain.mp3"));

        player.pause();
        assert!(player.is_paused());
        player.resume().unwrap();
        assert!(!player.is_paused());

        player.stop();
        assert_eq!(player.current(), None);
    }
}
