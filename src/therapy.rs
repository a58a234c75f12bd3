//! Therapy room state machine
//!
//! The room starts on the category picker, or directly in a scene's player
//! when an auto-start scene id is handed over from a finished assessment.
//! While the player is open the scene's ambient track loops; leaving the
//! player always stops it.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::AmbientPlayer;
use crate::catalog::{find_scene, scene};
use crate::error::WellnessError;
use crate::game::BubbleGame;
use crate::tone::LazyToneContext;
use crate::types::{SceneId, TherapyScene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TherapyMode {
    CategorySelect,
    VideoList,
    VideoPlayer(SceneId),
    GameMode,
}

type ToneFactory = Box<dyn Fn() -> LazyToneContext>;

pub struct TherapyRoom {
    mode: TherapyMode,
    player: Box<dyn AmbientPlayer>,
    audio_playing: bool,
    /// A track was started in the current player visit
    track_loaded: bool,
    game: Option<BubbleGame>,
    make_tone: ToneFactory,
}

impl TherapyRoom {
    /// Open the room.
    ///
    /// A recognised `auto_start` id opens that scene's player immediately and
    /// calls `on_consumed` once so the caller can clear the request. Unknown
    /// ids are ignored.
    pub fn new<F>(player: Box<dyn AmbientPlayer>, auto_start: Option<&str>, on_consumed: F) -> Self
    where
        F: FnOnce(),
    {
        let mut room = Self {
            mode: TherapyMode::CategorySelect,
            player,
            audio_playing: false,
            track_loaded: false,
            game: None,
            make_tone: Box::new(LazyToneContext::silent),
        };

        match auto_start.map(|id| (id, find_scene(id))) {
            Some((_, Some(found))) => {
                tracing::debug!(scene = %found.id, "therapy auto-start");
                room.enter_player(found.id);
                on_consumed();
            }
            Some((id, None)) => {
                tracing::debug!(scene = id, "ignoring unknown auto-start scene");
            }
            None => {}
        }

        room
    }

    /// Use `factory` to build the pop tone output for each new game
    pub fn with_tone<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> LazyToneContext + 'static,
    {
        self.make_tone = Box::new(factory);
        self
    }

    pub fn mode(&self) -> TherapyMode {
        self.mode
    }

    pub fn audio_playing(&self) -> bool {
        self.audio_playing
    }

    /// Scene shown in the player, if open
    pub fn current_scene(&self) -> Option<&'static TherapyScene> {
        match self.mode {
            TherapyMode::VideoPlayer(id) => Some(scene(id)),
            _ => None,
        }
    }

    pub fn game(&self) -> Option<&BubbleGame> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut BubbleGame> {
        self.game.as_mut()
    }

    /// Category picker to scene list
    pub fn open_scenes(&mut self) -> Result<TherapyMode, WellnessError> {
        self.expect_mode(TherapyMode::CategorySelect, "open scenes")?;
        self.mode = TherapyMode::VideoList;
        Ok(self.mode)
    }

    /// Category picker to the bubble game
    pub fn open_game(&mut self) -> Result<TherapyMode, WellnessError> {
        self.expect_mode(TherapyMode::CategorySelect, "open game")?;
        let tone = (self.make_tone)();
        self.game = Some(BubbleGame::new(StdRng::from_entropy(), tone));
        self.mode = TherapyMode::GameMode;
        Ok(self.mode)
    }

    /// Scene list to a scene's player
    pub fn choose_scene(&mut self, id: SceneId) -> Result<TherapyMode, WellnessError> {
        self.expect_mode(TherapyMode::VideoList, "choose a scene")?;
        self.enter_player(id);
        Ok(self.mode)
    }

    /// Step back one level. Does nothing on the category picker.
    pub fn back(&mut self) -> TherapyMode {
        self.mode = match self.mode {
            TherapyMode::VideoPlayer(_) => {
                self.leave_player();
                TherapyMode::VideoList
            }
            TherapyMode::VideoList | TherapyMode::CategorySelect => TherapyMode::CategorySelect,
            TherapyMode::GameMode => {
                self.game = None;
                TherapyMode::CategorySelect
            }
        };
        self.mode
    }

    /// Pause or resume the ambient track. Returns whether audio now plays.
    pub fn toggle_audio(&mut self) -> Result<bool, WellnessError> {
        let Some(current) = self.current_scene() else {
            return Err(WellnessError::InvalidState(
                "no scene is playing".to_string(),
            ));
        };

        if self.audio_playing {
            self.player.pause();
            self.audio_playing = false;
        } else {
            let started = if self.track_loaded {
                self.player.resume()
            } else {
                self.player.play(current.audio_url)
            };
            match started {
                Ok(()) => {
                    self.track_loaded = true;
                    self.audio_playing = true;
                }
                Err(e) => tracing::warn!(scene = %current.id, error = %e, "audio playback refused"),
            }
        }
        Ok(self.audio_playing)
    }

    fn enter_player(&mut self, id: SceneId) {
        let target = scene(id);
        self.mode = TherapyMode::VideoPlayer(id);
        match self.player.play(target.audio_url) {
            Ok(()) => {
                self.track_loaded = true;
                self.audio_playing = true;
            }
            Err(e) => {
                tracing::warn!(scene = %id, error = %e, "audio playback refused");
                self.track_loaded = false;
                self.audio_playing = false;
            }
        }
    }

    fn leave_player(&mut self) {
        self.player.stop();
        self.audio_playing = false;
        self.track_loaded = false;
    }

    fn expect_mode(&self, expected: TherapyMode, action: &str) -> Result<(), WellnessError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(WellnessError::InvalidState(format!(
                "cannot {} from {:?}",
                action, self.mode
            )))
        }
    }
}

impl Drop for TherapyRoom {
    fn drop(&mut self) {
        if matches!(self.mode, TherapyMode::VideoPlayer(_)) {
            self.leave_player();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Instant;

    struct Log {
        calls: Vec<String>,
        refuse_play: bool,
    }

    struct RecordingPlayer(Rc<RefCell<Log>>);

    impl AmbientPlayer for RecordingPlayer {
        fn play(&mut self, url: &str) -> Result<(), WellnessError> {
            let mut log = self.0.borrow_mut();
            log.calls.push(format!("play {}", url));
            if log.refuse_play {
                return Err(WellnessError::Audio("autoplay blocked".to_string()));
            }
            Ok(())
        }

        fn pause(&mut self) {
            self.0.borrow_mut().calls.push("pause".to_string());
        }

        fn resume(&mut self) -> Result<(), WellnessError> {
            self.0.borrow_mut().calls.push("resume".to_string());
            Ok(())
        }

        fn stop(&mut self) {
            self.0.borrow_mut().calls.push("stop".to_string());
        }
    }

    fn recording(refuse_play: bool) -> (Rc<RefCell<Log>>, Box<dyn AmbientPlayer>) {
        let log = Rc::new(RefCell::new(Log {
            calls: Vec::new(),
            refuse_play,
        }));
        let player = Box::new(RecordingPlayer(Rc::clone(&log)));
        (log, player)
    }

    #[test]
    fn test_auto_start_opens_player_and_consumes_once() {
        let (log, player) = recording(false);
        let consumed = Cell::new(0);
        let room = TherapyRoom::new(player, Some("ocean"), || consumed.set(consumed.get() + 1));

        assert_eq!(room.mode(), TherapyMode::VideoPlayer(SceneId::Ocean));
        assert!(room.audio_playing());
        assert_eq!(consumed.get(), 1);
        assert_eq!(room.current_scene().map(|s| s.title), Some("蔚蓝海岸"));
        assert_eq!(log.borrow().calls.len(), 1);
        assert!(log.borrow().calls[0].starts_with("play "));
    }

    #[test]
    fn test_unknown_or_missing_auto_start_stays_on_categories() {
        for auto_start in [None, Some("desert")] {
            let (log, player) = recording(false);
            let consumed = Cell::new(false);
            let room = TherapyRoom::new(player, auto_start, || consumed.set(true));

            assert_eq!(room.mode(), TherapyMode::CategorySelect);
            assert!(!consumed.get());
            assert!(log.borrow().calls.is_empty());
        }
    }

    #[test]
    fn test_navigation_and_back() {
        let (log, player) = recording(false);
        let mut room = TherapyRoom::new(player, None, || {});

        assert_eq!(room.open_scenes().unwrap(), TherapyMode::VideoList);
        assert_eq!(
            room.choose_scene(SceneId::Zen).unwrap(),
            TherapyMode::VideoPlayer(SceneId::Zen)
        );
        assert!(room.audio_playing());

        assert_eq!(room.back(), TherapyMode::VideoList);
        assert!(!room.audio_playing());
        assert_eq!(log.borrow().calls.last().map(String::as_str), Some("stop"));

        assert_eq!(room.back(), TherapyMode::CategorySelect);
        assert_eq!(room.back(), TherapyMode::CategorySelect);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let (_log, player) = recording(false);
        let mut room = TherapyRoom::new(player, None, || {});

        assert!(room.choose_scene(SceneId::Forest).is_err());
        assert!(room.toggle_audio().is_err());
        room.open_scenes().unwrap();
        assert!(room.open_game().is_err());
        assert_eq!(room.mode(), TherapyMode::VideoList);
    }

    #[test]
    fn test_toggle_pauses_and_resumes() {
        let (log, player) = recording(false);
        let mut room = TherapyRoom::new(player, Some("forest"), || {});

        assert!(!room.toggle_audio().unwrap());
        assert!(room.toggle_audio().unwrap());
        let calls = log.borrow().calls.clone();
        assert_eq!(calls[1..].to_vec(), vec!["pause".to_string(), "resume".to_string()]);
    }

    #[test]
    fn test_refused_playback_shows_paused_and_retries_on_toggle() {
        let (log, player) = recording(true);
        let mut room = TherapyRoom::new(player, Some("zen"), || {});

        assert_eq!(room.mode(), TherapyMode::VideoPlayer(SceneId::Zen));
        assert!(!room.audio_playing());

        log.borrow_mut().refuse_play = false;
        assert!(room.toggle_audio().unwrap());
        assert_eq!(log.borrow().calls.len(), 2);
        assert!(log.borrow().calls[1].starts_with("play "));
    }

    #[test]
    fn test_game_mode_round_trip() {
        let (_log, player) = recording(false);
        let mut room = TherapyRoom::new(player, None, || {});

        assert_eq!(room.open_game().unwrap(), TherapyMode::GameMode);
        let game = room.game_mut().unwrap();
        let id = game.bubbles()[0].id;
        assert!(game.pop(id, Instant::now()));
        assert_eq!(game.pop_count(), 1);

        assert_eq!(room.back(), TherapyMode::CategorySelect);
        assert!(room.game().is_none());
    }

    #[test]
    fn test_dropping_room_in_player_stops_audio() {
        let (log, player) = recording(false);
        let room = TherapyRoom::new(player, Some("ocean"), || {});
        drop(room);
        assert_eq!(log.borrow().calls.last().map(String::as_str), Some("stop"));
    }
}
