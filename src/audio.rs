//! Background music
//!
//! Browsers refuse to autoplay audio before a user gesture, so the theme is
//! started on the first click or keydown. That first gesture is the only
//! attempt: the unlock listeners go away whether or not playback succeeded.

use crate::Settings;

/// One-shot gate for the first user gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioUnlock {
    attempted: bool,
}

impl AudioUnlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once, on the first gesture
    pub fn on_gesture(&mut self) -> bool {
        !std::mem::replace(&mut self.attempted, true)
    }

    pub fn attempted(&self) -> bool {
        self.attempted
    }
}

/// Looping theme music
pub struct MusicPlayer {
    unlock: AudioUnlock,
    volume: f32,
    #[cfg(target_arch = "wasm32")]
    element: Option<web_sys::HtmlAudioElement>,
}

impl MusicPlayer {
    /// `src` is a preloaded audio URL
    pub fn new(src: &str, settings: &Settings) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        log::debug!("Music {} is only played in the browser", src);
        Self {
            unlock: AudioUnlock::new(),
            volume: settings.effective_volume(),
            #[cfg(target_arch = "wasm32")]
            element: web::create(src),
        }
    }

    /// Follow the current mute/volume settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_volume();
        #[cfg(target_arch = "wasm32")]
        if let Some(el) = &self.element {
            el.set_volume(self.volume as f64);
        }
    }

    /// Flip mute, persist it and apply it to the playing theme. Returns the new state.
    pub fn toggle_mute(&mut self, settings: &mut Settings) -> bool {
        settings.muted = !settings.muted;
        settings.save();
        self.apply_settings(settings);
        log::info!("Music {}", if settings.muted { "muted" } else { "unmuted" });
        settings.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Call on every click/keydown until it returns true
    ///
    /// Returns true once the single playback attempt has been made, which is
    /// the caller's cue to drop its unlock listeners.
    pub fn on_gesture(&mut self) -> bool {
        if !self.unlock.on_gesture() {
            return true;
        }
        self.play();
        true
    }

    #[cfg(target_arch = "wasm32")]
    fn play(&self) {
        if let Some(el) = &self.element {
            web::play(el, self.volume);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn play(&self) {
        log::info!("Music unlocked at volume {:.2}", self.volume);
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen_futures::JsFuture;
    use web_sys::HtmlAudioElement;

    pub(super) fn create(src: &str) -> Option<HtmlAudioElement> {
        match HtmlAudioElement::new_with_src(src) {
            Ok(el) => {
                el.set_loop(true);
                Some(el)
            }
            Err(e) => {
                log::warn!("Failed to create audio element: {:?}", e);
                None
            }
        }
    }

    pub(super) fn play(el: &HtmlAudioElement, volume: f32) {
        el.set_volume(volume as f64);
        let promise = match el.play() {
            Ok(promise) => promise,
            Err(e) => {
                log::warn!("Music playback refused: {:?}", e);
                return;
            }
        };
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Autoplay blocked: {:?}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_fires_once() {
        let mut unlock = AudioUnlock::new();
        assert!(unlock.on_gesture());
        assert!(!unlock.on_gesture());
        assert!(unlock.attempted());
    }

    #[test]
    fn test_toggle_mute_round_trips_volume() {
        let mut settings = Settings::default();
        let mut player = MusicPlayer::new("theme.mp3", &settings);
        assert_eq!(player.volume(), 0.5);

        assert!(player.toggle_mute(&mut settings));
        assert!(settings.muted);
        assert_eq!(player.volume(), 0.0);

        assert!(!player.toggle_mute(&mut settings));
        assert_eq!(player.volume(), 0.5);
    }

    #[test]
    fn test_muted_player_still_unlocks() {
        let mut settings = Settings::default();
        let mut player = MusicPlayer::new("theme.mp3", &settings);
        player.toggle_mute(&mut settings);
        assert!(player.on_gesture());
        assert!(player.on_gesture());
        assert_eq!(player.volume(), 0.0);
    }
}
