//! End-of-run routing
//!
//! The scene manager owns the single global "in transition" latch. Any number
//! of simultaneous win/lose triggers collapse into one fade-out, after which
//! the menu is shown with the run's outcome and the game state is reset.

use serde::{Deserialize, Serialize};

use super::effects::{Effects, VisualEffect};
use super::state::GameState;
use super::timer::TimerQueue;
use crate::consts::SCENE_FADE_MS;

/// What the menu scene shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuState {
    Start,
    Win,
    GameOver,
}

impl MenuState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuState::Start => "start",
            MenuState::Win => "win",
            MenuState::GameOver => "gameover",
        }
    }
}

/// Deferred scene-manager work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SceneTask {
    FadeOutComplete { won: bool },
}

/// A completed transition to the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneChange {
    pub menu: MenuState,
    /// Score of the finished run (captured before the reset)
    pub score: u64,
    /// Level number the run ended on
    pub level: u32,
}

/// Global scene transition driver
#[derive(Debug)]
pub struct SceneManager {
    is_transitioning: bool,
    fade_ms: f64,
    timers: TimerQueue<SceneTask>,
    effects: Effects,
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new(SCENE_FADE_MS)
    }
}

impl SceneManager {
    pub fn new(fade_ms: f64) -> Self {
        Self {
            is_transitioning: false,
            fade_ms,
            timers: TimerQueue::new(),
            effects: Effects::new(),
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    /// Route the finished run to the menu. Ignored while a transition is
    /// already running; returns whether this call started one.
    pub fn go_to_next_scene(&mut self, state: &GameState) -> bool {
        if self.is_transitioning {
            log::debug!("Scene transition already running, ignoring");
            return false;
        }
        self.is_transitioning = true;
        log::info!("Starting scene transition, won: {}", state.won);

        self.effects.push(VisualEffect::CameraFadeOut {
            duration_ms: self.fade_ms,
        });
        self.timers
            .after(self.fade_ms, SceneTask::FadeOutComplete { won: state.won });
        true
    }

    /// Advance the fade. When it completes, resets `state`, releases the latch
    /// and reports which menu to show.
    pub fn update(&mut self, dt: f32, state: &mut GameState) -> Option<SceneChange> {
        self.timers.advance(f64::from(dt) * 1000.0);
        let mut change = None;
        for task in self.timers.drain_due() {
            match task {
                SceneTask::FadeOutComplete { won } => {
                    let menu = if won { MenuState::Win } else { MenuState::GameOver };
                    log::info!("Fade complete, showing menu with state: {}", menu.as_str());
                    change = Some(SceneChange {
                        menu,
                        score: state.score,
                        level: state.current_level,
                    });
                    state.reset();
                    self.is_transitioning = false;
                }
            }
        }
        change
    }

    /// Effects queued since the last drain
    pub fn drain_effects(&mut self) -> Vec<VisualEffect> {
        self.effects.drain()
    }
}
