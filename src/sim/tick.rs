//! Frame tick
//!
//! Top-level game loop: owns the run state, the scene manager and the active
//! scene, and routes level exits and end-of-run transitions.

use super::effects::VisualEffect;
use super::level::{LevelController, LevelExit, LevelInit};
use super::scene::{MenuState, SceneChange, SceneManager};
use super::state::GameState;
use crate::config::GameConfig;
use crate::highscores::HighScores;
use crate::levels::LevelCatalog;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Steer left (arrow key)
    pub left: bool,
    /// Steer right
    pub right: bool,
    /// Fire while held (space)
    pub fire: bool,
    /// Menu "start" button
    pub start: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// The scene currently receiving frames
#[derive(Debug)]
pub enum Scene {
    Menu(MenuState),
    Level(Box<LevelController>),
}

/// Everything one running game owns
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    catalog: LevelCatalog,
    pub state: GameState,
    scenes: SceneManager,
    high_scores: HighScores,
    scene: Scene,
    effects: Vec<VisualEffect>,
    last_result: Option<SceneChange>,
    runs: u64,
    levels_loaded: u64,
}

impl Game {
    pub fn new(config: GameConfig, catalog: LevelCatalog) -> Self {
        Self {
            state: GameState::new(config.player.lives),
            scenes: SceneManager::new(config.fades.scene_fade_ms),
            high_scores: HighScores::new(),
            scene: Scene::Menu(MenuState::Start),
            effects: Vec::new(),
            last_result: None,
            runs: 0,
            levels_loaded: 0,
            catalog,
            config,
        }
    }

    /// Reset the run and load the first level
    pub fn start_run(&mut self) {
        self.state.reset();
        self.runs += 1;
        log::info!("Starting run #{}", self.runs);
        let first = self.config.first_level.clone();
        self.load_level(Some(first));
    }

    /// Replace the active scene with a freshly created level. An unusable
    /// catalog drops back to the start menu.
    pub fn load_level(&mut self, key: Option<String>) {
        // Each level gets its own stream, derived from the run seed
        let seed = self.config.seed.wrapping_add(self.levels_loaded);
        self.levels_loaded += 1;

        let init = LevelInit { key };
        match LevelController::init(&self.catalog, &init, &self.state, &self.config, seed) {
            Ok(mut level) => {
                level.create();
                self.scene = Scene::Level(Box::new(level));
            }
            Err(err) => {
                log::error!("Failed to load level: {err}");
                self.scene = Scene::Menu(MenuState::Start);
            }
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Menu being shown, if any
    pub fn menu(&self) -> Option<MenuState> {
        match &self.scene {
            Scene::Menu(menu) => Some(*menu),
            Scene::Level(_) => None,
        }
    }

    pub fn level(&self) -> Option<&LevelController> {
        match &self.scene {
            Scene::Level(level) => Some(level.as_ref()),
            Scene::Menu(_) => None,
        }
    }

    pub fn level_mut(&mut self) -> Option<&mut LevelController> {
        match &mut self.scene {
            Scene::Level(level) => Some(level.as_mut()),
            Scene::Menu(_) => None,
        }
    }

    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// How the most recent run ended
    pub fn last_result(&self) -> Option<SceneChange> {
        self.last_result
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Visual effects produced since the last drain
    pub fn drain_effects(&mut self) -> Vec<VisualEffect> {
        std::mem::take(&mut self.effects)
    }
}

/// Advance the game by one frame
pub fn tick(game: &mut Game, input: &TickInput, dt: f32) {
    let mut input = input.clone();
    if input.idle_mode {
        autopilot(game, &mut input);
    }

    let Game {
        scene,
        state,
        scenes,
        effects,
        ..
    } = game;

    let mut exit = None;
    let mut start = false;
    match scene {
        Scene::Menu(_) => start = input.start && !scenes.is_transitioning(),
        Scene::Level(level) => {
            level.update(state, scenes, &input, dt);
            effects.extend(level.drain_effects());
            exit = level.take_exit();
        }
    }

    if start {
        game.start_run();
    } else if let Some(LevelExit::NextLevel(key)) = exit {
        game.load_level(Some(key));
    }

    if let Some(change) = game.scenes.update(dt, &mut game.state) {
        let won = change.menu == MenuState::Win;
        // A win has already advanced past the last level
        let level = if won {
            change.level.saturating_sub(1).max(1)
        } else {
            change.level
        };
        match game.high_scores.add_score(change.score, level, won) {
            Some(rank) => log::info!("Run scored {} (rank #{rank})", change.score),
            None => log::info!("Run scored {}", change.score),
        }
        game.scene = Scene::Menu(change.menu);
        game.last_result = Some(change);
    }
    game.effects.extend(game.scenes.drain_effects());
}

/// Demo pilot: start from menus, chase the closest live enemy and hold fire
fn autopilot(game: &Game, input: &mut TickInput) {
    let Some(level) = game.level() else {
        input.start = true;
        return;
    };
    let player = level.player();
    let target = level
        .formations()
        .iter()
        .flat_map(|f| f.enemies.iter())
        .filter(|e| e.is_hittable())
        .map(|e| e.pos.x - player.pos.x)
        .min_by(|a, b| a.abs().total_cmp(&b.abs()));

    if let Some(dx) = target {
        // Dead zone keeps the ship from jittering under its target
        input.left = dx < -4.0;
        input.right = dx > 4.0;
    }
    input.fire = true;
}
