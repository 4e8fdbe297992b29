//! Level controller
//!
//! One data-driven controller runs every level. Per frame, in order:
//! 1. due timer tasks (cooldowns, autofire, fade-driven removals, defeat checks)
//! 2. player projectiles vs enemies
//! 3. background scroll
//! 4. player movement / firing
//! 5. enemy projectiles vs player
//! 6. formation movement
//! 7. defeat check scheduling
//!
//! "All formations empty" is only evaluated from a deferred `DefeatCheck`
//! task, so enemies still fading out keep the level alive.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::background::Background;
use super::collision::{CollisionManager, Kill};
use super::effects::{Effects, VisualEffect};
use super::enemy::EnemyClass;
use super::formation::Formation;
use super::player::Player;
use super::projectile::{Playfield, ProjectilePool};
use super::scene::SceneManager;
use super::state::GameState;
use super::tick::TickInput;
use super::timer::{LevelTask, TimerQueue};
use super::weapon::Shooter;
use crate::config::GameConfig;
use crate::error::LevelError;
use crate::levels::{FormulaVars, LevelCatalog, LevelConfig};

/// Lifecycle of one level instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    /// Config resolved, world not built yet
    Loading,
    Active,
    /// A win or loss transition is running
    Transitioning,
    /// Handed control to the next level
    Exited,
}

/// How a level asks to be replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelExit {
    /// Start the level with this key
    NextLevel(String),
}

/// Start-up parameters for a level
#[derive(Debug, Clone, Default)]
pub struct LevelInit {
    /// Explicit level key; when absent the key derives from `current_level`
    pub key: Option<String>,
}

/// Runs one level from creation to exit
#[derive(Debug)]
pub struct LevelController {
    config: GameConfig,
    level: LevelConfig,
    phase: LevelPhase,
    is_transitioning: bool,
    field: Playfield,
    timers: TimerQueue<LevelTask>,
    rng: Pcg32,
    collisions: CollisionManager,
    player: Player,
    formations: Vec<Formation>,
    /// Level-wide pool for enemy shots (when the level shares one)
    enemy_projectiles: Option<ProjectilePool>,
    background: Background,
    effects: Effects,
    exit: Option<LevelExit>,
    next_enemy_id: u32,
    frame: u64,
}

impl LevelController {
    /// Resolve which level to run and prepare an unbuilt instance.
    ///
    /// Unknown keys fall back to the configured first level; only an empty
    /// catalog is an error.
    pub fn init(
        catalog: &LevelCatalog,
        data: &LevelInit,
        state: &GameState,
        config: &GameConfig,
        seed: u64,
    ) -> Result<Self, LevelError> {
        let level = catalog
            .resolve(data.key.as_deref(), state.current_level, &config.first_level)?
            .clone();
        let field = Playfield::new(config.width, config.height);
        let enemy_projectiles = level.shared_enemy_pool.then(ProjectilePool::new);

        log::info!("Loading level '{}' (level #{})", level.key, state.current_level);
        Ok(Self {
            phase: LevelPhase::Loading,
            is_transitioning: false,
            field,
            timers: TimerQueue::new(),
            rng: Pcg32::seed_from_u64(seed),
            collisions: CollisionManager::new(config),
            player: Player::new(&config.player, state.lives, field),
            formations: Vec::new(),
            enemy_projectiles,
            background: Background::new(config.scroll_speed, config.background_tile_height),
            effects: Effects::new(),
            exit: None,
            next_enemy_id: 1,
            frame: 0,
            config: config.clone(),
            level,
        })
    }

    /// Build the formations from the level config and fade in
    pub fn create(&mut self) {
        if self.phase != LevelPhase::Loading {
            log::warn!("Level '{}' already created", self.level.key);
            return;
        }
        let vars = FormulaVars {
            game_width: self.config.width,
            game_height: self.config.height,
        };
        for (index, group) in self.level.enemy_groups.iter().enumerate() {
            let mut formation = Formation::new(
                index,
                &group.config,
                self.config.formation_padding,
                self.config.width,
            );
            for row in &group.enemy_rows {
                let placement = row.placement(vars);
                formation.create_enemy_row(
                    row.count,
                    placement.spacing,
                    placement.start_x,
                    row.y,
                    &row.enemy_config,
                    &mut self.next_enemy_id,
                    &mut self.rng,
                    &mut self.timers,
                );
            }
            self.formations.push(formation);
        }

        self.effects.push(VisualEffect::CameraFadeIn {
            duration_ms: self.config.fades.fade_in_ms,
        });
        self.phase = LevelPhase::Active;
        log::info!(
            "Level '{}' started with {} formations, {} enemies",
            self.level.key,
            self.formations.len(),
            self.enemy_count()
        );
    }

    /// Advance the level by one frame
    pub fn update(
        &mut self,
        state: &mut GameState,
        scenes: &mut SceneManager,
        input: &TickInput,
        dt: f32,
    ) {
        if matches!(self.phase, LevelPhase::Loading | LevelPhase::Exited) {
            return;
        }
        self.frame += 1;

        self.timers.advance(f64::from(dt) * 1000.0);
        for task in self.timers.drain_due() {
            self.run_task(task, state, scenes);
        }
        if self.phase == LevelPhase::Exited {
            return;
        }

        let kills = self.collisions.handle_player_projectile_collisions(
            &mut self.player,
            &mut self.formations,
            &mut self.timers,
            &mut self.effects,
        );
        self.award(&kills, state);

        self.background.update();
        self.player.update(input, dt, &mut self.timers);

        if let Some(pool) = self.enemy_projectiles.as_mut() {
            pool.advance(dt);
            pool.recycle_out_of_bounds(self.field);
        }
        for formation in &mut self.formations {
            for enemy in &mut formation.enemies {
                enemy.weapon.advance(dt);
                enemy.weapon.cleanup(self.field);
            }
        }

        let game_over = self.collisions.handle_enemy_projectile_collisions(
            &mut self.player,
            &mut self.formations,
            self.enemy_projectiles.as_mut(),
            state,
            &mut self.effects,
        );
        if game_over {
            self.hand_off_game_over(state, scenes);
        }

        for formation in &mut self.formations {
            formation.update(dt);
        }

        self.request_defeat_check();
    }

    fn run_task(&mut self, task: LevelTask, state: &mut GameState, scenes: &mut SceneManager) {
        match task {
            LevelTask::ReopenGate(Shooter::Player) => self.player.weapon.reopen(),
            LevelTask::ReopenGate(Shooter::Enemy { formation, enemy }) => {
                if let Some(e) = self
                    .formations
                    .get_mut(formation)
                    .and_then(|f| f.get_mut(enemy))
                {
                    e.weapon.reopen();
                }
            }
            LevelTask::Autofire(Shooter::Enemy { formation, enemy }) => {
                let Some(e) = self
                    .formations
                    .get_mut(formation)
                    .and_then(|f| f.get_mut(enemy))
                else {
                    log::trace!("Autofire for removed enemy {enemy:?}, dropping");
                    return;
                };
                e.autofire(self.enemy_projectiles.as_mut(), &mut self.rng, &mut self.timers);
            }
            LevelTask::Autofire(Shooter::Player) => {
                log::warn!("Player weapon has no autofire loop");
            }
            LevelTask::RemoveEnemy { formation, enemy } => {
                let removed = self
                    .formations
                    .get_mut(formation)
                    .is_some_and(|f| f.remove_enemy(enemy));
                if removed {
                    self.handle_enemy_defeated();
                }
            }
            LevelTask::DefeatCheck => {
                if self.all_formations_empty() {
                    self.trigger_transition(state, scenes);
                }
            }
            LevelTask::ExitLevel => {
                // Ship lost during the fade-out: the run ends here
                if !self.player.active {
                    log::info!(
                        "Player destroyed while leaving level '{}', game over",
                        self.level.key
                    );
                    state.won = false;
                    scenes.go_to_next_scene(state);
                    return;
                }
                if let Some(next) = self.level.next_level_key() {
                    log::info!("Leaving level '{}' for '{next}'", self.level.key);
                    self.exit = Some(LevelExit::NextLevel(next.to_string()));
                }
                self.phase = LevelPhase::Exited;
            }
        }
    }

    fn award(&mut self, kills: &[Kill], state: &mut GameState) {
        for kill in kills {
            let points = match kill.class {
                EnemyClass::Boss => self.config.score_boss,
                EnemyClass::Standard => self.config.score_standard,
            };
            state.add_score(points);
        }
    }

    /// Called after an enemy's fade-out removal
    pub fn handle_enemy_defeated(&mut self) {
        self.request_defeat_check();
    }

    /// Queue a deferred "all enemies defeated" check unless one is pending
    fn request_defeat_check(&mut self) {
        if self.is_transitioning || !self.all_formations_empty() {
            return;
        }
        if self.timers.any_pending(|t| *t == LevelTask::DefeatCheck) {
            return;
        }
        self.timers
            .after(self.config.fades.defeat_check_delay_ms, LevelTask::DefeatCheck);
    }

    /// Level cleared. Idempotent: only the first call starts a transition.
    pub fn trigger_transition(&mut self, state: &mut GameState, scenes: &mut SceneManager) -> bool {
        if self.is_transitioning {
            return false;
        }
        self.is_transitioning = true;
        self.phase = LevelPhase::Transitioning;
        state.won = true;
        state.current_level += 1;

        if self.level.is_final() {
            log::info!("Final level '{}' cleared", self.level.key);
            scenes.go_to_next_scene(state);
            return true;
        }

        log::info!("Level '{}' cleared", self.level.key);
        self.effects.push(VisualEffect::CameraFadeOut {
            duration_ms: self.config.fades.level_fade_ms,
        });
        self.timers
            .after(self.config.fades.level_fade_ms, LevelTask::ExitLevel);
        true
    }

    /// Player out of lives
    fn hand_off_game_over(&mut self, state: &mut GameState, scenes: &mut SceneManager) {
        if self.is_transitioning {
            return;
        }
        self.is_transitioning = true;
        self.phase = LevelPhase::Transitioning;
        state.won = false;
        log::info!("Game over on level '{}'", self.level.key);
        scenes.go_to_next_scene(state);
    }

    pub fn all_formations_empty(&self) -> bool {
        self.formations.iter().all(Formation::is_empty)
    }

    pub fn enemy_count(&self) -> usize {
        self.formations.iter().map(Formation::len).sum()
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    pub fn key(&self) -> &str {
        &self.level.key
    }

    pub fn level_config(&self) -> &LevelConfig {
        &self.level
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn formations(&self) -> &[Formation] {
        &self.formations
    }

    pub fn formations_mut(&mut self) -> &mut [Formation] {
        &mut self.formations
    }

    pub fn enemy_projectiles(&self) -> Option<&ProjectilePool> {
        self.enemy_projectiles.as_ref()
    }

    pub fn enemy_projectiles_mut(&mut self) -> Option<&mut ProjectilePool> {
        self.enemy_projectiles.as_mut()
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn timers(&self) -> &TimerQueue<LevelTask> {
        &self.timers
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Effects queued since the last drain
    pub fn drain_effects(&mut self) -> Vec<VisualEffect> {
        self.effects.drain()
    }

    /// Take the pending exit request, if any
    pub fn take_exit(&mut self) -> Option<LevelExit> {
        self.exit.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    /// One standard enemy at (400, 200), never firing within the test window
    const ONE_ENEMY: &str = r#"{
        "solo": {
            "key": "Solo",
            "nextLevel": "Final",
            "enemyGroups": [{
                "config": { "moveSpeed": 0, "yOffset": 100 },
                "enemyRows": [{
                    "count": 1, "spacing": 0, "startX": 400, "y": 100,
                    "enemyConfig": {
                        "imageKey": "enemy", "size": 48, "hitPoints": 1,
                        "minFireDelay": 60000, "maxFireDelay": 60000
                    }
                }]
            }]
        },
        "final": {
            "key": "Final",
            "nextLevel": "",
            "enemyGroups": [{
                "config": { "moveSpeed": 0, "yOffset": 100 },
                "enemyRows": [{
                    "count": 1, "spacing": 0, "startX": 400, "y": 100,
                    "enemyConfig": {
                        "imageKey": "boss", "size": 96, "hitPoints": 1,
                        "minFireDelay": 60000, "maxFireDelay": 60000
                    }
                }]
            }]
        },
        "empty": { "key": "Empty", "nextLevel": "Solo", "enemyGroups": [] }
    }"#;

    fn level(key: &str) -> (LevelController, GameState, SceneManager) {
        let catalog = LevelCatalog::from_json(ONE_ENEMY).expect("catalog");
        let config = GameConfig::default();
        let state = GameState::new(3);
        let init = LevelInit {
            key: Some(key.to_string()),
        };
        let mut level =
            LevelController::init(&catalog, &init, &state, &config, 1).expect("level");
        assert_eq!(level.phase(), LevelPhase::Loading);
        level.create();
        (level, state, SceneManager::default())
    }

    fn run(level: &mut LevelController, state: &mut GameState, scenes: &mut SceneManager, frames: u32) {
        for _ in 0..frames {
            level.update(state, scenes, &TickInput::default(), DT);
        }
    }

    /// Park a player shot right on the enemy
    fn shoot_enemy(level: &mut LevelController) {
        let target = level.formations()[0].enemies[0].pos;
        level
            .player_mut()
            .weapon
            .projectiles_mut()
            .spawn(target, Vec2::ZERO, 0.0, 0.0);
    }

    #[test]
    fn test_create_builds_formations_and_fades_in() {
        let (mut level, _, _) = level("solo");
        assert_eq!(level.phase(), LevelPhase::Active);
        assert_eq!(level.enemy_count(), 1);
        assert_eq!(level.formations()[0].enemies[0].pos, Vec2::new(400.0, 200.0));
        assert!(matches!(
            level.drain_effects().as_slice(),
            [VisualEffect::CameraFadeIn { .. }]
        ));
    }

    #[test]
    fn test_kill_fade_then_single_transition() {
        let (mut level, mut state, mut scenes) = level("solo");
        shoot_enemy(&mut level);
        run(&mut level, &mut state, &mut scenes, 1);

        // Dead but still present while fading
        assert_eq!(level.enemy_count(), 1);
        assert!(!level.formations()[0].enemies[0].active);
        assert_eq!(state.score, 10);
        assert!(!level.is_transitioning());

        // 250ms fade + 100ms defeat re-check
        run(&mut level, &mut state, &mut scenes, 16);
        assert_eq!(level.enemy_count(), 0);
        assert!(!level.is_transitioning());
        run(&mut level, &mut state, &mut scenes, 10);
        assert!(level.is_transitioning());
        assert_eq!(level.phase(), LevelPhase::Transitioning);
        assert!(state.won);
        assert_eq!(state.current_level, 2);

        // Still empty on later frames: no second transition
        run(&mut level, &mut state, &mut scenes, 5);
        assert_eq!(state.current_level, 2);
        assert!(!level.trigger_transition(&mut state, &mut scenes));
        assert_eq!(state.current_level, 2);

        // Level fade-out completes, exit to next level
        run(&mut level, &mut state, &mut scenes, 30);
        assert_eq!(level.phase(), LevelPhase::Exited);
        assert_eq!(level.take_exit(), Some(LevelExit::NextLevel("Final".into())));
        assert_eq!(level.take_exit(), None);
        assert!(!scenes.is_transitioning());
    }

    #[test]
    fn test_final_level_hands_off_to_scene_manager() {
        let (mut level, mut state, mut scenes) = level("final");
        shoot_enemy(&mut level);
        run(&mut level, &mut state, &mut scenes, 40);
        assert!(level.is_transitioning());
        assert!(scenes.is_transitioning());
        assert!(state.won);
        assert_eq!(level.take_exit(), None);
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_empty_level_clears_after_recheck_delay() {
        let (mut level, mut state, mut scenes) = level("empty");
        run(&mut level, &mut state, &mut scenes, 1);
        assert!(!level.is_transitioning());
        run(&mut level, &mut state, &mut scenes, 7);
        assert!(level.is_transitioning());
        assert_eq!(state.current_level, 2);
    }

    #[test]
    fn test_death_during_fade_out_ends_run() {
        let (mut level, mut state, mut scenes) = level("solo");
        level.player_mut().lives = 1;
        shoot_enemy(&mut level);
        run(&mut level, &mut state, &mut scenes, 30);
        assert!(level.is_transitioning());
        assert!(state.won);

        let at = level.player().pos;
        level
            .enemy_projectiles_mut()
            .expect("shared pool")
            .spawn(at, Vec2::ZERO, 0.0, 0.0);
        run(&mut level, &mut state, &mut scenes, 1);
        assert!(!level.player().active);
        assert!(!scenes.is_transitioning());

        // Fade-out completes: game over instead of the next level
        run(&mut level, &mut state, &mut scenes, 40);
        assert_eq!(level.take_exit(), None);
        assert_ne!(level.phase(), LevelPhase::Exited);
        assert!(scenes.is_transitioning());
        assert!(!state.won);
    }

    #[test]
    fn test_game_over_hands_off_once() {
        let (mut level, mut state, mut scenes) = level("solo");
        level.player_mut().lives = 1;
        let at = level.player().pos;
        let pool = level.enemy_projectiles_mut().expect("shared pool");
        pool.spawn(at, Vec2::ZERO, 0.0, 0.0);
        run(&mut level, &mut state, &mut scenes, 1);

        assert!(!level.player().active);
        assert!(level.is_transitioning());
        assert!(scenes.is_transitioning());
        assert!(!state.won);
        assert_eq!(state.lives, 0);

        // A later clear can't start a second transition
        shoot_enemy(&mut level);
        assert!(!level.trigger_transition(&mut state, &mut scenes));
        assert!(!state.won);
    }

    #[test]
    fn test_autofire_task_fires_into_shared_pool() {
        let catalog = LevelCatalog::builtin();
        let config = GameConfig::default();
        let state = GameState::new(3);
        let mut level = LevelController::init(
            &catalog,
            &LevelInit {
                key: Some("level1".into()),
            },
            &state,
            &config,
            5,
        )
        .expect("level");
        level.create();
        let mut state = state;
        let mut scenes = SceneManager::default();

        // Nobody fires before the 2000ms minimum
        run(&mut level, &mut state, &mut scenes, 110);
        assert_eq!(level.enemy_projectiles().map(|p| p.active_count()), Some(0));

        // Everyone has fired by the 5000ms maximum
        run(&mut level, &mut state, &mut scenes, 200);
        let fired: u64 = level.formations()[0]
            .enemies
            .iter()
            .map(|e| e.weapon.shots_fired)
            .sum();
        assert!(fired >= 4);
        for enemy in &level.formations()[0].enemies {
            assert_eq!(enemy.weapon.projectiles().capacity(), 0);
        }
    }

    #[test]
    fn test_unknown_key_falls_back_to_first_level() {
        let catalog = LevelCatalog::builtin();
        let config = GameConfig::default();
        let state = GameState::new(3);
        let level = LevelController::init(
            &catalog,
            &LevelInit {
                key: Some("level42".into()),
            },
            &state,
            &config,
            5,
        )
        .expect("fallback");
        assert_eq!(level.key(), "Level1");
    }
}
