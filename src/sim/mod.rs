//! Simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Time only advances through `dt` handed to the frame tick
//! - Seeded RNG only
//! - Deferred work goes through the per-owner timer queue
//! - No rendering or platform dependencies; visuals are emitted as effects

pub mod background;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod formation;
pub mod level;
pub mod player;
pub mod projectile;
pub mod scene;
pub mod state;
pub mod tick;
pub mod timer;
pub mod weapon;

pub use background::Background;
pub use collision::{CollisionManager, Kill};
pub use effects::{Effects, VisualEffect};
pub use enemy::{Enemy, EnemyClass, EnemyId, HitOutcome};
pub use formation::Formation;
pub use level::{LevelController, LevelExit, LevelInit, LevelPhase};
pub use player::Player;
pub use projectile::{Playfield, Projectile, ProjectilePool};
pub use scene::{MenuState, SceneChange, SceneManager};
pub use state::GameState;
pub use tick::{Game, Scene, TickInput, tick};
pub use timer::{LevelTask, TimerQueue};
pub use weapon::{FirePolicy, Shooter, Weapon, WeaponConfig};
