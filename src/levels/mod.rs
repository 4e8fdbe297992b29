//! Declarative level data
//!
//! Levels are static configurations read once when a level is created. The
//! built-in catalog ships as JSON in `assets/levels.json`.

pub mod formula;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use formula::{FormulaVars, evaluate};

use crate::consts::*;
use crate::error::LevelError;

const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

/// A length that is either a literal or a formula over the playfield size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Value(f32),
    Formula(String),
}

impl Dimension {
    /// Resolve to pixels, or `None` if the formula is malformed / not a number
    pub fn resolve(&self, vars: FormulaVars) -> Option<f32> {
        match self {
            Dimension::Value(v) if v.is_finite() => Some(*v),
            Dimension::Value(v) => {
                log::warn!("Non-finite dimension {v}");
                None
            }
            Dimension::Formula(src) => match evaluate(src, vars) {
                Ok(v) => Some(v),
                Err(err) => {
                    log::warn!("Bad formula '{src}': {err}");
                    None
                }
            },
        }
    }
}

/// Weapon fan parameters for an enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeaponSpec {
    pub multi_shot_count: u32,
    /// Degrees between adjacent shots
    pub shot_angle: f32,
    /// Pixels between adjacent shots
    pub shot_x_offset: f32,
    /// Positive = downward
    pub projectile_speed: f32,
    pub min_fire_delay: Option<f64>,
    pub max_fire_delay: Option<f64>,
}

impl Default for WeaponSpec {
    fn default() -> Self {
        Self {
            multi_shot_count: 1,
            shot_angle: 0.0,
            shot_x_offset: 0.0,
            projectile_speed: ENEMY_PROJECTILE_SPEED,
            min_fire_delay: None,
            max_fire_delay: None,
        }
    }
}

/// Per-enemy configuration within a row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnemySpec {
    pub image_key: String,
    pub size: f32,
    pub hit_points: u32,
    pub min_fire_delay: Option<f64>,
    pub max_fire_delay: Option<f64>,
    pub weapon_config: WeaponSpec,
}

impl Default for EnemySpec {
    fn default() -> Self {
        Self {
            image_key: "enemy".to_string(),
            size: ENEMY_SIZE,
            hit_points: 1,
            min_fire_delay: None,
            max_fire_delay: None,
            weapon_config: WeaponSpec::default(),
        }
    }
}

impl EnemySpec {
    /// Autofire window in ms. Enemy-level delays win over weapon-level ones.
    pub fn fire_window(&self) -> (f64, f64) {
        let min = self
            .min_fire_delay
            .or(self.weapon_config.min_fire_delay)
            .unwrap_or(ENEMY_MIN_FIRE_DELAY_MS);
        let max = self
            .max_fire_delay
            .or(self.weapon_config.max_fire_delay)
            .unwrap_or(ENEMY_MAX_FIRE_DELAY_MS);
        if min <= max { (min, max) } else { (max, min) }
    }
}

/// One row of enemies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSpec {
    pub count: u32,
    pub spacing: Dimension,
    #[serde(default)]
    pub start_x: Option<Dimension>,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub enemy_config: EnemySpec,
}

/// Row placement after formulas are evaluated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPlacement {
    pub spacing: f32,
    pub start_x: f32,
}

impl RowSpec {
    /// Evaluate `spacing` and `startX` once, falling back to an evenly spread,
    /// centered row when either is unusable.
    pub fn placement(&self, vars: FormulaVars) -> RowPlacement {
        let spacing = self.spacing.resolve(vars).unwrap_or_else(|| {
            let fallback = vars.game_width / (self.count as f32 + 1.0);
            log::warn!("Row spacing unusable, using {fallback}");
            fallback
        });
        let centered = (vars.game_width - spacing * (self.count.saturating_sub(1)) as f32) / 2.0;
        let start_x = match &self.start_x {
            Some(dim) => dim.resolve(vars).unwrap_or_else(|| {
                log::warn!("Row startX unusable, centering at {centered}");
                centered
            }),
            None => centered,
        };
        RowPlacement { spacing, start_x }
    }
}

/// Formation movement profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSettings {
    pub move_speed: f32,
    #[serde(default)]
    pub y_offset: f32,
    #[serde(default)]
    pub padding: Option<f32>,
}

/// One formation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub config: GroupSettings,
    #[serde(default)]
    pub enemy_rows: Vec<RowSpec>,
}

/// A full level description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    pub key: String,
    #[serde(default)]
    pub next_level: Option<String>,
    #[serde(default)]
    pub enemy_groups: Vec<GroupSpec>,
    /// Enemy shots go into one level-wide pool instead of per-weapon pools
    #[serde(default = "default_true")]
    pub shared_enemy_pool: bool,
}

fn default_true() -> bool {
    true
}

impl LevelConfig {
    /// Next level key; `None` (or empty) marks the final level
    pub fn next_level_key(&self) -> Option<&str> {
        self.next_level.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn is_final(&self) -> bool {
        self.next_level_key().is_none()
    }
}

/// All levels, keyed by their catalog name (e.g. `level1`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelCatalog {
    levels: BTreeMap<String, LevelConfig>,
}

impl LevelCatalog {
    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let catalog: Self = serde_json::from_str(json)?;
        if catalog.levels.is_empty() {
            return Err(LevelError::EmptyCatalog);
        }
        Ok(catalog)
    }

    /// The levels shipped with the game
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_LEVELS) {
            Ok(catalog) => catalog,
            Err(err) => {
                log::error!("Built-in levels unusable: {err}");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Look up by catalog name or by the level's own `key`, case-insensitively
    pub fn get(&self, key: &str) -> Result<&LevelConfig, LevelError> {
        self.levels
            .iter()
            .find(|(name, level)| {
                name.eq_ignore_ascii_case(key) || level.key.eq_ignore_ascii_case(key)
            })
            .map(|(_, level)| level)
            .ok_or_else(|| LevelError::UnknownLevel {
                key: key.to_string(),
            })
    }

    /// Resolve the level to load: the explicit key if given, else the one
    /// numbered `current_level`. Unknown keys fall back to `default_key`,
    /// then to the first catalog entry.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        current_level: u32,
        default_key: &str,
    ) -> Result<&LevelConfig, LevelError> {
        let wanted = explicit
            .map(str::to_string)
            .unwrap_or_else(|| format!("level{current_level}"));
        match self.get(&wanted) {
            Ok(level) => Ok(level),
            Err(err) => {
                log::warn!("{err}; falling back to '{default_key}'");
                self.get(default_key)
                    .or_else(|_| self.levels.values().next().ok_or(LevelError::EmptyCatalog))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: FormulaVars = FormulaVars {
        game_width: 800.0,
        game_height: 600.0,
    };

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = LevelCatalog::builtin();
        assert_eq!(catalog.len(), 5);
        let level4 = catalog.get("Level4").expect("level4 present");
        assert!(level4.is_final());
        assert_eq!(level4.enemy_groups.len(), 2);
        let level1 = catalog.get("level1").expect("level1 present");
        assert_eq!(level1.next_level_key(), Some("Level2"));
    }

    #[test]
    fn test_fire_window_precedence() {
        let catalog = LevelCatalog::builtin();
        let level0 = catalog.get("level0").expect("level0");
        // Weapon-level delays when the enemy has none
        let boss = &level0.enemy_groups[0].enemy_rows[0].enemy_config;
        assert_eq!(boss.fire_window(), (2000.0, 4000.0));
        // Enemy-level delays
        let level1 = catalog.get("level1").expect("level1");
        let grunt = &level1.enemy_groups[0].enemy_rows[0].enemy_config;
        assert_eq!(grunt.fire_window(), (2000.0, 5000.0));
    }

    #[test]
    fn test_placement_formulas() {
        let catalog = LevelCatalog::builtin();
        let level0 = catalog.get("level0").expect("level0");
        let bosses = level0.enemy_groups[0].enemy_rows[0].placement(VARS);
        assert_eq!(bosses, RowPlacement { spacing: 400.0, start_x: 200.0 });
        let grunts = level0.enemy_groups[1].enemy_rows[0].placement(VARS);
        assert_eq!(grunts, RowPlacement { spacing: 80.0, start_x: 160.0 });
    }

    #[test]
    fn test_placement_centers_when_start_missing() {
        let row: RowSpec =
            serde_json::from_str(r#"{ "count": 4, "spacing": 100, "y": 100 }"#).expect("row");
        assert_eq!(row.placement(VARS).start_x, 250.0);
    }

    #[test]
    fn test_malformed_formula_falls_back() {
        let row: RowSpec = serde_json::from_str(
            r#"{ "count": 3, "spacing": "gameWidth / 0", "startX": "oops(" }"#,
        )
        .expect("row");
        let placement = row.placement(VARS);
        assert_eq!(placement.spacing, 200.0);
        assert_eq!(placement.start_x, 200.0);
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let catalog = LevelCatalog::builtin();
        let level = catalog.resolve(Some("level99"), 1, "level1").expect("fallback");
        assert_eq!(level.key, "Level1");
        let level = catalog.resolve(None, 3, "level1").expect("numbered");
        assert_eq!(level.key, "Level3");
        let level = catalog.resolve(None, 42, "nope").expect("first entry");
        assert_eq!(level.key, "Level0");
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(matches!(
            LevelCatalog::from_json("{}"),
            Err(LevelError::EmptyCatalog)
        ));
        assert!(matches!(
            LevelCatalog::from_json("[1,2"),
            Err(LevelError::Parse(_))
        ));
    }
}
