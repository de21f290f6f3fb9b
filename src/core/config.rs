//! Game configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every section can be overridden
//! from TOML; missing keys keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{LunkError, Result};
use crate::core::types::EnemyKind;

/// Configuration for the whole simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field: FieldConfig,
    pub steering: SteeringConfig,
    pub movement: MovementConfig,
    pub interaction: InteractionConfig,
    pub vitality: VitalityConfig,

    // === TIMING ===
    /// Nominal length of one tick in seconds
    ///
    /// Used when the caller passes a nonsensical `dt` (NaN, zero, negative).
    /// One frame at 60 frames per second.
    pub tick_seconds: f32,

    /// Largest `dt` a single tick may consume (seconds)
    ///
    /// Long frame hitches are clamped so agents never teleport through
    /// hit-boxes or obstacles.
    pub max_dt: f32,

    // === SPATIAL SYSTEM ===
    /// Size of each cell in the proximity hash grid (world units)
    ///
    /// Should be close to the largest steering radius (12 units for the
    /// follow rule) so most queries touch only a 3x3 neighbourhood.
    pub grid_cell_size: f32,

    // === PARALLELIZATION ===
    /// Minimum live agent count before steering decisions run on rayon
    ///
    /// Below this threshold, thread overhead exceeds benefits. Results are
    /// identical either way.
    pub parallel_threshold: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            steering: SteeringConfig::default(),
            movement: MovementConfig::default(),
            interaction: InteractionConfig::default(),
            vitality: VitalityConfig::default(),
            tick_seconds: 1.0 / 60.0,
            max_dt: 0.25,
            grid_cell_size: 12.0,
            parallel_threshold: 1000,
        }
    }
}

/// Bounds of the play field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Field width in world units (x range is [0, width))
    pub width: f32,

    /// Field height in world units (y range is [0, height))
    pub height: f32,

    /// Half the side of the square re-entry region after a fall
    ///
    /// At 5.0 the player lands somewhere in a 10x10 box centred on the
    /// point where they fell, clipped to the field.
    pub fall_region_half_extent: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            fall_region_half_extent: 5.0,
        }
    }
}

/// Distance bands for the enemy and rescue-target rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Player distance at which an enemy reacts (charge or flee)
    pub enemy_player_range: f32,

    /// Rescue-target distance that turns a nearby player into a threat worth charging
    pub enemy_guard_range: f32,

    /// Rescue-target distance at which an enemy runs at it
    pub enemy_hunt_run_range: f32,

    /// Rescue-target distance at which an enemy walks toward it
    ///
    /// Must be >= `enemy_hunt_run_range`, otherwise the walk band is empty.
    pub enemy_hunt_walk_range: f32,

    /// Player distance at which a rescue target stops and swoons
    pub target_affection_range: f32,

    /// Player distance at which a rescue target walks to the player
    pub target_follow_range: f32,

    /// Enemy distance at which a rescue target walks away
    pub target_flee_range: f32,

    /// Largest random heading perturbation per wander tick (radians)
    pub wander_jitter: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            enemy_player_range: 5.0,
            enemy_guard_range: 5.0,
            enemy_hunt_run_range: 4.0,
            enemy_hunt_walk_range: 10.0,
            target_affection_range: 5.0,
            target_follow_range: 12.0,
            target_flee_range: 6.0,
            wander_jitter: 0.15,
        }
    }
}

/// Speeds and turn rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Lunk's constant forward speed (units per second)
    pub player_speed: f32,

    /// Walking speed for AI agents (units per second)
    ///
    /// Half the player's speed.
    pub walk_speed: f32,

    /// Running speed for AI agents (units per second)
    pub run_speed: f32,

    /// Maximum player heading change per tick (degrees)
    ///
    /// Small on purpose: Lunk is unwieldy and cannot turn on the spot.
    pub player_turn_rate_deg: f32,

    /// Maximum heading change per tick for enemies and rescue targets (degrees)
    pub agent_turn_rate_deg: f32,
}

impl MovementConfig {
    pub fn player_turn_rate(&self) -> f32 {
        self.player_turn_rate_deg.to_radians()
    }

    pub fn agent_turn_rate(&self) -> f32 {
        self.agent_turn_rate_deg.to_radians()
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            player_speed: 6.0,
            walk_speed: 3.0,
            run_speed: 5.0,
            player_turn_rate_deg: 5.0,
            agent_turn_rate_deg: 20.0,
        }
    }
}

/// Per-enemy score for the Eat outcome (may be negative)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TastinessTable {
    pub skeleton: i64,
    pub zombie: i64,
    pub bat: i64,
}

impl TastinessTable {
    pub fn get(&self, kind: EnemyKind) -> i64 {
        match kind {
            EnemyKind::Skeleton => self.skeleton,
            EnemyKind::Zombie => self.zombie,
            EnemyKind::Bat => self.bat,
        }
    }
}

impl Default for TastinessTable {
    fn default() -> Self {
        // Placeholder values: bones are dry, zombies are rotten, bats are a treat.
        Self {
            skeleton: -1,
            zombie: -2,
            bat: 3,
        }
    }
}

/// Hit-boxes, throws, and the score/health effects of interactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Half side of every agent's square hit-box (world units)
    pub hitbox_half_extent: f32,

    /// Total distance a thrown enemy flies along the player's heading
    pub throw_distance: f32,

    /// Ticks a thrown enemy stays airborne before landing dead
    pub throw_airborne_ticks: u32,

    /// Score for crushing an enemy
    pub crush_score: i64,

    /// Score for a thrown enemy that lands without hitting a lady
    pub throw_score: i64,

    /// Score for rescuing a lady
    pub rescue_score: i64,

    /// Score lost when an enemy catches a lady
    pub lost_target_score_penalty: i64,

    /// Boredom lost when an enemy catches a lady
    pub lost_target_boredom_drain: i64,

    /// Health lost when a thrown enemy lands on a lady
    pub thrown_into_target_health_penalty: i64,

    /// Boredom regained whenever an enemy dies
    pub enemy_kill_boredom_refill: i64,

    /// Score per enemy kind for the Eat outcome
    pub tastiness: TastinessTable,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hitbox_half_extent: 0.5,
            throw_distance: 2.5,
            throw_airborne_ticks: 10,
            crush_score: 1,
            throw_score: 1,
            rescue_score: 5,
            lost_target_score_penalty: 6,
            lost_target_boredom_drain: 10,
            thrown_into_target_health_penalty: 1,
            enemy_kill_boredom_refill: 5,
            tastiness: TastinessTable::default(),
        }
    }
}

/// Starting values for the vitality tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalityConfig {
    /// Health at level start; reaching 0 ends the game in anger
    pub starting_health: u32,

    /// Boredom at level start; reaching 0 ends the game in boredom
    pub starting_boredom: u32,

    /// Upper cap for boredom refills
    pub max_boredom: u32,

    /// Seconds of simulated time per boredom decrement
    pub boredom_interval_secs: f32,
}

impl Default for VitalityConfig {
    fn default() -> Self {
        Self {
            starting_health: 5,
            starting_boredom: 90,
            max_boredom: 180,
            boredom_interval_secs: 1.0,
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(LunkError::Configuration(msg));

        if !(self.field.width > 0.0 && self.field.height > 0.0) {
            return bad(format!(
                "field must have positive size, got {}x{}",
                self.field.width, self.field.height
            ));
        }
        if self.field.fall_region_half_extent < 0.0 {
            return bad("fall_region_half_extent must be >= 0".into());
        }

        let s = &self.steering;
        if s.enemy_hunt_run_range > s.enemy_hunt_walk_range {
            return bad(format!(
                "enemy_hunt_run_range ({}) should be <= enemy_hunt_walk_range ({})",
                s.enemy_hunt_run_range, s.enemy_hunt_walk_range
            ));
        }
        if s.target_affection_range > s.target_follow_range {
            return bad(format!(
                "target_affection_range ({}) should be <= target_follow_range ({})",
                s.target_affection_range, s.target_follow_range
            ));
        }
        let ranges = [
            s.enemy_player_range,
            s.enemy_guard_range,
            s.enemy_hunt_run_range,
            s.enemy_hunt_walk_range,
            s.target_affection_range,
            s.target_follow_range,
            s.target_flee_range,
            s.wander_jitter,
        ];
        if ranges.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return bad("steering ranges must be finite and non-negative".into());
        }

        let m = &self.movement;
        if [m.player_speed, m.walk_speed, m.run_speed]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return bad("speeds must be finite and non-negative".into());
        }
        if m.player_turn_rate_deg <= 0.0 || m.agent_turn_rate_deg <= 0.0 {
            return bad("turn rates must be positive".into());
        }

        let i = &self.interaction;
        if !(i.hitbox_half_extent.is_finite() && i.hitbox_half_extent > 0.0) {
            return bad("hitbox_half_extent must be positive".into());
        }
        if !(i.throw_distance.is_finite() && i.throw_distance >= 0.0) {
            return bad("throw_distance must be finite and non-negative".into());
        }
        if i.throw_airborne_ticks == 0 {
            return bad("throw_airborne_ticks must be at least 1".into());
        }
        // Penalties and refills are magnitudes; the sign comes from the event
        let magnitudes = [
            ("lost_target_score_penalty", i.lost_target_score_penalty),
            ("lost_target_boredom_drain", i.lost_target_boredom_drain),
            (
                "thrown_into_target_health_penalty",
                i.thrown_into_target_health_penalty,
            ),
            ("enemy_kill_boredom_refill", i.enemy_kill_boredom_refill),
        ];
        if let Some((name, value)) = magnitudes.iter().find(|(_, v)| *v < 0) {
            return bad(format!("{} must be >= 0, got {}", name, value));
        }

        let v = &self.vitality;
        if v.starting_health == 0 || v.starting_boredom == 0 {
            return bad("starting health and boredom must be positive".into());
        }
        if v.starting_boredom > v.max_boredom {
            return bad(format!(
                "starting_boredom ({}) exceeds max_boredom ({})",
                v.starting_boredom, v.max_boredom
            ));
        }
        if !(v.boredom_interval_secs.is_finite() && v.boredom_interval_secs > 0.0) {
            return bad("boredom_interval_secs must be positive".into());
        }

        let dt_ok =
            self.tick_seconds > 0.0 && self.max_dt.is_finite() && self.max_dt >= self.tick_seconds;
        if !dt_ok {
            return bad(format!(
                "need 0 < tick_seconds ({}) <= max_dt ({})",
                self.tick_seconds, self.max_dt
            ));
        }
        if self.grid_cell_size <= 0.0 {
            return bad("grid_cell_size must be positive".into());
        }

        Ok(())
    }
}
