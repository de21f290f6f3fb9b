//! Spawn plans - who starts where
//!
//! Built programmatically or from a level file, then validated once when the
//! simulation is created. A bad plan is a configuration error, never a
//! mid-game failure.

use serde::{Deserialize, Serialize};

use crate::core::error::{LunkError, Result};
use crate::core::types::{EnemyKind, Heading, Role, Vec2};
use crate::spatial::blocking::{BlockedCells, ObstacleKind};
use crate::spatial::field::Field;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnSpec {
    pub role: Role,
    pub kind: Option<EnemyKind>,
    pub position: Vec2,
    pub heading: Heading,
}

#[derive(Debug, Clone)]
pub struct SpawnPlan {
    pub spawns: Vec<SpawnSpec>,
    pub obstacles: BlockedCells,
}

impl SpawnPlan {
    pub fn new() -> Self {
        Self::with_obstacle_cell_size(1.0)
    }

    pub fn with_obstacle_cell_size(cell_size: f32) -> Self {
        Self {
            spawns: Vec::new(),
            obstacles: BlockedCells::with_cell_size(cell_size),
        }
    }

    pub fn player(mut self, position: Vec2, heading: Heading) -> Self {
        self.spawns.push(SpawnSpec {
            role: Role::Player,
            kind: None,
            position,
            heading,
        });
        self
    }

    pub fn enemy(mut self, kind: EnemyKind, position: Vec2, heading: Heading) -> Self {
        self.spawns.push(SpawnSpec {
            role: Role::Enemy,
            kind: Some(kind),
            position,
            heading,
        });
        self
    }

    pub fn target(mut self, position: Vec2, heading: Heading) -> Self {
        self.spawns.push(SpawnSpec {
            role: Role::RescueTarget,
            kind: None,
            position,
            heading,
        });
        self
    }

    pub fn obstacle(mut self, cell_x: i32, cell_y: i32, kind: ObstacleKind) -> Self {
        self.obstacles.block(cell_x, cell_y, kind);
        self
    }

    pub fn count(&self, role: Role) -> usize {
        self.spawns.iter().filter(|s| s.role == role).count()
    }

    /// Check the plan against the field before any agent exists
    pub fn validate(&self, field: &Field) -> Result<()> {
        let players = self.count(Role::Player);
        if players != 1 {
            return Err(LunkError::Configuration(format!(
                "exactly one player required, found {}",
                players
            )));
        }
        if self.count(Role::Enemy) == 0 {
            return Err(LunkError::Configuration("no enemies to spawn".into()));
        }
        if self.count(Role::RescueTarget) == 0 {
            return Err(LunkError::Configuration(
                "no rescue targets to spawn".into(),
            ));
        }

        for spec in &self.spawns {
            if !spec.position.is_finite() || !field.contains(spec.position) {
                return Err(LunkError::Configuration(format!(
                    "{:?} spawn at ({}, {}) is outside the {}x{} field",
                    spec.role, spec.position.x, spec.position.y, field.width, field.height
                )));
            }
            if let Some(obstacle) = self.obstacles.obstacle_at(spec.position) {
                return Err(LunkError::Configuration(format!(
                    "{:?} spawn at ({}, {}) is inside a {:?}",
                    spec.role, spec.position.x, spec.position.y, obstacle
                )));
            }
            if spec.role == Role::Enemy && spec.kind.is_none() {
                return Err(LunkError::Configuration(
                    "enemy spawn without a kind".into(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for SpawnPlan {
    fn default() -> Self {
        Self::new()
    }
}
