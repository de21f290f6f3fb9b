//! Agents: Lunk, enemies, and rescue targets
//!
//! Agents are independent; none owns another. The only shared thing they
//! reference is the field, through the simulation.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, EnemyKind, Heading, Role, Vec2};

/// Life cycle of an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum LifeState {
    Alive,
    /// Thrown enemy in flight; always resolves to `Dead`
    Airborne {
        direction: Vec2,
        ticks_left: u32,
        struck_target: bool,
    },
    /// Enemy crushed, eaten, or landed
    Dead,
    /// Rescue target reached by Lunk
    Saved,
    /// Rescue target caught by an enemy or hit by a thrown one
    Lost,
}

/// Whether an enemy is reacting to someone or just wandering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    #[default]
    Wandering,
    Engaged,
}

/// Speed band chosen by a steering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedMode {
    Stop,
    Walk,
    Run,
    /// Lunk's constant forward pace
    Forward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub role: Role,
    /// Only set for enemies
    pub kind: Option<EnemyKind>,
    pub position: Vec2,
    pub heading: Heading,
    /// Current speed in units per second
    pub speed: f32,
    pub life: LifeState,
    pub engagement: Engagement,
}

impl Agent {
    pub fn new(id: AgentId, role: Role, position: Vec2, heading: Heading) -> Self {
        Self {
            id,
            role,
            kind: None,
            position,
            heading,
            speed: 0.0,
            life: LifeState::Alive,
            engagement: Engagement::Wandering,
        }
    }

    pub fn enemy(id: AgentId, kind: EnemyKind, position: Vec2, heading: Heading) -> Self {
        Self {
            kind: Some(kind),
            ..Self::new(id, Role::Enemy, position, heading)
        }
    }

    /// Alive or airborne; airborne enemies still occupy the field until they land
    pub fn is_alive(&self) -> bool {
        matches!(self.life, LifeState::Alive | LifeState::Airborne { .. })
    }

    /// Alive and on its feet: eligible for steering and interactions
    pub fn is_active(&self) -> bool {
        matches!(self.life, LifeState::Alive)
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self.life, LifeState::Airborne { .. })
    }

    pub fn snapshot(&self) -> AgentState {
        AgentState {
            id: self.id,
            role: self.role,
            kind: self.kind,
            position: self.position,
            heading: self.heading.radians(),
            speed: self.speed,
            alive: self.is_alive(),
            life: self.life,
            engagement: self.engagement,
        }
    }
}

/// Read-only per-tick view of an agent handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: AgentId,
    pub role: Role,
    pub kind: Option<EnemyKind>,
    pub position: Vec2,
    /// Heading in radians
    pub heading: f32,
    pub speed: f32,
    pub alive: bool,
    pub life: LifeState,
    pub engagement: Engagement,
}

/// Axis-aligned square hit-box test
#[inline]
pub fn hitboxes_overlap(a: Vec2, b: Vec2, half_extent: f32) -> bool {
    let reach = half_extent * 2.0;
    (a.x - b.x).abs() < reach && (a.y - b.y).abs() < reach
}
