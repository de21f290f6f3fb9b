//! Events emitted during a simulation tick
//!
//! Returned from [`crate::simulation::Simulation::tick`] for the presentation
//! layer, in the order they happened.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Vec2};

/// The rotating outcome of Lunk touching an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionOption {
    Crush,
    Throw,
    Eat,
}

impl InteractionOption {
    pub const CYCLE: [InteractionOption; 3] = [
        InteractionOption::Crush,
        InteractionOption::Throw,
        InteractionOption::Eat,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// Health ran out
    Anger,
    /// Boredom ran out
    Boredom,
}

/// How a rescue target was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossCause {
    CaughtByEnemy,
    StruckByThrownEnemy,
}

/// Inputs to the score/vitality tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalityEvent {
    /// Signed change to the score
    Score(i64),
    /// Health penalty; negative penalties are clamped to 0
    Health(i64),
    /// One boredom interval elapsed
    BoredomTick,
    /// Signed boredom adjustment (refill on kills, drain on losses)
    Boredom(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum SimulationEvent {
    /// Lunk touched an enemy and this option was consumed
    Interaction {
        enemy: AgentId,
        option: InteractionOption,
    },
    /// A thrown enemy hit the ground and died
    EnemyLanded { enemy: AgentId, position: Vec2 },
    /// Lunk reached a lady
    TargetSaved { target: AgentId },
    /// A lady was caught or crushed by a thrown enemy
    TargetLost {
        target: AgentId,
        by: AgentId,
        cause: LossCause,
    },
    /// Lunk walked off the field and climbed back in
    PlayerFell { player: AgentId, from: Vec2, to: Vec2 },
    /// A lady is swooning next to Lunk
    Affection { target: AgentId },
    Vitality { change: VitalityEvent },
    GameOver { reason: GameOverReason },
}

impl SimulationEvent {
    pub fn vitality(change: VitalityEvent) -> Self {
        SimulationEvent::Vitality { change }
    }
}
