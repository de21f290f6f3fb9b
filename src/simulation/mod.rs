//! Simulation systems - steering, interactions, vitality, and the tick loop

pub mod events;
pub mod interaction;
pub mod proximity;
pub mod spawn;
pub mod steering;
pub mod tick;
pub mod vitality;

pub use events::{GameOverReason, InteractionOption, LossCause, SimulationEvent, VitalityEvent};
pub use interaction::{resolve_interactions, InteractionCycle};
pub use proximity::{Neighbor, ProximityIndex};
pub use spawn::{SpawnPlan, SpawnSpec};
pub use steering::{
    decide, EnemyRule, Perception, SteeringDecision, SteeringIntent, SteeringRule, TargetRule,
    TurnCommand,
};
pub use tick::{Simulation, TickReport};
pub use vitality::{BoredomClock, VitalitySnapshot, VitalityTracker};
