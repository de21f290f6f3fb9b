pub mod agent;

pub use agent::{hitboxes_overlap, Agent, AgentState, Engagement, LifeState, SpeedMode};
