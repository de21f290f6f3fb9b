//! Lunk - steering-behaviour simulation core
//!
//! A top-down arena where the player (Lunk) walks forward constantly and can
//! only turn, enemies hunt the ladies, and ladies follow Lunk once Lunk is
//! close. The crate owns the deterministic tick; drawing and input capture
//! are left to whoever drives [`simulation::Simulation`].

pub mod core;
pub mod entity;
pub mod level;
pub mod simulation;
pub mod spatial;
pub mod storage;
