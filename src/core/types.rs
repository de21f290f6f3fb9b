//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Unique identifier for agents
///
/// Assigned in spawn order, so the lowest id is also the oldest agent.
/// Steering tie-breaks rely on this ordering.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display(fmt = "agent#{}", _0)]
pub struct AgentId(pub u32);

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Behaviour role of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Lunk, driven by player input
    Player,
    /// Hostile agent, resolved by crush/throw/eat
    Enemy,
    /// Pretty lady that can be rescued or lost
    RescueTarget,
}

/// Enemy species, keys the tastiness table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Skeleton,
    Zombie,
    Bat,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Skeleton, EnemyKind::Zombie, EnemyKind::Bat];
}

/// 2D position or direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::default()
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Angle of this vector in radians, `None` for a (near) zero vector
    pub fn angle(&self) -> Option<f32> {
        if self.length() > 0.0001 {
            Some(self.y.atan2(self.x))
        } else {
            None
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

/// Facing angle in radians, kept in (-PI, PI]
///
/// Headings are only ever turned incrementally through [`Heading::turn_toward`]
/// or [`Heading::rotate_clamped`], both of which bound the change per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Heading(f32);

impl Heading {
    pub fn from_radians(radians: f32) -> Self {
        Self(wrap_angle(radians))
    }

    pub fn from_degrees(degrees: f32) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    pub fn radians(&self) -> f32 {
        self.0
    }

    /// Unit vector pointing along this heading
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.0.cos(), self.0.sin())
    }

    /// Signed shortest angular difference from `self` to `other`
    pub fn delta_to(&self, other: Heading) -> f32 {
        wrap_angle(other.0 - self.0)
    }

    /// Rotate by `delta`, clamped to `max_rate` in either direction
    pub fn rotate_clamped(&self, delta: f32, max_rate: f32) -> Self {
        let delta = if delta.is_finite() { delta } else { 0.0 };
        let max_rate = max_rate.abs();
        Self::from_radians(self.0 + delta.clamp(-max_rate, max_rate))
    }

    /// Turn toward `target` by at most `max_rate`
    pub fn turn_toward(&self, target: Heading, max_rate: f32) -> Self {
        self.rotate_clamped(self.delta_to(target), max_rate)
    }
}

/// Wrap an angle into (-PI, PI]
pub fn wrap_angle(radians: f32) -> f32 {
    if !radians.is_finite() {
        return 0.0;
    }
    let mut a = radians % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_ordering() {
        assert!(AgentId(1) < AgentId(2));
        assert_eq!(AgentId::from(7), AgentId(7));
        assert_eq!(AgentId(3).to_string(), "agent#3");
    }

    #[test]
    fn test_vec2_angle() {
        let up = Vec2::new(0.0, 4.0);
        assert!((up.angle().unwrap() - PI / 2.0).abs() < 1e-5);
        assert!(Vec2::ZERO.angle().is_none());
    }

    #[test]
    fn test_wrap_angle_range() {
        for raw in [-10.0_f32, -PI, -3.0, 0.0, 3.0, PI, 7.0, 100.0] {
            let w = wrap_angle(raw);
            assert!(w > -PI - 1e-5 && w <= PI + 1e-5, "{} wrapped to {}", raw, w);
        }
    }

    #[test]
    fn test_turn_toward_is_bounded() {
        let h = Heading::from_radians(0.0);
        let target = Heading::from_radians(PI / 2.0);
        let turned = h.turn_toward(target, 0.1);
        assert!((turned.radians() - 0.1).abs() < 1e-6);

        // Short way round across the -PI/PI seam
        let h = Heading::from_radians(PI - 0.05);
        let turned = h.turn_toward(Heading::from_radians(-PI + 0.05), 1.0);
        assert!(h.delta_to(turned).abs() <= 0.1 + 1e-5);
    }

    #[test]
    fn test_rotate_clamped_ignores_nan() {
        let h = Heading::from_radians(1.0);
        assert_eq!(h.rotate_clamped(f32::NAN, 0.5), h);
    }
}
