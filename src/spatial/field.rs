//! Bounded play field with a "fall off the edge" boundary
//!
//! There is no wraparound. Agents that step outside [0, W) x [0, H) have
//! fallen; the field picks where they climb back in. Randomness is always
//! supplied by the caller so tests can pin it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::FieldConfig;
use crate::core::types::Vec2;

/// Keeps clipped coordinates strictly below the upper bound
const EDGE_EPSILON: f32 = 1e-3;

/// Result of checking a position against the field bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FallOutcome {
    /// Position is on the field
    Inside(Vec2),
    /// Position left the field; `to` is the re-entry point
    Fell { from: Vec2, to: Vec2 },
}

impl FallOutcome {
    pub fn position(&self) -> Vec2 {
        match self {
            FallOutcome::Inside(p) => *p,
            FallOutcome::Fell { to, .. } => *to,
        }
    }

    pub fn fell(&self) -> bool {
        matches!(self, FallOutcome::Fell { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    /// Half side of the square re-entry region
    pub fall_half_extent: f32,
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            fall_half_extent: 5.0,
        }
    }

    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            fall_half_extent: config.fall_region_half_extent,
        }
    }

    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x < self.width && pos.y >= 0.0 && pos.y < self.height
    }

    /// Nearest on-field point to `pos`
    pub fn clamp_inside(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            clamp_axis(pos.x, self.width),
            clamp_axis(pos.y, self.height),
        )
    }

    /// Inclusive-exclusive bounds of the re-entry region for a fall at `fall`
    pub fn reentry_region(&self, fall: Vec2) -> (Vec2, Vec2) {
        let h = self.fall_half_extent;
        let min = Vec2::new(
            (fall.x - h).max(0.0).min(self.width),
            (fall.y - h).max(0.0).min(self.height),
        );
        let max = Vec2::new(
            (fall.x + h).min(self.width).max(0.0),
            (fall.y + h).min(self.height).max(0.0),
        );
        (min, max)
    }

    /// Sample a re-entry point uniformly inside the clipped region around `fall`
    pub fn reentry_point<R: Rng + ?Sized>(&self, fall: Vec2, rng: &mut R) -> Vec2 {
        let (min, max) = self.reentry_region(fall);
        let x = sample_axis(min.x, max.x, rng);
        let y = sample_axis(min.y, max.y, rng);
        self.clamp_inside(Vec2::new(x, y))
    }

    /// Centre of the clipped re-entry region, used when sampling keeps failing
    pub fn reentry_fallback(&self, fall: Vec2) -> Vec2 {
        let (min, max) = self.reentry_region(fall);
        self.clamp_inside((min + max) * 0.5)
    }

    /// Keep `pos` if it is on the field, otherwise pick a re-entry point
    pub fn resolve_fall<R: Rng + ?Sized>(&self, pos: Vec2, rng: &mut R) -> FallOutcome {
        if self.contains(pos) {
            FallOutcome::Inside(pos)
        } else {
            FallOutcome::Fell {
                from: pos,
                to: self.reentry_point(pos, rng),
            }
        }
    }
}

fn clamp_axis(v: f32, upper: f32) -> f32 {
    if !v.is_finite() {
        return 0.0;
    }
    v.max(0.0).min((upper - EDGE_EPSILON).max(0.0))
}

fn sample_axis<R: Rng + ?Sized>(lo: f32, hi: f32, rng: &mut R) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}
