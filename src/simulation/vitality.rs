//! Score/vitality tracker - health, score, boredom, and game over
//!
//! The only owner of [`VitalitySnapshot`] state. Everything goes through
//! [`VitalityTracker::apply`]; values saturate at zero and game over is
//! reported exactly once, after which all events are ignored.

use serde::{Deserialize, Serialize};

use crate::core::config::VitalityConfig;
use crate::simulation::events::{GameOverReason, VitalityEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalitySnapshot {
    pub health: u32,
    pub high_score: u64,
    pub boredom: u32,
}

#[derive(Debug, Clone)]
pub struct VitalityTracker {
    health: u32,
    high_score: u64,
    boredom: u32,
    max_boredom: u32,
    game_over: Option<GameOverReason>,
}

fn clamp_to_u32(n: i64) -> u32 {
    n.clamp(0, u32::MAX as i64) as u32
}

impl VitalityTracker {
    pub fn new(config: &VitalityConfig) -> Self {
        Self {
            health: config.starting_health,
            high_score: 0,
            boredom: config.starting_boredom.min(config.max_boredom),
            max_boredom: config.max_boredom,
            game_over: None,
        }
    }

    pub fn snapshot(&self) -> VitalitySnapshot {
        VitalitySnapshot {
            health: self.health,
            high_score: self.high_score,
            boredom: self.boredom,
        }
    }

    pub fn game_over(&self) -> Option<GameOverReason> {
        self.game_over
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    /// Apply one event; returns the game-over reason on the event that ends the game
    pub fn apply(&mut self, event: VitalityEvent) -> Option<GameOverReason> {
        if self.game_over.is_some() {
            tracing::debug!("Ignoring {:?} after game over", event);
            return None;
        }

        match event {
            VitalityEvent::Score(n) => {
                self.high_score = if n >= 0 {
                    self.high_score.saturating_add(n as u64)
                } else {
                    self.high_score.saturating_sub(n.unsigned_abs())
                };
            }
            VitalityEvent::Health(penalty) => {
                if penalty < 0 {
                    tracing::warn!("Negative health penalty {} clamped to 0", penalty);
                }
                self.health = self.health.saturating_sub(clamp_to_u32(penalty));
                if self.health == 0 {
                    return self.finish(GameOverReason::Anger);
                }
            }
            VitalityEvent::BoredomTick => {
                self.boredom = self.boredom.saturating_sub(1);
                if self.boredom == 0 {
                    return self.finish(GameOverReason::Boredom);
                }
            }
            VitalityEvent::Boredom(delta) => {
                if delta >= 0 {
                    self.boredom = self
                        .boredom
                        .saturating_add(clamp_to_u32(delta))
                        .min(self.max_boredom);
                } else {
                    let drain = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
                    self.boredom = self.boredom.saturating_sub(drain);
                    if self.boredom == 0 {
                        return self.finish(GameOverReason::Boredom);
                    }
                }
            }
        }
        None
    }

    fn finish(&mut self, reason: GameOverReason) -> Option<GameOverReason> {
        tracing::info!(
            "Game over ({:?}) with score {}",
            reason,
            self.high_score
        );
        self.game_over = Some(reason);
        Some(reason)
    }
}

/// Converts simulated seconds into whole boredom intervals
#[derive(Debug, Clone)]
pub struct BoredomClock {
    interval: f32,
    accumulated: f32,
}

impl BoredomClock {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulated: 0.0,
        }
    }

    /// Advance by `dt` seconds; returns how many intervals elapsed
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulated += dt;
        let mut due = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            due += 1;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(health: u32, boredom: u32) -> VitalityTracker {
        VitalityTracker::new(&VitalityConfig {
            starting_health: health,
            starting_boredom: boredom,
            max_boredom: 20,
            boredom_interval_secs: 1.0,
        })
    }

    #[test]
    fn test_score_saturates_at_zero() {
        let mut t = tracker(3, 10);
        t.apply(VitalityEvent::Score(4));
        t.apply(VitalityEvent::Score(-10));
        assert_eq!(t.snapshot().high_score, 0);
        t.apply(VitalityEvent::Score(2));
        assert_eq!(t.snapshot().high_score, 2);
    }

    #[test]
    fn test_negative_health_penalty_is_clamped() {
        let mut t = tracker(3, 10);
        assert_eq!(t.apply(VitalityEvent::Health(-5)), None);
        assert_eq!(t.snapshot().health, 3);
    }

    #[test]
    fn test_anger_game_over_fires_once() {
        let mut t = tracker(2, 10);
        assert_eq!(t.apply(VitalityEvent::Health(1)), None);
        assert_eq!(t.apply(VitalityEvent::Health(5)), Some(GameOverReason::Anger));
        assert_eq!(t.snapshot().health, 0);

        // Terminal: nothing else is processed
        assert_eq!(t.apply(VitalityEvent::Health(1)), None);
        assert_eq!(t.apply(VitalityEvent::BoredomTick), None);
        t.apply(VitalityEvent::Score(9));
        assert_eq!(t.snapshot().high_score, 0);
        assert_eq!(t.game_over(), Some(GameOverReason::Anger));
    }

    #[test]
    fn test_boredom_ticks_down_to_game_over() {
        let mut t = tracker(3, 2);
        assert_eq!(t.apply(VitalityEvent::BoredomTick), None);
        assert_eq!(t.apply(VitalityEvent::BoredomTick), Some(GameOverReason::Boredom));
        assert_eq!(t.snapshot().boredom, 0);
    }

    #[test]
    fn test_boredom_refill_is_capped() {
        let mut t = tracker(3, 15);
        t.apply(VitalityEvent::Boredom(50));
        assert_eq!(t.snapshot().boredom, 20);
        assert_eq!(t.apply(VitalityEvent::Boredom(-25)), Some(GameOverReason::Boredom));
        assert_eq!(t.snapshot().boredom, 0);
    }

    #[test]
    fn test_boredom_clock_counts_whole_intervals() {
        let mut clock = BoredomClock::new(1.0);
        assert_eq!(clock.advance(0.6), 0);
        assert_eq!(clock.advance(0.6), 1);
        assert_eq!(clock.advance(2.0), 2);
    }

    #[test]
    fn test_extreme_negative_deltas_saturate() {
        let mut t = tracker(3, 10);
        t.apply(VitalityEvent::Score(7));
        assert_eq!(t.apply(VitalityEvent::Score(i64::MIN)), None);
        assert_eq!(t.snapshot().high_score, 0);

        assert_eq!(
            t.apply(VitalityEvent::Boredom(i64::MIN)),
            Some(GameOverReason::Boredom)
        );
        assert_eq!(t.snapshot().boredom, 0);
    }
}
