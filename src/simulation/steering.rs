//! Steering policies - what each role wants to do this tick
//!
//! Every policy is a pure function of the agent and its [`Perception`]
//! (built from the start-of-tick snapshot). Rules are evaluated in a fixed
//! priority order and the first match wins, so exactly one rule fires per
//! agent per tick. Randomness (wander jitter) is drawn by the caller and
//! passed in, which keeps these functions deterministic and parallel-safe.

use serde::{Deserialize, Serialize};

use crate::core::config::{MovementConfig, SteeringConfig};
use crate::core::types::{AgentId, Heading, Role, Vec2};
use crate::entity::{Agent, SpeedMode};
use crate::simulation::proximity::{Neighbor, ProximityIndex};

/// Player turn input for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnCommand {
    Left,
    Right,
    #[default]
    None,
}

impl TurnCommand {
    /// Parse user input, treating anything unrecognised as `None`
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => TurnCommand::Left,
            "r" | "right" => TurnCommand::Right,
            "n" | "none" | "" => TurnCommand::None,
            other => {
                tracing::warn!("Malformed turn input {:?}, treating as none", other);
                TurnCommand::None
            }
        }
    }

    /// Map a -1/0/+1 axis reading, treating anything else as `None`
    pub fn from_axis(axis: i32) -> Self {
        match axis {
            -1 => TurnCommand::Left,
            0 => TurnCommand::None,
            1 => TurnCommand::Right,
            other => {
                tracing::warn!("Turn axis {} out of range, treating as none", other);
                TurnCommand::None
            }
        }
    }

    /// Signed heading change for this command at `rate` radians per tick
    pub fn delta(&self, rate: f32) -> f32 {
        match self {
            TurnCommand::Left => -rate,
            TurnCommand::Right => rate,
            TurnCommand::None => 0.0,
        }
    }
}

/// Enemy rules in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyRule {
    /// Path blocked by an obstacle or the field edge: turn on the player
    Blocked,
    /// Lunk is near and so is a lady: charge Lunk
    ChargePlayer,
    /// Lunk is near and no lady to fight for: back off
    FleePlayer,
    /// Lady very close: run at her
    RunToTarget,
    /// Lady in sight: walk toward her
    WalkToTarget,
    Wander,
}

/// Rescue-target rules in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRule {
    /// Lunk is right here: stand still and emit affection
    Swoon,
    FollowPlayer,
    FleeEnemy,
    Wander,
}

/// The single rule that fired for an agent this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role", content = "rule")]
pub enum SteeringRule {
    PlayerInput,
    Enemy(EnemyRule),
    Target(TargetRule),
}

impl SteeringRule {
    pub fn is_wander(&self) -> bool {
        matches!(
            self,
            SteeringRule::Enemy(EnemyRule::Wander) | SteeringRule::Target(TargetRule::Wander)
        )
    }
}

/// How the heading should change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SteeringIntent {
    /// Rotate by a signed amount (player input)
    Turn(f32),
    /// Turn toward a direction vector; zero vectors keep the heading
    Face(Vec2),
    /// Perturb the current heading by a small random amount
    Wander(f32),
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringDecision {
    pub agent: AgentId,
    pub rule: SteeringRule,
    pub intent: SteeringIntent,
    pub speed: SpeedMode,
}

impl SteeringDecision {
    /// Rescue target swooning at Lunk this tick
    pub fn emits_affection(&self) -> bool {
        self.rule == SteeringRule::Target(TargetRule::Swoon)
    }

    /// New heading after applying the intent, bounded by `max_rate`
    pub fn apply_heading(&self, current: Heading, max_rate: f32) -> Heading {
        match self.intent {
            SteeringIntent::Turn(delta) => current.rotate_clamped(delta, max_rate),
            SteeringIntent::Wander(jitter) => current.rotate_clamped(jitter, max_rate),
            SteeringIntent::Face(direction) => match direction.angle() {
                Some(angle) => current.turn_toward(Heading::from_radians(angle), max_rate),
                None => current,
            },
            SteeringIntent::Keep => current,
        }
    }
}

/// Speed in units per second for a speed band
pub fn speed_for(mode: SpeedMode, movement: &MovementConfig) -> f32 {
    match mode {
        SpeedMode::Stop => 0.0,
        SpeedMode::Walk => movement.walk_speed,
        SpeedMode::Run => movement.run_speed,
        SpeedMode::Forward => movement.player_speed,
    }
}

/// What an agent sees at the start of the tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Perception {
    /// Next step would leave the field or enter an obstacle
    pub blocked: bool,
    /// Nearest player anywhere on the field
    pub nearest_player: Option<Neighbor>,
    /// Nearest enemy within the largest enemy-related radius
    pub nearest_enemy: Option<Neighbor>,
    /// Nearest rescue target within the largest target-related radius
    pub nearest_target: Option<Neighbor>,
    /// Pre-drawn wander perturbation in radians
    pub wander_jitter: f32,
}

impl Perception {
    /// Query the proximity index for everything `agent`'s policy needs
    pub fn gather(
        index: &ProximityIndex,
        agent: &Agent,
        steering: &SteeringConfig,
        blocked: bool,
        wander_jitter: f32,
    ) -> Self {
        let target_radius = steering.enemy_guard_range.max(steering.enemy_hunt_walk_range);
        let (enemy_radius, target_radius) = match agent.role {
            Role::Player => (None, None),
            Role::Enemy => (None, Some(target_radius)),
            Role::RescueTarget => (Some(steering.target_flee_range), None),
        };

        Self {
            blocked,
            nearest_player: index.nearest(Role::Player, agent.position, None, agent.id),
            nearest_enemy: enemy_radius
                .and_then(|r| index.nearest(Role::Enemy, agent.position, Some(r), agent.id)),
            nearest_target: target_radius.and_then(|r| {
                index.nearest(Role::RescueTarget, agent.position, Some(r), agent.id)
            }),
            wander_jitter,
        }
    }
}

fn within(n: Option<Neighbor>, range: f32) -> Option<Neighbor> {
    n.filter(|n| n.distance <= range)
}

fn toward(from: Vec2, n: &Neighbor) -> Vec2 {
    (n.position - from).normalize()
}

fn away(from: Vec2, n: &Neighbor) -> Vec2 {
    (from - n.position).normalize()
}

/// Lunk: turn by input, always walk forward
pub fn decide_player(agent: &Agent, input: TurnCommand, turn_rate: f32) -> SteeringDecision {
    SteeringDecision {
        agent: agent.id,
        rule: SteeringRule::PlayerInput,
        intent: SteeringIntent::Turn(input.delta(turn_rate)),
        speed: SpeedMode::Forward,
    }
}

/// Enemy priority rules
pub fn decide_enemy(agent: &Agent, p: &Perception, cfg: &SteeringConfig) -> SteeringDecision {
    let here = agent.position;
    let player_near = within(p.nearest_player, cfg.enemy_player_range);
    let target_guarded = within(p.nearest_target, cfg.enemy_guard_range);

    let (rule, intent, speed) = if p.blocked {
        let intent = p
            .nearest_player
            .map(|n| SteeringIntent::Face(toward(here, &n)))
            .unwrap_or(SteeringIntent::Keep);
        (EnemyRule::Blocked, intent, SpeedMode::Walk)
    } else if let (Some(player), Some(_)) = (player_near, target_guarded) {
        (
            EnemyRule::ChargePlayer,
            SteeringIntent::Face(toward(here, &player)),
            SpeedMode::Run,
        )
    } else if let Some(player) = player_near {
        (
            EnemyRule::FleePlayer,
            SteeringIntent::Face(away(here, &player)),
            SpeedMode::Walk,
        )
    } else if let Some(target) = within(p.nearest_target, cfg.enemy_hunt_run_range) {
        (
            EnemyRule::RunToTarget,
            SteeringIntent::Face(toward(here, &target)),
            SpeedMode::Run,
        )
    } else if let Some(target) = within(p.nearest_target, cfg.enemy_hunt_walk_range) {
        (
            EnemyRule::WalkToTarget,
            SteeringIntent::Face(toward(here, &target)),
            SpeedMode::Walk,
        )
    } else {
        (
            EnemyRule::Wander,
            SteeringIntent::Wander(p.wander_jitter),
            SpeedMode::Walk,
        )
    };

    SteeringDecision {
        agent: agent.id,
        rule: SteeringRule::Enemy(rule),
        intent,
        speed,
    }
}

/// Rescue-target priority rules
pub fn decide_target(agent: &Agent, p: &Perception, cfg: &SteeringConfig) -> SteeringDecision {
    let here = agent.position;

    let (rule, intent, speed) =
        if within(p.nearest_player, cfg.target_affection_range).is_some() {
            (TargetRule::Swoon, SteeringIntent::Keep, SpeedMode::Stop)
        } else if let Some(player) = within(p.nearest_player, cfg.target_follow_range) {
            (
                TargetRule::FollowPlayer,
                SteeringIntent::Face(toward(here, &player)),
                SpeedMode::Walk,
            )
        } else if let Some(enemy) = within(p.nearest_enemy, cfg.target_flee_range) {
            // No player within follow range is implied by the branch above
            (
                TargetRule::FleeEnemy,
                SteeringIntent::Face(away(here, &enemy)),
                SpeedMode::Walk,
            )
        } else {
            (
                TargetRule::Wander,
                SteeringIntent::Wander(p.wander_jitter),
                SpeedMode::Walk,
            )
        };

    SteeringDecision {
        agent: agent.id,
        rule: SteeringRule::Target(rule),
        intent,
        speed,
    }
}

/// Dispatch on role
pub fn decide(
    agent: &Agent,
    perception: &Perception,
    steering: &SteeringConfig,
    input: TurnCommand,
    player_turn_rate: f32,
) -> SteeringDecision {
    match agent.role {
        Role::Player => decide_player(agent, input, player_turn_rate),
        Role::Enemy => decide_enemy(agent, perception, steering),
        Role::RescueTarget => decide_target(agent, perception, steering),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EnemyKind;
    use std::f32::consts::PI;

    fn neighbor(id: u32, x: f32, y: f32, from: Vec2) -> Neighbor {
        let position = Vec2::new(x, y);
        Neighbor {
            id: AgentId(id),
            position,
            distance: from.distance(&position),
        }
    }

    fn enemy_at(x: f32, y: f32) -> Agent {
        Agent::enemy(AgentId(1), EnemyKind::Skeleton, Vec2::new(x, y), Heading::default())
    }

    #[test]
    fn test_enemy_flees_nearby_player_without_target() {
        let enemy = enemy_at(5.0, 9.0);
        let p = Perception {
            nearest_player: Some(neighbor(0, 5.0, 5.0, enemy.position)),
            ..Default::default()
        };

        let d = decide_enemy(&enemy, &p, &SteeringConfig::default());
        assert_eq!(d.rule, SteeringRule::Enemy(EnemyRule::FleePlayer));
        assert_eq!(d.speed, SpeedMode::Walk);
        match d.intent {
            SteeringIntent::Face(dir) => {
                assert!(dir.x.abs() < 1e-6);
                assert!((dir.y - 1.0).abs() < 1e-6, "should face +y, away from player");
            }
            other => panic!("unexpected intent {:?}", other),
        }
    }

    #[test]
    fn test_enemy_charges_player_when_guarding_target() {
        let enemy = enemy_at(10.0, 10.0);
        let p = Perception {
            nearest_player: Some(neighbor(0, 13.0, 10.0, enemy.position)),
            nearest_target: Some(neighbor(5, 10.0, 12.0, enemy.position)),
            ..Default::default()
        };
        let d = decide_enemy(&enemy, &p, &SteeringConfig::default());
        assert_eq!(d.rule, SteeringRule::Enemy(EnemyRule::ChargePlayer));
        assert_eq!(d.speed, SpeedMode::Run);
        assert_eq!(d.intent, SteeringIntent::Face(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_blocked_outranks_everything() {
        let enemy = enemy_at(10.0, 10.0);
        let p = Perception {
            blocked: true,
            nearest_player: Some(neighbor(0, 40.0, 10.0, enemy.position)),
            nearest_target: Some(neighbor(5, 11.0, 10.0, enemy.position)),
            ..Default::default()
        };
        let d = decide_enemy(&enemy, &p, &SteeringConfig::default());
        assert_eq!(d.rule, SteeringRule::Enemy(EnemyRule::Blocked));
        assert_eq!(d.intent, SteeringIntent::Face(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_enemy_hunt_bands() {
        let enemy = enemy_at(0.0, 0.0);
        let cfg = SteeringConfig::default();

        let close = Perception {
            nearest_target: Some(neighbor(5, 3.0, 0.0, enemy.position)),
            ..Default::default()
        };
        let d = decide_enemy(&enemy, &close, &cfg);
        assert_eq!(d.rule, SteeringRule::Enemy(EnemyRule::RunToTarget));
        assert_eq!(d.speed, SpeedMode::Run);

        let far = Perception {
            nearest_target: Some(neighbor(5, 8.0, 0.0, enemy.position)),
            ..Default::default()
        };
        let d = decide_enemy(&enemy, &far, &cfg);
        assert_eq!(d.rule, SteeringRule::Enemy(EnemyRule::WalkToTarget));
        assert_eq!(d.speed, SpeedMode::Walk);

        let gone = Perception {
            nearest_target: Some(neighbor(5, 30.0, 0.0, enemy.position)),
            wander_jitter: 0.05,
            ..Default::default()
        };
        let d = decide_enemy(&enemy, &gone, &cfg);
        assert_eq!(d.rule, SteeringRule::Enemy(EnemyRule::Wander));
        assert_eq!(d.intent, SteeringIntent::Wander(0.05));
    }

    #[test]
    fn test_target_swoons_next_to_player() {
        let lady = Agent::new(AgentId(3), Role::RescueTarget, Vec2::ZERO, Heading::default());
        let p = Perception {
            nearest_player: Some(neighbor(0, 3.0, 0.0, lady.position)),
            ..Default::default()
        };
        let d = decide_target(&lady, &p, &SteeringConfig::default());
        assert_eq!(d.rule, SteeringRule::Target(TargetRule::Swoon));
        assert_eq!(d.speed, SpeedMode::Stop);
        assert!(d.emits_affection());
    }

    #[test]
    fn test_target_follow_beats_flee() {
        let lady = Agent::new(AgentId(3), Role::RescueTarget, Vec2::ZERO, Heading::default());
        let p = Perception {
            nearest_player: Some(neighbor(0, 10.0, 0.0, lady.position)),
            nearest_enemy: Some(neighbor(1, 0.0, 2.0, lady.position)),
            ..Default::default()
        };
        let d = decide_target(&lady, &p, &SteeringConfig::default());
        assert_eq!(d.rule, SteeringRule::Target(TargetRule::FollowPlayer));

        let p = Perception {
            nearest_player: Some(neighbor(0, 50.0, 0.0, lady.position)),
            ..p
        };
        let d = decide_target(&lady, &p, &SteeringConfig::default());
        assert_eq!(d.rule, SteeringRule::Target(TargetRule::FleeEnemy));
        assert_eq!(d.intent, SteeringIntent::Face(Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn test_player_turn_is_clamped() {
        let lunk = Agent::new(AgentId(0), Role::Player, Vec2::ZERO, Heading::default());
        let rate = 5.0_f32.to_radians();
        let d = decide_player(&lunk, TurnCommand::Right, rate);
        let next = d.apply_heading(lunk.heading, rate);
        assert!((next.radians() - rate).abs() < 1e-6);

        // Even an oversized delta cannot exceed the rate
        let big = SteeringDecision {
            intent: SteeringIntent::Turn(PI),
            ..d
        };
        let next = big.apply_heading(lunk.heading, rate);
        assert!((next.radians() - rate).abs() < 1e-6);
    }

    #[test]
    fn test_lenient_turn_parsing() {
        assert_eq!(TurnCommand::parse_lenient("L"), TurnCommand::Left);
        assert_eq!(TurnCommand::parse_lenient(" right "), TurnCommand::Right);
        assert_eq!(TurnCommand::parse_lenient("jump"), TurnCommand::None);
        assert_eq!(TurnCommand::from_axis(1), TurnCommand::Right);
        assert_eq!(TurnCommand::from_axis(7), TurnCommand::None);
    }

    #[test]
    fn test_face_zero_vector_keeps_heading() {
        let d = SteeringDecision {
            agent: AgentId(1),
            rule: SteeringRule::Enemy(EnemyRule::Blocked),
            intent: SteeringIntent::Face(Vec2::ZERO),
            speed: SpeedMode::Walk,
        };
        let h = Heading::from_radians(0.7);
        assert_eq!(d.apply_heading(h, 1.0), h);
    }
}
