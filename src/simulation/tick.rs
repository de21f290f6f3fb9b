//! Tick system - orchestrates simulation updates
//!
//! Each tick runs, strictly in this order:
//! proximity rebuild -> steering decisions -> movement (with falls) ->
//! interactions -> boredom clock -> vitality -> terminal check.
//!
//! Decisions are computed from the start-of-tick snapshot only; no agent sees
//! another agent's already-moved position. All randomness comes from one
//! seeded ChaCha8 generator and is drawn sequentially in agent-id order, so
//! two runs with the same seed and inputs are identical. Uses rayon for the
//! decision phase when there are enough agents to be worth it.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{AgentId, Role, Tick, Vec2};
use crate::entity::{Agent, AgentState, Engagement};
use crate::level::Level;
use crate::simulation::events::{GameOverReason, InteractionOption, SimulationEvent, VitalityEvent};
use crate::simulation::interaction::{resolve_interactions, InteractionCycle};
use crate::simulation::proximity::ProximityIndex;
use crate::simulation::spawn::SpawnPlan;
use crate::simulation::steering::{
    decide, speed_for, Perception, SteeringDecision, TurnCommand,
};
use crate::simulation::vitality::{BoredomClock, VitalitySnapshot, VitalityTracker};
use crate::spatial::blocking::BlockedCells;
use crate::spatial::field::{FallOutcome, Field};

/// Re-entry samples tried before falling back to the region centre
pub const FALL_RESAMPLE_ATTEMPTS: usize = 8;

/// Everything the presentation layer needs after one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number that was just simulated
    pub tick: Tick,
    pub agents: Vec<AgentState>,
    pub events: Vec<SimulationEvent>,
    /// One decision per steered agent, in id order
    pub decisions: Vec<SteeringDecision>,
    pub game_over: Option<GameOverReason>,
}

pub struct Simulation {
    config: GameConfig,
    field: Field,
    obstacles: BlockedCells,
    agents: Vec<Agent>,
    index: ProximityIndex,
    cycle: InteractionCycle,
    vitality: VitalityTracker,
    boredom_clock: BoredomClock,
    rng: ChaCha8Rng,
    seed: u64,
    current_tick: Tick,
}

impl Simulation {
    /// Validate config and spawns, then place every agent
    pub fn new(config: GameConfig, plan: SpawnPlan, seed: u64) -> Result<Self> {
        config.validate()?;
        let field = Field::from_config(&config.field);
        plan.validate(&field)?;

        let agents: Vec<Agent> = plan
            .spawns
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let id = AgentId(i as u32);
                match spec.kind {
                    Some(kind) if spec.role == Role::Enemy => {
                        Agent::enemy(id, kind, spec.position, spec.heading)
                    }
                    _ => Agent::new(id, spec.role, spec.position, spec.heading),
                }
            })
            .collect();

        tracing::info!(
            "Simulation created: {} agents on {}x{} field, {} obstacle cells, seed {}",
            agents.len(),
            field.width,
            field.height,
            plan.obstacles.len(),
            seed
        );

        Ok(Self {
            index: ProximityIndex::new(config.grid_cell_size),
            vitality: VitalityTracker::new(&config.vitality),
            boredom_clock: BoredomClock::new(config.vitality.boredom_interval_secs),
            obstacles: plan.obstacles,
            cycle: InteractionCycle::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            current_tick: 0,
            field,
            agents,
            config,
        })
    }

    /// Start a level with its own config overrides
    pub fn from_level(level: &Level, seed: u64) -> Result<Self> {
        tracing::info!("Starting level '{}'", level.name);
        Self::new(level.config.clone(), level.spawn_plan(), seed)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn obstacles(&self) -> &BlockedCells {
        &self.obstacles
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of ticks simulated so far
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn current_vitality(&self) -> VitalitySnapshot {
        self.vitality.snapshot()
    }

    /// What the next player-enemy contact will do
    pub fn current_interaction_option(&self) -> InteractionOption {
        self.cycle.current()
    }

    pub fn game_over(&self) -> Option<GameOverReason> {
        self.vitality.game_over()
    }

    pub fn is_over(&self) -> bool {
        self.vitality.is_over()
    }

    pub fn snapshots(&self) -> Vec<AgentState> {
        self.agents.iter().map(Agent::snapshot).collect()
    }

    fn sanitize_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            tracing::warn!(
                "Invalid dt {}, using nominal tick of {}s",
                dt,
                self.config.tick_seconds
            );
            self.config.tick_seconds
        } else if dt > self.config.max_dt {
            tracing::debug!("dt {} clamped to {}", dt, self.config.max_dt);
            self.config.max_dt
        } else {
            dt
        }
    }

    /// Advance the simulation by one tick
    ///
    /// Vitality changes are applied in event order. The change that ends the
    /// game is followed directly by `GameOver`; world events later in the
    /// same tick are still reported but their vitality changes are dropped.
    ///
    /// After game over the world is frozen: the report repeats the last
    /// simulated tick number with the final snapshots and no events.
    pub fn tick(&mut self, input: TurnCommand, dt: f32) -> TickReport {
        if let Some(reason) = self.vitality.game_over() {
            tracing::debug!("Tick requested after game over ({:?}), ignoring", reason);
            return TickReport {
                tick: self.current_tick.saturating_sub(1),
                agents: self.snapshots(),
                events: Vec::new(),
                decisions: Vec::new(),
                game_over: Some(reason),
            };
        }

        let dt = self.sanitize_dt(dt);
        let tick = self.current_tick;

        self.index.rebuild(tick, &self.agents);
        let jitter = self.draw_wander_jitter();
        let blocked = self.steps_blocked(dt);
        let decisions = self.decide_all(input, &jitter, &blocked);
        self.index.invalidate();

        let mut raw_events = Vec::new();
        self.apply_movement(&decisions, dt, &mut raw_events);

        raw_events.extend(resolve_interactions(
            &mut self.agents,
            &self.field,
            &mut self.cycle,
            &self.config.interaction,
        ));

        for _ in 0..self.boredom_clock.advance(dt) {
            raw_events.push(SimulationEvent::vitality(VitalityEvent::BoredomTick));
        }

        let events = self.apply_vitality(raw_events);
        self.current_tick += 1;

        TickReport {
            tick,
            agents: self.snapshots(),
            events,
            decisions,
            game_over: self.vitality.game_over(),
        }
    }

    /// One jitter per active non-player agent, drawn in id order
    fn draw_wander_jitter(&mut self) -> Vec<f32> {
        let spread = self.config.steering.wander_jitter;
        let rng = &mut self.rng;
        self.agents
            .iter()
            .map(|a| {
                if a.role == Role::Player || !a.is_active() || spread <= 0.0 {
                    0.0
                } else {
                    rng.gen_range(-spread..=spread)
                }
            })
            .collect()
    }

    /// Would the agent's next step hit the field edge or an obstacle?
    fn steps_blocked(&self, dt: f32) -> Vec<bool> {
        let reach_min = self.config.interaction.hitbox_half_extent;
        let walk = self.config.movement.walk_speed;
        self.agents
            .iter()
            .map(|a| {
                if !a.is_active() {
                    return false;
                }
                let reach = reach_min + a.speed.max(walk) * dt;
                let ahead = a.position + a.heading.direction() * reach;
                !self.field.contains(ahead) || self.obstacles.is_position_blocked(ahead)
            })
            .collect()
    }

    fn decide_all(
        &self,
        input: TurnCommand,
        jitter: &[f32],
        blocked: &[bool],
    ) -> Vec<SteeringDecision> {
        let steering = &self.config.steering;
        let player_rate = self.config.movement.player_turn_rate();
        let index = &self.index;

        let decide_one = |(i, agent): (usize, &Agent)| -> Option<SteeringDecision> {
            if !agent.is_active() {
                return None;
            }
            let perception = if agent.role == Role::Player {
                Perception::default()
            } else {
                Perception::gather(index, agent, steering, blocked[i], jitter[i])
            };
            Some(decide(agent, &perception, steering, input, player_rate))
        };

        let active = self.agents.iter().filter(|a| a.is_active()).count();
        if active >= self.config.parallel_threshold {
            self.agents
                .par_iter()
                .enumerate()
                .filter_map(|pair| decide_one(pair))
                .collect()
        } else {
            self.agents
                .iter()
                .enumerate()
                .filter_map(|pair| decide_one(pair))
                .collect()
        }
    }

    fn apply_movement(
        &mut self,
        decisions: &[SteeringDecision],
        dt: f32,
        events: &mut Vec<SimulationEvent>,
    ) {
        let player_rate = self.config.movement.player_turn_rate();
        let agent_rate = self.config.movement.agent_turn_rate();

        for decision in decisions {
            let Some(i) = self.agents.iter().position(|a| a.id == decision.agent) else {
                continue;
            };

            let role = self.agents[i].role;
            let rate = if role == Role::Player {
                player_rate
            } else {
                agent_rate
            };
            let heading = decision.apply_heading(self.agents[i].heading, rate);
            let speed = speed_for(decision.speed, &self.config.movement);
            let from = self.agents[i].position;
            let next = from + heading.direction() * (speed * dt);

            let position = if role == Role::Player {
                self.move_player(decision.agent, from, next, events)
            } else if self.field.contains(next) && !self.obstacles.is_position_blocked(next) {
                next
            } else {
                from
            };

            let agent = &mut self.agents[i];
            agent.heading = heading;
            agent.speed = speed;
            agent.position = position;
            if role != Role::Player {
                agent.engagement = if decision.rule.is_wander() {
                    Engagement::Wandering
                } else {
                    Engagement::Engaged
                };
            }

            if decision.emits_affection() {
                events.push(SimulationEvent::Affection {
                    target: decision.agent,
                });
            }
        }
    }

    fn move_player(
        &mut self,
        player: AgentId,
        from: Vec2,
        next: Vec2,
        events: &mut Vec<SimulationEvent>,
    ) -> Vec2 {
        if self.field.contains(next) && self.obstacles.is_position_blocked(next) {
            return from;
        }

        match self.field.resolve_fall(next, &mut self.rng) {
            FallOutcome::Inside(p) => p,
            FallOutcome::Fell { from: fell_at, to } => {
                let to = self.clear_reentry(fell_at, to);
                tracing::debug!(
                    "{} fell off at ({:.2}, {:.2}), back at ({:.2}, {:.2})",
                    player,
                    fell_at.x,
                    fell_at.y,
                    to.x,
                    to.y
                );
                events.push(SimulationEvent::PlayerFell {
                    player,
                    from: fell_at,
                    to,
                });
                to
            }
        }
    }

    /// Re-sample a re-entry point that landed inside an obstacle
    fn clear_reentry(&mut self, fell_at: Vec2, first: Vec2) -> Vec2 {
        let mut candidate = first;
        for _ in 0..FALL_RESAMPLE_ATTEMPTS {
            if !self.obstacles.is_position_blocked(candidate) {
                return candidate;
            }
            candidate = self.field.reentry_point(fell_at, &mut self.rng);
        }
        if self.obstacles.is_position_blocked(candidate) {
            self.field.reentry_fallback(fell_at)
        } else {
            candidate
        }
    }

    /// Feed vitality changes to the tracker and stop reporting them at game over
    fn apply_vitality(&mut self, raw: Vec<SimulationEvent>) -> Vec<SimulationEvent> {
        let mut events = Vec::with_capacity(raw.len() + 1);
        for event in raw {
            match event {
                SimulationEvent::Vitality { change } => {
                    if self.vitality.is_over() {
                        continue;
                    }
                    let ended = self.vitality.apply(change);
                    events.push(event);
                    if let Some(reason) = ended {
                        events.push(SimulationEvent::GameOver { reason });
                    }
                }
                other => events.push(other),
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EnemyKind, Heading};
    use crate::simulation::steering::{EnemyRule, SteeringRule, TargetRule};
    use crate::spatial::blocking::ObstacleKind;

    const DT: f32 = 1.0 / 60.0;

    fn basic_plan() -> SpawnPlan {
        SpawnPlan::new()
            .player(Vec2::new(50.0, 50.0), Heading::default())
            .enemy(EnemyKind::Skeleton, Vec2::new(80.0, 80.0), Heading::default())
            .target(Vec2::new(20.0, 80.0), Heading::default())
    }

    #[test]
    fn test_tick_advances_counter_and_moves_player() {
        let mut sim = Simulation::new(GameConfig::default(), basic_plan(), 1).unwrap();
        let report = sim.tick(TurnCommand::None, DT);

        assert_eq!(report.tick, 0);
        assert_eq!(sim.current_tick(), 1);
        let lunk = &report.agents[0];
        assert!((lunk.position.x - (50.0 + 6.0 * DT)).abs() < 1e-4);
        assert_eq!(report.decisions.len(), 3);
    }

    #[test]
    fn test_enemy_backs_away_from_player() {
        let plan = SpawnPlan::new()
            .player(Vec2::new(5.0, 5.0), Heading::default())
            .enemy(EnemyKind::Skeleton, Vec2::new(5.0, 9.0), Heading::default())
            .target(Vec2::new(90.0, 90.0), Heading::default());
        let mut sim = Simulation::new(GameConfig::default(), plan, 1).unwrap();

        let report = sim.tick(TurnCommand::None, DT);
        let enemy_decision = report
            .decisions
            .iter()
            .find(|d| d.agent == AgentId(1))
            .unwrap();
        assert_eq!(enemy_decision.rule, SteeringRule::Enemy(EnemyRule::FleePlayer));

        // Heading turned toward +y (away from the player) by one turn step
        let enemy = sim.agent(AgentId(1)).unwrap();
        let rate = sim.config().movement.agent_turn_rate();
        assert!((enemy.heading.radians() - rate).abs() < 1e-5);
        assert_eq!(enemy.engagement, Engagement::Engaged);
    }

    #[test]
    fn test_lady_swoons_and_emits_affection() {
        let plan = SpawnPlan::new()
            .player(Vec2::new(3.0, 1.0), Heading::from_degrees(90.0))
            .enemy(EnemyKind::Bat, Vec2::new(90.0, 90.0), Heading::default())
            .target(Vec2::new(0.0, 1.0), Heading::default());
        let mut sim = Simulation::new(GameConfig::default(), plan, 1).unwrap();

        let report = sim.tick(TurnCommand::None, DT);
        let lady = report.decisions.iter().find(|d| d.agent == AgentId(2)).unwrap();
        assert_eq!(lady.rule, SteeringRule::Target(TargetRule::Swoon));
        assert!(report
            .events
            .contains(&SimulationEvent::Affection { target: AgentId(2) }));
        assert_eq!(sim.agent(AgentId(2)).unwrap().speed, 0.0);
    }

    #[test]
    fn test_player_fall_is_repositioned_near_edge() {
        let plan = SpawnPlan::new()
            .player(Vec2::new(0.05, 50.0), Heading::from_degrees(180.0))
            .enemy(EnemyKind::Skeleton, Vec2::new(80.0, 80.0), Heading::default())
            .target(Vec2::new(20.0, 80.0), Heading::default());
        let mut sim = Simulation::new(GameConfig::default(), plan, 9).unwrap();

        let report = sim.tick(TurnCommand::None, DT);
        let fell = report
            .events
            .iter()
            .find_map(|e| match e {
                SimulationEvent::PlayerFell { to, .. } => Some(*to),
                _ => None,
            })
            .expect("player should have fallen");
        assert!(fell.x >= 0.0 && fell.x <= 5.0);
        assert!(fell.y >= 45.0 && fell.y <= 55.0);
        assert_eq!(report.agents[0].position, fell);
    }

    #[test]
    fn test_player_stops_at_obstacle() {
        let mut plan = basic_plan().obstacle(50, 50, ObstacleKind::BerryBush);
        plan.spawns[0].position = Vec2::new(49.95, 50.5);
        let mut sim = Simulation::new(GameConfig::default(), plan, 1).unwrap();
        sim.tick(TurnCommand::None, DT);
        assert_eq!(sim.agent(AgentId(0)).unwrap().position, Vec2::new(49.95, 50.5));
    }

    #[test]
    fn test_invalid_dt_falls_back_to_nominal() {
        let mut sim = Simulation::new(GameConfig::default(), basic_plan(), 1).unwrap();
        sim.tick(TurnCommand::None, f32::NAN);
        let lunk = sim.agent(AgentId(0)).unwrap();
        assert!((lunk.position.x - (50.0 + 6.0 / 60.0)).abs() < 1e-4);
    }

    #[test]
    fn test_frozen_after_game_over() {
        let mut config = GameConfig::default();
        config.vitality.starting_boredom = 1;
        config.vitality.boredom_interval_secs = DT;
        let mut sim = Simulation::new(config, basic_plan(), 1).unwrap();

        let report = sim.tick(TurnCommand::None, DT);
        assert_eq!(report.game_over, Some(GameOverReason::Boredom));
        let game_overs = report
            .events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);

        let before = sim.snapshots();
        let report = sim.tick(TurnCommand::Left, DT);
        assert!(report.events.is_empty());
        assert_eq!(report.agents, before);
        assert_eq!(report.tick, 0);
        assert_eq!(sim.current_tick(), 1);
    }

    fn decision_for(report: &TickReport, id: AgentId) -> SteeringRule {
        report
            .decisions
            .iter()
            .find(|d| d.agent == id)
            .map(|d| d.rule)
            .unwrap()
    }

    #[test]
    fn test_enemy_facing_field_edge_is_blocked() {
        let plan = SpawnPlan::new()
            .player(Vec2::new(5.0, 5.0), Heading::default())
            .enemy(EnemyKind::Zombie, Vec2::new(99.6, 20.0), Heading::default())
            .target(Vec2::new(20.0, 80.0), Heading::default());
        let mut sim = Simulation::new(GameConfig::default(), plan, 1).unwrap();

        let report = sim.tick(TurnCommand::None, DT);
        assert_eq!(
            decision_for(&report, AgentId(1)),
            SteeringRule::Enemy(EnemyRule::Blocked)
        );
        assert!(sim.field().contains(sim.agent(AgentId(1)).unwrap().position));
    }

    #[test]
    fn test_enemy_facing_obstacle_is_blocked() {
        let plan = SpawnPlan::new()
            .player(Vec2::new(5.0, 5.0), Heading::default())
            .enemy(EnemyKind::Skeleton, Vec2::new(30.6, 30.5), Heading::default())
            .target(Vec2::new(20.0, 80.0), Heading::default())
            .obstacle(31, 30, ObstacleKind::Fence);
        let mut sim = Simulation::new(GameConfig::default(), plan, 1).unwrap();

        let report = sim.tick(TurnCommand::None, DT);
        assert_eq!(
            decision_for(&report, AgentId(1)),
            SteeringRule::Enemy(EnemyRule::Blocked)
        );
        let enemy = sim.agent(AgentId(1)).unwrap();
        assert!(!sim.obstacles().is_position_blocked(enemy.position));
    }

    #[test]
    fn test_fall_into_covered_region_uses_centre() {
        let mut config = GameConfig::default();
        config.movement.player_speed = 40.0;
        let mut plan = SpawnPlan::new()
            .player(Vec2::new(9.5, 50.0), Heading::from_degrees(180.0))
            .enemy(EnemyKind::Skeleton, Vec2::new(80.0, 80.0), Heading::default())
            .target(Vec2::new(20.0, 80.0), Heading::default());
        // Every cell a re-entry sample could land in
        for col in 0..=5 {
            for row in 44..=55 {
                plan = plan.obstacle(col, row, ObstacleKind::BerryBush);
            }
        }
        let mut sim = Simulation::new(config, plan, 4).unwrap();
        let max_dt = sim.config().max_dt;

        let report = sim.tick(TurnCommand::None, max_dt);
        let (from, to) = report
            .events
            .iter()
            .find_map(|e| match e {
                SimulationEvent::PlayerFell { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .expect("player should have fallen");

        assert!(from.x < 0.0);
        assert_eq!(to, sim.field().reentry_fallback(from));
        assert!((to.x - 2.25).abs() < 1e-3);
        assert!((to.y - 50.0).abs() < 1e-3);
        assert_eq!(report.agents[0].position, to);
    }
}
