//! Interaction resolver - hit-box overlaps after movement
//!
//! Resolution order each tick:
//! 1. Airborne enemies fly on (and may flatten a lady), then land dead
//! 2. Lunk vs enemies: consume the crush/throw/eat cycle
//! 3. Lunk vs ladies: rescue
//! 4. Enemies vs ladies: the lady is lost
//!
//! All score, health, and boredom effects are emitted as events; the
//! vitality tracker applies them afterwards.

use crate::core::config::InteractionConfig;
use crate::core::types::{AgentId, Role, Vec2};
use crate::entity::{hitboxes_overlap, Agent, LifeState};
use crate::simulation::events::{InteractionOption, LossCause, SimulationEvent, VitalityEvent};
use crate::spatial::field::Field;

/// Round-robin crush -> throw -> eat selector
///
/// Advances once per resolved player-enemy overlap, regardless of which
/// enemy was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionCycle {
    index: usize,
}

impl InteractionCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Option the next overlap will resolve
    pub fn current(&self) -> InteractionOption {
        InteractionOption::CYCLE[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Consume the current option and move to the next one
    pub fn advance(&mut self) -> InteractionOption {
        let option = self.current();
        self.index = (self.index + 1) % InteractionOption::CYCLE.len();
        option
    }
}

fn kill_rewards(score: i64, config: &InteractionConfig, events: &mut Vec<SimulationEvent>) {
    events.push(SimulationEvent::vitality(VitalityEvent::Score(score)));
    events.push(SimulationEvent::vitality(VitalityEvent::Boredom(
        config.enemy_kill_boredom_refill,
    )));
}

fn indices_of(agents: &[Agent], role: Role) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..agents.len())
        .filter(|&i| agents[i].role == role)
        .collect();
    idx.sort_by_key(|&i| agents[i].id);
    idx
}

/// Move airborne enemies one step and land the ones whose flight is over
pub fn advance_airborne(
    agents: &mut [Agent],
    field: &Field,
    config: &InteractionConfig,
    events: &mut Vec<SimulationEvent>,
) {
    let step_len = config.throw_distance / config.throw_airborne_ticks.max(1) as f32;
    let targets = indices_of(agents, Role::RescueTarget);

    for i in indices_of(agents, Role::Enemy) {
        let LifeState::Airborne {
            direction,
            ticks_left,
            mut struck_target,
        } = agents[i].life
        else {
            continue;
        };

        let position = field.clamp_inside(agents[i].position + direction * step_len);
        agents[i].position = position;
        let enemy_id = agents[i].id;

        for &t in &targets {
            if agents[t].is_active()
                && hitboxes_overlap(position, agents[t].position, config.hitbox_half_extent)
            {
                agents[t].life = LifeState::Lost;
                agents[t].speed = 0.0;
                struck_target = true;
                tracing::debug!("Thrown {} landed on {}", enemy_id, agents[t].id);
                events.push(SimulationEvent::TargetLost {
                    target: agents[t].id,
                    by: enemy_id,
                    cause: LossCause::StruckByThrownEnemy,
                });
                events.push(SimulationEvent::vitality(VitalityEvent::Health(
                    config.thrown_into_target_health_penalty,
                )));
            }
        }

        let ticks_left = ticks_left.saturating_sub(1);
        if ticks_left == 0 {
            agents[i].life = LifeState::Dead;
            agents[i].speed = 0.0;
            events.push(SimulationEvent::EnemyLanded {
                enemy: enemy_id,
                position,
            });
            if !struck_target {
                kill_rewards(config.throw_score, config, events);
            }
        } else {
            agents[i].life = LifeState::Airborne {
                direction,
                ticks_left,
                struck_target,
            };
        }
    }
}

/// Lunk touching enemies: one cycle slot per overlap
pub fn resolve_player_enemies(
    agents: &mut [Agent],
    cycle: &mut InteractionCycle,
    config: &InteractionConfig,
    events: &mut Vec<SimulationEvent>,
) {
    let enemies = indices_of(agents, Role::Enemy);

    for p in indices_of(agents, Role::Player) {
        let player_pos = agents[p].position;
        let throw_dir = agents[p].heading.direction();

        for &e in &enemies {
            if !agents[e].is_active()
                || !hitboxes_overlap(player_pos, agents[e].position, config.hitbox_half_extent)
            {
                continue;
            }

            let option = cycle.advance();
            let enemy_id = agents[e].id;
            tracing::debug!("{} resolves {:?} on {}", agents[p].id, option, enemy_id);
            events.push(SimulationEvent::Interaction {
                enemy: enemy_id,
                option,
            });

            match option {
                InteractionOption::Crush => {
                    agents[e].life = LifeState::Dead;
                    agents[e].speed = 0.0;
                    kill_rewards(config.crush_score, config, events);
                }
                InteractionOption::Throw => {
                    agents[e].life = LifeState::Airborne {
                        direction: throw_dir,
                        ticks_left: config.throw_airborne_ticks,
                        struck_target: false,
                    };
                    agents[e].heading = agents[p].heading;
                }
                InteractionOption::Eat => {
                    agents[e].life = LifeState::Dead;
                    agents[e].speed = 0.0;
                    let taste = agents[e]
                        .kind
                        .map(|k| config.tastiness.get(k))
                        .unwrap_or(0);
                    kill_rewards(taste, config, events);
                }
            }
        }
    }
}

/// Lunk reaching ladies
pub fn resolve_rescues(
    agents: &mut [Agent],
    config: &InteractionConfig,
    events: &mut Vec<SimulationEvent>,
) {
    let targets = indices_of(agents, Role::RescueTarget);

    for p in indices_of(agents, Role::Player) {
        let player_pos = agents[p].position;
        for &t in &targets {
            if agents[t].is_active()
                && hitboxes_overlap(player_pos, agents[t].position, config.hitbox_half_extent)
            {
                agents[t].life = LifeState::Saved;
                agents[t].speed = 0.0;
                tracing::debug!("{} rescued", agents[t].id);
                events.push(SimulationEvent::TargetSaved {
                    target: agents[t].id,
                });
                events.push(SimulationEvent::vitality(VitalityEvent::Score(
                    config.rescue_score,
                )));
            }
        }
    }
}

/// Enemies catching ladies
pub fn resolve_losses(
    agents: &mut [Agent],
    config: &InteractionConfig,
    events: &mut Vec<SimulationEvent>,
) {
    let enemies: Vec<(AgentId, Vec2)> = indices_of(agents, Role::Enemy)
        .into_iter()
        .filter(|&e| agents[e].is_active())
        .map(|e| (agents[e].id, agents[e].position))
        .collect();

    for t in indices_of(agents, Role::RescueTarget) {
        if !agents[t].is_active() {
            continue;
        }
        let target_pos = agents[t].position;
        let Some(&(by, _)) = enemies
            .iter()
            .find(|(_, pos)| hitboxes_overlap(target_pos, *pos, config.hitbox_half_extent))
        else {
            continue;
        };

        agents[t].life = LifeState::Lost;
        agents[t].speed = 0.0;
        tracing::debug!("{} caught by {}", agents[t].id, by);
        events.push(SimulationEvent::TargetLost {
            target: agents[t].id,
            by,
            cause: LossCause::CaughtByEnemy,
        });
        events.push(SimulationEvent::vitality(VitalityEvent::Score(
            config.lost_target_score_penalty.saturating_neg(),
        )));
        events.push(SimulationEvent::vitality(VitalityEvent::Boredom(
            config.lost_target_boredom_drain.saturating_neg(),
        )));
    }
}

/// Run every interaction stage in order
pub fn resolve_interactions(
    agents: &mut [Agent],
    field: &Field,
    cycle: &mut InteractionCycle,
    config: &InteractionConfig,
) -> Vec<SimulationEvent> {
    let mut events = Vec::new();
    advance_airborne(agents, field, config, &mut events);
    resolve_player_enemies(agents, cycle, config, &mut events);
    resolve_rescues(agents, config, &mut events);
    resolve_losses(agents, config, &mut events);
    events
}
