//! Proximity index - "nearest agent of role R within radius D"
//!
//! A derived view rebuilt from the start-of-tick snapshot. It owns no agent
//! state, only lookup structures, and is invalidated as soon as agents move
//! so that no decision can be made from half-updated positions.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Role, Tick, Vec2};
use crate::entity::Agent;
use crate::spatial::sparse_hash::SparseHashGrid;

/// Another agent as seen from an observer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: AgentId,
    pub position: Vec2,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct ProximityIndex {
    grids: [SparseHashGrid; 3],
    members: [Vec<(AgentId, Vec2)>; 3],
    built_for: Option<Tick>,
}

#[inline]
fn slot(role: Role) -> usize {
    match role {
        Role::Player => 0,
        Role::Enemy => 1,
        Role::RescueTarget => 2,
    }
}

impl ProximityIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            grids: [
                SparseHashGrid::new(cell_size),
                SparseHashGrid::new(cell_size),
                SparseHashGrid::new(cell_size),
            ],
            members: [Vec::new(), Vec::new(), Vec::new()],
            built_for: None,
        }
    }

    /// Rebuild from the active (alive, grounded) agents
    pub fn rebuild(&mut self, tick: Tick, agents: &[Agent]) {
        for members in &mut self.members {
            members.clear();
        }
        for agent in agents.iter().filter(|a| a.is_active()) {
            self.members[slot(agent.role)].push((agent.id, agent.position));
        }
        for (grid, members) in self.grids.iter_mut().zip(&self.members) {
            grid.rebuild(members.iter().copied());
        }
        self.built_for = Some(tick);
    }

    /// Mark the index stale; queries panic until the next rebuild
    pub fn invalidate(&mut self) {
        self.built_for = None;
    }

    #[inline]
    fn assert_built(&self) {
        assert!(
            self.built_for.is_some(),
            "proximity index queried before it was built for this tick"
        );
    }

    /// Nearest agent of `role` to `from`, excluding `exclude`
    ///
    /// `radius: None` searches the whole field. Equidistant candidates are
    /// resolved in favour of the lowest id.
    pub fn nearest(
        &self,
        role: Role,
        from: Vec2,
        radius: Option<f32>,
        exclude: AgentId,
    ) -> Option<Neighbor> {
        self.assert_built();

        let candidates: Vec<(AgentId, Vec2, f32)> = match radius {
            Some(r) => self.grids[slot(role)].query_radius(from, r),
            None => self.members[slot(role)]
                .iter()
                .map(|&(id, pos)| (id, pos, from.distance(&pos)))
                .collect(),
        };

        candidates
            .into_iter()
            .filter(|(id, _, _)| *id != exclude)
            .min_by_key(|&(id, _, d)| (OrderedFloat(d), id))
            .map(|(id, position, distance)| Neighbor {
                id,
                position,
                distance,
            })
    }
}
