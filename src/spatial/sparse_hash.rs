//! Sparse hash grid for efficient spatial queries

use ahash::AHashMap;

use crate::core::types::{AgentId, Vec2};

/// Sparse hash grid for O(1) neighbour queries
#[derive(Debug, Clone)]
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<(AgentId, Vec2)>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, agent: AgentId, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push((agent, pos));
    }

    /// Query all agents in the (2r+1)x(2r+1) block of cells around `pos`
    fn query_ring(&self, pos: Vec2, reach: i32) -> impl Iterator<Item = (AgentId, Vec2)> + '_ {
        let (cx, cy) = self.cell_coord(pos);

        (-reach..=reach).flat_map(move |dx| {
            (-reach..=reach).flat_map(move |dy| {
                self.cells
                    .get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Query agents within radius (inclusive)
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<(AgentId, Vec2, f32)> {
        let reach = ((radius / self.cell_size).ceil() as i32).max(1);
        self.query_ring(center, reach)
            .filter_map(|(agent, pos)| {
                let d = center.distance(&pos);
                (d <= radius).then_some((agent, pos, d))
            })
            .collect()
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, agents: impl Iterator<Item = (AgentId, Vec2)>) {
        self.clear();
        for (agent, pos) in agents {
            self.insert(agent, pos);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_radius_still_checks_adjacent_cells() {
        let mut grid = SparseHashGrid::new(10.0);
        grid.insert(AgentId(1), Vec2::new(5.0, 5.0));
        grid.insert(AgentId(2), Vec2::new(11.0, 9.0));
        grid.insert(AgentId(3), Vec2::new(45.0, 45.0));

        let found: Vec<_> = grid
            .query_radius(Vec2::new(9.0, 9.0), 3.0)
            .into_iter()
            .map(|(a, _, _)| a)
            .collect();
        assert!(!found.contains(&AgentId(1)));
        assert!(found.contains(&AgentId(2)));
        assert!(!found.contains(&AgentId(3)));
    }

    #[test]
    fn test_query_radius_beyond_one_cell() {
        let mut grid = SparseHashGrid::new(2.0);
        grid.insert(AgentId(1), Vec2::new(0.0, 0.0));
        grid.insert(AgentId(2), Vec2::new(9.0, 0.0));

        let hits = grid.query_radius(Vec2::new(0.0, 0.0), 10.0);
        assert_eq!(hits.len(), 2);

        let hits = grid.query_radius(Vec2::new(0.0, 0.0), 8.9);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, AgentId(1));
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut grid = SparseHashGrid::new(5.0);
        grid.insert(AgentId(1), Vec2::new(1.0, 1.0));
        grid.rebuild(std::iter::empty());
        assert!(grid.is_empty());

        grid.rebuild(
            [(AgentId(4), Vec2::new(1.0, 1.0)), (AgentId(5), Vec2::new(2.0, 2.0))].into_iter(),
        );
        assert_eq!(grid.len(), 2);
    }
}
