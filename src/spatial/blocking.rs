//! Static obstacles (fences and berry bushes)
//!
//! Obstacles live on their own square grid, usually one cell per level tile.
//! Agents may never step into an obstacle cell; enemies whose next step
//! would do so switch to the blocked rule.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Fence,
    BerryBush,
}

/// Obstacle cells keyed by (column, row)
#[derive(Debug, Clone)]
pub struct BlockedCells {
    cells: AHashMap<(i32, i32), ObstacleKind>,
    cell_size: f32,
}

impl BlockedCells {
    /// Unit-sized cells
    pub fn new() -> Self {
        Self::with_cell_size(1.0)
    }

    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            cells: AHashMap::new(),
            cell_size,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Place an obstacle; a later placement in the same cell replaces it
    pub fn block(&mut self, col: i32, row: i32, kind: ObstacleKind) {
        if let Some(previous) = self.cells.insert((col, row), kind) {
            tracing::debug!(
                "{:?} at ({}, {}) replaced by {:?}",
                previous,
                col,
                row,
                kind
            );
        }
    }

    #[inline]
    pub fn is_position_blocked(&self, pos: Vec2) -> bool {
        self.obstacle_at(pos).is_some()
    }

    /// Obstacle covering a world position; non-finite positions hit nothing
    pub fn obstacle_at(&self, pos: Vec2) -> Option<ObstacleKind> {
        if self.cells.is_empty() || !pos.is_finite() {
            return None;
        }
        self.cells.get(&self.cell_of(pos)).copied()
    }

    /// (column, row) containing `pos`
    pub fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn count(&self, kind: ObstacleKind) -> usize {
        self.cells.values().filter(|k| **k == kind).count()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for BlockedCells {
    fn default() -> Self {
        Self::new()
    }
}
