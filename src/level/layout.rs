//! ASCII level layouts
//!
//! One character per tile, one line per row. Row 0 is the top of the field
//! (smallest y) and column 0 the left edge (smallest x).

use serde::{Deserialize, Serialize};

use crate::core::error::{LunkError, Result};
use crate::core::types::{EnemyKind, Heading, Vec2};
use crate::simulation::spawn::SpawnPlan;
use crate::spatial::blocking::ObstacleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    Player,
    Lady,
    Enemy(EnemyKind),
    Obstacle(ObstacleKind),
}

impl Tile {
    pub fn from_char(c: char) -> Option<Tile> {
        Some(match c {
            '.' | ' ' => Tile::Empty,
            'P' => Tile::Player,
            'L' => Tile::Lady,
            'S' => Tile::Enemy(EnemyKind::Skeleton),
            'Z' => Tile::Enemy(EnemyKind::Zombie),
            'B' => Tile::Enemy(EnemyKind::Bat),
            '#' => Tile::Obstacle(ObstacleKind::Fence),
            '*' => Tile::Obstacle(ObstacleKind::BerryBush),
            _ => return None,
        })
    }

    pub fn to_char(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Player => 'P',
            Tile::Lady => 'L',
            Tile::Enemy(EnemyKind::Skeleton) => 'S',
            Tile::Enemy(EnemyKind::Zombie) => 'Z',
            Tile::Enemy(EnemyKind::Bat) => 'B',
            Tile::Obstacle(ObstacleKind::Fence) => '#',
            Tile::Obstacle(ObstacleKind::BerryBush) => '*',
        }
    }
}

/// Parsed grid of tiles; short rows are padded with empty tiles
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    rows: Vec<Vec<Tile>>,
    cols: usize,
}

impl Layout {
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let first = lines.iter().position(|l| !l.trim().is_empty());
        let last = lines.iter().rposition(|l| !l.trim().is_empty());
        let (first, last) = match (first, last) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(LunkError::Level("layout is empty".into())),
        };

        let mut rows = Vec::with_capacity(last - first + 1);
        // Errors report positions in the original text, blank lead-in included
        for (row, line) in lines.iter().enumerate().take(last + 1).skip(first) {
            let tiles = line
                .trim_end()
                .chars()
                .enumerate()
                .map(|(col, c)| {
                    Tile::from_char(c).ok_or_else(|| {
                        LunkError::Level(format!(
                            "unknown layout character {:?} at row {}, column {}",
                            c, row, col
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(tiles);
        }

        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if cols == 0 {
            return Err(LunkError::Level("layout has no columns".into()));
        }
        for row in &mut rows {
            row.resize(cols, Tile::Empty);
        }

        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile(&self, col: usize, row: usize) -> Option<Tile> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// All non-empty tiles in row-major order
    pub fn iter_tiles(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, tiles)| {
            tiles
                .iter()
                .enumerate()
                .filter(|(_, t)| **t != Tile::Empty)
                .map(move |(col, t)| (col, row, *t))
        })
    }

    /// Field size in world units for the given tile size
    pub fn field_size(&self, tile_size: f32) -> (f32, f32) {
        (self.cols as f32 * tile_size, self.rows.len() as f32 * tile_size)
    }

    /// Agents at tile centres, obstacles as tile-sized blocked cells
    ///
    /// Spawn order (and so agent ids) is row-major layout order.
    pub fn to_spawn_plan(&self, tile_size: f32) -> SpawnPlan {
        let mut plan = SpawnPlan::with_obstacle_cell_size(tile_size);
        for (col, row, tile) in self.iter_tiles() {
            let centre = Vec2::new(
                (col as f32 + 0.5) * tile_size,
                (row as f32 + 0.5) * tile_size,
            );
            plan = match tile {
                Tile::Empty => plan,
                Tile::Player => plan.player(centre, Heading::default()),
                Tile::Lady => plan.target(centre, Heading::default()),
                Tile::Enemy(kind) => plan.enemy(kind, centre, Heading::default()),
                Tile::Obstacle(kind) => plan.obstacle(col as i32, row as i32, kind),
            };
        }
        plan
    }
}
