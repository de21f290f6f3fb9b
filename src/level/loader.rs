//! Load levels from TOML files
//!
//! ```toml
//! name = "meadow"
//! tile_size = 4.0
//! layout = """
//! P....L
//! ..S...
//! """
//!
//! [config.vitality]
//! starting_boredom = 60
//! ```
//!
//! The field size always comes from the layout; any `[config.field]` width
//! or height is overwritten.

use std::fs;
use std::path::Path;

use crate::core::config::GameConfig;
use crate::core::error::{LunkError, Result};
use crate::level::layout::Layout;
use crate::simulation::spawn::SpawnPlan;

pub const DEFAULT_TILE_SIZE: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub tile_size: f32,
    pub layout: Layout,
    pub config: GameConfig,
}

impl Level {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let toml: toml::Value = content.parse()?;

        let name = toml
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("untitled")
            .to_string();

        let tile_size = match toml.get("tile_size") {
            None => DEFAULT_TILE_SIZE,
            Some(v) => v
                .as_float()
                .or_else(|| v.as_integer().map(|i| i as f64))
                .ok_or_else(|| LunkError::Level("tile_size must be a number".into()))?
                as f32,
        };
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(LunkError::Level(format!(
                "tile_size must be positive, got {}",
                tile_size
            )));
        }

        let layout_text = toml
            .get("layout")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LunkError::Level(format!("{}: missing layout string", name)))?;
        let layout = Layout::parse(layout_text)?;

        let mut config = match toml.get("config") {
            Some(table) => table.clone().try_into::<GameConfig>()?,
            None => GameConfig::default(),
        };
        let (width, height) = layout.field_size(tile_size);
        config.field.width = width;
        config.field.height = height;
        config.validate()?;

        tracing::info!(
            "Loaded level '{}': {}x{} tiles of {} ({}x{} field)",
            name,
            layout.cols(),
            layout.rows(),
            tile_size,
            width,
            height
        );

        Ok(Self {
            name,
            tile_size,
            layout,
            config,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn spawn_plan(&self) -> SpawnPlan {
        self.layout.to_spawn_plan(self.tile_size)
    }
}
