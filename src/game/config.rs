use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Which rule set the game runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Fixed speed, fixed points, no obstacles and no level quota
    Basic,
    /// Levels with a food quota, obstacles and increasing speed
    #[default]
    Enhanced,
}

/// How a viewport measured in display units is turned into a grid size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Display units per grid cell horizontally
    pub cell_width: u16,
    /// Display units per grid cell vertically
    pub cell_height: u16,
    /// Horizontal units taken by borders and margins
    pub reserved_width: u16,
    /// Vertical units taken by header, footer and progress bar
    pub reserved_height: u16,
    pub min_width: u16,
    pub max_width: u16,
    pub min_height: u16,
    pub max_height: u16,
}

impl Default for ViewportConfig {
    /// Terminal layout: every cell is drawn as two characters on one row
    fn default() -> Self {
        Self {
            cell_width: 2,
            cell_height: 1,
            reserved_width: 4,
            reserved_height: 12,
            min_width: 15,
            max_width: 35,
            min_height: 12,
            max_height: 25,
        }
    }
}

impl ViewportConfig {
    /// Pixel layout with 20px tiles, matching a browser page
    pub fn pixels() -> Self {
        Self {
            cell_width: 20,
            cell_height: 20,
            reserved_width: 40,
            reserved_height: 200,
            ..Default::default()
        }
    }
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: Variant,
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,

    /// Tick interval at level 1, in milliseconds
    pub initial_speed_ms: u64,
    /// How much faster each level ticks, in milliseconds
    pub speed_increase_ms: u64,
    /// Lower bound on the tick interval
    pub min_tick_ms: u64,

    /// Points per food, multiplied by the level in the enhanced variant
    pub points_per_food: u32,
    /// Level L needs ceil(threshold / L) food
    pub level_up_threshold: u32,

    pub obstacles_per_level: u32,
    pub max_obstacles: u32,
    /// Half side of the obstacle-free square around the spawn cell
    pub spawn_clearance: i32,

    /// Random draws before food placement falls back to a linear scan
    pub food_attempts: u32,
    /// Random draws per obstacle before the slot is dropped
    pub obstacle_attempts: u32,

    /// Minimum pointer travel, in display units, for a swipe to count
    pub swipe_min_distance: f32,

    pub viewport: ViewportConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Enhanced,
            grid_width: 25,
            grid_height: 20,
            initial_speed_ms: 150,
            speed_increase_ms: 20,
            min_tick_ms: 50,
            points_per_food: 10,
            level_up_threshold: 50,
            obstacles_per_level: 2,
            max_obstacles: 15,
            spawn_clearance: 2,
            food_attempts: 100,
            obstacle_attempts: 50,
            swipe_min_distance: 30.0,
            viewport: ViewportConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Basic rules on a custom grid
    pub fn basic(width: usize, height: usize) -> Self {
        Self {
            variant: Variant::Basic,
            ..Self::new(width, height)
        }
    }

    /// Read a JSON configuration file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width > 0 && self.grid_height > 0 && self.grid_width * self.grid_height >= 2,
            "grid needs room for the snake and food, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.spawn_clearance >= 0,
            "spawn_clearance must not be negative, got {}",
            self.spawn_clearance
        );
        ensure!(self.initial_speed_ms > 0, "initial_speed_ms must be positive");
        ensure!(self.min_tick_ms > 0, "min_tick_ms must be positive");
        ensure!(
            self.level_up_threshold > 0,
            "level_up_threshold must be positive"
        );
        ensure!(
            self.viewport.cell_width > 0 && self.viewport.cell_height > 0,
            "viewport cell size must be positive"
        );
        ensure!(
            self.viewport.min_width > 0
                && self.viewport.min_width <= self.viewport.max_width
                && self.viewport.min_height > 0
                && self.viewport.min_height <= self.viewport.max_height,
            "viewport bounds must satisfy 0 < min <= max"
        );
        ensure!(
            u32::from(self.viewport.min_width) * u32::from(self.viewport.min_height) >= 2,
            "smallest viewport grid needs room for the snake and food"
        );
        Ok(())
    }

    pub fn is_enhanced(&self) -> bool {
        self.variant == Variant::Enhanced
    }

    /// Time between ticks at the given level
    pub fn tick_interval(&self, level: u32) -> Duration {
        if !self.is_enhanced() {
            return Duration::from_millis(self.initial_speed_ms);
        }
        let speedup = u64::from(level.saturating_sub(1)).saturating_mul(self.speed_increase_ms);
        let ms = self
            .initial_speed_ms
            .saturating_sub(speedup)
            .max(self.min_tick_ms);
        Duration::from_millis(ms)
    }

    /// Food needed to finish the level, if the variant has levels
    pub fn level_quota(&self, level: u32) -> Option<u32> {
        self.is_enhanced()
            .then(|| self.level_up_threshold.div_ceil(level.max(1)))
    }

    /// Nominal number of obstacles for the level
    pub fn obstacle_count(&self, level: u32) -> u32 {
        if !self.is_enhanced() {
            return 0;
        }
        level
            .saturating_mul(self.obstacles_per_level)
            .min(self.max_obstacles)
    }

    /// Points awarded for one food at the given level
    pub fn points_for(&self, level: u32) -> u32 {
        match self.variant {
            Variant::Basic => self.points_per_food,
            Variant::Enhanced => self.points_per_food.saturating_mul(level),
        }
    }

    /// Speed shown to the player, 1 (slowest) to 5
    pub fn speed_rating(&self, level: u32) -> u32 {
        let gained = self
            .initial_speed_ms
            .saturating_sub(self.tick_interval(level).as_millis() as u64);
        let steps = gained.checked_div(self.speed_increase_ms).unwrap_or(0);
        (1 + steps).min(5) as u32
    }
}
