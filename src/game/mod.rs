//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Terminal input, rendering and persistence plug in around [`GameSession`].

pub mod action;
pub mod config;
pub mod engine;
pub mod placement;
pub mod session;
pub mod state;
pub mod viewport;

// Re-export commonly used types
pub use action::{Command, Direction};
pub use config::{GameConfig, Variant, ViewportConfig};
pub use engine::{GameEngine, StepOutcome, StepResult};
pub use session::{GameSession, Snapshot, TickSchedule};
pub use state::{CollisionType, GameMode, Grid, Position, Progress, Snake, World};
pub use viewport::grid_for_viewport;
