//! Enhanced Snake - a level-based Snake game for the terminal
//!
//! This library provides:
//! - Core game logic and the session state machine (game module)
//! - High score persistence (storage module)
//! - Keyboard and swipe input (input module)
//! - TUI rendering (render module)
//! - Play-time bookkeeping (metrics module)
//! - The interactive terminal loop (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;
