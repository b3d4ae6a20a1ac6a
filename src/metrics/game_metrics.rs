use std::time::{Duration, Instant};

use crate::game::GameMode;

/// Play-time bookkeeping for the HUD. Time spent outside of play is not counted.
pub struct GameMetrics {
    /// Start of the current stretch of play, if the game is running
    pub running_since: Option<Instant>,
    /// Play time accumulated before the current stretch
    pub banked_time: Duration,
    pub elapsed_time: Duration,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            running_since: None,
            banked_time: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            games_played: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.banked_time
            + self
                .running_since
                .map(|since| since.elapsed())
                .unwrap_or(Duration::ZERO);
    }

    pub fn on_game_start(&mut self) {
        self.banked_time = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
        self.running_since = Some(Instant::now());
    }

    /// Play stopped without ending the game (pause or level complete)
    pub fn on_suspend(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked_time += since.elapsed();
        }
        self.update();
    }

    pub fn on_resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn on_game_over(&mut self) {
        self.on_suspend();
        self.games_played += 1;
    }

    /// Feed a mode change observed on the session
    pub fn on_mode_change(&mut self, from: GameMode, to: GameMode) {
        match (from, to) {
            (GameMode::Start | GameMode::GameOver, GameMode::Playing) => self.on_game_start(),
            (_, GameMode::Playing) => self.on_resume(),
            (_, GameMode::GameOver) => self.on_game_over(),
            (_, GameMode::Paused | GameMode::LevelComplete) => self.on_suspend(),
            (_, GameMode::Start) => {}
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
