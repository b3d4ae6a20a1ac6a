//! The game state machine.
//!
//! `GameSession` owns every piece of mutable game state. Input adapters talk
//! to it only through [`GameSession::submit_command`]; the driver calls
//! [`GameSession::tick`] at the interval advertised by
//! [`GameSession::schedule`]. Views read [`Snapshot`]s, either by polling or
//! through observers registered with [`GameSession::subscribe`].

use log::{debug, info};
use std::time::Duration;

use super::{
    action::{Command, Direction},
    config::Variant,
    engine::{GameEngine, StepOutcome},
    state::{CollisionType, GameMode, Grid, Position, Progress, World},
};
use crate::storage::HighScoreStore;

/// When the driver should tick. A new generation means any timer built for an
/// older one must be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    pub interval: Duration,
    pub generation: u64,
}

/// Read-only view of the session for renderers
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mode: GameMode,
    pub variant: Variant,
    pub grid: Grid,
    /// Head first
    pub snake: Vec<Position>,
    pub food: Position,
    pub obstacles: Vec<Position>,
    pub score: u32,
    pub level: u32,
    pub high_score: u32,
    pub food_eaten: u32,
    pub level_quota: Option<u32>,
    pub tick_interval: Duration,
    /// Speed shown to the player, 1 to 5
    pub speed_rating: u32,
    /// What ended the last game
    pub last_collision: Option<CollisionType>,
    /// The last finished game set a new high score
    pub new_record: bool,
    pub revision: u64,
}

type Observer = Box<dyn FnMut(&Snapshot)>;

pub struct GameSession<S: HighScoreStore> {
    engine: GameEngine,
    store: S,
    mode: GameMode,
    world: World,
    progress: Progress,
    /// Direction applied on the last tick
    direction: Direction,
    /// Direction the next tick will apply
    pending_direction: Direction,
    high_score: u32,
    /// Grid waiting for the next level initialization
    pending_grid: Option<Grid>,
    schedule: Option<TickSchedule>,
    generations: u64,
    last_collision: Option<CollisionType>,
    new_record: bool,
    revision: u64,
    observers: Vec<Observer>,
}

impl<S: HighScoreStore> GameSession<S> {
    /// Create a session on the start screen. Loads the high score once.
    pub fn new(mut engine: GameEngine, mut store: S) -> Self {
        let config = engine.config();
        let grid = Grid::new(config.grid_width, config.grid_height);
        let world = engine.new_level(grid, 1);
        let high_score = store.load();

        Self {
            engine,
            store,
            mode: GameMode::Start,
            world,
            progress: Progress::default(),
            direction: Direction::Right,
            pending_direction: Direction::Right,
            high_score,
            pending_grid: None,
            schedule: None,
            generations: 0,
            last_collision: None,
            new_record: false,
            revision: 0,
            observers: Vec::new(),
        }
    }

    /// Register a callback run with a fresh snapshot after every accepted change
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&Snapshot) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Apply a command from an input adapter. Returns whether it was accepted;
    /// commands that do not fit the current mode are ignored.
    pub fn submit_command(&mut self, command: Command) -> bool {
        let accepted = match (self.mode, command) {
            (GameMode::Playing, Command::Move(direction)) => {
                if direction.is_opposite(self.direction) {
                    false
                } else {
                    self.pending_direction = direction;
                    true
                }
            }
            (GameMode::Start, Command::Start) | (GameMode::GameOver, Command::Restart) => {
                self.new_game();
                true
            }
            (GameMode::Playing, Command::Pause) => {
                self.mode = GameMode::Paused;
                self.schedule = None;
                true
            }
            (GameMode::Paused, Command::Resume) => {
                self.mode = GameMode::Playing;
                self.schedule_ticks();
                true
            }
            (GameMode::LevelComplete, Command::AdvanceLevel) => {
                self.progress.level += 1;
                self.progress.food_eaten = 0;
                info!("advancing to level {}", self.progress.level);
                self.init_level();
                true
            }
            _ => false,
        };

        if accepted {
            self.notify();
        } else {
            debug!("ignoring {:?} while {:?}", command, self.mode);
        }
        accepted
    }

    /// Run one simulation step. Does nothing unless the session is playing.
    pub fn tick(&mut self) -> Option<StepOutcome> {
        if self.mode != GameMode::Playing {
            return None;
        }

        self.direction = self.pending_direction;
        let result = self
            .engine
            .step(&self.world, &self.progress, self.direction);

        match result.outcome {
            StepOutcome::GameOver(collision) => {
                self.last_collision = Some(collision);
                self.mode = GameMode::GameOver;
                self.schedule = None;
                self.finish_game();
            }
            outcome => {
                self.world.snake = result.snake;
                self.world.food = result.food;
                self.progress.score += result.points;
                self.progress.food_eaten += u32::from(result.ate_food);

                if outcome == StepOutcome::LevelComplete {
                    info!(
                        "level {} complete with score {}",
                        self.progress.level, self.progress.score
                    );
                    self.mode = GameMode::LevelComplete;
                    self.schedule = None;
                }
            }
        }

        self.notify();
        Some(result.outcome)
    }

    /// Offer a grid recomputed from the viewport. Applied right away on the
    /// start screen, otherwise held until the next level is laid out.
    /// Returns whether the visible grid changed.
    pub fn resize(&mut self, grid: Grid) -> bool {
        if grid == self.world.grid {
            self.pending_grid = None;
            return false;
        }

        if self.mode == GameMode::Start {
            self.world = self.engine.new_level(grid, self.progress.level);
            self.pending_grid = None;
            self.notify();
            true
        } else {
            debug!(
                "deferring resize to {}x{} while {:?}",
                grid.width, grid.height, self.mode
            );
            self.pending_grid = Some(grid);
            false
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let config = self.engine.config();
        let level = self.progress.level;

        Snapshot {
            mode: self.mode,
            variant: config.variant,
            grid: self.world.grid,
            snake: self.world.snake.segments().to_vec(),
            food: self.world.food,
            obstacles: self.world.obstacles.clone(),
            score: self.progress.score,
            level,
            high_score: self.high_score,
            food_eaten: self.progress.food_eaten,
            level_quota: config.level_quota(level),
            tick_interval: config.tick_interval(level),
            speed_rating: config.speed_rating(level),
            last_collision: self.last_collision,
            new_record: self.new_record,
            revision: self.revision,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Current tick schedule, `None` while not playing
    pub fn schedule(&self) -> Option<TickSchedule> {
        self.schedule
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn new_game(&mut self) {
        self.progress = Progress::default();
        self.last_collision = None;
        self.new_record = false;
        info!("starting a new game");
        self.init_level();
    }

    fn init_level(&mut self) {
        let grid = self.pending_grid.take().unwrap_or(self.world.grid);
        self.world = self.engine.new_level(grid, self.progress.level);
        self.direction = Direction::Right;
        self.pending_direction = Direction::Right;
        self.mode = GameMode::Playing;
        self.schedule_ticks();
    }

    fn schedule_ticks(&mut self) {
        self.generations += 1;
        self.schedule = Some(TickSchedule {
            interval: self.engine.config().tick_interval(self.progress.level),
            generation: self.generations,
        });
    }

    fn finish_game(&mut self) {
        let score = self.progress.score;
        info!(
            "game over at level {} with score {} ({:?})",
            self.progress.level, score, self.last_collision
        );

        if score > self.high_score {
            info!("new high score {} (was {})", score, self.high_score);
            self.high_score = score;
            self.new_record = true;
            self.store.save(score);
        }
    }

    fn notify(&mut self) {
        self.revision += 1;
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameConfig;
    use crate::game::state::Snake;
    use crate::storage::MemoryHighScoreStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(config: GameConfig) -> GameSession<MemoryHighScoreStore> {
        GameSession::new(
            GameEngine::with_seed(config, 99),
            MemoryHighScoreStore::default(),
        )
    }

    fn playing(config: GameConfig) -> GameSession<MemoryHighScoreStore> {
        let mut session = session(config);
        assert!(session.submit_command(Command::Start));
        session
    }

    /// Put the snake and food somewhere known, away from any obstacles.
    fn place(session: &mut GameSession<MemoryHighScoreStore>, snake: &[(i32, i32)], food: (i32, i32)) {
        session.world.snake =
            Snake::from_segments(snake.iter().map(|&(x, y)| Position::new(x, y)).collect())
                .unwrap();
        session.world.food = Position::new(food.0, food.1);
        session.world.obstacles.clear();
    }

    #[test]
    fn test_starts_on_start_screen() {
        let session = session(GameConfig::new(20, 20));
        assert_eq!(session.mode(), GameMode::Start);
        assert_eq!(session.schedule(), None);
        assert_eq!(session.high_score(), 0);
    }

    #[test]
    fn test_tick_is_noop_before_start() {
        let mut session = session(GameConfig::new(20, 20));
        let before = session.snapshot();
        assert_eq!(session.tick(), None);
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_start_initializes_game() {
        let session = playing(GameConfig::new(20, 20));
        let snapshot = session.snapshot();

        assert_eq!(snapshot.mode, GameMode::Playing);
        assert_eq!(snapshot.snake, vec![Position::new(10, 10)]);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.food_eaten, 0);
        assert_eq!(snapshot.obstacles.len(), 2);
        assert!(!snapshot.obstacles.contains(&snapshot.food));
        assert_eq!(session.direction(), Direction::Right);
        assert_eq!(
            session.schedule().map(|s| s.interval),
            Some(Duration::from_millis(150))
        );
    }

    #[test]
    fn test_eat_scenario() {
        let mut session = playing(GameConfig::new(20, 20));
        place(&mut session, &[(10, 10)], (11, 10));

        assert_eq!(session.tick(), Some(StepOutcome::Continue));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.snake, vec![Position::new(11, 10), Position::new(10, 10)]);
        assert_eq!(snapshot.score, 10);
        assert_eq!(snapshot.food_eaten, 1);
        assert!(!snapshot.snake.contains(&snapshot.food));
        assert_eq!(snapshot.mode, GameMode::Playing);
    }

    #[test]
    fn test_wall_scenario() {
        let mut session = playing(GameConfig::new(20, 20));
        place(&mut session, &[(19, 10), (18, 10)], (2, 2));

        assert_eq!(
            session.tick(),
            Some(StepOutcome::GameOver(CollisionType::Wall))
        );
        assert_eq!(session.mode(), GameMode::GameOver);
        assert_eq!(session.schedule(), None);
        assert_eq!(
            session.snapshot().snake,
            vec![Position::new(19, 10), Position::new(18, 10)]
        );
        assert_eq!(session.snapshot().last_collision, Some(CollisionType::Wall));
    }

    #[test]
    fn test_reverse_direction_is_ignored() {
        let mut session = playing(GameConfig::new(20, 20));

        assert!(!session.submit_command(Command::Move(Direction::Left)));
        assert_eq!(session.pending_direction(), Direction::Right);

        assert!(session.submit_command(Command::Move(Direction::Right)));
        assert!(session.submit_command(Command::Move(Direction::Up)));
        assert_eq!(session.pending_direction(), Direction::Up);
    }

    #[test]
    fn test_two_quick_turns_cannot_reverse() {
        let mut session = playing(GameConfig::new(20, 20));
        place(&mut session, &[(10, 10), (9, 10), (8, 10)], (0, 0));

        // Up is accepted, but Left is still checked against the applied Right.
        assert!(session.submit_command(Command::Move(Direction::Up)));
        assert!(!session.submit_command(Command::Move(Direction::Left)));

        assert_eq!(session.tick(), Some(StepOutcome::Continue));
        assert_eq!(session.direction(), Direction::Up);
        assert_eq!(session.world().snake.head(), Position::new(10, 9));

        // Now Left is perpendicular and allowed.
        assert!(session.submit_command(Command::Move(Direction::Left)));
    }

    #[test]
    fn test_moves_ignored_unless_playing() {
        let mut session = session(GameConfig::new(20, 20));
        assert!(!session.submit_command(Command::Move(Direction::Up)));

        session.submit_command(Command::Start);
        session.submit_command(Command::Pause);
        assert!(!session.submit_command(Command::Move(Direction::Up)));
        assert_eq!(session.pending_direction(), Direction::Right);
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let mut session = playing(GameConfig::new(20, 20));

        assert!(!session.submit_command(Command::Resume));
        assert_eq!(session.mode(), GameMode::Playing);

        assert!(session.submit_command(Command::Pause));
        let paused = session.snapshot();
        assert!(!session.submit_command(Command::Pause));
        assert_eq!(session.snapshot(), paused);
        assert_eq!(session.schedule(), None);
        assert_eq!(session.tick(), None);

        assert!(session.submit_command(Command::Resume));
        assert_eq!(session.mode(), GameMode::Playing);
        assert_eq!(session.snapshot().snake, paused.snake);
    }

    #[test]
    fn test_resume_reschedules_with_new_generation() {
        let mut session = playing(GameConfig::new(20, 20));
        let first = session.schedule().unwrap();

        session.submit_command(Command::Pause);
        session.submit_command(Command::Resume);
        let second = session.schedule().unwrap();

        assert_eq!(first.interval, second.interval);
        assert!(second.generation > first.generation);
    }

    #[test]
    fn test_illegal_commands_are_noops() {
        let mut session = session(GameConfig::new(20, 20));
        for command in [
            Command::Pause,
            Command::Resume,
            Command::Restart,
            Command::AdvanceLevel,
        ] {
            assert!(!session.submit_command(command));
            assert_eq!(session.mode(), GameMode::Start);
        }

        session.submit_command(Command::Start);
        assert!(!session.submit_command(Command::Start));
        assert!(!session.submit_command(Command::Restart));
        assert!(!session.submit_command(Command::AdvanceLevel));
        assert_eq!(session.mode(), GameMode::Playing);
    }

    #[test]
    fn test_level_complete_and_advance() {
        let mut session = playing(GameConfig::new(20, 20));
        session.progress = Progress {
            score: 200,
            level: 3,
            food_eaten: 16,
        };
        place(&mut session, &[(10, 10), (9, 10)], (11, 10));

        assert_eq!(session.tick(), Some(StepOutcome::LevelComplete));
        assert_eq!(session.mode(), GameMode::LevelComplete);
        assert_eq!(session.schedule(), None);
        assert_eq!(session.progress().food_eaten, 17);
        assert_eq!(session.progress().score, 230);
        assert_eq!(session.world().snake.len(), 3);
        assert_eq!(session.tick(), None);

        assert!(session.submit_command(Command::AdvanceLevel));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.mode, GameMode::Playing);
        assert_eq!(snapshot.level, 4);
        assert_eq!(snapshot.food_eaten, 0);
        assert_eq!(snapshot.score, 230);
        assert_eq!(snapshot.obstacles.len(), 8);
        assert_eq!(snapshot.snake, vec![Position::new(10, 10)]);
        assert!(!snapshot.obstacles.contains(&snapshot.food));
        assert_eq!(snapshot.level_quota, Some(13));
        assert_eq!(snapshot.tick_interval, Duration::from_millis(90));
        assert_eq!(
            session.schedule().map(|s| s.interval),
            Some(Duration::from_millis(90))
        );
        assert_eq!(session.direction(), Direction::Right);
    }

    #[test]
    fn test_game_over_records_high_score() {
        let mut session = playing(GameConfig::new(20, 20));
        session.progress.score = 40;
        place(&mut session, &[(19, 5)], (9, 9));

        assert_eq!(
            session.tick(),
            Some(StepOutcome::GameOver(CollisionType::Wall))
        );
        assert_eq!(session.high_score(), 40);
        assert!(session.snapshot().new_record);
        assert_eq!(session.store().saved(), Some(40));
        assert_eq!(session.store().save_count(), 1);
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let mut session = GameSession::new(
            GameEngine::with_seed(GameConfig::new(20, 20), 1),
            MemoryHighScoreStore::with_score(500),
        );
        assert_eq!(session.high_score(), 500);
        session.submit_command(Command::Start);
        session.progress.score = 40;
        place(&mut session, &[(19, 5)], (9, 9));

        session.tick();
        assert_eq!(session.mode(), GameMode::GameOver);
        assert_eq!(session.high_score(), 500);
        assert!(!session.snapshot().new_record);
        assert_eq!(session.store().save_count(), 0);
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut session = playing(GameConfig::new(20, 20));
        session.progress = Progress {
            score: 70,
            level: 2,
            food_eaten: 3,
        };
        place(&mut session, &[(19, 5)], (9, 9));
        session.tick();
        assert_eq!(session.mode(), GameMode::GameOver);

        assert!(session.submit_command(Command::Restart));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.mode, GameMode::Playing);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.food_eaten, 0);
        assert_eq!(snapshot.last_collision, None);
        assert!(!snapshot.new_record);
        assert_eq!(snapshot.snake, vec![Position::new(10, 10)]);
    }

    #[test]
    fn test_basic_variant_never_completes_by_quota() {
        let mut session = playing(GameConfig::basic(20, 20));
        assert!(session.snapshot().obstacles.is_empty());
        session.progress.food_eaten = 500;
        place(&mut session, &[(10, 10)], (11, 10));

        assert_eq!(session.tick(), Some(StepOutcome::Continue));
        assert_eq!(session.progress().score, 10);
        assert_eq!(session.snapshot().level_quota, None);
    }

    #[test]
    fn test_resize_applied_on_start_screen() {
        let mut session = session(GameConfig::new(20, 20));
        assert!(session.resize(Grid::new(30, 24)));
        assert_eq!(session.snapshot().grid, Grid::new(30, 24));
        assert_eq!(session.snapshot().snake, vec![Position::new(15, 12)]);
    }

    #[test]
    fn test_resize_deferred_while_playing() {
        let mut session = playing(GameConfig::new(20, 20));
        place(&mut session, &[(10, 10), (9, 10)], (11, 10));
        session.progress = Progress {
            score: 0,
            level: 3,
            food_eaten: 16,
        };

        assert!(!session.resize(Grid::new(30, 24)));
        assert_eq!(session.snapshot().grid, Grid::new(20, 20));

        session.tick();
        assert_eq!(session.snapshot().grid, Grid::new(20, 20));

        session.submit_command(Command::AdvanceLevel);
        assert_eq!(session.snapshot().grid, Grid::new(30, 24));
        assert_eq!(session.snapshot().snake, vec![Position::new(15, 12)]);
    }

    #[test]
    fn test_observers_see_every_accepted_change() {
        let mut session = session(GameConfig::new(20, 20));
        let seen: Rc<RefCell<Vec<(GameMode, u64)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        session.subscribe(move |snapshot| sink.borrow_mut().push((snapshot.mode, snapshot.revision)));

        session.submit_command(Command::Start);
        session.submit_command(Command::Resume);
        session.submit_command(Command::Pause);
        session.tick();

        assert_eq!(
            *seen.borrow(),
            vec![(GameMode::Playing, 1), (GameMode::Paused, 2)]
        );
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn test_food_never_lands_on_snake_or_obstacles() {
        let mut session = playing(GameConfig::new(12, 12));
        for _ in 0..500 {
            let snapshot = session.snapshot();
            assert_eq!(snapshot.mode, GameMode::Playing);
            assert!(!snapshot.snake.contains(&snapshot.food));
            assert!(!snapshot.obstacles.contains(&snapshot.food));

            // Head for the food along x first, then y.
            let head = snapshot.snake[0];
            let toward = if snapshot.food.x > head.x {
                Direction::Right
            } else if snapshot.food.x < head.x {
                Direction::Left
            } else if snapshot.food.y > head.y {
                Direction::Down
            } else {
                Direction::Up
            };
            session.submit_command(Command::Move(toward));

            match session.tick() {
                Some(StepOutcome::Continue) => {}
                Some(StepOutcome::LevelComplete) => {
                    session.submit_command(Command::AdvanceLevel);
                }
                _ => {
                    session.submit_command(Command::Restart);
                }
            }
        }
    }
}
