use super::{
    action::Direction,
    config::GameConfig,
    placement::{place_food, place_obstacles},
    state::{CollisionType, Grid, Position, Progress, Snake, World},
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// What a tick means for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Keep playing
    Continue,
    /// The level's food quota was met, or the board has no room left for food
    LevelComplete,
    /// The move was rejected; the snake is unchanged
    GameOver(CollisionType),
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Snake after the step; the input snake on game over
    pub snake: Snake,
    /// Food after the step
    pub food: Position,
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Points earned this step
    pub points: u32,
    pub outcome: StepOutcome,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Engine whose placements are reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Lay out a fresh level: a one-cell snake at the center, the level's
    /// obstacles and a food cell.
    pub fn new_level(&mut self, grid: Grid, level: u32) -> World {
        let snake = Snake::new(grid.center());
        let mut obstacles = place_obstacles(&mut self.rng, grid, level, &self.config);

        let attempts = self.config.food_attempts;
        let food = match place_food(&mut self.rng, grid, &snake, &obstacles, attempts) {
            Some(food) => food,
            None => {
                // Obstacles filled every free cell; the level goes without them.
                obstacles.clear();
                place_food(&mut self.rng, grid, &snake, &obstacles, attempts)
                    // A 1x1 grid has no room for food; config validation rejects it.
                    .unwrap_or_else(|| grid.center())
            }
        };

        World {
            grid,
            snake,
            food,
            obstacles,
        }
    }

    /// Execute one step of the game.
    ///
    /// `direction` has already been checked against reversal by the caller.
    /// The world is not modified; the caller commits the result.
    pub fn step(&mut self, world: &World, progress: &Progress, direction: Direction) -> StepResult {
        let new_head = world.snake.head().moved_in_direction(direction);
        let ate_food = new_head == world.food;

        // Check for collisions
        if let Some(collision_type) = self.check_collision(world, new_head, ate_food) {
            return StepResult {
                snake: world.snake.clone(),
                food: world.food,
                ate_food: false,
                points: 0,
                outcome: StepOutcome::GameOver(collision_type),
            };
        }

        let snake = world.snake.advanced(new_head, ate_food);

        if !ate_food {
            return StepResult {
                snake,
                food: world.food,
                ate_food,
                points: 0,
                outcome: StepOutcome::Continue,
            };
        }

        let points = self.config.points_for(progress.level);
        let quota_met = self
            .config
            .level_quota(progress.level)
            .is_some_and(|quota| progress.food_eaten + 1 >= quota);

        let (food, outcome) = if quota_met {
            (world.food, StepOutcome::LevelComplete)
        } else {
            match place_food(
                &mut self.rng,
                world.grid,
                &snake,
                &world.obstacles,
                self.config.food_attempts,
            ) {
                Some(food) => (food, StepOutcome::Continue),
                None => (world.food, StepOutcome::LevelComplete),
            }
        };

        StepResult {
            snake,
            food,
            ate_food,
            points,
            outcome,
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, world: &World, pos: Position, growing: bool) -> Option<CollisionType> {
        // Check wall collision
        if !world.grid.contains(pos) {
            return Some(CollisionType::Wall);
        }

        // Check self-collision
        if world.snake.blocks(pos, growing) {
            return Some(CollisionType::SelfCollision);
        }

        if world.is_obstacle(pos) {
            return Some(CollisionType::Obstacle);
        }

        None
    }
}
