use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// True when the two positions share an edge
    pub fn is_adjacent(&self, other: Position) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

/// Dimensions of the playing field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Check if a position is within the grid bounds
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && (pos.x as usize) < self.width && pos.y >= 0 && (pos.y as usize) < self.height
    }

    /// Spawn cell of the snake
    pub fn center(&self) -> Position {
        Position::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| Position::new(x as i32, y as i32)))
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    body: Vec<Position>,
}

impl Snake {
    /// A snake made of a single head cell
    pub fn new(head: Position) -> Self {
        Self { body: vec![head] }
    }

    /// Build a snake from head-first segments. Returns `None` for an empty body.
    pub fn from_segments(body: Vec<Position>) -> Option<Self> {
        (!body.is_empty()).then_some(Self { body })
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// All segments, head first
    pub fn segments(&self) -> &[Position] {
        &self.body
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Whether `pos` is blocked for a head moving there this tick. The tail
    /// only blocks when it stays put, which happens on a growth tick.
    pub fn blocks(&self, pos: Position, growing: bool) -> bool {
        let checked = if growing || self.body.len() == 1 {
            &self.body[..]
        } else {
            &self.body[..self.body.len() - 1]
        };
        checked.contains(&pos)
    }

    /// The snake after its head moved to `new_head`, keeping the tail when
    /// growing. The original snake is left untouched.
    pub fn advanced(&self, new_head: Position, grow: bool) -> Self {
        let keep = if grow {
            self.body.len()
        } else {
            self.body.len() - 1
        };
        let mut body = Vec::with_capacity(keep + 1);
        body.push(new_head);
        body.extend_from_slice(&self.body[..keep]);
        Self { body }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; a snake has at least its head
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Segments are distinct and each touches the next one
    pub fn is_well_formed(&self) -> bool {
        let distinct = self
            .body
            .iter()
            .enumerate()
            .all(|(i, pos)| !self.body[i + 1..].contains(pos));
        let connected = self.body.windows(2).all(|pair| pair[0].is_adjacent(pair[1]));
        !self.body.is_empty() && distinct && connected
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake hit an obstacle
    Obstacle,
}

/// High-level mode of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Start,
    Playing,
    Paused,
    LevelComplete,
    GameOver,
}

/// Everything that occupies the grid
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub grid: Grid,
    pub snake: Snake,
    pub food: Position,
    pub obstacles: Vec<Position>,
}

impl World {
    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Check if a position is occupied by the snake or an obstacle
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.snake.contains(pos) || self.is_obstacle(pos)
    }
}

/// Score keeping for the current game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub score: u32,
    pub level: u32,
    /// Food eaten since the level started
    pub food_eaten: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            food_eaten: 0,
        }
    }
}
