//! Random placement of food and obstacles.
//!
//! Both placements retry a bounded number of times. Food falls back to a
//! row-major scan so it is always placed while a free cell exists; obstacle
//! slots that exhaust their attempts are dropped.

use log::warn;
use rand::Rng;

use super::config::GameConfig;
use super::state::{Grid, Position, Snake};

fn random_cell<R: Rng>(rng: &mut R, grid: Grid) -> Position {
    Position::new(
        rng.gen_range(0..grid.width) as i32,
        rng.gen_range(0..grid.height) as i32,
    )
}

/// Pick a cell for the next food, avoiding the snake and obstacles.
///
/// Returns `None` only when every cell is taken.
pub fn place_food<R: Rng>(
    rng: &mut R,
    grid: Grid,
    snake: &Snake,
    obstacles: &[Position],
    attempts: u32,
) -> Option<Position> {
    let is_free = |pos: Position| !snake.contains(pos) && !obstacles.contains(&pos);

    for _ in 0..attempts {
        let pos = random_cell(rng, grid);
        if is_free(pos) {
            return Some(pos);
        }
    }

    grid.cells().find(|&pos| is_free(pos))
}

/// Whether `pos` falls in the square kept clear around the spawn cell
pub fn in_spawn_zone(grid: Grid, pos: Position, clearance: i32) -> bool {
    let center = grid.center();
    (pos.x - center.x).abs() <= clearance && (pos.y - center.y).abs() <= clearance
}

/// Generate the obstacles for a level.
///
/// May return fewer than `config.obstacle_count(level)` cells on a crowded grid.
pub fn place_obstacles<R: Rng>(
    rng: &mut R,
    grid: Grid,
    level: u32,
    config: &GameConfig,
) -> Vec<Position> {
    let wanted = config.obstacle_count(level);
    let mut obstacles = Vec::with_capacity(wanted as usize);

    for _ in 0..wanted {
        for _ in 0..config.obstacle_attempts {
            let pos = random_cell(rng, grid);
            if !in_spawn_zone(grid, pos, config.spawn_clearance) && !obstacles.contains(&pos) {
                obstacles.push(pos);
                break;
            }
        }
    }

    if obstacles.len() < wanted as usize {
        warn!(
            "placed {} of {} obstacles for level {} on a {}x{} grid",
            obstacles.len(),
            wanted,
            level,
            grid.width,
            grid.height
        );
    }

    obstacles
}
