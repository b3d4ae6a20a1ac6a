use crate::game::Direction;

/// Default minimum travel, in display units, before a drag counts as a swipe
pub const MIN_SWIPE_DISTANCE: f32 = 30.0;

/// Turns a pointer press and release into a direction
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    min_distance: f32,
    origin: Option<(f32, f32)>,
}

impl SwipeDetector {
    pub fn new(min_distance: f32) -> Self {
        Self {
            min_distance,
            origin: None,
        }
    }

    /// Pointer went down at (x, y)
    pub fn begin(&mut self, x: f32, y: f32) {
        self.origin = Some((x, y));
    }

    /// Pointer came up at (x, y). The axis with the larger travel decides the
    /// direction; short drags and releases without a press give `None`.
    pub fn end(&mut self, x: f32, y: f32) -> Option<Direction> {
        let (start_x, start_y) = self.origin.take()?;
        let dx = x - start_x;
        let dy = y - start_y;

        if dx.abs() <= self.min_distance && dy.abs() <= self.min_distance {
            return None;
        }

        let direction = if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        };
        Some(direction)
    }

    pub fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::new(MIN_SWIPE_DISTANCE)
    }
}
