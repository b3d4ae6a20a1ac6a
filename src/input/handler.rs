use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::swipe::SwipeDetector;
use crate::game::{Command, Direction, GameConfig, GameMode};

/// Display units covered by one grid cell when measuring swipes
const UNITS_PER_CELL: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Command(Command),
    Quit,
    None,
}

/// Maps crossterm key and mouse events to session commands
pub struct InputHandler {
    swipe: SwipeDetector,
    /// Swipe units per terminal column
    column_units: f32,
    /// Swipe units per terminal row
    row_units: f32,
}

impl InputHandler {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            swipe: SwipeDetector::new(config.swipe_min_distance),
            column_units: UNITS_PER_CELL / f32::from(config.viewport.cell_width.max(1)),
            row_units: UNITS_PER_CELL / f32::from(config.viewport.cell_height.max(1)),
        }
    }

    pub fn handle_key_event(&self, key: KeyEvent, mode: GameMode) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
            return KeyAction::Quit;
        }

        if mode != GameMode::Playing {
            // Outside of play any other key moves the game along.
            return Self::continue_action(mode);
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => Self::turn(Direction::Up),
            KeyCode::Down => Self::turn(Direction::Down),
            KeyCode::Left => Self::turn(Direction::Left),
            KeyCode::Right => Self::turn(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => Self::turn(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => Self::turn(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => Self::turn(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => Self::turn(Direction::Right),

            KeyCode::Char(' ') | KeyCode::Esc => KeyAction::Command(Command::Pause),

            _ => KeyAction::None,
        }
    }

    /// Left-button drags become turns while playing; a click elsewhere acts
    /// like a key press.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent, mode: GameMode) -> KeyAction {
        let x = f32::from(mouse.column) * self.column_units;
        let y = f32::from(mouse.row) * self.row_units;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.swipe.begin(x, y);
                KeyAction::None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let swiped = self.swipe.end(x, y);
                match (mode, swiped) {
                    (GameMode::Playing, Some(direction)) => Self::turn(direction),
                    (GameMode::Playing, None) => KeyAction::None,
                    (mode, _) => Self::continue_action(mode),
                }
            }
            _ => KeyAction::None,
        }
    }

    fn turn(direction: Direction) -> KeyAction {
        KeyAction::Command(Command::Move(direction))
    }

    /// The command that leaves a non-playing mode
    fn continue_action(mode: GameMode) -> KeyAction {
        let command = match mode {
            GameMode::Start => Command::Start,
            GameMode::Paused => Command::Resume,
            GameMode::LevelComplete => Command::AdvanceLevel,
            GameMode::GameOver => Command::Restart,
            GameMode::Playing => return KeyAction::None,
        };
        KeyAction::Command(command)
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}
