use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::cell::Cell;
use std::io::{Stderr, stderr};
use std::rc::Rc;
use std::time::Duration;
use tokio::time::interval;

use super::ticker::Ticker;
use crate::game::{
    Command, GameEngine, GameMode, GameSession, ViewportConfig, grid_for_viewport,
};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::storage::HighScoreStore;

pub struct HumanMode {
    session: GameSession<Box<dyn HighScoreStore>>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    /// Set when the grid follows the terminal size
    viewport: Option<ViewportConfig>,
    /// Raised by the session observer, cleared on draw
    dirty: Rc<Cell<bool>>,
    time_label: String,
}

impl HumanMode {
    /// `fit_to_terminal` sizes the grid from the terminal instead of the
    /// configured width and height.
    pub fn new(engine: GameEngine, store: Box<dyn HighScoreStore>, fit_to_terminal: bool) -> Self {
        let config = engine.config().clone();
        let mut session = GameSession::new(engine, store);

        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        session.subscribe(move |_| flag.set(true));

        Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(&config),
            should_quit: false,
            viewport: fit_to_terminal.then_some(config.viewport),
            dirty,
            time_label: String::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        if self.viewport.is_some() {
            let (columns, rows) =
                crossterm::terminal::size().context("Failed to read terminal size")?;
            self.fit_grid(columns, rows);
        }

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut ticker = Ticker::new();

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            ticker.sync(self.session.schedule());

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick, only armed while playing
                _ = ticker.tick() => {
                    self.update_game();
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.draw(terminal)?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                info!("quitting");
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let action = match event {
            // Only process key press events, not release
            Event::Key(key) if key.kind == KeyEventKind::Press => self
                .input_handler
                .handle_key_event(key, self.session.mode()),
            Event::Mouse(mouse) => self
                .input_handler
                .handle_mouse_event(mouse, self.session.mode()),
            Event::Resize(columns, rows) => {
                self.fit_grid(columns, rows);
                self.dirty.set(true);
                KeyAction::None
            }
            _ => KeyAction::None,
        };

        match action {
            KeyAction::Command(command) => self.submit(command),
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn submit(&mut self, command: Command) {
        let before = self.session.mode();
        if self.session.submit_command(command) {
            self.track_mode(before);
        }
    }

    fn update_game(&mut self) {
        let before = self.session.mode();
        if self.session.tick().is_some() {
            self.track_mode(before);
        }
    }

    fn track_mode(&mut self, before: GameMode) {
        let after = self.session.mode();
        if after != before {
            self.metrics.on_mode_change(before, after);
        }
    }

    fn fit_grid(&mut self, columns: u16, rows: u16) {
        if let Some(viewport) = &self.viewport {
            let grid = grid_for_viewport(columns, rows, viewport);
            self.session.resize(grid);
        }
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        self.metrics.update();
        let time_label = self.metrics.format_time();
        let clock_moved = time_label != self.time_label;

        if !self.dirty.replace(false) && !clock_moved {
            return Ok(());
        }
        self.time_label = time_label;

        let snapshot = self.session.snapshot();
        terminal
            .draw(|frame| {
                self.renderer.render(frame, &snapshot, &self.metrics);
            })
            .context("Failed to draw frame")?;
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, Grid, Position};
    use crate::storage::MemoryHighScoreStore;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn mode(fit_to_terminal: bool) -> HumanMode {
        HumanMode::new(
            GameEngine::with_seed(GameConfig::new(20, 20), 8),
            Box::new(MemoryHighScoreStore::default()),
            fit_to_terminal,
        )
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode(false);
        assert_eq!(mode.session.mode(), GameMode::Start);
        assert_eq!(mode.session.progress().score, 0);
        assert!(mode.dirty.get());
    }

    #[test]
    fn test_key_starts_and_pauses() {
        let mut mode = mode(false);
        mode.dirty.set(false);

        mode.handle_event(press(KeyCode::Enter));
        assert_eq!(mode.session.mode(), GameMode::Playing);
        assert!(mode.dirty.get());
        assert!(mode.metrics.running_since.is_some());

        mode.handle_event(press(KeyCode::Esc));
        assert_eq!(mode.session.mode(), GameMode::Paused);
        assert!(mode.metrics.running_since.is_none());

        mode.handle_event(press(KeyCode::Char('x')));
        assert_eq!(mode.session.mode(), GameMode::Playing);
    }

    #[test]
    fn test_quit_key() {
        let mut mode = mode(false);
        mode.handle_event(press(KeyCode::Char('q')));
        assert!(mode.should_quit);
    }

    #[test]
    fn test_tick_moves_snake() {
        // Basic rules place no obstacles, so one step from the center is always free.
        let mut mode = HumanMode::new(
            GameEngine::with_seed(GameConfig::basic(20, 20), 8),
            Box::new(MemoryHighScoreStore::default()),
            false,
        );
        mode.handle_event(press(KeyCode::Enter));
        mode.handle_event(press(KeyCode::Down));
        let head = mode.session.world().snake.head();
        assert_eq!(head, Position::new(10, 10));

        mode.update_game();
        assert_eq!(mode.session.mode(), GameMode::Playing);
        assert_eq!(mode.session.world().snake.head(), Position::new(10, 11));

        mode.update_game();
        assert_eq!(mode.session.world().snake.head(), Position::new(10, 12));
    }

    #[test]
    fn test_resize_follows_terminal_only_when_fitting() {
        let mut fixed = mode(false);
        fixed.handle_event(Event::Resize(80, 40));
        assert_eq!(fixed.session.world().grid, Grid::new(20, 20));

        let mut fitted = mode(true);
        fitted.handle_event(Event::Resize(80, 40));
        assert_eq!(fitted.session.world().grid, Grid::new(35, 25));
    }
}
