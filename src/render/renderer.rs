use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
};

use crate::game::{CollisionType, GameMode, Position, Snapshot, Variant};
use crate::metrics::GameMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tile {
    Empty,
    Head,
    Body,
    Food,
    Obstacle,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, snapshot: &Snapshot, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(1), // Level progress
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        // Render header with basic stats
        let stats = self.render_stats(snapshot, metrics);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        if snapshot.mode == GameMode::Playing {
            let grid = self.render_grid(snapshot);
            frame.render_widget(grid, game_area);
        } else {
            let overlay = self.render_overlay(snapshot);
            frame.render_widget(overlay, game_area);
        }

        if let Some(progress) = self.render_progress(snapshot) {
            let progress_area = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(20),
                    Constraint::Percentage(60),
                    Constraint::Percentage(20),
                ])
                .split(chunks[2])[1];
            frame.render_widget(progress, progress_area);
        }

        // Render footer with controls
        let controls = self.render_controls();
        frame.render_widget(controls, chunks[3]);
    }

    fn tiles(snapshot: &Snapshot) -> Vec<Tile> {
        let width = snapshot.grid.width;
        let mut tiles = vec![Tile::Empty; width * snapshot.grid.height];
        let mut put = |x: i32, y: i32, tile: Tile| {
            if snapshot.grid.contains(Position::new(x, y)) {
                tiles[y as usize * width + x as usize] = tile;
            }
        };

        for obstacle in &snapshot.obstacles {
            put(obstacle.x, obstacle.y, Tile::Obstacle);
        }
        put(snapshot.food.x, snapshot.food.y, Tile::Food);
        for segment in snapshot.snake.iter().skip(1) {
            put(segment.x, segment.y, Tile::Body);
        }
        if let Some(head) = snapshot.snake.first() {
            put(head.x, head.y, Tile::Head);
        }
        tiles
    }

    fn render_grid(&self, snapshot: &Snapshot) -> Paragraph<'_> {
        let tiles = Self::tiles(snapshot);

        let lines: Vec<Line> = tiles
            .chunks(snapshot.grid.width.max(1))
            .map(|row| {
                let spans: Vec<Span> = row
                    .iter()
                    .map(|tile| match tile {
                        // Snake head - distinct color
                        Tile::Head => Span::styled(
                            "■ ",
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Tile::Body => Span::styled("□ ", Style::default().fg(Color::Green)),
                        Tile::Food => Span::styled(
                            "O ",
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        ),
                        Tile::Obstacle => Span::styled("▓▓", Style::default().fg(Color::Gray)),
                        Tile::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        let title = match snapshot.variant {
            Variant::Basic => " Snake ",
            Variant::Enhanced => " Enhanced Snake ",
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::Green))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, snapshot: &Snapshot, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Yellow));
        let value = |text: String| Span::styled(text, Style::default().fg(Color::White));

        let mut spans = vec![
            label("Score: "),
            Span::styled(
                snapshot.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            label("Level: "),
            value(snapshot.level.to_string()),
            Span::raw("    "),
            label("High Score: "),
            value(snapshot.high_score.to_string()),
        ];
        if snapshot.variant == Variant::Enhanced {
            spans.extend([
                Span::raw("    "),
                label("Speed: "),
                value(format!("{}/5", snapshot.speed_rating)),
            ]);
        }
        spans.extend([
            Span::raw("    "),
            label("Time: "),
            value(metrics.format_time()),
        ]);

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_overlay(&self, snapshot: &Snapshot) -> Paragraph<'_> {
        let heading = |text: String, color: Color| {
            Line::from(vec![Span::styled(
                text,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )])
        };
        let plain = |text: String| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));
        let prompt = |action: &'static str| {
            Line::from(vec![
                Span::styled("Press any key ", Style::default().fg(Color::Gray)),
                Span::styled(action, Style::default().fg(Color::Green)),
                Span::styled(" or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ])
        };

        let (mut text, border) = match snapshot.mode {
            GameMode::Start => {
                let (title, tagline) = match snapshot.variant {
                    Variant::Basic => ("Welcome to Snake!", "Eat food to grow and score"),
                    Variant::Enhanced => (
                        "Welcome to Enhanced Snake!",
                        "Navigate through levels with increasing difficulty",
                    ),
                };
                (
                    vec![
                        heading(title.to_string(), Color::Green),
                        Line::from(""),
                        plain(tagline.to_string()),
                        Line::from(""),
                        plain("Use Arrow Keys or WASD to move".to_string()),
                        plain("Drag with the mouse to swipe".to_string()),
                        plain("Press Space or Escape to pause".to_string()),
                        Line::from(""),
                        prompt("to start"),
                    ],
                    Color::Green,
                )
            }
            GameMode::Paused => (
                vec![
                    heading("Game Paused".to_string(), Color::Yellow),
                    Line::from(""),
                    prompt("to resume"),
                ],
                Color::Yellow,
            ),
            GameMode::LevelComplete => (
                vec![
                    heading(format!("Level {} Complete!", snapshot.level), Color::Green),
                    Line::from(""),
                    plain(format!("Score: {}", snapshot.score)),
                    Line::from(""),
                    prompt("for the next level"),
                ],
                Color::Green,
            ),
            GameMode::GameOver => {
                let mut lines = vec![
                    heading("GAME OVER".to_string(), Color::Red),
                    Line::from(""),
                ];
                if let Some(reason) = snapshot.last_collision {
                    let reason = match reason {
                        CollisionType::Wall => "You hit a wall",
                        CollisionType::SelfCollision => "You ran into yourself",
                        CollisionType::Obstacle => "You hit an obstacle",
                    };
                    lines.push(plain(reason.to_string()));
                }
                lines.push(Line::from(vec![
                    Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                    Span::styled(
                        snapshot.score.to_string(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
                lines.push(plain(format!("Level Reached: {}", snapshot.level)));
                if snapshot.new_record {
                    lines.push(heading("New High Score!".to_string(), Color::Yellow));
                }
                lines.push(Line::from(""));
                lines.push(prompt("to play again"));
                (lines, Color::Red)
            }
            GameMode::Playing => (Vec::new(), Color::Green),
        };
        text.insert(0, Line::from(""));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
    }

    fn render_progress(&self, snapshot: &Snapshot) -> Option<Gauge<'_>> {
        let quota = snapshot.level_quota?;
        if snapshot.mode != GameMode::Playing || quota == 0 {
            return None;
        }

        let ratio = (f64::from(snapshot.food_eaten) / f64::from(quota)).clamp(0.0, 1.0);
        Some(
            Gauge::default()
                .gauge_style(Style::default().fg(Color::LightGreen).bg(Color::Black))
                .ratio(ratio)
                .label(format!(
                    "Level Progress {}/{} food",
                    snapshot.food_eaten, quota
                )),
        )
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Yellow)),
            Span::raw(" to pause | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
