use super::config::ViewportConfig;
use super::state::Grid;

/// Grid size that fits a viewport of `width` x `height` display units.
///
/// Space reserved for chrome is subtracted first; the result is clamped to the
/// configured bounds on each axis.
pub fn grid_for_viewport(width: u16, height: u16, config: &ViewportConfig) -> Grid {
    let fit = |available: u16, reserved: u16, cell: u16, min: u16, max: u16| {
        let cells = available.saturating_sub(reserved) / cell.max(1);
        usize::from(cells.clamp(min, max))
    };

    Grid::new(
        fit(
            width,
            config.reserved_width,
            config.cell_width,
            config.min_width,
            config.max_width,
        ),
        fit(
            height,
            config.reserved_height,
            config.cell_height,
            config.min_height,
            config.max_height,
        ),
    )
}
