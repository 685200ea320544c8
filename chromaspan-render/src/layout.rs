//! Screen geometry. Pure arithmetic, shared by drawing and hit-testing so a
//! click always lands on what was drawn.

use chromaspan_core::Choice;

pub const MARGIN: f32 = 40.0;
pub const SWATCH_SIZE: f32 = 60.0;
pub const KEY_SIZE: f32 = 50.0;
pub const OPTION_GAP: f32 = 10.0;
pub const STIMULUS_SIZE: f32 = 140.0;
pub const ROW_SWATCH_SIZE: f32 = 60.0;
pub const MENU_ROW_HEIGHT: f32 = 40.0;
pub const MENU_ROW_WIDTH: f32 = 460.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// A `w`×`h` box centred on `(cx, cy)`.
    pub fn centred(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w * 0.5, cy - h * 0.5, w, h)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn centre(&self) -> (f32, f32) {
        (self.x + self.w * 0.5, self.y + self.h * 0.5)
    }
}

pub fn option_size(choice: &Choice) -> f32 {
    match choice {
        Choice::Swatch(_) => SWATCH_SIZE,
        Choice::Letter(_) => KEY_SIZE,
    }
}

/// Centred rows of equally sized cells, starting at `top`.
pub fn grid(width: u32, top: f32, count: usize, size: f32) -> Vec<Bounds> {
    if count == 0 {
        return Vec::new();
    }
    let usable = (width as f32 - 2.0 * MARGIN).max(size);
    let per_row = (((usable + OPTION_GAP) / (size + OPTION_GAP)).floor() as usize).clamp(1, count);
    (0..count)
        .map(|i| {
            let row = i / per_row;
            let col = i % per_row;
            let in_row = per_row.min(count - row * per_row);
            let row_width = in_row as f32 * size + (in_row - 1) as f32 * OPTION_GAP;
            let left = (width as f32 - row_width) * 0.5;
            Bounds::new(
                left + col as f32 * (size + OPTION_GAP),
                top + row as f32 * (size + OPTION_GAP),
                size,
                size,
            )
        })
        .collect()
}

/// Where the response options of the current trial are drawn.
pub fn option_grid(width: u32, height: u32, options: &[Choice]) -> Vec<Bounds> {
    let size = options.first().map_or(SWATCH_SIZE, option_size);
    let top = if options.len() <= 2 {
        height as f32 * 0.5 - size * 0.5
    } else {
        height as f32 * 0.62
    };
    if options.len() <= 2 {
        // Pairs sit well apart so left and right are unmistakable.
        let (cx, cy) = (width as f32 * 0.5, top + size * 0.5);
        let spread = (width as f32 * 0.15).max(size);
        return match options.len() {
            1 => vec![Bounds::centred(cx, cy, size, size)],
            2 => vec![
                Bounds::centred(cx - spread, cy, size, size),
                Bounds::centred(cx + spread, cy, size, size),
            ],
            _ => Vec::new(),
        };
    }
    grid(width, top, options.len(), size)
}

/// The squares of a colour "word", side by side around the centre.
pub fn swatch_row(width: u32, height: u32, count: usize) -> Vec<Bounds> {
    let top = height as f32 * 0.4 - ROW_SWATCH_SIZE * 0.5;
    let total = count as f32 * ROW_SWATCH_SIZE + count.saturating_sub(1) as f32 * OPTION_GAP;
    let left = (width as f32 - total) * 0.5;
    (0..count)
        .map(|i| {
            Bounds::new(
                left + i as f32 * (ROW_SWATCH_SIZE + OPTION_GAP),
                top,
                ROW_SWATCH_SIZE,
                ROW_SWATCH_SIZE,
            )
        })
        .collect()
}

pub fn stimulus_centre(width: u32, height: u32) -> (f32, f32) {
    (width as f32 * 0.5, height as f32 * 0.4)
}

pub fn menu_rows(width: u32, count: usize) -> Vec<Bounds> {
    let top = 110.0;
    let w = MENU_ROW_WIDTH.min(width as f32 - 2.0 * MARGIN).max(1.0);
    let x = (width as f32 - w) * 0.5;
    (0..count)
        .map(|i| Bounds::new(x, top + i as f32 * MENU_ROW_HEIGHT, w, MENU_ROW_HEIGHT - 4.0))
        .collect()
}

/// Index of the first box containing the point.
pub fn hit_test(bounds: &[Bounds], x: f32, y: f32) -> Option<usize> {
    bounds.iter().position(|b| b.contains(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromaspan_core::PALETTE;

    #[test]
    fn grid_rows_stay_inside_the_window() {
        for width in [320u32, 800, 1280] {
            let cells = grid(width, 100.0, 13, SWATCH_SIZE);
            assert_eq!(cells.len(), 13);
            for cell in &cells {
                assert!(cell.x >= 0.0, "{width}: {cell:?}");
                assert!(cell.x + cell.w <= width as f32, "{width}: {cell:?}");
            }
        }
    }

    #[test]
    fn cells_never_overlap() {
        let cells = grid(500, 0.0, 13, KEY_SIZE);
        for (i, a) in cells.iter().enumerate() {
            let (cx, cy) = a.centre();
            assert_eq!(hit_test(&cells, cx, cy), Some(i));
        }
    }

    #[test]
    fn pairs_are_left_and_right() {
        let options = [Choice::swatch_of(&PALETTE[0]), Choice::swatch_of(&PALETTE[1])];
        let cells = option_grid(800, 600, &options);
        assert_eq!(cells.len(), 2);
        assert!(cells[0].x + cells[0].w < cells[1].x);
        assert_eq!(cells[0].y, cells[1].y);
    }

    #[test]
    fn hit_test_misses_gaps() {
        let cells = grid(800, 0.0, 3, SWATCH_SIZE);
        let gap_x = cells[0].x + cells[0].w + OPTION_GAP * 0.5;
        assert_eq!(hit_test(&cells, gap_x, 10.0), None);
        assert_eq!(hit_test(&cells, cells[2].x + 1.0, 1.0), Some(2));
        assert!(grid(800, 0.0, 0, SWATCH_SIZE).is_empty());
    }

    #[test]
    fn menu_rows_stack_downwards() {
        let rows = menu_rows(800, 10);
        assert_eq!(rows.len(), 10);
        assert!(rows.windows(2).all(|w| w[0].y < w[1].y));
        let (cx, cy) = rows[4].centre();
        assert_eq!(hit_test(&rows, cx, cy), Some(4));
    }

    #[test]
    fn swatch_row_is_centred() {
        let row = swatch_row(800, 600, 4);
        let left = row[0].x;
        let right = 800.0 - (row[3].x + row[3].w);
        assert!((left - right).abs() < 1e-3);
    }
}
