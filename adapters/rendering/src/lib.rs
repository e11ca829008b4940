#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Arcade Manager adapters.
//!
//! Backends receive captured [`CellFrame`]s and report raw input, which the
//! [`InputTranslator`] maps onto grid events for the UI runtime.

use std::{error::Error, fmt, io::Write, ops::ControlFlow, time::Duration};

use anyhow::{Context, Result as AnyResult};
use arcade_manager_ui::{Color as PaletteColor, GridPos, GridSurface, Key, UiInput};
use glam::Vec2;
use tracing::debug;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Maps a palette entry to the RGB value pixel backends draw it with.
#[must_use]
pub const fn palette(color: PaletteColor) -> Color {
    match color {
        PaletteColor::Black => Color::from_rgb_u8(0, 0, 0),
        PaletteColor::Blue => Color::from_rgb_u8(0, 0, 170),
        PaletteColor::Green => Color::from_rgb_u8(0, 170, 0),
        PaletteColor::Cyan => Color::from_rgb_u8(0, 170, 170),
        PaletteColor::Red => Color::from_rgb_u8(170, 0, 0),
        PaletteColor::Magenta => Color::from_rgb_u8(170, 0, 170),
        PaletteColor::Orange => Color::from_rgb_u8(170, 85, 0),
        PaletteColor::LightGrey => Color::from_rgb_u8(170, 170, 170),
        PaletteColor::Grey => Color::from_rgb_u8(85, 85, 85),
        PaletteColor::LightBlue => Color::from_rgb_u8(85, 85, 255),
        PaletteColor::LightGreen => Color::from_rgb_u8(85, 255, 85),
        PaletteColor::LightCyan => Color::from_rgb_u8(85, 255, 255),
        PaletteColor::LightRed => Color::from_rgb_u8(255, 85, 85),
        PaletteColor::LightPurple => Color::from_rgb_u8(255, 85, 255),
        PaletteColor::Yellow => Color::from_rgb_u8(255, 255, 85),
        PaletteColor::White => Color::from_rgb_u8(255, 255, 255),
    }
}

/// One resolved cell of a captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCell {
    /// Glyph to draw.
    pub glyph: char,
    /// Glyph colour, highlight already applied.
    pub fg: PaletteColor,
    /// Cell colour, highlight already applied.
    pub bg: PaletteColor,
}

/// Cell that differs between two frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellChange {
    /// Position of the cell.
    pub position: GridPos,
    /// New contents of the cell.
    pub cell: FrameCell,
}

/// Immutable copy of a surface handed to backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellFrame {
    columns: i32,
    rows: i32,
    cells: Vec<FrameCell>,
}

impl CellFrame {
    /// Creates a blank frame of the provided size.
    #[must_use]
    pub fn blank(columns: i32, rows: i32) -> Self {
        let count = usize::try_from(columns.max(0) * rows.max(0)).unwrap_or(0);
        Self {
            columns: columns.max(0),
            rows: rows.max(0),
            cells: vec![
                FrameCell {
                    glyph: ' ',
                    fg: PaletteColor::White,
                    bg: PaletteColor::Black,
                };
                count
            ],
        }
    }

    /// Captures the current contents of a surface.
    #[must_use]
    pub fn capture(surface: &GridSurface) -> Self {
        let cells = surface
            .cells()
            .map(|(_, cell)| {
                let (fg, bg) = cell.colors();
                FrameCell {
                    glyph: cell.glyph,
                    fg,
                    bg,
                }
            })
            .collect();
        Self {
            columns: surface.columns(),
            rows: surface.rows(),
            cells,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Cell at the provided position, if it lies inside the frame.
    #[must_use]
    pub fn cell(&self, position: GridPos) -> Option<&FrameCell> {
        if position.column < 0
            || position.row < 0
            || position.column >= self.columns
            || position.row >= self.rows
        {
            return None;
        }
        let index = usize::try_from(position.row * self.columns + position.column).ok()?;
        self.cells.get(index)
    }

    /// Cells that changed since `previous`; every cell when the sizes differ.
    #[must_use]
    pub fn diff(&self, previous: &CellFrame) -> Vec<CellChange> {
        let resized = self.columns != previous.columns || self.rows != previous.rows;
        let columns = self.columns.max(1);
        (0..)
            .zip(&self.cells)
            .filter(|(index, cell)| {
                resized
                    || usize::try_from(*index)
                        .ok()
                        .and_then(|index| previous.cells.get(index))
                        != Some(*cell)
            })
            .map(|(index, cell)| CellChange {
                position: GridPos::new(index % columns, index / columns),
                cell: *cell,
            })
            .collect()
    }

    /// Glyphs of every row joined by newlines.
    #[must_use]
    pub fn to_text(&self) -> String {
        let columns = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.cells
            .chunks(columns)
            .map(|row| row.iter().map(|cell| cell.glyph).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Describes the character grid and the pixel size of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns.
    pub columns: i32,
    /// Number of rows.
    pub rows: i32,
    /// Pixel size of a single cell.
    pub cell_size: Vec2,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when the grid or its cells have no area.
    pub fn new(columns: i32, rows: i32, cell_size: Vec2) -> Result<Self, RenderingError> {
        if columns <= 0 || rows <= 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if cell_size.x <= f32::EPSILON || cell_size.y <= f32::EPSILON {
            return Err(RenderingError::InvalidCellSize {
                width: cell_size.x,
                height: cell_size.y,
            });
        }
        Ok(Self {
            columns,
            rows,
            cell_size,
        })
    }

    /// Pixel size of the whole grid.
    #[must_use]
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.columns as f32, self.rows as f32) * self.cell_size
    }

    /// Cell under a pixel position, or `None` outside the grid.
    #[must_use]
    pub fn pixel_to_cell(&self, pixel: Vec2) -> Option<GridPos> {
        let cell = (pixel / self.cell_size).floor();
        if !cell.is_finite() || cell.x < 0.0 || cell.y < 0.0 {
            return None;
        }
        let (column, row) = (cell.x as i32, cell.y as i32);
        (column < self.columns && row < self.rows).then(|| GridPos::new(column, row))
    }
}

/// Keys reported by backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Return.
    Enter,
    /// Space bar.
    Space,
    /// Backspace.
    Backspace,
    /// Escape.
    Escape,
    /// Any key the interface ignores.
    Other,
}

/// Input event as reported by a backend, in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawInput {
    /// A key was pressed.
    Key(KeyCode),
    /// A printable character was typed.
    Text(char),
    /// The pointer moved to a pixel position.
    PointerMoved(Vec2),
    /// The pointer button was released at a pixel position.
    PointerReleased(Vec2),
}

/// Input snapshot gathered by adapters before updating the frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Raw events in arrival order.
    pub events: Vec<RawInput>,
    /// Whether the window close button was pressed on this frame.
    pub quit_requested: bool,
}

/// Converts pixel-space backend input into grid events.
#[derive(Clone, Copy, Debug)]
pub struct InputTranslator {
    presentation: GridPresentation,
}

impl InputTranslator {
    /// Creates a translator for the provided grid.
    #[must_use]
    pub const fn new(presentation: GridPresentation) -> Self {
        Self { presentation }
    }

    /// Translates one raw event; events outside the grid are dropped.
    #[must_use]
    pub fn translate(&self, raw: RawInput) -> Option<UiInput> {
        match raw {
            RawInput::Key(code) => key(code).map(UiInput::KeyDown),
            RawInput::Text(glyph) if glyph.is_control() => None,
            RawInput::Text(glyph) => Some(UiInput::Text(glyph)),
            RawInput::PointerMoved(pixel) => self
                .presentation
                .pixel_to_cell(pixel)
                .map(UiInput::PointerMoved),
            RawInput::PointerReleased(pixel) => self
                .presentation
                .pixel_to_cell(pixel)
                .map(UiInput::PointerReleased),
        }
    }

    /// Translates every event of a frame into `out`.
    pub fn translate_frame(&self, input: &FrameInput, out: &mut Vec<UiInput>) {
        out.extend(input.events.iter().filter_map(|raw| self.translate(*raw)));
    }
}

const fn key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Other => None,
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Grid that is displayed.
    pub grid: GridPresentation,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, grid: GridPresentation) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            grid,
        }
    }
}

/// Rendering backend capable of presenting Arcade Manager frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_frame` closure receives the frame delta and the
    /// input captured by the adapter, and fills the frame that is presented
    /// next. Returning [`ControlFlow::Break`] stops the backend.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut CellFrame) -> ControlFlow<()> + 'static;
}

/// Headless backend that advances a fixed number of frames and prints them
/// as text.
#[derive(Debug)]
pub struct TextBackend<W> {
    writer: W,
    frame_dt: Duration,
    frame_limit: u64,
    dump_every_frame: bool,
    script: Vec<(u64, RawInput)>,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `writer` and stepping `frame_dt` per frame.
    pub fn new(writer: W, frame_dt: Duration) -> Self {
        Self {
            writer,
            frame_dt,
            frame_limit: u64::MAX,
            dump_every_frame: false,
            script: Vec::new(),
        }
    }

    /// Stops after the provided number of frames.
    #[must_use]
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = frames;
        self
    }

    /// Prints every frame instead of only the last one.
    #[must_use]
    pub fn with_dump_every_frame(mut self, dump: bool) -> Self {
        self.dump_every_frame = dump;
        self
    }

    /// Feeds scripted input; each event is delivered on its frame number.
    #[must_use]
    pub fn with_script(mut self, mut script: Vec<(u64, RawInput)>) -> Self {
        script.sort_by_key(|(frame, _)| *frame);
        self.script = script;
        self
    }

    fn write_frame(writer: &mut W, number: u64, frame: &CellFrame) -> AnyResult<()> {
        writeln!(writer, "-- frame {number} --").context("failed to write frame header")?;
        writeln!(writer, "{}", frame.to_text()).context("failed to write frame")?;
        Ok(())
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut CellFrame) -> ControlFlow<()> + 'static,
    {
        let grid = presentation.grid;
        let mut frame = CellFrame::blank(grid.columns, grid.rows);
        let mut script = std::mem::take(&mut self.script).into_iter().peekable();
        let mut number = 0;

        while number < self.frame_limit {
            let mut input = FrameInput::default();
            while let Some((_, raw)) = script.next_if(|(at, _)| *at <= number) {
                input.events.push(raw);
            }

            let flow = update_frame(self.frame_dt, input, &mut frame);
            number += 1;
            let last = flow.is_break() || number == self.frame_limit;
            if self.dump_every_frame || last {
                Self::write_frame(&mut self.writer, number, &frame)?;
            }
            if flow.is_break() {
                break;
            }
        }

        debug!(frames = number, title = %presentation.window_title, "text backend finished");
        self.writer.flush().context("failed to flush frame output")?;
        Ok(())
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The grid must contain at least one cell.
    EmptyGrid {
        /// Provided column count.
        columns: i32,
        /// Provided row count.
        rows: i32,
    },
    /// Cells must have a positive pixel size.
    InvalidCellSize {
        /// Provided cell width.
        width: f32,
        /// Provided cell height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must not be empty (received {columns}x{rows})")
            }
            Self::InvalidCellSize { width, height } => {
                write!(
                    f,
                    "cell size must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_manager_ui::{Style, UiContext};

    fn grid() -> GridPresentation {
        GridPresentation::new(10, 4, Vec2::new(8.0, 16.0)).expect("valid grid")
    }

    #[test]
    fn grid_creation_rejects_degenerate_cells_without_panicking() {
        let error = GridPresentation::new(10, 4, Vec2::new(8.0, 0.0))
            .expect_err("zero height must be rejected");
        assert!(matches!(error, RenderingError::InvalidCellSize { .. }));
        assert!(matches!(
            GridPresentation::new(0, 4, Vec2::splat(8.0)),
            Err(RenderingError::EmptyGrid { columns: 0, rows: 4 })
        ));
    }

    #[test]
    fn pixels_map_to_cells_using_the_cell_size() {
        let grid = grid();
        assert_eq!(grid.pixel_size(), Vec2::new(80.0, 64.0));
        assert_eq!(grid.pixel_to_cell(Vec2::new(0.0, 0.0)), Some(GridPos::new(0, 0)));
        assert_eq!(grid.pixel_to_cell(Vec2::new(17.5, 33.0)), Some(GridPos::new(2, 2)));
        assert_eq!(grid.pixel_to_cell(Vec2::new(80.0, 10.0)), None);
        assert_eq!(grid.pixel_to_cell(Vec2::new(-0.5, 10.0)), None);
    }

    #[test]
    fn translator_drops_ignored_keys_and_off_grid_pointers() {
        let translator = InputTranslator::new(grid());
        let input = FrameInput {
            events: vec![
                RawInput::Key(KeyCode::Enter),
                RawInput::Key(KeyCode::Other),
                RawInput::Text('a'),
                RawInput::Text('\u{8}'),
                RawInput::PointerReleased(Vec2::new(9.0, 17.0)),
                RawInput::PointerMoved(Vec2::new(500.0, 17.0)),
            ],
            quit_requested: false,
        };
        let mut out = Vec::new();
        translator.translate_frame(&input, &mut out);
        assert_eq!(
            out,
            vec![
                UiInput::KeyDown(Key::Enter),
                UiInput::Text('a'),
                UiInput::PointerReleased(GridPos::new(1, 1)),
            ]
        );
    }

    #[test]
    fn palette_matches_the_sixteen_colour_table() {
        assert_eq!(palette(PaletteColor::Orange), Color::from_rgb_u8(170, 85, 0));
        assert_eq!(palette(PaletteColor::LightPurple), Color::from_rgb_u8(255, 85, 255));
        assert_eq!(palette(PaletteColor::Black), Color::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn capture_resolves_highlight_and_diff_reports_changes() {
        let windows = arcade_manager_ui::WindowManager::new(6, 3);
        let menus = arcade_manager_ui::MenuBar::new();
        let info = arcade_manager_ui::InfoBar::new("OK");
        let mut ctx = UiContext::new(6, 3, Style::default());
        ctx.render(&windows, &menus, &info);
        let first = CellFrame::capture(ctx.surface());

        let cursor = first.cell(GridPos::new(0, 0)).copied();
        assert_eq!(
            cursor.map(|cell| (cell.fg, cell.bg)),
            Some((PaletteColor::White, PaletteColor::Black))
        );
        assert_eq!(first.to_text().lines().nth(2), Some(" OK   "));

        ctx.cursor_mut().move_to(GridPos::new(1, 1));
        ctx.render(&windows, &menus, &info);
        let second = CellFrame::capture(ctx.surface());
        let changed: Vec<_> = second.diff(&first).iter().map(|change| change.position).collect();
        assert_eq!(changed, vec![GridPos::new(0, 0), GridPos::new(1, 1)]);

        assert_eq!(second.diff(&CellFrame::blank(2, 2)).len(), 18);
    }

    #[test]
    fn text_backend_stops_on_break_and_prints_the_last_frame() {
        let mut output = Vec::new();
        let backend = TextBackend::new(&mut output, Duration::from_millis(16))
            .with_frame_limit(10)
            .with_script(vec![(2, RawInput::Text('x'))]);
        let presentation = Presentation::new("TEST", palette(PaletteColor::Black), grid());
        backend
            .run(presentation, |_, input, frame| {
                if input.events.is_empty() {
                    ControlFlow::Continue(())
                } else {
                    *frame = CellFrame::blank(frame.columns(), frame.rows());
                    ControlFlow::Break(())
                }
            })
            .expect("text backend runs");

        let printed = String::from_utf8(output).expect("utf-8 output");
        assert!(printed.starts_with("-- frame 3 --"));
        assert_eq!(printed.lines().count(), 5);
    }
}
