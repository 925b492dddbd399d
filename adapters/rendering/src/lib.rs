#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Plain-text presentation of Robo Trail frames.

use std::{fmt, io::Write};

use robo_trail_core::{CellCoord, Direction, Frame, FrameSink};
use tracing::warn;

/// Symbol drawn in a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// Walkable empty cell.
    Floor,
    /// Candy wall.
    Wall,
    /// Star not yet collected.
    Star,
    /// Bonus not yet collected.
    Bonus,
    /// Home of Coders.
    Finish,
    /// The robot, pointing where it faces.
    Actor(Direction),
}

impl Glyph {
    /// Character used for the glyph.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Star => '*',
            Self::Bonus => '+',
            Self::Finish => 'H',
            Self::Actor(Direction::North) => '^',
            Self::Actor(Direction::East) => '>',
            Self::Actor(Direction::South) => 'v',
            Self::Actor(Direction::West) => '<',
        }
    }
}

/// Grid of glyphs captured from a frame, row 0 first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextScene {
    rows: Vec<Vec<Glyph>>,
}

impl TextScene {
    /// Lays out the frame. The actor hides whatever lies beneath it.
    #[must_use]
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        let bounds = frame.grid.bounds();
        let rows = (0..bounds.rows())
            .map(|row| {
                (0..bounds.columns())
                    .map(|column| glyph_at(frame, CellCoord::new(column, row)))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Glyph drawn at the cell, if the cell lies on the board.
    #[must_use]
    pub fn glyph(&self, cell: CellCoord) -> Option<Glyph> {
        let row = self.rows.get(usize::try_from(cell.row()).ok()?)?;
        row.get(usize::try_from(cell.column()).ok()?).copied()
    }
}

fn glyph_at(frame: &Frame<'_>, cell: CellCoord) -> Glyph {
    if frame.actor.position == cell {
        Glyph::Actor(frame.actor.facing)
    } else if frame.grid.is_wall(cell) {
        Glyph::Wall
    } else if frame.grid.finish() == cell {
        Glyph::Finish
    } else if frame.bonus.iter().any(|bonus| bonus.cell == cell) {
        Glyph::Bonus
    } else if frame.stars.contains(&cell) {
        Glyph::Star
    } else {
        Glyph::Floor
    }
}

impl fmt::Display for TextScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            for (column, glyph) in row.iter().enumerate() {
                if column > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", glyph.symbol())?;
            }
        }
        Ok(())
    }
}

/// Renders a frame into a multi-line string.
#[must_use]
pub fn render(frame: &Frame<'_>) -> String {
    TextScene::from_frame(frame).to_string()
}

/// Frame sink that writes every frame to the wrapped writer.
#[derive(Debug)]
pub struct TextRenderer<W> {
    writer: W,
    presented: usize,
}

impl<W: Write> TextRenderer<W> {
    /// Wraps the writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            presented: 0,
        }
    }

    /// Number of frames written so far.
    #[must_use]
    pub fn presented(&self) -> usize {
        self.presented
    }

    /// Releases the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for TextRenderer<W> {
    fn present(&mut self, frame: &Frame<'_>) {
        let scene = TextScene::from_frame(frame);
        match writeln!(self.writer, "{scene}\n").and_then(|()| self.writer.flush()) {
            Ok(()) => self.presented += 1,
            Err(error) => warn!(%error, "failed to write frame"),
        }
    }
}
