use anyhow::Result;
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use pidash_render::{Display, FontMetrics};
use std::io::{self, Stdout, Write};

/// Pixel width of one terminal column.
pub const CELL_PX: u32 = 6;
/// Pixel height of one terminal row.
pub const ROW_PX: u32 = 16;

pub struct CellMetrics;

impl FontMetrics for CellMetrics {
    fn cell_width(&self) -> Option<u32> {
        Some(CELL_PX)
    }
}

/// Character-grid stand-in for the panel, for development away from the hardware.
pub struct TerminalDisplay<W: Write = Stdout> {
    width: u32,
    height: u32,
    grid: Vec<Vec<char>>,
    out: W,
}

impl TerminalDisplay<Stdout> {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut out = io::stdout();
        execute!(out, terminal::Clear(ClearType::All), cursor::Hide)?;
        Ok(Self::with_writer(width, height, out))
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn with_writer(width: u32, height: u32, out: W) -> Self {
        let cols = (width / CELL_PX).max(1) as usize;
        let rows = (height / ROW_PX).max(1) as usize;
        Self {
            width,
            height,
            grid: vec![vec![' '; cols]; rows],
            out,
        }
    }

    #[cfg(test)]
    fn rows(&self) -> Vec<String> {
        self.grid.iter().map(|row| row.iter().collect()).collect()
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn metrics(&self) -> &dyn FontMetrics {
        &CellMetrics
    }

    fn clear(&mut self) {
        for row in &mut self.grid {
            row.fill(' ');
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        if y < 0 {
            return Ok(());
        }
        let Some(row) = self.grid.get_mut((y as u32 / ROW_PX) as usize) else {
            return Ok(());
        };

        let start = x.div_euclid(CELL_PX as i32);
        for (i, ch) in text.chars().enumerate() {
            let col = start + i as i32;
            if col < 0 {
                continue;
            }
            match row.get_mut(col as usize) {
                Some(cell) => *cell = ch,
                None => break,
            }
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let border: String = "-".repeat(self.grid.first().map_or(0, Vec::len));
        queue!(self.out, cursor::MoveTo(0, 0), Print(format!("+{border}+")))?;
        for (i, row) in self.grid.iter().enumerate() {
            let line: String = row.iter().collect();
            queue!(
                self.out,
                cursor::MoveTo(0, (i + 1) as u16),
                Print(format!("|{line}|"))
            )?;
        }
        queue!(
            self.out,
            cursor::MoveTo(0, (self.grid.len() + 1) as u16),
            Print(format!("+{border}+"))
        )?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for TerminalDisplay<W> {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show);
    }
}
