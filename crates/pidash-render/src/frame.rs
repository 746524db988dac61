use crate::marquee::Span;
use crate::measure::FontMetrics;
use anyhow::Result;

pub trait Display {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn metrics(&self) -> &dyn FontMetrics;
    fn clear(&mut self);
    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()>;
    /// Pushes the back buffer to the device.
    fn commit(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawText {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    draws: Vec<DrawText>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: i32, y: i32, text: impl Into<String>) {
        self.draws.push(DrawText {
            x,
            y,
            text: text.into(),
        });
    }

    pub fn push_spans(&mut self, y: i32, spans: Vec<Span>) {
        for span in spans {
            self.push(span.x, y, span.text);
        }
    }

    pub fn draws(&self) -> &[DrawText] {
        &self.draws
    }
}

/// Draws `frame` and commits it. A drawing error discards the partial frame
/// without committing.
pub fn render_frame<D: Display + ?Sized>(display: &mut D, frame: &Frame) -> Result<()> {
    display.clear();
    for draw in frame.draws() {
        if let Err(err) = display.draw_text(draw.x, draw.y, &draw.text) {
            display.clear();
            return Err(err);
        }
    }
    display.commit()
}

pub fn row_y(index: usize, rows: usize, height: u32) -> i32 {
    let rows = rows.max(1) as u32;
    ((height / rows) * index as u32) as i32
}
