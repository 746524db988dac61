//! Text layout for small fixed-resolution displays.

pub mod frame;
pub mod marquee;
pub mod measure;

pub use frame::{render_frame, row_y, Display, DrawText, Frame};
pub use marquee::{layout, Layout, Marquee, MarqueeSettings, Span};
pub use measure::{FontMetrics, Measurer, Strategy, WORST_CASE_CHAR_WIDTH};
