use crate::measure::{FontMetrics, Measurer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarqueeSettings {
    pub speed_px_per_s: f32,
    pub gap_px: f32,
}

impl Default for MarqueeSettings {
    fn default() -> Self {
        Self {
            speed_px_per_s: 30.0,
            gap_px: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub x: i32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub spans: Vec<Span>,
    pub offset_px: f32,
}

fn wrap(value: f32, period: f32) -> f32 {
    if !value.is_finite() || period <= 0.0 {
        return 0.0;
    }
    let wrapped = value.rem_euclid(period);
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// Lays out one row. Text that fits is drawn once at x = 0 and the offset is
/// reset; wider text is drawn twice, one period apart, at the prior offset
/// and the offset is advanced by `speed * elapsed`, modulo `width + gap`.
pub fn layout<M: FontMetrics + ?Sized>(
    measurer: &Measurer,
    metrics: &M,
    text: &str,
    display_width_px: u32,
    elapsed_s: f32,
    prior_offset_px: f32,
    settings: &MarqueeSettings,
) -> Layout {
    let text_width = measurer.width(metrics, text);

    if text_width <= display_width_px {
        return Layout {
            spans: vec![Span {
                x: 0,
                text: measurer.fit(metrics, text).to_string(),
            }],
            offset_px: 0.0,
        };
    }

    let period = text_width as f32 + settings.gap_px.max(0.0);
    let offset = wrap(prior_offset_px, period);
    let lead = (-offset).round() as i32;
    let trail = (period - offset).round() as i32;

    let advance = settings.speed_px_per_s.max(0.0) * elapsed_s.max(0.0);

    Layout {
        spans: vec![
            Span {
                x: lead,
                text: text.to_string(),
            },
            Span {
                x: trail,
                text: text.to_string(),
            },
        ],
        offset_px: wrap(offset + advance, period),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Marquee {
    offset_px: f32,
}

impl Marquee {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset_px(&self) -> f32 {
        self.offset_px
    }

    pub fn step<M: FontMetrics + ?Sized>(
        &mut self,
        measurer: &Measurer,
        metrics: &M,
        text: &str,
        elapsed_s: f32,
        settings: &MarqueeSettings,
    ) -> Vec<Span> {
        let laid = layout(
            measurer,
            metrics,
            text,
            measurer.display_width(),
            elapsed_s,
            self.offset_px,
            settings,
        );
        self.offset_px = laid.offset_px;
        laid.spans
    }
}
