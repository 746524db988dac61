pub const WORST_CASE_CHAR_WIDTH: u32 = 6;

/// Text measurement primitives a font binding may offer. Each returns `None`
/// when unsupported.
pub trait FontMetrics {
    fn bounding_box_width(&self, _text: &str) -> Option<u32> {
        None
    }

    fn glyph_advance(&self) -> Option<u32> {
        None
    }

    fn cell_width(&self) -> Option<u32> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    BoundingBox,
    GlyphAdvance(u32),
    CellSize(u32),
    Estimate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurer {
    strategy: Strategy,
    display_width: u32,
    char_width: u32,
}

impl Measurer {
    pub fn probe<M: FontMetrics + ?Sized>(metrics: &M, display_width: u32) -> Self {
        let positive = |value: Option<u32>| value.filter(|v| *v > 0);

        let (strategy, char_width) = if let Some(m_width) = positive(metrics.bounding_box_width("M"))
        {
            let char_width = positive(metrics.glyph_advance()).unwrap_or(m_width);
            (Strategy::BoundingBox, char_width)
        } else if let Some(advance) = positive(metrics.glyph_advance()) {
            (Strategy::GlyphAdvance(advance), advance)
        } else if let Some(cell) = positive(metrics.cell_width()) {
            (Strategy::CellSize(cell), cell)
        } else {
            (Strategy::Estimate, WORST_CASE_CHAR_WIDTH)
        };

        Self {
            strategy,
            display_width,
            char_width,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn display_width(&self) -> u32 {
        self.display_width
    }

    pub fn width<M: FontMetrics + ?Sized>(&self, metrics: &M, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }

        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        match self.strategy {
            Strategy::BoundingBox => metrics
                .bounding_box_width(text)
                .unwrap_or(self.display_width),
            Strategy::GlyphAdvance(advance) | Strategy::CellSize(advance) => {
                chars.saturating_mul(advance)
            }
            Strategy::Estimate => self.display_width,
        }
    }

    /// Characters guaranteed to fit across the display.
    pub fn max_chars(&self) -> usize {
        (self.display_width / self.char_width.max(1)) as usize
    }

    pub fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.max_chars()) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Longest prefix of `text` that measures within the display width.
    /// Without real metrics this falls back to the character count.
    pub fn fit<'a, M: FontMetrics + ?Sized>(&self, metrics: &M, text: &'a str) -> &'a str {
        if self.strategy == Strategy::Estimate {
            return self.truncate(text);
        }
        if self.width(metrics, text) <= self.display_width {
            return text;
        }

        let mut end = text.len();
        for (idx, _) in text.char_indices().rev() {
            end = idx;
            if self.width(metrics, &text[..end]) <= self.display_width {
                break;
            }
        }
        &text[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;
    impl FontMetrics for Nothing {}

    struct Cells;
    impl FontMetrics for Cells {
        fn cell_width(&self) -> Option<u32> {
            Some(8)
        }
    }

    struct Advance;
    impl FontMetrics for Advance {
        fn glyph_advance(&self) -> Option<u32> {
            Some(6)
        }
        fn cell_width(&self) -> Option<u32> {
            Some(8)
        }
    }

    struct Boxed;
    impl FontMetrics for Boxed {
        fn bounding_box_width(&self, text: &str) -> Option<u32> {
            // 5 px glyphs with 1 px between them.
            let n = text.chars().count() as u32;
            Some(n * 6 - 1)
        }
    }

    #[test]
    fn picks_richest_primitive() {
        assert_eq!(Measurer::probe(&Boxed, 128).strategy(), Strategy::BoundingBox);
        assert_eq!(
            Measurer::probe(&Advance, 128).strategy(),
            Strategy::GlyphAdvance(6)
        );
        assert_eq!(Measurer::probe(&Cells, 128).strategy(), Strategy::CellSize(8));
        assert_eq!(Measurer::probe(&Nothing, 128).strategy(), Strategy::Estimate);
    }

    #[test]
    fn widths_follow_strategy() {
        assert_eq!(Measurer::probe(&Boxed, 128).width(&Boxed, "abc"), 17);
        assert_eq!(Measurer::probe(&Advance, 128).width(&Advance, "abc"), 18);
        assert_eq!(Measurer::probe(&Cells, 128).width(&Cells, "abc"), 24);
        assert_eq!(Measurer::probe(&Nothing, 128).width(&Nothing, "abc"), 128);
        assert_eq!(Measurer::probe(&Nothing, 128).width(&Nothing, ""), 0);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let measurer = Measurer::probe(&Cells, 32);
        assert_eq!(measurer.max_chars(), 4);
        assert_eq!(measurer.truncate("héllo wörld"), "héll");
        assert_eq!(measurer.truncate("ab"), "ab");
    }

    struct Proportional;
    impl FontMetrics for Proportional {
        fn bounding_box_width(&self, text: &str) -> Option<u32> {
            Some(text.chars().map(|c| if c == 'M' { 10 } else { 2 }).sum())
        }
    }

    #[test]
    fn fit_cuts_by_measured_width() {
        let measurer = Measurer::probe(&Proportional, 128);
        assert_eq!(measurer.max_chars(), 12);

        let narrow = "i".repeat(30);
        assert_eq!(measurer.fit(&Proportional, &narrow), narrow);

        // 12 * 10 + 4 * 2 = 128
        let wide = format!("{}iiiiii", "M".repeat(12));
        assert_eq!(measurer.fit(&Proportional, &wide), format!("{}iiii", "M".repeat(12)));
    }

    #[test]
    fn fit_without_metrics_uses_char_count() {
        let measurer = Measurer::probe(&Nothing, 128);
        let text = "x".repeat(40);
        assert_eq!(measurer.fit(&Nothing, &text).chars().count(), 21);
    }

    #[test]
    fn estimate_uses_worst_case_char_width() {
        let measurer = Measurer::probe(&Nothing, 128);
        assert_eq!(measurer.max_chars(), 21);
    }
}
