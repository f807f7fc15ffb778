use unicode_width::UnicodeWidthStr;

/// Measures label text in drawing units.
pub trait TextMetrics {
    fn text_width(&self, text: &str) -> f64;
}

/// Every display column of text is `char_width` wide.
///
/// Wide characters count twice and combining marks not at all, which is close
/// enough for monospace and most sans-serif label fonts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    char_width: f64,
}

impl MonospaceMetrics {
    pub fn new(char_width: f64) -> Self {
        Self { char_width }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str) -> f64 {
        text.width() as f64 * self.char_width
    }
}
