mod wrap;

#[cfg(test)]
mod tests;

pub use wrap::{display_width, wrap_text_lines};

use mindweave_core::MindmapConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Turns a label into lines for a fixed-width node.
pub trait TextMeasurer {
    fn wrap_lines(&self, text: &str, max_width_px: f64) -> Vec<String>;

    fn line_height(&self) -> f64;

    fn measure_wrapped(&self, text: &str, max_width_px: f64) -> TextMetrics;
}

/// Approximates every glyph with the same advance width. Deterministic: no font lookups, no
/// locale-sensitive behavior.
#[derive(Debug, Clone, Copy)]
pub struct AverageGlyphMeasurer {
    pub avg_glyph_width: f64,
    pub line_height: f64,
}

impl Default for AverageGlyphMeasurer {
    fn default() -> Self {
        Self {
            avg_glyph_width: 8.0,
            line_height: 16.0,
        }
    }
}

impl AverageGlyphMeasurer {
    pub fn from_config(config: &MindmapConfig) -> Self {
        let d = Self::default();
        Self {
            avg_glyph_width: config
                .get_f64("layout.avgGlyphWidth")
                .filter(|w| *w > 0.0)
                .unwrap_or(d.avg_glyph_width),
            line_height: config
                .get_f64("layout.lineHeight")
                .filter(|h| *h > 0.0)
                .unwrap_or(d.line_height),
        }
    }
}

impl TextMeasurer for AverageGlyphMeasurer {
    fn wrap_lines(&self, text: &str, max_width_px: f64) -> Vec<String> {
        wrap_text_lines(text, max_width_px, self.avg_glyph_width)
    }

    fn line_height(&self) -> f64 {
        self.line_height
    }

    fn measure_wrapped(&self, text: &str, max_width_px: f64) -> TextMetrics {
        let lines = self.wrap_lines(text, max_width_px);
        let widest = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);
        TextMetrics {
            width: widest as f64 * self.avg_glyph_width,
            height: lines.len() as f64 * self.line_height,
            line_count: lines.len(),
        }
    }
}
