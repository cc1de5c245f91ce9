//! Approximate text measurement and word wrapping.
//!
//! Measurement uses fixed em-ratios rather than real font metrics; the
//! presentation layer owns actual glyph data. Results feed alignment and
//! wrapping math and are cached independently of the render cache.

use crate::cache::BoundedCache;

/// Advance width as a fraction of font size.
const CHAR_WIDTH_RATIO: f32 = 0.6;

/// Line height as a fraction of font size.
const LINE_HEIGHT_RATIO: f32 = 1.2;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    font_family: String,
    font_size_bits: u32,
    bold: bool,
    italic: bool,
}

/// Measures and wraps text, caching measurements.
pub struct TextMeasurer {
    cache: BoundedCache<TextKey, (i64, i64)>,
}

impl TextMeasurer {
    /// Create a measurer with the given cache capacity.
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(cache_capacity),
        }
    }

    /// Measure text dimensions (width, height) in pixels.
    pub fn measure(
        &mut self,
        text: &str,
        font_family: &str,
        font_size: f32,
        bold: bool,
        italic: bool,
    ) -> (i64, i64) {
        let key = TextKey {
            text: text.to_string(),
            font_family: font_family.to_string(),
            font_size_bits: font_size.to_bits(),
            bold,
            italic,
        };
        if let Some(size) = self.cache.get(&key) {
            return *size;
        }

        let char_count = text.chars().count();
        let width = (char_count as f32 * font_size * CHAR_WIDTH_RATIO).round() as i64;
        let height = (font_size * LINE_HEIGHT_RATIO).round() as i64;
        self.cache.put(key, (width, height));
        (width, height)
    }

    /// Greedy word wrap to fit `max_width` pixels.
    ///
    /// A word wider than the limit gets its own line rather than being
    /// broken mid-word. Empty text yields a single empty line.
    pub fn wrap(
        &mut self,
        text: &str,
        max_width: i64,
        font_family: &str,
        font_size: f32,
    ) -> Vec<String> {
        if text.is_empty() {
            return vec![String::new()];
        }

        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            let (width, _) = self.measure(&candidate, font_family, font_size, false, false);
            if width <= max_width || current.is_empty() {
                current = candidate;
                if width > max_width {
                    // Oversized single word occupies its own line
                    lines.push(std::mem::take(&mut current));
                }
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    /// Drop all cached measurements.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached measurements.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
