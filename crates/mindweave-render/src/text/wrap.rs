//! Greedy word wrapping against a fixed per-glyph width budget.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display columns of `s` (wide CJK glyphs count as two).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Splits `word` after at most `max_cols` columns. The head always holds at least one char so
/// a glyph wider than the budget still makes progress.
fn split_word(word: &str, max_cols: usize) -> (&str, &str) {
    let mut cols = 0usize;
    for (idx, ch) in word.char_indices() {
        let w = char_width(ch);
        if cols + w > max_cols && idx > 0 {
            return word.split_at(idx);
        }
        cols += w;
    }
    (word, "")
}

/// Wraps `text` into lines of at most `max_width_px / avg_glyph_width_px` columns.
///
/// Words are packed greedily with single spaces. A word longer than a whole line is hard-split
/// (no hyphen); its remainder starts the next line. Empty or whitespace-only text gives no lines.
pub fn wrap_text_lines(text: &str, max_width_px: f64, avg_glyph_width_px: f64) -> Vec<String> {
    let budget = max_width_px / avg_glyph_width_px;
    let max_cols = if budget.is_finite() && budget >= 1.0 {
        budget.floor() as usize
    } else {
        1
    };

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_cols = 0usize;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_cols = display_width(word);

        if word_cols > max_cols {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            while word_cols > max_cols {
                let (head, tail) = split_word(word, max_cols);
                if tail.is_empty() {
                    break;
                }
                lines.push(head.to_string());
                word = tail;
                word_cols = display_width(word);
            }
            line.push_str(word);
            line_cols = word_cols;
            continue;
        }

        let sep = usize::from(!line.is_empty());
        if line_cols + sep + word_cols > max_cols && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_cols = word_cols;
        } else {
            if sep == 1 {
                line.push(' ');
            }
            line.push_str(word);
            line_cols += sep + word_cols;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
