use super::*;

#[test]
fn long_word_is_hard_split_without_losing_characters() {
    let word = "supercalifragilisticexpialidocious";
    let lines = wrap_text_lines(word, 80.0, 8.0);
    assert_eq!(lines, vec!["supercalif", "ragilistic", "expialidoc", "ious"]);
    assert!(lines.iter().all(|l| l.chars().count() <= 10));
    assert_eq!(lines.concat(), word);
}

#[test]
fn words_pack_greedily_with_single_spaces() {
    let lines = wrap_text_lines("light   dependent\treactions in the thylakoid", 130.0, 8.0);
    // 130 / 8 = 16 columns per line.
    assert_eq!(lines, vec!["light dependent", "reactions in the", "thylakoid"]);
}

#[test]
fn split_remainder_continues_on_the_next_line() {
    let lines = wrap_text_lines("a abcdefghijkl b", 40.0, 8.0);
    assert_eq!(lines, vec!["a", "abcde", "fghij", "kl b"]);
}

#[test]
fn blank_input_has_no_lines() {
    assert!(wrap_text_lines("", 130.0, 8.0).is_empty());
    assert!(wrap_text_lines(" \n\t ", 130.0, 8.0).is_empty());
}

#[test]
fn degenerate_budgets_still_make_progress() {
    assert_eq!(wrap_text_lines("abc", 0.0, 8.0), vec!["a", "b", "c"]);
    assert_eq!(wrap_text_lines("ab", 10.0, 0.0), vec!["a", "b"]);
}

#[test]
fn wide_glyphs_count_two_columns() {
    // Four columns fit two CJK glyphs.
    let lines = wrap_text_lines("光合作用", 32.0, 8.0);
    assert_eq!(lines, vec!["光合", "作用"]);
    // A single wide glyph still gets its own line under a one-column budget.
    assert_eq!(wrap_text_lines("光合", 8.0, 8.0), vec!["光", "合"]);
}

#[test]
fn measurer_reports_line_metrics() {
    let m = AverageGlyphMeasurer::default();
    let metrics = m.measure_wrapped("Calvin cycle and carbon fixation", 130.0);
    assert_eq!(metrics.line_count, 2);
    assert_eq!(metrics.height, 32.0);
    assert!(metrics.width <= 130.0);
}

#[test]
fn measurer_reads_config_overrides() {
    let cfg = MindmapConfig::with_overrides(&serde_json::json!({
        "layout": { "avgGlyphWidth": 10, "lineHeight": 0 }
    }));
    let m = AverageGlyphMeasurer::from_config(&cfg);
    assert_eq!(m.avg_glyph_width, 10.0);
    // Non-positive values fall back to the defaults.
    assert_eq!(m.line_height, 16.0);
}
