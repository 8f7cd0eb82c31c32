use std::fmt::Write as _;

/// Number formatting for SVG attributes and path data: at most three fractional digits,
/// half-up rounding, no `-0`, trailing zeros trimmed. Non-finite values print as `0`.
pub(crate) fn fmt(v: f64) -> String {
    let mut out = String::new();
    fmt_into(&mut out, v);
    out
}

pub(crate) fn fmt_into(out: &mut String, v: f64) {
    if !v.is_finite() || v.abs() < 0.0005 {
        out.push('0');
        return;
    }
    let k = (v * 1000.0 + 0.5).floor() as i64;
    if k == 0 {
        out.push('0');
        return;
    }

    let abs = k.unsigned_abs();
    let (int_part, frac) = (abs / 1000, abs % 1000);
    if k.is_negative() {
        out.push('-');
    }
    let _ = write!(out, "{int_part}");
    if frac == 0 {
        return;
    }
    let digits = format!("{frac:03}");
    out.push('.');
    out.push_str(digits.trim_end_matches('0'));
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_xml_into(&mut out, text);
    out
}

pub(crate) fn escape_xml_into(out: &mut String, text: &str) {
    let mut start = 0usize;
    for (i, b) in text.bytes().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
}
