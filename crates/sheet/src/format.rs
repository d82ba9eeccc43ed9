//! Display formatting for individual cells.

use crate::cell::CellValue;

/// Text longer than this many characters is truncated
pub const MAX_TEXT_CHARS: usize = 40;

const ELLIPSIS: &str = "...";

/// Convert a cell into the string shown in a report.
///
/// - missing values become `""`
/// - integral numbers are printed without a decimal point
/// - other numbers are fixed to two decimals
/// - text longer than [`MAX_TEXT_CHARS`] is cut and suffixed with `...`
///
/// Never fails; anything that does not parse as a number is treated as text.
#[must_use]
pub fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => format_number(*f).unwrap_or_else(|| format_text(&f.to_string())),
        CellValue::String(s) => format_str(s),
        other => format_str(&other.to_string()),
    }
}

/// Format a raw string the same way a text cell is formatted.
///
/// A float parse is only attempted when the string contains a `.`;
/// otherwise an integer parse is tried before falling back to text.
#[must_use]
pub fn format_str(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }

    if value.contains('.') {
        if let Some(formatted) = value.parse::<f64>().ok().and_then(format_number) {
            return formatted;
        }
    } else if let Ok(int) = value.parse::<i64>() {
        return int.to_string();
    }

    format_text(value)
}

/// `None` for NaN and infinities, which are shown as text instead.
fn format_number(num: f64) -> Option<String> {
    if !num.is_finite() {
        return None;
    }
    if num.fract() == 0.0 {
        return Some(format_integral(num));
    }

    let fixed = format!("{num:.2}");
    // 2.999 rounds to "3.00"; print it as an integer so the output formats to itself
    match fixed.parse::<f64>() {
        Ok(rounded) if rounded.fract() == 0.0 => Some(format_integral(rounded)),
        _ => Some(fixed),
    }
}

fn format_integral(num: f64) -> String {
    if num == 0.0 {
        // also covers -0.0
        "0".to_string()
    } else {
        format!("{num:.0}")
    }
}

fn format_text(value: &str) -> String {
    let value = value.trim();
    if value.chars().count() > MAX_TEXT_CHARS {
        let mut truncated: String = value.chars().take(MAX_TEXT_CHARS).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        value.to_string()
    }
}
