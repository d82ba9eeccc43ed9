use chrono::{NaiveDateTime, Timelike};
use std::fmt;

/// Represents a single cell value read from a worksheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
    /// Spreadsheet error code such as `#DIV/0!`
    Error(String),
}

/// Broad category of a cell value, used for sheet summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Text,
    Boolean,
    Date,
    Error,
}

impl ValueKind {
    /// Lowercase label used in reports
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
            ValueKind::Error => "error",
        }
    }
}

impl CellValue {
    /// A cell is missing when it is null or holds only whitespace
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Value category, `None` for missing cells
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        if self.is_missing() {
            return None;
        }
        Some(match self {
            CellValue::Int(_) | CellValue::Float(_) => ValueKind::Number,
            CellValue::Bool(_) => ValueKind::Boolean,
            CellValue::DateTime(_) => ValueKind::Date,
            CellValue::Error(_) => ValueKind::Error,
            CellValue::String(_) | CellValue::Null => ValueKind::Text,
        })
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(true) => write!(f, "TRUE"),
            CellValue::Bool(false) => write!(f, "FALSE"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::DateTime(dt) => {
                if dt.num_seconds_from_midnight() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            CellValue::Error(code) => write!(f, "{code}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_missing() {
        assert!(CellValue::Null.is_missing());
        assert!(CellValue::from("").is_missing());
        assert!(CellValue::from("   \t").is_missing());
        assert!(!CellValue::from("x").is_missing());
        assert!(!CellValue::Int(0).is_missing());
        assert!(!CellValue::Bool(false).is_missing());
    }

    #[test]
    fn test_kind() {
        assert_eq!(CellValue::Int(1).kind(), Some(ValueKind::Number));
        assert_eq!(CellValue::Float(1.5).kind(), Some(ValueKind::Number));
        assert_eq!(CellValue::from("a").kind(), Some(ValueKind::Text));
        assert_eq!(CellValue::Null.kind(), None);
        assert_eq!(CellValue::from(" ").kind(), None);
    }

    #[test]
    fn test_display_dates() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::from(midnight).to_string(), "2024-03-01");

        let afternoon = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        assert_eq!(
            CellValue::from(afternoon).to_string(),
            "2024-03-01 14:30:05"
        );
    }

    #[test]
    fn test_display_bool_and_option() {
        assert_eq!(CellValue::Bool(true).to_string(), "TRUE");
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
        assert_eq!(CellValue::from(Some(4)), CellValue::Int(4));
    }
}
