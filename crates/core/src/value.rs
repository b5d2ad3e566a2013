use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar in the audit matrix.
///
/// Imported payloads are arrays of JSON scalars, so the serde form is
/// untagged: numbers stay numbers and everything else is text. Values are
/// never coerced between the two variants after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl CellValue {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// True for blank or whitespace-only text. Numbers are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Number(_) => false,
            CellValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// Display text, with integral numbers printed without a fraction.
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Trimmed display text, used as the duplicate-detection key.
    pub fn key_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(_) => self.display(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(CellValue::Number(42.0).display(), "42");
        assert_eq!(CellValue::Number(-3.0).display(), "-3");
        assert_eq!(CellValue::Number(2.5).display(), "2.5");
    }

    #[test]
    fn key_text_trims_text_only() {
        assert_eq!(CellValue::text("  PO100 ").key_text(), "PO100");
        assert_eq!(CellValue::Number(100.0).key_text(), "100");
    }

    #[test]
    fn empty_detection() {
        assert!(CellValue::empty().is_empty());
        assert!(CellValue::text("   ").is_empty());
        assert!(!CellValue::text("x").is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn untagged_json_keeps_variants_apart() {
        let row: Vec<CellValue> = serde_json::from_str(r#"["PO100", 5, "5", 2.5]"#).unwrap();
        assert_eq!(
            row,
            vec![
                CellValue::text("PO100"),
                CellValue::Number(5.0),
                CellValue::text("5"),
                CellValue::Number(2.5),
            ]
        );
        let back = serde_json::to_string(&row).unwrap();
        assert_eq!(back, r#"["PO100",5.0,"5",2.5]"#);
    }
}
