//! In-memory gradebook snapshot and cell coercion.

use std::fmt;

/// Token some exports write into ungraded cells. Treated exactly like blank.
pub const MISSING_TOKEN: &str = "Missing";

/// An immutable snapshot of the exported sheet: one header row plus one
/// row of raw cell text per student. Every row has exactly
/// `headers.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradebook {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Gradebook {
    /// Builds a snapshot, padding short rows with blanks and truncating
    /// long ones so every row lines up with the headers.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Coerces a raw cell to a score. Blank, the missing token, unparseable
/// text and non-finite values all yield `None`.
pub fn parse_score(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(MISSING_TOKEN) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A rendered output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(i64),
    Blank,
}

impl Cell {
    /// Renders a graded-item cell: numbers are normalized, blank and
    /// missing markers become empty, anything else is kept verbatim.
    pub fn from_item(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(MISSING_TOKEN) {
            return Cell::Blank;
        }
        match parse_score(trimmed) {
            Some(v) => Cell::Number(v),
            None => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Blank
        } else {
            Cell::Text(raw.to_string())
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Blank, Cell::Number)
    }
}

impl From<Option<i64>> for Cell {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Cell::Blank, Cell::Integer)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Integer(v) => write!(f, "{v}"),
            Cell::Blank => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_values() {
        assert_eq!(parse_score("8"), Some(8.0));
        assert_eq!(parse_score(" 7.5 "), Some(7.5));
        assert_eq!(parse_score("-1"), Some(-1.0));
    }

    #[test]
    fn test_parse_score_blank_markers() {
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("   "), None);
        assert_eq!(parse_score("Missing"), None);
        assert_eq!(parse_score("missing"), None);
    }

    #[test]
    fn test_parse_score_rejects_garbage_and_non_finite() {
        assert_eq!(parse_score("EX"), None);
        assert_eq!(parse_score("8/10"), None);
        assert_eq!(parse_score("NaN"), None);
        assert_eq!(parse_score("inf"), None);
    }

    #[test]
    fn test_gradebook_pads_and_truncates_rows() {
        let book = Gradebook::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()], vec!["1".into(), "2".into(), "3".into()]],
        );

        assert_eq!(book.rows()[0], vec!["1".to_string(), String::new()]);
        assert_eq!(book.rows()[1].len(), 2);
    }

    #[test]
    fn test_item_cell_rendering() {
        assert_eq!(Cell::from_item("9"), Cell::Number(9.0));
        assert_eq!(Cell::from_item("Missing"), Cell::Blank);
        assert_eq!(Cell::from_item(" EX "), Cell::Text("EX".into()));
        assert_eq!(Cell::Number(82.5).to_string(), "82.5");
        assert_eq!(Cell::Integer(82).to_string(), "82");
        assert_eq!(Cell::Blank.to_string(), "");
    }
}
