//! CSV reader for exported gradebooks.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{GradebookError, Result};
use crate::table::Gradebook;

/// Reads a gradebook export from `path`.
pub fn read_gradebook(path: impl AsRef<Path>) -> Result<Gradebook> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| GradebookError::io(path, e))?;
    parse_gradebook(file)
}

/// Decodes a CSV gradebook from any reader.
///
/// The first record is the header row. Rows in which every cell is blank
/// are dropped; ragged rows are tolerated.
///
/// # Errors
///
/// Returns an error only if the bytes are not readable CSV.
pub fn parse_gradebook<R: Read>(reader: R) -> Result<Gradebook> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            skipped += 1;
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(
        columns = headers.len(),
        rows = rows.len(),
        skipped,
        "Gradebook parsed"
    );
    Ok(Gradebook::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_only() {
        let book = parse_gradebook("First Name,Last Name\n".as_bytes()).unwrap();
        assert_eq!(book.headers(), ["First Name", "Last Name"]);
        assert_eq!(book.row_count(), 0);
    }

    #[test]
    fn test_parse_strips_bom_and_blank_rows() {
        let data = "\u{feff}First Name,Score\nAda,9\n,\n  ,  \nGrace,Missing\n";
        let book = parse_gradebook(data.as_bytes()).unwrap();

        assert_eq!(book.headers()[0], "First Name");
        assert_eq!(book.row_count(), 2);
        assert_eq!(book.rows()[1][1], "Missing");
    }

    #[test]
    fn test_parse_ragged_rows() {
        let data = "a,b,c\n1\n1,2,3,4\n";
        let book = parse_gradebook(data.as_bytes()).unwrap();

        assert_eq!(book.rows()[0], ["1", "", ""]);
        assert_eq!(book.rows()[1], ["1", "2", "3"]);
    }

    #[test]
    fn test_parse_quoted_headers_with_commas() {
        let data = "\"Quiz 1 (Grading Category: Tests, Max Points: 25.0)\"\n20\n";
        let book = parse_gradebook(data.as_bytes()).unwrap();

        assert_eq!(
            book.headers()[0],
            "Quiz 1 (Grading Category: Tests, Max Points: 25.0)"
        );
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_gradebook("/nonexistent/gradebook.csv");
        assert!(matches!(result, Err(GradebookError::Io { .. })));
    }
}
