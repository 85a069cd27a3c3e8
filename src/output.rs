//! Output of grade reports for the spreadsheet exporter.
//!
//! Writes the cleaned table as CSV and its display hints as a JSON
//! sidecar, and logs a per-category summary.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Language;
use crate::error::{GradebookError, Result};
use crate::pipeline::{CategorySummary, DisplayHints, GradeReport, SheetMetadata};

/// Logs one line per category plus the number of graded rows.
pub fn print_summary(report: &GradeReport) {
    for category in &report.categories {
        info!(
            category = %category.category,
            weight = ?category.weight,
            items = category.items,
            defined_rows = category.defined_rows,
            "Category summary"
        );
    }
    info!(
        policy = %report.policy,
        rows = report.rows.len(),
        graded_rows = report.graded_rows,
        "Report summary"
    );
}

/// Writes the report table as CSV to any writer. Output is fully
/// determined by the report contents.
pub fn write_report<W: Write>(writer: W, report: &GradeReport) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(report.headers())?;
    for row in &report.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| GradebookError::io("<report writer>", e))?;

    Ok(())
}

/// Writes the report table to a CSV file at `path`, replacing it.
pub fn write_report_csv(path: impl AsRef<Path>, report: &GradeReport) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = report.rows.len(), "Writing report CSV");

    let file = File::create(path).map_err(|e| GradebookError::io(path, e))?;
    write_report(file, report)
}

#[derive(Debug, Serialize)]
pub struct MetadataField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ColumnHint {
    pub header: String,
    #[serde(flatten)]
    pub hints: DisplayHints,
}

/// JSON sidecar consumed by the spreadsheet styler.
#[derive(Debug, Serialize)]
pub struct HintsDocument {
    pub generated_at: DateTime<Utc>,
    pub language: Language,
    pub policy: String,
    pub metadata: Vec<MetadataField>,
    pub final_grade_label: &'static str,
    pub columns: Vec<ColumnHint>,
    pub categories: Vec<CategorySummary>,
}

pub fn hints_document(report: &GradeReport, metadata: &SheetMetadata) -> HintsDocument {
    let labels = report.labels();

    HintsDocument {
        generated_at: Utc::now(),
        language: report.language,
        policy: report.policy.to_string(),
        metadata: vec![
            MetadataField {
                label: labels.teacher,
                value: metadata.teacher.clone(),
            },
            MetadataField {
                label: labels.subject,
                value: metadata.subject.clone(),
            },
            MetadataField {
                label: labels.class,
                value: metadata.class.clone(),
            },
            MetadataField {
                label: labels.level,
                value: metadata.level.clone(),
            },
        ],
        final_grade_label: labels.final_grade,
        columns: report
            .columns
            .iter()
            .map(|c| ColumnHint {
                header: c.header.clone(),
                hints: c.hints,
            })
            .collect(),
        categories: report.categories.clone(),
    }
}

/// Writes the display-hints sidecar as pretty-printed JSON.
pub fn write_hints_json(
    path: impl AsRef<Path>,
    report: &GradeReport,
    metadata: &SheetMetadata,
) -> Result<()> {
    let path = path.as_ref();
    let document = hints_document(report, metadata);
    let body = serde_json::to_vec_pretty(&document)?;

    std::fs::write(path, body).map_err(|e| GradebookError::io(path, e))?;
    debug!(path = %path.display(), columns = document.columns.len(), "Hints written");
    Ok(())
}
