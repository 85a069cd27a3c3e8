//! End-to-end run: classify headers → reorganize columns → aggregate
//! categories → combine final grades.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{GradingConfig, Language};
use crate::grading::aggregate::aggregate_categories;
use crate::grading::grade::combine_final_grades;
use crate::grading::policy::PolicyKind;
use crate::grading::types::CategoryGroups;
use crate::headers::classify_headers;
use crate::labels::LabelSet;
use crate::reorganize::{ColumnRole, reorganize};
use crate::table::{Cell, Gradebook};

/// Presentation flags handed to the exporter. They never feed back into
/// grading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DisplayHints {
    pub is_name_column: bool,
    pub is_category_average: bool,
    pub is_final_grade: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportColumn {
    pub header: String,
    pub hints: DisplayHints,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub weight: Option<f64>,
    pub items: usize,
    pub defined_rows: usize,
}

/// Free-text sheet details shown by the exporter, display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetMetadata {
    pub teacher: String,
    pub subject: String,
    pub class: String,
    pub level: String,
}

/// The cleaned table plus everything the exporter needs to present it.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeReport {
    pub policy: PolicyKind,
    pub language: Language,
    pub columns: Vec<ReportColumn>,
    pub rows: Vec<Vec<Cell>>,
    pub categories: Vec<CategorySummary>,
    /// Rows with a final grade.
    pub graded_rows: usize,
}

impl GradeReport {
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.header == header)
    }

    pub fn labels(&self) -> &'static LabelSet {
        LabelSet::for_language(self.language)
    }
}

/// Runs the full grading pipeline over an immutable gradebook snapshot.
#[tracing::instrument(
    skip_all,
    fields(policy = %config.policy.kind(), rows = book.row_count(), columns = book.column_count())
)]
pub fn run(book: &Gradebook, config: &GradingConfig) -> GradeReport {
    let labels = LabelSet::for_language(config.language);

    let classification = classify_headers(book.headers(), &config.policy);
    let groups = CategoryGroups::build(&classification, &config.weights);
    let averages = aggregate_categories(book, &groups, &config.policy);
    let finals = combine_final_grades(&averages, book.row_count());

    if !groups.is_empty() && groups.iter().all(|g| g.weight.is_none()) {
        warn!("No category has a configured weight, final grades will be blank");
    }

    // Computed columns replace input columns of the same name.
    let mut layout = reorganize(&classification, labels);
    layout.drop_replaced(
        averages
            .iter()
            .map(|a| a.header.as_str())
            .chain([labels.final_grade]),
    );
    for (from, to) in layout.renames() {
        debug!(from, to, "Column renamed");
    }
    let cleaned = layout.apply(book);

    // Column plan over the cleaned table: (header, hints, how to fill each row).
    enum Source<'a> {
        Text(usize),
        Item(usize),
        Average(&'a [Option<f64>]),
        Final,
    }

    let mut plan: Vec<(ReportColumn, Source)> = Vec::new();

    for (index, column) in layout.columns().iter().enumerate() {
        if column.role == ColumnRole::CategoryItem {
            continue;
        }
        plan.push((
            ReportColumn {
                header: column.display_name.clone(),
                hints: DisplayHints {
                    is_name_column: column.role == ColumnRole::Name,
                    ..DisplayHints::default()
                },
            },
            Source::Text(index),
        ));
    }

    for (group, average) in groups.iter().zip(&averages) {
        for (index, column) in layout.columns().iter().enumerate() {
            if column.category_key.as_deref() != Some(group.key.as_str()) {
                continue;
            }
            plan.push((
                ReportColumn {
                    header: column.display_name.clone(),
                    hints: DisplayHints::default(),
                },
                Source::Item(index),
            ));
        }
        plan.push((
            ReportColumn {
                header: average.header.clone(),
                hints: DisplayHints {
                    is_category_average: true,
                    ..DisplayHints::default()
                },
            },
            Source::Average(&average.contributions),
        ));
    }

    plan.push((
        ReportColumn {
            header: labels.final_grade.to_string(),
            hints: DisplayHints {
                is_final_grade: true,
                ..DisplayHints::default()
            },
        },
        Source::Final,
    ));

    let rows = cleaned
        .rows()
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            plan.iter()
                .map(|(_, source)| match source {
                    Source::Text(col) => Cell::from_text(&raw[*col]),
                    Source::Item(col) => Cell::from_item(&raw[*col]),
                    Source::Average(values) => Cell::from(values[i]),
                    Source::Final => Cell::from(finals[i]),
                })
                .collect()
        })
        .collect();

    let categories = groups
        .iter()
        .zip(&averages)
        .map(|(group, average)| CategorySummary {
            category: group.label.clone(),
            weight: group.weight,
            items: group.items.len(),
            defined_rows: average.defined_rows(),
        })
        .collect();

    let graded_rows = finals.iter().filter(|g| g.is_some()).count();
    info!(
        categories = groups.len(),
        excluded_columns = classification.excluded_count(),
        graded_rows,
        "Gradebook processed"
    );

    GradeReport {
        policy: config.policy.kind(),
        language: config.language,
        columns: plan.into_iter().map(|(column, _)| column).collect(),
        rows,
        categories,
        graded_rows,
    }
}
