//! Header classifier.
//!
//! Gradebook exports encode item metadata in free-text headers, e.g.
//! `Quiz 1 (Grading Category: Tests, Max Points: 25.0)`. Every header is
//! classified as general, a category item, a pre-computed category score
//! (passthrough policy only) or excluded.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::category_key;
use crate::grading::policy::AggregationPolicy;

/// Category used when a marker carries no readable label.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Administrative columns, matched exactly (ignoring case and padding).
pub const ADMIN_HEADERS: &[&str] = &["Unique User ID", "User ID"];

/// Flags that mark a column as not being a graded item.
pub const EXCLUDED_SUBSTRINGS: &[&str] = &["Count in Grade", "Category Score", "Ungraded"];

static CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)grading\s+category\s*:\s*([^,)]*)").expect("category pattern is valid")
});

static MAX_POINTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)max\s+points\s*:\s*([-+]?(?:\d+(?:\.\d*)?|\.\d+))")
        .expect("max points pattern is valid")
});

static CATEGORY_SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(.*?)\s*-\s*category\s+score\s*$")
        .expect("category score pattern is valid")
});

/// One recognized graded-item column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub original_header: String,
    /// `"{base label} {category}"`.
    pub display_name: String,
    pub category: String,
    pub category_key: String,
    /// Source column position.
    pub sequence_index: usize,
    /// `None` keeps the item out of possible-points totals.
    pub max_points: Option<f64>,
}

/// A `"<Category> - Category Score"` column supplied by the export.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScoreColumn {
    pub original_header: String,
    pub category: String,
    pub category_key: String,
    pub sequence_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    Administrative,
    /// Header contains the given exclusion flag.
    Flagged(&'static str),
    /// Repeats an earlier header.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderClass {
    General,
    CategoryItem(ColumnDescriptor),
    CategoryScore(CategoryScoreColumn),
    Excluded(ExclusionReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedHeader {
    pub position: usize,
    pub header: String,
    pub class: HeaderClass,
}

impl ClassifiedHeader {
    pub fn as_item(&self) -> Option<&ColumnDescriptor> {
        match &self.class {
            HeaderClass::CategoryItem(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_category_score(&self) -> Option<&CategoryScoreColumn> {
        match &self.class {
            HeaderClass::CategoryScore(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_general(&self) -> bool {
        matches!(self.class, HeaderClass::General)
    }
}

/// Result of classifying a whole header row, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    entries: Vec<ClassifiedHeader>,
}

impl Classification {
    pub fn entries(&self) -> &[ClassifiedHeader] {
        &self.entries
    }

    pub fn general(&self) -> impl Iterator<Item = &ClassifiedHeader> {
        self.entries.iter().filter(|e| e.is_general())
    }

    pub fn items(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.entries.iter().filter_map(ClassifiedHeader::as_item)
    }

    pub fn category_scores(&self) -> impl Iterator<Item = &CategoryScoreColumn> {
        self.entries.iter().filter_map(ClassifiedHeader::as_category_score)
    }

    pub fn excluded_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.class, HeaderClass::Excluded(_)))
            .count()
    }
}

/// Extracts the category label following the category marker, if the
/// marker is present. An empty label falls back to [`UNKNOWN_CATEGORY`].
pub fn extract_category(header: &str) -> Option<String> {
    let caps = CATEGORY_RE.captures(header)?;
    let label = caps.get(1).map_or("", |m| m.as_str()).trim();
    if label.is_empty() {
        warn!(header, "Category marker without a label, using {UNKNOWN_CATEGORY}");
        Some(UNKNOWN_CATEGORY.to_string())
    } else {
        Some(label.to_string())
    }
}

pub fn extract_max_points(header: &str) -> Option<f64> {
    MAX_POINTS_RE
        .captures(header)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Text before the first opening parenthesis or the category marker,
/// whichever comes first, trimmed.
pub fn base_label(header: &str) -> &str {
    let paren = header.find('(').unwrap_or(header.len());
    let marker = CATEGORY_RE.find(header).map_or(header.len(), |m| m.start());
    header[..paren.min(marker)].trim()
}

fn flagged_substring(header: &str) -> Option<&'static str> {
    let lower = header.to_lowercase();
    EXCLUDED_SUBSTRINGS
        .iter()
        .copied()
        .find(|flag| lower.contains(&flag.to_lowercase()))
}

fn category_score_column(header: &str, position: usize) -> Option<CategoryScoreColumn> {
    let caps = CATEGORY_SCORE_RE.captures(header)?;
    let segment = caps.get(1).map_or("", |m| m.as_str()).trim();

    let category = match extract_category(segment) {
        Some(label) => label,
        None if segment.is_empty() => {
            warn!(header, "Category score without a category, using {UNKNOWN_CATEGORY}");
            UNKNOWN_CATEGORY.to_string()
        }
        None => segment.to_string(),
    };

    Some(CategoryScoreColumn {
        original_header: header.to_string(),
        category_key: category_key(&category),
        category,
        sequence_index: position,
    })
}

/// Classifies a single header at source `position`.
///
/// Exclusion flags take precedence over the category marker. When
/// `wants_category_scores` is set, `"- Category Score"` columns are
/// recognized before the exclusion check.
pub fn classify_header(
    header: &str,
    position: usize,
    wants_category_scores: bool,
) -> HeaderClass {
    let trimmed = header.trim();

    if ADMIN_HEADERS
        .iter()
        .any(|admin| admin.eq_ignore_ascii_case(trimmed))
    {
        return HeaderClass::Excluded(ExclusionReason::Administrative);
    }

    if wants_category_scores {
        if let Some(score) = category_score_column(trimmed, position) {
            return HeaderClass::CategoryScore(score);
        }
    }

    if let Some(flag) = flagged_substring(trimmed) {
        return HeaderClass::Excluded(ExclusionReason::Flagged(flag));
    }

    let Some(category) = extract_category(trimmed) else {
        return HeaderClass::General;
    };

    let display_name = format!("{} {}", base_label(trimmed), category)
        .trim()
        .to_string();

    HeaderClass::CategoryItem(ColumnDescriptor {
        original_header: header.to_string(),
        display_name,
        category_key: category_key(&category),
        category,
        sequence_index: position,
        max_points: extract_max_points(trimmed),
    })
}

/// Classifies a full header row.
///
/// Repeated headers after the first are excluded. Display names that
/// collide within one category get a `" (n)"` suffix.
pub fn classify_headers(headers: &[String], policy: &AggregationPolicy) -> Classification {
    let wants_scores = policy.needs_category_scores();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut display_names: HashMap<(String, String), usize> = HashMap::new();
    let mut entries = Vec::with_capacity(headers.len());

    for (position, header) in headers.iter().enumerate() {
        let class = if seen.insert(header.as_str()) {
            classify_header(header, position, wants_scores)
        } else {
            warn!(header = %header, position, "Duplicate header, keeping the first occurrence");
            HeaderClass::Excluded(ExclusionReason::Duplicate)
        };

        let class = match class {
            HeaderClass::CategoryItem(mut item) => {
                let count = display_names
                    .entry((item.category_key.clone(), item.display_name.clone()))
                    .or_insert(0);
                *count += 1;
                if *count > 1 {
                    item.display_name = format!("{} ({})", item.display_name, count);
                }
                HeaderClass::CategoryItem(item)
            }
            other => other,
        };

        debug!(header = %header, position, class = ?class, "Header classified");
        entries.push(ClassifiedHeader {
            position,
            header: header.clone(),
            class,
        });
    }

    Classification { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(header: &str) -> ColumnDescriptor {
        match classify_header(header, 3, false) {
            HeaderClass::CategoryItem(d) => d,
            other => panic!("expected category item, got {other:?}"),
        }
    }

    #[test]
    fn test_category_item_extraction() {
        let d = item("Quiz 1 (Grading Category: Tests, Max Points: 25.0)");

        assert_eq!(d.category, "Tests");
        assert_eq!(d.category_key, "tests");
        assert_eq!(d.max_points, Some(25.0));
        assert_eq!(base_label(&d.original_header), "Quiz 1");
        assert_eq!(d.display_name, "Quiz 1 Tests");
        assert_eq!(d.sequence_index, 3);
    }

    #[test]
    fn test_category_item_without_max_points() {
        let d = item("Essay (Grading Category: Writing)");

        assert_eq!(d.category, "Writing");
        assert_eq!(d.max_points, None);
        assert_eq!(d.display_name, "Essay Writing");
    }

    #[test]
    fn test_category_marker_without_label_is_unknown() {
        let d = item("Mystery (Grading Category: , Max Points: 5)");
        assert_eq!(d.category, UNKNOWN_CATEGORY);
        assert_eq!(d.max_points, Some(5.0));

        let d = item("Mystery (Grading Category:)");
        assert_eq!(d.category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_general_and_admin_headers() {
        assert_eq!(classify_header("First Name", 0, false), HeaderClass::General);
        assert_eq!(
            classify_header("Overall Grade", 1, false),
            HeaderClass::General
        );
        assert_eq!(
            classify_header(" unique user id ", 2, false),
            HeaderClass::Excluded(ExclusionReason::Administrative)
        );
    }

    #[test]
    fn test_exclusion_takes_precedence_over_marker() {
        let class = classify_header(
            "HW 1 (Grading Category: Homework, Max Points: 10) - Count in Grade",
            0,
            false,
        );
        assert_eq!(
            class,
            HeaderClass::Excluded(ExclusionReason::Flagged("Count in Grade"))
        );

        let class = classify_header("Homework - Category Score", 0, false);
        assert_eq!(
            class,
            HeaderClass::Excluded(ExclusionReason::Flagged("Category Score"))
        );
    }

    #[test]
    fn test_category_score_recognized_when_wanted() {
        let class = classify_header("Homework - Category Score", 4, true);
        let HeaderClass::CategoryScore(score) = class else {
            panic!("expected category score");
        };

        assert_eq!(score.category, "Homework");
        assert_eq!(score.category_key, "homework");
        assert_eq!(score.sequence_index, 4);
    }

    #[test]
    fn test_category_score_segment_with_marker() {
        let class = classify_header("Unit (Grading Category: Labs) - Category Score", 0, true);
        let HeaderClass::CategoryScore(score) = class else {
            panic!("expected category score");
        };
        assert_eq!(score.category, "Labs");
    }

    #[test]
    fn test_category_score_without_segment_is_unknown() {
        let class = classify_header("- Category Score", 0, true);
        let HeaderClass::CategoryScore(score) = class else {
            panic!("expected category score");
        };
        assert_eq!(score.category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_marker_without_parenthesis_stays_out_of_display_name() {
        let d = item("Grading Category: Tests, Max Points: 10");
        assert_eq!(base_label(&d.original_header), "");
        assert_eq!(d.display_name, "Tests");
        assert_eq!(d.max_points, Some(10.0));

        let d = item("Lab 2 Grading Category: Labs");
        assert_eq!(d.display_name, "Lab 2 Labs");
        assert_eq!(classify_header(&d.display_name, 0, false), HeaderClass::General);
    }

    #[test]
    fn test_renamed_display_name_is_general() {
        assert_eq!(classify_header("Quiz 1 Tests", 0, false), HeaderClass::General);
    }

    #[test]
    fn test_classify_headers_duplicates() {
        let headers: Vec<String> = [
            "First Name",
            "Quiz (Grading Category: Tests, Max Points: 10)",
            "Quiz (Grading Category: Tests, Max Points: 20)",
            "First Name",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let classification = classify_headers(&headers, &AggregationPolicy::default());
        let names: Vec<_> = classification
            .items()
            .map(|d| d.display_name.as_str())
            .collect();

        assert_eq!(names, vec!["Quiz Tests", "Quiz Tests (2)"]);
        assert_eq!(
            classification.entries()[3].class,
            HeaderClass::Excluded(ExclusionReason::Duplicate)
        );
        assert_eq!(classification.general().count(), 1);
        assert_eq!(classification.excluded_count(), 1);
    }
}
