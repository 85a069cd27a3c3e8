//! Interchangeable strategies for turning a category's cells into a
//! percentage.
//!
//! | Policy        | Percentage                                          |
//! |---------------|-----------------------------------------------------|
//! | `mean`        | mean of the defined raw item values                 |
//! | `ratio`       | `100 * earned / possible` over graded items only    |
//! | `passthrough` | the export's own `"<Category> - Category Score"`    |

use std::fmt;
use std::str::FromStr;

use crate::error::{GradebookError, Result};
use crate::grading::types::CategoryGroup;
use crate::grading::utility::mean;
use crate::table::parse_score;

/// Computes one category percentage for one student row.
pub trait CategoryScorer {
    /// `row` holds the raw cells of a single student, indexed by source
    /// column position.
    fn percentage(&self, group: &CategoryGroup, row: &[String]) -> Option<f64>;
}

fn cell(row: &[String], position: usize) -> Option<f64> {
    row.get(position).and_then(|raw| parse_score(raw))
}

/// Mean of raw scores, ignoring blank and unparseable cells.
pub struct MeanScorer;

impl CategoryScorer for MeanScorer {
    fn percentage(&self, group: &CategoryGroup, row: &[String]) -> Option<f64> {
        mean(group.items.iter().map(|d| cell(row, d.sequence_index)))
    }
}

/// What the ratio policy reports when a row has no possible points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyRatio {
    #[default]
    Zero,
    Blank,
}

impl FromStr for EmptyRatio {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "zero" | "0" => Ok(EmptyRatio::Zero),
            "blank" | "none" => Ok(EmptyRatio::Blank),
            other => Err(GradebookError::config(format!(
                "unknown empty-ratio mode {other:?} (expected zero or blank)"
            ))),
        }
    }
}

/// Earned over possible points. A blank cell adds nothing to either side,
/// and an item without max points adds nothing to the possible total.
pub struct RatioScorer {
    pub empty: EmptyRatio,
}

impl CategoryScorer for RatioScorer {
    fn percentage(&self, group: &CategoryGroup, row: &[String]) -> Option<f64> {
        let mut earned = 0.0;
        let mut possible = 0.0;

        for item in &group.items {
            let Some(score) = cell(row, item.sequence_index) else {
                continue;
            };
            earned += score;
            possible += item.max_points.unwrap_or(0.0);
        }

        if possible == 0.0 {
            return match self.empty {
                EmptyRatio::Zero => Some(0.0),
                EmptyRatio::Blank => None,
            };
        }
        Some(earned * 100.0 / possible)
    }
}

/// Reads the export's pre-computed category score as is.
pub struct PassthroughScorer;

impl CategoryScorer for PassthroughScorer {
    fn percentage(&self, group: &CategoryGroup, row: &[String]) -> Option<f64> {
        group
            .score_column
            .as_ref()
            .and_then(|c| cell(row, c.sequence_index))
    }
}

/// The aggregation policy chosen for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationPolicy {
    Mean,
    Ratio { empty: EmptyRatio },
    Passthrough,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        AggregationPolicy::Ratio {
            empty: EmptyRatio::Zero,
        }
    }
}

impl AggregationPolicy {
    pub fn from_kind(kind: PolicyKind, empty: EmptyRatio) -> Self {
        match kind {
            PolicyKind::Mean => AggregationPolicy::Mean,
            PolicyKind::Ratio => AggregationPolicy::Ratio { empty },
            PolicyKind::Passthrough => AggregationPolicy::Passthrough,
        }
    }

    pub fn scorer(&self) -> Box<dyn CategoryScorer> {
        match *self {
            AggregationPolicy::Mean => Box::new(MeanScorer),
            AggregationPolicy::Ratio { empty } => Box::new(RatioScorer { empty }),
            AggregationPolicy::Passthrough => Box::new(PassthroughScorer),
        }
    }

    /// Whether `"- Category Score"` columns must be recognized instead of
    /// excluded.
    pub fn needs_category_scores(&self) -> bool {
        matches!(self, AggregationPolicy::Passthrough)
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            AggregationPolicy::Mean => PolicyKind::Mean,
            AggregationPolicy::Ratio { .. } => PolicyKind::Ratio,
            AggregationPolicy::Passthrough => PolicyKind::Passthrough,
        }
    }
}

/// User-facing policy name, as accepted on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicyKind {
    Mean,
    #[default]
    Ratio,
    Passthrough,
}

impl FromStr for PolicyKind {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mean" | "a" => Ok(PolicyKind::Mean),
            "ratio" | "b" => Ok(PolicyKind::Ratio),
            "passthrough" | "c" => Ok(PolicyKind::Passthrough),
            other => Err(GradebookError::config(format!(
                "unknown aggregation policy {other:?} (expected mean, ratio or passthrough)"
            ))),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Mean => f.write_str("mean"),
            PolicyKind::Ratio => f.write_str("ratio"),
            PolicyKind::Passthrough => f.write_str("passthrough"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{CategoryScoreColumn, ColumnDescriptor};

    fn item(position: usize, max_points: Option<f64>) -> ColumnDescriptor {
        ColumnDescriptor {
            original_header: format!("Item {position}"),
            display_name: format!("Item {position} Homework"),
            category: "Homework".into(),
            category_key: "homework".into(),
            sequence_index: position,
            max_points,
        }
    }

    fn group(items: Vec<ColumnDescriptor>) -> CategoryGroup {
        CategoryGroup {
            key: "homework".into(),
            label: "Homework".into(),
            items,
            score_column: None,
            weight: Some(0.4),
        }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ratio_all_present() {
        let g = group(vec![item(0, Some(10.0)), item(1, Some(10.0))]);
        let pct = RatioScorer::default_zero().percentage(&g, &row(&["8", "6"]));
        assert_eq!(pct, Some(70.0));
    }

    #[test]
    fn test_ratio_ignores_ungraded_items() {
        let g = group(vec![item(0, Some(10.0)), item(1, Some(30.0))]);
        let pct = RatioScorer::default_zero().percentage(&g, &row(&["9", "Missing"]));
        assert_eq!(pct, Some(90.0));
    }

    #[test]
    fn test_ratio_zero_possible() {
        let g = group(vec![item(0, Some(10.0)), item(1, Some(10.0))]);

        let zero = RatioScorer::default_zero().percentage(&g, &row(&["", "Missing"]));
        assert_eq!(zero, Some(0.0));

        let blank = RatioScorer {
            empty: EmptyRatio::Blank,
        }
        .percentage(&g, &row(&["", ""]));
        assert_eq!(blank, None);
    }

    #[test]
    fn test_ratio_item_without_max_points_counts_earned_only() {
        let g = group(vec![item(0, Some(10.0)), item(1, None)]);
        let pct = RatioScorer::default_zero().percentage(&g, &row(&["5", "2"]));
        assert_eq!(pct, Some(70.0));
    }

    #[test]
    fn test_mean_skips_unparseable() {
        let g = group(vec![item(0, None), item(1, None), item(2, None)]);
        let pct = MeanScorer.percentage(&g, &row(&["80", "EX", "90"]));
        assert_eq!(pct, Some(85.0));
    }

    #[test]
    fn test_mean_all_blank_is_undefined() {
        let g = group(vec![item(0, None), item(1, None)]);
        assert_eq!(MeanScorer.percentage(&g, &row(&["", "Missing"])), None);
    }

    #[test]
    fn test_passthrough_reads_score_column() {
        let mut g = group(vec![item(0, Some(10.0))]);
        g.score_column = Some(CategoryScoreColumn {
            original_header: "Homework - Category Score".into(),
            category: "Homework".into(),
            category_key: "homework".into(),
            sequence_index: 1,
        });

        assert_eq!(PassthroughScorer.percentage(&g, &row(&["1", "93.5"])), Some(93.5));
        assert_eq!(PassthroughScorer.percentage(&g, &row(&["1", "n/a"])), None);
    }

    #[test]
    fn test_passthrough_without_score_column() {
        let g = group(vec![item(0, Some(10.0))]);
        assert_eq!(PassthroughScorer.percentage(&g, &row(&["10"])), None);
    }

    #[test]
    fn test_policy_parse_and_scorer() {
        assert_eq!("Ratio".parse::<PolicyKind>().unwrap(), PolicyKind::Ratio);
        assert_eq!("c".parse::<PolicyKind>().unwrap(), PolicyKind::Passthrough);
        assert!("median".parse::<PolicyKind>().is_err());

        let policy = AggregationPolicy::from_kind(PolicyKind::Passthrough, EmptyRatio::Zero);
        assert!(policy.needs_category_scores());
        assert!(!AggregationPolicy::default().needs_category_scores());
        assert_eq!(AggregationPolicy::default().kind(), PolicyKind::Ratio);
    }

    impl RatioScorer {
        fn default_zero() -> Self {
            RatioScorer {
                empty: EmptyRatio::Zero,
            }
        }
    }
}
