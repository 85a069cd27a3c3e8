use tracing::debug;

use crate::grading::policy::{AggregationPolicy, CategoryScorer};
use crate::grading::types::{CategoryAverage, CategoryGroup, CategoryGroups};
use crate::table::Gradebook;

/// Aggregates every category of `book` under `policy`, in group order.
///
/// Each category is computed independently from the shared read-only
/// inputs; only the output order depends on `groups`.
pub fn aggregate_categories(
    book: &Gradebook,
    groups: &CategoryGroups,
    policy: &AggregationPolicy,
) -> Vec<CategoryAverage> {
    let scorer = policy.scorer();
    groups
        .iter()
        .map(|group| aggregate_category(book, group, scorer.as_ref()))
        .collect()
}

/// Computes the percentage and weighted contribution of one category for
/// every row.
pub fn aggregate_category(
    book: &Gradebook,
    group: &CategoryGroup,
    scorer: &dyn CategoryScorer,
) -> CategoryAverage {
    let weight = group.effective_weight();

    let percentages: Vec<Option<f64>> = book
        .rows()
        .iter()
        .map(|row| scorer.percentage(group, row))
        .collect();
    let contributions = percentages.iter().map(|p| p.map(|p| p * weight)).collect();

    let average = CategoryAverage {
        key: group.key.clone(),
        header: group.average_header(),
        weighted: group.weight.is_some(),
        percentages,
        contributions,
    };

    debug!(
        category = %group.label,
        weight,
        items = group.items.len(),
        defined_rows = average.defined_rows(),
        "Category aggregated"
    );
    average
}
