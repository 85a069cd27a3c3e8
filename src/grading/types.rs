//! Data types shared by the aggregation stages.

use std::collections::HashMap;

use tracing::debug;

use crate::config::CategoryWeights;
use crate::headers::{CategoryScoreColumn, Classification, ColumnDescriptor};

/// Weight applied to a category that has no entry in the weight table.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// All graded columns belonging to one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    /// Normalized identity, see [`crate::config::category_key`].
    pub key: String,
    /// Label as first spelled in the source headers.
    pub label: String,
    /// Items ordered by `sequence_index`.
    pub items: Vec<ColumnDescriptor>,
    /// Pre-computed score column, only recognized by the passthrough policy.
    pub score_column: Option<CategoryScoreColumn>,
    /// Configured weight; `None` when the category is not in the weight table.
    pub weight: Option<f64>,
}

impl CategoryGroup {
    /// Smallest source position among the group's columns.
    pub fn first_appearance(&self) -> usize {
        self.items
            .iter()
            .map(|d| d.sequence_index)
            .chain(self.score_column.iter().map(|c| c.sequence_index))
            .min()
            .unwrap_or(usize::MAX)
    }

    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn average_header(&self) -> String {
        format!("Average {}", self.label)
    }
}

/// Category groups in first-appearance order. Built once per run and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryGroups {
    groups: Vec<CategoryGroup>,
}

impl CategoryGroups {
    pub fn build(classification: &Classification, weights: &CategoryWeights) -> Self {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        let mut slot = |key: &str, label: &str, groups: &mut Vec<CategoryGroup>| -> usize {
            *index.entry(key.to_string()).or_insert_with(|| {
                groups.push(CategoryGroup {
                    key: key.to_string(),
                    label: label.to_string(),
                    items: Vec::new(),
                    score_column: None,
                    weight: weights.get(key),
                });
                groups.len() - 1
            })
        };

        // Classification is already in source order, so the first spelling
        // seen for a key is the earliest one.
        for entry in classification.entries() {
            if let Some(item) = entry.as_item() {
                let i = slot(&item.category_key, &item.category, &mut groups);
                groups[i].items.push(item.clone());
            } else if let Some(score) = entry.as_category_score() {
                let i = slot(&score.category_key, &score.category, &mut groups);
                if groups[i].score_column.is_none() {
                    groups[i].score_column = Some(score.clone());
                }
            }
        }

        for group in &mut groups {
            group.items.sort_by_key(|d| d.sequence_index);
        }
        groups.sort_by_key(CategoryGroup::first_appearance);

        for (name, _) in weights.iter() {
            if !groups.iter().any(|g| g.key == name) {
                debug!(category = name, "Weighted category not present in gradebook, skipping");
            }
        }

        Self { groups }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryGroup> {
        self.groups.iter()
    }

    pub fn get(&self, key: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Per-row results for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAverage {
    pub key: String,
    /// Output column name, `"Average {category}"`.
    pub header: String,
    /// Whether the category has a configured weight and therefore counts
    /// toward the final grade.
    pub weighted: bool,
    /// Policy result in percent, before weighting.
    pub percentages: Vec<Option<f64>>,
    /// `percentage * weight`, the value written to the average column.
    pub contributions: Vec<Option<f64>>,
}

impl CategoryAverage {
    pub fn defined_rows(&self) -> usize {
        self.contributions.iter().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::policy::AggregationPolicy;
    use crate::headers::classify_headers;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_groups_follow_first_appearance_not_weight_order() {
        let classification = classify_headers(
            &headers(&[
                "First Name",
                "Lab 1 (Grading Category: Labs, Max Points: 5)",
                "HW 1 (Grading Category: Homework, Max Points: 10)",
                "Lab 2 (Grading Category: labs, Max Points: 5)",
            ]),
            &AggregationPolicy::default(),
        );
        let weights = CategoryWeights::from_pairs([("Homework", 0.5), ("Labs", 0.5)]).unwrap();

        let groups = CategoryGroups::build(&classification, &weights);
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();

        assert_eq!(keys, vec!["labs", "homework"]);
        let labs = groups.get("labs").unwrap();
        assert_eq!(labs.label, "Labs");
        assert_eq!(labs.items.len(), 2);
        assert_eq!(labs.items[0].sequence_index, 1);
        assert_eq!(labs.items[1].sequence_index, 3);
        assert_eq!(labs.weight, Some(0.5));
    }

    #[test]
    fn test_unweighted_group_defaults_to_one() {
        let classification = classify_headers(
            &headers(&["HW 1 (Grading Category: Homework, Max Points: 10)"]),
            &AggregationPolicy::default(),
        );
        let groups = CategoryGroups::build(&classification, &CategoryWeights::default());
        let group = groups.get("homework").unwrap();

        assert_eq!(group.weight, None);
        assert_eq!(group.effective_weight(), 1.0);
        assert_eq!(group.average_header(), "Average Homework");
    }

    #[test]
    fn test_score_column_joins_group() {
        let classification = classify_headers(
            &headers(&[
                "Homework - Category Score",
                "HW 1 (Grading Category: Homework, Max Points: 10)",
            ]),
            &AggregationPolicy::Passthrough,
        );
        let groups = CategoryGroups::build(&classification, &CategoryWeights::default());
        let group = groups.get("homework").unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(group.first_appearance(), 0);
        assert_eq!(group.score_column.as_ref().unwrap().sequence_index, 0);
        assert_eq!(group.items.len(), 1);
    }
}
