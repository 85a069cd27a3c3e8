//! Column reorganizer: decides output order and display names. Purely
//! structural, no cell values are inspected.

use tracing::{debug, info};

use crate::headers::Classification;
use crate::labels::{ALL as LABEL_SETS, LabelSet};
use crate::table::Gradebook;

/// Substrings that mark a general column as a student-name column.
pub const NAME_TOKENS: &[&str] = &["name", "first", "last"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Name,
    General,
    CategoryItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutColumn {
    /// Source column position.
    pub position: usize,
    pub source_header: String,
    pub display_name: String,
    pub role: ColumnRole,
    /// Owning category, for category items only.
    pub category_key: Option<String>,
}

/// Output column order: name columns, other general columns, then
/// category items grouped by category in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLayout {
    columns: Vec<LayoutColumn>,
}

impl ColumnLayout {
    pub fn columns(&self) -> &[LayoutColumn] {
        &self.columns
    }

    pub fn with_role(&self, role: ColumnRole) -> impl Iterator<Item = &LayoutColumn> {
        self.columns.iter().filter(move |c| c.role == role)
    }

    /// `(source, display)` pairs for every column whose name changes.
    pub fn renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .filter(|c| c.source_header != c.display_name)
            .map(|c| (c.source_header.as_str(), c.display_name.as_str()))
    }

    /// Drops name and general columns whose display name matches one of
    /// the `computed` headers, ignoring case and padding. The computed
    /// column takes their place in the output.
    pub fn drop_replaced<'a>(&mut self, computed: impl IntoIterator<Item = &'a str>) {
        let computed: Vec<String> = computed
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        self.columns.retain(|c| {
            let replaced = c.role != ColumnRole::CategoryItem
                && computed.contains(&c.display_name.trim().to_lowercase());
            if replaced {
                info!(header = %c.source_header, "Input column replaced by computed column");
            }
            !replaced
        });
    }

    /// Builds the reorganized table: kept columns only, in layout order,
    /// under their display names. Cell text is copied unchanged.
    pub fn apply(&self, book: &Gradebook) -> Gradebook {
        let headers = self.columns.iter().map(|c| c.display_name.clone()).collect();
        let rows = book
            .rows()
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| row.get(c.position).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Gradebook::new(headers, rows)
    }
}

/// Whether a general header identifies the student by name. Localized
/// name labels count too, so already reorganized sheets keep their order.
pub fn is_name_column(header: &str) -> bool {
    let lower = header.trim().to_lowercase();
    NAME_TOKENS.iter().any(|token| lower.contains(token))
        || LABEL_SETS.iter().any(|set| {
            lower == set.first_name.to_lowercase() || lower == set.last_name.to_lowercase()
        })
}

/// Maps the first- and last-name columns to the localized labels. Other
/// headers are returned unchanged.
pub fn general_display_name(header: &str, labels: &LabelSet) -> String {
    let trimmed = header.trim();
    let matches_any = |pick: fn(&LabelSet) -> &'static str| {
        LABEL_SETS
            .iter()
            .any(|set| pick(set).eq_ignore_ascii_case(trimmed))
    };

    if matches_any(|set| set.first_name) {
        labels.first_name.to_string()
    } else if matches_any(|set| set.last_name) {
        labels.last_name.to_string()
    } else {
        header.to_string()
    }
}

pub fn reorganize(classification: &Classification, labels: &LabelSet) -> ColumnLayout {
    let mut names = Vec::new();
    let mut general = Vec::new();

    for entry in classification.general() {
        let role = if is_name_column(&entry.header) {
            ColumnRole::Name
        } else {
            ColumnRole::General
        };
        let column = LayoutColumn {
            position: entry.position,
            source_header: entry.header.clone(),
            display_name: general_display_name(&entry.header, labels),
            role,
            category_key: None,
        };
        match role {
            ColumnRole::Name => names.push(column),
            _ => general.push(column),
        }
    }

    let mut category_order: Vec<&str> = Vec::new();
    for item in classification.items() {
        if !category_order.contains(&item.category_key.as_str()) {
            category_order.push(&item.category_key);
        }
    }

    let mut items = Vec::new();
    for key in category_order {
        let mut members: Vec<_> = classification
            .items()
            .filter(|d| d.category_key == key)
            .collect();
        members.sort_by_key(|d| d.sequence_index);
        items.extend(members.into_iter().map(|d| LayoutColumn {
            position: d.sequence_index,
            source_header: d.original_header.clone(),
            display_name: d.display_name.clone(),
            role: ColumnRole::CategoryItem,
            category_key: Some(d.category_key.clone()),
        }));
    }

    debug!(
        names = names.len(),
        general = general.len(),
        items = items.len(),
        "Columns reorganized"
    );

    let mut columns = names;
    columns.extend(general);
    columns.extend(items);
    ColumnLayout { columns }
}
