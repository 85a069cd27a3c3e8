//! Run configuration: category weights, output language and the chosen
//! aggregation policy.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{GradebookError, Result};
use crate::grading::policy::AggregationPolicy;

/// Canonical identity for a category label. Applied once when weights are
/// loaded and once when headers are classified.
pub fn category_key(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Maps category names to weights in `[0, 1]`.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "Homework": 0.4,
///   "Tests": 0.6
/// }
/// ```
///
/// Keys are matched case-insensitively. When two keys differ only by case
/// the first one in file order wins.
#[derive(Debug, Clone, Default)]
pub struct CategoryWeights {
    entries: Vec<(String, f64)>,
}

impl CategoryWeights {
    /// Loads the weights from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| GradebookError::io(path, e))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        let Value::Object(map) = value else {
            return Err(GradebookError::config(
                "weight file must be a JSON object of category -> weight",
            ));
        };

        let mut pairs = Vec::with_capacity(map.len());
        for (name, weight) in map {
            let weight = weight.as_f64().ok_or_else(|| {
                GradebookError::config(format!("weight for {name:?} is not a number: {weight}"))
            })?;
            pairs.push((name, weight));
        }

        Self::from_pairs(pairs)
    }

    /// Builds a weight table from `(category, weight)` pairs in priority order.
    ///
    /// # Errors
    ///
    /// Returns a config error for an empty category name or a weight that is
    /// not a finite number in `[0, 1]`.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut entries: Vec<(String, f64)> = Vec::new();

        for (name, weight) in pairs {
            let name = name.as_ref();
            let key = category_key(name);
            if key.is_empty() {
                return Err(GradebookError::config("category weight with an empty name"));
            }
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(GradebookError::config(format!(
                    "weight for {name:?} must be within [0, 1], got {weight}"
                )));
            }
            if entries.iter().any(|(k, _)| *k == key) {
                warn!(category = name, "Duplicate category weight ignored, first entry wins");
                continue;
            }
            entries.push((key, weight));
        }

        let total: f64 = entries.iter().map(|(_, w)| w).sum();
        if !entries.is_empty() && (total - 1.0).abs() > 1e-6 {
            warn!(total, "Category weights do not sum to 1");
        }
        debug!(categories = entries.len(), "Category weights loaded");

        Ok(Self { entries })
    }

    /// Returns the weight configured for `category`, if any.
    pub fn get(&self, category: &str) -> Option<f64> {
        let key = category_key(category);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, w)| *w)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over all `(normalized category, weight)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, w)| (k.as_str(), *w))
    }
}

/// One of the two supported label sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl FromStr for Language {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "es" | "spanish" | "español" => Ok(Language::Es),
            other => Err(GradebookError::config(format!(
                "unknown language {other:?} (expected en or es)"
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => f.write_str("en"),
            Language::Es => f.write_str("es"),
        }
    }
}

/// Everything a single run needs. Read-only once constructed.
#[derive(Debug, Clone, Default)]
pub struct GradingConfig {
    pub policy: AggregationPolicy,
    pub weights: CategoryWeights,
    pub language: Language,
}
