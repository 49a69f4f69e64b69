use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default minimum exclusive score for a record to stay visible.
pub const DEFAULT_CUTOFF: f64 = 0.3;

/// Weight used for a key that has no entry in the weight list.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Query and weighting configuration of a search.
///
/// Every field feeds scoring or ranking; changing any of them through a
/// search model invalidates the installed scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Search text. Empty means "show everything".
    pub query: String,
    /// Field names to score, in significance order.
    pub keys: Vec<String>,
    /// Per-key weights, aligned to `keys` by index.
    pub weights: Vec<f64>,
    /// Score the joined field values instead of a weighted per-key mean.
    pub concat: bool,
    /// Records must score strictly above this when the query is non-empty.
    pub cutoff: f64,
    pub case_sensitive: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: String::new(),
            keys: vec!["name".to_string()],
            weights: Vec::new(),
            concat: false,
            cutoff: DEFAULT_CUTOFF,
            case_sensitive: false,
        }
    }
}

impl SearchConfig {
    /// Weight of the key at `index`, defaulting to [`DEFAULT_WEIGHT`].
    #[inline]
    pub fn weight(&self, index: usize) -> f64 {
        weight_at(&self.weights, index)
    }

    /// The query as the scorer sees it.
    pub fn normalized_query(&self) -> String {
        normalize_case(&self.query, self.case_sensitive)
    }

    /// Check the configuration for values the engine would otherwise have
    /// to coerce.
    pub fn validate(&self) -> Result<()> {
        if let Some(i) = self.keys.iter().position(|k| k.is_empty()) {
            return Err(Error::InvalidConfig(format!("key {} is empty", i)));
        }

        if !self.cutoff.is_finite() || !(0.0..=1.0).contains(&self.cutoff) {
            return Err(Error::InvalidConfig(format!(
                "cutoff must be within [0, 1], got {}",
                self.cutoff
            )));
        }

        for (i, weight) in self.weights.iter().enumerate() {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "weight {} must be a non-negative number, got {}",
                    i, weight
                )));
            }
        }

        Ok(())
    }

    /// Parse and validate a configuration from JSON. Missing fields take
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[inline]
pub fn weight_at(weights: &[f64], index: usize) -> f64 {
    weights.get(index).copied().unwrap_or(DEFAULT_WEIGHT)
}

/// Lowercase `text` unless matching is case sensitive.
pub fn normalize_case(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// Equality of two cutoffs, ignoring float noise.
#[inline]
pub fn cutoff_eq(a: f64, b: f64) -> bool {
    ((a + 1.0) - (b + 1.0)).abs() * 1e12 <= (a + 1.0).abs().min((b + 1.0).abs())
}
