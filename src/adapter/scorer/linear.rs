//! Multinomial linear model read from a JSON file.
//!
//! ```json
//! {
//!   "feature_columns": ["player_score", "banker_score"],
//!   "labels": ["Player Win", "Banker Win", "Tie"],
//!   "means": [4.5, 4.5],
//!   "scales": [2.8, 2.8],
//!   "weights": [[0.9, -0.9], [-0.9, 0.9], [0.0, 0.0]],
//!   "intercepts": [0.0, 0.1, -1.5]
//! }
//! ```
//!
//! `means` and `scales` are optional. Output is a softmax over the labels.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{FeatureVector, OutcomeCategory, Probabilities, ScoredOutcome};
use crate::error::{ConfigError, Result, ScoringError};
use crate::port::Scorer;

#[derive(Debug, Deserialize)]
struct ModelFile {
    feature_columns: Vec<String>,
    labels: Vec<String>,
    #[serde(default)]
    means: Option<Vec<f64>>,
    #[serde(default)]
    scales: Option<Vec<f64>>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

/// Loaded linear classifier.
#[derive(Debug, Clone)]
pub struct LinearScorer {
    feature_columns: Vec<String>,
    labels: Vec<OutcomeCategory>,
    means: Vec<f64>,
    scales: Vec<f64>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearScorer {
    /// Read and validate a model file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if its
    /// dimensions are inconsistent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a model from JSON text.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the dimensions are
    /// inconsistent.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(content)?;
        Self::from_model(file)
    }

    fn from_model(file: ModelFile) -> Result<Self> {
        let width = file.feature_columns.len();
        if width == 0 {
            return Err(invalid("feature_columns", "must not be empty"));
        }

        let mut labels = Vec::with_capacity(file.labels.len());
        for raw in &file.labels {
            let label = OutcomeCategory::from_label(raw);
            if !label.is_settled() {
                return Err(invalid("labels", format!("unknown label {raw:?}")));
            }
            if labels.contains(&label) {
                return Err(invalid("labels", format!("duplicate label {raw:?}")));
            }
            labels.push(label);
        }
        if labels.is_empty() {
            return Err(invalid("labels", "must not be empty"));
        }

        if file.weights.len() != labels.len() {
            return Err(invalid(
                "weights",
                format!("{} rows for {} labels", file.weights.len(), labels.len()),
            ));
        }
        if let Some(row) = file.weights.iter().find(|row| row.len() != width) {
            return Err(invalid(
                "weights",
                format!("row has {} values, expected {width}", row.len()),
            ));
        }
        if file.intercepts.len() != labels.len() {
            return Err(invalid(
                "intercepts",
                format!("{} values for {} labels", file.intercepts.len(), labels.len()),
            ));
        }
        if file.weights.iter().flatten().any(|w| !w.is_finite()) {
            return Err(invalid("weights", "values must be finite"));
        }
        if file.intercepts.iter().any(|b| !b.is_finite()) {
            return Err(invalid("intercepts", "values must be finite"));
        }

        let means = file.means.unwrap_or_else(|| vec![0.0; width]);
        let scales = file.scales.unwrap_or_else(|| vec![1.0; width]);
        if means.len() != width {
            return Err(invalid("means", format!("expected {width} values")));
        }
        if scales.len() != width {
            return Err(invalid("scales", format!("expected {width} values")));
        }
        if scales.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(invalid("scales", "values must be finite and non-zero"));
        }

        Ok(Self {
            feature_columns: file.feature_columns,
            labels,
            means,
            scales,
            weights: file.weights,
            intercepts: file.intercepts,
        })
    }

    fn logits(&self, values: &[f64]) -> Vec<f64> {
        let standardized: Vec<f64> = values
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect();

        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                intercept
                    + row
                        .iter()
                        .zip(&standardized)
                        .map(|(w, x)| w * x)
                        .sum::<f64>()
            })
            .collect()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl Scorer for LinearScorer {
    fn feature_names(&self) -> &[String] {
        &self.feature_columns
    }

    fn labels(&self) -> &[OutcomeCategory] {
        &self.labels
    }

    fn score(&self, features: &FeatureVector) -> std::result::Result<ScoredOutcome, ScoringError> {
        if features.len() != self.feature_columns.len() {
            return Err(ScoringError::SchemaMismatch {
                expected: self.feature_columns.len(),
                actual: features.len(),
            });
        }

        let distribution = softmax(&self.logits(features.as_slice()));
        let values: BTreeMap<OutcomeCategory, f64> =
            self.labels.iter().copied().zip(distribution).collect();
        let probabilities = Probabilities::new(values)?;
        let (label, _) = probabilities.argmax();
        Ok(ScoredOutcome {
            label,
            probabilities,
        })
    }
}
