//! tf-idf + linear classifier exported as a single JSON file.
//!
//! ```json
//! {
//!   "vectorizer": { "vocabulary": {"github": 0}, "idf": [1.7], "lowercase": true },
//!   "classifier": {
//!     "classes": ["deep_work_coding", "other_unknown"],
//!     "coef": [[2.1]],
//!     "intercept": [-0.3]
//!   }
//! }
//! ```
//!
//! Scores are one-vs-rest: `coef · x + intercept` per class, argmax wins. A
//! binary model stores a single coefficient row and picks `classes[1]` when its
//! score is positive.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::ModelError;
use crate::types::TaskCategory;

use super::{ClassifierMode, LearnedModel};

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    token_pattern: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLinear {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPipeline {
    vectorizer: RawVectorizer,
    classifier: RawLinear,
}

/// Term-frequency x inverse-document-frequency vectorizer.
#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    lowercase: bool,
    token_pattern: Regex,
}

impl TfidfVectorizer {
    fn from_raw(raw: RawVectorizer) -> Result<Self, ModelError> {
        let pattern = raw.token_pattern.as_deref().unwrap_or(DEFAULT_TOKEN_PATTERN);
        let token_pattern = Regex::new(pattern)
            .map_err(|e| ModelError::InvalidArtifact(format!("bad token pattern: {e}")))?;

        if let Some((term, &col)) = raw.vocabulary.iter().find(|&(_, &col)| col >= raw.idf.len()) {
            return Err(ModelError::InvalidArtifact(format!(
                "term '{term}' maps to column {col} but idf has {} entries",
                raw.idf.len()
            )));
        }

        Ok(Self {
            vocabulary: raw.vocabulary,
            idf: raw.idf,
            lowercase: raw.lowercase,
            token_pattern,
        })
    }

    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// L2-normalized tf-idf vector for `text`.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut row = vec![0.0; self.idf.len()];
        for token in self.token_pattern.find_iter(&text) {
            if let Some(&col) = self.vocabulary.get(token.as_str()) {
                row[col] += 1.0;
            }
        }
        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }
        row
    }
}

/// One-vs-rest linear classifier over a dense feature row.
#[derive(Debug)]
pub struct LinearClassifier {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl LinearClassifier {
    fn from_raw(raw: RawLinear, dimension: usize) -> Result<Self, ModelError> {
        let binary = raw.classes.len() == 2 && raw.coef.len() == 1;
        if raw.classes.is_empty() || (!binary && raw.coef.len() != raw.classes.len()) {
            return Err(ModelError::InvalidArtifact(format!(
                "{} coefficient rows for {} classes",
                raw.coef.len(),
                raw.classes.len()
            )));
        }
        if raw.intercept.len() != raw.coef.len() {
            return Err(ModelError::InvalidArtifact(
                "intercept length must match coefficient rows".into(),
            ));
        }
        if raw.coef.iter().any(|row| row.len() != dimension) {
            return Err(ModelError::InvalidArtifact(format!(
                "coefficient rows must have {dimension} columns"
            )));
        }

        Ok(Self {
            classes: raw.classes,
            coef: raw.coef,
            intercept: raw.intercept,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn predict(&self, row: &[f64]) -> Result<&str, ModelError> {
        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + bias)
            .collect();

        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ModelError::Inference("non-finite decision score".into()));
        }

        let idx = if scores.len() == 1 {
            usize::from(scores[0] > 0.0)
        } else {
            scores
                .iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |(best, top), (idx, &score)| {
                    if score > top { (idx, score) } else { (best, top) }
                })
                .0
        };

        self.classes
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| ModelError::Inference(format!("class index {idx} out of range")))
    }
}

/// Loaded tf-idf pipeline.
#[derive(Debug)]
pub struct TabularModel {
    vectorizer: TfidfVectorizer,
    classifier: LinearClassifier,
}

impl TabularModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::load(path, e))?;
        let model = Self::from_json(&content).map_err(|e| match e {
            ModelError::InvalidArtifact(message) => ModelError::load(path, message),
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            terms = model.vectorizer.dimension(),
            classes = model.classifier.classes().len(),
            "loaded tabular task classifier"
        );
        Ok(model)
    }

    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        let raw: RawPipeline = serde_json::from_str(content)
            .map_err(|e| ModelError::InvalidArtifact(e.to_string()))?;
        let vectorizer = TfidfVectorizer::from_raw(raw.vectorizer)?;
        let classifier = LinearClassifier::from_raw(raw.classifier, vectorizer.dimension())?;
        Ok(Self {
            vectorizer,
            classifier,
        })
    }
}

impl LearnedModel for TabularModel {
    const MODE: ClassifierMode = ClassifierMode::Tabular;

    fn infer(&self, features: &str) -> Result<TaskCategory, ModelError> {
        let row = self.vectorizer.transform(features);
        self.classifier.predict(&row).map(TaskCategory::new)
    }
}
