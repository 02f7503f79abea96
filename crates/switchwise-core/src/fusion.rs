//! Suitability estimation from focus state, task category and session timing.
//!
//! The exported pipeline is a single JSON file:
//!
//! - `encoder`: category lists for `current_state` and `next_task_category`,
//!   one-hot encoded in that order; unseen values encode to an all-zero block
//! - `scaler`: `mean` and `scale` for `[time_of_day, session_duration]`
//! - `forest`: `classes` and `trees`; each tree is a flat node array where a
//!   leaf has `left == -1` and a sample goes left when `x[feature] <= threshold`
//!
//! Without a loaded pipeline, or when inference fails, the suitability is
//! always `neutral`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::types::{FocusState, SessionContext, Suitability, TaskCategory};

const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub current_state: Vec<String>,
    pub next_task_category: Vec<String>,
}

impl OneHotEncoder {
    pub fn width(&self) -> usize {
        self.current_state.len() + self.next_task_category.len()
    }

    fn encode_into(&self, row: &mut Vec<f64>, state: &str, category: &str) {
        row.extend(one_hot(&self.current_state, state));
        row.extend(one_hot(&self.next_task_category, category));
    }
}

fn one_hot<'a>(known: &'a [String], value: &'a str) -> impl Iterator<Item = f64> + 'a {
    known.iter().map(move |k| if k == value { 1.0 } else { 0.0 })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; 2],
    pub scale: [f64; 2],
}

impl StandardScaler {
    fn transform(&self, values: [f64; 2]) -> [f64; 2] {
        let mut out = [0.0; 2];
        for i in 0..2 {
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            out[i] = (values[i] - self.mean[i]) / scale;
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default)]
    pub feature: usize,
    #[serde(default)]
    pub threshold: f64,
    pub left: i64,
    pub right: i64,
    #[serde(default)]
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Normalized class distribution of the leaf reached by `row`.
    fn leaf_distribution(&self, row: &[f64], n_classes: usize) -> Result<Vec<f64>, ModelError> {
        let mut idx = 0usize;
        // a well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| ModelError::Inference(format!("tree node {idx} does not exist")))?;

            if node.left == LEAF {
                if node.value.len() != n_classes {
                    return Err(ModelError::Inference(format!(
                        "leaf has {} values for {n_classes} classes",
                        node.value.len()
                    )));
                }
                let total: f64 = node.value.iter().sum();
                if total <= 0.0 || !total.is_finite() {
                    return Err(ModelError::Inference("leaf has no samples".into()));
                }
                return Ok(node.value.iter().map(|v| v / total).collect());
            }

            let x = row.get(node.feature).ok_or_else(|| {
                ModelError::Inference(format!("feature {} out of range", node.feature))
            })?;
            let next = if *x <= node.threshold { node.left } else { node.right };
            idx = usize::try_from(next)
                .map_err(|_| ModelError::Inference(format!("invalid child index {next}")))?;
        }
        Err(ModelError::Inference("tree does not terminate".into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn predict(&self, row: &[f64]) -> Result<&str, ModelError> {
        let n_classes = self.classes.len();
        let mut proba = vec![0.0; n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_distribution(row, n_classes)?) {
                *acc += p;
            }
        }

        proba
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (idx, &p)| match best {
                Some((_, top)) if top >= p => best,
                _ => Some((idx, p)),
            })
            .map(|(idx, _)| self.classes[idx].as_str())
            .ok_or_else(|| ModelError::Inference("forest has no classes".into()))
    }
}

/// Encoder, scaler and forest loaded from one artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionPipeline {
    pub encoder: OneHotEncoder,
    pub scaler: StandardScaler,
    pub forest: RandomForest,
}

impl FusionPipeline {
    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        let pipeline: FusionPipeline =
            serde_json::from_str(content).map_err(|e| ModelError::InvalidArtifact(e.to_string()))?;
        if pipeline.forest.classes.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no classes".into()));
        }
        if pipeline.forest.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no trees".into()));
        }
        Ok(pipeline)
    }

    /// Feature row: one-hot state, one-hot category, scaled numerics.
    pub fn features(
        &self,
        state: FocusState,
        category: &TaskCategory,
        session: SessionContext,
    ) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.encoder.width() + 2);
        self.encoder
            .encode_into(&mut row, state.as_str(), category.as_str());
        row.extend(
            self.scaler
                .transform([session.time_of_day, session.session_duration]),
        );
        row
    }

    pub fn predict(
        &self,
        state: FocusState,
        category: &TaskCategory,
        session: SessionContext,
    ) -> Result<Suitability, ModelError> {
        let row = self.features(state, category, session);
        self.forest.predict(&row).map(Suitability::new)
    }
}

/// Suitability model with a hard `neutral` fallback.
#[derive(Debug, Clone, Default)]
pub struct FusionModel {
    pipeline: Option<FusionPipeline>,
}

impl FusionModel {
    /// Load the pipeline at `path`. A missing or unreadable artifact leaves the
    /// model unavailable.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::warn!("no fusion model configured");
            return Self::unavailable();
        };
        if !path.exists() {
            tracing::warn!(path = %path.display(), "fusion model path does not exist");
            return Self::unavailable();
        }

        let loaded = std::fs::read_to_string(path)
            .map_err(|e| ModelError::load(path, e))
            .and_then(|content| FusionPipeline::from_json(&content));
        match loaded {
            Ok(pipeline) => {
                tracing::info!(
                    path = %path.display(),
                    trees = pipeline.forest.trees.len(),
                    classes = ?pipeline.forest.classes,
                    "loaded fusion model"
                );
                Self::from_pipeline(pipeline)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load fusion model");
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self { pipeline: None }
    }

    pub fn from_pipeline(pipeline: FusionPipeline) -> Self {
        Self {
            pipeline: Some(pipeline),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Estimate suitability. Never fails; falls back to `neutral`.
    pub fn predict(
        &self,
        state: FocusState,
        category: &TaskCategory,
        session: SessionContext,
    ) -> Suitability {
        let Some(pipeline) = &self.pipeline else {
            tracing::debug!("no fusion model loaded, returning neutral");
            return Suitability::neutral();
        };

        match pipeline.predict(state, category, session) {
            Ok(suitability) => suitability,
            Err(e) => {
                tracing::error!(error = %e, "fusion prediction failed");
                Suitability::neutral()
            }
        }
    }
}
