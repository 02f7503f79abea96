//! Pipeline orchestration: classify, estimate suitability, decide.
//!
//! An [`Analyzer`] owns the loaded models. Build it once at startup and share
//! it behind an `Arc`; every method takes `&self` and keeps no per-request
//! state, so concurrent calls are safe.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierMode, TaskClassifier};
use crate::decision::{self, Decision};
use crate::error::Result;
use crate::fusion::FusionModel;
use crate::request::{self, NormalizedRequest, RequestDefaults};
use crate::storage::{self, Config};
use crate::types::{AnalyzeRequest, AnalyzeResponse, SessionContext};

/// Loaded-model summary for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub classifier_mode: ClassifierMode,
    pub fusion_model_loaded: bool,
}

/// Full trace of one analysis, including which rule fired.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub response: AnalyzeResponse,
    pub decision_rule: u8,
}

#[derive(Debug)]
pub struct Analyzer {
    classifier: Arc<TaskClassifier>,
    fusion: Arc<FusionModel>,
    defaults: RequestDefaults,
}

impl Analyzer {
    pub fn new(classifier: Arc<TaskClassifier>, fusion: Arc<FusionModel>) -> Self {
        Self {
            classifier,
            fusion,
            defaults: RequestDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Load both models from the configured artifact locations.
    ///
    /// Load failures are logged and degrade to the fallback variants.
    pub fn from_config(config: &Config, base_dir: &Path) -> Self {
        let classifier_path = config.task_classifier_path(base_dir);
        let fusion_path = config.fusion_model_path(base_dir);
        tracing::info!(
            classifier = %classifier_path.display(),
            fusion = %fusion_path.display(),
            "initializing models"
        );

        let classifier =
            TaskClassifier::load(Some(&classifier_path), config.models.max_sequence_length);
        let fusion = FusionModel::load(Some(&fusion_path));
        Self::new(Arc::new(classifier), Arc::new(fusion)).with_defaults(config.defaults)
    }

    /// Load the on-disk config and the models it points at.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`](crate::CoreError::Config) if the data
    /// directory or the config file is unusable.
    pub fn load() -> Result<Self> {
        let config = Config::load()?;
        let base_dir = storage::data_dir()?;
        Ok(Self::from_config(&config, &base_dir))
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            classifier_mode: self.classifier.mode(),
            fusion_model_loaded: self.fusion.is_loaded(),
        }
    }

    /// Run the pipeline. Always yields exactly one recommendation.
    pub fn analyze(&self, request: &AnalyzeRequest, session: SessionContext) -> Analysis {
        let category = self.classifier.predict(
            &request.next_window_title,
            request.next_url.as_deref(),
            request.snippet_text.as_deref(),
        );
        let suitability = self.fusion.predict(request.current_state, &category, session);
        let Decision {
            rule_id,
            reason,
            recommendation,
        } = decision::decide(request.current_state, &category, &suitability);

        tracing::debug!(
            state = %request.current_state,
            category = %category,
            suitability = %suitability,
            rule = rule_id,
            "analyzed task switch"
        );

        Analysis {
            response: AnalyzeResponse {
                next_task_category: category,
                suitability,
                reason,
                recommendation,
            },
            decision_rule: rule_id,
        }
    }

    pub fn analyze_normalized(&self, normalized: &NormalizedRequest) -> AnalyzeResponse {
        self.analyze(&normalized.request, normalized.session).response
    }

    /// Normalize a raw JSON body and run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Request`](crate::CoreError::Request) when the body
    /// is not an acceptable payload.
    pub fn analyze_payload(&self, body: &str) -> Result<AnalyzeResponse> {
        let normalized = request::parse_payload(body, &self.defaults)?;
        Ok(self.analyze_normalized(&normalized))
    }
}

impl Default for Analyzer {
    /// Heuristic classifier, no fusion model.
    fn default() -> Self {
        Self::new(
            Arc::new(TaskClassifier::heuristic()),
            Arc::new(FusionModel::unavailable()),
        )
    }
}
