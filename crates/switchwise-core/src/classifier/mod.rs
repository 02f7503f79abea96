//! Task classification over window title, URL and text snippet.
//!
//! Three backends implement [`Classify`]:
//!
//! - **Sequence**: a token-sequence model exported as a directory holding
//!   `config.json`, `vocab.txt` and `model.json`.
//! - **Tabular**: a tf-idf + linear pipeline exported as a single JSON file.
//! - **Heuristic**: ordered keyword rules, always available.
//!
//! The backend is picked once by [`TaskClassifier::load`]. Learned backends are
//! wrapped in [`WithHeuristicFallback`], so a failed inference degrades to the
//! keyword rules for that call only and the chosen mode never changes.

pub mod heuristic;
pub mod sequence;
pub mod tabular;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::types::TaskCategory;

pub use heuristic::HeuristicClassifier;
pub use sequence::SequenceModel;
pub use tabular::TabularModel;

/// Text signals describing the upcoming task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSignals<'a> {
    pub title: &'a str,
    pub url: Option<&'a str>,
    pub snippet: Option<&'a str>,
}

impl<'a> TaskSignals<'a> {
    pub fn new(title: &'a str, url: Option<&'a str>, snippet: Option<&'a str>) -> Self {
        Self { title, url, snippet }
    }

    /// Space-joined feature text consumed by learned models.
    pub fn feature_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.url.unwrap_or(""),
            self.snippet.unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    Sequence,
    Tabular,
    Heuristic,
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierMode::Sequence => write!(f, "sequence"),
            ClassifierMode::Tabular => write!(f, "tabular"),
            ClassifierMode::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// A task classifier backend. Implementations never fail.
pub trait Classify: Send + Sync {
    fn mode(&self) -> ClassifierMode;

    fn predict(&self, signals: &TaskSignals<'_>) -> TaskCategory;
}

/// A learned model whose inference may fail.
pub trait LearnedModel: Send + Sync {
    const MODE: ClassifierMode;

    fn infer(&self, features: &str) -> Result<TaskCategory, ModelError>;
}

/// Failure boundary that substitutes the heuristic when inference fails.
#[derive(Debug)]
pub struct WithHeuristicFallback<M> {
    model: M,
}

impl<M: LearnedModel> WithHeuristicFallback<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: LearnedModel> Classify for WithHeuristicFallback<M> {
    fn mode(&self) -> ClassifierMode {
        M::MODE
    }

    fn predict(&self, signals: &TaskSignals<'_>) -> TaskCategory {
        match self.model.infer(&signals.feature_text()) {
            Ok(category) => category,
            Err(e) => {
                tracing::error!(
                    mode = %M::MODE,
                    error = %e,
                    "task classifier inference failed, using heuristic"
                );
                heuristic::classify(signals)
            }
        }
    }
}

/// Task classifier with its backend fixed for the process lifetime.
pub struct TaskClassifier {
    backend: Box<dyn Classify>,
}

impl TaskClassifier {
    /// Inspect `path` and load the matching backend.
    ///
    /// A directory containing `config.json` loads the sequence backend; any
    /// other existing file loads the tabular backend. A missing path or a
    /// failed load yields the heuristic.
    pub fn load(path: Option<&Path>, max_sequence_length: usize) -> Self {
        let Some(path) = path else {
            tracing::warn!("no task classifier artifact configured, using heuristic");
            return Self::heuristic();
        };

        if path.is_dir() {
            if path.join(sequence::CONFIG_FILE).is_file() {
                tracing::info!(path = %path.display(), "loading sequence task classifier");
                match SequenceModel::load(path, max_sequence_length) {
                    Ok(model) => return Self::from_learned(model),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to load sequence task classifier")
                    }
                }
            } else {
                tracing::warn!(path = %path.display(), "classifier directory has no config.json");
            }
        } else if path.is_file() {
            tracing::info!(path = %path.display(), "loading tabular task classifier");
            match TabularModel::load(path) {
                Ok(model) => return Self::from_learned(model),
                Err(e) => tracing::error!(error = %e, "failed to load tabular task classifier"),
            }
        } else {
            tracing::warn!(path = %path.display(), "task classifier artifact does not exist");
        }

        tracing::warn!("no valid task classifier found, using heuristic");
        Self::heuristic()
    }

    pub fn heuristic() -> Self {
        Self {
            backend: Box::new(HeuristicClassifier),
        }
    }

    pub fn from_learned<M: LearnedModel + 'static>(model: M) -> Self {
        Self {
            backend: Box::new(WithHeuristicFallback::new(model)),
        }
    }

    pub fn mode(&self) -> ClassifierMode {
        self.backend.mode()
    }

    /// Categorize the next task. Always returns a label.
    pub fn predict(
        &self,
        window_title: &str,
        url: Option<&str>,
        snippet: Option<&str>,
    ) -> TaskCategory {
        self.backend
            .predict(&TaskSignals::new(window_title, url, snippet))
    }
}

impl fmt::Debug for TaskClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskClassifier")
            .field("mode", &self.mode())
            .finish()
    }
}

impl Default for TaskClassifier {
    fn default() -> Self {
        Self::heuristic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl LearnedModel for Broken {
        const MODE: ClassifierMode = ClassifierMode::Tabular;

        fn infer(&self, _features: &str) -> Result<TaskCategory, ModelError> {
            Err(ModelError::Inference("boom".into()))
        }
    }

    struct Fixed(&'static str);

    impl LearnedModel for Fixed {
        const MODE: ClassifierMode = ClassifierMode::Sequence;

        fn infer(&self, _features: &str) -> Result<TaskCategory, ModelError> {
            Ok(TaskCategory::new(self.0))
        }
    }

    #[test]
    fn feature_text_joins_and_trims() {
        assert_eq!(TaskSignals::new("Title", None, None).feature_text(), "Title");
        assert_eq!(
            TaskSignals::new("Title", Some("https://x"), Some("body")).feature_text(),
            "Title https://x body"
        );
    }

    #[test]
    fn failing_model_falls_back_without_changing_mode() {
        let classifier = TaskClassifier::from_learned(Broken);
        let category = classifier.predict("YouTube - funny cats", None, None);
        assert_eq!(category.as_str(), "entertainment_video");
        assert_eq!(classifier.mode(), ClassifierMode::Tabular);
        assert_eq!(classifier.predict("Inbox - Gmail", None, None).as_str(), "communication");
        assert_eq!(classifier.mode(), ClassifierMode::Tabular);
    }

    #[test]
    fn learned_model_labels_pass_through_unvalidated() {
        let classifier = TaskClassifier::from_learned(Fixed("gaming"));
        assert_eq!(classifier.predict("YouTube", None, None).as_str(), "gaming");
        assert_eq!(classifier.mode(), ClassifierMode::Sequence);
    }

    #[test]
    fn missing_artifact_selects_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = TaskClassifier::load(Some(&dir.path().join("absent")), 128);
        assert_eq!(classifier.mode(), ClassifierMode::Heuristic);
        assert_eq!(TaskClassifier::load(None, 128).mode(), ClassifierMode::Heuristic);
    }

    #[test]
    fn directory_without_config_selects_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vocab.txt"), "[UNK]\n").unwrap();
        assert_eq!(TaskClassifier::load(Some(dir.path()), 128).mode(), ClassifierMode::Heuristic);
    }

    #[test]
    fn unparseable_file_selects_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task_classifier.json");
        std::fs::write(&path, "not json").unwrap();
        let classifier = TaskClassifier::load(Some(&path), 128);
        assert_eq!(classifier.mode(), ClassifierMode::Heuristic);
        assert_eq!(classifier.predict("github - repo", None, None).as_str(), "deep_work_coding");
    }

    #[test]
    fn single_file_selects_tabular() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task_classifier.json");
        std::fs::write(&path, tabular::tests::fixture().to_string()).unwrap();
        let classifier = TaskClassifier::load(Some(&path), 128);
        assert_eq!(classifier.mode(), ClassifierMode::Tabular);
        assert_eq!(
            classifier.predict("cats meme", None, None).as_str(),
            "entertainment_video"
        );
    }

    #[test]
    fn model_directory_selects_sequence() {
        let dir = tempfile::tempdir().unwrap();
        sequence::tests::write_fixture(dir.path(), 10);
        let classifier = TaskClassifier::load(Some(dir.path()), 128);
        assert_eq!(classifier.mode(), ClassifierMode::Sequence);
        assert_eq!(classifier.predict("code review", None, None).as_str(), "deep_work_coding");
    }

    #[test]
    fn sequence_index_outside_labels_uses_heuristic_for_that_call() {
        let dir = tempfile::tempdir().unwrap();
        sequence::tests::write_fixture(dir.path(), 12);
        let classifier = TaskClassifier::load(Some(dir.path()), 128);
        assert_eq!(classifier.mode(), ClassifierMode::Sequence);
        assert_eq!(
            classifier.predict("Inbox - Gmail video", None, None).as_str(),
            "entertainment_video"
        );
        assert_eq!(classifier.mode(), ClassifierMode::Sequence);
    }
}
