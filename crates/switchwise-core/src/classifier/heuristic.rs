//! Keyword heuristic, the terminal fallback for every classifier mode.

use crate::types::TaskCategory;

use super::{Classify, ClassifierMode, TaskSignals};

/// Ordered substring rules; the first rule with a matching keyword wins.
const KEYWORD_RULES: [(&[&str], &str); 6] = [
    (&["youtube", "netflix", "video"], TaskCategory::ENTERTAINMENT_VIDEO),
    (&["vs code", ".py", "github", "terminal"], TaskCategory::DEEP_WORK_CODING),
    (&["instagram", "twitter", "reddit", "facebook"], TaskCategory::SOCIAL_MEDIA),
    (&["pdf", "book", "paper", "arxiv"], TaskCategory::STUDYING_READING),
    (&["gmail", "slack", "whatsapp", "discord"], TaskCategory::COMMUNICATION),
    (&["stackoverflow", "docs"], TaskCategory::RESEARCH_BROWSING),
];

/// Classify signals by keyword.
pub fn classify(signals: &TaskSignals<'_>) -> TaskCategory {
    let text = format!(
        "{} {} {}",
        signals.title,
        signals.url.unwrap_or(""),
        signals.snippet.unwrap_or("")
    )
    .to_lowercase();

    let label = KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, label)| *label)
        .unwrap_or(TaskCategory::OTHER_UNKNOWN);

    TaskCategory::new(label)
}

/// Classifier that only ever uses the keyword rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl Classify for HeuristicClassifier {
    fn mode(&self) -> ClassifierMode {
        ClassifierMode::Heuristic
    }

    fn predict(&self, signals: &TaskSignals<'_>) -> TaskCategory {
        classify(signals)
    }
}
