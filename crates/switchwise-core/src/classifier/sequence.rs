//! Token-sequence classifier.
//!
//! The exported model is a directory:
//!
//! - `config.json`: `hidden_size`, `num_labels`, optional `max_length` and
//!   `do_lower_case`
//! - `vocab.txt`: one WordPiece token per line, line number = token id
//! - `model.json`: `embeddings` (vocab x hidden), `classifier_weight`
//!   (labels x hidden) and `classifier_bias` (labels)
//!
//! Inference mean-pools the token embeddings, applies the linear head and maps
//! the argmax index into the canonical label list by position.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ModelError;
use crate::types::TaskCategory;

use super::{ClassifierMode, LearnedModel};

pub const CONFIG_FILE: &str = "config.json";
pub const VOCAB_FILE: &str = "vocab.txt";
pub const WEIGHTS_FILE: &str = "model.json";

const UNK_TOKEN: &str = "[UNK]";
const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";
const CONTINUATION_PREFIX: &str = "##";
const MAX_WORD_CHARS: usize = 100;

fn default_max_length() -> usize {
    128
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
struct SequenceConfig {
    #[serde(alias = "dim")]
    hidden_size: usize,
    num_labels: usize,
    #[serde(default = "default_max_length")]
    max_length: usize,
    #[serde(default = "default_true")]
    do_lower_case: bool,
}

#[derive(Debug, Deserialize)]
struct SequenceWeights {
    embeddings: Vec<Vec<f32>>,
    classifier_weight: Vec<Vec<f32>>,
    classifier_bias: Vec<f32>,
}

/// WordPiece tokenizer over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    vocab: HashMap<String, usize>,
    unk_id: usize,
    cls_id: Option<usize>,
    sep_id: Option<usize>,
    lowercase: bool,
}

impl WordPieceTokenizer {
    pub fn from_vocab(tokens: &[String], lowercase: bool) -> Result<Self, ModelError> {
        let vocab: HashMap<String, usize> = tokens
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id))
            .collect();
        let unk_id = *vocab.get(UNK_TOKEN).ok_or_else(|| {
            ModelError::InvalidArtifact(format!("vocabulary has no {UNK_TOKEN} token"))
        })?;

        Ok(Self {
            cls_id: vocab.get(CLS_TOKEN).copied(),
            sep_id: vocab.get(SEP_TOKEN).copied(),
            vocab,
            unk_id,
            lowercase,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Encode `text` into at most `max_length` token ids, special tokens included.
    pub fn encode(&self, text: &str, max_length: usize) -> Vec<usize> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let reserved = usize::from(self.cls_id.is_some()) + usize::from(self.sep_id.is_some());
        let budget = max_length.saturating_sub(reserved);

        let mut ids: Vec<usize> = basic_tokens(&text)
            .iter()
            .flat_map(|word| self.word_pieces(word))
            .take(budget)
            .collect();

        if let Some(cls) = self.cls_id {
            ids.insert(0, cls);
        }
        if let Some(sep) = self.sep_id {
            ids.push(sep);
        }
        ids.truncate(max_length);
        ids
    }

    fn word_pieces(&self, word: &str) -> Vec<usize> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_WORD_CHARS {
            return vec![self.unk_id];
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut end = chars.len();
            let mut found = None;
            while start < end {
                let mut candidate: String = chars[start..end].iter().collect();
                if start > 0 {
                    candidate.insert_str(0, CONTINUATION_PREFIX);
                }
                if let Some(&id) = self.vocab.get(&candidate) {
                    found = Some(id);
                    break;
                }
                end -= 1;
            }
            match found {
                Some(id) => {
                    pieces.push(id);
                    start = end;
                }
                None => return vec![self.unk_id],
            }
        }
        pieces
    }
}

/// Split on whitespace, emitting each punctuation character as its own token.
fn basic_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else if ch.is_alphanumeric() {
            current.push(ch);
        } else {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(ch.to_string());
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Loaded sequence classifier.
#[derive(Debug)]
pub struct SequenceModel {
    tokenizer: WordPieceTokenizer,
    max_length: usize,
    embeddings: Vec<Vec<f32>>,
    classifier_weight: Vec<Vec<f32>>,
    classifier_bias: Vec<f32>,
}

impl SequenceModel {
    /// Load a model directory. `max_sequence_length` caps the configured length.
    pub fn load(dir: &Path, max_sequence_length: usize) -> Result<Self, ModelError> {
        let config: SequenceConfig = read_json(&dir.join(CONFIG_FILE))?;

        let vocab_path = dir.join(VOCAB_FILE);
        let vocab: Vec<String> = std::fs::read_to_string(&vocab_path)
            .map_err(|e| ModelError::load(&vocab_path, e))?
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        let tokenizer = WordPieceTokenizer::from_vocab(&vocab, config.do_lower_case)?;

        let weights: SequenceWeights = read_json(&dir.join(WEIGHTS_FILE))?;

        let model = Self {
            max_length: config.max_length.min(max_sequence_length).max(1),
            tokenizer,
            embeddings: weights.embeddings,
            classifier_weight: weights.classifier_weight,
            classifier_bias: weights.classifier_bias,
        };
        model.validate(vocab.len(), &config)?;

        tracing::info!(
            path = %dir.display(),
            vocab = model.tokenizer.vocab_size(),
            labels = config.num_labels,
            max_length = model.max_length,
            "loaded sequence task classifier"
        );
        Ok(model)
    }

    fn validate(&self, vocab_len: usize, config: &SequenceConfig) -> Result<(), ModelError> {
        let hidden = config.hidden_size;
        if self.embeddings.len() != vocab_len {
            return Err(ModelError::InvalidArtifact(format!(
                "embedding rows ({}) do not match vocabulary size ({vocab_len})",
                self.embeddings.len()
            )));
        }
        if self.embeddings.iter().any(|row| row.len() != hidden) {
            return Err(ModelError::InvalidArtifact(format!(
                "embedding rows must have {hidden} columns"
            )));
        }
        if self.classifier_weight.len() != config.num_labels
            || self.classifier_bias.len() != config.num_labels
        {
            return Err(ModelError::InvalidArtifact(format!(
                "classifier head must have {} outputs",
                config.num_labels
            )));
        }
        if self.classifier_weight.iter().any(|row| row.len() != hidden) {
            return Err(ModelError::InvalidArtifact(format!(
                "classifier rows must have {hidden} columns"
            )));
        }
        Ok(())
    }

    /// Index of the highest-scoring output.
    pub fn predict_index(&self, features: &str) -> Result<usize, ModelError> {
        let ids = self.tokenizer.encode(features, self.max_length);
        if ids.is_empty() {
            return Err(ModelError::Inference("input produced no tokens".into()));
        }

        let hidden = self.classifier_weight.first().map_or(0, Vec::len);
        let mut pooled = vec![0.0f32; hidden];
        for &id in &ids {
            let row = self
                .embeddings
                .get(id)
                .ok_or_else(|| ModelError::Inference(format!("token id {id} has no embedding")))?;
            for (acc, value) in pooled.iter_mut().zip(row) {
                *acc += value;
            }
        }
        let count = ids.len() as f32;
        pooled.iter_mut().for_each(|v| *v /= count);

        self.classifier_weight
            .iter()
            .zip(&self.classifier_bias)
            .map(|(row, bias)| row.iter().zip(&pooled).map(|(w, x)| w * x).sum::<f32>() + bias)
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (idx, logit)| match best {
                Some((_, top)) if top >= logit => best,
                _ => Some((idx, logit)),
            })
            .map(|(idx, _)| idx)
            .ok_or_else(|| ModelError::Inference("classifier head has no outputs".into()))
    }
}

impl LearnedModel for SequenceModel {
    const MODE: ClassifierMode = ClassifierMode::Sequence;

    fn infer(&self, features: &str) -> Result<TaskCategory, ModelError> {
        let idx = self.predict_index(features)?;
        TaskCategory::CANONICAL
            .get(idx)
            .map(|label| TaskCategory::new(*label))
            .ok_or_else(|| {
                ModelError::Inference(format!("label index {idx} is outside the label list"))
            })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let content = std::fs::read_to_string(path).map_err(|e| ModelError::load(path, e))?;
    serde_json::from_str(&content).map_err(|e| ModelError::load(path, e))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Write a two-dimensional model whose embeddings point "video" at
    /// entertainment_video (index 6) and "code" at deep_work_coding (index 0).
    /// With 12 outputs, index 11 outscores both.
    pub(crate) fn write_fixture(dir: &Path, num_labels: usize) {
        let vocab = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "video", "code", "##s", "-"];
        std::fs::write(dir.join(VOCAB_FILE), vocab.join("\n")).unwrap();
        std::fs::write(
            dir.join(CONFIG_FILE),
            json!({ "hidden_size": 2, "num_labels": num_labels, "max_length": 16 }).to_string(),
        )
        .unwrap();

        let embeddings = vec![
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![10.0, 0.0],
            vec![0.0, 10.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
        ];
        let mut classifier_weight = vec![vec![0.0, 0.0]; num_labels];
        classifier_weight[0] = vec![0.0, 1.0];
        if num_labels > 6 {
            classifier_weight[6] = vec![1.0, 0.0];
        }
        if num_labels > 11 {
            classifier_weight[11] = vec![2.0, 2.0];
        }
        std::fs::write(
            dir.join(WEIGHTS_FILE),
            json!({
                "embeddings": embeddings,
                "classifier_weight": classifier_weight,
                "classifier_bias": vec![0.0; num_labels],
            })
            .to_string(),
        )
        .unwrap();
    }

    fn tokenizer() -> WordPieceTokenizer {
        let vocab: Vec<String> = ["[UNK]", "[CLS]", "[SEP]", "play", "##ing", "list", "##s", "."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        WordPieceTokenizer::from_vocab(&vocab, true).unwrap()
    }

    #[test]
    fn basic_tokens_split_punctuation() {
        assert_eq!(basic_tokens("a.py  b-c"), vec!["a", ".", "py", "b", "-", "c"]);
    }

    #[test]
    fn encode_uses_word_pieces_and_special_tokens() {
        assert_eq!(tokenizer().encode("Playing lists.", 16), vec![1, 3, 4, 5, 6, 7, 2]);
    }

    #[test]
    fn encode_maps_unknown_words_to_unk() {
        assert_eq!(tokenizer().encode("zebra", 16), vec![1, 0, 2]);
    }

    #[test]
    fn encode_truncates_to_max_length() {
        let ids = tokenizer().encode("play play play play play", 4);
        assert_eq!(ids, vec![1, 3, 3, 2]);
    }

    #[test]
    fn vocab_without_unk_is_rejected() {
        let vocab = vec!["a".to_string()];
        assert!(WordPieceTokenizer::from_vocab(&vocab, true).is_err());
    }

    #[test]
    fn predicts_by_label_position() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), 10);
        let model = SequenceModel::load(dir.path(), 128).unwrap();
        assert_eq!(model.infer("video").unwrap().as_str(), "entertainment_video");
        assert_eq!(model.infer("code").unwrap().as_str(), "deep_work_coding");
    }

    #[test]
    fn index_past_label_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), 12);
        let model = SequenceModel::load(dir.path(), 128).unwrap();
        assert_eq!(model.predict_index("video").unwrap(), 11);
        assert!(matches!(model.infer("video"), Err(ModelError::Inference(_))));
    }

    #[test]
    fn mismatched_weights_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), 10);
        std::fs::write(
            dir.path().join(WEIGHTS_FILE),
            json!({
                "embeddings": [[0.0, 0.0]],
                "classifier_weight": [],
                "classifier_bias": []
            })
            .to_string(),
        )
        .unwrap();
        assert!(matches!(
            SequenceModel::load(dir.path(), 128),
            Err(ModelError::InvalidArtifact(_))
        ));
    }
}
