//! # Zero-shot Classifier Settings

use serde::{Deserialize, Serialize};

use crate::{
    errors::{BNResult, BertNodesError},
    settings::{DEFAULT_BATCH_SIZE, DEFAULT_THRESHOLD, check_threshold},
    zero_shot::HypothesisTemplate,
};

/// Settings for [`ZeroShotClassifier`](crate::zero_shot::ZeroShotClassifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroShotSettings {
    /// The text column.
    pub sentence_column: String,

    /// Comma-separated candidate labels.
    pub candidate_labels: String,

    /// Hypothesis template with one `{}` placeholder; `None` uses the default.
    pub hypothesis: Option<String>,

    /// Score each label independently.
    pub multi_label: bool,

    /// Multi-label decision threshold; `None` uses 0.5.
    pub threshold: Option<f64>,

    /// Append one probability column per label.
    pub output_probabilities: bool,

    /// Premise/hypothesis pairs per model batch.
    pub batch_size: usize,
}

impl Default for ZeroShotSettings {
    fn default() -> Self {
        Self {
            sentence_column: String::new(),
            candidate_labels: String::new(),
            hypothesis: None,
            multi_label: false,
            threshold: None,
            output_probabilities: true,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ZeroShotSettings {
    /// The effective multi-label threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    /// The effective hypothesis template.
    pub fn hypothesis_template(&self) -> BNResult<HypothesisTemplate> {
        match &self.hypothesis {
            Some(template) => HypothesisTemplate::new(template),
            None => Ok(HypothesisTemplate::default()),
        }
    }

    /// Check internal consistency.
    pub fn validate(&self) -> BNResult<()> {
        if self.sentence_column.is_empty() {
            return Err(BertNodesError::Config(
                "sentence column is not selected".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(BertNodesError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.multi_label {
            check_threshold(self.threshold())?;
        }
        self.hypothesis_template().map(|_| ())
    }
}
