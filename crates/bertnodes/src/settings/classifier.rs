//! # Classifier Training Settings

use serde::{Deserialize, Serialize};

use crate::{
    errors::{BNResult, BertNodesError},
    model::Optimizer,
    settings::{DEFAULT_BATCH_SIZE, DEFAULT_CLASS_SEPARATOR, InputSettings},
};

/// Settings for [`BertClassifier::train`](crate::model::BertClassifier::train).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Text input columns.
    pub input: InputSettings,

    /// The label column: string labels, or a multi-hot `List<Float64>` column.
    pub class_column: String,

    /// Fixed class order; required when `class_column` is already multi-hot.
    pub class_names: Option<Vec<String>>,

    /// Each row may carry several labels.
    pub multi_label: bool,

    /// Separator between labels in a multi-label cell.
    pub class_separator: String,

    /// Rows per training batch.
    pub batch_size: usize,

    /// Number of passes over the training table.
    pub epochs: usize,

    /// Train the encoder weights too, not just the head.
    pub fine_tune_encoder: bool,

    /// The training optimizer.
    pub optimizer: Optimizer,

    /// Seed for the per-epoch shuffle; random when absent.
    pub seed: Option<u64>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            input: InputSettings::default(),
            class_column: String::new(),
            class_names: None,
            multi_label: false,
            class_separator: DEFAULT_CLASS_SEPARATOR.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            epochs: 1,
            fine_tune_encoder: false,
            optimizer: Optimizer::default(),
            seed: None,
        }
    }
}

impl ClassifierSettings {
    /// Check internal consistency.
    pub fn validate(&self) -> BNResult<()> {
        self.input.validate()?;
        if self.class_column.is_empty() {
            return Err(BertNodesError::Config(
                "class column is not selected".to_string(),
            ));
        }
        if self.multi_label && self.class_separator.is_empty() {
            return Err(BertNodesError::Config(
                "class separator must not be empty".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(BertNodesError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.epochs == 0 {
            return Err(BertNodesError::Config(
                "number of epochs must be at least 1".to_string(),
            ));
        }
        self.optimizer.validate()
    }
}
