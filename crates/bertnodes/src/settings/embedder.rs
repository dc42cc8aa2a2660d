//! # Embedder Settings

use serde::{Deserialize, Serialize};

use crate::{
    errors::{BNResult, BertNodesError},
    settings::{DEFAULT_BATCH_SIZE, InputSettings},
};

/// Settings for [`BertEmbedder`](crate::model::BertEmbedder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderSettings {
    /// Text input columns.
    pub input: InputSettings,

    /// Rows per encoder batch.
    pub batch_size: usize,

    /// Also output one column per sequence position.
    pub include_sequence_embeddings: bool,
}

impl Default for EmbedderSettings {
    fn default() -> Self {
        Self {
            input: InputSettings::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            include_sequence_embeddings: false,
        }
    }
}

impl EmbedderSettings {
    /// Check internal consistency.
    pub fn validate(&self) -> BNResult<()> {
        self.input.validate()?;
        if self.batch_size == 0 {
            return Err(BertNodesError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
