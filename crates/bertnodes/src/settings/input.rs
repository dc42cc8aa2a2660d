//! # Input Column Settings

use arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

use crate::errors::{BNResult, BertNodesError};

/// Smallest accepted `max_seq_length`: `[CLS]`, one token, `[SEP]`.
pub const MIN_SEQ_LENGTH: usize = 3;

/// Largest accepted `max_seq_length`.
pub const MAX_SEQ_LENGTH: usize = 512;

/// Default `max_seq_length`.
pub const DEFAULT_SEQ_LENGTH: usize = 128;

/// Which text column(s) to tokenize, and to what length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// The first text column.
    pub sentence_column: String,

    /// The optional second text column (two-sentence mode).
    pub second_sentence_column: Option<String>,

    /// Padded sequence length.
    pub max_seq_length: usize,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            sentence_column: String::new(),
            second_sentence_column: None,
            max_seq_length: DEFAULT_SEQ_LENGTH,
        }
    }
}

impl InputSettings {
    /// Settings for a single text column.
    pub fn new<S: Into<String>>(sentence_column: S) -> Self {
        Self {
            sentence_column: sentence_column.into(),
            ..Default::default()
        }
    }

    /// Enable two-sentence mode.
    pub fn with_second_sentence_column<S: Into<String>>(
        mut self,
        column: Option<S>,
    ) -> Self {
        self.second_sentence_column = column.map(Into::into);
        self
    }

    /// Set the padded sequence length.
    pub fn with_max_seq_length(
        mut self,
        max_seq_length: usize,
    ) -> Self {
        self.max_seq_length = max_seq_length;
        self
    }

    /// Check internal consistency.
    pub fn validate(&self) -> BNResult<()> {
        if self.sentence_column.is_empty() {
            return Err(BertNodesError::Config(
                "sentence column is not selected".to_string(),
            ));
        }
        if self
            .second_sentence_column
            .as_deref()
            .is_some_and(str::is_empty)
        {
            return Err(BertNodesError::Config(
                "second sentence column is not selected".to_string(),
            ));
        }
        if !(MIN_SEQ_LENGTH..=MAX_SEQ_LENGTH).contains(&self.max_seq_length) {
            return Err(BertNodesError::Config(format!(
                "max_seq_length must be in {MIN_SEQ_LENGTH}..={MAX_SEQ_LENGTH}, got {}",
                self.max_seq_length
            )));
        }
        Ok(())
    }

    /// Check that the configured columns exist in `schema`.
    pub fn validate_schema(
        &self,
        schema: &Schema,
    ) -> BNResult<()> {
        self.validate()?;
        let columns = std::iter::once(&self.sentence_column).chain(&self.second_sentence_column);
        for column in columns {
            if schema.column_with_name(column).is_none() {
                return Err(BertNodesError::MissingColumn(column.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use arrow::datatypes::{DataType, Field};

    use super::*;

    #[test]
    fn test_validate() {
        assert!(InputSettings::default().validate().is_err());

        let settings = InputSettings::new("text");
        settings.validate().unwrap();
        assert_eq!(settings.max_seq_length, 128);

        assert!(settings.clone().with_max_seq_length(2).validate().is_err());
        assert!(settings.clone().with_max_seq_length(513).validate().is_err());
        assert!(
            settings
                .clone()
                .with_second_sentence_column(Some(""))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_validate_schema() {
        let schema = Schema::new(vec![Field::new("text", DataType::Utf8, true)]);
        InputSettings::new("text").validate_schema(&schema).unwrap();

        let result = InputSettings::new("text")
            .with_second_sentence_column(Some("pair"))
            .validate_schema(&schema);
        assert!(matches!(result, Err(BertNodesError::MissingColumn(c)) if c == "pair"));
    }

    #[test]
    fn test_serde_defaults() {
        let settings: InputSettings = serde_json::from_str(r#"{"sentence_column": "a"}"#).unwrap();
        assert_eq!(settings, InputSettings::new("a"));
    }
}
