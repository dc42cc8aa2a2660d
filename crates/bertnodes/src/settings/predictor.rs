//! # Classifier Prediction Settings

use serde::{Deserialize, Serialize};

use crate::{
    errors::{BNResult, BertNodesError},
    settings::{DEFAULT_BATCH_SIZE, DEFAULT_PREDICTION_COLUMN, InputSettings, check_threshold},
};

/// Settings for classifier prediction and post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorSettings {
    /// Text input columns.
    pub input: InputSettings,

    /// Rows per prediction batch.
    pub batch_size: usize,

    /// Name of the predicted-label column.
    pub prediction_column: String,

    /// Append one probability column per class.
    pub output_probabilities: bool,

    /// Suffix of the probability column names.
    pub probabilities_column_suffix: String,

    /// Multi-label threshold; `None` uses 0.5.
    pub threshold: Option<f64>,

    /// Multi-label: predict exactly this many classes instead of thresholding.
    pub number_of_classes: Option<usize>,

    /// Multi-label: label separator in the prediction column;
    /// `None` uses the separator the classifier was trained with.
    pub class_separator: Option<String>,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            input: InputSettings::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            prediction_column: DEFAULT_PREDICTION_COLUMN.to_string(),
            output_probabilities: true,
            probabilities_column_suffix: String::new(),
            threshold: None,
            number_of_classes: None,
            class_separator: None,
        }
    }
}

impl PredictorSettings {
    /// Check internal consistency.
    ///
    /// The text input columns are not checked here; the CLI post-processes
    /// precomputed probabilities without them.
    pub fn validate(&self) -> BNResult<()> {
        if self.prediction_column.is_empty() {
            return Err(BertNodesError::Config(
                "prediction column name is empty".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(BertNodesError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        if let Some(threshold) = self.threshold {
            check_threshold(threshold)?;
        }
        if self.number_of_classes == Some(0) {
            return Err(BertNodesError::Config(
                "number of predicted classes must be at least 1".to_string(),
            ));
        }
        if self.threshold.is_some() && self.number_of_classes.is_some() {
            return Err(BertNodesError::Config(
                "a custom threshold and a fixed number of classes are mutually exclusive"
                    .to_string(),
            ));
        }
        if self
            .class_separator
            .as_deref()
            .is_some_and(str::is_empty)
        {
            return Err(BertNodesError::Config(
                "class separator must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PredictorSettings::default();
        assert_eq!(settings.prediction_column, "Prediction");
        assert!(settings.output_probabilities);
        settings.validate().unwrap();
    }

    #[test]
    fn test_validate() {
        let settings = PredictorSettings {
            threshold: Some(1.0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = PredictorSettings {
            threshold: Some(0.3),
            number_of_classes: Some(2),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = PredictorSettings {
            prediction_column: String::new(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
