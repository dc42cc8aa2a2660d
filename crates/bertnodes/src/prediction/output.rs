//! # Prediction Output Tables

use arrow::record_batch::RecordBatch;

use crate::{
    classes::ClassDictionary,
    errors::{BNResult, BertNodesError},
    prediction::{PredictionStrategy, probability_column_name},
    settings::PredictorSettings,
    table,
};

/// Turns classifier probabilities into the prediction output table.
#[derive(Debug, Clone)]
pub struct PredictionTableBuilder<'a> {
    classes: &'a ClassDictionary,
    strategy: PredictionStrategy,
    settings: &'a PredictorSettings,
    separator: &'a str,
}

impl<'a> PredictionTableBuilder<'a> {
    /// Create a builder.
    ///
    /// ## Arguments
    /// * `settings` - output options.
    /// * `classes` - the classifier's class dictionary.
    /// * `multi_label` - whether the classifier is multi-label.
    /// * `trained_separator` - the classifier's separator, used unless overridden.
    pub fn new(
        settings: &'a PredictorSettings,
        classes: &'a ClassDictionary,
        multi_label: bool,
        trained_separator: &'a str,
    ) -> BNResult<Self> {
        settings.validate()?;
        let strategy = PredictionStrategy::from_settings(settings, multi_label, classes.len())?;
        let separator = settings
            .class_separator
            .as_deref()
            .unwrap_or(trained_separator);

        Ok(Self {
            classes,
            strategy,
            settings,
            separator,
        })
    }

    /// The selection strategy in use.
    pub fn strategy(&self) -> PredictionStrategy {
        self.strategy
    }

    /// Names of the probability columns, in class order.
    pub fn probability_column_names(&self) -> Vec<String> {
        self.classes
            .labels()
            .iter()
            .map(|label| probability_column_name(label, &self.settings.probabilities_column_suffix))
            .collect()
    }

    fn check_widths(
        &self,
        probabilities: &[Vec<f32>],
    ) -> BNResult<()> {
        if let Some(row) = probabilities
            .iter()
            .position(|p| p.len() != self.classes.len())
        {
            return Err(BertNodesError::Input(format!(
                "probability row {row} has {} values, expected {} classes",
                probabilities[row].len(),
                self.classes.len()
            )));
        }
        Ok(())
    }

    /// The prediction cell of every row; multiple labels are joined by the separator.
    pub fn predictions(
        &self,
        probabilities: &[Vec<f32>],
    ) -> BNResult<Vec<String>> {
        self.check_widths(probabilities)?;
        Ok(probabilities
            .iter()
            .map(|row| {
                self.strategy
                    .select(row)
                    .into_iter()
                    .filter_map(|idx| self.classes.label_of(idx))
                    .collect::<Vec<_>>()
                    .join(self.separator)
            })
            .collect())
    }

    /// Append the prediction column, and optionally the probability columns, to `input`.
    pub fn build(
        &self,
        input: &RecordBatch,
        probabilities: &[Vec<f32>],
    ) -> BNResult<RecordBatch> {
        if probabilities.len() != input.num_rows() {
            return Err(BertNodesError::Input(format!(
                "got {} probability rows for {} input rows",
                probabilities.len(),
                input.num_rows()
            )));
        }

        let predictions = self.predictions(probabilities)?;
        let mut columns = vec![(
            self.settings.prediction_column.clone(),
            table::string_column_from(predictions),
        )];

        if self.settings.output_probabilities {
            for (idx, name) in self.probability_column_names().into_iter().enumerate() {
                columns.push((
                    name,
                    table::float_column(probabilities.iter().map(|row| row[idx])),
                ));
            }
        }

        table::append_columns(input, columns)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{ArrayRef, AsArray, StringArray},
        datatypes::Float64Type,
    };

    use super::*;

    fn input(rows: usize) -> RecordBatch {
        let text: Vec<String> = (0..rows).map(|i| format!("row {i}")).collect();
        table::batch_from_columns(vec![(
            "text".to_string(),
            Arc::new(StringArray::from(text)) as ArrayRef,
        )])
        .unwrap()
    }

    #[test]
    fn test_single_label_table() {
        let classes = ClassDictionary::from_labels(["neg", "pos"]);
        let settings = PredictorSettings::default();
        let builder = PredictionTableBuilder::new(&settings, &classes, false, ",").unwrap();

        let out = builder
            .build(&input(2), &[vec![0.2, 0.8], vec![0.9, 0.1]])
            .unwrap();
        let schema = out.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["text", "Prediction", "P (neg)", "P (pos)"]);

        let predictions = out.column(1).as_string::<i32>();
        assert_eq!(predictions.value(0), "pos");
        assert_eq!(predictions.value(1), "neg");

        let p_pos = out.column(3).as_primitive::<Float64Type>();
        assert!((p_pos.value(0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_multi_label_predictions() {
        let classes = ClassDictionary::from_labels(["class0", "class1", "class2"]);
        let settings = PredictorSettings {
            output_probabilities: false,
            ..Default::default()
        };
        let builder = PredictionTableBuilder::new(&settings, &classes, true, ";").unwrap();

        assert_eq!(
            builder.predictions(&[vec![0.7, 0.3, 0.6]]).unwrap(),
            vec!["class0;class2"]
        );

        let out = builder.build(&input(1), &[vec![0.7, 0.3, 0.6]]).unwrap();
        assert_eq!(out.num_columns(), 2);
    }

    #[test]
    fn test_custom_columns() {
        let classes = ClassDictionary::from_labels(["a", "b", "c"]);
        let settings = PredictorSettings {
            prediction_column: "Label".to_string(),
            probabilities_column_suffix: "_bert".to_string(),
            number_of_classes: Some(2),
            class_separator: Some("|".to_string()),
            ..Default::default()
        };
        let builder = PredictionTableBuilder::new(&settings, &classes, true, ",").unwrap();
        assert_eq!(
            builder.probability_column_names(),
            vec!["P (a)_bert", "P (b)_bert", "P (c)_bert"]
        );
        assert_eq!(
            builder.predictions(&[vec![0.1, 0.6, 0.3]]).unwrap(),
            vec!["b|c"]
        );
    }

    #[test]
    fn test_width_mismatch() {
        let classes = ClassDictionary::from_labels(["a", "b"]);
        let settings = PredictorSettings::default();
        let builder = PredictionTableBuilder::new(&settings, &classes, false, ",").unwrap();
        assert!(matches!(
            builder.build(&input(1), &[vec![0.1, 0.2, 0.7]]),
            Err(BertNodesError::Input(_))
        ));
        assert!(builder.build(&input(2), &[vec![0.1, 0.9]]).is_err());
    }
}
