//! # Zero-shot Classifier

use arrow::{array::ArrayRef, record_batch::RecordBatch};

use crate::{
    errors::{BNResult, BertNodesError},
    prediction::{argmax, probability_column_name, softmax},
    progress::ProgressListener,
    settings::{DEFAULT_PREDICTION_COLUMN, ZeroShotSettings},
    table,
    tokenization::BATCH_REPORT_INTERVAL,
    zero_shot::HypothesisTemplate,
};

/// A natural-language-inference model.
pub trait EntailmentModel {
    /// Score `(premise, hypothesis)` pairs.
    ///
    /// Returns one logit row per pair; the first logit is contradiction
    /// and the last is entailment.
    fn logits(
        &mut self,
        pairs: &[(String, String)],
    ) -> BNResult<Vec<Vec<f32>>>;
}

/// Split a comma-separated label list, trimming and dropping empty labels.
pub fn parse_candidate_labels(labels: &str) -> Vec<String> {
    labels
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Classifies text against candidate labels through an [`EntailmentModel`].
#[derive(Debug, Clone)]
pub struct ZeroShotClassifier {
    settings: ZeroShotSettings,
    template: HypothesisTemplate,
    labels: Vec<String>,
}

impl ZeroShotClassifier {
    /// Validate settings and build a classifier.
    pub fn new(settings: ZeroShotSettings) -> BNResult<Self> {
        settings.validate()?;
        let template = settings.hypothesis_template()?;
        let labels = parse_candidate_labels(&settings.candidate_labels);
        Ok(Self {
            settings,
            template,
            labels,
        })
    }

    /// The candidate labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The hypothesis template.
    pub fn template(&self) -> &HypothesisTemplate {
        &self.template
    }

    /// Premise/hypothesis pairs, label-major within each sentence.
    pub fn pairs(
        &self,
        sentences: &[&str],
    ) -> Vec<(String, String)> {
        sentences
            .iter()
            .flat_map(|sentence| {
                self.labels
                    .iter()
                    .map(move |label| (sentence.to_string(), self.template.render(label)))
            })
            .collect()
    }

    /// Convert pair logits into per-sentence label probabilities.
    ///
    /// * single-label: softmax of the entailment logits across the labels of a sentence.
    /// * multi-label: per pair, softmax of `[contradiction, entailment]`; keep entailment.
    pub fn label_probabilities(
        &self,
        logits: &[Vec<f32>],
    ) -> BNResult<Vec<Vec<f32>>> {
        let label_count = self.labels.len();
        if label_count == 0 || logits.len() % label_count != 0 {
            return Err(BertNodesError::Input(format!(
                "got {} logit rows for {label_count} candidate labels",
                logits.len()
            )));
        }

        let min_width = if self.settings.multi_label { 2 } else { 1 };
        if let Some(row) = logits.iter().position(|l| l.len() < min_width) {
            return Err(BertNodesError::Input(format!(
                "logit row {row} has {} values, expected at least {min_width}",
                logits[row].len()
            )));
        }

        Ok(logits
            .chunks(label_count)
            .map(|sentence| {
                if self.settings.multi_label {
                    sentence
                        .iter()
                        .map(|l| softmax(&[l[0], l[l.len() - 1]])[1])
                        .collect()
                } else {
                    let entailment: Vec<f32> = sentence.iter().map(|l| l[l.len() - 1]).collect();
                    softmax(&entailment)
                }
            })
            .collect())
    }

    /// Classify the configured column of `batch`.
    ///
    /// Pair building reports `listener.on_tokenize_rows_end` every 10 rows and
    /// after the last one. Pairs are scored in batches of `batch_size`, calling
    /// `listener.on_predict_batch_end` after each. A tracker for this job
    /// counts pairs (`rows * labels`), not rows.
    ///
    /// ## Errors
    /// * the table has no rows, or there are no candidate labels.
    /// * the sentence column is missing or has null values.
    /// * the model fails or returns malformed logits.
    pub fn classify<M: EntailmentModel + ?Sized>(
        &self,
        model: &mut M,
        batch: &RecordBatch,
        listener: &mut dyn ProgressListener,
    ) -> BNResult<RecordBatch> {
        let column = &self.settings.sentence_column;
        if batch.num_rows() == 0 {
            return Err(BertNodesError::Input(format!(
                "sentence column {column:?} is empty"
            )));
        }
        if self.labels.is_empty() {
            return Err(BertNodesError::Input(
                "at least one candidate label must be provided".to_string(),
            ));
        }

        let texts = table::string_column(batch, column)?;
        let sentences = (0..batch.num_rows())
            .map(|row| table::required_str(&texts, column, row))
            .collect::<BNResult<Vec<_>>>()?;

        let mut pairs = Vec::with_capacity(sentences.len() * self.labels.len());
        for (row, sentence) in sentences.iter().enumerate() {
            pairs.extend(self.pairs(&[*sentence]));
            let done = row + 1;
            if done % BATCH_REPORT_INTERVAL == 0 || done == sentences.len() {
                listener.on_tokenize_rows_end(pairs.len());
            }
        }
        let mut logits = Vec::with_capacity(pairs.len());
        for (idx, chunk) in pairs.chunks(self.settings.batch_size).enumerate() {
            let chunk_logits = model.logits(chunk)?;
            if chunk_logits.len() != chunk.len() {
                return Err(BertNodesError::Input(format!(
                    "entailment model returned {} rows for {} pairs",
                    chunk_logits.len(),
                    chunk.len()
                )));
            }
            logits.extend(chunk_logits);
            listener.on_predict_batch_end(idx);
        }
        log::debug!(
            "scored {} pairs for {} labels",
            pairs.len(),
            self.labels.len()
        );

        let probabilities = self.label_probabilities(&logits)?;
        let columns = self.output_columns(&probabilities);
        table::append_columns(batch, columns)
    }

    fn output_columns(
        &self,
        probabilities: &[Vec<f32>],
    ) -> Vec<(String, ArrayRef)> {
        let mut columns = Vec::new();

        if self.settings.multi_label {
            let threshold = self.settings.threshold();
            for (idx, label) in self.labels.iter().enumerate() {
                let flags = probabilities
                    .iter()
                    .map(|row| i32::from(f64::from(row[idx]) >= threshold));
                columns.push((label.clone(), table::int_column(flags)));
            }
        } else {
            let predictions = probabilities
                .iter()
                .map(|row| {
                    argmax(row)
                        .map(|idx| self.labels[idx].clone())
                        .unwrap_or_default()
                })
                .collect();
            columns.push((
                DEFAULT_PREDICTION_COLUMN.to_string(),
                table::string_column_from(predictions),
            ));
        }

        if self.settings.output_probabilities {
            for (idx, label) in self.labels.iter().enumerate() {
                columns.push((
                    probability_column_name(label, ""),
                    table::float_column(probabilities.iter().map(|row| row[idx])),
                ));
            }
        }

        columns
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{AsArray, StringArray},
        datatypes::{Float64Type, Int32Type},
    };

    use super::*;
    use crate::progress::{JobKind, NoProgress, ProgressTracker, RecordingSink};

    /// Entailment logit = number of shared words; contradiction = 0.
    struct WordOverlap {
        calls: usize,
    }

    impl EntailmentModel for WordOverlap {
        fn logits(
            &mut self,
            pairs: &[(String, String)],
        ) -> BNResult<Vec<Vec<f32>>> {
            self.calls += 1;
            Ok(pairs
                .iter()
                .map(|(premise, hypothesis)| {
                    let shared = hypothesis
                        .split_whitespace()
                        .filter(|w| premise.split_whitespace().any(|p| p == *w))
                        .count();
                    vec![0.0, 0.0, shared as f32]
                })
                .collect())
        }
    }

    fn settings(multi_label: bool) -> ZeroShotSettings {
        ZeroShotSettings {
            sentence_column: "text".to_string(),
            candidate_labels: "sports, politics,".to_string(),
            hypothesis: Some("{}".to_string()),
            multi_label,
            batch_size: 3,
            ..Default::default()
        }
    }

    fn sentences(texts: Vec<&str>) -> RecordBatch {
        table::batch_from_columns(vec![(
            "text".to_string(),
            Arc::new(StringArray::from(texts)) as ArrayRef,
        )])
        .unwrap()
    }

    #[test]
    fn test_labels_and_pairs() {
        let classifier = ZeroShotClassifier::new(settings(false)).unwrap();
        assert_eq!(classifier.labels(), &["sports", "politics"]);
        assert_eq!(
            classifier.pairs(&["a"]),
            vec![
                ("a".to_string(), "sports".to_string()),
                ("a".to_string(), "politics".to_string()),
            ]
        );
    }

    #[test]
    fn test_single_label() {
        let classifier = ZeroShotClassifier::new(settings(false)).unwrap();
        let mut model = WordOverlap { calls: 0 };
        let out = classifier
            .classify(&mut model, &sentences(vec!["sports news", "politics"]), &mut NoProgress)
            .unwrap();

        // 4 pairs in batches of 3.
        assert_eq!(model.calls, 2);

        let predictions = out.column(1).as_string::<i32>();
        assert_eq!(predictions.value(0), "sports");
        assert_eq!(predictions.value(1), "politics");

        let p0 = out.column(2).as_primitive::<Float64Type>();
        let p1 = out.column(3).as_primitive::<Float64Type>();
        for row in 0..2 {
            assert!((p0.value(row) + p1.value(row) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_multi_label() {
        let classifier = ZeroShotClassifier::new(ZeroShotSettings {
            threshold: Some(0.6),
            ..settings(true)
        })
        .unwrap();
        let out = classifier
            .classify(
                &mut WordOverlap { calls: 0 },
                &sentences(vec!["sports and politics", "weather"]),
                &mut NoProgress,
            )
            .unwrap();

        let schema = out.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec!["text", "sports", "politics", "P (sports)", "P (politics)"]
        );
        let sports = out.column(1).as_primitive::<Int32Type>();
        assert_eq!(sports.values().to_vec(), vec![1, 0]);
    }

    #[test]
    fn test_input_errors() {
        let classifier = ZeroShotClassifier::new(settings(false)).unwrap();
        let mut model = WordOverlap { calls: 0 };
        assert!(matches!(
            classifier.classify(&mut model, &sentences(vec![]), &mut NoProgress),
            Err(BertNodesError::Input(_))
        ));

        let no_labels = ZeroShotClassifier::new(ZeroShotSettings {
            candidate_labels: " , ".to_string(),
            ..settings(false)
        })
        .unwrap();
        assert!(matches!(
            no_labels.classify(&mut model, &sentences(vec!["x"]), &mut NoProgress),
            Err(BertNodesError::Input(_))
        ));
        assert_eq!(model.calls, 0);
    }

    #[test]
    fn test_label_probabilities_shape() {
        let classifier = ZeroShotClassifier::new(settings(true)).unwrap();
        assert!(classifier.label_probabilities(&[vec![0.0, 1.0]]).is_err());
        assert!(
            classifier
                .label_probabilities(&[vec![1.0], vec![1.0]])
                .is_err()
        );
        let probs = classifier
            .label_probabilities(&[vec![0.0, 0.0], vec![0.0, 0.0]])
            .unwrap();
        assert_eq!(probs, vec![vec![0.5, 0.5]]);
    }

    #[test]
    fn test_multi_label_threshold_is_inclusive() {
        let classifier = ZeroShotClassifier::new(settings(true)).unwrap();
        let out = classifier
            .classify(
                &mut WordOverlap { calls: 0 },
                &sentences(vec!["weather"]),
                &mut NoProgress,
            )
            .unwrap();

        // No shared words: entailment probability is exactly 0.5.
        let p_sports = out.column(3).as_primitive::<Float64Type>().value(0);
        assert_eq!(p_sports, 0.5);
        assert_eq!(out.column(1).as_primitive::<Int32Type>().value(0), 1);
    }

    #[test]
    fn test_pair_building_progress() {
        let classifier = ZeroShotClassifier::new(ZeroShotSettings {
            batch_size: 100,
            ..settings(false)
        })
        .unwrap();
        let texts = vec!["sports"; 25];

        // 25 rows * 2 labels.
        let mut tracker = ProgressTracker::new(JobKind::Predict, 50, 100, RecordingSink::default());
        classifier
            .classify(&mut WordOverlap { calls: 0 }, &sentences(texts), &mut tracker)
            .unwrap();

        assert_eq!(tracker.sink().emitted(), &[4, 8, 10, 100]);
    }
}
