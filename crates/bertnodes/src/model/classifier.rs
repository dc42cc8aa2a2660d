//! # BERT Classifier

use std::{
    fs,
    path::{Path, PathBuf},
};

use arrow::record_batch::RecordBatch;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    artifact::{ArtifactAttributes, keys},
    classes::{ClassDictionary, ClassExtractor, MIN_CLASS_COUNT},
    errors::{BNResult, BertNodesError},
    model::{
        AssemblyOptions,
        BatchMetrics,
        ClassifierFramework,
        ClassifierHead,
        ClassifierModel,
        EpochLogs,
        TrainingHistory,
    },
    prediction::PredictionTableBuilder,
    progress::{NoProgress, ProgressListener},
    settings::{
        ClassifierSettings,
        DEFAULT_CLASS_SEPARATOR,
        DEFAULT_SEQ_LENGTH,
        InputSettings,
        PredictorSettings,
    },
    tokenization::{TableTokenizer, TextTokenizer, TokenizedColumns, restore_tokenizer},
};

/// Builder for [`BertClassifier`].
///
/// Exactly one of [`with_encoder`](Self::with_encoder) or
/// [`with_restored`](Self::with_restored) must be given.
pub struct BertClassifierBuilder<F: ClassifierFramework> {
    framework: F,
    tokenizer: Option<Box<dyn TextTokenizer>>,
    encoder: Option<F::Encoder>,
    restore_dir: Option<PathBuf>,
}

impl<F: ClassifierFramework> BertClassifierBuilder<F> {
    /// Start a builder over `framework`.
    pub fn new(framework: F) -> Self {
        Self {
            framework,
            tokenizer: None,
            encoder: None,
            restore_dir: None,
        }
    }

    /// Set the tokenizer; restored classifiers default to the persisted one.
    pub fn with_tokenizer(
        mut self,
        tokenizer: Box<dyn TextTokenizer>,
    ) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Train a new head on top of `encoder`.
    pub fn with_encoder(
        mut self,
        encoder: F::Encoder,
    ) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Restore a classifier saved by [`BertClassifier::save`].
    pub fn with_restored<P: AsRef<Path>>(
        mut self,
        dir: P,
    ) -> Self {
        self.restore_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Build the classifier.
    ///
    /// ## Errors
    /// * neither or both of an encoder and a restored model were given.
    /// * a new classifier has no tokenizer.
    /// * the artifact can't be read.
    pub fn build(mut self) -> BNResult<BertClassifier<F>> {
        match (self.encoder.take(), self.restore_dir.take()) {
            (Some(_), Some(_)) => Err(BertNodesError::Config(
                "give either an encoder or a restored model, not both".to_string(),
            )),
            (None, None) => Err(BertNodesError::Config(
                "no encoder or restored model was given".to_string(),
            )),
            (Some(encoder), None) => {
                let tokenizer = self.tokenizer.ok_or_else(|| {
                    BertNodesError::Config("a new classifier needs a tokenizer".to_string())
                })?;
                Ok(BertClassifier {
                    framework: self.framework,
                    tokenizer,
                    encoder: Some(encoder),
                    trained: None,
                })
            }
            (None, Some(dir)) => {
                let attributes = ArtifactAttributes::load(&dir)?;
                let tokenizer = match self.tokenizer {
                    Some(tokenizer) => tokenizer,
                    None => restore_tokenizer(&dir, &attributes)?,
                };
                let trained = TrainedModel {
                    model: self.framework.restore(&dir)?,
                    classes: attributes.require(keys::CLASS_DICT)?,
                    multi_label: attributes.get_or(keys::MULTI_LABEL, false)?,
                    class_separator: attributes.get_or(
                        keys::CLASS_SEPARATOR,
                        DEFAULT_CLASS_SEPARATOR.to_string(),
                    )?,
                    max_seq_length: attributes.get_or(keys::MAX_SEQ_LENGTH, DEFAULT_SEQ_LENGTH)?,
                };
                log::info!(
                    "restored classifier with {} classes from {}",
                    trained.classes.len(),
                    dir.display()
                );
                Ok(BertClassifier {
                    framework: self.framework,
                    tokenizer,
                    encoder: None,
                    trained: Some(trained),
                })
            }
        }
    }
}

struct TrainedModel<M> {
    model: M,
    classes: ClassDictionary,
    multi_label: bool,
    class_separator: String,
    max_seq_length: usize,
}

/// A classification head on a pretrained BERT encoder.
///
/// A classifier is either untrained (it holds an encoder) or trained
/// (it holds an assembled model and its class dictionary).
pub struct BertClassifier<F: ClassifierFramework> {
    framework: F,
    tokenizer: Box<dyn TextTokenizer>,
    encoder: Option<F::Encoder>,
    trained: Option<TrainedModel<F::Model>>,
}

#[derive(Default)]
struct MetricTotals {
    loss: f64,
    accuracy: f64,
    rows: usize,
}

impl MetricTotals {
    fn add(
        &mut self,
        metrics: BatchMetrics,
        rows: usize,
    ) {
        self.loss += metrics.loss * rows as f64;
        self.accuracy += metrics.accuracy * rows as f64;
        self.rows += rows;
    }

    fn mean(&self) -> BatchMetrics {
        if self.rows == 0 {
            return BatchMetrics::default();
        }
        BatchMetrics {
            loss: self.loss / self.rows as f64,
            accuracy: self.accuracy / self.rows as f64,
        }
    }
}

fn evaluate<M: ClassifierModel>(
    model: &mut M,
    tokens: &TokenizedColumns,
    targets: &[Vec<f32>],
    batch_size: usize,
) -> BNResult<BatchMetrics> {
    let mut totals = MetricTotals::default();
    for start in (0..tokens.len()).step_by(batch_size) {
        let end = (start + batch_size).min(tokens.len());
        let metrics = model.evaluate_batch(tokens.inputs(start, end), &targets[start..end])?;
        totals.add(metrics, end - start);
    }
    Ok(totals.mean())
}

fn not_trained() -> BertNodesError {
    BertNodesError::Config("the classifier has not been trained".to_string())
}

impl<F: ClassifierFramework> BertClassifier<F> {
    /// The tokenizer.
    pub fn tokenizer(&self) -> &dyn TextTokenizer {
        self.tokenizer.as_ref()
    }

    /// Whether the classifier holds a trained model.
    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    /// The class dictionary of a trained classifier.
    pub fn classes(&self) -> Option<&ClassDictionary> {
        self.trained.as_ref().map(|t| &t.classes)
    }

    /// Whether a trained classifier is multi-label.
    pub fn is_multi_label(&self) -> Option<bool> {
        self.trained.as_ref().map(|t| t.multi_label)
    }

    /// Train a head on the encoder.
    ///
    /// Rows are shuffled every epoch (seeded by `settings.seed`);
    /// `listener` receives every batch and epoch.
    ///
    /// ## Arguments
    /// * `batch` - the training table.
    /// * `validation` - optional table scored after every epoch.
    /// * `settings` - training settings.
    /// * `listener` - progress events.
    ///
    /// ## Errors
    /// * the classifier has no untrained encoder.
    /// * the training table is empty or has fewer than 2 classes.
    /// * a label is missing, or a validation label is unseen in training.
    /// * the framework fails.
    pub fn train(
        &mut self,
        batch: &RecordBatch,
        validation: Option<&RecordBatch>,
        settings: &ClassifierSettings,
        listener: &mut dyn ProgressListener,
    ) -> BNResult<TrainingHistory> {
        settings.validate()?;
        if self.encoder.is_none() {
            return Err(BertNodesError::Config(
                "the classifier has no untrained encoder".to_string(),
            ));
        }
        if batch.num_rows() == 0 {
            return Err(BertNodesError::Input("the training table is empty".to_string()));
        }

        let extractor = ClassExtractor::from_settings(settings);
        let classes = match &settings.class_names {
            Some(names) => ClassDictionary::try_from(names.clone())?,
            None => extractor.extract(batch)?,
        };
        classes.require_min_classes(MIN_CLASS_COUNT)?;
        let targets = extractor.targets(&classes, batch)?;

        let tokenizer = TableTokenizer::new(self.tokenizer.as_ref(), &settings.input)?;
        let tokens = tokenizer.tokenize(batch, listener)?;

        let validation = match validation {
            Some(table) => {
                let targets = extractor.targets(&classes, table)?;
                let tokens = tokenizer.tokenize(table, &mut NoProgress)?;
                Some((tokens, targets))
            }
            None => None,
        };

        let head = ClassifierHead::new(classes.len(), settings.multi_label)?;
        let options = AssemblyOptions {
            max_seq_length: settings.input.max_seq_length,
            fine_tune_encoder: settings.fine_tune_encoder,
            optimizer: settings.optimizer.clone(),
        };
        let encoder = self.encoder.take().ok_or_else(not_trained)?;
        log::info!(
            "training {} classes on {} rows with {}",
            classes.len(),
            tokens.len(),
            settings.optimizer.framework_repr()
        );
        let mut model = self.framework.assemble(encoder, &head, &options)?;

        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut order: Vec<usize> = (0..tokens.len()).collect();
        let mut history = TrainingHistory::default();

        for epoch in 0..settings.epochs {
            order.shuffle(&mut rng);
            let mut totals = MetricTotals::default();

            for (idx, rows) in order.chunks(settings.batch_size).enumerate() {
                let batch_tokens = tokens.gather(rows);
                let batch_targets: Vec<Vec<f32>> =
                    rows.iter().map(|&row| targets[row].clone()).collect();
                let metrics = model.train_batch(batch_tokens.all_inputs(), &batch_targets)?;
                totals.add(metrics, rows.len());
                listener.on_train_batch_end(idx);
            }

            let (val_loss, val_accuracy) = match &validation {
                Some((tokens, targets)) => {
                    let metrics = evaluate(&mut model, tokens, targets, settings.batch_size)?;
                    (Some(metrics.loss), Some(metrics.accuracy))
                }
                None => (None, None),
            };

            let mean = totals.mean();
            let logs = EpochLogs {
                epoch,
                loss: mean.loss,
                accuracy: mean.accuracy,
                val_loss,
                val_accuracy,
            };
            log::info!(
                "epoch {}/{}: loss {:.4}, accuracy {:.4}",
                epoch + 1,
                settings.epochs,
                logs.loss,
                logs.accuracy
            );
            listener.on_epoch_end(epoch, &logs);
            history.push(logs);
        }

        self.trained = Some(TrainedModel {
            model,
            classes,
            multi_label: settings.multi_label,
            class_separator: settings.class_separator.clone(),
            max_seq_length: settings.input.max_seq_length,
        });
        Ok(history)
    }

    /// Write the model, tokenizer and attributes into `dir`.
    pub fn save<P: AsRef<Path>>(
        &mut self,
        dir: P,
    ) -> BNResult<()> {
        let dir = dir.as_ref();
        let trained = self.trained.as_ref().ok_or_else(not_trained)?;
        fs::create_dir_all(dir)?;

        self.framework.save(&trained.model, dir)?;

        let mut attributes = self.tokenizer.persist(dir)?;
        attributes.set(keys::CLASS_DICT, &trained.classes)?;
        attributes.set(keys::MULTI_LABEL, trained.multi_label)?;
        attributes.set(keys::CLASS_SEPARATOR, &trained.class_separator)?;
        attributes.set(keys::MAX_SEQ_LENGTH, trained.max_seq_length)?;
        attributes.save(dir)?;

        log::info!("saved classifier to {}", dir.display());
        Ok(())
    }

    /// Class probabilities for every row of `batch`.
    ///
    /// Rows are padded to the length the classifier was trained with,
    /// whatever `input.max_seq_length` says.
    ///
    /// ## Errors
    /// * the classifier is untrained.
    /// * the table is empty.
    /// * the framework fails or returns the wrong number of rows.
    pub fn predict_probabilities(
        &mut self,
        batch: &RecordBatch,
        input: &InputSettings,
        batch_size: usize,
        listener: &mut dyn ProgressListener,
    ) -> BNResult<Vec<Vec<f32>>> {
        let trained = self.trained.as_mut().ok_or_else(not_trained)?;
        if batch.num_rows() == 0 {
            return Err(BertNodesError::Input(format!(
                "sentence column {:?} is empty",
                input.sentence_column
            )));
        }
        if batch_size == 0 {
            return Err(BertNodesError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }

        let input = InputSettings {
            max_seq_length: trained.max_seq_length,
            ..input.clone()
        };
        let tokens = TableTokenizer::new(self.tokenizer.as_ref(), &input)?.tokenize(batch, listener)?;

        let mut probabilities = Vec::with_capacity(tokens.len());
        for (idx, start) in (0..tokens.len()).step_by(batch_size).enumerate() {
            let end = (start + batch_size).min(tokens.len());
            let rows = trained.model.predict_batch(tokens.inputs(start, end))?;
            if rows.len() != end - start {
                return Err(BertNodesError::External(format!(
                    "model returned {} rows for a batch of {}",
                    rows.len(),
                    end - start
                )));
            }
            probabilities.extend(rows);
            listener.on_predict_batch_end(idx);
        }
        log::debug!("predicted {} rows", probabilities.len());
        Ok(probabilities)
    }

    /// Predict `batch` and build the prediction table.
    pub fn predict(
        &mut self,
        batch: &RecordBatch,
        settings: &PredictorSettings,
        listener: &mut dyn ProgressListener,
    ) -> BNResult<RecordBatch> {
        settings.validate()?;
        let probabilities =
            self.predict_probabilities(batch, &settings.input, settings.batch_size, listener)?;

        let trained = self.trained.as_ref().ok_or_else(not_trained)?;
        PredictionTableBuilder::new(
            settings,
            &trained.classes,
            trained.multi_label,
            &trained.class_separator,
        )?
        .build(batch, &probabilities)
    }
}
