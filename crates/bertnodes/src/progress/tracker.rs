//! # Progress Tracker

use crate::{
    errors::{BNResult, BertNodesError},
    model::{EpochLogs, TrainingHistory},
    progress::{ProgressListener, ProgressSink},
};

/// The kind of job being tracked; selects the [`ProgressWeights`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Tokenizing a table; no processing stage.
    Tokenize,

    /// Tokenizing, then running prediction batches.
    Predict,

    /// Tokenizing, then training for `epochs` epochs.
    Train {
        /// Number of training epochs.
        epochs: usize,
    },
}

/// Split of the 100 percent between the tokenization and processing stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressWeights {
    tokenization: u8,
}

impl ProgressWeights {
    /// Weights for a tokenize-only job.
    pub const TOKENIZE: Self = Self { tokenization: 100 };

    /// Weights for a prediction job.
    pub const PREDICT: Self = Self { tokenization: 10 };

    /// Weights for a training job.
    pub const TRAIN: Self = Self { tokenization: 5 };

    /// Build weights from the tokenization share; processing gets the rest.
    pub fn new(tokenization: u8) -> BNResult<Self> {
        if tokenization > 100 {
            return Err(BertNodesError::Config(format!(
                "tokenization weight must be in 0..=100, got {tokenization}"
            )));
        }
        Ok(Self { tokenization })
    }

    /// The default weights for a job kind.
    pub fn for_job(kind: JobKind) -> Self {
        match kind {
            JobKind::Tokenize => Self::TOKENIZE,
            JobKind::Predict => Self::PREDICT,
            JobKind::Train { .. } => Self::TRAIN,
        }
    }

    /// The tokenization share, in percent.
    pub fn tokenization(&self) -> u8 {
        self.tokenization
    }

    /// The processing share, in percent.
    pub fn processing(&self) -> u8 {
        100 - self.tokenization
    }
}

/// Where a tracked job currently is, derived from the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    /// Nothing has happened yet.
    Idle,

    /// Rows are being tokenized.
    Tokenizing,

    /// Batches or epochs are being processed.
    Processing,

    /// The last reported value was 100.
    Done,
}

/// Counters for one tracked job.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    /// Number of units (rows) the job processes.
    pub total: usize,

    /// Rows per processing batch.
    pub batch_size: usize,

    /// Number of epochs; 1 for non-training jobs.
    pub epochs: usize,

    /// Stage weights.
    pub weights: ProgressWeights,

    /// Rows tokenized so far.
    pub tokenized: usize,

    /// Batches processed in the current epoch.
    pub processed_batches: usize,

    /// Epochs completed.
    pub processed_epochs: usize,

    /// The last emitted percent.
    pub last_reported: Option<u8>,
}

impl ProgressState {
    /// Fresh counters for a job.
    pub fn new(
        kind: JobKind,
        total: usize,
        batch_size: usize,
    ) -> Self {
        let epochs = match kind {
            JobKind::Train { epochs } => epochs.max(1),
            _ => 1,
        };
        Self {
            total,
            batch_size: batch_size.max(1),
            epochs,
            weights: ProgressWeights::for_job(kind),
            tokenized: 0,
            processed_batches: 0,
            processed_epochs: 0,
            last_reported: None,
        }
    }

    /// The stage implied by the counters.
    pub fn stage(&self) -> ProgressStage {
        if self.last_reported == Some(100) {
            ProgressStage::Done
        } else if self.processed_batches > 0 || self.processed_epochs > 0 {
            ProgressStage::Processing
        } else if self.tokenized > 0 {
            ProgressStage::Tokenizing
        } else {
            ProgressStage::Idle
        }
    }

    fn fraction(
        &self,
        units: usize,
    ) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (units as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    /// Completed fraction of the tokenization stage.
    pub fn tokenization_fraction(&self) -> f64 {
        self.fraction(self.tokenized)
    }

    /// Completed fraction of the current batch pass.
    pub fn batch_fraction(&self) -> f64 {
        self.fraction(self.batch_size.saturating_mul(self.processed_batches))
    }

    /// Percent once tokenization is done and some processing happened.
    fn processing_percent(&self) -> f64 {
        let tok_w = self.weights.tokenization() as f64;
        let proc_w = self.weights.processing() as f64;
        let epochs = self.epochs as f64;
        let epoch_fraction =
            self.processed_epochs as f64 / epochs + self.batch_fraction() / epochs;
        tok_w + proc_w * epoch_fraction
    }

    fn tokenization_percent(&self) -> f64 {
        self.weights.tokenization() as f64 * self.tokenization_fraction()
    }
}

/// Folds [`ProgressListener`] events into percents for a [`ProgressSink`].
pub struct ProgressTracker<S: ProgressSink> {
    state: ProgressState,
    history: TrainingHistory,
    sink: S,
}

impl<S: ProgressSink> ProgressTracker<S> {
    /// Track a job of `total` rows processed in `batch_size` batches.
    pub fn new(
        kind: JobKind,
        total: usize,
        batch_size: usize,
        sink: S,
    ) -> Self {
        Self {
            state: ProgressState::new(kind, total, batch_size),
            history: TrainingHistory::default(),
            sink,
        }
    }

    /// Override the stage weights.
    pub fn with_weights(
        mut self,
        weights: ProgressWeights,
    ) -> Self {
        self.state.weights = weights;
        self
    }

    /// The current counters.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// The epoch logs seen so far.
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// The sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the tracker, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// The last emitted percent, if any.
    pub fn last_reported(&self) -> Option<u8> {
        self.state.last_reported
    }

    fn report(
        &mut self,
        value: f64,
    ) {
        let percent = value.floor().clamp(0.0, 100.0) as u8;
        if self.state.last_reported.is_none_or(|last| percent > last) {
            self.state.last_reported = Some(percent);
            self.sink.report(percent);
        }
    }
}

impl<S: ProgressSink> ProgressListener for ProgressTracker<S> {
    fn on_tokenize_rows_end(
        &mut self,
        rows: usize,
    ) {
        self.state.tokenized = rows;
        if self.state.processed_batches == 0 && self.state.processed_epochs == 0 {
            let value = self.state.tokenization_percent();
            self.report(value);
        }
    }

    fn on_predict_batch_end(
        &mut self,
        batch: usize,
    ) {
        self.state.processed_batches = batch + 1;
        let value = self.state.processing_percent();
        self.report(value);
    }

    fn on_train_batch_end(
        &mut self,
        batch: usize,
    ) {
        self.state.processed_batches = batch + 1;
        let value = self.state.processing_percent();
        self.report(value);
    }

    fn on_epoch_end(
        &mut self,
        epoch: usize,
        logs: &EpochLogs,
    ) {
        self.state.processed_epochs = epoch + 1;
        self.state.processed_batches = 0;
        self.history.push(logs.clone());
        let value = self.state.processing_percent();
        self.report(value);
    }
}
