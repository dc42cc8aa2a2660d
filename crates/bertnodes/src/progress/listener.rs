//! # Progress Listener

use crate::model::EpochLogs;

/// Receives fine-grained job events.
///
/// All methods default to no-ops; implementors override what they care about.
pub trait ProgressListener {
    /// `rows` input rows have been tokenized so far.
    fn on_tokenize_rows_end(
        &mut self,
        rows: usize,
    ) {
        let _ = rows;
    }

    /// Prediction batch `batch` (0-based) finished.
    fn on_predict_batch_end(
        &mut self,
        batch: usize,
    ) {
        let _ = batch;
    }

    /// Training batch `batch` (0-based, within the current epoch) finished.
    fn on_train_batch_end(
        &mut self,
        batch: usize,
    ) {
        let _ = batch;
    }

    /// Training epoch `epoch` (0-based) finished.
    fn on_epoch_end(
        &mut self,
        epoch: usize,
        logs: &EpochLogs,
    ) {
        let _ = (epoch, logs);
    }
}

/// A listener which ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressListener for NoProgress {}

impl<L: ProgressListener + ?Sized> ProgressListener for &mut L {
    fn on_tokenize_rows_end(
        &mut self,
        rows: usize,
    ) {
        (**self).on_tokenize_rows_end(rows)
    }

    fn on_predict_batch_end(
        &mut self,
        batch: usize,
    ) {
        (**self).on_predict_batch_end(batch)
    }

    fn on_train_batch_end(
        &mut self,
        batch: usize,
    ) {
        (**self).on_train_batch_end(batch)
    }

    fn on_epoch_end(
        &mut self,
        epoch: usize,
        logs: &EpochLogs,
    ) {
        (**self).on_epoch_end(epoch, logs)
    }
}
