//! # Training History

use arrow::{
    array::{ArrayRef, Float64Array, Int32Array},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::{errors::BNResult, table};

/// Metrics for one completed epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochLogs {
    /// 0-based epoch index.
    pub epoch: usize,

    /// Mean training loss.
    pub loss: f64,

    /// Mean training accuracy.
    pub accuracy: f64,

    /// Validation loss, when a validation table was given.
    pub val_loss: Option<f64>,

    /// Validation accuracy, when a validation table was given.
    pub val_accuracy: Option<f64>,
}

/// Per-epoch logs of a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    epochs: Vec<EpochLogs>,
}

impl TrainingHistory {
    /// Record an epoch.
    pub fn push(
        &mut self,
        logs: EpochLogs,
    ) {
        self.epochs.push(logs);
    }

    /// Number of recorded epochs.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// Whether no epoch was recorded.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// The recorded epochs.
    pub fn epochs(&self) -> &[EpochLogs] {
        &self.epochs
    }

    /// Render as a table with 1-based `epoch` numbers.
    ///
    /// Validation columns are only present when validation ran.
    pub fn to_record_batch(&self) -> BNResult<RecordBatch> {
        let epoch: ArrayRef = Arc::new(Int32Array::from_iter_values(
            self.epochs.iter().map(|e| e.epoch as i32 + 1),
        ));
        let loss: ArrayRef = Arc::new(Float64Array::from_iter_values(
            self.epochs.iter().map(|e| e.loss),
        ));
        let accuracy: ArrayRef = Arc::new(Float64Array::from_iter_values(
            self.epochs.iter().map(|e| e.accuracy),
        ));

        let mut columns = vec![
            ("epoch".to_string(), epoch),
            ("loss".to_string(), loss),
            ("accuracy".to_string(), accuracy),
        ];

        if self.epochs.iter().any(|e| e.val_loss.is_some()) {
            let val_loss: ArrayRef = Arc::new(Float64Array::from_iter(
                self.epochs.iter().map(|e| e.val_loss),
            ));
            let val_accuracy: ArrayRef = Arc::new(Float64Array::from_iter(
                self.epochs.iter().map(|e| e.val_accuracy),
            ));
            columns.push(("val_loss".to_string(), val_loss));
            columns.push(("val_accuracy".to_string(), val_accuracy));
        }

        table::batch_from_columns(columns)
    }
}
