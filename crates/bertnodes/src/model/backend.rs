//! # Model Framework Seams
//!
//! The deep-learning framework (graph construction, autodiff, optimizers,
//! the forward pass) lives behind these traits.

use std::path::Path;

use crate::{
    errors::BNResult,
    model::{ClassifierHead, Optimizer},
    types::TokenId,
};

/// A batch of tokenized rows.
#[derive(Debug, Clone, Copy)]
pub struct ModelInputs<'a> {
    /// Vocabulary ids per row.
    pub ids: &'a [Vec<TokenId>],
    /// Masks per row.
    pub masks: &'a [Vec<u32>],
    /// Segments per row.
    pub segments: &'a [Vec<u32>],
}

impl ModelInputs<'_> {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Encoder outputs for a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncoderOutputs {
    /// One pooled vector per row.
    pub pooled: Vec<Vec<f32>>,

    /// Per row, one vector per sequence position; may be empty when not requested.
    pub sequence: Vec<Vec<Vec<f32>>>,
}

/// A pretrained encoder run for inference.
pub trait Encoder {
    /// Encode a batch.
    ///
    /// `with_sequence` requests per-position outputs in [`EncoderOutputs::sequence`].
    fn encode(
        &mut self,
        inputs: ModelInputs<'_>,
        with_sequence: bool,
    ) -> BNResult<EncoderOutputs>;
}

/// Loss and accuracy of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchMetrics {
    /// Mean loss over the batch.
    pub loss: f64,
    /// Mean accuracy over the batch.
    pub accuracy: f64,
}

/// How a head is attached and compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyOptions {
    /// Input sequence length.
    pub max_seq_length: usize,
    /// Train the encoder weights too.
    pub fine_tune_encoder: bool,
    /// The training optimizer.
    pub optimizer: Optimizer,
}

/// An assembled (encoder + head) classifier.
pub trait ClassifierModel {
    /// Run one optimization step.
    fn train_batch(
        &mut self,
        inputs: ModelInputs<'_>,
        targets: &[Vec<f32>],
    ) -> BNResult<BatchMetrics>;

    /// Score a batch without updating weights.
    fn evaluate_batch(
        &mut self,
        inputs: ModelInputs<'_>,
        targets: &[Vec<f32>],
    ) -> BNResult<BatchMetrics>;

    /// Class probabilities, one row per input row.
    fn predict_batch(
        &mut self,
        inputs: ModelInputs<'_>,
    ) -> BNResult<Vec<Vec<f32>>>;
}

/// Builds, saves and restores [`ClassifierModel`]s.
pub trait ClassifierFramework {
    /// The framework's loaded pretrained encoder.
    type Encoder;

    /// The framework's assembled model.
    type Model: ClassifierModel;

    /// Attach `head` to `encoder` and compile for training.
    fn assemble(
        &mut self,
        encoder: Self::Encoder,
        head: &ClassifierHead,
        options: &AssemblyOptions,
    ) -> BNResult<Self::Model>;

    /// Write the model weights into `dir`.
    fn save(
        &mut self,
        model: &Self::Model,
        dir: &Path,
    ) -> BNResult<()>;

    /// Load a model written by [`ClassifierFramework::save`].
    fn restore(
        &mut self,
        dir: &Path,
    ) -> BNResult<Self::Model>;
}
