//! # Classifier Head

use serde::{Deserialize, Serialize};

use crate::{
    classes::MIN_CLASS_COUNT,
    errors::{BNResult, BertNodesError},
};

/// Dropout rate between pooling and the hidden layer.
pub const HEAD_DROPOUT: f32 = 0.2;

/// Units of the hidden dense layer.
pub const HEAD_HIDDEN_UNITS: usize = 128;

/// Sequence pooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Pooling {
    /// Mean over sequence positions.
    GlobalAverage,
}

/// Dense layer activations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Activation {
    /// `max(0, x)`.
    Relu,
    /// Normalized exponentials; one class per row.
    Softmax,
    /// Independent logistic per class.
    Sigmoid,
}

/// Training losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Loss {
    /// For softmax outputs.
    CategoricalCrossentropy,
    /// For sigmoid outputs.
    BinaryCrossentropy,
}

/// A fully connected layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Output units.
    pub units: usize,
    /// Activation.
    pub activation: Activation,
}

/// The classification head attached on top of the encoder's sequence output:
///
/// ```text
/// pooling -> dropout -> dense(128, relu) -> dense(classes, softmax|sigmoid)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierHead {
    /// Pooling over the sequence output.
    pub pooling: Pooling,
    /// Dropout rate after pooling.
    pub dropout: f32,
    /// The hidden layer.
    pub hidden: DenseLayer,
    /// The output layer.
    pub output: DenseLayer,
    /// The training loss.
    pub loss: Loss,
}

impl ClassifierHead {
    /// The head for `class_count` classes.
    ///
    /// Single-label heads end in softmax with categorical cross-entropy;
    /// multi-label heads end in sigmoid with binary cross-entropy.
    pub fn new(
        class_count: usize,
        multi_label: bool,
    ) -> BNResult<Self> {
        if class_count < MIN_CLASS_COUNT {
            return Err(BertNodesError::Config(format!(
                "at least {MIN_CLASS_COUNT} classes are required, found {class_count}"
            )));
        }
        let (activation, loss) = if multi_label {
            (Activation::Sigmoid, Loss::BinaryCrossentropy)
        } else {
            (Activation::Softmax, Loss::CategoricalCrossentropy)
        };
        Ok(Self {
            pooling: Pooling::GlobalAverage,
            dropout: HEAD_DROPOUT,
            hidden: DenseLayer {
                units: HEAD_HIDDEN_UNITS,
                activation: Activation::Relu,
            },
            output: DenseLayer {
                units: class_count,
                activation,
            },
            loss,
        })
    }

    /// Number of output classes.
    pub fn class_count(&self) -> usize {
        self.output.units
    }

    /// Whether classes are scored independently.
    pub fn is_multi_label(&self) -> bool {
        self.output.activation == Activation::Sigmoid
    }
}
