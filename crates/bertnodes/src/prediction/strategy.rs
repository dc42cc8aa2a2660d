//! # Class Selection Strategies

use crate::{
    errors::BNResult,
    settings::{DEFAULT_THRESHOLD, PredictorSettings, check_threshold},
};

/// How predicted classes are picked from a probability vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionStrategy {
    /// The single most probable class.
    Argmax,

    /// Every class with probability strictly above the threshold.
    Threshold(f64),

    /// The `k` most probable classes.
    TopK(usize),
}

impl PredictionStrategy {
    /// Pick the strategy for a classifier.
    ///
    /// Single-label classifiers always use [`PredictionStrategy::Argmax`];
    /// multi-label classifiers use a fixed class count when configured,
    /// otherwise the (default 0.5) threshold.
    pub fn from_settings(
        settings: &PredictorSettings,
        multi_label: bool,
        class_count: usize,
    ) -> BNResult<Self> {
        if !multi_label {
            return Ok(Self::Argmax);
        }
        if let Some(k) = settings.number_of_classes {
            return Ok(Self::TopK(k.min(class_count)));
        }
        let threshold = settings.threshold.unwrap_or(DEFAULT_THRESHOLD);
        check_threshold(threshold)?;
        Ok(Self::Threshold(threshold))
    }

    /// The selected class indices, in index order for thresholds
    /// and in descending probability for argmax/top-k.
    pub fn select(
        &self,
        probabilities: &[f32],
    ) -> Vec<usize> {
        match *self {
            Self::Argmax => argmax(probabilities).into_iter().collect(),
            Self::Threshold(threshold) => probabilities
                .iter()
                .enumerate()
                .filter(|&(_, &p)| f64::from(p) > threshold)
                .map(|(idx, _)| idx)
                .collect(),
            Self::TopK(k) => {
                let mut order: Vec<usize> = (0..probabilities.len()).collect();
                // Stable: ties keep index order.
                order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
                order.truncate(k);
                order
            }
        }
    }
}

/// The index of the first maximal value.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, max)| value > max) {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
