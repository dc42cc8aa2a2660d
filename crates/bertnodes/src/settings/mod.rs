//! # Job Settings
//!
//! Every job is configured by a `serde` struct with defaults,
//! loadable from JSON via [`load_json`], and checked by its `validate()`.

mod classifier;
mod embedder;
mod input;
mod model_selector;
mod predictor;
mod zero_shot;

use std::{fs, path::Path};

use serde::de::DeserializeOwned;

#[doc(inline)]
pub use classifier::*;
#[doc(inline)]
pub use embedder::*;
#[doc(inline)]
pub use input::*;
#[doc(inline)]
pub use model_selector::*;
#[doc(inline)]
pub use predictor::*;
#[doc(inline)]
pub use zero_shot::*;

use crate::errors::{BNResult, BertNodesError};

/// Default rows per batch.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Default separator between labels of a multi-label cell.
pub const DEFAULT_CLASS_SEPARATOR: &str = ",";

/// Default name of the predicted-label column.
pub const DEFAULT_PREDICTION_COLUMN: &str = "Prediction";

/// Default multi-label decision threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Check `0 < threshold < 1`.
pub fn check_threshold(threshold: f64) -> BNResult<()> {
    if threshold > 0.0 && threshold < 1.0 {
        Ok(())
    } else {
        Err(BertNodesError::Config(format!(
            "threshold must be strictly between 0 and 1, got {threshold}"
        )))
    }
}

/// Load settings from a JSON file; absent fields take their defaults.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> BNResult<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
