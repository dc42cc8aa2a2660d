//! # Prediction Post-processing
//!
//! Maps probability vectors back to class labels and builds the output table:
//! the input columns, the prediction column, then optional `P (<label>)` columns.

mod output;
mod strategy;

#[doc(inline)]
pub use output::*;
#[doc(inline)]
pub use strategy::*;

/// The name of the probability column of `label`.
pub fn probability_column_name(
    label: &str,
    suffix: &str,
) -> String {
    format!("P ({label}){suffix}")
}
