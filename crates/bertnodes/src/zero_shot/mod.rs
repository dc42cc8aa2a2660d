//! # Zero-shot Classification
//!
//! Each sentence is paired with one hypothesis per candidate label,
//! e.g. `("We won the match", "This example is sports")`; an
//! [`EntailmentModel`] scores the pairs, and entailment logits become
//! label probabilities.

mod classifier;
mod template;

#[doc(inline)]
pub use classifier::*;
#[doc(inline)]
pub use template::*;
