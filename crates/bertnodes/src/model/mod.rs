//! # Model Assembly
//!
//! A [`ClassifierHead`] attached to a pretrained encoder through a
//! [`ClassifierFramework`]; the training, prediction and embedding loops
//! which own the progress events.

mod backend;
mod classifier;
mod embedder;
mod head;
mod history;
mod optimizer;

#[doc(inline)]
pub use backend::*;
#[doc(inline)]
pub use classifier::*;
#[doc(inline)]
pub use embedder::*;
#[doc(inline)]
pub use head::*;
#[doc(inline)]
pub use history::*;
#[doc(inline)]
pub use optimizer::*;
