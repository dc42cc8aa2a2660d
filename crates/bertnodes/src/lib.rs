//! # `bertnodes` BERT Text-Processing Nodes
//!
//! Glue between tabular text data and pretrained BERT models:
//! tokenization, embedding extraction, classifier training and prediction,
//! and zero-shot classification.
//!
//! See:
//! * [`tokenization`] to turn text columns into fixed-length id/mask/segment rows.
//! * [`model`] for the classifier head, the framework seams and the train/predict loops.
//! * [`prediction`] to map class probabilities back to labels.
//! * [`zero_shot`] to classify against free-form candidate labels.
//! * [`progress`] to turn job events into a single monotonic percentage.
//!
//! The deep-learning framework itself is not part of this crate; it plugs in
//! through [`model::ClassifierFramework`], [`model::Encoder`] and
//! [`zero_shot::EntailmentModel`].
//!
//! ```rust,ignore
//! use bertnodes::model::BertClassifierBuilder;
//! use bertnodes::progress::{JobKind, LogProgressSink, ProgressTracker};
//!
//! let mut classifier = BertClassifierBuilder::new(framework)
//!     .with_tokenizer(tokenizer)
//!     .with_encoder(encoder)
//!     .build()?;
//!
//! let mut tracker = ProgressTracker::new(
//!     JobKind::Train { epochs: settings.epochs },
//!     table.num_rows(),
//!     settings.batch_size,
//!     LogProgressSink::new("train"),
//! );
//! let history = classifier.train(&table, None, &settings, &mut tracker)?;
//! classifier.save("my-classifier")?;
//! ```
//!
//! ## Crate Features
#![doc = document_features::document_features!()]
#![warn(missing_docs, unused)]

#[cfg(feature = "download")]
pub mod pretrained;

#[cfg(feature = "download")]
#[doc(inline)]
pub use bertnodes_disk_cache as disk_cache;

pub mod artifact;
pub mod classes;
pub mod errors;
pub mod model;
pub mod prediction;
pub mod progress;
pub mod settings;
pub mod table;
pub mod tokenization;
pub mod types;
pub mod zero_shot;

#[doc(inline)]
pub use errors::{BNResult, BertNodesError};
