//! # Progress Tracking
//!
//! Long-running jobs (tokenizing a table, predicting, training) report
//! their progress as a single integer percent in `0..=100`.
//!
//! * [`ProgressListener`] receives the fine-grained job events.
//! * [`ProgressTracker`] is a listener which folds those events into a percent,
//!   and forwards deduplicated, non-decreasing percents to a [`ProgressSink`].
//!
//! ## Example
//!
//! ```rust
//! use bertnodes::progress::{JobKind, ProgressListener, ProgressTracker, RecordingSink};
//!
//! let mut tracker = ProgressTracker::new(JobKind::Predict, 100, 20, RecordingSink::default());
//! tracker.on_tokenize_rows_end(100);
//! for batch in 0..5 {
//!     tracker.on_predict_batch_end(batch);
//! }
//! assert_eq!(tracker.sink().emitted().last(), Some(&100));
//! ```

mod listener;
mod sinks;
mod tracker;

#[doc(inline)]
pub use listener::*;
#[doc(inline)]
pub use sinks::*;
#[doc(inline)]
pub use tracker::*;
