#![allow(missing_docs)]

use std::fs;

use bertnodes::{
    model::EpochLogs,
    progress::{JobKind, ProgressListener, ProgressTracker, RecordingSink},
    tokenization::{TextTokenizer, VOCAB_FILE_NAME, VocabFileTokenizer},
};
use proptest::prelude::*;
use tempdir::TempDir;

const WORDS: &[&str] = &["alpha", "beta", "gamma", "delta", "omega"];

fn tokenizer(tmp: &TempDir) -> VocabFileTokenizer {
    let mut vocab = vec!["[PAD]", "[UNK]", "[CLS]", "[SEP]"];
    vocab.extend(WORDS);
    let path = tmp.path().join(VOCAB_FILE_NAME);
    fs::write(&path, vocab.join("\n")).unwrap();
    VocabFileTokenizer::from_file(path, true).unwrap()
}

fn sentence() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..20).prop_map(|words| words.join(" "))
}

fn check_emissions(emitted: &[u8]) -> Result<(), TestCaseError> {
    prop_assert!(emitted.windows(2).all(|w| w[0] < w[1]), "{emitted:?}");
    prop_assert!(emitted.iter().all(|&p| p <= 100));
    prop_assert_eq!(emitted.last(), Some(&100));
    Ok(())
}

fn epoch_logs(epoch: usize) -> EpochLogs {
    EpochLogs {
        epoch,
        loss: 0.0,
        accuracy: 0.0,
        val_loss: None,
        val_accuracy: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn record_shape(
        first in sentence(),
        second in proptest::option::of(sentence()),
        max_seq_length in 3usize..24,
    ) {
        let tmp = TempDir::new("bertnodes-invariants").unwrap();
        let record = tokenizer(&tmp)
            .tokenize_record(&first, second.as_deref(), max_seq_length)
            .unwrap();

        prop_assert_eq!(record.ids.len(), max_seq_length);
        prop_assert_eq!(record.mask.len(), max_seq_length);
        prop_assert_eq!(record.segments.len(), max_seq_length);

        let real = record.mask.iter().filter(|&&m| m == 1).count();
        prop_assert!(record.mask[..real].iter().all(|&m| m == 1));
        prop_assert!(record.ids[real..].iter().all(|&id| id == 0));
        prop_assert_eq!(record.ids[0], 2);
        prop_assert_eq!(record.ids[real - 1], 3);

        // Segment 0 through the first [SEP], then 1; padding is 0.
        let first_sep = record.ids.iter().position(|&id| id == 3).unwrap();
        prop_assert!(record.segments[..=first_sep].iter().all(|&s| s == 0));
        prop_assert!(record.segments[first_sep + 1..real].iter().all(|&s| s == 1));
        prop_assert!(record.segments[real..].iter().all(|&s| s == 0));
    }

    #[test]
    fn predict_progress(
        total in 0usize..300,
        batch_size in 1usize..50,
    ) {
        let mut tracker = ProgressTracker::new(JobKind::Predict, total, batch_size, RecordingSink::default());
        for rows in (100..total).step_by(100).chain([total]) {
            tracker.on_tokenize_rows_end(rows);
        }
        for batch in 0..total.div_ceil(batch_size).max(1) {
            tracker.on_predict_batch_end(batch);
        }
        check_emissions(tracker.sink().emitted())?;
    }

    #[test]
    fn train_progress(
        total in 1usize..200,
        batch_size in 1usize..40,
        epochs in 1usize..5,
    ) {
        let mut tracker = ProgressTracker::new(
            JobKind::Train { epochs },
            total,
            batch_size,
            RecordingSink::default(),
        );
        tracker.on_tokenize_rows_end(total);
        for epoch in 0..epochs {
            for batch in 0..total.div_ceil(batch_size) {
                tracker.on_train_batch_end(batch);
            }
            tracker.on_epoch_end(epoch, &epoch_logs(epoch));
        }
        check_emissions(tracker.sink().emitted())?;
        prop_assert_eq!(tracker.history().len(), epochs);
    }
}
