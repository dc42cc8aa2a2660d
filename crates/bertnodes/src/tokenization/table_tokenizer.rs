//! # Table Tokenizer

use arrow::record_batch::RecordBatch;

use crate::{
    errors::BNResult,
    progress::ProgressListener,
    settings::InputSettings,
    table,
    tokenization::{TextTokenizer, TokenizedColumns},
};

/// Rows between progress events when tokenizing a whole table.
pub const TABLE_REPORT_INTERVAL: usize = 100;

/// Rows between progress events for the embedder and zero-shot jobs.
pub const BATCH_REPORT_INTERVAL: usize = 10;

/// Tokenizes the configured text column(s) of a table.
pub struct TableTokenizer<'a> {
    tokenizer: &'a dyn TextTokenizer,
    input: &'a InputSettings,
    report_interval: usize,
}

impl<'a> TableTokenizer<'a> {
    /// Create a table tokenizer, validating the input settings.
    pub fn new(
        tokenizer: &'a dyn TextTokenizer,
        input: &'a InputSettings,
    ) -> BNResult<Self> {
        input.validate()?;
        Ok(Self {
            tokenizer,
            input,
            report_interval: TABLE_REPORT_INTERVAL,
        })
    }

    /// Set the number of rows between progress events.
    pub fn with_report_interval(
        mut self,
        report_interval: usize,
    ) -> Self {
        self.report_interval = report_interval.max(1);
        self
    }

    /// The padded sequence length.
    pub fn max_seq_length(&self) -> usize {
        self.input.max_seq_length
    }

    /// Tokenize every row of `batch`.
    ///
    /// Calls `listener.on_tokenize_rows_end(n)` every `report_interval` rows
    /// and after the final row.
    ///
    /// ## Errors
    /// * a configured column is missing.
    /// * a first-column cell is null.
    /// * the tokenizer fails.
    pub fn tokenize(
        &self,
        batch: &RecordBatch,
        listener: &mut dyn ProgressListener,
    ) -> BNResult<TokenizedColumns> {
        let first_name = &self.input.sentence_column;
        let first = table::string_column(batch, first_name)?;
        let second = self
            .input
            .second_sentence_column
            .as_deref()
            .map(|name| table::string_column(batch, name))
            .transpose()?;

        let total = batch.num_rows();
        let max_seq_length = self.input.max_seq_length;
        let mut columns = TokenizedColumns::with_capacity(total);

        for row in 0..total {
            let text = table::required_str(&first, first_name, row)?;
            let pair = second
                .as_ref()
                .and_then(|second| table::optional_str(second, row));

            columns.push(
                self.tokenizer
                    .tokenize_record(text, pair, max_seq_length)?,
            );

            let done = row + 1;
            if done % self.report_interval == 0 || done == total {
                listener.on_tokenize_rows_end(done);
            }
        }

        log::debug!("tokenized {total} rows to length {max_seq_length}");
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, StringArray};
    use tempdir::TempDir;

    use super::*;
    use crate::{
        errors::BertNodesError,
        progress::NoProgress,
        tokenization::{VocabFileTokenizer, vocab_file::tests::write_test_vocab},
    };

    #[derive(Default)]
    struct RowEvents(Vec<usize>);

    impl ProgressListener for RowEvents {
        fn on_tokenize_rows_end(
            &mut self,
            rows: usize,
        ) {
            self.0.push(rows);
        }
    }

    fn text_batch(
        first: Vec<Option<&str>>,
        second: Vec<Option<&str>>,
    ) -> RecordBatch {
        table::batch_from_columns(vec![
            (
                "text".to_string(),
                Arc::new(StringArray::from(first)) as ArrayRef,
            ),
            (
                "pair".to_string(),
                Arc::new(StringArray::from(second)) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    fn input(second: Option<&str>) -> InputSettings {
        InputSettings {
            sentence_column: "text".to_string(),
            second_sentence_column: second.map(str::to_string),
            max_seq_length: 8,
        }
    }

    #[test]
    fn test_report_interval() {
        let tmp = TempDir::new("bertnodes-table").unwrap();
        let tokenizer = VocabFileTokenizer::from_file(write_test_vocab(tmp.path()), true).unwrap();
        let settings = input(None);
        let rows: Vec<Option<&str>> = vec![Some("good"); 25];
        let batch = text_batch(rows.clone(), rows);

        let mut events = RowEvents::default();
        let columns = TableTokenizer::new(&tokenizer, &settings)
            .unwrap()
            .with_report_interval(10)
            .tokenize(&batch, &mut events)
            .unwrap();

        assert_eq!(columns.len(), 25);
        assert_eq!(events.0, vec![10, 20, 25]);
    }

    #[test]
    fn test_null_second_is_absent() {
        let tmp = TempDir::new("bertnodes-table").unwrap();
        let tokenizer = VocabFileTokenizer::from_file(write_test_vocab(tmp.path()), true).unwrap();
        let settings = input(Some("pair"));
        let batch = text_batch(vec![Some("good"), Some("bad")], vec![Some("film"), None]);

        let columns = TableTokenizer::new(&tokenizer, &settings)
            .unwrap()
            .tokenize(&batch, &mut NoProgress)
            .unwrap();

        assert_eq!(columns.segments[0], vec![0, 0, 0, 1, 1, 0, 0, 0]);
        assert_eq!(columns.segments[1], vec![0; 8]);
        assert_eq!(columns.masks[1], vec![1, 1, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_null_first_is_error() {
        let tmp = TempDir::new("bertnodes-table").unwrap();
        let tokenizer = VocabFileTokenizer::from_file(write_test_vocab(tmp.path()), true).unwrap();
        let settings = input(None);
        let batch = text_batch(vec![Some("good"), None], vec![None, None]);

        let result = TableTokenizer::new(&tokenizer, &settings)
            .unwrap()
            .tokenize(&batch, &mut NoProgress);
        assert!(matches!(
            result,
            Err(BertNodesError::MissingValue { row: 1, .. })
        ));
    }

    #[test]
    fn test_missing_column() {
        let tmp = TempDir::new("bertnodes-table").unwrap();
        let tokenizer = VocabFileTokenizer::from_file(write_test_vocab(tmp.path()), true).unwrap();
        let settings = input(Some("other"));
        let batch = text_batch(vec![Some("good")], vec![None]);

        let result = TableTokenizer::new(&tokenizer, &settings)
            .unwrap()
            .tokenize(&batch, &mut NoProgress);
        assert!(matches!(result, Err(BertNodesError::MissingColumn(_))));
    }
}
