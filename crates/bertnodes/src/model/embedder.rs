//! # BERT Embedder

use arrow::{array::ArrayRef, record_batch::RecordBatch};

use crate::{
    errors::{BNResult, BertNodesError},
    model::Encoder,
    progress::ProgressListener,
    settings::EmbedderSettings,
    table,
    tokenization::{BATCH_REPORT_INTERVAL, TableTokenizer, TextTokenizer},
};

/// Name of the pooled embedding column.
pub const EMBEDDINGS_COLUMN: &str = "embeddings";

/// Name of the sequence embedding column for position `idx`.
pub fn sequence_embedding_column_name(idx: usize) -> String {
    format!("sequence_embeddings_{idx}")
}

/// Computes pooled (and optionally per-position) embeddings with a pretrained encoder.
pub struct BertEmbedder<E: Encoder> {
    encoder: E,
    tokenizer: Box<dyn TextTokenizer>,
}

impl<E: Encoder> BertEmbedder<E> {
    /// Create an embedder.
    pub fn new(
        encoder: E,
        tokenizer: Box<dyn TextTokenizer>,
    ) -> Self {
        Self { encoder, tokenizer }
    }

    /// Append embedding columns to `batch`.
    ///
    /// The `embeddings` column holds the pooled output of each row; with
    /// `include_sequence_embeddings`, column `sequence_embeddings_<i>` holds
    /// position `i` of the sequence output, for every `i < max_seq_length`.
    pub fn compute(
        &mut self,
        batch: &RecordBatch,
        settings: &EmbedderSettings,
        listener: &mut dyn ProgressListener,
    ) -> BNResult<RecordBatch> {
        settings.validate()?;
        let tokens = TableTokenizer::new(self.tokenizer.as_ref(), &settings.input)?
            .with_report_interval(BATCH_REPORT_INTERVAL)
            .tokenize(batch, listener)?;

        let with_sequence = settings.include_sequence_embeddings;
        let seq_len = settings.input.max_seq_length;
        let mut pooled = Vec::with_capacity(tokens.len());
        let mut sequence = Vec::new();

        for (idx, start) in (0..tokens.len()).step_by(settings.batch_size).enumerate() {
            let end = (start + settings.batch_size).min(tokens.len());
            let outputs = self
                .encoder
                .encode(tokens.inputs(start, end), with_sequence)?;

            if outputs.pooled.len() != end - start {
                return Err(BertNodesError::External(format!(
                    "encoder returned {} pooled rows for a batch of {}",
                    outputs.pooled.len(),
                    end - start
                )));
            }
            if with_sequence {
                if outputs.sequence.len() != end - start
                    || outputs.sequence.iter().any(|row| row.len() != seq_len)
                {
                    return Err(BertNodesError::External(format!(
                        "encoder sequence output doesn't match {} rows of length {seq_len}",
                        end - start
                    )));
                }
                sequence.extend(outputs.sequence);
            }
            pooled.extend(outputs.pooled);
            listener.on_predict_batch_end(idx);
        }

        let mut columns: Vec<(String, ArrayRef)> = vec![(
            EMBEDDINGS_COLUMN.to_string(),
            table::float_list_column(&pooled),
        )];
        if with_sequence {
            for position in 0..seq_len {
                let rows: Vec<Vec<f32>> = sequence.iter().map(|row| row[position].clone()).collect();
                columns.push((
                    sequence_embedding_column_name(position),
                    table::float_list_column(&rows),
                ));
            }
        }

        log::debug!("embedded {} rows", pooled.len());
        table::append_columns(batch, columns)
    }
}
