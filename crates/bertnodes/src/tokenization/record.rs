//! # Tokenized Records

use arrow::array::ArrayRef;

use crate::{model::ModelInputs, table, types::TokenId};

/// Padding id for ids, masks and segments.
pub const PAD_ID: TokenId = 0;

/// One row's model inputs, each exactly `max_seq_length` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedRecord {
    /// Vocabulary ids, zero-padded.
    pub ids: Vec<TokenId>,

    /// 1 for real tokens, 0 for padding.
    pub mask: Vec<u32>,

    /// 0 up to and including the first separator, 1 after; 0 for padding.
    pub segments: Vec<u32>,
}

impl TokenizedRecord {
    /// Build a record from framed tokens and their ids.
    ///
    /// ## Arguments
    /// * `tokens` - the framed token sequence, at most `max_seq_length` long.
    /// * `ids` - the vocabulary ids of `tokens`.
    /// * `max_seq_length` - the padded length.
    /// * `sep_token` - the separator token which ends segment 0.
    pub fn from_framed(
        tokens: &[String],
        mut ids: Vec<TokenId>,
        max_seq_length: usize,
        sep_token: &str,
    ) -> Self {
        ids.truncate(max_seq_length);
        let real = ids.len();

        let mut mask = vec![1; real];
        mask.resize(max_seq_length, 0);

        let mut segments = Vec::with_capacity(max_seq_length);
        let mut segment = 0;
        for token in tokens.iter().take(real) {
            segments.push(segment);
            if token == sep_token {
                segment = 1;
            }
        }
        segments.resize(max_seq_length, 0);

        ids.resize(max_seq_length, PAD_ID);

        Self {
            ids,
            mask,
            segments,
        }
    }

    /// The number of real (non-padding) positions.
    pub fn real_len(&self) -> usize {
        self.mask.iter().filter(|&&m| m == 1).count()
    }
}

/// Row-aligned tokenized inputs for a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedColumns {
    /// Vocabulary ids per row.
    pub ids: Vec<Vec<TokenId>>,

    /// Masks per row.
    pub masks: Vec<Vec<u32>>,

    /// Segments per row.
    pub segments: Vec<Vec<u32>>,
}

impl TokenizedColumns {
    /// Empty columns with room for `rows` records.
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            ids: Vec::with_capacity(rows),
            masks: Vec::with_capacity(rows),
            segments: Vec::with_capacity(rows),
        }
    }

    /// Append a record.
    pub fn push(
        &mut self,
        record: TokenizedRecord,
    ) {
        self.ids.push(record.ids);
        self.masks.push(record.mask);
        self.segments.push(record.segments);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Borrow rows `start..end` as model inputs.
    pub fn inputs(
        &self,
        start: usize,
        end: usize,
    ) -> ModelInputs<'_> {
        ModelInputs {
            ids: &self.ids[start..end],
            masks: &self.masks[start..end],
            segments: &self.segments[start..end],
        }
    }

    /// Borrow every row as model inputs.
    pub fn all_inputs(&self) -> ModelInputs<'_> {
        self.inputs(0, self.len())
    }

    /// Copy out the rows at `rows`, in that order.
    pub fn gather(
        &self,
        rows: &[usize],
    ) -> Self {
        Self {
            ids: rows.iter().map(|&r| self.ids[r].clone()).collect(),
            masks: rows.iter().map(|&r| self.masks[r].clone()).collect(),
            segments: rows.iter().map(|&r| self.segments[r].clone()).collect(),
        }
    }

    /// The `ids`, `masks` and `segments` columns as `List<Int32>` arrays.
    pub fn to_arrow_columns(&self) -> Vec<(String, ArrayRef)> {
        vec![
            ("ids".to_string(), table::int_list_column(&self.ids)),
            ("masks".to_string(), table::int_list_column(&self.masks)),
            ("segments".to_string(), table::int_list_column(&self.segments)),
        ]
    }
}
