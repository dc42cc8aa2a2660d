//! # Text Tokenizer Trait

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    artifact::ArtifactAttributes,
    errors::BNResult,
    tokenization::TokenizedRecord,
    types::TokenId,
};

/// Default classification token.
pub const CLS_TOKEN: &str = "[CLS]";

/// Default separator token.
pub const SEP_TOKEN: &str = "[SEP]";

/// Default unknown-word token.
pub const UNK_TOKEN: &str = "[UNK]";

/// Which [`TextTokenizer`] implementation produced an artifact.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TokenizerKind {
    /// WordPiece over a `vocab.txt` file.
    VocabFile,

    /// A serialized `tokenizer.json` subword model.
    Pretrained,
}

/// The framing tokens wrapped around each sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    /// Leading classification token.
    pub cls: String,

    /// Separator closing each sequence.
    pub sep: String,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            cls: CLS_TOKEN.to_string(),
            sep: SEP_TOKEN.to_string(),
        }
    }
}

impl SpecialTokens {
    /// Wrap the first sequence: `[CLS] tokens[..max_seq_length - 2] [SEP]`.
    pub fn frame_first(
        &self,
        tokens: Vec<String>,
        max_seq_length: usize,
    ) -> Vec<String> {
        let mut framed = Vec::with_capacity(max_seq_length);
        framed.push(self.cls.clone());
        framed.extend(tokens.into_iter().take(max_seq_length.saturating_sub(2)));
        framed.push(self.sep.clone());
        framed
    }

    /// How many second-sequence tokens still fit after `framed_len` positions.
    ///
    /// One position is kept for the closing separator.
    pub fn second_budget(
        &self,
        framed_len: usize,
        max_seq_length: usize,
    ) -> usize {
        max_seq_length.saturating_sub(framed_len + 1)
    }

    /// Append `tokens[..budget] [SEP]`.
    pub fn append_second(
        &self,
        framed: &mut Vec<String>,
        tokens: Vec<String>,
        budget: usize,
    ) {
        framed.extend(tokens.into_iter().take(budget));
        framed.push(self.sep.clone());
    }
}

/// A subword tokenizer producing fixed-length BERT inputs.
pub trait TextTokenizer {
    /// The implementation kind, persisted with artifacts.
    fn kind(&self) -> TokenizerKind;

    /// The framing tokens.
    fn special_tokens(&self) -> &SpecialTokens;

    /// Split text into subword tokens, without framing tokens.
    fn subword_tokens(
        &self,
        text: &str,
    ) -> BNResult<Vec<String>>;

    /// Look up the vocabulary id of a token.
    fn token_id(
        &self,
        token: &str,
    ) -> BNResult<TokenId>;

    /// Write the tokenizer files into `dir`.
    ///
    /// Returns the attributes [`TextTokenizer::restore`] needs.
    fn persist(
        &self,
        dir: &Path,
    ) -> BNResult<ArtifactAttributes>;

    /// Load a tokenizer written by [`TextTokenizer::persist`].
    fn restore(
        dir: &Path,
        attributes: &ArtifactAttributes,
    ) -> BNResult<Self>
    where
        Self: Sized;

    /// Tokenize one row into ids, mask and segments of length `max_seq_length`.
    ///
    /// The second sequence is only tokenized when it still fits;
    /// a first sequence using the whole budget silently drops it.
    fn tokenize_record(
        &self,
        first: &str,
        second: Option<&str>,
        max_seq_length: usize,
    ) -> BNResult<TokenizedRecord> {
        let specials = self.special_tokens();
        let mut framed = specials.frame_first(self.subword_tokens(first)?, max_seq_length);

        if let Some(second) = second {
            let budget = specials.second_budget(framed.len(), max_seq_length);
            if budget > 0 {
                specials.append_second(&mut framed, self.subword_tokens(second)?, budget);
            }
        }

        let ids = framed
            .iter()
            .map(|token| self.token_id(token))
            .collect::<BNResult<Vec<_>>>()?;

        Ok(TokenizedRecord::from_framed(
            &framed,
            ids,
            max_seq_length,
            &specials.sep,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("w{i}")).collect()
    }

    #[test]
    fn test_frame_first_truncates() {
        let specials = SpecialTokens::default();
        let framed = specials.frame_first(words(10), 5);
        assert_eq!(framed, vec!["[CLS]", "w0", "w1", "w2", "[SEP]"]);
        assert_eq!(specials.second_budget(framed.len(), 5), 0);
    }

    #[test]
    fn test_second_budget() {
        let specials = SpecialTokens::default();
        let mut framed = specials.frame_first(words(2), 8);
        let budget = specials.second_budget(framed.len(), 8);
        assert_eq!(budget, 3);

        specials.append_second(&mut framed, words(5), budget);
        assert_eq!(framed.len(), 8);
        assert_eq!(framed.last().map(String::as_str), Some("[SEP]"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TokenizerKind::VocabFile.to_string(), "vocab_file");
        assert_eq!(
            TokenizerKind::from_str("pretrained").unwrap(),
            TokenizerKind::Pretrained
        );
        assert_eq!(
            serde_json::to_string(&TokenizerKind::VocabFile).unwrap(),
            "\"vocab_file\""
        );
    }
}
