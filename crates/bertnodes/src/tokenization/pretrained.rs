//! # Serialized `tokenizer.json` Tokenizer

use std::path::Path;

use tokenizers::Tokenizer;

use crate::{
    artifact::{ArtifactAttributes, keys},
    errors::{BNResult, BertNodesError},
    tokenization::{SpecialTokens, TextTokenizer, TokenizerKind},
    types::TokenId,
};

/// Default file name of the serialized tokenizer inside an artifact.
pub const TOKENIZER_FILE_NAME: &str = "tokenizer.json";

/// Wraps a serialized subword model in the Hugging Face `tokenizer.json` format.
///
/// Truncation and padding configured in the file are disabled;
/// framing and padding are applied by [`TextTokenizer::tokenize_record`].
pub struct PretrainedTokenizer {
    specials: SpecialTokens,
    inner: Tokenizer,
}

impl PretrainedTokenizer {
    /// Load a `tokenizer.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BNResult<Self> {
        let path = path.as_ref();
        let inner = Tokenizer::from_file(path).map_err(BertNodesError::tokenizer)?;
        log::debug!("loaded tokenizer {}", path.display());
        Self::from_tokenizer(inner)
    }

    /// Wrap an in-memory tokenizer.
    pub fn from_tokenizer(mut inner: Tokenizer) -> BNResult<Self> {
        inner
            .with_truncation(None)
            .map_err(BertNodesError::tokenizer)?;
        inner.with_padding(None);

        Self {
            specials: SpecialTokens::default(),
            inner,
        }
        .checked()
    }

    /// Use other framing tokens, e.g. `<s>`/`</s>`.
    pub fn with_special_tokens(
        mut self,
        specials: SpecialTokens,
    ) -> BNResult<Self> {
        self.specials = specials;
        self.checked()
    }

    fn checked(self) -> BNResult<Self> {
        for token in [&self.specials.cls, &self.specials.sep] {
            if self.inner.token_to_id(token).is_none() {
                return Err(BertNodesError::Config(format!(
                    "special token {token:?} is not in the tokenizer vocabulary"
                )));
            }
        }
        Ok(self)
    }
}

impl TextTokenizer for PretrainedTokenizer {
    fn kind(&self) -> TokenizerKind {
        TokenizerKind::Pretrained
    }

    fn special_tokens(&self) -> &SpecialTokens {
        &self.specials
    }

    fn subword_tokens(
        &self,
        text: &str,
    ) -> BNResult<Vec<String>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(BertNodesError::tokenizer)?;
        Ok(encoding.get_tokens().to_vec())
    }

    fn token_id(
        &self,
        token: &str,
    ) -> BNResult<TokenId> {
        self.inner.token_to_id(token).ok_or_else(|| {
            BertNodesError::Tokenizer(format!("token {token:?} is not in the vocabulary"))
        })
    }

    fn persist(
        &self,
        dir: &Path,
    ) -> BNResult<ArtifactAttributes> {
        self.inner
            .save(dir.join(TOKENIZER_FILE_NAME), false)
            .map_err(BertNodesError::tokenizer)?;

        let mut attributes = ArtifactAttributes::default();
        attributes.set(keys::TOKENIZER_KIND, TokenizerKind::Pretrained)?;
        attributes.set(keys::TOKENIZER_FILE, TOKENIZER_FILE_NAME)?;
        attributes.set(keys::CLS_TOKEN, &self.specials.cls)?;
        attributes.set(keys::SEP_TOKEN, &self.specials.sep)?;
        Ok(attributes)
    }

    fn restore(
        dir: &Path,
        attributes: &ArtifactAttributes,
    ) -> BNResult<Self> {
        let file: String = attributes.get_or(keys::TOKENIZER_FILE, TOKENIZER_FILE_NAME.to_string())?;
        let defaults = SpecialTokens::default();
        let specials = SpecialTokens {
            cls: attributes.get_or(keys::CLS_TOKEN, defaults.cls)?,
            sep: attributes.get_or(keys::SEP_TOKEN, defaults.sep)?,
        };
        Self::from_file(dir.join(file))?.with_special_tokens(specials)
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;
    use tokenizers::{
        models::wordpiece::WordPiece,
        normalizers::bert::BertNormalizer,
        pre_tokenizers::bert::BertPreTokenizer,
    };

    use super::*;
    use crate::tokenization::vocab_file::tests::write_test_vocab;

    fn test_tokenizer(dir: &Path) -> Tokenizer {
        let vocab = write_test_vocab(dir);
        let wordpiece = WordPiece::from_file(vocab.to_str().unwrap())
            .unk_token("[UNK]".to_string())
            .build()
            .unwrap();
        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::new(true, true, None, true)));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
        tokenizer
    }

    #[test]
    fn test_tokenize_record() {
        let tmp = TempDir::new("bertnodes-pretrained").unwrap();
        let tokenizer = PretrainedTokenizer::from_tokenizer(test_tokenizer(tmp.path())).unwrap();

        let record = tokenizer.tokenize_record("Great product", None, 8).unwrap();
        assert_eq!(record.ids, vec![2, 5, 6, 3, 0, 0, 0, 0]);
        assert_eq!(record.real_len(), 4);
    }

    #[test]
    fn test_rejects_unknown_special_tokens() {
        let tmp = TempDir::new("bertnodes-pretrained").unwrap();
        let tokenizer = PretrainedTokenizer::from_tokenizer(test_tokenizer(tmp.path())).unwrap();
        let result = tokenizer.with_special_tokens(SpecialTokens {
            cls: "<s>".to_string(),
            sep: "</s>".to_string(),
        });
        assert!(matches!(result, Err(BertNodesError::Config(_))));
    }

    #[test]
    fn test_persist_restore() {
        let src = TempDir::new("bertnodes-pretrained").unwrap();
        let artifact = TempDir::new("bertnodes-artifact").unwrap();
        let tokenizer = PretrainedTokenizer::from_tokenizer(test_tokenizer(src.path())).unwrap();

        let attributes = tokenizer.persist(artifact.path()).unwrap();
        assert!(artifact.path().join(TOKENIZER_FILE_NAME).exists());

        let restored = PretrainedTokenizer::restore(artifact.path(), &attributes).unwrap();
        assert_eq!(restored.kind(), TokenizerKind::Pretrained);
        assert_eq!(
            restored.subword_tokens("the film").unwrap(),
            vec!["the", "film"]
        );
    }
}
