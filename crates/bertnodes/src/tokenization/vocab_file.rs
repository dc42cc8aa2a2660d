//! # `vocab.txt` WordPiece Tokenizer

use std::{
    fs,
    path::{Path, PathBuf},
};

use tokenizers::{
    Tokenizer,
    models::wordpiece::WordPiece,
    normalizers::bert::BertNormalizer,
    pre_tokenizers::bert::BertPreTokenizer,
};

use crate::{
    artifact::{ArtifactAttributes, keys},
    errors::{BNResult, BertNodesError},
    tokenization::{SpecialTokens, TextTokenizer, TokenizerKind, UNK_TOKEN},
    types::TokenId,
};

/// Default file name of the vocabulary inside an artifact.
pub const VOCAB_FILE_NAME: &str = "vocab.txt";

/// BERT basic tokenization followed by WordPiece over a `vocab.txt` file.
pub struct VocabFileTokenizer {
    vocab_file: PathBuf,
    do_lower_case: bool,
    specials: SpecialTokens,
    inner: Tokenizer,
}

impl VocabFileTokenizer {
    /// Load a `vocab.txt` file (one token per line, line number is the id).
    ///
    /// ## Arguments
    /// * `vocab_file` - path to the vocabulary.
    /// * `do_lower_case` - lowercase and strip accents before splitting.
    pub fn from_file<P: AsRef<Path>>(
        vocab_file: P,
        do_lower_case: bool,
    ) -> BNResult<Self> {
        let vocab_file = vocab_file.as_ref().to_path_buf();
        let path = vocab_file.to_str().ok_or_else(|| {
            BertNodesError::Config(format!(
                "vocabulary path is not valid UTF-8: {}",
                vocab_file.display()
            ))
        })?;

        let wordpiece = WordPiece::from_file(path)
            .unk_token(UNK_TOKEN.to_string())
            .build()
            .map_err(BertNodesError::tokenizer)?;

        let mut inner = Tokenizer::new(wordpiece);
        inner.with_normalizer(Some(BertNormalizer::new(
            true,
            true,
            None,
            do_lower_case,
        )));
        inner.with_pre_tokenizer(Some(BertPreTokenizer));

        log::debug!(
            "loaded vocabulary {} (lowercase: {do_lower_case})",
            vocab_file.display()
        );

        Ok(Self {
            vocab_file,
            do_lower_case,
            specials: SpecialTokens::default(),
            inner,
        })
    }

    /// The vocabulary path this tokenizer was loaded from.
    pub fn vocab_file(&self) -> &Path {
        &self.vocab_file
    }

    /// Whether text is lowercased before splitting.
    pub fn do_lower_case(&self) -> bool {
        self.do_lower_case
    }
}

impl TextTokenizer for VocabFileTokenizer {
    fn kind(&self) -> TokenizerKind {
        TokenizerKind::VocabFile
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
        let target = dir.join(VOCAB_FILE_NAME);
        // Copying a file onto itself truncates it.
        if !is_same_file(&self.vocab_file, &target) {
            fs::copy(&self.vocab_file, &target)?;
        }

        let mut attributes = ArtifactAttributes::default();
        attributes.set(keys::TOKENIZER_KIND, TokenizerKind::VocabFile)?;
        attributes.set(keys::VOCAB_FILE, VOCAB_FILE_NAME)?;
        attributes.set(keys::DO_LOWER_CASE, self.do_lower_case)?;
        Ok(attributes)
    }

    fn restore(
        dir: &Path,
        attributes: &ArtifactAttributes,
    ) -> BNResult<Self> {
        let vocab_file: String = attributes.get_or(keys::VOCAB_FILE, VOCAB_FILE_NAME.to_string())?;
        let do_lower_case = attributes.get_or(keys::DO_LOWER_CASE, true)?;
        Self::from_file(dir.join(vocab_file), do_lower_case)
    }
}

/// Whether both paths resolve to one existing file.
fn is_same_file(
    a: &Path,
    b: &Path,
) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tempdir::TempDir;

    use super::*;

    /// Tokens of the small test vocabulary, in id order.
    pub(crate) const TEST_VOCAB: &[&str] = &[
        "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "great", "product", "bad", "the", "film",
        "was", "un", "##believ", "##able", "!", ",", "good",
    ];

    pub(crate) fn write_test_vocab(dir: &Path) -> PathBuf {
        let path = dir.join(VOCAB_FILE_NAME);
        fs::write(&path, TEST_VOCAB.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_subword_tokens() {
        let tmp = TempDir::new("bertnodes-vocab").unwrap();
        let tokenizer = VocabFileTokenizer::from_file(write_test_vocab(tmp.path()), true).unwrap();

        assert_eq!(
            tokenizer.subword_tokens("Great product!").unwrap(),
            vec!["great", "product", "!"]
        );
        assert_eq!(
            tokenizer.subword_tokens("unbelievable zzz").unwrap(),
            vec!["un", "##believ", "##able", "[UNK]"]
        );
        assert_eq!(tokenizer.token_id("[CLS]").unwrap(), 2);
        assert!(tokenizer.token_id("missing").is_err());
    }

    #[test]
    fn test_cased() {
        let tmp = TempDir::new("bertnodes-vocab").unwrap();
        let tokenizer =
            VocabFileTokenizer::from_file(write_test_vocab(tmp.path()), false).unwrap();
        assert_eq!(tokenizer.subword_tokens("Great").unwrap(), vec!["[UNK]"]);
    }

    #[test]
    fn test_tokenize_record() {
        let tmp = TempDir::new("bertnodes-vocab").unwrap();
        let tokenizer = VocabFileTokenizer::from_file(write_test_vocab(tmp.path()), true).unwrap();

        let record = tokenizer.tokenize_record("great product", None, 8).unwrap();
        assert_eq!(record.ids, vec![2, 5, 6, 3, 0, 0, 0, 0]);
        assert_eq!(record.mask, vec![1, 1, 1, 1, 0, 0, 0, 0]);
        assert_eq!(record.segments, vec![0; 8]);

        let pair = tokenizer
            .tokenize_record("great product", Some("the film"), 8)
            .unwrap();
        assert_eq!(pair.ids, vec![2, 5, 6, 3, 8, 9, 3, 0]);
        assert_eq!(pair.segments, vec![0, 0, 0, 0, 1, 1, 1, 0]);

        // The first sequence fills the budget; the second is dropped.
        let full = tokenizer
            .tokenize_record("the film was great", Some("bad"), 5)
            .unwrap();
        assert_eq!(full.ids, vec![2, 8, 9, 10, 3]);
        assert_eq!(full.segments, vec![0; 5]);
    }

    #[test]
    fn test_persist_restore() {
        let src = TempDir::new("bertnodes-vocab").unwrap();
        let artifact = TempDir::new("bertnodes-artifact").unwrap();
        let tokenizer = VocabFileTokenizer::from_file(write_test_vocab(src.path()), false).unwrap();

        let attributes = tokenizer.persist(artifact.path()).unwrap();
        assert!(artifact.path().join(VOCAB_FILE_NAME).exists());

        let restored = VocabFileTokenizer::restore(artifact.path(), &attributes).unwrap();
        assert!(!restored.do_lower_case());
        assert_eq!(restored.kind(), TokenizerKind::VocabFile);
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_into_source_dir_through_symlink() {
        let tmp = TempDir::new("bertnodes-vocab").unwrap();
        let vocab = write_test_vocab(tmp.path());
        let size = fs::metadata(&vocab).unwrap().len();
        let tokenizer = VocabFileTokenizer::from_file(&vocab, true).unwrap();

        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(tmp.path(), &link).unwrap();
        tokenizer.persist(&link).unwrap();

        assert_eq!(fs::metadata(&vocab).unwrap().len(), size);
        let restored = VocabFileTokenizer::restore(&link, &ArtifactAttributes::default()).unwrap();
        assert_eq!(restored.token_id("good").unwrap(), 16);
    }

    #[test]
    fn test_persist_into_source_dir() {
        let tmp = TempDir::new("bertnodes-vocab").unwrap();
        let vocab = write_test_vocab(tmp.path());
        let tokenizer = VocabFileTokenizer::from_file(&vocab, true).unwrap();

        // Same file, spelled with a `.` segment.
        tokenizer.persist(&tmp.path().join(".")).unwrap();
        assert_eq!(
            fs::read_to_string(&vocab).unwrap(),
            TEST_VOCAB.join("\n")
        );
    }

    #[test]
    fn test_restore_legacy_defaults() {
        let tmp = TempDir::new("bertnodes-vocab").unwrap();
        write_test_vocab(tmp.path());
        let restored =
            VocabFileTokenizer::restore(tmp.path(), &ArtifactAttributes::default()).unwrap();
        assert!(restored.do_lower_case());
    }
}
