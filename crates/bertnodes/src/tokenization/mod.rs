//! # Tokenization
//!
//! Turns one or two text fields per row into fixed-length BERT inputs:
//!
//! ```text
//! [CLS] first[..L-2] [SEP] second[..budget] [SEP] 0 0 ...
//! ```
//!
//! * [`TextTokenizer`] is the subword tokenizer capability;
//!   [`VocabFileTokenizer`] and [`PretrainedTokenizer`] implement it.
//! * [`TableTokenizer`] runs a [`TextTokenizer`] over table columns.
//! * [`restore_tokenizer`] reloads whichever kind an artifact holds.

mod pretrained;
mod record;
mod table_tokenizer;
mod text_tokenizer;
pub(crate) mod vocab_file;

use std::path::Path;

#[doc(inline)]
pub use pretrained::*;
#[doc(inline)]
pub use record::*;
#[doc(inline)]
pub use table_tokenizer::*;
#[doc(inline)]
pub use text_tokenizer::*;
#[doc(inline)]
pub use vocab_file::{VOCAB_FILE_NAME, VocabFileTokenizer};

use crate::{
    artifact::{ArtifactAttributes, keys},
    errors::BNResult,
};

/// Restore the tokenizer persisted in an artifact directory.
///
/// Artifacts without a `tokenizer_kind` attribute hold a vocabulary file.
pub fn restore_tokenizer(
    dir: &Path,
    attributes: &ArtifactAttributes,
) -> BNResult<Box<dyn TextTokenizer>> {
    let kind = attributes.get_or(keys::TOKENIZER_KIND, TokenizerKind::VocabFile)?;
    log::debug!("restoring {kind} tokenizer from {}", dir.display());
    let tokenizer: Box<dyn TextTokenizer> = match kind {
        TokenizerKind::VocabFile => Box::new(VocabFileTokenizer::restore(dir, attributes)?),
        TokenizerKind::Pretrained => Box::new(PretrainedTokenizer::restore(dir, attributes)?),
    };
    Ok(tokenizer)
}
