//! # Pretrained Tokenizer Loading
//!
//! Resolves a [`ModelSelection`] to a [`TextTokenizer`], going through the
//! [`BertDiskCache`] for hub and remote models.

use std::path::{Path, PathBuf};

use bertnodes_disk_cache::{BertDiskCache, BertDiskCacheOptions, path_utils};

use crate::{
    errors::{BNResult, BertNodesError},
    settings::{ModelSelection, ModelSelectorSettings},
    tokenization::{
        PretrainedTokenizer,
        TOKENIZER_FILE_NAME,
        TextTokenizer,
        VOCAB_FILE_NAME,
        VocabFileTokenizer,
    },
};

/// Cache context dir for remote URL downloads.
const REMOTE_CONTEXT: &str = "remote";

fn cache_error<E: std::fmt::Display>(err: E) -> BertNodesError {
    BertNodesError::External(format!("{err:#}"))
}

/// Open the disk cache configured by `settings`.
pub fn open_disk_cache(settings: &ModelSelectorSettings) -> BNResult<BertDiskCache> {
    BertDiskCache::new(BertDiskCacheOptions::default().with_cache_dir(settings.cache_dir.as_ref()))
        .map_err(cache_error)
}

/// Load the tokenizer of the selected model.
///
/// * `LocalPath`: a `tokenizer.json` or `vocab.txt` file, or a folder holding one.
/// * `TfHub`: a local SavedModel folder; its `assets/vocab.txt` is used.
/// * `HuggingFace`: the hub's `tokenizer.json`, falling back to `vocab.txt`.
/// * `RemoteUrl`: a `tokenizer.json` or `vocab.txt` URL.
///
/// ## Errors
/// * the selection is empty or malformed.
/// * no tokenizer file could be found or downloaded.
pub fn load_tokenizer(settings: &ModelSelectorSettings) -> BNResult<Box<dyn TextTokenizer>> {
    settings.validate()?;
    let lower = settings.do_lower_case;
    log::info!("loading tokenizer for {} model", settings.selection.mode());

    match &settings.selection {
        ModelSelection::LocalPath { path } => load_local(path, lower),
        ModelSelection::TfHub { handle } => {
            let vocab = Path::new(handle).join("assets").join(VOCAB_FILE_NAME);
            if !vocab.is_file() {
                return Err(BertNodesError::Config(format!(
                    "TF Hub handle {handle:?} is not a local SavedModel folder with assets/{VOCAB_FILE_NAME}"
                )));
            }
            load_file(&vocab, lower)
        }
        ModelSelection::HuggingFace { name } => {
            let mut cache = open_disk_cache(settings)?;
            load_hub(&mut cache, name, lower, settings.allow_download)
        }
        ModelSelection::RemoteUrl { url } => {
            let mut cache = open_disk_cache(settings)?;
            let path = cache
                .load_cached_path(&remote_context(url), &[url], settings.allow_download)
                .map_err(cache_error)?;
            load_file(&path, lower)
        }
    }
}

/// Load a hub model's tokenizer through `cache`.
pub fn load_hub(
    cache: &mut BertDiskCache,
    name: &str,
    do_lower_case: bool,
    download: bool,
) -> BNResult<Box<dyn TextTokenizer>> {
    match cache.load_hub_file(name, TOKENIZER_FILE_NAME, download) {
        Ok(path) => load_file(&path, do_lower_case),
        Err(err) => {
            log::debug!("no {TOKENIZER_FILE_NAME} for {name}: {err:#}");
            let path = cache
                .load_hub_file(name, VOCAB_FILE_NAME, download)
                .map_err(cache_error)?;
            load_file(&path, do_lower_case)
        }
    }
}

fn remote_context(url: &str) -> Vec<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let dir = rest.rsplit_once('/').map_or("", |(dir, _)| dir);
    let mut context = vec![REMOTE_CONTEXT.to_string()];
    context.extend(path_utils::model_name_context(dir));
    context
}

fn load_file(
    path: &Path,
    do_lower_case: bool,
) -> BNResult<Box<dyn TextTokenizer>> {
    let tokenizer: Box<dyn TextTokenizer> =
        if path.extension().is_some_and(|ext| ext == "json") {
            Box::new(PretrainedTokenizer::from_file(path)?)
        } else {
            Box::new(VocabFileTokenizer::from_file(path, do_lower_case)?)
        };
    Ok(tokenizer)
}

fn load_local(
    path: &Path,
    do_lower_case: bool,
) -> BNResult<Box<dyn TextTokenizer>> {
    if path.is_file() {
        return load_file(path, do_lower_case);
    }
    let candidates: [PathBuf; 3] = [
        path.join(TOKENIZER_FILE_NAME),
        path.join(VOCAB_FILE_NAME),
        path.join("assets").join(VOCAB_FILE_NAME),
    ];
    match candidates.iter().find(|p| p.is_file()) {
        Some(file) => load_file(file, do_lower_case),
        None => Err(BertNodesError::Config(format!(
            "no {TOKENIZER_FILE_NAME} or {VOCAB_FILE_NAME} found in {}",
            path.display()
        ))),
    }
}
