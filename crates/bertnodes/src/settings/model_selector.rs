//! # Model Selection Settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{BNResult, BertNodesError};

/// The ways a pretrained model can be selected.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ModelSelectionMode {
    /// A TF Hub model handle.
    TfHub,

    /// A Hugging Face hub model name.
    HuggingFace,

    /// A direct download URL.
    RemoteUrl,

    /// A local file or folder.
    LocalPath,
}

impl ModelSelectionMode {
    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::TfHub => "TF Hub model handle; resolved from a local SavedModel folder's assets/vocab.txt",
            Self::HuggingFace => "Hugging Face hub model name, e.g. bert-base-uncased",
            Self::RemoteUrl => "URL of a tokenizer.json or vocab.txt file",
            Self::LocalPath => "local model folder, tokenizer.json or vocab.txt file",
        }
    }
}

/// A selected pretrained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModelSelection {
    /// A TF Hub model handle.
    TfHub {
        /// The handle.
        handle: String,
    },

    /// A Hugging Face hub model name.
    HuggingFace {
        /// The model name, e.g. `bert-base-uncased`.
        name: String,
    },

    /// A direct download URL.
    RemoteUrl {
        /// The URL.
        url: String,
    },

    /// A local file or folder.
    LocalPath {
        /// The path.
        path: PathBuf,
    },
}

impl ModelSelection {
    /// The selection mode.
    pub fn mode(&self) -> ModelSelectionMode {
        match self {
            Self::TfHub { .. } => ModelSelectionMode::TfHub,
            Self::HuggingFace { .. } => ModelSelectionMode::HuggingFace,
            Self::RemoteUrl { .. } => ModelSelectionMode::RemoteUrl,
            Self::LocalPath { .. } => ModelSelectionMode::LocalPath,
        }
    }

    /// Check the selection is filled in.
    pub fn validate(&self) -> BNResult<()> {
        let empty = match self {
            Self::TfHub { handle } => handle.is_empty(),
            Self::HuggingFace { name } => name.is_empty(),
            Self::RemoteUrl { url } => {
                if !url.is_empty() && !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(BertNodesError::Config(format!(
                        "remote model URL must be http(s): {url:?}"
                    )));
                }
                url.is_empty()
            }
            Self::LocalPath { path } => path.as_os_str().is_empty(),
        };
        if empty {
            return Err(BertNodesError::Config(format!(
                "no model selected for mode {}",
                self.mode()
            )));
        }
        Ok(())
    }
}

/// Model selection plus how to resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSelectorSettings {
    /// The selected model.
    pub selection: ModelSelection,

    /// Explicit cache directory; the platform cache dir when absent.
    pub cache_dir: Option<PathBuf>,

    /// Lowercase input for `vocab.txt` tokenizers.
    pub do_lower_case: bool,

    /// Allow downloading files missing from the cache.
    pub allow_download: bool,
}

impl Default for ModelSelectorSettings {
    fn default() -> Self {
        Self {
            selection: ModelSelection::HuggingFace {
                name: "bert-base-uncased".to_string(),
            },
            cache_dir: None,
            do_lower_case: true,
            allow_download: true,
        }
    }
}

impl ModelSelectorSettings {
    /// Select a model with default resolution options.
    pub fn new(selection: ModelSelection) -> Self {
        Self {
            selection,
            ..Default::default()
        }
    }

    /// Check internal consistency.
    pub fn validate(&self) -> BNResult<()> {
        self.selection.validate()
    }
}
