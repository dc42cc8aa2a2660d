use std::path::PathBuf;

use bertnodes::{
    pretrained,
    settings::{ModelSelection, ModelSelectorSettings},
    tokenization::TextTokenizer,
};

use crate::disk_cache::DiskCacheArgs;

/// Model selector arg group.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ModelSelectorArgs {
    /// Hugging Face hub model name, e.g. `bert-base-uncased`.
    #[arg(long)]
    hf_model: Option<String>,

    /// Local TF Hub SavedModel folder.
    #[arg(long)]
    tf_hub: Option<String>,

    /// URL of a `tokenizer.json` or `vocab.txt` file.
    #[arg(long)]
    url: Option<String>,

    /// Local model folder, `tokenizer.json` or `vocab.txt` file.
    #[arg(long)]
    local: Option<PathBuf>,
}

impl ModelSelectorArgs {
    /// The selected model.
    pub fn selection(&self) -> Result<ModelSelection, Box<dyn std::error::Error>> {
        if let Some(name) = &self.hf_model {
            Ok(ModelSelection::HuggingFace { name: name.clone() })
        } else if let Some(handle) = &self.tf_hub {
            Ok(ModelSelection::TfHub {
                handle: handle.clone(),
            })
        } else if let Some(url) = &self.url {
            Ok(ModelSelection::RemoteUrl { url: url.clone() })
        } else if let Some(path) = &self.local {
            Ok(ModelSelection::LocalPath { path: path.clone() })
        } else {
            Err("no model selected".into())
        }
    }

    /// Load the tokenizer of the selected model.
    pub fn load_tokenizer(
        &self,
        disk_cache: &DiskCacheArgs,
        do_lower_case: bool,
    ) -> Result<Box<dyn TextTokenizer>, Box<dyn std::error::Error>> {
        let settings = ModelSelectorSettings {
            selection: self.selection()?,
            cache_dir: disk_cache.cache_dir(),
            do_lower_case,
            allow_download: disk_cache.allow_download(),
        };
        Ok(pretrained::load_tokenizer(&settings)?)
    }
}
