//! # bertnodes-disk-cache
//!
//! Local storage for downloaded pretrained model files.
//!
//! Files live at `<cache dir>/<context dirs...>/<file name>`. The cache dir is
//! given explicitly, or falls back to the platform's per-user cache dir.
#![warn(missing_docs)]

pub mod disk_cache;
pub mod path_utils;
pub mod platform_dirs;

pub use disk_cache::{BertDiskCache, BertDiskCacheOptions};

/// Default base URL for hub model repositories.
pub const HUGGING_FACE_HUB_URL: &str = "https://huggingface.co";
