use std::path::PathBuf;

/// Disk cache argument group.
#[derive(clap::Args, Debug)]
pub struct DiskCacheArgs {
    /// Cache directory.
    #[arg(long, default_value = None)]
    cache_dir: Option<PathBuf>,

    /// Never download; only use cached files.
    #[arg(long)]
    offline: bool,
}

impl DiskCacheArgs {
    /// The explicit cache directory, if any.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.clone()
    }

    /// Whether downloads are allowed.
    pub fn allow_download(&self) -> bool {
        !self.offline
    }
}
