//! # Bertnodes Disk Cache

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use downloader::{Download, Downloader};

use crate::{HUGGING_FACE_HUB_URL, path_utils, platform_dirs};

/// Cache context dir for hub model files.
const HUB_CONTEXT: &str = "hub";

/// Options for [`BertDiskCache`].
#[derive(Clone, Default, Debug)]
pub struct BertDiskCacheOptions {
    /// Cache directory; the platform cache dir when absent.
    pub cache_dir: Option<PathBuf>,

    /// Model hub base URL; [`HUGGING_FACE_HUB_URL`] when absent.
    pub hub_url: Option<String>,
}

impl BertDiskCacheOptions {
    /// Set the cache directory.
    pub fn with_cache_dir<P: AsRef<Path>>(
        mut self,
        cache_dir: Option<P>,
    ) -> Self {
        self.cache_dir = cache_dir.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Set the hub base URL.
    pub fn with_hub_url<S: Into<String>>(
        mut self,
        hub_url: Option<S>,
    ) -> Self {
        self.hub_url = hub_url.map(Into::into);
        self
    }
}

/// Download-once storage for pretrained model files.
pub struct BertDiskCache {
    root: PathBuf,
    hub_url: String,
    downloader: Downloader,
}

impl BertDiskCache {
    /// Open a cache; directories are created lazily on first download.
    ///
    /// ## Errors
    /// * no cache dir was given and the platform has none.
    /// * the HTTP client can't be built.
    pub fn new(options: BertDiskCacheOptions) -> anyhow::Result<Self> {
        let root = platform_dirs::resolve_cache_dir(options.cache_dir)
            .context("no cache directory was given and the platform has none")?;

        let mut hub_url = options
            .hub_url
            .unwrap_or_else(|| HUGGING_FACE_HUB_URL.to_string());
        hub_url.truncate(hub_url.trim_end_matches('/').len());

        let downloader = Downloader::builder()
            .build()
            .context("failed to build downloader")?;

        log::debug!("disk cache at {}", root.display());
        Ok(Self {
            root,
            hub_url,
            downloader,
        })
    }

    /// The cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The hub base URL, without a trailing `/`.
    pub fn hub_url(&self) -> &str {
        &self.hub_url
    }

    /// Where `file` under `context` is cached.
    pub fn cache_path<C: AsRef<Path>>(
        &self,
        context: &[C],
        file: &str,
    ) -> PathBuf {
        path_utils::join_context(&self.root, context, file)
    }

    /// The hub URL of a file in a model repository.
    pub fn hub_file_url(
        &self,
        model: &str,
        file: &str,
    ) -> String {
        format!(
            "{}/{}/resolve/main/{file}",
            self.hub_url,
            model.trim_matches('/')
        )
    }

    /// Return the cached copy of a file, downloading it first if needed.
    ///
    /// The file name is the last path segment of the first URL.
    ///
    /// ## Arguments
    /// * `context` - dirs between the cache root and the file.
    /// * `urls` - mirrors of the same file.
    /// * `download` - whether a missing file may be downloaded.
    ///
    /// ## Errors
    /// * no URL was given, or it has no file name.
    /// * the file is missing and `download` is false.
    /// * the download fails.
    pub fn load_cached_path<C, S>(
        &mut self,
        context: &[C],
        urls: &[S],
        download: bool,
    ) -> anyhow::Result<PathBuf>
    where
        C: AsRef<Path>,
        S: AsRef<str>,
    {
        let mirrors: Vec<&str> = urls.iter().map(AsRef::as_ref).collect();
        let first = mirrors.first().context("no download URL was given")?;
        let path = self.cache_path(context, &path_utils::url_file_name(first)?);

        if path.is_file() {
            log::debug!("cache hit: {}", path.display());
            return Ok(path);
        }
        if !download {
            anyhow::bail!("{} is not cached and downloads are off", path.display());
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let mut request = Download::new_mirrored(&mirrors);
        request.file_name = path.clone();

        log::info!("downloading {first} to {}", path.display());
        for summary in self.downloader.download(&[request])? {
            summary.map_err(|err| anyhow::anyhow!("download of {first} failed: {err}"))?;
        }
        Ok(path)
    }

    /// Load a file from a hub model repository, downloading it if needed.
    ///
    /// Files are cached under `hub/<model name segments>/<file>`.
    pub fn load_hub_file(
        &mut self,
        model: &str,
        file: &str,
        download: bool,
    ) -> anyhow::Result<PathBuf> {
        let name = path_utils::model_name_context(model);
        if name.is_empty() {
            anyhow::bail!("invalid hub model name: {model:?}");
        }
        let context: Vec<&str> = std::iter::once(HUB_CONTEXT)
            .chain(name.iter().map(String::as_str))
            .collect();

        let url = self.hub_file_url(model, file);
        self.load_cached_path(&context, &[url], download)
            .with_context(|| format!("failed to load {file} for hub model {model}"))
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempdir::TempDir;

    use super::*;

    fn temp_cache(tmp: &TempDir) -> BertDiskCache {
        BertDiskCache::new(BertDiskCacheOptions::default().with_cache_dir(Some(tmp.path()))).unwrap()
    }

    #[test]
    fn test_explicit_root() {
        let tmp = TempDir::new("bertnodes-cache").unwrap();
        let cache = temp_cache(&tmp);
        assert_eq!(cache.root(), tmp.path());
        assert_eq!(cache.hub_url(), HUGGING_FACE_HUB_URL);
        assert_eq!(
            cache.cache_path(&["remote"], "vocab.txt"),
            tmp.path().join("remote").join("vocab.txt")
        );
    }

    #[test]
    fn test_hub_file_url() {
        let tmp = TempDir::new("bertnodes-cache").unwrap();
        let cache = BertDiskCache::new(
            BertDiskCacheOptions::default()
                .with_cache_dir(Some(tmp.path()))
                .with_hub_url(Some("https://mirror.example/")),
        )
        .unwrap();
        assert_eq!(
            cache.hub_file_url("google/electra-small", "tokenizer.json"),
            "https://mirror.example/google/electra-small/resolve/main/tokenizer.json"
        );
    }

    #[test]
    fn test_load_hub_file_offline() {
        let tmp = TempDir::new("bertnodes-cache").unwrap();
        let mut cache = temp_cache(&tmp);

        assert!(cache.load_hub_file("bert-base-uncased", "vocab.txt", false).is_err());

        let expected = tmp.path().join("hub").join("bert-base-uncased").join("vocab.txt");
        fs::create_dir_all(expected.parent().unwrap()).unwrap();
        File::create(&expected).unwrap();

        let path = cache
            .load_hub_file("bert-base-uncased", "vocab.txt", false)
            .unwrap();
        assert_eq!(path, expected);
    }

    #[test]
    fn test_bad_requests() {
        let tmp = TempDir::new("bertnodes-cache").unwrap();
        let mut cache = temp_cache(&tmp);
        assert!(cache.load_hub_file("../", "vocab.txt", false).is_err());

        let no_urls: [&str; 0] = [];
        assert!(cache.load_cached_path(&["remote"], &no_urls, true).is_err());
    }
}
