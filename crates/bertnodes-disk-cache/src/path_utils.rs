//! # Path Utilities

use std::path::{Path, PathBuf};

use anyhow::Context;

/// `root/context.../file`; nothing is checked or created.
pub fn join_context<P, C>(
    root: P,
    context: &[C],
    file: &str,
) -> PathBuf
where
    P: AsRef<Path>,
    C: AsRef<Path>,
{
    let mut path = root.as_ref().to_path_buf();
    path.extend(context.iter().map(AsRef::as_ref));
    path.push(file);
    path
}

/// Split a hub model name into cache context dirs.
///
/// `"google/bert_uncased_L-2_H-128_A-2"` becomes `["google", "bert_uncased_L-2_H-128_A-2"]`.
/// Empty segments and `.`/`..` are dropped so a name can never escape the cache root.
pub fn model_name_context(name: &str) -> Vec<String> {
    name.split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(str::to_string)
        .collect()
}

/// The file name a URL downloads to: its last path segment.
///
/// ## Errors
/// * the URL path ends in `/`, `.` or `..`.
pub fn url_file_name(url: &str) -> anyhow::Result<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .with_context(|| format!("URL has no file name: {url}"))
}
