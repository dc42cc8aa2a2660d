//! # Model Artifact Attributes
//!
//! A persisted model is a directory holding:
//! * `attributes.json` - the [`ArtifactAttributes`];
//! * the tokenizer files;
//! * whatever the model framework writes.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::errors::{BNResult, BertNodesError};

/// File name of the attributes inside an artifact directory.
pub const ATTRIBUTES_FILE: &str = "attributes.json";

/// Well-known attribute keys.
pub mod keys {
    /// Which tokenizer implementation was persisted.
    pub const TOKENIZER_KIND: &str = "tokenizer_kind";
    /// The vocabulary file name.
    pub const VOCAB_FILE: &str = "vocab_file";
    /// Whether the vocabulary tokenizer lowercases.
    pub const DO_LOWER_CASE: &str = "do_lower_case";
    /// The serialized tokenizer file name.
    pub const TOKENIZER_FILE: &str = "tokenizer_file";
    /// The classification token.
    pub const CLS_TOKEN: &str = "cls_token";
    /// The separator token.
    pub const SEP_TOKEN: &str = "sep_token";
    /// The ordered class labels.
    pub const CLASS_DICT: &str = "class_dict";
    /// Whether the classifier is multi-label.
    pub const MULTI_LABEL: &str = "multi_label";
    /// The sequence length the model was trained with.
    pub const MAX_SEQ_LENGTH: &str = "max_seq_length";
    /// The separator used to split multi-label training cells.
    pub const CLASS_SEPARATOR: &str = "class_separator";
}

/// Named metadata stored next to a persisted model.
///
/// Reading is lenient about absence and strict about shape:
/// a missing attribute yields the caller's default,
/// a present attribute of the wrong type is an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactAttributes {
    values: Map<String, Value>,
}

impl ArtifactAttributes {
    /// Load `attributes.json` from an artifact directory.
    ///
    /// A directory without the file has no attributes.
    pub fn load(dir: &Path) -> BNResult<Self> {
        let path = dir.join(ATTRIBUTES_FILE);
        if !path.exists() {
            log::debug!("no {ATTRIBUTES_FILE} in {}", dir.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write `attributes.json` into an artifact directory.
    pub fn save(
        &self,
        dir: &Path,
    ) -> BNResult<()> {
        fs::create_dir_all(dir)?;
        let text = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(ATTRIBUTES_FILE), text)?;
        Ok(())
    }

    /// Whether `key` is present.
    pub fn contains(
        &self,
        key: &str,
    ) -> bool {
        self.values.contains_key(key)
    }

    /// Read an attribute, if present.
    pub fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> BNResult<Option<T>> {
        self.values
            .get(key)
            .map(|value| {
                T::deserialize(value).map_err(|err| BertNodesError::Attribute {
                    name: key.to_string(),
                    message: err.to_string(),
                })
            })
            .transpose()
    }

    /// Read an attribute, falling back to `default` when absent.
    pub fn get_or<T: DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> BNResult<T> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Read an attribute which must be present.
    pub fn require<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> BNResult<T> {
        self.get(key)?.ok_or_else(|| BertNodesError::Attribute {
            name: key.to_string(),
            message: "missing from the model artifact".to_string(),
        })
    }

    /// Set an attribute.
    pub fn set<T: Serialize>(
        &mut self,
        key: &str,
        value: T,
    ) -> BNResult<()> {
        self.values
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Copy every attribute of `other` into `self`, overwriting.
    pub fn merge(
        &mut self,
        other: ArtifactAttributes,
    ) {
        self.values.extend(other.values);
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_defaults_and_types() {
        let mut attributes = ArtifactAttributes::default();
        attributes.set(keys::MULTI_LABEL, true).unwrap();
        attributes.set(keys::MAX_SEQ_LENGTH, "long").unwrap();

        assert!(attributes.get_or(keys::MULTI_LABEL, false).unwrap());
        assert!(attributes.get_or(keys::DO_LOWER_CASE, true).unwrap());
        assert!(matches!(
            attributes.get_or::<usize>(keys::MAX_SEQ_LENGTH, 128),
            Err(BertNodesError::Attribute { .. })
        ));
        assert!(attributes.require::<Vec<String>>(keys::CLASS_DICT).is_err());
    }

    #[test]
    fn test_save_load() {
        let tmp = TempDir::new("bertnodes-artifact").unwrap();
        assert_eq!(
            ArtifactAttributes::load(tmp.path()).unwrap(),
            ArtifactAttributes::default()
        );

        let mut attributes = ArtifactAttributes::default();
        attributes
            .set(keys::CLASS_DICT, vec!["neg", "pos"])
            .unwrap();
        attributes.save(tmp.path()).unwrap();

        let loaded = ArtifactAttributes::load(tmp.path()).unwrap();
        assert_eq!(loaded, attributes);
        assert_eq!(
            loaded.require::<Vec<String>>(keys::CLASS_DICT).unwrap(),
            vec!["neg", "pos"]
        );
    }

    #[test]
    fn test_merge_overwrites() {
        let mut a = ArtifactAttributes::default();
        a.set(keys::MULTI_LABEL, false).unwrap();
        let mut b = ArtifactAttributes::default();
        b.set(keys::MULTI_LABEL, true).unwrap();
        b.set(keys::MAX_SEQ_LENGTH, 64).unwrap();

        a.merge(b);
        assert!(a.require::<bool>(keys::MULTI_LABEL).unwrap());
        assert!(a.contains(keys::MAX_SEQ_LENGTH));
    }
}
