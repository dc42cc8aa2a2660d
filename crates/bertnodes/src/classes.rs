//! # Class Dictionaries
//!
//! A [`ClassDictionary`] maps labels to output indices in first-seen order;
//! a [`ClassExtractor`] reads labels out of a training table.

use arrow::{datatypes::DataType, record_batch::RecordBatch};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{BNResult, BertNodesError},
    settings::ClassifierSettings,
    table,
    types::{BNHashMap, hash_map_with_capacity},
};

/// Minimum number of classes a classifier can be trained on.
pub const MIN_CLASS_COUNT: usize = 2;

/// A bijective `label <-> index` mapping.
///
/// Serializes as the ordered label list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassDictionary {
    labels: Vec<String>,
    index: BNHashMap<String, usize>,
}

impl PartialEq for ClassDictionary {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.labels == other.labels
    }
}

impl Eq for ClassDictionary {}

impl TryFrom<Vec<String>> for ClassDictionary {
    type Error = BertNodesError;

    fn try_from(labels: Vec<String>) -> BNResult<Self> {
        let mut index = hash_map_with_capacity(labels.len());
        for (idx, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), idx).is_some() {
                return Err(BertNodesError::Input(format!(
                    "duplicate class label {label:?}"
                )));
            }
        }
        Ok(Self { labels, index })
    }
}

impl From<ClassDictionary> for Vec<String> {
    fn from(dict: ClassDictionary) -> Self {
        dict.labels
    }
}

impl ClassDictionary {
    /// Build from labels in first-seen order, skipping repeats.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self {
            labels: Vec::new(),
            index: hash_map_with_capacity(0),
        };
        for label in labels {
            let label = label.as_ref();
            if !dict.index.contains_key(label) {
                dict.index.insert(label.to_string(), dict.labels.len());
                dict.labels.push(label.to_string());
            }
        }
        dict
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no classes.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The index of `label`.
    pub fn index_of(
        &self,
        label: &str,
    ) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// The label at `index`.
    pub fn label_of(
        &self,
        index: usize,
    ) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Fail unless there are at least `min` classes.
    pub fn require_min_classes(
        &self,
        min: usize,
    ) -> BNResult<()> {
        if self.len() < min {
            return Err(BertNodesError::Config(format!(
                "at least {min} classes are required, found {}",
                self.len()
            )));
        }
        Ok(())
    }

    /// Encode labels as a multi-hot vector.
    pub fn encode<S: AsRef<str>>(
        &self,
        labels: &[S],
    ) -> BNResult<Vec<f32>> {
        let mut target = vec![0.0; self.len()];
        for label in labels {
            let label = label.as_ref();
            let idx = self
                .index_of(label)
                .ok_or_else(|| BertNodesError::UnknownClass(label.to_string()))?;
            target[idx] = 1.0;
        }
        Ok(target)
    }
}

/// Reads class labels from a training table.
#[derive(Debug, Clone, Copy)]
pub struct ClassExtractor<'a> {
    column: &'a str,
    multi_label: bool,
    separator: &'a str,
}

impl<'a> ClassExtractor<'a> {
    /// Create an extractor.
    ///
    /// ## Arguments
    /// * `column` - the label column.
    /// * `multi_label` - split cells on `separator`.
    /// * `separator` - the multi-label separator.
    pub fn new(
        column: &'a str,
        multi_label: bool,
        separator: &'a str,
    ) -> Self {
        Self {
            column,
            multi_label,
            separator,
        }
    }

    /// Create an extractor from classifier settings.
    pub fn from_settings(settings: &'a ClassifierSettings) -> Self {
        Self::new(
            &settings.class_column,
            settings.multi_label,
            &settings.class_separator,
        )
    }

    /// Split a label cell.
    ///
    /// Multi-label cells are split on the separator, trimmed, and empty parts dropped.
    pub fn split_cell<'s>(
        &self,
        cell: &'s str,
    ) -> Vec<&'s str> {
        if self.multi_label {
            cell.split(self.separator)
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .collect()
        } else {
            vec![cell]
        }
    }

    fn is_encoded(
        &self,
        batch: &RecordBatch,
    ) -> BNResult<bool> {
        Ok(matches!(
            table::column(batch, self.column)?.data_type(),
            DataType::List(_) | DataType::LargeList(_) | DataType::FixedSizeList(_, _)
        ))
    }

    /// The labels of every row.
    pub fn row_labels(
        &self,
        batch: &RecordBatch,
    ) -> BNResult<Vec<Vec<String>>> {
        let cells = table::string_column(batch, self.column)?;
        (0..batch.num_rows())
            .map(|row| {
                let cell = table::required_str(&cells, self.column, row)?;
                Ok(self
                    .split_cell(cell)
                    .into_iter()
                    .map(str::to_string)
                    .collect())
            })
            .collect()
    }

    /// Build the dictionary of a training table, in first-seen order.
    pub fn extract(
        &self,
        batch: &RecordBatch,
    ) -> BNResult<ClassDictionary> {
        if self.is_encoded(batch)? {
            return Err(BertNodesError::Input(format!(
                "column {:?} is already encoded; class names must be configured",
                self.column
            )));
        }
        let rows = self.row_labels(batch)?;
        let dict = ClassDictionary::from_labels(rows.iter().flatten());
        log::debug!("extracted {} classes from {:?}", dict.len(), self.column);
        Ok(dict)
    }

    /// Check that every label of `batch` is part of `dict`.
    pub fn check_known(
        &self,
        dict: &ClassDictionary,
        batch: &RecordBatch,
    ) -> BNResult<()> {
        self.targets(dict, batch).map(|_| ())
    }

    /// The multi-hot target vector of every row.
    pub fn targets(
        &self,
        dict: &ClassDictionary,
        batch: &RecordBatch,
    ) -> BNResult<Vec<Vec<f32>>> {
        if self.is_encoded(batch)? {
            let rows = table::float_list_rows(batch, self.column)?;
            if let Some(row) = rows.iter().position(|r| r.len() != dict.len()) {
                return Err(BertNodesError::Input(format!(
                    "row {row} of {:?} has {} values, expected {} classes",
                    self.column,
                    rows[row].len(),
                    dict.len()
                )));
            }
            return Ok(rows);
        }

        self.row_labels(batch)?
            .iter()
            .map(|labels| dict.encode(labels))
            .collect()
    }
}
