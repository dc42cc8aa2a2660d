//! # Table Helpers
//!
//! Small adapters between [`RecordBatch`] columns and the plain vectors
//! the tokenizer and prediction code work with.

use std::sync::Arc;

use arrow::{
    array::{
        Array,
        ArrayRef,
        AsArray,
        Float64Array,
        Int32Array,
        ListArray,
        StringArray,
    },
    compute::cast,
    datatypes::{DataType, Field, FieldRef, Float64Type, Int32Type, Schema},
    record_batch::RecordBatch,
};

use crate::errors::{BNResult, BertNodesError};

/// Look up a column by name.
pub fn column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> BNResult<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| BertNodesError::MissingColumn(name.to_string()))
}

/// Read a column as strings, casting non-string columns.
pub fn string_column(
    batch: &RecordBatch,
    name: &str,
) -> BNResult<StringArray> {
    let array = column(batch, name)?;
    let array = match array.data_type() {
        DataType::Utf8 => array.clone(),
        _ => cast(array.as_ref(), &DataType::Utf8)?,
    };
    array
        .as_string_opt::<i32>()
        .cloned()
        .ok_or_else(|| BertNodesError::Input(format!("column {name:?} can't be read as text")))
}

/// Read a non-null string cell.
pub fn required_str<'a>(
    array: &'a StringArray,
    column: &str,
    row: usize,
) -> BNResult<&'a str> {
    if array.is_null(row) {
        return Err(BertNodesError::MissingValue {
            column: column.to_string(),
            row,
        });
    }
    Ok(array.value(row))
}

/// Read a possibly-null string cell.
pub fn optional_str(
    array: &StringArray,
    row: usize,
) -> Option<&str> {
    if array.is_null(row) {
        None
    } else {
        Some(array.value(row))
    }
}

/// Read a list-of-numbers column into one `f32` vector per row.
///
/// `List`, `LargeList` and `FixedSizeList` columns are all accepted.
pub fn float_list_rows(
    batch: &RecordBatch,
    name: &str,
) -> BNResult<Vec<Vec<f32>>> {
    let array = column(batch, name)?;
    let array = match array.data_type() {
        DataType::List(_) | DataType::LargeList(_) | DataType::FixedSizeList(_, _) => {
            let as_list = DataType::List(Arc::new(Field::new_list_field(DataType::Float64, true)));
            cast(array.as_ref(), &as_list)?
        }
        _ => {
            return Err(BertNodesError::Input(format!(
                "column {name:?} is not a list column"
            )));
        }
    };
    let list = array.as_list::<i32>();

    (0..list.len())
        .map(|row| {
            if list.is_null(row) {
                return Err(BertNodesError::MissingValue {
                    column: name.to_string(),
                    row,
                });
            }
            float_values(&list.value(row), name)
        })
        .collect()
}

/// Read numeric columns into one `f32` vector per row, one value per column.
pub fn float_rows(
    batch: &RecordBatch,
    names: &[String],
) -> BNResult<Vec<Vec<f32>>> {
    let columns = names
        .iter()
        .map(|name| float_values(column(batch, name)?, name).map(|values| (name, values)))
        .collect::<BNResult<Vec<_>>>()?;

    Ok((0..batch.num_rows())
        .map(|row| columns.iter().map(|(_, values)| values[row]).collect())
        .collect())
}

fn float_values(
    array: &ArrayRef,
    name: &str,
) -> BNResult<Vec<f32>> {
    let values = cast(array.as_ref(), &DataType::Float64)?;
    let values = values
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| BertNodesError::Input(format!("column {name:?} is not numeric")))?;
    if let Some(row) = (0..values.len()).find(|&row| values.is_null(row)) {
        return Err(BertNodesError::MissingValue {
            column: name.to_string(),
            row,
        });
    }
    Ok(values.values().iter().map(|&v| v as f32).collect())
}

/// Build a `List<Int32>` column.
pub fn int_list_column(rows: &[Vec<u32>]) -> ArrayRef {
    Arc::new(ListArray::from_iter_primitive::<Int32Type, _, _>(
        rows.iter()
            .map(|row| Some(row.iter().map(|&v| Some(v as i32)))),
    ))
}

/// Build a `List<Float64>` column.
pub fn float_list_column(rows: &[Vec<f32>]) -> ArrayRef {
    Arc::new(ListArray::from_iter_primitive::<Float64Type, _, _>(
        rows.iter()
            .map(|row| Some(row.iter().map(|&v| Some(v as f64)))),
    ))
}

/// Build a `Float64` column.
pub fn float_column<I: IntoIterator<Item = f32>>(values: I) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(
        values.into_iter().map(|v| v as f64),
    ))
}

/// Build an `Int32` column.
pub fn int_column<I: IntoIterator<Item = i32>>(values: I) -> ArrayRef {
    Arc::new(Int32Array::from_iter_values(values))
}

/// Build a `Utf8` column.
pub fn string_column_from(values: Vec<String>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

/// Append named columns to the right of a batch.
///
/// ## Errors
/// * a new column name collides with an existing one.
/// * a new column length doesn't match the batch.
pub fn append_columns(
    batch: &RecordBatch,
    columns: Vec<(String, ArrayRef)>,
) -> BNResult<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    let mut arrays = batch.columns().to_vec();

    for (name, array) in columns {
        if fields.iter().any(|f| f.name() == &name) {
            return Err(BertNodesError::Input(format!(
                "output column {name:?} already exists in the table"
            )));
        }
        fields.push(Arc::new(Field::new(name, array.data_type().clone(), true)));
        arrays.push(array);
    }

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    Ok(RecordBatch::try_new(Arc::new(schema), arrays)?)
}

/// Build a batch from named columns.
pub fn batch_from_columns(columns: Vec<(String, ArrayRef)>) -> BNResult<RecordBatch> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(name, array.data_type().clone(), true))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordBatch {
        batch_from_columns(vec![
            (
                "text".to_string(),
                Arc::new(StringArray::from(vec![Some("a"), None])) as ArrayRef,
            ),
            ("n".to_string(), int_column([3, 4])),
        ])
        .unwrap()
    }

    #[test]
    fn test_string_column_casts() {
        let batch = sample();
        let numbers = string_column(&batch, "n").unwrap();
        assert_eq!(numbers.value(0), "3");
        assert_eq!(numbers.value(1), "4");

        let text = string_column(&batch, "text").unwrap();
        assert_eq!(required_str(&text, "text", 0).unwrap(), "a");
        assert!(matches!(
            required_str(&text, "text", 1),
            Err(BertNodesError::MissingValue { row: 1, .. })
        ));
        assert_eq!(optional_str(&text, 1), None);

        assert!(matches!(
            string_column(&batch, "nope"),
            Err(BertNodesError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_append_columns() {
        let batch = sample();
        let out = append_columns(
            &batch,
            vec![("ids".to_string(), int_list_column(&[vec![1, 2], vec![3]]))],
        )
        .unwrap();
        assert_eq!(out.num_columns(), 3);
        assert_eq!(out.schema().field(2).name(), "ids");

        assert!(append_columns(&batch, vec![("n".to_string(), int_column([1, 2]))]).is_err());
        assert!(append_columns(&batch, vec![("m".to_string(), int_column([1]))]).is_err());
    }

    #[test]
    fn test_float_rows() {
        let batch = batch_from_columns(vec![
            ("a".to_string(), float_column([0.25, 0.5])),
            ("b".to_string(), int_column([1, 0])),
            (
                "list".to_string(),
                float_list_column(&[vec![1.0, 0.0], vec![0.0, 1.0]]),
            ),
        ])
        .unwrap();

        assert_eq!(
            float_rows(&batch, &["a".to_string(), "b".to_string()]).unwrap(),
            vec![vec![0.25, 1.0], vec![0.5, 0.0]]
        );
        assert_eq!(
            float_list_rows(&batch, "list").unwrap(),
            vec![vec![1.0, 0.0], vec![0.0, 1.0]]
        );
        assert!(float_list_rows(&batch, "a").is_err());
    }

    #[test]
    fn test_float_list_rows_accepts_every_list_type() {
        use arrow::array::{FixedSizeListArray, LargeListArray};

        let rows = || vec![Some(vec![Some(1.0), Some(0.0)]), Some(vec![Some(0.0), Some(1.0)])];
        let expected = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

        let columns: Vec<(&str, ArrayRef)> = vec![
            (
                "list",
                Arc::new(ListArray::from_iter_primitive::<Float64Type, _, _>(rows())) as ArrayRef,
            ),
            (
                "large",
                Arc::new(LargeListArray::from_iter_primitive::<Float64Type, _, _>(
                    rows(),
                )) as ArrayRef,
            ),
            (
                "fixed",
                Arc::new(FixedSizeListArray::from_iter_primitive::<Float64Type, _, _>(
                    rows(),
                    2,
                )) as ArrayRef,
            ),
            (
                "fixed_ints",
                Arc::new(FixedSizeListArray::from_iter_primitive::<Int32Type, _, _>(
                    vec![Some(vec![Some(1), Some(0)]), Some(vec![Some(0), Some(1)])],
                    2,
                )) as ArrayRef,
            ),
        ];
        let batch = batch_from_columns(
            columns
                .into_iter()
                .map(|(name, array)| (name.to_string(), array))
                .collect(),
        )
        .unwrap();

        for name in ["list", "large", "fixed", "fixed_ints"] {
            assert_eq!(float_list_rows(&batch, name).unwrap(), expected, "{name}");
        }
    }
}
