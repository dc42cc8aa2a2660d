use std::{fs::File, path::PathBuf};

use arrow::{compute::concat_batches, record_batch::RecordBatch};
use parquet::{
    arrow::{ArrowWriter, arrow_reader::ParquetRecordBatchReaderBuilder},
    basic::Compression,
    file::properties::WriterProperties,
};

/// Read a whole parquet file into one batch.
pub fn read_table(path: &PathBuf) -> Result<RecordBatch, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;
    log::info!("read {} batches from {}", batches.len(), path.display());
    Ok(concat_batches(&schema, &batches)?)
}

/// Input argument group.
#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Input parquet file.
    #[clap(long)]
    pub input: PathBuf,
}

impl InputArgs {
    /// Read the input table.
    pub fn read_table(&self) -> Result<RecordBatch, Box<dyn std::error::Error>> {
        read_table(&self.input)
    }
}

/// Output argument group.
#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Output parquet file.
    #[clap(long)]
    pub output: PathBuf,
}

impl OutputArgs {
    /// Write `batch` as a snappy-compressed parquet file.
    pub fn write_table(
        &self,
        batch: &RecordBatch,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let file = File::create(&self.output)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
        log::info!("wrote {} rows to {}", batch.num_rows(), self.output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Int32Array, StringArray};
    use bertnodes::table;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_parquet_roundtrip() {
        let tmp = TempDir::new("bertnodes-cli").unwrap();
        let batch = table::batch_from_columns(vec![
            (
                "text".to_string(),
                Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef,
            ),
            (
                "n".to_string(),
                Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef,
            ),
        ])
        .unwrap();

        let output = OutputArgs {
            output: tmp.path().join("t.parquet"),
        };
        output.write_table(&batch).unwrap();

        let input = InputArgs {
            input: output.output.clone(),
        };
        let read = input.read_table().unwrap();
        assert_eq!(read.num_rows(), 2);
        assert_eq!(read.columns(), batch.columns());
    }
}
