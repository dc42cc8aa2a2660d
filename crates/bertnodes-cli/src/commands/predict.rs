use std::path::PathBuf;

use arrow::record_batch::RecordBatch;
use bertnodes::{
    artifact::{ArtifactAttributes, keys},
    classes::ClassDictionary,
    prediction::{PredictionTableBuilder, probability_column_name},
    settings::{DEFAULT_CLASS_SEPARATOR, PredictorSettings, load_json},
    table,
};
use stderrlog::LogLevelNum;

use crate::{
    input_output::{InputArgs, OutputArgs, read_table},
    logging::LogArgs,
};

/// Args for the predict command.
#[derive(clap::Args, Debug)]
pub struct PredictArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Parquet table of class probabilities, row-aligned with the input.
    #[arg(long)]
    probabilities: PathBuf,

    /// List column holding each row's probabilities.
    ///
    /// Without it, one `P (<label>)` column per class is read.
    #[arg(long)]
    probabilities_column: Option<String>,

    /// Artifact directory holding the class dictionary.
    #[arg(long)]
    artifact: PathBuf,

    /// Predictor settings JSON; replaces the flags below.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Prediction column name.
    #[arg(long)]
    prediction_column: Option<String>,

    /// Multi-label probability threshold.
    #[arg(long)]
    threshold: Option<f64>,

    /// Multi-label top-k.
    #[arg(long)]
    number_of_classes: Option<usize>,

    /// Separator for joined multi-label predictions.
    #[arg(long)]
    class_separator: Option<String>,

    /// Suffix of the probability output columns.
    #[arg(long, default_value = "")]
    suffix: String,

    /// Skip the probability output columns.
    #[arg(long)]
    no_probabilities: bool,
}

impl PredictArgs {
    fn predictor_settings(&self) -> Result<PredictorSettings, Box<dyn std::error::Error>> {
        if let Some(path) = &self.settings {
            return Ok(load_json(path)?);
        }
        let mut settings = PredictorSettings {
            threshold: self.threshold,
            number_of_classes: self.number_of_classes,
            class_separator: self.class_separator.clone(),
            probabilities_column_suffix: self.suffix.clone(),
            output_probabilities: !self.no_probabilities,
            ..Default::default()
        };
        if let Some(column) = &self.prediction_column {
            settings.prediction_column = column.clone();
        }
        Ok(settings)
    }

    fn probability_rows(
        &self,
        table: &RecordBatch,
        classes: &ClassDictionary,
    ) -> Result<Vec<Vec<f32>>, Box<dyn std::error::Error>> {
        let rows = match &self.probabilities_column {
            Some(column) => table::float_list_rows(table, column)?,
            None => {
                let names: Vec<String> = classes
                    .labels()
                    .iter()
                    .map(|label| probability_column_name(label, ""))
                    .collect();
                table::float_rows(table, &names)?
            }
        };
        Ok(rows)
    }

    /// Run the predict command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(LogLevelNum::Info)?;

        let attributes = ArtifactAttributes::load(&self.artifact)?;
        let classes: ClassDictionary = attributes.require(keys::CLASS_DICT)?;
        let multi_label = attributes.get_or(keys::MULTI_LABEL, false)?;
        let separator: String =
            attributes.get_or(keys::CLASS_SEPARATOR, DEFAULT_CLASS_SEPARATOR.to_string())?;

        let settings = self.predictor_settings()?;
        let builder = PredictionTableBuilder::new(&settings, &classes, multi_label, &separator)?;
        log::info!(
            "{} classes, multi-label: {multi_label}, strategy: {:?}",
            classes.len(),
            builder.strategy()
        );

        let input = self.input.read_table()?;
        let probabilities = read_table(&self.probabilities)?;
        let rows = self.probability_rows(&probabilities, &classes)?;

        let batch = builder.build(&input, &rows)?;
        self.output.write_table(&batch)?;

        Ok(())
    }
}
