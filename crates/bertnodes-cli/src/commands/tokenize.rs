use bertnodes::{
    progress::{JobKind, ProgressTracker},
    settings::{DEFAULT_SEQ_LENGTH, InputSettings},
    table,
    tokenization::TableTokenizer,
};
use stderrlog::LogLevelNum;

use crate::{
    disk_cache::DiskCacheArgs,
    input_output::{InputArgs, OutputArgs},
    logging::LogArgs,
    model_selector::ModelSelectorArgs,
    progress_bar::ProgressArgs,
};

/// Args for the tokenize command.
#[derive(clap::Args, Debug)]
pub struct TokenizeArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    #[command(flatten)]
    model: ModelSelectorArgs,

    #[command(flatten)]
    disk_cache: DiskCacheArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    progress: ProgressArgs,

    /// Text column.
    #[arg(long, default_value = "text")]
    sentence_column: String,

    /// Optional second text column.
    #[arg(long)]
    second_sentence_column: Option<String>,

    /// Padded sequence length.
    #[arg(long, default_value_t = DEFAULT_SEQ_LENGTH)]
    max_seq_length: usize,

    /// Lowercase text before vocabulary lookup.
    #[arg(long)]
    lowercase: bool,
}

impl TokenizeArgs {
    /// Run the tokenize command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(LogLevelNum::Info)?;

        let settings = InputSettings::new(self.sentence_column.as_str())
            .with_second_sentence_column(self.second_sentence_column.as_deref())
            .with_max_seq_length(self.max_seq_length);

        let tokenizer = self.model.load_tokenizer(&self.disk_cache, self.lowercase)?;
        let batch = self.input.read_table()?;
        settings.validate_schema(&batch.schema())?;

        let mut tracker = ProgressTracker::new(
            JobKind::Tokenize,
            batch.num_rows(),
            1,
            self.progress.sink("tokenize"),
        );
        let columns = TableTokenizer::new(tokenizer.as_ref(), &settings)?
            .tokenize(&batch, &mut tracker)?;

        let batch = table::append_columns(&batch, columns.to_arrow_columns())?;
        self.output.write_table(&batch)?;

        Ok(())
    }
}
