use std::path::PathBuf;

use bertnodes::{
    artifact::{ArtifactAttributes, keys},
    classes::{ClassExtractor, MIN_CLASS_COUNT},
    settings::DEFAULT_CLASS_SEPARATOR,
};
use stderrlog::LogLevelNum;

use crate::{input_output::InputArgs, logging::LogArgs};

/// Args for the classes command.
#[derive(clap::Args, Debug)]
pub struct ClassesArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    #[command(flatten)]
    input: InputArgs,

    /// Label column.
    #[arg(long, default_value = "label")]
    class_column: String,

    /// Split label cells on the class separator.
    #[arg(long)]
    multi_label: bool,

    /// Multi-label separator.
    #[arg(long, default_value = DEFAULT_CLASS_SEPARATOR)]
    class_separator: String,

    /// Artifact directory; existing attributes are kept.
    #[arg(long)]
    artifact: PathBuf,
}

impl ClassesArgs {
    /// Run the classes command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(LogLevelNum::Info)?;

        let batch = self.input.read_table()?;
        let classes = ClassExtractor::new(
            &self.class_column,
            self.multi_label,
            &self.class_separator,
        )
        .extract(&batch)?;
        classes.require_min_classes(MIN_CLASS_COUNT)?;

        let mut attributes = ArtifactAttributes::load(&self.artifact)?;
        attributes.set(keys::CLASS_DICT, &classes)?;
        attributes.set(keys::MULTI_LABEL, self.multi_label)?;
        attributes.set(keys::CLASS_SEPARATOR, &self.class_separator)?;
        attributes.save(&self.artifact)?;

        log::info!(
            "{} classes written to {}",
            classes.len(),
            self.artifact.display()
        );
        for label in classes.labels() {
            println!("{label}");
        }
        Ok(())
    }
}
