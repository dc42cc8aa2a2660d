mod commands;
mod disk_cache;
mod input_output;
mod logging;
mod model_selector;
mod progress_bar;

use clap::Parser;
use commands::Commands;

/// bertnodes
#[derive(clap::Parser, Debug)]
pub struct Args {
    /// Subcommand to run.
    #[clap(subcommand)]
    pub command: Commands,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    args.command.run()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_model_selector_is_exclusive() {
        let result = Args::try_parse_from([
            "bertnodes",
            "tokenize",
            "--hf-model",
            "bert-base-uncased",
            "--local",
            "vocab.txt",
            "--input",
            "in.parquet",
            "--output",
            "out.parquet",
        ]);
        assert!(result.is_err());
    }
}
