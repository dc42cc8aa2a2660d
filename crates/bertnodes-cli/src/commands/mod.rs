mod classes;
mod models;
mod predict;
mod tokenize;

/// Subcommands for bertnodes
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Tokenize text columns of a parquet table.
    Tokenize(tokenize::TokenizeArgs),

    /// Extract the class dictionary of a training table.
    Classes(classes::ClassesArgs),

    /// Turn class probabilities into predictions.
    Predict(predict::PredictArgs),

    /// Models sub-menu.
    Models(models::ModelsArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Tokenize(cmd) => cmd.run(),
            Commands::Classes(cmd) => cmd.run(),
            Commands::Predict(cmd) => cmd.run(),
            Commands::Models(cmd) => cmd.run(),
        }
    }
}
