use bertnodes::settings::ModelSelectionMode;
use strum::IntoEnumIterator;

/// Subcommands for the models command.
#[derive(clap::Subcommand, Debug)]
pub enum ModelsCommand {
    /// List the model selection modes.
    #[clap(visible_alias = "ls")]
    List(ListModelsArgs),
}

/// Args for the models command.
#[derive(clap::Args, Debug)]
pub struct ModelsArgs {
    #[clap(subcommand)]
    pub command: ModelsCommand,
}

impl ModelsArgs {
    /// Run the models command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ModelsCommand::List(cmd) => cmd.run(),
        }
    }
}

/// Args for the model listing command.
#[derive(clap::Args, Debug)]
pub struct ListModelsArgs {}

impl ListModelsArgs {
    /// Print each selection mode with its description.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        for mode in ModelSelectionMode::iter() {
            println!("{mode:<14} {}", mode.description());
        }
        Ok(())
    }
}
