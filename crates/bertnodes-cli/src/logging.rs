use stderrlog::{LogLevelNum, Timestamp};

/// Modules whose records reach stderr.
const LOGGED_MODULES: [&str; 2] = ["bertnodes", "bertnodes_disk_cache"];

/// Logging setup arg group.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence log messages.
    #[clap(short, long)]
    pub quiet: bool,

    /// More log detail per repeat (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Prefix log lines with a timestamp.
    #[clap(long)]
    pub ts: bool,
}

impl LogArgs {
    /// The level for `base` (the command's default) raised by `-v`.
    fn level(
        &self,
        base: LogLevelNum,
    ) -> LogLevelNum {
        match (base, self.verbose) {
            (base, 0) => base,
            (_, 1) => LogLevelNum::Debug,
            _ => LogLevelNum::Trace,
        }
    }

    /// Install the stderr logger.
    pub fn setup_logging(
        &self,
        base: LogLevelNum,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut logger = stderrlog::new();
        for module in LOGGED_MODULES {
            logger.module(module);
        }
        logger
            .quiet(self.quiet)
            .verbosity(self.level(base))
            .timestamp(if self.ts {
                Timestamp::Millisecond
            } else {
                Timestamp::Off
            })
            .init()?;
        Ok(())
    }
}
