use bertnodes::progress::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};

/// Shows job percents on an `indicatif` bar.
pub struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    /// A bar labelled `message`; hidden when `display` is false.
    pub fn new(
        message: &'static str,
        display: bool,
    ) -> Self {
        let bar = if display {
            ProgressBar::new(100)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos:>3}%") {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(message);
        Self { bar }
    }
}

impl ProgressSink for BarSink {
    fn report(
        &mut self,
        percent: u8,
    ) {
        self.bar.set_position(u64::from(percent));
        if percent == 100 {
            self.bar.finish();
        }
    }
}

/// Progress bar argument group.
#[derive(clap::Args, Debug)]
pub struct ProgressArgs {
    /// Hide the progress bar.
    #[arg(long)]
    no_progress: bool,
}

impl ProgressArgs {
    /// Build the sink for a job.
    pub fn sink(
        &self,
        message: &'static str,
    ) -> BarSink {
        BarSink::new(message, !self.no_progress)
    }
}
