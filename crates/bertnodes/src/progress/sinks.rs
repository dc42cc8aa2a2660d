//! # Progress Sinks

/// Destination for percent updates.
///
/// Values arrive deduplicated and non-decreasing, in `0..=100`.
pub trait ProgressSink {
    /// Report the current percent.
    fn report(
        &mut self,
        percent: u8,
    );
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn report(
        &mut self,
        percent: u8,
    ) {
        (**self).report(percent)
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn report(
        &mut self,
        percent: u8,
    ) {
        (**self).report(percent)
    }
}

/// Adapts a closure into a [`ProgressSink`].
pub struct FnProgressSink<F>(pub F);

impl<F: FnMut(u8)> ProgressSink for FnProgressSink<F> {
    fn report(
        &mut self,
        percent: u8,
    ) {
        (self.0)(percent)
    }
}

/// Keeps every reported percent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingSink {
    emitted: Vec<u8>,
}

impl RecordingSink {
    /// The percents reported so far, in order.
    pub fn emitted(&self) -> &[u8] {
        &self.emitted
    }
}

impl ProgressSink for RecordingSink {
    fn report(
        &mut self,
        percent: u8,
    ) {
        self.emitted.push(percent);
    }
}

/// Reports progress through the [`log`] facade.
#[derive(Debug, Clone)]
pub struct LogProgressSink {
    label: String,
}

impl LogProgressSink {
    /// Create a sink which prefixes updates with `label`.
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// The logged line for `percent`.
    pub fn message(
        &self,
        percent: u8,
    ) -> String {
        if self.label.is_empty() {
            format!("progress: {percent}")
        } else {
            format!("{}: progress: {percent}", self.label)
        }
    }
}

impl ProgressSink for LogProgressSink {
    fn report(
        &mut self,
        percent: u8,
    ) {
        log::info!("{}", self.message(percent));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_message() {
        assert_eq!(LogProgressSink::new("").message(7), "progress: 7");
        assert_eq!(LogProgressSink::new("train").message(100), "train: progress: 100");
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = FnProgressSink(|p| seen.push(p));
            let by_ref: &mut dyn ProgressSink = &mut sink;
            by_ref.report(3);
            by_ref.report(9);
        }
        assert_eq!(seen, vec![3, 9]);
    }
}
