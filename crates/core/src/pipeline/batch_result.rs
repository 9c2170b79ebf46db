use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedConversion {
    pub input: PathBuf,
    pub error: String,
}

/// Per-file outcome of a batch, each list in job order.
///
/// Every job lands in exactly one list, so the three lengths add up to the
/// batch length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: Vec<ConvertedFile>,
    pub failed: Vec<FailedConversion>,
    /// Jobs never attempted because the batch was cancelled.
    pub skipped: Vec<PathBuf>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    pub fn succeeded_inputs(&self) -> Vec<PathBuf> {
        self.succeeded.iter().map(|c| c.input.clone()).collect()
    }

    pub fn was_cancelled(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// True when every job converted.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Final tally line, e.g. `Conversion complete: 3/4 successful`.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Conversion complete: {}/{} successful",
            self.succeeded.len(),
            self.total()
        );
        if self.was_cancelled() {
            line.push_str(&format!(" ({} cancelled)", self.skipped.len()));
        }
        line
    }
}
