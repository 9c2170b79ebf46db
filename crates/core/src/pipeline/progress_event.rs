#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressLevel {
    Info,
    Success,
    Error,
}

/// Where in the batch an event was produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressStage {
    /// A job is about to be handed to the encoder.
    Started,
    /// Encoder progress for the current job, in `[0, 1]`.
    Encoding(f64),
    Succeeded,
    Failed,
    /// Emitted once after the last job; `job_index == total`.
    BatchComplete,
}

impl ProgressStage {
    /// True for the stages that close a job.
    pub fn is_outcome(self) -> bool {
        matches!(self, ProgressStage::Succeeded | ProgressStage::Failed)
    }
}

/// A human-readable status update flowing from the batch worker to the
/// presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Zero-based job position.
    pub job_index: usize,
    pub total: usize,
    pub message: String,
    pub level: ProgressLevel,
    pub stage: ProgressStage,
}

impl ProgressEvent {
    pub fn started(job_index: usize, total: usize, message: impl Into<String>) -> Self {
        Self::new(job_index, total, message, ProgressLevel::Info, ProgressStage::Started)
    }

    pub fn encoding(
        job_index: usize,
        total: usize,
        fraction: f64,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            job_index,
            total,
            message,
            ProgressLevel::Info,
            ProgressStage::Encoding(fraction.clamp(0.0, 1.0)),
        )
    }

    pub fn succeeded(job_index: usize, total: usize, message: impl Into<String>) -> Self {
        Self::new(
            job_index,
            total,
            message,
            ProgressLevel::Success,
            ProgressStage::Succeeded,
        )
    }

    pub fn failed(job_index: usize, total: usize, message: impl Into<String>) -> Self {
        Self::new(job_index, total, message, ProgressLevel::Error, ProgressStage::Failed)
    }

    pub fn batch_complete(total: usize, level: ProgressLevel, message: impl Into<String>) -> Self {
        Self::new(total, total, message, level, ProgressStage::BatchComplete)
    }

    fn new(
        job_index: usize,
        total: usize,
        message: impl Into<String>,
        level: ProgressLevel,
        stage: ProgressStage,
    ) -> Self {
        Self {
            job_index,
            total,
            message: message.into(),
            level,
            stage,
        }
    }

    /// Overall batch completion in `[0, 1]`, counting the current job's
    /// encoder progress.
    pub fn overall_fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        let done = match self.stage {
            ProgressStage::Started => self.job_index as f64,
            ProgressStage::Encoding(fraction) => self.job_index as f64 + fraction,
            ProgressStage::Succeeded | ProgressStage::Failed => self.job_index as f64 + 1.0,
            ProgressStage::BatchComplete => self.total as f64,
        };
        (done / self.total as f64).clamp(0.0, 1.0)
    }
}
