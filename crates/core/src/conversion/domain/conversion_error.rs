use std::path::PathBuf;

use thiserror::Error;

/// Why a single job in a batch failed.
///
/// Every variant is caught at the job boundary by the batch use case; none of
/// them abort the remaining jobs.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("input not found")]
    InputNotFound,
    #[error("unsupported or unreadable input: {0}")]
    UnreadableInput(String),
    #[error("output directory {path} is not writable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("output {path} collides with the output of job {earlier_job}")]
    OutputCollision { path: PathBuf, earlier_job: usize },
    #[error("output {0} would overwrite its own input")]
    OutputIsInput(PathBuf),
    #[error("failed to move finished output to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// Encoder failure; the message is the encoder's own output.
    #[error("{0}")]
    Encoder(String),
}
