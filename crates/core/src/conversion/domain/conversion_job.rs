use std::path::{Path, PathBuf};

use crate::shared::gif_settings::GifSettings;
use crate::shared::target_format::TargetFormat;

/// One input file to convert. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    input_path: PathBuf,
    target_format: TargetFormat,
    output_dir: Option<PathBuf>,
    gif: Option<GifSettings>,
}

impl ConversionJob {
    /// GIF settings are clamped and kept only for GIF targets; a GIF job
    /// without settings gets the defaults.
    pub fn new(
        input_path: impl Into<PathBuf>,
        target_format: TargetFormat,
        output_dir: Option<PathBuf>,
        gif: Option<GifSettings>,
    ) -> Self {
        let gif = if target_format.is_gif() {
            Some(gif.unwrap_or_default().clamped())
        } else {
            None
        };
        Self {
            input_path: input_path.into(),
            target_format,
            output_dir,
            gif,
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn target_format(&self) -> TargetFormat {
        self.target_format
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn gif(&self) -> Option<GifSettings> {
        self.gif
    }

    pub fn output_path(&self) -> PathBuf {
        resolve_output_path(&self.input_path, self.output_dir.as_deref(), self.target_format)
    }
}

/// `<dir>/<input stem>.<extension>`, where `dir` is `output_dir` or the
/// input's own directory.
pub fn resolve_output_path(
    input_path: &Path,
    output_dir: Option<&Path>,
    format: TargetFormat,
) -> PathBuf {
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input_path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let mut name = input_path.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(format.extension());
    dir.join(name)
}

/// Ordered jobs submitted by one "convert" action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRequest {
    jobs: Vec<ConversionJob>,
}

impl BatchRequest {
    pub fn new(jobs: Vec<ConversionJob>) -> Self {
        Self { jobs }
    }

    /// Builds one job per input, all sharing the same target settings.
    pub fn from_inputs<I, P>(
        inputs: I,
        target_format: TargetFormat,
        output_dir: Option<PathBuf>,
        gif: Option<GifSettings>,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let jobs = inputs
            .into_iter()
            .map(|input| ConversionJob::new(input, target_format, output_dir.clone(), gif))
            .collect();
        Self { jobs }
    }

    pub fn jobs(&self) -> &[ConversionJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl IntoIterator for BatchRequest {
    type Item = ConversionJob;
    type IntoIter = std::vec::IntoIter<ConversionJob>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.into_iter()
    }
}
