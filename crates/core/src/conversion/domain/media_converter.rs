use std::path::PathBuf;

use crate::conversion::domain::conversion_error::ConversionError;
use crate::shared::gif_settings::GifSettings;
use crate::shared::target_format::TargetFormat;

/// Fully resolved parameters for one encoder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: TargetFormat,
    /// Present only for GIF targets.
    pub gif: Option<GifSettings>,
}

/// Abstracts the external encoder so the batch use case can run without
/// depending on a specific tool.
///
/// Implementations block until the output is complete. `on_progress`
/// receives the encoded fraction in `[0, 1]`.
pub trait MediaConverter: Send {
    fn convert(
        &mut self,
        request: &ConversionRequest,
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<(), ConversionError>;
}
