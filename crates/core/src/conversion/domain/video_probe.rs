use std::path::Path;

use crate::conversion::domain::conversion_error::ConversionError;
use crate::shared::video_metadata::VideoMetadata;

/// Reads stream facts from a source file without decoding it.
pub trait VideoProbe: Send {
    fn probe(&self, path: &Path) -> Result<VideoMetadata, ConversionError>;
}
