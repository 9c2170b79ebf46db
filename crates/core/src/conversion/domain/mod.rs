pub mod conversion_error;
pub mod conversion_job;
pub mod media_converter;
pub mod video_probe;
