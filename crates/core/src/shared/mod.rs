pub mod constants;
pub mod gif_settings;
pub mod target_format;
pub mod video_metadata;
