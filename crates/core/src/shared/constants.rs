/// Source container extensions offered by file pickers (matched case-insensitively).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi"];

pub const GIF_FPS_MIN: u32 = 10;
pub const GIF_FPS_MAX: u32 = 30;
pub const GIF_FPS_DEFAULT: u32 = 15;

pub const GIF_SCALE_MIN: f64 = 0.5;
pub const GIF_SCALE_MAX: f64 = 1.0;
pub const GIF_SCALE_DEFAULT: f64 = 1.0;

pub const GIF_MAX_WIDTH_MIN: u32 = 400;
pub const GIF_MAX_WIDTH_MAX: u32 = 1400;
pub const GIF_MAX_WIDTH_DEFAULT: u32 = 700;

/// Environment overrides for the encoder executables.
pub const FFMPEG_ENV: &str = "VIDCONVERT_FFMPEG";
pub const FFPROBE_ENV: &str = "VIDCONVERT_FFPROBE";

#[cfg(target_os = "windows")]
pub const FFMPEG_NAME: &str = "ffmpeg.exe";
#[cfg(target_os = "windows")]
pub const FFPROBE_NAME: &str = "ffprobe.exe";

#[cfg(not(target_os = "windows"))]
pub const FFMPEG_NAME: &str = "ffmpeg";
#[cfg(not(target_os = "windows"))]
pub const FFPROBE_NAME: &str = "ffprobe";
