use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::shared::constants::{FFMPEG_ENV, FFMPEG_NAME, FFPROBE_ENV, FFPROBE_NAME};

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Locations of the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegBinaries {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl FfmpegBinaries {
    /// Resolution order per binary:
    /// 1. Environment override (`VIDCONVERT_FFMPEG` / `VIDCONVERT_FFPROBE`)
    /// 2. Bare executable name, looked up on `PATH` at spawn time
    pub fn discover() -> Self {
        Self {
            ffmpeg: from_env_or(FFMPEG_ENV, FFMPEG_NAME),
            ffprobe: from_env_or(FFPROBE_ENV, FFPROBE_NAME),
        }
    }

    pub fn with_ffmpeg(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg = path.into();
        self
    }

    pub fn with_ffprobe(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe = path.into();
        self
    }

    /// True when both executables answer `-version`.
    pub fn available(&self) -> bool {
        responds_to_version(&self.ffmpeg) && responds_to_version(&self.ffprobe)
    }
}

impl Default for FfmpegBinaries {
    fn default() -> Self {
        Self::discover()
    }
}

fn from_env_or(var: &str, fallback: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(fallback))
}

fn responds_to_version(program: &Path) -> bool {
    hidden_command(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// A `Command` that does not flash a console window on Windows.
pub fn hidden_command<S: AsRef<OsStr>>(program: S) -> Command {
    #[allow(unused_mut)]
    let mut cmd = Command::new(program);
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    cmd
}
