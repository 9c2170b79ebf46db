use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;

use crate::conversion::domain::conversion_error::ConversionError;
use crate::conversion::domain::video_probe::VideoProbe;
use crate::conversion::infrastructure::ffmpeg_binaries::hidden_command;
use crate::shared::video_metadata::{normalize_rotation, VideoMetadata};

/// Probes source files by running `ffprobe` with JSON output.
pub struct FfprobeReader {
    program: PathBuf,
}

impl FfprobeReader {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl VideoProbe for FfprobeReader {
    fn probe(&self, path: &Path) -> Result<VideoMetadata, ConversionError> {
        let output = hidden_command(&self.program)
            .args(["-v", "error", "-print_format", "json", "-show_streams", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ConversionError::Launch {
                program: self.program.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.trim();
            return Err(ConversionError::UnreadableInput(if reason.is_empty() {
                format!("ffprobe exited with {}", output.status)
            } else {
                reason.to_string()
            }));
        }

        let metadata = parse_probe_output(&String::from_utf8_lossy(&output.stdout))?;
        log::debug!(
            "Probed {}: {}x{} rotated {}, {:.2}s, audio={}",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.rotation,
            metadata.duration,
            metadata.has_audio
        );
        Ok(metadata)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    tags: Option<ProbeTags>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    side_data_type: Option<String>,
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Extracts [`VideoMetadata`] from `ffprobe -print_format json` output.
///
/// ffprobe reports durations as decimal strings; the container duration
/// wins over the video stream's when both are present. Width and height
/// stay as coded; the display rotation is reported separately.
pub fn parse_probe_output(json: &str) -> Result<VideoMetadata, ConversionError> {
    let probe: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| ConversionError::UnreadableInput(format!("malformed ffprobe output: {e}")))?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ConversionError::UnreadableInput("no video stream found".to_string()))?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(ConversionError::UnreadableInput(
                "video stream has no dimensions".to_string(),
            ))
        }
    };

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| parse_seconds(f.duration.as_deref()))
        .or_else(|| parse_seconds(video.duration.as_deref()))
        .unwrap_or(0.0);

    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoMetadata {
        width,
        height,
        duration,
        has_audio,
        rotation: stream_rotation(video),
    })
}

/// Display Matrix side data first, then the legacy `rotate` tag.
fn stream_rotation(stream: &ProbeStream) -> i32 {
    let from_matrix = stream
        .side_data_list
        .iter()
        .filter(|d| d.side_data_type.as_deref() == Some("Display Matrix"))
        .find_map(|d| d.rotation)
        .map(|r| r.round() as i32);

    let from_tag = || {
        stream
            .tags
            .as_ref()
            .and_then(|t| t.rotate.as_deref())
            .and_then(|r| r.trim().parse::<i32>().ok())
    };

    from_matrix.or_else(from_tag).map(normalize_rotation).unwrap_or(0)
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}
