use std::path::Path;

use crate::conversion::domain::media_converter::ConversionRequest;
use crate::shared::gif_settings::GifSettings;
use crate::shared::target_format::TargetFormat;
use crate::shared::video_metadata::VideoMetadata;

/// Command line for one ffmpeg run writing `request` to `output`.
///
/// `output` is passed separately from `request.output` so the encoder can
/// write to a temporary path first. Progress is requested on stdout as
/// `key=value` lines.
pub fn build_args(
    request: &ConversionRequest,
    metadata: &VideoMetadata,
    output: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = [
        "-hide_banner",
        "-nostdin",
        "-y",
        "-progress",
        "pipe:1",
        "-nostats",
        "-i",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push(request.input.to_string_lossy().into_owned());

    match (request.format.video_codec(), request.gif) {
        (Some(codec), _) => {
            args.extend(["-c:v".to_string(), codec.to_string()]);
            if codec == "libx264" {
                args.extend(["-pix_fmt".to_string(), "yuv420p".to_string()]);
            }
            match request.format.audio_codec() {
                Some(audio) if metadata.has_audio => {
                    args.extend(["-c:a".to_string(), audio.to_string()]);
                }
                _ => args.push("-an".to_string()),
            }
        }
        (None, gif) => {
            let settings = gif.unwrap_or_default().clamped();
            args.extend([
                "-filter_complex".to_string(),
                gif_filter(&settings, metadata),
                "-an".to_string(),
                "-loop".to_string(),
                "0".to_string(),
            ]);
        }
    }

    // Format is forced from the target so temp names never confuse the muxer.
    args.extend(["-f".to_string(), muxer_name(request).to_string()]);
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Frame-rate, resize and two-pass palette graph for GIF output.
pub fn gif_filter(settings: &GifSettings, metadata: &VideoMetadata) -> String {
    let (display_width, display_height) = metadata.display_dimensions();
    let (width, height) = settings.output_dimensions(display_width, display_height);
    format!(
        "fps={fps},scale={width}:{height}:flags=lanczos,split[s0][s1];\
         [s0]palettegen=stats_mode=diff[p];[s1][p]paletteuse=dither=bayer:bayer_scale=5",
        fps = settings.fps
    )
}

fn muxer_name(request: &ConversionRequest) -> &'static str {
    match request.format {
        TargetFormat::Mp4 => "mp4",
        TargetFormat::Mov => "mov",
        TargetFormat::Mkv => "matroska",
        TargetFormat::Webm => "webm",
        TargetFormat::Avi => "avi",
        TargetFormat::Gif => "gif",
    }
}
