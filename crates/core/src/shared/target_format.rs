use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown target format '{0}' (expected mp4, mov, mkv, webm, avi or gif)")]
pub struct ParseFormatError(pub String);

/// Output container (or GIF) a batch converts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetFormat {
    #[default]
    Mp4,
    Mov,
    Mkv,
    Webm,
    Avi,
    Gif,
}

impl TargetFormat {
    pub const ALL: &[TargetFormat] = &[
        TargetFormat::Mp4,
        TargetFormat::Mov,
        TargetFormat::Mkv,
        TargetFormat::Webm,
        TargetFormat::Avi,
        TargetFormat::Gif,
    ];

    /// Canonical file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Mp4 => "mp4",
            TargetFormat::Mov => "mov",
            TargetFormat::Mkv => "mkv",
            TargetFormat::Webm => "webm",
            TargetFormat::Avi => "avi",
            TargetFormat::Gif => "gif",
        }
    }

    /// ffmpeg video encoder name. `None` for GIF, which goes through the
    /// palette filter graph instead.
    pub fn video_codec(self) -> Option<&'static str> {
        match self {
            TargetFormat::Mp4 | TargetFormat::Mov | TargetFormat::Mkv => Some("libx264"),
            TargetFormat::Webm => Some("libvpx"),
            TargetFormat::Avi => Some("mpeg4"),
            TargetFormat::Gif => None,
        }
    }

    /// ffmpeg audio encoder name. `None` when the format carries no audio.
    pub fn audio_codec(self) -> Option<&'static str> {
        match self {
            TargetFormat::Mp4 | TargetFormat::Mov | TargetFormat::Mkv => Some("aac"),
            TargetFormat::Webm | TargetFormat::Avi => Some("libvorbis"),
            TargetFormat::Gif => None,
        }
    }

    pub fn is_gif(self) -> bool {
        self == TargetFormat::Gif
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

impl FromStr for TargetFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.').to_lowercase();
        TargetFormat::ALL
            .iter()
            .copied()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| ParseFormatError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::mp4(TargetFormat::Mp4, "mp4", Some("libx264"), Some("aac"))]
    #[case::mov(TargetFormat::Mov, "mov", Some("libx264"), Some("aac"))]
    #[case::mkv(TargetFormat::Mkv, "mkv", Some("libx264"), Some("aac"))]
    #[case::webm(TargetFormat::Webm, "webm", Some("libvpx"), Some("libvorbis"))]
    #[case::avi(TargetFormat::Avi, "avi", Some("mpeg4"), Some("libvorbis"))]
    #[case::gif(TargetFormat::Gif, "gif", None, None)]
    fn test_codec_mapping(
        #[case] format: TargetFormat,
        #[case] ext: &str,
        #[case] video: Option<&str>,
        #[case] audio: Option<&str>,
    ) {
        assert_eq!(format.extension(), ext);
        assert_eq!(format.video_codec(), video);
        assert_eq!(format.audio_codec(), audio);
    }

    #[rstest]
    #[case("gif", TargetFormat::Gif)]
    #[case("MP4", TargetFormat::Mp4)]
    #[case(" WebM ", TargetFormat::Webm)]
    #[case(".mkv", TargetFormat::Mkv)]
    fn test_parse_is_case_insensitive(#[case] input: &str, #[case] expected: TargetFormat) {
        assert_eq!(input.parse::<TargetFormat>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_format_fails() {
        let err = "flv".parse::<TargetFormat>().unwrap_err();
        assert_eq!(err, ParseFormatError("flv".to_string()));
        assert!(err.to_string().contains("flv"));
    }

    #[test]
    fn test_display_is_upper_case_name() {
        assert_eq!(TargetFormat::Webm.to_string(), "WEBM");
        assert_eq!(TargetFormat::Gif.to_string(), "GIF");
    }

    #[test]
    fn test_only_gif_is_gif() {
        let gifs: Vec<_> = TargetFormat::ALL.iter().filter(|f| f.is_gif()).collect();
        assert_eq!(gifs, vec![&TargetFormat::Gif]);
    }

    #[test]
    fn test_default_is_mp4() {
        assert_eq!(TargetFormat::default(), TargetFormat::Mp4);
    }
}
