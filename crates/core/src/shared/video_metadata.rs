/// Stream facts about a source file, as reported by the probe.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    /// Coded width, before any display rotation.
    pub width: u32,
    pub height: u32,
    /// Seconds. `0.0` when the container does not report a duration.
    pub duration: f64,
    pub has_audio: bool,
    /// Display rotation in degrees: 0, 90, 180 or 270.
    pub rotation: i32,
}

impl VideoMetadata {
    /// Frame size after ffmpeg applies the display rotation on decode.
    pub fn display_dimensions(&self) -> (u32, u32) {
        match self.rotation {
            90 | 270 => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }
}

/// Normalizes an angle to one of 0, 90, 180, or 270.
pub fn normalize_rotation(angle: i32) -> i32 {
    match angle.rem_euclid(360) {
        0..=44 | 316..=359 => 0,
        45..=134 => 90,
        135..=224 => 180,
        _ => 270,
    }
}
