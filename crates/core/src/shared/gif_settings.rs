use crate::shared::constants::{
    GIF_FPS_DEFAULT, GIF_FPS_MAX, GIF_FPS_MIN, GIF_MAX_WIDTH_DEFAULT, GIF_MAX_WIDTH_MAX,
    GIF_MAX_WIDTH_MIN, GIF_SCALE_DEFAULT, GIF_SCALE_MAX, GIF_SCALE_MIN,
};

/// Quality knobs that only apply when converting to GIF.
///
/// Values outside the supported ranges are clamped rather than rejected, so
/// a `GifSettings` obtained through [`GifSettings::new`] or
/// [`GifSettings::clamped`] is always safe to hand to the encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GifSettings {
    /// Output frame rate.
    pub fps: u32,
    /// Resolution multiplier applied to the source dimensions.
    pub scale: f64,
    /// Width cap applied after scaling. `None` keeps the full width.
    pub max_width: Option<u32>,
}

impl GifSettings {
    pub fn new(fps: u32, scale: f64, max_width: Option<u32>) -> Self {
        Self {
            fps,
            scale,
            max_width,
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        let scale = if self.scale.is_nan() {
            GIF_SCALE_DEFAULT
        } else {
            self.scale.clamp(GIF_SCALE_MIN, GIF_SCALE_MAX)
        };
        Self {
            fps: self.fps.clamp(GIF_FPS_MIN, GIF_FPS_MAX),
            scale,
            max_width: self
                .max_width
                .map(|w| w.clamp(GIF_MAX_WIDTH_MIN, GIF_MAX_WIDTH_MAX)),
        }
    }

    /// Output frame size for a source of `width` x `height`.
    ///
    /// Scaling happens first, then the width cap. Every resized dimension is
    /// even so libavfilter's scaler accepts it; an untouched source keeps its
    /// own dimensions.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let (mut w, mut h) = (width, height);

        if self.scale < 1.0 {
            w = normalize_dimension(f64::from(width) * self.scale);
            h = normalize_dimension(f64::from(height) * self.scale);
        }

        if let Some(max_width) = self.max_width {
            if w > max_width {
                let ratio = f64::from(max_width) / f64::from(w);
                h = normalize_dimension(f64::from(h) * ratio);
                w = normalize_dimension(f64::from(max_width));
            }
        }

        (w, h)
    }
}

impl Default for GifSettings {
    fn default() -> Self {
        Self {
            fps: GIF_FPS_DEFAULT,
            scale: GIF_SCALE_DEFAULT,
            max_width: Some(GIF_MAX_WIDTH_DEFAULT),
        }
    }
}

/// Round to the nearest integer, drop to the even number below if odd, and
/// never go under 2.
pub fn normalize_dimension(value: f64) -> u32 {
    let rounded = value.round().max(0.0) as u32;
    let even = if rounded % 2 != 0 { rounded - 1 } else { rounded };
    even.max(2)
}
