use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

#[cfg(any(target_os = "macos", target_os = "windows"))]
use vidconvert_core::conversion::infrastructure::ffmpeg_binaries::hidden_command;
use vidconvert_core::pipeline::progress_event::ProgressLevel;

/// Resolve the iced Theme for a light or dark system appearance.
pub fn resolve_theme(dark: bool) -> Theme {
    let palette = if dark { dark_palette() } else { light_palette() };
    Theme::custom("Video Converter", palette)
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xcc, 0xcc, 0xcc),
        primary: color!(0x2a, 0x7a, 0xe8),
        success: color!(0x2e, 0xcc, 0x71),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf5, 0xf5, 0xf7),
        text: color!(0x1d, 0x1d, 0x1f),
        primary: color!(0x2a, 0x7a, 0xe8),
        success: color!(0x27, 0xae, 0x60),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xff, 0x3b, 0x30),
    }
}

/// Secondary text such as hints and placeholder labels.
pub fn tertiary_color(theme: &Theme) -> Color {
    Color {
        a: 0.55,
        ..theme.palette().text
    }
}

/// Text colour for a status log line.
pub fn level_color(theme: &Theme, level: ProgressLevel) -> Color {
    let palette = theme.palette();
    match level {
        ProgressLevel::Info => palette.text,
        ProgressLevel::Success => palette.success,
        ProgressLevel::Error => palette.danger,
    }
}

/// Whether the operating system is in dark mode. Defaults to dark when the
/// setting can't be read.
pub fn system_prefers_dark() -> bool {
    #[cfg(target_os = "macos")]
    {
        hidden_command("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(target_os = "windows")]
    {
        // AppsUseLightTheme is 0x0 in dark mode.
        hidden_command("reg")
            .args([
                "query",
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize",
                "/v",
                "AppsUseLightTheme",
            ])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).contains("0x0"))
            .unwrap_or(true)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        std::env::var("GTK_THEME")
            .map(|t| !t.to_ascii_lowercase().contains("light"))
            .unwrap_or(true)
    }
}
