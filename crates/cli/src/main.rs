use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use vidconvert_core::conversion::domain::conversion_job::BatchRequest;
use vidconvert_core::conversion::infrastructure::ffmpeg_binaries::FfmpegBinaries;
use vidconvert_core::conversion::infrastructure::ffmpeg_converter::FfmpegConverter;
use vidconvert_core::pipeline::convert_batch_use_case::ConvertBatchUseCase;
use vidconvert_core::pipeline::progress_event::{ProgressEvent, ProgressStage};
use vidconvert_core::shared::constants::{
    GIF_FPS_DEFAULT, GIF_MAX_WIDTH_DEFAULT, GIF_SCALE_DEFAULT,
};
use vidconvert_core::shared::gif_settings::GifSettings;
use vidconvert_core::shared::target_format::TargetFormat;

/// Batch conversion of videos to other containers or animated GIFs.
#[derive(Parser)]
#[command(name = "vidconvert")]
struct Cli {
    /// Input video files, converted in the order given.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Target format: mp4, mov, mkv, webm, avi or gif.
    #[arg(short, long, default_value = "mp4")]
    format: TargetFormat,

    /// Output directory (default: next to each input).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// GIF frame rate (10-30).
    #[arg(long, default_value_t = GIF_FPS_DEFAULT)]
    fps: u32,

    /// GIF resolution scale (0.5-1.0).
    #[arg(long, default_value_t = GIF_SCALE_DEFAULT)]
    scale: f64,

    /// GIF maximum width in pixels (400-1400).
    #[arg(long, default_value_t = GIF_MAX_WIDTH_DEFAULT)]
    max_width: u32,

    /// Keep the source width for GIFs instead of capping it.
    #[arg(long)]
    full_width: bool,

    /// Path to the ffmpeg executable.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable.
    #[arg(long)]
    ffprobe: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Returns whether every job converted.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let binaries = build_binaries(&cli);
    if !binaries.available() {
        return Err(format!(
            "ffmpeg not found at '{}' (install it or pass --ffmpeg)",
            binaries.ffmpeg.display()
        )
        .into());
    }
    log::info!(
        "Using {} and {}",
        binaries.ffmpeg.display(),
        binaries.ffprobe.display()
    );

    let output_dir = cli
        .output_dir
        .as_deref()
        .map(std::path::absolute)
        .transpose()?;
    let gif = cli.format.is_gif().then(|| gif_settings(&cli));
    let batch = BatchRequest::from_inputs(cli.inputs, cli.format, output_dir, gif);
    log::info!("Selected {} file(s) for conversion", batch.len());

    let converter = FfmpegConverter::new(&binaries);
    let mut use_case = ConvertBatchUseCase::new(Box::new(converter), None);
    let mut encoding_line = false;
    let result = use_case.run(batch, &mut |event| print_event(&event, &mut encoding_line));

    Ok(result.all_succeeded())
}

fn build_binaries(cli: &Cli) -> FfmpegBinaries {
    let mut binaries = FfmpegBinaries::discover();
    if let Some(path) = &cli.ffmpeg {
        binaries = binaries.with_ffmpeg(path);
    }
    if let Some(path) = &cli.ffprobe {
        binaries = binaries.with_ffprobe(path);
    }
    binaries
}

fn gif_settings(cli: &Cli) -> GifSettings {
    let max_width = (!cli.full_width).then_some(cli.max_width);
    GifSettings::new(cli.fps, cli.scale, max_width)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.scale.is_finite() {
        return Err(format!("Scale must be a number, got {}", cli.scale).into());
    }
    if let Some(dir) = &cli.output_dir {
        if dir.exists() && !dir.is_dir() {
            return Err(format!("Output path is not a directory: {}", dir.display()).into());
        }
    }
    Ok(())
}

/// Encoder progress overwrites a single line; everything else gets its own.
fn print_event(event: &ProgressEvent, encoding_line: &mut bool) {
    if let ProgressStage::Encoding(_) = event.stage {
        eprint!("\r{}", event.message);
        let _ = std::io::stderr().flush();
        *encoding_line = true;
        return;
    }
    if std::mem::take(encoding_line) {
        eprintln!();
    }
    eprintln!("{}", event.message);
}
