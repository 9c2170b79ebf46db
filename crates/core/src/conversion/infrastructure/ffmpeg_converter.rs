use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::thread;

use crate::conversion::domain::conversion_error::ConversionError;
use crate::conversion::domain::media_converter::{ConversionRequest, MediaConverter};
use crate::conversion::domain::video_probe::VideoProbe;
use crate::conversion::infrastructure::ffmpeg_args::build_args;
use crate::conversion::infrastructure::ffmpeg_binaries::{hidden_command, FfmpegBinaries};
use crate::conversion::infrastructure::ffprobe_reader::FfprobeReader;

/// Number of trailing stderr lines kept in an encoder error.
const ERROR_TAIL_LINES: usize = 5;

/// Converts files by running the `ffmpeg` executable.
///
/// The encoder writes into a temporary file next to the final output; the
/// file is renamed into place only after ffmpeg exits successfully, so a
/// failed or interrupted job never leaves a truncated output behind.
pub struct FfmpegConverter {
    ffmpeg: PathBuf,
    probe: Box<dyn VideoProbe>,
}

impl FfmpegConverter {
    pub fn new(binaries: &FfmpegBinaries) -> Self {
        Self {
            ffmpeg: binaries.ffmpeg.clone(),
            probe: Box::new(FfprobeReader::new(binaries.ffprobe.clone())),
        }
    }

    pub fn with_probe(ffmpeg: impl Into<PathBuf>, probe: Box<dyn VideoProbe>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            probe,
        }
    }
}

impl MediaConverter for FfmpegConverter {
    fn convert(
        &mut self,
        request: &ConversionRequest,
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<(), ConversionError> {
        let metadata = self.probe.probe(&request.input)?;

        let dir = output_dir(&request.output);
        let suffix = format!(".{}", request.format.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix(".vidconvert-").suffix(&suffix);
        // Temp files default to 0600; outputs should look like any other file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }
        let temp = builder
            .tempfile_in(&dir)
            .map_err(|e| ConversionError::OutputDir {
                path: dir.clone(),
                source: e,
            })?
            .into_temp_path();

        let args = build_args(request, &metadata, &temp);
        log::debug!("Running {} {}", self.ffmpeg.display(), args.join(" "));

        run_ffmpeg(&self.ffmpeg, &args, metadata.duration, on_progress)?;

        // Dropping `temp` on any earlier return removes the partial file.
        temp.persist(&request.output)
            .map_err(|e| ConversionError::Persist {
                path: request.output.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}

fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn run_ffmpeg(
    program: &Path,
    args: &[String],
    duration: f64,
    on_progress: &mut dyn FnMut(f64),
) -> Result<(), ConversionError> {
    let mut child = hidden_command(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ConversionError::Launch {
            program: program.display().to_string(),
            source: e,
        })?;

    // Drain stderr on its own thread so a chatty encoder cannot block on a
    // full pipe while we read progress from stdout.
    let stderr_handle = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut text = String::new();
            let _ = stderr.read_to_string(&mut text);
            text
        })
    });

    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if let Some(fraction) = parse_progress_line(&line, duration) {
                on_progress(fraction);
            }
        }
    }

    let status = child
        .wait()
        .map_err(|e| ConversionError::Encoder(format!("ffmpeg process error: {e}")))?;
    let stderr = stderr_handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    if !status.success() {
        return Err(ConversionError::Encoder(failure_message(&stderr, status)));
    }

    on_progress(1.0);
    Ok(())
}

/// Encoded fraction from one `-progress` line, if it carries a timestamp.
///
/// ffmpeg emits both `out_time_us` and the misnamed `out_time_ms`; both are
/// microseconds. Unknown durations yield no progress.
pub fn parse_progress_line(line: &str, duration: f64) -> Option<f64> {
    if duration <= 0.0 {
        return None;
    }
    let (key, value) = line.trim().split_once('=')?;
    if key != "out_time_us" && key != "out_time_ms" {
        return None;
    }
    let micros = value.trim().parse::<f64>().ok()?;
    if !micros.is_finite() || micros < 0.0 {
        return None;
    }
    Some((micros / 1_000_000.0 / duration).clamp(0.0, 1.0))
}

/// The tail of ffmpeg's stderr, which is where it states the actual error.
fn failure_message(stderr: &str, status: ExitStatus) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return format!("ffmpeg exited with {status}");
    }
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}
