use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use iced::{Element, Subscription, Task, Theme};

use vidconvert_core::conversion::domain::conversion_job::BatchRequest;
use vidconvert_core::conversion::infrastructure::ffmpeg_binaries::FfmpegBinaries;
use vidconvert_core::pipeline::batch_result::BatchResult;
use vidconvert_core::pipeline::progress_event::{ProgressEvent, ProgressLevel, ProgressStage};
use vidconvert_core::shared::constants::{
    GIF_FPS_DEFAULT, GIF_MAX_WIDTH_DEFAULT, GIF_SCALE_DEFAULT,
};
use vidconvert_core::shared::gif_settings::GifSettings;
use vidconvert_core::shared::target_format::TargetFormat;

use crate::paths;
use crate::theme;
use crate::views;
use crate::workers::convert_worker::{self, ConvertParams, WorkerMessage};

const SPINNER: &[&str] = &["\u{25D0}", "\u{25D3}", "\u{25D1}", "\u{25D2}"];

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    SelectFiles,
    FilesSelected(Option<Vec<PathBuf>>),
    SelectOutputFolder,
    OutputFolderSelected(Option<PathBuf>),
    FormatChanged(TargetFormat),
    FpsChanged(u32),
    ScalePercentChanged(u32),
    MaxWidthChanged(u32),
    FullWidthToggled(bool),
    Convert,
    Cancel,
    Reset,
    ShowOutputFolder,
    Tick,
    PollSystemTheme,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// One line of the status log.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub message: String,
    pub level: ProgressLevel,
}

/// GIF controls as shown in the form; scale is a whole percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GifForm {
    pub fps: u32,
    pub scale_percent: u32,
    pub max_width: u32,
    pub full_width: bool,
}

impl Default for GifForm {
    fn default() -> Self {
        Self {
            fps: GIF_FPS_DEFAULT,
            scale_percent: (GIF_SCALE_DEFAULT * 100.0).round() as u32,
            max_width: GIF_MAX_WIDTH_DEFAULT,
            full_width: false,
        }
    }
}

impl GifForm {
    pub fn settings(&self) -> GifSettings {
        let max_width = (!self.full_width).then_some(self.max_width);
        GifSettings::new(self.fps, f64::from(self.scale_percent) / 100.0, max_width)
    }
}

struct RunningBatch {
    receiver: Receiver<WorkerMessage>,
    cancel: Arc<AtomicBool>,
}

pub struct App {
    pub selected_files: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: TargetFormat,
    pub gif: GifForm,
    pub status_log: Vec<LogLine>,
    /// Overall batch progress, 0-100.
    pub progress: f32,
    pub progress_label: String,
    /// Folder holding the last batch's converted files.
    pub finished_folder: Option<PathBuf>,
    pub cancel_requested: bool,
    last_input_dir: PathBuf,
    last_output_dir: PathBuf,
    binaries: FfmpegBinaries,
    running: Option<RunningBatch>,
    spinner_frame: usize,
    dark: bool,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let binaries = FfmpegBinaries::discover();
        let mut app = Self {
            selected_files: Vec::new(),
            output_dir: None,
            format: TargetFormat::default(),
            gif: GifForm::default(),
            status_log: Vec::new(),
            progress: 0.0,
            progress_label: String::new(),
            finished_folder: None,
            cancel_requested: false,
            last_input_dir: paths::default_browse_dir(),
            last_output_dir: paths::default_browse_dir(),
            binaries,
            running: None,
            spinner_frame: 0,
            dark: theme::system_prefers_dark(),
        };
        if !app.binaries.available() {
            log::warn!("ffmpeg not found at {}", app.binaries.ffmpeg.display());
            app.log(
                ProgressLevel::Error,
                "ffmpeg was not found. Install it or set VIDCONVERT_FFMPEG.",
            );
        }
        (app, Task::none())
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Label for the convert button, animated while a batch runs.
    pub fn convert_label(&self) -> String {
        if self.is_running() {
            let s = SPINNER[self.spinner_frame % SPINNER.len()];
            format!("{s}  Converting...  {s}")
        } else {
            "Convert Video(s)".to_string()
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectFiles => {
                let start_dir = self.last_input_dir.clone();
                return Task::perform(
                    async move {
                        let extensions = paths::dialog_extensions();
                        rfd::AsyncFileDialog::new()
                            .set_title("Select video files")
                            .add_filter("Video files", &extensions[..])
                            .set_directory(start_dir)
                            .pick_files()
                            .await
                            .map(|handles| {
                                handles.iter().map(|h| h.path().to_path_buf()).collect()
                            })
                    },
                    Message::FilesSelected,
                );
            }
            Message::FilesSelected(Some(files)) if !files.is_empty() => {
                if let Some(dir) = paths::remembered_dir(&files[0]) {
                    self.last_input_dir = dir;
                }
                self.log(
                    ProgressLevel::Info,
                    format!("Selected {} file(s) for conversion", files.len()),
                );
                self.selected_files = files;
            }
            Message::FilesSelected(_) => {}
            Message::SelectOutputFolder => {
                let start_dir = self
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| self.last_output_dir.clone());
                return Task::perform(
                    async move {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select output folder")
                            .set_directory(start_dir)
                            .pick_folder()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::OutputFolderSelected,
                );
            }
            Message::OutputFolderSelected(Some(dir)) => {
                self.log(
                    ProgressLevel::Info,
                    format!("Output folder: {}", dir.display()),
                );
                self.last_output_dir = dir.clone();
                self.output_dir = Some(dir);
            }
            Message::OutputFolderSelected(None) => {}
            Message::FormatChanged(format) => {
                self.format = format;
            }
            Message::FpsChanged(fps) => {
                self.gif.fps = fps;
            }
            Message::ScalePercentChanged(percent) => {
                self.gif.scale_percent = percent;
            }
            Message::MaxWidthChanged(width) => {
                self.gif.max_width = width;
            }
            Message::FullWidthToggled(enabled) => {
                self.gif.full_width = enabled;
            }
            Message::Convert => self.start_conversion(),
            Message::Cancel => {
                if let Some(running) = &self.running {
                    running.cancel.store(true, Ordering::Relaxed);
                    self.cancel_requested = true;
                    self.progress_label = "Cancelling after the current file...".to_string();
                }
            }
            Message::Reset => self.reset(),
            Message::ShowOutputFolder => {
                if let Some(dir) = &self.finished_folder {
                    if let Err(e) = open::that(dir) {
                        log::warn!("Failed to open {}: {e}", dir.display());
                    }
                }
            }
            Message::Tick => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
                self.drain_worker();
            }
            Message::PollSystemTheme => {
                self.dark = theme::system_prefers_dark();
            }
        }
        Task::none()
    }

    fn start_conversion(&mut self) {
        if self.is_running() {
            return;
        }
        if self.selected_files.is_empty() {
            self.log(
                ProgressLevel::Error,
                "Please select at least one video file to convert.",
            );
            return;
        }

        let gif = self.format.is_gif().then(|| self.gif.settings());
        let batch = BatchRequest::from_inputs(
            self.selected_files.iter(),
            self.format,
            self.output_dir.clone(),
            gif,
        );

        self.status_log.clear();
        self.log(
            ProgressLevel::Info,
            format!("Starting conversion to {}...", self.format),
        );
        self.progress = 0.0;
        self.progress_label = String::new();
        self.finished_folder = None;
        self.cancel_requested = false;
        self.spinner_frame = 0;

        let (receiver, cancel) = convert_worker::spawn(ConvertParams {
            batch,
            binaries: self.binaries.clone(),
        });
        self.running = Some(RunningBatch { receiver, cancel });
    }

    fn reset(&mut self) {
        if self.is_running() {
            self.log(
                ProgressLevel::Error,
                "Please wait for the current conversion to finish before resetting.",
            );
            return;
        }
        self.selected_files.clear();
        self.output_dir = None;
        self.format = TargetFormat::default();
        self.gif = GifForm::default();
        self.progress = 0.0;
        self.progress_label.clear();
        self.finished_folder = None;
        self.cancel_requested = false;
        self.status_log.clear();
        self.log(ProgressLevel::Info, "Form reset to defaults.");
    }

    fn drain_worker(&mut self) {
        let Some(running) = &self.running else {
            return;
        };

        let mut events = Vec::new();
        let mut finished = None;
        let mut lost = false;
        loop {
            match running.receiver.try_recv() {
                Ok(WorkerMessage::Progress(event)) => events.push(event),
                Ok(WorkerMessage::Finished(result)) => {
                    finished = Some(result);
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    lost = true;
                    break;
                }
            }
        }

        for event in events {
            self.apply_event(event);
        }
        if let Some(result) = finished {
            self.finish(&result);
        } else if lost {
            log::error!("Conversion worker stopped unexpectedly");
            self.log(ProgressLevel::Error, "Conversion stopped unexpectedly.");
            self.running = None;
        }
    }

    fn apply_event(&mut self, event: ProgressEvent) {
        self.progress = (event.overall_fraction() * 100.0) as f32;
        match event.stage {
            ProgressStage::Started => {
                if !self.cancel_requested {
                    self.progress_label =
                        format!("Converting {} of {}...", event.job_index + 1, event.total);
                }
            }
            // Encoder ticks only move the bar.
            ProgressStage::Encoding(_) => return,
            ProgressStage::Succeeded | ProgressStage::Failed | ProgressStage::BatchComplete => {}
        }
        self.log(event.level, event.message);
    }

    fn finish(&mut self, result: &BatchResult) {
        self.running = None;
        self.progress = 100.0;
        self.progress_label = if result.was_cancelled() {
            "Cancelled".to_string()
        } else {
            "\u{2713} Complete!".to_string()
        };
        self.finished_folder = result
            .succeeded
            .first()
            .and_then(|c| c.output.parent())
            .map(Path::to_path_buf);
    }

    fn log(&mut self, level: ProgressLevel, message: impl Into<String>) {
        self.status_log.push(LogLine {
            message: message.into(),
            level,
        });
    }

    pub fn view(&self) -> Element<'_, Message> {
        views::converter_view::view(self, &self.theme())
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.dark)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let theme_poll =
            iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme);
        if self.is_running() {
            Subscription::batch([
                theme_poll,
                iced::time::every(Duration::from_millis(100)).map(|_| Message::Tick),
            ])
        } else {
            theme_poll
        }
    }
}
