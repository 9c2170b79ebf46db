use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::conversion::domain::conversion_error::ConversionError;
use crate::conversion::domain::conversion_job::{BatchRequest, ConversionJob};
use crate::conversion::domain::media_converter::{ConversionRequest, MediaConverter};
use crate::pipeline::batch_result::{BatchResult, ConvertedFile, FailedConversion};
use crate::pipeline::progress_event::{ProgressEvent, ProgressLevel};

/// Runs a batch of conversions one file at a time.
///
/// Jobs execute strictly in order on the calling thread. Every job emits a
/// `Started` event followed by exactly one `Succeeded` or `Failed` event; a
/// failing job never stops the ones after it. The batch always finishes
/// with a `BatchComplete` event carrying the tally.
///
/// Cancellation is cooperative: the flag is checked between jobs, never
/// while the encoder is running.
pub struct ConvertBatchUseCase {
    converter: Box<dyn MediaConverter>,
    cancelled: Arc<AtomicBool>,
}

impl ConvertBatchUseCase {
    pub fn new(converter: Box<dyn MediaConverter>, cancelled: Option<Arc<AtomicBool>>) -> Self {
        Self {
            converter,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn run(
        &mut self,
        batch: BatchRequest,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> BatchResult {
        let total = batch.len();
        let mut result = BatchResult::default();
        // Output path -> index of the job that wrote it.
        let mut written: HashMap<PathBuf, usize> = HashMap::new();
        let mut jobs = batch.into_iter().enumerate();

        log::info!("Starting batch of {total} job(s)");

        while let Some((index, job)) = jobs.next() {
            if self.cancelled.load(Ordering::Relaxed) {
                log::info!("Batch cancelled before job {}", index + 1);
                result.skipped.push(job.input_path().to_path_buf());
                result
                    .skipped
                    .extend(jobs.by_ref().map(|(_, j)| j.input_path().to_path_buf()));
                break;
            }

            let name = display_name(job.input_path());
            on_progress(ProgressEvent::started(
                index,
                total,
                format!("Converting {name} ({} of {total})...", index + 1),
            ));

            let outcome = self.convert_job(index, &job, &mut written, &mut |fraction| {
                on_progress(ProgressEvent::encoding(
                    index,
                    total,
                    fraction,
                    format!("Encoding {name}: {:.0}%", fraction * 100.0),
                ));
            });

            match outcome {
                Ok(output) => {
                    log::info!("Converted {} -> {}", job.input_path().display(), output.display());
                    on_progress(ProgressEvent::succeeded(
                        index,
                        total,
                        format!("\u{2713} {name} \u{2192} {}", display_name(&output)),
                    ));
                    result.succeeded.push(ConvertedFile {
                        input: job.input_path().to_path_buf(),
                        output,
                    });
                }
                Err(e) => {
                    log::warn!("Failed to convert {}: {e}", job.input_path().display());
                    on_progress(ProgressEvent::failed(
                        index,
                        total,
                        format!("\u{2717} {name}: {e}"),
                    ));
                    result.failed.push(FailedConversion {
                        input: job.input_path().to_path_buf(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let summary = result.summary();
        log::info!("{summary}");
        let level = if !result.failed.is_empty() {
            ProgressLevel::Error
        } else if result.was_cancelled() {
            ProgressLevel::Info
        } else {
            ProgressLevel::Success
        };
        on_progress(ProgressEvent::batch_complete(total, level, summary));

        result
    }

    fn convert_job(
        &mut self,
        index: usize,
        job: &ConversionJob,
        written: &mut HashMap<PathBuf, usize>,
        on_encode: &mut dyn FnMut(f64),
    ) -> Result<PathBuf, ConversionError> {
        let input = job.input_path();
        if !input.exists() {
            return Err(ConversionError::InputNotFound);
        }
        if input.is_dir() {
            return Err(ConversionError::UnreadableInput(
                "input is a directory".to_string(),
            ));
        }

        let output = job.output_path();
        let output_dir = match output.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(dir) => dir,
            None => Path::new("."),
        };
        fs::create_dir_all(output_dir).map_err(|e| ConversionError::OutputDir {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

        // Compare resolved locations so `..`, symlinks and relative
        // spellings of the same file are caught.
        let input_key = fs::canonicalize(input)
            .map_err(|e| ConversionError::UnreadableInput(e.to_string()))?;
        let output_key =
            canonical_output(&output, output_dir).map_err(|e| ConversionError::OutputDir {
                path: output_dir.to_path_buf(),
                source: e,
            })?;
        if output_key == input_key || is_same_file(input, &output) {
            return Err(ConversionError::OutputIsInput(output));
        }
        if let Some(&earlier) = written.get(&output_key) {
            return Err(ConversionError::OutputCollision {
                path: output,
                earlier_job: earlier + 1,
            });
        }

        let request = ConversionRequest {
            input: input.to_path_buf(),
            output: output.clone(),
            format: job.target_format(),
            gif: job.gif().map(|g| g.clamped()),
        };
        log::debug!("Job {}: {:?}", index + 1, request);
        self.converter.convert(&request, on_encode)?;
        written.insert(output_key, index);
        Ok(output)
    }
}

/// Canonical form of an output path that may not exist yet. `dir` must
/// already exist.
fn canonical_output(output: &Path, dir: &Path) -> std::io::Result<PathBuf> {
    if output.exists() {
        return fs::canonicalize(output);
    }
    let name = output.file_name().unwrap_or_default();
    Ok(fs::canonicalize(dir)?.join(name))
}

/// Catches case-insensitive matches (`CLIP.MP4` vs `CLIP.mp4`) that
/// canonicalization leaves apart.
#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

// On Windows `canonicalize` already returns the on-disk casing of an
// existing file.
#[cfg(not(unix))]
fn is_same_file(_a: &Path, _b: &Path) -> bool {
    false
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::progress_event::ProgressStage;
    use crate::shared::gif_settings::GifSettings;
    use crate::shared::target_format::TargetFormat;
    use std::sync::Mutex;

    // --- Stubs ---

    /// Writes a small file to the requested output, or fails for inputs
    /// whose file name is listed in `fail_on`.
    struct StubConverter {
        requests: Arc<Mutex<Vec<ConversionRequest>>>,
        fail_on: Vec<String>,
        cancel_after_first: Option<Arc<AtomicBool>>,
    }

    impl StubConverter {
        fn new() -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                fail_on: Vec::new(),
                cancel_after_first: None,
            }
        }

        fn failing_on(mut self, name: &str) -> Self {
            self.fail_on.push(name.to_string());
            self
        }
    }

    impl MediaConverter for StubConverter {
        fn convert(
            &mut self,
            request: &ConversionRequest,
            on_progress: &mut dyn FnMut(f64),
        ) -> Result<(), ConversionError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(flag) = &self.cancel_after_first {
                flag.store(true, Ordering::Relaxed);
            }
            let name = display_name(&request.input);
            if self.fail_on.contains(&name) {
                return Err(ConversionError::Encoder(format!(
                    "{name}: Invalid data found when processing input"
                )));
            }
            on_progress(0.5);
            on_progress(1.0);
            fs::write(&request.output, b"converted").unwrap();
            Ok(())
        }
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"source").unwrap();
        path
    }

    fn run_batch(
        converter: StubConverter,
        batch: BatchRequest,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> (BatchResult, Vec<ProgressEvent>) {
        let mut use_case = ConvertBatchUseCase::new(Box::new(converter), cancelled);
        let mut events = Vec::new();
        let result = use_case.run(batch, &mut |e| events.push(e));
        (result, events)
    }

    fn stages(events: &[ProgressEvent]) -> Vec<(usize, ProgressStage)> {
        events
            .iter()
            .filter(|e| !matches!(e.stage, ProgressStage::Encoding(_)))
            .map(|e| (e.job_index, e.stage))
            .collect()
    }

    // --- Tests ---

    #[test]
    fn test_emits_start_and_outcome_per_job_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = vec![
            touch(dir.path(), "a.mov"),
            dir.path().join("missing.mov"),
            touch(dir.path(), "c.mov"),
        ];
        let batch = BatchRequest::from_inputs(inputs, TargetFormat::Mp4, None, None);

        let (result, events) = run_batch(StubConverter::new(), batch, None);

        assert_eq!(
            stages(&events),
            vec![
                (0, ProgressStage::Started),
                (0, ProgressStage::Succeeded),
                (1, ProgressStage::Started),
                (1, ProgressStage::Failed),
                (2, ProgressStage::Started),
                (2, ProgressStage::Succeeded),
                (3, ProgressStage::BatchComplete),
            ]
        );
        assert!(events.iter().all(|e| e.total == 3));
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn test_gif_and_missing_input_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let valid = touch(dir.path(), "valid.mp4");
        let missing = dir.path().join("missing.mp4");
        let batch = BatchRequest::new(vec![
            ConversionJob::new(&valid, TargetFormat::Gif, None, None),
            ConversionJob::new(&missing, TargetFormat::Mp4, None, None),
        ]);

        let (result, _) = run_batch(StubConverter::new(), batch, None);

        assert_eq!(result.succeeded_inputs(), vec![valid]);
        assert_eq!(
            result.failed,
            vec![FailedConversion {
                input: missing,
                error: "input not found".to_string(),
            }]
        );
        assert!(dir.path().join("valid.gif").exists());
    }

    #[test]
    fn test_outputs_written_beside_sources_without_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mov");
        let b = touch(dir.path(), "b.mov");
        let batch = BatchRequest::from_inputs([&a, &b], TargetFormat::Mp4, None, None);

        let (result, _) = run_batch(StubConverter::new(), batch, None);

        let outputs: Vec<_> = result.succeeded.iter().map(|c| c.output.clone()).collect();
        assert_eq!(
            outputs,
            vec![dir.path().join("a.mp4"), dir.path().join("b.mp4")]
        );
        assert!(outputs.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_failure_does_not_abort_batch_and_message_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let bad = touch(dir.path(), "bad.mov");
        let good = touch(dir.path(), "good.mov");
        let batch = BatchRequest::from_inputs([&bad, &good], TargetFormat::Webm, None, None);

        let (result, events) =
            run_batch(StubConverter::new().failing_on("bad.mov"), batch, None);

        assert_eq!(result.succeeded_inputs(), vec![good]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(
            result.failed[0].error,
            "bad.mov: Invalid data found when processing input"
        );
        let failed_event = events
            .iter()
            .find(|e| e.stage == ProgressStage::Failed)
            .unwrap();
        assert_eq!(failed_event.level, ProgressLevel::Error);
        assert!(failed_event.message.contains("Invalid data found"));
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "clip.mkv");
        let out_dir = dir.path().join("nested").join("out");
        let batch = BatchRequest::from_inputs(
            [&input],
            TargetFormat::Avi,
            Some(out_dir.clone()),
            None,
        );

        let (result, _) = run_batch(StubConverter::new(), batch, None);

        assert_eq!(result.succeeded[0].output, out_dir.join("clip.avi"));
        assert!(out_dir.join("clip.avi").exists());
    }

    #[test]
    fn test_unwritable_output_dir_fails_job() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "clip.mkv");
        // A regular file where the output directory should be.
        let blocker = touch(dir.path(), "blocker");
        let batch = BatchRequest::from_inputs(
            [&input],
            TargetFormat::Mp4,
            Some(blocker.join("out")),
            None,
        );

        let converter = StubConverter::new();
        let requests = converter.requests.clone();
        let (result, _) = run_batch(converter, batch, None);

        assert_eq!(result.failed.len(), 1);
        assert!(result.failed[0].error.contains("not writable"));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_directory_input_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("folder.mp4");
        fs::create_dir(&sub).unwrap();
        let batch = BatchRequest::from_inputs([&sub], TargetFormat::Mov, None, None);

        let (result, _) = run_batch(StubConverter::new(), batch, None);

        assert!(result.failed[0].error.contains("directory"));
    }

    #[test]
    fn test_same_format_in_place_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "clip.mp4");
        let batch = BatchRequest::from_inputs([&input], TargetFormat::Mp4, None, None);

        let (result, _) = run_batch(StubConverter::new(), batch, None);

        assert_eq!(result.failed.len(), 1);
        assert!(result.failed[0].error.contains("overwrite its own input"));
        assert_eq!(fs::read(&input).unwrap(), b"source");
    }

    #[test]
    fn test_output_dir_with_parent_component_cannot_overwrite_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "clip.mp4");
        fs::create_dir(dir.path().join("sub")).unwrap();
        let batch = BatchRequest::from_inputs(
            [&input],
            TargetFormat::Mp4,
            Some(dir.path().join("sub").join("..")),
            None,
        );

        let converter = StubConverter::new();
        let requests = converter.requests.clone();
        let (result, _) = run_batch(converter, batch, None);

        assert!(result.succeeded.is_empty());
        assert!(result.failed[0].error.contains("overwrite its own input"));
        assert!(requests.lock().unwrap().is_empty());
        assert_eq!(fs::read(&input).unwrap(), b"source");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_output_dir_cannot_overwrite_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "clip.mov");
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path(), &link).unwrap();
        let batch = BatchRequest::from_inputs([&input], TargetFormat::Mov, Some(link), None);

        let (result, _) = run_batch(StubConverter::new(), batch, None);

        assert!(result.failed[0].error.contains("overwrite its own input"));
        assert_eq!(fs::read(&input).unwrap(), b"source");
    }

    #[test]
    fn test_collision_detected_across_path_spellings() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("one")).unwrap();
        fs::create_dir(dir.path().join("two")).unwrap();
        let first = touch(&dir.path().join("one"), "clip.mov");
        let second = touch(&dir.path().join("two"), "clip.mkv");
        let out = dir.path().join("out");
        let batch = BatchRequest::new(vec![
            ConversionJob::new(&first, TargetFormat::Mp4, Some(out.clone()), None),
            ConversionJob::new(
                &second,
                TargetFormat::Mp4,
                Some(out.join("..").join("out")),
                None,
            ),
        ]);

        let (result, _) = run_batch(StubConverter::new(), batch, None);

        assert_eq!(result.succeeded_inputs(), vec![first]);
        assert!(result.failed[0].error.contains("collides with the output of job 1"));
        assert_eq!(fs::read(out.join("clip.mp4")).unwrap(), b"converted");
    }

    #[test]
    fn test_colliding_outputs_fail_later_job() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("one")).unwrap();
        fs::create_dir(dir.path().join("two")).unwrap();
        let first = touch(&dir.path().join("one"), "clip.mov");
        let second = touch(&dir.path().join("two"), "clip.mov");
        let out = dir.path().join("out");
        let batch =
            BatchRequest::from_inputs([&first, &second], TargetFormat::Mp4, Some(out), None);

        let (result, _) = run_batch(StubConverter::new(), batch, None);

        assert_eq!(result.succeeded_inputs(), vec![first]);
        assert_eq!(result.failed[0].input, second);
        assert!(result.failed[0].error.contains("collides with the output of job 1"));
    }

    #[test]
    fn test_collision_with_failed_job_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("one")).unwrap();
        fs::create_dir(dir.path().join("two")).unwrap();
        let first = touch(&dir.path().join("one"), "clip.mov");
        let second = touch(&dir.path().join("two"), "clip.mkv");
        let out = dir.path().join("out");
        let batch =
            BatchRequest::from_inputs([&first, &second], TargetFormat::Mp4, Some(out), None);

        let (result, _) =
            run_batch(StubConverter::new().failing_on("clip.mov"), batch, None);

        assert_eq!(result.succeeded_inputs(), vec![second]);
    }

    #[test]
    fn test_gif_parameters_reach_converter_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "clip.mov");
        let raw = GifSettings {
            fps: 5,
            scale: 1.5,
            max_width: None,
        };
        let batch = BatchRequest::from_inputs([&input], TargetFormat::Gif, None, Some(raw));

        let converter = StubConverter::new();
        let requests = converter.requests.clone();
        run_batch(converter, batch, None);

        let requests = requests.lock().unwrap();
        let gif = requests[0].gif.unwrap();
        assert_eq!(gif.fps, 10);
        assert_eq!(gif.scale, 1.0);
    }

    #[test]
    fn test_video_targets_get_no_gif_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "clip.mov");
        let batch = BatchRequest::from_inputs(
            [&input],
            TargetFormat::Mkv,
            None,
            Some(GifSettings::default()),
        );

        let converter = StubConverter::new();
        let requests = converter.requests.clone();
        run_batch(converter, batch, None);

        assert_eq!(requests.lock().unwrap()[0].gif, None);
    }

    #[test]
    fn test_encoding_events_sit_between_start_and_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let input = touch(dir.path(), "clip.mov");
        let batch = BatchRequest::from_inputs([&input], TargetFormat::Mp4, None, None);

        let (_, events) = run_batch(StubConverter::new(), batch, None);

        let kinds: Vec<_> = events.iter().map(|e| e.stage).collect();
        assert_eq!(
            kinds,
            vec![
                ProgressStage::Started,
                ProgressStage::Encoding(0.5),
                ProgressStage::Encoding(1.0),
                ProgressStage::Succeeded,
                ProgressStage::BatchComplete,
            ]
        );
        assert_eq!(events[1].message, "Encoding clip.mov: 50%");
    }

    #[test]
    fn test_cancellation_skips_remaining_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mov");
        let b = touch(dir.path(), "b.mov");
        let c = touch(dir.path(), "c.mov");
        let batch = BatchRequest::from_inputs([&a, &b, &c], TargetFormat::Mp4, None, None);

        let cancelled = Arc::new(AtomicBool::new(false));
        let mut converter = StubConverter::new();
        converter.cancel_after_first = Some(cancelled.clone());
        let (result, events) = run_batch(converter, batch, Some(cancelled));

        assert_eq!(result.succeeded_inputs(), vec![a]);
        assert_eq!(result.skipped, vec![b, c]);
        assert_eq!(result.total(), 3);
        assert_eq!(
            stages(&events),
            vec![
                (0, ProgressStage::Started),
                (0, ProgressStage::Succeeded),
                (3, ProgressStage::BatchComplete),
            ]
        );
        assert!(events.last().unwrap().message.contains("2 cancelled"));
    }

    #[test]
    fn test_empty_batch_still_completes() {
        let (result, events) = run_batch(StubConverter::new(), BatchRequest::default(), None);
        assert_eq!(result.total(), 0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, ProgressStage::BatchComplete);
        assert_eq!(events[0].level, ProgressLevel::Success);
    }

    #[test]
    fn test_rerun_yields_same_output_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.mov");
        let b = touch(dir.path(), "b.mkv");
        let batch = BatchRequest::from_inputs([&a, &b], TargetFormat::Webm, None, None);

        let (first, _) = run_batch(StubConverter::new(), batch.clone(), None);
        let (second, _) = run_batch(StubConverter::new(), batch, None);

        assert_eq!(first, second);
        assert_eq!(first.succeeded.len(), 2);
    }

    #[test]
    fn test_complete_event_level_reflects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let batch = BatchRequest::from_inputs(
            [dir.path().join("gone.mov")],
            TargetFormat::Mp4,
            None,
            None,
        );

        let (_, events) = run_batch(StubConverter::new(), batch, None);

        let last = events.last().unwrap();
        assert_eq!(last.level, ProgressLevel::Error);
        assert_eq!(last.message, "Conversion complete: 0/1 successful");
    }
}
