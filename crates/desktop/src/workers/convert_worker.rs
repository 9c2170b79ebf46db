use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use vidconvert_core::conversion::domain::conversion_job::BatchRequest;
use vidconvert_core::conversion::infrastructure::ffmpeg_binaries::FfmpegBinaries;
use vidconvert_core::conversion::infrastructure::ffmpeg_converter::FfmpegConverter;
use vidconvert_core::pipeline::batch_result::BatchResult;
use vidconvert_core::pipeline::convert_batch_use_case::ConvertBatchUseCase;
use vidconvert_core::pipeline::progress_event::ProgressEvent;

/// Messages sent from the worker thread to the UI.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Progress(ProgressEvent),
    Finished(BatchResult),
}

pub struct ConvertParams {
    pub batch: BatchRequest,
    pub binaries: FfmpegBinaries,
}

/// Spawn a background conversion worker. Returns the channel receiver and
/// cancellation token; cancelling takes effect before the next file.
pub fn spawn(params: ConvertParams) -> (Receiver<WorkerMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<WorkerMessage>();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || {
        let result = run_batch(&tx, cancelled_clone.clone(), params);
        if cancelled_clone.load(Ordering::Relaxed) {
            log::info!("Conversion cancelled by user");
        }
        let _ = tx.send(WorkerMessage::Finished(result));
    });

    (rx, cancelled)
}

fn run_batch(
    tx: &Sender<WorkerMessage>,
    cancelled: Arc<AtomicBool>,
    params: ConvertParams,
) -> BatchResult {
    let converter = FfmpegConverter::new(&params.binaries);
    let mut use_case = ConvertBatchUseCase::new(Box::new(converter), Some(cancelled));
    use_case.run(params.batch, &mut |event| {
        let _ = tx.send(WorkerMessage::Progress(event));
    })
}
