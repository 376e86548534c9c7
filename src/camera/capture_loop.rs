//! Background capture worker: the polling loop that moves frames from
//! the device to the shared latest-frame slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::frame_utils::{mirror_horizontal, to_display_order};
use super::source::SourceFactory;
use super::types::{CameraError, CameraSettings, Frame, SourceInfo};

/// How long the worker waits between polls. One poll per tick, at most.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Commands sent to the capture worker.
pub enum CaptureCommand {
    Stop,
}

/// Run the capture loop on a background thread.
///
/// Opens a source from the factory, reports its actual resolution/fps back
/// through `info_tx`, then polls one frame per tick until told to stop.
/// Successful frames are normalized to display order and stored in
/// `latest`; failed reads leave `latest` untouched and the loop simply
/// polls again on the next tick. The source is closed exactly once on the
/// way out.
pub fn run_capture_loop(
    settings: CameraSettings,
    make_source: Arc<SourceFactory>,
    latest: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    rx: Receiver<CaptureCommand>,
    info_tx: Sender<Result<SourceInfo, CameraError>>,
) {
    let mut source = make_source();

    let info = match source.open() {
        Ok(info) => info,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };
    let _ = info_tx.send(Ok(info));

    while !stop.load(Ordering::Relaxed) {
        // Check for commands (non-blocking)
        if let Ok(CaptureCommand::Stop) = rx.try_recv() {
            break;
        }

        match source.read_frame() {
            Ok(mut frame) => {
                to_display_order(&mut frame);
                if settings.mirror {
                    mirror_horizontal(&mut frame);
                }

                if let Ok(mut slot) = latest.lock() {
                    *slot = Some(frame);
                }
            }
            Err(e) => {
                // A dropped frame is routine; the next tick retries.
                log::debug!("Skipping frame: {}", e);
            }
        }

        thread::sleep(POLL_INTERVAL);
    }

    source.close();
}
