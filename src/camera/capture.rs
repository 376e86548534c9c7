//! Camera capture handle and public API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::capture_loop::{run_capture_loop, CaptureCommand};
use super::device::list_devices;
use super::source::{FrameSource, NokhwaSource, SourceFactory};
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Handle to a camera polled by a background worker.
///
/// The worker owns the device and continuously stores the newest frame in
/// a single shared slot (latest frame wins, no queueing). Call [`start`]
/// to begin capturing and [`latest_frame`] to read the slot. Dropping the
/// handle stops the worker and releases the device.
///
/// [`start`]: CameraCapture::start
/// [`latest_frame`]: CameraCapture::latest_frame
pub struct CameraCapture {
    /// Produces a fresh source inside each worker
    make_source: Arc<SourceFactory>,
    /// Newest captured frame (shared with the worker)
    latest: Arc<Mutex<Option<Frame>>>,
    /// Worker thread handle
    worker: Option<JoinHandle<()>>,
    /// Channel to send commands to the worker
    command_tx: Option<Sender<CaptureCommand>>,
    /// Signal for the worker to stop
    stop_signal: Arc<AtomicBool>,
    /// Current settings
    settings: CameraSettings,
    /// Actual resolution (set once the stream is up)
    actual_resolution: Option<Resolution>,
    /// Actual frame rate (set once the stream is up)
    actual_fps: Option<u32>,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Open a camera with the specified settings.
    ///
    /// Validates that the device exists but does not touch it yet; the
    /// device is acquired inside the worker when [`start`] runs.
    ///
    /// # Errors
    /// * `CameraError::DeviceNotFound` if the device index doesn't exist
    ///
    /// [`start`]: CameraCapture::start
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        let factory_settings = settings.clone();
        Ok(Self::with_source_factory(settings, move || {
            Box::new(NokhwaSource::new(factory_settings.clone()))
        }))
    }

    /// Build a capture handle over a custom [`FrameSource`] factory.
    ///
    /// This is the seam the resource tests use to count device
    /// opens/closes without hardware; production code goes through
    /// [`open`](CameraCapture::open).
    pub fn with_source_factory<F>(settings: CameraSettings, make_source: F) -> Self
    where
        F: Fn() -> Box<dyn FrameSource> + Send + Sync + 'static,
    {
        Self {
            make_source: Arc::new(make_source),
            latest: Arc::new(Mutex::new(None)),
            worker: None,
            command_tx: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            settings,
            actual_resolution: None,
            actual_fps: None,
        }
    }

    /// Get the current camera settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Resolution the device actually delivers, once started.
    pub fn actual_resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    /// Frame rate the device actually delivers, once started.
    pub fn actual_fps(&self) -> Option<u32> {
        self.actual_fps
    }

    /// Start capturing frames on a background worker.
    ///
    /// Blocks until the worker reports that the stream is up (or failed).
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` if capture is already running
    /// * `CameraError::StreamFailed` if the stream fails to start
    /// * `CameraError::PermissionDenied` if camera access is denied
    /// * `CameraError::OpenFailed` for other open failures
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        self.stop_signal.store(false, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel();
        self.command_tx = Some(tx);

        let make_source = Arc::clone(&self.make_source);
        let latest = Arc::clone(&self.latest);
        let stop = Arc::clone(&self.stop_signal);
        let settings = self.settings.clone();

        let (info_tx, info_rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            run_capture_loop(settings, make_source, latest, stop, rx, info_tx);
        });
        self.worker = Some(handle);

        // Wait for the worker to report success or failure.
        match info_rx.recv() {
            Ok(Ok(info)) => {
                self.actual_resolution = Some(info.resolution);
                self.actual_fps = Some(info.fps);
                Ok(())
            }
            Ok(Err(e)) => {
                self.join_worker();
                Err(e)
            }
            Err(_) => {
                self.join_worker();
                Err(CameraError::StreamFailed(
                    "Capture worker terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Stop the capture worker and wait for it to release the device.
    ///
    /// Safe to call when nothing is running, and safe to call more than
    /// once; the device is only ever released a single time per start.
    pub fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);

        // Also send a stop command in case the worker is mid-poll.
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(CaptureCommand::Stop);
        }

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    /// Read the newest captured frame, if any.
    ///
    /// Returns `None` before the first frame arrives. A failed poll never
    /// changes what this returns.
    pub fn latest_frame(&self) -> Option<Frame> {
        let slot = self.latest.lock().ok()?;
        slot.clone()
    }

    /// Whether the capture worker is currently running.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn join_worker(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(h) = self.worker.take() {
            let _ = h.join();
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_invalid_device_fails() {
        // A device index that is very unlikely to exist.
        let settings = CameraSettings {
            device_index: 999,
            ..CameraSettings::default()
        };
        let result = CameraCapture::open(settings);
        assert!(result.is_err());
        match result.unwrap_err() {
            CameraError::DeviceNotFound(idx) => assert_eq!(idx, 999),
            other => panic!("Expected DeviceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn latest_frame_empty_before_start() {
        let capture = CameraCapture::with_source_factory(CameraSettings::default(), || {
            panic!("factory must not run before start")
        });
        assert!(capture.latest_frame().is_none());
        assert!(!capture.is_running());
    }
}
