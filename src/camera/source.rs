//! Frame sources: the trait the capture loop polls, and the nokhwa backend.

use std::time::Instant;

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;

use super::types::{CameraError, CameraSettings, Frame, PixelOrder, Resolution, SourceInfo};

/// A device that produces frames, one at a time, on demand.
///
/// The capture worker owns exactly one source for the lifetime of a
/// start/stop cycle and is the only caller of these methods, so
/// implementations never see concurrent reads. `close` is called exactly
/// once after a successful `open`, no matter how the worker shuts down.
pub trait FrameSource {
    /// Acquire the device and start its stream.
    fn open(&mut self) -> Result<SourceInfo, CameraError>;

    /// Read one frame in the device's native channel order.
    ///
    /// A failure here is not fatal: the worker skips the frame and polls
    /// again on the next tick.
    fn read_frame(&mut self) -> Result<Frame, CameraError>;

    /// Release the device.
    fn close(&mut self);
}

/// Creates a fresh source inside the capture worker.
///
/// The device handle never crosses threads: each start opens its own
/// source on the worker that will poll it.
pub type SourceFactory = dyn Fn() -> Box<dyn FrameSource> + Send + Sync;

/// Production frame source backed by a [`nokhwa::Camera`].
///
/// The camera is not created until `open` runs, so construction is cheap
/// and safe on any thread.
pub struct NokhwaSource {
    settings: CameraSettings,
    camera: Option<Camera>,
}

impl NokhwaSource {
    pub fn new(settings: CameraSettings) -> Self {
        Self {
            settings,
            camera: None,
        }
    }
}

impl FrameSource for NokhwaSource {
    fn open(&mut self) -> Result<SourceInfo, CameraError> {
        let index = CameraIndex::Index(self.settings.device_index);
        let mut camera = open_with_fallback(&index, &self.settings)?;

        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let res = camera.resolution();
        let info = SourceInfo {
            resolution: Resolution {
                width: res.width(),
                height: res.height(),
            },
            fps: camera.frame_rate(),
        };
        self.camera = Some(camera);
        Ok(info)
    }

    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CameraError::ReadFailed("stream not open".to_string()))?;

        let buffer = camera
            .frame()
            .map_err(|e| CameraError::ReadFailed(e.to_string()))?;

        // decode_image handles whatever the device delivers (MJPEG, YUYV,
        // NV12, ...) and hands back RGB.
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::ReadFailed(e.to_string()))?;
        let resolution = buffer.resolution();

        Ok(Frame {
            data: decoded.into_raw(),
            width: resolution.width(),
            height: resolution.height(),
            order: PixelOrder::Rgb,
            timestamp: Instant::now(),
        })
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::warn!("Failed to stop camera stream: {}", e);
            }
        }
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    let requested_res =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);

    // In order of preference: NV12 (native on macOS), MJPEG (widely
    // supported), then whatever the camera offers at its best resolution.
    let format_attempts: Vec<RequestedFormat> = vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_res,
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_res,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;

    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    let e = last_error.expect("at least one format attempt was made");
    let msg = e.to_string().to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
    {
        Err(CameraError::PermissionDenied)
    } else {
        Err(CameraError::OpenFailed(e.to_string()))
    }
}
