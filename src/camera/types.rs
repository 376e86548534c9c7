//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

use thiserror::Error;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Capture resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Channel ordering of a frame's pixel data.
///
/// Devices commonly deliver blue-green-red; the display side always wants
/// red-green-blue. [`super::frame_utils::to_display_order`] normalizes
/// between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOrder {
    /// Red-green-blue, the display ordering.
    Rgb,
    /// Blue-green-red, as emitted by many capture devices.
    Bgr,
}

/// One captured camera frame: a rectangular pixel grid, 3 bytes per pixel.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in the order given by `order`
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Channel ordering of `data`
    pub order: PixelOrder,
    /// Timestamp when the frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Bytes per pixel. Always 3 (one byte per channel).
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Number of bytes in one row of pixels.
    pub fn stride(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL
    }

    /// The buffer length a frame of these dimensions must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL
    }
}

/// What a frame source reports once its stream is up.
#[derive(Debug, Clone, Copy)]
pub struct SourceInfo {
    /// Resolution the device actually delivers (may differ from requested)
    pub resolution: Resolution,
    /// Frame rate the device actually delivers
    pub fps: u32,
}

/// Settings for camera capture.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Requested capture resolution
    pub resolution: Resolution,
    /// Requested frame rate (actual may vary)
    pub fps: u32,
    /// Mirror horizontally (selfie view)
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
            mirror: true,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("No cameras found")]
    NoDevices,

    #[error("Failed to query cameras: {0}")]
    QueryFailed(String),

    #[error("Camera device {0} not found. Run 'treescope list-devices' to see available devices")]
    DeviceNotFound(u32),

    #[error("Failed to open camera: {0}")]
    OpenFailed(String),

    #[error("Camera permission denied. Grant camera access in your system privacy settings")]
    PermissionDenied,

    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),

    #[error("Frame read failed: {0}")]
    ReadFailed(String),

    #[error("Capture is already running")]
    AlreadyRunning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_info_display() {
        let info = CameraInfo {
            index: 0,
            name: "Test Camera".to_string(),
            description: "Built-in".to_string(),
        };
        assert_eq!(format!("{}", info), "[0] Test Camera (Built-in)");
    }

    #[test]
    fn resolution_default_and_display() {
        let res = Resolution::default();
        assert_eq!(res.width, 640);
        assert_eq!(res.height, 480);
        assert_eq!(format!("{}", res), "640x480");
    }

    #[test]
    fn settings_default() {
        let settings = CameraSettings::default();
        assert_eq!(settings.device_index, 0);
        assert_eq!(settings.resolution, Resolution::default());
        assert_eq!(settings.fps, 30);
        assert!(settings.mirror);
    }

    #[test]
    fn frame_geometry() {
        let frame = Frame {
            data: vec![0; 12],
            width: 2,
            height: 2,
            order: PixelOrder::Rgb,
            timestamp: Instant::now(),
        };
        assert_eq!(frame.stride(), 6);
        assert_eq!(frame.expected_len(), 12);
        assert_eq!(frame.data.len(), frame.expected_len());
    }

    #[test]
    fn error_display() {
        assert_eq!(format!("{}", CameraError::NoDevices), "No cameras found");
        assert!(format!("{}", CameraError::DeviceNotFound(5)).contains("5"));
        assert!(format!("{}", CameraError::QueryFailed("boom".into())).contains("boom"));
        assert!(format!("{}", CameraError::PermissionDenied).contains("permission denied"));
        assert_eq!(
            format!("{}", CameraError::AlreadyRunning),
            "Capture is already running"
        );
    }
}
