//! Camera capture: the polling loop that moves frames from a device to
//! the display.
//!
//! - Device enumeration via [`list_devices`]
//! - Capture via [`CameraCapture`], which polls a [`FrameSource`] on a
//!   background worker and publishes the newest frame to a single shared
//!   slot
//! - Configuration via [`CameraSettings`] and [`Resolution`]

mod capture;
mod capture_loop;
mod device;
mod frame_utils;
mod source;
mod types;

pub use capture::CameraCapture;
pub use capture_loop::POLL_INTERVAL;
pub use device::list_devices;
pub use frame_utils::{mirror_horizontal, to_display_order};
pub use source::{FrameSource, NokhwaSource};
pub use types::{
    CameraError, CameraInfo, CameraSettings, Frame, PixelOrder, Resolution, SourceInfo,
};
