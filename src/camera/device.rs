//! Camera device enumeration and lookup.
//!
//! Backs `snapask list-cameras` and the `--camera <index>` selection flow:
//! enumeration feeds the printed listing, lookup validates the chosen index
//! before a capture handle is built.

use nokhwa::query;
use nokhwa::utils::ApiBackend;

use super::types::{CameraError, CameraInfo};

/// List every camera attached to the system.
///
/// An empty vector is a valid result here (`list-cameras` prints a hint in
/// that case); only the query itself failing is an error.
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

/// Look up the camera at `index` for capture.
///
/// Unlike [`list_devices`], having no cameras at all is an error here:
/// `CameraError::NoDevices` when nothing is attached,
/// `CameraError::DeviceNotFound` when cameras exist but none has this index.
pub fn find_device(index: u32) -> Result<CameraInfo, CameraError> {
    let devices = list_devices()?;
    if devices.is_empty() {
        return Err(CameraError::NoDevices);
    }
    devices
        .into_iter()
        .find(|d| d.index == index)
        .ok_or(CameraError::DeviceNotFound(index))
}
