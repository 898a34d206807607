use crate::errors::ConfigurationError;
use crate::types::{CameraDeviceHandle, FlashMode, Position};
use serde::{Deserialize, Serialize};

/// Active device, zoom and flash for one capture session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub current_device: CameraDeviceHandle,
    /// Always within the current device's clamped zoom range
    pub current_zoom_factor: f64,
    /// Always `Off` when the current device has no flash
    pub flash_mode: FlashMode,
}

impl SelectionState {
    pub fn new(device: CameraDeviceHandle, zoom_factor: f64, flash_mode: FlashMode) -> Self {
        let current_zoom_factor = device.clamp_zoom(zoom_factor);
        let flash_mode = if device.has_flash {
            flash_mode
        } else {
            FlashMode::Off
        };
        Self {
            current_device: device,
            current_zoom_factor,
            flash_mode,
        }
    }

    pub fn position(&self) -> Position {
        self.current_device.position
    }
}

/// Read-only view published to observers after every mutation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    /// `None` while the engine is idle
    pub selection: Option<SelectionState>,
    pub running: bool,
    /// False after a failed switch left the session without any input
    pub input_attached: bool,
}

impl SelectionSnapshot {
    pub fn is_active(&self) -> bool {
        self.selection.is_some()
    }
}

/// Result of a device switch request.
///
/// Callers must inspect it: the current device only changes on `Success`.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchOutcome {
    Success,
    /// The new input was rejected and the previous device is attached again
    RestoredPreviousDevice { reason: ConfigurationError },
    /// Neither the new nor the previous device could be attached
    SessionUnavailable {
        reason: ConfigurationError,
        restore_error: Option<ConfigurationError>,
    },
}

impl SwitchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SwitchOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeviceKind;

    #[test]
    fn test_new_state_forces_flash_off_without_flash() {
        let device = CameraDeviceHandle::new("front", Position::Front, DeviceKind::TrueDepth, 70.0);
        let state = SelectionState::new(device, 1.0, FlashMode::On);
        assert_eq!(state.flash_mode, FlashMode::Off);
    }

    #[test]
    fn test_new_state_clamps_zoom() {
        let device = CameraDeviceHandle::new("wide", Position::Back, DeviceKind::WideAngle, 70.0)
            .with_zoom_range(1.0, 4.0)
            .with_flash(true);
        let state = SelectionState::new(device, 12.0, FlashMode::Auto);
        assert_eq!(state.current_zoom_factor, 4.0);
        assert_eq!(state.flash_mode, FlashMode::Auto);
        assert_eq!(state.position(), Position::Back);
    }
}
