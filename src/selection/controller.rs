//! Selection controller
//!
//! Owns the active device, zoom and flash state and performs device
//! hot-swaps against the capture session. A swap is one configuration
//! transaction: remove the current input, add the new one, and on failure
//! put the previous input back. The transaction is always committed before
//! returning.
//!
//! The controller is single-threaded by construction; [`crate::control`]
//! serializes access to it onto the camera control thread.

use super::events::{DeviceChangedEvent, EventBus};
use super::state::{SelectionSnapshot, SelectionState, SwitchOutcome};
use crate::catalog::CapabilityCatalog;
use crate::errors::{ConfigurationError, LensError};
use crate::presets::{self, ZOOM_EPSILON};
use crate::session::{ConfigurationTransaction, SessionAdapter};
use crate::types::{
    CameraDeviceHandle, CaptureRotation, CaptureSettings, DeviceKind, FlashMode, ImageBuffer,
    Position, ZoomPreset,
};
use std::sync::Arc;
use uuid::Uuid;

/// Pick the preset a fresh session starts on.
///
/// Prefers the preset labeled `display_zoom` at `position`, then the preset
/// served by the earliest reported device there (lowest label among equals),
/// then any device at `position`, then anything at all.
pub fn initial_preset(
    catalog: &CapabilityCatalog,
    position: Position,
    display_zoom: f64,
) -> Option<ZoomPreset> {
    let reported_rank = |preset: &&ZoomPreset| {
        catalog
            .devices()
            .iter()
            .position(|d| d.id == preset.target_device.id)
            .unwrap_or(usize::MAX)
    };

    let presets = presets::resolve(catalog, position);
    if let Some(preset) = presets
        .iter()
        .find(|p| (p.display_zoom - display_zoom).abs() < ZOOM_EPSILON)
        .or_else(|| presets.iter().min_by_key(reported_rank))
    {
        return Some(preset.clone());
    }

    let device = catalog
        .devices_at(position)
        .first()
        .copied()
        .or_else(|| catalog.devices().first())?;

    Some(ZoomPreset {
        display_zoom: 1.0,
        target_zoom_factor: device.clamp_zoom(1.0),
        target_device: device.clone(),
        is_virtual_zoom: false,
    })
}

/// Preset closest to 1x, preferring a physical wide-angle lens on ties
fn closest_to_one_x(presets: &[ZoomPreset]) -> Option<&ZoomPreset> {
    let is_physical_wide = |p: &ZoomPreset| p.target_device.device_kind == DeviceKind::WideAngle;

    let mut best: Option<&ZoomPreset> = None;
    for preset in presets {
        let distance = (preset.display_zoom - 1.0).abs();
        best = match best {
            None => Some(preset),
            Some(current) => {
                let current_distance = (current.display_zoom - 1.0).abs();
                if distance + ZOOM_EPSILON < current_distance
                    || ((distance - current_distance).abs() <= ZOOM_EPSILON
                        && is_physical_wide(preset)
                        && !is_physical_wide(current))
                {
                    Some(preset)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}

enum TransactionResult {
    Switched,
    Restored(ConfigurationError),
    Lost(ConfigurationError, Option<ConfigurationError>),
}

pub struct SelectionController<S: SessionAdapter> {
    session_id: Uuid,
    session: S,
    catalog: Arc<CapabilityCatalog>,
    state: Option<SelectionState>,
    input_attached: bool,
    running: bool,
    events: EventBus,
}

impl<S: SessionAdapter> SelectionController<S> {
    pub fn new(catalog: Arc<CapabilityCatalog>, session: S, events: EventBus) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            session,
            catalog,
            state: None,
            input_attached: false,
            running: false,
            events,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// `None` while idle
    pub fn state(&self) -> Option<&SelectionState> {
        self.state.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            selection: self.state.clone(),
            running: self.running,
            input_attached: self.input_attached,
        }
    }

    fn publish(&self) {
        self.events.publish(self.snapshot());
    }

    fn emit_device_changed(&self) {
        if let Some(state) = &self.state {
            self.events.emit_device_changed(DeviceChangedEvent {
                session_id: self.session_id,
                device: state.current_device.clone(),
                position: state.current_device.position,
                zoom_factor: state.current_zoom_factor,
                at: chrono::Utc::now(),
            });
        }
    }

    /// Leave `Idle`: pick the initial device and attach it to the session
    pub fn activate(
        &mut self,
        position: Position,
        display_zoom: f64,
        flash_mode: FlashMode,
    ) -> Result<(), LensError> {
        if self.state.is_some() {
            return Err(LensError::AlreadyStarted);
        }

        let preset = initial_preset(&self.catalog, position, display_zoom)
            .ok_or(LensError::CameraUnavailable(position))?;
        let device = preset.target_device.clone();

        {
            let mut txn = ConfigurationTransaction::begin(&mut self.session);
            txn.add_input(&device).map_err(|e| {
                log::error!("Failed to attach initial device {}: {}", device.id, e);
                LensError::SessionUnavailable(e)
            })?;
        }

        log::info!(
            "Activated {} at {}x (device zoom {})",
            device.id,
            preset.display_zoom,
            preset.target_zoom_factor
        );
        self.state = Some(SelectionState::new(device, preset.target_zoom_factor, flash_mode));
        self.input_attached = true;
        self.apply_zoom_to_current(preset.target_zoom_factor);
        self.publish();
        self.emit_device_changed();
        Ok(())
    }

    pub fn start_session(&mut self) -> Result<(), LensError> {
        if self.state.is_none() {
            return Err(LensError::NotStarted);
        }
        if self.running {
            return Err(LensError::AlreadyStarted);
        }
        self.session.start();
        self.running = true;
        log::info!("Capture session {} started", self.session_id);
        self.publish();
        Ok(())
    }

    pub fn stop_session(&mut self) -> Result<(), LensError> {
        if !self.running {
            return Err(LensError::NotStarted);
        }
        self.session.stop();
        self.running = false;
        log::info!("Capture session {} stopped", self.session_id);
        self.publish();
        Ok(())
    }

    /// Tear down: stop, detach the input and return to `Idle`
    pub fn deactivate(&mut self) {
        if self.running {
            self.session.stop();
            self.running = false;
        }
        if let Some(state) = self.state.take() {
            if self.input_attached {
                let mut txn = ConfigurationTransaction::begin(&mut self.session);
                txn.remove_input(&state.current_device);
            }
            log::info!("Capture session {} torn down", self.session_id);
        }
        self.input_attached = false;
        self.publish();
    }

    fn apply_zoom_to_current(&mut self, factor: f64) -> Option<f64> {
        let state = self.state.as_mut()?;
        let clamped = state.current_device.clamp_zoom(factor);
        if (clamped - factor).abs() > f64::EPSILON {
            log::debug!(
                "Zoom {} clamped to {} on {}",
                factor,
                clamped,
                state.current_device.id
            );
        }
        state.current_zoom_factor = clamped;
        self.session
            .set_zoom_factor(&state.current_device, clamped);
        Some(clamped)
    }

    /// Set the zoom factor on the current device, clamped to its range
    pub fn apply_zoom(&mut self, factor: f64) -> Result<f64, LensError> {
        let clamped = self.apply_zoom_to_current(factor).ok_or(LensError::NotStarted)?;
        self.publish();
        Ok(clamped)
    }

    /// Switch to a preset, reconfiguring the session when the device changes
    pub fn switch_to(&mut self, preset: &ZoomPreset) -> Result<SwitchOutcome, LensError> {
        let previous = match &self.state {
            Some(state) => state.current_device.clone(),
            None => return Err(LensError::NotStarted),
        };
        let target = &preset.target_device;

        if target.id == previous.id && self.input_attached {
            self.apply_zoom_to_current(preset.target_zoom_factor);
            self.publish();
            return Ok(SwitchOutcome::Success);
        }

        log::info!("Switching {} -> {}", previous.id, target.id);

        let had_input = self.input_attached;
        let result = {
            let mut txn = ConfigurationTransaction::begin(&mut self.session);
            if had_input {
                txn.remove_input(&previous);
            }
            match txn.add_input(target) {
                Ok(()) => TransactionResult::Switched,
                Err(reason) if had_input => {
                    log::warn!(
                        "Could not attach {}: {}; restoring {}",
                        target.id,
                        reason,
                        previous.id
                    );
                    match txn.add_input(&previous) {
                        Ok(()) => TransactionResult::Restored(reason),
                        Err(restore) => TransactionResult::Lost(reason, Some(restore)),
                    }
                }
                Err(reason) => TransactionResult::Lost(reason, None),
            }
        };

        let outcome = match result {
            TransactionResult::Switched => {
                if let Some(state) = self.state.as_mut() {
                    state.current_device = target.clone();
                    if !state.current_device.has_flash {
                        state.flash_mode = FlashMode::Off;
                    }
                }
                self.input_attached = true;
                self.apply_zoom_to_current(preset.target_zoom_factor);
                self.publish();
                self.emit_device_changed();
                SwitchOutcome::Success
            }
            TransactionResult::Restored(reason) => {
                self.input_attached = true;
                let zoom = self.state.as_ref().map(|s| s.current_zoom_factor);
                if let Some(zoom) = zoom {
                    self.apply_zoom_to_current(zoom);
                }
                self.publish();
                SwitchOutcome::RestoredPreviousDevice { reason }
            }
            TransactionResult::Lost(reason, restore_error) => {
                log::error!(
                    "Capture session lost its input: switch to {} failed ({}), restore of {} failed ({:?})",
                    target.id,
                    reason,
                    previous.id,
                    restore_error
                );
                self.input_attached = false;
                self.publish();
                SwitchOutcome::SessionUnavailable {
                    reason,
                    restore_error,
                }
            }
        };
        Ok(outcome)
    }

    /// Switch to the preset nearest 1x on the other side of the device
    pub fn flip_position(&mut self) -> Result<SwitchOutcome, LensError> {
        let position = self
            .state
            .as_ref()
            .map(|s| s.position().opposite())
            .ok_or(LensError::NotStarted)?;

        let presets = presets::resolve(&self.catalog, position);
        let preset = closest_to_one_x(&presets)
            .cloned()
            .ok_or(LensError::CameraUnavailable(position))?;

        log::debug!(
            "Flipping to {} via {} at {}x",
            position.as_str(),
            preset.target_device.id,
            preset.display_zoom
        );
        self.switch_to(&preset)
    }

    /// Cycle Off -> Auto -> On; ignored on devices without a flash
    pub fn toggle_flash(&mut self) -> Result<FlashMode, LensError> {
        let state = self.state.as_mut().ok_or(LensError::NotStarted)?;
        if state.current_device.has_flash {
            state.flash_mode = state.flash_mode.next();
            log::debug!("Flash mode now {:?}", state.flash_mode);
        }
        let mode = state.flash_mode;
        self.publish();
        Ok(mode)
    }

    /// Capture a still with the current device, zoom and flash
    pub fn capture(&mut self, rotation: CaptureRotation) -> Result<ImageBuffer, LensError> {
        let state = self.state.as_ref().ok_or(LensError::NotStarted)?;
        let settings = CaptureSettings {
            device_id: state.current_device.id.clone(),
            zoom_factor: state.current_zoom_factor,
            flash_mode: state.flash_mode,
            rotation,
        };
        Ok(self.session.capture(&settings)?)
    }

    /// Current device handle, if active
    pub fn current_device(&self) -> Option<&CameraDeviceHandle> {
        self.state.as_ref().map(|s| &s.current_device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{profiles, FakeSessionAdapter, SessionCall};

    fn controller(devices: Vec<CameraDeviceHandle>) -> (SelectionController<FakeSessionAdapter>, FakeSessionAdapter) {
        let fake = FakeSessionAdapter::new();
        let catalog = Arc::new(CapabilityCatalog::discover(devices));
        let controller = SelectionController::new(catalog, fake.clone(), EventBus::new(8));
        (controller, fake)
    }

    #[test]
    fn test_initial_preset_prefers_one_x() {
        let catalog = CapabilityCatalog::discover(profiles::triple_camera_phone());
        let preset = initial_preset(&catalog, Position::Back, 1.0).unwrap();
        assert_eq!(preset.target_device.id, "back-triple");
        assert_eq!(preset.display_zoom, 1.0);
        assert_eq!(preset.target_zoom_factor, 2.0);
    }

    #[test]
    fn test_initial_preset_falls_back_to_any_device() {
        let catalog = CapabilityCatalog::discover(profiles::single_camera_laptop());
        let preset = initial_preset(&catalog, Position::Back, 1.0).unwrap();
        assert_eq!(preset.target_device.id, "front-wide");
        assert!(initial_preset(&CapabilityCatalog::default(), Position::Back, 1.0).is_none());
    }

    #[test]
    fn test_operations_require_activation() {
        let (mut controller, fake) = controller(profiles::dual_camera_phone());
        assert!(matches!(controller.toggle_flash(), Err(LensError::NotStarted)));
        assert!(matches!(controller.apply_zoom(2.0), Err(LensError::NotStarted)));
        assert!(matches!(controller.flip_position(), Err(LensError::NotStarted)));
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_activate_attaches_input() {
        let (mut controller, fake) = controller(profiles::dual_camera_phone());
        controller.activate(Position::Back, 1.0, FlashMode::Auto).unwrap();
        assert_eq!(fake.attached_inputs(), vec!["back-dual".to_string()]);
        assert_eq!(fake.configuration_brackets(), (1, 1));
        assert_eq!(controller.state().unwrap().flash_mode, FlashMode::Auto);
        assert!(matches!(
            controller.activate(Position::Back, 1.0, FlashMode::Off),
            Err(LensError::AlreadyStarted)
        ));
    }

    #[test]
    fn test_activate_failure_is_session_unavailable() {
        let (mut controller, fake) = controller(profiles::dual_camera_phone());
        fake.fail_all_add_input();
        assert!(matches!(
            controller.activate(Position::Back, 1.0, FlashMode::Off),
            Err(LensError::SessionUnavailable(_))
        ));
        assert!(!controller.is_active());
        assert!(!fake.is_configuring());
    }

    #[test]
    fn test_same_device_switch_only_zooms() {
        let (mut controller, fake) = controller(profiles::dual_camera_phone());
        controller.activate(Position::Back, 1.0, FlashMode::Off).unwrap();
        fake.clear_calls();

        let presets = presets::resolve(controller.catalog(), Position::Back);
        let two_x = presets.iter().find(|p| p.display_zoom == 2.0).unwrap();
        let outcome = controller.switch_to(two_x).unwrap();

        assert_eq!(outcome, SwitchOutcome::Success);
        assert_eq!(fake.input_call_counts(), (0, 0));
        assert_eq!(
            fake.calls(),
            vec![SessionCall::SetZoomFactor("back-dual".to_string(), 2.0)]
        );
        assert_eq!(controller.state().unwrap().current_zoom_factor, 2.0);
    }

    #[test]
    fn test_switch_forces_flash_off() {
        let (mut controller, _fake) = controller(profiles::dual_camera_phone());
        controller.activate(Position::Back, 1.0, FlashMode::On).unwrap();
        let outcome = controller.flip_position().unwrap();
        assert!(outcome.is_success());
        let state = controller.state().unwrap();
        assert_eq!(state.current_device.id, "front-wide");
        assert_eq!(state.flash_mode, FlashMode::Off);
    }

    #[test]
    fn test_toggle_flash_cycles_and_ignores_flashless() {
        let (mut controller, _fake) = controller(profiles::dual_camera_phone());
        controller.activate(Position::Back, 1.0, FlashMode::Off).unwrap();
        assert_eq!(controller.toggle_flash().unwrap(), FlashMode::Auto);
        assert_eq!(controller.toggle_flash().unwrap(), FlashMode::On);
        assert_eq!(controller.toggle_flash().unwrap(), FlashMode::Off);

        controller.flip_position().unwrap();
        assert_eq!(controller.toggle_flash().unwrap(), FlashMode::Off);
    }

    #[test]
    fn test_initial_preset_without_label_match_uses_first_reported_device() {
        // Labels are 0.5x, 1x and 2.5x; back-wide is reported first.
        let catalog = CapabilityCatalog::discover(profiles::physical_only_phone());
        let preset = initial_preset(&catalog, Position::Back, 3.0).unwrap();
        assert_eq!(preset.target_device.id, "back-wide");

        let catalog = CapabilityCatalog::discover(profiles::triple_camera_phone());
        let preset = initial_preset(&catalog, Position::Back, 7.0).unwrap();
        assert_eq!(preset.target_device.id, "back-triple");
        assert_eq!(preset.display_zoom, 0.5);
    }

    fn preset_on(id: &str, kind: DeviceKind, display_zoom: f64) -> ZoomPreset {
        ZoomPreset {
            display_zoom,
            target_zoom_factor: 1.0,
            target_device: CameraDeviceHandle::new(id, Position::Back, kind, 70.0),
            is_virtual_zoom: false,
        }
    }

    #[test]
    fn test_closest_to_one_x_picks_nearest() {
        let catalog = CapabilityCatalog::discover(profiles::physical_only_phone());
        let presets = presets::resolve(&catalog, Position::Back);
        let preset = closest_to_one_x(&presets).unwrap();
        assert_eq!(preset.target_device.id, "back-wide");
    }

    #[test]
    fn test_closest_to_one_x_prefers_wide_on_tie() {
        let same_label = vec![
            preset_on("ultra", DeviceKind::UltraWide, 1.0),
            preset_on("wide", DeviceKind::WideAngle, 1.0),
        ];
        assert_eq!(closest_to_one_x(&same_label).unwrap().target_device.id, "wide");

        let same_distance = vec![
            preset_on("tele", DeviceKind::Telephoto, 0.5),
            preset_on("wide", DeviceKind::WideAngle, 1.5),
        ];
        assert_eq!(closest_to_one_x(&same_distance).unwrap().target_device.id, "wide");

        // Without a wide lens in the tie the earlier preset stays
        let no_wide = vec![
            preset_on("tele", DeviceKind::Telephoto, 0.5),
            preset_on("dual", DeviceKind::Dual, 1.5),
        ];
        assert_eq!(closest_to_one_x(&no_wide).unwrap().target_device.id, "tele");
    }

    #[test]
    fn test_deactivate_detaches_and_idles() {
        let (mut controller, fake) = controller(profiles::dual_camera_phone());
        controller.activate(Position::Back, 1.0, FlashMode::Off).unwrap();
        controller.start_session().unwrap();
        assert!(controller.session().is_running());
        controller.deactivate();

        assert!(!controller.is_active());
        assert!(!fake.is_running());
        assert!(fake.attached_inputs().is_empty());
        assert_eq!(controller.snapshot(), SelectionSnapshot::default());
    }
}
