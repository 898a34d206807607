//! Scriptable in-memory session adapter

use crate::errors::{CaptureError, ConfigurationError};
use crate::session::SessionAdapter;
use crate::testing::synthetic_data::synthetic_image;
use crate::types::{CameraDeviceHandle, CaptureSettings, ImageBuffer};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// One call made against the adapter, in order
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    BeginConfiguration,
    CommitConfiguration,
    AddInput(String),
    RemoveInput(String),
    SetZoomFactor(String, f64),
    Start,
    Stop,
    Capture(CaptureSettings),
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<SessionCall>,
    inputs: Vec<String>,
    failing_inputs: BTreeSet<String>,
    fail_all_inputs: bool,
    fail_capture: bool,
    configuration_depth: u32,
    running: bool,
    captures: u64,
}

/// Session adapter that records every call and fails on request.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct FakeSessionAdapter {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSessionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `add_input` fail for the given device id
    pub fn fail_add_input_for(&self, device_id: &str) {
        self.state
            .lock()
            .expect("lock poisoned")
            .failing_inputs
            .insert(device_id.to_string());
    }

    /// Make every `add_input` fail
    pub fn fail_all_add_input(&self) {
        self.state.lock().expect("lock poisoned").fail_all_inputs = true;
    }

    pub fn fail_capture(&self) {
        self.state.lock().expect("lock poisoned").fail_capture = true;
    }

    /// Clear all injected failures
    pub fn heal(&self) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.failing_inputs.clear();
        state.fail_all_inputs = false;
        state.fail_capture = false;
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.state.lock().expect("lock poisoned").calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().expect("lock poisoned").calls.clear();
    }

    /// Device ids currently attached as inputs
    pub fn attached_inputs(&self) -> Vec<String> {
        self.state.lock().expect("lock poisoned").inputs.clone()
    }

    pub fn is_configuring(&self) -> bool {
        self.state.lock().expect("lock poisoned").configuration_depth > 0
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().expect("lock poisoned").running
    }

    /// Number of (begin, commit) calls recorded
    pub fn configuration_brackets(&self) -> (usize, usize) {
        let state = self.state.lock().expect("lock poisoned");
        let begins = state
            .calls
            .iter()
            .filter(|c| matches!(c, SessionCall::BeginConfiguration))
            .count();
        let commits = state
            .calls
            .iter()
            .filter(|c| matches!(c, SessionCall::CommitConfiguration))
            .count();
        (begins, commits)
    }

    /// Recorded (add, remove) input call counts
    pub fn input_call_counts(&self) -> (usize, usize) {
        let state = self.state.lock().expect("lock poisoned");
        let adds = state
            .calls
            .iter()
            .filter(|c| matches!(c, SessionCall::AddInput(_)))
            .count();
        let removes = state
            .calls
            .iter()
            .filter(|c| matches!(c, SessionCall::RemoveInput(_)))
            .count();
        (adds, removes)
    }
}

impl SessionAdapter for FakeSessionAdapter {
    fn begin_configuration(&mut self) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(SessionCall::BeginConfiguration);
        state.configuration_depth += 1;
    }

    fn commit_configuration(&mut self) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(SessionCall::CommitConfiguration);
        state.configuration_depth = state.configuration_depth.saturating_sub(1);
    }

    fn add_input(&mut self, device: &CameraDeviceHandle) -> Result<(), ConfigurationError> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(SessionCall::AddInput(device.id.clone()));

        if state.fail_all_inputs || state.failing_inputs.contains(&device.id) {
            return Err(ConfigurationError::DeviceBusy(device.id.clone()));
        }
        if state.inputs.contains(&device.id) {
            return Err(ConfigurationError::InputRejected(format!(
                "{} already attached",
                device.id
            )));
        }
        state.inputs.push(device.id.clone());
        Ok(())
    }

    fn remove_input(&mut self, device: &CameraDeviceHandle) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(SessionCall::RemoveInput(device.id.clone()));
        state.inputs.retain(|id| id != &device.id);
    }

    fn set_zoom_factor(&mut self, device: &CameraDeviceHandle, factor: f64) {
        let mut state = self.state.lock().expect("lock poisoned");
        state
            .calls
            .push(SessionCall::SetZoomFactor(device.id.clone(), factor));
    }

    fn start(&mut self) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(SessionCall::Start);
        state.running = true;
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(SessionCall::Stop);
        state.running = false;
    }

    fn capture(&mut self, settings: &CaptureSettings) -> Result<ImageBuffer, CaptureError> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.calls.push(SessionCall::Capture(settings.clone()));

        if state.fail_capture {
            return Err(CaptureError::Failed("injected capture failure".to_string()));
        }
        if !state.inputs.contains(&settings.device_id) {
            return Err(CaptureError::NoActiveInput);
        }

        state.captures += 1;
        Ok(synthetic_image(state.captures, 64, 48, &settings.device_id))
    }
}
