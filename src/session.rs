//! Capture session boundary
//!
//! The engine never talks to camera hardware directly. The host application
//! supplies a [`SessionAdapter`] and the selection controller drives it. The
//! adapter is only ever called from the camera control thread.

use crate::errors::{CaptureError, ConfigurationError};
use crate::types::{CameraDeviceHandle, CaptureSettings, ImageBuffer};
use std::ops::{Deref, DerefMut};

/// Thin interface over the platform capture session
pub trait SessionAdapter {
    /// Open a configuration bracket; no frames are delivered from a
    /// half-configured session until the matching commit.
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    fn add_input(&mut self, device: &CameraDeviceHandle) -> Result<(), ConfigurationError>;

    fn remove_input(&mut self, device: &CameraDeviceHandle);

    /// Apply an already clamped device-space zoom factor
    fn set_zoom_factor(&mut self, _device: &CameraDeviceHandle, _factor: f64) {}

    fn start(&mut self);

    fn stop(&mut self);

    fn capture(&mut self, settings: &CaptureSettings) -> Result<ImageBuffer, CaptureError>;
}

/// Open configuration bracket on a session.
///
/// Committed when dropped, so every exit path closes the bracket.
pub struct ConfigurationTransaction<'a, S: SessionAdapter + ?Sized> {
    session: &'a mut S,
}

impl<'a, S: SessionAdapter + ?Sized> ConfigurationTransaction<'a, S> {
    pub fn begin(session: &'a mut S) -> Self {
        log::trace!("Begin session configuration");
        session.begin_configuration();
        Self { session }
    }

    /// Commit explicitly; equivalent to dropping the transaction
    pub fn commit(self) {}
}

impl<S: SessionAdapter + ?Sized> Deref for ConfigurationTransaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.session
    }
}

impl<S: SessionAdapter + ?Sized> DerefMut for ConfigurationTransaction<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.session
    }
}

impl<S: SessionAdapter + ?Sized> Drop for ConfigurationTransaction<'_, S> {
    fn drop(&mut self) {
        self.session.commit_configuration();
        log::trace!("Committed session configuration");
    }
}
