//! CrabLens: lens capability normalization and camera switchover engine
//!
//! This crate turns the heterogeneous camera devices a platform reports
//! (physical lenses and multi-lens composites) into a consistent set of zoom
//! presets per camera position, and switches the active capture device at
//! runtime without leaving the capture session half-configured.
//!
//! # Features
//! - Deterministic zoom preset resolution ("0.5x", "1x", "2x", ...)
//! - Device hot-swap with rollback to the previous input on failure
//! - Serialized camera control queue with async handle
//! - Device-changed events and selection snapshots for observers
//! - Injectable session adapter for hardware-free testing
//!
//! # Usage
//! ```rust,ignore
//! use crablens::{CameraControl, CapabilityCatalog, Position};
//!
//! let catalog = CapabilityCatalog::discover(platform_devices);
//! let control = CameraControl::spawn(catalog, my_session, Default::default())?;
//! control.start().await?;
//!
//! let presets = control.presets(Position::Back);
//! let outcome = control.switch_to(presets[0].clone()).await?;
//! ```
pub mod catalog;
pub mod config;
pub mod control;
pub mod errors;
pub mod presets;
pub mod selection;
pub mod session;
pub mod types;

// Testing utilities - fake session adapter and device profiles
pub mod testing;

// Re-exports for convenience
pub use catalog::{CapabilityCatalog, DeviceSource, JsonDeviceSource};
pub use config::CrabLensConfig;
pub use control::CameraControl;
pub use errors::{CaptureError, ConfigurationError, LensError};
pub use presets::resolve;
pub use selection::{DeviceChangedEvent, SelectionSnapshot, SelectionState, SwitchOutcome};
pub use session::SessionAdapter;
pub use types::{
    CameraDeviceHandle, CaptureRotation, CaptureSettings, DeviceKind, FlashMode, ImageBuffer,
    Position, ZoomPreset,
};

/// Initialize logging for the lens engine
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "crablens=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}
