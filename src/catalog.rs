//! Capability catalog
//!
//! Projects the flat device list reported by the host platform into the
//! handful of roles the preset resolver cares about: the composite back
//! anchor, the reference wide and ultra-wide back lenses, and the front
//! camera. Discovery is a pure function of the reported metadata.

use crate::errors::LensError;
use crate::presets;
use crate::types::{CameraDeviceHandle, DeviceKind, Position, ZoomPreset};
use std::fs;
use std::path::{Path, PathBuf};

/// Composite back devices, most capable first
const VIRTUAL_PRIORITY: [DeviceKind; 3] =
    [DeviceKind::Triple, DeviceKind::DualWide, DeviceKind::Dual];

/// Anything that can report the platform's camera devices
pub trait DeviceSource {
    fn devices(&self) -> Result<Vec<CameraDeviceHandle>, LensError>;
}

impl DeviceSource for Vec<CameraDeviceHandle> {
    fn devices(&self) -> Result<Vec<CameraDeviceHandle>, LensError> {
        Ok(self.clone())
    }
}

/// Device metadata snapshot stored as a JSON array of device handles
#[derive(Debug, Clone)]
pub struct JsonDeviceSource {
    path: PathBuf,
}

impl JsonDeviceSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeviceSource for JsonDeviceSource {
    fn devices(&self) -> Result<Vec<CameraDeviceHandle>, LensError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            LensError::DeviceSource(format!(
                "Failed to read device snapshot {:?}: {}",
                self.path, e
            ))
        })?;

        let devices: Vec<CameraDeviceHandle> = serde_json::from_str(&contents).map_err(|e| {
            LensError::DeviceSource(format!(
                "Failed to parse device snapshot {:?}: {}",
                self.path, e
            ))
        })?;

        log::info!("Loaded {} devices from {:?}", devices.len(), self.path);
        Ok(devices)
    }
}

/// Normalized view over the reported devices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityCatalog {
    devices: Vec<CameraDeviceHandle>,
    back_anchor: Option<CameraDeviceHandle>,
    reference_wide: Option<CameraDeviceHandle>,
    reference_ultra_wide: Option<CameraDeviceHandle>,
    front_device: Option<CameraDeviceHandle>,
}

impl CapabilityCatalog {
    /// Build the catalog from the devices the platform reported
    pub fn discover(devices: Vec<CameraDeviceHandle>) -> Self {
        let back_anchor = VIRTUAL_PRIORITY.iter().find_map(|kind| {
            devices
                .iter()
                .find(|d| d.position == Position::Back && d.device_kind == *kind)
                .cloned()
        });

        let find_back = |kind: DeviceKind| {
            devices
                .iter()
                .find(|d| d.position == Position::Back && d.device_kind == kind)
                .cloned()
        };
        let reference_wide = find_back(DeviceKind::WideAngle);
        let reference_ultra_wide = find_back(DeviceKind::UltraWide);

        let front: Vec<&CameraDeviceHandle> = devices
            .iter()
            .filter(|d| d.position == Position::Front)
            .collect();
        let front_device = front
            .iter()
            .find(|d| d.device_kind == DeviceKind::TrueDepth)
            .or_else(|| front.iter().find(|d| d.device_kind == DeviceKind::WideAngle))
            .or_else(|| front.first())
            .map(|d| (*d).clone());

        match &back_anchor {
            Some(anchor) => log::debug!(
                "Back anchor {} ({:?}), reference wide: {:?}, ultra-wide: {:?}",
                anchor.id,
                anchor.device_kind,
                reference_wide.as_ref().map(|d| d.id.as_str()),
                reference_ultra_wide.as_ref().map(|d| d.id.as_str())
            ),
            None => log::debug!("No composite back device; using physical back lenses"),
        }

        Self {
            devices,
            back_anchor,
            reference_wide,
            reference_ultra_wide,
            front_device,
        }
    }

    /// Build the catalog from a device source
    pub fn from_source<S: DeviceSource + ?Sized>(source: &S) -> Result<Self, LensError> {
        Ok(Self::discover(source.devices()?))
    }

    /// All reported devices, in reported order
    pub fn devices(&self) -> &[CameraDeviceHandle] {
        &self.devices
    }

    pub fn devices_at(&self, position: Position) -> Vec<&CameraDeviceHandle> {
        self.devices
            .iter()
            .filter(|d| d.position == position)
            .collect()
    }

    /// Physical (non-composite) back devices, in reported order
    pub fn physical_back_devices(&self) -> Vec<&CameraDeviceHandle> {
        self.devices
            .iter()
            .filter(|d| d.position == Position::Back && !d.is_virtual())
            .collect()
    }

    pub fn back_anchor(&self) -> Option<&CameraDeviceHandle> {
        self.back_anchor.as_ref()
    }

    pub fn reference_wide(&self) -> Option<&CameraDeviceHandle> {
        self.reference_wide.as_ref()
    }

    pub fn reference_ultra_wide(&self) -> Option<&CameraDeviceHandle> {
        self.reference_ultra_wide.as_ref()
    }

    pub fn front_device(&self) -> Option<&CameraDeviceHandle> {
        self.front_device.as_ref()
    }

    pub fn find(&self, id: &str) -> Option<&CameraDeviceHandle> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Resolve the zoom presets for a position
    pub fn presets(&self, position: Position) -> Vec<ZoomPreset> {
        presets::resolve(self, position)
    }
}
