//! Core device and preset types
//!
//! Everything here is plain data: device metadata as reported by the host
//! platform, the user-facing zoom presets derived from it, and the settings
//! handed to the session adapter on capture.

use serde::{Deserialize, Serialize};

/// Lowest device-space zoom factor the engine will ever apply.
pub const MIN_ZOOM_FLOOR: f64 = 0.5;

/// Physical mounting position of a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Front,
    Back,
}

impl Position {
    /// The position on the other side of the device
    pub fn opposite(self) -> Self {
        match self {
            Position::Front => Position::Back,
            Position::Back => Position::Front,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Front => "front",
            Position::Back => "back",
        }
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" => Ok(Position::Front),
            "back" => Ok(Position::Back),
            other => Err(format!("unknown camera position: {other}")),
        }
    }
}

/// Lens kind of a capture device
///
/// `DualWide`, `Dual` and `Triple` are composite devices that route between
/// several physical lenses as the zoom factor changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    WideAngle,
    UltraWide,
    Telephoto,
    TrueDepth,
    DualWide,
    Dual,
    Triple,
}

impl DeviceKind {
    pub fn is_virtual(&self) -> bool {
        matches!(self, DeviceKind::DualWide | DeviceKind::Dual | DeviceKind::Triple)
    }

    /// Whether one of the lenses behind this kind is an ultra-wide
    pub fn has_ultra_wide_constituent(&self) -> bool {
        matches!(
            self,
            DeviceKind::UltraWide | DeviceKind::DualWide | DeviceKind::Triple
        )
    }
}

/// Static description of a physical or composite capture device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDeviceHandle {
    pub id: String,
    pub position: Position,
    pub device_kind: DeviceKind,
    pub field_of_view_degrees: f64,
    pub min_zoom_factor: f64,
    pub max_zoom_factor: f64,
    #[serde(default)]
    pub switch_over_zoom_factors: Vec<f64>,
    #[serde(default)]
    pub secondary_native_resolution_zoom_factors: Vec<f64>,
    #[serde(default)]
    pub upscale_threshold_zoom_factor: Option<f64>,
    #[serde(default)]
    pub has_flash: bool,
}

impl CameraDeviceHandle {
    /// Create a device with a 1.0..=max zoom range and no lens metadata
    pub fn new(
        id: impl Into<String>,
        position: Position,
        device_kind: DeviceKind,
        field_of_view_degrees: f64,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            device_kind,
            field_of_view_degrees,
            min_zoom_factor: 1.0,
            max_zoom_factor: 10.0,
            switch_over_zoom_factors: Vec::new(),
            secondary_native_resolution_zoom_factors: Vec::new(),
            upscale_threshold_zoom_factor: None,
            has_flash: false,
        }
    }

    pub fn with_zoom_range(mut self, min: f64, max: f64) -> Self {
        self.min_zoom_factor = min;
        self.max_zoom_factor = max;
        self
    }

    pub fn with_switch_over_factors(mut self, factors: Vec<f64>) -> Self {
        self.switch_over_zoom_factors = factors;
        self
    }

    pub fn with_secondary_native_factors(mut self, factors: Vec<f64>) -> Self {
        self.secondary_native_resolution_zoom_factors = factors;
        self
    }

    pub fn with_upscale_threshold(mut self, factor: f64) -> Self {
        self.upscale_threshold_zoom_factor = Some(factor);
        self
    }

    pub fn with_flash(mut self, has_flash: bool) -> Self {
        self.has_flash = has_flash;
        self
    }

    pub fn is_virtual(&self) -> bool {
        self.device_kind.is_virtual()
    }

    /// Minimum zoom factor, floored at [`MIN_ZOOM_FLOOR`]
    pub fn effective_min_zoom(&self) -> f64 {
        if self.min_zoom_factor.is_finite() {
            self.min_zoom_factor.max(MIN_ZOOM_FLOOR)
        } else {
            MIN_ZOOM_FLOOR
        }
    }

    /// Maximum zoom factor, never below [`Self::effective_min_zoom`]
    pub fn effective_max_zoom(&self) -> f64 {
        let min = self.effective_min_zoom();
        if self.max_zoom_factor.is_finite() {
            self.max_zoom_factor.max(min)
        } else {
            min
        }
    }

    /// Clamp a requested factor into this device's usable zoom range.
    ///
    /// Out-of-range and non-finite requests are clamped, never rejected.
    pub fn clamp_zoom(&self, factor: f64) -> f64 {
        let min = self.effective_min_zoom();
        let max = self.effective_max_zoom();
        if factor.is_nan() {
            return min;
        }
        factor.clamp(min, max)
    }

    /// Switch-over thresholds that are valid (finite and above 1.0), ascending
    pub fn valid_switch_overs(&self) -> Vec<f64> {
        let mut factors: Vec<f64> = self
            .switch_over_zoom_factors
            .iter()
            .copied()
            .filter(|f| f.is_finite() && *f > 1.0)
            .collect();
        factors.sort_by(f64::total_cmp);
        factors
    }
}

/// A user-facing zoom option bound to a concrete device and zoom factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomPreset {
    /// Label value, e.g. 0.5, 1.0, 2.0
    pub display_zoom: f64,
    /// Device-space factor applied to `target_device`
    pub target_zoom_factor: f64,
    pub target_device: CameraDeviceHandle,
    /// Set when the target is a composite device and the factor was synthesized
    pub is_virtual_zoom: bool,
}

impl ZoomPreset {
    /// Label as shown in the UI, e.g. "0.5x" or "2x"
    pub fn label(&self) -> String {
        if (self.display_zoom - self.display_zoom.round()).abs() < 0.05 {
            format!("{}x", self.display_zoom.round() as i64)
        } else {
            format!("{:.1}x", self.display_zoom)
        }
    }
}

/// Flash mode for still capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlashMode {
    #[default]
    Off,
    Auto,
    On,
}

impl FlashMode {
    /// Next mode in the Off -> Auto -> On -> Off cycle
    pub fn next(self) -> Self {
        match self {
            FlashMode::Off => FlashMode::Auto,
            FlashMode::Auto => FlashMode::On,
            FlashMode::On => FlashMode::Off,
        }
    }
}

/// Rotation and mirroring supplied by the preview/rotation observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureRotation {
    pub rotation_degrees: u16,
    pub mirrored: bool,
}

/// Everything the session adapter needs to take a still
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    pub device_id: String,
    pub zoom_factor: f64,
    pub flash_mode: FlashMode,
    pub rotation: CaptureRotation,
}

/// Captured image as returned by the session adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub device_id: String,
    pub data: Vec<u8>,
}

impl ImageBuffer {
    pub fn new(data: Vec<u8>, width: u32, height: u32, device_id: String) -> Self {
        Self {
            width,
            height,
            format: "RGB8".to_string(),
            device_id,
            data,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
