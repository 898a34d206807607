//! Device metadata modeled on shipping camera stacks
//!
//! Zoom factors are in each device's own space, as the platform reports them.

use crate::types::{CameraDeviceHandle, DeviceKind, Position};

fn front_true_depth() -> CameraDeviceHandle {
    CameraDeviceHandle::new("front-truedepth", Position::Front, DeviceKind::TrueDepth, 70.0)
        .with_zoom_range(1.0, 5.0)
}

fn front_wide() -> CameraDeviceHandle {
    CameraDeviceHandle::new("front-wide", Position::Front, DeviceKind::WideAngle, 72.0)
        .with_zoom_range(1.0, 4.0)
}

fn back_wide() -> CameraDeviceHandle {
    CameraDeviceHandle::new("back-wide", Position::Back, DeviceKind::WideAngle, 70.0)
        .with_zoom_range(1.0, 10.0)
        .with_flash(true)
}

fn back_ultra_wide(fov: f64) -> CameraDeviceHandle {
    CameraDeviceHandle::new("back-ultrawide", Position::Back, DeviceKind::UltraWide, fov)
        .with_zoom_range(1.0, 5.0)
        .with_flash(true)
}

fn back_telephoto(fov: f64) -> CameraDeviceHandle {
    CameraDeviceHandle::new("back-tele", Position::Back, DeviceKind::Telephoto, fov)
        .with_zoom_range(1.0, 10.0)
        .with_flash(true)
}

/// Ultra-wide, wide and 3x telephoto behind triple and dual-wide composites
pub fn triple_camera_phone() -> Vec<CameraDeviceHandle> {
    vec![
        back_wide(),
        back_ultra_wide(106.0),
        back_telephoto(28.0),
        CameraDeviceHandle::new("back-dualwide", Position::Back, DeviceKind::DualWide, 106.0)
            .with_zoom_range(1.0, 20.0)
            .with_switch_over_factors(vec![2.0])
            .with_flash(true),
        CameraDeviceHandle::new("back-triple", Position::Back, DeviceKind::Triple, 106.0)
            .with_zoom_range(1.0, 30.0)
            .with_switch_over_factors(vec![2.0, 6.0])
            .with_flash(true),
        front_true_depth(),
    ]
}

/// Wide and 2x telephoto behind a dual composite
pub fn dual_camera_phone() -> Vec<CameraDeviceHandle> {
    vec![
        back_wide(),
        back_telephoto(35.0),
        CameraDeviceHandle::new("back-dual", Position::Back, DeviceKind::Dual, 70.0)
            .with_zoom_range(1.0, 16.0)
            .with_switch_over_factors(vec![2.0])
            .with_flash(true),
        front_wide(),
    ]
}

/// Three physical back lenses and no composite device
pub fn physical_only_phone() -> Vec<CameraDeviceHandle> {
    vec![
        back_wide(),
        back_ultra_wide(120.0),
        back_telephoto(28.0),
        front_wide(),
    ]
}

/// A single flash-less front camera
pub fn single_camera_laptop() -> Vec<CameraDeviceHandle> {
    vec![front_wide()]
}
