//! Zoom preset resolution
//!
//! Turns a [`CapabilityCatalog`] into the ordered, deduplicated list of zoom
//! presets shown for a camera position. Resolution is pure: no device
//! access, no clocks, no hash-order dependence, and it never panics. The
//! worst case is a single best-effort preset.

pub mod multiplier;

pub use multiplier::display_multiplier;

use crate::catalog::CapabilityCatalog;
use crate::types::{CameraDeviceHandle, Position, ZoomPreset};
use std::cmp::Ordering;

/// Tolerance for zoom comparisons, range filtering and label matching
pub const ZOOM_EPSILON: f64 = 0.01;

/// Largest display zoom ever offered
pub const MAX_DISPLAY_ZOOM: f64 = 8.0;

/// Display stops users expect regardless of hardware
pub const CANONICAL_STOPS: [f64; 3] = [0.5, 1.0, 2.0];

/// Label of the guaranteed ultra-wide stop
pub const ULTRA_WIDE_DISPLAY_ZOOM: f64 = 0.5;

/// Multipliers at or below this offer the 0.5x canonical stop
const ULTRA_WIDE_STOP_MULTIPLIER_CEILING: f64 = 0.75;

/// Tolerance for matching a secondary native factor to the 2x stop
const NATIVE_STOP_TOLERANCE: f64 = 0.05;

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Integer dedup key for a display zoom label
pub fn label_key(display_zoom: f64) -> i64 {
    (display_zoom * 10.0).round() as i64
}

/// Resolve the zoom presets offered at `position`.
///
/// An empty list means the camera is unavailable at that position.
pub fn resolve(catalog: &CapabilityCatalog, position: Position) -> Vec<ZoomPreset> {
    match position {
        Position::Front => resolve_front(catalog),
        Position::Back => match catalog.back_anchor() {
            Some(anchor) => resolve_anchor(catalog, anchor),
            None => resolve_physical_back(catalog),
        },
    }
}

fn compare_presets(a: &ZoomPreset, b: &ZoomPreset) -> Ordering {
    a.display_zoom
        .total_cmp(&b.display_zoom)
        .then(a.target_zoom_factor.total_cmp(&b.target_zoom_factor))
}

/// Sort by (display, target) and keep the first preset per label
fn sort_and_dedup(presets: &mut Vec<ZoomPreset>) {
    presets.sort_by(compare_presets);
    presets.dedup_by(|later, earlier| label_key(later.display_zoom) == label_key(earlier.display_zoom));
}

fn resolve_front(catalog: &CapabilityCatalog) -> Vec<ZoomPreset> {
    match catalog.front_device() {
        Some(device) => vec![ZoomPreset {
            display_zoom: 1.0,
            target_zoom_factor: device.clamp_zoom(1.0),
            target_device: device.clone(),
            is_virtual_zoom: false,
        }],
        None => Vec::new(),
    }
}

/// Device-space zoom factors worth offering on a composite anchor
fn candidate_targets(anchor: &CameraDeviceHandle, multiplier: f64) -> Vec<f64> {
    let max = anchor.effective_max_zoom();
    let switch_overs = anchor.valid_switch_overs();
    let native_factors: Vec<f64> = anchor
        .secondary_native_resolution_zoom_factors
        .iter()
        .copied()
        .filter(|f| f.is_finite() && *f > 0.0)
        .collect();

    let mut targets = vec![1.0];
    targets.extend(switch_overs.iter().copied());
    targets.extend(native_factors.iter().copied());

    let stops: &[f64] = if anchor.device_kind.has_ultra_wide_constituent()
        || multiplier <= ULTRA_WIDE_STOP_MULTIPLIER_CEILING
    {
        &CANONICAL_STOPS
    } else {
        &CANONICAL_STOPS[1..]
    };

    // 2x is a crop stop unless a telephoto lens already sits above 1x,
    // in which case it needs a native-resolution mode to back it.
    let has_telephoto_stop = switch_overs.iter().any(|f| {
        let display = round1(f * multiplier);
        display > 1.0 + ZOOM_EPSILON && (display - 2.0).abs() > ZOOM_EPSILON
    });
    let has_native_two_x = native_factors
        .iter()
        .any(|f| (f * multiplier - 2.0).abs() < NATIVE_STOP_TOLERANCE);
    let offer_two_x = !has_telephoto_stop || has_native_two_x;

    if multiplier > f64::EPSILON {
        for stop in stops {
            if (*stop - 2.0).abs() < ZOOM_EPSILON && !offer_two_x {
                continue;
            }
            let target = stop / multiplier;
            if target <= max + ZOOM_EPSILON {
                targets.push(target);
            }
        }
    }

    // Optical-quality doubling of the strongest lens
    if let Some(strongest) = switch_overs.last().copied() {
        let limit = match anchor.upscale_threshold_zoom_factor {
            Some(threshold) if threshold.is_finite() && threshold > 0.0 => max.min(threshold),
            _ => max,
        };
        let mut doubled = strongest * 2.0;
        while doubled <= limit + ZOOM_EPSILON && doubled * multiplier <= MAX_DISPLAY_ZOOM + ZOOM_EPSILON
        {
            targets.push(doubled);
            doubled *= 2.0;
        }
    }

    targets
}

fn is_optical_identity(anchor: &CameraDeviceHandle, target: f64) -> bool {
    (target - 1.0).abs() < ZOOM_EPSILON
        || anchor
            .valid_switch_overs()
            .iter()
            .any(|f| (target - f).abs() < ZOOM_EPSILON)
}

fn resolve_anchor(catalog: &CapabilityCatalog, anchor: &CameraDeviceHandle) -> Vec<ZoomPreset> {
    let multiplier = display_multiplier(
        anchor,
        catalog.reference_wide(),
        catalog.reference_ultra_wide(),
    );
    let min = anchor.effective_min_zoom();
    let max = anchor.effective_max_zoom();

    log::debug!(
        "Resolving presets for {} ({:?}): multiplier {:.3}, zoom range {}..={}",
        anchor.id,
        anchor.device_kind,
        multiplier,
        min,
        max
    );

    let mut presets: Vec<ZoomPreset> = candidate_targets(anchor, multiplier)
        .into_iter()
        .filter(|t| t.is_finite() && *t >= min - ZOOM_EPSILON && *t <= max + ZOOM_EPSILON)
        .filter_map(|t| {
            let target = t.clamp(min, max);
            let display = round1(target * multiplier);
            if display <= 0.0 || display > MAX_DISPLAY_ZOOM {
                return None;
            }
            Some(ZoomPreset {
                display_zoom: display,
                target_zoom_factor: target,
                target_device: anchor.clone(),
                is_virtual_zoom: anchor.is_virtual() && !is_optical_identity(anchor, target),
            })
        })
        .collect();

    sort_and_dedup(&mut presets);

    if presets.is_empty() {
        let target = anchor.clamp_zoom(1.0);
        let display = round1(target * multiplier).clamp(ULTRA_WIDE_DISPLAY_ZOOM, MAX_DISPLAY_ZOOM);
        log::debug!(
            "No candidates survived for {}, falling back to {}x at {}",
            anchor.id,
            display,
            target
        );
        presets.push(ZoomPreset {
            display_zoom: display,
            target_zoom_factor: target,
            target_device: anchor.clone(),
            is_virtual_zoom: anchor.is_virtual(),
        });
    }

    let has_ultra_wide_stop = presets
        .iter()
        .any(|p| (p.display_zoom - ULTRA_WIDE_DISPLAY_ZOOM).abs() < ZOOM_EPSILON);
    if anchor.device_kind.has_ultra_wide_constituent() && !has_ultra_wide_stop {
        log::debug!("Synthesizing 0.5x stop for {} at {}", anchor.id, min);
        presets.push(ZoomPreset {
            display_zoom: ULTRA_WIDE_DISPLAY_ZOOM,
            target_zoom_factor: min,
            target_device: anchor.clone(),
            is_virtual_zoom: anchor.is_virtual(),
        });
    }

    sort_and_dedup(&mut presets);
    presets
}

fn resolve_physical_back(catalog: &CapabilityCatalog) -> Vec<ZoomPreset> {
    let reference_fov = catalog
        .reference_wide()
        .map(|d| d.field_of_view_degrees)
        .filter(|fov| fov.is_finite() && *fov > 0.0);

    let mut presets: Vec<ZoomPreset> = Vec::new();
    for device in catalog.physical_back_devices() {
        let fov = device.field_of_view_degrees;
        let display = match reference_fov {
            Some(wide_fov) if fov.is_finite() && fov > 0.0 => {
                round1(multiplier::snap_ratio(wide_fov / fov))
            }
            _ => {
                log::debug!("Label for {} unresolved, defaulting to 1x", device.id);
                1.0
            }
        };

        if display <= 0.0 || display > MAX_DISPLAY_ZOOM {
            log::debug!("Dropping {} with out-of-range label {}", device.id, display);
            continue;
        }

        presets.push(ZoomPreset {
            display_zoom: display,
            target_zoom_factor: device.clamp_zoom(1.0),
            target_device: device.clone(),
            is_virtual_zoom: false,
        });
    }

    // Stable sort keeps reported order among equal labels; first one wins.
    sort_and_dedup(&mut presets);
    presets
}
