//! Display multiplier heuristics
//!
//! A composite device reports zoom in its own device space, where 1.0 is the
//! native resolution of whichever lens it routes through at minimum zoom.
//! The display multiplier converts that space into the labels users expect
//! (0.5x for ultra-wide, 1x for wide). The thresholds below are calibration
//! constants matched against shipping hardware; keep them as they are.

use super::ZOOM_EPSILON;
use crate::types::{CameraDeviceHandle, DeviceKind};

/// Tolerance for snapping a wide/anchor FOV ratio onto 0.5 or 1.0
pub const FOV_RATIO_SNAP_TOLERANCE: f64 = 0.2;

/// Bias, in degrees, before an anchor FOV counts as closer to one reference lens
pub const FOV_TIE_TOLERANCE_DEGREES: f64 = 1.0;

/// Open interval in which a switch-over is taken to be the ultra-wide to wide hop
pub const WIDE_SWITCH_OVER_WINDOW: (f64, f64) = (1.1, 2.4);

/// Below this wide/anchor FOV ratio the anchor is assumed to baseline at ultra-wide
pub const ULTRA_WIDE_RATIO_CEILING: f64 = 0.75;

/// Accepted range for a multiplier derived from a switch-over factor
pub const SWITCH_OVER_MULTIPLIER_RANGE: (f64, f64) = (0.25, 1.0);

/// Dual-wide anchors at or below this multiplier are normalized back to 1.0
pub const DUAL_WIDE_MULTIPLIER_CEILING: f64 = 0.55;

const ULTRA_WIDE_BASELINE: f64 = 0.5;
const WIDE_BASELINE: f64 = 1.0;

fn valid_fov(device: &CameraDeviceHandle) -> Option<f64> {
    let fov = device.field_of_view_degrees;
    (fov.is_finite() && fov > 0.0).then_some(fov)
}

/// Snap a FOV ratio onto the ultra-wide or wide baseline when close enough
pub fn snap_ratio(ratio: f64) -> f64 {
    if (ratio - ULTRA_WIDE_BASELINE).abs() <= FOV_RATIO_SNAP_TOLERANCE {
        ULTRA_WIDE_BASELINE
    } else if (ratio - WIDE_BASELINE).abs() <= FOV_RATIO_SNAP_TOLERANCE {
        WIDE_BASELINE
    } else {
        ratio
    }
}

/// Baseline implied by which reference lens the anchor's FOV sits closer to.
///
/// Returns `None` when the two distances are within the tie tolerance.
fn nearest_reference_baseline(anchor_fov: f64, wide_fov: f64, ultra_wide_fov: f64) -> Option<f64> {
    let to_wide = (anchor_fov - wide_fov).abs();
    let to_ultra_wide = (anchor_fov - ultra_wide_fov).abs();

    if to_ultra_wide + FOV_TIE_TOLERANCE_DEGREES < to_wide {
        Some(ULTRA_WIDE_BASELINE)
    } else if to_wide + FOV_TIE_TOLERANCE_DEGREES < to_ultra_wide {
        Some(WIDE_BASELINE)
    } else {
        None
    }
}

/// Compute the device-space to label-space ratio for a composite anchor
pub fn display_multiplier(
    anchor: &CameraDeviceHandle,
    reference_wide: Option<&CameraDeviceHandle>,
    reference_ultra_wide: Option<&CameraDeviceHandle>,
) -> f64 {
    let Some(anchor_fov) = valid_fov(anchor) else {
        log::debug!("Anchor {} has no usable FOV, multiplier 1.0", anchor.id);
        return 1.0;
    };
    let has_ultra_wide = anchor.device_kind.has_ultra_wide_constituent();

    let mut multiplier = 1.0;

    if let Some(wide_fov) = reference_wide.and_then(valid_fov) {
        let ratio = wide_fov / anchor_fov;
        multiplier = snap_ratio(ratio);

        if let Some(ultra_wide_fov) = reference_ultra_wide.and_then(valid_fov) {
            if let Some(baseline) = nearest_reference_baseline(anchor_fov, wide_fov, ultra_wide_fov)
            {
                if (baseline - multiplier).abs() > ZOOM_EPSILON {
                    log::debug!(
                        "Anchor {} FOV {:.1} closer to {} baseline, overriding ratio {:.3}",
                        anchor.id,
                        anchor_fov,
                        baseline,
                        multiplier
                    );
                    multiplier = baseline;
                }
            }
        }

        if has_ultra_wide && ratio < ULTRA_WIDE_RATIO_CEILING {
            let (low, high) = WIDE_SWITCH_OVER_WINDOW;
            let wide_hop = anchor
                .valid_switch_overs()
                .into_iter()
                .find(|f| *f > low && *f < high);
            if let Some(factor) = wide_hop {
                let corrected = 1.0 / factor;
                let (min, max) = SWITCH_OVER_MULTIPLIER_RANGE;
                if (min..=max).contains(&corrected) {
                    log::debug!(
                        "Anchor {} multiplier from switch-over {}: {:.3}",
                        anchor.id,
                        factor,
                        corrected
                    );
                    multiplier = corrected;
                }
            }
        }
    }

    if anchor.device_kind == DeviceKind::DualWide
        && has_ultra_wide
        && anchor.effective_min_zoom() >= 1.0
        && multiplier <= DUAL_WIDE_MULTIPLIER_CEILING
    {
        log::debug!(
            "Dual-wide anchor {} does not reach ultra-wide at min zoom, multiplier 1.0",
            anchor.id
        );
        multiplier = 1.0;
    }

    if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn device(id: &str, kind: DeviceKind, fov: f64) -> CameraDeviceHandle {
        CameraDeviceHandle::new(id, Position::Back, kind, fov)
    }

    #[test]
    fn test_snap_ratio() {
        assert_eq!(snap_ratio(0.62), 0.5);
        assert_eq!(snap_ratio(0.35), 0.5);
        assert_eq!(snap_ratio(1.15), 1.0);
        assert_eq!(snap_ratio(0.85), 1.0);
        assert!((snap_ratio(0.75) - 0.75).abs() < 1e-9);
        assert!((snap_ratio(2.5) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_reference_defaults_to_one() {
        let anchor = device("triple", DeviceKind::Triple, 106.0);
        assert_eq!(display_multiplier(&anchor, None, None), 1.0);
    }

    #[test]
    fn test_anchor_at_wide_baseline() {
        let anchor = device("dual", DeviceKind::Dual, 69.0);
        let wide = device("wide", DeviceKind::WideAngle, 70.0);
        assert_eq!(display_multiplier(&anchor, Some(&wide), None), 1.0);
    }

    #[test]
    fn test_anchor_at_ultra_wide_baseline() {
        let anchor = device("triple", DeviceKind::Triple, 106.0)
            .with_zoom_range(1.0, 15.0)
            .with_switch_over_factors(vec![3.0, 9.0]);
        let wide = device("wide", DeviceKind::WideAngle, 70.0);
        let ultra = device("ultra", DeviceKind::UltraWide, 106.0);
        assert_eq!(display_multiplier(&anchor, Some(&wide), Some(&ultra)), 0.5);
    }

    #[test]
    fn test_switch_over_correction() {
        // 70 / 110 = 0.636, the 1.8 hop refines the snap to 1 / 1.8
        let anchor = device("triple", DeviceKind::Triple, 110.0)
            .with_zoom_range(1.0, 15.0)
            .with_switch_over_factors(vec![1.8, 5.4]);
        let wide = device("wide", DeviceKind::WideAngle, 70.0);
        let m = display_multiplier(&anchor, Some(&wide), None);
        assert!((m - 1.0 / 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_switch_over_outside_window_ignored() {
        let anchor = device("triple", DeviceKind::Triple, 110.0)
            .with_zoom_range(1.0, 15.0)
            .with_switch_over_factors(vec![3.0]);
        let wide = device("wide", DeviceKind::WideAngle, 70.0);
        assert_eq!(display_multiplier(&anchor, Some(&wide), None), 0.5);
    }

    #[test]
    fn test_fov_proximity_overrides_ratio_snap() {
        // Ratio 70 / 85 = 0.82 snaps to 1.0, but 85 is nearer the 95 degree ultra-wide.
        let anchor = device("triple", DeviceKind::Triple, 85.0);
        let wide = device("wide", DeviceKind::WideAngle, 70.0);
        let ultra = device("ultra", DeviceKind::UltraWide, 95.0);
        assert_eq!(display_multiplier(&anchor, Some(&wide), Some(&ultra)), 0.5);
    }

    #[test]
    fn test_fov_tie_keeps_ratio_snap() {
        let anchor = device("triple", DeviceKind::Triple, 82.5);
        let wide = device("wide", DeviceKind::WideAngle, 70.0);
        let ultra = device("ultra", DeviceKind::UltraWide, 95.0);
        assert_eq!(display_multiplier(&anchor, Some(&wide), Some(&ultra)), 1.0);
    }

    #[test]
    fn test_dual_wide_normalization() {
        let anchor = device("dualwide", DeviceKind::DualWide, 106.0)
            .with_zoom_range(1.0, 10.0)
            .with_switch_over_factors(vec![2.0]);
        let wide = device("wide", DeviceKind::WideAngle, 70.0);
        let ultra = device("ultra", DeviceKind::UltraWide, 106.0);
        assert_eq!(display_multiplier(&anchor, Some(&wide), Some(&ultra)), 1.0);
    }

    #[test]
    fn test_dual_wide_with_low_min_keeps_ultra_wide_baseline() {
        let anchor = device("dualwide", DeviceKind::DualWide, 106.0)
            .with_zoom_range(0.5, 10.0)
            .with_switch_over_factors(vec![2.0]);
        let wide = device("wide", DeviceKind::WideAngle, 70.0);
        assert_eq!(display_multiplier(&anchor, Some(&wide), None), 0.5);
    }

    #[test]
    fn test_invalid_anchor_fov() {
        let anchor = device("triple", DeviceKind::Triple, 0.0);
        let wide = device("wide", DeviceKind::WideAngle, 70.0);
        assert_eq!(display_multiplier(&anchor, Some(&wide), None), 1.0);
    }
}
