//! Property-Based Tests for CrabLens Preset Resolution
//!
//! These tests verify invariants of the preset resolver over arbitrary
//! device line-ups, using proptest for input generation and shrinking.
//!
//! Run with: cargo test --test resolver_props

use crablens::presets::{label_key, resolve, MAX_DISPLAY_ZOOM, ZOOM_EPSILON};
use crablens::{CameraDeviceHandle, CapabilityCatalog, DeviceKind, Position};
use proptest::prelude::*;

// ═══════════════════════════════════════════════════════════════════════════
// GENERATORS
// ═══════════════════════════════════════════════════════════════════════════

fn anchor_kind() -> impl Strategy<Value = DeviceKind> {
    prop_oneof![
        Just(DeviceKind::Triple),
        Just(DeviceKind::DualWide),
        Just(DeviceKind::Dual),
    ]
}

prop_compose! {
    fn composite_anchor()(
        kind in anchor_kind(),
        fov in 20.0f64..130.0,
        min in 0.5f64..3.0,
        span in 0.0f64..40.0,
        switch_overs in prop::collection::vec(0.5f64..20.0, 0..4),
        native in prop::collection::vec(0.5f64..10.0, 0..3),
        upscale in prop::option::of(1.0f64..30.0),
    ) -> CameraDeviceHandle {
        let mut anchor = CameraDeviceHandle::new("anchor", Position::Back, kind, fov)
            .with_zoom_range(min, min + span)
            .with_switch_over_factors(switch_overs)
            .with_secondary_native_factors(native);
        if let Some(threshold) = upscale {
            anchor = anchor.with_upscale_threshold(threshold);
        }
        anchor
    }
}

prop_compose! {
    fn physical_lens(id: &'static str, kind: DeviceKind, fov_low: f64, fov_high: f64)(
        fov in fov_low..fov_high,
        min in 0.5f64..2.0,
        span in 0.0f64..10.0,
    ) -> CameraDeviceHandle {
        CameraDeviceHandle::new(id, Position::Back, kind, fov).with_zoom_range(min, min + span)
    }
}

prop_compose! {
    fn device_lineup()(
        anchor in prop::option::of(composite_anchor()),
        wide in prop::option::of(physical_lens("wide", DeviceKind::WideAngle, 40.0, 90.0)),
        ultra_wide in prop::option::of(physical_lens("ultra", DeviceKind::UltraWide, 90.0, 130.0)),
        tele in prop::option::of(physical_lens("tele", DeviceKind::Telephoto, 10.0, 45.0)),
        front in prop::bool::ANY,
    ) -> Vec<CameraDeviceHandle> {
        let mut devices: Vec<CameraDeviceHandle> =
            [wide, ultra_wide, tele, anchor].into_iter().flatten().collect();
        if front {
            devices.push(CameraDeviceHandle::new(
                "front",
                Position::Front,
                DeviceKind::TrueDepth,
                70.0,
            ));
        }
        devices
    }
}

fn position() -> impl Strategy<Value = Position> {
    prop_oneof![Just(Position::Back), Just(Position::Front)]
}

// ═══════════════════════════════════════════════════════════════════════════
// RESOLVER INVARIANTS
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// INVARIANT: No two presets share a display label
    #[test]
    fn labels_are_unique(devices in device_lineup(), pos in position()) {
        let presets = resolve(&CapabilityCatalog::discover(devices), pos);
        let mut keys: Vec<i64> = presets.iter().map(|p| label_key(p.display_zoom)).collect();
        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(keys.len(), presets.len());
    }

    /// INVARIANT: Presets are strictly ascending by display zoom
    #[test]
    fn presets_strictly_ascending(devices in device_lineup(), pos in position()) {
        let presets = resolve(&CapabilityCatalog::discover(devices), pos);
        for pair in presets.windows(2) {
            prop_assert!(pair[0].display_zoom < pair[1].display_zoom,
                "{} !< {}", pair[0].display_zoom, pair[1].display_zoom);
        }
    }

    /// INVARIANT: Every target zoom lies inside its device's range
    #[test]
    fn targets_within_device_range(devices in device_lineup(), pos in position()) {
        let presets = resolve(&CapabilityCatalog::discover(devices), pos);
        for preset in &presets {
            let device = &preset.target_device;
            prop_assert!(preset.target_zoom_factor >= device.min_zoom_factor - ZOOM_EPSILON,
                "{} below min {}", preset.target_zoom_factor, device.min_zoom_factor);
            prop_assert!(preset.target_zoom_factor <= device.max_zoom_factor + ZOOM_EPSILON,
                "{} above max {}", preset.target_zoom_factor, device.max_zoom_factor);
        }
    }

    /// INVARIANT: Display labels stay within (0, 8]
    #[test]
    fn display_zoom_is_bounded(devices in device_lineup(), pos in position()) {
        let presets = resolve(&CapabilityCatalog::discover(devices), pos);
        for preset in &presets {
            prop_assert!(preset.display_zoom > 0.0);
            prop_assert!(preset.display_zoom <= MAX_DISPLAY_ZOOM);
        }
    }

    /// INVARIANT: Resolution is a pure function of the catalog
    #[test]
    fn resolution_is_deterministic(devices in device_lineup(), pos in position()) {
        let catalog = CapabilityCatalog::discover(devices.clone());
        let first = resolve(&catalog, pos);
        prop_assert_eq!(&first, &resolve(&catalog, pos));
        prop_assert_eq!(&first, &resolve(&CapabilityCatalog::discover(devices), pos));
    }

    /// INVARIANT: Anchors with an ultra-wide lens always offer 0.5x
    #[test]
    fn ultra_wide_anchor_offers_half_stop(
        mut anchor in composite_anchor(),
        dual_wide in prop::bool::ANY,
        lineup in device_lineup(),
    ) {
        anchor.device_kind = if dual_wide { DeviceKind::DualWide } else { DeviceKind::Triple };
        let mut devices: Vec<CameraDeviceHandle> =
            lineup.into_iter().filter(|d| !d.is_virtual()).collect();
        devices.push(anchor);

        let catalog = CapabilityCatalog::discover(devices);
        prop_assert_eq!(catalog.back_anchor().map(|a| a.id.as_str()), Some("anchor"));

        let presets = resolve(&catalog, Position::Back);
        prop_assert!(presets.iter().any(|p| (p.display_zoom - 0.5).abs() < 0.05));
    }

    /// INVARIANT: A back camera exists exactly when some back device does
    #[test]
    fn back_presets_exist_with_back_devices(devices in device_lineup()) {
        let has_back = devices.iter().any(|d| d.position == Position::Back);
        let presets = resolve(&CapabilityCatalog::discover(devices), Position::Back);
        prop_assert_eq!(!presets.is_empty(), has_back);
    }

    /// INVARIANT: Composite anchors serve every back preset
    #[test]
    fn anchor_serves_all_back_presets(anchor in composite_anchor()) {
        let catalog = CapabilityCatalog::discover(vec![anchor]);
        let presets = resolve(&catalog, Position::Back);
        prop_assert!(!presets.is_empty());
        prop_assert!(presets.iter().all(|p| p.target_device.id == "anchor"));
    }
}
