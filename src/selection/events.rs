//! Observer channels for device changes and selection snapshots

use super::state::SelectionSnapshot;
use crate::types::{CameraDeviceHandle, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

/// Emitted whenever a different device becomes the active input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceChangedEvent {
    pub session_id: Uuid,
    pub device: CameraDeviceHandle,
    pub position: Position,
    pub zoom_factor: f64,
    pub at: DateTime<Utc>,
}

/// Publishing side of the observer channels, owned by the selection controller
#[derive(Debug)]
pub struct EventBus {
    device_changed: broadcast::Sender<DeviceChangedEvent>,
    snapshots: watch::Sender<SelectionSnapshot>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (device_changed, _) = broadcast::channel(capacity.max(1));
        let (snapshots, _) = watch::channel(SelectionSnapshot::default());
        Self {
            device_changed,
            snapshots,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeviceChangedEvent> {
        self.device_changed.subscribe()
    }

    pub(crate) fn device_changed_sender(&self) -> broadcast::Sender<DeviceChangedEvent> {
        self.device_changed.clone()
    }

    pub fn watch(&self) -> watch::Receiver<SelectionSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub(crate) fn emit_device_changed(&self, event: DeviceChangedEvent) {
        log::info!(
            "Device changed to {} ({:?}) at zoom {:.2}",
            event.device.id,
            event.device.device_kind,
            event.zoom_factor
        );
        // No receivers is fine; observers are optional.
        let _ = self.device_changed.send(event);
    }

    pub(crate) fn publish(&self, snapshot: SelectionSnapshot) {
        self.snapshots.send_replace(snapshot);
    }
}
