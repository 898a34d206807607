//! Camera control queue
//!
//! All selection changes and session reconfiguration run on one dedicated
//! thread that owns the [`SelectionController`]. Callers talk to it through
//! [`CameraControl`], a cloneable async handle; every request is queued and
//! runs to completion before the next one starts, so a switch issued while
//! the session is starting waits behind the start. Nothing is cancelled once
//! begun and no timeouts are imposed: a hung adapter call blocks the queue.
//!
//! Preset resolution does not need the queue and runs on the caller's thread.

use crate::catalog::CapabilityCatalog;
use crate::config::EngineConfig;
use crate::errors::LensError;
use crate::presets;
use crate::selection::{
    DeviceChangedEvent, EventBus, SelectionController, SelectionSnapshot, SwitchOutcome,
};
use crate::session::SessionAdapter;
use crate::types::{CaptureRotation, FlashMode, ImageBuffer, Position, ZoomPreset};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

type Reply<T> = oneshot::Sender<Result<T, LensError>>;

enum Command {
    Start(Reply<()>),
    Stop(Reply<()>),
    SwitchTo(Box<ZoomPreset>, Reply<SwitchOutcome>),
    FlipPosition(Reply<SwitchOutcome>),
    ToggleFlash(Reply<FlashMode>),
    ApplyZoom(f64, Reply<f64>),
    Capture(CaptureRotation, Reply<ImageBuffer>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to the camera control thread
#[derive(Clone)]
pub struct CameraControl {
    commands: mpsc::UnboundedSender<Command>,
    catalog: Arc<CapabilityCatalog>,
    device_changed: broadcast::Sender<DeviceChangedEvent>,
    snapshots: watch::Receiver<SelectionSnapshot>,
}

impl CameraControl {
    /// Spawn the control thread; the engine stays idle until [`Self::start`]
    pub fn spawn<S>(
        catalog: CapabilityCatalog,
        session: S,
        config: EngineConfig,
    ) -> Result<Self, LensError>
    where
        S: SessionAdapter + Send + 'static,
    {
        let catalog = Arc::new(catalog);
        let events = EventBus::new(config.event_capacity);
        let device_changed = events.device_changed_sender();
        let snapshots = events.watch();
        let controller = SelectionController::new(catalog.clone(), session, events);

        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("crablens-control".to_string())
            .spawn(move || control_loop(controller, rx, config))
            .map_err(|e| LensError::ControlThread(e.to_string()))?;

        Ok(Self {
            commands: tx,
            catalog,
            device_changed,
            snapshots,
        })
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, LensError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .map_err(|_| LensError::ControlQueueClosed)?;
        response.await.map_err(|_| LensError::ControlQueueClosed)?
    }

    /// Select the initial device and start the capture session.
    ///
    /// After a [`Self::stop`] this restarts the session on the kept selection.
    pub async fn start(&self) -> Result<(), LensError> {
        self.request(Command::Start).await
    }

    /// Stop the capture session, keeping the selection
    pub async fn stop(&self) -> Result<(), LensError> {
        self.request(Command::Stop).await
    }

    pub async fn switch_to(&self, preset: ZoomPreset) -> Result<SwitchOutcome, LensError> {
        self.request(|reply| Command::SwitchTo(Box::new(preset), reply))
            .await
    }

    pub async fn flip_position(&self) -> Result<SwitchOutcome, LensError> {
        self.request(Command::FlipPosition).await
    }

    pub async fn toggle_flash(&self) -> Result<FlashMode, LensError> {
        self.request(Command::ToggleFlash).await
    }

    /// Zoom the current device; returns the clamped factor actually applied
    pub async fn apply_zoom(&self, factor: f64) -> Result<f64, LensError> {
        self.request(|reply| Command::ApplyZoom(factor, reply)).await
    }

    pub async fn capture(&self, rotation: CaptureRotation) -> Result<ImageBuffer, LensError> {
        self.request(|reply| Command::Capture(rotation, reply)).await
    }

    /// Tear the session down and end the control thread
    pub async fn shutdown(&self) -> Result<(), LensError> {
        let (reply, done) = oneshot::channel();
        self.commands
            .send(Command::Shutdown(reply))
            .map_err(|_| LensError::ControlQueueClosed)?;
        done.await.map_err(|_| LensError::ControlQueueClosed)
    }

    /// Resolve presets without going through the control queue
    pub fn presets(&self, position: Position) -> Vec<ZoomPreset> {
        presets::resolve(&self.catalog, position)
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    /// Presets for the position currently in use, if active
    pub fn current_presets(&self) -> Vec<ZoomPreset> {
        match self.snapshot().selection {
            Some(state) => self.presets(state.position()),
            None => Vec::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeviceChangedEvent> {
        self.device_changed.subscribe()
    }

    pub fn watch(&self) -> watch::Receiver<SelectionSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

fn control_loop<S: SessionAdapter>(
    mut controller: SelectionController<S>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    config: EngineConfig,
) {
    log::debug!("Camera control thread running for {}", controller.session_id());

    while let Some(command) = commands.blocking_recv() {
        match command {
            Command::Start(reply) => {
                let result = if controller.is_active() {
                    controller.start_session()
                } else {
                    controller
                        .activate(
                            config.initial_position,
                            config.initial_display_zoom,
                            config.default_flash_mode,
                        )
                        .and_then(|_| controller.start_session())
                };
                let _ = reply.send(result);
            }
            Command::Stop(reply) => {
                let _ = reply.send(controller.stop_session());
            }
            Command::SwitchTo(preset, reply) => {
                let _ = reply.send(controller.switch_to(&preset));
            }
            Command::FlipPosition(reply) => {
                let _ = reply.send(controller.flip_position());
            }
            Command::ToggleFlash(reply) => {
                let _ = reply.send(controller.toggle_flash());
            }
            Command::ApplyZoom(factor, reply) => {
                let _ = reply.send(controller.apply_zoom(factor));
            }
            Command::Capture(rotation, reply) => {
                let _ = reply.send(controller.capture(rotation));
            }
            Command::Shutdown(reply) => {
                controller.deactivate();
                let _ = reply.send(());
                break;
            }
        }
    }

    if controller.is_active() {
        controller.deactivate();
    }
    log::debug!("Camera control thread for {} exited", controller.session_id());
}
