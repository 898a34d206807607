pub mod controller;
pub mod events;
pub mod state;

pub use controller::{initial_preset, SelectionController};
pub use events::{DeviceChangedEvent, EventBus};
pub use state::{SelectionSnapshot, SelectionState, SwitchOutcome};
