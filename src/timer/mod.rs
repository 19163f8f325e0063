pub mod controller;
pub mod state;

pub use controller::{TimerController, TimerSnapshot, TICK_INTERVAL};
pub use state::{TimerState, TimerStatus};
