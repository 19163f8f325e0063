//! Core of a screening-review timer: a pause-adjusted session clock, an
//! append-only note recorder, a bounded session history, and a JSON
//! persistence gateway with versioned schema migrations. The interactive CLI
//! in `main.rs` is thin glue over [`App`].

pub mod app;
pub mod error;
pub mod export;
pub mod models;
pub mod persist;
pub mod recorder;
pub mod store;
pub mod timecode;
pub mod timer;

pub use app::App;
pub use error::{Error, Result};
pub use models::{ApplicationState, Genre, Note, Session};
pub use persist::PersistenceGateway;
pub use store::SessionStore;
pub use timer::{TimerController, TimerSnapshot, TimerState, TimerStatus};
