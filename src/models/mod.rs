pub mod note;
pub mod session;
pub mod state;

pub use note::{canonical_label, Note};
pub use session::{new_session_id, Genre, Session};
pub use state::{
    ApplicationState, DEFAULT_FPS, MAX_BUTTON_LABELS, MAX_DIM_LEVEL, MIN_BUTTON_LABELS,
};
