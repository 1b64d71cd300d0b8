// Training engine, stores and runtime plumbing. Screens and the App state
// live in the binary.
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod error;
pub mod events;
pub mod exercise;
pub mod history;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod sound;
pub mod store;
pub mod timer;
pub mod training;
pub mod util;

pub use error::{Error, Result};
pub use events::SessionEvent;
pub use exercise::{Exercise, Routine};
pub use training::TrainingSession;
