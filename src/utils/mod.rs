//! Utility modules
//! Contains the settings file and frame timing.

pub mod settings;
pub mod timer;

// Re-export commonly used types
pub use settings::{GameSettings, SettingsError};
pub use timer::FrameTimer;
