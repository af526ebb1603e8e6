//! Configuration module for Tolk.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    CleanupSettings, EngineSettings, GeneralSettings, ServerSettings, Settings, UploadSettings,
};
