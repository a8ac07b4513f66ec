//! Shared helpers for the Area client crates: persisted client settings,
//! and redaction of secrets in diagnostic output.

pub mod redaction;
pub mod settings;

pub use redaction::redact_sensitive;
pub use settings::{ClientSettings, SettingsError, default_settings_path};
