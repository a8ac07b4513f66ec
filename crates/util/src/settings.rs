//! Client settings persistence.
//!
//! A small JSON file records where the Area backend lives and the session
//! token used to authenticate against it. The file is written to the standard
//! configuration directory (`~/.config/area/settings.json` on most
//! platforms). Environment variables override whatever the file contains.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "AREA_SETTINGS_PATH";
/// Environment variable overriding the backend base URL.
pub const API_BASE_ENV: &str = "AREA_API_BASE";
/// Environment variable overriding the session token.
pub const SESSION_TOKEN_ENV: &str = "AREA_SESSION_TOKEN";
/// Backend address used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080";
/// Default filename for the JSON payload.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted client settings.
#[derive(Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL of the backend, for example `https://area.example.com`.
    #[serde(default)]
    pub api_base: Option<String>,
    /// Value of the backend's `access_token` cookie.
    #[serde(default)]
    pub session_token: Option<String>,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_base", &self.api_base)
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ClientSettings {
    /// Load settings from the default location.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&default_settings_path())
    }

    /// Load settings from `path`. A missing file yields defaults; an unparsable
    /// file is logged and also yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(settings) => Ok(settings),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse settings file; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(SettingsError::Io(error)),
        }
    }

    /// Write settings to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Backend base URL: `AREA_API_BASE`, then the file, then [`DEFAULT_API_BASE`].
    pub fn resolved_api_base(&self) -> String {
        non_empty_env(API_BASE_ENV)
            .or_else(|| self.api_base.clone().filter(|base| !base.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Session token: `AREA_SESSION_TOKEN`, then the file.
    pub fn resolved_session_token(&self) -> Option<String> {
        non_empty_env(SESSION_TOKEN_ENV).or_else(|| self.session_token.clone().filter(|token| !token.trim().is_empty()))
    }
}

/// Path of the settings file, honouring [`SETTINGS_PATH_ENV`].
pub fn default_settings_path() -> PathBuf {
    if let Some(path) = non_empty_env(SETTINGS_PATH_ENV) {
        return home_relative(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("area")
        .join(SETTINGS_FILE_NAME)
}

// `~` alone or followed by a separator means the home directory.
fn home_relative(raw: &str) -> PathBuf {
    let rest = raw.strip_prefix('~').filter(|rest| rest.is_empty() || rest.starts_with(['/', '\\']));
    match (rest, home_dir()) {
        (Some(rest), Some(home)) => {
            let rest = rest.trim_start_matches(['/', '\\']);
            if rest.is_empty() { home } else { home.join(rest) }
        }
        _ => PathBuf::from(raw),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_path_override_resolves_home() {
        assert_eq!(home_relative("/tmp/area.json"), PathBuf::from("/tmp/area.json"));
        assert_eq!(home_relative("~area/settings.json"), PathBuf::from("~area/settings.json"));
        if let Some(home) = home_dir() {
            assert_eq!(home_relative("~"), home);
            assert_eq!(home_relative("~/area/settings.json"), home.join("area/settings.json"));
            let resolved = temp_env::with_var(SETTINGS_PATH_ENV, Some(" ~/custom.json "), default_settings_path);
            assert_eq!(resolved, home.join("custom.json"));
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ClientSettings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn invalid_json_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(ClientSettings::load_from(&path).unwrap(), ClientSettings::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = ClientSettings {
            api_base: Some("https://area.example.com".into()),
            session_token: Some("token-value".into()),
        };
        settings.save_to(&path).unwrap();
        assert_eq!(ClientSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn environment_overrides_file_values() {
        let settings = ClientSettings {
            api_base: Some("https://file.example.com/".into()),
            session_token: Some("from-file".into()),
        };
        temp_env::with_vars(
            [(API_BASE_ENV, Some("http://localhost:9000/")), (SESSION_TOKEN_ENV, Some("from-env"))],
            || {
                assert_eq!(settings.resolved_api_base(), "http://localhost:9000");
                assert_eq!(settings.resolved_session_token().as_deref(), Some("from-env"));
            },
        );
        temp_env::with_vars([(API_BASE_ENV, None::<&str>), (SESSION_TOKEN_ENV, None::<&str>)], || {
            assert_eq!(settings.resolved_api_base(), "https://file.example.com");
            assert_eq!(settings.resolved_session_token().as_deref(), Some("from-file"));
        });
    }

    #[test]
    fn falls_back_to_local_backend() {
        temp_env::with_var(API_BASE_ENV, None::<&str>, || {
            assert_eq!(ClientSettings::default().resolved_api_base(), DEFAULT_API_BASE);
        });
    }

    #[test]
    fn debug_output_hides_token() {
        let settings = ClientSettings {
            api_base: None,
            session_token: Some("super-secret".into()),
        };
        assert!(!format!("{settings:?}").contains("super-secret"));
    }

    #[test]
    fn settings_path_env_override_is_respected() {
        temp_env::with_var(SETTINGS_PATH_ENV, Some("/tmp/area-test/settings.json"), || {
            assert_eq!(default_settings_path(), PathBuf::from("/tmp/area-test/settings.json"));
        });
    }
}
