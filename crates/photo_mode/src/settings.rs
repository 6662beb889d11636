use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CAMERA_TRANSLATION_SPEED: f32 = 4.0;

/// Defaults applied when a session starts. Read once; nothing here is written
/// back during a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotoModeSettings {
    pub camera_translation_speed: f32,
    pub freeze_time_on_start: bool,
}

impl Default for PhotoModeSettings {
    fn default() -> Self {
        Self {
            camera_translation_speed: DEFAULT_CAMERA_TRANSLATION_SPEED,
            freeze_time_on_start: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path} at {field}: {message}")]
    Parse {
        path: PathBuf,
        field: String,
        message: String,
    },
    #[error("invalid settings in {path}: camera_translation_speed must be finite and non-negative, got {value}")]
    InvalidSpeed { path: PathBuf, value: f32 },
}

impl PhotoModeSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, SettingsError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let settings: Self = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let field = error.path().to_string();
            SettingsError::Parse {
                path: path.to_path_buf(),
                field: if field.is_empty() { ".".to_string() } else { field },
                message: error.into_inner().to_string(),
            }
        })?;

        let speed = settings.camera_translation_speed;
        if !speed.is_finite() || speed < 0.0 {
            return Err(SettingsError::InvalidSpeed {
                path: path.to_path_buf(),
                value: speed,
            });
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write settings");
        file
    }

    #[test]
    fn partial_file_fills_defaults() {
        let file = settings_file(r#"{ "freeze_time_on_start": true }"#);
        let settings = PhotoModeSettings::load(file.path()).expect("load");
        assert!(settings.freeze_time_on_start);
        assert_eq!(
            settings.camera_translation_speed,
            DEFAULT_CAMERA_TRANSLATION_SPEED
        );
    }

    #[test]
    fn parse_error_names_the_field() {
        let file = settings_file(r#"{ "camera_translation_speed": "fast" }"#);
        let error = PhotoModeSettings::load(file.path()).expect_err("should fail");
        match error {
            SettingsError::Parse { field, .. } => assert_eq!(field, "camera_translation_speed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let file = settings_file(r#"{ "camera_speed": 2.0 }"#);
        assert!(matches!(
            PhotoModeSettings::load(file.path()),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn negative_speed_is_rejected() {
        let file = settings_file(r#"{ "camera_translation_speed": -1.0 }"#);
        assert!(matches!(
            PhotoModeSettings::load(file.path()),
            Err(SettingsError::InvalidSpeed { .. })
        ));
    }

    #[test]
    fn missing_file_reports_io() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = PhotoModeSettings::load(&dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(error, SettingsError::Io { .. }));
        assert!(error.to_string().contains("absent.json"));
    }
}
