use std::env;
use std::io;
use std::path::{Path, PathBuf};

use photo_mode::{PhotoModeSettings, SettingsError, SETTINGS_ENV_VAR};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

pub(crate) fn settings_path_from_env() -> Option<PathBuf> {
    env::var_os(SETTINGS_ENV_VAR)
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

/// A missing file falls back to defaults; a file that exists but does not
/// parse is an error.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<PhotoModeSettings, SettingsError> {
    let Some(path) = path else {
        info!("settings_defaulted");
        return Ok(PhotoModeSettings::default());
    };
    match PhotoModeSettings::load(path) {
        Ok(settings) => {
            info!(
                path = %path.display(),
                camera_translation_speed = settings.camera_translation_speed,
                freeze_time_on_start = settings.freeze_time_on_start,
                "settings_loaded"
            );
            Ok(settings)
        }
        Err(SettingsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "settings_missing_using_defaults");
            Ok(PhotoModeSettings::default())
        }
        Err(error) => Err(error),
    }
}
