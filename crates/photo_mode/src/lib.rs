pub mod character;
pub mod gate;
pub mod host;
mod manager;
mod settings;
pub mod sim;
pub mod tabs;

pub use character::{Character, FaceMorphs, FormSelector, LiveState, MorphOverride, OriginalState};
pub use host::PhotoModeHost;
pub use manager::{
    FrameStatus, Manager, MenuEvent, PendingActions, PresentationCues, RevertScope, SessionState,
    TabDirection, TransitionRefused, JOURNAL_ENTRY_KEY,
};
pub use settings::{PhotoModeSettings, SettingsError, DEFAULT_CAMERA_TRANSLATION_SPEED};
pub use tabs::{CategoryTracker, RevertReason, Tab, TabSet};

pub const SETTINGS_ENV_VAR: &str = "PHOTOMODE_SETTINGS";
