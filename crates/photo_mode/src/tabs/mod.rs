mod camera;
mod filters;
mod player;
mod time;

use crate::host::PhotoModeHost;

pub use camera::{CameraTab, CameraValues, FOV_MAX, FOV_MIN};
pub use filters::{FilterTab, DEFAULT_PRESET_STRENGTH};
pub use player::PlayerTab;
pub use time::{TimeTab, TimeValues};

pub const RESET_ALL_NOTIFICATION: &str = "$PM_ResetNotifAll";

/// Why a tracker is being reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertReason {
    /// Manual reset of the focused tab.
    TabReset,
    /// Manual reset of every tab; the session stays active.
    ResetAll,
    /// The session is ending.
    SessionEnd,
}

impl RevertReason {
    pub fn is_full(self) -> bool {
        matches!(self, Self::ResetAll | Self::SessionEnd)
    }

    pub fn is_session_end(self) -> bool {
        self == Self::SessionEnd
    }
}

/// Capture-once, revert-many state owned by one tab.
pub trait CategoryTracker {
    fn capture_original<H: PhotoModeHost>(&mut self, host: &mut H);

    /// Must be idempotent: a second call without edits in between changes
    /// nothing observable.
    fn revert<H: PhotoModeHost>(&mut self, host: &mut H, reason: RevertReason);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Camera,
    Time,
    Player,
    Filters,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Camera, Tab::Time, Tab::Player, Tab::Filters];
    pub const COUNT: usize = Self::ALL.len();

    pub const fn index(self) -> usize {
        match self {
            Tab::Camera => 0,
            Tab::Time => 1,
            Tab::Player => 2,
            Tab::Filters => 3,
        }
    }

    /// Wraps instead of failing, so any integer names a tab.
    pub fn from_index(index: isize) -> Tab {
        Self::ALL[index.rem_euclid(Self::COUNT as isize) as usize]
    }

    pub fn next(self) -> Tab {
        Self::from_index(self.index() as isize + 1)
    }

    pub fn previous(self) -> Tab {
        Self::from_index(self.index() as isize - 1)
    }

    pub fn title_key(self) -> &'static str {
        match self {
            Tab::Camera => "$PM_Camera",
            Tab::Time => "$PM_Time",
            Tab::Player => "$PM_Player",
            Tab::Filters => "$PM_Filters",
        }
    }

    pub fn reset_notification_key(self) -> &'static str {
        match self {
            Tab::Camera => "$PM_ResetNotifCamera",
            Tab::Time => "$PM_ResetNotifTime",
            Tab::Player => "$PM_ResetNotifPlayer",
            Tab::Filters => "$PM_ResetNotifFilters",
        }
    }
}

/// The four trackers, exclusively owned by one session controller.
#[derive(Debug, Clone, Default)]
pub struct TabSet {
    pub camera: CameraTab,
    pub time: TimeTab,
    pub player: PlayerTab,
    pub filters: FilterTab,
}

impl TabSet {
    pub fn capture_all<H: PhotoModeHost>(&mut self, host: &mut H) {
        self.camera.capture_original(host);
        self.time.capture_original(host);
        self.player.capture_original(host);
        self.filters.capture_original(host);
    }

    pub fn revert_tab<H: PhotoModeHost>(&mut self, host: &mut H, tab: Tab, reason: RevertReason) {
        match tab {
            Tab::Camera => self.camera.revert(host, reason),
            Tab::Time => self.time.revert(host, reason),
            Tab::Player => self.player.revert(host, reason),
            Tab::Filters => self.filters.revert(host, reason),
        }
    }

    pub fn revert_all<H: PhotoModeHost>(&mut self, host: &mut H, reason: RevertReason) {
        for tab in Tab::ALL {
            self.revert_tab(host, tab, reason);
        }
    }
}
