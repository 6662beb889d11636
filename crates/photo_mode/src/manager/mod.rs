//! Session controller: the Inactive/Active state machine, tab focus, and the
//! single revert path shared by manual resets and deactivation.

use thiserror::Error;
use tracing::{debug, info};

use crate::gate;
use crate::host::{surfaces, CameraMode, ControlFlags, PhotoModeHost, SoundCue};
use crate::settings::PhotoModeSettings;
use crate::tabs::{RevertReason, Tab, TabSet, RESET_ALL_NOTIFICATION};

/// Label injected into the journal's system tab.
pub const JOURNAL_ENTRY_KEY: &str = "$PM_Title_Menu";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionRefused {
    #[error("session is not allowed right now")]
    GateDenied,
    #[error("input is suppressed by an open console")]
    InputSuppressed,
    #[error("a text field has keyboard focus")]
    TextInputFocused,
    #[error("session is already active")]
    AlreadyActive,
    #[error("session is not active")]
    NotActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertScope {
    CurrentTabOnly,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabDirection {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Inactive,
    Running,
    /// The gate closed while active; the session was torn down this frame.
    EndedInvoluntarily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEvent<'a> {
    pub menu: &'a str,
    pub opening: bool,
}

impl<'a> MenuEvent<'a> {
    pub fn opened(menu: &'a str) -> Self {
        Self {
            menu,
            opening: true,
        }
    }

    pub fn closed(menu: &'a str) -> Self {
        Self {
            menu,
            opening: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub active: bool,
    pub current_tab: Tab,
    /// Set exactly while active.
    pub prior_camera_mode: Option<CameraMode>,
    pub menus_already_hidden: bool,
    pub reset_all_requested: bool,
    pub text_input_allowed: bool,
}

/// One-shot flags raised by transitions and consumed by a later frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingActions {
    pub revert_render_params: bool,
    pub reset_window: bool,
    pub reset_player_tabs: bool,
    pub update_keyboard_focus: bool,
}

/// What the presentation adapter should do this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentationCues {
    pub focus_first_control: bool,
    pub reset_window: bool,
    pub reset_player_tabs: bool,
}

impl PresentationCues {
    pub fn is_empty(&self) -> bool {
        !(self.focus_first_control || self.reset_window || self.reset_player_tabs)
    }
}

pub struct Manager<H: PhotoModeHost> {
    host: H,
    settings: PhotoModeSettings,
    state: SessionState,
    pending: PendingActions,
    tabs: TabSet,
}

impl<H: PhotoModeHost> Manager<H> {
    pub fn new(host: H, settings: PhotoModeSettings) -> Self {
        Self {
            host,
            settings,
            state: SessionState::default(),
            pending: PendingActions::default(),
            tabs: TabSet::default(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn settings(&self) -> PhotoModeSettings {
        self.settings
    }

    /// Takes effect at the next activation or camera reset.
    pub fn set_settings(&mut self, settings: PhotoModeSettings) {
        self.settings = settings;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pending(&self) -> PendingActions {
        self.pending
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn current_tab(&self) -> Tab {
        self.state.current_tab
    }

    pub fn tabs(&self) -> &TabSet {
        &self.tabs
    }

    /// Runs a live edit against the trackers. Returns `None` while inactive,
    /// since trackers hold no captured state then.
    pub fn edit<R>(&mut self, apply: impl FnOnce(&mut TabSet, &mut H) -> R) -> Option<R> {
        if !self.state.active {
            return None;
        }
        Some(apply(&mut self.tabs, &mut self.host))
    }

    pub fn activate(&mut self) -> Result<(), TransitionRefused> {
        if self.state.active {
            return self.refuse("activate", TransitionRefused::AlreadyActive);
        }
        if !gate::is_session_allowed(&self.host) {
            return self.refuse("activate", TransitionRefused::GateDenied);
        }
        if gate::should_suppress_input(&self.host) {
            return self.refuse("activate", TransitionRefused::InputSuppressed);
        }
        self.start_session();
        Ok(())
    }

    pub fn deactivate(&mut self) -> Result<(), TransitionRefused> {
        if !self.state.active {
            return self.refuse("deactivate", TransitionRefused::NotActive);
        }
        self.end_session();
        Ok(())
    }

    pub fn toggle_active(&mut self) -> Result<(), TransitionRefused> {
        if !self.state.active {
            self.activate()?;
            self.host.play_sound(SoundCue::Ok);
            return Ok(());
        }
        if self.host.wants_text_input() {
            return self.refuse("toggle_active", TransitionRefused::TextInputFocused);
        }
        self.end_session();
        self.host.play_sound(SoundCue::Cancel);
        Ok(())
    }

    /// Cycles focus over the four tabs, wrapping at both ends.
    pub fn navigate_tab(&mut self, direction: TabDirection) {
        self.state.current_tab = match direction {
            TabDirection::Previous => self.state.current_tab.previous(),
            TabDirection::Next => self.state.current_tab.next(),
        };
        self.pending.update_keyboard_focus = true;
        self.host.play_sound(SoundCue::TabSwitch);
    }

    /// Makes the next revert a full one, whatever scope it is called with.
    /// Changing tabs in between does not consume the request.
    pub fn request_reset_all(&mut self) -> Result<(), TransitionRefused> {
        if !self.state.active {
            return self.refuse("request_reset_all", TransitionRefused::NotActive);
        }
        self.state.reset_all_requested = true;
        Ok(())
    }

    /// Manual reset. Emits exactly one notification: the full-reset key when
    /// every tab was reverted, otherwise the focused tab's key.
    pub fn revert(&mut self, scope: RevertScope) -> Result<(), TransitionRefused> {
        if !self.state.active {
            return self.refuse("revert", TransitionRefused::NotActive);
        }
        if !gate::is_session_allowed(&self.host) {
            return self.refuse("revert", TransitionRefused::GateDenied);
        }

        let full = scope == RevertScope::All || self.state.reset_all_requested;
        let tab = self.state.current_tab;
        if full {
            self.revert_trackers(None, RevertReason::ResetAll);
        } else {
            self.revert_trackers(Some(tab), RevertReason::TabReset);
        }

        self.host.play_sound(SoundCue::Ok);
        let notification = if full {
            RESET_ALL_NOTIFICATION
        } else {
            tab.reset_notification_key()
        };
        self.host.notify(notification);
        self.state.reset_all_requested = false;

        info!(full, tab = ?tab, "revert_applied");
        Ok(())
    }

    /// Per-frame maintenance. Must be called once per frame while a session
    /// may be active.
    pub fn on_frame_update(&mut self) -> FrameStatus {
        if !self.state.active {
            return FrameStatus::Inactive;
        }
        if !gate::is_session_allowed(&self.host) {
            self.end_session();
            info!("session_ended_involuntarily");
            return FrameStatus::EndedInvoluntarily;
        }

        let wants_text_input = self.host.wants_text_input();
        if wants_text_input != self.state.text_input_allowed {
            self.state.text_input_allowed = wants_text_input;
            self.host.allow_text_input(wants_text_input);
        }
        self.host
            .toggle_controls(ControlFlags::SESSION_BLOCKED, false);

        self.tabs.time.on_frame_update(&self.host);
        FrameStatus::Running
    }

    pub fn update_render_params(&mut self) {
        if self.state.active {
            self.tabs.camera.update_render_params(&mut self.host);
        }
    }

    pub fn revert_render_params(&mut self) {
        if self.pending.revert_render_params {
            self.tabs.camera.revert_render_params(&mut self.host);
            self.pending.revert_render_params = false;
        }
    }

    pub fn view_roll(&self, fallback: f32) -> f32 {
        if self.state.active {
            self.tabs.camera.view_roll()
        } else {
            fallback
        }
    }

    /// Side door from the pause menu: opening the mod list from the journal
    /// enters photo mode directly.
    pub fn process_menu_event(&mut self, event: MenuEvent<'_>) {
        if !event.opening {
            return;
        }

        if event.menu == surfaces::JOURNAL_MENU {
            if !self.host.inject_journal_entry(JOURNAL_ENTRY_KEY) {
                debug!("journal_entry_skipped");
            }
        } else if event.menu == surfaces::MOD_MANAGER_MENU
            && self.host.is_surface_open(surfaces::JOURNAL_MENU)
        {
            self.host.hide_surface(surfaces::MOD_MANAGER_MENU);
            self.host.hide_surface(surfaces::JOURNAL_MENU);
            if self.state.active {
                debug!("menu_activation_ignored_already_active");
                return;
            }
            self.host.play_sound(SoundCue::Ok);
            self.start_session();
        }
    }

    /// Drains the pending presentation flags. Each raised flag is returned
    /// exactly once.
    pub fn take_presentation_cues(&mut self) -> PresentationCues {
        let mut cues = PresentationCues::default();

        if self.pending.reset_window {
            self.state.current_tab = Tab::Camera;
            cues.reset_window = true;
            self.pending.reset_window = false;
        }
        if self.pending.update_keyboard_focus {
            if self.state.current_tab == Tab::Player {
                self.pending.reset_player_tabs = true;
            }
            cues.focus_first_control = true;
            self.pending.update_keyboard_focus = false;
        }
        if self.pending.reset_player_tabs {
            cues.reset_player_tabs = true;
            self.pending.reset_player_tabs = false;
        }
        cues
    }

    fn start_session(&mut self) {
        self.tabs.capture_all(&mut self.host);

        let prior = self.host.camera_mode();
        self.state.prior_camera_mode = Some(prior);
        self.state.menus_already_hidden = !self.host.is_showing_menus();
        if self.pending.reset_window {
            self.state.current_tab = Tab::Camera;
        }

        self.host.set_saving_enabled(false);
        if prior != CameraMode::Free {
            self.host.toggle_free_camera();
        }

        self.tabs
            .camera
            .set_translate_speed(&mut self.host, self.settings.camera_translation_speed);
        if self.settings.freeze_time_on_start {
            self.tabs.time.set_frozen(&mut self.host, true);
        }

        self.state.active = true;
        info!(
            prior_camera = ?prior,
            characters = self.tabs.player.characters().len(),
            "session_activated"
        );
    }

    fn end_session(&mut self) {
        self.revert_trackers(None, RevertReason::SessionEnd);

        match self.state.prior_camera_mode.take() {
            Some(CameraMode::FirstPerson) => self.host.force_first_person(),
            Some(CameraMode::ThirdPerson) => self.host.force_third_person(),
            Some(CameraMode::Free) | None => {}
        }

        if !self.state.menus_already_hidden && !self.host.is_showing_menus() {
            self.host.show_menus(true);
        }
        self.pending.reset_window = true;
        self.pending.reset_player_tabs = true;

        self.state.text_input_allowed = false;
        self.host.allow_text_input(false);
        self.host.toggle_controls(ControlFlags::SESSION_BLOCKED, true);
        self.host.set_saving_enabled(true);

        self.state.reset_all_requested = false;
        self.state.active = false;
        info!("session_deactivated");
    }

    /// `None` reverts every tab.
    fn revert_trackers(&mut self, tab: Option<Tab>, reason: RevertReason) {
        match tab {
            Some(tab) => self.tabs.revert_tab(&mut self.host, tab, reason),
            None => self.tabs.revert_all(&mut self.host, reason),
        }

        let camera_reverted = tab.map_or(true, |tab| tab == Tab::Camera);
        if camera_reverted {
            if !reason.is_session_end() {
                self.tabs
                    .camera
                    .set_translate_speed(&mut self.host, self.settings.camera_translation_speed);
            }
            self.pending.revert_render_params = true;
        }
    }

    fn refuse(&self, operation: &'static str, reason: TransitionRefused) -> Result<(), TransitionRefused> {
        debug!(operation, reason = %reason, "transition_refused");
        Err(reason)
    }
}

#[cfg(test)]
mod tests;
