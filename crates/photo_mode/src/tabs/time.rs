use crate::host::{FormId, PhotoModeHost};

use super::{CategoryTracker, RevertReason};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeValues {
    pub time_scale: f32,
    pub frozen: bool,
    pub game_hour: f32,
    pub weather: Option<FormId>,
}

#[derive(Debug, Clone, Default)]
pub struct TimeTab {
    original: TimeValues,
    current: TimeValues,
    hour_changed: bool,
}

impl TimeTab {
    pub fn original(&self) -> TimeValues {
        self.original
    }

    pub fn current(&self) -> TimeValues {
        self.current
    }

    pub fn set_time_scale<H: PhotoModeHost>(&mut self, host: &mut H, scale: f32) {
        let scale = scale.max(0.0);
        self.current.time_scale = scale;
        host.set_time_scale(scale);
    }

    pub fn set_frozen<H: PhotoModeHost>(&mut self, host: &mut H, frozen: bool) {
        self.current.frozen = frozen;
        host.set_freeze_time(frozen);
    }

    pub fn set_game_hour<H: PhotoModeHost>(&mut self, host: &mut H, hour: f32) {
        let hour = hour.rem_euclid(24.0);
        self.current.game_hour = hour;
        host.set_game_hour(hour);
        self.hour_changed = true;
    }

    pub fn set_weather<H: PhotoModeHost>(&mut self, host: &mut H, weather: Option<FormId>) {
        self.current.weather = weather;
        host.set_weather_override(weather);
    }

    /// Keeps the displayed hour in step with the world clock while it runs.
    pub fn on_frame_update<H: PhotoModeHost>(&mut self, host: &H) {
        if !host.freeze_time() {
            self.current.game_hour = host.game_hour();
        }
        self.current.frozen = host.freeze_time();
    }
}

impl CategoryTracker for TimeTab {
    fn capture_original<H: PhotoModeHost>(&mut self, host: &mut H) {
        self.original = TimeValues {
            time_scale: host.time_scale(),
            frozen: host.freeze_time(),
            game_hour: host.game_hour(),
            weather: host.weather_override(),
        };
        self.current = self.original;
        self.hour_changed = false;
    }

    /// The clock only jumps back if the hour was edited; time that simply
    /// passed during the session is kept.
    fn revert<H: PhotoModeHost>(&mut self, host: &mut H, _reason: RevertReason) {
        host.set_time_scale(self.original.time_scale);
        host.set_freeze_time(self.original.frozen);
        host.set_weather_override(self.original.weather);
        if self.hour_changed {
            host.set_game_hour(self.original.game_hour);
            self.hour_changed = false;
        }

        self.current = TimeValues {
            game_hour: host.game_hour(),
            ..self.original
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TimeControl;
    use crate::sim::SimWorld;

    fn captured() -> (SimWorld, TimeTab) {
        let mut world = SimWorld::with_default_scene();
        let mut tab = TimeTab::default();
        tab.capture_original(&mut world);
        (world, tab)
    }

    #[test]
    fn frame_tick_mirrors_running_clock() {
        let (mut world, mut tab) = captured();
        world.advance_hours(1.5);
        tab.on_frame_update(&world);
        assert_eq!(tab.current().game_hour, 13.5);
    }

    #[test]
    fn frame_tick_holds_hour_while_frozen() {
        let (mut world, mut tab) = captured();
        tab.set_frozen(&mut world, true);
        world.advance_hours(3.0);
        tab.on_frame_update(&world);
        assert_eq!(tab.current().game_hour, 12.0);
        assert!(tab.current().frozen);
    }

    #[test]
    fn revert_restores_edited_values() {
        let (mut world, mut tab) = captured();
        tab.set_time_scale(&mut world, 0.0);
        tab.set_frozen(&mut world, true);
        tab.set_game_hour(&mut world, 27.0);
        tab.set_weather(&mut world, Some(FormId(0xC8220)));
        assert_eq!(world.game_hour(), 3.0);

        tab.revert(&mut world, RevertReason::TabReset);

        assert_eq!(world.time_scale(), 20.0);
        assert!(!world.freeze_time());
        assert_eq!(world.game_hour(), 12.0);
        assert_eq!(world.weather_override(), None);
        assert_eq!(tab.current(), tab.original());
    }

    #[test]
    fn elapsed_time_survives_revert_when_hour_untouched() {
        let (mut world, mut tab) = captured();
        world.advance_hours(2.0);
        tab.revert(&mut world, RevertReason::ResetAll);
        tab.revert(&mut world, RevertReason::ResetAll);
        assert_eq!(world.game_hour(), 14.0);
        assert_eq!(tab.current().game_hour, 14.0);
    }
}
