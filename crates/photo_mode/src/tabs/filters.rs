use crate::character::FormSelector;
use crate::host::{ColorGrading, ImagespaceSetting, PhotoModeHost};

use super::{CategoryTracker, RevertReason};

pub const DEFAULT_PRESET_STRENGTH: f32 = 1.0;

#[derive(Debug, Clone, Default)]
pub struct FilterTab {
    presets: FormSelector,
    original_imagespace: Option<ImagespaceSetting>,
    current_imagespace: Option<ImagespaceSetting>,
    original_grading: ColorGrading,
    current_grading: ColorGrading,
}

impl FilterTab {
    pub fn presets(&self) -> &FormSelector {
        &self.presets
    }

    pub fn imagespace(&self) -> Option<ImagespaceSetting> {
        self.current_imagespace
    }

    pub fn grading(&self) -> ColorGrading {
        self.current_grading
    }

    pub fn select_preset<H: PhotoModeHost>(&mut self, host: &mut H, index: usize, strength: f32) {
        let Some(form) = self.presets.select(index) else {
            return;
        };
        let setting = ImagespaceSetting {
            form,
            strength: strength.clamp(0.0, 1.0),
        };
        self.current_imagespace = Some(setting);
        host.set_imagespace(Some(setting));
    }

    /// No-op while no preset is applied.
    pub fn set_strength<H: PhotoModeHost>(&mut self, host: &mut H, strength: f32) {
        let Some(setting) = self.current_imagespace.as_mut() else {
            return;
        };
        setting.strength = strength.clamp(0.0, 1.0);
        host.set_imagespace(Some(*setting));
    }

    pub fn clear_preset<H: PhotoModeHost>(&mut self, host: &mut H) {
        self.current_imagespace = None;
        host.set_imagespace(None);
    }

    pub fn set_grading<H: PhotoModeHost>(&mut self, host: &mut H, grading: ColorGrading) {
        let grading = ColorGrading {
            saturation: grading.saturation.max(0.0),
            contrast: grading.contrast.max(0.0),
            brightness: grading.brightness.max(0.0),
            tint: grading.tint.clamp(0.0, 1.0),
        };
        self.current_grading = grading;
        host.set_color_grading(grading);
    }
}

impl CategoryTracker for FilterTab {
    fn capture_original<H: PhotoModeHost>(&mut self, host: &mut H) {
        self.presets.init(host.imagespace_forms());
        self.original_imagespace = host.imagespace();
        self.current_imagespace = self.original_imagespace;
        self.original_grading = host.color_grading();
        self.current_grading = self.original_grading;
    }

    /// A tab reset leaves the preset cursor where the user left it.
    fn revert<H: PhotoModeHost>(&mut self, host: &mut H, reason: RevertReason) {
        host.set_imagespace(self.original_imagespace);
        host.set_color_grading(self.original_grading);
        self.current_imagespace = self.original_imagespace;
        self.current_grading = self.original_grading;

        if reason.is_full() {
            self.presets.reset();
        }
    }
}
