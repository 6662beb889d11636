use crate::host::{DepthOfField, PhotoModeHost};

use super::{CategoryTracker, RevertReason};

pub const FOV_MIN: f32 = 5.0;
pub const FOV_MAX: f32 = 150.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraValues {
    pub field_of_view: f32,
    pub view_roll: f32,
    pub translate_speed: f32,
}

/// Camera state split over two channels: game state is reverted through
/// [`CategoryTracker::revert`], depth of field only through the render
/// parameter calls.
#[derive(Debug, Clone, Default)]
pub struct CameraTab {
    original: CameraValues,
    current: CameraValues,
    original_dof: DepthOfField,
    current_dof: DepthOfField,
}

impl CameraTab {
    pub fn original(&self) -> CameraValues {
        self.original
    }

    pub fn current(&self) -> CameraValues {
        self.current
    }

    pub fn view_roll(&self) -> f32 {
        self.current.view_roll
    }

    pub fn depth_of_field(&self) -> DepthOfField {
        self.current_dof
    }

    pub fn set_field_of_view<H: PhotoModeHost>(&mut self, host: &mut H, degrees: f32) {
        let degrees = degrees.clamp(FOV_MIN, FOV_MAX);
        self.current.field_of_view = degrees;
        host.set_field_of_view(degrees);
    }

    /// Roll is not host state; the host reads it back through the view roll
    /// hook every frame.
    pub fn set_view_roll(&mut self, degrees: f32) {
        self.current.view_roll = degrees.clamp(-180.0, 180.0);
    }

    pub fn set_translate_speed<H: PhotoModeHost>(&mut self, host: &mut H, speed: f32) {
        let speed = speed.max(0.0);
        self.current.translate_speed = speed;
        host.set_free_camera_speed(speed);
    }

    pub fn set_depth_of_field(&mut self, params: DepthOfField) {
        self.current_dof = DepthOfField {
            focus_distance: params.focus_distance.max(0.0),
            aperture: params.aperture.max(0.0),
            ..params
        };
    }

    pub fn update_render_params<H: PhotoModeHost>(&self, host: &mut H) {
        host.set_depth_of_field(self.current_dof);
    }

    pub fn revert_render_params<H: PhotoModeHost>(&self, host: &mut H) {
        host.set_depth_of_field(self.original_dof);
    }
}

impl CategoryTracker for CameraTab {
    fn capture_original<H: PhotoModeHost>(&mut self, host: &mut H) {
        self.original = CameraValues {
            field_of_view: host.field_of_view(),
            view_roll: 0.0,
            translate_speed: host.free_camera_speed(),
        };
        self.current = self.original;
        self.original_dof = host.depth_of_field();
        self.current_dof = self.original_dof;
    }

    /// Translation speed is only handed back on session end; a manual reset
    /// leaves it to the caller's configured default.
    fn revert<H: PhotoModeHost>(&mut self, host: &mut H, reason: RevertReason) {
        host.set_field_of_view(self.original.field_of_view);
        self.current.field_of_view = self.original.field_of_view;
        self.current.view_roll = self.original.view_roll;
        self.current_dof = self.original_dof;

        if reason.is_session_end() {
            host.set_free_camera_speed(self.original.translate_speed);
            self.current.translate_speed = self.original.translate_speed;
        }
    }
}
