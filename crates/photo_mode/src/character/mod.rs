//! Transient edits to one actor, each independently revertible.

mod face;
mod loadout;
mod selector;

use tracing::debug;

use crate::host::{ActorId, FormId, PhotoModeHost, Vec3};

pub use face::{
    FaceMorphs, MorphOverride, EXPRESSION_COUNT, MODIFIER_COUNT, MORPH_STRENGTH_MAX, PHONEME_COUNT,
};
pub use selector::FormSelector;

pub const PLAYER_NAME_KEY: &str = "$PM_Player";
pub const POSITION_OFFSET_LIMIT: f32 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OriginalState {
    pub position: Vec3,
    pub rotation_z: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveState {
    pub position_offset: Vec3,
    pub rotation_degrees: f32,
    pub visible: bool,
}

impl Default for LiveState {
    fn default() -> Self {
        Self {
            position_offset: Vec3::ZERO,
            rotation_degrees: 0.0,
            visible: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Character {
    actor: ActorId,
    name: String,
    is_player: bool,
    original: OriginalState,
    current: LiveState,
    position_changed: bool,
    rotation_changed: bool,
    face: FaceMorphs,
    idles: FormSelector,
    playing_idle: Option<FormId>,
    weapons: FormSelector,
    armors: FormSelector,
    spells_right: FormSelector,
    spells_left: FormSelector,
    effect_shaders: FormSelector,
    effect_vfx: FormSelector,
    effects_played: bool,
    vfx_played: bool,
}

impl Character {
    /// Takes temporary ownership of `actor`. Non-player actors are parked on
    /// a do-nothing package until released.
    pub fn new<H: PhotoModeHost>(host: &mut H, actor: ActorId) -> Self {
        let is_player = host.player() == Some(actor);
        let name = if is_player {
            PLAYER_NAME_KEY.to_string()
        } else if host.is_unique(actor) {
            host.display_name(actor)
        } else {
            format!("{} [0x{:X}]", host.display_name(actor), actor.0)
        };

        let mut character = Self {
            actor,
            name,
            is_player,
            original: OriginalState::default(),
            current: LiveState::default(),
            position_changed: false,
            rotation_changed: false,
            face: FaceMorphs::default(),
            idles: FormSelector::default(),
            playing_idle: None,
            weapons: FormSelector::default(),
            armors: FormSelector::default(),
            spells_right: FormSelector::default(),
            spells_left: FormSelector::default(),
            effect_shaders: FormSelector::default(),
            effect_vfx: FormSelector::default(),
            effects_played: false,
            vfx_played: false,
        };
        character.capture_original(host);

        if !is_player {
            host.start_do_nothing_package(actor);
        }
        character
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_player(&self) -> bool {
        self.is_player
    }

    pub fn original(&self) -> OriginalState {
        self.original
    }

    pub fn current(&self) -> LiveState {
        self.current
    }

    pub fn face(&self) -> &FaceMorphs {
        &self.face
    }

    pub fn playing_idle(&self) -> Option<FormId> {
        self.playing_idle
    }

    pub fn idles(&self) -> &FormSelector {
        &self.idles
    }

    pub fn has_untracked_effects(&self) -> bool {
        self.effects_played || self.vfx_played
    }

    pub fn capture_original<H: PhotoModeHost>(&mut self, host: &H) {
        self.original = OriginalState {
            position: host.position(self.actor),
            rotation_z: host.rotation_z(self.actor),
            visible: host.is_culled(self.actor).is_some_and(|culled| !culled),
        };
        self.current = LiveState {
            position_offset: Vec3::ZERO,
            rotation_degrees: self.original.rotation_z.to_degrees(),
            visible: self.original.visible,
        };

        self.idles.init(host.idle_forms());
        self.effect_shaders.init(host.effect_shader_forms());
        self.effect_vfx.init(host.reference_effect_forms());
        self.init_loadout(host);
    }

    pub fn set_visible<H: PhotoModeHost>(&mut self, host: &mut H, visible: bool) {
        self.current.visible = visible;
        host.set_culled(self.actor, !visible);
    }

    pub fn set_rotation_degrees<H: PhotoModeHost>(&mut self, host: &mut H, degrees: f32) {
        let degrees = degrees.rem_euclid(360.0);
        self.current.rotation_degrees = degrees;
        host.set_rotation_z(self.actor, degrees.to_radians());
        self.rotation_changed = true;
    }

    /// Moves the actor relative to where it stood when captured. Horizontal
    /// components are limited to `POSITION_OFFSET_LIMIT` either way.
    pub fn set_position_offset<H: PhotoModeHost>(&mut self, host: &mut H, offset: Vec3) {
        let offset = Vec3 {
            x: offset.x.clamp(-POSITION_OFFSET_LIMIT, POSITION_OFFSET_LIMIT),
            y: offset.y.clamp(-POSITION_OFFSET_LIMIT, POSITION_OFFSET_LIMIT),
            z: offset.z,
        };
        self.current.position_offset = offset;
        host.set_position(self.actor, self.original.position + offset, true);
        self.position_changed = true;
    }

    pub fn apply_expression<H: PhotoModeHost>(
        &mut self,
        host: &mut H,
        expression: u32,
        strength: f32,
    ) {
        self.face
            .apply_expression(host.face_animation(self.actor), expression, strength);
    }

    pub fn apply_phoneme<H: PhotoModeHost>(&mut self, host: &mut H, index: u32, strength: f32) {
        self.face
            .apply_phoneme(host.face_animation(self.actor), index, strength);
    }

    pub fn apply_modifier<H: PhotoModeHost>(&mut self, host: &mut H, index: u32, strength: f32) {
        self.face
            .apply_modifier(host.face_animation(self.actor), index, strength);
    }

    /// Plays the idle at `index`, cancelling any idle this session started
    /// before. Returns whether the new idle is now playing.
    pub fn play_idle<H: PhotoModeHost>(&mut self, host: &mut H, index: usize) -> bool {
        let Some(idle) = self.idles.select(index) else {
            return false;
        };
        if self.playing_idle.take().is_some() {
            self.revert_idle(host);
        }

        let Some(process) = host.actor_process(self.actor) else {
            debug!(actor = self.actor.0, "idle_skipped_no_process");
            return false;
        };
        if process.play_idle(idle) {
            self.playing_idle = Some(idle);
            return true;
        }
        false
    }

    fn revert_idle<H: PhotoModeHost>(&self, host: &mut H) {
        if let Some(process) = host.actor_process(self.actor) {
            process.stop_current_idle();
            process.play_default_idle();
        }
    }

    /// Restores everything this character changed: transform, visibility,
    /// face, idle, loadout selection and effects.
    pub fn revert<H: PhotoModeHost>(&mut self, host: &mut H) {
        self.current.position_offset = Vec3::ZERO;
        self.current.rotation_degrees = self.original.rotation_z.to_degrees();

        if self.rotation_changed {
            host.set_rotation_z(self.actor, self.original.rotation_z);
        }
        if self.position_changed {
            host.set_position(self.actor, self.original.position, true);
        }
        if self.position_changed || self.rotation_changed {
            host.update_3d_position(self.actor);
            self.position_changed = false;
            self.rotation_changed = false;
        }

        if !self.current.visible || host.is_culled(self.actor) == Some(true) {
            host.set_culled(self.actor, false);
        }
        self.current.visible = true;

        self.face.revert(host.face_animation(self.actor));

        self.idles.reset();
        if self.playing_idle.take().is_some() {
            self.revert_idle(host);
        }

        self.reset_loadout();
        self.revert_effects(host);
    }

    /// Gives the actor back to its own AI. Call once the session no longer
    /// edits this character.
    pub fn release<H: PhotoModeHost>(&mut self, host: &mut H) {
        if !self.is_player {
            host.end_interrupt_package(self.actor);
        }
    }
}
