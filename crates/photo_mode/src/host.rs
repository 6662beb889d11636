//! Collaborator contracts the session controller is built against.
//!
//! Every engine singleton the controller touches (camera, UI, control map,
//! effect list, face animation) is reached through one of these traits. A
//! concrete host implements all of them; [`crate::sim::SimWorld`] is the
//! in-memory implementation used by tests and the headless driver.

use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    FirstPerson,
    ThirdPerson,
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Weapon,
    Armor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntry {
    pub id: FormId,
    pub name: String,
}

impl FormEntry {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: FormId(id),
            name: name.into(),
        }
    }
}

/// Data carried by a visual-effect form. Either part may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceEffectForm {
    pub effect_shader: Option<FormId>,
    pub art_object: Option<FormId>,
    pub face_target: bool,
    pub attach_to_camera: bool,
}

/// One live entry in the host's active-effect list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEffect {
    pub target: ActorId,
    pub source: FormId,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthOfField {
    pub enabled: bool,
    pub focus_distance: f32,
    pub aperture: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagespaceSetting {
    pub form: FormId,
    pub strength: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorGrading {
    pub saturation: f32,
    pub contrast: f32,
    pub brightness: f32,
    pub tint: f32,
}

impl Default for ColorGrading {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            contrast: 1.0,
            brightness: 1.0,
            tint: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Ok,
    Cancel,
    TabSwitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlFlags(u32);

impl ControlFlags {
    pub const MOVEMENT: ControlFlags = ControlFlags(1 << 0);
    pub const LOOKING: ControlFlags = ControlFlags(1 << 1);
    pub const ACTIVATE: ControlFlags = ControlFlags(1 << 2);
    pub const MENU: ControlFlags = ControlFlags(1 << 3);
    pub const POV_SWITCH: ControlFlags = ControlFlags(1 << 4);
    pub const WHEEL_ZOOM: ControlFlags = ControlFlags(1 << 5);
    pub const FIGHTING: ControlFlags = ControlFlags(1 << 6);
    pub const SNEAKING: ControlFlags = ControlFlags(1 << 7);
    pub const JUMPING: ControlFlags = ControlFlags(1 << 8);

    /// Everything the player can do that would disturb the scene while posing.
    pub const SESSION_BLOCKED: ControlFlags = ControlFlags(
        Self::MOVEMENT.0
            | Self::LOOKING.0
            | Self::ACTIVATE.0
            | Self::MENU.0
            | Self::POV_SWITCH.0
            | Self::WHEEL_ZOOM.0
            | Self::FIGHTING.0
            | Self::SNEAKING.0
            | Self::JUMPING.0,
    );

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: ControlFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Surface names the controller and the gate look for.
pub mod surfaces {
    pub const MAIN_MENU: &str = "Main Menu";
    pub const MIST_MENU: &str = "Mist Menu";
    pub const JOURNAL_MENU: &str = "Journal Menu";
    pub const INVENTORY_MENU: &str = "InventoryMenu";
    pub const MAGIC_MENU: &str = "MagicMenu";
    pub const MAP_MENU: &str = "MapMenu";
    pub const BOOK_MENU: &str = "Book Menu";
    pub const LOCKPICKING_MENU: &str = "Lockpicking Menu";
    pub const STATS_MENU: &str = "StatsMenu";
    pub const CONTAINER_MENU: &str = "ContainerMenu";
    pub const DIALOGUE_MENU: &str = "Dialogue Menu";
    pub const CRAFTING_MENU: &str = "Crafting Menu";
    pub const TWEEN_MENU: &str = "TweenMenu";
    pub const SLEEP_WAIT_MENU: &str = "Sleep/Wait Menu";
    pub const RACE_SEX_MENU: &str = "RaceSex Menu";
    pub const CUSTOM_MENU: &str = "CustomMenu";
    pub const CONSOLE: &str = "Console";
    pub const MOD_MANAGER_MENU: &str = "Mod Manager Menu";
}

pub trait FaceAnimation {
    fn clear_expression_override(&mut self);
    /// Returns the face to its rest pose. Phonemes and modifiers are only
    /// cleared when `include_morphs` is set.
    fn reset_to_neutral(&mut self, include_morphs: bool);
    fn set_expression_override(&mut self, expression: u32, value: f32);
    fn set_phoneme(&mut self, index: u32, value: f32);
    fn set_modifier(&mut self, index: u32, value: f32);
}

pub trait ActorProcess {
    fn stop_current_idle(&mut self);
    fn play_idle(&mut self, idle: FormId) -> bool;
    fn play_default_idle(&mut self);
}

pub trait ActorWorld {
    fn player(&self) -> Option<ActorId>;
    fn crosshair_target(&self) -> Option<ActorId>;
    fn has_renderable(&self, actor: ActorId) -> bool;
    /// `None` when the actor has no renderable.
    fn is_culled(&self, actor: ActorId) -> Option<bool>;
    fn set_culled(&mut self, actor: ActorId, culled: bool);
    fn display_name(&self, actor: ActorId) -> String;
    fn is_unique(&self, actor: ActorId) -> bool;
    fn position(&self, actor: ActorId) -> Vec3;
    fn rotation_z(&self, actor: ActorId) -> f32;
    fn set_position(&mut self, actor: ActorId, position: Vec3, immediate: bool);
    fn set_rotation_z(&mut self, actor: ActorId, radians: f32);
    fn update_3d_position(&mut self, actor: ActorId);
    fn update_actor(&mut self, actor: ActorId);
    fn start_do_nothing_package(&mut self, actor: ActorId);
    fn end_interrupt_package(&mut self, actor: ActorId);
    fn face_animation(&mut self, actor: ActorId) -> Option<&mut dyn FaceAnimation>;
    fn actor_process(&mut self, actor: ActorId) -> Option<&mut dyn ActorProcess>;
}

pub trait Inventory {
    fn inventory_items(&self, actor: ActorId, kind: FormKind) -> Vec<FormEntry>;
    fn added_spells(&self, actor: ActorId) -> Vec<FormEntry>;
    fn equipped_object(&self, actor: ActorId, hand: Hand) -> Option<FormId>;
    /// `None` when the actor does not carry the item.
    fn is_worn(&self, actor: ActorId, item: FormId) -> Option<bool>;
    fn equip_object(&mut self, actor: ActorId, item: FormId);
    fn unequip_object(&mut self, actor: ActorId, item: FormId);
    fn equip_spell(&mut self, actor: ActorId, spell: FormId, hand: Hand);
    fn deselect_spell(&mut self, actor: ActorId, spell: FormId);
}

pub trait FormCatalog {
    fn idle_forms(&self) -> Vec<FormEntry>;
    fn effect_shader_forms(&self) -> Vec<FormEntry>;
    fn reference_effect_forms(&self) -> Vec<FormEntry>;
    fn reference_effect(&self, form: FormId) -> Option<ReferenceEffectForm>;
    fn imagespace_forms(&self) -> Vec<FormEntry>;
}

/// The host's active-effect list. It may be mutated by the simulation at
/// any time, so implementations lock it for the duration of one call only.
pub trait EffectRegistry {
    fn apply_effect_shader(
        &mut self,
        actor: ActorId,
        shader: FormId,
        face_target: bool,
        attach_to_camera: bool,
    );
    fn apply_art_object(
        &mut self,
        actor: ActorId,
        art_object: FormId,
        face_target: bool,
        attach_to_camera: bool,
    );
    fn for_each_active_effect(&self, visit: &mut dyn FnMut(&mut ActiveEffect));
}

pub trait CameraRig {
    fn camera_mode(&self) -> CameraMode;
    fn toggle_free_camera(&mut self);
    fn force_first_person(&mut self);
    fn force_third_person(&mut self);
    fn free_camera_speed(&self) -> f32;
    fn set_free_camera_speed(&mut self, speed: f32);
    fn field_of_view(&self) -> f32;
    fn set_field_of_view(&mut self, degrees: f32);
}

/// Post-processing parameters pushed through the render pipeline rather than
/// game state.
pub trait PostProcess {
    fn depth_of_field(&self) -> DepthOfField;
    fn set_depth_of_field(&mut self, params: DepthOfField);
}

pub trait UiSurfaces {
    fn is_surface_open(&self, name: &str) -> bool;
    fn is_showing_menus(&self) -> bool;
    fn show_menus(&mut self, show: bool);
    fn hide_surface(&mut self, name: &str);
    fn wants_text_input(&self) -> bool;
    /// Returns false when the journal view is not available.
    fn inject_journal_entry(&mut self, label_key: &str) -> bool;
}

pub trait Controls {
    fn allow_text_input(&mut self, allow: bool);
    fn toggle_controls(&mut self, flags: ControlFlags, enabled: bool);
    fn set_saving_enabled(&mut self, enabled: bool);
}

pub trait TimeControl {
    fn freeze_time(&self) -> bool;
    fn set_freeze_time(&mut self, frozen: bool);
    fn time_scale(&self) -> f32;
    fn set_time_scale(&mut self, scale: f32);
    fn game_hour(&self) -> f32;
    fn set_game_hour(&mut self, hour: f32);
    fn weather_override(&self) -> Option<FormId>;
    fn set_weather_override(&mut self, weather: Option<FormId>);
}

pub trait FilterControl {
    fn imagespace(&self) -> Option<ImagespaceSetting>;
    fn set_imagespace(&mut self, setting: Option<ImagespaceSetting>);
    fn color_grading(&self) -> ColorGrading;
    fn set_color_grading(&mut self, grading: ColorGrading);
}

pub trait Notifier {
    fn notify(&mut self, message_key: &str);
    fn play_sound(&mut self, cue: SoundCue);
}

pub trait PhotoModeHost:
    ActorWorld
    + Inventory
    + FormCatalog
    + EffectRegistry
    + CameraRig
    + PostProcess
    + UiSurfaces
    + Controls
    + TimeControl
    + FilterControl
    + Notifier
{
}

impl<T> PhotoModeHost for T where
    T: ActorWorld
        + Inventory
        + FormCatalog
        + EffectRegistry
        + CameraRig
        + PostProcess
        + UiSurfaces
        + Controls
        + TimeControl
        + FilterControl
        + Notifier
{
}
