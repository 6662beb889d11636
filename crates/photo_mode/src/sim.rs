//! In-memory host used by the headless driver and by tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::character::{MODIFIER_COUNT, PHONEME_COUNT};
use crate::host::{
    ActiveEffect, ActorId, ActorProcess, ActorWorld, CameraMode, CameraRig, ColorGrading,
    ControlFlags, Controls, DepthOfField, EffectRegistry, FaceAnimation, FilterControl,
    FormCatalog, FormEntry, FormId, FormKind, Hand, ImagespaceSetting, Inventory, Notifier,
    PostProcess, ReferenceEffectForm, SoundCue, TimeControl, UiSurfaces, Vec3,
};

pub const SIM_PLAYER_ID: ActorId = ActorId(0x14);
pub const SIM_FOLLOWER_ID: ActorId = ActorId(0xA2C94);
pub const SIM_GUARD_ID: ActorId = ActorId(0x1_0A3E);

static EFFECTS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_effects_lock_poison_once(operation: &'static str) {
    if EFFECTS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "effect list lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimFace {
    pub expression_override: Option<(u32, f32)>,
    pub phonemes: [f32; PHONEME_COUNT],
    pub modifiers: [f32; MODIFIER_COUNT],
    pub reset_count: u32,
}

impl Default for SimFace {
    fn default() -> Self {
        Self {
            expression_override: None,
            phonemes: [0.0; PHONEME_COUNT],
            modifiers: [0.0; MODIFIER_COUNT],
            reset_count: 0,
        }
    }
}

impl SimFace {
    pub fn is_neutral(&self) -> bool {
        self.expression_override.is_none()
            && self.phonemes.iter().all(|value| *value == 0.0)
            && self.modifiers.iter().all(|value| *value == 0.0)
    }
}

impl FaceAnimation for SimFace {
    fn clear_expression_override(&mut self) {
        self.expression_override = None;
    }

    fn reset_to_neutral(&mut self, include_morphs: bool) {
        self.expression_override = None;
        if include_morphs {
            self.phonemes = [0.0; PHONEME_COUNT];
            self.modifiers = [0.0; MODIFIER_COUNT];
        }
        self.reset_count += 1;
    }

    fn set_expression_override(&mut self, expression: u32, value: f32) {
        self.expression_override = Some((expression, value));
    }

    fn set_phoneme(&mut self, index: u32, value: f32) {
        if let Some(slot) = self.phonemes.get_mut(index as usize) {
            *slot = value;
        }
    }

    fn set_modifier(&mut self, index: u32, value: f32) {
        if let Some(slot) = self.modifiers.get_mut(index as usize) {
            *slot = value;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimProcess {
    pub current_idle: Option<FormId>,
    pub default_idle_count: u32,
    pub unplayable: BTreeSet<FormId>,
}

impl ActorProcess for SimProcess {
    fn stop_current_idle(&mut self) {
        self.current_idle = None;
    }

    fn play_idle(&mut self, idle: FormId) -> bool {
        if self.unplayable.contains(&idle) {
            return false;
        }
        self.current_idle = Some(idle);
        true
    }

    fn play_default_idle(&mut self) {
        self.current_idle = None;
        self.default_idle_count += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimItem {
    pub entry: FormEntry,
    pub kind: FormKind,
    pub worn: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimActor {
    pub name: String,
    pub unique: bool,
    pub position: Vec3,
    pub rotation_z: f32,
    /// `None` models an actor whose 3D is not loaded; otherwise the cull flag.
    pub culled: Option<bool>,
    pub face: Option<SimFace>,
    pub process: Option<SimProcess>,
    pub items: Vec<SimItem>,
    pub spells: Vec<FormEntry>,
    pub equipped_left: Option<FormId>,
    pub equipped_right: Option<FormId>,
    pub do_nothing_package: bool,
    pub position_updates: u32,
    pub actor_updates: u32,
}

impl SimActor {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            unique: true,
            position,
            rotation_z: 0.0,
            culled: Some(false),
            face: Some(SimFace::default()),
            process: Some(SimProcess::default()),
            items: Vec::new(),
            spells: Vec::new(),
            equipped_left: None,
            equipped_right: None,
            do_nothing_package: false,
            position_updates: 0,
            actor_updates: 0,
        }
    }

    pub fn with_item(mut self, id: u32, name: &str, kind: FormKind, worn: bool) -> Self {
        self.items.push(SimItem {
            entry: FormEntry::new(id, name),
            kind,
            worn,
        });
        self
    }

    pub fn with_spell(mut self, id: u32, name: &str) -> Self {
        self.spells.push(FormEntry::new(id, name));
        self
    }

    pub fn is_visible(&self) -> bool {
        self.culled == Some(false)
    }

    fn item_mut(&mut self, item: FormId) -> Option<&mut SimItem> {
        self.items.iter_mut().find(|entry| entry.entry.id == item)
    }
}

#[derive(Debug)]
pub struct SimWorld {
    actors: BTreeMap<ActorId, SimActor>,
    player: Option<ActorId>,
    crosshair_target: Option<ActorId>,
    idles: Vec<FormEntry>,
    effect_shaders: Vec<FormEntry>,
    reference_effects: Vec<(FormEntry, ReferenceEffectForm)>,
    imagespaces: Vec<FormEntry>,
    effects: Mutex<Vec<ActiveEffect>>,
    camera_mode: CameraMode,
    free_camera_speed: f32,
    field_of_view: f32,
    depth_of_field: DepthOfField,
    open_surfaces: BTreeSet<String>,
    showing_menus: bool,
    wants_text_input: bool,
    journal_available: bool,
    journal_entries: Vec<String>,
    hidden_surfaces: Vec<String>,
    text_input_allowed: bool,
    disabled_controls: u32,
    saving_enabled: bool,
    freeze_time: bool,
    time_scale: f32,
    game_hour: f32,
    weather_override: Option<FormId>,
    imagespace: Option<ImagespaceSetting>,
    color_grading: ColorGrading,
    notifications: Vec<String>,
    sounds: Vec<SoundCue>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self {
            actors: BTreeMap::new(),
            player: None,
            crosshair_target: None,
            idles: Vec::new(),
            effect_shaders: Vec::new(),
            reference_effects: Vec::new(),
            imagespaces: Vec::new(),
            effects: Mutex::new(Vec::new()),
            camera_mode: CameraMode::ThirdPerson,
            free_camera_speed: 2.0,
            field_of_view: 75.0,
            depth_of_field: DepthOfField::default(),
            open_surfaces: BTreeSet::new(),
            showing_menus: true,
            wants_text_input: false,
            journal_available: true,
            journal_entries: Vec::new(),
            hidden_surfaces: Vec::new(),
            text_input_allowed: false,
            disabled_controls: 0,
            saving_enabled: true,
            freeze_time: false,
            time_scale: 20.0,
            game_hour: 12.0,
            weather_override: None,
            imagespace: None,
            color_grading: ColorGrading::default(),
            notifications: Vec::new(),
            sounds: Vec::new(),
        }
    }
}

impl SimWorld {
    /// A player with a small kit, one unique follower in the crosshair, one
    /// generic guard, and a handful of idles and effects.
    pub fn with_default_scene() -> Self {
        let mut world = Self::default();

        let player = SimActor::new("Prisoner", Vec3::new(100.0, 200.0, 0.0))
            .with_item(0x12EB7, "Iron Sword", FormKind::Weapon, false)
            .with_item(0x13957, "Steel Dagger", FormKind::Weapon, false)
            .with_item(0x13911, "Hide Armor", FormKind::Armor, true)
            .with_item(0x13913, "Hide Helmet", FormKind::Armor, false)
            .with_spell(0x12FCD, "Flames")
            .with_spell(0x12FCC, "Healing");
        world.insert_actor(SIM_PLAYER_ID, player);
        world.player = Some(SIM_PLAYER_ID);

        let follower = SimActor::new("Lydia", Vec3::new(160.0, 200.0, 0.0));
        world.insert_actor(SIM_FOLLOWER_ID, follower);
        world.crosshair_target = Some(SIM_FOLLOWER_ID);

        let mut guard = SimActor::new("Whiterun Guard", Vec3::new(-300.0, 50.0, 0.0));
        guard.unique = false;
        world.insert_actor(SIM_GUARD_ID, guard);

        world.idles = vec![
            FormEntry::new(0x7001, "Wave"),
            FormEntry::new(0x7002, "Sit Ground"),
            FormEntry::new(0x7003, "Salute"),
        ];
        world.effect_shaders = vec![
            FormEntry::new(0x8001, "Ghost Shader"),
            FormEntry::new(0x8002, "Frost Shader"),
        ];
        world.reference_effects = vec![
            (
                FormEntry::new(0x9001, "Soul Trap"),
                ReferenceEffectForm {
                    effect_shader: Some(FormId(0x8003)),
                    art_object: Some(FormId(0x9101)),
                    face_target: true,
                    attach_to_camera: false,
                },
            ),
            (
                FormEntry::new(0x9002, "Fire Cloak"),
                ReferenceEffectForm {
                    effect_shader: None,
                    art_object: Some(FormId(0x9102)),
                    face_target: false,
                    attach_to_camera: false,
                },
            ),
        ];
        world.imagespaces = vec![
            FormEntry::new(0xA001, "Sepia"),
            FormEntry::new(0xA002, "Noir"),
            FormEntry::new(0xA003, "Dreamy"),
        ];

        world
    }

    pub fn insert_actor(&mut self, id: ActorId, actor: SimActor) {
        self.actors.insert(id, actor);
    }

    pub fn actor(&self, id: ActorId) -> Option<&SimActor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut SimActor> {
        self.actors.get_mut(&id)
    }

    pub fn set_player(&mut self, player: Option<ActorId>) {
        self.player = player;
    }

    pub fn set_crosshair_target(&mut self, target: Option<ActorId>) {
        self.crosshair_target = target;
    }

    pub fn unload_renderable(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.culled = None;
        }
    }

    pub fn load_renderable(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            if actor.culled.is_none() {
                actor.culled = Some(false);
            }
        }
    }

    pub fn open_surface(&mut self, name: &str) {
        self.open_surfaces.insert(name.to_string());
    }

    pub fn close_surface(&mut self, name: &str) {
        self.open_surfaces.remove(name);
    }

    pub fn set_camera_mode(&mut self, mode: CameraMode) {
        self.camera_mode = mode;
    }

    pub fn set_wants_text_input(&mut self, wants: bool) {
        self.wants_text_input = wants;
    }

    pub fn set_journal_available(&mut self, available: bool) {
        self.journal_available = available;
    }

    pub fn journal_entries(&self) -> &[String] {
        &self.journal_entries
    }

    pub fn hidden_surfaces(&self) -> &[String] {
        &self.hidden_surfaces
    }

    pub fn text_input_allowed(&self) -> bool {
        self.text_input_allowed
    }

    pub fn controls_disabled(&self, flags: ControlFlags) -> bool {
        self.disabled_controls & flags.bits() == flags.bits()
    }

    pub fn saving_enabled(&self) -> bool {
        self.saving_enabled
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn sounds(&self) -> &[SoundCue] {
        &self.sounds
    }

    pub fn clear_feedback(&mut self) {
        self.notifications.clear();
        self.sounds.clear();
    }

    /// Advances the in-game clock unless time is frozen.
    pub fn advance_hours(&mut self, hours: f32) {
        if !self.freeze_time {
            self.game_hour = (self.game_hour + hours).rem_euclid(24.0);
        }
    }

    /// Adds an effect this session did not cause, the way the host simulation
    /// would between frames.
    pub fn spawn_foreign_effect(&self, target: ActorId, source: FormId) {
        self.lock_effects().push(ActiveEffect {
            target,
            source,
            finished: false,
        });
    }

    pub fn active_effects(&self) -> Vec<ActiveEffect> {
        self.lock_effects()
            .iter()
            .filter(|effect| !effect.finished)
            .cloned()
            .collect()
    }

    pub fn prune_finished_effects(&self) {
        self.lock_effects().retain(|effect| !effect.finished);
    }

    fn lock_effects(&self) -> MutexGuard<'_, Vec<ActiveEffect>> {
        match self.effects.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn_effects_lock_poison_once("lock");
                poisoned.into_inner()
            }
        }
    }
}

impl ActorWorld for SimWorld {
    fn player(&self) -> Option<ActorId> {
        self.player.filter(|id| self.actors.contains_key(id))
    }

    fn crosshair_target(&self) -> Option<ActorId> {
        self.crosshair_target
            .filter(|id| self.actors.contains_key(id))
    }

    fn has_renderable(&self, actor: ActorId) -> bool {
        self.actors
            .get(&actor)
            .is_some_and(|entry| entry.culled.is_some())
    }

    fn is_culled(&self, actor: ActorId) -> Option<bool> {
        self.actors.get(&actor).and_then(|entry| entry.culled)
    }

    fn set_culled(&mut self, actor: ActorId, culled: bool) {
        if let Some(state) = self
            .actors
            .get_mut(&actor)
            .and_then(|entry| entry.culled.as_mut())
        {
            *state = culled;
        }
    }

    fn display_name(&self, actor: ActorId) -> String {
        self.actors
            .get(&actor)
            .map(|entry| entry.name.clone())
            .unwrap_or_default()
    }

    fn is_unique(&self, actor: ActorId) -> bool {
        self.actors.get(&actor).is_some_and(|entry| entry.unique)
    }

    fn position(&self, actor: ActorId) -> Vec3 {
        self.actors
            .get(&actor)
            .map(|entry| entry.position)
            .unwrap_or_default()
    }

    fn rotation_z(&self, actor: ActorId) -> f32 {
        self.actors
            .get(&actor)
            .map(|entry| entry.rotation_z)
            .unwrap_or_default()
    }

    fn set_position(&mut self, actor: ActorId, position: Vec3, _immediate: bool) {
        if let Some(entry) = self.actors.get_mut(&actor) {
            entry.position = position;
        }
    }

    fn set_rotation_z(&mut self, actor: ActorId, radians: f32) {
        if let Some(entry) = self.actors.get_mut(&actor) {
            entry.rotation_z = radians;
        }
    }

    fn update_3d_position(&mut self, actor: ActorId) {
        if let Some(entry) = self.actors.get_mut(&actor) {
            entry.position_updates += 1;
        }
    }

    fn update_actor(&mut self, actor: ActorId) {
        if let Some(entry) = self.actors.get_mut(&actor) {
            entry.actor_updates += 1;
        }
    }

    fn start_do_nothing_package(&mut self, actor: ActorId) {
        if let Some(entry) = self.actors.get_mut(&actor) {
            entry.do_nothing_package = true;
        }
    }

    fn end_interrupt_package(&mut self, actor: ActorId) {
        if let Some(entry) = self.actors.get_mut(&actor) {
            entry.do_nothing_package = false;
        }
    }

    fn face_animation(&mut self, actor: ActorId) -> Option<&mut dyn FaceAnimation> {
        let face = self.actors.get_mut(&actor)?.face.as_mut()?;
        Some(face)
    }

    fn actor_process(&mut self, actor: ActorId) -> Option<&mut dyn ActorProcess> {
        let process = self.actors.get_mut(&actor)?.process.as_mut()?;
        Some(process)
    }
}

impl Inventory for SimWorld {
    fn inventory_items(&self, actor: ActorId, kind: FormKind) -> Vec<FormEntry> {
        self.actors
            .get(&actor)
            .map(|entry| {
                entry
                    .items
                    .iter()
                    .filter(|item| item.kind == kind)
                    .map(|item| item.entry.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn added_spells(&self, actor: ActorId) -> Vec<FormEntry> {
        self.actors
            .get(&actor)
            .map(|entry| entry.spells.clone())
            .unwrap_or_default()
    }

    fn equipped_object(&self, actor: ActorId, hand: Hand) -> Option<FormId> {
        let entry = self.actors.get(&actor)?;
        match hand {
            Hand::Left => entry.equipped_left,
            Hand::Right => entry.equipped_right,
        }
    }

    fn is_worn(&self, actor: ActorId, item: FormId) -> Option<bool> {
        self.actors
            .get(&actor)?
            .items
            .iter()
            .find(|entry| entry.entry.id == item)
            .map(|entry| entry.worn)
    }

    fn equip_object(&mut self, actor: ActorId, item: FormId) {
        let Some(entry) = self.actors.get_mut(&actor) else {
            return;
        };
        let Some(kind) = entry.item_mut(item).map(|found| {
            found.worn = true;
            found.kind
        }) else {
            return;
        };
        if kind == FormKind::Weapon {
            let previous = entry.equipped_right.replace(item);
            if let Some(previous) = previous.filter(|previous| *previous != item) {
                if let Some(found) = entry.item_mut(previous) {
                    found.worn = false;
                }
            }
        }
    }

    fn unequip_object(&mut self, actor: ActorId, item: FormId) {
        let Some(entry) = self.actors.get_mut(&actor) else {
            return;
        };
        if let Some(found) = entry.item_mut(item) {
            found.worn = false;
        }
        if entry.equipped_left == Some(item) {
            entry.equipped_left = None;
        }
        if entry.equipped_right == Some(item) {
            entry.equipped_right = None;
        }
    }

    fn equip_spell(&mut self, actor: ActorId, spell: FormId, hand: Hand) {
        let Some(entry) = self.actors.get_mut(&actor) else {
            return;
        };
        if !entry.spells.iter().any(|known| known.id == spell) {
            return;
        }
        match hand {
            Hand::Left => entry.equipped_left = Some(spell),
            Hand::Right => entry.equipped_right = Some(spell),
        }
    }

    fn deselect_spell(&mut self, actor: ActorId, spell: FormId) {
        let Some(entry) = self.actors.get_mut(&actor) else {
            return;
        };
        if entry.equipped_left == Some(spell) {
            entry.equipped_left = None;
        }
        if entry.equipped_right == Some(spell) {
            entry.equipped_right = None;
        }
    }
}

impl FormCatalog for SimWorld {
    fn idle_forms(&self) -> Vec<FormEntry> {
        self.idles.clone()
    }

    fn effect_shader_forms(&self) -> Vec<FormEntry> {
        self.effect_shaders.clone()
    }

    fn reference_effect_forms(&self) -> Vec<FormEntry> {
        self.reference_effects
            .iter()
            .map(|(entry, _)| entry.clone())
            .collect()
    }

    fn reference_effect(&self, form: FormId) -> Option<ReferenceEffectForm> {
        self.reference_effects
            .iter()
            .find(|(entry, _)| entry.id == form)
            .map(|(_, data)| *data)
    }

    fn imagespace_forms(&self) -> Vec<FormEntry> {
        self.imagespaces.clone()
    }
}

impl EffectRegistry for SimWorld {
    fn apply_effect_shader(
        &mut self,
        actor: ActorId,
        shader: FormId,
        _face_target: bool,
        _attach_to_camera: bool,
    ) {
        self.lock_effects().push(ActiveEffect {
            target: actor,
            source: shader,
            finished: false,
        });
    }

    fn apply_art_object(
        &mut self,
        actor: ActorId,
        art_object: FormId,
        _face_target: bool,
        _attach_to_camera: bool,
    ) {
        self.lock_effects().push(ActiveEffect {
            target: actor,
            source: art_object,
            finished: false,
        });
    }

    fn for_each_active_effect(&self, visit: &mut dyn FnMut(&mut ActiveEffect)) {
        let mut effects = self.lock_effects();
        for effect in effects.iter_mut() {
            visit(effect);
        }
    }
}

impl CameraRig for SimWorld {
    fn camera_mode(&self) -> CameraMode {
        self.camera_mode
    }

    fn toggle_free_camera(&mut self) {
        self.camera_mode = match self.camera_mode {
            CameraMode::Free => CameraMode::ThirdPerson,
            CameraMode::FirstPerson | CameraMode::ThirdPerson => CameraMode::Free,
        };
    }

    fn force_first_person(&mut self) {
        self.camera_mode = CameraMode::FirstPerson;
    }

    fn force_third_person(&mut self) {
        self.camera_mode = CameraMode::ThirdPerson;
    }

    fn free_camera_speed(&self) -> f32 {
        self.free_camera_speed
    }

    fn set_free_camera_speed(&mut self, speed: f32) {
        self.free_camera_speed = speed;
    }

    fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    fn set_field_of_view(&mut self, degrees: f32) {
        self.field_of_view = degrees;
    }
}

impl PostProcess for SimWorld {
    fn depth_of_field(&self) -> DepthOfField {
        self.depth_of_field
    }

    fn set_depth_of_field(&mut self, params: DepthOfField) {
        self.depth_of_field = params;
    }
}

impl UiSurfaces for SimWorld {
    fn is_surface_open(&self, name: &str) -> bool {
        self.open_surfaces.contains(name)
    }

    fn is_showing_menus(&self) -> bool {
        self.showing_menus
    }

    fn show_menus(&mut self, show: bool) {
        self.showing_menus = show;
    }

    fn hide_surface(&mut self, name: &str) {
        self.open_surfaces.remove(name);
        self.hidden_surfaces.push(name.to_string());
    }

    fn wants_text_input(&self) -> bool {
        self.wants_text_input
    }

    fn inject_journal_entry(&mut self, label_key: &str) -> bool {
        if !self.journal_available {
            return false;
        }
        self.journal_entries.push(label_key.to_string());
        true
    }
}

impl Controls for SimWorld {
    fn allow_text_input(&mut self, allow: bool) {
        self.text_input_allowed = allow;
    }

    fn toggle_controls(&mut self, flags: ControlFlags, enabled: bool) {
        if enabled {
            self.disabled_controls &= !flags.bits();
        } else {
            self.disabled_controls |= flags.bits();
        }
    }

    fn set_saving_enabled(&mut self, enabled: bool) {
        self.saving_enabled = enabled;
    }
}

impl TimeControl for SimWorld {
    fn freeze_time(&self) -> bool {
        self.freeze_time
    }

    fn set_freeze_time(&mut self, frozen: bool) {
        self.freeze_time = frozen;
    }

    fn time_scale(&self) -> f32 {
        self.time_scale
    }

    fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    fn game_hour(&self) -> f32 {
        self.game_hour
    }

    fn set_game_hour(&mut self, hour: f32) {
        self.game_hour = hour;
    }

    fn weather_override(&self) -> Option<FormId> {
        self.weather_override
    }

    fn set_weather_override(&mut self, weather: Option<FormId>) {
        self.weather_override = weather;
    }
}

impl FilterControl for SimWorld {
    fn imagespace(&self) -> Option<ImagespaceSetting> {
        self.imagespace
    }

    fn set_imagespace(&mut self, setting: Option<ImagespaceSetting>) {
        self.imagespace = setting;
    }

    fn color_grading(&self) -> ColorGrading {
        self.color_grading
    }

    fn set_color_grading(&mut self, grading: ColorGrading) {
        self.color_grading = grading;
    }
}

impl Notifier for SimWorld {
    fn notify(&mut self, message_key: &str) {
        self.notifications.push(message_key.to_string());
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }
}
