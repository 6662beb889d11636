use std::io::{self, Write};

use photo_mode::host::{CameraRig, ColorGrading, TimeControl, Vec3};
use photo_mode::sim::SimWorld;
use photo_mode::{
    FrameStatus, Manager, MenuEvent, PhotoModeSettings, RevertScope, TabSet, TransitionRefused,
};
use tracing::info;

use crate::script::{Command, ScriptLine};

const FRAMES_PER_SECOND: f32 = 60.0;
const SECONDS_PER_HOUR: f32 = 3600.0;

/// Replays script commands against a session over the simulated world and
/// reports one line per command.
pub struct ScriptRunner {
    manager: Manager<SimWorld>,
}

impl ScriptRunner {
    pub fn new(world: SimWorld, settings: PhotoModeSettings) -> Self {
        Self {
            manager: Manager::new(world, settings),
        }
    }

    pub fn manager(&self) -> &Manager<SimWorld> {
        &self.manager
    }

    pub fn run<W: Write>(&mut self, lines: &[ScriptLine], out: &mut W) -> io::Result<()> {
        for line in lines {
            let outcome = self.apply(&line.command);
            writeln!(out, "{:>3} {:<28} {}", line.line, line.text, outcome)?;
            for message in self.drain_notifications() {
                writeln!(out, "    notify {message}")?;
            }
        }
        info!(commands = lines.len(), "script_finished");
        Ok(())
    }

    fn apply(&mut self, command: &Command) -> String {
        match command {
            Command::Toggle => transition(self.manager.toggle_active()),
            Command::Activate => transition(self.manager.activate()),
            Command::Deactivate => transition(self.manager.deactivate()),
            Command::Tab(direction) => {
                self.manager.navigate_tab(*direction);
                format!("tab={:?}", self.manager.current_tab())
            }
            Command::Reset => transition(self.manager.revert(RevertScope::CurrentTabOnly)),
            Command::ResetAll => transition(self.manager.request_reset_all()),
            Command::Frame(count) => self.run_frames(*count),
            Command::Open(surface) => {
                self.manager.host_mut().open_surface(surface);
                "opened".to_string()
            }
            Command::Close(surface) => {
                self.manager.host_mut().close_surface(surface);
                "closed".to_string()
            }
            Command::Menu(surface) => {
                self.manager.host_mut().open_surface(surface);
                self.manager.process_menu_event(MenuEvent::opened(surface));
                self.status()
            }
            Command::Status => self.status(),
            edit => self.apply_edit(edit),
        }
    }

    fn apply_edit(&mut self, command: &Command) -> String {
        match self
            .manager
            .edit(|tabs, host| apply_to_tabs(tabs, host, command))
        {
            Some(true) => "ok".to_string(),
            Some(false) => "ignored: no character selected".to_string(),
            None => "ignored: session inactive".to_string(),
        }
    }

    /// One simulated frame: render channel, maintenance, then the host clock
    /// and effect list move on by themselves.
    fn run_frames(&mut self, count: u32) -> String {
        let mut last = FrameStatus::Inactive;
        for _ in 0..count {
            self.manager.revert_render_params();
            last = self.manager.on_frame_update();
            self.manager.update_render_params();
            self.manager.take_presentation_cues();

            let world = self.manager.host_mut();
            let hours = world.time_scale() / SECONDS_PER_HOUR / FRAMES_PER_SECOND;
            world.advance_hours(hours);
            world.prune_finished_effects();

            if last == FrameStatus::EndedInvoluntarily {
                break;
            }
        }
        format!("frame={last:?}")
    }

    fn drain_notifications(&mut self) -> Vec<String> {
        let world = self.manager.host_mut();
        let messages = world.notifications().to_vec();
        world.clear_feedback();
        messages
    }

    fn status(&self) -> String {
        let world = self.manager.host();
        let selected = self
            .manager
            .tabs()
            .player
            .selected()
            .map_or("-", |character| character.name());
        format!(
            "active={} tab={:?} camera={:?} hour={:.2} frozen={} selected={} effects={}",
            self.manager.is_active(),
            self.manager.current_tab(),
            world.camera_mode(),
            world.game_hour(),
            world.freeze_time(),
            selected,
            world.active_effects().len(),
        )
    }
}

fn transition(result: Result<(), TransitionRefused>) -> String {
    match result {
        Ok(()) => "ok".to_string(),
        Err(reason) => format!("refused: {reason}"),
    }
}

/// Returns false when the command targets a character and none is selected.
fn apply_to_tabs(tabs: &mut TabSet, host: &mut SimWorld, command: &Command) -> bool {
    match command {
        Command::Fov(degrees) => tabs.camera.set_field_of_view(host, *degrees),
        Command::Roll(degrees) => tabs.camera.set_view_roll(*degrees),
        Command::Freeze(frozen) => tabs.time.set_frozen(host, *frozen),
        Command::Hour(hour) => tabs.time.set_game_hour(host, *hour),
        Command::Grade {
            saturation,
            contrast,
            brightness,
        } => {
            let grading = ColorGrading {
                saturation: *saturation,
                contrast: *contrast,
                brightness: *brightness,
                ..tabs.filters.grading()
            };
            tabs.filters.set_grading(host, grading);
        }
        Command::Select(index) => tabs.player.select(*index),
        character_command => {
            let Some(character) = tabs.player.selected_mut() else {
                return false;
            };
            match character_command {
                Command::Show => character.set_visible(host, true),
                Command::Hide => character.set_visible(host, false),
                Command::Rotate(degrees) => character.set_rotation_degrees(host, *degrees),
                Command::Move { x, y } => {
                    character.set_position_offset(host, Vec3::new(*x, *y, 0.0))
                }
                Command::Expression { index, strength } => {
                    character.apply_expression(host, *index, *strength)
                }
                Command::Phoneme { index, strength } => {
                    character.apply_phoneme(host, *index, *strength)
                }
                Command::Modifier { index, strength } => {
                    character.apply_modifier(host, *index, *strength)
                }
                Command::Idle(index) => {
                    character.play_idle(host, *index);
                }
                Command::Weapon(index) => character.toggle_weapon(host, *index),
                Command::Armor(index) => character.toggle_armor(host, *index),
                Command::Spell { hand, index } => character.toggle_spell(host, *hand, *index),
                Command::Shader(index) => character.apply_effect_shader(host, *index),
                Command::Vfx(index) => character.apply_vfx(host, *index),
                _ => {}
            }
        }
    }
    true
}
