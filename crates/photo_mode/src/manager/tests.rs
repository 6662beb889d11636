use super::*;
use crate::host::{
    CameraRig, ColorGrading, DepthOfField, FilterControl, FormId, PostProcess,
    TimeControl, UiSurfaces, Vec3,
};
use crate::sim::{SimWorld, SIM_FOLLOWER_ID, SIM_PLAYER_ID};

#[derive(Debug, Clone, PartialEq)]
struct WorldSnapshot {
    camera_mode: CameraMode,
    free_camera_speed: f32,
    field_of_view: f32,
    depth_of_field: DepthOfField,
    time_scale: f32,
    frozen: bool,
    game_hour: f32,
    weather: Option<FormId>,
    imagespace: Option<crate::host::ImagespaceSetting>,
    grading: ColorGrading,
    player_position: Vec3,
    player_rotation: f32,
    player_visible: bool,
    player_face_neutral: bool,
    player_idle: Option<FormId>,
    active_effects: usize,
}

fn snapshot(world: &SimWorld) -> WorldSnapshot {
    let player = world.actor(SIM_PLAYER_ID).expect("player");
    WorldSnapshot {
        camera_mode: world.camera_mode(),
        free_camera_speed: world.free_camera_speed(),
        field_of_view: world.field_of_view(),
        depth_of_field: world.depth_of_field(),
        time_scale: world.time_scale(),
        frozen: world.freeze_time(),
        game_hour: world.game_hour(),
        weather: world.weather_override(),
        imagespace: world.imagespace(),
        grading: world.color_grading(),
        player_position: player.position,
        player_rotation: player.rotation_z,
        player_visible: player.is_visible(),
        player_face_neutral: player.face.as_ref().map_or(true, |face| face.is_neutral()),
        player_idle: player
            .process
            .as_ref()
            .and_then(|process| process.current_idle),
        active_effects: world.active_effects().len(),
    }
}

fn manager() -> Manager<SimWorld> {
    Manager::new(SimWorld::with_default_scene(), PhotoModeSettings::default())
}

fn active_manager() -> Manager<SimWorld> {
    let mut manager = manager();
    manager.activate().expect("activate");
    manager.host_mut().clear_feedback();
    manager
}

/// Touches every tab so a revert has something to undo everywhere.
fn edit_everything(manager: &mut Manager<SimWorld>) {
    manager
        .edit(|tabs, host| {
            tabs.camera.set_field_of_view(host, 40.0);
            tabs.camera.set_view_roll(15.0);
            tabs.camera.set_depth_of_field(DepthOfField {
                enabled: true,
                focus_distance: 2.0,
                aperture: 2.8,
            });
            tabs.time.set_time_scale(host, 1.0);
            tabs.time.set_game_hour(host, 21.0);
            tabs.time.set_weather(host, Some(FormId(0xC8220)));
            tabs.filters.select_preset(host, 0, 0.5);
            tabs.filters.set_grading(
                host,
                ColorGrading {
                    saturation: 0.2,
                    ..ColorGrading::default()
                },
            );
            if let Some(player) = tabs.player.selected_mut() {
                player.set_visible(host, false);
                player.set_rotation_degrees(host, 45.0);
                player.set_position_offset(host, Vec3::new(30.0, -30.0, 0.0));
                player.apply_expression(host, 4, 80.0);
                player.apply_phoneme(host, 3, 50.0);
                player.apply_modifier(host, 1, 50.0);
                player.play_idle(host, 0);
                player.apply_effect_shader(host, 0);
                player.apply_vfx(host, 0);
            }
        })
        .expect("session is active");
    manager.update_render_params();
}

#[test]
fn activation_captures_and_switches_to_free_camera() {
    let mut manager = manager();
    manager.activate().expect("activate");

    let state = manager.state();
    assert!(state.active);
    assert_eq!(state.prior_camera_mode, Some(CameraMode::ThirdPerson));
    assert!(!state.menus_already_hidden);

    let world = manager.host();
    assert_eq!(world.camera_mode(), CameraMode::Free);
    assert!(!world.saving_enabled());
    assert_eq!(world.free_camera_speed(), 4.0);
    assert_eq!(manager.tabs().player.characters().len(), 2);
}

#[test]
fn already_free_camera_is_not_toggled() {
    let mut manager = manager();
    manager.host_mut().set_camera_mode(CameraMode::Free);
    manager.activate().expect("activate");
    assert_eq!(manager.host().camera_mode(), CameraMode::Free);

    manager.deactivate().expect("deactivate");
    assert_eq!(manager.host().camera_mode(), CameraMode::Free);
}

#[test]
fn activation_refused_while_blocking_surface_is_open() {
    let mut manager = manager();
    manager.host_mut().open_surface(surfaces::INVENTORY_MENU);

    assert_eq!(manager.activate(), Err(TransitionRefused::GateDenied));
    assert_eq!(manager.toggle_active(), Err(TransitionRefused::GateDenied));
    assert!(!manager.is_active());
    assert!(manager.host().sounds().is_empty());
    assert!(manager.host().saving_enabled());
}

#[test]
fn activation_refused_without_player_renderable() {
    let mut manager = manager();
    manager.host_mut().unload_renderable(SIM_PLAYER_ID);
    assert_eq!(manager.activate(), Err(TransitionRefused::GateDenied));
}

#[test]
fn console_suppresses_toggle() {
    let mut manager = manager();
    manager.host_mut().open_surface(surfaces::CONSOLE);
    assert_eq!(manager.toggle_active(), Err(TransitionRefused::InputSuppressed));
    assert!(!manager.is_active());
}

#[test]
fn double_transitions_are_refused() {
    let mut manager = manager();
    assert_eq!(manager.deactivate(), Err(TransitionRefused::NotActive));
    manager.activate().expect("activate");
    assert_eq!(manager.activate(), Err(TransitionRefused::AlreadyActive));
}

#[test]
fn toggle_plays_ok_then_cancel() {
    let mut manager = manager();
    manager.toggle_active().expect("on");
    manager.toggle_active().expect("off");
    assert_eq!(manager.host().sounds(), [SoundCue::Ok, SoundCue::Cancel]);
    assert!(!manager.is_active());
}

#[test]
fn toggle_off_refused_while_text_field_focused() {
    let mut manager = active_manager();
    manager.host_mut().set_wants_text_input(true);

    assert_eq!(manager.toggle_active(), Err(TransitionRefused::TextInputFocused));
    assert!(manager.is_active());
    assert!(manager.host().sounds().is_empty());
}

#[test]
fn deactivation_restores_first_person_controls_and_saving() {
    let mut manager = manager();
    manager.host_mut().set_camera_mode(CameraMode::FirstPerson);
    manager.activate().expect("activate");
    manager.host_mut().set_wants_text_input(true);
    assert_eq!(manager.on_frame_update(), FrameStatus::Running);
    assert!(manager.host().controls_disabled(ControlFlags::SESSION_BLOCKED));

    manager.deactivate().expect("deactivate");

    let world = manager.host();
    assert_eq!(world.camera_mode(), CameraMode::FirstPerson);
    assert!(world.saving_enabled());
    assert!(!world.text_input_allowed());
    assert!(!world.controls_disabled(ControlFlags::MOVEMENT));
    assert_eq!(world.free_camera_speed(), 2.0);
    assert_eq!(manager.state().prior_camera_mode, None);
}

#[test]
fn menus_hidden_during_session_are_shown_again() {
    let mut manager = active_manager();
    manager.host_mut().show_menus(false);
    manager.deactivate().expect("deactivate");
    assert!(manager.host().is_showing_menus());
}

#[test]
fn menus_hidden_by_user_before_session_stay_hidden() {
    let mut manager = manager();
    manager.host_mut().show_menus(false);
    manager.activate().expect("activate");
    assert!(manager.state().menus_already_hidden);

    manager.deactivate().expect("deactivate");
    assert!(!manager.host().is_showing_menus());
}

#[test]
fn reverting_a_tab_twice_matches_reverting_once() {
    for tab in Tab::ALL {
        let mut manager = active_manager();
        while manager.current_tab() != tab {
            manager.navigate_tab(TabDirection::Next);
        }
        edit_everything(&mut manager);

        manager.revert(RevertScope::CurrentTabOnly).expect("first");
        let once = snapshot(manager.host());
        manager.revert(RevertScope::CurrentTabOnly).expect("second");
        assert_eq!(snapshot(manager.host()), once, "tab {tab:?}");
    }
}

#[test]
fn full_session_roundtrip_restores_world() {
    let mut manager = manager();
    let before = snapshot(manager.host());

    manager.activate().expect("activate");
    edit_everything(&mut manager);
    assert_ne!(snapshot(manager.host()), before);

    manager.deactivate().expect("deactivate");
    manager.revert_render_params();

    assert_eq!(snapshot(manager.host()), before);
    assert!(manager.host().notifications().is_empty());
}

#[test]
fn revert_all_keeps_session_active_and_restores_world() {
    let mut manager = active_manager();
    let before = snapshot(manager.host());
    edit_everything(&mut manager);

    manager.revert(RevertScope::All).expect("revert");
    manager.revert_render_params();

    assert!(manager.is_active());
    assert_eq!(snapshot(manager.host()), before);
    assert_eq!(manager.host().notifications(), [RESET_ALL_NOTIFICATION]);
    assert_eq!(manager.host().sounds(), [SoundCue::Ok]);
}

#[test]
fn tab_reset_leaves_other_tabs_alone() {
    let mut manager = active_manager();
    manager.navigate_tab(TabDirection::Next);
    assert_eq!(manager.current_tab(), Tab::Time);
    edit_everything(&mut manager);

    manager.revert(RevertScope::CurrentTabOnly).expect("revert");

    let world = manager.host();
    assert_eq!(world.game_hour(), 12.0);
    assert_eq!(world.time_scale(), 20.0);
    assert_eq!(world.field_of_view(), 40.0);
    assert_eq!(world.color_grading().saturation, 0.2);
    assert!(!world.actor(SIM_PLAYER_ID).expect("player").is_visible());
    assert_eq!(world.notifications(), ["$PM_ResetNotifTime"]);
}

#[test]
fn switching_tabs_does_not_repeat_previous_notification() {
    let mut manager = active_manager();
    manager.navigate_tab(TabDirection::Next);
    manager.revert(RevertScope::CurrentTabOnly).expect("time");
    manager.navigate_tab(TabDirection::Previous);
    manager.revert(RevertScope::CurrentTabOnly).expect("camera");

    assert_eq!(
        manager.host().notifications(),
        ["$PM_ResetNotifTime", "$PM_ResetNotifCamera"]
    );
}

#[test]
fn camera_reset_reapplies_configured_speed_and_flags_render_revert() {
    let mut manager = active_manager();
    manager
        .edit(|tabs, host| tabs.camera.set_translate_speed(host, 11.0))
        .expect("active");
    manager.revert_render_params();
    assert!(!manager.pending().revert_render_params);

    manager.revert(RevertScope::CurrentTabOnly).expect("revert");
    assert_eq!(manager.host().free_camera_speed(), 4.0);
    assert!(manager.pending().revert_render_params);

    manager.revert_render_params();
    assert!(!manager.pending().revert_render_params);
}

#[test]
fn render_params_are_pushed_only_while_active() {
    let mut manager = manager();
    manager.update_render_params();
    assert_eq!(manager.host().depth_of_field(), DepthOfField::default());

    manager.activate().expect("activate");
    let params = DepthOfField {
        enabled: true,
        focus_distance: 8.0,
        aperture: 4.0,
    };
    manager
        .edit(|tabs, _| tabs.camera.set_depth_of_field(params))
        .expect("active");
    manager.update_render_params();
    assert_eq!(manager.host().depth_of_field(), params);

    manager.navigate_tab(TabDirection::Next);
    manager.revert(RevertScope::CurrentTabOnly).expect("time reset");
    manager.revert_render_params();
    assert_eq!(manager.host().depth_of_field(), params);
}

#[test]
fn view_roll_uses_fallback_while_inactive() {
    let mut manager = manager();
    assert_eq!(manager.view_roll(3.0), 3.0);

    manager.activate().expect("activate");
    manager
        .edit(|tabs, _| tabs.camera.set_view_roll(-20.0))
        .expect("active");
    assert_eq!(manager.view_roll(3.0), -20.0);
}

#[test]
fn navigating_forward_a_full_cycle_returns_to_start() {
    let mut manager = active_manager();
    for _ in 0..Tab::COUNT {
        manager.navigate_tab(TabDirection::Next);
    }
    assert_eq!(manager.current_tab(), Tab::Camera);

    manager.navigate_tab(TabDirection::Previous);
    assert_eq!(manager.current_tab(), Tab::Filters);
    manager.navigate_tab(TabDirection::Next);
    assert_eq!(manager.current_tab(), Tab::Camera);
    assert_eq!(manager.host().sounds().len(), Tab::COUNT + 2);
}

#[test]
fn gate_closing_forces_exit_with_one_full_revert() {
    let mut manager = active_manager();
    let restored_hour = manager.host().game_hour();
    edit_everything(&mut manager);

    manager.host_mut().open_surface(surfaces::MAP_MENU);
    assert_eq!(manager.on_frame_update(), FrameStatus::EndedInvoluntarily);
    assert!(!manager.is_active());

    let world = manager.host();
    let player = world.actor(SIM_PLAYER_ID).expect("player");
    assert_eq!(player.position, Vec3::new(100.0, 200.0, 0.0));
    assert!(player.is_visible());
    assert_eq!(player.face.as_ref().map(|face| face.reset_count), Some(1));
    assert_eq!(world.game_hour(), restored_hour);
    assert!(world.active_effects().is_empty());
    assert!(world.notifications().is_empty());

    assert_eq!(manager.on_frame_update(), FrameStatus::Inactive);
    let player = manager.host().actor(SIM_PLAYER_ID).expect("player");
    assert_eq!(player.face.as_ref().map(|face| face.reset_count), Some(1));
}

#[test]
fn frame_update_syncs_text_input_on_edges_only() {
    let mut manager = active_manager();
    assert_eq!(manager.on_frame_update(), FrameStatus::Running);
    assert!(!manager.state().text_input_allowed);

    manager.host_mut().set_wants_text_input(true);
    manager.on_frame_update();
    assert!(manager.host().text_input_allowed());
    assert!(manager.state().text_input_allowed);

    manager.host_mut().set_wants_text_input(false);
    manager.on_frame_update();
    assert!(!manager.host().text_input_allowed());
}

#[test]
fn frame_update_ticks_time_tab() {
    let mut manager = active_manager();
    manager.host_mut().advance_hours(2.0);
    manager.on_frame_update();
    assert_eq!(manager.tabs().time.current().game_hour, 14.0);
}

#[test]
fn freeze_on_start_is_applied_and_reverted() {
    let settings = PhotoModeSettings {
        freeze_time_on_start: true,
        ..PhotoModeSettings::default()
    };
    let mut manager = Manager::new(SimWorld::with_default_scene(), settings);
    manager.activate().expect("activate");
    assert!(manager.host().freeze_time());

    manager.deactivate().expect("deactivate");
    assert!(!manager.host().freeze_time());
}

#[test]
fn starting_idle_b_leaves_only_b_playing() {
    let mut manager = active_manager();
    manager
        .edit(|tabs, host| {
            let player = tabs.player.selected_mut().expect("player");
            player.play_idle(host, 0);
            player.play_idle(host, 1);
            assert_eq!(player.playing_idle(), Some(FormId(0x7002)));
        })
        .expect("active");

    let process = manager
        .host()
        .actor(SIM_PLAYER_ID)
        .and_then(|actor| actor.process.as_ref())
        .expect("process");
    assert_eq!(process.current_idle, Some(FormId(0x7002)));
}

#[test]
fn reset_all_request_widens_next_tab_reset_once() {
    let mut manager = active_manager();
    edit_everything(&mut manager);
    manager.request_reset_all().expect("request");
    assert!(manager.state().reset_all_requested);

    manager.revert(RevertScope::CurrentTabOnly).expect("revert");
    assert!(!manager.state().reset_all_requested);
    assert_eq!(manager.host().game_hour(), 12.0);
    assert_eq!(manager.host().notifications(), [RESET_ALL_NOTIFICATION]);

    manager.navigate_tab(TabDirection::Next);
    manager
        .edit(|tabs, host| {
            tabs.time.set_game_hour(host, 5.0);
            tabs.filters.select_preset(host, 1, 1.0);
        })
        .expect("active");
    manager.revert(RevertScope::CurrentTabOnly).expect("partial");
    assert_eq!(manager.host().game_hour(), 12.0);
    assert!(manager.host().imagespace().is_some());
}

#[test]
fn reset_all_request_survives_tab_switch() {
    let mut manager = active_manager();
    edit_everything(&mut manager);
    manager.request_reset_all().expect("request");
    manager.navigate_tab(TabDirection::Next);
    manager.navigate_tab(TabDirection::Next);
    assert!(manager.state().reset_all_requested);

    manager.revert(RevertScope::CurrentTabOnly).expect("revert");
    assert_eq!(manager.host().field_of_view(), 75.0);
    assert_eq!(manager.host().notifications(), [RESET_ALL_NOTIFICATION]);
}

#[test]
fn reset_all_request_does_not_outlive_session() {
    let mut manager = active_manager();
    manager.request_reset_all().expect("request");
    manager.deactivate().expect("deactivate");
    manager.activate().expect("activate");
    assert!(!manager.state().reset_all_requested);
}

#[test]
fn manual_revert_refused_when_inactive_or_gated() {
    let mut manager = manager();
    assert_eq!(
        manager.revert(RevertScope::All),
        Err(TransitionRefused::NotActive)
    );
    assert_eq!(manager.request_reset_all(), Err(TransitionRefused::NotActive));

    manager.activate().expect("activate");
    manager.host_mut().open_surface(surfaces::TWEEN_MENU);
    assert_eq!(
        manager.revert(RevertScope::All),
        Err(TransitionRefused::GateDenied)
    );
    assert!(manager.host().notifications().is_empty());
}

#[test]
fn edits_are_rejected_while_inactive() {
    let mut manager = manager();
    assert!(manager.edit(|_, _| ()).is_none());
}

#[test]
fn npc_released_only_at_session_end() {
    let mut manager = active_manager();
    manager.revert(RevertScope::All).expect("revert");
    assert!(manager.host().actor(SIM_FOLLOWER_ID).expect("npc").do_nothing_package);

    manager.deactivate().expect("deactivate");
    assert!(!manager.host().actor(SIM_FOLLOWER_ID).expect("npc").do_nothing_package);
    assert!(manager.tabs().player.characters().is_empty());
}

#[test]
fn journal_open_injects_entry() {
    let mut manager = manager();
    manager.process_menu_event(MenuEvent::opened(surfaces::JOURNAL_MENU));
    manager.process_menu_event(MenuEvent::closed(surfaces::JOURNAL_MENU));
    assert_eq!(manager.host().journal_entries(), [JOURNAL_ENTRY_KEY]);
}

#[test]
fn journal_injection_is_soft_when_unavailable() {
    let mut manager = manager();
    manager.host_mut().set_journal_available(false);
    manager.process_menu_event(MenuEvent::opened(surfaces::JOURNAL_MENU));
    assert!(manager.host().journal_entries().is_empty());
}

#[test]
fn mod_manager_from_journal_force_activates() {
    let mut manager = manager();
    manager.host_mut().open_surface(surfaces::JOURNAL_MENU);
    manager.host_mut().open_surface(surfaces::MOD_MANAGER_MENU);

    manager.process_menu_event(MenuEvent::opened(surfaces::MOD_MANAGER_MENU));

    assert!(manager.is_active());
    let world = manager.host();
    assert!(!world.is_surface_open(surfaces::JOURNAL_MENU));
    assert!(!world.is_surface_open(surfaces::MOD_MANAGER_MENU));
    assert_eq!(
        world.hidden_surfaces(),
        [surfaces::MOD_MANAGER_MENU, surfaces::JOURNAL_MENU]
    );
    assert_eq!(world.sounds(), [SoundCue::Ok]);
    assert_eq!(manager.on_frame_update(), FrameStatus::Running);
}

#[test]
fn mod_manager_alone_does_nothing() {
    let mut manager = manager();
    manager.host_mut().open_surface(surfaces::MOD_MANAGER_MENU);
    manager.process_menu_event(MenuEvent::opened(surfaces::MOD_MANAGER_MENU));
    assert!(!manager.is_active());
    assert!(manager.host().hidden_surfaces().is_empty());
}

#[test]
fn presentation_cues_are_drained_once() {
    let mut manager = active_manager();
    manager.navigate_tab(TabDirection::Next);
    manager.navigate_tab(TabDirection::Next);
    assert_eq!(manager.current_tab(), Tab::Player);

    let cues = manager.take_presentation_cues();
    assert!(cues.focus_first_control);
    assert!(cues.reset_player_tabs);
    assert!(!cues.reset_window);
    assert!(manager.take_presentation_cues().is_empty());
}

#[test]
fn deactivation_snaps_window_back_to_camera() {
    let mut manager = active_manager();
    manager.navigate_tab(TabDirection::Previous);
    manager.take_presentation_cues();
    manager.deactivate().expect("deactivate");

    manager.activate().expect("activate");
    assert_eq!(manager.current_tab(), Tab::Camera);

    let cues = manager.take_presentation_cues();
    assert!(cues.reset_window);
    assert!(cues.reset_player_tabs);
    assert!(manager.take_presentation_cues().is_empty());
}
