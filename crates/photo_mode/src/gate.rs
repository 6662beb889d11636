use crate::host::{surfaces, ActorWorld, UiSurfaces};

/// Surfaces that own the screen; photo mode cannot coexist with any of them.
pub const BLOCKING_SURFACES: [&str; 16] = [
    surfaces::MAIN_MENU,
    surfaces::MIST_MENU,
    surfaces::JOURNAL_MENU,
    surfaces::INVENTORY_MENU,
    surfaces::MAGIC_MENU,
    surfaces::MAP_MENU,
    surfaces::BOOK_MENU,
    surfaces::LOCKPICKING_MENU,
    surfaces::STATS_MENU,
    surfaces::CONTAINER_MENU,
    surfaces::DIALOGUE_MENU,
    surfaces::CRAFTING_MENU,
    surfaces::TWEEN_MENU,
    surfaces::SLEEP_WAIT_MENU,
    surfaces::RACE_SEX_MENU,
    surfaces::CUSTOM_MENU,
];

pub fn is_session_allowed<H>(host: &H) -> bool
where
    H: ActorWorld + UiSurfaces + ?Sized,
{
    let Some(player) = host.player() else {
        return false;
    };
    if !host.has_renderable(player) {
        return false;
    }

    !BLOCKING_SURFACES
        .iter()
        .any(|surface| host.is_surface_open(surface))
}

pub fn should_suppress_input<H>(host: &H) -> bool
where
    H: UiSurfaces + ?Sized,
{
    host.is_surface_open(surfaces::CONSOLE)
}
