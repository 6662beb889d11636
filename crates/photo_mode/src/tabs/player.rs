use tracing::debug;

use crate::character::Character;
use crate::host::{ActorId, PhotoModeHost};

use super::{CategoryTracker, RevertReason};

/// The characters being posed this session. The first entry is always the
/// player when one exists.
#[derive(Debug, Clone, Default)]
pub struct PlayerTab {
    characters: Vec<Character>,
    selected: usize,
}

impl PlayerTab {
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Character> {
        self.characters.get(self.selected)
    }

    pub fn selected_mut(&mut self) -> Option<&mut Character> {
        self.characters.get_mut(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.characters.len() {
            self.selected = index;
        }
    }

    /// Starts tracking `actor` and returns its slot. Actors already tracked
    /// keep their slot; actors without a renderable are refused.
    pub fn target_actor<H: PhotoModeHost>(&mut self, host: &mut H, actor: ActorId) -> Option<usize> {
        if let Some(index) = self.position_of(actor) {
            return Some(index);
        }
        if !host.has_renderable(actor) {
            debug!(actor = actor.0, "target_skipped_no_renderable");
            return None;
        }
        self.characters.push(Character::new(host, actor));
        Some(self.characters.len() - 1)
    }

    pub fn position_of(&self, actor: ActorId) -> Option<usize> {
        self.characters
            .iter()
            .position(|character| character.actor() == actor)
    }
}

impl CategoryTracker for PlayerTab {
    fn capture_original<H: PhotoModeHost>(&mut self, host: &mut H) {
        for mut character in self.characters.drain(..) {
            character.release(host);
        }
        self.selected = 0;

        if let Some(player) = host.player() {
            self.target_actor(host, player);
        }
        if let Some(target) = host.crosshair_target() {
            self.target_actor(host, target);
        }
    }

    fn revert<H: PhotoModeHost>(&mut self, host: &mut H, reason: RevertReason) {
        for character in &mut self.characters {
            character.revert(host);
        }

        if reason.is_session_end() {
            for character in &mut self.characters {
                character.release(host);
            }
            self.characters.clear();
            self.selected = 0;
        }
    }
}
