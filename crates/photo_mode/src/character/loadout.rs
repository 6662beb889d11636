use tracing::debug;

use crate::host::{FormKind, Hand, PhotoModeHost};

use super::{Character, FormSelector};

impl Character {
    pub(super) fn init_loadout<H: PhotoModeHost>(&mut self, host: &H) {
        self.weapons
            .init(host.inventory_items(self.actor, FormKind::Weapon));
        self.armors
            .init(host.inventory_items(self.actor, FormKind::Armor));
        let spells = host.added_spells(self.actor);
        self.spells_right.init(spells.clone());
        self.spells_left.init(spells);
    }

    /// Selection only; the actor's inventory is never touched here.
    pub(super) fn reset_loadout(&mut self) {
        for selector in [
            &mut self.weapons,
            &mut self.armors,
            &mut self.spells_right,
            &mut self.spells_left,
        ] {
            selector.reset();
        }
    }

    pub fn weapons(&self) -> &FormSelector {
        &self.weapons
    }

    pub fn armors(&self) -> &FormSelector {
        &self.armors
    }

    pub fn spells(&self, hand: Hand) -> &FormSelector {
        match hand {
            Hand::Left => &self.spells_left,
            Hand::Right => &self.spells_right,
        }
    }

    pub fn effect_shaders(&self) -> &FormSelector {
        &self.effect_shaders
    }

    pub fn effect_vfx(&self) -> &FormSelector {
        &self.effect_vfx
    }

    /// Unequips the weapon if it is in either hand, otherwise equips it.
    pub fn toggle_weapon<H: PhotoModeHost>(&mut self, host: &mut H, index: usize) {
        let Some(item) = self.weapons.select(index) else {
            return;
        };
        let in_hand = [Hand::Left, Hand::Right]
            .into_iter()
            .any(|hand| host.equipped_object(self.actor, hand) == Some(item));
        if in_hand {
            host.unequip_object(self.actor, item);
        } else {
            host.equip_object(self.actor, item);
        }
        host.update_actor(self.actor);
    }

    pub fn toggle_armor<H: PhotoModeHost>(&mut self, host: &mut H, index: usize) {
        let Some(item) = self.armors.select(index) else {
            return;
        };
        match host.is_worn(self.actor, item) {
            Some(true) => host.unequip_object(self.actor, item),
            Some(false) => host.equip_object(self.actor, item),
            None => {
                debug!(actor = self.actor.0, item = item.0, "armor_not_carried");
                return;
            }
        }
        host.update_actor(self.actor);
    }

    /// A spell already in `hand` is unequipped and deselected; anything else
    /// is equipped to that hand.
    pub fn toggle_spell<H: PhotoModeHost>(&mut self, host: &mut H, hand: Hand, index: usize) {
        let selector = match hand {
            Hand::Left => &mut self.spells_left,
            Hand::Right => &mut self.spells_right,
        };
        let Some(spell) = selector.select(index) else {
            return;
        };
        if host.equipped_object(self.actor, hand) == Some(spell) {
            host.unequip_object(self.actor, spell);
            host.deselect_spell(self.actor, spell);
        } else {
            host.equip_spell(self.actor, spell, hand);
        }
        host.update_actor(self.actor);
    }

    pub fn apply_effect_shader<H: PhotoModeHost>(&mut self, host: &mut H, index: usize) {
        let Some(shader) = self.effect_shaders.select(index) else {
            return;
        };
        host.apply_effect_shader(self.actor, shader, false, false);
        self.effects_played = true;
    }

    pub fn apply_vfx<H: PhotoModeHost>(&mut self, host: &mut H, index: usize) {
        let Some(form) = self.effect_vfx.select(index) else {
            return;
        };
        let Some(data) = host.reference_effect(form) else {
            debug!(form = form.0, "vfx_form_missing");
            return;
        };
        if let Some(shader) = data.effect_shader {
            host.apply_effect_shader(self.actor, shader, data.face_target, data.attach_to_camera);
        }
        if let Some(art_object) = data.art_object {
            host.apply_art_object(
                self.actor,
                art_object,
                data.face_target,
                data.attach_to_camera,
            );
        }
        self.vfx_played = true;
    }

    /// The host owns applied effects; they are found again by target and
    /// marked finished.
    pub(super) fn revert_effects<H: PhotoModeHost>(&mut self, host: &mut H) {
        self.effect_shaders.reset();
        self.effect_vfx.reset();

        if !self.has_untracked_effects() {
            return;
        }
        let actor = self.actor;
        let mut finished = 0usize;
        host.for_each_active_effect(&mut |effect| {
            if effect.target == actor && !effect.finished {
                effect.finished = true;
                finished += 1;
            }
        });
        debug!(actor = actor.0, finished, "effects_finished");

        self.effects_played = false;
        self.vfx_played = false;
    }
}
