use crate::host::FaceAnimation;

pub const EXPRESSION_COUNT: u32 = 17;
pub const PHONEME_COUNT: usize = 16;
pub const MODIFIER_COUNT: usize = 14;

pub const MORPH_STRENGTH_MAX: f32 = 100.0;

/// One index-addressed face morph. A strength of zero means inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MorphOverride {
    pub index: u32,
    pub strength: f32,
}

impl MorphOverride {
    fn weight(self) -> f32 {
        self.strength / MORPH_STRENGTH_MAX
    }
}

fn clamp_strength(strength: f32) -> f32 {
    if !strength.is_finite() {
        return 0.0;
    }
    strength.clamp(0.0, MORPH_STRENGTH_MAX)
}

/// Expression, phoneme and modifier overrides for one face.
///
/// Expression index 0 is "no expression"; index `n` drives the host's
/// expression slot `n - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMorphs {
    expression: MorphOverride,
    phonemes: [f32; PHONEME_COUNT],
    modifiers: [f32; MODIFIER_COUNT],
}

impl Default for FaceMorphs {
    fn default() -> Self {
        Self {
            expression: MorphOverride::default(),
            phonemes: [0.0; PHONEME_COUNT],
            modifiers: [0.0; MODIFIER_COUNT],
        }
    }
}

impl FaceMorphs {
    pub fn expression(&self) -> MorphOverride {
        self.expression
    }

    pub fn phoneme_strengths(&self) -> &[f32; PHONEME_COUNT] {
        &self.phonemes
    }

    pub fn modifier_strengths(&self) -> &[f32; MODIFIER_COUNT] {
        &self.modifiers
    }

    pub fn is_neutral(&self) -> bool {
        self.expression.index == 0
            && self.expression.strength == 0.0
            && self.phonemes.iter().all(|value| *value == 0.0)
            && self.modifiers.iter().all(|value| *value == 0.0)
    }

    pub fn apply_expression(
        &mut self,
        face: Option<&mut dyn FaceAnimation>,
        expression: u32,
        strength: f32,
    ) {
        if expression >= EXPRESSION_COUNT {
            return;
        }
        let strength = if expression == 0 {
            0.0
        } else {
            clamp_strength(strength)
        };
        self.expression = MorphOverride {
            index: expression,
            strength,
        };

        let Some(face) = face else {
            return;
        };
        if self.expression.index == 0 {
            face.clear_expression_override();
            face.reset_to_neutral(false);
        } else {
            face.set_expression_override(self.expression.index - 1, self.expression.weight());
        }
    }

    pub fn apply_phoneme(&mut self, face: Option<&mut dyn FaceAnimation>, index: u32, strength: f32) {
        let Some(slot) = self.phonemes.get_mut(index as usize) else {
            return;
        };
        *slot = clamp_strength(strength);
        let morph = MorphOverride {
            index,
            strength: *slot,
        };
        if let Some(face) = face {
            face.set_phoneme(morph.index, morph.weight());
        }
    }

    pub fn apply_modifier(
        &mut self,
        face: Option<&mut dyn FaceAnimation>,
        index: u32,
        strength: f32,
    ) {
        let Some(slot) = self.modifiers.get_mut(index as usize) else {
            return;
        };
        *slot = clamp_strength(strength);
        let morph = MorphOverride {
            index,
            strength: *slot,
        };
        if let Some(face) = face {
            face.set_modifier(morph.index, morph.weight());
        }
    }

    /// Clears the override table, rests the face, and zeroes every recorded
    /// strength. Recorded strengths are zeroed even without face data.
    pub fn revert(&mut self, face: Option<&mut dyn FaceAnimation>) {
        if let Some(face) = face {
            face.clear_expression_override();
            face.reset_to_neutral(true);
        }
        *self = Self::default();
    }
}
