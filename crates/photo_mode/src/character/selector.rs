use crate::host::{FormEntry, FormId};

/// A cursor into a list of candidate forms, plus whether the cursor points at
/// something the session actually acted on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSelector {
    candidates: Vec<FormEntry>,
    index: usize,
    valid: bool,
}

impl FormSelector {
    pub fn init(&mut self, candidates: Vec<FormEntry>) {
        self.candidates = candidates;
        self.reset();
    }

    pub fn candidates(&self) -> &[FormEntry] {
        &self.candidates
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Moves the cursor and marks it valid. Out-of-range indices leave the
    /// selector untouched.
    pub fn select(&mut self, index: usize) -> Option<FormId> {
        let id = self.candidates.get(index)?.id;
        self.index = index;
        self.valid = true;
        Some(id)
    }

    pub fn selected(&self) -> Option<&FormEntry> {
        if !self.valid {
            return None;
        }
        self.candidates.get(self.index)
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.valid = false;
    }
}
