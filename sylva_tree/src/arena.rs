// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot storage shared by nodes and entries.

#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }
}

impl<T> core::fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Arena")
            .field("slots_total", &self.slots.len())
            .field("alive", &self.len)
            .field("free_list", &self.free_list.len())
            .finish()
    }
}

impl<T> Arena<T> {
    /// Store `value`, returning `(slot, generation)`.
    pub(crate) fn alloc(&mut self, value: T) -> (u32, u32) {
        self.len += 1;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(value);
            (idx, generation)
        } else {
            self.slots.push(Some(value));
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Ids use 32-bit slot indices by design."
        )]
        let idx = idx as u32;
        (idx, generation)
    }

    pub(crate) fn is_alive(&self, idx: usize, generation: u32) -> bool {
        self.slots.get(idx).is_some_and(Option::is_some)
            && self.generations.get(idx) == Some(&generation)
    }

    pub(crate) fn get(&self, idx: usize, generation: u32) -> Option<&T> {
        if !self.is_alive(idx, generation) {
            return None;
        }
        self.slots[idx].as_ref()
    }

    pub(crate) fn get_mut(&mut self, idx: usize, generation: u32) -> Option<&mut T> {
        if !self.is_alive(idx, generation) {
            return None;
        }
        self.slots[idx].as_mut()
    }

    /// Free a slot, returning its value if the id was live.
    pub(crate) fn free(&mut self, idx: usize, generation: u32) -> Option<T> {
        if !self.is_alive(idx, generation) {
            return None;
        }
        self.len -= 1;
        self.free_list.push(idx);
        self.slots[idx].take()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut().flatten()
    }

    /// Live `(slot, generation, value)` triples in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        self.slots
            .iter()
            .zip(&self.generations)
            .enumerate()
            .filter_map(|(idx, (slot, generation))| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "Slots were allocated with 32-bit indices."
                )]
                let idx = idx as u32;
                slot.as_ref().map(|v| (idx, *generation, v))
            })
    }
}
