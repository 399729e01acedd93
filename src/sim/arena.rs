//! Slot arena holding the live body set
//!
//! Bodies live in reusable slots addressed by generational [`BodyId`]s. The
//! `live` list keeps insertion order, which is the iteration order for every
//! pass. Destroyed bodies stay in place until [`BodyArena::sweep`] runs at the
//! start of the next step.

use super::body::{Body, BodyId, Tag};

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

#[derive(Debug, Clone, Default)]
pub struct BodyArena {
    slots: Vec<Slot>,
    /// Occupied slot indices in insertion order
    live: Vec<u32>,
    free: Vec<u32>,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a body, assigning its id
    pub fn insert(&mut self, mut body: Body) -> BodyId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = BodyId {
            index,
            generation: slot.generation,
        };
        body.id = id;
        slot.body = Some(body);
        self.live.push(index);
        id
    }

    fn slot(&self, id: BodyId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slot(id).and_then(|slot| slot.body.as_ref())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    /// Two distinct bodies mutably at once
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut Body, &mut Body)> {
        if a.index == b.index {
            return None;
        }
        let (lo, hi, swapped) = if a.index < b.index {
            (a, b, false)
        } else {
            (b, a, true)
        };
        if hi.index as usize >= self.slots.len() {
            return None;
        }
        let (head, tail) = self.slots.split_at_mut(hi.index as usize);
        let lo_slot = head.get_mut(lo.index as usize)?;
        let hi_slot = tail.first_mut()?;
        if lo_slot.generation != lo.generation || hi_slot.generation != hi.generation {
            return None;
        }
        let lo_body = lo_slot.body.as_mut()?;
        let hi_body = hi_slot.body.as_mut()?;
        if swapped {
            Some((hi_body, lo_body))
        } else {
            Some((lo_body, hi_body))
        }
    }

    /// Take a body out of its slot while keeping its place in the live order
    ///
    /// Used to hand a body `&mut` access while the rest of the arena is
    /// borrowed as context. Must be paired with [`BodyArena::reattach`].
    pub fn detach(&mut self, id: BodyId) -> Option<Body> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.body.take())
    }

    pub fn reattach(&mut self, body: Body) {
        if let Some(slot) = self.slots.get_mut(body.id.index as usize)
            && slot.generation == body.id.generation
            && slot.body.is_none()
        {
            slot.body = Some(body);
        }
    }

    /// Bodies in live order (including destroyed ones not yet swept)
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.live
            .iter()
            .filter_map(|&index| self.slots[index as usize].body.as_ref())
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Body> {
        self.iter().filter(|body| body.active)
    }

    /// Snapshot of live ids in live order
    pub fn ids(&self) -> Vec<BodyId> {
        self.iter().map(|body| body.id).collect()
    }

    pub fn find_tag(&self, tag: Tag) -> Option<&Body> {
        self.iter_active().find(|body| body.tag() == tag)
    }

    pub fn count_tag(&self, tag: Tag) -> usize {
        self.iter_active().filter(|body| body.tag() == tag).count()
    }

    /// Evict destroyed bodies, recycling their slots
    ///
    /// Returns the number of bodies removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.live.len();
        let slots = &mut self.slots;
        let free = &mut self.free;
        self.live.retain(|&index| {
            let slot = &mut slots[index as usize];
            let keep = slot.body.as_ref().is_some_and(|body| body.active);
            if !keep {
                slot.body = None;
                slot.generation = slot.generation.wrapping_add(1);
                free.push(index);
            }
            keep
        });
        before - self.live.len()
    }

    /// Drop every body; outstanding ids become stale
    pub fn clear(&mut self) {
        for index in self.live.drain(..) {
            let slot = &mut self.slots[index as usize];
            slot.body = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index);
        }
    }

    /// Number of bodies in the live set (destroyed-but-unswept included)
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
