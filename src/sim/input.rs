//! Polled input snapshot
//!
//! The host writes key transitions and pointer samples as they arrive; the
//! simulation only reads them at the sampling point of a step. Held state
//! persists across steps, edge flags last exactly one step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Logical keys the core understands (device mapping is the host's job)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Jump,
    /// Remove every ink platform and refund ink
    ClearInk,
}

impl Key {
    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Drawing pointer event, in play-area coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    /// Pointer left the drawing surface
    Leave,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: u8,
    just_pressed: u8,
    just_released: u8,
    pointer: Vec<PointerEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down (auto-repeat while held is not a new press)
    pub fn press(&mut self, key: Key) {
        if self.held & key.bit() == 0 {
            self.just_pressed |= key.bit();
        }
        self.held |= key.bit();
    }

    pub fn release(&mut self, key: Key) {
        if self.held & key.bit() != 0 {
            self.just_released |= key.bit();
        }
        self.held &= !key.bit();
    }

    #[inline]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    #[inline]
    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed & key.bit() != 0
    }

    #[inline]
    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released & key.bit() != 0
    }

    /// -1 (left), 0, or +1 (right); right wins when both are held
    pub fn horizontal_axis(&self) -> f32 {
        if self.is_pressed(Key::Right) {
            1.0
        } else if self.is_pressed(Key::Left) {
            -1.0
        } else {
            0.0
        }
    }

    pub fn push_pointer(&mut self, event: PointerEvent) {
        self.pointer.push(event);
    }

    /// Take the pointer samples queued since the last step
    pub fn take_pointer_events(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.pointer)
    }

    /// Clear one-shot edges at the end of a step
    pub fn end_step(&mut self) {
        self.just_pressed = 0;
        self.just_released = 0;
    }
}
