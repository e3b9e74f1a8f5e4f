//! State shared between the animation-frame callback and its owner.
//!
//! The callback re-registers itself, so it holds a handle to the slot that
//! owns it. [`FrameSlot::stop`] hands the callback back out, which breaks
//! that cycle whichever side ends the loop.

use std::cell::{Cell, Ref, RefCell};

pub struct FrameSlot<C> {
    running: Cell<bool>,
    request_id: Cell<Option<i32>>,
    callback: RefCell<Option<C>>,
}

/// What a stopped loop leaves behind: a frame request that may still need
/// cancelling and the callback to drop.
pub struct Teardown<C> {
    pub pending_request: Option<i32>,
    pub callback: Option<C>,
}

impl<C> FrameSlot<C> {
    pub fn new() -> Self {
        Self {
            running: Cell::new(true),
            request_id: Cell::new(None),
            callback: RefCell::new(None),
        }
    }

    pub fn arm(&self, callback: C) {
        *self.callback.borrow_mut() = Some(callback);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn callback(&self) -> Ref<'_, Option<C>> {
        self.callback.borrow()
    }

    pub fn set_request(&self, id: Option<i32>) {
        self.request_id.set(id);
    }

    /// Mark the loop stopped and release the callback. `None` if it was
    /// already stopped.
    pub fn stop(&self) -> Option<Teardown<C>> {
        if !self.running.replace(false) {
            return None;
        }
        Some(Teardown {
            pending_request: self.request_id.take(),
            callback: self.callback.borrow_mut().take(),
        })
    }
}

impl<C> Default for FrameSlot<C> {
    fn default() -> Self {
        Self::new()
    }
}
