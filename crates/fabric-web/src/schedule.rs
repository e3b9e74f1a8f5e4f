//! Independent timer driving the grid retarget scheduler.

use fabric_core::Scene;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;

// Fine enough for the 57ms default stagger.
const POLL_INTERVAL_MS: i32 = 16;

/// `setInterval` handle polling the scene's retarget scheduler. Runs whether
/// or not frames are being drawn; cleared on drop.
pub struct RetargetTimer {
    window: web::Window,
    handle: i32,
    _tick: Closure<dyn FnMut()>,
}

impl RetargetTimer {
    pub fn start(window: &web::Window, scene: Rc<RefCell<Scene>>) -> anyhow::Result<Self> {
        let tick = Closure::wrap(Box::new(move || {
            // a frame in progress holds the scene; try again on the next tick
            if let Ok(mut scene) = scene.try_borrow_mut() {
                scene.poll_retargets(dom::now_ms());
            }
        }) as Box<dyn FnMut()>);
        let handle = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                POLL_INTERVAL_MS,
            )
            .map_err(|e| anyhow::anyhow!("setInterval: {:?}", e))?;
        Ok(Self {
            window: window.clone(),
            handle,
            _tick: tick,
        })
    }
}

impl Drop for RetargetTimer {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.handle);
        log::debug!("[grid] retarget timer cleared");
    }
}
