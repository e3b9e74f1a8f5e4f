use crate::audio::AnalyserSource;
use crate::frame_slot::{FrameSlot, Teardown};
use crate::render;
use fabric_core::{OrbitCamera, Scene};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub scene: Rc<RefCell<Scene>>,
    pub audio: AnalyserSource,
    pub gpu: render::GpuState<'a>,
    pub canvas: web::HtmlCanvasElement,
    pub camera: OrbitCamera,
    pub started: Instant,
    pub last_instant: Instant,
}

impl<'a> FrameContext<'a> {
    /// One logical frame: CPU update then the four passes. Returns `false`
    /// when rendering hit an unrecoverable error.
    pub fn frame(&mut self) -> bool {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.camera.tick(dt_sec);
        self.gpu
            .resize_if_needed(self.canvas.width(), self.canvas.height());

        let view = self.camera.view_matrix().to_cols_array_2d();
        let time = (now - self.started).as_secs_f32();
        let mut scene = self.scene.borrow_mut();
        scene.update(&mut self.audio);
        match scene.render(&mut self.gpu, view, time) {
            Ok(_) => true,
            Err(e) => match e.downcast_ref::<wgpu::SurfaceError>() {
                Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::warn!("[frame] surface {}; reconfiguring", e);
                    self.gpu.reconfigure();
                    true
                }
                _ => {
                    log::error!("[frame] render failed: {:?}", e);
                    false
                }
            },
        }
    }
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
) -> anyhow::Result<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    render::GpuState::new(leaked_canvas).await
}

type Tick = Closure<dyn FnMut()>;

pub struct LoopControl {
    slot: Rc<FrameSlot<Tick>>,
}

impl LoopControl {
    pub fn is_running(&self) -> bool {
        self.slot.is_running()
    }

    /// Stop re-registering frames. Independent timers are not touched.
    pub fn cancel(&self) {
        if let Some(teardown) = self.slot.stop() {
            finish(teardown);
            log::info!("[loop] cancelled");
        }
    }
}

fn finish(teardown: Teardown<Tick>) {
    if let (Some(w), Some(id)) = (web::window(), teardown.pending_request) {
        let _ = w.cancel_animation_frame(id);
    }
    drop(teardown.callback);
}

fn request_frame(slot: &FrameSlot<Tick>) {
    let Some(w) = web::window() else { return };
    if let Some(cb) = slot.callback().as_ref() {
        slot.set_request(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) -> LoopControl {
    let slot: Rc<FrameSlot<Tick>> = Rc::new(FrameSlot::new());

    let slot_tick = slot.clone();
    slot.arm(Closure::wrap(Box::new(move || {
        slot_tick.set_request(None);
        if !slot_tick.is_running() {
            return;
        }
        if !frame_ctx.borrow_mut().frame() {
            // the closure is still on the stack; release it once it returns
            if let Some(teardown) = slot_tick.stop() {
                wasm_bindgen_futures::spawn_local(async move { finish(teardown) });
                log::error!("[loop] stopped after fatal frame error");
            }
            return;
        }
        request_frame(&slot_tick);
    }) as Box<dyn FnMut()>));
    request_frame(&slot);
    log::info!("[loop] started");

    LoopControl { slot }
}
