//! The `wasm_bindgen` surface: `Visualizer` and its loop handle.

use fabric_core::{FrequencySource, Scene, SettingValue, Settings, SettingsStore};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::audio::AnalyserSource;
use crate::frame::{FrameContext, LoopControl};
use crate::schedule::RetargetTimer;
use crate::{dom, frame};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("fabric-web loaded");
    Ok(())
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// One visualizer bound to a canvas and an `<audio>` element.
#[wasm_bindgen]
pub struct Visualizer {
    window: web::Window,
    scene: Rc<RefCell<Scene>>,
    store: RefCell<SettingsStore>,
    frame_ctx: Rc<RefCell<FrameContext<'static>>>,
    running: RefCell<Option<Rc<LoopControl>>>,
    retarget: RefCell<Option<RetargetTimer>>,
    _resize: dom::CanvasResize,
}

#[wasm_bindgen]
impl Visualizer {
    /// Resolve the elements, bring up audio and the GPU, and build the first
    /// generation from default settings.
    pub async fn create(
        canvas_id: String,
        audio_element_id: String,
    ) -> Result<Visualizer, JsValue> {
        Self::init(&canvas_id, &audio_element_id).await.map_err(|e| {
            log::error!("init error: {:?}", e);
            to_js(e)
        })
    }

    /// Rebuild graph, triangulation and grid from the current settings. On
    /// error the previous generation keeps rendering.
    pub fn setup(&self) -> Result<(), JsValue> {
        let result = self.scene.borrow_mut().setup(dom::now_ms());
        result.map_err(|e| {
            log::error!("[scene] setup rejected: {}", e);
            to_js(e)
        })
    }

    /// Start the frame loop, replacing any loop already running.
    #[wasm_bindgen(js_name = startLoop)]
    pub fn start_loop(&self) -> Result<LoopHandle, JsValue> {
        if let Some(previous) = self.running.borrow_mut().take() {
            previous.cancel();
        }
        if self.retarget.borrow().is_none() {
            let timer = RetargetTimer::start(&self.window, self.scene.clone()).map_err(to_js)?;
            *self.retarget.borrow_mut() = Some(timer);
        }
        let control = Rc::new(frame::start_loop(self.frame_ctx.clone()));
        *self.running.borrow_mut() = Some(control.clone());
        Ok(LoopHandle { control })
    }

    /// Set one named setting: numbers, booleans or `[r, g, b, a]` arrays.
    #[wasm_bindgen(js_name = setSetting)]
    pub fn set_setting(&self, name: &str, value: JsValue) -> Result<(), JsValue> {
        let value = setting_value(&value).ok_or_else(|| {
            log::warn!("[settings] {}: unsupported value {:?}", name, value);
            JsValue::from_str(&format!("unsupported value for `{name}`"))
        })?;
        let result = self.store.borrow_mut().set_named(name, value);
        result.map(|_| ()).map_err(|e| {
            log::warn!("[settings] skipped: {}", e);
            to_js(e)
        })
    }

    #[wasm_bindgen(js_name = audioReady)]
    pub fn audio_ready(&self) -> bool {
        self.frame_ctx.borrow().audio.is_ready()
    }

    /// Stop the frame loop and the retarget timer and release audio.
    pub fn shutdown(&self) {
        if let Some(control) = self.running.borrow_mut().take() {
            control.cancel();
        }
        self.retarget.borrow_mut().take();
        self.frame_ctx.borrow().audio.close();
        log::info!("visualizer shut down");
    }
}

impl Visualizer {
    async fn init(canvas_id: &str, audio_element_id: &str) -> anyhow::Result<Visualizer> {
        let (window, document) = dom::window_document()?;
        let canvas: web::HtmlCanvasElement = dom::element_by_id(&document, canvas_id)?;
        let element: web::HtmlAudioElement = dom::element_by_id(&document, audio_element_id)?;

        // Avoid grabbing a 2D context here to allow WebGPU to acquire the canvas
        dom::sync_canvas_backing_size(&canvas);
        let resize = dom::CanvasResize::wire(&window, &canvas)?;

        let audio = AnalyserSource::new(&element)?;
        let gpu = frame::init_gpu(&canvas).await?;

        let settings = Settings::default();
        let scene = Scene::new(settings.clone(), audio.bin_count(), dom::now_ms(), settings.seed)?;
        let scene = Rc::new(RefCell::new(scene));

        let mut store = SettingsStore::new(settings);
        {
            let scene = scene.clone();
            store.subscribe(move |key, change, settings| {
                log::info!("[settings] {} -> {:?}", key, change);
                if let Err(e) = scene.borrow_mut().apply_settings(settings, change, dom::now_ms()) {
                    log::error!("[settings] rebuild after {} rejected: {}", key, e);
                }
            });
        }

        let retarget = RetargetTimer::start(&window, scene.clone())?;
        let now = Instant::now();
        let frame_ctx = Rc::new(RefCell::new(FrameContext {
            scene: scene.clone(),
            audio,
            gpu,
            canvas,
            camera: Default::default(),
            started: now,
            last_instant: now,
        }));

        Ok(Visualizer {
            window,
            scene,
            store: RefCell::new(store),
            frame_ctx,
            running: RefCell::new(None),
            retarget: RefCell::new(Some(retarget)),
            _resize: resize,
        })
    }
}

fn setting_value(value: &JsValue) -> Option<SettingValue> {
    if let Some(b) = value.as_bool() {
        return Some(SettingValue::Flag(b));
    }
    if let Some(n) = value.as_f64() {
        return Some(SettingValue::Number(n));
    }
    let array = value.dyn_ref::<js_sys::Array>()?;
    if array.length() != 4 {
        return None;
    }
    let mut rgba = [0.0f32; 4];
    for (i, slot) in rgba.iter_mut().enumerate() {
        *slot = array.get(i as u32).as_f64()? as f32;
    }
    Some(SettingValue::Color(rgba))
}

/// Handle returned by `startLoop`.
#[wasm_bindgen]
pub struct LoopHandle {
    control: Rc<LoopControl>,
}

#[wasm_bindgen]
impl LoopHandle {
    /// Stop requesting animation frames. The grid retarget timer belongs to
    /// the visualizer and keeps running until `shutdown`.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.control.is_running()
    }
}
