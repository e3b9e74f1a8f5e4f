use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> anyhow::Result<(web::Window, web::Document)> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    Ok((window, document))
}

pub fn element_by_id<T: JsCast>(document: &web::Document, id: &str) -> anyhow::Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{id}"))?
        .dyn_into::<T>()
        .map_err(|e| anyhow::anyhow!("#{id} has the wrong element type: {:?}", e))
}

/// Milliseconds on the page's monotonic clock.
pub fn now_ms() -> f64 {
    web::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Keep the canvas backing store in step with its CSS size. The renderer
/// picks the new size up on its next frame.
pub struct CanvasResize {
    window: web::Window,
    closure: Closure<dyn FnMut()>,
}

impl CanvasResize {
    pub fn wire(window: &web::Window, canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let canvas = canvas.clone();
        let closure =
            Closure::wrap(Box::new(move || sync_canvas_backing_size(&canvas)) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("resize listener: {:?}", e))?;
        Ok(Self {
            window: window.clone(),
            closure,
        })
    }
}

impl Drop for CanvasResize {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.closure.as_ref().unchecked_ref());
    }
}
