//! WebAudio analyser feeding the frequency field.

use fabric_core::constants::{
    ANALYSER_MAX_DECIBELS, ANALYSER_MIN_DECIBELS, ANALYSER_SMOOTHING, FFT_SIZE,
};
use fabric_core::FrequencySource;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

// HTMLMediaElement.HAVE_FUTURE_DATA
const HAVE_FUTURE_DATA: u16 = 3;

/// `<audio>` element routed through an analyser to the speakers:
/// element -> MediaElementAudioSourceNode -> AnalyserNode -> destination.
pub struct AnalyserSource {
    audio_ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    element: web::HtmlAudioElement,
    _source: web::MediaElementAudioSourceNode,
    ready: Rc<Cell<bool>>,
    on_canplay: Closure<dyn FnMut()>,
    on_play: Closure<dyn FnMut()>,
}

fn js_err(what: &str, e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow::anyhow!("{what}: {:?}", e)
}

impl AnalyserSource {
    pub fn new(element: &web::HtmlAudioElement) -> anyhow::Result<Self> {
        let audio_ctx = web::AudioContext::new().map_err(|e| js_err("AudioContext", e))?;
        let source = audio_ctx
            .create_media_element_source(element)
            .map_err(|e| js_err("MediaElementAudioSourceNode", e))?;
        let analyser = audio_ctx
            .create_analyser()
            .map_err(|e| js_err("AnalyserNode", e))?;
        analyser.set_fft_size(FFT_SIZE);
        analyser.set_min_decibels(ANALYSER_MIN_DECIBELS);
        analyser.set_max_decibels(ANALYSER_MAX_DECIBELS);
        analyser.set_smoothing_time_constant(ANALYSER_SMOOTHING);
        source
            .connect_with_audio_node(&analyser)
            .map_err(|e| js_err("connect source", e))?;
        analyser
            .connect_with_audio_node(&audio_ctx.destination())
            .map_err(|e| js_err("connect analyser", e))?;

        let ready = Rc::new(Cell::new(element.ready_state() >= HAVE_FUTURE_DATA));
        let on_canplay = {
            let ready = ready.clone();
            Closure::wrap(Box::new(move || {
                if !ready.replace(true) {
                    log::info!("[audio] canplay; analyser live");
                }
            }) as Box<dyn FnMut()>)
        };
        // contexts created before a user gesture start suspended
        let on_play = {
            let ctx = audio_ctx.clone();
            Closure::wrap(Box::new(move || {
                if ctx.state() == web::AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }) as Box<dyn FnMut()>)
        };
        element
            .add_event_listener_with_callback("canplay", on_canplay.as_ref().unchecked_ref())
            .map_err(|e| js_err("canplay listener", e))?;
        element
            .add_event_listener_with_callback("play", on_play.as_ref().unchecked_ref())
            .map_err(|e| js_err("play listener", e))?;

        log::info!(
            "[audio] analyser fft={} bins={} ready={}",
            FFT_SIZE,
            analyser.frequency_bin_count(),
            ready.get()
        );
        Ok(Self {
            audio_ctx,
            analyser,
            element: element.clone(),
            _source: source,
            ready,
            on_canplay,
            on_play,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    pub fn close(&self) {
        let _ = self.audio_ctx.close();
    }
}

impl Drop for AnalyserSource {
    fn drop(&mut self) {
        let _ = self.element.remove_event_listener_with_callback(
            "canplay",
            self.on_canplay.as_ref().unchecked_ref(),
        );
        let _ = self
            .element
            .remove_event_listener_with_callback("play", self.on_play.as_ref().unchecked_ref());
    }
}

impl FrequencySource for AnalyserSource {
    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn frequencies(&mut self, out: &mut Vec<u8>) {
        let bins = self.bin_count();
        out.clear();
        out.resize(bins, 0);
        if self.ready.get() {
            self.analyser.get_byte_frequency_data(out);
        }
    }
}
