use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use js_sys::{Function, JSON};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use lottie_view_core::{
    AssetLoader, ColorFilterReport, ColorFilterSpec, Completion, Config, ContainerView,
    MemoryAssetLoader, RenderMode, ResizeMode, ViewCommand, ViewError, ViewProps, ViewState,
    VIEW_VERSION,
};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Asset table shared between the bridge (which registers) and the view (which reads).
#[derive(Clone, Default)]
struct SharedAssets(Rc<RefCell<MemoryAssetLoader>>);

impl AssetLoader for SharedAssets {
    fn read(&self, name: &str) -> Result<String, ViewError> {
        self.0.borrow().read(name)
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = queueMicrotask)]
    fn queue_microtask(callback: &Function);
}

/// JS `(completed: boolean) => void`.
///
/// Completions conclude inside a bridge call that holds the view, so they run as a
/// microtask once that call has returned. The callback may then drive the view again,
/// and anything it throws reaches the host.
fn completion(callback: Option<Function>) -> Option<Completion> {
    callback.map(|f| -> Completion {
        Box::new(move |completed| {
            queue_microtask(f.bind1(&JsValue::UNDEFINED, &JsValue::from_bool(completed)).unchecked_ref());
        })
    })
}

/// Accept either document text or an already-parsed JS object.
fn document_text(source: &JsValue) -> Result<String, JsError> {
    if let Some(s) = source.as_string() {
        return Ok(s);
    }
    JSON::stringify(source)
        .map_err(|e| JsError::new(&format!("source stringify error: {:?}", e)))?
        .as_string()
        .ok_or_else(|| JsError::new("source stringify produced non-string"))
}

#[derive(Serialize)]
struct FilterReport {
    accepted: usize,
    rejected: Vec<String>,
}

impl From<ColorFilterReport> for FilterReport {
    fn from(report: ColorFilterReport) -> Self {
        Self {
            accepted: report.accepted,
            rejected: report.rejected.iter().map(ToString::to_string).collect(),
        }
    }
}

#[wasm_bindgen]
pub struct LottieView {
    core: ContainerView,
    assets: SharedAssets,
}

#[wasm_bindgen]
impl LottieView {
    /// Create a view. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new LottieView({ progress_interval_ms: 100 })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<LottieView, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let assets = SharedAssets::default();
        let core = ContainerView::headless(cfg, Box::new(assets.clone()))
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(LottieView { core, assets })
    }

    /// Make a document loadable through `set_source_name`.
    #[wasm_bindgen(js_name = register_asset)]
    pub fn register_asset(&mut self, name: String, document: JsValue) -> Result<(), JsError> {
        let text = document_text(&document)?;
        self.assets.0.borrow_mut().insert(name, text);
        Ok(())
    }

    // ----- props -----

    #[wasm_bindgen(js_name = set_speed)]
    pub fn set_speed(&mut self, speed: f32) {
        self.core.set_speed(speed);
    }

    #[wasm_bindgen(js_name = set_progress)]
    pub fn set_progress(&mut self, progress: f32) {
        self.core.set_progress(progress);
    }

    #[wasm_bindgen(js_name = set_loop)]
    pub fn set_loop(&mut self, looping: bool) {
        self.core.set_loop(looping);
    }

    /// "cover" | "contain" | "center"; anything else unsets.
    #[wasm_bindgen(js_name = set_resize_mode)]
    pub fn set_resize_mode(&mut self, mode: String) {
        self.core.set_resize_mode(ResizeMode::parse(&mode));
    }

    /// "automatic" | "hardware" | "software", case-insensitive.
    #[wasm_bindgen(js_name = set_render_mode)]
    pub fn set_render_mode(&mut self, mode: String) {
        self.core.set_render_mode(RenderMode::parse(&mode));
    }

    /// Load inline document text (string or object). Returns true when it replaced the active source.
    #[wasm_bindgen(js_name = set_source_json)]
    pub fn set_source_json(&mut self, source: JsValue) -> Result<bool, JsError> {
        let text = document_text(&source)?;
        Ok(self.core.set_source_json(&text))
    }

    #[wasm_bindgen(js_name = set_source_name)]
    pub fn set_source_name(&mut self, name: String) -> bool {
        self.core.set_source_name(&name)
    }

    /// `filters`: `[{ keypath, color }]`. Returns `{ accepted, rejected: string[] }`.
    #[wasm_bindgen(js_name = set_color_filters)]
    pub fn set_color_filters(&mut self, filters: JsValue) -> Result<JsValue, JsError> {
        let specs: Vec<ColorFilterSpec> = if jsvalue_is_undefined_or_null(&filters) {
            Vec::new()
        } else {
            swb::from_value(filters)
                .map_err(|e| JsError::new(&format!("color filters error: {e}")))?
        };
        let report = FilterReport::from(self.core.set_color_filters(&specs));
        swb::to_value(&report).map_err(|e| JsError::new(&format!("report error: {e}")))
    }

    /// Apply a prop batch (`{ loop, speed, progress, resizeMode, renderMode, colorFilters, sourceJson, sourceName }`).
    #[wasm_bindgen(js_name = apply_props)]
    pub fn apply_props(&mut self, props: JsValue) -> Result<(), JsError> {
        let props: ViewProps =
            swb::from_value(props).map_err(|e| JsError::new(&format!("props error: {e}")))?;
        self.core.apply_props(&props);
        Ok(())
    }

    // ----- commands -----

    #[wasm_bindgen]
    pub fn play(&mut self, on_complete: Option<Function>) {
        self.core.play(completion(on_complete));
    }

    #[wasm_bindgen(js_name = play_range)]
    pub fn play_range(&mut self, from: Option<f32>, to: f32, on_complete: Option<Function>) {
        self.core.play_range(from, to, completion(on_complete));
    }

    #[wasm_bindgen(js_name = play_from_progress)]
    pub fn play_from_progress(&mut self, progress: f32, on_complete: Option<Function>) {
        self.core
            .play_from_progress(progress, completion(on_complete));
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.core.pause();
    }

    #[wasm_bindgen]
    pub fn resume(&mut self) {
        self.core.resume();
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.core.reset();
    }

    /// Apply a command object, e.g. `{ type: "playRange", from: 10, to: 40 }`.
    #[wasm_bindgen]
    pub fn dispatch(&mut self, command: JsValue, on_complete: Option<Function>) -> Result<(), JsError> {
        let cmd: ViewCommand =
            swb::from_value(command).map_err(|e| JsError::new(&format!("command error: {e}")))?;
        self.core.dispatch_with(cmd, completion(on_complete));
        Ok(())
    }

    /// Apply a numeric command (1 play, 2 reset, 3 pause, 4 resume, 5 play from progress).
    #[wasm_bindgen(js_name = dispatch_id)]
    pub fn dispatch_id(
        &mut self,
        id: u32,
        args: Vec<f32>,
        on_complete: Option<Function>,
    ) -> Result<(), JsError> {
        let cmd = ViewCommand::from_command_id(id, &args)
            .ok_or_else(|| JsError::new(&format!("unknown command id {id}")))?;
        self.core.dispatch_with(cmd, completion(on_complete));
        Ok(())
    }

    // ----- lifecycle -----

    #[wasm_bindgen]
    pub fn attach(&mut self) {
        self.core.attach();
    }

    #[wasm_bindgen]
    pub fn detach(&mut self) {
        self.core.detach();
    }

    #[wasm_bindgen(js_name = enter_background)]
    pub fn enter_background(&mut self) {
        self.core.enter_background();
    }

    #[wasm_bindgen(js_name = enter_foreground)]
    pub fn enter_foreground(&mut self) {
        self.core.enter_foreground();
    }

    #[wasm_bindgen]
    pub fn teardown(&mut self) {
        self.core.teardown();
    }

    // ----- time and events -----

    /// Advance by `dt_ms` milliseconds and return the drained events array.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt_ms: f64) -> Result<JsValue, JsError> {
        if !dt_ms.is_finite() || dt_ms < 0.0 {
            return Err(JsError::new(&format!("tick: invalid dt_ms {dt_ms}")));
        }
        let dt = Duration::try_from_secs_f64(dt_ms / 1000.0)
            .map_err(|e| JsError::new(&format!("tick: invalid dt_ms {dt_ms}: {e}")))?;
        let events = self.core.tick(dt);
        swb::to_value(&events).map_err(|e| JsError::new(&format!("events error: {e}")))
    }

    #[wasm_bindgen(js_name = take_events)]
    pub fn take_events(&mut self) -> Result<JsValue, JsError> {
        let events = self.core.take_events();
        swb::to_value(&events).map_err(|e| JsError::new(&format!("events error: {e}")))
    }

    /// "empty" | "loadedIdle" | "loadedPlaying"
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        match self.core.state() {
            ViewState::Empty => "empty",
            ViewState::LoadedIdle => "loadedIdle",
            ViewState::LoadedPlaying => "loadedPlaying",
        }
        .to_string()
    }

    #[wasm_bindgen]
    pub fn progress(&self) -> Option<f32> {
        self.core.progress()
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    VIEW_VERSION
}
