//! The container view: routes host setters, commands and lifecycle hooks to the
//! store, the controller, the active handle and the progress sampler.
//!
//! Everything runs on the caller's thread; `&mut self` is the only synchronization.
//! Time moves only through [`ContainerView::tick`].

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::assets::{normalize_asset_name, AssetLoader, MemoryAssetLoader};
use crate::config::Config;
use crate::controller::PlaybackController;
use crate::error::ViewError;
use crate::events::{EventSink, Outbox, ViewEvent};
use crate::handle::{AnimationHandle, AnimationSource, Completion, Transition};
use crate::headless::HeadlessRenderer;
use crate::inputs::{ViewCommand, ViewProps};
use crate::sampler::ProgressSampler;
use crate::store::{ColorFilterReport, ColorFilterSpec, PropertyStore};
use crate::surface::{AnimationSurface, LoopMode, RenderMode, Renderer, ResizeMode};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewState {
    Empty,
    LoadedIdle,
    LoadedPlaying,
}

/// A play command received while detached, run on the next `attach`.
struct DeferredPlay {
    command: ViewCommand,
    completion: Option<Completion>,
}

pub struct ContainerView<R: Renderer = HeadlessRenderer> {
    config: Config,
    renderer: R,
    assets: Box<dyn AssetLoader>,
    store: PropertyStore,
    controller: PlaybackController,
    handle: Option<AnimationHandle<R::Surface>>,
    sampler: ProgressSampler,
    outbox: Outbox,
    /// Normalized name of the last named source that loaded successfully.
    last_loaded_name: Option<String>,
    attached: bool,
    deferred: Option<DeferredPlay>,
    torn_down: bool,
}

impl ContainerView<HeadlessRenderer> {
    /// View over the headless renderer.
    pub fn headless(config: Config, assets: Box<dyn AssetLoader>) -> Result<Self, ViewError> {
        Self::new(config, HeadlessRenderer, assets)
    }
}

impl Default for ContainerView<HeadlessRenderer> {
    fn default() -> Self {
        Self::build(
            Config::default(),
            HeadlessRenderer,
            Box::new(MemoryAssetLoader::new()),
        )
    }
}

impl<R: Renderer> ContainerView<R> {
    /// Validates `config` before building the view.
    pub fn new(config: Config, renderer: R, assets: Box<dyn AssetLoader>) -> Result<Self, ViewError> {
        config.validate()?;
        Ok(Self::build(config, renderer, assets))
    }

    fn build(config: Config, renderer: R, assets: Box<dyn AssetLoader>) -> Self {
        Self {
            sampler: ProgressSampler::new(config.progress_interval()),
            outbox: Outbox::new(config.max_pending_events),
            config,
            renderer,
            assets,
            store: PropertyStore::default(),
            controller: PlaybackController,
            handle: None,
            last_loaded_name: None,
            attached: true,
            deferred: None,
            torn_down: false,
        }
    }

    // ----- accessors -----

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    pub fn handle(&self) -> Option<&AnimationHandle<R::Surface>> {
        self.handle.as_ref()
    }

    pub fn state(&self) -> ViewState {
        match &self.handle {
            None => ViewState::Empty,
            Some(h) if h.is_playing() => ViewState::LoadedPlaying,
            Some(_) => ViewState::LoadedIdle,
        }
    }

    /// Displayed progress of the active handle.
    pub fn progress(&self) -> Option<f32> {
        self.handle.as_ref().map(|h| h.surface().progress())
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_sampling(&self) -> bool {
        self.sampler.is_running()
    }

    /// Progress samples dropped by backpressure so far.
    pub fn dropped_events(&self) -> u64 {
        self.outbox.dropped()
    }

    // ----- property setters -----

    pub fn set_speed(&mut self, speed: f32) {
        if self.ignored("set_speed") {
            return;
        }
        let t = self
            .controller
            .set_speed(&mut self.store, self.handle.as_mut(), speed);
        self.apply_transition(t);
    }

    pub fn set_progress(&mut self, progress: f32) {
        if self.ignored("set_progress") {
            return;
        }
        self.controller
            .set_progress(&mut self.store, self.handle.as_mut(), progress);
    }

    pub fn set_loop(&mut self, looping: bool) {
        if self.ignored("set_loop") {
            return;
        }
        self.controller.set_loop_mode(
            &mut self.store,
            self.handle.as_mut(),
            LoopMode::from_looping(looping),
        );
    }

    pub fn set_resize_mode(&mut self, mode: ResizeMode) {
        if self.ignored("set_resize_mode") {
            return;
        }
        self.controller
            .set_resize_mode(&mut self.store, self.handle.as_mut(), mode);
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if self.ignored("set_render_mode") {
            return;
        }
        self.controller
            .set_render_mode(&mut self.store, self.handle.as_mut(), mode);
    }

    /// Replace the color override list. Malformed entries are skipped and reported.
    pub fn set_color_filters(&mut self, specs: &[ColorFilterSpec]) -> ColorFilterReport {
        if self.ignored("set_color_filters") {
            return ColorFilterReport::default();
        }
        self.controller
            .set_color_filters(&mut self.store, self.handle.as_mut(), specs)
    }

    /// Load inline document text. Returns true when a new handle was installed.
    ///
    /// Text identical to the active inline source is a no-op. On failure the current
    /// handle stays in place.
    pub fn set_source_json(&mut self, json: &str) -> bool {
        if self.ignored("set_source_json") {
            return false;
        }
        if let Some(AnimationSource::Inline(current)) = self.handle.as_ref().map(|h| h.source()) {
            if current == json {
                debug!("inline source unchanged; skipping reload");
                return false;
            }
        }
        match AnimationHandle::load_from_inline_data(&self.renderer, json) {
            Ok(handle) => {
                self.last_loaded_name = None;
                self.replace_handle(handle);
                true
            }
            Err(err) => {
                warn!("inline animation failed to load ({}): {err}", err.category());
                false
            }
        }
    }

    /// Load a named asset. Returns true when a new handle was installed.
    ///
    /// Names without an extension get the configured one. A name equal to the last
    /// one that loaded successfully is a no-op; content is not compared.
    pub fn set_source_name(&mut self, name: &str) -> bool {
        if self.ignored("set_source_name") {
            return false;
        }
        if name.trim().is_empty() {
            warn!("ignoring empty source name");
            return false;
        }
        let name = normalize_asset_name(name, &self.config.asset_extension);
        if self.last_loaded_name.as_deref() == Some(name.as_str()) {
            debug!("source name '{name}' already loaded; skipping");
            return false;
        }
        match AnimationHandle::load_from_named_asset(&self.renderer, self.assets.as_ref(), &name) {
            Ok(handle) => {
                self.replace_handle(handle);
                self.last_loaded_name = Some(name);
                true
            }
            Err(err) => {
                warn!("animation '{name}' failed to load ({}): {err}", err.category());
                false
            }
        }
    }

    /// Apply a prop batch in its fixed order. Returns the color filter report when the
    /// batch carried filters.
    pub fn apply_props(&mut self, props: &ViewProps) -> Option<ColorFilterReport> {
        if self.ignored("apply_props") {
            return None;
        }
        if let Some(mode) = &props.resize_mode {
            self.set_resize_mode(ResizeMode::parse(mode));
        }
        if let Some(mode) = &props.render_mode {
            self.set_render_mode(RenderMode::parse(mode));
        }
        if let Some(looping) = props.looping {
            self.set_loop(looping);
        }
        if let Some(progress) = props.progress {
            self.set_progress(progress);
        }
        if let Some(speed) = props.speed {
            self.set_speed(speed);
        }
        let report = props
            .color_filters
            .as_deref()
            .map(|specs| self.set_color_filters(specs));
        if let Some(json) = &props.source_json {
            self.set_source_json(json);
        }
        if let Some(name) = &props.source_name {
            self.set_source_name(name);
        }
        report
    }

    // ----- commands -----

    pub fn play(&mut self, completion: Option<Completion>) {
        self.command(ViewCommand::Play, completion);
    }

    pub fn play_range(&mut self, from: Option<f32>, to: f32, completion: Option<Completion>) {
        self.command(ViewCommand::PlayRange { from, to }, completion);
    }

    pub fn play_from_progress(&mut self, progress: f32, completion: Option<Completion>) {
        self.command(ViewCommand::PlayFromProgress { progress }, completion);
    }

    pub fn pause(&mut self) {
        self.command(ViewCommand::Pause, None);
    }

    pub fn resume(&mut self) {
        self.command(ViewCommand::Resume, None);
    }

    pub fn reset(&mut self) {
        self.command(ViewCommand::Reset, None);
    }

    pub fn dispatch(&mut self, command: ViewCommand) {
        self.command(command, None);
    }

    pub fn dispatch_with(&mut self, command: ViewCommand, completion: Option<Completion>) {
        self.command(command, completion);
    }

    fn command(&mut self, command: ViewCommand, completion: Option<Completion>) {
        if self.torn_down {
            debug!("{command:?} after teardown ignored");
            if let Some(callback) = completion {
                callback(false);
            }
            return;
        }
        if !self.attached {
            if command.starts_play() {
                debug!("{command:?} deferred until attach");
                let previous = self.deferred.replace(DeferredPlay {
                    command,
                    completion,
                });
                if let Some(callback) = previous.and_then(|p| p.completion) {
                    callback(false);
                }
            } else {
                debug!("{command:?} while detached ignored");
            }
            return;
        }

        let store = &self.store;
        let handle = self.handle.as_mut();
        let t = match command {
            ViewCommand::Play => self.controller.play(store, handle, completion),
            ViewCommand::PlayRange { from, to } => {
                self.controller.play_range(store, handle, from, to, completion)
            }
            ViewCommand::PlayFromProgress { progress } => {
                self.controller.play_from_progress(handle, progress, completion)
            }
            ViewCommand::Pause => self.controller.pause(handle),
            ViewCommand::Resume => self.controller.resume(store, handle),
            ViewCommand::Reset => self.controller.reset(handle),
        };
        self.apply_transition(t);
    }

    // ----- lifecycle -----

    /// The view left the window. Sampling stops; play commands are deferred.
    pub fn detach(&mut self) {
        if self.ignored("detach") {
            return;
        }
        self.attached = false;
        self.sampler.stop();
    }

    /// The view is back in the window. Runs the last deferred play command.
    pub fn attach(&mut self) {
        if self.ignored("attach") {
            return;
        }
        self.attached = true;
        if let Some(DeferredPlay {
            command,
            completion,
        }) = self.deferred.take()
        {
            self.command(command, completion);
        }
        if self.state() == ViewState::LoadedPlaying && !self.sampler.is_running() {
            self.sampler.start();
        }
    }

    pub fn enter_background(&mut self) {
        if self.ignored("enter_background") {
            return;
        }
        if let Some(h) = self.handle.as_mut() {
            let t = h.enter_background();
            self.apply_transition(t);
        }
    }

    pub fn enter_foreground(&mut self) {
        if self.ignored("enter_foreground") {
            return;
        }
        let restored = self
            .handle
            .as_mut()
            .is_some_and(|h| h.enter_foreground());
        if restored && self.attached && !self.sampler.is_running() {
            self.sampler.start();
        }
    }

    /// Terminal. Stops sampling, releases the handle (its play completes with `false`)
    /// and ignores everything afterwards. No finish event is queued.
    pub fn teardown(&mut self) {
        if self.torn_down {
            debug!("teardown called twice");
            return;
        }
        self.torn_down = true;
        self.sampler.stop();
        if let Some(handle) = self.handle.take() {
            handle.release();
        }
        if let Some(callback) = self.deferred.take().and_then(|p| p.completion) {
            callback(false);
        }
        self.last_loaded_name = None;
    }

    // ----- progress sampling -----

    pub fn start_progress_updates(&mut self) {
        if self.ignored("start_progress_updates") {
            return;
        }
        self.sampler.start();
    }

    pub fn stop_progress_updates(&mut self) {
        self.sampler.stop();
    }

    // ----- time -----

    /// Advance the active handle, then the sampler. Events stay queued until drained.
    pub fn advance(&mut self, dt: Duration) {
        if self.ignored("advance") {
            return;
        }
        if let Some(h) = self.handle.as_mut() {
            let t = h.advance(dt);
            self.apply_transition(t);
        }
        self.sampler
            .advance(dt, self.handle.as_ref(), &mut self.outbox);
    }

    /// [`advance`](Self::advance), then drain every queued event.
    pub fn tick(&mut self, dt: Duration) -> Vec<ViewEvent> {
        self.advance(dt);
        self.outbox.take()
    }

    /// Drain events queued since the last drain.
    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        self.outbox.take()
    }

    // ----- internals -----

    fn ignored(&self, op: &str) -> bool {
        if self.torn_down {
            debug!("{op} after teardown ignored");
        }
        self.torn_down
    }

    fn replace_handle(&mut self, mut next: AnimationHandle<R::Surface>) {
        let was_sampling = self.sampler.is_running();

        if self.store.resize_mode() == ResizeMode::Unset {
            let inherited = self
                .handle
                .as_ref()
                .map(|h| h.surface().content_mode())
                .filter(|mode| *mode != ResizeMode::Unset)
                .unwrap_or(self.config.default_content_mode);
            next.surface_mut().set_content_mode(inherited);
        }

        if let Some(previous) = self.handle.take() {
            let t = previous.release();
            self.apply_transition(t);
        }

        let handle = self.handle.insert(next);
        let t = self.controller.apply_all(&self.store, handle);
        self.apply_transition(t);

        if was_sampling && self.attached && !self.sampler.is_running() {
            self.sampler.start();
        }
    }

    fn apply_transition(&mut self, t: Transition) {
        if let Some(completed) = t.finished {
            self.outbox.emit(ViewEvent::AnimationFinish { completed });
            self.sampler.stop();
        }
        if t.started {
            self.outbox.emit(ViewEvent::AnimationStart);
            if self.attached {
                self.sampler.start();
            }
        }
    }
}

impl<R: Renderer> Drop for ContainerView<R> {
    fn drop(&mut self) {
        if !self.torn_down {
            self.teardown();
        }
    }
}
