//! Headless renderer: keeps a frame clock and a color table, draws nothing.
//!
//! Enough of a surface to drive the control layer end to end in tests, benches and
//! the wasm bridge.

use std::time::Duration;

use lottie_api_core::{KeyPath, Rgba};

use crate::composition::{parse_composition, Composition};
use crate::error::ViewError;
use crate::surface::{
    AnimationSurface, BackgroundBehavior, LoopMode, PlayRequest, RenderMode, Renderer, ResizeMode,
};

const FRAME_EPSILON: f32 = 1e-4;

#[derive(Copy, Clone, Debug, Default)]
pub struct HeadlessRenderer;

impl Renderer for HeadlessRenderer {
    type Surface = HeadlessSurface;

    fn parse(&self, json: &str) -> Result<HeadlessSurface, ViewError> {
        Ok(HeadlessSurface::new(parse_composition(json)?))
    }
}

/// Frame window of the run in flight.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Run {
    lo: f32,
    hi: f32,
    reverse: bool,
    loop_mode: LoopMode,
    pinned: bool,
}

#[derive(Debug)]
pub struct HeadlessSurface {
    composition: Composition,
    frame: f32,
    speed: f32,
    loop_mode: LoopMode,
    content_mode: ResizeMode,
    render_mode: RenderMode,
    background: BackgroundBehavior,
    run: Option<Run>,
    suspended: Option<Run>,
    /// Parallel to `composition.color_properties`.
    providers: Vec<Option<Rgba>>,
}

impl HeadlessSurface {
    pub fn new(composition: Composition) -> Self {
        let providers = vec![None; composition.color_properties.len()];
        Self {
            frame: composition.in_point,
            composition,
            speed: 1.0,
            loop_mode: LoopMode::Once,
            content_mode: ResizeMode::Unset,
            render_mode: RenderMode::Automatic,
            background: BackgroundBehavior::Pause,
            run: None,
            suspended: None,
            providers,
        }
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Current frame number.
    pub fn frame(&self) -> f32 {
        self.frame
    }

    fn clamp_frame(&self, frame: f32) -> f32 {
        frame.clamp(self.composition.in_point, self.composition.out_point)
    }
}

/// Floored modulo (result has the sign of `b`).
fn wrap(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

impl AnimationSurface for HeadlessSurface {
    fn frame_range(&self) -> (f32, f32) {
        (self.composition.in_point, self.composition.out_point)
    }

    fn frame_rate(&self) -> f32 {
        self.composition.frame_rate
    }

    fn is_playing(&self) -> bool {
        self.run.is_some()
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn progress(&self) -> f32 {
        ((self.frame - self.composition.in_point) / self.composition.span()).clamp(0.0, 1.0)
    }

    fn set_progress(&mut self, progress: f32) {
        let p = progress.clamp(0.0, 1.0);
        self.frame = self.composition.in_point + p * self.composition.span();
    }

    fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
        for run in [&mut self.run, &mut self.suspended].into_iter().flatten() {
            if !run.pinned {
                run.loop_mode = mode;
            }
        }
    }

    fn content_mode(&self) -> ResizeMode {
        self.content_mode
    }

    fn set_content_mode(&mut self, mode: ResizeMode) {
        self.content_mode = mode;
    }

    fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    fn background_behavior(&self) -> BackgroundBehavior {
        self.background
    }

    fn set_background_behavior(&mut self, behavior: BackgroundBehavior) {
        self.background = behavior;
    }

    fn play(&mut self, request: PlayRequest) {
        let (ip, op) = self.frame_range();
        let (lo, hi, reverse, mut start) = match (request.from_frame, request.to_frame) {
            (None, None) => (ip, op, false, self.frame),
            (from, Some(to)) => {
                let to = self.clamp_frame(to);
                let from = from.map_or(self.frame, |f| self.clamp_frame(f));
                (from.min(to), from.max(to), from > to, from)
            }
            (Some(from), None) => {
                let from = self.clamp_frame(from);
                (from, op, false, from)
            }
        };

        // A one-shot run already sitting on its end frame starts over.
        let backwards = reverse != (self.speed < 0.0);
        if request.loop_mode == LoopMode::Once {
            if !backwards && start >= hi - FRAME_EPSILON {
                start = lo;
            } else if backwards && start <= lo + FRAME_EPSILON {
                start = hi;
            }
        }

        self.frame = start.clamp(lo, hi);
        self.loop_mode = request.loop_mode;
        self.suspended = None;
        self.run = Some(Run {
            lo,
            hi,
            reverse,
            loop_mode: request.loop_mode,
            pinned: request.pinned,
        });
    }

    fn pause(&mut self) {
        self.run = None;
        self.suspended = None;
    }

    fn set_color_provider(&mut self, pattern: &KeyPath, color: Rgba) -> usize {
        let mut matched = 0;
        for (prop, slot) in self
            .composition
            .color_properties
            .iter()
            .zip(self.providers.iter_mut())
        {
            if pattern.matches(&prop.path) {
                *slot = Some(color);
                matched += 1;
            }
        }
        matched
    }

    fn clear_color_providers(&mut self) {
        self.providers.iter_mut().for_each(|slot| *slot = None);
    }

    fn color_at(&self, path: &KeyPath) -> Option<Rgba> {
        self.composition
            .color_properties
            .iter()
            .zip(self.providers.iter())
            .find(|(prop, _)| path.matches(&prop.path))
            .and_then(|(prop, provider)| provider.or(prop.base))
    }

    fn advance(&mut self, dt: Duration) -> bool {
        let Some(run) = self.run else {
            return false;
        };
        let direction = if run.reverse { -1.0 } else { 1.0 };
        let rate = self.composition.frame_rate * self.speed * direction;
        let span = run.hi - run.lo;
        let next = self.frame + rate * dt.as_secs_f32();

        match run.loop_mode {
            LoopMode::Loop => {
                self.frame = if span <= FRAME_EPSILON {
                    run.lo
                } else {
                    run.lo + wrap(next - run.lo, span)
                };
                false
            }
            LoopMode::Once => {
                let end = if rate < 0.0 { run.lo } else { run.hi };
                let reached = span <= FRAME_EPSILON
                    || (rate > 0.0 && next >= run.hi)
                    || (rate < 0.0 && next <= run.lo);
                if reached {
                    self.frame = end;
                    self.run = None;
                    true
                } else {
                    self.frame = next.clamp(run.lo, run.hi);
                    false
                }
            }
        }
    }

    fn enter_background(&mut self) -> bool {
        match self.background {
            BackgroundBehavior::PauseAndRestore => {
                self.suspended = self.run.take();
                false
            }
            BackgroundBehavior::Pause => self.run.take().is_some(),
        }
    }

    fn enter_foreground(&mut self) -> bool {
        match self.suspended.take() {
            Some(run) => {
                self.run = Some(run);
                true
            }
            None => false,
        }
    }
}
