//! Applies host intent to the active handle.
//!
//! The controller is stateless: intent lives in [`PropertyStore`], live state lives in
//! the handle. Every method takes the handle as an `Option` so setters work the same
//! before and after a source is loaded.

use log::debug;

use crate::handle::{AnimationHandle, Completion, Transition};
use crate::store::{ColorFilterReport, ColorFilterSpec, PropertyStore};
use crate::surface::{
    AnimationSurface, BackgroundBehavior, LoopMode, PlayRequest, RenderMode, ResizeMode,
};

/// How the `speed` property relates to playback.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpeedSemantics {
    /// `speed == 0` pauses; any other value sets the rate and starts unbounded playback
    /// if nothing is playing. Progress is never reset by a speed change.
    ZeroPauses,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct PlaybackController;

impl PlaybackController {
    pub const SPEED_SEMANTICS: SpeedSemantics = SpeedSemantics::ZeroPauses;

    /// Store `speed` and apply it under [`SpeedSemantics::ZeroPauses`].
    ///
    /// Re-setting the stored value is a no-op only while the handle already reflects it;
    /// after a pause, reset or finished run it applies again.
    pub fn set_speed<S: AnimationSurface>(
        &self,
        store: &mut PropertyStore,
        handle: Option<&mut AnimationHandle<S>>,
        speed: f32,
    ) -> Transition {
        let settled = handle.as_deref().map_or(true, |h| speed_settled(h, speed));
        if store.speed() == speed && settled {
            debug!("speed unchanged ({speed})");
            return Transition::NONE;
        }
        if !store.set_speed(speed) {
            return Transition::NONE;
        }
        match handle {
            Some(h) => apply_speed(store, h),
            None => Transition::NONE,
        }
    }

    /// Store and seek. Playback state is left alone.
    pub fn set_progress<S: AnimationSurface>(
        &self,
        store: &mut PropertyStore,
        handle: Option<&mut AnimationHandle<S>>,
        progress: f32,
    ) {
        if store.set_progress(progress) {
            if let Some(h) = handle {
                h.surface_mut().set_progress(store.progress());
            }
        }
    }

    pub fn set_loop_mode<S: AnimationSurface>(
        &self,
        store: &mut PropertyStore,
        handle: Option<&mut AnimationHandle<S>>,
        mode: LoopMode,
    ) {
        store.set_loop_mode(mode);
        if let Some(h) = handle {
            h.surface_mut().set_loop_mode(mode);
        }
    }

    /// `Unset` is stored but leaves the surface's current mode in place.
    pub fn set_resize_mode<S: AnimationSurface>(
        &self,
        store: &mut PropertyStore,
        handle: Option<&mut AnimationHandle<S>>,
        mode: ResizeMode,
    ) {
        store.set_resize_mode(mode);
        if let Some(h) = handle {
            apply_resize(store, h);
        }
    }

    pub fn set_render_mode<S: AnimationSurface>(
        &self,
        store: &mut PropertyStore,
        handle: Option<&mut AnimationHandle<S>>,
        mode: RenderMode,
    ) {
        store.set_render_mode(mode);
        if let Some(h) = handle {
            h.surface_mut().set_render_mode(mode);
        }
    }

    pub fn set_color_filters<S: AnimationSurface>(
        &self,
        store: &mut PropertyStore,
        handle: Option<&mut AnimationHandle<S>>,
        specs: &[ColorFilterSpec],
    ) -> ColorFilterReport {
        let report = store.set_color_filters(specs);
        if let Some(h) = handle {
            apply_colors(store, h);
        }
        report
    }

    /// Replay the whole store onto a handle: progress, loop, resize and render, speed, colors.
    ///
    /// Progress and loop mode land before speed can start playback; colors go last.
    pub fn apply_all<S: AnimationSurface>(
        &self,
        store: &PropertyStore,
        handle: &mut AnimationHandle<S>,
    ) -> Transition {
        let surface = handle.surface_mut();
        surface.set_progress(store.progress());
        surface.set_loop_mode(store.loop_mode());
        surface.set_render_mode(store.render_mode());
        apply_resize(store, handle);
        let transition = apply_speed(store, handle);
        apply_colors(store, handle);
        transition
    }

    /// Play the whole sequence under the stored loop mode.
    pub fn play<S: AnimationSurface>(
        &self,
        store: &PropertyStore,
        handle: Option<&mut AnimationHandle<S>>,
        completion: Option<Completion>,
    ) -> Transition {
        let Some(h) = handle else {
            return orphan("play", completion);
        };
        h.surface_mut()
            .set_background_behavior(BackgroundBehavior::PauseAndRestore);
        h.start_play(PlayRequest::whole(store.loop_mode()), completion)
    }

    /// Play between two frame markers under the stored loop mode.
    /// `from: None` starts at the current frame; `from > to` plays backwards.
    pub fn play_range<S: AnimationSurface>(
        &self,
        store: &PropertyStore,
        handle: Option<&mut AnimationHandle<S>>,
        from: Option<f32>,
        to: f32,
        completion: Option<Completion>,
    ) -> Transition {
        let Some(h) = handle else {
            return orphan("play_range", completion);
        };
        if !to.is_finite() || from.is_some_and(|f| !f.is_finite()) {
            debug!("play_range with non-finite frames ignored");
            return orphan("play_range", completion);
        }
        h.surface_mut()
            .set_background_behavior(BackgroundBehavior::PauseAndRestore);
        h.start_play(PlayRequest::range(from, to, store.loop_mode()), completion)
    }

    /// Play once from `progress` to the end, whatever the stored loop mode.
    pub fn play_from_progress<S: AnimationSurface>(
        &self,
        handle: Option<&mut AnimationHandle<S>>,
        progress: f32,
        completion: Option<Completion>,
    ) -> Transition {
        let Some(h) = handle else {
            return orphan("play_from_progress", completion);
        };
        if !progress.is_finite() {
            debug!("play_from_progress with non-finite progress ignored");
            return orphan("play_from_progress", completion);
        }
        let (ip, op) = h.surface().frame_range();
        let from = ip + progress.clamp(0.0, 1.0) * (op - ip);
        h.start_play(
            PlayRequest::range(Some(from), op, LoopMode::Once).pinned(),
            completion,
        )
    }

    /// Seek to the start and pause. The store keeps its values.
    pub fn reset<S: AnimationSurface>(&self, handle: Option<&mut AnimationHandle<S>>) -> Transition {
        match handle {
            Some(h) => {
                h.surface_mut().set_progress(0.0);
                h.pause()
            }
            None => Transition::NONE,
        }
    }

    pub fn pause<S: AnimationSurface>(&self, handle: Option<&mut AnimationHandle<S>>) -> Transition {
        handle.map_or(Transition::NONE, |h| h.pause())
    }

    /// Same as an unbounded `play`.
    pub fn resume<S: AnimationSurface>(
        &self,
        store: &PropertyStore,
        handle: Option<&mut AnimationHandle<S>>,
    ) -> Transition {
        self.play(store, handle, None)
    }
}

fn apply_speed<S: AnimationSurface>(
    store: &PropertyStore,
    handle: &mut AnimationHandle<S>,
) -> Transition {
    let speed = store.speed();
    if speed == 0.0 {
        if handle.is_playing() || handle.has_active_play() {
            return handle.pause();
        }
        return Transition::NONE;
    }
    handle.surface_mut().set_speed(speed);
    if handle.is_playing() {
        Transition::NONE
    } else {
        handle.start_play(PlayRequest::whole(store.loop_mode()), None)
    }
}

/// Whether the handle's live state already matches what `speed` implies.
fn speed_settled<S: AnimationSurface>(handle: &AnimationHandle<S>, speed: f32) -> bool {
    if speed == 0.0 {
        !handle.is_playing() && !handle.has_active_play()
    } else {
        handle.is_playing() && handle.surface().speed() == speed
    }
}

fn apply_resize<S: AnimationSurface>(store: &PropertyStore, handle: &mut AnimationHandle<S>) {
    let mode = store.resize_mode();
    if mode != ResizeMode::Unset {
        handle.surface_mut().set_content_mode(mode);
    }
}

/// Rebind every override in list order; later entries win where patterns overlap.
fn apply_colors<S: AnimationSurface>(store: &PropertyStore, handle: &mut AnimationHandle<S>) {
    let surface = handle.surface_mut();
    surface.clear_color_providers();
    for entry in store.color_overrides() {
        if surface.set_color_provider(&entry.pattern, entry.color) == 0 {
            debug!("color filter '{}' matched no properties", entry.keypath);
        }
    }
}

/// A play command with nowhere to go still owes its caller a completion.
fn orphan(op: &str, completion: Option<Completion>) -> Transition {
    if let Some(callback) = completion {
        debug!("{op}: no animation to play; completing as interrupted");
        callback(false);
    }
    Transition::NONE
}
