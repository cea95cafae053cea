//! Renderer seam: the live playback surface and the modes it understands.
//!
//! The control layer never touches frames or pixels directly. Everything it does to a
//! loaded animation goes through [`AnimationSurface`], and every document it loads goes
//! through a [`Renderer`].

use std::time::Duration;

use lottie_api_core::{KeyPath, Rgba};
use serde::{Deserialize, Serialize};

use crate::error::ViewError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    #[default]
    Once,
    Loop,
}

impl LoopMode {
    #[inline]
    pub fn from_looping(looping: bool) -> Self {
        if looping {
            LoopMode::Loop
        } else {
            LoopMode::Once
        }
    }

    #[inline]
    pub fn is_looping(self) -> bool {
        matches!(self, LoopMode::Loop)
    }
}

/// How content is fitted into the view bounds. `Unset` means "keep whatever the surface has".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    Cover,
    Contain,
    Center,
    #[default]
    Unset,
}

impl ResizeMode {
    /// Host strings are matched case-insensitively; anything unknown is `Unset`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "cover" => ResizeMode::Cover,
            "contain" => ResizeMode::Contain,
            "center" => ResizeMode::Center,
            _ => ResizeMode::Unset,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Automatic,
    Hardware,
    Software,
}

impl RenderMode {
    /// Unknown strings fall back to `Automatic`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "hardware" => RenderMode::Hardware,
            "software" => RenderMode::Software,
            _ => RenderMode::Automatic,
        }
    }
}

/// What the surface does with a running play when the host app is backgrounded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundBehavior {
    /// Stop and forget the run.
    #[default]
    Pause,
    /// Stop, and resume the same run on foreground.
    PauseAndRestore,
}

/// Frame window for one play invocation.
///
/// `from_frame: None` starts from the current frame; `to_frame: None` runs to the out point.
/// A `from_frame` past `to_frame` plays the segment backwards.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PlayRequest {
    pub from_frame: Option<f32>,
    pub to_frame: Option<f32>,
    pub loop_mode: LoopMode,
    /// The run keeps `loop_mode` until it ends; later loop changes only reach the next play.
    pub pinned: bool,
}

impl PlayRequest {
    pub fn whole(loop_mode: LoopMode) -> Self {
        Self {
            from_frame: None,
            to_frame: None,
            loop_mode,
            pinned: false,
        }
    }

    pub fn range(from_frame: Option<f32>, to_frame: f32, loop_mode: LoopMode) -> Self {
        Self {
            from_frame,
            to_frame: Some(to_frame),
            loop_mode,
            pinned: false,
        }
    }

    pub fn pinned(self) -> Self {
        Self {
            pinned: true,
            ..self
        }
    }
}

/// A parsed, renderer-owned animation that can be driven frame by frame.
pub trait AnimationSurface {
    /// `(in_point, out_point)` in frames.
    fn frame_range(&self) -> (f32, f32);
    fn frame_rate(&self) -> f32;

    fn is_playing(&self) -> bool;
    fn speed(&self) -> f32;
    fn set_speed(&mut self, speed: f32);

    /// Normalized position in `[0, 1]` across the full frame range.
    fn progress(&self) -> f32;
    /// Moves the displayed frame. Does not start or stop playback.
    fn set_progress(&mut self, progress: f32);

    fn loop_mode(&self) -> LoopMode;
    /// Also applies to the run in flight, if any.
    /// Also retargets the run in flight unless its request was pinned.
    fn set_loop_mode(&mut self, mode: LoopMode);

    fn content_mode(&self) -> ResizeMode;
    fn set_content_mode(&mut self, mode: ResizeMode);
    fn render_mode(&self) -> RenderMode;
    fn set_render_mode(&mut self, mode: RenderMode);
    fn background_behavior(&self) -> BackgroundBehavior;
    fn set_background_behavior(&mut self, behavior: BackgroundBehavior);

    /// Starts a new run, replacing any run in flight.
    fn play(&mut self, request: PlayRequest);
    /// Drops the run in flight. Progress stays where it is.
    fn pause(&mut self);

    /// Binds a static color to every color property matching `pattern`.
    /// Returns how many properties matched.
    fn set_color_provider(&mut self, pattern: &KeyPath, color: Rgba) -> usize;
    /// Removes every color provider bound so far.
    fn clear_color_providers(&mut self);
    /// Effective color of the first property matching `path`.
    fn color_at(&self, path: &KeyPath) -> Option<Rgba>;

    /// Advances the frame clock. Returns true when a `Once` run reached its end on this step.
    fn advance(&mut self, dt: Duration) -> bool;

    /// Returns true when a run in flight was dropped (as opposed to suspended or absent).
    fn enter_background(&mut self) -> bool;
    /// Returns true when a suspended run was restored.
    fn enter_foreground(&mut self) -> bool;
}

/// Parses animation documents into surfaces.
pub trait Renderer {
    type Surface: AnimationSurface;

    fn parse(&self, json: &str) -> Result<Self::Surface, ViewError>;
}
