//! Lottie View Core (renderer-agnostic)
//!
//! Playback control for an embedded Lottie animation view: source loading and
//! replacement, host property application, play/pause/seek commands, color overrides,
//! and a cooperative progress sampler. Rendering sits behind [`Renderer`] and
//! [`AnimationSurface`]; [`HeadlessRenderer`] keeps a frame clock without drawing.

pub mod assets;
pub mod composition;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod handle;
pub mod headless;
pub mod inputs;
pub mod sampler;
pub mod store;
pub mod surface;
pub mod view;

/// Host ABI version of the view surface (props, commands, events).
pub const VIEW_VERSION: u32 = 1;

// Re-exports for consumers (host bridges)
pub use assets::{normalize_asset_name, AssetLoader, FsAssetLoader, MemoryAssetLoader};
pub use composition::{parse_composition, ColorProperty, Composition};
pub use config::Config;
pub use controller::{PlaybackController, SpeedSemantics};
pub use error::ViewError;
pub use events::{EventSink, Outbox, ViewEvent};
pub use handle::{AnimationHandle, AnimationSource, Completion, Transition};
pub use headless::{HeadlessRenderer, HeadlessSurface};
pub use inputs::{ViewCommand, ViewProps};
pub use lottie_api_core::{KeyPath, Rgba};
pub use sampler::{ProgressSampler, TimerToken};
pub use store::{ColorFilterReport, ColorFilterSpec, ColorOverride, PropertyStore};
pub use surface::{
    AnimationSurface, BackgroundBehavior, LoopMode, PlayRequest, RenderMode, Renderer, ResizeMode,
};
pub use view::{ContainerView, ViewState};
