//! Ownership wrapper around one loaded surface.
//!
//! A handle owns the surface, remembers where it came from, and tracks the play
//! invocation in flight. The invocation's completion fires exactly once: `true` when a
//! one-shot run reaches its end, `false` when anything else ends it, including the
//! handle being dropped.

use std::fmt;
use std::time::Duration;

use log::debug;

use crate::assets::AssetLoader;
use crate::error::ViewError;
use crate::surface::{AnimationSurface, PlayRequest, Renderer};

/// Host callback for a play invocation; receives `completed`.
pub type Completion = Box<dyn FnOnce(bool)>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnimationSource {
    /// Document text handed over directly.
    Inline(String),
    /// Normalized asset name.
    Named(String),
}

/// One play invocation that has started and not yet concluded.
pub struct ActivePlay {
    completion: Option<Completion>,
}

impl fmt::Debug for ActivePlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivePlay")
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}

/// What a handle operation did to the play lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    /// An invocation concluded, with its `completed` flag.
    pub finished: Option<bool>,
    /// A new invocation started.
    pub started: bool,
}

impl Transition {
    pub const NONE: Transition = Transition {
        finished: None,
        started: false,
    };

    pub fn finished(completed: bool) -> Self {
        Self {
            finished: Some(completed),
            started: false,
        }
    }

    /// Combine two transitions that happened in sequence.
    pub fn merge(self, later: Transition) -> Transition {
        Transition {
            finished: self.finished.or(later.finished),
            started: self.started || later.started,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.finished.is_none() && !self.started
    }
}

#[derive(Debug)]
pub struct AnimationHandle<S: AnimationSurface> {
    surface: S,
    source: AnimationSource,
    active_play: Option<ActivePlay>,
}

impl<S: AnimationSurface> AnimationHandle<S> {
    pub fn new(surface: S, source: AnimationSource) -> Self {
        Self {
            surface,
            source,
            active_play: None,
        }
    }

    /// Parse document text into a new handle.
    pub fn load_from_inline_data<R>(renderer: &R, json: &str) -> Result<Self, ViewError>
    where
        R: Renderer<Surface = S>,
    {
        let surface = renderer.parse(json)?;
        Ok(Self::new(surface, AnimationSource::Inline(json.to_string())))
    }

    /// Read a named asset and parse it. `name` is expected to be normalized already.
    pub fn load_from_named_asset<R>(
        renderer: &R,
        loader: &dyn AssetLoader,
        name: &str,
    ) -> Result<Self, ViewError>
    where
        R: Renderer<Surface = S>,
    {
        let json = loader.read(name)?;
        let surface = renderer.parse(&json)?;
        Ok(Self::new(surface, AnimationSource::Named(name.to_string())))
    }

    pub fn source(&self) -> &AnimationSource {
        &self.source
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.surface.is_playing()
    }

    #[inline]
    pub fn has_active_play(&self) -> bool {
        self.active_play.is_some()
    }

    /// Start a new invocation. Any invocation in flight concludes with `false` first.
    pub fn start_play(
        &mut self,
        request: PlayRequest,
        completion: Option<Completion>,
    ) -> Transition {
        let interrupted = self.conclude(false);
        self.surface.play(request);
        self.active_play = Some(ActivePlay { completion });
        interrupted.merge(Transition {
            finished: None,
            started: true,
        })
    }

    /// Stop live playback and conclude the invocation in flight, if any.
    pub fn pause(&mut self) -> Transition {
        self.surface.pause();
        self.conclude(false)
    }

    /// Step the surface clock. Concludes with `true` when a one-shot run ends.
    pub fn advance(&mut self, dt: Duration) -> Transition {
        if self.surface.advance(dt) {
            self.conclude(true)
        } else {
            Transition::NONE
        }
    }

    /// Fire the in-flight completion, if there is one.
    pub fn conclude(&mut self, completed: bool) -> Transition {
        match self.active_play.take() {
            Some(play) => {
                if let Some(callback) = play.completion {
                    callback(completed);
                }
                Transition::finished(completed)
            }
            None => Transition::NONE,
        }
    }

    /// Background the surface. A dropped run concludes with `false`; a suspended one stays open.
    pub fn enter_background(&mut self) -> Transition {
        if self.surface.enter_background() {
            self.conclude(false)
        } else {
            Transition::NONE
        }
    }

    /// Returns true when a suspended run resumed.
    pub fn enter_foreground(&mut self) -> bool {
        self.surface.enter_foreground()
    }

    /// Stop the surface and conclude any invocation before the handle goes away.
    pub fn release(mut self) -> Transition {
        self.surface.pause();
        self.conclude(false)
    }
}

impl<S: AnimationSurface> Drop for AnimationHandle<S> {
    fn drop(&mut self) {
        if self.active_play.is_some() {
            debug!("animation handle dropped with a play in flight; concluding as interrupted");
            self.conclude(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessRenderer, HeadlessSurface};
    use crate::surface::LoopMode;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DOC: &str = r#"{ "fr": 10, "ip": 0, "op": 10, "layers": [] }"#;

    fn handle() -> AnimationHandle<HeadlessSurface> {
        AnimationHandle::load_from_inline_data(&HeadlessRenderer, DOC).unwrap()
    }

    fn recorder() -> (Rc<RefCell<Vec<bool>>>, Completion) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        (calls, Box::new(move |done| sink.borrow_mut().push(done)))
    }

    #[test]
    fn completion_fires_true_on_natural_end() {
        let mut h = handle();
        let (calls, cb) = recorder();
        let t = h.start_play(PlayRequest::whole(LoopMode::Once), Some(cb));
        assert_eq!(t, Transition { finished: None, started: true });
        assert!(h.advance(Duration::from_millis(500)).is_empty());
        assert_eq!(h.advance(Duration::from_millis(600)), Transition::finished(true));
        assert_eq!(*calls.borrow(), vec![true]);
        assert!(!h.has_active_play());
    }

    #[test]
    fn new_play_interrupts_previous() {
        let mut h = handle();
        let (calls, cb) = recorder();
        h.start_play(PlayRequest::whole(LoopMode::Loop), Some(cb));
        let t = h.start_play(PlayRequest::whole(LoopMode::Loop), None);
        assert_eq!(t, Transition { finished: Some(false), started: true });
        assert_eq!(*calls.borrow(), vec![false]);
    }

    #[test]
    fn drop_concludes_exactly_once() {
        let (calls, cb) = recorder();
        {
            let mut h = handle();
            h.start_play(PlayRequest::whole(LoopMode::Loop), Some(cb));
        }
        assert_eq!(*calls.borrow(), vec![false]);

        let (calls, cb) = recorder();
        let mut h = handle();
        h.start_play(PlayRequest::whole(LoopMode::Loop), Some(cb));
        assert_eq!(h.release(), Transition::finished(false));
        assert_eq!(*calls.borrow(), vec![false]);
    }

    #[test]
    fn pause_without_play_is_quiet() {
        let mut h = handle();
        assert!(h.pause().is_empty());
    }

    #[test]
    fn named_load_records_source() {
        let loader = crate::assets::MemoryAssetLoader::new().with("a.json", DOC);
        let h: AnimationHandle<HeadlessSurface> =
            AnimationHandle::load_from_named_asset(&HeadlessRenderer, &loader, "a.json").unwrap();
        assert_eq!(h.source(), &AnimationSource::Named("a.json".into()));
        let err = AnimationHandle::<HeadlessSurface>::load_from_named_asset(
            &HeadlessRenderer,
            &loader,
            "missing.json",
        )
        .unwrap_err();
        assert!(matches!(err, ViewError::Io { .. }));
    }
}
