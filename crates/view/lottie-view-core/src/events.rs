//! Host-facing events and the queue that buffers them between drains.

use log::warn;
use serde::{Deserialize, Serialize};

/// Discrete signals delivered to the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewEvent {
    /// A play invocation began.
    AnimationStart,
    /// Live progress sample, emitted by the progress sampler while playing.
    AnimationProgress { progress: f32 },
    /// A play invocation concluded; `completed` is false when it was interrupted.
    AnimationFinish { completed: bool },
}

impl ViewEvent {
    /// Host event name (the registration name the host binds handlers to).
    #[inline]
    pub fn host_name(&self) -> &'static str {
        match self {
            Self::AnimationStart => "onAnimationStart",
            Self::AnimationProgress { .. } => "onAnimationProgress",
            Self::AnimationFinish { .. } => "onAnimationFinish",
        }
    }

    #[inline]
    pub fn is_progress(&self) -> bool {
        matches!(self, Self::AnimationProgress { .. })
    }
}

/// Anything that can receive view events.
pub trait EventSink {
    fn emit(&mut self, event: ViewEvent);
}

impl EventSink for Vec<ViewEvent> {
    fn emit(&mut self, event: ViewEvent) {
        self.push(event);
    }
}

/// Bounded event queue owned by the container view.
///
/// Lifecycle events are always queued. Progress samples are dropped once `capacity`
/// events are pending, until the host drains.
#[derive(Debug)]
pub struct Outbox {
    events: Vec<ViewEvent>,
    capacity: usize,
    dropped: u64,
}

impl Outbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Drain everything queued so far, oldest first.
    #[inline]
    pub fn take(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn pending(&self) -> &[ViewEvent] {
        &self.events
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Progress samples dropped because the queue was full.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl EventSink for Outbox {
    fn emit(&mut self, event: ViewEvent) {
        if event.is_progress() && self.events.len() >= self.capacity {
            if self.dropped == 0 {
                warn!(
                    "event queue full ({} pending); dropping progress samples until drained",
                    self.events.len()
                );
            }
            self.dropped += 1;
            return;
        }
        self.events.push(event);
    }
}
