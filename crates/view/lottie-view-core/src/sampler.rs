//! Periodic progress sampling, driven cooperatively by the host tick.

use std::time::Duration;

use crate::events::{EventSink, ViewEvent};
use crate::handle::AnimationHandle;
use crate::surface::AnimationSurface;

/// Identifies one sampler subscription. A stopped or restarted sampler never honors an
/// older token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug)]
pub struct ProgressSampler {
    interval: Duration,
    token: Option<TimerToken>,
    generation: u64,
    elapsed: Duration,
}

impl ProgressSampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            token: None,
            generation: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Cancel any live subscription and issue a new one. The first sample is due one
    /// interval from now.
    pub fn start(&mut self) -> TimerToken {
        self.stop();
        self.generation += 1;
        let token = TimerToken(self.generation);
        self.token = Some(token);
        token
    }

    pub fn stop(&mut self) {
        self.token = None;
        self.elapsed = Duration::ZERO;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.token.is_some()
    }

    #[inline]
    pub fn token(&self) -> Option<TimerToken> {
        self.token
    }

    #[inline]
    pub fn is_current(&self, token: TimerToken) -> bool {
        self.token == Some(token)
    }

    /// Accumulate `dt`. Once at least one interval has elapsed, emits a single progress
    /// sample if the handle is playing; missed intervals are coalesced, not replayed.
    /// Returns true when a sample was emitted.
    pub fn advance<S: AnimationSurface>(
        &mut self,
        dt: Duration,
        handle: Option<&AnimationHandle<S>>,
        sink: &mut dyn EventSink,
    ) -> bool {
        if self.token.is_none() || self.interval.is_zero() {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return false;
        }
        let rem = self.elapsed.as_nanos() % self.interval.as_nanos();
        self.elapsed = Duration::from_nanos(rem as u64);

        match handle {
            Some(h) if h.is_playing() => {
                sink.emit(ViewEvent::AnimationProgress {
                    progress: h.surface().progress(),
                });
                true
            }
            _ => false,
        }
    }
}
