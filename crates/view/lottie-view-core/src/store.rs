//! Latest host intent, independent of whether anything is loaded.

use log::warn;
use lottie_api_core::{KeyPath, Rgba};
use serde::{Deserialize, Serialize};

use crate::error::ViewError;
use crate::surface::{LoopMode, RenderMode, ResizeMode};

/// Raw color filter entry as the host sends it. Both fields are required for the
/// entry to be accepted; validation happens in [`ColorOverride::from_spec`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorFilterSpec {
    pub keypath: Option<String>,
    pub color: Option<String>,
}

impl ColorFilterSpec {
    pub fn new(keypath: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            keypath: Some(keypath.into()),
            color: Some(color.into()),
        }
    }
}

/// A validated override: `color` applied to every color under `keypath`.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorOverride {
    /// Layer keypath as given by the host.
    pub keypath: String,
    /// `<keypath>.**.Color`
    pub pattern: KeyPath,
    pub color: Rgba,
}

impl ColorOverride {
    /// `index` is the entry's position in the host list, used for error reporting.
    pub fn from_spec(index: usize, spec: &ColorFilterSpec) -> Result<Self, ViewError> {
        let keypath = spec
            .keypath
            .as_deref()
            .ok_or_else(|| ViewError::binding(index, "missing keypath"))?;
        let color = spec
            .color
            .as_deref()
            .ok_or_else(|| ViewError::binding(index, "missing color"))?;
        let pattern =
            KeyPath::color_override(keypath).map_err(|e| ViewError::binding(index, e))?;
        let color = Rgba::from_hex(color)
            .map_err(|e| ViewError::binding(index, format!("color '{color}': {e}")))?;
        Ok(Self {
            keypath: keypath.to_string(),
            pattern,
            color,
        })
    }
}

/// Outcome of a `set_color_filters` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorFilterReport {
    pub accepted: usize,
    pub rejected: Vec<ViewError>,
}

impl ColorFilterReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Host-set properties. Persist across source changes; replayed onto every new handle.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyStore {
    speed: f32,
    progress: f32,
    loop_mode: LoopMode,
    resize_mode: ResizeMode,
    render_mode: RenderMode,
    color_overrides: Vec<ColorOverride>,
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self {
            speed: 0.0,
            progress: 0.0,
            loop_mode: LoopMode::Once,
            resize_mode: ResizeMode::Unset,
            render_mode: RenderMode::Automatic,
            color_overrides: Vec::new(),
        }
    }
}

impl PropertyStore {
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn resize_mode(&self) -> ResizeMode {
        self.resize_mode
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn color_overrides(&self) -> &[ColorOverride] {
        &self.color_overrides
    }

    /// Returns false (and keeps the old value) for non-finite input.
    pub fn set_speed(&mut self, speed: f32) -> bool {
        if !speed.is_finite() {
            warn!("ignoring non-finite speed {speed}");
            return false;
        }
        self.speed = speed;
        true
    }

    /// Clamped into `[0, 1]`. Returns false (and keeps the old value) for non-finite input.
    pub fn set_progress(&mut self, progress: f32) -> bool {
        if !progress.is_finite() {
            warn!("ignoring non-finite progress {progress}");
            return false;
        }
        self.progress = progress.clamp(0.0, 1.0);
        true
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    pub fn set_resize_mode(&mut self, mode: ResizeMode) {
        self.resize_mode = mode;
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    /// Replace the override list wholesale. Malformed entries are skipped and reported.
    pub fn set_color_filters(&mut self, specs: &[ColorFilterSpec]) -> ColorFilterReport {
        let mut report = ColorFilterReport::default();
        let mut overrides = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            match ColorOverride::from_spec(index, spec) {
                Ok(entry) => overrides.push(entry),
                Err(err) => {
                    warn!("skipping color filter: {err}");
                    report.rejected.push(err);
                }
            }
        }
        report.accepted = overrides.len();
        self.color_overrides = overrides;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = PropertyStore::default();
        assert_eq!(s.speed(), 0.0);
        assert_eq!(s.progress(), 0.0);
        assert_eq!(s.loop_mode(), LoopMode::Once);
        assert_eq!(s.resize_mode(), ResizeMode::Unset);
        assert!(s.color_overrides().is_empty());
    }

    #[test]
    fn rejects_non_finite_and_clamps_progress() {
        let mut s = PropertyStore::default();
        assert!(s.set_speed(2.0));
        assert!(!s.set_speed(f32::NAN));
        assert_eq!(s.speed(), 2.0);
        assert!(s.set_progress(1.5));
        assert_eq!(s.progress(), 1.0);
        assert!(!s.set_progress(f32::INFINITY));
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn color_filters_skip_malformed_entries() {
        let mut s = PropertyStore::default();
        let report = s.set_color_filters(&[
            ColorFilterSpec::new("Layer1", "#FF0000"),
            ColorFilterSpec {
                keypath: None,
                color: Some("#00FF00".into()),
            },
            ColorFilterSpec::new("Layer2", "green"),
            ColorFilterSpec::new("Layer1..Fill", "#000"),
            ColorFilterSpec::new("Layer2", "#0000FF"),
        ]);
        assert_eq!(report.accepted, 2);
        let indices: Vec<usize> = report
            .rejected
            .iter()
            .map(|e| match e {
                ViewError::Binding { index, .. } => *index,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
        let keys: Vec<&str> = s.color_overrides().iter().map(|o| o.keypath.as_str()).collect();
        assert_eq!(keys, vec!["Layer1", "Layer2"]);
        assert_eq!(s.color_overrides()[0].pattern.to_string(), "Layer1.**.Color");
    }

    #[test]
    fn color_filters_replace_wholesale() {
        let mut s = PropertyStore::default();
        s.set_color_filters(&[ColorFilterSpec::new("Layer1", "#FF0000")]);
        s.set_color_filters(&[]);
        assert!(s.color_overrides().is_empty());
    }

    #[test]
    fn filter_spec_deserializes_with_missing_fields() {
        let specs: Vec<ColorFilterSpec> =
            serde_json::from_str(r##"[{"keypath":"Layer1","color":"#fff"},{"color":"#000"}]"##)
                .unwrap();
        assert_eq!(specs[0], ColorFilterSpec::new("Layer1", "#fff"));
        assert_eq!(specs[1].keypath, None);
    }
}
