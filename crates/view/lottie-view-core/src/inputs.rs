//! Host inputs as data: playback commands and prop batches.

use serde::{Deserialize, Serialize};

use crate::store::ColorFilterSpec;

pub const COMMAND_PLAY: u32 = 1;
pub const COMMAND_RESET: u32 = 2;
pub const COMMAND_PAUSE: u32 = 3;
pub const COMMAND_RESUME: u32 = 4;
pub const COMMAND_PLAY_FROM_PROGRESS: u32 = 5;

/// Frame argument meaning "not provided" in the numeric command table.
const UNSET_FRAME: f32 = -1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewCommand {
    Play,
    PlayRange {
        #[serde(default)]
        from: Option<f32>,
        to: f32,
    },
    PlayFromProgress {
        progress: f32,
    },
    Pause,
    Resume,
    Reset,
}

impl ViewCommand {
    /// Map a numeric command id and its arguments. Unknown ids return `None`.
    ///
    /// `play` takes optional `[from, to]` frames; `-1` marks either as unset, and both
    /// must be set for a ranged play.
    pub fn from_command_id(id: u32, args: &[f32]) -> Option<Self> {
        match id {
            COMMAND_PLAY => match args {
                [from, to, ..] if *from != UNSET_FRAME && *to != UNSET_FRAME => {
                    Some(ViewCommand::PlayRange {
                        from: Some(*from),
                        to: *to,
                    })
                }
                _ => Some(ViewCommand::Play),
            },
            COMMAND_RESET => Some(ViewCommand::Reset),
            COMMAND_PAUSE => Some(ViewCommand::Pause),
            COMMAND_RESUME => Some(ViewCommand::Resume),
            COMMAND_PLAY_FROM_PROGRESS => args
                .first()
                .map(|p| ViewCommand::PlayFromProgress { progress: *p }),
            _ => None,
        }
    }

    /// Commands that start a play invocation.
    #[inline]
    pub fn starts_play(&self) -> bool {
        matches!(
            self,
            ViewCommand::Play | ViewCommand::PlayRange { .. } | ViewCommand::PlayFromProgress { .. }
        )
    }
}

/// A batch of property changes. Absent fields are left alone.
///
/// Applied in a fixed order: resize mode, render mode, loop, progress, speed, color
/// filters, then `source_json`, then `source_name`. Sources go last so the new handle
/// picks up every other value of the batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewProps {
    pub resize_mode: Option<String>,
    pub render_mode: Option<String>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    pub progress: Option<f32>,
    pub speed: Option<f32>,
    pub color_filters: Option<Vec<ColorFilterSpec>>,
    pub source_json: Option<String>,
    pub source_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_ids() {
        assert_eq!(
            ViewCommand::from_command_id(COMMAND_PLAY, &[]),
            Some(ViewCommand::Play)
        );
        assert_eq!(
            ViewCommand::from_command_id(COMMAND_PLAY, &[-1.0, 30.0]),
            Some(ViewCommand::Play)
        );
        assert_eq!(
            ViewCommand::from_command_id(COMMAND_PLAY, &[40.0, 10.0]),
            Some(ViewCommand::PlayRange {
                from: Some(40.0),
                to: 10.0
            })
        );
        assert_eq!(
            ViewCommand::from_command_id(COMMAND_PLAY_FROM_PROGRESS, &[0.5]),
            Some(ViewCommand::PlayFromProgress { progress: 0.5 })
        );
        assert_eq!(ViewCommand::from_command_id(COMMAND_PLAY_FROM_PROGRESS, &[]), None);
        assert_eq!(ViewCommand::from_command_id(3, &[]), Some(ViewCommand::Pause));
        assert_eq!(ViewCommand::from_command_id(99, &[]), None);
    }

    #[test]
    fn command_json_shape() {
        let cmd: ViewCommand = serde_json::from_str(r#"{"type":"playRange","to":12}"#).unwrap();
        assert_eq!(cmd, ViewCommand::PlayRange { from: None, to: 12.0 });
        let cmd: ViewCommand = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        assert_eq!(cmd, ViewCommand::Reset);
        assert!(!cmd.starts_play());
    }

    #[test]
    fn props_json_uses_host_names() {
        let props: ViewProps = serde_json::from_str(
            r##"{"loop":true,"speed":1.5,"resizeMode":"cover","sourceName":"spinner",
                "colorFilters":[{"keypath":"Layer1","color":"#fff"}]}"##,
        )
        .unwrap();
        assert_eq!(props.looping, Some(true));
        assert_eq!(props.speed, Some(1.5));
        assert_eq!(props.resize_mode.as_deref(), Some("cover"));
        assert_eq!(props.source_name.as_deref(), Some("spinner"));
        assert_eq!(props.color_filters.map(|f| f.len()), Some(1));
        assert_eq!(props.progress, None);
    }
}
