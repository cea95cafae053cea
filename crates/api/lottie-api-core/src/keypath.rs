//! KeyPath parsing, formatting and matching.
//!
//! Grammar (renderer-agnostic):
//!   segment(.segment)*
//! - '.' separates segments
//! - `*` matches exactly one segment
//! - `**` matches zero or more segments
//! - any other segment matches literally (spaces allowed, as in layer names)
//!
//! Examples:
//!   "Layer1.**.Color"          -> every color property under Layer1
//!   "Layer1.Group 1.Fill 1.Color"  -> one concrete fill color
//!   "*.Stroke 1.Color"         -> the stroke named "Stroke 1" in any top-level layer
//!
//! Renderers resolve a KeyPath against their own content tree; this type only knows
//! the textual shape and the glob semantics.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Property name targeted by color overrides.
pub const COLOR_PROPERTY: &str = "Color";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal layer, group or property name.
    Name(String),
    /// `*`: exactly one segment.
    Any,
    /// `**`: zero or more segments.
    AnyDepth,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw {
            "*" => Segment::Any,
            "**" => Segment::AnyDepth,
            other => Segment::Name(other.to_string()),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Segment::Name(name) => name,
            Segment::Any => "*",
            Segment::AnyDepth => "**",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Parse a keypath string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.trim().is_empty() {
            return Err("empty keypath".to_string());
        }
        let mut segments = Vec::new();
        for raw in s.split('.') {
            if raw.is_empty() {
                return Err(format!("invalid keypath '{s}': empty segment"));
            }
            if raw.trim() != raw {
                return Err(format!(
                    "invalid keypath '{s}': segment '{raw}' has leading or trailing whitespace"
                ));
            }
            segments.push(Segment::parse(raw));
        }
        Ok(Self { segments })
    }

    /// Pattern used for color overrides: the named layer and every descendant's color.
    ///
    /// `"Layer1"` becomes `"Layer1.**.Color"`.
    pub fn color_override(layer: &str) -> Result<Self, String> {
        let mut path = Self::parse(layer)?;
        path.segments.push(Segment::AnyDepth);
        path.segments.push(Segment::Name(COLOR_PROPERTY.to_string()));
        Ok(path)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the pattern contains no wildcard.
    pub fn is_concrete(&self) -> bool {
        self.segments
            .iter()
            .all(|seg| matches!(seg, Segment::Name(_)))
    }

    /// Match a concrete property path (e.g. `["Layer1", "Group 1", "Fill 1", "Color"]`).
    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> bool {
        match_from(&self.segments, path)
    }
}

/// Single pass over the pattern; `live[i]` marks path prefixes of length `i` that the
/// segments seen so far can consume. Quadratic at worst, however many `**` appear.
fn match_from<S: AsRef<str>>(pattern: &[Segment], path: &[S]) -> bool {
    let mut live = vec![false; path.len() + 1];
    live[0] = true;
    for seg in pattern {
        let mut next = vec![false; path.len() + 1];
        match seg {
            Segment::AnyDepth => {
                let mut reached = false;
                for (slot, was) in next.iter_mut().zip(&live) {
                    reached |= *was;
                    *slot = reached;
                }
            }
            Segment::Any => {
                for i in 0..path.len() {
                    next[i + 1] = live[i];
                }
            }
            Segment::Name(name) => {
                for (i, head) in path.iter().enumerate() {
                    next[i + 1] = live[i] && head.as_ref() == name;
                }
            }
        }
        live = next;
    }
    live[path.len()]
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.segments.iter().map(Segment::as_str).collect();
        f.write_str(&parts.join("."))
    }
}

impl FromStr for KeyPath {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyPath::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for KeyPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D>(deserializer: D) -> Result<KeyPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        KeyPath::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn many_any_depth_segments_fail_fast() {
        let p = KeyPath::parse(&format!("{}Missing", "**.".repeat(16))).unwrap();
        let path = vec!["Layer"; 40];
        assert!(!p.matches(&path));
        let q = KeyPath::parse("**.Layer.**.**.Layer").unwrap();
        assert!(q.matches(&path));
    }

    #[test]
    fn parse_and_display_roundtrip_with_spaces() {
        let p = KeyPath::parse("Layer 1.Group 1.Fill 1.Color").unwrap();
        assert_eq!(p.segments().len(), 4);
        assert!(p.is_concrete());
        assert_eq!(p.to_string(), "Layer 1.Group 1.Fill 1.Color");
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(KeyPath::parse("").is_err());
        assert!(KeyPath::parse("Layer1..Color").is_err());
        assert!(KeyPath::parse(".Layer1").is_err());
        assert!(KeyPath::parse("Layer1. Color").is_err());
    }

    #[test]
    fn color_override_appends_descendant_color() {
        let p = KeyPath::color_override("Layer1").unwrap();
        assert_eq!(p.to_string(), "Layer1.**.Color");
        assert!(!p.is_concrete());
    }

    #[test]
    fn any_depth_matches_zero_or_more() {
        let p = KeyPath::parse("Layer1.**.Color").unwrap();
        assert!(p.matches(&["Layer1", "Color"]));
        assert!(p.matches(&["Layer1", "Fill 1", "Color"]));
        assert!(p.matches(&["Layer1", "Group", "Inner", "Stroke 1", "Color"]));
        assert!(!p.matches(&["Layer2", "Fill 1", "Color"]));
        assert!(!p.matches(&["Layer1", "Fill 1", "Opacity"]));
    }

    #[test]
    fn single_wildcard_matches_one_segment() {
        let p = KeyPath::parse("*.Fill 1.Color").unwrap();
        assert!(p.matches(&["Layer1", "Fill 1", "Color"]));
        assert!(!p.matches(&["Fill 1", "Color"]));
        assert!(!p.matches(&["Layer1", "Group", "Fill 1", "Color"]));
    }

    #[test]
    fn serde_as_string() {
        let p = KeyPath::parse("Layer1.**.Color").unwrap();
        let s = serde_json::to_string(&p).unwrap();
        assert_eq!(s, "\"Layer1.**.Color\"");
        let back: KeyPath = serde_json::from_str(&s).unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<KeyPath>("\"a..b\"").is_err());
    }
}
