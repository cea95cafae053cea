use serde::Deserialize;

use lottie_api_core::{Rgba, COLOR_PROPERTY};

use crate::error::ViewError;

/// The part of a Lottie document the control layer needs: timing, size, and the
/// color properties a keypath can address.
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    pub version: Option<String>,
    pub name: Option<String>,
    pub frame_rate: f32,
    pub in_point: f32,
    pub out_point: f32,
    pub width: f32,
    pub height: f32,
    pub color_properties: Vec<ColorProperty>,
}

/// One addressable color, e.g. `["Layer1", "Group 1", "Fill 1", "Color"]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorProperty {
    pub path: Vec<String>,
    /// Static color from the document; `None` when the color is keyframed.
    pub base: Option<Rgba>,
}

impl Composition {
    /// Total frames between in and out point.
    #[inline]
    pub fn span(&self) -> f32 {
        self.out_point - self.in_point
    }

    /// Duration in seconds at the document frame rate.
    #[inline]
    pub fn duration_secs(&self) -> f32 {
        self.span() / self.frame_rate
    }
}

/// Parse a Lottie document header and its shape name tree.
pub fn parse_composition(json: &str) -> Result<Composition, ViewError> {
    let raw: RawDocument = serde_json::from_str(json)?;

    let frame_rate = raw.fr as f32;
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return Err(ViewError::parse(format!(
            "frame rate must be positive, got {}",
            raw.fr
        )));
    }
    let (in_point, out_point) = (raw.ip as f32, raw.op as f32);
    if !in_point.is_finite() || !out_point.is_finite() || out_point <= in_point {
        return Err(ViewError::parse(format!(
            "out point ({}) must be after in point ({})",
            raw.op, raw.ip
        )));
    }

    let mut color_properties = Vec::new();
    for (i, layer) in raw.layers.iter().enumerate() {
        let layer_name = layer.nm.clone().unwrap_or_else(|| format!("Layer {}", i + 1));
        let mut path = vec![layer_name];
        collect_colors(&layer.shapes, &mut path, &mut color_properties);
    }

    Ok(Composition {
        version: raw.v,
        name: raw.nm,
        frame_rate,
        in_point,
        out_point,
        width: raw.w as f32,
        height: raw.h as f32,
        color_properties,
    })
}

fn collect_colors(shapes: &[RawShape], path: &mut Vec<String>, out: &mut Vec<ColorProperty>) {
    for shape in shapes {
        let name = shape.nm.clone().unwrap_or_else(|| shape.ty.clone());
        match shape.ty.as_str() {
            "gr" => {
                path.push(name);
                collect_colors(&shape.it, path, out);
                path.pop();
            }
            "fl" | "st" => {
                let mut full = path.clone();
                full.push(name);
                full.push(COLOR_PROPERTY.to_string());
                out.push(ColorProperty {
                    path: full,
                    base: shape.c.as_ref().and_then(RawColor::static_value),
                });
            }
            _ => {}
        }
    }
}

// ---------- Raw document shapes ----------

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    v: Option<String>,
    #[serde(default)]
    nm: Option<String>,
    fr: f64,
    ip: f64,
    op: f64,
    #[serde(default)]
    w: f64,
    #[serde(default)]
    h: f64,
    #[serde(default)]
    layers: Vec<RawLayer>,
}

#[derive(Deserialize)]
struct RawLayer {
    #[serde(default)]
    nm: Option<String>,
    #[serde(default)]
    shapes: Vec<RawShape>,
}

#[derive(Deserialize)]
struct RawShape {
    ty: String,
    #[serde(default)]
    nm: Option<String>,
    #[serde(default)]
    it: Vec<RawShape>,
    #[serde(default)]
    c: Option<RawColor>,
}

#[derive(Deserialize)]
struct RawColor {
    #[serde(default)]
    a: u8,
    k: serde_json::Value,
}

impl RawColor {
    fn static_value(&self) -> Option<Rgba> {
        if self.a != 0 {
            return None;
        }
        let components: Vec<f32> = self
            .k
            .as_array()?
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<_>>()?;
        Rgba::from_components(&components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "v": "5.7.4", "nm": "demo", "fr": 30, "ip": 0, "op": 60, "w": 200, "h": 100,
        "layers": [
            { "nm": "Layer1", "shapes": [
                { "ty": "gr", "nm": "Group 1", "it": [
                    { "ty": "sh", "nm": "Path 1" },
                    { "ty": "fl", "nm": "Fill 1", "c": { "a": 0, "k": [1, 0, 0, 1] } }
                ]},
                { "ty": "st", "c": { "a": 1, "k": [] } }
            ]},
            { "shapes": [ { "ty": "fl", "nm": "Fill 1", "c": { "a": 0, "k": [0, 0, 1] } } ] }
        ]
    }"#;

    #[test]
    fn parses_header_and_color_paths() {
        let comp = parse_composition(DOC).unwrap();
        assert_eq!(comp.frame_rate, 30.0);
        assert_eq!(comp.span(), 60.0);
        assert!((comp.duration_secs() - 2.0).abs() < 1e-6);
        let paths: Vec<String> = comp
            .color_properties
            .iter()
            .map(|p| p.path.join("."))
            .collect();
        assert_eq!(
            paths,
            vec![
                "Layer1.Group 1.Fill 1.Color",
                "Layer1.st.Color",
                "Layer 2.Fill 1.Color",
            ]
        );
        assert_eq!(
            comp.color_properties[0].base,
            Some(Rgba::new(1.0, 0.0, 0.0, 1.0))
        );
        assert_eq!(comp.color_properties[1].base, None);
        assert_eq!(
            comp.color_properties[2].base,
            Some(Rgba::new(0.0, 0.0, 1.0, 1.0))
        );
    }

    #[test]
    fn rejects_bad_timing() {
        let err = parse_composition(r#"{ "fr": 0, "ip": 0, "op": 10 }"#).unwrap_err();
        assert!(matches!(err, ViewError::Parse { .. }));
        assert!(parse_composition(r#"{ "fr": 30, "ip": 10, "op": 10 }"#).is_err());
    }

    #[test]
    fn rejects_non_documents() {
        assert!(parse_composition("not json").is_err());
        assert!(parse_composition(r#"{ "nm": "missing timing" }"#).is_err());
    }
}
