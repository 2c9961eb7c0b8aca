//! CLIP v2 resource shapes as returned by the bridge
use huedmx_core::{Gamut, GamutReport, LightUpdate, XyPoint};
use serde::{Deserialize, Serialize};

/// Gamut type the bridge uses for lights without a usable triangle
pub const UNUSABLE_GAMUT_TYPE: &str = "other";

/// Envelope around every v2 response
#[derive(Deserialize, Debug)]
pub struct V2Response<T> {
    #[serde(default)]
    pub errors: Vec<V2Error>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct V2Error {
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Xy {
    pub x: f64,
    pub y: f64,
}

impl From<Xy> for XyPoint {
    fn from(xy: Xy) -> Self {
        XyPoint::new(xy.x, xy.y)
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GamutTriangle {
    pub red: Xy,
    pub green: Xy,
    pub blue: Xy,
}

impl From<GamutTriangle> for Gamut {
    fn from(t: GamutTriangle) -> Self {
        Gamut {
            red: t.red.into(),
            green: t.green.into(),
            blue: t.blue.into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct OnState {
    pub on: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Dimming {
    pub brightness: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ColorState {
    pub xy: Option<Xy>,
    pub gamut: Option<GamutTriangle>,
    pub gamut_type: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    pub function: Option<String>,
}

/// A `light` resource
#[derive(Deserialize, Debug, Clone)]
pub struct Light {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub on: Option<OnState>,
    pub dimming: Option<Dimming>,
    pub color: Option<ColorState>,
}

impl Light {
    /// Fields present in this resource as a partial update
    pub fn to_update(&self) -> LightUpdate {
        let color = self.color.as_ref();
        let gamut = color.and_then(|c| {
            if c.gamut_type.as_deref() == Some(UNUSABLE_GAMUT_TYPE) {
                Some(GamutReport::Unusable)
            } else {
                c.gamut.map(|g| GamutReport::Known(g.into()))
            }
        });

        LightUpdate {
            on: self.on.as_ref().map(|o| o.on),
            brightness: self.dimming.as_ref().map(|d| d.brightness),
            chromaticity: color.and_then(|c| c.xy).map(XyPoint::from),
            gamut,
        }
    }
}

/// A `device` resource, only the parts used for listings
#[derive(Deserialize, Debug, Clone)]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Body of the metadata PUT used as a keep-alive
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MetadataUpdate<'a> {
    pub metadata: FunctionUpdate<'a>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FunctionUpdate<'a> {
    pub function: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_color_light() {
        let json = json!({
            "errors": [],
            "data": [{
                "id": "4ee3b9d4-2e0b-4cd2-9bd3-8ab2a4e4c1a7",
                "type": "light",
                "metadata": {"name": "Saber", "archetype": "spot_bulb", "function": "mixed"},
                "on": {"on": true},
                "dimming": {"brightness": 42.5, "min_dim_level": 0.2},
                "color": {
                    "xy": {"x": 0.4573, "y": 0.41},
                    "gamut": {
                        "red": {"x": 0.6915, "y": 0.3083},
                        "green": {"x": 0.17, "y": 0.7},
                        "blue": {"x": 0.1532, "y": 0.0475}
                    },
                    "gamut_type": "C"
                }
            }]
        });

        let response: V2Response<Light> = serde_json::from_value(json).unwrap();
        assert!(response.errors.is_empty());
        let light = &response.data[0];
        assert_eq!(light.metadata.name, "Saber");
        assert_eq!(light.metadata.function.as_deref(), Some("mixed"));

        let update = light.to_update();
        assert_eq!(update.on, Some(true));
        assert_eq!(update.brightness, Some(42.5));
        assert_eq!(update.chromaticity, Some(XyPoint::new(0.4573, 0.41)));
        assert_eq!(update.gamut, Some(GamutReport::Known(Gamut::C)));
    }

    #[test]
    fn test_gamut_type_other_is_unusable() {
        let json = json!({
            "id": "l1",
            "color": {"xy": {"x": 0.3, "y": 0.3}, "gamut_type": "other"}
        });
        let light: Light = serde_json::from_value(json).unwrap();
        assert_eq!(light.to_update().gamut, Some(GamutReport::Unusable));
    }

    #[test]
    fn test_white_only_light_has_no_color_fields() {
        let json = json!({
            "id": "l2",
            "on": {"on": false},
            "dimming": {"brightness": 100.0}
        });
        let light: Light = serde_json::from_value(json).unwrap();
        let update = light.to_update();
        assert_eq!(update.on, Some(false));
        assert!(update.chromaticity.is_none());
        assert!(update.gamut.is_none());
    }

    #[test]
    fn test_metadata_update_body() {
        let body = MetadataUpdate {
            metadata: FunctionUpdate { function: "mixed" },
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"metadata": {"function": "mixed"}})
        );
    }
}
