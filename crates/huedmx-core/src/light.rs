//! Logical light state as reported by the bridge.

use crate::color::{Gamut, XyPoint};
use serde::{Deserialize, Serialize};

/// Last known state of one bridge light.
///
/// Values are replaced wholesale: callers build a new state through
/// [`LightState::merged`] rather than mutating fields in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub on: bool,
    /// Bridge brightness percentage, 0.0 - 100.0
    pub brightness: f64,
    pub chromaticity: Option<XyPoint>,
    /// `None` when the bulb reports no usable gamut
    pub gamut: Option<Gamut>,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            on: false,
            brightness: 0.0,
            chromaticity: None,
            gamut: None,
        }
    }
}

/// What the bridge said about a gamut in one report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GamutReport {
    Known(Gamut),
    /// `gamut_type == "other"`: the bulb has no usable triangle
    Unusable,
}

/// Partial light update; absent fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightUpdate {
    pub on: Option<bool>,
    pub brightness: Option<f64>,
    pub chromaticity: Option<XyPoint>,
    pub gamut: Option<GamutReport>,
}

impl LightUpdate {
    pub fn is_empty(&self) -> bool {
        self.on.is_none()
            && self.brightness.is_none()
            && self.chromaticity.is_none()
            && self.gamut.is_none()
    }
}

impl LightState {
    /// New state with every field present in `update` overwritten.
    pub fn merged(&self, update: &LightUpdate) -> LightState {
        LightState {
            on: update.on.unwrap_or(self.on),
            brightness: update
                .brightness
                .map(|b| if b.is_nan() { 0.0 } else { b.clamp(0.0, 100.0) })
                .unwrap_or(self.brightness),
            chromaticity: update.chromaticity.or(self.chromaticity),
            gamut: match update.gamut {
                Some(GamutReport::Known(gamut)) => Some(gamut),
                Some(GamutReport::Unusable) => None,
                None => self.gamut,
            },
        }
    }

    /// Brightness as a 0.0 - 1.0 factor
    pub fn dim_factor(&self) -> f64 {
        (self.brightness / 100.0).clamp(0.0, 1.0)
    }
}
