//! DMX fixtures and their renderers
//!
//! A fixture is a device on the bus at a fixed start address that mirrors one
//! bridge light. Each [`FixtureKind`] knows its channel layout and how to turn a
//! [`LightState`] into a [`Frame`] for that layout.

use crate::color::{self, Rgb};
use crate::error::RenderError;
use crate::light::LightState;
use serde::{Deserialize, Serialize};

/// Colour temperature of the white LED in RGBW spots
pub const RGBW_SPOT_WHITE_KELVIN: u32 = 5000;

/// Supported fixture models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    /// Single channel dimmer (e.g. warm white pin spot)
    Dimmer,
    /// Red, green, blue, white spot with a 5000K white LED
    RgbwSpot,
    /// Hue, saturation, intensity spot
    HsiSpot,
}

impl FixtureKind {
    /// Number of consecutive DMX channels the model occupies
    pub fn channel_count(&self) -> usize {
        match self {
            FixtureKind::Dimmer => 1,
            FixtureKind::RgbwSpot => 4,
            FixtureKind::HsiSpot => 3,
        }
    }

    /// Whether rendering needs chromaticity and gamut
    pub fn is_color(&self) -> bool {
        !matches!(self, FixtureKind::Dimmer)
    }

    /// Colour temperature of the model's white LED, if it has one
    pub fn white_kelvin(&self) -> Option<u32> {
        match self {
            FixtureKind::RgbwSpot => Some(RGBW_SPOT_WHITE_KELVIN),
            FixtureKind::Dimmer | FixtureKind::HsiSpot => None,
        }
    }

    /// RGB emitted by the model's white LED at full power
    pub fn white_reference(&self) -> Option<Rgb> {
        self.white_kelvin().and_then(color::kelvin_to_rgb)
    }
}

/// Channel values for one fixture, freshly produced on every render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Vec<u8>);

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// A fixture instance patched at a starting DMX address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    name: String,
    light_id: String,
    address: u16, // 1-512
    kind: FixtureKind,
}

impl Fixture {
    pub fn new(
        name: impl Into<String>,
        light_id: impl Into<String>,
        address: u16,
        kind: FixtureKind,
    ) -> Self {
        Self {
            name: name.into(),
            light_id: light_id.into(),
            address,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn light_id(&self) -> &str {
        &self.light_id
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn kind(&self) -> FixtureKind {
        self.kind
    }

    pub fn channel_count(&self) -> usize {
        self.kind.channel_count()
    }

    /// Last address occupied by this fixture
    pub fn end_address(&self) -> u16 {
        self.address + self.channel_count() as u16 - 1
    }

    /// Whether two fixtures share at least one channel
    pub fn overlaps(&self, other: &Fixture) -> bool {
        self.address <= other.end_address() && other.address <= self.end_address()
    }

    /// Render the channel values for `state`.
    ///
    /// Pure: the same state always yields the same frame.
    pub fn render(&self, state: &LightState) -> Result<Frame, RenderError> {
        let bytes = match self.kind {
            FixtureKind::Dimmer => render_dimmer(state),
            FixtureKind::RgbwSpot => self.render_rgbw(state)?,
            FixtureKind::HsiSpot => self.render_hsi(state)?,
        };
        debug_assert_eq!(bytes.len(), self.channel_count());
        Ok(Frame(bytes))
    }

    fn render_rgbw(&self, state: &LightState) -> Result<Vec<u8>, RenderError> {
        if !state.on {
            return Ok(vec![0; 4]);
        }
        let rgb = self.full_color(state)?;
        let white = self
            .kind
            .white_reference()
            .ok_or_else(|| RenderError::UntabulatedWhite {
                fixture: self.name.clone(),
                kelvin: self.kind.white_kelvin().unwrap_or_default(),
            })?;
        let rgbw = color::rgb_to_rgbw(rgb.scaled(state.dim_factor()), white);
        Ok(vec![rgbw.r, rgbw.g, rgbw.b, rgbw.w])
    }

    fn render_hsi(&self, state: &LightState) -> Result<Vec<u8>, RenderError> {
        if !state.on {
            return Ok(vec![0; 3]);
        }
        let [r, g, b] = self
            .full_color(state)?
            .scaled(state.dim_factor())
            .map(|c| c.round().clamp(0.0, 255.0) as u8);
        let hsi = color::rgb_to_hsi(Rgb::new(r, g, b));
        Ok(vec![hsi.hue, hsi.saturation, hsi.intensity])
    }

    /// Undimmed RGB of the light's chromaticity within its gamut
    fn full_color(&self, state: &LightState) -> Result<Rgb, RenderError> {
        let gamut = state.gamut.ok_or_else(|| RenderError::MissingGamut {
            fixture: self.name.clone(),
            light_id: self.light_id.clone(),
        })?;
        let point = state.chromaticity.ok_or_else(|| RenderError::MissingColor {
            fixture: self.name.clone(),
            light_id: self.light_id.clone(),
        })?;
        Ok(color::xy_to_rgb(&gamut, point))
    }
}

fn render_dimmer(state: &LightState) -> Vec<u8> {
    if !state.on {
        return vec![0];
    }
    vec![(state.dim_factor() * 255.0).round().clamp(0.0, 255.0) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Gamut, XyPoint};

    fn colored(on: bool, brightness: f64) -> LightState {
        LightState {
            on,
            brightness,
            chromaticity: Some(XyPoint::new(0.3127, 0.3290)),
            gamut: Some(Gamut::C),
        }
    }

    #[test]
    fn test_channel_counts() {
        assert_eq!(FixtureKind::Dimmer.channel_count(), 1);
        assert_eq!(FixtureKind::RgbwSpot.channel_count(), 4);
        assert_eq!(FixtureKind::HsiSpot.channel_count(), 3);
    }

    #[test]
    fn test_fixture_addressing() {
        let fixture = Fixture::new("Spot", "light-1", 10, FixtureKind::RgbwSpot);
        assert_eq!(fixture.address(), 10);
        assert_eq!(fixture.end_address(), 13);
    }

    #[test]
    fn test_overlap() {
        let a = Fixture::new("A", "l1", 1, FixtureKind::RgbwSpot);
        let b = Fixture::new("B", "l2", 4, FixtureKind::Dimmer);
        let c = Fixture::new("C", "l3", 5, FixtureKind::Dimmer);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_dimmer_full_and_half() {
        let fixture = Fixture::new("Dim", "l1", 1, FixtureKind::Dimmer);
        let full = LightState {
            on: true,
            brightness: 100.0,
            ..Default::default()
        };
        assert_eq!(fixture.render(&full).unwrap().as_bytes(), &[255]);

        let half = LightState {
            on: true,
            brightness: 50.0,
            ..Default::default()
        };
        assert_eq!(fixture.render(&half).unwrap().as_bytes(), &[128]);
    }

    #[test]
    fn test_white_reference_comes_from_kelvin_table() {
        assert_eq!(FixtureKind::RgbwSpot.white_kelvin(), Some(5000));
        assert_eq!(
            FixtureKind::RgbwSpot.white_reference(),
            Some(Rgb::new(255, 228, 206))
        );
        assert_eq!(FixtureKind::HsiSpot.white_kelvin(), None);
        assert_eq!(FixtureKind::HsiSpot.white_reference(), None);
    }

    #[test]
    fn test_rgbw_off_is_black() {
        let fixture = Fixture::new("Spot", "l1", 1, FixtureKind::RgbwSpot);
        let frame = fixture.render(&colored(false, 100.0)).unwrap();
        assert_eq!(frame.as_bytes(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_rgbw_white_uses_white_led() {
        let fixture = Fixture::new("Spot", "l1", 1, FixtureKind::RgbwSpot);
        let frame = fixture.render(&colored(true, 100.0)).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(bytes.len(), 4);
        assert!(bytes[3] > 200, "{:?}", bytes);
    }

    #[test]
    fn test_rgbw_dimming_scales_output() {
        let fixture = Fixture::new("Spot", "l1", 1, FixtureKind::RgbwSpot);
        let bright = fixture.render(&colored(true, 100.0)).unwrap();
        let dim = fixture.render(&colored(true, 25.0)).unwrap();
        assert!(dim.as_bytes()[3] < bright.as_bytes()[3]);
    }

    #[test]
    fn test_rgbw_without_color_errors() {
        let fixture = Fixture::new("Spot", "l1", 1, FixtureKind::RgbwSpot);
        let state = LightState {
            on: true,
            brightness: 50.0,
            chromaticity: None,
            gamut: Some(Gamut::C),
        };
        assert!(matches!(
            fixture.render(&state),
            Err(RenderError::MissingColor { .. })
        ));
    }

    #[test]
    fn test_hsi_spot_red() {
        let fixture = Fixture::new("Hsi", "l1", 1, FixtureKind::HsiSpot);
        let state = LightState {
            on: true,
            brightness: 100.0,
            chromaticity: Some(Gamut::C.red),
            gamut: Some(Gamut::C),
        };
        let frame = fixture.render(&state).unwrap();
        assert_eq!(frame.len(), 3);
        // Hue wraps around red
        let hue = frame.as_bytes()[0];
        assert!(hue < 20 || hue > 235, "{}", hue);
    }

    #[test]
    fn test_render_is_deterministic() {
        let fixture = Fixture::new("Spot", "l1", 1, FixtureKind::RgbwSpot);
        let state = colored(true, 63.0);
        assert_eq!(fixture.render(&state), fixture.render(&state));
    }
}
