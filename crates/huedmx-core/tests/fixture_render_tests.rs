//! tests/fixture_render_tests.rs
use huedmx_core::color::kelvin_to_rgb;
use huedmx_core::fixture::RGBW_SPOT_WHITE_KELVIN;
use huedmx_core::{
    Fixture, FixtureKind, Gamut, GamutReport, LightState, LightUpdate, RenderError, XyPoint,
};

#[test]
fn test_dimmer_at_80_percent() {
    let fixture = Fixture::new("Buddha", "light-1", 1, FixtureKind::Dimmer);
    let state = LightState::default().merged(&LightUpdate {
        on: Some(true),
        brightness: Some(80.0),
        ..Default::default()
    });
    assert_eq!(fixture.render(&state).unwrap().as_bytes(), &[204]);
}

#[test]
fn test_dimmer_off_at_any_brightness() {
    let fixture = Fixture::new("Buddha", "light-1", 1, FixtureKind::Dimmer);
    for brightness in [0.0, 0.4, 50.0, 80.0, 100.0] {
        let state = LightState {
            on: false,
            brightness,
            ..Default::default()
        };
        assert_eq!(fixture.render(&state).unwrap().as_bytes(), &[0]);
    }
}

#[test]
fn test_rgbw_spot_with_unusable_gamut_fails() {
    let fixture = Fixture::new("Saber", "light-2", 2, FixtureKind::RgbwSpot);
    let previous = LightState {
        on: true,
        brightness: 60.0,
        chromaticity: Some(XyPoint::new(0.4, 0.4)),
        gamut: Some(Gamut::C),
    };
    let state = previous.merged(&LightUpdate {
        gamut: Some(GamutReport::Unusable),
        ..Default::default()
    });

    let err = fixture.render(&state).unwrap_err();
    assert_eq!(
        err,
        RenderError::MissingGamut {
            fixture: "Saber".to_string(),
            light_id: "light-2".to_string(),
        }
    );
}

#[test]
fn test_rgbw_spot_off_needs_no_gamut() {
    let fixture = Fixture::new("Saber", "light-2", 2, FixtureKind::RgbwSpot);
    let state = LightState::default();
    assert_eq!(fixture.render(&state).unwrap().as_bytes(), &[0, 0, 0, 0]);
}

#[test]
fn test_rgbw_spot_white_led_matches_kelvin_table() {
    assert_eq!(
        FixtureKind::RgbwSpot.white_reference(),
        kelvin_to_rgb(RGBW_SPOT_WHITE_KELVIN)
    );
    assert_eq!(FixtureKind::Dimmer.white_reference(), None);
}

#[test]
fn test_frame_width_matches_kind() {
    let state = LightState {
        on: true,
        brightness: 100.0,
        chromaticity: Some(XyPoint::new(0.5, 0.4)),
        gamut: Some(Gamut::B),
    };
    for kind in [FixtureKind::Dimmer, FixtureKind::RgbwSpot, FixtureKind::HsiSpot] {
        let fixture = Fixture::new("F", "l", 1, kind);
        assert_eq!(fixture.render(&state).unwrap().len(), kind.channel_count());
    }
}
