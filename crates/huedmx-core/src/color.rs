//! Colour conversion from bridge chromaticity to fixture channel values.
//!
//! Everything in this module is pure math. The bridge reports colour as a CIE
//! 1931 `xy` coordinate together with the gamut triangle the bulb can reach;
//! fixtures on the bus want plain 8-bit RGB, RGBW or HSI channels.
//!
//! ## Pipeline
//!
//! 1. Clamp the chromaticity into the gamut triangle (nearest point on the
//!    boundary when outside).
//! 2. `xy` + luminance 1.0 → `XYZ`.
//! 3. `XYZ` → linear RGB (Wide RGB D65 matrix).
//! 4. sRGB companding, negative components clipped to zero.
//! 5. Proportional rescale when any component exceeds 1.0, then scale to bytes.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A point in CIE 1931 `xy` chromaticity space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyPoint {
    pub x: f64,
    pub y: f64,
}

impl XyPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Self) -> f64 {
        let d = self.sub(other);
        d.dot(d).sqrt()
    }
}

/// Triangle of reachable chromaticities for a bulb model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gamut {
    pub red: XyPoint,
    pub green: XyPoint,
    pub blue: XyPoint,
}

impl Gamut {
    /// Hue gamut A (older LivingColors, Bloom, Aura)
    pub const A: Gamut = Gamut::new(
        XyPoint::new(0.704, 0.296),
        XyPoint::new(0.2151, 0.7106),
        XyPoint::new(0.138, 0.08),
    );

    /// Hue gamut B (first generation Hue bulbs)
    pub const B: Gamut = Gamut::new(
        XyPoint::new(0.675, 0.322),
        XyPoint::new(0.409, 0.518),
        XyPoint::new(0.167, 0.04),
    );

    /// Hue gamut C (current Hue colour bulbs)
    pub const C: Gamut = Gamut::new(
        XyPoint::new(0.6915, 0.3083),
        XyPoint::new(0.17, 0.7),
        XyPoint::new(0.1532, 0.0475),
    );

    pub const fn new(red: XyPoint, green: XyPoint, blue: XyPoint) -> Self {
        Self { red, green, blue }
    }

    /// Whether the point lies inside the triangle or on its edges.
    pub fn contains(&self, point: XyPoint) -> bool {
        let v1 = self.green.sub(self.red);
        let v2 = self.blue.sub(self.red);
        let denom = v1.cross(v2);
        if denom == 0.0 {
            return false;
        }

        let q = point.sub(self.red);
        let s = q.cross(v2) / denom;
        let t = v1.cross(q) / denom;

        s >= 0.0 && t >= 0.0 && s + t <= 1.0
    }

    /// Nearest point on the triangle boundary.
    pub fn closest_boundary_point(&self, point: XyPoint) -> XyPoint {
        let edges = [
            (self.red, self.green),
            (self.green, self.blue),
            (self.blue, self.red),
        ];

        let mut best = self.red;
        let mut best_distance = f64::INFINITY;
        for (a, b) in edges {
            let candidate = closest_point_on_segment(a, b, point);
            let distance = candidate.distance(point);
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }
        best
    }

    /// Returns the point itself when reachable, otherwise its projection onto
    /// the boundary. Never extrapolates outside the triangle.
    pub fn clamp(&self, point: XyPoint) -> XyPoint {
        if self.contains(point) {
            point
        } else {
            self.closest_boundary_point(point)
        }
    }
}

fn closest_point_on_segment(a: XyPoint, b: XyPoint, point: XyPoint) -> XyPoint {
    let ab = b.sub(a);
    let length_squared = ab.dot(ab);
    if length_squared == 0.0 {
        return a;
    }
    let t = (point.sub(a).dot(ab) / length_squared).clamp(0.0, 1.0);
    XyPoint::new(a.x + ab.x * t, a.y + ab.y * t)
}

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels multiplied by `factor`, kept as floats so the caller decides
    /// how to quantise.
    pub fn scaled(self, factor: f64) -> [f64; 3] {
        [
            f64::from(self.r) * factor,
            f64::from(self.g) * factor,
            f64::from(self.b) * factor,
        ]
    }
}

/// RGB plus a dedicated white emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgbw {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

/// Hue / saturation / intensity, each scaled to a byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsi {
    pub hue: u8,
    pub saturation: u8,
    pub intensity: u8,
}

/// Converts a chromaticity into RGB, clamped to what the gamut can reproduce.
pub fn xy_to_rgb(gamut: &Gamut, point: XyPoint) -> Rgb {
    let point = gamut.clamp(point);

    // y == 0 only happens for a degenerate gamut touching the x axis
    let y = if point.y.abs() < 1e-11 { 1e-11 } else { point.y };

    let luminance = 1.0;
    let big_x = (luminance / y) * point.x;
    let big_z = (luminance / y) * (1.0 - point.x - y);

    let linear = [
        big_x * 1.656492 - luminance * 0.354851 - big_z * 0.255038,
        -big_x * 0.707196 + luminance * 1.655397 + big_z * 0.036152,
        big_x * 0.051713 - luminance * 0.121364 + big_z * 1.011530,
    ];

    let mut rgb = linear.map(|c| compand(c).max(0.0));

    let max = rgb.iter().copied().fold(0.0_f64, f64::max);
    if max > 1.0 {
        rgb = rgb.map(|c| c / max);
    }

    Rgb::new(
        unit_to_byte(rgb[0]),
        unit_to_byte(rgb[1]),
        unit_to_byte(rgb[2]),
    )
}

/// sRGB transfer function (linear → gamma encoded)
fn compand(linear: f64) -> f64 {
    if linear <= 0.0031308 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

fn unit_to_byte(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn to_byte(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Splits an RGB colour into RGB + white for a fixture whose white LED emits
/// `white_reference` at full power.
///
/// The white level is the largest amount of the reference white that fits
/// under every channel; what is left over goes to the colour LEDs. Both parts
/// are truncated towards zero.
pub fn rgb_to_rgbw(rgb: [f64; 3], white_reference: Rgb) -> Rgbw {
    let reference = [
        f64::from(white_reference.r),
        f64::from(white_reference.g),
        f64::from(white_reference.b),
    ];

    let mut level: Option<f64> = None;
    for (channel, reference) in rgb.iter().zip(reference) {
        if reference <= 0.0 {
            continue;
        }
        let candidate = channel * 255.0 / reference;
        level = Some(level.map_or(candidate, |current: f64| current.min(candidate)));
    }
    let white = level.unwrap_or(0.0).clamp(0.0, 255.0);

    let remaining = |channel: f64, reference: f64| -> u8 {
        (channel - white * reference / 255.0).clamp(0.0, 255.0).trunc() as u8
    };

    Rgbw {
        r: remaining(rgb[0], reference[0]),
        g: remaining(rgb[1], reference[1]),
        b: remaining(rgb[2], reference[2]),
        w: white.trunc() as u8,
    }
}

/// Geometric RGB → HSI.
///
/// Black has no defined saturation or hue; it maps to all zeroes. Greys have
/// no defined hue; it maps to zero.
pub fn rgb_to_hsi(rgb: Rgb) -> Hsi {
    let r = f64::from(rgb.r);
    let g = f64::from(rgb.g);
    let b = f64::from(rgb.b);

    let sum = r + g + b;
    if sum <= 0.0 {
        return Hsi::default();
    }

    let intensity = sum / 3.0;
    let saturation = 1.0 - 3.0 * r.min(g).min(b) / sum;

    let numerator = 0.5 * ((r - g) + (r - b));
    let denominator = ((r - g).powi(2) + (r - b) * (g - b)).sqrt();
    let mut hue = if denominator > 0.0 {
        (numerator / denominator).clamp(-1.0, 1.0).acos()
    } else {
        0.0
    };
    if b > g {
        hue = TAU - hue;
    }

    Hsi {
        hue: to_byte(hue / TAU * 255.0),
        saturation: to_byte(saturation * 255.0),
        intensity: to_byte(intensity),
    }
}

/// Approximate RGB of a black body at a given colour temperature, in 500K
/// steps (Mitchell Charity's table).
const KELVIN_TABLE: [(u32, Rgb); 19] = [
    (1000, Rgb::new(255, 56, 0)),
    (1500, Rgb::new(255, 109, 0)),
    (2000, Rgb::new(255, 137, 18)),
    (2500, Rgb::new(255, 161, 72)),
    (3000, Rgb::new(255, 180, 107)),
    (3500, Rgb::new(255, 196, 137)),
    (4000, Rgb::new(255, 209, 163)),
    (4500, Rgb::new(255, 219, 186)),
    (5000, Rgb::new(255, 228, 206)),
    (5500, Rgb::new(255, 236, 224)),
    (6000, Rgb::new(255, 243, 239)),
    (6500, Rgb::new(255, 249, 253)),
    (7000, Rgb::new(245, 243, 255)),
    (7500, Rgb::new(235, 238, 255)),
    (8000, Rgb::new(227, 233, 255)),
    (8500, Rgb::new(220, 229, 255)),
    (9000, Rgb::new(214, 225, 255)),
    (9500, Rgb::new(208, 222, 255)),
    (10000, Rgb::new(204, 219, 255)),
];

/// RGB of a white LED with the given colour temperature, if tabulated.
pub fn kelvin_to_rgb(kelvin: u32) -> Option<Rgb> {
    KELVIN_TABLE
        .iter()
        .find(|(k, _)| *k == kelvin)
        .map(|(_, rgb)| *rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_vertices_and_centroid() {
        let gamut = Gamut::C;
        assert!(gamut.contains(gamut.red));
        assert!(gamut.contains(gamut.green));
        assert!(gamut.contains(gamut.blue));

        let centroid = XyPoint::new(
            (gamut.red.x + gamut.green.x + gamut.blue.x) / 3.0,
            (gamut.red.y + gamut.green.y + gamut.blue.y) / 3.0,
        );
        assert!(gamut.contains(centroid));
        assert!(!gamut.contains(XyPoint::new(0.9, 0.9)));
    }

    #[test]
    fn test_clamp_projects_onto_red_green_edge() {
        let gamut = Gamut::new(
            XyPoint::new(1.0, 0.0),
            XyPoint::new(0.0, 1.0),
            XyPoint::new(0.0, 0.0),
        );
        let clamped = gamut.clamp(XyPoint::new(1.0, 1.0));
        assert!((clamped.x - 0.5).abs() < 1e-12);
        assert!((clamped.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_beyond_vertex_snaps_to_vertex() {
        let gamut = Gamut::C;
        let clamped = gamut.clamp(XyPoint::new(0.9, 0.2));
        assert!(clamped.distance(gamut.red) < 1e-3);
    }

    #[test]
    fn test_white_point_is_near_white() {
        let rgb = xy_to_rgb(&Gamut::C, XyPoint::new(0.3127, 0.3290));
        assert!(rgb.r >= 240 && rgb.g >= 240 && rgb.b >= 240, "{:?}", rgb);
    }

    #[test]
    fn test_red_corner_is_red() {
        let rgb = xy_to_rgb(&Gamut::C, Gamut::C.red);
        assert_eq!(rgb.r, 255);
        assert_eq!(rgb.b, 0);
        assert!(rgb.g < 60, "{:?}", rgb);
    }

    #[test]
    fn test_out_of_gamut_matches_projection() {
        let outside = XyPoint::new(0.8, 0.25);
        let projected = Gamut::C.closest_boundary_point(outside);
        assert_eq!(
            xy_to_rgb(&Gamut::C, outside),
            xy_to_rgb(&Gamut::C, projected)
        );
    }

    #[test]
    fn test_rgbw_pure_reference_white() {
        let white = kelvin_to_rgb(5000).unwrap();
        let rgbw = rgb_to_rgbw(white.scaled(1.0), white);
        assert_eq!(rgbw, Rgbw { r: 0, g: 0, b: 0, w: 255 });
    }

    #[test]
    fn test_rgbw_saturated_colour_has_no_white() {
        let white = kelvin_to_rgb(5000).unwrap();
        let rgbw = rgb_to_rgbw([255.0, 0.0, 0.0], white);
        assert_eq!(rgbw, Rgbw { r: 255, g: 0, b: 0, w: 0 });
    }

    #[test]
    fn test_rgbw_mixed() {
        // Half of the 5000K white plus extra red
        let rgbw = rgb_to_rgbw([200.0, 114.0, 103.0], Rgb::new(255, 228, 206));
        assert_eq!(rgbw.w, 127);
        assert_eq!(rgbw.g, 0);
        assert_eq!(rgbw.b, 0);
        assert_eq!(rgbw.r, 72);
    }

    #[test]
    fn test_hsi_black_has_zero_saturation() {
        assert_eq!(rgb_to_hsi(Rgb::new(0, 0, 0)), Hsi::default());
    }

    #[test]
    fn test_hsi_primaries() {
        let red = rgb_to_hsi(Rgb::new(255, 0, 0));
        assert_eq!(red, Hsi { hue: 0, saturation: 255, intensity: 85 });

        let green = rgb_to_hsi(Rgb::new(0, 255, 0));
        assert_eq!(green.hue, 85);

        let blue = rgb_to_hsi(Rgb::new(0, 0, 255));
        assert_eq!(blue.hue, 170);
    }

    #[test]
    fn test_hsi_grey_has_no_hue() {
        let grey = rgb_to_hsi(Rgb::new(100, 100, 100));
        assert_eq!(grey, Hsi { hue: 0, saturation: 0, intensity: 100 });
    }

    #[test]
    fn test_kelvin_lookup() {
        assert_eq!(kelvin_to_rgb(5000), Some(Rgb::new(255, 228, 206)));
        assert_eq!(kelvin_to_rgb(5001), None);
    }
}
