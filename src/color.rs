use std::ops::{ Add, Sub, Mul };

use serde::{ Deserialize, Serialize };

use crate::feq;

/// A linear RGB color.
///
/// Components are conceptually unbounded: lighting sums can exceed `1.0`, and
/// clamping happens only when a color is encoded for output.
///
/// # Examples
///
/// ```
/// # use whitted_tracer::color::Color;
/// let lit = Color::rgb(0.8, 1.0, 0.6) * Color::rgb(0.5, 0.5, 0.5);
/// assert_eq!(lit, Color::rgb(0.4, 0.5, 0.3));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Component-wise approximate equality.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

/// Conversion from a slice of components.
///
/// Missing trailing components default to `0.0`; extra ones are ignored.
impl From<&[f64]> for Color {
    fn from(v: &[f64]) -> Color {
        match *v {
            [] => Default::default(),
            [r] => Color { r, ..Default::default() },
            [r, g] => Color { r, g, ..Default::default() },
            [r, g, b, ..] => Color { r, g, b },
        }
    }
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// Builds a linear color from sRGB-encoded components.
    ///
    /// Scene authors usually pick colors in sRGB; shading math expects linear
    /// light.
    pub fn from_srgb(r: f64, g: f64, b: f64) -> Color {
        fn decode(c: f64) -> f64 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        Color::rgb(decode(r), decode(g), decode(b))
    }

    pub fn black() -> Color {
        Color::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    pub fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    pub fn green() -> Color {
        Color::rgb(0.0, 1.0, 0.0)
    }

    pub fn blue() -> Color {
        Color::rgb(0.0, 0.0, 1.0)
    }

    /// Computes the Hadamard (component-wise) product of two colors.
    ///
    /// `c1 * c2` is shorthand for this.
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color::rgb(c1.r * c2.r, c1.g * c2.g, c1.b * c2.b)
    }

    /// Linearly interpolates from `self` (at `t == 0`) to `other` (at `t == 1`).
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        *self + (*other - *self) * t
    }

    /// Clamps every component to `[0, 1]`.
    pub fn clamp(&self) -> Color {
        Color::rgb(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }
}

impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Color {
        Color::rgb(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Color {
        Color::rgb(self.r - other.r, self.g - other.g, self.b - other.b)
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, s: f64) -> Color {
        Color::rgb(self.r * s, self.g * s, self.b * s)
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, c: Color) -> Color {
        c * self
    }
}

impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Color {
        Color::hadamard(&self, &other)
    }
}

impl std::iter::Sum for Color {
    fn sum<I: Iterator<Item = Color>>(iter: I) -> Color {
        iter.fold(Color::black(), |acc, c| acc + c)
    }
}

#[test]
fn add_and_subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color { r: 1.6, g: 0.7, b: 1.0 });
    assert_eq!(c1 - c2, Color { r: 0.2, g: 0.5, b: 0.5 });
}

#[test]
fn scale_and_multiply_colors() {
    let c = Color::rgb(0.2, 0.3, 0.4);
    assert_eq!(c * 2.0, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(2.0 * c, Color::rgb(0.4, 0.6, 0.8));

    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);
    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn lerp_between_colors() {
    let a = Color::white();
    let b = Color::black();

    assert_eq!(a.lerp(&b, 0.0), a);
    assert_eq!(a.lerp(&b, 0.25), Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(a.lerp(&b, 1.0), b);
}

#[test]
fn srgb_decoding() {
    assert_eq!(Color::from_srgb(0.0, 1.0, 0.5),
        Color::rgb(0.0, 1.0, 0.21404));
    assert_eq!(Color::from_srgb(0.04, 0.04, 0.04),
        Color::rgb(0.04 / 12.92, 0.04 / 12.92, 0.04 / 12.92));
}

#[test]
fn color_from_slice() {
    assert_eq!(Color::from(&[0.5][..]), Color::rgb(0.5, 0.0, 0.0));
    assert_eq!(Color::from(&[0.1, 0.2, 0.3, 0.4][..]),
        Color::rgb(0.1, 0.2, 0.3));
}

#[test]
fn sum_of_colors() {
    let total: Color = vec![Color::red(), Color::green(), Color::blue()]
        .into_iter()
        .sum();

    assert_eq!(total, Color::white());
}
