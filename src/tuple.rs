use std::ops::{ Add, Sub, Neg, Mul, Div };

use crate::feq;
use crate::consts::EPSILON;
use crate::error::{ Result, TracerError };

/// A homogeneous 4D tuple.
///
/// The `w` component is a tag rather than a coordinate: `w == 1.0` marks a
/// point (a position in space), `w == 0.0` marks a vector (a direction). The
/// arithmetic operators keep the tag consistent as long as they are used
/// sensibly; point minus point is a vector, point plus vector is a point.
/// Adding two points produces `w == 2.0`, which is a programming error and is
/// never checked at runtime.
///
/// Equality is approximate. See `FEQ_EPSILON`.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple4D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64
}

impl PartialEq for Tuple4D {
    fn eq(&self, other: &Tuple4D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z) &&
            feq(self.w, other.w)
    }
}

impl Tuple4D {
    pub fn tuple(x: f64, y: f64, z: f64, w: f64) -> Tuple4D {
        Tuple4D { x, y, z, w }
    }

    pub fn point(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 1.0 }
    }

    pub fn vector(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 0.0 }
    }

    pub fn origin() -> Tuple4D {
        Tuple4D::point(0.0, 0.0, 0.0)
    }

    pub fn is_point(&self) -> bool {
        (self.w - 1.0).abs() < EPSILON
    }

    pub fn is_vector(&self) -> bool {
        self.w.abs() < EPSILON
    }

    /// Returns this tuple if it is a point, or `TracerError::NotAPoint`.
    ///
    /// Used at configuration boundaries (light positions, camera views) where
    /// a wrongly tagged tuple would silently corrupt every later computation.
    pub fn expect_point(self) -> Result<Tuple4D> {
        if self.is_point() {
            Ok(self)
        } else {
            Err(TracerError::NotAPoint(self.w))
        }
    }

    /// Returns this tuple if it is a vector, or `TracerError::NotAVector`.
    pub fn expect_vector(self) -> Result<Tuple4D> {
        if self.is_vector() {
            Ok(self)
        } else {
            Err(TracerError::NotAVector(self.w))
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scales a tuple to unit length.
    ///
    /// Normalizing a zero-length tuple divides by zero and yields NaN
    /// components. Callers working with possibly degenerate geometry should
    /// use `try_normalize` instead.
    pub fn normalize(&self) -> Tuple4D {
        *self / self.magnitude()
    }

    /// Scales a tuple to unit length, or returns `None` for a zero tuple.
    pub fn try_normalize(&self) -> Option<Tuple4D> {
        let mag = self.magnitude();
        if mag < EPSILON {
            None
        } else {
            Some(*self / mag)
        }
    }

    pub fn dot(&self, other: &Tuple4D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
            + self.w * other.w
    }

    /// Computes the cross product of two vectors.
    ///
    /// The cross product is only meaningful for vectors; the `w` component of
    /// the result is always `0.0`.
    pub fn cross(&self, other: &Tuple4D) -> Tuple4D {
        debug_assert!(self.is_vector() && other.is_vector(),
            "cross product is only defined for vectors");

        Tuple4D::vector(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Reflects a vector across a normal.
    pub fn reflect(&self, normal: &Tuple4D) -> Tuple4D {
        *self - (*normal * 2.0 * self.dot(normal))
    }
}

impl Add for Tuple4D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Tuple4D::tuple(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl Sub for Tuple4D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Tuple4D::tuple(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        )
    }
}

impl Neg for Tuple4D {
    type Output = Self;

    fn neg(self) -> Self {
        Tuple4D::tuple(-self.x, -self.y, -self.z, -self.w)
    }
}

/// Scalar right-multiplication.
///
/// ```
/// use whitted_tracer::tuple::Tuple4D;
///
/// let v = Tuple4D::vector(1.0, -2.0, 3.0);
/// assert_eq!(v * 2.0, Tuple4D::vector(2.0, -4.0, 6.0));
/// ```
impl Mul<f64> for Tuple4D {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Tuple4D::tuple(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

/// Scalar left-multiplication.
impl Mul<Tuple4D> for f64 {
    type Output = Tuple4D;

    fn mul(self, t: Tuple4D) -> Tuple4D {
        t * self
    }
}

impl Div<f64> for Tuple4D {
    type Output = Self;

    fn div(self, s: f64) -> Self {
        Tuple4D::tuple(self.x / s, self.y / s, self.z / s, self.w / s)
    }
}

/* Tests */

#[test]
fn point_and_vector_tags() {
    let p = Tuple4D::point(4.3, -4.2, 3.1);
    let v = Tuple4D::vector(4.3, -4.2, 3.1);

    assert!(p.is_point() && !p.is_vector());
    assert!(v.is_vector() && !v.is_point());
}

#[test]
fn point_plus_vector_is_point() {
    let p = Tuple4D::point(3.0, -2.0, 5.0);
    let v = Tuple4D::vector(-2.0, 3.0, 1.0);

    assert_eq!(p + v, Tuple4D::point(1.0, 1.0, 6.0));
}

#[test]
fn point_minus_point_is_vector() {
    let p1 = Tuple4D::point(3.0, 2.0, 1.0);
    let p2 = Tuple4D::point(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Tuple4D::vector(-2.0, -4.0, -6.0));
}

#[test]
fn point_minus_vector_is_point() {
    let p = Tuple4D::point(3.0, 2.0, 1.0);
    let v = Tuple4D::vector(5.0, 6.0, 7.0);

    assert_eq!(p - v, Tuple4D::point(-2.0, -4.0, -6.0));
}

#[test]
fn negate_and_scale() {
    let a = Tuple4D::tuple(1.0, -2.0, 3.0, -4.0);

    assert_eq!(-a, Tuple4D::tuple(-1.0, 2.0, -3.0, 4.0));
    assert_eq!(a * 0.5, Tuple4D::tuple(0.5, -1.0, 1.5, -2.0));
    assert_eq!(a / 2.0, Tuple4D::tuple(0.5, -1.0, 1.5, -2.0));
    assert_eq!(3.5 * a, Tuple4D::tuple(3.5, -7.0, 10.5, -14.0));
}

#[test]
fn magnitude_and_normalize() {
    let v = Tuple4D::vector(-1.0, -2.0, -3.0);
    assert_eq!(v.magnitude(), 14.0f64.sqrt());

    let n = Tuple4D::vector(1.0, 2.0, 3.0).normalize();
    let s = 14.0f64.sqrt();
    assert_eq!(n, Tuple4D::vector(1.0 / s, 2.0 / s, 3.0 / s));
    assert!((n.magnitude() - 1.0).abs() < 1e-12);
}

#[test]
fn try_normalize_rejects_zero_vector() {
    assert!(Tuple4D::vector(0.0, 0.0, 0.0).try_normalize().is_none());
    assert_eq!(Tuple4D::vector(4.0, 0.0, 0.0).try_normalize(),
        Some(Tuple4D::vector(1.0, 0.0, 0.0)));
}

#[test]
fn dot_and_cross() {
    let a = Tuple4D::vector(1.0, 2.0, 3.0);
    let b = Tuple4D::vector(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
    assert_eq!(a.cross(&b), Tuple4D::vector(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Tuple4D::vector(1.0, -2.0, 1.0));
}

#[test]
fn reflect_off_slanted_surface() {
    let v = Tuple4D::vector(0.0, -1.0, 0.0);
    let h = 2.0f64.sqrt() / 2.0;
    let n = Tuple4D::vector(h, h, 0.0);

    assert_eq!(v.reflect(&n), Tuple4D::vector(1.0, 0.0, 0.0));
}

#[test]
fn expect_tag_mismatch_is_error() {
    assert!(Tuple4D::vector(1.0, 0.0, 0.0).expect_point().is_err());
    assert!(Tuple4D::point(1.0, 0.0, 0.0).expect_vector().is_err());
    assert!(Tuple4D::point(1.0, 0.0, 0.0).expect_point().is_ok());
}
