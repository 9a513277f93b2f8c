use std::fmt;
use std::ops::{ Index, IndexMut, Mul };

use crate::feq;
use crate::tuple::Tuple4D;

/// A 4x4 row-major matrix.
///
/// Matrices act on column tuples from the left, so a chain of transforms
/// written `C * B * A` applies `A` first, then `B`, then `C`:
///
/// ```
/// # use whitted_tracer::tuple::Tuple4D;
/// # use whitted_tracer::matrix::Matrix4D;
/// let rotate = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
/// let scale = Matrix4D::scaling(5.0, 5.0, 5.0);
/// let translate = Matrix4D::translation(10.0, 5.0, 7.0);
///
/// let t = translate * scale * rotate;
/// assert_eq!(t * Tuple4D::point(1.0, 0.0, 1.0),
///     Tuple4D::point(15.0, 0.0, 7.0));
/// ```
///
/// Equality is element-wise and approximate.
#[derive(Copy, Clone, Debug, PartialOrd)]
pub struct Matrix4D {
    data: [f64; 16],
}

impl Default for Matrix4D {
    fn default() -> Matrix4D {
        Matrix4D::identity()
    }
}

impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix4D {
    /// Creates a matrix with all elements set to `0.0`.
    pub fn zero() -> Matrix4D {
        Matrix4D { data: [0.0; 16] }
    }

    pub fn identity() -> Matrix4D {
        let mut m = Self::zero();
        for i in 0..4 {
            m[(i, i)] = 1.0;
        }

        m
    }

    /// Offsets points by `x`, `y` and `z`. Vectors are unaffected.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 3)] = x;
        m[(1, 3)] = y;
        m[(2, 3)] = z;

        m
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 0)] = x;
        m[(1, 1)] = y;
        m[(2, 2)] = z;

        m
    }

    /// Rotates by `r` radians about the X axis.
    pub fn rotation_x(r: f64) -> Matrix4D {
        let (sin, cos) = r.sin_cos();
        let mut m = Self::identity();
        m[(1, 1)] = cos;
        m[(1, 2)] = -sin;
        m[(2, 1)] = sin;
        m[(2, 2)] = cos;

        m
    }

    /// Rotates by `r` radians about the Y axis.
    pub fn rotation_y(r: f64) -> Matrix4D {
        let (sin, cos) = r.sin_cos();
        let mut m = Self::identity();
        m[(0, 0)] = cos;
        m[(0, 2)] = sin;
        m[(2, 0)] = -sin;
        m[(2, 2)] = cos;

        m
    }

    /// Rotates by `r` radians about the Z axis.
    pub fn rotation_z(r: f64) -> Matrix4D {
        let (sin, cos) = r.sin_cos();
        let mut m = Self::identity();
        m[(0, 0)] = cos;
        m[(0, 1)] = -sin;
        m[(1, 0)] = sin;
        m[(1, 1)] = cos;

        m
    }

    /// Shears each axis in proportion to the other two.
    ///
    /// Parameter `xy` moves `x` in proportion to `y`, `xz` moves `x` in
    /// proportion to `z`, and so on.
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 1)] = xy;
        m[(0, 2)] = xz;
        m[(1, 0)] = yx;
        m[(1, 2)] = yz;
        m[(2, 0)] = zx;
        m[(2, 1)] = zy;

        m
    }

    /// Builds the world-to-eye transform for an eye at `from` looking at `to`.
    ///
    /// The result moves the *world* so that the eye sits at the origin looking
    /// down negative Z with `up` roughly along positive Y.
    pub fn view_transform(from: Tuple4D, to: Tuple4D, up: Tuple4D) -> Matrix4D {
        let forward = (to - from).normalize();
        let left = forward.cross(&up.normalize());
        let true_up = left.cross(&forward);

        let orientation: Matrix4D = [
             left.x,     left.y,     left.z,    0.0,
             true_up.x,  true_up.y,  true_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
             0.0,        0.0,        0.0,       1.0,
        ].into();

        orientation * Matrix4D::translation(-from.x, -from.y, -from.z)
    }

    pub fn transposition(&self) -> Matrix4D {
        let mut t = Self::zero();
        for r in 0..4 {
            for c in 0..4 {
                t[(c, r)] = self[(r, c)];
            }
        }

        t
    }

    /// The six 2x2 determinants of the top two rows and of the bottom two
    /// rows. Both the determinant and the inverse are assembled from these.
    fn pair_minors(&self) -> ([f64; 6], [f64; 6]) {
        let a = |r: usize, c: usize| self[(r, c)];
        let top = |i: usize, j: usize| a(0, i) * a(1, j) - a(0, j) * a(1, i);
        let bot = |i: usize, j: usize| a(2, i) * a(3, j) - a(2, j) * a(3, i);

        (
            [top(0, 1), top(0, 2), top(0, 3), top(1, 2), top(1, 3), top(2, 3)],
            [bot(0, 1), bot(0, 2), bot(0, 3), bot(1, 2), bot(1, 3), bot(2, 3)],
        )
    }

    pub fn determinant(&self) -> f64 {
        let (s, c) = self.pair_minors();
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3]
            + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    /// Calculates the inverse of a matrix, if it exists.
    ///
    /// Returns `None` when the determinant is zero or not finite, or when the
    /// inverse would overflow. Small but nonzero determinants are fine, so
    /// scenes may be authored at any scale.
    pub fn inverse(&self) -> Option<Matrix4D> {
        let (s, c) = self.pair_minors();
        let det = s[0] * c[5] - s[1] * c[4] + s[2] * c[3]
            + s[3] * c[2] - s[4] * c[1] + s[5] * c[0];

        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let a = |r: usize, col: usize| self[(r, col)];
        let adjugate: Matrix4D = [
             a(1, 1) * c[5] - a(1, 2) * c[4] + a(1, 3) * c[3],
            -a(0, 1) * c[5] + a(0, 2) * c[4] - a(0, 3) * c[3],
             a(3, 1) * s[5] - a(3, 2) * s[4] + a(3, 3) * s[3],
            -a(2, 1) * s[5] + a(2, 2) * s[4] - a(2, 3) * s[3],

            -a(1, 0) * c[5] + a(1, 2) * c[2] - a(1, 3) * c[1],
             a(0, 0) * c[5] - a(0, 2) * c[2] + a(0, 3) * c[1],
            -a(3, 0) * s[5] + a(3, 2) * s[2] - a(3, 3) * s[1],
             a(2, 0) * s[5] - a(2, 2) * s[2] + a(2, 3) * s[1],

             a(1, 0) * c[4] - a(1, 1) * c[2] + a(1, 3) * c[0],
            -a(0, 0) * c[4] + a(0, 1) * c[2] - a(0, 3) * c[0],
             a(3, 0) * s[4] - a(3, 1) * s[2] + a(3, 3) * s[0],
            -a(2, 0) * s[4] + a(2, 1) * s[2] - a(2, 3) * s[0],

            -a(1, 0) * c[3] + a(1, 1) * c[1] - a(1, 2) * c[0],
             a(0, 0) * c[3] - a(0, 1) * c[1] + a(0, 2) * c[0],
            -a(3, 0) * s[3] + a(3, 1) * s[1] - a(3, 2) * s[0],
             a(2, 0) * s[3] - a(2, 1) * s[1] + a(2, 2) * s[0],
        ].into();

        let mut inv = adjugate;
        inv.data.iter_mut().for_each(|e| *e /= det);

        if inv.data.iter().all(|e| e.is_finite()) {
            Some(inv)
        } else {
            None
        }
    }
}

impl From<[f64; 16]> for Matrix4D {
    fn from(data: [f64; 16]) -> Matrix4D {
        Matrix4D { data }
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * 4 + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix4D {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * 4 + col]
    }
}

impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::zero();
        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = (0..4).map(|k| self[(r, k)] * other[(k, c)]).sum();
            }
        }

        res
    }
}

impl Mul<Tuple4D> for Matrix4D {
    type Output = Tuple4D;

    fn mul(self, t: Tuple4D) -> Tuple4D {
        let row = |r: usize| self[(r, 0)] * t.x
            + self[(r, 1)] * t.y
            + self[(r, 2)] * t.z
            + self[(r, 3)] * t.w;

        Tuple4D::tuple(row(0), row(1), row(2), row(3))
    }
}

impl fmt::Display for Matrix4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {:9.5} |", self[(r, c)])?;
            }

            if r != 3 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[test]
fn multiply_by_identity() {
    let a: Matrix4D = [
        0.0, 1.0,  2.0,  4.0,
        1.0, 2.0,  4.0,  8.0,
        2.0, 4.0,  8.0, 16.0,
        4.0, 8.0, 16.0, 32.0,
    ].into();

    assert_eq!(a * Matrix4D::identity(), a);
    assert_eq!(Matrix4D::identity() * a, a);
}

#[test]
fn multiply_two_matrices() {
    let a: Matrix4D = [
        1.0, 2.0, 3.0, 4.0,
        5.0, 6.0, 7.0, 8.0,
        9.0, 8.0, 7.0, 6.0,
        5.0, 4.0, 3.0, 2.0,
    ].into();
    let b: Matrix4D = [
        -2.0, 1.0, 2.0,  3.0,
         3.0, 2.0, 1.0, -1.0,
         4.0, 3.0, 6.0,  5.0,
         1.0, 2.0, 7.0,  8.0,
    ].into();
    let expected: Matrix4D = [
        20.0, 22.0,  50.0,  48.0,
        44.0, 54.0, 114.0, 108.0,
        40.0, 58.0, 110.0, 102.0,
        16.0, 26.0,  46.0,  42.0,
    ].into();

    assert_eq!(a * b, expected);
}

#[test]
fn transpose_matrix() {
    let a: Matrix4D = [
        0.0, 9.0, 3.0, 0.0,
        9.0, 8.0, 0.0, 8.0,
        1.0, 8.0, 5.0, 3.0,
        0.0, 0.0, 5.0, 8.0,
    ].into();
    let t: Matrix4D = [
        0.0, 9.0, 1.0, 0.0,
        9.0, 8.0, 8.0, 0.0,
        3.0, 0.0, 5.0, 5.0,
        0.0, 8.0, 3.0, 8.0,
    ].into();

    assert_eq!(a.transposition(), t);
    assert_eq!(Matrix4D::identity().transposition(), Matrix4D::identity());
}

#[test]
fn determinant_of_4x4() {
    let a: Matrix4D = [
        -2.0, -8.0,  3.0,  5.0,
        -3.0,  1.0,  7.0,  3.0,
         1.0,  2.0, -9.0,  6.0,
        -6.0,  7.0,  7.0, -9.0,
    ].into();

    assert!(feq(a.determinant(), -4071.0));
}

#[test]
fn singular_matrix_has_no_inverse() {
    let a: Matrix4D = [
        -4.0,  2.0, -2.0, -3.0,
         9.0,  6.0,  2.0,  6.0,
         0.0, -5.0,  1.0, -5.0,
         0.0,  0.0,  0.0,  0.0,
    ].into();

    assert!(feq(a.determinant(), 0.0));
    assert!(a.inverse().is_none());
}

#[test]
fn small_scalings_are_invertible() {
    let m = Matrix4D::scaling(0.02, 0.02, 0.02);
    let inv = m.inverse().expect("small scaling should be invertible");
    assert_eq!(inv, Matrix4D::scaling(50.0, 50.0, 50.0));

    let tiny = Matrix4D::scaling(1e-4, 1e-4, 1e-4);
    let inv = tiny.inverse().expect("tiny scaling should be invertible");
    assert_eq!(inv * Tuple4D::point(1e-4, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0));
}

#[test]
fn non_finite_matrices_have_no_inverse() {
    let mut nan = Matrix4D::identity();
    nan[(1, 2)] = f64::NAN;
    assert!(nan.inverse().is_none());

    let mut infinite = Matrix4D::identity();
    infinite[(0, 0)] = f64::INFINITY;
    assert!(infinite.inverse().is_none());

    // Nonzero determinant, but the inverse overflows
    assert!(Matrix4D::scaling(1e-320, 1.0, 1.0).inverse().is_none());
}

#[test]
fn inverse_of_4x4() {
    let a: Matrix4D = [
        -5.0,  2.0,  6.0, -8.0,
         1.0, -5.0,  1.0,  8.0,
         7.0,  7.0, -6.0, -7.0,
         1.0, -3.0,  7.0,  4.0,
    ].into();
    let expected: Matrix4D = [
         0.21805,  0.45113,  0.24060, -0.04511,
        -0.80827, -1.45677, -0.44361,  0.52068,
        -0.07895, -0.22368, -0.05263,  0.19737,
        -0.52256, -0.81391, -0.30075,  0.30639,
    ].into();

    assert!(feq(a.determinant(), 532.0));
    let b = a.inverse().expect("matrix should be invertible");
    assert!(feq(b[(3, 2)], -160.0 / 532.0));
    assert!(feq(b[(2, 3)], 105.0 / 532.0));
    assert_eq!(b, expected);
}

#[test]
fn inverse_round_trips() {
    let m = Matrix4D::translation(1.0, -2.0, 3.0)
        * Matrix4D::rotation_y(0.7)
        * Matrix4D::shearing(0.5, 0.0, 0.0, 0.25, 0.0, 0.0)
        * Matrix4D::scaling(2.0, 0.5, 3.0);

    let inv = m.inverse().expect("matrix should be invertible");
    assert_eq!(inv * m, Matrix4D::identity());
    assert_eq!(m * inv, Matrix4D::identity());
    assert_eq!(inv.inverse().expect("inverse should be invertible"), m);
}

#[test]
fn product_times_inverse_restores_matrix() {
    let a: Matrix4D = [
         3.0, -9.0,  7.0,  3.0,
         3.0, -8.0,  2.0, -9.0,
        -4.0,  4.0,  4.0,  1.0,
        -6.0,  5.0, -1.0,  1.0,
    ].into();
    let b: Matrix4D = [
        8.0,  2.0, 2.0, 2.0,
        3.0, -1.0, 7.0, 0.0,
        7.0,  0.0, 5.0, 4.0,
        6.0, -2.0, 0.0, 5.0,
    ].into();

    let c = a * b;
    assert_eq!(c * b.inverse().expect("matrix should be invertible"), a);
}

#[test]
fn translation_moves_points_not_vectors() {
    let t = Matrix4D::translation(5.0, -3.0, 2.0);

    assert_eq!(t * Tuple4D::point(-3.0, 4.0, 5.0),
        Tuple4D::point(2.0, 1.0, 7.0));
    assert_eq!(t * Tuple4D::vector(-3.0, 4.0, 5.0),
        Tuple4D::vector(-3.0, 4.0, 5.0));

    let inv = t.inverse().expect("translation should be invertible");
    assert_eq!(inv * Tuple4D::point(-3.0, 4.0, 5.0),
        Tuple4D::point(-8.0, 7.0, 3.0));
}

#[test]
fn scaling_and_reflection() {
    let s = Matrix4D::scaling(2.0, 3.0, 4.0);
    assert_eq!(s * Tuple4D::point(-4.0, 6.0, 8.0),
        Tuple4D::point(-8.0, 18.0, 32.0));

    let reflect = Matrix4D::scaling(-1.0, 1.0, 1.0);
    assert_eq!(reflect * Tuple4D::point(2.0, 3.0, 4.0),
        Tuple4D::point(-2.0, 3.0, 4.0));
}

#[test]
fn rotations_about_each_axis() {
    let quarter = std::f64::consts::PI / 2.0;
    let h = 2.0f64.sqrt() / 2.0;

    assert_eq!(Matrix4D::rotation_x(quarter / 2.0)
        * Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::point(0.0, h, h));
    assert_eq!(Matrix4D::rotation_y(quarter)
        * Tuple4D::point(0.0, 0.0, 1.0), Tuple4D::point(1.0, 0.0, 0.0));
    assert_eq!(Matrix4D::rotation_z(quarter)
        * Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::point(-1.0, 0.0, 0.0));
}

#[test]
fn shearing_moves_components() {
    let p = Tuple4D::point(2.0, 3.0, 4.0);

    assert_eq!(Matrix4D::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0) * p,
        Tuple4D::point(5.0, 3.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 1.0, 0.0, 0.0) * p,
        Tuple4D::point(2.0, 7.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 0.0, 1.0) * p,
        Tuple4D::point(2.0, 3.0, 7.0));
}

#[test]
fn view_transform_orientations() {
    let origin = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(origin,
        Tuple4D::point(0.0, 0.0, -1.0), up), Matrix4D::identity());
    assert_eq!(Matrix4D::view_transform(origin,
        Tuple4D::point(0.0, 0.0, 1.0), up), Matrix4D::scaling(-1.0, 1.0, -1.0));
    assert_eq!(Matrix4D::view_transform(Tuple4D::point(0.0, 0.0, 8.0),
        origin, up), Matrix4D::translation(0.0, 0.0, -8.0));
}

#[test]
fn arbitrary_view_transform() {
    let from = Tuple4D::point(1.0, 3.0, 2.0);
    let to = Tuple4D::point(4.0, -2.0, 8.0);
    let up = Tuple4D::vector(1.0, 1.0, 0.0);

    let expected: Matrix4D = [
        -0.50709, 0.50709,  0.67612, -2.36643,
         0.76772, 0.60609,  0.12122, -2.82843,
        -0.35857, 0.59761, -0.71714,  0.00000,
         0.00000, 0.00000,  0.00000,  1.00000,
    ].into();

    assert_eq!(Matrix4D::view_transform(from, to, up), expected);
}
