use crate::matrix::Matrix4D;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::error::{ Result, TracerError };

/// An invertible transform together with its cached inverse.
///
/// Shapes, patterns and cameras each own one of these. Construction fails for
/// a singular matrix, so anything holding a `Transform` can convert between
/// its local space and world space without rechecking invertibility.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    matrix: Matrix4D,
    inverse: Matrix4D,
    inverse_transpose: Matrix4D,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            matrix: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            inverse_transpose: Matrix4D::identity(),
        }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4D) -> Result<Transform> {
        let inverse = matrix.inverse()
            .ok_or_else(|| TracerError::NotInvertible(matrix.determinant()))?;

        Ok(Transform {
            matrix,
            inverse,
            inverse_transpose: inverse.transposition(),
        })
    }

    /// Builds a transform from a matrix and an inverse known ahead of time,
    /// such as a scaling and its reciprocal scaling.
    pub(crate) fn from_pair(matrix: Matrix4D, inverse: Matrix4D) -> Transform {
        debug_assert_eq!(matrix * inverse, Matrix4D::identity());

        Transform {
            matrix,
            inverse,
            inverse_transpose: inverse.transposition(),
        }
    }

    pub fn matrix(&self) -> Matrix4D {
        self.matrix
    }

    pub fn inverse(&self) -> Matrix4D {
        self.inverse
    }

    /// Maps a world-space point or vector into local space.
    pub fn to_local(&self, t: Tuple4D) -> Tuple4D {
        self.inverse * t
    }

    pub fn ray_to_local(&self, r: &Ray4D) -> Ray4D {
        r.transform(self.inverse)
    }

    /// Maps a local-space point or vector into world space.
    pub fn to_world(&self, t: Tuple4D) -> Tuple4D {
        self.matrix * t
    }

    /// Maps a local-space normal into world space.
    ///
    /// Normals go through the inverse transpose so they stay perpendicular to
    /// the surface under non-uniform scaling. The translation column leaks
    /// into `w`, so the tag is reset before normalizing. A zero local normal
    /// stays zero.
    pub fn normal_to_world(&self, local_normal: Tuple4D) -> Tuple4D {
        let mut n = self.inverse_transpose * local_normal;
        n.w = 0.0;

        n.try_normalize().unwrap_or(n)
    }
}

#[test]
fn singular_matrix_is_rejected() {
    let singular = Matrix4D::scaling(1.0, 0.0, 1.0);

    match Transform::new(singular) {
        Err(TracerError::NotInvertible(_)) => {},
        other => panic!("expected NotInvertible, got {:?}", other),
    }
}

#[test]
fn local_and_world_round_trip() {
    let t = Transform::new(Matrix4D::translation(1.0, 2.0, 3.0)
        * Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    let p = Tuple4D::point(-1.0, 4.0, 0.5);

    assert_eq!(t.to_world(t.to_local(p)), p);
    assert_eq!(t.to_local(Tuple4D::point(3.0, 4.0, 5.0)),
        Tuple4D::point(1.0, 1.0, 1.0));
}

#[test]
fn normal_ignores_translation() {
    let t = Transform::new(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap();
    let n = t.normal_to_world(Tuple4D::vector(0.0, 1.0, 0.0));

    assert_eq!(n, Tuple4D::vector(0.0, 1.0, 0.0));
    assert!(n.is_vector());
}

#[test]
fn known_pair_matches_computed_inverse() {
    let paired = Transform::from_pair(Matrix4D::scaling(0.5, 0.5, 0.5),
        Matrix4D::scaling(2.0, 2.0, 2.0));
    let computed = Transform::new(Matrix4D::scaling(0.5, 0.5, 0.5)).unwrap();

    assert_eq!(paired, computed);
}
