use std::hash::{ Hash, Hasher };
use std::ops::Index;

use crate::consts::{ EPSILON, SHADOW_EPSILON, VACUUM_RI };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::shape::Shape;

/// An intersection.
///
/// Records that some ray met the shape `what` at offset `t` along the ray.
/// Intersections borrow their shape and only live for the duration of a
/// single color computation.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub what: &'a Shape,
}

impl<'a> Intersection<'a> {
    pub fn new(t: f64, what: &'a Shape) -> Intersection<'a> {
        Intersection { t, what }
    }

    /// Identity used for equality and hashing: the shape's address and `t`
    /// truncated to five decimal places.
    fn key(&self) -> (*const Shape, i64) {
        (self.what as *const Shape, (self.t * 1e5).round() as i64)
    }
}

/// Two intersections are equal when they refer to the *same* shape (by
/// pointer) at the same `t`, ignoring floating point noise.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.key() == other.key()
    }
}

impl<'a> Eq for Intersection<'a> {}

impl<'a> Hash for Intersection<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// A collection of intersections, kept sorted by ascending `t`.
#[derive(Clone, Debug, Default)]
pub struct Intersections<'a> {
    intersections: Vec<Intersection<'a>>,
}

impl<'a> From<Vec<Intersection<'a>>> for Intersections<'a> {
    fn from(intersections: Vec<Intersection<'a>>) -> Intersections<'a> {
        let mut is = Intersections { intersections };
        is.sort();
        is
    }
}

impl<'a> FromIterator<Intersection<'a>> for Intersections<'a> {
    fn from_iter<I: IntoIterator<Item = Intersection<'a>>>(iter: I)
        -> Intersections<'a> {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

impl<'a> IntoIterator for Intersections<'a> {
    type Item = Intersection<'a>;
    type IntoIter = std::vec::IntoIter<Intersection<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.intersections.into_iter()
    }
}

impl<'a> Index<usize> for Intersections<'a> {
    type Output = Intersection<'a>;

    fn index(&self, i: usize) -> &Intersection<'a> {
        &self.intersections[i]
    }
}

impl<'a> Intersections<'a> {
    pub fn new() -> Intersections<'a> {
        Intersections { intersections: Vec::new() }
    }

    /// Merges another list into this one, keeping the order.
    pub fn extend(&mut self, other: Intersections<'a>) {
        self.intersections.extend(other.intersections);
        self.sort();
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intersection<'a>> {
        self.intersections.iter()
    }

    pub fn as_slice(&self) -> &[Intersection<'a>] {
        &self.intersections
    }

    /// The nearest intersection in front of the ray origin.
    ///
    /// Intersections with negative `t` lie behind the ray and are skipped.
    /// Returns `None` when nothing is in front.
    pub fn hit(&self) -> Option<Intersection<'a>> {
        self.intersections.iter().copied().find(|i| i.t >= 0.0)
    }

    /// Stable sort by `t`; NaN offsets sort last.
    fn sort(&mut self) {
        self.intersections.sort_by(|a, b| a.t.total_cmp(&b.t));
    }
}

/// A record for computations associated with an `Intersection`.
///
/// Everything the shading code needs about a hit, computed once. Built per
/// hit and never cached across rays.
#[derive(Clone, Debug)]
pub struct IntersectionComputation<'a> {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The object being intersected.
    pub obj: &'a Shape,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the surface. Shading position and origin of
    /// reflected rays, so a surface does not intersect itself ("acne").
    pub over_point: Tuple4D,

    /// A point slightly below the surface, where refracted rays start.
    pub under_point: Tuple4D,

    /// Origin of shadow rays; further above the surface than `over_point`.
    pub far_over_point: Tuple4D,

    pub eyev: Tuple4D,

    /// Surface normal, flipped to face the eye.
    pub normalv: Tuple4D,

    /// The incoming ray direction reflected across the normal.
    pub reflectv: Tuple4D,

    /// Whether the ray hit the surface from inside the shape.
    pub inside: bool,

    /// The refractive index of the material being exited.
    pub n1: f64,

    /// The refractive index of the material being entered.
    pub n2: f64,
}

impl<'a> IntersectionComputation<'a> {
    /// Prepares shading state for `hit` on ray `r`.
    ///
    /// `is` should be the sorted list that `hit` came from; the refractive
    /// indices are derived by replaying it. Without a list, the hit is
    /// treated as the only intersection.
    pub fn new(r: &Ray4D, hit: &Intersection<'a>,
        is: Option<&Intersections<'a>>) -> IntersectionComputation<'a> {
        let t = hit.t;
        let obj = hit.what;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = obj.normal_at(point);

        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * EPSILON;
        let under_point = point - normalv * EPSILON;
        let far_over_point = point + normalv * SHADOW_EPSILON;

        let reflectv = r.direction.reflect(&normalv);

        let xs = match is {
            Some(is) => is.as_slice(),
            None => std::slice::from_ref(hit),
        };
        let (n1, n2) = Self::refraction_indices(hit, xs);

        IntersectionComputation {
            t, obj,
            point, over_point, under_point, far_over_point,
            eyev, normalv, reflectv,
            inside,
            n1, n2,
        }
    }

    /// Finds the indices on either side of the hit surface.
    ///
    /// Walks the intersections in order, tracking which shapes the ray is
    /// currently inside. The innermost such shape defines the medium.
    fn refraction_indices(hit: &Intersection<'a>, xs: &[Intersection<'a>])
        -> (f64, f64) {
        fn medium(containers: &[&Shape]) -> f64 {
            containers.last()
                .map_or(VACUUM_RI, |s| s.material().refractive_index)
        }

        let mut containers: Vec<&'a Shape> = Vec::new();

        for i in xs {
            let n1 = medium(&containers);

            match containers.iter().position(|&s| std::ptr::eq(s, i.what)) {
                Some(j) => { containers.remove(j); },
                None => containers.push(i.what),
            }

            if i == hit {
                return (n1, medium(&containers));
            }
        }

        (VACUUM_RI, VACUUM_RI)
    }

    /// Schlick's approximation of the Fresnel reflectance at this hit.
    ///
    /// Returns the fraction of light reflected, between 0 and 1. Under total
    /// internal reflection everything is reflected.
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        // Total internal reflection can only occur if n1 > n2.
        if self.n1 > self.n2 {
            let n = self.n1 / self.n2;
            let sin2_t = n.powi(2) * (1.0 - cos.powi(2));
            if sin2_t > 1.0 {
                return 1.0;
            }

            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

#[test]
fn hit_with_all_positive() {
    let s = Shape::sphere();
    let i1 = Intersection::new(1.0, &s);
    let i2 = Intersection::new(2.0, &s);
    let xs: Intersections = vec![i2, i1].into();

    assert_eq!(xs.hit(), Some(i1));
}

#[test]
fn hit_with_some_negative() {
    let s = Shape::sphere();
    let i1 = Intersection::new(-1.0, &s);
    let i2 = Intersection::new(1.0, &s);
    let xs: Intersections = vec![i2, i1].into();

    assert_eq!(xs.hit(), Some(i2));
}

#[test]
fn hit_with_all_negative() {
    let s = Shape::sphere();
    let xs: Intersections = vec![
        Intersection::new(-2.0, &s),
        Intersection::new(-1.0, &s),
    ].into();

    assert_eq!(xs.hit(), None);
    assert_eq!(Intersections::new().hit(), None);
}

#[test]
fn hit_is_lowest_nonnegative() {
    let s = Shape::sphere();
    let i4 = Intersection::new(2.0, &s);
    let xs: Intersections = vec![
        Intersection::new(5.0, &s),
        Intersection::new(7.0, &s),
        Intersection::new(-3.0, &s),
        i4,
    ].into();

    assert_eq!(xs.hit(), Some(i4));
    assert_eq!(xs[0].t, -3.0);
    assert_eq!(xs[3].t, 7.0);
}

#[test]
fn intersection_identity_is_by_shape() {
    use std::collections::HashSet;

    let a = Shape::sphere();
    let b = Shape::sphere();

    assert_eq!(Intersection::new(1.0, &a), Intersection::new(1.000001, &a));
    assert_ne!(Intersection::new(1.0, &a), Intersection::new(1.0, &b));

    let set: HashSet<_> = [
        Intersection::new(1.0, &a),
        Intersection::new(1.0, &a),
        Intersection::new(1.0, &b),
    ].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn precompute_outside_intersection() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();
    let i = Intersection::new(4.0, &s);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(comps.t, 4.0);
    assert!(std::ptr::eq(comps.obj, &s));
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
}

#[test]
fn precompute_inside_intersection() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();
    let i = Intersection::new(1.0, &s);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(comps.inside);
}

#[test]
fn hit_offsets_points_along_normal() {
    use crate::matrix::Matrix4D;

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)).unwrap();
    let i = Intersection::new(5.0, &s);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert!(comps.over_point.z < -EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
    assert!(comps.under_point.z > EPSILON / 2.0);
    assert!(comps.point.z < comps.under_point.z);
    assert!(comps.far_over_point.z < comps.over_point.z);
}

#[test]
fn precompute_reflection_vector() {
    let s = Shape::plane();
    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 1.0, -1.0),
        Tuple4D::vector(0.0, -h, h));
    let i = Intersection::new(2.0f64.sqrt(), &s);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(comps.reflectv, Tuple4D::vector(0.0, h, h));
}

#[test]
fn find_n1_and_n2_at_various_intersections() {
    use crate::matrix::Matrix4D;

    let mut a = Shape::glass_sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    a.material_mut().refractive_index = 1.5;

    let mut b = Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, -0.25)).unwrap();
    b.material_mut().refractive_index = 2.0;

    let mut c = Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 0.25)).unwrap();
    c.material_mut().refractive_index = 2.5;

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -4.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let xs: Intersections = vec![
        Intersection::new(2.0, &a),
        Intersection::new(2.75, &b),
        Intersection::new(3.25, &c),
        Intersection::new(4.75, &b),
        Intersection::new(5.25, &c),
        Intersection::new(6.0, &a),
    ].into();

    let expected = [
        (1.0, 1.5),
        (1.5, 2.0),
        (2.0, 2.5),
        (2.5, 2.5),
        (2.5, 1.5),
        (1.5, 1.0),
    ];

    for (index, (n1, n2)) in expected.iter().enumerate() {
        let comps = IntersectionComputation::new(&r, &xs[index], Some(&xs));
        assert_eq!(comps.n1, *n1, "n1 at index {}", index);
        assert_eq!(comps.n2, *n2, "n2 at index {}", index);
    }
}

#[test]
fn single_hit_prepare_enters_from_vacuum() {
    let s = Shape::glass_sphere();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(4.0, &s);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(comps.n1, 1.0);
    assert_eq!(comps.n2, 1.5);
}

#[test]
fn schlick_under_total_internal_reflection() {
    let s = Shape::glass_sphere();
    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, h),
        Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-h, &s),
        Intersection::new(h, &s),
    ].into();

    let comps = IntersectionComputation::new(&r, &xs[1], Some(&xs));
    assert_eq!(comps.schlick(), 1.0);
}

#[test]
fn schlick_with_perpendicular_ray() {
    let s = Shape::glass_sphere();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-1.0, &s),
        Intersection::new(1.0, &s),
    ].into();

    let comps = IntersectionComputation::new(&r, &xs[1], Some(&xs));
    assert!(crate::feq(comps.schlick(), 0.04));
}

#[test]
fn schlick_with_small_angle_and_n2_greater() {
    let s = Shape::glass_sphere();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.99, -2.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let xs: Intersections = vec![Intersection::new(1.8589, &s)].into();

    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));
    assert!(crate::feq(comps.schlick(), 0.48873));
}
