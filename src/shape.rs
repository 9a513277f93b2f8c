use std::sync::RwLockWriteGuard;

use crate::consts::{ EPSILON, GLASS_RI };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::material::{ Material, SharedMaterial };
use crate::intersect::{ Intersection, Intersections };
use crate::error::Result;

/// The Y extent of a cylinder or cone, and whether its ends are capped.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Conic {
    pub minimum: f64,
    pub maximum: f64,
    pub closed: bool,
}

impl Default for Conic {
    fn default() -> Conic {
        Conic {
            minimum: f64::NEG_INFINITY,
            maximum: f64::INFINITY,
            closed: false,
        }
    }
}

impl Conic {
    /// Whether a local Y coordinate lies strictly between the bounds.
    fn contains(&self, y: f64) -> bool {
        self.minimum < y && y < self.maximum
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// A unit sphere with its center at the object-space origin.
    Sphere,

    /// The XZ plane, extending indefinitely.
    Plane,

    /// An axis-aligned cube spanning `-1..1` on every axis.
    Cube,

    /// A radius 1 cylinder around the Y axis.
    Cylinder(Conic),

    /// A double-napped cone around the Y axis with its apex at the origin.
    /// The radius at height `y` is `|y|`.
    Cone(Conic),
}

/// A geometric primitive placed in the world.
///
/// Intersection and normal math is written once per variant in object space
/// (`local_intersect`, `local_normal_at`); `intersect` and `normal_at` handle
/// the conversion to and from world space for every variant.
///
/// Shapes are identified by address: intersections borrow the shape that
/// produced them, and two identical shapes are still different objects.
/// Cloning a shape shares its material.
#[derive(Clone, Debug)]
pub struct Shape {
    pub kind: ShapeKind,
    transform: Transform,
    material: SharedMaterial,
}

impl From<ShapeKind> for Shape {
    fn from(kind: ShapeKind) -> Shape {
        Shape {
            kind,
            transform: Default::default(),
            material: Default::default(),
        }
    }
}

impl Shape {
    pub fn sphere() -> Shape {
        ShapeKind::Sphere.into()
    }

    /// A unit sphere made of clear glass.
    pub fn glass_sphere() -> Shape {
        Shape::sphere().with_material(Material {
            transparency: 1.0,
            refractive_index: GLASS_RI,
            ..Default::default()
        })
    }

    pub fn plane() -> Shape {
        ShapeKind::Plane.into()
    }

    pub fn cube() -> Shape {
        ShapeKind::Cube.into()
    }

    /// Creates an infinitely long cylinder.
    pub fn cylinder() -> Shape {
        ShapeKind::Cylinder(Default::default()).into()
    }

    /// Creates a cylinder truncated at `minimum` and `maximum`.
    pub fn bounded_cylinder(minimum: f64, maximum: f64, closed: bool)
        -> Shape {
        ShapeKind::Cylinder(Conic { minimum, maximum, closed }).into()
    }

    /// Creates an infinite double-napped cone.
    pub fn cone() -> Shape {
        ShapeKind::Cone(Default::default()).into()
    }

    pub fn bounded_cone(minimum: f64, maximum: f64, closed: bool) -> Shape {
        ShapeKind::Cone(Conic { minimum, maximum, closed }).into()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replaces the object-to-world transform.
    ///
    /// A singular matrix is rejected and the previous transform is kept.
    pub fn set_transform(&mut self, m: Matrix4D) -> Result<()> {
        self.transform = Transform::new(m)?;
        Ok(())
    }

    /// Builder form of `set_transform`.
    pub fn with_transform(mut self, m: Matrix4D) -> Result<Shape> {
        self.set_transform(m)?;
        Ok(self)
    }

    /// Builder form taking a transform that is already known to be valid.
    pub fn with_valid_transform(mut self, t: Transform) -> Shape {
        self.transform = t;
        self
    }

    /// Gives this shape its own copy of `m`.
    pub fn with_material(mut self, m: Material) -> Shape {
        self.material = m.into();
        self
    }

    /// Makes this shape use a material that other shapes may also hold.
    pub fn with_shared_material(mut self, m: SharedMaterial) -> Shape {
        self.material = m;
        self
    }

    /// Returns a snapshot of the shape's material.
    pub fn material(&self) -> Material {
        self.material.get()
    }

    /// Locks the material for editing. Shapes sharing it see the change.
    pub fn material_mut(&mut self) -> RwLockWriteGuard<'_, Material> {
        self.material.write()
    }

    pub fn shared_material(&self) -> &SharedMaterial {
        &self.material
    }

    /// Intersects a world-space ray with this shape.
    pub fn intersect(&self, ray: &Ray4D) -> Intersections {
        self.local_intersect(&self.transform.ray_to_local(ray))
    }

    /// The unit surface normal at a world-space point on this shape.
    pub fn normal_at(&self, world_point: Tuple4D) -> Tuple4D {
        let local_point = self.transform.to_local(world_point);
        self.transform.normal_to_world(self.local_normal_at(local_point))
    }

    /// Intersects an object-space ray with this shape.
    pub fn local_intersect(&self, ray: &Ray4D) -> Intersections {
        let ts = match self.kind {
            ShapeKind::Sphere => intersect_sphere(ray),
            ShapeKind::Plane => intersect_plane(ray),
            ShapeKind::Cube => intersect_cube(ray),
            ShapeKind::Cylinder(ref c) => intersect_cylinder(c, ray),
            ShapeKind::Cone(ref c) => intersect_cone(c, ray),
        };

        ts.into_iter().map(|t| Intersection::new(t, self)).collect()
    }

    /// The object-space normal at an object-space point. Not normalized.
    pub fn local_normal_at(&self, p: Tuple4D) -> Tuple4D {
        match self.kind {
            ShapeKind::Sphere => Tuple4D { w: 0.0, ..p },
            ShapeKind::Plane => Tuple4D::vector(0.0, 1.0, 0.0),
            ShapeKind::Cube => normal_at_cube(p),
            ShapeKind::Cylinder(ref c) => normal_at_cylinder(c, p),
            ShapeKind::Cone(ref c) => normal_at_cone(c, p),
        }
    }
}

/// Solves `a·t² + b·t + c = 0`, smaller root first.
fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let sqrt = disc.sqrt();
    let t0 = (-b - sqrt) / (2.0 * a);
    let t1 = (-b + sqrt) / (2.0 * a);

    Some((t0.min(t1), t0.max(t1)))
}

fn intersect_sphere(ray: &Ray4D) -> Vec<f64> {
    // Subtracting the center drops the point tag from the origin.
    let sphere_to_ray = ray.origin - Tuple4D::origin();

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

    match solve_quadratic(a, b, c) {
        Some((t0, t1)) => vec![t0, t1],
        None => Vec::new(),
    }
}

fn intersect_plane(ray: &Ray4D) -> Vec<f64> {
    if ray.direction.y.abs() < EPSILON {
        return Vec::new();
    }

    vec![-ray.origin.y / ray.direction.y]
}

/// Where a ray enters and leaves the `-1..1` slab of a single axis.
fn check_cube_axis(origin: f64, direction: f64) -> (f64, f64) {
    let tmin_numerator = -1.0 - origin;
    let tmax_numerator = 1.0 - origin;

    let (tmin, tmax) = if direction.abs() >= EPSILON {
        (tmin_numerator / direction, tmax_numerator / direction)
    } else {
        (tmin_numerator * f64::INFINITY, tmax_numerator * f64::INFINITY)
    };

    if tmin > tmax { (tmax, tmin) } else { (tmin, tmax) }
}

fn intersect_cube(ray: &Ray4D) -> Vec<f64> {
    let (xtmin, xtmax) = check_cube_axis(ray.origin.x, ray.direction.x);
    let (ytmin, ytmax) = check_cube_axis(ray.origin.y, ray.direction.y);
    let (ztmin, ztmax) = check_cube_axis(ray.origin.z, ray.direction.z);

    let tmin = xtmin.max(ytmin).max(ztmin);
    let tmax = xtmax.min(ytmax).min(ztmax);

    if tmin > tmax {
        return Vec::new();
    }

    vec![tmin, tmax]
}

fn normal_at_cube(p: Tuple4D) -> Tuple4D {
    let max_component = p.x.abs().max(p.y.abs()).max(p.z.abs());

    if max_component == p.x.abs() {
        Tuple4D::vector(p.x, 0.0, 0.0)
    } else if max_component == p.y.abs() {
        Tuple4D::vector(0.0, p.y, 0.0)
    } else {
        Tuple4D::vector(0.0, 0.0, p.z)
    }
}

/// Intersects the end caps of a closed cylinder or cone.
///
/// `radius` gives the cap radius at a cap's height: `1` for a cylinder,
/// `|y|` for a cone.
fn intersect_caps(c: &Conic, ray: &Ray4D, radius: fn(f64) -> f64,
    ts: &mut Vec<f64>) {
    if !c.closed || ray.direction.y.abs() < EPSILON {
        return;
    }

    for y in [c.minimum, c.maximum] {
        let t = (y - ray.origin.y) / ray.direction.y;
        let x = ray.origin.x + t * ray.direction.x;
        let z = ray.origin.z + t * ray.direction.z;

        // The tolerance keeps hits exactly on the rim.
        if x * x + z * z <= radius(y).powi(2) + EPSILON {
            ts.push(t);
        }
    }
}

fn intersect_cylinder(c: &Conic, ray: &Ray4D) -> Vec<f64> {
    let mut ts = Vec::new();
    let d = ray.direction;
    let o = ray.origin;

    // Rays parallel to the Y axis can only hit the caps.
    let a = d.x * d.x + d.z * d.z;
    if a >= EPSILON {
        let b = 2.0 * o.x * d.x + 2.0 * o.z * d.z;
        let cc = o.x * o.x + o.z * o.z - 1.0;

        match solve_quadratic(a, b, cc) {
            Some((t0, t1)) => {
                ts.extend([t0, t1].into_iter()
                    .filter(|t| c.contains(o.y + t * d.y)));
            },
            None => return ts,
        }
    }

    intersect_caps(c, ray, |_| 1.0, &mut ts);
    ts
}

fn normal_at_cylinder(c: &Conic, p: Tuple4D) -> Tuple4D {
    let dist = p.x * p.x + p.z * p.z;

    if dist < 1.0 && p.y >= c.maximum - EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < 1.0 && p.y <= c.minimum + EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        Tuple4D::vector(p.x, 0.0, p.z)
    }
}

fn intersect_cone(c: &Conic, ray: &Ray4D) -> Vec<f64> {
    let mut ts = Vec::new();
    let d = ray.direction;
    let o = ray.origin;

    let a = d.x * d.x - d.y * d.y + d.z * d.z;
    let b = 2.0 * (o.x * d.x - o.y * d.y + o.z * d.z);
    let cc = o.x * o.x - o.y * o.y + o.z * o.z;

    if a.abs() < EPSILON {
        // Parallel to one half of the cone: a single hit on the other half,
        // or none at all when b vanishes too.
        if b.abs() >= EPSILON {
            let t = -cc / (2.0 * b);
            if c.contains(o.y + t * d.y) {
                ts.push(t);
            }
        }
    } else {
        match solve_quadratic(a, b, cc) {
            Some((t0, t1)) => {
                ts.extend([t0, t1].into_iter()
                    .filter(|t| c.contains(o.y + t * d.y)));
            },
            None => return ts,
        }
    }

    intersect_caps(c, ray, f64::abs, &mut ts);
    ts
}

fn normal_at_cone(c: &Conic, p: Tuple4D) -> Tuple4D {
    let dist = p.x * p.x + p.z * p.z;

    if dist < c.maximum.powi(2) && p.y >= c.maximum - EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < c.minimum.powi(2) && p.y <= c.minimum + EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        let y = if p.y > 0.0 { -dist.sqrt() } else { dist.sqrt() };
        Tuple4D::vector(p.x, y, p.z)
    }
}

#[cfg(test)]
fn ts(xs: &Intersections) -> Vec<f64> {
    xs.iter().map(|i| i.t).collect()
}

#[cfg(test)]
fn assert_ts(actual: Vec<f64>, expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected) {
        assert!(crate::feq(*a, *e), "{:?} vs {:?}", actual, expected);
    }
}

#[test]
fn ray_intersects_sphere_at_two_points() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    let s = Shape::sphere();
    let xs = s.intersect(&r);
    assert_ts(ts(&xs), &[4.0, 6.0]);
}

#[test]
fn ray_is_tangent_to_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 1.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    let s = Shape::sphere();
    let xs = s.intersect(&r);
    assert_ts(ts(&xs), &[5.0, 5.0]);
}

#[test]
fn ray_inside_and_in_front_of_sphere() {
    let s = Shape::sphere();

    let inside = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_ts(ts(&s.intersect(&inside)), &[-1.0, 1.0]);

    let behind = Ray4D::new(Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_ts(ts(&s.intersect(&behind)), &[-6.0, -4.0]);

    let miss = Ray4D::new(Tuple4D::point(0.0, 2.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert!(s.intersect(&miss).is_empty());
}

#[test]
fn intersect_transformed_spheres() {
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    let scaled = Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    assert_ts(ts(&scaled.intersect(&r)), &[3.0, 7.0]);

    let translated = Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap();
    assert!(translated.intersect(&r).is_empty());
}

#[test]
fn intersections_reference_their_shape() {
    let s = Shape::sphere();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    let xs = s.intersect(&r);
    assert!(xs.iter().all(|i| std::ptr::eq(i.what, &s)));
}

#[test]
fn sphere_normals() {
    let s = Shape::sphere();
    let k = 3.0f64.sqrt() / 3.0;

    assert_eq!(s.normal_at(Tuple4D::point(1.0, 0.0, 0.0)),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(s.normal_at(Tuple4D::point(0.0, 0.0, 1.0)),
        Tuple4D::vector(0.0, 0.0, 1.0));

    let n = s.normal_at(Tuple4D::point(k, k, k));
    assert_eq!(n, Tuple4D::vector(k, k, k));
    assert_eq!(n, n.normalize());
}

#[test]
fn normal_on_translated_sphere() {
    let s = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap();

    let n = s.normal_at(Tuple4D::point(0.0, 1.70711, -0.70711));
    assert_eq!(n, Tuple4D::vector(0.0, 0.70711, -0.70711));
}

#[test]
fn normal_on_transformed_sphere() {
    let s = Shape::sphere()
        .with_transform(Matrix4D::scaling(1.0, 0.5, 1.0)
            * Matrix4D::rotation_z(std::f64::consts::PI / 5.0))
        .unwrap();

    let h = 2.0f64.sqrt() / 2.0;
    let n = s.normal_at(Tuple4D::point(0.0, h, -h));
    assert_eq!(n, Tuple4D::vector(0.0, 0.97014, -0.24254));
}

#[test]
fn normal_query_is_idempotent() {
    let s = Shape::cube()
        .with_transform(Matrix4D::rotation_y(0.3)
            * Matrix4D::scaling(1.0, 2.0, 3.0))
        .unwrap();
    let p = Tuple4D::point(0.4, 2.0, -0.2);

    let first = s.normal_at(p);
    let second = s.normal_at(p);
    assert_eq!(first.x.to_bits(), second.x.to_bits());
    assert_eq!(first.y.to_bits(), second.y.to_bits());
    assert_eq!(first.z.to_bits(), second.z.to_bits());
}

#[test]
fn set_singular_transform_keeps_previous() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix4D::translation(2.0, 3.0, 4.0)).unwrap();

    assert!(s.set_transform(Matrix4D::scaling(1.0, 1.0, 0.0)).is_err());
    assert_eq!(s.transform().matrix(), Matrix4D::translation(2.0, 3.0, 4.0));
}

#[test]
fn glass_sphere_is_transparent() {
    let s = Shape::glass_sphere();

    assert_eq!(s.transform().matrix(), Matrix4D::identity());
    assert_eq!(s.material().transparency, 1.0);
    assert_eq!(s.material().refractive_index, 1.5);
}

#[test]
fn shapes_can_share_a_material() {
    let shared = SharedMaterial::new(Default::default());
    let mut a = Shape::plane().with_shared_material(shared.clone());
    let b = Shape::plane().with_shared_material(shared);

    a.material_mut().reflective = 0.5;
    assert_eq!(b.material().reflective, 0.5);
}

#[test]
fn plane_normal_is_constant() {
    let p = Shape::plane();

    for point in [Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::point(10.0, 0.0, -10.0),
        Tuple4D::point(-5.0, 0.0, 150.0)] {
        assert_eq!(p.local_normal_at(point), Tuple4D::vector(0.0, 1.0, 0.0));
    }
}

#[test]
fn ray_parallel_or_coplanar_to_plane() {
    let p = Shape::plane();

    let parallel = Ray4D::new(Tuple4D::point(0.0, 10.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert!(p.local_intersect(&parallel).is_empty());

    let coplanar = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert!(p.local_intersect(&coplanar).is_empty());
}

#[test]
fn ray_intersecting_plane_from_above_and_below() {
    let p = Shape::plane();

    let above = Ray4D::new(Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::vector(0.0, -1.0, 0.0));
    let below = Ray4D::new(Tuple4D::point(0.0, -1.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0));

    assert_ts(ts(&p.local_intersect(&above)), &[1.0]);
    assert_ts(ts(&p.local_intersect(&below)), &[1.0]);
}

#[test]
fn ray_intersects_cube() {
    let c = Shape::cube();
    let cases = [
        (Tuple4D::point( 5.0,  0.5,  0.0), Tuple4D::vector(-1.0,  0.0,  0.0),
            4.0, 6.0),
        (Tuple4D::point(-5.0,  0.5,  0.0), Tuple4D::vector( 1.0,  0.0,  0.0),
            4.0, 6.0),
        (Tuple4D::point( 0.5,  5.0,  0.0), Tuple4D::vector( 0.0, -1.0,  0.0),
            4.0, 6.0),
        (Tuple4D::point( 0.5, -5.0,  0.0), Tuple4D::vector( 0.0,  1.0,  0.0),
            4.0, 6.0),
        (Tuple4D::point( 0.5,  0.0,  5.0), Tuple4D::vector( 0.0,  0.0, -1.0),
            4.0, 6.0),
        (Tuple4D::point( 0.5,  0.0, -5.0), Tuple4D::vector( 0.0,  0.0,  1.0),
            4.0, 6.0),
        (Tuple4D::point( 0.0,  0.5,  0.0), Tuple4D::vector( 0.0,  0.0,  1.0),
            -1.0, 1.0),
    ];

    for (origin, direction, t1, t2) in cases {
        let xs = c.local_intersect(&Ray4D::new(origin, direction));
        assert_ts(ts(&xs), &[t1, t2]);
    }
}

#[test]
fn ray_misses_cube() {
    let c = Shape::cube();
    let cases = [
        (Tuple4D::point(-2.0, 0.0, 0.0),
            Tuple4D::vector(0.2673, 0.5345, 0.8018)),
        (Tuple4D::point(0.0, -2.0, 0.0),
            Tuple4D::vector(0.8018, 0.2673, 0.5345)),
        (Tuple4D::point(0.0, 0.0, -2.0),
            Tuple4D::vector(0.5345, 0.8018, 0.2673)),
        (Tuple4D::point(2.0, 0.0, 2.0), Tuple4D::vector(0.0, 0.0, -1.0)),
        (Tuple4D::point(0.0, 2.0, 2.0), Tuple4D::vector(0.0, -1.0, 0.0)),
        (Tuple4D::point(2.0, 2.0, 0.0), Tuple4D::vector(-1.0, 0.0, 0.0)),
    ];

    for (origin, direction) in cases {
        assert!(c.local_intersect(&Ray4D::new(origin, direction)).is_empty());
    }
}

#[test]
fn cube_normals() {
    let c = Shape::cube();
    let cases = [
        (Tuple4D::point( 1.0,  0.5, -0.8), Tuple4D::vector( 1.0, 0.0, 0.0)),
        (Tuple4D::point(-1.0, -0.2,  0.9), Tuple4D::vector(-1.0, 0.0, 0.0)),
        (Tuple4D::point(-0.4,  1.0, -0.1), Tuple4D::vector( 0.0, 1.0, 0.0)),
        (Tuple4D::point( 0.3, -1.0, -0.7), Tuple4D::vector( 0.0, -1.0, 0.0)),
        (Tuple4D::point(-0.6,  0.3,  1.0), Tuple4D::vector( 0.0, 0.0, 1.0)),
        (Tuple4D::point( 0.4,  0.4, -1.0), Tuple4D::vector( 0.0, 0.0, -1.0)),
        (Tuple4D::point( 1.0,  1.0,  1.0), Tuple4D::vector( 1.0, 0.0, 0.0)),
        (Tuple4D::point(-1.0, -1.0, -1.0), Tuple4D::vector(-1.0, 0.0, 0.0)),
    ];

    for (point, normal) in cases {
        assert_eq!(c.local_normal_at(point), normal);
    }
}

#[test]
fn ray_misses_cylinder() {
    let c = Shape::cylinder();
    let cases = [
        (Tuple4D::point(1.0, 0.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0)),
        (Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0)),
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(1.0, 1.0, 1.0)),
    ];

    for (origin, direction) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert!(c.local_intersect(&r).is_empty());
    }
}

#[test]
fn ray_strikes_cylinder() {
    let c = Shape::cylinder();
    let cases = [
        (Tuple4D::point(1.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0),
            5.0, 5.0),
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0),
            4.0, 6.0),
        (Tuple4D::point(0.5, 0.0, -5.0), Tuple4D::vector(0.1, 1.0, 1.0),
            6.80798, 7.08872),
    ];

    for (origin, direction, t0, t1) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert_ts(ts(&c.local_intersect(&r)), &[t0, t1]);
    }
}

#[test]
fn cylinder_side_normals() {
    let c = Shape::cylinder();
    let cases = [
        (Tuple4D::point( 1.0,  0.0,  0.0), Tuple4D::vector( 1.0, 0.0,  0.0)),
        (Tuple4D::point( 0.0,  5.0, -1.0), Tuple4D::vector( 0.0, 0.0, -1.0)),
        (Tuple4D::point( 0.0, -2.0,  1.0), Tuple4D::vector( 0.0, 0.0,  1.0)),
        (Tuple4D::point(-1.0,  1.0,  0.0), Tuple4D::vector(-1.0, 0.0,  0.0)),
    ];

    for (point, normal) in cases {
        assert_eq!(c.local_normal_at(point), normal);
    }
}

#[test]
fn default_cylinder_is_infinite_and_open() {
    match Shape::cylinder().kind {
        ShapeKind::Cylinder(c) => {
            assert_eq!(c.minimum, f64::NEG_INFINITY);
            assert_eq!(c.maximum, f64::INFINITY);
            assert!(!c.closed);
        },
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn intersect_truncated_cylinder() {
    let c = Shape::bounded_cylinder(1.0, 2.0, false);
    let cases = [
        (Tuple4D::point(0.0, 1.5,  0.0), Tuple4D::vector(0.1, 1.0, 0.0), 0),
        (Tuple4D::point(0.0, 3.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 0),
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 0),
        (Tuple4D::point(0.0, 2.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 0),
        (Tuple4D::point(0.0, 1.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 0),
        (Tuple4D::point(0.0, 1.5, -2.0), Tuple4D::vector(0.0, 0.0, 1.0), 2),
    ];

    for (origin, direction, count) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert_eq!(c.local_intersect(&r).len(), count);
    }
}

#[test]
fn intersect_capped_cylinder() {
    let c = Shape::bounded_cylinder(1.0, 2.0, true);
    let cases = [
        (Tuple4D::point(0.0,  3.0,  0.0), Tuple4D::vector(0.0, -1.0, 0.0)),
        (Tuple4D::point(0.0,  3.0, -2.0), Tuple4D::vector(0.0, -1.0, 2.0)),
        (Tuple4D::point(0.0,  4.0, -2.0), Tuple4D::vector(0.0, -1.0, 1.0)),
        (Tuple4D::point(0.0,  0.0, -2.0), Tuple4D::vector(0.0,  1.0, 2.0)),
        (Tuple4D::point(0.0, -1.0, -2.0), Tuple4D::vector(0.0,  1.0, 1.0)),
    ];

    for (origin, direction) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert_eq!(c.local_intersect(&r).len(), 2);
    }
}

#[test]
fn capped_cylinder_normals() {
    let c = Shape::bounded_cylinder(1.0, 2.0, true);
    let cases = [
        (Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::vector(0.0, -1.0, 0.0)),
        (Tuple4D::point(0.5, 1.0, 0.0), Tuple4D::vector(0.0, -1.0, 0.0)),
        (Tuple4D::point(0.0, 1.0, 0.5), Tuple4D::vector(0.0, -1.0, 0.0)),
        (Tuple4D::point(0.0, 2.0, 0.0), Tuple4D::vector(0.0,  1.0, 0.0)),
        (Tuple4D::point(0.5, 2.0, 0.0), Tuple4D::vector(0.0,  1.0, 0.0)),
        (Tuple4D::point(0.0, 2.0, 0.5), Tuple4D::vector(0.0,  1.0, 0.0)),
    ];

    for (point, normal) in cases {
        assert_eq!(c.local_normal_at(point), normal);
    }
}

#[test]
fn ray_intersects_cone() {
    let c = Shape::cone();
    let cases = [
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector( 0.0,  0.0, 1.0),
            5.0, 5.0),
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector( 1.0,  1.0, 1.0),
            8.66025, 8.66025),
        (Tuple4D::point(1.0, 1.0, -5.0), Tuple4D::vector(-0.5, -1.0, 1.0),
            4.55006, 49.44994),
    ];

    for (origin, direction, t0, t1) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert_ts(ts(&c.local_intersect(&r)), &[t0, t1]);
    }
}

#[test]
fn ray_parallel_to_one_cone_half() {
    let c = Shape::cone();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 1.0, 1.0).normalize());

    assert_ts(ts(&c.local_intersect(&r)), &[0.35355]);
}

#[test]
fn intersect_capped_cone() {
    let c = Shape::bounded_cone(-0.5, 0.5, true);
    let cases = [
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 1.0, 0.0), 0),
        (Tuple4D::point(0.0, 0.0, -0.25), Tuple4D::vector(0.0, 1.0, 1.0), 2),
        (Tuple4D::point(0.0, 0.0, -0.25), Tuple4D::vector(0.0, 1.0, 0.0), 4),
    ];

    for (origin, direction, count) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert_eq!(c.local_intersect(&r).len(), count);
    }
}

#[test]
fn open_cone_ignores_caps() {
    let c = Shape::bounded_cone(-0.5, 0.5, false);
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -0.25),
        Tuple4D::vector(0.0, 1.0, 0.0));

    assert_eq!(c.local_intersect(&r).len(), 2);
}

#[test]
fn cone_normals() {
    let c = Shape::cone();

    assert_eq!(c.local_normal_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Tuple4D::vector(0.0, 0.0, 0.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(1.0, 1.0, 1.0)),
        Tuple4D::vector(1.0, -(2.0f64.sqrt()), 1.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(-1.0, -1.0, 0.0)),
        Tuple4D::vector(-1.0, 1.0, 0.0));
}

#[test]
fn cone_apex_normal_is_zero_in_world_space() {
    let c = Shape::cone()
        .with_transform(Matrix4D::translation(1.0, 0.0, 0.0)).unwrap();

    assert_eq!(c.normal_at(Tuple4D::point(1.0, 0.0, 0.0)),
        Tuple4D::vector(0.0, 0.0, 0.0));
}

#[test]
fn capped_cone_normals() {
    let c = Shape::bounded_cone(-1.0, 1.0, true);

    assert_eq!(c.local_normal_at(Tuple4D::point(0.5, 1.0, 0.0)),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(0.0, -1.0, 0.5)),
        Tuple4D::vector(0.0, -1.0, 0.0));
}
