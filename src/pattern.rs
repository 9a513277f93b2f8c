use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::shape::Shape;
use crate::error::Result;

/// The color function of a pattern, evaluated in pattern space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PatternKind {
    /// A single color everywhere.
    Solid(Color),

    /// Alternates between two colors by `floor(x) mod 2`.
    Stripe(Color, Color),

    /// Blends from the first color to the second across each unit of `x`.
    Gradient(Color, Color),

    /// Concentric rings in the XZ plane, alternating by `floor(√(x² + z²))`.
    Ring(Color, Color),

    /// 3D checkers, alternating by `floor(x) + floor(y) + floor(z)`.
    Checker(Color, Color),

    /// Returns the pattern-space point itself as a color. Mostly for testing.
    Test,
}

/// A color pattern with its own transform.
///
/// A pattern is attached to a material and evaluated at points on a shape's
/// surface. The point is first mapped into the shape's object space and then
/// into the pattern's space, so patterns move with the shapes that carry them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    transform: Transform,
}

impl From<PatternKind> for Pattern {
    fn from(kind: PatternKind) -> Pattern {
        Pattern { kind, transform: Default::default() }
    }
}

impl Pattern {
    pub fn solid(c: Color) -> Pattern {
        PatternKind::Solid(c).into()
    }

    pub fn stripe(a: Color, b: Color) -> Pattern {
        PatternKind::Stripe(a, b).into()
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        PatternKind::Gradient(a, b).into()
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        PatternKind::Ring(a, b).into()
    }

    pub fn checker(a: Color, b: Color) -> Pattern {
        PatternKind::Checker(a, b).into()
    }

    pub fn test() -> Pattern {
        PatternKind::Test.into()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replaces the pattern transform.
    ///
    /// A singular matrix is rejected and the previous transform is kept.
    pub fn set_transform(&mut self, m: Matrix4D) -> Result<()> {
        self.transform = Transform::new(m)?;
        Ok(())
    }

    /// Builder form of `set_transform`.
    pub fn with_transform(mut self, m: Matrix4D) -> Result<Pattern> {
        self.set_transform(m)?;
        Ok(self)
    }

    /// Evaluates the pattern at a point already in pattern space.
    pub fn pattern_at(&self, p: Tuple4D) -> Color {
        // Index of the unit cell containing `v`, reduced to 0 or 1.
        let parity = |v: f64| v.floor().rem_euclid(2.0) as u8;

        match self.kind {
            PatternKind::Solid(c) => c,
            PatternKind::Stripe(a, b) => {
                if parity(p.x) == 0 { a } else { b }
            },
            PatternKind::Gradient(a, b) => a.lerp(&b, p.x - p.x.floor()),
            PatternKind::Ring(a, b) => {
                if parity((p.x * p.x + p.z * p.z).sqrt()) == 0 { a } else { b }
            },
            PatternKind::Checker(a, b) => {
                let sum = p.x.floor() + p.y.floor() + p.z.floor();
                if parity(sum) == 0 { a } else { b }
            },
            PatternKind::Test => Color::rgb(p.x, p.y, p.z),
        }
    }

    /// Evaluates the pattern at a world-space point on `shape`.
    pub fn pattern_at_shape(&self, shape: &Shape, world_point: Tuple4D)
        -> Color {
        let object_point = shape.transform().to_local(world_point);
        let pattern_point = self.transform.to_local(object_point);

        self.pattern_at(pattern_point)
    }
}

#[test]
fn stripe_pattern_is_constant_along_y_and_z() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    for v in [0.0, 1.0, 2.0] {
        assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, v, 0.0)),
            Color::white());
        assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, v)),
            Color::white());
    }
}

#[test]
fn stripe_pattern_alternates_along_x() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point( 0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point( 0.9, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point( 1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-0.1, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-1.1, 0.0, 0.0)),
        Color::white());
}

#[test]
fn gradient_interpolates_between_colors() {
    let pattern = Pattern::gradient(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.25, 0.0, 0.0)),
        Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.5, 0.0, 0.0)),
        Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.75, 0.0, 0.0)),
        Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn ring_extends_in_x_and_z() {
    let pattern = Pattern::ring(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.708, 0.0, 0.708)),
        Color::black());
}

#[test]
fn checkers_repeat_in_every_dimension() {
    let pattern = Pattern::checker(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.99, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.01, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 1.01, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.01)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-0.5, -0.5, 0.5)),
        Color::white());
}

#[test]
fn pattern_with_object_transformation() {
    let shape = Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0))
        .unwrap();
    let pattern = Pattern::test();

    assert_eq!(pattern.pattern_at_shape(&shape, Tuple4D::point(2.0, 3.0, 4.0)),
        Color::rgb(1.0, 1.5, 2.0));
}

#[test]
fn pattern_with_pattern_transformation() {
    let shape = Shape::sphere();
    let pattern = Pattern::test()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0))
        .unwrap();

    assert_eq!(pattern.pattern_at_shape(&shape, Tuple4D::point(2.0, 3.0, 4.0)),
        Color::rgb(1.0, 1.5, 2.0));
}

#[test]
fn pattern_with_both_transformations() {
    let shape = Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0))
        .unwrap();
    let pattern = Pattern::test()
        .with_transform(Matrix4D::translation(0.5, 1.0, 1.5))
        .unwrap();

    assert_eq!(pattern.pattern_at_shape(&shape, Tuple4D::point(2.5, 3.0, 3.5)),
        Color::rgb(0.75, 0.5, 0.25));
}

#[test]
fn singular_pattern_transform_is_rejected() {
    let mut pattern = Pattern::stripe(Color::white(), Color::black());
    let before = *pattern.transform();

    assert!(pattern.set_transform(Matrix4D::scaling(0.0, 1.0, 1.0)).is_err());
    assert_eq!(*pattern.transform(), before);
}
