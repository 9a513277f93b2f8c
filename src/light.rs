use crate::color::Color;
use crate::tuple::Tuple4D;
use crate::error::Result;

/// A point light.
///
/// Light is emitted equally in all directions from `position`. There is no
/// falloff with distance and no area, so shadows are hard-edged.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl Default for PointLight {
    fn default() -> PointLight {
        PointLight {
            intensity: Color::white(),
            position: Tuple4D::point(-10.0, 10.0, -10.0),
        }
    }
}

impl PointLight {
    /// Creates a point light.
    ///
    /// Fails with `NotAPoint` if `position` is not tagged as a point.
    pub fn new(intensity: Color, position: Tuple4D) -> Result<PointLight> {
        Ok(PointLight { intensity, position: position.expect_point()? })
    }
}

#[test]
fn point_light_has_position_and_intensity() {
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, 0.0))
        .unwrap();

    assert_eq!(light.intensity, Color::white());
    assert_eq!(light.position, Tuple4D::origin());
}

#[test]
fn point_light_rejects_vector_position() {
    assert!(PointLight::new(Color::white(), Tuple4D::vector(0.0, 1.0, 0.0))
        .is_err());
}
