use std::sync::{ Arc, PoisonError, RwLock, RwLockWriteGuard };

use crate::color::Color;
use crate::pattern::Pattern;
use crate::tuple::Tuple4D;
use crate::light::PointLight;
use crate::shape::Shape;
use crate::consts::VACUUM_RI;
use crate::error::{ Result, TracerError };

/// A material record.
///
/// Materials use attributes from the Phong reflection model (ambient, diffuse,
/// specular and shininess) plus the coefficients driving recursive rays:
/// `reflective`, `transparency` and `refractive_index`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub pattern: Option<Pattern>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub transparency: f64,
    pub refractive_index: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),
            pattern: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            transparency: 0.0,
            refractive_index: VACUUM_RI,
        }
    }
}

impl Material {
    /// Checks every coefficient against its valid range.
    ///
    /// Ambient, diffuse, specular, reflective and transparency must lie in
    /// `[0, 1]`, shininess must be non-negative and the refractive index must
    /// be positive. The first offending field is reported.
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("ambient", self.ambient),
            ("diffuse", self.diffuse),
            ("specular", self.specular),
            ("reflective", self.reflective),
            ("transparency", self.transparency),
        ];

        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(TracerError::InvalidMaterial { field, value });
            }
        }

        if !(self.shininess >= 0.0) {
            return Err(TracerError::InvalidMaterial {
                field: "shininess", value: self.shininess
            });
        }

        if !(self.refractive_index > 0.0) {
            return Err(TracerError::InvalidMaterial {
                field: "refractive_index", value: self.refractive_index
            });
        }

        Ok(())
    }

    /// The surface color at a world-space point on `shape`.
    pub fn color_at(&self, shape: &Shape, point: Tuple4D) -> Color {
        match self.pattern {
            Some(pattern) => pattern.pattern_at_shape(shape, point),
            None => self.color,
        }
    }

    /// Shades a point on `shape` as seen from `eyev`, lit by a single light.
    ///
    /// Ambient light is always contributed. Diffuse and specular light are
    /// dropped when the point is in shadow or the light is behind the
    /// surface, and specular alone is dropped when the light reflects away
    /// from the eye.
    pub fn lighting(&self, shape: &Shape, light: &PointLight, point: Tuple4D,
        eyev: Tuple4D, normalv: Tuple4D, in_shadow: bool) -> Color {
        let effective_color = self.color_at(shape, point) * light.intensity;
        let ambient = effective_color * self.ambient;

        if in_shadow {
            return ambient;
        }

        let lightv = (light.position - point).normalize();
        let light_dot_normal = lightv.dot(&normalv);
        if light_dot_normal <= 0.0 {
            return ambient;
        }

        let diffuse = effective_color * self.diffuse * light_dot_normal;

        let reflectv = (-lightv).reflect(&normalv);
        let reflect_dot_eye = reflectv.dot(&eyev);
        let specular = if reflect_dot_eye <= 0.0 {
            Color::black()
        } else {
            light.intensity * self.specular * reflect_dot_eye.powf(self.shininess)
        };

        ambient + diffuse + specular
    }
}

/// A material that may be shared between several shapes.
///
/// Cloning the handle shares the material; editing it through any handle is
/// visible to every shape holding a clone. Scenes are only edited between
/// render passes, so reads during a render never contend.
#[derive(Clone, Debug, Default)]
pub struct SharedMaterial(Arc<RwLock<Material>>);

impl From<Material> for SharedMaterial {
    fn from(m: Material) -> SharedMaterial {
        SharedMaterial(Arc::new(RwLock::new(m)))
    }
}

impl SharedMaterial {
    pub fn new(m: Material) -> SharedMaterial {
        m.into()
    }

    /// Returns a copy of the current material.
    pub fn get(&self) -> Material {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, m: Material) {
        *self.write() = m;
    }

    /// Locks the material for editing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Material> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles refer to the same material.
    pub fn ptr_eq(&self, other: &SharedMaterial) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
fn lighting_setup() -> (Material, Shape, Tuple4D) {
    (Default::default(), Shape::sphere(), Tuple4D::point(0.0, 0.0, 0.0))
}

#[test]
fn eye_between_light_and_surface() {
    let (m, s, position) = lighting_setup();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0)).unwrap();

    let res = m.lighting(&s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_offset_45_degrees() {
    let (m, s, position) = lighting_setup();
    let h = 2.0f64.sqrt() / 2.0;
    let eyev = Tuple4D::vector(0.0, h, -h);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0)).unwrap();

    let res = m.lighting(&s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn light_offset_45_degrees() {
    let (m, s, position) = lighting_setup();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 10.0, -10.0)).unwrap();

    let res = m.lighting(&s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(0.7364, 0.7364, 0.7364));
}

#[test]
fn eye_in_path_of_reflection() {
    let (m, s, position) = lighting_setup();
    let h = 2.0f64.sqrt() / 2.0;
    let eyev = Tuple4D::vector(0.0, -h, -h);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 10.0, -10.0)).unwrap();

    let res = m.lighting(&s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.6364, 1.6364, 1.6364));
}

#[test]
fn light_behind_surface() {
    let (m, s, position) = lighting_setup();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, 10.0)).unwrap();

    let res = m.lighting(&s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn surface_in_shadow() {
    let (m, s, position) = lighting_setup();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0)).unwrap();

    let res = m.lighting(&s, &light, position, eyev, normalv, true);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn lighting_with_stripe_pattern() {
    // Only ambient light, so the pattern color comes through unchanged
    let m = Material {
        pattern: Some(Pattern::stripe(Color::white(), Color::black())),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    };
    let s = Shape::sphere();

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0)).unwrap();

    assert_eq!(m.lighting(&s, &light, Tuple4D::point(0.9, 0.0, 0.0),
        eyev, normalv, false), Color::white());
    assert_eq!(m.lighting(&s, &light, Tuple4D::point(1.1, 0.0, 0.0),
        eyev, normalv, false), Color::black());
}

#[test]
fn validate_rejects_out_of_range_fields() {
    assert!(Material::default().validate().is_ok());

    let bad_ambient = Material { ambient: 1.5, ..Default::default() };
    match bad_ambient.validate() {
        Err(TracerError::InvalidMaterial { field, .. }) =>
            assert_eq!(field, "ambient"),
        other => panic!("unexpected result {:?}", other),
    }

    let bad_shininess = Material { shininess: -1.0, ..Default::default() };
    assert!(bad_shininess.validate().is_err());

    let bad_index = Material { refractive_index: 0.0, ..Default::default() };
    assert!(bad_index.validate().is_err());
}

#[test]
fn shared_material_edits_are_visible_everywhere() {
    let shared = SharedMaterial::new(Default::default());
    let alias = shared.clone();

    alias.write().ambient = 0.5;
    assert_eq!(shared.get().ambient, 0.5);
    assert!(shared.ptr_eq(&alias));
    assert!(!shared.ptr_eq(&SharedMaterial::new(Default::default())));
}
