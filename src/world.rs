use crate::consts::EPSILON;
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::light::PointLight;
use crate::material::Material;
use crate::shape::Shape;
use crate::intersect::{ Intersections, IntersectionComputation };

/// A world with objects and lights.
///
/// Holds everything a render pass reads. A world is only edited between
/// render passes; during a pass it is shared immutably between worker threads.
#[derive(Clone, Debug)]
pub struct World {
    pub objects: Vec<Shape>,
    pub lights: Vec<PointLight>,
}

/// The reference world: one white light and two concentric spheres.
///
/// The outer sphere is a unit sphere colored `(0.8, 1.0, 0.6)` with diffuse
/// `0.7` and specular `0.2`; the inner sphere is scaled by `0.5`.
impl Default for World {
    fn default() -> World {
        let outer = Shape::sphere().with_material(Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        });

        let inner = Shape::sphere().with_valid_transform(Transform::from_pair(
            Matrix4D::scaling(0.5, 0.5, 0.5),
            Matrix4D::scaling(2.0, 2.0, 2.0),
        ));

        World {
            objects: vec![outer, inner],
            lights: vec![Default::default()],
        }
    }
}

impl World {
    /// Creates the default world with two spheres.
    pub fn new() -> World {
        Default::default()
    }

    /// Creates a world with no objects and no lights.
    pub fn empty() -> World {
        World { objects: Vec::new(), lights: Vec::new() }
    }

    /// Intersects a ray against all objects in a world.
    ///
    /// The result is sorted by ascending `t`.
    pub fn intersect(&self, r: &Ray4D) -> Intersections {
        self.objects.iter()
            .flat_map(|obj| obj.intersect(r))
            .collect()
    }

    /// Whether anything lies between `p` and `light`.
    ///
    /// Occluders block light completely, whatever their transparency.
    pub fn is_shadowed(&self, light: &PointLight, p: Tuple4D) -> bool {
        let v = light.position - p;
        let distance = v.magnitude();

        let r = Ray4D::new(p, v.normalize());
        match self.intersect(&r).hit() {
            Some(i) => i.t < distance,
            None => false,
        }
    }

    /// Calculates the color at a prepared hit.
    ///
    /// Direct lighting from every light is summed, then reflected and
    /// refracted light are added. A surface that is both reflective and
    /// transparent weights the two by its Fresnel reflectance instead.
    pub fn shade_hit(&self, comps: &IntersectionComputation, remaining: usize)
        -> Color {
        let material = comps.obj.material();

        let surface: Color = self.lights.iter()
            .map(|light| material.lighting(
                comps.obj,
                light,
                comps.over_point,
                comps.eyev,
                comps.normalv,
                self.is_shadowed(light, comps.far_over_point),
            ))
            .sum();

        let reflected = self.reflected_color(comps, remaining);
        let refracted = self.refracted_color(comps, remaining);

        if material.reflective > 0.0 && material.transparency > 0.0 {
            let reflectance = comps.schlick();
            surface + reflected * reflectance + refracted * (1.0 - reflectance)
        } else {
            surface + reflected + refracted
        }
    }

    /// Determines the color seen along a ray.
    ///
    /// `remaining` bounds how many more reflection or refraction bounces may
    /// be followed. A ray that hits nothing is black.
    pub fn color_at(&self, r: &Ray4D, remaining: usize) -> Color {
        let xs = self.intersect(r);

        match xs.hit() {
            None => Color::black(),
            Some(hit) => {
                let comps = IntersectionComputation::new(r, &hit, Some(&xs));
                self.shade_hit(&comps, remaining)
            },
        }
    }

    /// The color contributed by a mirror reflection at a hit.
    pub fn reflected_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let reflective = comps.obj.material().reflective;
        if reflective.abs() < EPSILON || remaining == 0 {
            return Color::black();
        }

        let r = Ray4D::new(comps.over_point, comps.reflectv);
        self.color_at(&r, remaining - 1) * reflective
    }

    /// The color contributed by light passing through a transparent hit.
    ///
    /// Black under total internal reflection; that light is accounted for by
    /// the reflected color.
    pub fn refracted_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let transparency = comps.obj.material().transparency;
        if transparency.abs() < EPSILON || remaining == 0 {
            return Color::black();
        }

        // Snell's law
        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = n_ratio.powi(2) * (1.0 - cos_i.powi(2));
        if sin2_t > 1.0 {
            return Color::black();
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (n_ratio * cos_i - cos_t)
            - comps.eyev * n_ratio;

        let r = Ray4D::new(comps.under_point, direction);
        self.color_at(&r, remaining - 1) * transparency
    }
}

#[cfg(test)]
fn assert_color_near(actual: Color, expected: Color) {
    let close = |a: f64, b: f64| (a - b).abs() < 1e-3;
    assert!(close(actual.r, expected.r)
        && close(actual.g, expected.g)
        && close(actual.b, expected.b),
        "{:?} is not close to {:?}", actual, expected);
}

#[test]
fn default_world_contents() {
    let w = World::new();

    assert_eq!(w.lights, vec![PointLight::new(Color::white(),
        Tuple4D::point(-10.0, 10.0, -10.0)).unwrap()]);
    assert_eq!(w.objects.len(), 2);
    assert_eq!(w.objects[0].material().color, Color::rgb(0.8, 1.0, 0.6));
    assert_eq!(w.objects[1].transform().matrix(),
        Matrix4D::scaling(0.5, 0.5, 0.5));
    assert_eq!(*w.objects[1].transform(),
        Transform::new(Matrix4D::scaling(0.5, 0.5, 0.5)).unwrap());
}

#[test]
fn intersect_default_world_with_ray() {
    let w = World::new();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    let xs = w.intersect(&r);
    assert_eq!(xs.len(), 4);
    for (i, t) in xs.iter().zip([4.0, 4.5, 5.5, 6.0]) {
        assert!(crate::feq(i.t, t), "expected {} found {}", t, i.t);
    }
}

#[test]
fn shade_intersection_from_outside() {
    use crate::intersect::Intersection;

    let w = World::new();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(4.0, &w.objects[0]);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(w.shade_hit(&comps, 5), Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn shade_intersection_from_inside() {
    use crate::intersect::Intersection;

    let mut w = World::new();
    w.lights = vec![PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.25, 0.0)).unwrap()];

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(0.5, &w.objects[1]);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(w.shade_hit(&comps, 5), Color::rgb(0.90498, 0.90498, 0.90498));
}

#[test]
fn shade_intersection_in_shadow() {
    use crate::intersect::Intersection;

    let mut w = World::empty();
    w.lights.push(PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0)).unwrap());
    w.objects.push(Shape::sphere());
    w.objects.push(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 10.0)).unwrap());

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(4.0, &w.objects[1]);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(w.shade_hit(&comps, 5), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn lights_contribute_additively() {
    use crate::intersect::Intersection;

    let mut w = World::new();
    let light = w.lights[0];
    w.lights.push(light);

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(4.0, &w.objects[0]);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(w.shade_hit(&comps, 5),
        Color::rgb(0.38066, 0.47583, 0.2855) * 2.0);
}

#[test]
fn color_when_ray_misses_or_hits() {
    let w = World::new();

    let miss = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(w.color_at(&miss, 5), Color::black());

    let hit = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(w.color_at(&hit, 5), Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn color_with_intersection_behind_ray() {
    let mut w = World::new();
    w.objects[0].material_mut().ambient = 1.0;
    w.objects[1].material_mut().ambient = 1.0;

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.75),
        Tuple4D::vector(0.0, 0.0, -1.0));

    assert_eq!(w.color_at(&r, 5), w.objects[1].material().color);
}

#[test]
fn shadow_tests_against_default_light() {
    let w = World::new();
    let light = w.lights[0];

    // Nothing collinear with the point and the light
    assert!(!w.is_shadowed(&light, Tuple4D::point(0.0, 10.0, 0.0)));
    // The spheres sit between the point and the light
    assert!(w.is_shadowed(&light, Tuple4D::point(10.0, -10.0, 10.0)));
    // The object is behind the light
    assert!(!w.is_shadowed(&light, Tuple4D::point(-20.0, 20.0, -20.0)));
    // The object is behind the point
    assert!(!w.is_shadowed(&light, Tuple4D::point(-2.0, 2.0, -2.0)));
}

#[test]
fn transparent_occluders_still_cast_shadows() {
    let mut w = World::empty();
    let light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 10.0, 0.0)).unwrap();
    w.lights.push(light);
    w.objects.push(Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 5.0, 0.0)).unwrap());

    assert!(w.is_shadowed(&light, Tuple4D::point(0.0, 0.0, 0.0)));
}

#[test]
fn reflected_color_for_nonreflective_material() {
    use crate::intersect::Intersection;

    let mut w = World::new();
    w.objects[1].material_mut().ambient = 1.0;

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(1.0, &w.objects[1]);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(w.reflected_color(&comps, 5), Color::black());
}

#[cfg(test)]
fn world_with_reflective_floor() -> World {
    let mut w = World::new();
    w.objects.push(Shape::plane()
        .with_material(Material { reflective: 0.5, ..Default::default() })
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0))
        .unwrap());
    w
}

#[test]
fn reflected_color_for_reflective_material() {
    use crate::intersect::Intersection;

    let w = world_with_reflective_floor();
    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -h, h));
    let i = Intersection::new(2.0f64.sqrt(), &w.objects[2]);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_color_near(w.reflected_color(&comps, 5),
        Color::rgb(0.19032, 0.2379, 0.14274));
    assert_color_near(w.shade_hit(&comps, 5),
        Color::rgb(0.87677, 0.92436, 0.82918));
}

#[test]
fn reflected_color_at_maximum_depth() {
    use crate::intersect::Intersection;

    let w = world_with_reflective_floor();
    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -h, h));
    let i = Intersection::new(2.0f64.sqrt(), &w.objects[2]);

    let comps = IntersectionComputation::new(&r, &i, None);
    assert_eq!(w.reflected_color(&comps, 0), Color::black());
}

#[test]
fn mutually_reflective_surfaces_terminate() {
    let mirror = Material { reflective: 1.0, ..Default::default() };

    let mut w = World::empty();
    w.lights.push(PointLight::new(Color::white(), Tuple4D::origin()).unwrap());
    w.objects.push(Shape::plane()
        .with_material(mirror)
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0))
        .unwrap());
    w.objects.push(Shape::plane()
        .with_material(mirror)
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0))
        .unwrap());

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 1.0, 0.0));
    let c = w.color_at(&r, 10);
    assert!(c.r.is_finite() && c.g.is_finite() && c.b.is_finite());
}

#[test]
fn refracted_color_with_opaque_surface() {
    let w = World::new();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = w.intersect(&r);

    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));
    assert_eq!(w.refracted_color(&comps, 5), Color::black());
}

#[test]
fn refracted_color_at_maximum_depth() {
    let mut w = World::new();
    {
        let mut m = w.objects[0].material_mut();
        m.transparency = 1.0;
        m.refractive_index = 1.5;
    }

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = w.intersect(&r);

    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));
    assert_eq!(w.refracted_color(&comps, 0), Color::black());
}

#[test]
fn refracted_color_under_total_internal_reflection() {
    use crate::intersect::Intersection;

    let mut w = World::new();
    {
        let mut m = w.objects[0].material_mut();
        m.transparency = 1.0;
        m.refractive_index = 1.5;
    }

    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, h),
        Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-h, &w.objects[0]),
        Intersection::new(h, &w.objects[0]),
    ].into();

    let comps = IntersectionComputation::new(&r, &xs[1], Some(&xs));
    assert_eq!(w.refracted_color(&comps, 5), Color::black());
}

#[test]
fn refracted_color_with_refracted_ray() {
    use crate::intersect::Intersection;
    use crate::pattern::Pattern;

    let mut w = World::new();
    {
        let mut a = w.objects[0].material_mut();
        a.ambient = 1.0;
        a.pattern = Some(Pattern::test());
    }
    {
        let mut b = w.objects[1].material_mut();
        b.transparency = 1.0;
        b.refractive_index = 1.5;
    }

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 0.1),
        Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-0.9899, &w.objects[0]),
        Intersection::new(-0.4899, &w.objects[1]),
        Intersection::new(0.4899, &w.objects[1]),
        Intersection::new(0.9899, &w.objects[0]),
    ].into();

    let comps = IntersectionComputation::new(&r, &xs[2], Some(&xs));
    assert_color_near(w.refracted_color(&comps, 5),
        Color::rgb(0.0, 0.99888, 0.04725));
}

#[cfg(test)]
fn world_with_glass_floor(floor: Material) -> World {
    let mut w = World::new();
    w.objects.push(Shape::plane()
        .with_material(floor)
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0))
        .unwrap());
    w.objects.push(Shape::sphere()
        .with_material(Material {
            color: Color::red(),
            ambient: 0.5,
            ..Default::default()
        })
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5))
        .unwrap());
    w
}

#[test]
fn shade_hit_with_transparent_material() {
    use crate::intersect::Intersection;

    let w = world_with_glass_floor(Material {
        transparency: 0.5,
        refractive_index: 1.5,
        ..Default::default()
    });

    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -h, h));
    let xs: Intersections =
        vec![Intersection::new(2.0f64.sqrt(), &w.objects[2])].into();

    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));
    assert_color_near(w.shade_hit(&comps, 5),
        Color::rgb(0.93642, 0.68642, 0.68642));
}

#[test]
fn shade_hit_with_reflective_transparent_material() {
    use crate::intersect::Intersection;

    let w = world_with_glass_floor(Material {
        reflective: 0.5,
        transparency: 0.5,
        refractive_index: 1.5,
        ..Default::default()
    });

    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -h, h));
    let xs: Intersections =
        vec![Intersection::new(2.0f64.sqrt(), &w.objects[2])].into();

    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));
    assert_color_near(w.shade_hit(&comps, 5),
        Color::rgb(0.93391, 0.69643, 0.69243));
}
