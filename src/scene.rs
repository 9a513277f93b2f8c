//! JSON scene descriptions.
//!
//! A scene names a camera, a list of lights, optional named materials and a
//! list of shapes. Transforms are lists of operations applied in the order
//! they are written, so `[{"scale": [2, 2, 2]}, {"translate": [0, 1, 0]}]`
//! scales first and then moves the result up. Angles are in radians.
//!
//! Colors are `[r, g, b]` arrays of linear components, or `{"srgb": [r, g, b]}`
//! for sRGB-encoded values. A shape's `material` is either the name of an
//! entry in `materials` (shapes naming the same entry share it) or an inline
//! material.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{ debug, warn };
use serde::Deserialize;

use crate::consts::DEFAULT_MAX_REFLECTIONS;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::color::Color;
use crate::light::PointLight;
use crate::pattern::{ Pattern, PatternKind };
use crate::material::{ Material, SharedMaterial };
use crate::shape::Shape;
use crate::world::World;
use crate::camera::Camera;
use crate::error::{ Result, TracerError };

const DEMO_SCENE: &str = include_str!("../scenes/demo.json");

/// A world together with the camera that views it.
#[derive(Clone, Debug)]
pub struct Scene {
    pub world: World,
    pub camera: Camera,
    pub max_reflections: usize,
}

impl Scene {
    /// Parses a scene from a JSON document.
    pub fn from_json(json: &str) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(json)?;
        scene_json.try_into()
    }

    /// Reads and parses the scene file at `path`.
    pub fn load(path: &Path) -> Result<Scene> {
        debug!("loading scene from {}", path.display());
        Scene::from_json(&fs::read_to_string(path)?)
    }

    /// The built-in demo: a checkered floor under a sheet of water, striped
    /// and ringed walls, a gradient sphere, a glass sphere and a capped cone.
    pub fn demo() -> Result<Scene> {
        Scene::from_json(DEMO_SCENE)
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = TracerError;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        let camera = scene_json.camera.build()?;

        // Named materials are built once and shared by every shape using them
        let mut materials = HashMap::new();
        for (name, material_json) in scene_json.materials {
            let material = material_json.build().map_err(|e| {
                warn!("material {:?} rejected: {}", name, e);
                e
            })?;
            materials.insert(name, SharedMaterial::new(material));
        }

        let mut world = World::empty();
        world.lights = scene_json.lights.iter()
            .map(LightJson::build)
            .collect::<Result<_>>()?;

        for (i, shape_json) in scene_json.shapes.into_iter().enumerate() {
            let shape = shape_json.build(&materials).map_err(|e| {
                warn!("shape {} rejected: {}", i, e);
                e
            })?;
            world.objects.push(shape);
        }

        if world.lights.is_empty() {
            warn!("scene has no lights; only ambient light will be visible");
        }

        debug!("built scene with {} shapes, {} lights and {} materials",
            world.objects.len(), world.lights.len(), materials.len());

        Ok(Scene {
            world,
            camera,
            max_reflections: scene_json.max_reflections
                .unwrap_or(DEFAULT_MAX_REFLECTIONS),
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneJson {
    camera: CameraJson,
    #[serde(default)]
    lights: Vec<LightJson>,
    #[serde(default)]
    materials: HashMap<String, MaterialJson>,
    #[serde(default)]
    shapes: Vec<ShapeJson>,
    max_reflections: Option<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CameraJson {
    width: usize,
    height: usize,
    field_of_view: f64,
    from: [f64; 3],
    to: [f64; 3],
    up: [f64; 3],
}

impl CameraJson {
    fn build(&self) -> Result<Camera> {
        let [fx, fy, fz] = self.from;
        let [tx, ty, tz] = self.to;
        let [ux, uy, uz] = self.up;

        let mut camera = Camera::new(self.width, self.height,
            self.field_of_view)?;
        camera.look_at(
            Tuple4D::point(fx, fy, fz),
            Tuple4D::point(tx, ty, tz),
            Tuple4D::vector(ux, uy, uz),
        )?;

        Ok(camera)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LightJson {
    intensity: ColorJson,
    position: [f64; 3],
}

impl LightJson {
    fn build(&self) -> Result<PointLight> {
        let [x, y, z] = self.position;
        PointLight::new(self.intensity.into(), Tuple4D::point(x, y, z))
    }
}

#[derive(Copy, Clone, Deserialize)]
#[serde(untagged)]
enum ColorJson {
    Linear([f64; 3]),
    Srgb { srgb: [f64; 3] },
}

impl From<ColorJson> for Color {
    fn from(c: ColorJson) -> Color {
        match c {
            ColorJson::Linear([r, g, b]) => Color::rgb(r, g, b),
            ColorJson::Srgb { srgb: [r, g, b] } => Color::from_srgb(r, g, b),
        }
    }
}

/// One step of a transform list.
#[derive(Copy, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TransformOp {
    Translate([f64; 3]),
    Scale([f64; 3]),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    /// `[xy, xz, yx, yz, zx, zy]`
    Shear([f64; 6]),
}

impl TransformOp {
    fn matrix(&self) -> Matrix4D {
        match *self {
            TransformOp::Translate([x, y, z]) => Matrix4D::translation(x, y, z),
            TransformOp::Scale([x, y, z]) => Matrix4D::scaling(x, y, z),
            TransformOp::RotateX(r) => Matrix4D::rotation_x(r),
            TransformOp::RotateY(r) => Matrix4D::rotation_y(r),
            TransformOp::RotateZ(r) => Matrix4D::rotation_z(r),
            TransformOp::Shear([xy, xz, yx, yz, zx, zy]) =>
                Matrix4D::shearing(xy, xz, yx, yz, zx, zy),
        }
    }
}

/// Composes operations so the first one listed is applied first.
fn compose(ops: &[TransformOp]) -> Matrix4D {
    ops.iter().fold(Matrix4D::identity(), |m, op| op.matrix() * m)
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PatternKindJson {
    Solid { color: ColorJson },
    Stripe { a: ColorJson, b: ColorJson },
    Gradient { a: ColorJson, b: ColorJson },
    Ring { a: ColorJson, b: ColorJson },
    Checker { a: ColorJson, b: ColorJson },
    Test,
}

#[derive(Deserialize)]
struct PatternJson {
    #[serde(flatten)]
    kind: PatternKindJson,
    #[serde(default)]
    transform: Vec<TransformOp>,
}

impl PatternJson {
    fn build(&self) -> Result<Pattern> {
        let kind = match self.kind {
            PatternKindJson::Solid { color } => PatternKind::Solid(color.into()),
            PatternKindJson::Stripe { a, b } =>
                PatternKind::Stripe(a.into(), b.into()),
            PatternKindJson::Gradient { a, b } =>
                PatternKind::Gradient(a.into(), b.into()),
            PatternKindJson::Ring { a, b } =>
                PatternKind::Ring(a.into(), b.into()),
            PatternKindJson::Checker { a, b } =>
                PatternKind::Checker(a.into(), b.into()),
            PatternKindJson::Test => PatternKind::Test,
        };

        Pattern::from(kind).with_transform(compose(&self.transform))
    }
}

/// Material fields left out keep the defaults of `base`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MaterialJson {
    color: Option<ColorJson>,
    pattern: Option<PatternJson>,
    ambient: Option<f64>,
    diffuse: Option<f64>,
    specular: Option<f64>,
    shininess: Option<f64>,
    reflective: Option<f64>,
    transparency: Option<f64>,
    refractive_index: Option<f64>,
}

impl MaterialJson {
    fn build(&self) -> Result<Material> {
        self.build_over(Default::default())
    }

    fn build_over(&self, base: Material) -> Result<Material> {
        let pattern = match &self.pattern {
            Some(p) => Some(p.build()?),
            None => base.pattern,
        };

        let material = Material {
            color: self.color.map_or(base.color, Color::from),
            pattern,
            ambient: self.ambient.unwrap_or(base.ambient),
            diffuse: self.diffuse.unwrap_or(base.diffuse),
            specular: self.specular.unwrap_or(base.specular),
            shininess: self.shininess.unwrap_or(base.shininess),
            reflective: self.reflective.unwrap_or(base.reflective),
            transparency: self.transparency.unwrap_or(base.transparency),
            refractive_index: self.refractive_index
                .unwrap_or(base.refractive_index),
        };

        material.validate()?;
        Ok(material)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaterialRef {
    Named(String),
    Inline(MaterialJson),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeKindJson {
    Sphere,
    GlassSphere,
    Plane,
    Cube,
    Cylinder {
        minimum: Option<f64>,
        maximum: Option<f64>,
        #[serde(default)]
        closed: bool,
    },
    Cone {
        minimum: Option<f64>,
        maximum: Option<f64>,
        #[serde(default)]
        closed: bool,
    },
}

#[derive(Deserialize)]
struct ShapeJson {
    #[serde(flatten)]
    kind: ShapeKindJson,
    #[serde(default)]
    transform: Vec<TransformOp>,
    material: Option<MaterialRef>,
}

impl ShapeJson {
    fn build(self, materials: &HashMap<String, SharedMaterial>)
        -> Result<Shape> {
        let shape = match self.kind {
            ShapeKindJson::Sphere => Shape::sphere(),
            ShapeKindJson::GlassSphere => Shape::glass_sphere(),
            ShapeKindJson::Plane => Shape::plane(),
            ShapeKindJson::Cube => Shape::cube(),
            ShapeKindJson::Cylinder { minimum, maximum, closed } => {
                let (minimum, maximum) = bounds(minimum, maximum)?;
                Shape::bounded_cylinder(minimum, maximum, closed)
            },
            ShapeKindJson::Cone { minimum, maximum, closed } => {
                let (minimum, maximum) = bounds(minimum, maximum)?;
                Shape::bounded_cone(minimum, maximum, closed)
            },
        };

        // Inline materials refine the shape's own defaults (glass stays glass)
        let shape = match self.material {
            None => shape,
            Some(MaterialRef::Named(name)) => {
                let shared = materials.get(&name).ok_or_else(|| {
                    TracerError::Scene(format!("unknown material {:?}", name))
                })?;
                shape.with_shared_material(shared.clone())
            },
            Some(MaterialRef::Inline(m)) => {
                let material = m.build_over(shape.material())?;
                shape.with_material(material)
            },
        };

        shape.with_transform(compose(&self.transform))
    }
}

fn bounds(minimum: Option<f64>, maximum: Option<f64>) -> Result<(f64, f64)> {
    let minimum = minimum.unwrap_or(f64::NEG_INFINITY);
    let maximum = maximum.unwrap_or(f64::INFINITY);

    if minimum > maximum {
        return Err(TracerError::Scene(format!(
            "minimum {} is above maximum {}", minimum, maximum
        )));
    }

    Ok((minimum, maximum))
}

#[cfg(test)]
const MINIMAL_SCENE: &str = r#"{
    "camera": {
        "width": 11, "height": 11, "field_of_view": 1.5707963267948966,
        "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
    },
    "lights": [{ "intensity": [1, 1, 1], "position": [-10, 10, -10] }],
    "shapes": [
        {
            "type": "sphere",
            "material": { "color": [0.8, 1.0, 0.6], "diffuse": 0.7,
                "specular": 0.2 }
        },
        { "type": "sphere", "transform": [{ "scale": [0.5, 0.5, 0.5] }] }
    ]
}"#;

#[test]
fn minimal_scene_matches_default_world() {
    let scene = Scene::from_json(MINIMAL_SCENE).unwrap();
    let ray = scene.camera.ray_for_pixel(5, 5);

    assert_eq!(scene.max_reflections, DEFAULT_MAX_REFLECTIONS);
    assert_eq!(scene.world.objects.len(), 2);
    assert_eq!(scene.world.color_at(&ray, scene.max_reflections),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn transforms_apply_in_listed_order() {
    let ops = [
        TransformOp::RotateX(std::f64::consts::PI / 2.0),
        TransformOp::Scale([5.0, 5.0, 5.0]),
        TransformOp::Translate([10.0, 5.0, 7.0]),
    ];

    let p = compose(&ops) * Tuple4D::point(1.0, 0.0, 1.0);
    assert_eq!(p, Tuple4D::point(15.0, 0.0, 7.0));
    assert_eq!(compose(&[]), Matrix4D::identity());
}

#[test]
fn named_materials_are_shared() {
    let json = r#"{
        "camera": { "width": 4, "height": 4, "field_of_view": 1.0,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "materials": {
            "glass": { "transparency": 1.0, "refractive_index": 1.5 }
        },
        "shapes": [
            { "type": "sphere", "material": "glass" },
            { "type": "cube", "material": "glass" },
            { "type": "plane" }
        ]
    }"#;

    let scene = Scene::from_json(json).unwrap();
    let objects = &scene.world.objects;

    assert!(objects[0].shared_material().ptr_eq(objects[1].shared_material()));
    assert!(!objects[0].shared_material().ptr_eq(objects[2].shared_material()));

    objects[0].shared_material().write().reflective = 0.5;
    assert_eq!(objects[1].material().reflective, 0.5);
}

#[test]
fn inline_material_refines_glass_sphere() {
    let json = r#"{
        "camera": { "width": 4, "height": 4, "field_of_view": 1.0,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "shapes": [
            { "type": "glass_sphere", "material": { "color": [0, 0, 0] } }
        ]
    }"#;

    let scene = Scene::from_json(json).unwrap();
    let m = scene.world.objects[0].material();

    assert_eq!(m.color, Color::black());
    assert_eq!(m.transparency, 1.0);
    assert_eq!(m.refractive_index, 1.5);
}

#[test]
fn conic_bounds_and_patterns() {
    let json = r#"{
        "camera": { "width": 4, "height": 4, "field_of_view": 1.0,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "shapes": [
            { "type": "cone", "minimum": -1, "maximum": 1, "closed": true },
            { "type": "cylinder" },
            {
                "type": "plane",
                "material": { "pattern": {
                    "type": "stripe", "a": [1, 1, 1], "b": { "srgb": [0, 0, 0] },
                    "transform": [{ "scale": [2, 1, 1] }]
                } }
            }
        ]
    }"#;

    let scene = Scene::from_json(json).unwrap();
    let objects = &scene.world.objects;

    assert_eq!(objects[0].kind, crate::shape::ShapeKind::Cone(
        crate::shape::Conic { minimum: -1.0, maximum: 1.0, closed: true }));
    assert_eq!(objects[1].kind, crate::shape::ShapeKind::Cylinder(
        Default::default()));

    let plane = &objects[2];
    let pattern = plane.material().pattern.unwrap();
    assert_eq!(pattern.pattern_at_shape(plane, Tuple4D::point(1.5, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at_shape(plane, Tuple4D::point(2.5, 0.0, 0.0)),
        Color::black());
}

#[test]
fn malformed_scenes_are_rejected() {
    let camera = r#""camera": { "width": 4, "height": 4, "field_of_view": 1.0,
        "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] }"#;

    let cases = [
        format!(r#"{{ {}, "shapes": [{{ "type": "torus" }}] }}"#, camera),
        format!(r#"{{ {}, "shapes": [{{ "type": "sphere",
            "material": "missing" }}] }}"#, camera),
        format!(r#"{{ {}, "shapes": [{{ "type": "sphere",
            "material": {{ "ambient": 2.0 }} }}] }}"#, camera),
        format!(r#"{{ {}, "shapes": [{{ "type": "sphere",
            "transform": [{{ "scale": [0, 1, 1] }}] }}] }}"#, camera),
        format!(r#"{{ {}, "shapes": [{{ "type": "cone",
            "minimum": 2, "maximum": 1 }}] }}"#, camera),
        r#"{ "camera": { "width": 0, "height": 4, "field_of_view": 1.0,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] } }"#
            .to_string(),
        r#"{ "camera": { "width": 4, "height": 4, "field_of_view": 1.0,
            "from": [1, 2, 3], "to": [1, 2, 3], "up": [0, 1, 0] } }"#
            .to_string(),
        r#"{ "camera": { "width": 4, "height": 4, "field_of_view": 1.0,
            "from": [0, 0, 0], "to": [0, 5, 0], "up": [0, 1, 0] } }"#
            .to_string(),
        "not json".to_string(),
    ];

    for case in cases.iter() {
        assert!(Scene::from_json(case).is_err(), "accepted: {}", case);
    }
}

#[test]
fn demo_scene_loads() {
    let scene = Scene::demo().unwrap();

    assert_eq!(scene.world.objects.len(), 7);
    assert_eq!(scene.world.lights.len(), 3);
    assert!(crate::feq(scene.camera.field_of_view(),
        std::f64::consts::PI / 3.0));

    // The glass sphere keeps its glass after being tinted black
    let glass = scene.world.objects[5].material();
    assert_eq!(glass.color, Color::black());
    assert_eq!(glass.transparency, 1.0);

    // The camera sees something other than the background
    let ray = scene.camera.ray_for_pixel(scene.camera.hsize() / 2,
        scene.camera.vsize() / 2);
    assert_ne!(scene.world.color_at(&ray, scene.max_reflections),
        Color::black());
}
