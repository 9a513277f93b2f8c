pub mod consts;
pub mod error;

pub mod tuple;
pub mod matrix;
pub mod transform;
pub mod ray;

pub mod color;
pub mod light;
pub mod pattern;
pub mod material;

pub mod shape;
pub mod intersect;
pub mod world;
pub mod camera;

pub mod render;
pub mod canvas;
pub mod scene;

use consts::FEQ_EPSILON;

/// Approximate float equality, used by every `PartialEq` in the crate.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
