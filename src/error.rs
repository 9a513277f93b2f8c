//! Error types for the ray tracer.

use thiserror::Error;

/// Errors raised while configuring or running the ray tracer.
///
/// Geometry queries never produce errors; a ray that misses everything simply
/// yields no intersections. Only invalid configuration (a transform that cannot
/// be inverted, a material outside its valid ranges, a malformed scene) and
/// host-level failures are reported here.
#[derive(Error, Debug)]
pub enum TracerError {
    /// A transform could not be inverted.
    #[error("matrix is not invertible (determinant {0})")]
    NotInvertible(f64),

    /// A tuple with `w != 1` was given where a point is required.
    #[error("expected a point, found a tuple with w = {0}")]
    NotAPoint(f64),

    /// A tuple with `w != 0` was given where a vector is required.
    #[error("expected a vector, found a tuple with w = {0}")]
    NotAVector(f64),

    /// A material parameter is outside its valid range.
    #[error("material {field} is out of range: {value}")]
    InvalidMaterial { field: &'static str, value: f64 },

    /// Camera dimensions or field of view are unusable.
    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    /// The scene description is malformed.
    #[error("invalid scene: {0}")]
    Scene(String),

    #[error("failed to parse scene description: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A background render thread panicked before finishing.
    #[error("render thread panicked")]
    RenderPanicked,
}

/// Result type for ray tracer operations.
pub type Result<T> = std::result::Result<T, TracerError>;
