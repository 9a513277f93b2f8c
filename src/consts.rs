// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Offset along the surface normal for secondary rays. Keeps a ray from
// intersecting the surface it was spawned from.
pub const EPSILON: f64 = 0.00001;

// Shadow rays start further from the surface than reflection rays.
pub const SHADOW_EPSILON: f64 = 0.001;

// Maximum recursion depth for reflection and refraction
pub const DEFAULT_MAX_REFLECTIONS: usize = 5;

// Default render parameters
pub const DEFAULT_OUT_FILE: &str = "./out.ppm";

// Common refraction indices
pub const VACUUM_RI: f64 = 1.0;
pub const AIR_RI: f64 = 1.00029;
pub const WATER_RI: f64 = 1.333;
pub const GLASS_RI: f64 = 1.5;
pub const DIAMOND_RI: f64 = 2.417;
