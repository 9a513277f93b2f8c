use std::f64::consts::PI;

use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::error::{ Result, TracerError };

/// A camera record for generating an image.
///
/// The camera sits at the origin of its own space looking down negative Z at
/// an image plane one unit away. `transform` is the world-to-camera transform,
/// usually a view transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    hsize: usize,
    vsize: usize,
    field_of_view: f64,
    transform: Transform,

    half_width: f64,
    half_height: f64,
    pixel_size: f64,
}

impl Camera {
    /// Creates a camera producing `hsize` by `vsize` pixels.
    ///
    /// Fails if either dimension is zero or `field_of_view` (in radians) is
    /// not strictly between `0` and `π`.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64)
        -> Result<Camera> {
        let mut camera = Camera {
            hsize,
            vsize,
            field_of_view,
            transform: Default::default(),
            half_width: 0.0,
            half_height: 0.0,
            pixel_size: 0.0,
        };

        camera.update()?;
        Ok(camera)
    }

    pub fn hsize(&self) -> usize {
        self.hsize
    }

    pub fn vsize(&self) -> usize {
        self.vsize
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Changes the output size. On error the camera is left unchanged.
    pub fn set_dimensions(&mut self, hsize: usize, vsize: usize) -> Result<()> {
        let previous = (self.hsize, self.vsize);
        self.hsize = hsize;
        self.vsize = vsize;

        if let Err(e) = self.update() {
            (self.hsize, self.vsize) = previous;
            return Err(e);
        }

        Ok(())
    }

    /// Changes the field of view. On error the camera is left unchanged.
    pub fn set_field_of_view(&mut self, field_of_view: f64) -> Result<()> {
        let previous = self.field_of_view;
        self.field_of_view = field_of_view;

        if let Err(e) = self.update() {
            self.field_of_view = previous;
            return Err(e);
        }

        Ok(())
    }

    /// Replaces the world-to-camera transform.
    pub fn set_transform(&mut self, m: Matrix4D) -> Result<()> {
        self.transform = Transform::new(m)?;
        Ok(())
    }

    /// Points the camera from `from` towards `to`.
    ///
    /// `from` and `to` must be distinct finite points and `up` a finite
    /// vector that is not parallel to the line of sight.
    pub fn look_at(&mut self, from: Tuple4D, to: Tuple4D, up: Tuple4D)
        -> Result<()> {
        let from = from.expect_point()?;
        let to = to.expect_point()?;
        let up = up.expect_vector()?;

        let finite = |t: Tuple4D| {
            t.x.is_finite() && t.y.is_finite() && t.z.is_finite()
        };
        if !(finite(from) && finite(to) && finite(up)) {
            return Err(TracerError::InvalidCamera(
                "view parameters must be finite".to_string()
            ));
        }

        let forward = (to - from).try_normalize().ok_or_else(|| {
            TracerError::InvalidCamera("eye and target coincide".to_string())
        })?;
        let up_dir = up.try_normalize().ok_or_else(|| {
            TracerError::InvalidCamera("up vector is zero".to_string())
        })?;
        if forward.cross(&up_dir).try_normalize().is_none() {
            return Err(TracerError::InvalidCamera(
                "up vector is parallel to the line of sight".to_string()
            ));
        }

        self.set_transform(Matrix4D::view_transform(from, to, up))
    }

    /// Recomputes the image plane from the size and field of view.
    fn update(&mut self) -> Result<()> {
        if self.hsize == 0 || self.vsize == 0 {
            return Err(TracerError::InvalidCamera(format!(
                "image size {}x{} is empty", self.hsize, self.vsize
            )));
        }

        if !(self.field_of_view > 0.0 && self.field_of_view < PI) {
            return Err(TracerError::InvalidCamera(format!(
                "field of view {} is outside (0, π)", self.field_of_view
            )));
        }

        let half_view = (self.field_of_view / 2.0).tan();
        let aspect = (self.hsize as f64) / (self.vsize as f64);

        if aspect >= 1.0 {
            self.half_width = half_view;
            self.half_height = half_view / aspect;
        } else {
            self.half_width = half_view * aspect;
            self.half_height = half_view;
        }

        self.pixel_size = self.half_width * 2.0 / (self.hsize as f64);
        Ok(())
    }

    /// Builds the world-space ray through the center of pixel `(px, py)`.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray4D {
        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // The camera looks toward -z, so +x is to the *left*
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        let pixel = self.transform
            .to_local(Tuple4D::point(world_x, world_y, -1.0));
        let origin = self.transform.to_local(Tuple4D::origin());
        let direction = (pixel - origin).normalize();

        Ray4D::new(origin, direction)
    }
}

#[test]
fn pixel_size_for_horizontal_and_vertical_canvas() {
    let horizontal = Camera::new(200, 125, PI / 2.0).unwrap();
    assert!(crate::feq(horizontal.pixel_size(), 0.01));

    let vertical = Camera::new(125, 200, PI / 2.0).unwrap();
    assert!(crate::feq(vertical.pixel_size(), 0.01));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, PI / 2.0).unwrap();
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, PI / 2.0).unwrap();
    let r = c.ray_for_pixel(0, 0);

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_when_camera_transformed() {
    let mut c = Camera::new(201, 101, PI / 2.0).unwrap();
    c.set_transform(Matrix4D::rotation_y(PI / 4.0)
        * Matrix4D::translation(0.0, -2.0, 5.0)).unwrap();
    let r = c.ray_for_pixel(100, 50);

    let h = 2.0f64.sqrt() / 2.0;
    assert_eq!(r.origin, Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction, Tuple4D::vector(h, 0.0, -h));
}

#[test]
fn invalid_cameras_are_rejected() {
    assert!(Camera::new(0, 10, PI / 2.0).is_err());
    assert!(Camera::new(10, 0, PI / 2.0).is_err());
    assert!(Camera::new(10, 10, 0.0).is_err());
    assert!(Camera::new(10, 10, PI).is_err());
}

#[test]
fn failed_updates_keep_previous_state() {
    let mut c = Camera::new(160, 120, PI / 3.0).unwrap();
    let before = c.clone();

    assert!(c.set_dimensions(0, 120).is_err());
    assert!(c.set_field_of_view(-1.0).is_err());
    assert!(c.set_transform(Matrix4D::scaling(0.0, 0.0, 0.0)).is_err());
    assert_eq!(c, before);

    c.set_dimensions(320, 240).unwrap();
    assert_eq!((c.hsize(), c.vsize()), (320, 240));
    assert!(crate::feq(c.pixel_size() * 2.0, before.pixel_size()));
}

#[test]
fn look_at_checks_tags() {
    let mut c = Camera::new(10, 10, PI / 2.0).unwrap();

    assert!(c.look_at(Tuple4D::vector(0.0, 0.0, -5.0), Tuple4D::origin(),
        Tuple4D::vector(0.0, 1.0, 0.0)).is_err());
    assert!(c.look_at(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::origin(),
        Tuple4D::point(0.0, 1.0, 0.0)).is_err());

    c.look_at(Tuple4D::point(0.0, 0.0, 8.0), Tuple4D::origin(),
        Tuple4D::vector(0.0, 1.0, 0.0)).unwrap();
    assert_eq!(c.transform().matrix(), Matrix4D::translation(0.0, 0.0, -8.0));
}

#[test]
fn degenerate_view_is_rejected() {
    let mut c = Camera::new(10, 10, PI / 2.0).unwrap();
    let before = c.clone();
    let p = Tuple4D::point(1.0, 2.0, 3.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    // Eye on top of the target
    assert!(matches!(c.look_at(p, p, up),
        Err(TracerError::InvalidCamera(_))));

    // Looking straight up or down the up vector
    let above = Tuple4D::point(0.0, 5.0, 0.0);
    let below = Tuple4D::point(0.0, -5.0, 0.0);
    assert!(matches!(c.look_at(Tuple4D::origin(), above, up),
        Err(TracerError::InvalidCamera(_))));
    assert!(matches!(c.look_at(Tuple4D::origin(), below, up),
        Err(TracerError::InvalidCamera(_))));

    // Zero or non-finite inputs
    assert!(c.look_at(Tuple4D::origin(), p, Tuple4D::vector(0.0, 0.0, 0.0))
        .is_err());
    assert!(c.look_at(Tuple4D::point(f64::NAN, 0.0, 0.0), p, up).is_err());
    assert!(c.look_at(Tuple4D::origin(), Tuple4D::point(f64::INFINITY, 0.0,
        0.0), up).is_err());

    assert_eq!(c, before);
}

#[test]
fn render_center_pixel_of_default_world() {
    use crate::world::World;
    use crate::color::Color;

    let w = World::new();
    let mut c = Camera::new(11, 11, PI / 2.0).unwrap();
    c.look_at(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::origin(),
        Tuple4D::vector(0.0, 1.0, 0.0)).unwrap();

    let color = w.color_at(&c.ray_for_pixel(5, 5), 5);
    assert_eq!(color, Color::rgb(0.38066, 0.47583, 0.2855));
}
