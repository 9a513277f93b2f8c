use std::io::{ self, BufWriter, Write };
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{ AtomicU64, Ordering };

use log::info;

use crate::color::Color;
use crate::render::PixelSink;
use crate::error::Result;

// PPM lines may not exceed this many characters
const PPM_LINE_WIDTH: usize = 70;

/// A canvas for drawing pixels.
///
/// Stores the linear colors produced by a render. Pixels are written through
/// a shared reference: each channel is an atomic holding the bits of an `f64`,
/// so render workers can fill disjoint pixels concurrently without locking.
///
/// Once rendering finishes, the canvas can be saved as a PPM image.
#[derive(Debug, Default)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<[AtomicU64; 3]>,
}

impl Canvas {
    /// Creates a black canvas with the specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        let black = 0.0f64.to_bits();
        let pixels = (0..width * height)
            .map(|_| [
                AtomicU64::new(black),
                AtomicU64::new(black),
                AtomicU64::new(black),
            ])
            .collect();

        Canvas { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Writes a color to pixel `(x, y)`.
    ///
    /// `x` is the column and `y` the row, both zero-indexed. Out-of-bounds
    /// pixels are ignored.
    ///
    /// ```
    /// # use whitted_tracer::color::Color;
    /// # use whitted_tracer::canvas::Canvas;
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, purple);
    /// assert_eq!(canvas.read_pixel(4, 2), Some(purple));
    /// ```
    pub fn write_pixel(&self, x: usize, y: usize, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        let [r, g, b] = &self.pixels[y * self.width + x];
        r.store(color.r.to_bits(), Ordering::Relaxed);
        g.store(color.g.to_bits(), Ordering::Relaxed);
        b.store(color.b.to_bits(), Ordering::Relaxed);
    }

    /// Reads the color at pixel `(x, y)`, or `None` if out of bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let [r, g, b] = &self.pixels[y * self.width + x];
        Some(Color::rgb(
            f64::from_bits(r.load(Ordering::Relaxed)),
            f64::from_bits(g.load(Ordering::Relaxed)),
            f64::from_bits(b.load(Ordering::Relaxed)),
        ))
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Colors are clamped to `[0, 1]` and scaled to `0..=255`. No line of
    /// pixel data is longer than 70 characters.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        for y in 0..self.height {
            let mut line = String::new();
            let channels = (0..self.width)
                .filter_map(|x| self.read_pixel(x, y))
                .flat_map(|c| {
                    let c = c.clamp();
                    [c.r, c.g, c.b]
                });

            for channel in channels {
                let value = ((channel * 255.0).round() as u8).to_string();
                if !line.is_empty()
                    && line.len() + 1 + value.len() > PPM_LINE_WIDTH {
                    writeln!(out, "{}", line)?;
                    line.clear();
                }

                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&value);
            }

            writeln!(out, "{}", line)?;
        }

        Ok(())
    }

    /// Saves the canvas to a PPM file at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()?;

        info!("saved {}x{} image to {}", self.width, self.height,
            path.display());
        Ok(())
    }
}

impl PixelSink for Canvas {
    fn put_pixel(&self, x: usize, y: usize, color: Color) {
        self.write_pixel(x, y, color);
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!((c.width(), c.height()), (10, 20));
    for y in 0..20 {
        for x in 0..10 {
            assert_eq!(c.read_pixel(x, y), Some(Color::black()));
        }
    }
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let c = Canvas::new(2, 2);

    c.write_pixel(2, 0, Color::red());
    assert_eq!(c.read_pixel(2, 0), None);
    assert_eq!(c.read_pixel(0, 2), None);
}

#[test]
fn ppm_header_and_pixel_data() {
    let c = Canvas::new(5, 3);
    c.write_pixel(0, 0, Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();

    let lines: Vec<&str> = ppm.lines().collect();
    assert_eq!(&lines[..3], &["P3", "5 3", "255"]);
    assert_eq!(lines[3], "255 0 0 0 0 0 0 0 0 0 0 0 0 0 0");
    assert_eq!(lines[4], "0 0 0 0 0 0 0 128 0 0 0 0 0 0 0");
    assert_eq!(lines[5], "0 0 0 0 0 0 0 0 0 0 0 0 0 0 255");
    assert!(ppm.ends_with('\n'));
}

#[test]
fn ppm_splits_long_lines() {
    let c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let ppm = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = ppm.lines().collect();

    let long = concat!("255 204 153 255 204 153 255 204 153 255 204 153 ",
        "255 204 153 255 204");
    let short = "153 255 204 153 255 204 153 255 204 153 255 204 153";
    assert_eq!(&lines[3..7], &[long, short, long, short]);
    assert!(lines.iter().all(|l| l.len() <= PPM_LINE_WIDTH));
}

#[test]
fn concurrent_writes_to_disjoint_pixels() {
    use rayon::prelude::*;

    let c = Canvas::new(64, 64);
    (0..64usize).into_par_iter().for_each(|y| {
        for x in 0..64 {
            c.put_pixel(x, y, Color::rgb(x as f64, y as f64, 0.0));
        }
    });

    assert_eq!(c.read_pixel(63, 5), Some(Color::rgb(63.0, 5.0, 0.0)));
    assert_eq!(c.read_pixel(7, 40), Some(Color::rgb(7.0, 40.0, 0.0)));
}
