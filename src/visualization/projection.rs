//! Orthographic camera for the normalized `[-1, 1]^3` plotting cube.
//!
//! The camera sits on a sphere around the cube at (azimuth, elevation), both
//! in degrees, with azimuth measured in the x-y plane from the +x axis.

use std::f64::consts::SQRT_2;

/// Viewing direction of one panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub azimuth: f64,
    pub elevation: f64,
}

/// Maps cube coordinates to pixel coordinates of a panel (y grows downward).
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    sin_az: f64,
    cos_az: f64,
    sin_el: f64,
    cos_el: f64,
    scale: f64,
    center: (f64, f64),
}

impl Projector {
    pub fn new(camera: Camera, center: (f64, f64), scale: f64) -> Self {
        let (sin_az, cos_az) = camera.azimuth.to_radians().sin_cos();
        let (sin_el, cos_el) = camera.elevation.to_radians().sin_cos();
        Self {
            sin_az,
            cos_az,
            sin_el,
            cos_el,
            scale,
            center,
        }
    }

    /// Projector that fits the cube into a `width` x `height` panel.
    ///
    /// The scale only depends on the elevation, so panels that differ in
    /// azimuth share it.
    pub fn fit(camera: Camera, width: u32, height: u32, fill: f64) -> Self {
        let (sin_el, cos_el) = camera.elevation.to_radians().sin_cos();
        let extent_x = 2.0 * SQRT_2;
        let extent_y = 2.0 * cos_el.abs() + 2.0 * SQRT_2 * sin_el.abs();
        let scale = fill * f64::min(width as f64 / extent_x, height as f64 / extent_y);
        let center = (width as f64 / 2.0, height as f64 / 2.0);
        Self::new(camera, center, scale)
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen position of a cube point, in fractional pixels.
    #[inline]
    pub fn project(&self, p: [f64; 3]) -> (f64, f64) {
        // Right vector: (-sin a, cos a, 0)
        let sx = -p[0] * self.sin_az + p[1] * self.cos_az;
        // Up vector: (-cos a sin e, -sin a sin e, cos e)
        let sy = -p[0] * self.cos_az * self.sin_el - p[1] * self.sin_az * self.sin_el
            + p[2] * self.cos_el;
        (self.center.0 + sx * self.scale, self.center.1 - sy * self.scale)
    }

    #[inline]
    pub fn to_pixel(&self, p: [f64; 3]) -> (i32, i32) {
        let (x, y) = self.project(p);
        (x.round() as i32, y.round() as i32)
    }

    /// Pixel position clamped to `bound` pixels around the panel center.
    ///
    /// Returns `None` when the point has no finite projection.
    pub fn to_pixel_within(&self, p: [f64; 3], bound: f64) -> Option<(i32, i32)> {
        let (x, y) = self.project(p);
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let clamp = |v: f64, c: f64| v.clamp(c - bound, c + bound).round() as i32;
        Some((clamp(x, self.center.0), clamp(y, self.center.1)))
    }

    /// Signed distance toward the viewer; larger values are nearer.
    #[inline]
    pub fn depth(&self, p: [f64; 3]) -> f64 {
        p[0] * self.cos_el * self.cos_az + p[1] * self.cos_el * self.sin_az + p[2] * self.sin_el
    }
}
