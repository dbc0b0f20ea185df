//! Viewport controller: owns the current affine transform and implements
//! bounded pan and rate-limited wheel zoom.
//!
//! All candidate transforms pass through [`Viewport::clamp_to_bounds`], so the
//! content can never be moved far enough to expose empty space at an edge.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::affine::{AffineTransform, Point};
use crate::consts::{WHEEL_INTERVAL_MS, ZOOM_STEP};

#[derive(Debug, Clone)]
pub struct Viewport {
    /// Canvas width in CSS pixels.
    pub width: f64,
    /// Canvas height in CSS pixels.
    pub height: f64,
    transform: AffineTransform,
    /// False when the host owns no viewport; pan and zoom are then disabled.
    interactive: bool,
    zoom_step: f64,
    wheel_interval_ms: f64,
    last_wheel_ms: Option<f64>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            transform: AffineTransform::identity(),
            interactive: false,
            zoom_step: ZOOM_STEP,
            wheel_interval_ms: WHEEL_INTERVAL_MS,
            last_wheel_ms: None,
        }
    }

    /// Override zoom step and wheel rate limit.
    #[must_use]
    pub fn with_zoom(mut self, zoom_step: f64, wheel_interval_ms: f64) -> Self {
        self.zoom_step = zoom_step;
        self.wheel_interval_ms = wheel_interval_ms;
        self
    }

    #[must_use]
    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Adopt a host-owned transform, or drop back to identity with pan/zoom
    /// disabled when `None`.
    pub fn set_transform(&mut self, transform: Option<AffineTransform>) {
        match transform {
            Some(t) => {
                self.transform = t;
                self.interactive = true;
            }
            None => {
                self.transform = AffineTransform::identity();
                self.interactive = false;
            }
        }
    }

    /// Map a raw pixel point into object space.
    #[must_use]
    pub fn to_object(&self, pixel: Point) -> Point {
        self.transform.apply_inverse(pixel)
    }

    /// Pan from a press-time snapshot by the pixel delta `current - anchor`.
    ///
    /// Commits and returns the new transform, or `None` when not interactive.
    pub fn pan(&mut self, snapshot: &AffineTransform, anchor: Point, current: Point) -> Option<AffineTransform> {
        if !self.interactive {
            return None;
        }
        let delta = current - anchor;
        let candidate = AffineTransform::translation(delta.x, delta.y).multiply(snapshot);
        self.transform = self.clamp_to_bounds(&candidate);
        Some(self.transform)
    }

    /// Zoom about the pixel `at`: in for `dy < 0`, out for `dy > 0`.
    ///
    /// Returns `None` when not interactive, when `dy` is zero, or when the
    /// event lands within the rate-limit window of the last accepted one.
    pub fn zoom(&mut self, at: Point, dy: f64, now_ms: f64) -> Option<AffineTransform> {
        if !self.interactive || dy == 0.0 {
            return None;
        }
        if let Some(last) = self.last_wheel_ms
            && now_ms - last < self.wheel_interval_ms
        {
            log::debug!("wheel event dropped ({:.0}ms since last)", now_ms - last);
            return None;
        }
        self.last_wheel_ms = Some(now_ms);

        let step = AffineTransform::scale_about(self.zoom_step, at);
        let step = if dy > 0.0 { step.invert() } else { step };
        let mut candidate = step.multiply(&self.transform);
        if self.smaller_than_canvas(&candidate) {
            log::debug!("zoomed out past content bounds, resetting to identity");
            candidate = AffineTransform::identity();
        }
        self.transform = self.clamp_to_bounds(&candidate);
        Some(self.transform)
    }

    /// Whether the canvas rectangle mapped through `t` is narrower or shorter
    /// than the canvas itself.
    fn smaller_than_canvas(&self, t: &AffineTransform) -> bool {
        let p00 = t.apply(Point::new(0.0, 0.0));
        let p11 = t.apply(Point::new(self.width, self.height));
        p11.x - p00.x < self.width || p11.y - p00.y < self.height
    }

    /// Translate `t` so no gap opens between content and canvas edges.
    ///
    /// Per axis: if the mapped content is at least as large as the canvas, a
    /// gap on the far side is closed first, otherwise a gap on the near side.
    /// Content smaller than the canvas is pinned to the near edge.
    #[must_use]
    pub fn clamp_to_bounds(&self, t: &AffineTransform) -> AffineTransform {
        let top_left = t.apply(Point::new(0.0, 0.0));
        let bottom_right = t.apply(Point::new(self.width, self.height));
        let dx = axis_shift(top_left.x, bottom_right.x, self.width);
        let dy = axis_shift(top_left.y, bottom_right.y, self.height);
        if dx == 0.0 && dy == 0.0 {
            return *t;
        }
        AffineTransform::translation(dx, dy).multiply(t)
    }
}

fn axis_shift(near: f64, far: f64, extent: f64) -> f64 {
    if far - near < extent {
        return -near;
    }
    if far < extent {
        extent - far
    } else if near > 0.0 {
        -near
    } else {
        0.0
    }
}
