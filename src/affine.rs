//! Affine transforms between object space and screen-pixel space.
//!
//! An [`AffineTransform`] always carries its forward matrix together with the
//! exact inverse. Both halves are produced by the same constructor, so code
//! outside this module can never update one without the other.

#[cfg(test)]
#[path = "affine_test.rs"]
mod affine_test;

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A row-major 2×3 affine matrix: `[[a, b, tx], [c, d, ty]]`.
pub type Matrix = [[f64; 3]; 2];

const IDENTITY_MATRIX: Matrix = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

/// A point in either object space or pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle with non-negative extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Normalized rectangle spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Raised when a host-supplied matrix has no inverse.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("singular affine matrix (determinant {determinant})")]
    Singular { determinant: f64 },
}

/// Forward/inverse affine pair mapping object space to pixel space.
///
/// Serializes as the forward matrix alone; deserialization recomputes the
/// inverse and rejects singular matrices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Matrix", into = "Matrix")]
pub struct AffineTransform {
    forward: Matrix,
    inverse: Matrix,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl TryFrom<Matrix> for AffineTransform {
    type Error = TransformError;

    fn try_from(m: Matrix) -> Result<Self, Self::Error> {
        Self::new(m)
    }
}

impl From<AffineTransform> for Matrix {
    fn from(t: AffineTransform) -> Self {
        t.forward
    }
}

impl AffineTransform {
    #[must_use]
    pub const fn identity() -> Self {
        Self { forward: IDENTITY_MATRIX, inverse: IDENTITY_MATRIX }
    }

    /// Build a transform from its forward matrix, computing the inverse.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Singular`] when the determinant of the linear
    /// part is zero or non-finite.
    pub fn new(forward: Matrix) -> Result<Self, TransformError> {
        let determinant = determinant(&forward);
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(TransformError::Singular { determinant });
        }
        Ok(Self { forward, inverse: invert_matrix(&forward, determinant) })
    }

    /// Pure translation by `(dx, dy)` pixels.
    #[must_use]
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            forward: [[1.0, 0.0, dx], [0.0, 1.0, dy]],
            inverse: [[1.0, 0.0, -dx], [0.0, 1.0, -dy]],
        }
    }

    /// Uniform scale by `factor` that keeps `center` fixed.
    ///
    /// `factor` must be positive and finite.
    #[must_use]
    pub fn scale_about(factor: f64, center: Point) -> Self {
        let inv = 1.0 / factor;
        Self {
            forward: [
                [factor, 0.0, (1.0 - factor) * center.x],
                [0.0, factor, (1.0 - factor) * center.y],
            ],
            inverse: [
                [inv, 0.0, (1.0 - inv) * center.x],
                [0.0, inv, (1.0 - inv) * center.y],
            ],
        }
    }

    #[must_use]
    pub fn forward(&self) -> &Matrix {
        &self.forward
    }

    #[must_use]
    pub fn inverse(&self) -> &Matrix {
        &self.inverse
    }

    /// Map an object-space point to pixel space.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        apply_matrix(&self.forward, p)
    }

    /// Map a pixel-space point back to object space.
    #[must_use]
    pub fn apply_inverse(&self, p: Point) -> Point {
        apply_matrix(&self.inverse, p)
    }

    /// Compose: the result applies `other` first, then `self`.
    #[must_use]
    pub fn multiply(&self, other: &AffineTransform) -> Self {
        Self {
            forward: mul_matrix(&self.forward, &other.forward),
            inverse: mul_matrix(&other.inverse, &self.inverse),
        }
    }

    /// Swap forward and inverse.
    #[must_use]
    pub fn invert(&self) -> Self {
        Self { forward: self.inverse, inverse: self.forward }
    }

    /// Linear scale of the forward map, `sqrt(|det|)`.
    #[must_use]
    pub fn scale(&self) -> f64 {
        determinant(&self.forward).abs().sqrt()
    }

    /// Canvas2D argument order `(a, b, c, d, e, f)` for `setTransform`.
    #[must_use]
    pub fn canvas_args(&self) -> [f64; 6] {
        let m = &self.forward;
        [m[0][0], m[1][0], m[0][1], m[1][1], m[0][2], m[1][2]]
    }
}

fn determinant(m: &Matrix) -> f64 {
    m[0][0] * m[1][1] - m[0][1] * m[1][0]
}

fn invert_matrix(m: &Matrix, det: f64) -> Matrix {
    let a = m[1][1] / det;
    let b = -m[0][1] / det;
    let c = -m[1][0] / det;
    let d = m[0][0] / det;
    // Inverse translation is -L^-1 * t.
    let tx = -(a * m[0][2] + b * m[1][2]);
    let ty = -(c * m[0][2] + d * m[1][2]);
    [[a, b, tx], [c, d, ty]]
}

fn mul_matrix(a: &Matrix, b: &Matrix) -> Matrix {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
            a[0][0] * b[0][2] + a[0][1] * b[1][2] + a[0][2],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
            a[1][0] * b[0][2] + a[1][1] * b[1][2] + a[1][2],
        ],
    ]
}

fn apply_matrix(m: &Matrix, p: Point) -> Point {
    Point {
        x: m[0][0] * p.x + m[0][1] * p.y + m[0][2],
        y: m[1][0] * p.x + m[1][1] * p.y + m[1][2],
    }
}
