//! Em-square points
//!
//! Glyph geometry is kept as plain `[f32; 2]` pairs so the point buffers can be
//! handed to the GPU unchanged. These helpers cover the handful of vector
//! operations the triangulator needs.

/// A point (or vector) in em-square coordinates
pub type EmPoint = [f32; 2];

#[inline]
pub fn sub(a: EmPoint, b: EmPoint) -> EmPoint {
    [a[0] - b[0], a[1] - b[1]]
}

/// Halfway point between `a` and `b`
#[inline]
pub fn mid(a: EmPoint, b: EmPoint) -> EmPoint {
    lerp(a, b, 0.5)
}

#[inline]
pub fn lerp(a: EmPoint, b: EmPoint, t: f32) -> EmPoint {
    [a[0] * (1.0 - t) + b[0] * t, a[1] * (1.0 - t) + b[1] * t]
}

/// z component of the 2D cross product
#[inline]
pub fn cross(a: EmPoint, b: EmPoint) -> f32 {
    a[0] * b[1] - a[1] * b[0]
}
