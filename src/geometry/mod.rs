//! Geometric Primitives and Operations

pub mod point;
pub mod utilities;

// Re-export commonly used items
pub use point::EmPoint;
pub use utilities::{ac_cross_ab, any_point_in_triangle, point_in_polygon, signed_area};
