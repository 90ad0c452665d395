//! Parametric 2D primitives in the lattice unit cell.
//!
//! Coordinates are physical lengths in the same unit as the device periods.
//! `x` runs along the `p` axis (grid columns) and `y` along the `q` axis
//! (grid rows); the unit cell spans `[0, period_x) x [0, period_y)`.
//! Primitives are fully described by their TOML parameters.

use serde::{Deserialize, Serialize};

use crate::GeometryError;

/// A closed planar shape that can be painted into a permittivity grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Circle(Circle),
    Ellipse(Ellipse),
    Rectangle(Rectangle),
}

/// A disk defined by its centre and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Centre `(x, y)`.
    pub centre: [f64; 2],
    pub radius: f64,
}

/// An axis-aligned ellipse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    /// Centre `(x, y)`.
    pub centre: [f64; 2],
    /// Semi-axis lengths along x and y.
    pub semi_axes: [f64; 2],
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Centre `(x, y)`.
    pub centre: [f64; 2],
    /// Half-extents along x and y.
    pub half_extents: [f64; 2],
}

impl Primitive {
    /// Check whether a point lies inside (or on the edge of) this primitive.
    pub fn contains(&self, point: [f64; 2]) -> bool {
        match self {
            Primitive::Circle(c) => {
                let dx = point[0] - c.centre[0];
                let dy = point[1] - c.centre[1];
                dx * dx + dy * dy <= c.radius * c.radius
            }
            Primitive::Ellipse(e) => {
                let dx = (point[0] - e.centre[0]) / e.semi_axes[0];
                let dy = (point[1] - e.centre[1]) / e.semi_axes[1];
                dx * dx + dy * dy <= 1.0
            }
            Primitive::Rectangle(r) => {
                (point[0] - r.centre[0]).abs() <= r.half_extents[0]
                    && (point[1] - r.centre[1]).abs() <= r.half_extents[1]
            }
        }
    }

    /// Axis-aligned bounding box: returns (min_corner, max_corner).
    pub fn bounding_box(&self) -> ([f64; 2], [f64; 2]) {
        let (centre, half) = match self {
            Primitive::Circle(c) => (c.centre, [c.radius, c.radius]),
            Primitive::Ellipse(e) => (e.centre, e.semi_axes),
            Primitive::Rectangle(r) => (r.centre, r.half_extents),
        };
        (
            [centre[0] - half[0], centre[1] - half[1]],
            [centre[0] + half[0], centre[1] + half[1]],
        )
    }

    /// Exact area of the primitive.
    pub fn area(&self) -> f64 {
        match self {
            Primitive::Circle(c) => std::f64::consts::PI * c.radius * c.radius,
            Primitive::Ellipse(e) => std::f64::consts::PI * e.semi_axes[0] * e.semi_axes[1],
            Primitive::Rectangle(r) => 4.0 * r.half_extents[0] * r.half_extents[1],
        }
    }

    /// Reject non-finite coordinates and non-positive sizes.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let (centre, sizes) = match self {
            Primitive::Circle(c) => (c.centre, [c.radius, c.radius]),
            Primitive::Ellipse(e) => (e.centre, e.semi_axes),
            Primitive::Rectangle(r) => (r.centre, r.half_extents),
        };
        if !centre.iter().all(|v| v.is_finite()) {
            return Err(GeometryError::InvalidPrimitive(format!(
                "centre {centre:?} is not finite"
            )));
        }
        if !sizes.iter().all(|&s| s.is_finite() && s > 0.0) {
            return Err(GeometryError::InvalidPrimitive(format!(
                "sizes {sizes:?} must be positive"
            )));
        }
        Ok(())
    }
}
