//! Rasterisation of primitives into permittivity grids.
//!
//! A [`PixelGrid`] samples the unit cell at pixel centres: pixel
//! `(row, col)` sits at
//! $x = (col + \tfrac12)\,\Lambda_x / N_{cols}$,
//! $y = (row + \tfrac12)\,\Lambda_y / N_{rows}$.
//! Painting overwrites every pixel whose centre lies inside the shape, so
//! later shapes win where they overlap.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::primitives::Primitive;
use crate::GeometryError;

/// Pixel resolution of one unit cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelGrid {
    pub rows: usize,
    pub cols: usize,
    pub period_x: f64,
    pub period_y: f64,
}

impl PixelGrid {
    pub fn new(rows: usize, cols: usize, period_x: f64, period_y: f64) -> Result<Self, GeometryError> {
        if rows == 0 || cols == 0 {
            return Err(GeometryError::InvalidGrid(format!(
                "grid must have at least one pixel, got {rows}x{cols}"
            )));
        }
        if !(period_x.is_finite() && period_x > 0.0 && period_y.is_finite() && period_y > 0.0) {
            return Err(GeometryError::InvalidGrid(format!(
                "periods must be positive, got ({period_x}, {period_y})"
            )));
        }
        Ok(Self {
            rows,
            cols,
            period_x,
            period_y,
        })
    }

    /// Pixel pitch `(dx, dy)`.
    pub fn pitch(&self) -> (f64, f64) {
        (
            self.period_x / self.cols as f64,
            self.period_y / self.rows as f64,
        )
    }

    /// Physical `(x, y)` of a pixel centre.
    pub fn centre(&self, row: usize, col: usize) -> [f64; 2] {
        let (dx, dy) = self.pitch();
        [(col as f64 + 0.5) * dx, (row as f64 + 0.5) * dy]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// A grid filled with one value.
pub fn uniform_grid(rows: usize, cols: usize, value: Complex64) -> Array2<Complex64> {
    Array2::from_elem((rows, cols), value)
}

/// Paint `primitive` into `grid` with `value`.
///
/// Only pixels inside the primitive's bounding box are tested.
///
/// # Returns
/// The number of pixels overwritten.
pub fn paint(
    grid: &mut Array2<Complex64>,
    pixels: &PixelGrid,
    primitive: &Primitive,
    value: Complex64,
) -> Result<usize, GeometryError> {
    if grid.dim() != pixels.shape() {
        return Err(GeometryError::InvalidGrid(format!(
            "grid {:?} does not match pixel layout {:?}",
            grid.dim(),
            pixels.shape()
        )));
    }
    primitive.validate()?;

    let (dx, dy) = pixels.pitch();
    let (min, max) = primitive.bounding_box();
    let col_range = pixel_span(min[0], max[0], dx, pixels.cols);
    let row_range = pixel_span(min[1], max[1], dy, pixels.rows);

    let mut painted = 0;
    for row in row_range {
        for col in col_range.clone() {
            if primitive.contains(pixels.centre(row, col)) {
                grid[[row, col]] = value;
                painted += 1;
            }
        }
    }
    Ok(painted)
}

/// Indices of pixels whose centres may fall within `[lo, hi]`.
fn pixel_span(lo: f64, hi: f64, pitch: f64, count: usize) -> std::ops::Range<usize> {
    let first = ((lo / pitch) - 0.5).floor().max(0.0) as usize;
    let last = (((hi / pitch) - 0.5).ceil() + 1.0).clamp(0.0, count as f64) as usize;
    first.min(count)..last
}

/// Paint a disk given directly in pixel units.
///
/// Pixels with $(r - r_0)^2 + (c - c_0)^2 \le R^2$ are set to `value`.
///
/// # Returns
/// The number of pixels overwritten.
pub fn add_circle(grid: &mut Array2<Complex64>, centre: (usize, usize), radius: f64, value: Complex64) -> usize {
    let (r0, c0) = (centre.0 as f64, centre.1 as f64);
    let r2 = radius * radius;
    let mut painted = 0;
    for ((row, col), cell) in grid.indexed_iter_mut() {
        let dr = row as f64 - r0;
        let dc = col as f64 - c0;
        if dr * dr + dc * dc <= r2 {
            *cell = value;
            painted += 1;
        }
    }
    painted
}

/// Fraction of pixels in `grid` equal to `value`.
pub fn fill_fraction(grid: &Array2<Complex64>, value: Complex64) -> f64 {
    if grid.is_empty() {
        return 0.0;
    }
    grid.iter().filter(|&&v| v == value).count() as f64 / grid.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Circle, Rectangle};
    use approx::assert_abs_diff_eq;

    const AIR: Complex64 = Complex64::new(1.0, 0.0);
    const SI: Complex64 = Complex64::new(16.0, 0.1);

    #[test]
    fn test_pixel_centres() {
        let pixels = PixelGrid::new(4, 8, 800.0, 400.0).unwrap();
        assert_eq!(pixels.centre(0, 0), [50.0, 50.0]);
        assert_eq!(pixels.centre(3, 7), [750.0, 350.0]);
    }

    #[test]
    fn test_paint_circle_area_converges() {
        let pixels = PixelGrid::new(200, 200, 900.0, 900.0).unwrap();
        let mut grid = uniform_grid(200, 200, AIR);
        let circle = Primitive::Circle(Circle {
            centre: [450.0, 450.0],
            radius: 230.0,
        });
        let painted = paint(&mut grid, &pixels, &circle, SI).unwrap();
        let expected = circle.area() / (900.0 * 900.0);
        assert_abs_diff_eq!(painted as f64 / 40_000.0, expected, epsilon = 5e-3);
        assert_abs_diff_eq!(fill_fraction(&grid, SI), expected, epsilon = 5e-3);
    }

    #[test]
    fn test_paint_rectangle_exact_pixels() {
        let pixels = PixelGrid::new(10, 10, 10.0, 10.0).unwrap();
        let mut grid = uniform_grid(10, 10, AIR);
        // Covers pixel centres 2.5..=6.5 in x (5 columns) and 4.5..=5.5 in y (2 rows).
        let rect = Primitive::Rectangle(Rectangle {
            centre: [4.5, 5.0],
            half_extents: [2.0, 0.5],
        });
        assert_eq!(paint(&mut grid, &pixels, &rect, SI).unwrap(), 10);
        assert_eq!(grid[[4, 2]], SI);
        assert_eq!(grid[[5, 6]], SI);
        assert_eq!(grid[[3, 2]], AIR);
    }

    #[test]
    fn test_paint_clips_to_unit_cell() {
        let pixels = PixelGrid::new(8, 8, 8.0, 8.0).unwrap();
        let mut grid = uniform_grid(8, 8, AIR);
        let circle = Primitive::Circle(Circle {
            centre: [0.0, 0.0],
            radius: 3.0,
        });
        let painted = paint(&mut grid, &pixels, &circle, SI).unwrap();
        assert!(painted > 0 && painted < 16);
    }

    #[test]
    fn test_paint_rejects_mismatched_grid() {
        let pixels = PixelGrid::new(4, 4, 1.0, 1.0).unwrap();
        let mut grid = uniform_grid(4, 5, AIR);
        let circle = Primitive::Circle(Circle {
            centre: [0.5, 0.5],
            radius: 0.2,
        });
        assert!(paint(&mut grid, &pixels, &circle, SI).is_err());
    }

    #[test]
    fn test_add_circle_pixel_units() {
        let mut grid = uniform_grid(9, 9, AIR);
        let painted = add_circle(&mut grid, (4, 4), 1.0, SI);
        // Centre plus four nearest neighbours.
        assert_eq!(painted, 5);
        assert_eq!(grid[[4, 5]], SI);
        assert_eq!(grid[[5, 5]], AIR);
    }

    #[test]
    fn test_empty_pixel_grid_rejected() {
        assert!(PixelGrid::new(0, 4, 1.0, 1.0).is_err());
        assert!(PixelGrid::new(4, 4, -1.0, 1.0).is_err());
    }
}
