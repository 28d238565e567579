//! Screen → logical plane conversion
//!
//! Hosts report pointer positions in viewport pixels. The rendering surface
//! knows how its logical plane is laid out on screen (an affine matrix, as
//! exposed by canvas/SVG style APIs); inverting that matrix keeps the
//! conversion exact under non-uniform scaling and letterboxing. A plain
//! bounding-box ratio is used only when the host has no matrix to offer.

use serde::{Deserialize, Serialize};

use super::plane::{Plane, Point};

/// Affine transform `x' = a·x + c·y + e`, `y' = b·x + d·y + f`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix2D {
    pub const IDENTITY: Matrix2D = Matrix2D {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Scale then translate, the common "fit plane into box" layout
    pub fn scale_translate(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: tx,
            f: ty,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Matrix2D> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        Some(Matrix2D {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

/// Axis-aligned rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// The host surface's view of where the logical plane sits on screen
pub trait SurfaceTransform {
    /// Logical → screen matrix, if the surface exposes one
    fn screen_matrix(&self) -> Option<Matrix2D>;

    /// On-screen bounding box of the whole plane
    fn bounding_rect(&self) -> Rect;

    /// Convert a viewport point into logical plane coordinates.
    fn to_logical(&self, screen: Point, plane: &Plane) -> Point {
        if let Some(inverse) = self.screen_matrix().and_then(|m| m.inverse()) {
            return inverse.apply(screen);
        }

        let rect = self.bounding_rect();
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return screen;
        }
        Point::new(
            (screen.x - rect.left) / rect.width * plane.width,
            (screen.y - rect.top) / rect.height * plane.height,
        )
    }
}

/// Surface geometry as last reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    #[serde(default)]
    pub matrix: Option<Matrix2D>,
    #[serde(default)]
    pub bounds: Rect,
}

impl SurfaceGeometry {
    /// Screen pixels equal logical units.
    pub fn identity(plane: &Plane) -> Self {
        Self {
            matrix: Some(Matrix2D::IDENTITY),
            bounds: Rect {
                left: 0.0,
                top: 0.0,
                width: plane.width,
                height: plane.height,
            },
        }
    }
}

impl SurfaceTransform for SurfaceGeometry {
    fn screen_matrix(&self) -> Option<Matrix2D> {
        self.matrix
    }

    fn bounding_rect(&self) -> Rect {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn test_matrix_inverse() {
        let m = Matrix2D::scale_translate(2.0, 0.5, 10.0, 30.0);
        let p = Point::new(100.0, 40.0);
        let inv = m.inverse().unwrap();
        assert!(close(inv.apply(m.apply(p)), p));
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = Matrix2D::scale_translate(0.0, 1.0, 0.0, 0.0);
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_matrix_handles_letterboxing() {
        // 800x400 plane drawn at scale 0.5 centred in a 600x200 box at (20, 100):
        // plane occupies x 120..520, y 100..300
        let plane = Plane::default();
        let surface = SurfaceGeometry {
            matrix: Some(Matrix2D::scale_translate(0.5, 0.5, 120.0, 100.0)),
            bounds: Rect {
                left: 20.0,
                top: 100.0,
                width: 600.0,
                height: 200.0,
            },
        };
        let logical = surface.to_logical(Point::new(320.0, 200.0), &plane);
        assert!(close(logical, Point::new(400.0, 200.0)));
    }

    #[test]
    fn test_bounding_box_fallback() {
        let plane = Plane::default();
        let surface = SurfaceGeometry {
            matrix: None,
            bounds: Rect {
                left: 10.0,
                top: 10.0,
                width: 400.0,
                height: 400.0,
            },
        };
        // non-uniform: x halves, y stays
        let logical = surface.to_logical(Point::new(210.0, 110.0), &plane);
        assert!(close(logical, Point::new(400.0, 100.0)));
    }

    #[test]
    fn test_identity_surface() {
        let plane = Plane::default();
        let surface = SurfaceGeometry::identity(&plane);
        let p = Point::new(123.0, 45.0);
        assert!(close(surface.to_logical(p, &plane), p));
    }
}
