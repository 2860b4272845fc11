use crate::BalanceError;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Inscribed-circle radius of an equilateral triangle, the usual disc
/// approximation of a triangular mounting plate.
pub fn equilateral_triangle_inscribed_radius(side_length: f64) -> f64 {
    side_length / (2.0 * 3.0f64.sqrt())
}

/// Circular stability footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscSupport {
    radius: f64,
    margin: f64,
    offset: Vector2<f64>,
}

impl DiscSupport {
    /// A disc footprint shrunk inward by `margin`. The shrunk region must
    /// keep a positive radius; this is validated here, not per query.
    pub fn new(radius: f64, margin: f64) -> Result<Self, BalanceError> {
        if radius <= 0.0 {
            return Err(BalanceError::NonPositiveRadius(radius));
        }
        if margin < 0.0 {
            return Err(BalanceError::NegativeMargin(margin));
        }
        if margin >= radius {
            return Err(BalanceError::DegenerateSupport(margin));
        }
        Ok(Self {
            radius,
            margin,
            offset: Vector2::zeros(),
        })
    }

    fn signed_distance(&self, point: Vector2<f64>) -> f64 {
        (point - self.offset).norm() - (self.radius - self.margin)
    }
}

/// Convex polygonal stability footprint, vertices in counter-clockwise
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonSupport {
    vertices: Vec<Vector2<f64>>,
    margin: f64,
    offset: Vector2<f64>,
}

impl PolygonSupport {
    pub fn new(vertices: Vec<Vector2<f64>>, margin: f64) -> Result<Self, BalanceError> {
        if vertices.len() < 3 {
            return Err(BalanceError::TooFewVertices(vertices.len()));
        }
        if margin < 0.0 {
            return Err(BalanceError::NegativeMargin(margin));
        }

        let n = vertices.len();
        for i in 0..n {
            let e0 = vertices[(i + 1) % n] - vertices[i];
            let e1 = vertices[(i + 2) % n] - vertices[(i + 1) % n];
            if e0.x * e1.y - e0.y * e1.x <= 0.0 {
                return Err(BalanceError::NotConvex);
            }
        }

        // the margin-shrunk region must keep positive area
        let centroid: Vector2<f64> = vertices.iter().sum::<Vector2<f64>>() / n as f64;
        for i in 0..n {
            let (normal, base) = edge_half_plane(&vertices, i);
            if -(normal.dot(&(centroid - base))) <= margin {
                return Err(BalanceError::DegenerateSupport(margin));
            }
        }

        Ok(Self {
            vertices,
            margin,
            offset: Vector2::zeros(),
        })
    }

    /// Rectangular footprint of a cuboid resting on its base, centered on
    /// the reference point.
    pub fn rectangle(x_length: f64, y_length: f64, margin: f64) -> Result<Self, BalanceError> {
        let hx = 0.5 * x_length;
        let hy = 0.5 * y_length;
        Self::new(
            vec![
                Vector2::new(-hx, -hy),
                Vector2::new(hx, -hy),
                Vector2::new(hx, hy),
                Vector2::new(-hx, hy),
            ],
            margin,
        )
    }

    fn signed_distance(&self, point: Vector2<f64>) -> f64 {
        let p = point - self.offset;
        let mut distance = f64::NEG_INFINITY;
        for i in 0..self.vertices.len() {
            let (normal, base) = edge_half_plane(&self.vertices, i);
            distance = distance.max(normal.dot(&(p - base)) + self.margin);
        }
        distance
    }
}

/// Outward unit normal and a base point of edge `i`.
fn edge_half_plane(vertices: &[Vector2<f64>], i: usize) -> (Vector2<f64>, Vector2<f64>) {
    let a = vertices[i];
    let b = vertices[(i + 1) % vertices.len()];
    let edge = b - a;
    let normal = Vector2::new(edge.y, -edge.x).normalize();
    (normal, a)
}

/// Stability footprint of a body's base: the region the net specific force
/// must pierce for the body to stay put.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SupportArea {
    Disc(DiscSupport),
    Polygon(PolygonSupport),
}

impl SupportArea {
    pub fn disc(radius: f64, margin: f64) -> Result<Self, BalanceError> {
        Ok(SupportArea::Disc(DiscSupport::new(radius, margin)?))
    }

    pub fn polygon(vertices: Vec<Vector2<f64>>, margin: f64) -> Result<Self, BalanceError> {
        Ok(SupportArea::Polygon(PolygonSupport::new(vertices, margin)?))
    }

    /// Displaces the footprint's reference point laterally, e.g. to
    /// re-anchor a carrier footprint under a composite center of mass.
    pub fn with_offset(mut self, offset: Vector2<f64>) -> Self {
        match &mut self {
            SupportArea::Disc(disc) => disc.offset = offset,
            SupportArea::Polygon(polygon) => polygon.offset = offset,
        }
        self
    }

    pub fn offset(&self) -> Vector2<f64> {
        match self {
            SupportArea::Disc(disc) => disc.offset,
            SupportArea::Polygon(polygon) => polygon.offset,
        }
    }

    /// Signed distance from a support-plane point to the margin-shrunk
    /// boundary, negative inside the admissible region. The sign convention
    /// is fixed; callers must not flip it.
    pub fn signed_distance(&self, point: Vector2<f64>) -> f64 {
        match self {
            SupportArea::Disc(disc) => disc.signed_distance(point),
            SupportArea::Polygon(polygon) => polygon.signed_distance(point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_disc_signed_distance() {
        let disc = SupportArea::disc(0.1, 0.01).unwrap();

        assert_abs_diff_eq!(
            disc.signed_distance(Vector2::new(0.05, 0.0)),
            -0.04,
            epsilon = TOL
        );
        assert_abs_diff_eq!(
            disc.signed_distance(Vector2::new(0.0, 0.12)),
            0.03,
            epsilon = TOL
        );
    }

    #[test]
    fn test_disc_offset_recenters_region() {
        let disc = SupportArea::disc(0.1, 0.01)
            .unwrap()
            .with_offset(Vector2::new(0.05, 0.0));
        assert_abs_diff_eq!(
            disc.signed_distance(Vector2::new(0.05, 0.0)),
            -0.09,
            epsilon = TOL
        );
    }

    #[test]
    fn test_square_signed_distance() {
        let square = SupportArea::polygon(
            vec![
                Vector2::new(-0.1, -0.1),
                Vector2::new(0.1, -0.1),
                Vector2::new(0.1, 0.1),
                Vector2::new(-0.1, 0.1),
            ],
            0.0,
        )
        .unwrap();

        assert_abs_diff_eq!(square.signed_distance(Vector2::zeros()), -0.1, epsilon = TOL);
        assert_abs_diff_eq!(
            square.signed_distance(Vector2::new(0.15, 0.0)),
            0.05,
            epsilon = TOL
        );
        assert_abs_diff_eq!(
            square.signed_distance(Vector2::new(0.06, 0.0)),
            -0.04,
            epsilon = TOL
        );
    }

    #[test]
    fn test_polygon_margin_shrinks_region() {
        let square = PolygonSupport::rectangle(0.2, 0.2, 0.01).unwrap();
        assert_abs_diff_eq!(
            square.signed_distance(Vector2::zeros()),
            -0.09,
            epsilon = TOL
        );
    }

    #[test]
    fn test_degenerate_regions_rejected() {
        assert!(matches!(
            SupportArea::disc(0.1, 0.1),
            Err(BalanceError::DegenerateSupport(_))
        ));
        assert!(matches!(
            SupportArea::disc(-0.1, 0.0),
            Err(BalanceError::NonPositiveRadius(_))
        ));
        assert!(matches!(
            PolygonSupport::rectangle(0.2, 0.2, 0.1),
            Err(BalanceError::DegenerateSupport(_))
        ));
        assert!(matches!(
            SupportArea::polygon(vec![Vector2::zeros(), Vector2::new(1.0, 0.0)], 0.0),
            Err(BalanceError::TooFewVertices(2))
        ));

        // clockwise ordering is rejected
        assert!(matches!(
            SupportArea::polygon(
                vec![
                    Vector2::new(-0.1, 0.1),
                    Vector2::new(0.1, 0.1),
                    Vector2::new(0.1, -0.1),
                    Vector2::new(-0.1, -0.1),
                ],
                0.0,
            ),
            Err(BalanceError::NotConvex)
        ));
    }

    #[test]
    fn test_triangle_inscribed_radius() {
        let r = equilateral_triangle_inscribed_radius(0.2);
        assert_abs_diff_eq!(r, 0.2 / (2.0 * 3.0f64.sqrt()), epsilon = TOL);
        assert!(SupportArea::disc(r, 0.0).is_ok());
    }
}
