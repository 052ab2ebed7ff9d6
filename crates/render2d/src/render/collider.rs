//! Optional collision shapes carried by sprites

use crate::foundation::math::{RectF, Vec2};

/// Collision shape in the sprite's local space
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    /// Axis aligned box
    BoundingBox {
        /// Top-left relative to the sprite origin
        offset: Vec2,
        /// Box size
        size: Vec2,
    },
    /// Circle
    BoundingCircle {
        /// Centre relative to the sprite origin
        center: Vec2,
        /// Radius
        radius: f32,
    },
    /// Closed polygon
    Polygon {
        /// Outline points in order
        points: Vec<Vec2>,
    },
}

impl Collider {
    /// Name stored in persisted files
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::BoundingBox { .. } => "BoundingBox",
            Self::BoundingCircle { .. } => "BoundingCircle",
            Self::Polygon { .. } => "Polygon",
        }
    }

    /// Axis aligned bounds of the shape
    pub fn bounds(&self) -> RectF {
        match self {
            Self::BoundingBox { offset, size } => RectF::from_location_size(*offset, *size),
            Self::BoundingCircle { center, radius } => {
                RectF::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
            }
            Self::Polygon { points } => RectF::bounding(points.iter().copied()).unwrap_or_default(),
        }
    }

    /// Whether a local point lies inside the shape
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Self::BoundingBox { .. } => self.bounds().contains(point),
            Self::BoundingCircle { center, radius } => (point - center).norm_squared() <= radius * radius,
            Self::Polygon { points } => {
                // even-odd rule
                let mut inside = false;
                let mut j = points.len().wrapping_sub(1);
                for (i, a) in points.iter().enumerate() {
                    let b = points[j];
                    if (a.y > point.y) != (b.y > point.y)
                        && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
                    {
                        inside = !inside;
                    }
                    j = i;
                }
                inside
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_contains() {
        let circle = Collider::BoundingCircle { center: Vec2::new(5.0, 5.0), radius: 2.0 };
        assert!(circle.contains(Vec2::new(6.0, 6.0)));
        assert!(!circle.contains(Vec2::new(8.0, 5.0)));
        assert_eq!(circle.bounds(), RectF::new(3.0, 3.0, 4.0, 4.0));
    }

    #[test]
    fn test_polygon_contains() {
        let triangle = Collider::Polygon {
            points: vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)],
        };
        assert!(triangle.contains(Vec2::new(2.0, 2.0)));
        assert!(!triangle.contains(Vec2::new(8.0, 8.0)));
        assert!(!Collider::Polygon { points: Vec::new() }.contains(Vec2::zeros()));
    }
}
