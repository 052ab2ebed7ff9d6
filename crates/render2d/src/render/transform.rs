//! Shared 2D transform used by every moveable primitive
//!
//! Local points are made anchor-relative, scaled, rotated about the origin and
//! translated to the primitive position; the depth goes into z.

use super::vertex::Vertex;
use crate::foundation::math::{Rotation, Vec2};

/// Position, orientation and scale of a primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// Translation applied last
    pub position: Vec2,
    /// Rotation in degrees
    pub angle: f32,
    /// Per-axis scale
    pub scale: Vec2,
    /// Local pivot subtracted before scaling and rotation
    pub anchor: Vec2,
    /// Value written into z
    pub depth: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            angle: 0.0,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::zeros(),
            depth: 0.0,
        }
    }
}

impl Transform2D {
    /// Rotation for the current angle, computed once per vertex pass
    pub fn rotation(&self) -> Rotation {
        if self.angle == 0.0 {
            Rotation::identity()
        } else {
            Rotation::from_degrees(self.angle)
        }
    }

    /// Transform one local point
    pub fn apply(&self, local: Vec2, rotation: &Rotation) -> Vec2 {
        let mut point = local - self.anchor;
        if self.scale.x != 1.0 {
            point.x *= self.scale.x;
        }
        if self.scale.y != 1.0 {
            point.y *= self.scale.y;
        }
        if self.angle != 0.0 {
            point = rotation.apply(point);
        }
        point + self.position
    }

    /// Transform `local` points into the matching vertices
    pub fn transform_into(&self, local: &[Vec2], vertices: &mut [Vertex]) {
        let rotation = self.rotation();
        for (vertex, point) in vertices.iter_mut().zip(local) {
            vertex.set_xy(self.apply(*point, &rotation));
            vertex.position[2] = self.depth;
        }
    }

    /// Transform one local point and round it up to whole pixels
    pub fn apply_ceiled(&self, local: Vec2, rotation: &Rotation) -> Vec2 {
        let point = self.apply(local, rotation);
        Vec2::new(point.x.ceil(), point.y.ceil())
    }
}

/// Local corners of a `size` quad in vertex order (upper-left, upper-right,
/// lower-left, lower-right)
pub fn quad_corners(size: Vec2) -> [Vec2; 4] {
    [
        Vec2::new(0.0, 0.0),
        Vec2::new(size.x, 0.0),
        Vec2::new(0.0, size.y),
        Vec2::new(size.x, size.y),
    ]
}

/// Indices for a quad laid out by [`quad_corners`]
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_transform_is_translation() {
        let transform = Transform2D {
            position: Vec2::new(10.0, 20.0),
            anchor: Vec2::new(2.0, 3.0),
            ..Transform2D::default()
        };
        let point = transform.apply(Vec2::new(5.0, 5.0), &transform.rotation());
        assert_eq!(point, Vec2::new(13.0, 22.0));
    }

    #[test]
    fn test_rotation_then_translation() {
        let transform = Transform2D {
            position: Vec2::new(100.0, 0.0),
            angle: 90.0,
            ..Transform2D::default()
        };
        let point = transform.apply(Vec2::new(8.0, 0.0), &transform.rotation());
        assert_relative_eq!(point.x, 100.0, epsilon = 1e-4);
        assert_relative_eq!(point.y, 8.0, epsilon = 1e-4);
    }

    #[test]
    fn test_scale_applies_before_rotation() {
        let transform = Transform2D {
            scale: Vec2::new(2.0, 1.0),
            angle: 90.0,
            ..Transform2D::default()
        };
        let point = transform.apply(Vec2::new(3.0, 0.0), &transform.rotation());
        assert_relative_eq!(point.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(point.y, 6.0, epsilon = 1e-4);
    }

    #[test]
    fn test_depth_written_to_every_vertex() {
        let transform = Transform2D {
            depth: 0.5,
            ..Transform2D::default()
        };
        let mut vertices = [Vertex::default(); 4];
        transform.transform_into(&quad_corners(Vec2::new(4.0, 2.0)), &mut vertices);
        assert!(vertices.iter().all(|v| v.position[2] == 0.5));
        assert_eq!(vertices[3].xy(), Vec2::new(4.0, 2.0));
    }
}
