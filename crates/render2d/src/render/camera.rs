//! View-projection providers for primitives drawn from resident buffers

use crate::foundation::math::{Mat4, Vec2};

/// Supplies the combined view-projection matrix
pub trait ViewProjection {
    /// Combined view and projection
    fn view_projection(&self) -> Mat4;
}

/// Pixel-space orthographic camera with a top-left origin and +Y down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    size: Vec2,
    position: Vec2,
    zoom: f32,
    near: f32,
    far: f32,
}

impl OrthoCamera {
    /// Camera covering a `width` x `height` viewport
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            position: Vec2::zeros(),
            zoom: 1.0,
            near: 0.0,
            far: 1.0,
        }
    }

    /// Scroll the camera
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Magnification factor
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom.max(f32::EPSILON);
        self
    }

    /// Depth range
    pub fn with_depth_range(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Viewport size
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }
}

impl ViewProjection for OrthoCamera {
    fn view_projection(&self) -> Mat4 {
        let half = self.size / (2.0 * self.zoom);
        let center = self.position + self.size / 2.0;
        Mat4::new_orthographic(
            center.x - half.x,
            center.x + half.x,
            center.y + half.y,
            center.y - half.y,
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_corners_map_to_clip_space() {
        let camera = OrthoCamera::new(800.0, 600.0);
        let vp = camera.view_projection();

        let top_left = vp * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(top_left.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(top_left.y, 1.0, epsilon = 1e-5);

        let bottom_right = vp * Vec4::new(800.0, 600.0, 0.0, 1.0);
        assert_relative_eq!(bottom_right.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(bottom_right.y, -1.0, epsilon = 1e-5);
    }
}
