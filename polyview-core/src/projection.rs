/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Bounds;

/// Perspective camera looking down -Z at the origin
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 60.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: 75f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            near: 1.0,
            far: 100.0,
        }
    }

    /// Update the aspect ratio; `pixel_aspect` is pixel height over width
    /// (about 2 for terminal cells).
    pub fn set_viewport(&mut self, width: u32, height: u32, pixel_aspect: f32) {
        self.aspect = width as f32 / (height.max(1) as f32 * pixel_aspect);
    }

    /// Back off along +Z until a sphere of the bounds' radius fills the view.
    pub fn fit(&mut self, bounds: &Bounds) {
        let radius = bounds.radius().max(1e-3);
        let horizontal = (self.aspect * (self.fov * 0.5).tan()).atan();
        let half_fov = (self.fov * 0.5).min(horizontal);
        let distance = radius / half_fov.sin() * 1.1;

        self.target = Point3::origin();
        self.position = Point3::new(0.0, 0.0, distance);
        self.near = distance * 0.01;
        self.far = distance * 20.0;
    }

    /// Distance from the eye to the target
    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a model-space point to screen space using a full MVP matrix.
    ///
    /// Returns `(x, y, depth)` with `depth` in NDC, or `None` outside the
    /// near/far range.
    pub fn project_to_screen(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point.to_homogeneous();
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if ndc.z < -1.0 || ndc.z > 1.0 {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 800)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_relative_eq!(camera.distance(), 60.0);
    }

    #[test]
    fn test_origin_projects_to_centre() {
        let camera = Camera::new(80, 40);
        let mvp = camera.projection_matrix() * camera.view_matrix();
        let (x, y, depth) = Camera::project_to_screen(&mvp, &Point3::origin(), 80, 40).unwrap();
        assert_relative_eq!(x, 40.0, epsilon = 1e-4);
        assert_relative_eq!(y, 20.0, epsilon = 1e-4);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let camera = Camera::new(100, 100);
        let mvp = camera.projection_matrix() * camera.view_matrix();
        let (_, y, _) =
            Camera::project_to_screen(&mvp, &Point3::new(0.0, 5.0, 0.0), 100, 100).unwrap();
        assert!(y < 50.0);
    }

    #[test]
    fn test_behind_camera_is_clipped() {
        let camera = Camera::new(100, 100);
        let mvp = camera.projection_matrix() * camera.view_matrix();
        assert!(Camera::project_to_screen(&mvp, &Point3::new(0.0, 0.0, 100.0), 100, 100).is_none());
    }

    #[test]
    fn test_fit_keeps_bounds_in_view() {
        let mut camera = Camera::new(100, 100);
        let bounds = Bounds {
            min: Point3::new(-10.0, -10.0, -10.0),
            max: Point3::new(10.0, 10.0, 10.0),
        };
        camera.fit(&bounds);
        let mvp = camera.projection_matrix() * camera.view_matrix();
        for corner in [bounds.min, bounds.max] {
            let (x, y, _) = Camera::project_to_screen(&mvp, &corner, 100, 100).unwrap();
            assert!((0.0..=100.0).contains(&x) && (0.0..=100.0).contains(&y));
        }
    }
}
