/// Camera and projection utilities.
///
/// The camera works in nalgebra's column-vector convention. It consumes
/// world-space points, i.e. points already carried through a row-vector model
/// matrix by [`crate::transform::transform_point`].
use nalgebra::{Matrix4, Point3, Vector3};

use crate::description::{CameraStatement, Projection};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

impl From<Projection> for ProjectionMode {
    fn from(projection: Projection) -> Self {
        match projection {
            Projection::Perspective => Self::Perspective,
            Projection::Orthographic => Self::Orthographic,
        }
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Create a camera from a decoded camera statement
    pub fn from_statement(statement: &CameraStatement, width: u32, height: u32) -> Self {
        let [ex, ey, ez] = statement.eye;
        let [tx, ty, tz] = statement.target;
        let [ux, uy, uz] = statement.up;
        Self {
            position: Point3::new(ex, ey, ez),
            target: Point3::new(tx, ty, tz),
            up: Vector3::new(ux, uy, uz),
            mode: statement.projection.into(),
            ..Self::new(width, height)
        }
    }

    /// Update the aspect ratio after a viewport resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Project a world-space point to 2D screen space
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let view_projection = self.projection_matrix() * self.view_matrix();

        // Homogeneous divide happens inside transform_point
        let ndc = view_projection.transform_point(point);
        let eye = self.view_matrix().transform_point(point);

        // Behind the camera
        if eye.z > -self.near {
            return None;
        }

        // Clip test
        if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, -eye.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
