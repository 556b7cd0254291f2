//! First-person camera with Vulkan-style projection.

use glam::{Mat4, Vec3};

/// Yaw/pitch camera.
///
/// Yaw 0, pitch 0 looks down -Z; positive yaw turns toward +X. The
/// projection negates the Y axis so clip space matches Vulkan's
/// downward-pointing framebuffer Y.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Position in world space
    pub position: Vec3,
    /// Rotation around the world Y axis, radians
    pub yaw: f32,
    /// Rotation around the camera's right axis, radians
    pub pitch: f32,
    /// Vertical field of view, radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            fov_y: 70.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Unit vector the camera is looking along.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// Unit vector to the camera's right, always horizontal.
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let mut proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        // Flip Y for Vulkan's coordinate system
        proj.y_axis.y *= -1.0;
        proj
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_stand_at_eye_height() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 1.0, 0.0));
        assert!((camera.fov_y - 70.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, 0.0);
    }

    #[test]
    fn zero_yaw_looks_down_negative_z() {
        let camera = Camera::default();
        let forward = camera.forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn quarter_turn_looks_down_positive_x() {
        let camera = Camera {
            yaw: std::f32::consts::FRAC_PI_2,
            ..Camera::default()
        };
        assert!((camera.forward() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn projection_flips_y_for_vulkan() {
        let camera = Camera::default();
        let proj = camera.projection_matrix();
        assert!(proj.y_axis.y < 0.0);
    }

    #[test]
    fn combined_matrix_applies_projection_after_view() {
        let camera = Camera {
            position: Vec3::new(1.0, 2.0, 3.0),
            yaw: 0.4,
            ..Camera::default()
        };
        let expected = camera.projection_matrix() * camera.view_matrix();
        assert!(camera.view_projection_matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn right_stays_horizontal_under_pitch() {
        let camera = Camera {
            pitch: 0.5,
            ..Camera::default()
        };
        assert_eq!(camera.right().y, 0.0);
    }
}
