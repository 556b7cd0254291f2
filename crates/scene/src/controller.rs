//! First-person camera movement.

use crate::camera::Camera;

/// Pitch is kept just shy of straight up/down so the view matrix never
/// degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Per-frame movement intent, each axis in [-1.0, 1.0].
///
/// How window events map to these axes is the application's policy; the
/// controller only integrates them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveIntent {
    /// Along the camera's horizontal forward axis
    pub forward: f32,
    /// Along the camera's right axis
    pub strafe: f32,
    /// Yaw change, positive turns right
    pub turn: f32,
    /// Pitch change, positive looks up
    pub look: f32,
}

/// Integrates [`MoveIntent`] into a [`Camera`], scaled by delta time.
#[derive(Clone, Copy, Debug)]
pub struct FirstPersonController {
    /// Movement speed, world units per second
    pub move_speed: f32,
    /// Turn speed, radians per second
    pub turn_speed: f32,
}

impl Default for FirstPersonController {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            turn_speed: 1.5,
        }
    }
}

impl FirstPersonController {
    /// Applies one frame of movement. Motion stays on the horizontal plane
    /// regardless of pitch, so looking down never walks into the floor.
    pub fn update(&self, camera: &mut Camera, intent: MoveIntent, delta_secs: f32) {
        camera.yaw += intent.turn * self.turn_speed * delta_secs;
        camera.pitch = (camera.pitch + intent.look * self.turn_speed * delta_secs)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let flat_forward = glam::Vec3::new(camera.yaw.sin(), 0.0, -camera.yaw.cos());
        let right = camera.right();

        let step = (flat_forward * intent.forward + right * intent.strafe)
            * self.move_speed
            * delta_secs;
        camera.position += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn forward_intent_walks_down_negative_z() {
        let controller = FirstPersonController {
            move_speed: 2.0,
            turn_speed: 1.0,
        };
        let mut camera = Camera::default();

        controller.update(
            &mut camera,
            MoveIntent {
                forward: 1.0,
                ..Default::default()
            },
            0.5,
        );

        assert!((camera.position - Vec3::new(0.0, 1.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn strafe_intent_walks_right() {
        let controller = FirstPersonController::default();
        let mut camera = Camera::default();

        controller.update(
            &mut camera,
            MoveIntent {
                strafe: 1.0,
                ..Default::default()
            },
            1.0,
        );

        assert!(camera.position.x > 0.0);
        assert_eq!(camera.position.z, 0.0);
    }

    #[test]
    fn turn_intent_changes_yaw_only() {
        let controller = FirstPersonController::default();
        let mut camera = Camera::default();
        let start = camera.position;

        controller.update(
            &mut camera,
            MoveIntent {
                turn: 1.0,
                ..Default::default()
            },
            1.0,
        );

        assert!(camera.yaw > 0.0);
        assert_eq!(camera.pitch, 0.0);
        assert_eq!(camera.position, start);
    }

    #[test]
    fn pitch_clamps_short_of_vertical() {
        let controller = FirstPersonController {
            move_speed: 5.0,
            turn_speed: 100.0,
        };
        let mut camera = Camera::default();

        controller.update(
            &mut camera,
            MoveIntent {
                look: 1.0,
                ..Default::default()
            },
            10.0,
        );

        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        assert!(camera.pitch >= PITCH_LIMIT - 1e-6);
    }

    #[test]
    fn movement_scales_with_delta_time() {
        let controller = FirstPersonController::default();
        let mut slow = Camera::default();
        let mut fast = Camera::default();
        let intent = MoveIntent {
            forward: 1.0,
            ..Default::default()
        };

        controller.update(&mut slow, intent, 0.1);
        controller.update(&mut fast, intent, 0.2);

        let slow_dist = (slow.position - Camera::default().position).length();
        let fast_dist = (fast.position - Camera::default().position).length();
        assert!((fast_dist - 2.0 * slow_dist).abs() < 1e-5);
    }

    #[test]
    fn zero_intent_is_a_no_op() {
        let controller = FirstPersonController::default();
        let mut camera = Camera::default();

        controller.update(&mut camera, MoveIntent::default(), 0.016);

        assert_eq!(camera.position, Camera::default().position);
        assert_eq!(camera.yaw, 0.0);
    }
}
