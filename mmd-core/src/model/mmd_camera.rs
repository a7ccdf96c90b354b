use crate::animation::CameraTransform;
use mmd_math::{Quat, Vec3};

/// Orbit camera in MMD convention: a target point, euler rotation and a signed distance.
#[derive(Debug, Clone, PartialEq)]
pub struct MmdCamera {
    pub target_position: Vec3,
    pub rotation: Vec3,
    pub distance: f32,
    pub fov: f32,
    pub is_perspective: bool,
}

impl MmdCamera {
    pub fn new() -> Self {
        Self {
            target_position: Vec3::new(0.0, 10.0, 0.0),
            rotation: Vec3::ZERO,
            distance: -45.0,
            fov: 30.0,
            is_perspective: true,
        }
    }

    pub fn apply(&mut self, transform: &CameraTransform) {
        self.target_position = transform.target_position;
        self.rotation = transform.rotation;
        self.distance = transform.distance;
        self.fov = transform.fov;
        self.is_perspective = transform.is_perspective;
    }

    pub fn eye_position(&self) -> Vec3 {
        let rotation = Quat::from_euler_yxz(self.rotation);
        self.target_position + rotation.rotate(Vec3::new(0.0, 0.0, self.distance))
    }
}

impl Default for MmdCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_eye_position() {
        let mut camera = MmdCamera::new();
        assert_eq!(camera.eye_position(), Vec3::new(0.0, 10.0, -45.0));

        camera.apply(&CameraTransform {
            target_position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            distance: -10.0,
            fov: 45.0,
            is_perspective: false,
        });
        assert_eq!(camera.eye_position(), Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(camera.fov, 45.0);
    }
}
