use crate::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalized();
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    /// Builds a rotation from MMD camera euler angles, applied in yaw (y), pitch (x), roll (z) order.
    pub fn from_euler_yxz(euler: Vec3) -> Self {
        let yaw = Self::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), euler.y);
        let pitch = Self::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), euler.x);
        let roll = Self::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), euler.z);
        yaw * pitch * roll
    }

    pub fn dot(lhs: Self, rhs: Self) -> f32 {
        lhs.x * rhs.x + lhs.y * rhs.y + lhs.z * rhs.z + lhs.w * rhs.w
    }

    pub fn normalized(self) -> Self {
        let len = Self::dot(self, self).sqrt();

        if len <= f32::EPSILON {
            Self::IDENTITY
        } else {
            let inv = 1.0 / len;
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        }
    }

    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Spherical interpolation along the shortest arc. `t` is not clamped.
    pub fn slerp(from: Self, to: Self, t: f32) -> Self {
        let mut to = to;
        let mut cos = Self::dot(from, to);

        if cos < 0.0 {
            to = Self::new(-to.x, -to.y, -to.z, -to.w);
            cos = -cos;
        }

        let (k0, k1) = if 0.9995 < cos {
            (1.0 - t, t)
        } else {
            let theta = cos.acos();
            let sin = theta.sin();
            (((1.0 - t) * theta).sin() / sin, (t * theta).sin() / sin)
        };

        Self::new(
            from.x * k0 + to.x * k1,
            from.y * k0 + to.y * k1,
            from.z * k0 + to.z * k1,
            from.w * k0 + to.w * k1,
        )
        .normalized()
    }

    pub fn rotate(self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = Vec3::cross(q, v) * 2.0;
        v + t * self.w + Vec3::cross(q, t)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}
