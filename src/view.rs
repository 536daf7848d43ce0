use tessel_geom::{FRUSTUM_ZNEAR, Frustum, Mat4, Vec3};
use tessel_map::{CHUNK_SIZE, chunked};

/// Observer pose: position, yaw `rx` and pitch `ry` in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub position: Vec3,
    pub rx: f32,
    pub ry: f32,
    /// Viewport width over height.
    pub aspect: f32,
}

impl View {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            rx: 0.0,
            ry: 0.0,
            aspect: 4.0 / 3.0,
        }
    }

    pub fn looking(mut self, rx: f32, ry: f32) -> Self {
        self.rx = rx;
        self.ry = ry;
        self
    }

    /// Chunk containing the observer.
    #[inline]
    pub fn chunk(&self) -> (i32, i32) {
        (chunked(self.position.x), chunked(self.position.z))
    }

    /// View-projection matrix; the far plane reaches `radius` chunks out.
    pub fn matrix(&self, fov: f32, radius: i32) -> Mat4 {
        let Vec3 { x, y, z } = self.position;
        let zfar = (radius * CHUNK_SIZE + 64) as f32;
        let pitch = Mat4::rotate(self.rx.cos(), 0.0, self.rx.sin(), self.ry);
        let yaw = Mat4::rotate(0.0, 1.0, 0.0, -self.rx);
        let proj = Mat4::perspective(fov, self.aspect, FRUSTUM_ZNEAR, zfar);
        proj * yaw * pitch * Mat4::translate(-x, -y, -z)
    }

    pub fn frustum(&self, fov: f32, radius: i32) -> Frustum {
        Frustum::from_matrix(radius, CHUNK_SIZE, &self.matrix(fov, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_uses_rounded_position() {
        assert_eq!(View::new(31.4, 0.0, -0.4).chunk(), (0, 0));
        assert_eq!(View::new(31.6, 0.0, -0.6).chunk(), (1, -1));
    }

    #[test]
    fn default_pose_looks_down_negative_z() {
        let m = View::new(0.0, 0.0, 0.0).matrix(65.0, 4);
        let ahead = m.transform_point([0.0, 0.0, -10.0]);
        let behind = m.transform_point([0.0, 0.0, 10.0]);
        // clip-space z grows with depth in front of the camera
        assert!(ahead[2] > behind[2]);
    }
}
