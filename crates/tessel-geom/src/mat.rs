use core::f32::consts::PI;
use core::ops::Mul;

use crate::Vec3;

/// 4x4 matrix, column-major (`m[col * 4 + row]`), OpenGL conventions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4(pub [f32; 16]);

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub fn translate(dx: f32, dy: f32, dz: f32) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m.0[12] = dx;
        m.0[13] = dy;
        m.0[14] = dz;
        m
    }

    /// Rotation of `angle` radians about the axis `(x,y,z)` (normalized here).
    pub fn rotate(x: f32, y: f32, z: f32, angle: f32) -> Mat4 {
        let Vec3 { x, y, z } = Vec3::new(x, y, z).normalized();
        let (s, c) = angle.sin_cos();
        let m = 1.0 - c;
        Mat4([
            m * x * x + c,
            m * x * y - z * s,
            m * z * x + y * s,
            0.0,
            m * x * y + z * s,
            m * y * y + c,
            m * y * z - x * s,
            0.0,
            m * z * x - y * s,
            m * y * z + x * s,
            m * z * z + c,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, znear: f32, zfar: f32) -> Mat4 {
        let t1 = 2.0 * znear;
        let t2 = right - left;
        let t3 = top - bottom;
        let t4 = zfar - znear;
        let mut m = [0.0; 16];
        m[0] = t1 / t2;
        m[5] = t1 / t3;
        m[8] = (right + left) / t2;
        m[9] = (top + bottom) / t3;
        m[10] = (-zfar - znear) / t4;
        m[11] = -1.0;
        m[14] = (-t1 * zfar) / t4;
        Mat4(m)
    }

    /// Perspective projection; `fov` is the vertical field of view in degrees.
    pub fn perspective(fov: f32, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
        let ymax = znear * (fov * PI / 360.0).tan();
        let xmax = ymax * aspect;
        Mat4::frustum(-xmax, xmax, -ymax, ymax, znear, zfar)
    }

    /// Transforms the point `(x,y,z,1)` and drops `w`.
    #[inline]
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let m = &self.0;
        let v = [p[0], p[1], p[2], 1.0];
        let mut out = [0.0f32; 3];
        for (row, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|col| m[col * 4 + row] * v[col]).sum();
        }
        out
    }

    /// Applies the matrix in place to `count` xyz triples inside `data`,
    /// starting at `offset` with `stride` floats between triples.
    pub fn apply(&self, data: &mut [f32], count: usize, offset: usize, stride: usize) {
        for i in 0..count {
            let at = offset + i * stride;
            let Some(slot) = data.get_mut(at..at + 3) else {
                return;
            };
            let out = self.transform_point([slot[0], slot[1], slot[2]]);
            slot.copy_from_slice(&out);
        }
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let (a, b) = (&self.0, &rhs.0);
        let mut out = [0.0f32; 16];
        for c in 0..4 {
            for r in 0..4 {
                out[c * 4 + r] = (0..4).map(|i| a[i * 4 + r] * b[c * 4 + i]).sum();
            }
        }
        Mat4(out)
    }
}
