use crate::{Aabb, Mat4};

pub const FRUSTUM_ZNEAR: f32 = 0.125;

/// Six clip planes `(a,b,c,d)` with `a*x + b*y + c*z + d >= 0` inside.
/// Order: left, right, bottom, top, near, far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub planes: [[f32; 4]; 6],
}

impl Frustum {
    /// Extracts planes from a combined view-projection matrix. `radius` is the
    /// render radius in chunks and only affects the far plane.
    pub fn from_matrix(radius: i32, chunk_size: i32, matrix: &Mat4) -> Self {
        let znear = FRUSTUM_ZNEAR;
        let zfar = (radius * chunk_size + 64) as f32;
        let m = &matrix.0;
        let plane = |row: usize, sign: f32| {
            [
                m[3] + sign * m[row],
                m[7] + sign * m[4 + row],
                m[11] + sign * m[8 + row],
                m[15] + sign * m[12 + row],
            ]
        };
        Frustum {
            planes: [
                plane(0, 1.0),
                plane(0, -1.0),
                plane(1, 1.0),
                plane(1, -1.0),
                [
                    znear * m[3] + m[2],
                    znear * m[7] + m[6],
                    znear * m[11] + m[10],
                    znear * m[15] + m[14],
                ],
                [
                    zfar * m[3] - m[2],
                    zfar * m[7] - m[6],
                    zfar * m[11] - m[10],
                    zfar * m[15] - m[14],
                ],
            ],
        }
    }

    /// False only when every corner of the box is behind a single plane.
    /// `planes` limits the test to the first N planes (4 for orthographic views).
    pub fn intersects_aabb(&self, aabb: &Aabb, planes: usize) -> bool {
        let corners = aabb.corners();
        for plane in self.planes.iter().take(planes.min(6)) {
            let (mut inside, mut outside) = (0, 0);
            for c in &corners {
                let d = plane[0] * c.x + plane[1] * c.y + plane[2] * c.z + plane[3];
                if d < 0.0 {
                    outside += 1;
                } else {
                    inside += 1;
                }
                if inside > 0 && outside > 0 {
                    break;
                }
            }
            if inside == 0 {
                return false;
            }
        }
        true
    }
}
