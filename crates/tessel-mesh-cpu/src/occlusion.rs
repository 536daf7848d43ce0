use crate::constants::{AO_CURVE, CENTER, LIGHT_SOURCE_SUM};
use tessel_lighting::MAX_LIGHT;

// Neighborhood cells are indexed (dx+1)*9 + (dy+1)*3 + (dz+1).

/// Per face and corner: diagonal corner cell, then the two edge cells.
const CORNER_SIDES: [[[usize; 3]; 4]; 6] = [
    [[0, 1, 3], [2, 1, 5], [6, 3, 7], [8, 5, 7]],
    [[18, 19, 21], [20, 19, 23], [24, 21, 25], [26, 23, 25]],
    [[6, 7, 15], [8, 7, 17], [24, 15, 25], [26, 17, 25]],
    [[0, 1, 9], [2, 1, 11], [18, 9, 19], [20, 11, 19]],
    [[0, 3, 9], [6, 3, 15], [18, 9, 21], [24, 15, 21]],
    [[2, 5, 11], [8, 5, 17], [20, 11, 23], [26, 17, 23]],
];

/// Per face and corner: the four cells touching that corner.
const CORNER_QUAD: [[[usize; 4]; 4]; 6] = [
    [[0, 1, 3, 4], [1, 2, 4, 5], [3, 4, 6, 7], [4, 5, 7, 8]],
    [
        [18, 19, 21, 22],
        [19, 20, 22, 23],
        [21, 22, 24, 25],
        [22, 23, 25, 26],
    ],
    [[6, 7, 15, 16], [7, 8, 16, 17], [15, 16, 24, 25], [16, 17, 25, 26]],
    [[0, 1, 9, 10], [1, 2, 10, 11], [9, 10, 18, 19], [10, 11, 19, 20]],
    [[0, 3, 9, 12], [3, 6, 12, 15], [9, 12, 18, 21], [12, 15, 21, 24]],
    [[2, 5, 11, 14], [5, 8, 14, 17], [11, 14, 20, 23], [14, 17, 23, 26]],
];

/// The 27 cells around a voxel.
#[derive(Clone, Copy, Debug, Default)]
pub struct Neighborhood {
    pub opaque: [bool; 27],
    pub light: [u8; 27],
    pub shade: [f32; 27],
}

/// Per-face, per-corner shading weights.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerShading {
    pub ao: [[f32; 4]; 6],
    pub light: [[f32; 4]; 6],
}

impl CornerShading {
    pub fn min_ao(&self) -> f32 {
        self.ao.iter().flatten().copied().fold(1.0, f32::min)
    }

    pub fn max_light(&self) -> f32 {
        self.light.iter().flatten().copied().fold(0.0, f32::max)
    }
}

pub fn occlusion(n: &Neighborhood) -> CornerShading {
    let mut out = CornerShading::default();
    let is_light = n.light[CENTER] == MAX_LIGHT;
    for face in 0..6 {
        for corner in 0..4 {
            let [c, s1, s2] = CORNER_SIDES[face][corner];
            let (corner_o, side1, side2) = (n.opaque[c], n.opaque[s1], n.opaque[s2]);
            let value = if side1 && side2 {
                3
            } else {
                usize::from(corner_o) + usize::from(side1) + usize::from(side2)
            };
            let mut shade_sum = 0.0;
            let mut light_sum = 0.0;
            for k in CORNER_QUAD[face][corner] {
                shade_sum += n.shade[k];
                light_sum += f32::from(n.light[k]);
            }
            if is_light {
                light_sum = LIGHT_SOURCE_SUM;
            }
            out.ao[face][corner] = (AO_CURVE[value] + shade_sum / 4.0).min(1.0);
            out.light[face][corner] = light_sum / 15.0 / 4.0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_air_is_unoccluded() {
        let s = occlusion(&Neighborhood::default());
        assert_eq!(s.min_ao(), 0.0);
        assert_eq!(s.ao, [[0.0; 4]; 6]);
        assert_eq!(s.max_light(), 0.0);
    }

    #[test]
    fn two_sides_score_full_occlusion_without_corner() {
        let mut n = Neighborhood::default();
        // left face, first corner: sides 1 and 3
        n.opaque[1] = true;
        n.opaque[3] = true;
        let s = occlusion(&n);
        assert_eq!(s.ao[0][0], 0.75);
        // one side only
        let mut n = Neighborhood::default();
        n.opaque[1] = true;
        assert_eq!(occlusion(&n).ao[0][0], 0.25);
    }

    #[test]
    fn shade_adds_and_clamps() {
        let mut n = Neighborhood::default();
        n.shade = [1.0; 27];
        n.opaque = [true; 27];
        let s = occlusion(&n);
        assert_eq!(s.ao, [[1.0; 4]; 6]);
    }

    #[test]
    fn full_light_cell_overrides_corner_sum() {
        let mut n = Neighborhood::default();
        n.light[CENTER] = MAX_LIGHT;
        let s = occlusion(&n);
        assert_eq!(s.light, [[10.0; 4]; 6]);
        n.light[CENTER] = 14;
        n.light[0] = 14;
        let s = occlusion(&n);
        // left face corner 0 touches cells 0,1,3,4
        assert_eq!(s.light[0][0], 14.0 / 15.0 / 4.0);
    }
}
