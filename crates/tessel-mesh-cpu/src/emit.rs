use tessel_blocks::{BlockId, block_tiles, plant_tile};
use tessel_geom::Mat4;

use crate::constants::{
    ATLAS_TILES_PER_ROW, FLOATS_PER_VERTEX, PLANT_FACES, TILE_INSET, TILE_SIZE, VERTS_PER_FACE,
};
use crate::face::Face;
use crate::occlusion::CornerShading;

const CUBE_POSITIONS: [[[f32; 3]; 4]; 6] = [
    [[-1., -1., -1.], [-1., -1., 1.], [-1., 1., -1.], [-1., 1., 1.]],
    [[1., -1., -1.], [1., -1., 1.], [1., 1., -1.], [1., 1., 1.]],
    [[-1., 1., -1.], [-1., 1., 1.], [1., 1., -1.], [1., 1., 1.]],
    [[-1., -1., -1.], [-1., -1., 1.], [1., -1., -1.], [1., -1., 1.]],
    [[-1., -1., -1.], [-1., 1., -1.], [1., -1., -1.], [1., 1., -1.]],
    [[-1., -1., 1.], [-1., 1., 1.], [1., -1., 1.], [1., 1., 1.]],
];

const CUBE_UVS: [[[bool; 2]; 4]; 6] = [
    [[false, false], [true, false], [false, true], [true, true]],
    [[true, false], [false, false], [true, true], [false, true]],
    [[false, true], [false, false], [true, true], [true, false]],
    [[false, false], [false, true], [true, false], [true, true]],
    [[false, false], [false, true], [true, false], [true, true]],
    [[true, false], [true, true], [false, false], [false, true]],
];

const CUBE_INDICES: [[usize; 6]; 6] = [
    [0, 3, 2, 0, 1, 3],
    [0, 3, 1, 0, 2, 3],
    [0, 3, 2, 0, 1, 3],
    [0, 3, 1, 0, 2, 3],
    [0, 3, 2, 0, 1, 3],
    [0, 3, 1, 0, 2, 3],
];

// Same quads split along the other diagonal.
const CUBE_FLIPPED: [[usize; 6]; 6] = [
    [0, 1, 2, 1, 3, 2],
    [0, 2, 1, 2, 3, 1],
    [0, 1, 2, 1, 3, 2],
    [0, 2, 1, 2, 3, 1],
    [0, 1, 2, 1, 3, 2],
    [0, 2, 1, 2, 3, 1],
];

const PLANT_POSITIONS: [[[f32; 3]; 4]; 4] = [
    [[0., -1., -1.], [0., -1., 1.], [0., 1., -1.], [0., 1., 1.]],
    [[0., -1., -1.], [0., -1., 1.], [0., 1., -1.], [0., 1., 1.]],
    [[-1., -1., 0.], [-1., 1., 0.], [1., -1., 0.], [1., 1., 0.]],
    [[-1., -1., 0.], [-1., 1., 0.], [1., -1., 0.], [1., 1., 0.]],
];

const PLANT_NORMALS: [[f32; 3]; 4] = [[-1., 0., 0.], [1., 0., 0.], [0., 0., -1.], [0., 0., 1.]];

const PLANT_UVS: [[[bool; 2]; 4]; 4] = [
    [[false, false], [true, false], [false, true], [true, true]],
    [[true, false], [false, false], [true, true], [false, true]],
    [[false, false], [false, true], [true, false], [true, true]],
    [[true, false], [true, true], [false, false], [false, true]],
];

const PLANT_INDICES: [[usize; 6]; 4] = [
    [0, 3, 2, 0, 1, 3],
    [0, 3, 1, 0, 2, 3],
    [0, 3, 2, 0, 1, 3],
    [0, 3, 1, 0, 2, 3],
];

#[inline]
fn tile_origin(tile: u16) -> (f32, f32) {
    (
        f32::from(tile % ATLAS_TILES_PER_ROW) * TILE_SIZE,
        f32::from(tile / ATLAS_TILES_PER_ROW) * TILE_SIZE,
    )
}

/// Appends the visible faces of a cube centered at `center` with half extent `n`.
pub fn make_cube(
    data: &mut Vec<f32>,
    shading: &CornerShading,
    visible: [bool; 6],
    center: [f32; 3],
    n: f32,
    w: BlockId,
) {
    let tiles = block_tiles(w);
    let (a, b) = (TILE_INSET, TILE_SIZE - TILE_INSET);
    let [x, y, z] = center;
    for face in Face::ALL {
        let i = face.index();
        if !visible[i] {
            continue;
        }
        let normal = face.normal();
        let (du, dv) = tile_origin(tiles[i]);
        let ao = shading.ao[i];
        let flip = ao[0] + ao[3] > ao[1] + ao[2];
        let order = if flip { &CUBE_FLIPPED[i] } else { &CUBE_INDICES[i] };
        for &j in order {
            let pos = CUBE_POSITIONS[i][j];
            let uv = CUBE_UVS[i][j];
            data.extend_from_slice(&[
                x + n * pos[0],
                y + n * pos[1],
                z + n * pos[2],
                normal.x,
                normal.y,
                normal.z,
                du + if uv[0] { b } else { a },
                dv + if uv[1] { b } else { a },
                ao[j],
                shading.light[i][j],
            ]);
        }
    }
}

/// Appends the four crossed quads of a plant, spun `rotation` degrees about Y
/// and centered at `center`.
pub fn make_plant(
    data: &mut Vec<f32>,
    ao: f32,
    light: f32,
    center: [f32; 3],
    n: f32,
    w: BlockId,
    rotation: f32,
) {
    let (du, dv) = tile_origin(plant_tile(w));
    let (a, b) = (0.0, TILE_SIZE);
    let start = data.len();
    for i in 0..PLANT_FACES {
        for &j in &PLANT_INDICES[i] {
            let pos = PLANT_POSITIONS[i][j];
            let uv = PLANT_UVS[i][j];
            data.extend_from_slice(&[
                n * pos[0],
                n * pos[1],
                n * pos[2],
                PLANT_NORMALS[i][0],
                PLANT_NORMALS[i][1],
                PLANT_NORMALS[i][2],
                du + if uv[0] { b } else { a },
                dv + if uv[1] { b } else { a },
                ao,
                light,
            ]);
        }
    }
    let verts = PLANT_FACES * VERTS_PER_FACE;
    let quad = &mut data[start..];
    let rotate = Mat4::rotate(0.0, 1.0, 0.0, rotation.to_radians());
    rotate.apply(quad, verts, 3, FLOATS_PER_VERTEX);
    let place = Mat4::translate(center[0], center[1], center[2]) * rotate;
    place.apply(quad, verts, 0, FLOATS_PER_VERTEX);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOATS_PER_FACE;
    use tessel_blocks::{GRASS, RED_FLOWER};

    #[test]
    fn cube_emits_only_visible_faces() {
        let mut data = Vec::new();
        let shading = CornerShading::default();
        let visible = [true, false, true, false, false, true];
        make_cube(&mut data, &shading, visible, [0.0, 0.0, 0.0], 0.5, GRASS);
        assert_eq!(data.len(), 3 * FLOATS_PER_FACE);
        // first vertex of the left face sits on x = -0.5 with a -X normal
        assert_eq!(data[0], -0.5);
        assert_eq!(&data[3..6], &[-1.0, 0.0, 0.0]);
    }

    #[test]
    fn diagonal_flips_toward_darker_corners() {
        let mut shading = CornerShading::default();
        shading.ao[0] = [0.75, 0.0, 0.0, 0.75];
        let mut flipped = Vec::new();
        make_cube(&mut flipped, &shading, [true, false, false, false, false, false], [0.0; 3], 0.5, GRASS);
        let mut plain = Vec::new();
        make_cube(&mut plain, &CornerShading::default(), [true, false, false, false, false, false], [0.0; 3], 0.5, GRASS);
        // second vertex: flipped order uses corner 1, plain uses corner 3
        assert_eq!(&flipped[10..13], &[-0.5, -0.5, 0.5]);
        assert_eq!(&plain[10..13], &[-0.5, 0.5, 0.5]);
    }

    #[test]
    fn plant_is_four_quads_around_center() {
        let mut data = Vec::new();
        make_plant(&mut data, 0.5, 0.25, [10.0, 20.0, 30.0], 0.5, RED_FLOWER, 45.0);
        assert_eq!(data.len(), PLANT_FACES * FLOATS_PER_FACE);
        for v in data.chunks_exact(FLOATS_PER_VERTEX) {
            let (dx, dz) = (v[0] - 10.0, v[2] - 30.0);
            assert!((dx * dx + dz * dz).sqrt() <= 0.5 + 1e-4);
            assert!((v[1] - 20.0).abs() <= 0.5 + 1e-4);
            // normals stay horizontal and unit length
            assert!(v[4].abs() < 1e-6);
            assert!(((v[3] * v[3] + v[5] * v[5]).sqrt() - 1.0).abs() < 1e-4);
            assert_eq!(v[8], 0.5);
            assert_eq!(v[9], 0.25);
        }
    }
}
