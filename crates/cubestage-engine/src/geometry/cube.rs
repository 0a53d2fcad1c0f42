use anyhow::Result;

use crate::paint::Color;

use super::{Mesh, VertexData};

/// Number of faces on the cube.
pub const CUBE_FACES: usize = 6;

/// Vertices per face: two triangles of three.
pub const VERTICES_PER_FACE: usize = 6;

/// Total cube vertices.
pub const CUBE_VERTICES: usize = CUBE_FACES * VERTICES_PER_FACE;

/// Unit cube centered on the origin as a triangle list.
///
/// Face order: front (+Z), back (-Z), left (-X), right (+X), top (+Y), bottom (-Y).
#[rustfmt::skip]
pub const CUBE_POSITIONS: [f32; CUBE_VERTICES * 3] = [
    // front
    -0.5, -0.5,  0.5,
     0.5, -0.5,  0.5,
     0.5,  0.5,  0.5,
     0.5,  0.5,  0.5,
    -0.5,  0.5,  0.5,
    -0.5, -0.5,  0.5,

    // back
    -0.5, -0.5, -0.5,
    -0.5,  0.5, -0.5,
     0.5,  0.5, -0.5,
     0.5,  0.5, -0.5,
     0.5, -0.5, -0.5,
    -0.5, -0.5, -0.5,

    // left
    -0.5, -0.5, -0.5,
    -0.5, -0.5,  0.5,
    -0.5,  0.5,  0.5,
    -0.5,  0.5,  0.5,
    -0.5,  0.5, -0.5,
    -0.5, -0.5, -0.5,

    // right
     0.5, -0.5, -0.5,
     0.5,  0.5, -0.5,
     0.5,  0.5,  0.5,
     0.5,  0.5,  0.5,
     0.5, -0.5,  0.5,
     0.5, -0.5, -0.5,

    // top
    -0.5,  0.5, -0.5,
    -0.5,  0.5,  0.5,
     0.5,  0.5,  0.5,
     0.5,  0.5,  0.5,
     0.5,  0.5, -0.5,
    -0.5,  0.5, -0.5,

    // bottom
    -0.5, -0.5, -0.5,
     0.5, -0.5, -0.5,
     0.5, -0.5,  0.5,
     0.5, -0.5,  0.5,
    -0.5, -0.5,  0.5,
    -0.5, -0.5, -0.5,
];

/// One color per face, in face order.
pub const FACE_COLORS: [Color; CUBE_FACES] = [
    Color::RED,
    Color::GREEN,
    Color::BLUE,
    Color::YELLOW,
    Color::MAGENTA,
    Color::CYAN,
];

/// Expands `FACE_COLORS` to one RGBA entry per vertex.
///
/// Each face color is repeated six times, faces in declaration order, so
/// entry `i` belongs to face `i / 6`.
pub fn cube_colors() -> Vec<f32> {
    FACE_COLORS
        .iter()
        .flat_map(|c| std::iter::repeat_n(c.to_array(), VERTICES_PER_FACE))
        .flatten()
        .collect()
}

pub fn cube() -> Result<Mesh> {
    Mesh::new(
        VertexData::positions(CUBE_POSITIONS)?,
        VertexData::colors(cube_colors())?,
    )
}
