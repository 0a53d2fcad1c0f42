use anyhow::Result;

use super::{Mesh, VertexData};

/// Three clip-space corners: right-bottom, top, left-bottom.
#[rustfmt::skip]
pub const TRIANGLE_POSITIONS: [f32; 9] = [
     1.0, -1.0, 0.0,
     0.0,  1.0, 0.0,
    -1.0, -1.0, 0.0,
];

/// One primary color per corner.
#[rustfmt::skip]
pub const TRIANGLE_COLORS: [f32; 12] = [
    1.0, 0.0, 0.0, 1.0,
    0.0, 1.0, 0.0, 1.0,
    0.0, 0.0, 1.0, 1.0,
];

pub fn triangle() -> Result<Mesh> {
    Mesh::new(
        VertexData::positions(TRIANGLE_POSITIONS)?,
        VertexData::colors(TRIANGLE_COLORS)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_vertices_with_one_color_each() {
        let mesh = triangle().unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.colors.vertex_count(), 3);
    }

    #[test]
    fn lies_in_the_z_zero_plane() {
        let mesh = triangle().unwrap();
        assert!(mesh.positions.vertices().all(|v| v[2] == 0.0));
    }
}
