//! Vertex tables and their validated containers.
//!
//! Geometry is plain CPU data. Uploading it is the backend's job
//! (`render::RenderBackend::upload`); nothing here touches the GPU.

mod cube;
mod data;
mod triangle;

pub use cube::{
    cube, cube_colors, CUBE_FACES, CUBE_POSITIONS, CUBE_VERTICES, FACE_COLORS, VERTICES_PER_FACE,
};
pub use data::{Mesh, VertexData};
pub use triangle::{triangle, TRIANGLE_COLORS, TRIANGLE_POSITIONS};
