use anyhow::{ensure, Result};

/// Flat vertex attribute data: `components` floats per vertex, tightly packed.
///
/// Immutable once built; the GPU copy is uploaded as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    values: Vec<f32>,
    components: u8,
}

impl VertexData {
    /// Component count of a position (x, y, z).
    pub const POSITION_COMPONENTS: u8 = 3;
    /// Component count of a color (r, g, b, a).
    pub const COLOR_COMPONENTS: u8 = 4;

    /// Groups `values` into vertices of `components` floats.
    ///
    /// Fails on an empty sequence, a component count outside `1..=4`, or a
    /// length that is not a multiple of `components`.
    pub fn new(values: impl Into<Vec<f32>>, components: u8) -> Result<Self> {
        let values = values.into();
        ensure!(
            (1..=4).contains(&components),
            "vertex components must be 1..=4, got {components}"
        );
        ensure!(!values.is_empty(), "vertex data is empty");
        ensure!(
            values.len() % components as usize == 0,
            "{} floats do not group into vertices of {components}",
            values.len()
        );
        ensure!(
            values.iter().all(|v| v.is_finite()),
            "vertex data contains a non-finite value"
        );
        Ok(Self { values, components })
    }

    pub fn positions(values: impl Into<Vec<f32>>) -> Result<Self> {
        Self::new(values, Self::POSITION_COMPONENTS)
    }

    pub fn colors(values: impl Into<Vec<f32>>) -> Result<Self> {
        Self::new(values, Self::COLOR_COMPONENTS)
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn components(&self) -> u8 {
        self.components
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        (self.values.len() / self.components as usize) as u32
    }

    /// Iterates vertices as slices of `components` floats.
    pub fn vertices(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.components as usize)
    }

    /// Raw bytes for upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }
}

/// Parallel position and color tables describing one drawable object.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: VertexData,
    pub colors: VertexData,
}

impl Mesh {
    /// Pairs the two tables; both must describe the same number of vertices.
    pub fn new(positions: VertexData, colors: VertexData) -> Result<Self> {
        ensure!(
            positions.vertex_count() == colors.vertex_count(),
            "mesh has {} positions but {} colors",
            positions.vertex_count(),
            colors.vertex_count()
        );
        Ok(Self { positions, colors })
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.positions.vertex_count()
    }
}
