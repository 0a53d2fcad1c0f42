use super::BufferId;

/// Numeric type of one attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ComponentType {
    #[default]
    Float32,
}

impl ComponentType {
    #[inline]
    pub const fn size(self) -> u64 {
        match self {
            ComponentType::Float32 => 4,
        }
    }
}

/// How one attribute's values sit in its buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttributeLayout {
    pub components: u8,
    pub kind: ComponentType,
    /// Bytes between consecutive vertices; 0 means tightly packed.
    pub stride: u64,
    /// Byte offset of the first vertex.
    pub offset: u64,
}

impl AttributeLayout {
    /// `components` floats per vertex, no interleaving, zero offset.
    #[inline]
    pub const fn tightly_packed(components: u8) -> Self {
        Self {
            components,
            kind: ComponentType::Float32,
            stride: 0,
            offset: 0,
        }
    }

    /// Effective stride in bytes.
    #[inline]
    pub fn byte_stride(&self) -> u64 {
        if self.stride == 0 {
            self.components as u64 * self.kind.size()
        } else {
            self.stride
        }
    }

    /// Matching wgpu vertex format, if the component count is supported.
    pub fn vertex_format(&self) -> Option<wgpu::VertexFormat> {
        match (self.kind, self.components) {
            (ComponentType::Float32, 1) => Some(wgpu::VertexFormat::Float32),
            (ComponentType::Float32, 2) => Some(wgpu::VertexFormat::Float32x2),
            (ComponentType::Float32, 3) => Some(wgpu::VertexFormat::Float32x3),
            (ComponentType::Float32, 4) => Some(wgpu::VertexFormat::Float32x4),
            _ => None,
        }
    }
}

/// A buffer attached to one shader input location.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttributeBinding {
    pub location: u32,
    pub buffer: BufferId,
    pub layout: AttributeLayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tightly_packed_stride_is_component_size() {
        assert_eq!(AttributeLayout::tightly_packed(3).byte_stride(), 12);
        assert_eq!(AttributeLayout::tightly_packed(4).byte_stride(), 16);
    }

    #[test]
    fn explicit_stride_wins() {
        let layout = AttributeLayout { stride: 28, ..AttributeLayout::tightly_packed(3) };
        assert_eq!(layout.byte_stride(), 28);
    }

    #[test]
    fn vertex_formats_follow_component_count() {
        assert_eq!(AttributeLayout::tightly_packed(3).vertex_format(), Some(wgpu::VertexFormat::Float32x3));
        assert_eq!(AttributeLayout::tightly_packed(4).vertex_format(), Some(wgpu::VertexFormat::Float32x4));
        assert_eq!(AttributeLayout::tightly_packed(5).vertex_format(), None);
    }
}
