//! Vertex layout for the graphics pipeline.

use ash::vk;
use bytemuck::{Pod, Zeroable};

/// Position-only vertex, the one layout the pipeline accepts.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    /// The single vertex buffer binding.
    #[must_use]
    pub fn binding_description() -> vk::VertexInputBindingDescription {
        vk::VertexInputBindingDescription {
            binding: 0,
            stride: std::mem::size_of::<Self>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }
    }

    /// The position attribute at location 0.
    #[must_use]
    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 1] {
        [vk::VertexInputAttributeDescription {
            binding: 0,
            location: 0,
            format: vk::Format::R32G32B32_SFLOAT,
            offset: 0,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_three_packed_floats() {
        let binding = Vertex::binding_description();
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.stride, 12);
        assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);

        let [position] = Vertex::attribute_descriptions();
        assert_eq!(position.location, 0);
        assert_eq!(position.format, vk::Format::R32G32B32_SFLOAT);
        assert_eq!(position.offset, 0);
    }
}
