// Mesh data: vertex layout and the GPU-side vertex buffer.

use anyhow::Result;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::sync::Arc;

use crate::backend::{DeviceBuffer, VulkanDevice};
use crate::error::RenderError;

/// Interleaved vertex: position then color, tightly packed.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }

    pub fn binding_descriptions() -> [vk::VertexInputBindingDescription; 1] {
        [vk::VertexInputBindingDescription::default()
            .binding(0)
            .stride(std::mem::size_of::<Vertex>() as u32)
            .input_rate(vk::VertexInputRate::VERTEX)]
    }

    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 2] {
        [
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(0)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(std::mem::offset_of!(Vertex, position) as u32),
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(1)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(std::mem::offset_of!(Vertex, color) as u32),
        ]
    }
}

/// A mesh uploaded to the GPU, shareable between game objects.
pub struct Model {
    device: Arc<VulkanDevice>,
    vertex_buffer: DeviceBuffer,
    vertex_count: u32,
}

impl Model {
    /// Upload `vertices` into a fresh vertex buffer.
    ///
    /// The vertex count is validated before any allocation happens.
    pub fn new(device: Arc<VulkanDevice>, vertices: &[Vertex]) -> Result<Self> {
        validate_vertex_count(vertices.len())?;

        let vertex_buffer = DeviceBuffer::with_data(
            device.clone(),
            bytemuck::cast_slice(vertices),
            vk::BufferUsageFlags::VERTEX_BUFFER,
        )?;

        Ok(Self {
            device,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        })
    }

    pub fn bind(&self, command_buffer: vk::CommandBuffer) {
        let buffers = [self.vertex_buffer.buffer];
        let offsets = [0];
        unsafe {
            self.device
                .device
                .cmd_bind_vertex_buffers(command_buffer, 0, &buffers, &offsets);
        }
    }

    pub fn draw(&self, command_buffer: vk::CommandBuffer) {
        unsafe {
            self.device
                .device
                .cmd_draw(command_buffer, self.vertex_count, 1, 0, 0);
        }
    }
}

fn validate_vertex_count(count: usize) -> Result<(), RenderError> {
    if count < 3 {
        return Err(RenderError::InsufficientVertices { count });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::offset_of!(Vertex, position), 0);
        assert_eq!(std::mem::offset_of!(Vertex, color), 12);
    }

    #[test]
    fn attribute_offsets_match_layout() {
        let attrs = Vertex::attribute_descriptions();
        assert_eq!(attrs[0].offset, 0);
        assert_eq!(attrs[1].offset, 12);
        assert_eq!(
            Vertex::binding_descriptions()[0].stride,
            std::mem::size_of::<Vertex>() as u32
        );
    }

    #[test]
    fn fewer_than_three_vertices_is_rejected() {
        let err = validate_vertex_count(2).unwrap_err();
        assert_eq!(err, RenderError::InsufficientVertices { count: 2 });

        let err = validate_vertex_count(0).unwrap_err();
        assert_eq!(err, RenderError::InsufficientVertices { count: 0 });
    }

    #[test]
    fn three_vertices_is_enough() {
        assert!(validate_vertex_count(3).is_ok());
    }
}
