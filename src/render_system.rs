// Simple render system: one pipeline, per-object push constants.

use anyhow::{Context, Result};
use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::{Pipeline, VulkanDevice};
use crate::camera::Camera;
use crate::game_object::GameObject;

/// Per-draw data handed to the shaders.
///
/// The color sits on a 16-byte boundary after the matrix, with explicit
/// padding so the Rust layout matches the std430 push constant block.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PushConstantData {
    pub transform: Mat4,
    pub color: Vec3,
    _padding: f32,
}

impl PushConstantData {
    pub fn new(transform: Mat4, color: Vec3) -> Self {
        Self {
            transform,
            color,
            _padding: 0.0,
        }
    }
}

pub struct SimpleRenderSystem {
    device: Arc<VulkanDevice>,
    pipeline_layout: vk::PipelineLayout,
    pipeline: Pipeline,
    vert_path: PathBuf,
    frag_path: PathBuf,
}

impl SimpleRenderSystem {
    pub fn new(
        device: Arc<VulkanDevice>,
        render_pass: vk::RenderPass,
        vert_path: PathBuf,
        frag_path: PathBuf,
    ) -> Result<Self> {
        let pipeline_layout = Self::create_pipeline_layout(&device)?;
        let pipeline = Pipeline::new(
            device.clone(),
            &vert_path,
            &frag_path,
            render_pass,
            pipeline_layout,
        )?;

        Ok(Self {
            device,
            pipeline_layout,
            pipeline,
            vert_path,
            frag_path,
        })
    }

    fn create_pipeline_layout(device: &VulkanDevice) -> Result<vk::PipelineLayout> {
        let push_constant_range = vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)
            .offset(0)
            .size(std::mem::size_of::<PushConstantData>() as u32);

        let ranges = [push_constant_range];
        let layout_info = vk::PipelineLayoutCreateInfo::default().push_constant_ranges(&ranges);

        unsafe {
            device
                .device
                .create_pipeline_layout(&layout_info, None)
                .context("Failed to create pipeline layout")
        }
    }

    /// Rebuild the pipeline against a new render pass after swapchain
    /// recreation. The layout is unchanged.
    pub fn recreate_pipeline(&mut self, render_pass: vk::RenderPass) -> Result<()> {
        self.pipeline = Pipeline::new(
            self.device.clone(),
            &self.vert_path,
            &self.frag_path,
            render_pass,
            self.pipeline_layout,
        )?;
        Ok(())
    }

    /// Record draw commands for every object that carries a mesh.
    pub fn render_game_objects(
        &self,
        command_buffer: vk::CommandBuffer,
        objects: &[GameObject],
        camera: &Camera,
    ) {
        self.pipeline.bind(command_buffer);

        let projection_view = camera.projection() * camera.view();

        for object in objects {
            let Some(model) = &object.model else {
                continue;
            };

            let push = PushConstantData::new(
                projection_view * object.transform.mat4(),
                object.color,
            );

            unsafe {
                self.device.device.cmd_push_constants(
                    command_buffer,
                    self.pipeline_layout,
                    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                    0,
                    bytemuck::bytes_of(&push),
                );
            }

            model.bind(command_buffer);
            model.draw(command_buffer);
        }
    }
}

impl Drop for SimpleRenderSystem {
    fn drop(&mut self) {
        unsafe {
            self.device
                .device
                .destroy_pipeline_layout(self.pipeline_layout, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_constants_are_eighty_bytes() {
        assert_eq!(std::mem::size_of::<PushConstantData>(), 80);
    }

    #[test]
    fn color_starts_at_a_sixteen_byte_boundary() {
        let offset = std::mem::offset_of!(PushConstantData, color);
        assert_eq!(offset, 64);
        assert_eq!(offset % 16, 0);
    }
}
