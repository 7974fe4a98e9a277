// Graphics pipeline construction.
//
// The pipeline layout is owned by the render system that issues push
// constants; this module only builds and binds the pipeline itself.
// Viewport and scissor are dynamic so the pipeline survives window resizes.

use anyhow::{Context, Result};
use ash::vk;
use std::path::Path;
use std::sync::Arc;

use super::device::VulkanDevice;
use super::shader;
use crate::error::RenderError;
use crate::model::Vertex;

pub struct Pipeline {
    device: Arc<VulkanDevice>,
    handle: vk::Pipeline,
}

impl Pipeline {
    /// Build a graphics pipeline for the given render pass and layout.
    ///
    /// Both handles must be live; passing null is a caller bug reported as
    /// `RenderError::IncompletePipelineConfig` before any driver call.
    pub fn new(
        device: Arc<VulkanDevice>,
        vert_path: &Path,
        frag_path: &Path,
        render_pass: vk::RenderPass,
        layout: vk::PipelineLayout,
    ) -> Result<Self> {
        check_handles(layout, render_pass)?;

        let vert_module = shader::load_shader_module(&device.device, vert_path)?;
        let frag_module = match shader::load_shader_module(&device.device, frag_path) {
            Ok(module) => module,
            Err(e) => {
                unsafe { device.device.destroy_shader_module(vert_module, None) };
                return Err(e);
            }
        };

        let result = Self::build(&device, vert_module, frag_module, render_pass, layout);

        // Modules are baked into the pipeline; no longer needed either way.
        unsafe {
            device.device.destroy_shader_module(vert_module, None);
            device.device.destroy_shader_module(frag_module, None);
        }

        let handle = result?;

        log::debug!(
            "Created graphics pipeline ({} + {})",
            vert_path.display(),
            frag_path.display()
        );

        Ok(Self { device, handle })
    }

    fn build(
        device: &VulkanDevice,
        vert_module: vk::ShaderModule,
        frag_module: vk::ShaderModule,
        render_pass: vk::RenderPass,
        layout: vk::PipelineLayout,
    ) -> Result<vk::Pipeline> {
        let entry_point = c"main";

        let stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vert_module)
                .name(entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(frag_module)
                .name(entry_point),
        ];

        let binding_descriptions = Vertex::binding_descriptions();
        let attribute_descriptions = Vertex::attribute_descriptions();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&binding_descriptions)
            .vertex_attribute_descriptions(&attribute_descriptions);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Counts only; the actual rects are set per frame.
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::CLOCKWISE)
            .depth_bias_enable(false);

        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(false);
        let color_blend_attachments = [color_blend_attachment];
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(true)
            .depth_write_enable(true)
            .depth_compare_op(vk::CompareOp::LESS)
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .color_blend_state(&color_blend)
            .depth_stencil_state(&depth_stencil)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(0);

        let pipelines = unsafe {
            device
                .device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
                .map_err(|(_, e)| e)
                .context("Failed to create graphics pipeline")?
        };

        Ok(pipelines[0])
    }

    /// Bind for subsequent draw calls.
    pub fn bind(&self, command_buffer: vk::CommandBuffer) {
        unsafe {
            self.device.device.cmd_bind_pipeline(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                self.handle,
            );
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_pipeline(self.handle, None);
        }
    }
}

fn check_handles(layout: vk::PipelineLayout, render_pass: vk::RenderPass) -> Result<(), RenderError> {
    if layout == vk::PipelineLayout::null() {
        return Err(RenderError::IncompletePipelineConfig {
            missing: "pipeline layout",
        });
    }
    if render_pass == vk::RenderPass::null() {
        return Err(RenderError::IncompletePipelineConfig {
            missing: "render pass",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn null_layout_is_rejected_first() {
        let err = check_handles(vk::PipelineLayout::null(), vk::RenderPass::null()).unwrap_err();
        assert_eq!(
            err,
            RenderError::IncompletePipelineConfig {
                missing: "pipeline layout"
            }
        );
    }

    #[test]
    fn null_render_pass_is_rejected() {
        let layout = vk::PipelineLayout::from_raw(1);
        let err = check_handles(layout, vk::RenderPass::null()).unwrap_err();
        assert_eq!(
            err,
            RenderError::IncompletePipelineConfig {
                missing: "render pass"
            }
        );
    }

    #[test]
    fn live_handles_pass() {
        let layout = vk::PipelineLayout::from_raw(1);
        let render_pass = vk::RenderPass::from_raw(2);
        assert!(check_handles(layout, render_pass).is_ok());
    }
}
