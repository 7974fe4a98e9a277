// Swapchain - the presentation engine.
//
// Owns the swapchain images and views, the depth buffer per image, the
// render pass and framebuffers, and the per-slot synchronization objects.
// Recreation chains the retired swapchain through `old_swapchain` so the
// driver can recycle resources while presentation continues.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use super::device::VulkanDevice;
use super::sync::{FrameCursor, FrameSync, ImagesInFlight};
use crate::error::RenderError;

/// Number of frames the CPU may record ahead of the GPU.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

const DEPTH_FORMAT_CANDIDATES: [vk::Format; 3] = [
    vk::Format::D32_SFLOAT,
    vk::Format::D32_SFLOAT_S8_UINT,
    vk::Format::D24_UNORM_S8_UINT,
];

/// Result of asking the presentation engine for the next image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAcquire {
    /// An image is ready for rendering.
    Ready(u32),
    /// The swapchain no longer matches the surface; recreate before retrying.
    OutOfDate,
}

/// Result of handing a finished frame back to the presentation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Optimal,
    /// Presented (or failed to), but the swapchain should be recreated.
    NeedsRecreate,
}

pub struct Swapchain {
    device: Arc<VulkanDevice>,
    loader: ash::khr::swapchain::Device,

    handle: vk::SwapchainKHR,
    image_format: vk::Format,
    depth_format: vk::Format,
    extent: vk::Extent2D,

    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,

    depth_images: Vec<vk::Image>,
    depth_memories: Vec<vk::DeviceMemory>,
    depth_views: Vec<vk::ImageView>,

    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,

    frame_sync: Vec<FrameSync>,
    cursor: FrameCursor,
    images_in_flight: ImagesInFlight,
}

impl Swapchain {
    /// Create a fresh swapchain for the given window extent.
    pub fn new(device: Arc<VulkanDevice>, window_extent: vk::Extent2D, vsync: bool) -> Result<Self> {
        Self::build(device, window_extent, vsync, vk::SwapchainKHR::null())
    }

    /// Replace `previous` with a swapchain matching the new extent.
    ///
    /// The retired swapchain is passed to the driver via `old_swapchain` and
    /// destroyed only after the replacement exists. Image and depth formats
    /// must not change across recreation; the render pass owned by the new
    /// swapchain stays compatible with pipelines built against the old one.
    pub fn recreate(
        device: Arc<VulkanDevice>,
        window_extent: vk::Extent2D,
        vsync: bool,
        previous: Swapchain,
    ) -> Result<Self> {
        let replacement = Self::build(device, window_extent, vsync, previous.handle)?;

        if replacement.image_format != previous.image_format
            || replacement.depth_format != previous.depth_format
        {
            anyhow::bail!("Swapchain image or depth format changed across recreation");
        }

        drop(previous);
        Ok(replacement)
    }

    fn build(
        device: Arc<VulkanDevice>,
        window_extent: vk::Extent2D,
        vsync: bool,
        old_swapchain: vk::SwapchainKHR,
    ) -> Result<Self> {
        let loader = ash::khr::swapchain::Device::new(&device.instance, &device.device);

        // Start with null handles so Drop can release whatever part of the
        // construction succeeded.
        let mut swapchain = Self {
            device,
            loader,
            handle: vk::SwapchainKHR::null(),
            image_format: vk::Format::UNDEFINED,
            depth_format: vk::Format::UNDEFINED,
            extent: vk::Extent2D::default(),
            images: Vec::new(),
            image_views: Vec::new(),
            depth_images: Vec::new(),
            depth_memories: Vec::new(),
            depth_views: Vec::new(),
            render_pass: vk::RenderPass::null(),
            framebuffers: Vec::new(),
            frame_sync: Vec::new(),
            cursor: FrameCursor::new(MAX_FRAMES_IN_FLIGHT),
            images_in_flight: ImagesInFlight::new(0),
        };

        swapchain.create_swapchain(window_extent, vsync, old_swapchain)?;
        swapchain.create_image_views()?;
        swapchain.create_render_pass()?;
        swapchain.create_depth_resources()?;
        swapchain.create_framebuffers()?;
        swapchain.create_sync_objects()?;

        log::debug!(
            "Swapchain ready: {} images, {}x{}, {:?}",
            swapchain.images.len(),
            swapchain.extent.width,
            swapchain.extent.height,
            swapchain.image_format,
        );

        Ok(swapchain)
    }

    fn create_swapchain(
        &mut self,
        window_extent: vk::Extent2D,
        vsync: bool,
        old_swapchain: vk::SwapchainKHR,
    ) -> Result<()> {
        let support = self.device.swapchain_support()?;
        if support.formats.is_empty() {
            return Err(RenderError::UnusableSurface {
                reason: "no surface formats reported",
            }
            .into());
        }
        if support.present_modes.is_empty() {
            return Err(RenderError::UnusableSurface {
                reason: "no present modes reported",
            }
            .into());
        }

        let surface_format = choose_surface_format(&support.formats);
        let present_mode = choose_present_mode(&support.present_modes, vsync);
        let extent = choose_extent(&support.capabilities, window_extent);
        let image_count = choose_image_count(&support.capabilities);

        log::debug!("Present mode: {:?}", present_mode);

        let graphics_family = self.device.graphics_queue_family;
        let present_family = self.device.present_queue_family;
        let family_indices = [graphics_family, present_family];

        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(self.device.surface())
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        create_info = if graphics_family != present_family {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&family_indices)
        } else {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        };

        self.handle = unsafe {
            self.loader
                .create_swapchain(&create_info, None)
                .context("Failed to create swapchain")?
        };

        self.images = unsafe {
            self.loader
                .get_swapchain_images(self.handle)
                .context("Failed to get swapchain images")?
        };
        self.image_format = surface_format.format;
        self.extent = extent;
        self.images_in_flight = ImagesInFlight::new(self.images.len());

        Ok(())
    }

    fn create_image_views(&mut self) -> Result<()> {
        self.image_views = self
            .images
            .iter()
            .map(|&image| {
                let view_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(self.image_format)
                    .subresource_range(
                        vk::ImageSubresourceRange::default()
                            .aspect_mask(vk::ImageAspectFlags::COLOR)
                            .base_mip_level(0)
                            .level_count(1)
                            .base_array_layer(0)
                            .layer_count(1),
                    );

                unsafe {
                    self.device
                        .device
                        .create_image_view(&view_info, None)
                        .context("Failed to create swapchain image view")
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(())
    }

    fn create_render_pass(&mut self) -> Result<()> {
        self.depth_format = select_depth_format(|format| {
            self.device.format_supported(
                format,
                vk::ImageTiling::OPTIMAL,
                vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
            )
        })?;

        let color_attachment = vk::AttachmentDescription::default()
            .format(self.image_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);

        let depth_attachment = vk::AttachmentDescription::default()
            .format(self.depth_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

        let color_ref = vk::AttachmentReference::default()
            .attachment(0)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        let depth_ref = vk::AttachmentReference::default()
            .attachment(1)
            .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

        let color_refs = [color_ref];
        let subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .depth_stencil_attachment(&depth_ref);

        let dependency = vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                    | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            )
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                    | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            )
            .dst_access_mask(
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                    | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            );

        let attachments = [color_attachment, depth_attachment];
        let subpasses = [subpass];
        let dependencies = [dependency];

        let render_pass_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        self.render_pass = unsafe {
            self.device
                .device
                .create_render_pass(&render_pass_info, None)
                .context("Failed to create render pass")?
        };

        Ok(())
    }

    fn create_depth_resources(&mut self) -> Result<()> {
        for _ in 0..self.images.len() {
            let image_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .extent(vk::Extent3D {
                    width: self.extent.width,
                    height: self.extent.height,
                    depth: 1,
                })
                .mip_levels(1)
                .array_layers(1)
                .format(self.depth_format)
                .tiling(vk::ImageTiling::OPTIMAL)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
                .samples(vk::SampleCountFlags::TYPE_1)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let (image, memory) = self
                .device
                .create_image_with_info(&image_info, vk::MemoryPropertyFlags::DEVICE_LOCAL)?;
            self.depth_images.push(image);
            self.depth_memories.push(memory);

            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.depth_format)
                .subresource_range(
                    vk::ImageSubresourceRange::default()
                        .aspect_mask(vk::ImageAspectFlags::DEPTH)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1),
                );

            let view = unsafe {
                self.device
                    .device
                    .create_image_view(&view_info, None)
                    .context("Failed to create depth image view")?
            };
            self.depth_views.push(view);
        }

        Ok(())
    }

    fn create_framebuffers(&mut self) -> Result<()> {
        self.framebuffers = self
            .image_views
            .iter()
            .zip(&self.depth_views)
            .map(|(&color, &depth)| {
                let attachments = [color, depth];
                let framebuffer_info = vk::FramebufferCreateInfo::default()
                    .render_pass(self.render_pass)
                    .attachments(&attachments)
                    .width(self.extent.width)
                    .height(self.extent.height)
                    .layers(1);

                unsafe {
                    self.device
                        .device
                        .create_framebuffer(&framebuffer_info, None)
                        .context("Failed to create framebuffer")
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(())
    }

    fn create_sync_objects(&mut self) -> Result<()> {
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            self.frame_sync.push(FrameSync::new(self.device.clone())?);
        }
        Ok(())
    }

    // =========================================================================
    // FRAME PROTOCOL
    // =========================================================================

    /// Wait for the current frame slot and acquire the next image.
    ///
    /// The wait on the slot fence is unbounded: a stalled GPU means nothing
    /// useful can happen anyway, so no timeout path exists.
    pub fn acquire_next_image(&mut self) -> Result<FrameAcquire> {
        let sync = &self.frame_sync[self.cursor.current()];

        unsafe {
            self.device
                .device
                .wait_for_fences(&[sync.in_flight], true, u64::MAX)
                .context("Failed to wait for frame fence")?;
        }

        let result = unsafe {
            self.loader.acquire_next_image(
                self.handle,
                u64::MAX,
                sync.image_available,
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, _suboptimal)) => Ok(FrameAcquire::Ready(image_index)),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(FrameAcquire::OutOfDate),
            Err(e) => Err(anyhow::anyhow!(e).context("Failed to acquire swapchain image")),
        }
    }

    /// Submit the recorded command buffer and present the image.
    ///
    /// The frame cursor advances exactly once per call, even when the present
    /// reports the swapchain out of date.
    pub fn submit_and_present(
        &mut self,
        command_buffer: vk::CommandBuffer,
        image_index: u32,
    ) -> Result<PresentOutcome> {
        // An earlier frame may still be rendering to this image.
        if let Some(slot) = self.images_in_flight.slot_for(image_index as usize) {
            let fence = self.frame_sync[slot].in_flight;
            unsafe {
                self.device
                    .device
                    .wait_for_fences(&[fence], true, u64::MAX)
                    .context("Failed to wait for image fence")?;
            }
        }
        self.images_in_flight
            .mark(image_index as usize, self.cursor.current());

        let sync = &self.frame_sync[self.cursor.current()];

        let wait_semaphores = [sync.image_available];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [sync.render_finished];
        let command_buffers = [command_buffer];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device
                .device
                .reset_fences(&[sync.in_flight])
                .context("Failed to reset frame fence")?;
            self.device
                .device
                .queue_submit(self.device.graphics_queue, &[submit_info], sync.in_flight)
                .context("Failed to submit draw command buffer")?;
        }

        let swapchains = [self.handle];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let present_result = unsafe {
            self.loader
                .queue_present(self.device.present_queue, &present_info)
        };

        self.cursor.advance();

        match present_result {
            Ok(false) => Ok(PresentOutcome::Optimal),
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::NeedsRecreate),
            Err(e) => Err(anyhow::anyhow!(e).context("Failed to present swapchain image")),
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.extent.width as f32 / self.extent.height as f32
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        let device = &self.device.device;

        unsafe {
            // Sync objects drop on their own; everything else in reverse order.
            self.frame_sync.clear();

            for &framebuffer in &self.framebuffers {
                device.destroy_framebuffer(framebuffer, None);
            }
            for &view in &self.depth_views {
                device.destroy_image_view(view, None);
            }
            for (&image, &memory) in self.depth_images.iter().zip(&self.depth_memories) {
                device.destroy_image(image, None);
                device.free_memory(memory, None);
            }
            if self.render_pass != vk::RenderPass::null() {
                device.destroy_render_pass(self.render_pass, None);
            }
            for &view in &self.image_views {
                device.destroy_image_view(view, None);
            }
            if self.handle != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(self.handle, None);
            }
        }
    }
}

// =============================================================================
// SELECTION HELPERS
// =============================================================================

/// Prefer B8G8R8A8_SRGB with a nonlinear sRGB color space, else the first
/// format the surface offers.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .copied()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .unwrap_or(formats[0])
}

/// Mailbox beats immediate beats FIFO; `vsync` forces FIFO, which is always
/// available.
pub fn choose_present_mode(modes: &[vk::PresentModeKHR], vsync: bool) -> vk::PresentModeKHR {
    if vsync {
        return vk::PresentModeKHR::FIFO;
    }

    for preferred in [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE] {
        if modes.contains(&preferred) {
            return preferred;
        }
    }

    vk::PresentModeKHR::FIFO
}

/// The surface dictates the extent unless it reports the sentinel width,
/// in which case the window extent is clamped into the supported range.
pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    window_extent: vk::Extent2D,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: window_extent.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: window_extent.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One more than the minimum, capped by the maximum when one is declared
/// (zero means unbounded).
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        count = capabilities.max_image_count;
    }
    count
}

/// First depth format the device supports, in order of preference.
pub fn select_depth_format<F>(supported: F) -> Result<vk::Format, RenderError>
where
    F: Fn(vk::Format) -> bool,
{
    DEPTH_FORMAT_CANDIDATES
        .iter()
        .copied()
        .find(|&format| supported(format))
        .ok_or(RenderError::NoSupportedDepthFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    #[test]
    fn surface_format_prefers_srgb_bgra() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
    }

    #[test]
    fn surface_format_falls_back_to_first() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::R16G16B16A16_SFLOAT, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn present_mode_prefers_mailbox() {
        let modes = [
            vk::PresentModeKHR::FIFO,
            vk::PresentModeKHR::MAILBOX,
            vk::PresentModeKHR::IMMEDIATE,
        ];
        assert_eq!(
            choose_present_mode(&modes, false),
            vk::PresentModeKHR::MAILBOX
        );
    }

    #[test]
    fn present_mode_falls_back_to_immediate_then_fifo() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(
            choose_present_mode(&modes, false),
            vk::PresentModeKHR::IMMEDIATE
        );

        let modes = [vk::PresentModeKHR::FIFO];
        assert_eq!(choose_present_mode(&modes, false), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn vsync_forces_fifo_even_when_mailbox_exists() {
        let modes = [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO];
        assert_eq!(choose_present_mode(&modes, true), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn extent_uses_surface_value_when_fixed() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 1024,
                height: 768,
            },
            ..Default::default()
        };
        let chosen = choose_extent(
            &capabilities,
            vk::Extent2D {
                width: 111,
                height: 222,
            },
        );
        assert_eq!(chosen.width, 1024);
        assert_eq!(chosen.height, 768);
    }

    #[test]
    fn extent_clamps_window_size_when_surface_is_flexible() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 200,
                height: 200,
            },
            max_image_extent: vk::Extent2D {
                width: 1600,
                height: 900,
            },
            ..Default::default()
        };

        let chosen = choose_extent(
            &capabilities,
            vk::Extent2D {
                width: 5000,
                height: 100,
            },
        );
        assert_eq!(chosen.width, 1600);
        assert_eq!(chosen.height, 200);
    }

    #[test]
    fn image_count_is_min_plus_one_clamped_to_max() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 3,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&capabilities), 3);

        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 3,
            max_image_count: 3,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&capabilities), 3);
    }

    #[test]
    fn image_count_treats_zero_max_as_unbounded() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 4,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&capabilities), 5);
    }

    #[test]
    fn depth_format_takes_first_supported_candidate() {
        let chosen = select_depth_format(|f| f == vk::Format::D32_SFLOAT_S8_UINT).unwrap();
        assert_eq!(chosen, vk::Format::D32_SFLOAT_S8_UINT);

        let chosen = select_depth_format(|_| true).unwrap();
        assert_eq!(chosen, vk::Format::D32_SFLOAT);
    }

    #[test]
    fn depth_format_errors_when_nothing_is_supported() {
        let err = select_depth_format(|_| false).unwrap_err();
        assert_eq!(err, RenderError::NoSupportedDepthFormat);
    }
}
