// Frame orchestrator.
//
// Owns the swapchain and the per-image command buffers, and enforces the
// begin/end frame state machine. A frame that cannot start (swapchain out of
// date, window minimized) simply yields no command buffer; the caller skips
// rendering and tries again next redraw.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use crate::backend::{FrameAcquire, PresentOutcome, Swapchain, VulkanDevice};

/// Nonzero drawable area, or `None` while the window is minimized.
pub fn usable_extent(width: u32, height: u32) -> Option<vk::Extent2D> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(vk::Extent2D { width, height })
}

pub struct Renderer {
    device: Arc<VulkanDevice>,
    swapchain: Option<Swapchain>,
    command_buffers: Vec<vk::CommandBuffer>,
    clear_color: [f32; 4],
    vsync: bool,

    is_frame_started: bool,
    current_image_index: u32,
}

impl Renderer {
    pub fn new(
        device: Arc<VulkanDevice>,
        window_extent: vk::Extent2D,
        vsync: bool,
        clear_color: [f32; 4],
    ) -> Result<Self> {
        let swapchain = Swapchain::new(device.clone(), window_extent, vsync)?;
        let command_buffers = Self::allocate_command_buffers(&device, swapchain.image_count())?;

        Ok(Self {
            device,
            swapchain: Some(swapchain),
            command_buffers,
            clear_color,
            vsync,
            is_frame_started: false,
            current_image_index: 0,
        })
    }

    fn allocate_command_buffers(
        device: &VulkanDevice,
        count: usize,
    ) -> Result<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_pool(device.command_pool())
            .command_buffer_count(count as u32);

        unsafe {
            device
                .device
                .allocate_command_buffers(&alloc_info)
                .context("Failed to allocate command buffers")
        }
    }

    fn swapchain(&self) -> &Swapchain {
        self.swapchain.as_ref().expect("swapchain always present outside recreation")
    }

    pub fn render_pass(&self) -> vk::RenderPass {
        self.swapchain().render_pass()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.swapchain().aspect_ratio()
    }

    pub fn is_frame_started(&self) -> bool {
        self.is_frame_started
    }

    /// Start a frame: wait for the in-flight slot, acquire an image, and
    /// begin its command buffer.
    ///
    /// Returns `None` when the swapchain had to be recreated instead; the
    /// caller should skip this frame.
    pub fn begin_frame(&mut self, window_extent: vk::Extent2D) -> Result<Option<vk::CommandBuffer>> {
        assert!(!self.is_frame_started, "begin_frame called twice");

        let swapchain = self.swapchain.as_mut().expect("swapchain always present outside recreation");
        match swapchain.acquire_next_image()? {
            FrameAcquire::OutOfDate => {
                self.recreate_swapchain(window_extent)?;
                Ok(None)
            }
            FrameAcquire::Ready(image_index) => {
                self.current_image_index = image_index;
                self.is_frame_started = true;

                let command_buffer = self.command_buffers[image_index as usize];
                let begin_info = vk::CommandBufferBeginInfo::default();
                unsafe {
                    self.device
                        .device
                        .begin_command_buffer(command_buffer, &begin_info)
                        .context("Failed to begin command buffer")?;
                }

                Ok(Some(command_buffer))
            }
        }
    }

    /// Submit and present the frame.
    ///
    /// Recreates the swapchain when presentation asks for it or the window
    /// was resized, whichever comes first; returns whether recreation
    /// happened so the caller can rebuild render-pass-dependent state.
    pub fn end_frame(
        &mut self,
        window_extent: vk::Extent2D,
        window_resized: bool,
    ) -> Result<bool> {
        assert!(self.is_frame_started, "end_frame without begin_frame");

        let command_buffer = self.command_buffers[self.current_image_index as usize];
        unsafe {
            self.device
                .device
                .end_command_buffer(command_buffer)
                .context("Failed to end command buffer")?;
        }

        let swapchain = self.swapchain.as_mut().expect("swapchain always present outside recreation");
        let outcome = swapchain.submit_and_present(command_buffer, self.current_image_index)?;
        self.is_frame_started = false;

        if outcome == PresentOutcome::NeedsRecreate || window_resized {
            if window_extent.width > 0 && window_extent.height > 0 {
                self.recreate_swapchain(window_extent)?;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Begin the swapchain render pass on the current frame's command buffer
    /// and set the full-extent viewport and scissor.
    pub fn begin_swapchain_render_pass(&self, command_buffer: vk::CommandBuffer) {
        assert!(self.is_frame_started, "render pass outside a frame");
        debug_assert_eq!(
            command_buffer,
            self.command_buffers[self.current_image_index as usize]
        );

        let swapchain = self.swapchain();
        let extent = swapchain.extent();

        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: self.clear_color,
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];

        let render_pass_info = vk::RenderPassBeginInfo::default()
            .render_pass(swapchain.render_pass())
            .framebuffer(swapchain.framebuffer(self.current_image_index))
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .clear_values(&clear_values);

        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };

        unsafe {
            self.device.device.cmd_begin_render_pass(
                command_buffer,
                &render_pass_info,
                vk::SubpassContents::INLINE,
            );
            self.device
                .device
                .cmd_set_viewport(command_buffer, 0, &[viewport]);
            self.device
                .device
                .cmd_set_scissor(command_buffer, 0, &[scissor]);
        }
    }

    pub fn end_swapchain_render_pass(&self, command_buffer: vk::CommandBuffer) {
        assert!(self.is_frame_started, "render pass outside a frame");
        unsafe {
            self.device.device.cmd_end_render_pass(command_buffer);
        }
    }

    fn recreate_swapchain(&mut self, window_extent: vk::Extent2D) -> Result<()> {
        self.device.wait_idle()?;

        let previous = self
            .swapchain
            .take()
            .context("swapchain missing during recreation")?;
        let replacement =
            Swapchain::recreate(self.device.clone(), window_extent, self.vsync, previous)?;

        // Image count can change with the extent; resize the command buffer
        // pool slice to match.
        if replacement.image_count() != self.command_buffers.len() {
            unsafe {
                self.device
                    .device
                    .free_command_buffers(self.device.command_pool(), &self.command_buffers);
            }
            self.command_buffers =
                Self::allocate_command_buffers(&self.device, replacement.image_count())?;
        }

        self.swapchain = Some(replacement);

        log::debug!(
            "Swapchain recreated at {}x{}",
            window_extent.width,
            window_extent.height
        );

        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.device.wait_idle();
        unsafe {
            self.device
                .device
                .free_command_buffers(self.device.command_pool(), &self.command_buffers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_area_extent_is_unusable() {
        assert_eq!(usable_extent(0, 600), None);
        assert_eq!(usable_extent(800, 0), None);
        assert_eq!(usable_extent(0, 0), None);
    }

    #[test]
    fn nonzero_extent_passes_through() {
        let extent = usable_extent(800, 600).unwrap();
        assert_eq!(extent.width, 800);
        assert_eq!(extent.height, 600);
    }

    #[test]
    fn minimize_then_restore_sequence_gates_rendering() {
        // Scripted window sizes across a minimize/restore cycle: rendering
        // must be skipped exactly while either dimension is zero.
        let sizes = [(800, 600), (0, 0), (0, 0), (1024, 768)];
        let rendered: Vec<bool> = sizes
            .iter()
            .map(|&(w, h)| usable_extent(w, h).is_some())
            .collect();
        assert_eq!(rendered, vec![true, false, false, true]);
    }
}
