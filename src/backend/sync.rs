// Frame synchronization primitives.
//
// The GPU-facing half (`FrameSync`) owns the semaphores and fence for one
// in-flight frame slot. The bookkeeping half (`FrameCursor`, `ImagesInFlight`)
// is plain state with no Vulkan handles so the hazard rules can be tested
// without a device.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use super::device::VulkanDevice;

/// Synchronization objects for a single in-flight frame slot.
pub struct FrameSync {
    device: Arc<VulkanDevice>,
    pub image_available: vk::Semaphore,
    pub render_finished: vk::Semaphore,
    pub in_flight: vk::Fence,
}

impl FrameSync {
    /// Create semaphores and a fence for one slot. The fence starts signaled
    /// so the first wait on it returns immediately.
    pub fn new(device: Arc<VulkanDevice>) -> Result<Self> {
        let semaphore_info = vk::SemaphoreCreateInfo::default();
        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

        unsafe {
            let image_available = device
                .device
                .create_semaphore(&semaphore_info, None)
                .context("Failed to create image-available semaphore")?;
            let render_finished = device
                .device
                .create_semaphore(&semaphore_info, None)
                .context("Failed to create render-finished semaphore")?;
            let in_flight = device
                .device
                .create_fence(&fence_info, None)
                .context("Failed to create in-flight fence")?;

            Ok(Self {
                device,
                image_available,
                render_finished,
                in_flight,
            })
        }
    }
}

impl Drop for FrameSync {
    fn drop(&mut self) {
        unsafe {
            self.device
                .device
                .destroy_semaphore(self.image_available, None);
            self.device
                .device
                .destroy_semaphore(self.render_finished, None);
            self.device.device.destroy_fence(self.in_flight, None);
        }
    }
}

/// Cycles through in-flight frame slots: 0, 1, 0, 1, ...
///
/// Advancing happens once per presented frame, regardless of whether the
/// present reported the swapchain out of date.
#[derive(Debug, Clone, Copy)]
pub struct FrameCursor {
    current: usize,
    slots: usize,
}

impl FrameCursor {
    pub fn new(slots: usize) -> Self {
        debug_assert!(slots > 0);
        Self { current: 0, slots }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.slots;
    }
}

/// Tracks which in-flight slot last rendered to each swapchain image.
///
/// Acquire can hand back an image the GPU is still rendering from an earlier
/// frame; before reusing it the caller must wait on the fence of the slot
/// recorded here.
#[derive(Debug, Clone)]
pub struct ImagesInFlight {
    slots: Vec<Option<usize>>,
}

impl ImagesInFlight {
    pub fn new(image_count: usize) -> Self {
        Self {
            slots: vec![None; image_count],
        }
    }

    /// The frame slot that last used `image_index`, if any.
    pub fn slot_for(&self, image_index: usize) -> Option<usize> {
        self.slots[image_index]
    }

    /// Record that `frame_slot` now owns `image_index`.
    pub fn mark(&mut self, image_index: usize, frame_slot: usize) {
        self.slots[image_index] = Some(frame_slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_cycles_modulo_slot_count() {
        let mut cursor = FrameCursor::new(2);
        assert_eq!(cursor.current(), 0);
        cursor.advance();
        assert_eq!(cursor.current(), 1);
        cursor.advance();
        assert_eq!(cursor.current(), 0);
        cursor.advance();
        assert_eq!(cursor.current(), 1);
    }

    #[test]
    fn cursor_visits_each_slot_equally_over_many_frames() {
        let mut cursor = FrameCursor::new(2);
        let mut visits = [0usize; 2];
        for _ in 0..1000 {
            visits[cursor.current()] += 1;
            cursor.advance();
        }
        assert_eq!(visits, [500, 500]);
    }

    #[test]
    fn images_start_unowned() {
        let images = ImagesInFlight::new(3);
        for i in 0..3 {
            assert_eq!(images.slot_for(i), None);
        }
    }

    #[test]
    fn marking_records_latest_owner() {
        let mut images = ImagesInFlight::new(3);
        images.mark(1, 0);
        assert_eq!(images.slot_for(1), Some(0));
        assert_eq!(images.slot_for(0), None);

        // Same image reused by the other slot later.
        images.mark(1, 1);
        assert_eq!(images.slot_for(1), Some(1));
    }

    #[test]
    fn hazard_appears_when_image_returns_before_slot_cycles() {
        // Three images, two slots: image 0 is acquired by slot 0, then again
        // two frames later by slot 0. The table must still name slot 0 so the
        // caller waits on its fence before re-recording.
        let mut images = ImagesInFlight::new(3);
        let mut cursor = FrameCursor::new(2);

        images.mark(0, cursor.current());
        cursor.advance();
        images.mark(1, cursor.current());
        cursor.advance();

        assert_eq!(images.slot_for(0), Some(0));
    }
}
