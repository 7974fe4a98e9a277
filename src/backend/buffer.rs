// GPU buffer with owned memory.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use super::device::VulkanDevice;

/// A buffer and its backing allocation, freed together on drop.
pub struct DeviceBuffer {
    device: Arc<VulkanDevice>,
    pub buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
}

impl DeviceBuffer {
    pub fn new(
        device: Arc<VulkanDevice>,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> Result<Self> {
        let (buffer, memory) = device.create_buffer(size, usage, properties)?;
        Ok(Self {
            device,
            buffer,
            memory,
            size,
        })
    }

    /// Create a host-visible buffer pre-filled with `data`.
    pub fn with_data(
        device: Arc<VulkanDevice>,
        data: &[u8],
        usage: vk::BufferUsageFlags,
    ) -> Result<Self> {
        let buffer = Self::new(
            device,
            data.len() as vk::DeviceSize,
            usage,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;
        buffer.write(data)?;
        Ok(buffer)
    }

    /// Copy `data` into the buffer. The memory must be host-visible.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        debug_assert!(data.len() as vk::DeviceSize <= self.size);

        unsafe {
            let mapped = self
                .device
                .device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .context("Failed to map buffer memory")?;

            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped as *mut u8, data.len());

            self.device.device.unmap_memory(self.memory);
        }

        Ok(())
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.device.destroy_buffer(self.buffer, None);
            self.device.device.free_memory(self.memory, None);
        }
    }
}
