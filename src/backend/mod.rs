// Vulkan backend: device, presentation, pipeline and buffer plumbing.

pub mod buffer;
pub mod device;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;

pub use buffer::DeviceBuffer;
pub use device::{SwapchainSupport, VulkanDevice};
pub use pipeline::Pipeline;
pub use swapchain::{FrameAcquire, PresentOutcome, Swapchain, MAX_FRAMES_IN_FLIGHT};
pub use sync::{FrameCursor, FrameSync, ImagesInFlight};
