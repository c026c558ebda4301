//! Seams to the Vulkan side of replay.
//!
//! The Vulkan replay engine owns instances and devices. This crate only
//! queries it for live handles and dispatch tables, and tells it about the
//! images it creates on the application's behalf.

use std::sync::Arc;

use ash::prelude::VkResult;
use ash::vk;
use xrplay_format::HandleId;

/// Device-level entry points used by swapchain virtualization.
///
/// Handles passed in must belong to the device the table was obtained for.
pub trait DeviceTable: Send + Sync {
    fn create_image(&self, info: &vk::ImageCreateInfo<'_>) -> VkResult<vk::Image>;
    fn destroy_image(&self, image: vk::Image);
    fn get_image_memory_requirements(&self, image: vk::Image) -> vk::MemoryRequirements;

    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo<'_>) -> VkResult<vk::DeviceMemory>;
    fn free_memory(&self, memory: vk::DeviceMemory);
    fn bind_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
    ) -> VkResult<()>;

    fn create_command_pool(&self, info: &vk::CommandPoolCreateInfo<'_>) -> VkResult<vk::CommandPool>;
    fn destroy_command_pool(&self, pool: vk::CommandPool);
    /// Allocate one primary command buffer from `pool`.
    fn allocate_command_buffer(&self, pool: vk::CommandPool) -> VkResult<vk::CommandBuffer>;
    fn free_command_buffer(&self, pool: vk::CommandPool, command_buffer: vk::CommandBuffer);

    fn create_fence(&self, flags: vk::FenceCreateFlags) -> VkResult<vk::Fence>;
    fn destroy_fence(&self, fence: vk::Fence);
    fn wait_for_fence(&self, fence: vk::Fence, timeout: u64) -> VkResult<()>;
    fn reset_fence(&self, fence: vk::Fence) -> VkResult<()>;

    fn begin_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        flags: vk::CommandBufferUsageFlags,
    ) -> VkResult<()>;
    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()>;
    fn cmd_pipeline_barrier(
        &self,
        command_buffer: vk::CommandBuffer,
        src_stage: vk::PipelineStageFlags,
        dst_stage: vk::PipelineStageFlags,
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    );
    fn cmd_copy_image(
        &self,
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_layout: vk::ImageLayout,
        regions: &[vk::ImageCopy],
    );

    /// Submit one command buffer with no semaphores, signaling `fence`.
    fn queue_submit(
        &self,
        queue: vk::Queue,
        command_buffer: vk::CommandBuffer,
        fence: vk::Fence,
    ) -> VkResult<()>;
    fn get_device_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue;
}

/// Instance-level entry points used by swapchain virtualization.
pub trait InstanceTable: Send + Sync {
    fn get_physical_device_memory_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceMemoryProperties;
}

/// Bookkeeping handed to the Vulkan replay engine for images created here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayImageInfo {
    pub memory: vk::DeviceMemory,
    pub is_swapchain_image: bool,
}

/// The Vulkan replay engine, as seen from XR replay.
pub trait VulkanBackend {
    /// Live instance for a captured `VkInstance` id.
    fn map_instance(&self, capture_id: HandleId) -> Option<vk::Instance>;
    /// Live device for a captured `VkDevice` id.
    fn map_device(&self, capture_id: HandleId) -> Option<vk::Device>;

    fn instance_table(&self, physical_device: vk::PhysicalDevice) -> Option<Arc<dyn InstanceTable>>;
    fn device_table(&self, device: vk::Device) -> Option<Arc<dyn DeviceTable>>;

    /// Make a captured image id resolve to `image` in later Vulkan calls.
    fn register_image(
        &self,
        device_id: HandleId,
        image_id: HandleId,
        image: vk::Image,
        info: ReplayImageInfo,
    );
}
