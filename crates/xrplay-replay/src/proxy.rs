//! Proxy images: the render targets replay hands out in place of the ones
//! recorded at capture time.

use ash::vk;

use crate::backend::DeviceTable;
use crate::error::{ReplayError, ReplayResult};

/// Lowest memory type index allowed by `type_bits` that has every flag in
/// `required`.
pub fn select_memory_type(
    properties: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    required: vk::MemoryPropertyFlags,
) -> ReplayResult<u32> {
    let count = properties.memory_type_count.min(vk::MAX_MEMORY_TYPES as u32);
    (0..count)
        .find(|&i| {
            type_bits & (1 << i) != 0
                && properties.memory_types[i as usize]
                    .property_flags
                    .contains(required)
        })
        .ok_or(ReplayError::NoSuitableMemoryType {
            type_bits,
            required,
        })
}

/// One captured swapchain image's GPU resources.
///
/// The fence is created signaled. `in_flight` is set whenever the fence may
/// still be pending or has not been reset since it last signaled; the
/// command buffer may only be recorded once it is clear.
#[derive(Debug, Default)]
pub struct ProxyImage {
    pub image: vk::Image,
    pub memory: vk::DeviceMemory,
    pub command_buffer: vk::CommandBuffer,
    pub fence: vk::Fence,
    in_flight: bool,
}

impl ProxyImage {
    /// Create the image, back it with device-local memory, and allocate its
    /// command buffer and fence.
    ///
    /// On failure everything created so far is released again.
    pub fn create(
        device: &dyn DeviceTable,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        command_pool: vk::CommandPool,
        image_info: &vk::ImageCreateInfo<'_>,
    ) -> ReplayResult<Self> {
        let mut proxy = ProxyImage::default();
        match proxy.populate(device, memory_properties, command_pool, image_info) {
            Ok(()) => Ok(proxy),
            Err(e) => {
                proxy.destroy(device, command_pool);
                Err(e)
            }
        }
    }

    fn populate(
        &mut self,
        device: &dyn DeviceTable,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        command_pool: vk::CommandPool,
        image_info: &vk::ImageCreateInfo<'_>,
    ) -> ReplayResult<()> {
        self.image = device
            .create_image(image_info)
            .map_err(ReplayError::vulkan("vkCreateImage"))?;

        let requirements = device.get_image_memory_requirements(self.image);
        let memory_type_index = select_memory_type(
            memory_properties,
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;
        let alloc_info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);
        self.memory = device
            .allocate_memory(&alloc_info)
            .map_err(ReplayError::vulkan("vkAllocateMemory"))?;
        device
            .bind_image_memory(self.image, self.memory, 0)
            .map_err(ReplayError::vulkan("vkBindImageMemory"))?;

        self.command_buffer = device
            .allocate_command_buffer(command_pool)
            .map_err(ReplayError::vulkan("vkAllocateCommandBuffers"))?;
        self.fence = device
            .create_fence(vk::FenceCreateFlags::SIGNALED)
            .map_err(ReplayError::vulkan("vkCreateFence"))?;
        // Signaled but not reset: must be reclaimed before first use.
        self.in_flight = true;
        Ok(())
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Called once the fence has been waited on and reset.
    pub(crate) fn mark_reclaimed(&mut self) {
        self.in_flight = false;
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.in_flight = true;
    }

    /// Release every resource this bundle owns. Null handles are skipped,
    /// so a partially created bundle can be destroyed too.
    pub fn destroy(&mut self, device: &dyn DeviceTable, command_pool: vk::CommandPool) {
        if self.fence != vk::Fence::null() {
            device.destroy_fence(self.fence);
            self.fence = vk::Fence::null();
        }
        if self.command_buffer != vk::CommandBuffer::null() {
            device.free_command_buffer(command_pool, self.command_buffer);
            self.command_buffer = vk::CommandBuffer::null();
        }
        if self.image != vk::Image::null() {
            device.destroy_image(self.image);
            self.image = vk::Image::null();
        }
        if self.memory != vk::DeviceMemory::null() {
            device.free_memory(self.memory);
            self.memory = vk::DeviceMemory::null();
        }
        self.in_flight = false;
    }
}
