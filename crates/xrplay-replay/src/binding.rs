//! Graphics API a session renders with, resolved to live Vulkan objects.

use std::fmt;
use std::sync::Arc;

use ash::vk;
use tracing::info;
use xrplay_format::structs::{GraphicsBindingVulkan, SessionCreateInfo};
use xrplay_format::HandleId;

use crate::backend::{DeviceTable, InstanceTable, VulkanBackend};
use crate::error::{ReplayError, ReplayResult};
use crate::proxy::ProxyImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsBindingKind {
    Vulkan,
    Unset,
}

/// The graphics API a session was created with.
#[derive(Debug, Clone)]
pub enum GraphicsBinding {
    Vulkan(VulkanGraphicsBinding),
    /// No binding the replay understands was chained to the session.
    Unset,
}

impl GraphicsBinding {
    /// Build the binding for a session from its mapped create info.
    pub fn from_session_info(
        info: &SessionCreateInfo,
        backend: &dyn VulkanBackend,
    ) -> ReplayResult<Self> {
        match info.next.graphics_binding_vulkan() {
            Some(binding) => Ok(GraphicsBinding::Vulkan(VulkanGraphicsBinding::new(
                binding, backend,
            )?)),
            None => Ok(GraphicsBinding::Unset),
        }
    }

    pub fn kind(&self) -> GraphicsBindingKind {
        match self {
            GraphicsBinding::Vulkan(_) => GraphicsBindingKind::Vulkan,
            GraphicsBinding::Unset => GraphicsBindingKind::Unset,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, GraphicsBinding::Unset)
    }

    pub fn is_vulkan(&self) -> bool {
        matches!(self, GraphicsBinding::Vulkan(_))
    }

    pub fn vulkan(&self) -> ReplayResult<&VulkanGraphicsBinding> {
        match self {
            GraphicsBinding::Vulkan(binding) => Ok(binding),
            GraphicsBinding::Unset => Err(ReplayError::MissingGraphicsBinding),
        }
    }
}

/// Live Vulkan objects a session renders with.
#[derive(Clone)]
pub struct VulkanGraphicsBinding {
    pub instance_table: Arc<dyn InstanceTable>,
    pub device_table: Arc<dyn DeviceTable>,
    pub instance: vk::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: vk::Device,
    pub queue: vk::Queue,
    pub queue_family_index: u32,
    pub queue_index: u32,
    /// Capture ids of the objects above, as recorded in the binding.
    pub instance_id: HandleId,
    pub physical_device_id: HandleId,
    pub device_id: HandleId,
}

impl VulkanGraphicsBinding {
    /// `binding` must already carry live handles.
    pub fn new(binding: &GraphicsBindingVulkan, backend: &dyn VulkanBackend) -> ReplayResult<Self> {
        let instance_table = backend
            .instance_table(binding.physical_device.value)
            .ok_or(ReplayError::BackendLookup {
                kind: "instance dispatch table",
                id: binding.physical_device.capture_id,
            })?;
        let device_table = backend
            .device_table(binding.device.value)
            .ok_or(ReplayError::BackendLookup {
                kind: "device dispatch table",
                id: binding.device.capture_id,
            })?;

        let queue = device_table.get_device_queue(binding.queue_family_index, binding.queue_index);
        info!(
            device = binding.device.capture_id,
            queue_family = binding.queue_family_index,
            queue_index = binding.queue_index,
            "Vulkan graphics binding created"
        );

        Ok(Self {
            instance_table,
            device_table,
            instance: binding.instance.value,
            physical_device: binding.physical_device.value,
            device: binding.device.value,
            queue,
            queue_family_index: binding.queue_family_index,
            queue_index: binding.queue_index,
            instance_id: binding.instance.capture_id,
            physical_device_id: binding.physical_device.capture_id,
            device_id: binding.device.capture_id,
        })
    }

    /// Wait for the proxy's last submission, then reset its fence.
    pub fn reset_command_buffer(&self, proxy: &mut ProxyImage, timeout: u64) -> ReplayResult<()> {
        self.device_table
            .wait_for_fence(proxy.fence, timeout)
            .map_err(ReplayError::vulkan("vkWaitForFences"))?;
        self.device_table
            .reset_fence(proxy.fence)
            .map_err(ReplayError::vulkan("vkResetFences"))?;
        proxy.mark_reclaimed();
        Ok(())
    }

    pub fn memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties {
        self.instance_table
            .get_physical_device_memory_properties(self.physical_device)
    }
}

impl fmt::Debug for VulkanGraphicsBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VulkanGraphicsBinding")
            .field("instance", &self.instance)
            .field("physical_device", &self.physical_device)
            .field("device", &self.device)
            .field("queue", &self.queue)
            .field("queue_family_index", &self.queue_family_index)
            .field("queue_index", &self.queue_index)
            .finish_non_exhaustive()
    }
}
