//! Rewrites capture ids embedded in decoded structures into live handles.
//!
//! Each structure is dispatched on its type tag. A tag without a handler is
//! an error: forwarding it unmapped would hand the runtime capture-time
//! handles.

use ash::vk;
use xrplay_core::IdentityRegistry;
use xrplay_format::structs::{
    CompositionLayer, CompositionLayerProjection, CompositionLayerProjectionView, FrameEndInfo,
    GraphicsBindingVulkan, ReferenceSpaceCreateInfo, SessionCreateInfo, SwapchainSubImage,
};
use xrplay_format::xr::{Space, Swapchain};
use xrplay_format::{HandleField, NextChain, NextStruct};

use crate::backend::VulkanBackend;
use crate::error::{ReplayError, ReplayResult};

pub struct StructHandleMapper<'a> {
    registry: &'a IdentityRegistry,
    backend: &'a dyn VulkanBackend,
}

impl<'a> StructHandleMapper<'a> {
    pub fn new(registry: &'a IdentityRegistry, backend: &'a dyn VulkanBackend) -> Self {
        Self { registry, backend }
    }

    pub fn map_session_create_info(&self, info: &mut SessionCreateInfo) -> ReplayResult<()> {
        info.system_id = self.registry.lookup_value(info.system_id)?.replay_value;
        self.map_next_chain(&mut info.next)
    }

    pub fn map_reference_space_create_info(
        &self,
        info: &mut ReferenceSpaceCreateInfo,
    ) -> ReplayResult<()> {
        self.map_next_chain(&mut info.next)
    }

    pub fn map_frame_end_info(&self, info: &mut FrameEndInfo) -> ReplayResult<()> {
        self.map_next_chain(&mut info.next)?;
        for layer in &mut info.layers {
            self.map_layer(layer)?;
        }
        Ok(())
    }

    pub fn map_next_chain(&self, chain: &mut NextChain) -> ReplayResult<()> {
        for next in chain.iter_mut() {
            match next {
                NextStruct::GraphicsBindingVulkan(binding) => {
                    self.map_graphics_binding_vulkan(binding)?
                }
                // Flags only.
                NextStruct::VulkanSwapchainCreateInfoMeta(_) => {}
                NextStruct::Unknown { ty } => return Err(ReplayError::UnsupportedStructure(*ty)),
            }
        }
        Ok(())
    }

    fn map_layer(&self, layer: &mut CompositionLayer) -> ReplayResult<()> {
        match layer {
            CompositionLayer::Projection(projection) => self.map_projection_layer(projection),
            CompositionLayer::Other { ty } => Err(ReplayError::UnsupportedLayer(*ty)),
        }
    }

    fn map_projection_layer(&self, layer: &mut CompositionLayerProjection) -> ReplayResult<()> {
        self.map_handle::<Space>(&mut layer.space)?;
        self.map_next_chain(&mut layer.next)?;
        for view in &mut layer.views {
            self.map_projection_view(view)?;
        }
        Ok(())
    }

    fn map_projection_view(&self, view: &mut CompositionLayerProjectionView) -> ReplayResult<()> {
        self.map_next_chain(&mut view.next)?;
        self.map_sub_image(&mut view.sub_image)
    }

    fn map_sub_image(&self, sub_image: &mut SwapchainSubImage) -> ReplayResult<()> {
        self.map_handle::<Swapchain>(&mut sub_image.swapchain)
    }

    /// Instance and device come from the Vulkan replay engine. The physical
    /// device is the one `xrGetVulkanGraphicsDeviceKHR` returned, which the
    /// registry keeps in its own map.
    fn map_graphics_binding_vulkan(&self, binding: &mut GraphicsBindingVulkan) -> ReplayResult<()> {
        binding.instance.value = self
            .backend
            .map_instance(binding.instance.capture_id)
            .ok_or(ReplayError::BackendLookup {
                kind: "VkInstance",
                id: binding.instance.capture_id,
            })?;
        binding.device.value = self
            .backend
            .map_device(binding.device.capture_id)
            .ok_or(ReplayError::BackendLookup {
                kind: "VkDevice",
                id: binding.device.capture_id,
            })?;
        self.map_handle::<vk::PhysicalDevice>(&mut binding.physical_device)
    }

    fn map_handle<H>(&self, field: &mut HandleField<H>) -> ReplayResult<()>
    where
        H: xrplay_core::RegistryHandle + Default,
    {
        field.value = if field.is_null() {
            H::default()
        } else {
            self.registry.handle::<H>(field.capture_id)?
        };
        Ok(())
    }
}
