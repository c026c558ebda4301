//! Decoded call arguments.
//!
//! Every structure keeps the handles it embeds as [`HandleField`]s so that
//! the struct handle mapper can fill in live values in place. Extension
//! chains are decoded into [`NextChain`], a list of tagged variants; a tag
//! the decoder did not understand survives as [`NextStruct::Unknown`].

use ash::vk;

use crate::handle::{HandleField, HandleId};
use crate::xr::{
    CompositionLayerFlags, Duration, EnvironmentBlendMode, Fovf, FormFactor, Posef,
    ReferenceSpaceType, Rect2Di, SessionCreateFlags, Space, StructureType, Swapchain,
    SwapchainCreateFlags, SwapchainUsageFlags, SystemId, Time, ViewConfigurationType,
};

// ── Extension chains ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum NextStruct {
    GraphicsBindingVulkan(GraphicsBindingVulkan),
    VulkanSwapchainCreateInfoMeta(VulkanSwapchainCreateInfoMeta),
    /// A structure the decoder kept only the type tag of.
    Unknown { ty: StructureType },
}

impl NextStruct {
    pub fn structure_type(&self) -> StructureType {
        match self {
            NextStruct::GraphicsBindingVulkan(_) => StructureType::GRAPHICS_BINDING_VULKAN_KHR,
            NextStruct::VulkanSwapchainCreateInfoMeta(_) => {
                StructureType::VULKAN_SWAPCHAIN_CREATE_INFO_META
            }
            NextStruct::Unknown { ty } => *ty,
        }
    }
}

/// The `next` chain of a structure, in chain order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NextChain(pub Vec<NextStruct>);

impl NextChain {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, next: NextStruct) {
        self.0.push(next);
    }

    pub fn with(mut self, next: NextStruct) -> Self {
        self.0.push(next);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NextStruct> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, NextStruct> {
        self.0.iter_mut()
    }

    /// First Vulkan graphics binding in the chain.
    pub fn graphics_binding_vulkan(&self) -> Option<&GraphicsBindingVulkan> {
        self.0.iter().find_map(|next| match next {
            NextStruct::GraphicsBindingVulkan(binding) => Some(binding),
            _ => None,
        })
    }

    pub fn vulkan_swapchain_meta(&self) -> Option<&VulkanSwapchainCreateInfoMeta> {
        self.0.iter().find_map(|next| match next {
            NextStruct::VulkanSwapchainCreateInfoMeta(meta) => Some(meta),
            _ => None,
        })
    }
}

/// `XrGraphicsBindingVulkanKHR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphicsBindingVulkan {
    pub instance: HandleField<vk::Instance>,
    pub physical_device: HandleField<vk::PhysicalDevice>,
    pub device: HandleField<vk::Device>,
    pub queue_family_index: u32,
    pub queue_index: u32,
}

/// `XrVulkanSwapchainCreateInfoMETA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VulkanSwapchainCreateInfoMeta {
    pub additional_create_flags: vk::ImageCreateFlags,
    pub additional_usage_flags: vk::ImageUsageFlags,
}

// ── Instance / system ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstanceCreateInfo {
    pub application_name: String,
    pub application_version: u32,
    pub api_version: u64,
    pub enabled_api_layer_names: Vec<String>,
    pub enabled_extension_names: Vec<String>,
    pub next: NextChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemGetInfo {
    pub form_factor: FormFactor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewConfigurationView {
    pub recommended_image_rect_width: u32,
    pub max_image_rect_width: u32,
    pub recommended_image_rect_height: u32,
    pub max_image_rect_height: u32,
    pub recommended_swapchain_sample_count: u32,
    pub max_swapchain_sample_count: u32,
}

/// `XrGraphicsRequirementsVulkanKHR`. Versions are packed `XrVersion`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphicsRequirementsVulkan {
    pub min_api_version_supported: u64,
    pub max_api_version_supported: u64,
}

// ── Session ─────────────────────────────────────────────────

/// `XrSessionCreateInfo`.
///
/// `system_id` holds the captured value after decoding and is overwritten
/// with the live value during mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionCreateInfo {
    pub create_flags: SessionCreateFlags,
    pub system_id: SystemId,
    pub next: NextChain,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionBeginInfo {
    pub primary_view_configuration_type: ViewConfigurationType,
    pub next: NextChain,
}

/// `XrEventDataBuffer`. Replay only compares the type tag of polled events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDataBuffer {
    pub ty: StructureType,
}

impl Default for EventDataBuffer {
    fn default() -> Self {
        Self {
            ty: StructureType::EVENT_DATA_BUFFER,
        }
    }
}

// ── Spaces ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceSpaceCreateInfo {
    pub reference_space_type: ReferenceSpaceType,
    pub pose_in_reference_space: Posef,
    pub next: NextChain,
}

// ── Swapchains ──────────────────────────────────────────────

/// `XrSwapchainCreateInfo`. `format` is the graphics API's format value,
/// a `VkFormat` for Vulkan sessions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SwapchainCreateInfo {
    pub create_flags: SwapchainCreateFlags,
    pub usage_flags: SwapchainUsageFlags,
    pub format: i64,
    pub sample_count: u32,
    pub width: u32,
    pub height: u32,
    pub face_count: u32,
    pub array_size: u32,
    pub mip_count: u32,
    pub next: NextChain,
}

/// One element of a captured `xrEnumerateSwapchainImages` output array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainImage {
    pub ty: StructureType,
    /// Capture id of the image the runtime handed out.
    pub image: HandleId,
}

impl SwapchainImage {
    pub fn vulkan(image: HandleId) -> Self {
        Self {
            ty: StructureType::SWAPCHAIN_IMAGE_VULKAN_KHR,
            image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SwapchainImageAcquireInfo {
    pub next: NextChain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapchainImageWaitInfo {
    pub timeout: Duration,
    pub next: NextChain,
}

impl Default for SwapchainImageWaitInfo {
    fn default() -> Self {
        Self {
            timeout: Duration::INFINITE,
            next: NextChain::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SwapchainImageReleaseInfo {
    pub next: NextChain,
}

// ── Frames ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameWaitInfo {
    pub next: NextChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameState {
    pub predicted_display_time: Time,
    pub predicted_display_period: Duration,
    pub should_render: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameBeginInfo {
    pub next: NextChain,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameEndInfo {
    pub display_time: Time,
    pub environment_blend_mode: EnvironmentBlendMode,
    pub layers: Vec<CompositionLayer>,
    pub next: NextChain,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompositionLayer {
    Projection(CompositionLayerProjection),
    /// Any other layer kind, kept by its tag.
    Other { ty: StructureType },
}

impl CompositionLayer {
    pub fn structure_type(&self) -> StructureType {
        match self {
            CompositionLayer::Projection(_) => StructureType::COMPOSITION_LAYER_PROJECTION,
            CompositionLayer::Other { ty } => *ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionLayerProjection {
    pub layer_flags: CompositionLayerFlags,
    pub space: HandleField<Space>,
    pub views: Vec<CompositionLayerProjectionView>,
    pub next: NextChain,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionLayerProjectionView {
    pub pose: Posef,
    pub fov: Fovf,
    pub sub_image: SwapchainSubImage,
    pub next: NextChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapchainSubImage {
    pub swapchain: HandleField<Swapchain>,
    pub image_rect: Rect2Di,
    pub image_array_index: u32,
}
