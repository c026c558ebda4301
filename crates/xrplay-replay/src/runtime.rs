//! The live OpenXR runtime replay drives.
//!
//! Entry points mirror the OpenXR calls the consumer intercepts. Calls that
//! can only fail return `Result<_, XrResult>` with the failure code; calls
//! whose success codes matter to replay (`XR_TIMEOUT_EXPIRED`,
//! `XR_EVENT_UNAVAILABLE`) return the raw `XrResult`.
//!
//! Enumerations follow the OpenXR two-call idiom: the output slice length is
//! the capacity, and the returned value is the number of elements the
//! runtime has (capacity 0) or wrote.

use ash::vk;
use xrplay_format::structs::{
    EventDataBuffer, FrameBeginInfo, FrameEndInfo, FrameState, FrameWaitInfo,
    GraphicsRequirementsVulkan, InstanceCreateInfo, ReferenceSpaceCreateInfo, SessionBeginInfo,
    SessionCreateInfo, SwapchainCreateInfo, SwapchainImageAcquireInfo, SwapchainImageReleaseInfo,
    SwapchainImageWaitInfo, SystemGetInfo, ViewConfigurationView,
};
use xrplay_format::xr::{
    Instance, ReferenceSpaceType, Session, Space, Swapchain, SystemId, ViewConfigurationType,
};
use xrplay_format::XrResult;

pub trait XrRuntime {
    fn create_instance(&self, info: &InstanceCreateInfo) -> Result<Instance, XrResult>;

    fn get_system(&self, instance: Instance, info: &SystemGetInfo) -> Result<SystemId, XrResult>;

    fn enumerate_view_configuration_views(
        &self,
        instance: Instance,
        system: SystemId,
        view_configuration_type: ViewConfigurationType,
        views: &mut [ViewConfigurationView],
    ) -> Result<u32, XrResult>;

    fn get_vulkan_graphics_requirements(
        &self,
        instance: Instance,
        system: SystemId,
    ) -> Result<GraphicsRequirementsVulkan, XrResult>;

    fn get_vulkan_graphics_device(
        &self,
        instance: Instance,
        system: SystemId,
        vk_instance: vk::Instance,
    ) -> Result<vk::PhysicalDevice, XrResult>;

    fn create_session(
        &self,
        instance: Instance,
        info: &SessionCreateInfo,
    ) -> Result<Session, XrResult>;

    fn begin_session(&self, session: Session, info: &SessionBeginInfo) -> XrResult;

    fn wait_frame(&self, session: Session, info: &FrameWaitInfo) -> Result<FrameState, XrResult>;

    fn begin_frame(&self, session: Session, info: &FrameBeginInfo) -> XrResult;

    fn end_frame(&self, session: Session, info: &FrameEndInfo) -> XrResult;

    fn enumerate_reference_spaces(
        &self,
        session: Session,
        spaces: &mut [ReferenceSpaceType],
    ) -> Result<u32, XrResult>;

    fn create_reference_space(
        &self,
        session: Session,
        info: &ReferenceSpaceCreateInfo,
    ) -> Result<Space, XrResult>;

    fn create_swapchain(
        &self,
        session: Session,
        info: &SwapchainCreateInfo,
    ) -> Result<Swapchain, XrResult>;

    fn enumerate_swapchain_images(
        &self,
        swapchain: Swapchain,
        images: &mut [vk::Image],
    ) -> Result<u32, XrResult>;

    fn acquire_swapchain_image(
        &self,
        swapchain: Swapchain,
        info: &SwapchainImageAcquireInfo,
    ) -> Result<u32, XrResult>;

    fn wait_swapchain_image(&self, swapchain: Swapchain, info: &SwapchainImageWaitInfo) -> XrResult;

    fn release_swapchain_image(
        &self,
        swapchain: Swapchain,
        info: &SwapchainImageReleaseInfo,
    ) -> XrResult;

    fn poll_event(&self, instance: Instance, event: &mut EventDataBuffer) -> XrResult;
}

/// Run a two-call enumeration: ask for the count, then fill a buffer of
/// that size. Returns the elements the runtime wrote.
pub(crate) fn enumerate_two_call<T, F>(mut call: F) -> Result<Vec<T>, XrResult>
where
    T: Default + Clone,
    F: FnMut(&mut [T]) -> Result<u32, XrResult>,
{
    let count = call(&mut [])?;
    let mut items = vec![T::default(); count as usize];
    let written = call(&mut items)?;
    items.truncate(written as usize);
    Ok(items)
}
