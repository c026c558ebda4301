//! In-process fakes for driving the replay consumer without an XR runtime
//! or a GPU.
//!
//! The runtime, the device table and the backend all append to one shared
//! journal so tests can check the order of live calls across them.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use parking_lot::Mutex;

use xrplay_core::ReplaySettings;
use xrplay_format::structs::{
    EventDataBuffer, FrameBeginInfo, FrameEndInfo, FrameState, FrameWaitInfo,
    GraphicsBindingVulkan, GraphicsRequirementsVulkan, InstanceCreateInfo,
    ReferenceSpaceCreateInfo, SessionBeginInfo, SessionCreateInfo, SwapchainCreateInfo,
    SwapchainImage, SwapchainImageAcquireInfo, SwapchainImageReleaseInfo, SwapchainImageWaitInfo,
    SystemGetInfo, ViewConfigurationView,
};
use xrplay_format::xr::{
    Duration, Instance, ReferenceSpaceType, Session, Space, Swapchain, SwapchainUsageFlags,
    SystemId, Time, ViewConfigurationType,
};
use xrplay_format::{CallInfo, HandleField, HandleId, NextChain, NextStruct, StructureType, XrResult};
use xrplay_replay::{DeviceTable, InstanceTable, ReplayConsumer, ReplayImageInfo, VulkanBackend};

pub type Journal = Arc<Mutex<Vec<String>>>;

// Capture ids used by the standard setup.
pub const INSTANCE_ID: HandleId = 0x100;
pub const CAPTURE_SYSTEM: SystemId = SystemId(0x200);
pub const VK_INSTANCE_ID: HandleId = 0x300;
pub const PHYSICAL_DEVICE_ID: HandleId = 0x400;
pub const VK_DEVICE_ID: HandleId = 0x500;
pub const SESSION_ID: HandleId = 0x600;
pub const SWAPCHAIN_ID: HandleId = 0x700;

// Live values the fakes hand out.
pub const LIVE_SYSTEM: SystemId = SystemId(0x2_0000);
pub const LIVE_VK_INSTANCE: u64 = 0x3_0000;
pub const LIVE_PHYSICAL_DEVICE: u64 = 0x4_0000;
pub const LIVE_VK_DEVICE: u64 = 0x5_0000;
pub const LIVE_QUEUE: u64 = 0x6_0000;
pub const QUEUE_FAMILY: u32 = 2;

pub fn call(index: u64) -> CallInfo {
    CallInfo::new(index)
}

pub fn init_test_logging() {
    let _ = xrplay_common::try_init_logging();
}

// ── Runtime ─────────────────────────────────────────────────

#[derive(Debug)]
pub struct RuntimeState {
    next_handle: u64,
    /// Live images of every swapchain created.
    pub replay_image_count: usize,
    next_image: u64,
    pub swapchain_images: HashMap<Swapchain, Vec<vk::Image>>,
    /// Indices returned by successive acquires; round-robin when empty.
    pub acquire_indices: VecDeque<u32>,
    acquire_counter: u32,
    /// Events returned by successive polls; `XR_EVENT_UNAVAILABLE` when empty.
    pub events: VecDeque<(XrResult, StructureType)>,
    pub poll_count: u32,
    /// Results of successive swapchain waits; `XR_SUCCESS` when empty.
    pub wait_results: VecDeque<XrResult>,
    pub wait_count: u32,
    pub reference_spaces: Vec<ReferenceSpaceType>,
    pub view_count: usize,
    pub next_display_time: i64,
    /// Failure codes to return from the named entry point.
    pub failures: HashMap<&'static str, XrResult>,
    pub session_infos: Vec<SessionCreateInfo>,
    pub swapchain_infos: Vec<SwapchainCreateInfo>,
    pub end_frame_infos: Vec<FrameEndInfo>,
    pub space_infos: Vec<ReferenceSpaceCreateInfo>,
    pub graphics_device_instances: Vec<vk::Instance>,
}

pub struct FakeRuntime {
    pub state: Mutex<RuntimeState>,
    journal: Journal,
}

impl FakeRuntime {
    pub fn new(journal: Journal) -> Self {
        Self {
            state: Mutex::new(RuntimeState {
                next_handle: 0x1_0000_0000,
                replay_image_count: 3,
                next_image: 0x9_0000,
                swapchain_images: HashMap::new(),
                acquire_indices: VecDeque::new(),
                acquire_counter: 0,
                events: VecDeque::new(),
                poll_count: 0,
                wait_results: VecDeque::new(),
                wait_count: 0,
                reference_spaces: vec![ReferenceSpaceType::VIEW, ReferenceSpaceType::LOCAL],
                view_count: 2,
                next_display_time: 1_000_000,
                failures: HashMap::new(),
                session_infos: Vec::new(),
                swapchain_infos: Vec::new(),
                end_frame_infos: Vec::new(),
                space_infos: Vec::new(),
                graphics_device_instances: Vec::new(),
            }),
            journal,
        }
    }

    fn enter(&self, api: &'static str) -> Result<(), XrResult> {
        self.journal.lock().push(api.to_string());
        match self.state.lock().failures.get(api) {
            Some(result) => Err(*result),
            None => Ok(()),
        }
    }

    fn alloc(&self) -> u64 {
        let mut state = self.state.lock();
        state.next_handle += 1;
        state.next_handle
    }

    fn result_of(&self, api: &'static str) -> XrResult {
        match self.enter(api) {
            Ok(()) => XrResult::SUCCESS,
            Err(result) => result,
        }
    }
}

fn fill<T: Clone>(source: &[T], out: &mut [T]) -> Result<u32, XrResult> {
    if out.is_empty() {
        return Ok(source.len() as u32);
    }
    if out.len() < source.len() {
        return Err(XrResult::ERROR_SIZE_INSUFFICIENT);
    }
    out[..source.len()].clone_from_slice(source);
    Ok(source.len() as u32)
}

impl xrplay_replay::XrRuntime for FakeRuntime {
    fn create_instance(&self, _info: &InstanceCreateInfo) -> Result<Instance, XrResult> {
        self.enter("xrCreateInstance")?;
        Ok(Instance(self.alloc()))
    }

    fn get_system(&self, _instance: Instance, _info: &SystemGetInfo) -> Result<SystemId, XrResult> {
        self.enter("xrGetSystem")?;
        Ok(LIVE_SYSTEM)
    }

    fn enumerate_view_configuration_views(
        &self,
        _instance: Instance,
        _system: SystemId,
        _view_configuration_type: ViewConfigurationType,
        views: &mut [ViewConfigurationView],
    ) -> Result<u32, XrResult> {
        self.enter("xrEnumerateViewConfigurationViews")?;
        let count = self.state.lock().view_count;
        let source = vec![
            ViewConfigurationView {
                recommended_image_rect_width: 1024,
                max_image_rect_width: 2048,
                recommended_image_rect_height: 1024,
                max_image_rect_height: 2048,
                recommended_swapchain_sample_count: 1,
                max_swapchain_sample_count: 4,
            };
            count
        ];
        fill(&source, views)
    }

    fn get_vulkan_graphics_requirements(
        &self,
        _instance: Instance,
        _system: SystemId,
    ) -> Result<GraphicsRequirementsVulkan, XrResult> {
        self.enter("xrGetVulkanGraphicsRequirementsKHR")?;
        Ok(GraphicsRequirementsVulkan {
            min_api_version_supported: 1 << 48,
            max_api_version_supported: 2 << 48,
        })
    }

    fn get_vulkan_graphics_device(
        &self,
        _instance: Instance,
        _system: SystemId,
        vk_instance: vk::Instance,
    ) -> Result<vk::PhysicalDevice, XrResult> {
        self.enter("xrGetVulkanGraphicsDeviceKHR")?;
        self.state.lock().graphics_device_instances.push(vk_instance);
        Ok(vk::PhysicalDevice::from_raw(LIVE_PHYSICAL_DEVICE))
    }

    fn create_session(&self, _instance: Instance, info: &SessionCreateInfo) -> Result<Session, XrResult> {
        self.enter("xrCreateSession")?;
        self.state.lock().session_infos.push(info.clone());
        Ok(Session(self.alloc()))
    }

    fn begin_session(&self, _session: Session, _info: &SessionBeginInfo) -> XrResult {
        self.result_of("xrBeginSession")
    }

    fn wait_frame(&self, _session: Session, _info: &FrameWaitInfo) -> Result<FrameState, XrResult> {
        self.enter("xrWaitFrame")?;
        let mut state = self.state.lock();
        let time = state.next_display_time;
        state.next_display_time += 11_111_111;
        Ok(FrameState {
            predicted_display_time: Time(time),
            predicted_display_period: Duration(11_111_111),
            should_render: true,
        })
    }

    fn begin_frame(&self, _session: Session, _info: &FrameBeginInfo) -> XrResult {
        self.result_of("xrBeginFrame")
    }

    fn end_frame(&self, _session: Session, info: &FrameEndInfo) -> XrResult {
        let result = self.result_of("xrEndFrame");
        self.state.lock().end_frame_infos.push(info.clone());
        result
    }

    fn enumerate_reference_spaces(
        &self,
        _session: Session,
        spaces: &mut [ReferenceSpaceType],
    ) -> Result<u32, XrResult> {
        self.enter("xrEnumerateReferenceSpaces")?;
        let source = self.state.lock().reference_spaces.clone();
        fill(&source, spaces)
    }

    fn create_reference_space(
        &self,
        _session: Session,
        info: &ReferenceSpaceCreateInfo,
    ) -> Result<Space, XrResult> {
        self.enter("xrCreateReferenceSpace")?;
        self.state.lock().space_infos.push(info.clone());
        Ok(Space(self.alloc()))
    }

    fn create_swapchain(
        &self,
        _session: Session,
        info: &SwapchainCreateInfo,
    ) -> Result<Swapchain, XrResult> {
        self.enter("xrCreateSwapchain")?;
        let swapchain = Swapchain(self.alloc());
        let mut state = self.state.lock();
        state.swapchain_infos.push(info.clone());
        let mut images = Vec::new();
        for _ in 0..state.replay_image_count {
            state.next_image += 1;
            images.push(vk::Image::from_raw(state.next_image));
        }
        state.swapchain_images.insert(swapchain, images);
        Ok(swapchain)
    }

    fn enumerate_swapchain_images(
        &self,
        swapchain: Swapchain,
        images: &mut [vk::Image],
    ) -> Result<u32, XrResult> {
        self.enter("xrEnumerateSwapchainImages")?;
        let source = self
            .state
            .lock()
            .swapchain_images
            .get(&swapchain)
            .cloned()
            .ok_or(XrResult::ERROR_HANDLE_INVALID)?;
        fill(&source, images)
    }

    fn acquire_swapchain_image(
        &self,
        _swapchain: Swapchain,
        _info: &SwapchainImageAcquireInfo,
    ) -> Result<u32, XrResult> {
        self.enter("xrAcquireSwapchainImage")?;
        let mut state = self.state.lock();
        if let Some(index) = state.acquire_indices.pop_front() {
            return Ok(index);
        }
        let count = state.replay_image_count.max(1) as u32;
        let index = state.acquire_counter % count;
        state.acquire_counter += 1;
        Ok(index)
    }

    fn wait_swapchain_image(&self, _swapchain: Swapchain, _info: &SwapchainImageWaitInfo) -> XrResult {
        if let Err(result) = self.enter("xrWaitSwapchainImage") {
            return result;
        }
        let mut state = self.state.lock();
        state.wait_count += 1;
        state.wait_results.pop_front().unwrap_or(XrResult::SUCCESS)
    }

    fn release_swapchain_image(
        &self,
        _swapchain: Swapchain,
        _info: &SwapchainImageReleaseInfo,
    ) -> XrResult {
        self.result_of("xrReleaseSwapchainImage")
    }

    fn poll_event(&self, _instance: Instance, event: &mut EventDataBuffer) -> XrResult {
        if let Err(result) = self.enter("xrPollEvent") {
            return result;
        }
        let mut state = self.state.lock();
        state.poll_count += 1;
        match state.events.pop_front() {
            Some((result, ty)) => {
                event.ty = ty;
                result
            }
            None => XrResult::EVENT_UNAVAILABLE,
        }
    }
}

// ── Vulkan device ───────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct BarrierRecord {
    pub image: vk::Image,
    pub old_layout: vk::ImageLayout,
    pub new_layout: vk::ImageLayout,
    pub src_access: vk::AccessFlags,
    pub dst_access: vk::AccessFlags,
    pub range: vk::ImageSubresourceRange,
}

#[derive(Debug, Clone)]
pub enum DeviceCall {
    CreateImage {
        image: vk::Image,
        format: vk::Format,
        usage: vk::ImageUsageFlags,
        flags: vk::ImageCreateFlags,
        extent: vk::Extent3D,
        mip_levels: u32,
        array_layers: u32,
    },
    DestroyImage(vk::Image),
    AllocateMemory {
        memory: vk::DeviceMemory,
        memory_type_index: u32,
        size: u64,
    },
    FreeMemory(vk::DeviceMemory),
    BindImageMemory(vk::Image, vk::DeviceMemory),
    CreateCommandPool {
        pool: vk::CommandPool,
        flags: vk::CommandPoolCreateFlags,
        queue_family_index: u32,
    },
    DestroyCommandPool(vk::CommandPool),
    AllocateCommandBuffer(vk::CommandBuffer),
    FreeCommandBuffer(vk::CommandBuffer),
    CreateFence {
        fence: vk::Fence,
        signaled: bool,
    },
    DestroyFence(vk::Fence),
    WaitForFence(vk::Fence, u64),
    ResetFence(vk::Fence),
    Begin(vk::CommandBuffer),
    End(vk::CommandBuffer),
    Barrier {
        command_buffer: vk::CommandBuffer,
        src_stage: vk::PipelineStageFlags,
        dst_stage: vk::PipelineStageFlags,
        barriers: Vec<BarrierRecord>,
    },
    CopyImage {
        command_buffer: vk::CommandBuffer,
        src: vk::Image,
        src_layout: vk::ImageLayout,
        dst: vk::Image,
        dst_layout: vk::ImageLayout,
        regions: Vec<vk::ImageCopy>,
    },
    Submit {
        queue: vk::Queue,
        command_buffer: vk::CommandBuffer,
        fence: vk::Fence,
    },
    GetDeviceQueue(u32, u32),
}

pub struct DeviceState {
    next_handle: u64,
    pub calls: Vec<DeviceCall>,
    /// Signaled state of every live fence.
    pub fences: HashMap<vk::Fence, bool>,
    pub recording: HashMap<vk::CommandBuffer, bool>,
    pub memory_type_bits: u32,
    /// Fail the n-th (0-based) vkCreateImage.
    pub fail_create_image_at: Option<usize>,
    created_images: usize,
    /// Reject every vkQueueSubmit.
    pub fail_submit: bool,
}

pub struct FakeDevice {
    pub state: Mutex<DeviceState>,
    journal: Journal,
}

impl FakeDevice {
    pub fn new(journal: Journal) -> Self {
        Self {
            state: Mutex::new(DeviceState {
                next_handle: 0xa_0000,
                calls: Vec::new(),
                fences: HashMap::new(),
                recording: HashMap::new(),
                memory_type_bits: 0b111,
                fail_create_image_at: None,
                created_images: 0,
                fail_submit: false,
            }),
            journal,
        }
    }

    fn record(&self, name: &str, call: DeviceCall) {
        self.journal.lock().push(name.to_string());
        self.state.lock().calls.push(call);
    }

    fn alloc(&self) -> u64 {
        let mut state = self.state.lock();
        state.next_handle += 1;
        state.next_handle
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn live_fences(&self) -> usize {
        self.state.lock().fences.len()
    }
}

impl DeviceTable for FakeDevice {
    fn create_image(&self, info: &vk::ImageCreateInfo<'_>) -> VkResult<vk::Image> {
        {
            let mut state = self.state.lock();
            let n = state.created_images;
            state.created_images += 1;
            if state.fail_create_image_at == Some(n) {
                return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
            }
        }
        let image = vk::Image::from_raw(self.alloc());
        self.record(
            "vkCreateImage",
            DeviceCall::CreateImage {
                image,
                format: info.format,
                usage: info.usage,
                flags: info.flags,
                extent: info.extent,
                mip_levels: info.mip_levels,
                array_layers: info.array_layers,
            },
        );
        Ok(image)
    }

    fn destroy_image(&self, image: vk::Image) {
        self.record("vkDestroyImage", DeviceCall::DestroyImage(image));
    }

    fn get_image_memory_requirements(&self, _image: vk::Image) -> vk::MemoryRequirements {
        vk::MemoryRequirements {
            size: 4096,
            alignment: 256,
            memory_type_bits: self.state.lock().memory_type_bits,
        }
    }

    fn allocate_memory(&self, info: &vk::MemoryAllocateInfo<'_>) -> VkResult<vk::DeviceMemory> {
        let memory = vk::DeviceMemory::from_raw(self.alloc());
        self.record(
            "vkAllocateMemory",
            DeviceCall::AllocateMemory {
                memory,
                memory_type_index: info.memory_type_index,
                size: info.allocation_size,
            },
        );
        Ok(memory)
    }

    fn free_memory(&self, memory: vk::DeviceMemory) {
        self.record("vkFreeMemory", DeviceCall::FreeMemory(memory));
    }

    fn bind_image_memory(
        &self,
        image: vk::Image,
        memory: vk::DeviceMemory,
        _offset: vk::DeviceSize,
    ) -> VkResult<()> {
        self.record("vkBindImageMemory", DeviceCall::BindImageMemory(image, memory));
        Ok(())
    }

    fn create_command_pool(&self, info: &vk::CommandPoolCreateInfo<'_>) -> VkResult<vk::CommandPool> {
        let pool = vk::CommandPool::from_raw(self.alloc());
        self.record(
            "vkCreateCommandPool",
            DeviceCall::CreateCommandPool {
                pool,
                flags: info.flags,
                queue_family_index: info.queue_family_index,
            },
        );
        Ok(pool)
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        self.record("vkDestroyCommandPool", DeviceCall::DestroyCommandPool(pool));
    }

    fn allocate_command_buffer(&self, _pool: vk::CommandPool) -> VkResult<vk::CommandBuffer> {
        let command_buffer = vk::CommandBuffer::from_raw(self.alloc());
        self.record(
            "vkAllocateCommandBuffers",
            DeviceCall::AllocateCommandBuffer(command_buffer),
        );
        Ok(command_buffer)
    }

    fn free_command_buffer(&self, _pool: vk::CommandPool, command_buffer: vk::CommandBuffer) {
        self.record(
            "vkFreeCommandBuffers",
            DeviceCall::FreeCommandBuffer(command_buffer),
        );
    }

    fn create_fence(&self, flags: vk::FenceCreateFlags) -> VkResult<vk::Fence> {
        let fence = vk::Fence::from_raw(self.alloc());
        let signaled = flags.contains(vk::FenceCreateFlags::SIGNALED);
        self.state.lock().fences.insert(fence, signaled);
        self.record("vkCreateFence", DeviceCall::CreateFence { fence, signaled });
        Ok(fence)
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        self.state.lock().fences.remove(&fence);
        self.record("vkDestroyFence", DeviceCall::DestroyFence(fence));
    }

    fn wait_for_fence(&self, fence: vk::Fence, timeout: u64) -> VkResult<()> {
        self.record("vkWaitForFences", DeviceCall::WaitForFence(fence, timeout));
        match self.state.lock().fences.get(&fence) {
            Some(true) => Ok(()),
            // Nothing was submitted that could ever signal it.
            Some(false) => Err(vk::Result::TIMEOUT),
            None => Err(vk::Result::ERROR_DEVICE_LOST),
        }
    }

    fn reset_fence(&self, fence: vk::Fence) -> VkResult<()> {
        self.record("vkResetFences", DeviceCall::ResetFence(fence));
        match self.state.lock().fences.get_mut(&fence) {
            Some(signaled) => {
                *signaled = false;
                Ok(())
            }
            None => Err(vk::Result::ERROR_DEVICE_LOST),
        }
    }

    fn begin_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        _flags: vk::CommandBufferUsageFlags,
    ) -> VkResult<()> {
        self.state.lock().recording.insert(command_buffer, true);
        self.record("vkBeginCommandBuffer", DeviceCall::Begin(command_buffer));
        Ok(())
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        self.state.lock().recording.insert(command_buffer, false);
        self.record("vkEndCommandBuffer", DeviceCall::End(command_buffer));
        Ok(())
    }

    fn cmd_pipeline_barrier(
        &self,
        command_buffer: vk::CommandBuffer,
        src_stage: vk::PipelineStageFlags,
        dst_stage: vk::PipelineStageFlags,
        image_barriers: &[vk::ImageMemoryBarrier<'_>],
    ) {
        let barriers = image_barriers
            .iter()
            .map(|b| BarrierRecord {
                image: b.image,
                old_layout: b.old_layout,
                new_layout: b.new_layout,
                src_access: b.src_access_mask,
                dst_access: b.dst_access_mask,
                range: b.subresource_range,
            })
            .collect();
        self.record(
            "vkCmdPipelineBarrier",
            DeviceCall::Barrier {
                command_buffer,
                src_stage,
                dst_stage,
                barriers,
            },
        );
    }

    fn cmd_copy_image(
        &self,
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_layout: vk::ImageLayout,
        regions: &[vk::ImageCopy],
    ) {
        self.record(
            "vkCmdCopyImage",
            DeviceCall::CopyImage {
                command_buffer,
                src: src_image,
                src_layout,
                dst: dst_image,
                dst_layout,
                regions: regions.to_vec(),
            },
        );
    }

    fn queue_submit(
        &self,
        queue: vk::Queue,
        command_buffer: vk::CommandBuffer,
        fence: vk::Fence,
    ) -> VkResult<()> {
        {
            let mut state = self.state.lock();
            if state.fail_submit {
                return Err(vk::Result::ERROR_DEVICE_LOST);
            }
            if state.recording.get(&command_buffer) == Some(&true) {
                return Err(vk::Result::ERROR_VALIDATION_FAILED_EXT);
            }
            // Work completes immediately.
            match state.fences.get_mut(&fence) {
                Some(signaled) if !*signaled => *signaled = true,
                // Submitting with a fence that is already signaled is invalid.
                _ => return Err(vk::Result::ERROR_VALIDATION_FAILED_EXT),
            }
        }
        self.record(
            "vkQueueSubmit",
            DeviceCall::Submit {
                queue,
                command_buffer,
                fence,
            },
        );
        Ok(())
    }

    fn get_device_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue {
        self.record(
            "vkGetDeviceQueue",
            DeviceCall::GetDeviceQueue(queue_family_index, queue_index),
        );
        vk::Queue::from_raw(LIVE_QUEUE)
    }
}

pub struct FakeInstance {
    pub memory_properties: Mutex<vk::PhysicalDeviceMemoryProperties>,
}

/// Memory types: 0 host visible, 1 device local, 2 device local + host visible.
pub fn default_memory_properties() -> vk::PhysicalDeviceMemoryProperties {
    let mut properties = vk::PhysicalDeviceMemoryProperties {
        memory_type_count: 3,
        memory_heap_count: 2,
        ..Default::default()
    };
    properties.memory_types[0].property_flags =
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
    properties.memory_types[0].heap_index = 1;
    properties.memory_types[1].property_flags = vk::MemoryPropertyFlags::DEVICE_LOCAL;
    properties.memory_types[2].property_flags =
        vk::MemoryPropertyFlags::DEVICE_LOCAL | vk::MemoryPropertyFlags::HOST_VISIBLE;
    properties
}

impl InstanceTable for FakeInstance {
    fn get_physical_device_memory_properties(
        &self,
        _physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceMemoryProperties {
        *self.memory_properties.lock()
    }
}

// ── Backend ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct RegisteredImage {
    pub device_id: HandleId,
    pub image_id: HandleId,
    pub image: vk::Image,
    pub info: ReplayImageInfo,
}

pub struct FakeBackend {
    pub instances: HashMap<HandleId, vk::Instance>,
    pub devices: HashMap<HandleId, vk::Device>,
    pub device: Arc<FakeDevice>,
    pub instance: Arc<FakeInstance>,
    pub registered: Mutex<Vec<RegisteredImage>>,
    journal: Journal,
}

impl FakeBackend {
    pub fn new(journal: Journal) -> Self {
        let mut instances = HashMap::new();
        instances.insert(VK_INSTANCE_ID, vk::Instance::from_raw(LIVE_VK_INSTANCE));
        let mut devices = HashMap::new();
        devices.insert(VK_DEVICE_ID, vk::Device::from_raw(LIVE_VK_DEVICE));
        Self {
            instances,
            devices,
            device: Arc::new(FakeDevice::new(journal.clone())),
            instance: Arc::new(FakeInstance {
                memory_properties: Mutex::new(default_memory_properties()),
            }),
            registered: Mutex::new(Vec::new()),
            journal,
        }
    }
}

impl VulkanBackend for FakeBackend {
    fn map_instance(&self, capture_id: HandleId) -> Option<vk::Instance> {
        self.instances.get(&capture_id).copied()
    }

    fn map_device(&self, capture_id: HandleId) -> Option<vk::Device> {
        self.devices.get(&capture_id).copied()
    }

    fn instance_table(&self, physical_device: vk::PhysicalDevice) -> Option<Arc<dyn InstanceTable>> {
        if physical_device.as_raw() != LIVE_PHYSICAL_DEVICE {
            return None;
        }
        let table: Arc<dyn InstanceTable> = self.instance.clone();
        Some(table)
    }

    fn device_table(&self, device: vk::Device) -> Option<Arc<dyn DeviceTable>> {
        if device.as_raw() != LIVE_VK_DEVICE {
            return None;
        }
        let table: Arc<dyn DeviceTable> = self.device.clone();
        Some(table)
    }

    fn register_image(
        &self,
        device_id: HandleId,
        image_id: HandleId,
        image: vk::Image,
        info: ReplayImageInfo,
    ) {
        self.journal.lock().push("register_image".to_string());
        self.registered.lock().push(RegisteredImage {
            device_id,
            image_id,
            image,
            info,
        });
    }
}

// ── Scenario helpers ────────────────────────────────────────

pub type Consumer = ReplayConsumer<FakeRuntime, FakeBackend>;

pub struct Harness {
    pub consumer: Consumer,
    pub journal: Journal,
    next_call: u64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(ReplaySettings::default())
    }

    pub fn with_settings(settings: ReplaySettings) -> Self {
        init_test_logging();
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));
        let runtime = FakeRuntime::new(journal.clone());
        let backend = FakeBackend::new(journal.clone());
        Self {
            consumer: ReplayConsumer::new(runtime, backend, settings),
            journal,
            next_call: 0,
        }
    }

    pub fn next_call(&mut self) -> CallInfo {
        self.next_call += 1;
        call(self.next_call)
    }

    pub fn runtime(&self) -> &FakeRuntime {
        self.consumer.runtime()
    }

    pub fn device(&self) -> &FakeDevice {
        &self.consumer.backend().device
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }

    /// Journal entries made by the live XR runtime only.
    pub fn xr_calls(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter(|name| name.starts_with("xr"))
            .collect()
    }

    /// Instance, system and XR-side physical device.
    pub fn setup_instance(&mut self) {
        let c = self.next_call();
        self.consumer
            .process_create_instance(c, XrResult::SUCCESS, &InstanceCreateInfo::default(), INSTANCE_ID)
            .expect("create instance");
        let c = self.next_call();
        self.consumer
            .process_get_system(
                c,
                XrResult::SUCCESS,
                INSTANCE_ID,
                &SystemGetInfo::default(),
                CAPTURE_SYSTEM,
            )
            .expect("get system");
        let c = self.next_call();
        self.consumer
            .process_get_vulkan_graphics_device(
                c,
                XrResult::SUCCESS,
                INSTANCE_ID,
                CAPTURE_SYSTEM,
                VK_INSTANCE_ID,
                PHYSICAL_DEVICE_ID,
            )
            .expect("get graphics device");
    }

    /// Instance setup plus a session with a Vulkan graphics binding.
    pub fn setup_vulkan_session(&mut self) {
        self.setup_instance();
        let c = self.next_call();
        self.consumer
            .process_create_session(
                c,
                XrResult::SUCCESS,
                INSTANCE_ID,
                &vulkan_session_info(),
                SESSION_ID,
            )
            .expect("create session");
    }

    pub fn create_swapchain(&mut self, swapchain_id: HandleId, info: &SwapchainCreateInfo) {
        let c = self.next_call();
        self.consumer
            .process_create_swapchain(c, XrResult::SUCCESS, SESSION_ID, info, swapchain_id)
            .expect("create swapchain");
    }

    /// Both halves of the captured two-call enumeration.
    pub fn enumerate_images(&mut self, swapchain_id: HandleId, captured: usize) {
        let images = captured_images(swapchain_id, captured);
        let c = self.next_call();
        self.consumer
            .process_enumerate_swapchain_images(c, XrResult::SUCCESS, swapchain_id, 0, &[])
            .expect("enumerate count");
        let c = self.next_call();
        self.consumer
            .process_enumerate_swapchain_images(
                c,
                XrResult::SUCCESS,
                swapchain_id,
                captured as u32,
                &images,
            )
            .expect("enumerate fill");
    }

    /// A Vulkan session with one enumerated color swapchain.
    pub fn setup_swapchain(&mut self, captured: usize) {
        self.setup_vulkan_session();
        self.create_swapchain(SWAPCHAIN_ID, &color_swapchain_info());
        self.enumerate_images(SWAPCHAIN_ID, captured);
    }

    pub fn acquire(&mut self, capture_index: u32) {
        let c = self.next_call();
        self.consumer
            .process_acquire_swapchain_image(
                c,
                XrResult::SUCCESS,
                SWAPCHAIN_ID,
                &SwapchainImageAcquireInfo::default(),
                capture_index,
            )
            .expect("acquire");
    }

    pub fn release(&mut self) {
        let c = self.next_call();
        self.consumer
            .process_release_swapchain_image(
                c,
                XrResult::SUCCESS,
                SWAPCHAIN_ID,
                &SwapchainImageReleaseInfo::default(),
            )
            .expect("release");
    }
}

pub fn vulkan_binding() -> GraphicsBindingVulkan {
    GraphicsBindingVulkan {
        instance: HandleField::captured(VK_INSTANCE_ID),
        physical_device: HandleField::captured(PHYSICAL_DEVICE_ID),
        device: HandleField::captured(VK_DEVICE_ID),
        queue_family_index: QUEUE_FAMILY,
        queue_index: 0,
    }
}

pub fn vulkan_session_info() -> SessionCreateInfo {
    SessionCreateInfo {
        system_id: CAPTURE_SYSTEM,
        next: NextChain::new().with(NextStruct::GraphicsBindingVulkan(vulkan_binding())),
        ..Default::default()
    }
}

/// 1024x1024 RGBA8 sRGB color swapchain, one mip, one layer.
pub fn color_swapchain_info() -> SwapchainCreateInfo {
    SwapchainCreateInfo {
        usage_flags: SwapchainUsageFlags::COLOR_ATTACHMENT | SwapchainUsageFlags::SAMPLED,
        format: vk::Format::R8G8B8A8_SRGB.as_raw() as i64,
        sample_count: 1,
        width: 1024,
        height: 1024,
        face_count: 1,
        array_size: 1,
        mip_count: 1,
        ..Default::default()
    }
}

pub fn captured_images(swapchain_id: HandleId, count: usize) -> Vec<SwapchainImage> {
    (0..count as u64)
        .map(|i| SwapchainImage::vulkan(swapchain_id * 0x10 + i + 1))
        .collect()
}
