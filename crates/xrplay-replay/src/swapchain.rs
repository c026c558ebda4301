//! Swapchain virtualization.
//!
//! The captured application rendered into whatever images the capture-time
//! runtime handed out, and the trace refers to them by capture index. The
//! live runtime may hand out a different number of images in a different
//! order. Replay therefore renders into one proxy image per captured image
//! and, on release, copies the proxy into the live image the runtime
//! actually acquired.

use std::collections::{HashMap, VecDeque};

use ash::vk;
use tracing::{debug, info};
use xrplay_format::structs::{SwapchainCreateInfo, SwapchainImage, VulkanSwapchainCreateInfoMeta};
use xrplay_format::xr::{Swapchain, SwapchainUsageFlags};
use xrplay_format::{HandleId, NextChain, StructureType};

use crate::backend::{ReplayImageInfo, VulkanBackend};
use crate::binding::{GraphicsBinding, VulkanGraphicsBinding};
use crate::error::{ReplayError, ReplayResult};
use crate::format_info::format_aspects;
use crate::proxy::ProxyImage;
use crate::runtime::{enumerate_two_call, XrRuntime};

const USAGE_TABLE: [(SwapchainUsageFlags, vk::ImageUsageFlags); 7] = [
    (
        SwapchainUsageFlags::COLOR_ATTACHMENT,
        vk::ImageUsageFlags::COLOR_ATTACHMENT,
    ),
    (
        SwapchainUsageFlags::DEPTH_STENCIL_ATTACHMENT,
        vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
    ),
    (
        SwapchainUsageFlags::UNORDERED_ACCESS,
        vk::ImageUsageFlags::STORAGE,
    ),
    (
        SwapchainUsageFlags::TRANSFER_SRC,
        vk::ImageUsageFlags::TRANSFER_SRC,
    ),
    (
        SwapchainUsageFlags::TRANSFER_DST,
        vk::ImageUsageFlags::TRANSFER_DST,
    ),
    (SwapchainUsageFlags::SAMPLED, vk::ImageUsageFlags::SAMPLED),
    (
        SwapchainUsageFlags::INPUT_ATTACHMENT,
        vk::ImageUsageFlags::INPUT_ATTACHMENT,
    ),
];

const CREATE_TABLE: [(SwapchainUsageFlags, vk::ImageCreateFlags); 1] = [(
    SwapchainUsageFlags::MUTABLE_FORMAT,
    vk::ImageCreateFlags::MUTABLE_FORMAT,
)];

/// Translate XR swapchain usage into Vulkan image usage and create flags.
/// Every set bit must have a Vulkan equivalent.
pub fn map_usage_flags(
    usage: SwapchainUsageFlags,
) -> ReplayResult<(vk::ImageUsageFlags, vk::ImageCreateFlags)> {
    let mut remaining = usage;
    let mut image_usage = vk::ImageUsageFlags::empty();
    let mut create_flags = vk::ImageCreateFlags::empty();

    for (xr_bit, vk_bit) in USAGE_TABLE {
        if usage.contains(xr_bit) {
            image_usage |= vk_bit;
            remaining.remove(xr_bit);
        }
    }
    for (xr_bit, vk_bit) in CREATE_TABLE {
        if usage.contains(xr_bit) {
            create_flags |= vk_bit;
            remaining.remove(xr_bit);
        }
    }

    if !remaining.is_empty() {
        return Err(ReplayError::UntranslatableUsage(remaining));
    }
    Ok((image_usage, create_flags))
}

/// Extent of one dimension at a mip level.
pub fn mip_extent(base: u32, level: u32) -> u32 {
    base.checked_shr(level).unwrap_or(0).max(1)
}

/// The create info forwarded to the live runtime: the proxy copy needs the
/// live images to be transfer destinations.
pub fn replay_create_info(info: &SwapchainCreateInfo) -> SwapchainCreateInfo {
    let mut live = info.clone();
    live.usage_flags |= SwapchainUsageFlags::TRANSFER_DST;
    live
}

/// Vulkan half of a virtualized swapchain.
#[derive(Debug)]
pub struct VulkanSwapchainInfo {
    pub image_create_info: vk::ImageCreateInfo<'static>,
    /// Working layout of both proxy and live images between frames.
    pub layout: vk::ImageLayout,
    pub subresource_range: vk::ImageSubresourceRange,
    pub command_pool: vk::CommandPool,
    /// Indexed by capture image index.
    pub proxy_images: Vec<ProxyImage>,
    /// Images of the live swapchain, in runtime order.
    pub replay_images: Vec<vk::Image>,
}

#[derive(Debug)]
pub enum SwapchainGraphics {
    Vulkan {
        binding: VulkanGraphicsBinding,
        info: VulkanSwapchainInfo,
    },
}

/// Replay record of one swapchain.
#[derive(Debug)]
pub struct SwapchainData {
    capture_id: HandleId,
    /// Creation parameters with the extension chain detached.
    create_info: SwapchainCreateInfo,
    meta: Option<VulkanSwapchainCreateInfoMeta>,
    /// Capture index -> replay index, for images acquired but not released.
    index_map: HashMap<u32, u32>,
    /// Acquired capture indices, oldest at the front.
    acquired: VecDeque<u32>,
    enumerated: bool,
    graphics: SwapchainGraphics,
}

impl SwapchainData {
    /// Derive the proxy image parameters from the swapchain create info.
    /// Runs before the live swapchain exists.
    pub fn new(
        capture_id: HandleId,
        info: &SwapchainCreateInfo,
        binding: &GraphicsBinding,
    ) -> ReplayResult<Self> {
        let binding = binding.vulkan()?.clone();
        let meta = info.next.vulkan_swapchain_meta().copied();

        let (mut usage, mut flags) = map_usage_flags(info.usage_flags)?;
        if let Some(meta) = &meta {
            usage |= meta.additional_usage_flags;
            flags |= meta.additional_create_flags;
        }
        // Proxies are copy sources on release.
        usage |= vk::ImageUsageFlags::TRANSFER_SRC;
        if info.face_count == 6 {
            flags |= vk::ImageCreateFlags::CUBE_COMPATIBLE;
        }

        let raw_format =
            i32::try_from(info.format).map_err(|_| ReplayError::UnsupportedFormat(info.format))?;
        let format = vk::Format::from_raw(raw_format);
        let aspect_mask = format_aspects(format);
        let layout = if aspect_mask.intersects(vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL) {
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
        } else if aspect_mask.contains(vk::ImageAspectFlags::COLOR) {
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
        } else {
            return Err(ReplayError::UnsupportedFormat(info.format));
        };

        let array_layers = info.array_size.checked_mul(info.face_count).ok_or(
            ReplayError::LayerCountOverflow {
                array_size: info.array_size,
                face_count: info.face_count,
            },
        )?;
        let image_create_info = vk::ImageCreateInfo::default()
            .flags(flags)
            .image_type(vk::ImageType::TYPE_2D)
            .format(format)
            .extent(vk::Extent3D {
                width: info.width,
                height: info.height,
                depth: 1,
            })
            .mip_levels(info.mip_count)
            .array_layers(array_layers)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let subresource_range = vk::ImageSubresourceRange {
            aspect_mask,
            base_mip_level: 0,
            level_count: info.mip_count,
            base_array_layer: 0,
            layer_count: array_layers,
        };

        let mut create_info = info.clone();
        create_info.next = NextChain::new();

        Ok(Self {
            capture_id,
            create_info,
            meta,
            index_map: HashMap::new(),
            acquired: VecDeque::new(),
            enumerated: false,
            graphics: SwapchainGraphics::Vulkan {
                binding,
                info: VulkanSwapchainInfo {
                    image_create_info,
                    layout,
                    subresource_range,
                    command_pool: vk::CommandPool::null(),
                    proxy_images: Vec::new(),
                    replay_images: Vec::new(),
                },
            },
        })
    }

    /// Two-call enumeration of the live swapchain's images.
    pub fn enumerate_replay_swapchain<R: XrRuntime + ?Sized>(
        &self,
        runtime: &R,
        swapchain: Swapchain,
    ) -> ReplayResult<Vec<vk::Image>> {
        enumerate_two_call(|images: &mut [vk::Image]| {
            runtime.enumerate_swapchain_images(swapchain, images)
        })
        .map_err(|result| ReplayError::LiveCall {
            api: "xrEnumerateSwapchainImages",
            result,
        })
    }

    /// Create one proxy image per captured image and remember the live
    /// images.
    ///
    /// If a proxy fails to build, the ones already built stay in the pool
    /// and are released by [`SwapchainData::destroy`].
    pub fn init_virtual_swapchain(
        &mut self,
        captured: &[SwapchainImage],
        replay_images: Vec<vk::Image>,
        backend: &dyn VulkanBackend,
    ) -> ReplayResult<()> {
        if let Some(image) = captured
            .iter()
            .find(|image| image.ty != StructureType::SWAPCHAIN_IMAGE_VULKAN_KHR)
        {
            return Err(ReplayError::UnsupportedStructure(image.ty));
        }

        let SwapchainGraphics::Vulkan { binding, info } = &mut self.graphics;
        let device = binding.device_table.as_ref();
        let memory_properties = binding.memory_properties();

        let pool_info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(binding.queue_family_index);
        info.command_pool = device
            .create_command_pool(&pool_info)
            .map_err(ReplayError::vulkan("vkCreateCommandPool"))?;

        info.replay_images = replay_images;
        for image in captured {
            let proxy = ProxyImage::create(
                device,
                &memory_properties,
                info.command_pool,
                &info.image_create_info,
            )?;
            backend.register_image(
                binding.device_id,
                image.image,
                proxy.image,
                ReplayImageInfo {
                    memory: proxy.memory,
                    is_swapchain_image: true,
                },
            );
            info.proxy_images.push(proxy);
        }

        self.enumerated = true;
        info!(
            swapchain = self.capture_id,
            captured = info.proxy_images.len(),
            replay = info.replay_images.len(),
            "virtual swapchain initialized"
        );
        Ok(())
    }

    /// Record that the live runtime handed out `replay_index` where the
    /// capture got `capture_index`, and move the proxy into its working
    /// layout.
    pub fn acquire(&mut self, capture_index: u32, replay_index: u32, fence_timeout: u64) -> ReplayResult<()> {
        if !self.enumerated {
            return Err(ReplayError::NotEnumerated(self.capture_id));
        }
        let SwapchainGraphics::Vulkan { binding, info } = &mut self.graphics;
        let proxy_count = info.proxy_images.len();
        let proxy = info
            .proxy_images
            .get_mut(capture_index as usize)
            .ok_or(ReplayError::CaptureIndexOutOfRange {
                index: capture_index,
                count: proxy_count,
            })?;
        if replay_index as usize >= info.replay_images.len() {
            return Err(ReplayError::ReplayIndexOutOfRange {
                index: replay_index,
                count: info.replay_images.len(),
            });
        }

        binding.reset_command_buffer(proxy, fence_timeout)?;
        ensure_recordable(proxy, capture_index)?;

        let device = binding.device_table.as_ref();
        let cb = proxy.command_buffer;
        device
            .begin_command_buffer(cb, vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)
            .map_err(ReplayError::vulkan("vkBeginCommandBuffer"))?;

        let barrier = vk::ImageMemoryBarrier::default()
            .src_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
            .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
            .old_layout(vk::ImageLayout::UNDEFINED)
            .new_layout(info.layout)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(proxy.image)
            .subresource_range(info.subresource_range);
        device.cmd_pipeline_barrier(
            cb,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::PipelineStageFlags::ALL_COMMANDS,
            &[barrier],
        );

        device
            .end_command_buffer(cb)
            .map_err(ReplayError::vulkan("vkEndCommandBuffer"))?;
        device
            .queue_submit(binding.queue, cb, proxy.fence)
            .map_err(ReplayError::vulkan("vkQueueSubmit"))?;
        proxy.mark_submitted();

        self.index_map.insert(capture_index, replay_index);
        self.acquired.push_back(capture_index);
        debug!(
            swapchain = self.capture_id,
            capture_index, replay_index, "swapchain image acquired"
        );
        Ok(())
    }

    /// Copy the oldest acquired proxy into the live image it was paired
    /// with. Returns the released capture index.
    pub fn release(&mut self, fence_timeout: u64) -> ReplayResult<u32> {
        let capture_index = self
            .acquired
            .pop_front()
            .ok_or(ReplayError::AcquireFifoEmpty {
                swapchain: self.capture_id,
            })?;
        let replay_index = self
            .index_map
            .remove(&capture_index)
            .ok_or(ReplayError::UnmappedCaptureIndex(capture_index))?;

        let SwapchainGraphics::Vulkan { binding, info } = &mut self.graphics;
        let proxy_count = info.proxy_images.len();
        let proxy = info
            .proxy_images
            .get_mut(capture_index as usize)
            .ok_or(ReplayError::CaptureIndexOutOfRange {
                index: capture_index,
                count: proxy_count,
            })?;
        let replay_image = *info.replay_images.get(replay_index as usize).ok_or(
            ReplayError::ReplayIndexOutOfRange {
                index: replay_index,
                count: info.replay_images.len(),
            },
        )?;

        binding.reset_command_buffer(proxy, fence_timeout)?;
        ensure_recordable(proxy, capture_index)?;

        let device = binding.device_table.as_ref();
        let cb = proxy.command_buffer;
        let range = info.subresource_range;
        device
            .begin_command_buffer(cb, vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)
            .map_err(ReplayError::vulkan("vkBeginCommandBuffer"))?;

        let to_transfer = [
            vk::ImageMemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
                .dst_access_mask(vk::AccessFlags::TRANSFER_READ)
                .old_layout(info.layout)
                .new_layout(vk::ImageLayout::TRANSFER_SRC_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(proxy.image)
                .subresource_range(range),
            vk::ImageMemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
                .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .old_layout(info.layout)
                .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(replay_image)
                .subresource_range(range),
        ];
        device.cmd_pipeline_barrier(
            cb,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::PipelineStageFlags::TRANSFER,
            &to_transfer,
        );

        let extent = info.image_create_info.extent;
        let regions: Vec<vk::ImageCopy> = (0..range.level_count)
            .map(|level| {
                let subresource = vk::ImageSubresourceLayers {
                    aspect_mask: range.aspect_mask,
                    mip_level: level,
                    base_array_layer: 0,
                    layer_count: range.layer_count,
                };
                vk::ImageCopy {
                    src_subresource: subresource,
                    src_offset: vk::Offset3D::default(),
                    dst_subresource: subresource,
                    dst_offset: vk::Offset3D::default(),
                    extent: vk::Extent3D {
                        width: mip_extent(extent.width, level),
                        height: mip_extent(extent.height, level),
                        depth: 1,
                    },
                }
            })
            .collect();
        device.cmd_copy_image(
            cb,
            proxy.image,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            replay_image,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            &regions,
        );

        // Live image back to the working layout. The proxy is reset on its
        // next acquire.
        let to_working = vk::ImageMemoryBarrier::default()
            .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
            .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
            .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
            .new_layout(info.layout)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(replay_image)
            .subresource_range(range);
        device.cmd_pipeline_barrier(
            cb,
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::ALL_COMMANDS,
            &[to_working],
        );

        device
            .end_command_buffer(cb)
            .map_err(ReplayError::vulkan("vkEndCommandBuffer"))?;
        device
            .queue_submit(binding.queue, cb, proxy.fence)
            .map_err(ReplayError::vulkan("vkQueueSubmit"))?;
        proxy.mark_submitted();

        debug!(
            swapchain = self.capture_id,
            capture_index, replay_index, "swapchain image released"
        );
        Ok(capture_index)
    }

    /// `xrWaitSwapchainImage` returned without timing out. Nothing to do on
    /// the proxy side; the copy happens on release.
    pub fn waited_without_timeout(&self) {
        debug!(
            swapchain = self.capture_id,
            oldest = self.acquired.front().copied(),
            "swapchain image wait completed"
        );
    }

    /// Release every GPU resource the record owns.
    pub fn destroy(self) {
        let SwapchainGraphics::Vulkan { binding, mut info } = self.graphics;
        let device = binding.device_table.as_ref();
        for proxy in &mut info.proxy_images {
            proxy.destroy(device, info.command_pool);
        }
        if info.command_pool != vk::CommandPool::null() {
            device.destroy_command_pool(info.command_pool);
        }
    }

    pub fn capture_id(&self) -> HandleId {
        self.capture_id
    }

    pub fn create_info(&self) -> &SwapchainCreateInfo {
        &self.create_info
    }

    pub fn meta(&self) -> Option<&VulkanSwapchainCreateInfoMeta> {
        self.meta.as_ref()
    }

    pub fn is_enumerated(&self) -> bool {
        self.enumerated
    }

    pub fn vulkan_info(&self) -> &VulkanSwapchainInfo {
        let SwapchainGraphics::Vulkan { info, .. } = &self.graphics;
        info
    }

    pub fn proxy_count(&self) -> usize {
        self.vulkan_info().proxy_images.len()
    }

    pub fn replay_image_count(&self) -> usize {
        self.vulkan_info().replay_images.len()
    }

    /// Acquired capture indices, oldest first.
    pub fn acquired(&self) -> impl Iterator<Item = u32> + '_ {
        self.acquired.iter().copied()
    }

    pub fn replay_index(&self, capture_index: u32) -> Option<u32> {
        self.index_map.get(&capture_index).copied()
    }
}

fn ensure_recordable(proxy: &ProxyImage, capture_index: u32) -> ReplayResult<()> {
    if proxy.in_flight() {
        return Err(ReplayError::CommandBufferInFlight(capture_index));
    }
    Ok(())
}
