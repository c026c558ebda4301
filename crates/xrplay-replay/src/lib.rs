pub mod backend;
pub mod binding;
pub mod consumer;
pub mod error;
pub mod format_info;
pub mod proxy;
pub mod runtime;
pub mod session;
pub mod struct_mapper;
pub mod swapchain;
pub mod vulkan;

pub use backend::{DeviceTable, InstanceTable, ReplayImageInfo, VulkanBackend};
pub use consumer::ReplayConsumer;
pub use error::{ReplayError, ReplayResult};
pub use runtime::XrRuntime;
