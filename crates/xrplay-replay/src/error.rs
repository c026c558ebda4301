use ash::vk;
use xrplay_core::CoreError;
use xrplay_format::xr::{ReferenceSpaceType, StructureType, SwapchainUsageFlags};
use xrplay_format::{CallInfo, HandleId, XrResult};

pub type ReplayResult<T> = Result<T, ReplayError>;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{api} failed on replay: {result}")]
    LiveCall { api: &'static str, result: XrResult },

    #[error("{call} failed: {result}")]
    Vulkan { call: &'static str, result: vk::Result },

    #[error("Vulkan replay has no {kind} for capture id {id:#x}")]
    BackendLookup { kind: &'static str, id: u64 },

    #[error("swapchain usage flags {0:?} have no Vulkan equivalent")]
    UntranslatableUsage(SwapchainUsageFlags),

    #[error("unsupported swapchain format {0}")]
    UnsupportedFormat(i64),

    #[error("session has no usable graphics binding")]
    MissingGraphicsBinding,

    #[error("unsupported structure {0}")]
    UnsupportedStructure(StructureType),

    #[error("unsupported composition layer {0}")]
    UnsupportedLayer(StructureType),

    #[error("{0:?} is not supported by the replay runtime")]
    UnsupportedReferenceSpace(ReferenceSpaceType),

    #[error("swapchain layer count overflows: {array_size} layers x {face_count} faces")]
    LayerCountOverflow { array_size: u32, face_count: u32 },

    #[error("no memory type in {type_bits:#b} has properties {required:?}")]
    NoSuitableMemoryType {
        type_bits: u32,
        required: vk::MemoryPropertyFlags,
    },

    #[error("event {expected} not returned after {attempts} polls")]
    EventNotFound {
        expected: StructureType,
        attempts: u32,
    },

    #[error("swapchain {swapchain:#x} image wait still timing out after {attempts} attempts")]
    SwapchainWaitExhausted { swapchain: HandleId, attempts: u32 },

    #[error("release on swapchain {swapchain:#x} with no acquired image")]
    AcquireFifoEmpty { swapchain: HandleId },

    #[error("capture image index {index} out of range for {count} captured images")]
    CaptureIndexOutOfRange { index: u32, count: usize },

    #[error("replay image index {index} out of range for {count} replay images")]
    ReplayIndexOutOfRange { index: u32, count: usize },

    #[error("capture image index {0} was never acquired")]
    UnmappedCaptureIndex(u32),

    #[error("swapchain {0:#x} images have not been enumerated")]
    NotEnumerated(HandleId),

    #[error("command buffer of proxy image {0} is still in flight")]
    CommandBufferInFlight(u32),

    #[error("no predicted display time recorded for session {0:#x}")]
    MissingDisplayTime(HandleId),

    #[error("{api} ({call}): {source}")]
    AtCall {
        call: CallInfo,
        api: &'static str,
        #[source]
        source: Box<ReplayError>,
    },
}

impl ReplayError {
    pub(crate) fn vulkan(call: &'static str) -> impl FnOnce(vk::Result) -> ReplayError {
        move |result| ReplayError::Vulkan { call, result }
    }

    /// Tag an error with the decoded call it was raised for.
    pub fn at(self, call: CallInfo, api: &'static str) -> ReplayError {
        ReplayError::AtCall {
            call,
            api,
            source: Box::new(self),
        }
    }

    /// The underlying cause, with call context stripped.
    pub fn root(&self) -> &ReplayError {
        match self {
            ReplayError::AtCall { source, .. } => source.root(),
            other => other,
        }
    }

    /// Index of the offending call, if the error carries one.
    pub fn call_index(&self) -> Option<u64> {
        match self {
            ReplayError::AtCall { call, .. } => Some(call.index),
            _ => None,
        }
    }
}
