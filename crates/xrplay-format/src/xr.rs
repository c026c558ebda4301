//! OpenXR scalar types as seen by replay: handles, result codes, enums and
//! flag sets. Values follow the Khronos registry so that decoded traces can
//! be forwarded to a live runtime unchanged.

use std::fmt;

macro_rules! xr_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            pub const NULL: Self = Self(0);

            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub fn into_raw(self) -> u64 {
                self.0
            }

            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

xr_handle!(
    /// Live `XrInstance` handle.
    Instance
);
xr_handle!(
    /// Live `XrSession` handle.
    Session
);
xr_handle!(
    /// Live `XrSwapchain` handle.
    Swapchain
);
xr_handle!(
    /// Live `XrSpace` handle.
    Space
);

/// `XrSystemId`: a scalar identifier, not a handle.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SystemId(pub u64);

/// `XrTime`: nanoseconds on the runtime's clock.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(pub i64);

/// `XrDuration` in nanoseconds.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub i64);

impl Duration {
    pub const INFINITE: Self = Self(0x7fff_ffff_ffff_ffff);
}

// ── Result codes ────────────────────────────────────────────

/// `XrResult`. Non-negative values are success codes.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct XrResult(pub i32);

impl XrResult {
    pub const SUCCESS: Self = Self(0);
    pub const TIMEOUT_EXPIRED: Self = Self(1);
    pub const SESSION_LOSS_PENDING: Self = Self(3);
    pub const EVENT_UNAVAILABLE: Self = Self(4);
    pub const SPACE_BOUNDS_UNAVAILABLE: Self = Self(7);
    pub const SESSION_NOT_FOCUSED: Self = Self(8);
    pub const FRAME_DISCARDED: Self = Self(9);
    pub const ERROR_VALIDATION_FAILURE: Self = Self(-1);
    pub const ERROR_RUNTIME_FAILURE: Self = Self(-2);
    pub const ERROR_OUT_OF_MEMORY: Self = Self(-3);
    pub const ERROR_API_VERSION_UNSUPPORTED: Self = Self(-4);
    pub const ERROR_INITIALIZATION_FAILED: Self = Self(-6);
    pub const ERROR_FUNCTION_UNSUPPORTED: Self = Self(-7);
    pub const ERROR_FEATURE_UNSUPPORTED: Self = Self(-8);
    pub const ERROR_LIMIT_REACHED: Self = Self(-10);
    pub const ERROR_SIZE_INSUFFICIENT: Self = Self(-11);
    pub const ERROR_HANDLE_INVALID: Self = Self(-12);
    pub const ERROR_INSTANCE_LOST: Self = Self(-13);
    pub const ERROR_SESSION_RUNNING: Self = Self(-14);
    pub const ERROR_SESSION_NOT_RUNNING: Self = Self(-16);
    pub const ERROR_SESSION_LOST: Self = Self(-17);
    pub const ERROR_SYSTEM_INVALID: Self = Self(-18);
    pub const ERROR_PATH_INVALID: Self = Self(-19);
    pub const ERROR_SWAPCHAIN_RECT_INVALID: Self = Self(-25);
    pub const ERROR_SWAPCHAIN_FORMAT_UNSUPPORTED: Self = Self(-26);
    pub const ERROR_CALL_ORDER_INVALID: Self = Self(-37);
    pub const ERROR_GRAPHICS_DEVICE_INVALID: Self = Self(-38);
    pub const ERROR_POSE_INVALID: Self = Self(-39);
    pub const ERROR_INDEX_OUT_OF_RANGE: Self = Self(-40);
    pub const ERROR_VIEW_CONFIGURATION_TYPE_UNSUPPORTED: Self = Self(-41);
    pub const ERROR_ENVIRONMENT_BLEND_MODE_UNSUPPORTED: Self = Self(-42);
    pub const ERROR_REFERENCE_SPACE_UNSUPPORTED: Self = Self(-47);
    pub const ERROR_FORM_FACTOR_UNSUPPORTED: Self = Self(-34);
    pub const ERROR_FORM_FACTOR_UNAVAILABLE: Self = Self(-35);
    pub const ERROR_GRAPHICS_REQUIREMENTS_CALL_MISSING: Self = Self(-50);

    pub fn succeeded(self) -> bool {
        self.0 >= 0
    }

    pub fn failed(self) -> bool {
        self.0 < 0
    }

    pub fn as_raw(self) -> i32 {
        self.0
    }

    fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::SUCCESS => "XR_SUCCESS",
            Self::TIMEOUT_EXPIRED => "XR_TIMEOUT_EXPIRED",
            Self::SESSION_LOSS_PENDING => "XR_SESSION_LOSS_PENDING",
            Self::EVENT_UNAVAILABLE => "XR_EVENT_UNAVAILABLE",
            Self::SPACE_BOUNDS_UNAVAILABLE => "XR_SPACE_BOUNDS_UNAVAILABLE",
            Self::SESSION_NOT_FOCUSED => "XR_SESSION_NOT_FOCUSED",
            Self::FRAME_DISCARDED => "XR_FRAME_DISCARDED",
            Self::ERROR_VALIDATION_FAILURE => "XR_ERROR_VALIDATION_FAILURE",
            Self::ERROR_RUNTIME_FAILURE => "XR_ERROR_RUNTIME_FAILURE",
            Self::ERROR_OUT_OF_MEMORY => "XR_ERROR_OUT_OF_MEMORY",
            Self::ERROR_API_VERSION_UNSUPPORTED => "XR_ERROR_API_VERSION_UNSUPPORTED",
            Self::ERROR_INITIALIZATION_FAILED => "XR_ERROR_INITIALIZATION_FAILED",
            Self::ERROR_FUNCTION_UNSUPPORTED => "XR_ERROR_FUNCTION_UNSUPPORTED",
            Self::ERROR_FEATURE_UNSUPPORTED => "XR_ERROR_FEATURE_UNSUPPORTED",
            Self::ERROR_LIMIT_REACHED => "XR_ERROR_LIMIT_REACHED",
            Self::ERROR_SIZE_INSUFFICIENT => "XR_ERROR_SIZE_INSUFFICIENT",
            Self::ERROR_HANDLE_INVALID => "XR_ERROR_HANDLE_INVALID",
            Self::ERROR_INSTANCE_LOST => "XR_ERROR_INSTANCE_LOST",
            Self::ERROR_SESSION_RUNNING => "XR_ERROR_SESSION_RUNNING",
            Self::ERROR_SESSION_NOT_RUNNING => "XR_ERROR_SESSION_NOT_RUNNING",
            Self::ERROR_SESSION_LOST => "XR_ERROR_SESSION_LOST",
            Self::ERROR_SYSTEM_INVALID => "XR_ERROR_SYSTEM_INVALID",
            Self::ERROR_PATH_INVALID => "XR_ERROR_PATH_INVALID",
            Self::ERROR_SWAPCHAIN_RECT_INVALID => "XR_ERROR_SWAPCHAIN_RECT_INVALID",
            Self::ERROR_SWAPCHAIN_FORMAT_UNSUPPORTED => "XR_ERROR_SWAPCHAIN_FORMAT_UNSUPPORTED",
            Self::ERROR_CALL_ORDER_INVALID => "XR_ERROR_CALL_ORDER_INVALID",
            Self::ERROR_GRAPHICS_DEVICE_INVALID => "XR_ERROR_GRAPHICS_DEVICE_INVALID",
            Self::ERROR_POSE_INVALID => "XR_ERROR_POSE_INVALID",
            Self::ERROR_INDEX_OUT_OF_RANGE => "XR_ERROR_INDEX_OUT_OF_RANGE",
            Self::ERROR_VIEW_CONFIGURATION_TYPE_UNSUPPORTED => {
                "XR_ERROR_VIEW_CONFIGURATION_TYPE_UNSUPPORTED"
            }
            Self::ERROR_ENVIRONMENT_BLEND_MODE_UNSUPPORTED => {
                "XR_ERROR_ENVIRONMENT_BLEND_MODE_UNSUPPORTED"
            }
            Self::ERROR_REFERENCE_SPACE_UNSUPPORTED => "XR_ERROR_REFERENCE_SPACE_UNSUPPORTED",
            Self::ERROR_FORM_FACTOR_UNSUPPORTED => "XR_ERROR_FORM_FACTOR_UNSUPPORTED",
            Self::ERROR_FORM_FACTOR_UNAVAILABLE => "XR_ERROR_FORM_FACTOR_UNAVAILABLE",
            Self::ERROR_GRAPHICS_REQUIREMENTS_CALL_MISSING => {
                "XR_ERROR_GRAPHICS_REQUIREMENTS_CALL_MISSING"
            }
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for XrResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "XrResult({})", self.0),
        }
    }
}

impl fmt::Display for XrResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ── Structure type tags ─────────────────────────────────────

/// `XrStructureType`: the declared type tag every structure carries.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StructureType(pub i32);

impl StructureType {
    pub const UNKNOWN: Self = Self(0);
    pub const INSTANCE_CREATE_INFO: Self = Self(3);
    pub const SYSTEM_GET_INFO: Self = Self(4);
    pub const SESSION_CREATE_INFO: Self = Self(8);
    pub const SWAPCHAIN_CREATE_INFO: Self = Self(9);
    pub const SESSION_BEGIN_INFO: Self = Self(10);
    pub const FRAME_END_INFO: Self = Self(12);
    pub const EVENT_DATA_BUFFER: Self = Self(16);
    pub const EVENT_DATA_INSTANCE_LOSS_PENDING: Self = Self(17);
    pub const EVENT_DATA_SESSION_STATE_CHANGED: Self = Self(18);
    pub const FRAME_WAIT_INFO: Self = Self(33);
    pub const COMPOSITION_LAYER_PROJECTION: Self = Self(35);
    pub const COMPOSITION_LAYER_QUAD: Self = Self(36);
    pub const REFERENCE_SPACE_CREATE_INFO: Self = Self(37);
    pub const EVENT_DATA_REFERENCE_SPACE_CHANGE_PENDING: Self = Self(40);
    pub const VIEW_CONFIGURATION_VIEW: Self = Self(41);
    pub const FRAME_STATE: Self = Self(44);
    pub const FRAME_BEGIN_INFO: Self = Self(46);
    pub const COMPOSITION_LAYER_PROJECTION_VIEW: Self = Self(48);
    pub const EVENT_DATA_EVENTS_LOST: Self = Self(49);
    pub const EVENT_DATA_INTERACTION_PROFILE_CHANGED: Self = Self(52);
    pub const SWAPCHAIN_IMAGE_ACQUIRE_INFO: Self = Self(55);
    pub const SWAPCHAIN_IMAGE_WAIT_INFO: Self = Self(56);
    pub const SWAPCHAIN_IMAGE_RELEASE_INFO: Self = Self(57);
    pub const COMPOSITION_LAYER_CUBE_KHR: Self = Self(1000006000);
    pub const COMPOSITION_LAYER_DEPTH_INFO_KHR: Self = Self(1000010000);
    pub const COMPOSITION_LAYER_CYLINDER_KHR: Self = Self(1000017000);
    pub const COMPOSITION_LAYER_EQUIRECT_KHR: Self = Self(1000018000);
    pub const GRAPHICS_BINDING_VULKAN_KHR: Self = Self(1000025000);
    pub const SWAPCHAIN_IMAGE_VULKAN_KHR: Self = Self(1000025001);
    pub const GRAPHICS_REQUIREMENTS_VULKAN_KHR: Self = Self(1000025002);
    pub const VULKAN_SWAPCHAIN_CREATE_INFO_META: Self = Self(1000227000);

    fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::UNKNOWN => "XR_TYPE_UNKNOWN",
            Self::INSTANCE_CREATE_INFO => "XR_TYPE_INSTANCE_CREATE_INFO",
            Self::SYSTEM_GET_INFO => "XR_TYPE_SYSTEM_GET_INFO",
            Self::SESSION_CREATE_INFO => "XR_TYPE_SESSION_CREATE_INFO",
            Self::SWAPCHAIN_CREATE_INFO => "XR_TYPE_SWAPCHAIN_CREATE_INFO",
            Self::SESSION_BEGIN_INFO => "XR_TYPE_SESSION_BEGIN_INFO",
            Self::FRAME_END_INFO => "XR_TYPE_FRAME_END_INFO",
            Self::EVENT_DATA_BUFFER => "XR_TYPE_EVENT_DATA_BUFFER",
            Self::EVENT_DATA_INSTANCE_LOSS_PENDING => "XR_TYPE_EVENT_DATA_INSTANCE_LOSS_PENDING",
            Self::EVENT_DATA_SESSION_STATE_CHANGED => "XR_TYPE_EVENT_DATA_SESSION_STATE_CHANGED",
            Self::FRAME_WAIT_INFO => "XR_TYPE_FRAME_WAIT_INFO",
            Self::COMPOSITION_LAYER_PROJECTION => "XR_TYPE_COMPOSITION_LAYER_PROJECTION",
            Self::COMPOSITION_LAYER_QUAD => "XR_TYPE_COMPOSITION_LAYER_QUAD",
            Self::REFERENCE_SPACE_CREATE_INFO => "XR_TYPE_REFERENCE_SPACE_CREATE_INFO",
            Self::EVENT_DATA_REFERENCE_SPACE_CHANGE_PENDING => {
                "XR_TYPE_EVENT_DATA_REFERENCE_SPACE_CHANGE_PENDING"
            }
            Self::VIEW_CONFIGURATION_VIEW => "XR_TYPE_VIEW_CONFIGURATION_VIEW",
            Self::FRAME_STATE => "XR_TYPE_FRAME_STATE",
            Self::FRAME_BEGIN_INFO => "XR_TYPE_FRAME_BEGIN_INFO",
            Self::COMPOSITION_LAYER_PROJECTION_VIEW => "XR_TYPE_COMPOSITION_LAYER_PROJECTION_VIEW",
            Self::EVENT_DATA_EVENTS_LOST => "XR_TYPE_EVENT_DATA_EVENTS_LOST",
            Self::EVENT_DATA_INTERACTION_PROFILE_CHANGED => {
                "XR_TYPE_EVENT_DATA_INTERACTION_PROFILE_CHANGED"
            }
            Self::SWAPCHAIN_IMAGE_ACQUIRE_INFO => "XR_TYPE_SWAPCHAIN_IMAGE_ACQUIRE_INFO",
            Self::SWAPCHAIN_IMAGE_WAIT_INFO => "XR_TYPE_SWAPCHAIN_IMAGE_WAIT_INFO",
            Self::SWAPCHAIN_IMAGE_RELEASE_INFO => "XR_TYPE_SWAPCHAIN_IMAGE_RELEASE_INFO",
            Self::COMPOSITION_LAYER_CUBE_KHR => "XR_TYPE_COMPOSITION_LAYER_CUBE_KHR",
            Self::COMPOSITION_LAYER_DEPTH_INFO_KHR => "XR_TYPE_COMPOSITION_LAYER_DEPTH_INFO_KHR",
            Self::COMPOSITION_LAYER_CYLINDER_KHR => "XR_TYPE_COMPOSITION_LAYER_CYLINDER_KHR",
            Self::COMPOSITION_LAYER_EQUIRECT_KHR => "XR_TYPE_COMPOSITION_LAYER_EQUIRECT_KHR",
            Self::GRAPHICS_BINDING_VULKAN_KHR => "XR_TYPE_GRAPHICS_BINDING_VULKAN_KHR",
            Self::SWAPCHAIN_IMAGE_VULKAN_KHR => "XR_TYPE_SWAPCHAIN_IMAGE_VULKAN_KHR",
            Self::GRAPHICS_REQUIREMENTS_VULKAN_KHR => "XR_TYPE_GRAPHICS_REQUIREMENTS_VULKAN_KHR",
            Self::VULKAN_SWAPCHAIN_CREATE_INFO_META => "XR_TYPE_VULKAN_SWAPCHAIN_CREATE_INFO_META",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "XrStructureType({})", self.0),
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ── Enums ───────────────────────────────────────────────────

/// `XrReferenceSpaceType`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReferenceSpaceType(pub i32);

impl ReferenceSpaceType {
    pub const VIEW: Self = Self(1);
    pub const LOCAL: Self = Self(2);
    pub const STAGE: Self = Self(3);
    pub const UNBOUNDED_MSFT: Self = Self(1000038000);
    pub const LOCAL_FLOOR: Self = Self(1000426000);
}

/// `XrViewConfigurationType`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewConfigurationType(pub i32);

impl ViewConfigurationType {
    pub const PRIMARY_MONO: Self = Self(1);
    pub const PRIMARY_STEREO: Self = Self(2);
}

/// `XrEnvironmentBlendMode`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EnvironmentBlendMode(pub i32);

impl EnvironmentBlendMode {
    pub const OPAQUE: Self = Self(1);
    pub const ADDITIVE: Self = Self(2);
    pub const ALPHA_BLEND: Self = Self(3);
}

/// `XrFormFactor`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FormFactor(pub i32);

impl FormFactor {
    pub const HEAD_MOUNTED_DISPLAY: Self = Self(1);
    pub const HANDHELD_DISPLAY: Self = Self(2);
}

// ── Flags ───────────────────────────────────────────────────

bitflags::bitflags! {
    /// `XrSwapchainUsageFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SwapchainUsageFlags: u64 {
        const COLOR_ATTACHMENT         = 0x0000_0001;
        const DEPTH_STENCIL_ATTACHMENT = 0x0000_0002;
        const UNORDERED_ACCESS         = 0x0000_0004;
        const TRANSFER_SRC             = 0x0000_0008;
        const TRANSFER_DST             = 0x0000_0010;
        const SAMPLED                  = 0x0000_0020;
        const MUTABLE_FORMAT           = 0x0000_0040;
        /// `XR_SWAPCHAIN_USAGE_INPUT_ATTACHMENT_BIT_KHR` (alias of the MND bit).
        const INPUT_ATTACHMENT         = 0x0000_0080;
        // Bits outside the registry must survive decoding so that the
        // Vulkan translation can reject them.
        const _ = !0;
    }
}

bitflags::bitflags! {
    /// `XrSwapchainCreateFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SwapchainCreateFlags: u64 {
        const PROTECTED_CONTENT = 0x0000_0001;
        const STATIC_IMAGE      = 0x0000_0002;
        const _ = !0;
    }
}

bitflags::bitflags! {
    /// `XrCompositionLayerFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompositionLayerFlags: u64 {
        const CORRECT_CHROMATIC_ABERRATION = 0x0000_0001;
        const BLEND_TEXTURE_SOURCE_ALPHA   = 0x0000_0002;
        const UNPREMULTIPLIED_ALPHA        = 0x0000_0004;
        const INVERTED_ALPHA               = 0x0000_0008;
        const _ = !0;
    }
}

bitflags::bitflags! {
    /// `XrSessionCreateFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SessionCreateFlags: u64 {
        const _ = !0;
    }
}

// ── Geometry ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quaternionf {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternionf {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Posef {
    pub orientation: Quaternionf,
    pub position: Vector3f,
}

impl Posef {
    pub const IDENTITY: Self = Self {
        orientation: Quaternionf::IDENTITY,
        position: Vector3f {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        },
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Fovf {
    pub angle_left: f32,
    pub angle_right: f32,
    pub angle_up: f32,
    pub angle_down: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset2Di {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2Di {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect2Di {
    pub offset: Offset2Di,
    pub extent: Extent2Di,
}
