use std::fmt;

/// Identifier assigned to an object at capture time.
/// Opaque to replay -- only meaningful as a key into the identity maps.
pub type HandleId = u64;

/// The capture id recorded for a null handle.
pub const NULL_HANDLE_ID: HandleId = 0;

/// Kind of object an identifier refers to.
/// Used to select the identity map and for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    XrInstance,
    XrSession,
    XrSwapchain,
    XrSpace,
    XrSystemId,
    /// Physical device as recorded by the XR side of the capture.
    /// Lives in its own identifier space, distinct from the Vulkan replay
    /// engine's physical device ids.
    XrVkPhysicalDevice,
}

impl ObjectKind {
    /// The kind whose mapping must exist before a mapping of this kind can be
    /// created, following the creation order of the API.
    pub fn parent(self) -> Option<ObjectKind> {
        match self {
            ObjectKind::XrInstance => None,
            ObjectKind::XrSession => Some(ObjectKind::XrInstance),
            ObjectKind::XrSwapchain => Some(ObjectKind::XrSession),
            ObjectKind::XrSpace => Some(ObjectKind::XrSession),
            // Values are keyed by themselves and carry no parent id.
            ObjectKind::XrSystemId => None,
            ObjectKind::XrVkPhysicalDevice => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::XrInstance => "XrInstance",
            ObjectKind::XrSession => "XrSession",
            ObjectKind::XrSwapchain => "XrSwapchain",
            ObjectKind::XrSpace => "XrSpace",
            ObjectKind::XrSystemId => "XrSystemId",
            ObjectKind::XrVkPhysicalDevice => "VkPhysicalDevice",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A handle embedded in a decoded structure.
///
/// `capture_id` is what the trace recorded; `value` starts out null and is
/// filled with the live handle by the struct handle mapper before the
/// structure is forwarded to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandleField<H> {
    pub capture_id: HandleId,
    pub value: H,
}

impl<H: Default> HandleField<H> {
    /// A field that has not been mapped yet.
    pub fn captured(capture_id: HandleId) -> Self {
        Self {
            capture_id,
            value: H::default(),
        }
    }
}

impl<H> HandleField<H> {
    pub fn is_null(&self) -> bool {
        self.capture_id == NULL_HANDLE_ID
    }
}
