use std::collections::HashMap;
use std::fmt::Debug;

use ash::vk;
use tracing::warn;
use xrplay_format::xr::{Instance, Session, Space, Swapchain, SystemId};
use xrplay_format::{HandleId, ObjectKind, NULL_HANDLE_ID};

use crate::error::CoreError;

/// Root objects are registered with this parent id.
pub const NO_PARENT: HandleId = NULL_HANDLE_ID;

/// A live handle together with the capture ids it was registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleInfo<H> {
    pub handle: H,
    pub capture_id: HandleId,
    /// Capture id of the object this one was created from, or
    /// [`NULL_HANDLE_ID`] for root objects.
    pub parent_id: HandleId,
}

/// A scalar identifier recorded at capture time and its live counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueInfo {
    pub capture_value: SystemId,
    pub replay_value: SystemId,
}

/// Handle types the registry keeps a table for.
///
/// The kind is carried by the type, so a lookup can never consult the
/// wrong table.
pub trait RegistryHandle: Copy + Debug {
    const KIND: ObjectKind;

    fn table(registry: &IdentityRegistry) -> &HashMap<HandleId, HandleInfo<Self>>;
    fn table_mut(registry: &mut IdentityRegistry) -> &mut HashMap<HandleId, HandleInfo<Self>>;
}

macro_rules! registry_handle {
    ($ty:ty, $kind:ident, $field:ident) => {
        impl RegistryHandle for $ty {
            const KIND: ObjectKind = ObjectKind::$kind;

            fn table(registry: &IdentityRegistry) -> &HashMap<HandleId, HandleInfo<Self>> {
                &registry.$field
            }

            fn table_mut(
                registry: &mut IdentityRegistry,
            ) -> &mut HashMap<HandleId, HandleInfo<Self>> {
                &mut registry.$field
            }
        }
    };
}

registry_handle!(Instance, XrInstance, instances);
registry_handle!(Session, XrSession, sessions);
registry_handle!(Swapchain, XrSwapchain, swapchains);
registry_handle!(Space, XrSpace, spaces);
registry_handle!(vk::PhysicalDevice, XrVkPhysicalDevice, physical_devices);

/// Capture-to-replay identity maps, one table per object kind.
///
/// Owned by the replay consumer; entries are only ever added during a
/// replay. [`IdentityRegistry::clear`] drops everything at teardown.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    instances: HashMap<HandleId, HandleInfo<Instance>>,
    sessions: HashMap<HandleId, HandleInfo<Session>>,
    swapchains: HashMap<HandleId, HandleInfo<Swapchain>>,
    spaces: HashMap<HandleId, HandleInfo<Space>>,
    /// Physical devices returned by `xrGetVulkanGraphicsDeviceKHR`, keyed by
    /// the XR-side capture id. Kept apart from the Vulkan replay engine's own
    /// physical device ids.
    physical_devices: HashMap<HandleId, HandleInfo<vk::PhysicalDevice>>,
    system_ids: HashMap<SystemId, ValueInfo>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the live handle created for `capture_id`.
    ///
    /// Fails if the id is already mapped, or if the kind has a parent and
    /// `parent_id` has no mapping yet.
    pub fn register_handle<H: RegistryHandle>(
        &mut self,
        parent_id: HandleId,
        capture_id: HandleId,
        handle: H,
    ) -> Result<(), CoreError> {
        if let Some(parent_kind) = H::KIND.parent() {
            if !self.contains(parent_kind, parent_id) {
                return Err(CoreError::ParentNotFound {
                    kind: H::KIND,
                    id: capture_id,
                    parent_kind,
                    parent_id,
                });
            }
        }

        let table = H::table_mut(self);
        if table.contains_key(&capture_id) {
            return Err(CoreError::DuplicateHandle {
                kind: H::KIND,
                id: capture_id,
            });
        }
        table.insert(
            capture_id,
            HandleInfo {
                handle,
                capture_id,
                parent_id,
            },
        );
        Ok(())
    }

    /// Record the live physical device returned by
    /// `xrGetVulkanGraphicsDeviceKHR`.
    ///
    /// The query may be repeated and the runtime answers with the same
    /// device, so a repeat keeps the first mapping.
    pub fn register_physical_device(&mut self, capture_id: HandleId, device: vk::PhysicalDevice) {
        match self.physical_devices.get(&capture_id) {
            Some(existing) if existing.handle != device => {
                warn!(
                    capture = capture_id,
                    existing = ?existing.handle,
                    replay = ?device,
                    "physical device already mapped to a different live handle, keeping the first"
                );
            }
            Some(_) => {}
            None => {
                self.physical_devices.insert(
                    capture_id,
                    HandleInfo {
                        handle: device,
                        capture_id,
                        parent_id: NO_PARENT,
                    },
                );
            }
        }
    }

    pub fn lookup<H: RegistryHandle>(&self, capture_id: HandleId) -> Result<&HandleInfo<H>, CoreError> {
        H::table(self)
            .get(&capture_id)
            .ok_or(CoreError::HandleNotFound {
                kind: H::KIND,
                id: capture_id,
            })
    }

    /// Shorthand for the live handle of `capture_id`.
    pub fn handle<H: RegistryHandle>(&self, capture_id: HandleId) -> Result<H, CoreError> {
        self.lookup::<H>(capture_id).map(|info| info.handle)
    }

    /// Record the live system id for a captured one.
    ///
    /// Runtimes usually hand out the same system id on every call, so a
    /// repeat is allowed. The first mapping wins.
    pub fn register_value(&mut self, capture_value: SystemId, replay_value: SystemId) {
        match self.system_ids.get(&capture_value) {
            Some(existing) if existing.replay_value != replay_value => {
                warn!(
                    capture = capture_value.0,
                    existing = existing.replay_value.0,
                    replay = replay_value.0,
                    "system id already mapped to a different live value, keeping the first"
                );
            }
            Some(_) => {}
            None => {
                self.system_ids.insert(
                    capture_value,
                    ValueInfo {
                        capture_value,
                        replay_value,
                    },
                );
            }
        }
    }

    pub fn lookup_value(&self, capture_value: SystemId) -> Result<&ValueInfo, CoreError> {
        self.system_ids
            .get(&capture_value)
            .ok_or(CoreError::ValueNotFound {
                kind: ObjectKind::XrSystemId,
                value: capture_value.0,
            })
    }

    pub fn contains(&self, kind: ObjectKind, id: HandleId) -> bool {
        match kind {
            ObjectKind::XrInstance => self.instances.contains_key(&id),
            ObjectKind::XrSession => self.sessions.contains_key(&id),
            ObjectKind::XrSwapchain => self.swapchains.contains_key(&id),
            ObjectKind::XrSpace => self.spaces.contains_key(&id),
            ObjectKind::XrSystemId => self.system_ids.contains_key(&SystemId(id)),
            ObjectKind::XrVkPhysicalDevice => self.physical_devices.contains_key(&id),
        }
    }

    /// Number of mappings of one kind.
    pub fn len(&self, kind: ObjectKind) -> usize {
        match kind {
            ObjectKind::XrInstance => self.instances.len(),
            ObjectKind::XrSession => self.sessions.len(),
            ObjectKind::XrSwapchain => self.swapchains.len(),
            ObjectKind::XrSpace => self.spaces.len(),
            ObjectKind::XrSystemId => self.system_ids.len(),
            ObjectKind::XrVkPhysicalDevice => self.physical_devices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
            && self.sessions.is_empty()
            && self.swapchains.is_empty()
            && self.spaces.is_empty()
            && self.physical_devices.is_empty()
            && self.system_ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.sessions.clear();
        self.swapchains.clear();
        self.spaces.clear();
        self.physical_devices.clear();
        self.system_ids.clear();
    }
}
