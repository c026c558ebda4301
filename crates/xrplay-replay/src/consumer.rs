//! Replay consumer: one entry point per intercepted OpenXR call.
//!
//! Every entry point resolves the capture ids it is given, maps the decoded
//! structures, calls the live runtime, and records the objects the call
//! produced. Errors are tagged with the call they came from; replay is
//! expected to stop at the first one.

use std::collections::HashMap;
use std::time::Duration as StdDuration;

use tracing::{debug, info, warn};
use xrplay_core::{CoreError, IdentityRegistry, ReplaySettings, NO_PARENT};
use xrplay_format::structs::{
    EventDataBuffer, FrameBeginInfo, FrameEndInfo, FrameState, FrameWaitInfo,
    GraphicsRequirementsVulkan, InstanceCreateInfo, ReferenceSpaceCreateInfo, SessionBeginInfo,
    SessionCreateInfo, SwapchainCreateInfo, SwapchainImage, SwapchainImageAcquireInfo,
    SwapchainImageReleaseInfo, SwapchainImageWaitInfo, SystemGetInfo, ViewConfigurationView,
};
use xrplay_format::xr::{
    Instance, ReferenceSpaceType, Session, Space, Swapchain, SystemId, ViewConfigurationType,
};
use xrplay_format::{CallInfo, HandleId, ObjectKind, XrResult};

use crate::backend::VulkanBackend;
use crate::binding::GraphicsBinding;
use crate::error::{ReplayError, ReplayResult};
use crate::runtime::{enumerate_two_call, XrRuntime};
use crate::session::SessionState;
use crate::struct_mapper::StructHandleMapper;
use crate::swapchain::{replay_create_info, SwapchainData};

/// A live failure is only an error if the capture succeeded.
fn check_live(api: &'static str, captured: XrResult, live: XrResult) -> ReplayResult<()> {
    if live.failed() && !captured.failed() {
        return Err(ReplayError::LiveCall { api, result: live });
    }
    if live != captured {
        debug!(api, %captured, %live, "replay result differs from capture");
    }
    Ok(())
}

fn live_call(api: &'static str) -> impl FnOnce(XrResult) -> ReplayError {
    move |result| ReplayError::LiveCall { api, result }
}

pub struct ReplayConsumer<R, B> {
    runtime: R,
    backend: B,
    settings: ReplaySettings,
    registry: IdentityRegistry,
    /// Keyed by session capture id.
    sessions: HashMap<HandleId, SessionState>,
    /// Keyed by swapchain capture id.
    swapchains: HashMap<HandleId, SwapchainData>,
}

impl<R: XrRuntime, B: VulkanBackend> ReplayConsumer<R, B> {
    pub fn new(runtime: R, backend: B, settings: ReplaySettings) -> Self {
        Self {
            runtime,
            backend,
            settings,
            registry: IdentityRegistry::new(),
            sessions: HashMap::new(),
            swapchains: HashMap::new(),
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &ReplaySettings {
        &self.settings
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn session_state(&self, session_id: HandleId) -> Option<&SessionState> {
        self.sessions.get(&session_id)
    }

    pub fn swapchain(&self, swapchain_id: HandleId) -> Option<&SwapchainData> {
        self.swapchains.get(&swapchain_id)
    }

    fn session_state_mut(&mut self, session_id: HandleId) -> ReplayResult<&mut SessionState> {
        self.sessions
            .get_mut(&session_id)
            .ok_or(ReplayError::Core(CoreError::HandleNotFound {
                kind: ObjectKind::XrSession,
                id: session_id,
            }))
    }

    fn swapchain_data_mut(&mut self, swapchain_id: HandleId) -> ReplayResult<&mut SwapchainData> {
        self.swapchains
            .get_mut(&swapchain_id)
            .ok_or(ReplayError::Core(CoreError::HandleNotFound {
                kind: ObjectKind::XrSwapchain,
                id: swapchain_id,
            }))
    }

    // ── Instance / system ───────────────────────────────────

    pub fn process_create_instance(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        info: &InstanceCreateInfo,
        instance_id: HandleId,
    ) -> ReplayResult<()> {
        const API: &str = "xrCreateInstance";
        self.create_instance(captured, info, instance_id)
            .map_err(|e| e.at(call, API))
    }

    fn create_instance(
        &mut self,
        captured: XrResult,
        info: &InstanceCreateInfo,
        instance_id: HandleId,
    ) -> ReplayResult<()> {
        if captured.failed() {
            return Ok(());
        }
        let instance = self
            .runtime
            .create_instance(info)
            .map_err(live_call("xrCreateInstance"))?;
        self.registry
            .register_handle(NO_PARENT, instance_id, instance)?;
        info!(instance = instance_id, live = instance.0, "instance created");
        Ok(())
    }

    pub fn process_get_system(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        instance_id: HandleId,
        info: &SystemGetInfo,
        system_id: SystemId,
    ) -> ReplayResult<()> {
        const API: &str = "xrGetSystem";
        self.get_system(captured, instance_id, info, system_id)
            .map_err(|e| e.at(call, API))
    }

    fn get_system(
        &mut self,
        captured: XrResult,
        instance_id: HandleId,
        info: &SystemGetInfo,
        system_id: SystemId,
    ) -> ReplayResult<()> {
        if captured.failed() {
            return Ok(());
        }
        let instance: Instance = self.registry.handle(instance_id)?;
        let live = self
            .runtime
            .get_system(instance, info)
            .map_err(live_call("xrGetSystem"))?;
        self.registry.register_value(system_id, live);
        info!(system = system_id.0, live = live.0, "system resolved");
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn process_enumerate_view_configuration_views(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        instance_id: HandleId,
        system_id: SystemId,
        view_configuration_type: ViewConfigurationType,
        capacity: u32,
        captured_views: &[ViewConfigurationView],
    ) -> ReplayResult<()> {
        const API: &str = "xrEnumerateViewConfigurationViews";
        self.enumerate_view_configuration_views(
            captured,
            instance_id,
            system_id,
            view_configuration_type,
            capacity,
            captured_views,
        )
        .map_err(|e| e.at(call, API))
    }

    fn enumerate_view_configuration_views(
        &mut self,
        captured: XrResult,
        instance_id: HandleId,
        system_id: SystemId,
        view_configuration_type: ViewConfigurationType,
        capacity: u32,
        captured_views: &[ViewConfigurationView],
    ) -> ReplayResult<()> {
        // The count query carries nothing to compare against.
        if captured.failed() || capacity == 0 {
            return Ok(());
        }
        let instance: Instance = self.registry.handle(instance_id)?;
        let system = self.registry.lookup_value(system_id)?.replay_value;
        let runtime = &self.runtime;
        let views = enumerate_two_call(|views: &mut [ViewConfigurationView]| {
            runtime.enumerate_view_configuration_views(
                instance,
                system,
                view_configuration_type,
                views,
            )
        })
        .map_err(live_call("xrEnumerateViewConfigurationViews"))?;

        if views.len() != captured_views.len() {
            warn!(
                captured = captured_views.len(),
                replay = views.len(),
                "view configuration view count differs from capture"
            );
        }
        Ok(())
    }

    pub fn process_get_vulkan_graphics_requirements(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        instance_id: HandleId,
        system_id: SystemId,
        requirements: &GraphicsRequirementsVulkan,
    ) -> ReplayResult<()> {
        const API: &str = "xrGetVulkanGraphicsRequirementsKHR";
        self.get_vulkan_graphics_requirements(captured, instance_id, system_id, requirements)
            .map_err(|e| e.at(call, API))
    }

    fn get_vulkan_graphics_requirements(
        &mut self,
        captured: XrResult,
        instance_id: HandleId,
        system_id: SystemId,
        requirements: &GraphicsRequirementsVulkan,
    ) -> ReplayResult<()> {
        let instance: Instance = self.registry.handle(instance_id)?;
        let system = self.registry.lookup_value(system_id)?.replay_value;
        // Runtimes require this query before session creation; the values
        // are not compared with the capture.
        match self.runtime.get_vulkan_graphics_requirements(instance, system) {
            Ok(live) => {
                debug!(
                    captured_min = requirements.min_api_version_supported,
                    live_min = live.min_api_version_supported,
                    "Vulkan graphics requirements queried"
                );
                Ok(())
            }
            Err(result) => check_live("xrGetVulkanGraphicsRequirementsKHR", captured, result),
        }
    }

    pub fn process_get_vulkan_graphics_device(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        instance_id: HandleId,
        system_id: SystemId,
        vk_instance_id: HandleId,
        physical_device_id: HandleId,
    ) -> ReplayResult<()> {
        const API: &str = "xrGetVulkanGraphicsDeviceKHR";
        self.get_vulkan_graphics_device(
            captured,
            instance_id,
            system_id,
            vk_instance_id,
            physical_device_id,
        )
        .map_err(|e| e.at(call, API))
    }

    fn get_vulkan_graphics_device(
        &mut self,
        captured: XrResult,
        instance_id: HandleId,
        system_id: SystemId,
        vk_instance_id: HandleId,
        physical_device_id: HandleId,
    ) -> ReplayResult<()> {
        if captured.failed() {
            return Ok(());
        }
        let instance: Instance = self.registry.handle(instance_id)?;
        let system = self.registry.lookup_value(system_id)?.replay_value;
        let vk_instance =
            self.backend
                .map_instance(vk_instance_id)
                .ok_or(ReplayError::BackendLookup {
                    kind: "VkInstance",
                    id: vk_instance_id,
                })?;

        let physical_device = self
            .runtime
            .get_vulkan_graphics_device(instance, system, vk_instance)
            .map_err(live_call("xrGetVulkanGraphicsDeviceKHR"))?;
        self.registry
            .register_physical_device(physical_device_id, physical_device);
        info!(
            physical_device = physical_device_id,
            "Vulkan graphics device resolved"
        );
        Ok(())
    }

    // ── Session ─────────────────────────────────────────────

    pub fn process_create_session(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        instance_id: HandleId,
        info: &SessionCreateInfo,
        session_id: HandleId,
    ) -> ReplayResult<()> {
        const API: &str = "xrCreateSession";
        self.create_session(captured, instance_id, info, session_id)
            .map_err(|e| e.at(call, API))
    }

    fn create_session(
        &mut self,
        captured: XrResult,
        instance_id: HandleId,
        info: &SessionCreateInfo,
        session_id: HandleId,
    ) -> ReplayResult<()> {
        if captured.failed() {
            return Ok(());
        }
        let instance: Instance = self.registry.handle(instance_id)?;
        let mut info = info.clone();
        StructHandleMapper::new(&self.registry, &self.backend).map_session_create_info(&mut info)?;

        let session = self
            .runtime
            .create_session(instance, &info)
            .map_err(live_call("xrCreateSession"))?;
        self.registry
            .register_handle(instance_id, session_id, session)?;

        let binding = GraphicsBinding::from_session_info(&info, &self.backend)?;
        if !binding.is_valid() {
            warn!(session = session_id, "session created without a supported graphics binding");
        }
        info!(session = session_id, binding = ?binding.kind(), "session created");
        self.sessions.insert(session_id, SessionState::new(binding));
        Ok(())
    }

    pub fn process_begin_session(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        session_id: HandleId,
        info: &SessionBeginInfo,
    ) -> ReplayResult<()> {
        const API: &str = "xrBeginSession";
        let session: Session = self
            .registry
            .handle(session_id)
            .map_err(|e| ReplayError::from(e).at(call, API))?;
        let live = self.runtime.begin_session(session, info);
        check_live(API, captured, live).map_err(|e| e.at(call, API))
    }

    pub fn process_poll_event(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        instance_id: HandleId,
        event: &EventDataBuffer,
    ) -> ReplayResult<()> {
        const API: &str = "xrPollEvent";
        self.poll_event(captured, instance_id, event)
            .map_err(|e| e.at(call, API))
    }

    /// Poll until the live runtime produces an event of the captured type.
    fn poll_event(
        &mut self,
        captured: XrResult,
        instance_id: HandleId,
        event: &EventDataBuffer,
    ) -> ReplayResult<()> {
        // Only a delivered event has anything to wait for.
        if captured != XrResult::SUCCESS {
            return Ok(());
        }
        let instance: Instance = self.registry.handle(instance_id)?;
        let limit = self.settings.event_retry_limit;
        let backoff = StdDuration::from_nanos(self.settings.event_retry_backoff_ns);

        for attempt in 1..=limit {
            let mut live = EventDataBuffer::default();
            let result = self.runtime.poll_event(instance, &mut live);
            if result.failed() {
                return Err(ReplayError::LiveCall {
                    api: "xrPollEvent",
                    result,
                });
            }
            if result == XrResult::SUCCESS {
                if live.ty == event.ty {
                    debug!(event = %event.ty, attempt, "event matched");
                    return Ok(());
                }
                warn!(expected = %event.ty, received = %live.ty, "skipping event");
            } else if attempt < limit {
                std::thread::sleep(backoff);
            }
        }

        Err(ReplayError::EventNotFound {
            expected: event.ty,
            attempts: limit,
        })
    }

    // ── Frames ──────────────────────────────────────────────

    pub fn process_wait_frame(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        session_id: HandleId,
        info: &FrameWaitInfo,
        frame_state: &FrameState,
    ) -> ReplayResult<()> {
        const API: &str = "xrWaitFrame";
        self.wait_frame(captured, session_id, info, frame_state)
            .map_err(|e| e.at(call, API))
    }

    fn wait_frame(
        &mut self,
        captured: XrResult,
        session_id: HandleId,
        info: &FrameWaitInfo,
        frame_state: &FrameState,
    ) -> ReplayResult<()> {
        let session: Session = self.registry.handle(session_id)?;
        match self.runtime.wait_frame(session, info) {
            Ok(live) => {
                debug!(
                    session = session_id,
                    captured = frame_state.predicted_display_time.0,
                    live = live.predicted_display_time.0,
                    "frame waited"
                );
                self.session_state_mut(session_id)?
                    .set_display_time(live.predicted_display_time);
                Ok(())
            }
            Err(result) => check_live("xrWaitFrame", captured, result),
        }
    }

    pub fn process_begin_frame(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        session_id: HandleId,
        info: &FrameBeginInfo,
    ) -> ReplayResult<()> {
        const API: &str = "xrBeginFrame";
        let session: Session = self
            .registry
            .handle(session_id)
            .map_err(|e| ReplayError::from(e).at(call, API))?;
        let live = self.runtime.begin_frame(session, info);
        check_live(API, captured, live).map_err(|e| e.at(call, API))
    }

    pub fn process_end_frame(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        session_id: HandleId,
        info: &FrameEndInfo,
    ) -> ReplayResult<()> {
        const API: &str = "xrEndFrame";
        self.end_frame(captured, session_id, info)
            .map_err(|e| e.at(call, API))
    }

    fn end_frame(
        &mut self,
        captured: XrResult,
        session_id: HandleId,
        info: &FrameEndInfo,
    ) -> ReplayResult<()> {
        let session: Session = self.registry.handle(session_id)?;
        let mut info = info.clone();
        StructHandleMapper::new(&self.registry, &self.backend).map_frame_end_info(&mut info)?;

        // The captured display time is meaningless to the live runtime.
        info.display_time = self
            .session_state_mut(session_id)?
            .take_display_time()
            .ok_or(ReplayError::MissingDisplayTime(session_id))?;

        let live = self.runtime.end_frame(session, &info);
        check_live("xrEndFrame", captured, live)
    }

    // ── Spaces ──────────────────────────────────────────────

    pub fn process_enumerate_reference_spaces(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        session_id: HandleId,
        capacity: u32,
        captured_spaces: &[ReferenceSpaceType],
    ) -> ReplayResult<()> {
        const API: &str = "xrEnumerateReferenceSpaces";
        self.enumerate_reference_spaces(captured, session_id, capacity, captured_spaces)
            .map_err(|e| e.at(call, API))
    }

    fn enumerate_reference_spaces(
        &mut self,
        captured: XrResult,
        session_id: HandleId,
        capacity: u32,
        captured_spaces: &[ReferenceSpaceType],
    ) -> ReplayResult<()> {
        if captured.failed() || capacity == 0 || captured_spaces.is_empty() {
            return Ok(());
        }
        let session: Session = self.registry.handle(session_id)?;
        let runtime = &self.runtime;
        let spaces = enumerate_two_call(|spaces: &mut [ReferenceSpaceType]| {
            runtime.enumerate_reference_spaces(session, spaces)
        })
        .map_err(live_call("xrEnumerateReferenceSpaces"))?;

        debug!(session = session_id, count = spaces.len(), "reference spaces enumerated");
        self.session_state_mut(session_id)?
            .set_reference_spaces(spaces);
        Ok(())
    }

    pub fn process_create_reference_space(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        session_id: HandleId,
        info: &ReferenceSpaceCreateInfo,
        space_id: HandleId,
    ) -> ReplayResult<()> {
        const API: &str = "xrCreateReferenceSpace";
        self.create_reference_space(captured, session_id, info, space_id)
            .map_err(|e| e.at(call, API))
    }

    fn create_reference_space(
        &mut self,
        captured: XrResult,
        session_id: HandleId,
        info: &ReferenceSpaceCreateInfo,
        space_id: HandleId,
    ) -> ReplayResult<()> {
        if captured.failed() {
            return Ok(());
        }
        let session: Session = self.registry.handle(session_id)?;
        let mut info = info.clone();
        StructHandleMapper::new(&self.registry, &self.backend)
            .map_reference_space_create_info(&mut info)?;

        if !self
            .session_state_mut(session_id)?
            .supports_reference_space(info.reference_space_type)
        {
            return Err(ReplayError::UnsupportedReferenceSpace(
                info.reference_space_type,
            ));
        }

        let space: Space = self
            .runtime
            .create_reference_space(session, &info)
            .map_err(live_call("xrCreateReferenceSpace"))?;
        self.registry.register_handle(session_id, space_id, space)?;
        info!(space = space_id, kind = info.reference_space_type.0, "reference space created");
        Ok(())
    }

    // ── Swapchains ──────────────────────────────────────────

    pub fn process_create_swapchain(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        session_id: HandleId,
        info: &SwapchainCreateInfo,
        swapchain_id: HandleId,
    ) -> ReplayResult<()> {
        const API: &str = "xrCreateSwapchain";
        self.create_swapchain(captured, session_id, info, swapchain_id)
            .map_err(|e| e.at(call, API))
    }

    fn create_swapchain(
        &mut self,
        captured: XrResult,
        session_id: HandleId,
        info: &SwapchainCreateInfo,
        swapchain_id: HandleId,
    ) -> ReplayResult<()> {
        if captured.failed() {
            return Ok(());
        }
        let session: Session = self.registry.handle(session_id)?;
        let mut info = info.clone();
        StructHandleMapper::new(&self.registry, &self.backend).map_next_chain(&mut info.next)?;

        let state = self.session_state_mut(session_id)?;
        let data = SwapchainData::new(swapchain_id, &info, state.binding())?;

        let live_info = replay_create_info(&info);
        let swapchain: Swapchain = self
            .runtime
            .create_swapchain(session, &live_info)
            .map_err(live_call("xrCreateSwapchain"))?;
        self.registry
            .register_handle(session_id, swapchain_id, swapchain)?;
        info!(
            swapchain = swapchain_id,
            width = info.width,
            height = info.height,
            format = info.format,
            "swapchain created"
        );
        self.swapchains.insert(swapchain_id, data);
        Ok(())
    }

    pub fn process_enumerate_swapchain_images(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        swapchain_id: HandleId,
        capacity: u32,
        images: &[SwapchainImage],
    ) -> ReplayResult<()> {
        const API: &str = "xrEnumerateSwapchainImages";
        self.enumerate_swapchain_images(captured, swapchain_id, capacity, images)
            .map_err(|e| e.at(call, API))
    }

    fn enumerate_swapchain_images(
        &mut self,
        captured: XrResult,
        swapchain_id: HandleId,
        capacity: u32,
        images: &[SwapchainImage],
    ) -> ReplayResult<()> {
        if captured.failed() || capacity == 0 {
            return Ok(());
        }
        let swapchain: Swapchain = self.registry.handle(swapchain_id)?;
        let data = self
            .swapchains
            .get_mut(&swapchain_id)
            .ok_or(ReplayError::Core(CoreError::HandleNotFound {
                kind: ObjectKind::XrSwapchain,
                id: swapchain_id,
            }))?;
        if data.is_enumerated() {
            debug!(swapchain = swapchain_id, "swapchain images already enumerated");
            return Ok(());
        }

        let replay_images = data.enumerate_replay_swapchain(&self.runtime, swapchain)?;
        if replay_images.len() != images.len() {
            info!(
                swapchain = swapchain_id,
                captured = images.len(),
                replay = replay_images.len(),
                "replay swapchain image count differs from capture"
            );
        }
        data.init_virtual_swapchain(images, replay_images, &self.backend)
    }

    pub fn process_acquire_swapchain_image(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        swapchain_id: HandleId,
        info: &SwapchainImageAcquireInfo,
        capture_index: u32,
    ) -> ReplayResult<()> {
        const API: &str = "xrAcquireSwapchainImage";
        self.acquire_swapchain_image(captured, swapchain_id, info, capture_index)
            .map_err(|e| e.at(call, API))
    }

    fn acquire_swapchain_image(
        &mut self,
        captured: XrResult,
        swapchain_id: HandleId,
        info: &SwapchainImageAcquireInfo,
        capture_index: u32,
    ) -> ReplayResult<()> {
        if captured.failed() {
            return Ok(());
        }
        let swapchain: Swapchain = self.registry.handle(swapchain_id)?;
        let replay_index = self
            .runtime
            .acquire_swapchain_image(swapchain, info)
            .map_err(live_call("xrAcquireSwapchainImage"))?;
        let fence_timeout = self.settings.fence_timeout_ns;
        self.swapchain_data_mut(swapchain_id)?
            .acquire(capture_index, replay_index, fence_timeout)
    }

    pub fn process_wait_swapchain_image(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        swapchain_id: HandleId,
        info: &SwapchainImageWaitInfo,
    ) -> ReplayResult<()> {
        const API: &str = "xrWaitSwapchainImage";
        self.wait_swapchain_image(captured, swapchain_id, info)
            .map_err(|e| e.at(call, API))
    }

    /// The live runtime may need longer than the capture did; keep waiting
    /// while it reports a timeout.
    fn wait_swapchain_image(
        &mut self,
        captured: XrResult,
        swapchain_id: HandleId,
        info: &SwapchainImageWaitInfo,
    ) -> ReplayResult<()> {
        if captured != XrResult::SUCCESS {
            return Ok(());
        }
        let swapchain: Swapchain = self.registry.handle(swapchain_id)?;
        let limit = self.settings.swapchain_wait_retry_limit;

        let mut attempts: u32 = 0;
        loop {
            let result = self.runtime.wait_swapchain_image(swapchain, info);
            attempts += 1;
            if result != XrResult::TIMEOUT_EXPIRED {
                check_live("xrWaitSwapchainImage", captured, result)?;
                break;
            }
            if limit.is_some_and(|limit| attempts >= limit) {
                return Err(ReplayError::SwapchainWaitExhausted {
                    swapchain: swapchain_id,
                    attempts,
                });
            }
        }

        if attempts > 1 {
            debug!(swapchain = swapchain_id, attempts, "swapchain image wait retried");
        }
        self.swapchain_data_mut(swapchain_id)?
            .waited_without_timeout();
        Ok(())
    }

    pub fn process_release_swapchain_image(
        &mut self,
        call: CallInfo,
        captured: XrResult,
        swapchain_id: HandleId,
        info: &SwapchainImageReleaseInfo,
    ) -> ReplayResult<()> {
        const API: &str = "xrReleaseSwapchainImage";
        self.release_swapchain_image(captured, swapchain_id, info)
            .map_err(|e| e.at(call, API))
    }

    fn release_swapchain_image(
        &mut self,
        captured: XrResult,
        swapchain_id: HandleId,
        info: &SwapchainImageReleaseInfo,
    ) -> ReplayResult<()> {
        if captured.failed() {
            return Ok(());
        }
        let swapchain: Swapchain = self.registry.handle(swapchain_id)?;
        let fence_timeout = self.settings.fence_timeout_ns;
        // The copy into the live image must be queued before the runtime
        // takes the image back.
        self.swapchain_data_mut(swapchain_id)?
            .release(fence_timeout)?;
        let live = self.runtime.release_swapchain_image(swapchain, info);
        check_live("xrReleaseSwapchainImage", captured, live)
    }

    // ── Teardown ────────────────────────────────────────────

    /// Release every proxy image and forget all mappings.
    pub fn teardown(&mut self) {
        let count = self.swapchains.len();
        for (_, data) in self.swapchains.drain() {
            data.destroy();
        }
        self.sessions.clear();
        self.registry.clear();
        info!(swapchains = count, "replay state torn down");
    }
}
