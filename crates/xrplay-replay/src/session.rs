//! Per-session replay state.

use std::collections::HashSet;

use xrplay_format::xr::{ReferenceSpaceType, Time};

use crate::binding::GraphicsBinding;

/// Replay-side state of one XR session.
#[derive(Debug)]
pub struct SessionState {
    binding: GraphicsBinding,
    /// Reference spaces the live runtime reported, if it was ever asked.
    reference_spaces: Option<HashSet<ReferenceSpaceType>>,
    /// Predicted display time from the last `xrWaitFrame`, until the
    /// matching `xrEndFrame` takes it.
    display_time: Option<Time>,
}

impl SessionState {
    pub fn new(binding: GraphicsBinding) -> Self {
        Self {
            binding,
            reference_spaces: None,
            display_time: None,
        }
    }

    pub fn binding(&self) -> &GraphicsBinding {
        &self.binding
    }

    pub fn set_reference_spaces(&mut self, spaces: impl IntoIterator<Item = ReferenceSpaceType>) {
        self.reference_spaces = Some(spaces.into_iter().collect());
    }

    pub fn reference_spaces(&self) -> Option<&HashSet<ReferenceSpaceType>> {
        self.reference_spaces.as_ref()
    }

    /// Without an enumeration on record every kind is accepted.
    pub fn supports_reference_space(&self, ty: ReferenceSpaceType) -> bool {
        self.reference_spaces
            .as_ref()
            .map_or(true, |spaces| spaces.contains(&ty))
    }

    pub fn set_display_time(&mut self, time: Time) {
        self.display_time = Some(time);
    }

    pub fn display_time(&self) -> Option<Time> {
        self.display_time
    }

    pub fn take_display_time(&mut self) -> Option<Time> {
        self.display_time.take()
    }
}
