use xrplay_format::{HandleId, ObjectKind};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{kind} handle not found: capture id {id:#x}")]
    HandleNotFound { kind: ObjectKind, id: HandleId },

    #[error("{kind} value not found: capture value {value:#x}")]
    ValueNotFound { kind: ObjectKind, value: u64 },

    #[error("{kind} handle already registered: capture id {id:#x}")]
    DuplicateHandle { kind: ObjectKind, id: HandleId },

    #[error("cannot register {kind} {id:#x}: parent {parent_kind} {parent_id:#x} is not registered")]
    ParentNotFound {
        kind: ObjectKind,
        id: HandleId,
        parent_kind: ObjectKind,
        parent_id: HandleId,
    },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
