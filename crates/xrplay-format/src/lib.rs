pub mod handle;
pub mod xr;
pub mod structs;
pub mod call;

pub use call::CallInfo;
pub use handle::{HandleField, HandleId, ObjectKind, NULL_HANDLE_ID};
pub use structs::{NextChain, NextStruct};
pub use xr::{StructureType, XrResult};
