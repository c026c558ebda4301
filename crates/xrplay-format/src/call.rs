use std::fmt;

/// Position of a decoded call in the trace.
/// Carried into every dispatcher method for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CallInfo {
    pub index: u64,
}

impl CallInfo {
    pub fn new(index: u64) -> Self {
        Self { index }
    }
}

impl fmt::Display for CallInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call #{}", self.index)
    }
}
