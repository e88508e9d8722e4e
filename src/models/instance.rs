use serde::{Deserialize, Serialize};

/// Control-plane status that marks an instance as broken
pub const FATAL_STATUS: &str = "ERROR";

/// The control plane's current view of one instance. Always fetched fresh,
/// never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceObservation {
    pub id: String,
    pub name: String,
    /// Free-form control-plane status (ACTIVE, SHUTOFF, BUILD, ERROR, ...)
    pub status: String,
}

impl InstanceObservation {
    pub fn is_fatal(&self) -> bool {
        self.status == FATAL_STATUS
    }
}
