#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Configuration parameters for an environment
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct EnvironmentConfig {
    /// Initial capacity of the body store
    pub body_capacity: usize,

    /// Initial capacity of the per-sub-step contact list
    pub contact_capacity: usize,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            body_capacity: 10,
            contact_capacity: 20,
        }
    }
}
