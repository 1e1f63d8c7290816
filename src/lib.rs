pub mod math;
pub mod core;
pub mod bodies;
pub mod collision;

/// Re-export common types for easier usage
pub use crate::core::{BodyHandle, Environment, EnvironmentConfig};
pub use crate::bodies::RigidBody;
pub use crate::collision::{Contact, ContactPoint};
pub use crate::math::{Matrix3, Vector3};

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("No body registered under handle {0}")]
        BodyNotFound(u32),
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
