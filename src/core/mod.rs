mod config;
mod environment;
mod storage;

pub use self::config::EnvironmentConfig;
pub use self::environment::Environment;
pub use self::storage::BodyStorage;

/// A unique identifier for a body registered in an environment.
///
/// Handles are never reused: unregistering a body invalidates its handle
/// for good, and lookups with a stale handle report an error instead of
/// resolving to some other body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);
