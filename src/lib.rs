//! Layered application configuration resolution.
//!
//! Locates a configuration file by cascading over three path tiers
//! (environment-specific, version-scoped, global), merges it with
//! environment-variable and command-line overrides, and reloads it
//! periodically while the process runs.

pub mod error;
pub mod holder;
pub mod identity;
pub mod loader;
pub mod merge;
pub mod sources;

pub use error::{ConfigError, ConfigResult};
pub use holder::{ConfigHolder, InitOptions};
pub use identity::AppIdentity;
pub use merge::deep_merge;
pub use sources::OverrideSources;
