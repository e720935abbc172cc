//! Application identity resolution.
//!
//! The identity (name and major version) comes from a JSON package
//! descriptor when one exists on disk, or from explicit options otherwise.
//! Scoped names (`@owner/name`) can optionally be stripped to their bare
//! segment.

use crate::error::{ConfigError, ConfigResult};
use crate::holder::InitOptions;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Descriptor file expected in the working directory when no explicit path
/// is given.
pub const DEFAULT_DESCRIPTOR: &str = "package.json";

/// Fields consumed from the package descriptor. Everything else is ignored.
#[derive(Debug, Deserialize)]
struct PackageDescriptor {
    name: String,
    version: String,
}

/// Resolved application identity. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub app_name: String,
    /// First character of the version string ("1.2.3" -> "1").
    ///
    /// This is a character slice, not semantic-version parsing; multi-digit
    /// major versions are not supported.
    pub major_version: String,
}

impl AppIdentity {
    /// Resolve the identity from the package descriptor or the options.
    ///
    /// When the descriptor is absent, `app_name` and `app_version` must be
    /// present in the options or resolution fails with
    /// [`ConfigError::MissingDescriptorAndOptions`].
    pub fn resolve(options: &InitOptions) -> ConfigResult<Self> {
        let descriptor_path = options
            .package_descriptor_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTOR));

        if descriptor_path.exists() {
            info!(path = %descriptor_path.display(), "reading identity from package descriptor");
            let raw = std::fs::read_to_string(&descriptor_path)
                .map_err(|e| ConfigError::io(&descriptor_path, e))?;
            let descriptor: PackageDescriptor =
                serde_json::from_str(&raw).map_err(|e| ConfigError::parse(&descriptor_path, e))?;
            Ok(Self::from_parts(
                &descriptor.name,
                &descriptor.version,
                options.strip_scope,
            ))
        } else {
            info!("no package descriptor found, resolving identity from options");
            let name = options.app_name.as_deref().ok_or_else(|| {
                ConfigError::MissingDescriptorAndOptions {
                    descriptor_path: descriptor_path.clone(),
                    missing: "application name",
                }
            })?;
            let version = options.app_version.as_deref().ok_or_else(|| {
                ConfigError::MissingDescriptorAndOptions {
                    descriptor_path: descriptor_path.clone(),
                    missing: "application version",
                }
            })?;
            Ok(Self::from_parts(name, version, options.strip_scope))
        }
    }

    fn from_parts(name: &str, version: &str, strip: bool) -> Self {
        let app_name = if strip && is_scoped(name) {
            let stripped = without_scope(name);
            debug!(name = %name, stripped = %stripped, "stripped scope from application name");
            stripped
        } else {
            name.to_string()
        };
        let major_version = version.chars().next().map(String::from).unwrap_or_default();
        info!(app_name = %app_name, major_version = %major_version, "resolved application identity");
        Self {
            app_name,
            major_version,
        }
    }
}

/// A name is scoped when it starts with `@` and carries a `/` separator.
fn is_scoped(name: &str) -> bool {
    name.starts_with('@') && name.contains('/')
}

/// Keep only the segment after the scope separator.
fn without_scope(name: &str) -> String {
    name.split('/')
        .nth(1)
        .map(str::to_string)
        .unwrap_or_else(|| name.to_string())
}
