//! Configuration holder: init, lookup, and the periodic reload lifecycle.
//!
//! A [`ConfigHolder`] is constructed once per process and shared by
//! reference. `init` resolves the application identity, locates the
//! configuration file, builds the merged store, and schedules the periodic
//! reload. Lookups are lock-free against whichever store snapshot is
//! current.

use crate::error::{ConfigError, ConfigResult};
use crate::identity::AppIdentity;
use crate::loader;
use crate::sources::OverrideSources;
use arc_swap::ArcSwapOption;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Default reload delay: five minutes.
pub const DEFAULT_RELOAD_DELAY_MS: i64 = 300_000;

/// Store key that overrides the reload delay (milliseconds). A value of
/// zero or less disables reloading.
pub const RELOAD_DELAY_KEY: &str = "confReloadDelay";

/// Options accepted by [`ConfigHolder::init`].
///
/// Everything is optional; `app_name` and `app_version` become required
/// when no package descriptor exists on disk.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Strip a leading `@scope/` prefix from the application name.
    pub strip_scope: bool,
    /// Package descriptor location; defaults to `./package.json`.
    pub package_descriptor_path: Option<PathBuf>,
    /// Application name, used when no package descriptor exists.
    pub app_name: Option<String>,
    /// Application version, used when no package descriptor exists.
    pub app_version: Option<String>,
    /// Deployment environment; falls back to the `APP_ENV` override.
    pub app_env: Option<String>,
    /// Configuration root directory; falls back to `APP_CONF_PATH`.
    pub app_config_path: Option<PathBuf>,
}

/// Identity and file path fixed by the first successful load.
#[derive(Debug, Clone)]
struct ResolvedState {
    identity: AppIdentity,
    path: PathBuf,
}

/// Holds the merged configuration store for a process.
///
/// Uses `ArcSwapOption` for the store so the periodic reload can publish a
/// fully built replacement in one step: readers see either the previous or
/// the next store, never a partial merge. An empty store means the holder
/// has not been initialized yet.
#[derive(Clone, Default)]
pub struct ConfigHolder {
    store: Arc<ArcSwapOption<Value>>,
    resolved: Arc<ArcSwapOption<ResolvedState>>,
    reload_task: Arc<ArcSwapOption<JoinHandle<()>>>,
}

impl ConfigHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve identity and configuration inputs, perform the initial load,
    /// then schedule the periodic reload and its interrupt-signal shutdown.
    ///
    /// All-or-nothing: any failure is returned to the caller and leaves the
    /// holder uninitialized. Sources are captured from the real process
    /// environment and argument list.
    pub async fn init(&self, options: InitOptions) -> ConfigResult<()> {
        self.init_with_sources(options, OverrideSources::capture())
            .await
    }

    /// As [`init`](Self::init), with explicit override sources.
    pub async fn init_with_sources(
        &self,
        options: InitOptions,
        sources: OverrideSources,
    ) -> ConfigResult<()> {
        info!("starting configuration init");
        let identity = AppIdentity::resolve(&options)?;

        let root = match options.app_config_path {
            Some(path) => path,
            None => sources
                .lookup_str("APP_CONF_PATH")
                .map(PathBuf::from)
                .ok_or(ConfigError::MissingConfigPath)?,
        };
        info!(root = %root.display(), "resolved configuration root");

        let app_env = match options.app_env {
            Some(env) => env,
            None => sources
                .lookup_str("APP_ENV")
                .ok_or(ConfigError::MissingEnv)?,
        };
        info!(env = %app_env, "resolved deployment environment");

        // Tier probing happens exactly once; reloads reuse the chosen path.
        let path = loader::probe_tiers(
            &root,
            &identity.app_name,
            &identity.major_version,
            &app_env,
        )?;
        let store = loader::build_store(&path, &sources)?;
        let delay = reload_delay(&store);

        self.store.store(Some(Arc::new(store)));
        self.resolved
            .store(Some(Arc::new(ResolvedState { identity, path })));

        if delay > 0 {
            info!(delay_ms = delay, "scheduling periodic configuration reload");
            let holder = self.clone();
            let handle = tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_millis(delay as u64));
                interval.tick().await; // the first tick fires immediately
                loop {
                    interval.tick().await;
                    holder.reload(&sources);
                }
            });
            self.reload_task.store(Some(Arc::new(handle)));
        }

        // Stop reloading on interrupt. Cancellation is idempotent and a
        // no-op when no reload task was scheduled.
        let holder = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                holder.cancel_reload();
            }
        });

        info!("configuration init complete");
        Ok(())
    }

    /// Look up a key in the merged store.
    ///
    /// Never blocks and never fails: unknown keys return `None`, and a
    /// lookup before a successful [`init`](Self::init) logs an error and
    /// returns `None` as well.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.store.load().as_ref() {
            Some(store) => store.get(key).cloned(),
            None => {
                error!(key = %key, "configuration holder not initialized, returning no value");
                None
            }
        }
    }

    /// String lookup, `None` for absent or non-string values.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    /// Integer lookup, `None` for absent or non-integer values.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    /// Boolean lookup, `None` for absent or non-boolean values.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Whether the first load has completed.
    pub fn is_initialized(&self) -> bool {
        self.store.load().is_some()
    }

    /// Identity fixed by init, once initialized.
    pub fn identity(&self) -> Option<AppIdentity> {
        self.resolved.load().as_ref().map(|r| r.identity.clone())
    }

    /// Configuration file path fixed by init, once initialized.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.resolved.load().as_ref().map(|r| r.path.clone())
    }

    /// Re-read the resolved path and swap in the rebuilt store.
    ///
    /// A failed reload keeps the last-known-good store in place and logs a
    /// warning instead of surfacing the error.
    fn reload(&self, sources: &OverrideSources) {
        let Some(resolved) = self.resolved.load_full() else {
            return;
        };
        info!(path = %resolved.path.display(), "reloading configuration");
        match loader::build_store(&resolved.path, sources) {
            Ok(store) => {
                self.store.store(Some(Arc::new(store)));
                info!("configuration reloaded");
            }
            Err(e) => {
                warn!(error = %e, "configuration reload failed, keeping current store");
            }
        }
    }

    /// Cancel the periodic reload. Safe to call repeatedly or when no
    /// reload was ever scheduled.
    fn cancel_reload(&self) {
        if let Some(handle) = self.reload_task.swap(None) {
            handle.abort();
            info!("configuration reload stopped");
        }
    }
}

/// Reload delay from the merged store: a numeric `confReloadDelay` (number
/// or numeric string) wins, everything else falls back to the default.
fn reload_delay(store: &Value) -> i64 {
    match store.get(RELOAD_DELAY_KEY) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(DEFAULT_RELOAD_DELAY_MS),
        Some(Value::String(s)) => s.parse().unwrap_or(DEFAULT_RELOAD_DELAY_MS),
        _ => DEFAULT_RELOAD_DELAY_MS,
    }
}
