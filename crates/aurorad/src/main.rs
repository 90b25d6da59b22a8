// # aurorad - Aurora Reconciler Daemon
//
// The daemon is a THIN integration layer over aurora-core:
// - DO NOT add reconciliation, drift or retry logic here
// - All lifecycle logic lives in aurora-core
// - Configuration is via environment variables ONLY
//
// The aurorad daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Registering providers and object stores
// 4. Applying the declared objects from the manifest file
// 5. Running the Controller until SIGTERM/SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Provider
// - `AURORA_PROVIDER_TYPE`: Provider type (simulated)
// - `AURORA_SIM_READY_AFTER_POLLS`: Describe calls before a simulated resource is available
// - `AURORA_SIM_DELETE_AFTER_POLLS`: Describe calls before a simulated deletion finishes
// - `AURORA_DRY_RUN`: Log provider writes instead of performing them (true/false)
//
// ### Object Store
// - `AURORA_STORE_TYPE`: Type of object store (file, memory)
// - `AURORA_STORE_PATH`: Path to the store file (for file store)
//
// ### Declared Objects
// - `AURORA_MANIFESTS`: JSON file of objects applied at startup (optional)
//
// ### Engine
// - `AURORA_STABILIZATION_SECS`: Readiness window before promotion
// - `AURORA_RESYNC_SECS`: Redelivery interval for settled objects
//
// ## Example
//
// ```bash
// export AURORA_PROVIDER_TYPE=simulated
// export AURORA_STORE_TYPE=file
// export AURORA_STORE_PATH=/var/lib/aurora/objects.json
// export AURORA_MANIFESTS=/etc/aurora/manifests.json
//
// aurorad
// ```
//
// ## Manifest File
//
// ```json
// [
//   { "name": "db1", "manifest": { "kind": "cluster", "spec": { "id": "db1", ... } } },
//   { "name": "drop-old", "manifest": { "kind": "deletion", "spec": { "kind": "cluster", "identifier": "old" } } }
// ]
// ```

use anyhow::{Context, Result};
use aurora_core::traits::{Clock, ObjectStore, SystemClock};
use aurora_core::types::Manifest;
use aurora_core::{
    Controller, ControllerEvent, EngineConfig, ProviderConfig, ProviderRegistry, RdsAdapters,
    ReconcilerConfig, StoreConfig,
};
use serde::Deserialize;
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// How long the Controller gets to finish its current pass and flush
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum AuroraExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<AuroraExitCode> for ExitCode {
    fn from(code: AuroraExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    provider_type: String,
    sim_ready_after_polls: u32,
    sim_delete_after_polls: u32,
    dry_run: bool,
    store_type: String,
    store_path: Option<String>,
    manifests: Option<String>,
    stabilization_secs: u64,
    resync_secs: u64,
    log_level: String,
}

/// One entry of the manifest file
#[derive(Debug, Deserialize)]
struct DeclaredObject {
    name: String,
    manifest: Manifest,
}

/// Parse an optional numeric variable, falling back to `default` when unset
fn env_number<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer. Got: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

fn env_flag(name: &str) -> Result<bool> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            _ => anyhow::bail!("{} must be true or false. Got: '{}'", name, raw),
        },
        Err(_) => Ok(false),
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let engine = EngineConfig::default();
        Ok(Self {
            provider_type: env::var("AURORA_PROVIDER_TYPE")
                .unwrap_or_else(|_| "simulated".to_string()),
            sim_ready_after_polls: env_number("AURORA_SIM_READY_AFTER_POLLS", 3)?,
            sim_delete_after_polls: env_number("AURORA_SIM_DELETE_AFTER_POLLS", 2)?,
            dry_run: env_flag("AURORA_DRY_RUN")?,
            store_type: env::var("AURORA_STORE_TYPE").unwrap_or_else(|_| "memory".to_string()),
            store_path: env::var("AURORA_STORE_PATH").ok(),
            manifests: env::var("AURORA_MANIFESTS").ok().filter(|p| !p.is_empty()),
            stabilization_secs: env_number(
                "AURORA_STABILIZATION_SECS",
                engine.stabilization_secs,
            )?,
            resync_secs: env_number("AURORA_RESYNC_SECS", engine.resync_secs)?,
            log_level: env::var("AURORA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// This performs validation of:
    /// - Type enumerations (provider, store, log level)
    /// - Paths the daemon needs at startup
    /// - Numeric ranges
    fn validate(&self) -> Result<()> {
        if self.provider_type.is_empty() {
            anyhow::bail!(
                "AURORA_PROVIDER_TYPE cannot be empty. \
                Set it via: export AURORA_PROVIDER_TYPE=simulated"
            );
        }

        match self.store_type.as_str() {
            "file" | "memory" => {}
            _ => anyhow::bail!(
                "AURORA_STORE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                self.store_type
            ),
        }

        if self.store_type == "file" {
            match self.store_path.as_deref() {
                None | Some("") => anyhow::bail!(
                    "AURORA_STORE_PATH is required when AURORA_STORE_TYPE=file. \
                    Set it via: export AURORA_STORE_PATH=/var/lib/aurora/objects.json"
                ),
                Some(path) => {
                    if let Some(parent) = std::path::Path::new(path).parent()
                        && !parent.as_os_str().is_empty()
                        && !parent.exists()
                    {
                        anyhow::bail!(
                            "AURORA_STORE_PATH parent directory does not exist: {}. \
                            Create it first: sudo mkdir -p {}",
                            parent.display(),
                            parent.display()
                        );
                    }
                }
            }
        }

        if let Some(path) = &self.manifests
            && !std::path::Path::new(path).is_file()
        {
            anyhow::bail!("AURORA_MANIFESTS file does not exist: {}", path);
        }

        if self.sim_ready_after_polls > 1000 {
            anyhow::bail!(
                "AURORA_SIM_READY_AFTER_POLLS must be at most 1000. Got: {}",
                self.sim_ready_after_polls
            );
        }

        if self.sim_delete_after_polls > 1000 {
            anyhow::bail!(
                "AURORA_SIM_DELETE_AFTER_POLLS must be at most 1000. Got: {}",
                self.sim_delete_after_polls
            );
        }

        if self.stabilization_secs > 3600 {
            anyhow::bail!(
                "AURORA_STABILIZATION_SECS must be between 0 and 3600 seconds. Got: {}",
                self.stabilization_secs
            );
        }

        if !(1..=3600).contains(&self.resync_secs) {
            anyhow::bail!(
                "AURORA_RESYNC_SECS must be between 1 and 3600 seconds. Got: {}",
                self.resync_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "AURORA_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Library configuration equivalent to these settings
    fn reconciler_config(&self) -> ReconcilerConfig {
        let provider = match self.provider_type.as_str() {
            "simulated" => ProviderConfig::Simulated {
                ready_after_polls: self.sim_ready_after_polls,
                delete_after_polls: self.sim_delete_after_polls,
                dry_run: self.dry_run,
            },
            other => ProviderConfig::Custom {
                factory: other.to_string(),
                config: serde_json::json!({ "dry_run": self.dry_run }),
            },
        };

        let store = match (self.store_type.as_str(), &self.store_path) {
            ("file", Some(path)) => StoreConfig::File { path: path.clone() },
            _ => StoreConfig::Memory,
        };

        ReconcilerConfig {
            provider,
            store,
            engine: EngineConfig {
                stabilization_secs: self.stabilization_secs,
                resync_secs: self.resync_secs,
                ..EngineConfig::default()
            },
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AuroraExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return AuroraExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AuroraExitCode::ConfigError.into();
    }

    info!("Starting aurorad daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AuroraExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => AuroraExitCode::CleanShutdown,
            Err(e) if e.is::<StartupError>() => {
                error!("Startup error: {:#}", e);
                AuroraExitCode::ConfigError
            }
            Err(e) => {
                error!("Daemon error: {:#}", e);
                AuroraExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Marker for failures while wiring components, reported as a configuration error
#[derive(Debug)]
struct StartupError(String);

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StartupError {}

fn startup(e: impl std::fmt::Display) -> anyhow::Error {
    anyhow::Error::new(StartupError(e.to_string()))
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let reconciler = config.reconciler_config();
    reconciler.validate().map_err(startup)?;

    // Create registry with the built-in stores
    let registry = ProviderRegistry::with_builtin_stores();

    // Register built-in providers
    #[cfg(feature = "sim")]
    {
        info!("Registering simulated provider");
        aurora_provider_sim::register(&registry);
    }

    info!("Provider type: {}", reconciler.provider.type_name());
    info!("Object store type: {}", reconciler.store.type_name());
    if config.dry_run {
        warn!("DRY-RUN mode: provider writes are logged, not performed");
    }

    let api = registry
        .create_provider(&reconciler.provider)
        .map_err(startup)?;
    let store: Arc<dyn ObjectStore> = Arc::from(
        registry
            .create_store(&reconciler.store)
            .await
            .map_err(startup)?,
    );

    if let Some(path) = &config.manifests {
        let applied = apply_manifests(store.as_ref(), path)
            .await
            .map_err(|e| startup(format!("{:#}", e)))?;
        info!("Applied {} declared object(s) from {}", applied, path);
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (controller, events) =
        Controller::new(store, RdsAdapters::new(api), clock, &reconciler.engine)
            .map_err(startup)?;

    let event_logger = tokio::spawn(log_events(events));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mut controller_task =
        tokio::spawn(async move { controller.run_with_shutdown(shutdown_rx).await });

    info!("Daemon initialized successfully");

    // Either a signal arrives or the controller stops on its own
    let outcome = tokio::select! {
        signal = wait_for_shutdown() => {
            let signal = signal?;
            info!("Received shutdown signal: {}", signal);
            info!("Shutting down daemon");
            // The controller may already have exited; nothing to signal then
            let _ = shutdown_tx.send(());
            tokio::time::timeout(SHUTDOWN_GRACE, &mut controller_task)
                .await
                .map_err(|_| anyhow::anyhow!("Shutdown timeout after {:?}", SHUTDOWN_GRACE))?
        }
        finished = &mut controller_task => finished,
    };

    let result = outcome
        .context("Controller task panicked")?
        .context("Controller failed");

    // The event channel closes once the controller is dropped
    if let Err(e) = event_logger.await {
        warn!("Event logger ended abnormally: {}", e);
    }

    result
}

/// Apply every object of a manifest file to the store
async fn apply_manifests(store: &dyn ObjectStore, path: &str) -> Result<usize> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read manifest file {}", path))?;
    let objects: Vec<DeclaredObject> = serde_json::from_str(&raw)
        .with_context(|| format!("Manifest file {} is not valid", path))?;

    for object in &objects {
        debug!("Applying {} {}", object.manifest.kind(), object.name);
        store
            .apply(&object.name, object.manifest.clone())
            .await
            .with_context(|| format!("Failed to apply {}", object.name))?;
    }

    Ok(objects.len())
}

/// Log controller events until the channel closes
async fn log_events(mut events: mpsc::Receiver<ControllerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            ControllerEvent::Started { objects } => {
                info!("Controller started with {} object(s)", objects);
            }
            ControllerEvent::PassSucceeded {
                key,
                state,
                requeue_after,
            } => {
                debug!("{} is {} (next pass in {:?})", key, state, requeue_after);
            }
            ControllerEvent::PassFailed {
                key,
                error,
                requeue_after,
            } => {
                warn!("{} failed: {} (retry in {:?})", key, error, requeue_after);
            }
            ControllerEvent::StatusConflict { key } => {
                debug!("{} changed during the pass, retrying", key);
            }
            ControllerEvent::Deleted { key } => {
                info!("{} removed from the store", key);
            }
            ControllerEvent::Stopped { reason } => {
                info!("Controller stopped: {}", reason);
            }
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            provider_type: "simulated".to_string(),
            sim_ready_after_polls: 3,
            sim_delete_after_polls: 2,
            dry_run: false,
            store_type: "memory".to_string(),
            store_path: None,
            manifests: None,
            stabilization_secs: 120,
            resync_secs: 30,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn file_store_requires_a_path() {
        let cfg = Config {
            store_type: "file".to_string(),
            ..config()
        };
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("AURORA_STORE_PATH"));
    }

    #[test]
    fn zero_resync_is_rejected() {
        let cfg = Config {
            resync_secs: 0,
            ..config()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_store_type_is_rejected() {
        let cfg = Config {
            store_type: "etcd".to_string(),
            ..config()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn simulated_settings_reach_the_provider_config() {
        let cfg = Config {
            sim_ready_after_polls: 7,
            dry_run: true,
            stabilization_secs: 15,
            ..config()
        };
        let reconciler = cfg.reconciler_config();
        match reconciler.provider {
            ProviderConfig::Simulated {
                ready_after_polls,
                dry_run,
                ..
            } => {
                assert_eq!(ready_after_polls, 7);
                assert!(dry_run);
            }
            other => panic!("unexpected provider config {:?}", other),
        }
        assert_eq!(reconciler.engine.stabilization_secs, 15);
        assert_eq!(reconciler.engine.resync_secs, 30);
    }

    #[test]
    fn manifest_entries_parse() {
        let raw = r#"[
            {"name": "private", "manifest": {"kind": "subnet_group", "spec": {
                "name": "private", "description": "private subnets",
                "subnet_ids": ["subnet-a", "subnet-b"]}}},
            {"name": "drop-old", "manifest": {"kind": "deletion", "spec": {
                "kind": "cluster", "identifier": "old"}}}
        ]"#;
        let objects: Vec<DeclaredObject> = serde_json::from_str(raw).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1].name, "drop-old");
        assert!(matches!(objects[1].manifest, Manifest::Deletion(_)));
    }

    #[tokio::test]
    async fn manifests_are_applied_to_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifests.json");
        std::fs::write(
            &path,
            r#"[{"name": "private", "manifest": {"kind": "subnet_group", "spec": {
                "name": "private", "description": "d", "subnet_ids": ["a", "b"]}}}]"#,
        )
        .unwrap();

        let store = aurora_core::MemoryObjectStore::new();
        let applied = apply_manifests(&store, path.to_str().unwrap()).await.unwrap();
        assert_eq!(applied, 1);
        assert_eq!(store.len().await, 1);
    }
}
