//! Tracing initialization with a reloadable log level.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> =
    OnceLock::new();
static RUST_LOG_OVERRIDE: AtomicBool = AtomicBool::new(false);

pub fn init_tracing() {
    init_tracing_with_level("info");
}

pub fn init_tracing_with_level(level: &str) {
    // RUST_LOG wins over the configured level, at init and across reloads.
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok());
    RUST_LOG_OVERRIDE.store(env_filter.is_some(), Ordering::Relaxed);
    let base_filter = env_filter.unwrap_or_else(|| EnvFilter::new(level));

    let (reload_layer, handle) = reload::Layer::new(base_filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer())
        .try_init();
}

/// Applies a new logging level at runtime once configuration is loaded.
///
/// A RUST_LOG override set at startup is kept; the configured level is only
/// applied when no override is present. Returns whether the level took
/// effect.
pub fn apply_logging_level(level: &str) -> bool {
    if RUST_LOG_OVERRIDE.load(Ordering::Relaxed) {
        return false;
    }
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|f| {
            *f = EnvFilter::new(level);
        });
        return true;
    }
    false
}
