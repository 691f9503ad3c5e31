//! Thin wrapper over the `log` facade, mirroring the shape of the
//! teacher's own `logging` crate: every other crate depends on `logging`
//! and writes `use logging::log; log::debug!(...)` rather than depending
//! on `log` directly, so the binary is the only place that chooses and
//! configures a concrete backend.

pub use log;

/// Initialises the global logger. `debug` raises the default level from
/// `info` to `debug` (driven by `[simulation].debug` in the config file).
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).is_test(false).try_init();
}
