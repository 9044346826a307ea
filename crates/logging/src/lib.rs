#![warn(missing_docs)]

//! Shared logging setup and CLI argument definitions for the neru
//! workspace: one `EnvFilter` spec-building policy and one subscriber
//! installer, used identically by the daemon and its tools.

use std::{env, path::Path};

use clap::Args;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors installing the global tracing subscriber.
#[derive(Debug, Error)]
pub enum Error {
    /// A subscriber was already installed for this process.
    #[error("tracing subscriber already installed")]
    AlreadyInstalled,
}

/// Crate targets included in default logging directives.
const OUR_CRATES: &[&str] = &[
    "neru",
    "neru_engine",
    "neru_protocol",
    "neru_server",
    "config",
    "logging",
    "permissions",
    "pointer",
    "accessibility",
    "overlay",
    "mac_hotkey",
    "mac_keycode",
    "mac_winops",
    "mac_focus_watcher",
    "eventtag",
];

/// Logging controls shared by every CLI entry point.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only).
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only).
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags),
    /// e.g. `"neru_engine=trace,neru_server=debug"`.
    #[arg(long)]
    pub log_filter: Option<String>,
}

/// Build crate-scoped directives for the given level.
fn crate_specs(level: &str) -> Vec<String> {
    let lvl = level.to_ascii_lowercase();
    OUR_CRATES.iter().map(|t| format!("{t}={lvl}")).collect()
}

/// Build a filter directive string that sets the same `level` for all of
/// our crates.
pub fn level_spec_for(level: &str) -> String {
    crate_specs(level).join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    env::var("RUST_LOG").unwrap_or_else(|_| level_spec_for("info"))
}

impl LogArgs {
    /// Computes this invocation's filter spec per [`compute_spec`].
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
        )
    }
}

/// Creates an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

/// The `RUST_LOG` value to pass to a spawned child process (an `exec`
/// hotkey action, for instance): the caller's own environment value when
/// set, otherwise the crate-scoped `info` default.
pub fn log_config_for_child() -> String {
    compute_spec(false, false, None, None)
}

/// Installs the global tracing subscriber: a compact stderr layer always,
/// plus an optional rolling file layer when `file` is given.
///
/// `rotation` is one of `"daily"`, `"hourly"`, or `"never"` (default when
/// omitted or unrecognized). The returned [`WorkerGuard`] must be held for
/// the process lifetime — dropping it stops the file layer's background
/// flush thread.
pub fn init(spec: &str, file: Option<&Path>, rotation: Option<&str>) -> Result<Option<WorkerGuard>, Error> {
    let filter = env_filter_from_spec(spec);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let Some(path) = file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .map_err(|_| Error::AlreadyInstalled)?;
        return Ok(None);
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "neru.log".to_string());
    let rolling = match rotation {
        Some("hourly") => tracing_appender::rolling::hourly(dir, file_name),
        Some("never") => tracing_appender::rolling::never(dir, file_name),
        _ => tracing_appender::rolling::daily(dir, file_name),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(rolling);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| Error::AlreadyInstalled)?;
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins_over_everything() {
        assert_eq!(
            compute_spec(true, true, Some("warn"), Some("custom=trace")),
            "custom=trace"
        );
    }

    #[test]
    fn trace_flag_scopes_to_our_crates() {
        let spec = compute_spec(true, false, None, None);
        assert!(spec.contains("neru_engine=trace"));
        assert!(spec.contains("mac_hotkey=trace"));
    }

    #[test]
    fn log_args_spec_matches_free_function() {
        let args = LogArgs {
            trace: false,
            debug: true,
            log_level: None,
            log_filter: None,
        };
        assert_eq!(args.spec(), compute_spec(false, true, None, None));
    }
}
