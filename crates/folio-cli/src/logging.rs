// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// `RUST_LOG` wins; otherwise the configured level, then `info`.
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Logs go to `log_path` so they never
/// scribble over the terminal UI; when the file cannot be opened they go to
/// stderr instead.
pub fn init(log_path: &Path, default_level: &str) {
    let opened = log_path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
        });

    match opened {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let installed = tracing_subscriber::fmt()
                .with_env_filter(env_filter(default_level))
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .try_init();
            if installed.is_ok() {
                let _ = LOG_GUARD.set(guard);
                tracing::info!(path = %log_path.display(), "logging initialized");
            }
        }
        Err(error) => {
            let installed = tracing_subscriber::fmt()
                .with_env_filter(env_filter(default_level))
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .try_init();
            if installed.is_ok() {
                tracing::warn!(
                    path = %log_path.display(),
                    error = %error,
                    "failed to open log file; using stderr"
                );
            }
        }
    }
}
