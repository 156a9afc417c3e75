use crate::Environment;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main(), before any fallible operations. Safe to
/// call multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize tracing with environment-aware configuration.
///
/// - **Production** (`APP_ENV=production`): JSON format for log
///   aggregation, module targets hidden.
/// - **Development** (default): pretty-printed, human-readable.
///
/// When `log_file` is given, a plain-text layer additionally appends
/// every event to that file. The file log is diagnostic output only:
/// if the file cannot be opened the layer is skipped with a warning and
/// startup continues.
///
/// `RUST_LOG` overrides the default level filter. Safe to call multiple
/// times (later calls are no-ops), which keeps tests simple.
pub fn init_tracing(environment: &Environment, log_file: Option<&Path>) {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info,tower_http=info")
        } else {
            EnvFilter::new("debug")
        }
    });

    let file = log_file.and_then(open_append);

    let result = if is_production {
        let file_layer = file.map(|file| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file))
        });
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(file_layer)
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        let file_layer = file.map(|file| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file))
        });
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(false).pretty())
            .with(file_layer)
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => {
            info!("Tracing initialized. Environment: {:?}", environment);
        }
        Err(_) => {
            // Already initialized, which is fine (common in tests)
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }
}

/// Open the diagnostic log file in append mode, creating parent
/// directories as needed. Returns None (and warns on stderr, since the
/// subscriber may not be up yet) when the file is unusable.
fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Could not create log directory {}: {}", parent.display(), e);
                return None;
            }
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Could not open log file {}: {}", path.display(), e);
            warn!("File logging disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_development() {
        init_tracing(&Environment::Development, None);
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        init_tracing(&Environment::Development, None);
        init_tracing(&Environment::Production, None);
    }

    #[test]
    fn test_open_append_creates_parent_dirs() {
        let dir = std::env::temp_dir().join("core_config_tracing_test");
        let path = dir.join("nested").join("out.log");
        let file = open_append(&path);
        assert!(file.is_some());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_append_bad_path_is_swallowed() {
        // A directory cannot be opened as a file; must not panic
        let file = open_append(Path::new("/"));
        assert!(file.is_none());
    }
}
