//! Logging Infrastructure
//!
//! Console output (pretty in development, JSON in production) plus optional
//! daily rotating files:
//! - `app/app.YYYY-MM-DD`: everything except security events
//! - `security/security.YYYY-MM-DD`: events logged with target `security`

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const SECURITY_TARGET: &str = "security";

/// Create `app/` and `security/` under `log_dir`
pub fn prepare_log_dirs(log_dir: &Path) -> std::io::Result<(PathBuf, PathBuf)> {
    let app_dir = log_dir.join("app");
    let security_dir = log_dir.join("security");
    fs::create_dir_all(&app_dir)?;
    fs::create_dir_all(&security_dir)?;
    Ok((app_dir, security_dir))
}

/// Initialize the global subscriber
///
/// `RUST_LOG` overrides `level` when set.
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let file_layers = match log_dir {
        Some(dir) => {
            let (app_dir, security_dir) = prepare_log_dirs(Path::new(dir))?;

            let app_log = RollingFileAppender::new(Rotation::DAILY, app_dir, "app");
            let app_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != SECURITY_TARGET
                }));

            let security_log = RollingFileAppender::new(Rotation::DAILY, security_dir, "security");
            let security_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(security_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == SECURITY_TARGET
                }));

            Some(app_layer.and_then(security_layer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layers)
        .try_init()?;

    Ok(())
}

/// Security log helper, records authentication and permission failures
///
/// ```ignore
/// security_log!(WARN, "login_failed", email = %email, reason = "wrong_password");
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(target: "security", event = $event, $($arg)*)
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(target: "security", event = $event, $($arg)*)
    };
}
