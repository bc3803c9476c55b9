//! Logging initialization using `tracing` and `tracing-subscriber`.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// Initialize the global tracing subscriber. Safe to call multiple times;
/// subsequent calls no-op.
///
/// Logs go to stderr; stdout is reserved for command output.
pub fn init_logging(format: LogFormat) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Human => {
            let _ = builder.finish().try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().finish().try_init();
        }
    };
}
