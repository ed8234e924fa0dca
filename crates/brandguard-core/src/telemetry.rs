//! Centralised tracing initialisation for BrandGuard binaries.
//!
//! Call [`init_tracing`] once at program start to install the global
//! subscriber. Later calls are ignored, since the global subscriber can only
//! be set once per process.
//!
//! Every line is written to stderr. The CLI prints run results, critique
//! reports and verifications as JSON on stdout, and that stream must stay
//! parseable even at `debug` verbosity.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter variable checked before `RUST_LOG`, so BrandGuard's verbosity can be
/// tuned without affecting an agent process that inherits the environment.
pub const LOG_ENV: &str = "BRANDGUARD_LOG";

/// Resolve the filter: `BRANDGUARD_LOG`, then `RUST_LOG`, then `level`.
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Initialise the global tracing subscriber.
///
/// * `json`: emit newline-delimited JSON log lines for log aggregation. Run
///   events from `obs` carry `event` and `run_id` fields either way.
/// * `level`: default verbosity when neither `BRANDGUARD_LOG` nor `RUST_LOG`
///   is set. The CLI passes `DEBUG` for `--verbose` and `INFO` otherwise.
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let filter = env_filter(level);
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
    }
}
