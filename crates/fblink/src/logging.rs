use std::io;

use clap::ValueEnum;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Crates whose events follow the requested level. Everything outside the
/// stack stays at WARN so dependency chatter never reaches stderr.
const STACK_TARGETS: [&str; 5] = [
    "fblink",
    "fblink_codec",
    "fblink_session",
    "fblink_transport",
    "fblink_types",
];

pub fn stack_filter(level: LevelFilter) -> Targets {
    STACK_TARGETS
        .iter()
        .fold(Targets::new().with_default(LevelFilter::WARN), |t, name| {
            t.with_target(*name, level)
        })
}

/// Logs go to stderr so payload output on stdout stays machine-readable.
pub fn init_logging(format: LogFormat, level: LevelFilter) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false);

    let registry = tracing_subscriber::registry().with(stack_filter(level));
    let _ = match format {
        LogFormat::Text => registry.with(layer).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn stack_targets_follow_the_requested_level() {
        let filter = stack_filter(LevelFilter::DEBUG);
        assert!(filter.would_enable("fblink_codec", &Level::DEBUG));
        assert!(filter.would_enable("fblink", &Level::DEBUG));
        assert!(!filter.would_enable("mio", &Level::DEBUG));
        assert!(filter.would_enable("mio", &Level::WARN));
    }

    #[test]
    fn quiet_levels_silence_the_stack_too() {
        let filter = stack_filter(LevelFilter::ERROR);
        assert!(!filter.would_enable("fblink_transport", &Level::INFO));
        assert!(filter.would_enable("fblink_transport", &Level::ERROR));
    }
}
