//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional NDJSON file rotation,
//! and environment-based level control.

use std::path::Path;
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global structured logger.
///
/// `RUST_LOG` takes precedence over `level`. Console output goes to stderr so
/// stdout is left to command output. With `log_dir` set, a daily-rolling
/// `copilot.log.YYYY-MM-DD` NDJSON file is written as well.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logger(log_dir: Option<&Path>, level: &str, json: bool) {
    let _ = build_subscriber(log_dir, level, json, std::io::stderr).try_init();
}

fn build_subscriber<W>(
    log_dir: Option<&Path>,
    level: &str,
    json: bool,
    console: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = log_dir.map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "copilot.log");
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    let json_console = json.then(|| fmt::layer().json().with_writer(console.clone()));
    let plain_console = (!json).then(|| {
        fmt::layer()
            .with_writer(console)
            .with_target(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(plain_console)
        .with(file_layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_console_output_goes_to_the_console_writer() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = build_subscriber(None, "warn", false, move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Bridge call failed");
            tracing::debug!("filtered out");
        });

        let text = captured.text();
        assert!(text.contains("Bridge call failed"));
        assert!(!text.contains("filtered out"));
    }

    #[test]
    fn test_json_console_writes_ndjson() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = build_subscriber(None, "info", true, move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(tool = "ping-bridge", "Tool call");
        });

        let line = captured.text();
        let value: serde_json::Value = serde_json::from_str(line.lines().next().unwrap()).unwrap();
        assert_eq!(value["fields"]["tool"], "ping-bridge");
    }
}
