use tracing::Subscriber;
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::RunMode;

const DEBUG_FILTER: &str = "coffee_recipes=debug,coffee_llm=debug,tower_http=debug,info";
const RELEASE_FILTER: &str = "coffee_recipes=info,coffee_llm=info,tower_http=info,warn";

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// mode's default filter; release mode logs JSON lines.
pub fn init(mode: RunMode) {
    let default_filter = match mode {
        RunMode::Debug => DEBUG_FILTER,
        RunMode::Release => RELEASE_FILTER,
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    subscriber(mode, filter, std::io::stdout).init();
}

fn subscriber<W>(
    mode: RunMode,
    filter: EnvFilter,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    match mode {
        RunMode::Debug => Box::new(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .compact(),
            ),
        ),
        RunMode::Release => Box::new(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_target(false)
                    .json()
                    .with_current_span(true),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(mode: RunMode) -> String {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = subscriber(mode, EnvFilter::new("info"), move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("get_recipe", coffee_type = "Latte");
            let _entered = span.enter();
            tracing::info!("generating recipe");
        });

        buffer.contents()
    }

    #[test]
    fn release_mode_writes_json_lines_with_current_span() {
        let output = capture(RunMode::Release);
        let line: serde_json::Value =
            serde_json::from_str(output.lines().next().expect("one log line")).unwrap();

        assert_eq!(line["fields"]["message"], "generating recipe");
        assert_eq!(line["span"]["name"], "get_recipe");
        assert_eq!(line["span"]["coffee_type"], "Latte");
    }

    #[test]
    fn debug_mode_writes_plain_text() {
        let output = capture(RunMode::Debug);

        assert!(output.contains("generating recipe"));
        assert!(serde_json::from_str::<serde_json::Value>(output.trim()).is_err());
    }
}
