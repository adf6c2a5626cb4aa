use colored::*;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::writer::{MakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::registry::LookupSpan;

/// Events on this target are written verbatim, without a status symbol.
pub const PRINT_TARGET: &str = "pingr::print";

pub struct PingrFormatter;

impl<S, N> FormatEvent<S, N> for PingrFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() != PRINT_TARGET {
            let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
                Level::TRACE => ("[ ]", |s| s.dimmed()),
                Level::DEBUG => ("[?]", |s| s.blue()),
                Level::INFO => ("[+]", |s| s.green().bold()),
                Level::WARN => ("[*]", |s| s.yellow().bold()),
                Level::ERROR => ("[-]", |s| s.red().bold()),
            };
            write!(writer, "{} ", color_func(symbol.into()))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

fn is_print(meta: &Metadata<'_>) -> bool {
    meta.target() == PRINT_TARGET
}

/// Printed output goes to `out`, every log line to `err`.
///
/// `watch` redraws its window on stdout, so diagnostics must never share it.
pub fn routed_writer<O, E>(out: O, err: E) -> impl for<'a> MakeWriter<'a> + Send + Sync + 'static
where
    O: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    E: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    out.with_filter(is_print).or_else(err)
}

fn env_filter(quiet: u8) -> EnvFilter {
    let default_level: &str = match quiet {
        0 => "info",
        1 => "warn",
        _ => "error",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Printed output must survive any quiet level.
        EnvFilter::new(format!("{default_level},{PRINT_TARGET}=info"))
    })
}

fn build_subscriber<W>(quiet: u8, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(quiet))
        .event_format(PingrFormatter)
        .with_writer(writer)
        .finish()
}

/// Installs the global subscriber. `RUST_LOG` overrides the quiet level.
pub fn init_logging(quiet: u8) {
    let subscriber = build_subscriber(quiet, routed_writer(std::io::stdout, std::io::stderr));
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::{info, warn};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn logs_and_printed_output_use_separate_streams() {
        let out = Buffer::default();
        let err = Buffer::default();
        let subscriber = build_subscriber(0, routed_writer(out.clone(), err.clone()));

        tracing::subscriber::with_default(subscriber, || {
            info!(target: PRINT_TARGET, "window line");
            warn!("still pinging the old host");
        });

        assert!(out.contents().contains("window line"));
        assert!(!out.contents().contains("still pinging"));
        assert!(err.contents().contains("still pinging the old host"));
        assert!(!err.contents().contains("window line"));
    }
}
