use std::fmt;
use std::time::SystemTime;

use clap::ValueEnum;
use colored::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Coloured one-line events for terminals
    Pretty,
    /// One JSON object per event, for log shippers
    Json,
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks info, debug or trace.
pub fn init_logging(verbose: u8, log_format: LogFormat) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(verbose))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match log_format {
        LogFormat::Pretty => builder.event_format(PingerFormatter).try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "info,pinger_core=debug,pinger_cli=debug",
        _ => "trace",
    }
}

/// One line per event: time, level symbol, target id, message, other fields.
///
/// `2024-03-01T12:00:00Z [*] 3f2a91c0 delivery attempt failed: ... attempt=2`
pub struct PingerFormatter;

impl<S, N> FormatEvent<S, N> for PingerFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            match *event.metadata().level() {
                Level::TRACE => ("[ ]", |s| s.dimmed()),
                Level::DEBUG => ("[?]", |s| s.blue()),
                Level::INFO => ("[+]", |s| s.green().bold()),
                Level::WARN => ("[*]", |s| s.yellow().bold()),
                Level::ERROR => ("[-]", |s| s.red().bold()),
            };

        let mut fields = EventFields::default();
        event.record(&mut fields);

        let now = humantime::format_rfc3339_seconds(SystemTime::now()).to_string();
        write!(writer, "{} {} ", now.dimmed(), color_func(symbol.into()))?;
        if let Some(target_id) = &fields.target_id {
            write!(writer, "{} ", short_id(target_id).cyan())?;
        }
        write!(writer, "{}", fields.message)?;

        let rest = fields.rest();
        if !rest.is_empty() {
            write!(writer, " {}", rest.dimmed())?;
        }
        writeln!(writer)
    }
}

/// The fields of one event, split into what the line layout places specially.
#[derive(Default)]
struct EventFields {
    message: String,
    target_id: Option<String>,
    others: Vec<(&'static str, String)>,
}

impl EventFields {
    fn push(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            "target_id" => self.target_id = Some(value),
            name => self.others.push((name, value)),
        }
    }

    fn rest(&self) -> String {
        self.others
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}

/// Container ids are 64 hex digits; the first 12 identify them, as `docker ps` shows.
fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
