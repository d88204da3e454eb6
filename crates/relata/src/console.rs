//! Colorful console output for query lifecycle events.
//!
//! Provides a custom `tracing` layer that formats query events with colors.
//! Enabled with the `console` feature.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Directive used when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVE: &str = "relata_solver=info";

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(QueryConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats query events with colors.
pub struct QueryConsoleLayer;

impl<S: Subscriber> Layer<S> for QueryConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("relata_solver") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_query_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    goal: Option<String>,
    projected: Option<u64>,
    steps: Option<u64>,
    solutions: Option<u64>,
    duration_ms: Option<u64>,
    terminated_early: bool,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        match field.name() {
            "event" => self.event = Some(s.trim_matches('"').to_string()),
            "goal" => self.goal = Some(s.trim_matches('"').to_string()),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "projected" => self.projected = Some(value),
            "steps" => self.steps = Some(value),
            "solutions" => self.solutions = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "terminated_early" {
            self.terminated_early = value;
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "goal" => self.goal = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_query_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "query_start" => format_query_start(v),
        "query_end" => format_query_end(v),
        _ => String::new(),
    }
}

fn format_query_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} goal ({}), projected variables ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Query]".bright_cyan(),
        v.goal.as_deref().unwrap_or("?").white().bold(),
        v.projected.unwrap_or(0).to_string().yellow()
    )
}

fn format_query_end(v: &EventVisitor) -> String {
    let status = if v.terminated_early {
        "terminated early".bright_yellow().to_string()
    } else {
        "exhausted".bright_green().to_string()
    };
    format!(
        "{} {} {} Query ended ({}): time spent ({}), solutions ({}), steps ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Query]".bright_cyan(),
        status,
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        v.solutions
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .bright_magenta()
            .bold(),
        v.steps.unwrap_or(0).to_formatted_string(&Locale::en).white()
    )
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}
