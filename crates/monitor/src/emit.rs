//! Event output for the `stride` binary.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use monitor::MonitorEvent;
use serde::Serialize;
use vitals::status::LevelStatus;
use vitals::{Advisory, Severity, Tone};

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Writes events to stdout and optionally appends them to a JSONL file.
#[derive(Clone)]
pub struct EventEmitter {
    format: OutputFormat,
    output_file: Option<PathBuf>,
}

impl EventEmitter {
    pub fn new(format: OutputFormat, output_file: Option<PathBuf>) -> Self {
        Self {
            format,
            output_file,
        }
    }

    pub fn emit(&self, event: &MonitorEvent) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(event)?),
            OutputFormat::Text => {
                for line in render_event(event) {
                    println!("{line}");
                }
            }
        }
        std::io::stdout().flush()?;

        self.append(event)
    }

    /// Emit a one-off value (such as the final report) as a JSON line or
    /// pretty text.
    pub fn emit_value<T: Serialize>(&self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
            OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
        }
        std::io::stdout().flush()?;

        self.append(value)
    }

    fn append<T: Serialize>(&self, value: &T) -> Result<()> {
        let Some(ref path) = self.output_file else {
            return Ok(());
        };

        let json = serde_json::to_string(value)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file: {}", path.display()))?;
        writeln!(file, "{json}")?;
        Ok(())
    }
}

fn render_event(event: &MonitorEvent) -> Vec<String> {
    match event {
        MonitorEvent::Started {
            user_id,
            interval_seconds,
            device,
            battery,
            signal,
            ..
        } => {
            let connection = if device.connected {
                "connected".green()
            } else {
                "disconnected".red()
            };
            vec![
                format!(
                    "{} monitoring {} every {}s",
                    "▶".green().bold(),
                    user_id.bold(),
                    interval_seconds
                ),
                format!(
                    "  shoe {} | battery {}% {} | signal {}% {}",
                    connection,
                    device.battery_level,
                    by_level(*battery),
                    device.signal_strength,
                    by_level(*signal)
                ),
            ]
        }

        MonitorEvent::Tick {
            tick,
            snapshot,
            advisories,
            incomplete_input,
            activity,
            ..
        } => {
            let mut lines = vec![format!(
                "{} glucose {:.0} mg/dL | HR {:.0} | BP {:.0}/{:.0} | {:.1}°F | {} steps",
                format!("[tick {tick}]").dimmed(),
                snapshot.glucose,
                snapshot.heart_rate,
                snapshot.blood_pressure_systolic,
                snapshot.blood_pressure_diastolic,
                snapshot.temperature,
                activity.steps
            )];
            if *incomplete_input {
                lines.push(format!("  {}", "incomplete reading, some rules skipped".yellow()));
            }
            lines.extend(advisories.iter().map(render_advisory));
            lines
        }

        MonitorEvent::Notification {
            severity,
            title,
            body,
            ..
        } => vec![format!(
            "{} {} {}",
            "🔔".bold(),
            by_severity(title, *severity).bold(),
            body
        )],

        MonitorEvent::Persisted { record_id, .. } => {
            vec![format!("  {} {}", "saved".dimmed(), record_id.dimmed())]
        }

        MonitorEvent::StorageFailed { error, .. } => {
            vec![format!("  {} {}", "storage failed:".red(), error)]
        }

        MonitorEvent::Stopped { reason, ticks, .. } => vec![format!(
            "{} stopped after {} ticks ({})",
            "■".red().bold(),
            ticks,
            reason.as_str()
        )],
    }
}

pub fn render_advisory(advisory: &Advisory) -> String {
    format!(
        "  {} {} {}",
        by_tone(&advisory.title, advisory.category.tone()),
        format!("{}%", advisory.confidence).dimmed(),
        advisory.message
    )
}

fn by_tone(text: &str, tone: Tone) -> ColoredString {
    match tone {
        Tone::Danger => text.red(),
        Tone::Warning => text.yellow(),
        Tone::Primary => text.blue(),
        Tone::Success => text.green(),
    }
}

fn by_level(level: LevelStatus) -> ColoredString {
    match level {
        LevelStatus::Good => "good".green(),
        LevelStatus::Fair => "fair".yellow(),
        LevelStatus::Poor => "poor".red(),
        LevelStatus::Charging => "charging".blue(),
    }
}

fn by_severity(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => text.red(),
        Severity::Warning => text.yellow(),
        Severity::Info => text.cyan(),
    }
}
