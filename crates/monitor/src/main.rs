//! Stride CLI
//!
//! Runs the smart-shoe monitor loop and exposes the rule evaluator, advice
//! tables, medication schedule and stored history from the command line.
//! Events go to stdout (JSON lines by default); logs go to stderr.

mod emit;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use monitor::storage::DEFAULT_HISTORY_LIMIT;
use monitor::{FileStorage, Monitor, MonitorConfig, MonitorReport, ReplaySource, SimulatedShoe, Storage};
use notify::Notifier;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vitals::advice::{meal_plan, AdviceSheet, GlucoseBand, MealPlan};
use vitals::history::{timeline, HistorySummary, TimelineEntry};
use vitals::schedule::{
    any_medication_overdue, any_overdue, default_insulin_plan, DoseStatus, InsulinDose,
    MedicationStatus,
};
use vitals::status::{metric_cards, MetricCard};
use vitals::{evaluate, BiometricSnapshot, Evaluation, Medication};

use emit::{render_advisory, EventEmitter, OutputFormat};

/// Smart-shoe health monitor
#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Evaluate smart-shoe biometrics and raise health alerts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (json or text)
    #[arg(long, default_value = "json", global = true)]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the monitor config file
    #[arg(long, default_value = "stride.json", global = true)]
    config: PathBuf,

    /// Override the data directory from the config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Also append events to this JSONL file
    #[arg(long, global = true)]
    output_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor loop until stopped (Ctrl-C), a tick limit, or the end of a replay
    Run {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,

        /// Seconds between ticks
        #[arg(long)]
        interval: Option<u64>,

        /// Seed for the simulated shoe
        #[arg(long)]
        seed: Option<u64>,

        /// Replay snapshots from a JSON array instead of simulating
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Skip persisting readings
        #[arg(long)]
        no_persist: bool,
    },
    /// Evaluate a single reading (omitted values count as missing)
    Evaluate {
        #[arg(long)]
        glucose: Option<f64>,

        #[arg(long)]
        heart_rate: Option<f64>,

        #[arg(long)]
        systolic: Option<f64>,

        #[arg(long)]
        diastolic: Option<f64>,

        #[arg(long)]
        temperature: Option<f64>,

        /// Glucose of the previous reading, enables the trend rule
        #[arg(long)]
        previous_glucose: Option<f64>,
    },
    /// Food and exercise advice for a glucose level
    Advice {
        #[arg(long)]
        glucose: f64,

        /// Include the full daily meal plan
        #[arg(long)]
        meal_plan: bool,
    },
    /// Manage the medication schedule
    Meds {
        #[command(subcommand)]
        action: MedsCommands,
    },
    /// Show stored readings
    History {
        /// Number of most recent readings
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,

        /// Include averages and the per-day timeline
        #[arg(long)]
        summary: bool,
    },
}

#[derive(Subcommand)]
enum MedsCommands {
    /// Schedule a medication
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        dosage: String,

        /// Scheduled time, HH:MM (24h)
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,

        #[arg(long, default_value = "daily")]
        frequency: String,
    },
    /// List scheduled medications
    List,
    /// Mark a medication as taken
    Take { id: String },
    /// Remove a medication
    Remove { id: String },
    /// Show today's insulin plan and dose status
    Insulin,
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| format!("expected HH:MM, got '{value}': {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = MonitorConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    debug!(?config, "Loaded configuration");

    let emitter = EventEmitter::new(cli.format, cli.output_file);

    match cli.command {
        Commands::Run {
            ticks,
            interval,
            seed,
            replay,
            no_persist,
        } => {
            if ticks.is_some() {
                config.max_ticks = ticks;
            }
            if let Some(interval) = interval {
                config.tick_interval_secs = interval;
            }
            if seed.is_some() {
                config.seed = seed;
            }

            let report = run_monitor(config, &emitter, replay, !no_persist).await?;
            emitter.emit_value(&report)?;
        }
        Commands::Evaluate {
            glucose,
            heart_rate,
            systolic,
            diastolic,
            temperature,
            previous_glucose,
        } => {
            let result = evaluate_reading(
                [glucose, heart_rate, systolic, diastolic, temperature],
                previous_glucose,
            );
            output_result(&result, cli.format, print_evaluation)?;
        }
        Commands::Advice { glucose, meal_plan } => {
            let result = advice(glucose, meal_plan);
            output_result(&result, cli.format, print_advice)?;
        }
        Commands::Meds { action } => {
            handle_meds(action, &config, cli.format).await?;
        }
        Commands::History { limit, summary } => {
            let storage = FileStorage::new(&config.data_dir);
            let records = storage.recent_readings(&config.user_id, limit).await?;
            let result = HistoryResponse::new(&records, summary);
            output_result(&result, cli.format, print_history)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "stride=debug,monitor=debug,notify=debug"
    } else {
        "stride=info,monitor=info,notify=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// =============================================================================
// Run
// =============================================================================

async fn run_monitor(
    config: MonitorConfig,
    emitter: &EventEmitter,
    replay: Option<PathBuf>,
    persist: bool,
) -> Result<MonitorReport> {
    let mut monitor = match replay {
        Some(path) => {
            let source = ReplaySource::from_file(&path)?;
            info!(path = %path.display(), snapshots = source.remaining(), "Replaying snapshots");
            Monitor::new(config.clone(), source)?
        }
        None => Monitor::new(config.clone(), SimulatedShoe::new(config.seed))?,
    };

    if persist {
        let storage = Arc::new(FileStorage::new(&config.data_dir));
        storage
            .initialize()
            .await
            .with_context(|| format!("Failed to initialize {}", config.data_dir.display()))?;
        monitor = monitor.with_storage(storage);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = monitor
        .with_notifier(Arc::new(Notifier::from_env()))
        .with_events(tx)
        .start();

    let report = loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => emitter.emit(&event)?,
                None => break handle.wait().await?,
            },
            () = async { tokio::signal::ctrl_c().await.ok(); } => {
                info!("Received SIGINT, shutting down");
                break handle.stop().await?;
            }
        }
    };

    while let Ok(event) = rx.try_recv() {
        emitter.emit(&event)?;
    }

    Ok(report)
}

// =============================================================================
// Evaluate
// =============================================================================

#[derive(Serialize)]
struct EvaluateResponse {
    snapshot: BiometricSnapshot,
    evaluation: Evaluation,
    cards: Vec<MetricCard>,
}

fn evaluate_reading(values: [Option<f64>; 5], previous_glucose: Option<f64>) -> EvaluateResponse {
    let [glucose, heart_rate, systolic, diastolic, temperature] =
        values.map(|v| v.unwrap_or(f64::NAN));
    let snapshot = BiometricSnapshot::new(
        glucose,
        heart_rate,
        systolic,
        diastolic,
        temperature,
        Utc::now(),
    );
    let previous = previous_glucose.map(|glucose| BiometricSnapshot {
        glucose,
        ..snapshot
    });

    EvaluateResponse {
        snapshot,
        evaluation: evaluate(&snapshot, previous.as_ref()),
        cards: metric_cards(&snapshot, previous.as_ref()),
    }
}

fn print_evaluation(result: &EvaluateResponse) {
    for card in &result.cards {
        println!(
            "{:<16} {:>7} {:<6} {:?} / {:?}",
            card.title, card.value, card.unit, card.status, card.trend
        );
    }
    println!();

    if result.evaluation.incomplete_input {
        let missing: Vec<&str> = result.evaluation.missing.iter().map(|f| f.as_str()).collect();
        println!(
            "{} {}",
            "Incomplete reading, skipped rules for:".yellow(),
            missing.join(", ")
        );
    }
    for advisory in &result.evaluation.advisories {
        println!("{}", render_advisory(advisory));
    }
}

// =============================================================================
// Advice
// =============================================================================

#[derive(Serialize)]
struct AdviceResponse {
    #[serde(flatten)]
    sheet: AdviceSheet,
    #[serde(skip_serializing_if = "Option::is_none")]
    meal_plan: Option<MealPlan>,
}

fn advice(glucose: f64, include_meal_plan: bool) -> AdviceResponse {
    let sheet = AdviceSheet::for_glucose(glucose);
    let plan = include_meal_plan.then(|| meal_plan(GlucoseBand::classify(glucose)));
    AdviceResponse {
        sheet,
        meal_plan: plan,
    }
}

fn print_advice(result: &AdviceResponse) {
    let sheet = &result.sheet;
    println!("{} ({:.0} mg/dL)", sheet.headline.bold(), sheet.glucose);

    println!("\n{}", "Foods".underline());
    for food in &sheet.foods {
        println!("  {:<16} [{}] {}", food.name, food.effect.label(), food.description);
    }

    println!("\n{}", "Exercise".underline());
    for exercise in &sheet.exercises {
        println!(
            "  {:<20} {:>3} min  {:?}  ~{} cal  {}",
            exercise.name,
            exercise.duration_mins,
            exercise.intensity,
            exercise.calories_burned,
            exercise.glucose_impact
        );
    }
    if let Some(guidance) = sheet.guidance {
        println!("  {}", guidance.yellow());
    }

    if let Some(plan) = &result.meal_plan {
        println!(
            "\n{} ({} kcal)",
            "Meal plan".underline(),
            plan.total_daily_calories()
        );
        for section in &plan.sections {
            let meal = &section.meal;
            println!(
                "  {} {} - {} ({} kcal)",
                meal.time.dimmed(),
                meal.kind.bold(),
                section.name,
                meal.total_calories
            );
            for item in &meal.items {
                println!(
                    "    {:<28} {:<14} {:>4} kcal  {:?}",
                    item.name, item.portion, item.calories, item.glucose_impact
                );
            }
        }
    }
}

// =============================================================================
// Medications
// =============================================================================

async fn handle_meds(action: MedsCommands, config: &MonitorConfig, format: OutputFormat) -> Result<()> {
    let storage = FileStorage::new(&config.data_dir);

    match action {
        MedsCommands::Add {
            name,
            dosage,
            time,
            frequency,
        } => {
            storage.initialize().await?;
            let medication = Medication::new(&config.user_id, name, dosage, time)
                .with_frequency(frequency);
            let medication = storage.add_medication(medication).await?;
            info!(id = %medication.id, "Medication scheduled");
            output_result(&medication, format, print_medication)?;
        }
        MedsCommands::List => {
            let medications = storage.list_medications(&config.user_id).await?;
            let result = MedicationsResponse::at(&medications, Local::now().time());
            output_result(&result, format, print_medications)?;
        }
        MedsCommands::Take { id } => {
            let medication = storage
                .mark_taken(&id)
                .await
                .with_context(|| format!("Failed to mark {id} as taken"))?;
            output_result(&medication, format, print_medication)?;
        }
        MedsCommands::Remove { id } => {
            storage
                .delete_medication(&id)
                .await
                .with_context(|| format!("Failed to remove {id}"))?;
            output_result(&serde_json::json!({ "removed": id }), format, |_| {
                println!("{}", "Medication removed".green());
            })?;
        }
        MedsCommands::Insulin => {
            let now = Local::now().time();
            let result = InsulinResponse::at(now);
            output_result(&result, format, print_insulin)?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct MedicationEntry<'a> {
    #[serde(flatten)]
    medication: &'a Medication,
    status: MedicationStatus,
}

#[derive(Serialize)]
struct MedicationsResponse<'a> {
    medications: Vec<MedicationEntry<'a>>,
    any_overdue: bool,
}

impl<'a> MedicationsResponse<'a> {
    fn at(medications: &'a [Medication], now: NaiveTime) -> Self {
        Self {
            any_overdue: any_medication_overdue(medications, now),
            medications: medications
                .iter()
                .map(|medication| MedicationEntry {
                    medication,
                    status: MedicationStatus::at(medication, now),
                })
                .collect(),
        }
    }
}

fn print_medication(medication: &Medication) {
    let result = MedicationsResponse::at(std::slice::from_ref(medication), Local::now().time());
    print_medications(&result);
}

fn print_medications(result: &MedicationsResponse<'_>) {
    if result.medications.is_empty() {
        println!("{}", "No medications scheduled".dimmed());
        return;
    }
    if result.any_overdue {
        println!("{}", "You have overdue medications".red().bold());
    }
    for entry in &result.medications {
        let medication = entry.medication;
        let label = entry.status.label();
        let label = match entry.status {
            MedicationStatus::Overdue => label.red(),
            MedicationStatus::Due => label.yellow(),
            MedicationStatus::Upcoming => label.blue(),
            MedicationStatus::Taken => label.green(),
            MedicationStatus::Scheduled => label.dimmed(),
        };
        println!(
            "{} {:<20} {:<10} {:<8} {:<9} {}",
            medication.scheduled_time.format("%H:%M"),
            medication.medication_name,
            medication.dosage,
            medication.frequency,
            label,
            medication.id.dimmed()
        );
    }
}

#[derive(Serialize)]
struct InsulinDoseStatus {
    #[serde(flatten)]
    dose: InsulinDose,
    status: DoseStatus,
}

#[derive(Serialize)]
struct InsulinResponse {
    doses: Vec<InsulinDoseStatus>,
    any_overdue: bool,
}

impl InsulinResponse {
    fn at(now: NaiveTime) -> Self {
        let plan = default_insulin_plan();
        Self {
            any_overdue: any_overdue(&plan, now),
            doses: plan
                .into_iter()
                .map(|dose| InsulinDoseStatus {
                    status: dose.status(now),
                    dose,
                })
                .collect(),
        }
    }
}

fn print_insulin(result: &InsulinResponse) {
    for entry in &result.doses {
        let label = entry.status.label();
        let label = match entry.status {
            DoseStatus::Overdue => label.red(),
            DoseStatus::Due => label.yellow(),
            DoseStatus::Upcoming => label.blue(),
            DoseStatus::Scheduled => label.dimmed(),
        };
        println!(
            "{} {:<13} {:<9} {}",
            entry.dose.time.format("%H:%M"),
            entry.dose.kind.label(),
            entry.dose.dose,
            label
        );
    }
    if result.any_overdue {
        println!("{}", "You have overdue insulin doses".red().bold());
    }
}

// =============================================================================
// History
// =============================================================================

#[derive(Serialize)]
struct HistoryDay<'a> {
    date: NaiveDate,
    entries: Vec<TimelineEntry<'a>>,
}

#[derive(Serialize)]
struct HistoryResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<HistorySummary>,
    days: Vec<HistoryDay<'a>>,
}

impl<'a> HistoryResponse<'a> {
    fn new(records: &'a [vitals::HealthRecord], with_summary: bool) -> Self {
        Self {
            summary: with_summary.then(|| HistorySummary::from_records(records)),
            days: timeline(records)
                .into_iter()
                .map(|(date, entries)| HistoryDay { date, entries })
                .collect(),
        }
    }
}

fn print_history(result: &HistoryResponse<'_>) {
    if let Some(summary) = &result.summary {
        println!(
            "{} avg glucose {} mg/dL | avg HR {} BPM | {} steps | {} readings\n",
            "Summary".bold(),
            summary.avg_glucose,
            summary.avg_heart_rate,
            summary.total_steps,
            summary.records
        );
    }

    if result.days.is_empty() {
        println!("{}", "No readings stored".dimmed());
    }

    for day in &result.days {
        println!("{}", day.date.format("%A, %B %-d, %Y").to_string().bold());
        for entry in &day.entries {
            let record = entry.record;
            let glucose = record
                .glucose_level
                .map_or_else(|| "-".to_string(), |g| format!("{g:.0}"));
            println!(
                "  {} glucose {:>4} {:?} ({:?})  steps {}",
                record.recorded_at.with_timezone(&Local).format("%H:%M"),
                glucose,
                entry.glucose_status,
                entry.glucose_trend,
                record.steps.unwrap_or(0)
            );
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Output a result as pretty JSON or through its text renderer.
fn output_result<T: Serialize>(result: &T, format: OutputFormat, text: impl Fn(&T)) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(result)?;
            println!("{json}");
        }
        OutputFormat::Text => text(result),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("08:30").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert!(parse_time("8.30").is_err());
    }

    #[test]
    fn test_evaluate_reading_missing_values() {
        let result = evaluate_reading([Some(50.0), None, Some(120.0), Some(80.0), Some(98.6)], None);
        assert!(result.evaluation.incomplete_input);
        assert!(result.evaluation.ids().contains(&"glucose-low"));
    }

    #[test]
    fn test_evaluate_reading_with_previous_glucose() {
        let result = evaluate_reading(
            [Some(120.0), Some(72.0), Some(120.0), Some(80.0), Some(98.6)],
            Some(100.0),
        );
        assert!(result.evaluation.ids().contains(&"glucose-trend"));
    }

    #[test]
    fn test_insulin_response() {
        let result = InsulinResponse::at(NaiveTime::from_hms_opt(12, 45, 0).unwrap());
        assert_eq!(result.doses.len(), 3);
        assert_eq!(result.doses[0].status, DoseStatus::Overdue);
        assert!(result.any_overdue);
    }

    #[test]
    fn test_medications_response_flags_overdue() {
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let medications = vec![
            Medication::new("local", "Metformin", "500mg", at(8, 0)),
            Medication::new("local", "Lisinopril", "10mg", at(9, 0)),
        ];

        let result = MedicationsResponse::at(&medications, at(8, 20));
        assert!(result.any_overdue);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["medications"][0]["status"], "overdue");
        assert_eq!(json["medications"][0]["medication_name"], "Metformin");
        assert_eq!(json["medications"][1]["status"], "scheduled");

        let result = MedicationsResponse::at(&medications, at(8, 10));
        assert!(!result.any_overdue);
        assert_eq!(result.medications[0].status, MedicationStatus::Due);
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from(["stride", "--format", "text", "run", "--ticks", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Run { ticks: Some(3), .. }
        ));
    }
}
