//! CLI entry point for the gradebook cleaner.
//!
//! Provides subcommands for grading an exported gradebook CSV and for
//! inspecting how its headers are classified.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gradebook_cleaner::{
    config::{CategoryWeights, GradingConfig, Language},
    grading::policy::{AggregationPolicy, EmptyRatio, PolicyKind},
    grading::types::CategoryGroups,
    headers::{HeaderClass, classify_headers},
    output::{print_summary, write_hints_json, write_report_csv},
    parser::read_gradebook,
    pipeline::{self, SheetMetadata},
};
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gradebook_cleaner")]
#[command(about = "Cleans exported gradebooks and computes weighted final grades", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade an exported gradebook and write the cleaned sheet
    Process {
        /// Exported gradebook CSV
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// CSV file to write the cleaned gradebook to
        #[arg(short, long, default_value = "grades.csv")]
        output: PathBuf,

        /// JSON object mapping category names to weights
        #[arg(short, long, env = "GRADEBOOK_WEIGHTS")]
        weights: Option<PathBuf>,

        /// Aggregation policy: mean, ratio or passthrough
        #[arg(short, long, env = "GRADEBOOK_POLICY", default_value = "ratio")]
        policy: PolicyKind,

        /// Ratio policy result when no points are possible: zero or blank
        #[arg(long, default_value = "zero")]
        empty_ratio: EmptyRatio,

        /// Label language: en or es
        #[arg(short, long, env = "GRADEBOOK_LANGUAGE", default_value = "en")]
        language: Language,

        /// Optional: JSON file to write column display hints to
        #[arg(long)]
        hints: Option<PathBuf>,

        /// Teacher name shown on the sheet
        #[arg(long, default_value = "")]
        teacher: String,

        /// Subject shown on the sheet
        #[arg(long, default_value = "")]
        subject: String,

        /// Class or group shown on the sheet
        #[arg(long, default_value = "")]
        class: String,

        /// Course level shown on the sheet
        #[arg(long, default_value = "")]
        level: String,
    },
    /// Show how each header of a gradebook is classified
    Inspect {
        /// Exported gradebook CSV
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Aggregation policy the classification is done for
        #[arg(short, long, env = "GRADEBOOK_POLICY", default_value = "ratio")]
        policy: PolicyKind,

        /// Optional: weights to show next to each category
        #[arg(short, long, env = "GRADEBOOK_WEIGHTS")]
        weights: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/gradebook_cleaner.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gradebook_cleaner.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            weights,
            policy,
            empty_ratio,
            language,
            hints,
            teacher,
            subject,
            class,
            level,
        } => {
            let config = GradingConfig {
                policy: AggregationPolicy::from_kind(policy, empty_ratio),
                weights: load_weights(weights.as_deref())?,
                language,
            };
            let metadata = SheetMetadata {
                teacher,
                subject,
                class,
                level,
            };

            let book = read_gradebook(&input)
                .with_context(|| format!("reading gradebook {}", input.display()))?;
            let report = pipeline::run(&book, &config);

            write_report_csv(&output, &report)
                .with_context(|| format!("writing report {}", output.display()))?;
            if let Some(hints) = hints {
                write_hints_json(&hints, &report, &metadata)
                    .with_context(|| format!("writing hints {}", hints.display()))?;
            }

            print_summary(&report);
            info!(output = %output.display(), "Gradebook written");
        }
        Commands::Inspect {
            input,
            policy,
            weights,
        } => {
            let policy = AggregationPolicy::from_kind(policy, EmptyRatio::default());
            let weights = load_weights(weights.as_deref())?;
            let book = read_gradebook(&input)
                .with_context(|| format!("reading gradebook {}", input.display()))?;

            inspect(book.headers(), &policy, &weights);
        }
    }

    Ok(())
}

fn load_weights(path: Option<&Path>) -> Result<CategoryWeights> {
    match path {
        Some(path) => {
            let weights = CategoryWeights::load(path)
                .with_context(|| format!("loading weights {}", path.display()))?;
            if weights.is_empty() {
                warn!(path = %path.display(), "Weight file is empty, every category is unweighted");
            }
            Ok(weights)
        }
        None => {
            warn!("No weight file given, every category is unweighted");
            Ok(CategoryWeights::default())
        }
    }
}

/// Logs the classification of every header and the resulting categories.
#[tracing::instrument(skip_all, fields(policy = %policy.kind(), columns = headers.len()))]
fn inspect(headers: &[String], policy: &AggregationPolicy, weights: &CategoryWeights) {
    let classification = classify_headers(headers, policy);

    for entry in classification.entries() {
        match &entry.class {
            HeaderClass::General => {
                info!(position = entry.position, header = %entry.header, "General")
            }
            HeaderClass::CategoryItem(item) => info!(
                position = entry.position,
                header = %entry.header,
                category = %item.category,
                max_points = ?item.max_points,
                display_name = %item.display_name,
                "Category item"
            ),
            HeaderClass::CategoryScore(score) => info!(
                position = entry.position,
                header = %entry.header,
                category = %score.category,
                "Category score"
            ),
            HeaderClass::Excluded(reason) => {
                debug!(
                    position = entry.position,
                    header = %entry.header,
                    reason = ?reason,
                    "Excluded"
                )
            }
        }
    }

    let groups = CategoryGroups::build(&classification, weights);
    for group in groups.iter() {
        info!(
            category = %group.label,
            items = group.items.len(),
            has_score_column = group.score_column.is_some(),
            weight = ?group.weight,
            first_column = group.first_appearance(),
            "Category"
        );
    }
    info!(
        categories = groups.len(),
        excluded = classification.excluded_count(),
        "Inspection complete"
    );
}
