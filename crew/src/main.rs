//! The `veracity` binary: fact-check passages, generate content, or re-run
//! extraction offline on a saved model reply.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use veracity_crew::backends::build_runner;
use veracity_crew::errors::CrewError;
use veracity_crew::{CrewConfig, ModelType, ResearchCrew, ResearchDepth};
use veracity_extract::{
    BoundaryStrategy, ContentSchemaVariant, ExtractionConfig, ExtractionEngine, FailureRecord,
    RecordContext, RecordShape,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Research depth, used to pick the backend model
    #[arg(long, global = true, value_enum, default_value_t = ResearchDepth::Medium)]
    depth: ResearchDepth,

    /// Force a backend model instead of picking one from the depth
    #[arg(long, global = true, value_enum)]
    model: Option<ModelType>,

    /// Maximum parse attempts per candidate
    #[arg(long, global = true, default_value_t = 3)]
    parse_attempts: usize,

    /// Locate JSON with the first-brace/last-brace scan instead of the balanced scan
    #[arg(long, global = true)]
    naive_scan: bool,

    /// How many times the final step may be issued when its reply cannot be extracted
    #[arg(long, global = true, default_value_t = 1)]
    requery_attempts: usize,

    /// Timeout for each backend call, in seconds
    #[arg(long, global = true, default_value_t = 120)]
    timeout_secs: u64,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a passage and score its veracity
    FactCheck {
        /// The passage to check
        content: String,
    },
    /// Research, write and edit content on a topic
    Generate {
        /// The topic to write about
        topic: String,
        /// Shape of the content record
        #[arg(long, value_enum, default_value_t = VariantArg::Plain)]
        variant: VariantArg,
    },
    /// Run extraction on a saved model reply without calling a backend
    Extract {
        /// Which record to extract
        #[arg(value_enum)]
        shape: ShapeArg,
        /// Shape of the content record
        #[arg(long, value_enum, default_value_t = VariantArg::Plain)]
        variant: VariantArg,
        /// Topic stamped into record metadata
        #[arg(long, default_value = "offline")]
        topic: String,
        /// File holding the reply (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Plain,
    WithWordCount,
    Factual,
}

impl From<VariantArg> for ContentSchemaVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Plain => Self::Plain,
            VariantArg::WithWordCount => Self::WithWordCount,
            VariantArg::Factual => Self::Factual,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Verification,
    Content,
}

impl Cli {
    fn crew_config(&self) -> CrewConfig {
        let boundary = if self.naive_scan {
            BoundaryStrategy::Naive
        } else {
            BoundaryStrategy::Balanced
        };
        CrewConfig {
            depth: self.depth,
            model: self.model,
            timeout: Duration::from_secs(self.timeout_secs),
            requery_attempts: self.requery_attempts,
            extraction: ExtractionConfig::default()
                .with_max_parse_attempts(self.parse_attempts)
                .with_boundary(boundary),
            ..CrewConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, CrewError> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.crew_config();

    match cli.command {
        Commands::FactCheck { content } => {
            let crew = ResearchCrew::new(build_runner(config.model_type(), config.timeout)?, config);
            emit(&crew.run_fact_check(&content).await)
        }
        Commands::Generate { topic, variant } => {
            let crew = ResearchCrew::new(build_runner(config.model_type(), config.timeout)?, config);
            emit(&crew.generate_content(&topic, variant.into()).await)
        }
        Commands::Extract {
            shape,
            variant,
            topic,
            input,
        } => {
            let raw = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let shape = match shape {
                ShapeArg::Verification => RecordShape::Verification,
                ShapeArg::Content => RecordShape::Content(variant.into()),
            };
            let engine = ExtractionEngine::with_config(config.extraction);
            emit(&engine.extract(&raw, shape, &RecordContext::new(topic)))
        }
    }
}

/// Logs go to stderr so that stdout carries only the record.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Prints the record or the failure record as pretty JSON.
fn emit<T: Serialize>(result: &Result<T, FailureRecord>) -> Result<ExitCode, CrewError> {
    let (json, code) = match result {
        Ok(record) => (serde_json::to_string_pretty(record)?, ExitCode::SUCCESS),
        Err(failure) => (serde_json::to_string_pretty(failure)?, ExitCode::FAILURE),
    };
    println!("{json}");
    Ok(code)
}
