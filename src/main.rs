use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use catalog_insights::config::{AnalysisConfig, TopN};
use catalog_insights::constants::{DEFAULT_CONFIG_FILE, DEFAULT_LOG_DIR, DEFAULT_OUTPUT_DIR};
use catalog_insights::logging;
use catalog_insights::pipeline::ingestion::CsvRecordSource;
use catalog_insights::pipeline::storage::OutputWriter;
use catalog_insights::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "catalog_insights")]
#[command(about = "Clean and summarize streaming catalog title exports")]
#[command(version = "0.1.0")]
struct Cli {
    /// Directory for rolling JSON log files
    #[arg(long, global = true, env = "CATALOG_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Catalog CSV export to analyze
    #[arg(long, env = "CATALOG_CSV")]
    csv: PathBuf,

    /// TOML file with an [analysis] table; ignored when absent
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Number of genres to rank (0 or less keeps all)
    #[arg(long, allow_negative_numbers = true)]
    top_genres: Option<i64>,

    /// Number of countries to rank (0 or less keeps all)
    #[arg(long, allow_negative_numbers = true)]
    top_countries: Option<i64>,

    /// Number of directors and actors to rank (0 or less keeps all)
    #[arg(long, allow_negative_numbers = true)]
    top_people: Option<i64>,

    /// Enrich records across worker threads
    #[arg(long)]
    parallel: bool,
}

impl InputArgs {
    /// File values first, then command-line overrides
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = AnalysisConfig::load(&self.config)
            .with_context(|| format!("loading config from {}", self.config.display()))?;
        if let Some(n) = self.top_genres {
            config.top_genres = TopN::from(n);
        }
        if let Some(n) = self.top_countries {
            config.top_countries = TopN::from(n);
        }
        if let Some(n) = self.top_people {
            config.top_people = TopN::from(n);
        }
        if self.parallel {
            config.parallel = true;
        }
        Ok(config)
    }

    fn source(&self) -> CsvRecordSource {
        CsvRecordSource::from_path(&self.csv)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write every output
    Run {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, env = "CATALOG_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
    /// Print the summary table without writing files
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Write only the cleaned titles export
    Clean {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, env = "CATALOG_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli.log_dir);

    match cli.command {
        Commands::Run { input, output_dir } => {
            println!("🚀 Running catalog pipeline on {}...", input.csv.display());
            let pipeline = Pipeline::new(input.analysis_config()?);
            let result = pipeline
                .run(&input.source())
                .with_context(|| format!("analyzing {}", input.csv.display()))?;

            let writer = OutputWriter::new(&output_dir)
                .with_context(|| format!("creating output directory {}", output_dir.display()))?;
            let written = result.persist(&writer)?;

            println!("\n📊 Pipeline Results (run {}):", result.run_id);
            println!("   Records: {}", result.records.len());
            println!("   Missing columns: {}", result.report.missing_columns.len());
            println!("   Files written: {}", written.len());
            println!("   Output dir: {}", output_dir.display());
            println!("   Elapsed: {:.3}s", result.elapsed_seconds);

            if !result.is_complete() {
                warn!("Summary persisted with N/A metrics: {}", result.incomplete.join(", "));
                println!("\n⚠️  Metrics without data:");
                for metric in &result.incomplete {
                    println!("   - {}", metric);
                }
            }
            println!("✅ Full pipeline completed successfully!");
        }
        Commands::Summary { input } => {
            let pipeline = Pipeline::new(input.analysis_config()?);
            let result = pipeline
                .run(&input.source())
                .with_context(|| format!("analyzing {}", input.csv.display()))?;

            let width = result
                .summary
                .rows()
                .iter()
                .map(|r| r.metric.len())
                .max()
                .unwrap_or(0);
            for (metric, value) in result.summary.to_pairs() {
                println!("{:<width$}  {}", metric, value, width = width);
            }
            if !result.is_complete() {
                warn!("{} summary metrics have no data", result.incomplete.len());
            }
        }
        Commands::Clean { input, output_dir } => {
            println!("🔨 Cleaning {}...", input.csv.display());
            let pipeline = Pipeline::new(input.analysis_config()?);
            let cleaned = pipeline
                .clean(&input.source())
                .with_context(|| format!("cleaning {}", input.csv.display()))?;

            let writer = OutputWriter::new(&output_dir)?;
            let path = writer.write_cleaned(&cleaned.records)?;
            info!("Cleaned {} records from {}", cleaned.records.len(), cleaned.input);
            println!("✅ Wrote {} records to {}", cleaned.records.len(), path.display());
        }
    }
    Ok(())
}
