use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use macd_core::{
    config::Settings,
    service::{report, run_batch, AnalysisService},
};

#[derive(Parser)]
#[command(name = "macd-backtest")]
#[command(about = "MACD crossover signals and a toy backtest over daily price files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest the crossover strategy on each file (the default)
    Backtest(BacktestArgs),
    /// Print the indicator table of a single file
    Indicators {
        file: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args, Default)]
struct BacktestArgs {
    /// Price files; falls back to the configured inputs
    files: Vec<PathBuf>,
    /// Also print the trade ledger
    #[arg(long)]
    trades: bool,
    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Args, Default)]
struct Overrides {
    /// Keep every n-th row of the file
    #[arg(long)]
    stride: Option<usize>,
    /// Maximum rows kept after striding
    #[arg(long)]
    max_rows: Option<usize>,
    #[arg(long)]
    fast: Option<usize>,
    #[arg(long)]
    slow: Option<usize>,
    #[arg(long)]
    signal: Option<usize>,
    /// Units held before the first day
    #[arg(long)]
    initial_units: Option<u64>,
    /// Write chart data as JSON into this directory
    #[arg(long)]
    chart_dir: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, settings: &mut Settings) {
        if let Some(stride) = self.stride {
            settings.sampling.stride = stride;
        }
        if let Some(max_rows) = self.max_rows {
            settings.sampling.max_rows = Some(max_rows);
        }
        if let Some(fast) = self.fast {
            settings.indicator.fast = fast;
        }
        if let Some(slow) = self.slow {
            settings.indicator.slow = slow;
        }
        if let Some(signal) = self.signal {
            settings.indicator.signal = signal;
        }
        if let Some(units) = self.initial_units {
            settings.backtest.initial_units = units;
        }
        if let Some(dir) = self.chart_dir {
            settings.chart_dir = Some(dir);
        }
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::new().context("failed to load settings")?;

    match cli.command.unwrap_or_else(|| Commands::Backtest(BacktestArgs::default())) {
        Commands::Backtest(args) => {
            args.overrides.apply(&mut settings);
            let files = if args.files.is_empty() {
                settings.inputs.clone()
            } else {
                args.files
            };
            if files.is_empty() {
                bail!("no input files given and none configured");
            }

            let service = Arc::new(AnalysisService::from_settings(&settings));
            let results = run_batch(service, files).await;

            let mut failed = 0;
            for (path, result) in &results {
                match result {
                    Ok(analysis) => println!("{}", report::render(analysis, args.trades)),
                    Err(e) => {
                        failed += 1;
                        println!("{}: failed: {}\n", path.display(), e);
                    }
                }
            }

            if failed == results.len() {
                bail!("all {} inputs failed", failed);
            }
            if failed > 0 {
                warn!("{} of {} inputs failed", failed, results.len());
            }
            info!("Processed {} inputs", results.len());
        }

        Commands::Indicators { file, overrides } => {
            overrides.apply(&mut settings);
            let service = AnalysisService::from_settings(&settings);
            let analysis = tokio::task::spawn_blocking(move || service.analyze_file(&file)).await??;

            println!(
                "{:<10} {:>12} {:>12} {:>12} {:>10} {:>10}  event",
                "date", "value", "ema_fast", "ema_slow", "macd", "signal"
            );
            for point in &analysis.series {
                println!(
                    "{:<10} {:>12} {:>12} {:>12} {:>10} {:>10}  {}",
                    point.date.format("%Y-%m-%d").to_string(),
                    point.value.to_string(),
                    fmt_opt(point.ema_fast),
                    fmt_opt(point.ema_slow),
                    fmt_opt(point.macd),
                    fmt_opt(point.signal),
                    point.crossover.map(|d| d.to_string()).unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
