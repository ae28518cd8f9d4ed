//! hwbench command line
//!
//! Analyzes hardware vs software crypto benchmark captures, renders charts,
//! and prints flash usage tables.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hwbench_core::chart::{self, ChartKind, ChartOptions};
use hwbench_core::pipeline::file_averages;
use hwbench_core::reporter::emit;
use hwbench_core::{
    run_analysis, CiMethod, Config, ImplementationClass, Metric, OutputFormat, ParsePolicy,
    Platform, Reporter,
};

#[derive(Parser, Debug)]
#[command(name = "hwbench")]
#[command(
    version,
    about = "Hardware vs software crypto benchmark analysis for nRF and STM32"
)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root directory holding one sub-directory per platform
    #[arg(short, long, global = true)]
    measurements: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate measurements and report mean ± confidence interval
    Analyze {
        #[command(flatten)]
        select: SelectArgs,

        /// Output format
        #[arg(short, long, default_value_t = OutputFormat::Console)]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render SVG charts
    Plot {
        #[command(flatten)]
        select: SelectArgs,

        /// Which charts to render
        #[arg(short, long, default_value_t = ChartKind::All)]
        kind: ChartKind,

        /// Logarithmic time axis
        #[arg(long)]
        log_scale: bool,

        /// Chart root directory (overrides the configuration)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Mean time of every CSV file, per platform
    Averages {
        /// Only this platform (default: all)
        #[arg(short, long)]
        platform: Option<Platform>,

        #[arg(short, long, default_value_t = OutputFormat::Console)]
        format: OutputFormat,
    },

    /// Flash usage of the hardware and software builds
    Flash {
        #[arg(short, long)]
        platform: Option<Platform>,

        #[arg(short, long, default_value_t = OutputFormat::Console)]
        format: OutputFormat,
    },
}

/// Selectors shared by `analyze` and `plot`; each overrides the configuration
#[derive(Args, Debug, Default)]
struct SelectArgs {
    #[arg(short, long)]
    platform: Option<Platform>,

    /// hw or sw
    #[arg(short, long)]
    implementation: Option<ImplementationClass>,

    /// Confidence level in (0, 1)
    #[arg(long)]
    confidence: Option<f64>,

    /// normal or student-t
    #[arg(long)]
    method: Option<CiMethod>,

    /// Metrics to aggregate (repeatable): time, current, power
    #[arg(long = "metric", value_delimiter = ',')]
    metrics: Vec<Metric>,

    /// Skip files that fail to parse instead of aborting
    #[arg(long)]
    skip_invalid: bool,
}

impl SelectArgs {
    fn apply(&self, config: &mut Config) -> Result<()> {
        let analysis = &mut config.analysis;
        if let Some(platform) = self.platform {
            analysis.platform = Some(platform);
        }
        if let Some(class) = self.implementation {
            analysis.implementation = Some(class);
        }
        if let Some(level) = self.confidence {
            analysis.confidence_level = level;
        }
        if let Some(method) = self.method {
            analysis.ci_method = method;
        }
        if !self.metrics.is_empty() {
            analysis.metrics = self.metrics.clone();
        }
        if self.skip_invalid {
            analysis.on_parse_error = ParsePolicy::Skip;
        }
        config.validate()
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.measurements {
        config.analysis.measurements_dir = dir.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // Reports go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Analyze {
            select,
            format,
            output,
        } => {
            select.apply(&mut config)?;
            let report = run_analysis(&config)?;
            let reporter = Reporter::new(format);
            match output {
                Some(path) => {
                    reporter
                        .write_to_file(&report, &path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Report written to {}", path.display());
                }
                None => reporter.report(&report)?,
            }
        }

        Command::Plot {
            select,
            kind,
            log_scale,
            output_dir,
        } => {
            select.apply(&mut config)?;
            if log_scale {
                config.charts.log_scale_time = true;
            }
            if let Some(dir) = output_dir {
                config.charts.output_dir = dir;
            }
            let platform = config.require_platform()?;
            let options = ChartOptions::from_config(&config, platform);
            let flash = config.flash_table(platform);

            let written = if kind == ChartKind::Flash {
                vec![chart::render_flash(&flash, platform, &options)?]
            } else {
                let report = run_analysis(&config)?;
                chart::render(kind, &report, &flash, &options)?
            };
            info!("Rendered {} chart(s) in {}", written.len(), options.output_dir.display());
        }

        Command::Averages { platform, format } => {
            let platforms = platform.map_or(Platform::ALL.to_vec(), |p| vec![p]);
            let averages = file_averages(
                &config.analysis.measurements_dir,
                &platforms,
                config.analysis.time_unit,
            )?;
            emit(&Reporter::new(format).format_averages(&averages)?)?;
        }

        Command::Flash { platform, format } => {
            if let Some(platform) = platform {
                config.analysis.platform = Some(platform);
            }
            let platform = config.require_platform()?;
            let table = config.flash_table(platform);
            emit(&Reporter::new(format).format_flash(platform, &table)?)?;
        }
    }

    Ok(())
}
