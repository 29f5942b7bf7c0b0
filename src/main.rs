//! RPD Forecast CLI
//!
//! Command-line interface for running revenue-per-day forecasts

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use rpd_forecast::assumptions::{ParameterMode, PeriodType};
use rpd_forecast::curve::{fit_period, sample_curve, DEFAULT_SAMPLES};
use rpd_forecast::report::{format_yearly, write_curves, write_revenue_table, write_yearly};
use rpd_forecast::{ForecastConfig, ForecastRunner};

#[derive(Parser)]
#[command(name = "rpd_forecast", version, about = "Subscription revenue-per-day forecasting")]
struct Cli {
    /// JSON config file (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Project daily revenue and print yearly RPD
    Forecast {
        #[command(flatten)]
        opts: ForecastOpts,

        /// Write the full daily revenue table as CSV
        #[arg(long)]
        table_csv: Option<PathBuf>,

        /// Write yearly RPD results as CSV
        #[arg(long)]
        yearly_csv: Option<PathBuf>,

        /// Print yearly results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Fit one period's observed renewal rates and print the curve
    Fit {
        /// week, month, quarter or year
        #[arg(long)]
        period: PeriodType,

        /// Comma-separated rates at the period's checkpoints
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        rates: Vec<f64>,

        /// Also print the curve at each period up to this many periods
        #[arg(long)]
        horizon: Option<u32>,
    },
    /// Write observed points and sampled fitted curves as CSV
    Curves {
        #[command(flatten)]
        opts: ForecastOpts,

        #[arg(long, default_value_t = DEFAULT_SAMPLES)]
        samples: usize,

        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Overrides on top of the config file and environment
#[derive(Args)]
struct ForecastOpts {
    /// Product launch date (YYYY-MM-DD)
    #[arg(long)]
    launch_date: Option<NaiveDate>,

    /// Number of forecast years, counting the launch year
    #[arg(long)]
    years: Option<u32>,

    #[arg(long)]
    daily_activations: Option<f64>,

    #[arg(long)]
    base_revenue: Option<f64>,

    /// uniform (one set for all years) or per-year
    #[arg(long)]
    mode: Option<ParameterMode>,

    /// Assumptions file (CSV, or JSON by extension)
    #[arg(long)]
    assumptions: Option<PathBuf>,
}

impl ForecastOpts {
    fn apply(&self, config: &mut ForecastConfig) {
        if let Some(d) = self.launch_date {
            config.launch_date = d;
        }
        if let Some(y) = self.years {
            config.forecast_years = y;
        }
        if let Some(n) = self.daily_activations {
            config.daily_activations = n;
        }
        if let Some(r) = self.base_revenue {
            config.base_revenue = r;
        }
        if let Some(m) = self.mode {
            config.mode = m;
        }
        if let Some(path) = &self.assumptions {
            config.assumptions_path = Some(path.clone());
        }
    }
}

fn load_config(path: Option<&PathBuf>, opts: &ForecastOpts) -> Result<ForecastConfig> {
    let mut config = match path {
        Some(p) => ForecastConfig::from_path(p)
            .with_context(|| format!("Failed to read config {}", p.display()))?,
        None => ForecastConfig::default(),
    };
    config.apply_env().context("Invalid RPD_* environment variable")?;
    opts.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn create_output(path: &PathBuf) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn run_forecast(
    config: &ForecastConfig,
    table_csv: Option<&PathBuf>,
    yearly_csv: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let start = Instant::now();
    let runner = ForecastRunner::from_config(config)?;
    let forecast = runner.run(config)?;
    info!("Forecast complete in {:?}", start.elapsed());

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
    } else {
        println!("RPD Forecast");
        println!("============\n");
        println!("Launch date: {}", config.launch_date);
        println!("Forecast:    {} to {} ({} years)", forecast.start_date, forecast.end_date, config.forecast_years);
        println!("Mode:        {:?}", config.mode);
        println!("Cohort size: {} users/day, base revenue {:.2}\n", config.daily_activations, config.base_revenue);
        print!("{}", format_yearly(&forecast.yearly));
    }

    if let Some(path) = yearly_csv {
        write_yearly(&forecast.yearly, create_output(path)?)?;
        info!("Yearly results written to {}", path.display());
    }

    if let Some(path) = table_csv {
        write_revenue_table(&forecast.table, create_output(path)?)?;
        info!("Revenue table written to {}", path.display());
    }

    Ok(())
}

fn run_fit(period: PeriodType, rates: &[f64], horizon: Option<u32>) -> Result<()> {
    let checkpoints = period.checkpoints();
    if rates.len() != checkpoints.len() {
        bail!("{} needs {} rates (checkpoints {:?}), got {}", period, checkpoints.len(), checkpoints, rates.len());
    }

    let curve = fit_period(period, rates).with_context(|| format!("Failed to fit {} curve", period))?;
    println!("{} curve: a = {:.6}, b = {:.6}", period, curve.a, curve.b);
    println!("{:>8} {:>10} {:>10}", "Period", "Observed", "Fitted");
    for (&p, &r) in checkpoints.iter().zip(rates) {
        println!("{:>8} {:>10.4} {:>10.4}", p, r, curve.evaluate(p));
    }

    if let Some(h) = horizon {
        let points = sample_curve(&curve, h as f64, h as usize);
        println!("\n{:>8} {:>10}", "Period", "Rate");
        for (p, r) in points {
            println!("{:>8.0} {:>10.4}", p, r);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Forecast { opts, table_csv, yearly_csv, json } => {
            let config = load_config(cli.config.as_ref(), opts)?;
            run_forecast(&config, table_csv.as_ref(), yearly_csv.as_ref(), *json)
        }
        Command::Fit { period, rates, horizon } => run_fit(*period, rates, *horizon),
        Command::Curves { opts, samples, output } => {
            let config = load_config(cli.config.as_ref(), opts)?;
            let runner = ForecastRunner::from_config(&config)?;
            let series = runner.curves(&config, *samples)?;
            match output {
                Some(path) => write_curves(&series, create_output(path)?)?,
                None => write_curves(&series, io::stdout().lock())?,
            }
            Ok(())
        }
    }
}
