use anyhow::{bail, Context, Result};
use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use readyrs::client::IntervalsClient;
use readyrs::config::AppConfig;
use readyrs::credentials::{Credentials, CredentialsProvider, FileCredentialStore};
use readyrs::display;
use readyrs::error::{ApiError, ReadyRsError};
use readyrs::form::FormCalculator;
use readyrs::format::parse_date;
use readyrs::logging::{init_logging, LogLevel};
use readyrs::readiness::ReadinessCalculator;
use readyrs::trends::metric_trends_for;

/// readyrs - Training readiness from intervals.icu wellness data
///
/// Scores daily readiness from HRV, resting heart rate and sleep against
/// rolling baselines, and classifies form (CTL - ATL) into training zones.
#[derive(Parser)]
#[command(name = "readyrs")]
#[command(version)]
#[command(about = "Training readiness and form from intervals.icu", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store intervals.icu credentials and verify them
    Connect {
        /// API key from intervals.icu settings
        #[arg(long)]
        api_key: String,

        /// Athlete ID (e.g. i12345)
        #[arg(long)]
        athlete_id: String,
    },

    /// Remove stored credentials
    Disconnect,

    /// Show connection status
    Status,

    /// Today's readiness score with breakdown
    Readiness {
        /// Oldest day fetched (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        oldest: Option<NaiveDate>,

        /// Newest day fetched (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date)]
        newest: Option<NaiveDate>,
    },

    /// Current form (CTL - ATL) and trend
    Form {
        /// Oldest day fetched (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        oldest: Option<NaiveDate>,

        /// Newest day fetched (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date)]
        newest: Option<NaiveDate>,
    },

    /// Readiness, form and the latest activity at a glance
    Dashboard,

    /// HRV, resting HR and sleep trends
    Wellness {
        /// Number of days to show
        #[arg(short, long, default_value = "30")]
        days: u32,

        /// Draw a bar chart for each metric
        #[arg(long)]
        chart: bool,
    },

    /// Recent activities
    Activities {
        /// Number of activities to show (default from config)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (KEY=VALUE)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,

        /// Write a default config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ReadyRsError>() {
                Some(app_err) => {
                    tracing::error!(error = %app_err, severity = ?app_err.severity(), "Command failed");
                    eprintln!("{} {}", "Error:".red().bold(), app_err.user_message());
                }
                None => eprintln!("{} {:#}", "Error:".red().bold(), err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default(Some(&config_path))?;

    let mut log_config = config.logging.clone();
    log_config.level = LogLevel::from_verbosity(log_config.level, cli.verbose);
    init_logging(&log_config)?;

    tracing::debug!(config = %config_path.display(), "Configuration loaded");

    let mut store = FileCredentialStore::new(config.credentials_path());

    match cli.command {
        Commands::Connect { api_key, athlete_id } => {
            let credentials = Credentials::new(api_key.trim(), athlete_id.trim());
            if !credentials.is_complete() {
                bail!("API key and athlete ID must not be empty");
            }

            let client = IntervalsClient::new(&config.api, credentials.clone())
                .map_err(ReadyRsError::from)?;
            store.set(credentials).map_err(ReadyRsError::from)?;
            println!("{} {}", "✓ Credentials saved to".green(), store.path().display());

            let valid = with_spinner(cli.json, "Verifying credentials...", client.test_credentials())
                .await
                .map_err(ReadyRsError::from)?;
            if valid {
                println!("{}", "✓ Connected to intervals.icu".green().bold());
            } else {
                println!(
                    "{}",
                    "⚠ intervals.icu rejected these credentials; check the API key and athlete ID"
                        .yellow()
                );
            }
        }

        Commands::Disconnect => {
            store.clear().map_err(ReadyRsError::from)?;
            println!("{}", "✓ Disconnected from intervals.icu".green());
        }

        Commands::Status => {
            let (credentials, source) = match Credentials::from_env() {
                Some(credentials) => (Some(credentials), "environment".to_string()),
                None => (
                    store.get().map_err(ReadyRsError::from)?,
                    store.path().display().to_string(),
                ),
            };

            let Some(credentials) = credentials else {
                println!("{}", "Not connected".yellow().bold());
                println!("  Run `readyrs connect --api-key <KEY> --athlete-id <ID>`");
                return Ok(());
            };

            let client =
                IntervalsClient::new(&config.api, credentials.clone()).map_err(ReadyRsError::from)?;
            let valid = with_spinner(cli.json, "Checking credentials...", client.test_credentials())
                .await
                .map_err(ReadyRsError::from)?;

            if cli.json {
                print_json(&serde_json::json!({
                    "connected": true,
                    "source": source,
                    "athlete_id": credentials.athlete_id,
                    "api_key": credentials.masked_api_key(),
                    "valid": valid,
                }))?;
            } else {
                println!("{}", "Connected".green().bold());
                println!("  Source:     {}", source);
                println!("  Athlete ID: {}", credentials.athlete_id);
                println!("  API key:    {}", credentials.masked_api_key());
                if valid {
                    println!("  Status:     {}", "valid".green());
                } else {
                    println!("  Status:     {}", "rejected by intervals.icu".red());
                }
            }
        }

        Commands::Readiness { oldest, newest } => {
            let client = connect(&config, &store)?;
            let records = with_spinner(cli.json, "Fetching wellness data...", client.get_wellness(oldest, newest))
                .await
                .map_err(ReadyRsError::from)?;

            let result = ReadinessCalculator::with_config(config.readiness.clone()).calculate(&records);

            if cli.json {
                print_json(&result)?;
            } else {
                println!("{}", display::readiness_card(&result));
                println!();
                println!("{}", display::readiness_breakdown(&result, &config.readiness));
            }
        }

        Commands::Form { oldest, newest } => {
            let client = connect(&config, &store)?;
            let records = with_spinner(cli.json, "Fetching wellness data...", client.get_wellness(oldest, newest))
                .await
                .map_err(ReadyRsError::from)?;

            let result = FormCalculator::with_config(config.form.clone()).calculate(&records);

            if cli.json {
                print_json(&result)?;
            } else {
                println!("{}", display::form_card(&result));
                println!();
                println!("{}", display::form_trend_table(&result.trend));
            }
        }

        Commands::Dashboard => {
            let client = connect(&config, &store)?;
            let (records, activity) = with_spinner(cli.json, "Fetching dashboard...", async {
                tokio::try_join!(client.get_wellness(None, None), client.get_most_recent_activity())
            })
            .await
            .map_err(ReadyRsError::from)?;

            let readiness = ReadinessCalculator::with_config(config.readiness.clone()).calculate(&records);
            let form = FormCalculator::with_config(config.form.clone()).calculate(&records);

            if cli.json {
                print_json(&serde_json::json!({
                    "readiness": readiness,
                    "form": form,
                    "latest_activity": activity,
                }))?;
            } else {
                println!("{}", display::readiness_card(&readiness));
                println!();
                println!("{}", display::form_card(&form));
                println!();
                println!("{}", "Latest activity".bold());
                let activities: Vec<_> = activity.into_iter().collect();
                println!("{}", display::activities_table(&activities));
            }
        }

        Commands::Wellness { days, chart } => {
            if days == 0 {
                bail!("--days must be at least 1");
            }
            let client = connect(&config, &store)?;
            let today = Utc::now().date_naive();
            let oldest = today.checked_sub_days(Days::new(days as u64)).unwrap_or(today);

            let records = with_spinner(cli.json, "Fetching wellness data...", client.get_wellness(Some(oldest), Some(today)))
                .await
                .map_err(ReadyRsError::from)?;

            let trends = metric_trends_for(&records, days as usize);

            if cli.json {
                print_json(&serde_json::json!({
                    "trends": trends,
                    "latest": records.last(),
                }))?;
            } else {
                println!("{}", format!("Wellness - last {} days", days).bold());
                println!("{}", display::wellness_trends_table(&trends));

                if chart {
                    for (title, series) in [
                        ("HRV (ms)", &trends.hrv),
                        ("Resting HR (bpm)", &trends.resting_hr),
                        ("Sleep (hrs)", &trends.sleep_hours),
                    ] {
                        println!();
                        println!("{}", title.bold());
                        println!("{}", display::sparkline(series, 30));
                    }
                }

                if let Some(latest) = records.last() {
                    println!();
                    println!("{}", "Latest record".bold());
                    println!("{}", display::wellness_record_table(latest));
                }
            }
        }

        Commands::Activities { limit } => {
            let client = connect(&config, &store)?;
            let limit = limit.unwrap_or(config.api.default_activity_limit);
            let activities = with_spinner(cli.json, "Fetching activities...", client.get_recent_activities(limit))
                .await
                .map_err(ReadyRsError::from)?;

            if cli.json {
                print_json(&activities)?;
            } else {
                println!("{}", display::activities_table(&activities));
            }
        }

        Commands::Config { list, set, get, init } => {
            if init {
                if config_path.exists() {
                    bail!("Config file already exists: {}", config_path.display());
                }
                AppConfig::default().save_to_file(&config_path)?;
                println!("{} {}", "✓ Wrote default config to".green(), config_path.display());
            } else if list {
                for (key, value) in config.list()? {
                    println!("{} = {}", key.cyan(), value);
                }
            } else if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .context("Expected KEY=VALUE, e.g. readiness.hrv_weight=0.6")?;
                config.set(key.trim(), value.trim())?;
                config.save_to_file(&config_path)?;
                println!("{} {} = {}", "✓ Set".green(), key.trim(), value.trim());
            } else if let Some(key) = get {
                match config.get(&key)? {
                    Some(value) => println!("{}", value),
                    None => bail!("Unknown configuration key: {}", key),
                }
            } else {
                println!("Config file: {}", config_path.display());
                println!("Use --list, --get KEY, --set KEY=VALUE or --init");
            }
        }
    }

    Ok(())
}

/// Client from environment credentials, falling back to the stored file
fn connect(config: &AppConfig, store: &FileCredentialStore) -> Result<IntervalsClient> {
    if let Some(credentials) = Credentials::from_env() {
        tracing::debug!(athlete_id = %credentials.athlete_id, "Using credentials from environment");
        return Ok(IntervalsClient::new(&config.api, credentials).map_err(ReadyRsError::from)?);
    }

    let client = IntervalsClient::from_provider(&config.api, store)?;
    Ok(client)
}

/// Await a request behind a spinner on stderr
async fn with_spinner<T>(
    quiet: bool,
    message: &'static str,
    request: impl Future<Output = std::result::Result<T, ApiError>>,
) -> std::result::Result<T, ApiError> {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = request.await;
    pb.finish_and_clear();
    result
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
