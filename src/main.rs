use clap::Parser;
use forecast_lake::{EtlConfig, ExtractionStrategy, Pipeline, DEFAULT_BASE_URL};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// AccuWeather API key
    #[arg(long, env = "ACCU_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Cities to extract, comma separated (e.g. Lima,Quito). Defaults to the South American capitals.
    #[arg(long, value_delimiter = ',')]
    cities: Vec<String>,

    /// Root directory of the bronze and silver datasets
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for the watermark file and the city detail snapshot (defaults to a `metadata` sibling of the data dir)
    #[arg(long)]
    metadata_dir: Option<PathBuf>,

    /// Base URL of the weather service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Admit every fetched forecast, even when it is not newer than the last extracted date
    #[arg(long, default_value_t = false)]
    full_refresh: bool,

    /// Only run the bronze stages
    #[arg(long, default_value_t = false)]
    skip_silver: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args = Args::parse();

    let config = match EtlConfig::builder()
        .maybe_api_key(args.api_key)
        .maybe_cities((!args.cities.is_empty()).then_some(args.cities))
        .maybe_data_dir(args.data_dir)
        .maybe_metadata_dir(args.metadata_dir)
        .base_url(args.base_url)
        .timeout(Duration::from_secs(args.timeout_secs))
        .maybe_forecast_strategy(args.full_refresh.then_some(ExtractionStrategy::FullRefresh))
        .skip_silver(args.skip_silver)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Data dir: {} | Metadata dir: {}",
        config.data_dir.display(),
        config.metadata_dir.display()
    );

    let pipeline = match Pipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Setup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match pipeline.run().await {
        Ok(report) => {
            info!("{}", report.to_string().trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
