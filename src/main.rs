use anyhow::{Context, Result};
use clap::Parser;
use privops::authentication::OutboundRequest;
use privops::catalog;
use privops::cli::{AuthenticateOpts, Cli, Commands, ConfigAction, MaskOpts};
use privops::config::{validate_config_object, Config, DEFAULT_CONFIG_FILE};
use privops::logging;
use privops::placeholders::ConnectionSecrets;
use privops::server::MaskingServer;
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Serve(opts) => opts.config.clone(),
        Commands::Mask(opts) => opts.config.clone(),
        Commands::Config(opts) => opts.config.clone(),
        _ => None,
    };
    let config = Config::load(config_path.as_deref())?;
    logging::init(&config.logging);

    match cli.command {
        Commands::Serve(opts) => {
            validate_config_object(&config)?;
            info!("Starting privops masking server");
            let server = MaskingServer::start(config, &opts)?;
            server.run_until_shutdown().await?;
        }
        Commands::Mask(opts) => {
            let result = run_mask(&config, &opts)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Strategies(opts) => {
            let catalog = catalog::init(&config.masking)?;
            let strategies = if opts.authentication {
                catalog.list_authentication_strategies()
            } else {
                catalog::list_masking_strategies()?
            };
            println!("{}", serde_json::to_string_pretty(&strategies)?);
        }
        Commands::Authenticate(opts) => {
            let request = run_authenticate(&config, &opts)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Commands::Config(opts) => match opts.action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::Validate => {
                validate_config_object(&config)?;
                info!("Configuration is valid");
            }
            ConfigAction::Init => {
                let path = opts.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE);
                Config::write_default(path)?;
                info!("Configuration file created at {path}");
            }
        },
        Commands::Version => {
            println!("privops {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn run_mask(config: &Config, opts: &MaskOpts) -> Result<privops::masking::MaskingResult> {
    let configuration: Value =
        serde_json::from_str(&opts.configuration).context("--configuration is not valid JSON")?;
    let values: Vec<Value> = match &opts.values {
        Some(raw) => serde_json::from_str(raw).context("--values must be a JSON array")?,
        None => opts.inputs.iter().cloned().map(Value::String).collect(),
    };

    catalog::init(&config.masking)?;
    Ok(catalog::mask(&opts.strategy, &configuration, &values)?)
}

fn run_authenticate(config: &Config, opts: &AuthenticateOpts) -> Result<OutboundRequest> {
    let configuration: Value =
        serde_json::from_str(&opts.configuration).context("--configuration is not valid JSON")?;

    let raw_secrets = match opts.secrets.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read secrets file '{path}'"))?,
        None => opts.secrets.clone(),
    };
    let secrets: ConnectionSecrets =
        serde_json::from_str(&raw_secrets).context("--secrets must be a JSON object of strings")?;

    catalog::init(&config.masking)?;
    let request = OutboundRequest::new(opts.method.to_uppercase(), opts.url.clone());
    Ok(catalog::authenticate(
        &opts.strategy,
        &configuration,
        request,
        &secrets,
    )?)
}
