use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "privops",
    version,
    about = "Masking and outbound authentication strategies for privacy requests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP masking service.
    Serve(ServeOpts),
    /// Mask values with a strategy and print the result as JSON.
    Mask(MaskOpts),
    /// List masking strategies and their configuration schemas.
    Strategies(StrategiesOpts),
    /// Apply an authentication strategy to a request and print it as JSON.
    Authenticate(AuthenticateOpts),
    Config(ConfigOpts),
    Version,
}

#[derive(clap::Args)]
pub struct ServeOpts {
    #[arg(short, long)]
    pub config: Option<String>,
    #[arg(short, long)]
    pub port: Option<u16>,
    #[arg(short, long)]
    pub bind: Option<String>,
}

#[derive(clap::Args)]
pub struct MaskOpts {
    #[arg(short, long)]
    pub config: Option<String>,
    /// Strategy key, e.g. `hash`.
    #[arg(short, long)]
    pub strategy: String,
    /// Strategy configuration as a JSON object.
    #[arg(long, default_value = "{}")]
    pub configuration: String,
    /// Values as a JSON array of strings and nulls.
    #[arg(long, conflicts_with = "inputs")]
    pub values: Option<String>,
    /// Values given as plain arguments.
    #[arg(value_name = "VALUE")]
    pub inputs: Vec<String>,
}

#[derive(clap::Args)]
pub struct StrategiesOpts {
    /// List authentication strategies instead.
    #[arg(long)]
    pub authentication: bool,
}

#[derive(clap::Args)]
pub struct AuthenticateOpts {
    /// Strategy key, e.g. `bearer`.
    #[arg(short, long)]
    pub strategy: String,
    /// Strategy configuration as a JSON object.
    #[arg(long)]
    pub configuration: String,
    /// Connection secrets as a JSON object, or `@path` to read them from a file.
    #[arg(long, env = "PRIVOPS_CONNECTION_SECRETS", hide_env_values = true)]
    pub secrets: String,
    #[arg(long)]
    pub url: String,
    #[arg(long, default_value = "GET")]
    pub method: String,
}

#[derive(clap::Args)]
pub struct ConfigOpts {
    #[arg(short, long)]
    pub config: Option<String>,
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Validate,
    Init,
}
