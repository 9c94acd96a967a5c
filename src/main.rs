mod cli;
mod config;
mod markdown;
mod ollama;
mod research;
mod tavily;

pub const USER_AGENT: &str = concat!("researcher/", env!("CARGO_PKG_VERSION"));

use std::io::IsTerminal;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tokio::io::BufReader;
use tracing::{debug, error, info, warn};

use cli::Args;
use config::Config;
use ollama::client::OllamaClient;
use research::{Pipeline, report};
use tavily::client::TavilyClient;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum redirect hops before aborting.
const MAX_REDIRECTS: usize = 5;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("researcher=info".parse()?),
        )
        .init();

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("ignoring unreadable .env: {e}"),
    }

    let args = Args::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    args.apply_to_config(&mut config);

    if args.inline_query().is_none() && std::io::stdin().is_terminal() {
        eprint!("Question: ");
    }
    let Some(query) = args.resolve_query(BufReader::new(tokio::io::stdin())).await? else {
        warn!("empty query, nothing to research");
        return Ok(ExitCode::from(2));
    };

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;
    let search = TavilyClient::new(http.clone(), &config);
    let generator = OllamaClient::new(http, &config);
    info!(model = %generator.model(), max_results = config.max_results, "backends ready");

    let pipeline = Pipeline::new(search, generator, args.settings(&config));
    match pipeline.run(query).await {
        Ok(output) => {
            println!("{}", report::render(&output, args.format)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("research failed: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
