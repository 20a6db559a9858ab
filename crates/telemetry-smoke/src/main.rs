use enginedash_client::{fetch_snapshot, DashboardConfig, PollError};
use enginedash_core::{endpoints, TELEMETRY_PATH};
use tokio::time::{timeout, Duration};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = DashboardConfig::from_env();
    let args = Args::parse(std::env::args().skip(1), &config);
    let url = endpoints::join(&args.base_url, TELEMETRY_PATH);
    eprintln!("Fetching {}", url);

    let http = match config.http_client() {
        Ok(http) => http,
        Err(e) => {
            eprintln!("HTTP client setup failed: {}", e);
            std::process::exit(1);
        }
    };

    // Wait up to 5s for one snapshot, then print and exit
    match timeout(Duration::from_secs(5), fetch_snapshot(&http, &url)).await {
        Ok(Ok(snapshot)) if args.json => match serde_json::to_string(&snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to encode snapshot: {}", e);
                std::process::exit(1);
            }
        },
        Ok(Ok(snapshot)) => {
            println!("Telemetry: {}", snapshot);
        }
        Ok(Err(PollError::Network(e))) => {
            eprintln!("Telemetry request failed: {}", e);
            std::process::exit(2);
        }
        Ok(Err(PollError::Http(status))) => {
            eprintln!("Telemetry endpoint answered HTTP {}", status);
            std::process::exit(3);
        }
        Ok(Err(PollError::Decode(e))) => {
            eprintln!("Telemetry body rejected: {}", e);
            std::process::exit(4);
        }
        Err(_) => {
            eprintln!("Timeout waiting for telemetry");
            std::process::exit(2);
        }
    }
}

struct Args {
    base_url: String,
    json: bool,
}

impl Args {
    // Usage: enginedash-telemetry-smoke [--json] [base-url]
    fn parse(args: impl IntoIterator<Item = String>, config: &DashboardConfig) -> Self {
        let mut base_url = None;
        let mut json = false;
        for arg in args {
            if arg == "--json" {
                json = true;
            } else if base_url.is_none() {
                base_url = Some(arg);
            }
        }
        Self { base_url: base_url.unwrap_or_else(|| config.base_url.clone()), json }
    }
}
