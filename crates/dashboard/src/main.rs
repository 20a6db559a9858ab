use anyhow::Context;
use dotenvy::dotenv;
use enginedash_client::{CommandDispatcher, CommandTransport, DashboardConfig, Delivery, TelemetryPoller};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod console;

use console::{parse_input, ConsoleReadout, ConsoleView, Input, HELP};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = DashboardConfig::from_env();
    config.validate().context("invalid dashboard configuration")?;
    info!(
        base_url = %config.base_url,
        transport = ?config.transport,
        delivery = ?config.delivery,
        "Configuring dashboard"
    );

    let poller = TelemetryPoller::from_config(&config).context("failed to set up telemetry poller")?;
    let poll = poller.start(ConsoleView::new());

    let transport = CommandTransport::from_config(&config)
        .await
        .context("failed to set up command transport")?;
    let mut dispatcher = CommandDispatcher::new(transport, config.delivery, ConsoleReadout);

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else { break };
                match parse_input(&line) {
                    Ok(Some(Input::Control(control))) => {
                        if let Err(err) = dispatcher.handle(control).await {
                            // Only reachable with acknowledged delivery
                            eprintln!("command failed: {}", err);
                        }
                    }
                    Ok(Some(Input::Help)) => println!("{}", HELP),
                    Ok(Some(Input::Quit)) => break,
                    Ok(None) => {}
                    Err(msg) => eprintln!("{}", msg),
                }
            }
        }
    }

    if dispatcher.delivery() == Delivery::BestEffort {
        // Give detached sends a moment to leave before the runtime goes away
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    poll.stop();
    info!("Dashboard stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,hyper=warn,reqwest=warn,tungstenite=warn"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(?err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                tracing::warn!(?err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
