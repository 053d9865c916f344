//! dial-probe: exercise upstream relays through circuit-breaking dialers.
//!
//! Dials a target repeatedly through one or more proxies and logs how each
//! upstream's circuit breaker reacts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use url::Url;

use proxy_dialer::config::loader::load_config;
use proxy_dialer::config::validation::validate_config;
use proxy_dialer::config::ProbeConfig;
use proxy_dialer::observability::logging;
use proxy_dialer::resilience::backoff::Backoff;
use proxy_dialer::{DialError, Dialer, LoadBalancedDialer, Network, TcpDialer};

#[derive(Parser)]
#[command(name = "dial-probe")]
#[command(about = "Dial a target through circuit-breaking upstream proxies", long_about = None)]
struct Cli {
    /// TOML configuration file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream proxy URL (repeatable).
    #[arg(short, long = "proxy")]
    proxies: Vec<String>,

    /// Target address (host:port).
    #[arg(short, long)]
    target: Option<String>,

    /// Network: tcp, tcp4 or tcp6.
    #[arg(short, long)]
    network: Option<String>,

    /// Number of dial attempts.
    #[arg(short, long)]
    attempts: Option<u32>,

    /// Delay between attempts in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Per-address connect timeout in milliseconds.
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Log level (overridden by RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProbeConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProbeConfig::default(),
        };

        if !self.proxies.is_empty() {
            config.proxies = self.proxies;
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(attempts) = self.attempts {
            config.attempts = attempts;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if let Some(connect_timeout_ms) = self.connect_timeout_ms {
            config.connect_timeout_ms = connect_timeout_ms;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }

        validate_config(&config).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })?;
        Ok(config)
    }
}

#[derive(Debug, Default)]
struct Summary {
    succeeded: u32,
    failed: u32,
    rejected: u32,
}

/// True when the last upstream tried refused the dial without any I/O.
fn is_rejection(e: &DialError) -> bool {
    match e {
        DialError::AllUpstreamsFailed { last, .. } => last.is_circuit_open(),
        other => other.is_circuit_open(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    logging::init(&config.log_level);

    tracing::info!("dial-probe v{} starting", env!("CARGO_PKG_VERSION"));

    let urls = config
        .proxies
        .iter()
        .map(|raw| Url::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let network: Network = config.network.parse()?;
    let transport = Arc::new(TcpDialer::new(Duration::from_millis(config.connect_timeout_ms)));
    let dialer = LoadBalancedDialer::from_urls(transport, &urls)?;

    tracing::info!(
        upstreams = dialer.len(),
        target = %config.target,
        %network,
        attempts = config.attempts,
        "Configuration loaded"
    );

    let interval = Duration::from_millis(config.interval_ms);
    let mut backoff = Backoff::new(Duration::from_millis(100), interval);
    let mut summary = Summary::default();

    for attempt in 1..=config.attempts {
        let delay = match dialer.dial(network, &config.target).await {
            Ok(_conn) => {
                summary.succeeded += 1;
                backoff.reset();
                tracing::info!(attempt, "Dial succeeded");
                interval
            }
            Err(e) => {
                if is_rejection(&e) {
                    summary.rejected += 1;
                } else {
                    summary.failed += 1;
                }
                tracing::warn!(attempt, error = %e, "Dial failed");
                backoff.next_delay()
            }
        };

        if attempt == config.attempts {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping probe");
                break;
            }
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        rejected = summary.rejected,
        "Probe complete"
    );
    Ok(())
}
