//! memsave - deliver a memory to the first reachable memory server endpoint
//!
//! With no arguments, sends the built-in memory to the default localhost
//! endpoints. Flags override the payload, endpoints and timeout.

use anyhow::Result;
use clap::Parser;
use memsave::{
    config::MemsaveConfig, DeliveryReport, EndpointProber, HttpTransport, MemoryPayload,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "memsave")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Deliver a memory to the first reachable memory server endpoint")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MEMSAVE_CONFIG")]
    config: Option<PathBuf>,

    /// Memory text to save
    #[arg(short, long)]
    memory: Option<String>,

    /// Tag to attach (repeatable)
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// Endpoint to try, in order (repeatable)
    #[arg(short, long = "endpoint")]
    endpoints: Vec<String>,

    /// Per-attempt timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Exit non-zero when every endpoint fails
    #[arg(long)]
    fail_on_exhaustion: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("memsave={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => MemsaveConfig::from_file(path)?,
        None => MemsaveConfig::default(),
    };
    let config = apply_overrides(config, &cli);
    config.validate()?;

    if cli.print_config {
        println!("{}", config.to_toml_string()?);
        return Ok(ExitCode::SUCCESS);
    }

    let report = save_memory(&config).await;
    print_summary(&report);

    Ok(exit_code(&report, &config))
}

/// Total failure exits non-zero only when `fail_on_exhaustion` is set
fn exit_code(report: &DeliveryReport, config: &MemsaveConfig) -> ExitCode {
    if !report.is_success() && config.fail_on_exhaustion {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn apply_overrides(mut config: MemsaveConfig, cli: &Cli) -> MemsaveConfig {
    if !cli.endpoints.is_empty() {
        config.endpoints = cli.endpoints.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if cli.fail_on_exhaustion {
        config.fail_on_exhaustion = true;
    }

    if cli.memory.is_some() || !cli.tags.is_empty() {
        let base = config.payload();
        let payload = match &cli.memory {
            Some(text) => MemoryPayload::new(text.clone()).with_tags(cli.tags.clone()),
            None => base.with_tags(cli.tags.clone()),
        };
        config.memory = Some(payload);
    }

    config
}

async fn save_memory(config: &MemsaveConfig) -> DeliveryReport {
    let transport = match HttpTransport::new(config.attempt_timeout()) {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!("Error: {}", e);
            return DeliveryReport::default();
        }
    };

    let prober = EndpointProber::new(transport, config.attempt_timeout());
    prober
        .attempt_delivery(&config.payload(), &config.endpoints)
        .await
}

fn print_summary(report: &DeliveryReport) {
    match report.delivered() {
        Some((endpoint, body)) => {
            println!("Memory saved successfully via {}", endpoint);
            println!("Response: {}", body);
        }
        None => {
            println!(
                "Failed to save memory to any endpoint ({} attempted)",
                report.attempt_count()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memsave::{AttemptOutcome, AttemptRecord};

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("memsave").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_arguments_keeps_defaults() {
        let config = apply_overrides(MemsaveConfig::default(), &parse(&[]));
        assert_eq!(config.endpoints.len(), 6);
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.fail_on_exhaustion);
        assert_eq!(config.payload(), MemoryPayload::default());
    }

    #[test]
    fn test_memory_without_tags_has_empty_tags() {
        let config = apply_overrides(MemsaveConfig::default(), &parse(&["-m", "note"]));
        let payload = config.payload();
        assert_eq!(payload.memory, "note");
        assert!(payload.tags.is_empty());
    }

    #[test]
    fn test_tags_only_keep_default_memory() {
        let config = apply_overrides(
            MemsaveConfig::default(),
            &parse(&["--tag", "a", "--tag", "b"]),
        );
        let payload = config.payload();
        assert_eq!(payload.memory, MemoryPayload::default().memory);
        assert_eq!(payload.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_endpoint_overrides_preserve_order() {
        let cli = parse(&[
            "-e",
            "http://127.0.0.1:1/b",
            "-e",
            "http://127.0.0.1:1/a",
            "--timeout",
            "2",
            "--fail-on-exhaustion",
        ]);
        let config = apply_overrides(MemsaveConfig::default(), &cli);
        assert_eq!(
            config.endpoints,
            vec!["http://127.0.0.1:1/b", "http://127.0.0.1:1/a"]
        );
        assert_eq!(config.timeout_secs, 2);
        assert!(config.fail_on_exhaustion);
    }

    fn report_with(outcome: AttemptOutcome) -> DeliveryReport {
        DeliveryReport {
            attempts: vec![AttemptRecord {
                endpoint: "http://127.0.0.1:1/save".to_string(),
                outcome,
            }],
        }
    }

    fn strict_config(fail_on_exhaustion: bool) -> MemsaveConfig {
        MemsaveConfig {
            fail_on_exhaustion,
            ..Default::default()
        }
    }

    fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
        format!("{:?}", actual) == format!("{:?}", expected)
    }

    #[test]
    fn test_exhaustion_with_flag_exits_failure() {
        let report = report_with(AttemptOutcome::TimedOut);
        assert!(same_code(
            exit_code(&report, &strict_config(true)),
            ExitCode::FAILURE
        ));
        assert!(same_code(
            exit_code(&DeliveryReport::default(), &strict_config(true)),
            ExitCode::FAILURE
        ));
    }

    #[test]
    fn test_exhaustion_without_flag_exits_success() {
        let report = report_with(AttemptOutcome::Failed {
            reason: "connection refused".to_string(),
        });
        assert!(same_code(
            exit_code(&report, &strict_config(false)),
            ExitCode::SUCCESS
        ));
    }

    #[test]
    fn test_delivery_with_flag_exits_success() {
        let report = report_with(AttemptOutcome::Delivered {
            status: 200,
            body: "saved".to_string(),
        });
        assert!(same_code(
            exit_code(&report, &strict_config(true)),
            ExitCode::SUCCESS
        ));
    }

    #[test]
    fn test_zero_timeout_override_fails_validation() {
        let config = apply_overrides(MemsaveConfig::default(), &parse(&["--timeout", "0"]));
        assert!(config.validate().is_err());
    }
}
