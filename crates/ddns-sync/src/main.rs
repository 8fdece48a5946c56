// # ddns-sync - one-shot DDNS synchronizer
//
// Meant to be started periodically (cron, systemd timer). Each run:
// 1. Reads settings from environment variables
// 2. Loads the record list from the config file
// 3. Discovers the public IPv4/IPv6 addresses
// 4. Compares them with the published A/AAAA records and updates mismatches
//
// This is a THIN integration layer: all reconciliation logic lives in
// ddns-core.
//
// ## Configuration
//
// - `DDNS_CONFIG`: Path to the record list (default: config.yaml)
// - `DDNS_IP_ECHO_URL`: IP-echo endpoint (default: https://ifconfig.co/json)
// - `DDNS_NAMESERVER`: Nameserver to read records from (default: ns1.he.net)
// - `DDNS_NAMESERVER_PORT`: Nameserver port (default: 53)
// - `DDNS_UPDATE_URL`: Update endpoint (default: https://dyn.dns.he.net/nic/update)
// - `DDNS_MISSING_RECORD`: `skip` or `publish` when no A/AAAA record exists (default: skip)
// - `DDNS_TIMEOUT_SECS`: Timeout for every network call (default: 10)
// - `DDNS_MODE`: `live` or `dry-run` (default: live)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: warn)
//
// ## Example
//
// ```bash
// # crontab: every 5 minutes
// */5 * * * * DDNS_CONFIG=/etc/ddns/config.yaml /usr/local/bin/ddns-sync
// ```
//
// ## Exit Codes
//
// - 0: Run completed (even if individual updates failed)
// - 1: Configuration error (environment or config file)
// - 2: Runtime could not be started

use anyhow::Result;
use ddns_core::{DdnsEngine, EngineConfig, MissingRecordPolicy};
use ddns_ip_http::HttpAddressSource;
use ddns_provider_he::HeProvider;
use ddns_resolver_hickory::{HickoryRecordResolver, ResolverSettings};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error (environment or config file)
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
struct Config {
    config_path: PathBuf,
    ip_echo_url: String,
    nameserver: String,
    nameserver_port: u16,
    update_url: String,
    missing_record: MissingRecordPolicy,
    timeout_secs: u64,
    dry_run: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from any variable source
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mode = var("DDNS_MODE").unwrap_or_else(|| "live".to_string());
        let dry_run = match mode.to_lowercase().as_str() {
            "live" => false,
            "dry-run" => true,
            _ => anyhow::bail!("DDNS_MODE '{}' is not valid. Valid modes: live, dry-run", mode),
        };

        let nameserver_port = match var("DDNS_NAMESERVER_PORT") {
            Some(s) => s
                .parse()
                .map_err(|_| anyhow::anyhow!("DDNS_NAMESERVER_PORT must be a port number. Got: {}", s))?,
            None => ddns_resolver_hickory::DEFAULT_DNS_PORT,
        };

        let timeout_secs = match var("DDNS_TIMEOUT_SECS") {
            Some(s) => s
                .parse()
                .map_err(|_| anyhow::anyhow!("DDNS_TIMEOUT_SECS must be a number of seconds. Got: {}", s))?,
            None => 10,
        };

        let missing_record = match var("DDNS_MISSING_RECORD") {
            Some(s) => s.parse()?,
            None => MissingRecordPolicy::default(),
        };

        Ok(Self {
            config_path: PathBuf::from(var("DDNS_CONFIG").unwrap_or_else(|| "config.yaml".to_string())),
            ip_echo_url: var("DDNS_IP_ECHO_URL")
                .unwrap_or_else(|| ddns_ip_http::DEFAULT_IP_ECHO_URL.to_string()),
            nameserver: var("DDNS_NAMESERVER")
                .unwrap_or_else(|| ddns_resolver_hickory::DEFAULT_NAMESERVER.to_string()),
            nameserver_port,
            update_url: var("DDNS_UPDATE_URL")
                .unwrap_or_else(|| ddns_provider_he::HE_UPDATE_URL.to_string()),
            missing_record,
            timeout_secs,
            dry_run,
            log_level: var("DDNS_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.config_path.as_os_str().is_empty() {
            anyhow::bail!("DDNS_CONFIG cannot be empty");
        }

        validate_url("DDNS_IP_ECHO_URL", &self.ip_echo_url)?;
        validate_url("DDNS_UPDATE_URL", &self.update_url)?;

        if self.nameserver.trim().is_empty() {
            anyhow::bail!("DDNS_NAMESERVER cannot be empty");
        }

        if self.nameserver_port == 0 {
            anyhow::bail!("DDNS_NAMESERVER_PORT cannot be 0");
        }

        if !(1..=120).contains(&self.timeout_secs) {
            anyhow::bail!(
                "DDNS_TIMEOUT_SECS must be between 1 and 120 seconds. Got: {}",
                self.timeout_secs
            );
        }

        parse_log_level(&self.log_level)?;

        Ok(())
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn validate_url(name: &str, url: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        anyhow::bail!("{} must use HTTP or HTTPS scheme. Got: {}", name, url);
    }
    Ok(())
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Initialize tracing (diagnostics go to stderr)
    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    if let Err(e) = config.validate() {
        warn!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Single-threaded: every network call is awaited in sequence
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            warn!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(config)).into()
}

/// Assemble the engine from configuration
fn build_engine(config: &Config) -> Result<DdnsEngine> {
    let source = HttpAddressSource::new(config.ip_echo_url.clone(), config.timeout())?;

    let resolver = HickoryRecordResolver::new(
        ResolverSettings::new(config.nameserver.clone())
            .with_port(config.nameserver_port)
            .with_timeout(config.timeout()),
    );

    let provider = HeProvider::new(config.update_url.clone(), config.timeout(), config.dry_run)?;
    if config.dry_run {
        warn!("Running in DRY-RUN mode - no records will be changed");
    }

    Ok(DdnsEngine::new(
        Box::new(source),
        Box::new(resolver),
        Box::new(provider),
        EngineConfig {
            missing_record: config.missing_record,
        },
    ))
}

/// One synchronization run
async fn run(config: Config) -> DdnsExitCode {
    debug!("Using config file {}", config.config_path.display());

    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            warn!("Failed to initialize: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    match engine.run_with_config_file(&config.config_path).await {
        Ok(report) => {
            info!(
                "{} outcome(s), {} update(s) sent, {} failed",
                report.outcomes.len(),
                report.attempted(),
                report.failed()
            );
            DdnsExitCode::Success
        }
        Err(e) => {
            warn!("{}", e);
            DdnsExitCode::ConfigError
        }
    }
}
