// Configuration management for RouterOS BGP View
// Supports CLI arguments, config file (TOML), and environment variables

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;

use crate::routeros::RouterTarget;
use crate::snapshot::commands::CommandSet;
use crate::snapshot::filter::PeerFilter;

/// RouterOS BGP View - show a router's identity, prefixes and BGP peers
#[derive(Parser, Debug, Clone)]
#[command(name = "routeros-bgp-view")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// HTTP listen address
    #[arg(short, long, env = "BGPVIEW_LISTEN_ADDRESS")]
    pub listen_address: Option<String>,

    /// Listener serving only /healthcheck
    #[arg(long, env = "BGPVIEW_HEALTHCHECK_ADDRESS")]
    pub healthcheck_address: Option<String>,

    /// Listener serving only Prometheus /metrics
    #[arg(long, env = "BGPVIEW_METRICS_ADDRESS")]
    pub metrics_address: Option<String>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, env = "BGPVIEW_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Path to configuration file
    #[arg(short, long, env = "BGPVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Router API address (host or host:port)
    #[arg(long, env = "BGPVIEW_ROUTER_ADDRESS")]
    pub router_address: Option<String>,

    /// Router API username
    #[arg(long, env = "BGPVIEW_ROUTER_USERNAME")]
    pub router_username: Option<String>,

    /// Router API password
    #[arg(long, env = "BGPVIEW_ROUTER_PASSWORD", hide_env_values = true)]
    pub router_password: Option<String>,

    /// Local AS number used to hide iBGP peers
    #[arg(long, env = "BGPVIEW_ASN")]
    pub asn: Option<u32>,

    /// RouterOS command set
    #[arg(long, value_enum, env = "BGPVIEW_COMMAND_SET")]
    pub command_set: Option<CommandSet>,

    /// Which peers to show
    #[arg(long, value_enum, env = "BGPVIEW_PEER_FILTER")]
    pub peer_filter: Option<PeerFilter>,

    /// Address list holding announced prefixes (v7 command set)
    #[arg(long, env = "BGPVIEW_ADDRESS_LIST")]
    pub address_list: Option<String>,
}

/// Configuration file structure (TOML format)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Router target and query settings
    #[serde(default)]
    pub router: RouterConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default = "default_healthcheck_address")]
    pub healthcheck_address: String,

    #[serde(default = "default_metrics_address")]
    pub metrics_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouterConfig {
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub asn: Option<u32>,

    #[serde(default)]
    pub command_set: CommandSet,

    #[serde(default)]
    pub peer_filter: PeerFilter,

    pub address_list: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_listen_address() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_healthcheck_address() -> String {
    "0.0.0.0:10240".to_string()
}
fn default_metrics_address() -> String {
    "0.0.0.0:10241".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_address: default_listen_address(),
            healthcheck_address: default_healthcheck_address(),
            metrics_address: default_metrics_address(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

/// Merged configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_address: String,
    pub healthcheck_address: String,
    pub metrics_address: String,
    pub log_level: Level,
    pub router: RouterTarget,
    pub asn: Option<u32>,
    pub command_set: CommandSet,
    pub peer_filter: PeerFilter,
    pub address_list: Option<String>,
}

impl Config {
    /// Load configuration from all sources (CLI args, config file, defaults)
    /// Priority: CLI args / environment > Config file > Defaults
    pub fn load() -> anyhow::Result<Self> {
        let cli_args = CliArgs::parse();

        // Load config file if specified
        let config_file = if let Some(config_path) = &cli_args.config {
            let config_content = std::fs::read_to_string(config_path)?;
            toml::from_str::<ConfigFile>(&config_content)?
        } else {
            // Try loading from default locations
            let default_paths = vec![
                PathBuf::from("config.toml"),
                PathBuf::from("routeros-bgp-view.toml"),
            ];

            let mut loaded_config = None;
            for path in default_paths {
                if path.exists() {
                    let config_content = std::fs::read_to_string(&path)?;
                    loaded_config = Some(toml::from_str::<ConfigFile>(&config_content)?);
                    break;
                }
            }

            loaded_config.unwrap_or_default()
        };

        Self::merge(cli_args, config_file)
    }

    /// CLI values override the config file
    pub fn merge(cli_args: CliArgs, config_file: ConfigFile) -> anyhow::Result<Self> {
        let router = config_file.router;

        let log_level = parse_log_level(
            cli_args
                .log_level
                .as_deref()
                .unwrap_or(&config_file.logging.level),
        )?;

        let address = required(cli_args.router_address.or(router.address), "router address")?;
        let username = required(cli_args.router_username.or(router.username), "router username")?;
        let password = required(cli_args.router_password.or(router.password), "router password")?;

        Ok(Config {
            listen_address: cli_args
                .listen_address
                .unwrap_or(config_file.server.listen_address),
            healthcheck_address: cli_args
                .healthcheck_address
                .unwrap_or(config_file.server.healthcheck_address),
            metrics_address: cli_args
                .metrics_address
                .unwrap_or(config_file.server.metrics_address),
            log_level,
            router: RouterTarget {
                address,
                username,
                password,
            },
            asn: cli_args.asn.or(router.asn),
            command_set: cli_args.command_set.unwrap_or(router.command_set),
            peer_filter: cli_args.peer_filter.unwrap_or(router.peer_filter),
            address_list: cli_args.address_list.or(router.address_list),
        })
    }
}

fn required(value: Option<String>, name: &str) -> anyhow::Result<String> {
    value.ok_or_else(|| anyhow::anyhow!("Missing required setting: {}", name))
}

fn parse_log_level(level_str: &str) -> anyhow::Result<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => Err(anyhow::anyhow!("Invalid log level: {}", level_str)),
    }
}
