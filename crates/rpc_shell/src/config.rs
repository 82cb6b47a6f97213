//! Command-line flags and the `~/.rpcshrc` file.
//!
//! The rc file is TOML with one table per named configuration:
//!
//! ```toml
//! [staging]
//! manifest = "/etc/rpcsh/greeter.json"
//! ip = "10.0.0.12"
//! port = 8443
//! service = "Greeter"
//! insecure = false
//! ```
//!
//! Flags given on the command line override the selected section.

use std::collections::BTreeMap;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use clap::{Parser, ValueEnum};
use regex::Regex;
use replterm::config::DEFAULT_TAB_WIDTH;
use serde::Deserialize;
use thiserror::Error;

pub const RC_FILE_NAME: &str = ".rpcshrc";

fn port_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"^[0-9]{1,5}$").expect("port regex must compile"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// In-process echo service.
    Mock,
    /// JSON over HTTP, described by a manifest.
    Http,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "rpcsh",
    version,
    about = "Interactive shell for calling methods on a JSON RPC service"
)]
pub struct Args {
    /// Named section of the rc file to start from.
    #[arg(value_name = "CONFIG")]
    pub config: Option<String>,

    #[arg(long, value_enum, env = "RPCSH_SERVICE_KIND")]
    pub service_kind: Option<ServiceKind>,

    /// Service manifest (JSON).
    #[arg(short = 'f', long, value_name = "FILE", env = "RPCSH_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[arg(short = 'i', long, env = "RPCSH_IP")]
    pub ip: Option<String>,

    #[arg(short = 'p', long, env = "RPCSH_PORT")]
    pub port: Option<String>,

    /// Service to use when the manifest declares several.
    #[arg(short = 's', long, env = "RPCSH_SERVICE")]
    pub service: Option<String>,

    /// Use plain HTTP instead of TLS.
    #[arg(long)]
    pub insecure: bool,

    #[arg(long, value_name = "PATH", env = "RPCSH_HISTORY_FILE")]
    pub history_file: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_TAB_WIDTH)]
    pub tab_width: usize,

    /// Write logs to this file; nothing is logged otherwise.
    #[arg(long, value_name = "PATH", env = "RPCSH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// rc file to read instead of `~/.rpcshrc`.
    #[arg(long, value_name = "PATH", env = "RPCSH_RC")]
    pub rc_file: Option<PathBuf>,
}

/// One rc file section. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RcSection {
    pub kind: Option<ServiceKind>,
    pub manifest: Option<PathBuf>,
    pub ip: Option<String>,
    pub port: Option<PortSetting>,
    pub service: Option<String>,
    pub insecure: Option<bool>,
}

/// Ports may be written as numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortSetting {
    Number(i64),
    Text(String),
}

impl PortSetting {
    fn into_text(self) -> String {
        match self {
            Self::Number(port) => port.to_string(),
            Self::Text(port) => port,
        }
    }
}

pub type RcFile = BTreeMap<String, RcSection>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    RcRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    RcParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no rc file found for section `{section}`; set HOME or pass --rc-file")]
    NoRcFile { section: String },
    #[error("Section `{section}` not found in {path}")]
    MissingSection { section: String, path: PathBuf },
    #[error("Please provide a valid IP address (got `{0}`)")]
    InvalidIp(String),
    #[error("Please provide a valid port (got `{0}`)")]
    InvalidPort(String),
    #[error("Please provide {0} for an http service")]
    Missing(&'static str),
    #[error("manifest {0} does not exist")]
    ManifestNotFound(PathBuf),
}

/// Where and how to reach the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Mock,
    Http {
        manifest: PathBuf,
        ip: IpAddr,
        port: u16,
        tls: bool,
        service: Option<String>,
    },
}

/// The rc section a run started from, for the startup notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcSource {
    pub section: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSettings {
    pub target: Target,
    pub history_file: Option<PathBuf>,
    pub tab_width: usize,
    pub log_file: Option<PathBuf>,
    pub rc_source: Option<RcSource>,
}

pub fn default_rc_path() -> Option<PathBuf> {
    history_store::home_dir().map(|home| home.join(RC_FILE_NAME))
}

pub fn load_rc(path: &Path) -> Result<RcFile, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::RcRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::RcParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merges flags over the selected rc section and validates the result.
pub fn resolve(args: Args) -> Result<ShellSettings, ConfigError> {
    let (section, rc_source) = match args.config.as_deref() {
        Some(name) => {
            let path = match args.rc_file.clone().or_else(default_rc_path) {
                Some(path) => path,
                None => {
                    return Err(ConfigError::NoRcFile {
                        section: name.to_string(),
                    })
                }
            };
            let mut rc = load_rc(&path)?;
            let section = rc
                .remove(name)
                .ok_or_else(|| ConfigError::MissingSection {
                    section: name.to_string(),
                    path: path.clone(),
                })?;
            (
                section,
                Some(RcSource {
                    section: name.to_string(),
                    path,
                }),
            )
        }
        None => (RcSection::default(), None),
    };

    let manifest = args.manifest.or(section.manifest);
    let kind = args.service_kind.or(section.kind).unwrap_or(if manifest.is_some() {
        ServiceKind::Http
    } else {
        ServiceKind::Mock
    });

    let target = match kind {
        ServiceKind::Mock => Target::Mock,
        ServiceKind::Http => {
            let manifest = manifest.ok_or(ConfigError::Missing("a manifest"))?;
            if !manifest.is_file() {
                return Err(ConfigError::ManifestNotFound(manifest));
            }
            let ip = args
                .ip
                .or(section.ip)
                .ok_or(ConfigError::Missing("an IP address"))?;
            let port = args
                .port
                .or_else(|| section.port.map(PortSetting::into_text))
                .ok_or(ConfigError::Missing("a port"))?;
            Target::Http {
                manifest,
                ip: parse_ip(&ip)?,
                port: parse_port(&port)?,
                tls: !(args.insecure || section.insecure.unwrap_or(false)),
                service: args.service.or(section.service),
            }
        }
    };

    Ok(ShellSettings {
        target,
        history_file: args.history_file,
        tab_width: args.tab_width,
        log_file: args.log_file,
        rc_source,
    })
}

/// Accepts IPv4 and IPv6 literals only; host names are rejected.
pub fn parse_ip(value: &str) -> Result<IpAddr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidIp(value.to_string()))
}

/// One to five ASCII digits that fit in a `u16`.
pub fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let trimmed = value.trim();
    if !port_regex().is_match(trimmed) {
        return Err(ConfigError::InvalidPort(value.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| ConfigError::InvalidPort(value.to_string()))
}
