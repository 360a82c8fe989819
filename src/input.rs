//! Provides a means to read, parse and hold configuration options for scans.
use crate::output::{OutputLayout, ReportNaming, DEFAULT_HOSTS_DIR, DEFAULT_REPORTS_DIR};
use crate::templates::{TemplateConfig, Templates};
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde_derive::Deserialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;

macro_rules! merge_optional {
    ($opts: ident, $config: ident, $($field: ident),+) => {
        $(
            if $opts.$field.is_none() {
                $opts.$field = $config.$field.clone();
            }
        )+
    }
}

/// Transport protocol of a port scan.
#[derive(Deserialize, Debug, ValueEnum, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Lowercase name, as used in file names and nmap output (`22/tcp`).
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which port scans the discovery tool runs.
///   - Tcp and Udp run a single protocol.
///   - Both runs UDP first, then TCP.
#[derive(Deserialize, Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Tcp,
    Udp,
    Both,
}

impl ScanType {
    pub fn protocols(self) -> Vec<Protocol> {
        match self {
            ScanType::Tcp => vec![Protocol::Tcp],
            ScanType::Udp => vec![Protocol::Udp],
            ScanType::Both => vec![Protocol::Udp, Protocol::Tcp],
        }
    }
}

/// What to scan, resolved from the mutually exclusive target flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single address, range or subnet, passed to the scanner as given.
    Rhosts(String),
    /// Sweep the /24 around this interface's IPv4 address.
    Interface(String),
    /// A file with one target per line.
    File(PathBuf),
}

/// Targets the fast scanner accepts. It has no host discovery, so there is
/// no interface variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastTarget {
    Rhosts(String),
    File(PathBuf),
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "mynmap",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
    help_template = "{bin} {version}\n{about}\n\nUSAGE:\n    {usage}\n\nOPTIONS:\n{options}",
)]
#[allow(clippy::struct_excessive_bools)]
/// A fast scanning tool using Nmap.
/// Discovers hosts, finds open ports across the full range, then runs a
/// service and version scan against just those ports.
pub struct Opts {
    /// Type of scan. Defaults to both (UDP then TCP).
    #[arg(short = 't', long = "type", value_enum, ignore_case = true)]
    pub scan_type: Option<ScanType>,

    /// File containing a list of hosts, one per line.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Target hosts: single IP, range (e.g., 192.168.1.1-192.168.1.10), or
    /// subnet (e.g., 192.168.1.1/24).
    #[arg(short, long)]
    pub rhosts: Option<String>,

    /// Network interface for host discovery (e.g., eth0, wlan0, tun0). The
    /// /24 around its IPv4 address is scanned.
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Perform host discovery only, no port scanning.
    #[arg(long)]
    pub hosts: bool,

    /// Whether to ignore the configuration file or not.
    #[arg(short, long)]
    pub no_config: bool,

    /// Hide the banner
    #[arg(long)]
    pub no_banner: bool,

    /// Custom path to config file
    #[arg(short, long, value_parser)]
    pub config_path: Option<PathBuf>,

    /// Accessible mode. Turns off features which negatively affect screen readers.
    #[arg(long)]
    pub accessible: bool,

    /// Directory for discovered host lists. Defaults to ./mynmap_output.
    #[arg(long)]
    pub hosts_dir: Option<PathBuf>,

    /// Directory for scan reports. Defaults to ./nmap_output.
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,

    /// Command lines used for each scan stage.
    #[arg(skip)]
    pub templates: Templates,
}

impl Opts {
    pub fn read() -> Self {
        Opts::parse()
    }

    /// Merges values found within the user configuration file. Values given
    /// on the command line win over the file.
    pub fn merge(&mut self, config: &Config) {
        if self.no_config {
            return;
        }

        merge_optional!(self, config, hosts_dir, reports_dir);
        if self.scan_type.is_none() {
            self.scan_type = config.scan_type;
        }
        self.accessible |= config.accessible.unwrap_or(false);
        if let Some(templates) = &config.templates {
            self.templates.merge(templates);
        }
    }

    /// Picks the target, `-r` first, then `-i`, then `-f`. Host discovery
    /// only works on an address or an interface.
    pub fn target(&self) -> Result<Target> {
        let target = match (&self.rhosts, &self.interface, &self.file) {
            (Some(rhosts), _, _) => Target::Rhosts(rhosts.clone()),
            (None, Some(interface), _) => Target::Interface(interface.clone()),
            (None, None, Some(file)) => Target::File(file.clone()),
            (None, None, None) => bail!("Error: Either -f, -r, or -i must be specified."),
        };
        if self.hosts && matches!(target, Target::File(_)) {
            bail!(
                "Error: If --hosts is specified, you must provide a valid IP, range, or interface."
            );
        }
        Ok(target)
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type.unwrap_or(ScanType::Both)
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(
            self.hosts_dir.clone().unwrap_or_else(|| DEFAULT_HOSTS_DIR.into()),
            self.reports_dir.clone().unwrap_or_else(|| DEFAULT_REPORTS_DIR.into()),
            ReportNaming::Timestamped,
        )
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            scan_type: None,
            file: None,
            rhosts: None,
            interface: None,
            hosts: false,
            no_config: true,
            no_banner: false,
            config_path: None,
            accessible: false,
            hosts_dir: None,
            reports_dir: None,
            templates: Templates::default(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "myscan",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
    help_template = "{bin} {version}\n{about}\n\nUSAGE:\n    {usage}\n\nOPTIONS:\n{options}",
)]
/// Fast scan with RustScan, then a detailed Nmap scan of the open ports.
pub struct FastOpts {
    /// Type of scan. Defaults to tcp.
    #[arg(short = 't', long = "type", value_enum, ignore_case = true)]
    pub scan_type: Option<Protocol>,

    /// File containing a list of hosts, one per line.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Target hosts: single IP, range, or subnet.
    #[arg(short, long)]
    pub rhosts: Option<String>,

    /// How many hosts from --file to scan at the same time. With more than
    /// one job a failing host no longer stops the others.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Whether to ignore the configuration file or not.
    #[arg(short, long)]
    pub no_config: bool,

    /// Hide the banner
    #[arg(long)]
    pub no_banner: bool,

    /// Custom path to config file
    #[arg(short, long, value_parser)]
    pub config_path: Option<PathBuf>,

    /// Accessible mode. Turns off features which negatively affect screen readers.
    #[arg(long)]
    pub accessible: bool,

    /// Directory for scan reports. Defaults to ./nmap_output.
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,

    /// Command lines used for each scan stage.
    #[arg(skip)]
    pub templates: Templates,
}

impl FastOpts {
    pub fn read() -> Self {
        FastOpts::parse()
    }

    /// Merges values found within the user configuration file. Values given
    /// on the command line win over the file.
    pub fn merge(&mut self, config: &Config) {
        if self.no_config {
            return;
        }

        merge_optional!(self, config, reports_dir, jobs);
        if self.scan_type.is_none() {
            self.scan_type = config.fast_scan_type;
        }
        self.accessible |= config.accessible.unwrap_or(false);
        if let Some(templates) = &config.templates {
            self.templates.merge(templates);
        }
    }

    /// Picks the target, `-r` first, then `-f`.
    pub fn target(&self) -> Result<FastTarget> {
        match (&self.rhosts, &self.file) {
            (Some(rhosts), _) => Ok(FastTarget::Rhosts(rhosts.clone())),
            (None, Some(file)) => Ok(FastTarget::File(file.clone())),
            (None, None) => bail!("Error: Either -f or -r must be specified."),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.scan_type.unwrap_or(Protocol::Tcp)
    }

    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or(1).max(1)
    }

    /// Reports are named by scan type alone and overwritten on each run. When
    /// hosts from a file are scanned several at once the host goes into the
    /// name too, so concurrent scans never write the same files.
    pub fn layout(&self, target: &FastTarget) -> OutputLayout {
        let naming = match target {
            FastTarget::File(_) if self.jobs() > 1 => ReportNaming::PerTarget,
            _ => ReportNaming::Fixed,
        };
        OutputLayout::new(
            DEFAULT_HOSTS_DIR.into(),
            self.reports_dir.clone().unwrap_or_else(|| DEFAULT_REPORTS_DIR.into()),
            naming,
        )
    }
}

impl Default for FastOpts {
    fn default() -> Self {
        Self {
            scan_type: None,
            file: None,
            rhosts: None,
            jobs: None,
            no_config: true,
            no_banner: false,
            config_path: None,
            accessible: false,
            reports_dir: None,
            templates: Templates::default(),
        }
    }
}

/// Release package installed when rustscan is missing.
pub const DEFAULT_RUSTSCAN_DEB_URL: &str =
    "https://github.com/RustScan/RustScan/releases/download/2.0.1/rustscan_2.0.1_amd64.deb";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "mynmap-setup",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
)]
/// Installs nmap, rustscan and cargo-deb if missing, then builds mynmap and
/// myscan and moves them onto the PATH.
pub struct SetupOpts {
    /// Checkout of this repository to build from.
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    /// Where the built binaries are moved to.
    #[arg(long, default_value = "/usr/local/bin")]
    pub bin_dir: PathBuf,

    /// Package downloaded when rustscan is not installed.
    #[arg(long, default_value = DEFAULT_RUSTSCAN_DEB_URL)]
    pub rustscan_deb_url: String,

    /// Only install the external tools, do not build.
    #[arg(long)]
    pub skip_build: bool,
}

/// Struct used to deserialize the options specified within our config file.
/// These will be further merged with our command line arguments in order to
/// generate the final Opts and FastOpts structs.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    scan_type: Option<ScanType>,
    fast_scan_type: Option<Protocol>,
    jobs: Option<usize>,
    accessible: Option<bool>,
    hosts_dir: Option<PathBuf>,
    reports_dir: Option<PathBuf>,
    templates: Option<TemplateConfig>,
}

impl Config {
    /// Reads the configuration file with TOML format and parses it into a
    /// Config struct. A missing file is an empty configuration.
    ///
    /// # Format
    ///
    /// scan_type = "both"
    /// fast_scan_type = "tcp"
    /// jobs = 4
    /// reports_dir = "/tmp/nmap_output"
    ///
    /// [templates]
    /// tcp_discovery = "nmap --min-rate=5000 -p- -sT -T4 -Pn {{target}}"
    ///
    pub fn read(custom_config_path: Option<PathBuf>) -> Result<Self> {
        let Some(config_path) = custom_config_path.or_else(default_config_path) else {
            return Ok(Config::default());
        };
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Could not read {}", config_path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid configuration file {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Constructs default path to config toml
pub fn default_config_path() -> Option<PathBuf> {
    let mut config_path = dirs::home_dir()?;
    config_path.push(".mynmap.toml");
    Some(config_path)
}
