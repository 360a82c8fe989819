//! Scan result providers.
//!
//! A provider turns a target into structured results (hosts, open ports) by
//! running an external tool and parsing what it prints. The pipeline only
//! sees [`HostDiscovery`] and [`PortDiscovery`], so supporting another tool
//! or another output format means adding a provider, not touching the
//! pipeline.
use crate::command::CommandRunner;
use crate::input::Protocol;
use crate::output::OutputLayout;
use crate::parser::{self, Ports};
use crate::templates::{render, CommandParts, Templates};
use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Finds live hosts without probing ports.
pub trait HostDiscovery: Send + Sync {
    fn discover_hosts(&self, target: &str) -> Result<Vec<String>>;
}

/// Finds open ports on a target, without service detection.
pub trait PortDiscovery: Send + Sync {
    fn open_ports(&self, target: &str, protocol: Protocol) -> Result<Ports>;
}

/// Host and port discovery with nmap.
pub struct NmapProvider {
    runner: Arc<dyn CommandRunner>,
    templates: Templates,
}

impl NmapProvider {
    pub fn new(runner: Arc<dyn CommandRunner>, templates: Templates) -> Self {
        Self { runner, templates }
    }
}

impl HostDiscovery for NmapProvider {
    fn discover_hosts(&self, target: &str) -> Result<Vec<String>> {
        let command = render(&self.templates.host_discovery, &CommandParts::target(target))?;
        let hosts = parser::parse_hosts(&self.runner.run(&command)?);
        debug!("Hosts discovered in {target}: {hosts:?}");
        Ok(hosts)
    }
}

impl PortDiscovery for NmapProvider {
    fn open_ports(&self, target: &str, protocol: Protocol) -> Result<Ports> {
        let command = render(self.templates.discovery(protocol), &CommandParts::target(target))?;
        let ports = parser::parse_open_ports(&self.runner.run(&command)?, protocol);
        debug!("Open {protocol} ports on {target}: {ports}");
        Ok(ports)
    }
}

/// Port discovery with RustScan's greppable mode.
pub struct FastScanProvider {
    runner: Arc<dyn CommandRunner>,
    templates: Templates,
}

impl FastScanProvider {
    pub fn new(runner: Arc<dyn CommandRunner>, templates: Templates) -> Self {
        Self { runner, templates }
    }
}

impl PortDiscovery for FastScanProvider {
    fn open_ports(&self, target: &str, protocol: Protocol) -> Result<Ports> {
        let command = render(self.templates.fast(protocol), &CommandParts::target(target))?;
        let ports = parser::parse_greppable_ports(&self.runner.run(&command)?);
        debug!("Open {protocol} ports on {target}: {ports}");
        Ok(ports)
    }
}

/// What a deep scan produced.
#[derive(Debug, Clone)]
pub struct DeepScanReport {
    /// Base path given to `-oA`.
    pub report: PathBuf,
    /// The scanner's normal output.
    pub stdout: String,
}

/// Service and version detection restricted to already known open ports.
pub struct DeepScanner {
    runner: Arc<dyn CommandRunner>,
    templates: Templates,
    layout: OutputLayout,
}

impl DeepScanner {
    pub fn new(runner: Arc<dyn CommandRunner>, templates: Templates, layout: OutputLayout) -> Self {
        Self {
            runner,
            templates,
            layout,
        }
    }

    pub fn scan(&self, target: &str, protocol: Protocol, ports: &Ports) -> Result<DeepScanReport> {
        let report = self.layout.report_base(target, protocol)?;
        let parts = CommandParts {
            ports: ports.to_string(),
            output: report.display().to_string(),
            ..CommandParts::target(target)
        };
        let command = render(self.templates.deep(protocol), &parts)?;
        let stdout = self.runner.run(&command)?;
        Ok(DeepScanReport { report, stdout })
    }
}

/// Derives the /24 to sweep from an interface's IPv4 address.
pub fn interface_subnet(
    runner: &dyn CommandRunner,
    templates: &Templates,
    interface: &str,
) -> Result<Option<String>> {
    let parts = CommandParts {
        interface: interface.to_owned(),
        ..CommandParts::default()
    };
    let command = render(&templates.interface_address, &parts)?;
    Ok(parser::parse_interface_subnet(&runner.run(&command)?))
}

#[cfg(test)]
mod tests {
    use super::{
        interface_subnet, DeepScanner, FastScanProvider, HostDiscovery, NmapProvider, PortDiscovery,
    };
    use crate::command::testing::ScriptedRunner;
    use crate::input::Protocol;
    use crate::output::{OutputLayout, ReportNaming};
    use crate::parser::Ports;
    use crate::templates::Templates;
    use std::sync::Arc;

    #[test]
    fn nmap_host_discovery() {
        let runner = Arc::new(ScriptedRunner::new().respond(
            "nmap -sn 10.0.0.0/24",
            "Nmap scan report for 10.0.0.1\nHost is up.\nNmap scan report for 10.0.0.9",
        ));
        let provider = NmapProvider::new(runner.clone(), Templates::default());

        let hosts = provider.discover_hosts("10.0.0.0/24").unwrap();

        assert_eq!(hosts, vec!["10.0.0.1", "10.0.0.9"]);
        assert_eq!(runner.calls(), vec!["nmap -sn 10.0.0.0/24"]);
    }

    #[test]
    fn nmap_port_discovery_uses_protocol_template() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond("-sU", "53/udp open domain")
                .respond("-sT", "22/tcp open ssh\n80/tcp open http"),
        );
        let provider = NmapProvider::new(runner.clone(), Templates::default());

        assert_eq!(
            provider.open_ports("10.0.0.5", Protocol::Udp).unwrap(),
            Ports::from(vec![53])
        );
        assert_eq!(
            provider.open_ports("10.0.0.5", Protocol::Tcp).unwrap(),
            Ports::from(vec![22, 80])
        );
    }

    #[test]
    fn nmap_failure_is_an_error() {
        let runner = Arc::new(ScriptedRunner::new().fail("nmap", "Failed to resolve \"nohost\"."));
        let provider = NmapProvider::new(runner, Templates::default());

        let err = provider.open_ports("nohost", Protocol::Tcp).unwrap_err();
        assert!(err.to_string().contains("Failed to resolve"));
    }

    #[test]
    fn fast_scan_provider_reads_greppable_output() {
        let runner = Arc::new(
            ScriptedRunner::new().respond("rustscan -a 10.0.0.5 -g", "10.0.0.5 -> [22,443]"),
        );
        let provider = FastScanProvider::new(runner, Templates::default());

        assert_eq!(
            provider.open_ports("10.0.0.5", Protocol::Tcp).unwrap(),
            Ports::from(vec![22, 443])
        );
    }

    #[test]
    fn deep_scan_restricted_to_ports() {
        let runner =
            Arc::new(ScriptedRunner::new().respond("-sC -sV", "PORT STATE SERVICE VERSION"));
        let reports = std::env::temp_dir().join(format!("mynmap-provider-{}", std::process::id()));
        let layout = OutputLayout::new(
            reports.join("hosts"),
            reports.join("reports"),
            ReportNaming::Fixed,
        );
        let scanner = DeepScanner::new(runner.clone(), Templates::default(), layout);

        let report = scanner
            .scan("10.0.0.5", Protocol::Tcp, &Ports::from(vec![22, 80]))
            .unwrap();

        assert_eq!(report.stdout, "PORT STATE SERVICE VERSION");
        assert_eq!(report.report, reports.join("reports").join("tcp_ports"));
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("-p 22,80 -sC -sV -sT"));
        assert!(calls[0].ends_with(&format!("-oA {}", report.report.display())));
    }

    #[test]
    fn subnet_from_interface() {
        let runner = ScriptedRunner::new().respond(
            "ip -4 addr show wlan0",
            "    inet 172.16.4.77/20 brd 172.16.15.255",
        );
        let subnet = interface_subnet(&runner, &Templates::default(), "wlan0").unwrap();
        assert_eq!(subnet, Some("172.16.4.0/24".to_owned()));
    }
}
