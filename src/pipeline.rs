//! Drives the discover → parse → deep-scan chain.
//!
//! Each target goes through two stages per protocol: open port discovery,
//! then a deep scan restricted to the ports found. An empty port list skips
//! the deep scan for that protocol. A failing command stops the run.
//!
//! [`scan_hosts_concurrently`] is the exception: it runs several hosts at once
//! and keeps going when one of them fails.
use crate::command::CommandRunner;
use crate::input::{FastOpts, FastTarget, Opts, Protocol, Target};
use crate::output::OutputLayout;
use crate::parser::Ports;
use crate::provider::{
    interface_subnet, DeepScanner, FastScanProvider, HostDiscovery, NmapProvider, PortDiscovery,
};
use crate::{detail, output, warning};
use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{self, StreamExt};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of one protocol's two-stage scan on one target.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub target: String,
    pub protocol: Protocol,
    pub ports: Ports,
    /// `None` when no ports were found and the deep scan was skipped.
    pub report: Option<PathBuf>,
}

pub struct Pipeline {
    ports: Box<dyn PortDiscovery>,
    deep: DeepScanner,
    accessible: bool,
}

impl Pipeline {
    pub fn new(ports: Box<dyn PortDiscovery>, deep: DeepScanner, accessible: bool) -> Self {
        Self {
            ports,
            deep,
            accessible,
        }
    }

    /// Runs discovery and, when ports are found, the deep scan, for every
    /// protocol in order.
    pub fn scan_target(&self, target: &str, protocols: &[Protocol]) -> Result<Vec<ScanOutcome>> {
        let mut outcomes = Vec::with_capacity(protocols.len());
        for &protocol in protocols {
            let name = protocol.as_str().to_uppercase();
            detail!(format!("Running {name} port discovery on {target}..."), self.accessible);

            let ports = self.ports.open_ports(target, protocol)?;
            if ports.is_empty() {
                warning!(format!("No open {name} ports found."), self.accessible);
                outcomes.push(ScanOutcome {
                    target: target.to_owned(),
                    protocol,
                    ports,
                    report: None,
                });
                continue;
            }
            output!(format!("Open {name} ports found: {}", ports.pretty()), self.accessible);

            detail!(
                format!("Running deep {name} scan on {target} with ports: {ports}"),
                self.accessible
            );
            let report = self.deep.scan(target, protocol, &ports)?;
            println!("{}", report.stdout);
            output!(
                format!("Scan completed. Results saved to {}.", report.report.display()),
                self.accessible
            );

            outcomes.push(ScanOutcome {
                target: target.to_owned(),
                protocol,
                ports,
                report: Some(report.report),
            });
        }
        Ok(outcomes)
    }

    /// Runs [`Pipeline::scan_target`] for every host in the file, one after
    /// the other. Blank lines are skipped.
    pub fn scan_host_file(&self, path: &Path, protocols: &[Protocol]) -> Result<Vec<ScanOutcome>> {
        let mut outcomes = Vec::new();
        for host in read_host_file(path)? {
            outcomes.extend(self.scan_target(&host, protocols)?);
        }
        Ok(outcomes)
    }
}

/// One trimmed host per non-blank line.
pub fn read_host_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read host file {}", path.display()))?;
    let hosts: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();
    debug!("Read {} hosts from {}", hosts.len(), path.display());
    Ok(hosts)
}

/// Sweeps `target` for live hosts and saves them to the host list.
pub fn discover_hosts(
    discovery: &dyn HostDiscovery,
    layout: &OutputLayout,
    target: &str,
    interface: Option<&str>,
    accessible: bool,
) -> Result<Vec<String>> {
    detail!(format!("Running Nmap host discovery on {target}..."), accessible);
    let hosts = discovery.discover_hosts(target)?;
    for host in &hosts {
        output!(format!("Host discovered: {host}"), accessible);
    }

    let path = layout.write_host_list(&hosts, interface)?;
    output!(format!("Discovered hosts saved to {}.", path.display()), accessible);
    Ok(hosts)
}

/// Outcome of one host in a concurrent run.
pub struct HostResult {
    pub host: String,
    pub result: Result<Vec<ScanOutcome>>,
}

/// Scans `hosts` with at most `jobs` of them in flight. A host whose scan
/// fails is reported in its [`HostResult`] and does not affect the others.
pub async fn scan_hosts_concurrently(
    pipeline: Arc<Pipeline>,
    hosts: Vec<String>,
    protocols: Vec<Protocol>,
    jobs: usize,
) -> Vec<HostResult> {
    debug!("Scanning {} hosts with {} jobs", hosts.len(), jobs);
    stream::iter(hosts)
        .map(|host| {
            let pipeline = Arc::clone(&pipeline);
            let protocols = protocols.clone();
            async move {
                let task_host = host.clone();
                let result = tokio::task::spawn_blocking(move || {
                    pipeline.scan_target(&task_host, &protocols)
                })
                .await
                .map_err(|e| anyhow!("Scan of {host} did not finish: {e}"))
                .and_then(|result| result);
                HostResult { host, result }
            }
        })
        .buffer_unordered(jobs.max(1))
        .collect()
        .await
}

/// The `mynmap` flow: host discovery, or port discovery plus deep scans on
/// an address, an interface's subnet or a host file.
pub fn run_discovery(opts: &Opts, runner: Arc<dyn CommandRunner>) -> Result<()> {
    let target = opts.target()?;
    let layout = opts.layout();
    let nmap = NmapProvider::new(Arc::clone(&runner), opts.templates.clone());
    let protocols = opts.scan_type().protocols();

    if opts.hosts {
        match &target {
            Target::Rhosts(rhosts) => {
                detail!(format!("Discovering hosts in {rhosts}..."), opts.accessible);
                discover_hosts(&nmap, &layout, rhosts, None, opts.accessible)?;
            }
            Target::Interface(interface) => {
                detail!(
                    format!("Discovering hosts on interface {interface}..."),
                    opts.accessible
                );
                let subnet = subnet_for(opts, &*runner, interface)?;
                discover_hosts(&nmap, &layout, &subnet, Some(interface), opts.accessible)?;
            }
            Target::File(_) => bail!(
                "Error: If --hosts is specified, you must provide a valid IP, range, or interface."
            ),
        }
        return Ok(());
    }

    let deep = DeepScanner::new(Arc::clone(&runner), opts.templates.clone(), layout.clone());
    let pipeline = Pipeline::new(
        Box::new(NmapProvider::new(Arc::clone(&runner), opts.templates.clone())),
        deep,
        opts.accessible,
    );

    match &target {
        Target::Rhosts(rhosts) => {
            pipeline.scan_target(rhosts, &protocols)?;
        }
        Target::File(path) => {
            pipeline.scan_host_file(path, &protocols)?;
        }
        Target::Interface(interface) => {
            let subnet = subnet_for(opts, &*runner, interface)?;
            let hosts = discover_hosts(&nmap, &layout, &subnet, Some(interface), opts.accessible)?;
            for host in &hosts {
                pipeline.scan_target(host, &protocols)?;
            }
        }
    }
    Ok(())
}

fn subnet_for(opts: &Opts, runner: &dyn CommandRunner, interface: &str) -> Result<String> {
    let Some(subnet) = interface_subnet(runner, &opts.templates, interface)? else {
        bail!("Could not find IPv4 address for interface {interface}.");
    };
    output!(
        format!("Using IP range {subnet} for host discovery."),
        opts.accessible
    );
    Ok(subnet)
}

/// The `myscan` flow: fast port discovery, then a detailed nmap scan of the
/// open ports, for an address or every host of a file.
pub fn run_fast_scan(opts: &FastOpts, runner: Arc<dyn CommandRunner>) -> Result<()> {
    let target = opts.target()?;
    let protocol = opts.protocol();
    let deep = DeepScanner::new(
        Arc::clone(&runner),
        opts.templates.clone(),
        opts.layout(&target),
    );
    let pipeline = Pipeline::new(
        Box::new(FastScanProvider::new(runner, opts.templates.clone())),
        deep,
        opts.accessible,
    );

    match target {
        FastTarget::Rhosts(rhosts) => {
            pipeline.scan_target(&rhosts, &[protocol])?;
        }
        FastTarget::File(path) if opts.jobs() == 1 => {
            pipeline.scan_host_file(&path, &[protocol])?;
        }
        FastTarget::File(path) => {
            let hosts = read_host_file(&path)?;
            let total = hosts.len();
            let runtime = tokio::runtime::Runtime::new()?;
            let results = runtime.block_on(scan_hosts_concurrently(
                Arc::new(pipeline),
                hosts,
                vec![protocol],
                opts.jobs(),
            ));

            let mut failed = 0;
            for HostResult { host, result } in results {
                if let Err(e) = result {
                    failed += 1;
                    warning!(format!("Scan of {host} failed: {e:#}"), opts.accessible);
                }
            }
            if failed > 0 {
                bail!("{failed} of {total} hosts failed");
            }
        }
    }
    Ok(())
}
