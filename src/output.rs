//! Where host lists and scan reports are written.
use crate::input::Protocol;
use anyhow::{Context, Result};
use chrono::Local;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOSTS_DIR: &str = "mynmap_output";
pub const DEFAULT_REPORTS_DIR: &str = "nmap_output";

/// How report base names are built.
///   - Timestamped: `20240301_101500_tcp_ports`, one set of files per run.
///   - Fixed: `tcp_ports`, overwritten by every run.
///   - PerTarget: `10.0.0.5_tcp_ports`, overwritten per host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportNaming {
    Timestamped,
    Fixed,
    PerTarget,
}

#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub hosts_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub naming: ReportNaming,
}

impl OutputLayout {
    pub fn new(hosts_dir: PathBuf, reports_dir: PathBuf, naming: ReportNaming) -> Self {
        Self {
            hosts_dir,
            reports_dir,
            naming,
        }
    }

    /// `hosts.txt`, or `<interface>_hosts.txt` when discovery ran on an interface.
    pub fn host_list_path(&self, interface: Option<&str>) -> PathBuf {
        match interface {
            Some(interface) => self.hosts_dir.join(format!("{interface}_hosts.txt")),
            None => self.hosts_dir.join("hosts.txt"),
        }
    }

    /// Writes one host per line, replacing any previous list, and returns
    /// the path written.
    pub fn write_host_list(&self, hosts: &[String], interface: Option<&str>) -> Result<PathBuf> {
        create_dir(&self.hosts_dir)?;
        let path = self.host_list_path(interface);
        let content: String = hosts.iter().map(|host| format!("{host}\n")).collect();
        fs::write(&path, content)
            .with_context(|| format!("Could not write host list {}", path.display()))?;
        debug!("Wrote {} hosts to {}", hosts.len(), path.display());
        Ok(path)
    }

    /// Base path handed to nmap's `-oA`; nmap appends `.nmap`, `.xml` and
    /// `.gnmap`. Creates the report directory.
    pub fn report_base(&self, target: &str, protocol: Protocol) -> Result<PathBuf> {
        create_dir(&self.reports_dir)?;
        let name = match self.naming {
            ReportNaming::Timestamped => {
                let timestamp = Local::now().format("%Y%m%d_%H%M%S");
                format!("{timestamp}_{protocol}_ports")
            }
            ReportNaming::Fixed => format!("{protocol}_ports"),
            ReportNaming::PerTarget => format!("{}_{protocol}_ports", file_safe(target)),
        };
        Ok(self.reports_dir.join(name))
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Could not create {}", dir.display()))
}

fn file_safe(target: &str) -> String {
    target
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | ' ' => '_',
            c => c,
        })
        .collect()
}
