//! Installs the external tools and puts the orchestrators on the PATH.
//!
//! Every step is a shell command. The first one that fails aborts the whole
//! routine; nothing already installed is rolled back.
use crate::command::CommandRunner;
use crate::input::SetupOpts;
use crate::templates::{render, CommandParts};
use crate::{detail, output};
use anyhow::{bail, Result};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Binaries built from this crate and installed.
pub const BINARIES: [&str; 2] = ["mynmap", "myscan"];

const NMAP_PROBE: &str = "nmap --version";
const NMAP_INSTALL: &str = "sudo apt-get install -y nmap";
const RUSTSCAN_PROBE: &str = "rustscan --version";
const RUSTSCAN_DOWNLOAD: &str = "wget -q -O \"{{file}}\" \"{{url}}\"";
const RUSTSCAN_INSTALL: &str = "sudo dpkg -i \"{{file}}\"";
const PACKAGER_PROBE: &str = "cargo deb --version";
const PACKAGER_INSTALL: &str = "cargo install cargo-deb";
// Paths are double quoted for `sh -c`.
const BUILD: &str = "cd \"{{dir}}\" && cargo build --release";
const MOVE_BINARY: &str = "sudo mv \"{{file}}\" \"{{dir}}/{{bin}}\"";

pub struct Installer {
    runner: Arc<dyn CommandRunner>,
    opts: SetupOpts,
}

impl Installer {
    pub fn new(runner: Arc<dyn CommandRunner>, opts: SetupOpts) -> Self {
        Self { runner, opts }
    }

    /// Runs every step in order.
    pub fn run(&self) -> Result<()> {
        self.install_nmap()?;
        self.install_rustscan()?;
        self.install_packager()?;
        if self.opts.skip_build {
            detail!("Skipping build.");
            return Ok(());
        }
        self.install_binaries()?;
        Ok(())
    }

    /// A tool is installed when its probe command exits successfully.
    pub fn is_installed(&self, probe: &str) -> bool {
        let installed = self.runner.run(probe).is_ok();
        debug!("{probe:?} installed: {installed}");
        installed
    }

    pub fn install_nmap(&self) -> Result<()> {
        if self.is_installed(NMAP_PROBE) {
            output!("nmap is already installed.");
            return Ok(());
        }
        detail!("Installing nmap...");
        self.runner.run(NMAP_INSTALL)?;
        output!("nmap installation complete.");
        Ok(())
    }

    /// Downloads the release package and installs it with dpkg.
    pub fn install_rustscan(&self) -> Result<()> {
        if self.is_installed(RUSTSCAN_PROBE) {
            output!("rustscan is already installed.");
            return Ok(());
        }
        let package = std::env::temp_dir().join("rustscan.deb");
        let parts = CommandParts {
            file: package.display().to_string(),
            url: self.opts.rustscan_deb_url.clone(),
            ..CommandParts::default()
        };

        detail!(format!("Downloading {}...", self.opts.rustscan_deb_url));
        self.runner.run(&render(RUSTSCAN_DOWNLOAD, &parts)?)?;
        detail!("Installing rustscan...");
        self.runner.run(&render(RUSTSCAN_INSTALL, &parts)?)?;
        output!("rustscan installation complete.");
        Ok(())
    }

    /// cargo-deb, used to package the binaries as a .deb.
    pub fn install_packager(&self) -> Result<()> {
        if self.is_installed(PACKAGER_PROBE) {
            output!("cargo-deb is already installed.");
            return Ok(());
        }
        detail!("Installing cargo-deb...");
        self.runner.run(PACKAGER_INSTALL)?;
        output!("cargo-deb installation complete.");
        Ok(())
    }

    /// Builds the release binaries and moves each into the bin directory.
    pub fn install_binaries(&self) -> Result<Vec<PathBuf>> {
        detail!("Creating binaries...");
        let source = CommandParts {
            dir: self.opts.source_dir.display().to_string(),
            ..CommandParts::default()
        };
        self.runner.run(&render(BUILD, &source)?)?;
        output!("Binary creation complete.");

        let release_dir = self.opts.source_dir.join("target").join("release");
        let mut installed = Vec::with_capacity(BINARIES.len());
        for bin in BINARIES {
            let built = release_dir.join(bin);
            if !built.exists() {
                bail!("Error: Binary {} not found after build.", built.display());
            }
            let parts = CommandParts {
                file: built.display().to_string(),
                dir: self.opts.bin_dir.display().to_string(),
                bin: bin.to_owned(),
                ..CommandParts::default()
            };
            self.runner.run(&render(MOVE_BINARY, &parts)?)?;

            let destination = self.opts.bin_dir.join(bin);
            output!(format!("Binary moved to {}.", destination.display()));
            installed.push(destination);
        }
        Ok(installed)
    }
}
