//! This crate exposes the internal functionality of the `mynmap` and
//! `myscan` scan orchestrators and the `mynmap-setup` installer.
//!
//! Nothing here sends a packet. All scanning is done by the external
//! [Nmap](https://nmap.org) and [RustScan](https://github.com/RustScan/RustScan)
//! binaries; this crate templates their command lines, scrapes their text
//! output and chains one scan into the next.
//!
//! ## Architecture Overview
//!
//! 1. **Input**: [`input`] parses the command line and merges `~/.mynmap.toml`.
//! 2. **Commands**: [`templates`] renders each command line, [`command`] runs it.
//! 3. **Providers**: [`provider`] turns tool output into hosts and
//!    [`Ports`](crate::parser::Ports) using the [`parser`] functions.
//! 4. **Pipeline**: [`pipeline`] runs port discovery, then a deep scan
//!    restricted to the ports found, per target and protocol.
//! 5. **Output**: [`output`] decides where host lists and reports go.
//!
//! ## Usage Example
//!
//! Any [`CommandRunner`](crate::command::CommandRunner) can stand in for the
//! shell, which makes the pipeline easy to drive without nmap installed:
//!
//! ```rust
//! use std::sync::Arc;
//! use anyhow::Result;
//! use mynmap::command::CommandRunner;
//! use mynmap::input::Protocol;
//! use mynmap::provider::{NmapProvider, PortDiscovery};
//! use mynmap::templates::Templates;
//!
//! struct Canned;
//!
//! impl CommandRunner for Canned {
//!     fn run(&self, _command: &str) -> Result<String> {
//!         Ok("22/tcp open ssh\n80/tcp open http".to_owned())
//!     }
//! }
//!
//! let nmap = NmapProvider::new(Arc::new(Canned), Templates::default());
//! let ports = nmap.open_ports("10.0.0.5", Protocol::Tcp).unwrap();
//! assert_eq!(ports.to_string(), "22,80");
//! ```
#![allow(clippy::needless_doctest_main)]

pub mod tui;

pub mod command;

pub mod input;

pub mod templates;

pub mod parser;

pub mod output;

pub mod provider;

pub mod pipeline;

pub mod setup;
