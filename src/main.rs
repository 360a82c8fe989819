#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown, clippy::if_not_else, clippy::non_ascii_literal)]

use mynmap::command::ShellRunner;
use mynmap::input::{Config, Opts};
use mynmap::pipeline::run_discovery;
use mynmap::tui::print_banner;
use mynmap::{funny_opening, warning};

use log::debug;
use std::sync::Arc;

#[cfg(not(tarpaulin_include))]
/// Faster Nmap scanning: discover hosts, find open ports, then deep scan
/// just those ports.
fn main() {
    env_logger::init();

    let mut opts = Opts::read();
    let config = if opts.no_config {
        Config::default()
    } else {
        match Config::read(opts.config_path.clone()) {
            Ok(config) => config,
            Err(e) => {
                warning!(format!("Found {e:#}.\nAborting scan."), opts.accessible);
                std::process::exit(1);
            }
        }
    };
    opts.merge(&config);

    debug!("Main() `opts` arguments are {:?}", opts);

    if let Err(e) = opts.target() {
        warning!(e, opts.accessible);
        std::process::exit(1);
    }

    if !opts.no_banner {
        print_banner("mynmap", opts.accessible);
        if !opts.accessible {
            funny_opening!();
        }
    }

    if let Err(e) = run_discovery(&opts, Arc::new(ShellRunner)) {
        warning!(format!("{e:#}"), opts.accessible);
        std::process::exit(1);
    }
}
