use mynmap::command::ShellRunner;
use mynmap::input::{Config, FastOpts};
use mynmap::pipeline::run_fast_scan;
use mynmap::tui::print_banner;
use mynmap::warning;

use log::debug;
use std::sync::Arc;

/// Fast scan with RustScan, then a detailed Nmap scan of the open ports.
fn main() {
    env_logger::init();

    let mut opts = FastOpts::read();
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
        print_banner("myscan", opts.accessible);
    }

    if let Err(e) = run_fast_scan(&opts, Arc::new(ShellRunner)) {
        warning!(format!("{e:#}"), opts.accessible);
        std::process::exit(1);
    }
}
