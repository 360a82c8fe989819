use clap::Parser;
use mynmap::command::ShellRunner;
use mynmap::input::SetupOpts;
use mynmap::setup::Installer;
use mynmap::warning;

use log::debug;
use std::sync::Arc;

fn main() {
    env_logger::init();

    let opts = SetupOpts::parse();
    debug!("Setup options {:?}", opts);

    if let Err(e) = Installer::new(Arc::new(ShellRunner), opts).run() {
        warning!(format!("{e:#}"));
        std::process::exit(1);
    }
}
