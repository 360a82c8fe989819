//! Utilities for terminal output during scanning.

use colored::Colorize;

/// Prints an error or "nothing found" line with a red `[!]` prefix.
///
/// The two argument form takes an `accessible` flag: in accessible mode the
/// prefix is dropped so screen readers only read the message.
#[macro_export]
macro_rules! warning {
    ($name:expr) => {
        println!("{} {}", ansi_term::Colour::Red.bold().paint("[!]"), $name);
    };
    ($name:expr, $accessible:expr) => {
        if $accessible {
            println!("{}", $name);
        } else {
            println!("{} {}", ansi_term::Colour::Red.bold().paint("[!]"), $name);
        }
    };
}

/// Prints a progress line (a command about to run) with a blue `[~]` prefix.
#[macro_export]
macro_rules! detail {
    ($name:expr) => {
        println!("{} {}", ansi_term::Colour::Blue.bold().paint("[~]"), $name);
    };
    ($name:expr, $accessible:expr) => {
        if $accessible {
            println!("{}", $name);
        } else {
            println!("{} {}", ansi_term::Colour::Blue.bold().paint("[~]"), $name);
        }
    };
}

/// Prints a result line (hosts or ports found) with a green `[>]` prefix.
#[macro_export]
macro_rules! output {
    ($name:expr) => {
        println!(
            "{} {}",
            ansi_term::Colour::RGB(0, 255, 9).bold().paint("[>]"),
            $name
        );
    };
    ($name:expr, $accessible:expr) => {
        if $accessible {
            println!("{}", $name);
        } else {
            println!(
                "{} {}",
                ansi_term::Colour::RGB(0, 255, 9).bold().paint("[>]"),
                $name
            );
        }
    };
}

/// Prints a random opening line under the banner.
#[macro_export]
macro_rules! funny_opening {
    () => {
        use rand::seq::IndexedRandom;
        let quotes = [
            "Nmap does the work. We just point it at the right ports.",
            "Sixty-five thousand ports walk into a bar. A handful stay open.",
            "Discover, narrow, deep scan. Repeat until coffee runs out.",
            "If it listens, we will ask it what version it is.",
            "Your ports are showing.",
        ];
        if let Some(quote) = quotes.choose(&mut rand::rng()) {
            println!("{}\n", quote);
        }
    };
}

const BANNER: &str = r"
                 _   _
 _ __ ___  _   _| \ | |_ __ ___   __ _ _ __
| '_ ` _ \| | | |  \| | '_ ` _ \ / _` | '_ \
| | | | | | |_| | |\  | | | | | | (_| | |_) |
|_| |_| |_|\__, |_| \_|_| |_| |_|\__,_| .__/
           |___/                      |_|
";

/// Prints the ASCII banner. Accessible mode prints only the tool name.
pub fn print_banner(tool: &str, accessible: bool) {
    if accessible {
        println!("{tool} {}", env!("CARGO_PKG_VERSION"));
        return;
    }
    println!("{}", BANNER.cyan().bold());
    println!("{}", format!(": {tool} {} :", env!("CARGO_PKG_VERSION")).cyan());
}
