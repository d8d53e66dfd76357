use crate::adb::BackendKind;
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub backend: BackendKind,
    pub debug_mode: bool,
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Run(Args),
    Help,
    Version,
}

impl Args {
    /// Parse the process arguments. Prints help, version, or the error and returns `None`
    /// when there is nothing to run.
    pub fn parse() -> Option<Self> {
        match Self::parse_from(env::args().skip(1)) {
            Ok(Action::Run(args)) => Some(args),
            Ok(Action::Help) => {
                print_help();
                None
            }
            Ok(Action::Version) => {
                println!("Xevo v{}", env!("XEVO_VERSION_DISPLAY"));
                None
            }
            Err(message) => {
                eprintln!("❌ {message}");
                print_help();
                None
            }
        }
    }

    pub fn parse_from<I, S>(args: I) -> Result<Action, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut backend = BackendKind::default();
        let mut debug_mode = false;

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                return Ok(Action::Help);
            } else if arg == "--version" || arg == "-v" {
                return Ok(Action::Version);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if let Some(rest) = arg.strip_prefix("--impl=") {
                backend = rest.parse()?;
            } else {
                return Err(format!("Unknown argument: {arg}"));
            }
        }

        Ok(Action::Run(Args {
            backend,
            debug_mode,
        }))
    }
}

fn print_help() {
    println!("⌚ Xevo - Android smartwatch forensic acquisition");
    println!();
    println!("USAGE:");
    println!("    xevo [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --impl=<shell|rust> Select ADB implementation (default: rust)");
    println!("                        The shell implementation requires the adb tool on PATH.");
    println!("    --debug             Enable debug logging (RUST_LOG overrides)");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    xevo");
    println!("    xevo --impl=shell --debug");
}
