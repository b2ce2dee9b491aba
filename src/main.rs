use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;

mod client;
mod cmd;
mod model;
mod store;
mod utils;

use cmd::format::{Role, StyleOptions, color, emoji};
use cmd::{
    ContextCommand, GetCommand, GlobalOpts, LoginArgs, PutCommand, RegisterArgs, ValidateCommand,
};

/// Cockpit - command-line client for the configuration / identity service.
///
/// Command layout:
///   cockpit register --email E --name N --org O --surname S --username U
///   cockpit login --username U
///   cockpit logout
///   cockpit get group --org O --name N --version V [--output yaml|json] [--table]
///   cockpit put config --path FILE(.yaml|.yml|.json)
///   cockpit validate schema --org O --schema-name S --version V --path FILE
///   cockpit context <init|show|drop>
///
/// Global flags / env:
///   --verbose (repeatable)  Log progress to stderr
///   -q / --quiet            No status messages, only data and errors
///   --address / COCKPIT_ADDRESS   Gateway address (else context file, else localhost:5555)
///   --timeout SECS          Per-request timeout (default 10)
///   COCKPIT_HOME            Directory holding .constellations (default: home dir)
///   COCKPIT_PASSWORD        Password for login/register instead of prompting
#[derive(Parser, Debug)]
#[command(
    name = "cockpit",
    version,
    author,
    about = "Cockpit - CLI for the c12s configuration and identity service",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase log verbosity (--verbose, --verbose --verbose)
    #[arg(long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress status messages (rendered data and errors are still printed)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = 10)]
    timeout: u64,

    /// Gateway address (host:port or URL)
    #[arg(long, global = true, env = "COCKPIT_ADDRESS", value_name = "ADDRESS")]
    address: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a new user
    Register(RegisterArgs),

    /// Log in and save the session token
    Login(LoginArgs),

    /// Forget the saved session token
    Logout,

    /// Retrieve resources
    #[command(subcommand)]
    Get(GetCommand),

    /// Send resources
    #[command(subcommand)]
    Put(PutCommand),

    /// Validate resources
    #[command(subcommand)]
    Validate(ValidateCommand),

    /// Manage the local CLI context (~/.constellations)
    #[command(subcommand)]
    Context(ContextCommand),
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    if let Err(e) = run(cli) {
        let style = StyleOptions::detect();
        eprintln!(
            "{} {} {e:#}",
            emoji("error", &style),
            color(Role::Error, "Error:", &style)
        );
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let globals = GlobalOpts {
        address: cli.address.filter(|a| !a.trim().is_empty()),
        timeout: Duration::from_secs(cli.timeout.max(1)),
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Register(args) => cmd::execute_register(args, &globals),
        Commands::Login(args) => cmd::execute_login(args, &globals),
        Commands::Logout => cmd::execute_logout(&globals),
        Commands::Get(c) => cmd::execute_get(c, &globals),
        Commands::Put(c) => cmd::execute_put(c, &globals),
        Commands::Validate(c) => cmd::execute_validate(c, &globals),
        Commands::Context(c) => cmd::execute_context(c, &globals),
    }
}
