/*!
`put.rs`

Implements `cockpit put config --path FILE`.

Reads a standalone configuration from a YAML or JSON file, POSTs it to
core/v1/PutStandaloneConfig and prints the stored configuration returned by
the server in the same format as the input file.
*/

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use super::output::{OutputFormat, render_titled};
use super::shared::{GlobalOpts, Session, read_document};
use crate::client::{Endpoint, Method, send_request};
use crate::log_info;
use crate::model::StandaloneConfig;

#[derive(Subcommand, Debug)]
pub enum PutCommand {
    /// Send a standalone configuration to the server
    Config(PutConfigArgs),
}

/// CLI arguments for `cockpit put config`
#[derive(Args, Debug)]
pub struct PutConfigArgs {
    /// Path to the configuration file (.yaml, .yml or .json)
    #[arg(short = 'p', long, value_name = "PATH")]
    pub path: PathBuf,
}

pub fn execute_put(cmd: PutCommand, globals: &GlobalOpts) -> Result<()> {
    match cmd {
        PutCommand::Config(args) => {
            let session = Session::open(globals)?;
            let (stored, format) = put_config(&session, &args.path)?;
            print!(
                "{}",
                render_titled("Standalone Config Response", &stored, format)?
            );
            Ok(())
        }
    }
}

/// Returns the server's copy and the format of the input file.
pub(crate) fn put_config(session: &Session, path: &Path) -> Result<(StandaloneConfig, OutputFormat)> {
    let (document, format) =
        read_document(path).context("Failed to read configuration file")?;
    log_info!("putting {} ({format})", path.display());

    let spec = session
        .authorized(Method::Post, Endpoint::PutStandaloneConfig)?
        .with_body(&document);
    let stored: StandaloneConfig =
        send_request(&spec).context("Failed to send standalone configuration")?;
    Ok((stored, format))
}
