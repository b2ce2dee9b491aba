/*!
`validate.rs`

Implements `cockpit validate schema`: checks a configuration file against a
stored schema version (core/v1/ValidateConfiguration). The file is sent as
raw text; the server parses it.
*/

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;

use super::format::{Role, StyleOptions, color, emoji};
use super::shared::{GlobalOpts, Session};
use crate::client::{ApiError, Endpoint, Method, send_raw};
use crate::{log_debug, log_info};
use crate::model::{SchemaDetails, ValidationRequest, ValidationResponse};

#[derive(Subcommand, Debug)]
pub enum ValidateCommand {
    /// Validate a configuration against a schema version
    Schema(SchemaArgs),
}

/// CLI arguments for `cockpit validate schema`
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Organization name
    #[arg(short = 'o', long)]
    pub org: String,

    /// Schema name
    #[arg(short = 's', long = "schema-name", alias = "schema_name")]
    pub schema_name: String,

    /// Schema version
    #[arg(short = 'v', long)]
    pub version: String,

    /// Path to the configuration file
    #[arg(short = 'p', long, value_name = "PATH")]
    pub path: PathBuf,
}

pub fn execute_validate(cmd: ValidateCommand, globals: &GlobalOpts) -> Result<()> {
    match cmd {
        ValidateCommand::Schema(args) => {
            let session = Session::open(globals)?;
            let resp = validate_schema(&session, &args)?;

            let style = StyleOptions::detect();
            globals.say(format!(
                "{} {}",
                emoji("success", &style),
                color(Role::Success, "Schema validated successfully!", &style)
            ));
            if let Some(r) = resp
                && !r.message.trim().is_empty()
            {
                globals.say(color(Role::Dim, r.message.trim(), &style));
            }
            Ok(())
        }
    }
}

pub(crate) fn validate_schema(
    session: &Session,
    args: &SchemaArgs,
) -> Result<Option<ValidationResponse>> {
    let configuration = fs::read_to_string(&args.path)
        .with_context(|| format!("Error reading config file {}", args.path.display()))?;

    let request = ValidationRequest {
        schema_details: SchemaDetails {
            org: args.org.clone(),
            schema_name: args.schema_name.clone(),
            version: args.version.clone(),
        },
        configuration,
    };
    log_info!(
        "validating {} against {}/{} {}",
        args.path.display(),
        args.org,
        args.schema_name,
        args.version
    );

    let spec = session
        .authorized(Method::Get, Endpoint::ValidateConfiguration)?
        .with_body(&request);
    let resp = send_raw(&spec).context("Error validating schema")?;
    if !resp.is_success() {
        return Err(ApiError::Status {
            status: resp.status,
            body: resp.body,
        })
        .context("Error validating schema");
    }

    // Only the status decides the outcome; the body is an optional message.
    match resp.decode::<Option<ValidationResponse>>() {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            log_debug!("validation reply is not JSON ({e}), showing it verbatim");
            Ok(Some(ValidationResponse {
                message: resp.body,
            }))
        }
    }
}
