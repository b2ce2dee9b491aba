/*!
shared.rs - state every subcommand needs.

  - Session: resolved gateway address + local store
  - authorized(): request spec carrying the saved token
  - read_document(): YAML/JSON file -> JSON object
*/

use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use url::Url;

use super::output::OutputFormat;
use crate::client::{DEFAULT_TIMEOUT, Endpoint, Method, RequestSpec};
use crate::log_debug;
use crate::store::Store;

/// Global options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOpts {
    /// `--address` / `COCKPIT_ADDRESS`
    pub address: Option<String>,
    /// `--timeout`
    pub timeout: Duration,
    /// `--quiet`: status lines are dropped, rendered data and errors are not.
    pub quiet: bool,
}

impl Default for GlobalOpts {
    fn default() -> Self {
        GlobalOpts {
            address: None,
            timeout: DEFAULT_TIMEOUT,
            quiet: false,
        }
    }
}

impl GlobalOpts {
    pub fn with_address(address: impl Into<String>) -> Self {
        GlobalOpts {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Status line on stdout ("Login successful!" and friends).
    pub fn say(&self, line: impl AsRef<str>) {
        self.say_to(&mut io::stdout(), line);
    }

    /// Status line on stderr, used next to data printed on stdout.
    pub fn note(&self, line: impl AsRef<str>) {
        self.say_to(&mut io::stderr(), line);
    }

    pub fn say_to(&self, out: &mut impl Write, line: impl AsRef<str>) {
        if !self.quiet {
            let _ = writeln!(out, "{}", line.as_ref());
        }
    }
}

/// Resolved gateway + local files for one command invocation.
#[derive(Debug, Clone)]
pub struct Session {
    pub store: Store,
    pub base: Url,
    pub timeout: Duration,
}

impl Session {
    pub fn open(globals: &GlobalOpts) -> Result<Self> {
        let store = Store::locate()?;
        Self::with_store(store, globals)
    }

    pub fn with_store(store: Store, globals: &GlobalOpts) -> Result<Self> {
        let base = store.resolve_address(globals.address.as_deref())?;
        log_debug!("gateway: {base}");
        Ok(Session {
            store,
            base,
            timeout: globals.timeout,
        })
    }

    /// Request without credentials (login, register).
    pub fn anonymous(&self, method: Method, endpoint: Endpoint) -> Result<RequestSpec> {
        Ok(RequestSpec::new(method, endpoint.url(&self.base)?).with_timeout(self.timeout))
    }

    /// Request carrying the token saved by `login`.
    pub fn authorized(&self, method: Method, endpoint: Endpoint) -> Result<RequestSpec> {
        let token = self.store.read_token()?;
        Ok(self.anonymous(method, endpoint)?.with_token(token))
    }
}

/// Read a `.yaml`/`.yml`/`.json` file into a JSON object.
/// Returns the object and the format it was written in.
pub fn read_document(path: &Path) -> Result<(serde_json::Map<String, serde_json::Value>, OutputFormat)> {
    let Some(format) = OutputFormat::from_path(path) else {
        bail!(
            "unsupported file format: {} (expected .yaml, .yml or .json)",
            path.display()
        );
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;

    let value: serde_json::Value = match format {
        OutputFormat::Yaml => serde_yaml::from_str(&raw).context("failed to unmarshal YAML")?,
        OutputFormat::Json => serde_json::from_str(&raw).context("failed to unmarshal JSON")?,
    };
    match value {
        serde_json::Value::Object(map) => Ok((map, format)),
        other => bail!(
            "{} must contain a mapping at the top level, found {}",
            path.display(),
            kind_of(&other)
        ),
    }
}

fn kind_of(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "nothing",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}
