/*!
`context.rs`

Implements `cockpit context init | show | drop` over ~/.constellations.
*/

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use std::io::{self, Write};

use super::output::{OutputFormat, render};
use super::shared::GlobalOpts;
use crate::client::DEFAULT_ADDRESS;
use crate::store::Store;

#[derive(Subcommand, Debug)]
pub enum ContextCommand {
    /// Initialize an empty CLI context
    Init(InitArgs),
    /// Print the current context
    Show(ShowArgs),
    /// Drop the current context (token included)
    Drop,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Gateway address stored in the context (falls back to --address)
    #[arg(long = "gateway", value_name = "ADDRESS")]
    pub gateway: Option<String>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,
}

pub fn execute_context(cmd: ContextCommand, globals: &GlobalOpts) -> Result<()> {
    let store = Store::locate()?;
    run_context(&store, cmd, globals, &mut io::stdout())
}

/// `--gateway`, then `--address` / `COCKPIT_ADDRESS`, then the default.
fn init_address(args: InitArgs, globals: &GlobalOpts) -> String {
    args.gateway
        .filter(|a| !a.trim().is_empty())
        .or_else(|| globals.address.clone())
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string())
}

pub(crate) fn run_context(
    store: &Store,
    cmd: ContextCommand,
    globals: &GlobalOpts,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        ContextCommand::Init(args) => {
            store.init(&init_address(args, globals))?;
            globals.say_to(
                out,
                format!(
                    "Empty context initialized in {}. run 'cockpit login'",
                    store.dir().display()
                ),
            );
        }
        ContextCommand::Show(args) => {
            let ctx = store.load()?;
            write!(out, "{}", render(&ctx, args.output)?).context("Failed to print context")?;
        }
        ContextCommand::Drop => {
            store.drop_context()?;
            globals.say_to(out, "Current context dropped!");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ContextFile;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn run(store: &Store, cmd: ContextCommand, globals: &GlobalOpts) -> Result<String> {
        let mut out = Vec::new();
        run_context(store, cmd, globals, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn init(gateway: Option<&str>) -> ContextCommand {
        ContextCommand::Init(InitArgs {
            gateway: gateway.map(str::to_string),
        })
    }

    #[test]
    fn init_prefers_gateway() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        let globals = GlobalOpts::with_address("flag-host:1");

        let printed = run(&store, init(Some("gw.local:7000")), &globals).unwrap();
        assert!(printed.starts_with("Empty context initialized in "));
        assert!(printed.trim_end().ends_with("run 'cockpit login'"));
        assert_eq!(store.load().unwrap(), ContextFile::new("gw.local:7000"));
    }

    #[test]
    fn init_falls_back_to_address_then_default() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        run(&store, init(None), &GlobalOpts::with_address("flag-host:1")).unwrap();
        assert_eq!(store.load().unwrap().context.address, "flag-host:1");

        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        run(&store, init(None), &GlobalOpts::default()).unwrap();
        assert_eq!(store.load().unwrap().context.address, DEFAULT_ADDRESS);
    }

    #[test]
    fn show_renders_json() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        store.init("gw:5555").unwrap();

        let printed = run(
            &store,
            ContextCommand::Show(ShowArgs {
                output: OutputFormat::Json,
            }),
            &GlobalOpts::default(),
        )
        .unwrap();
        let v: Value = serde_json::from_str(&printed).unwrap();
        assert_eq!(
            v,
            json!({"context":{"version":"v1","address":"gw:5555","namespace":"default","user":""}})
        );
    }

    #[test]
    fn show_without_context_fails() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        let err = run(
            &store,
            ContextCommand::Show(ShowArgs {
                output: OutputFormat::Yaml,
            }),
            &GlobalOpts::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("cockpit context init"));
    }

    #[test]
    fn drop_reports_and_quiet_stays_silent() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        store.init("gw:5555").unwrap();
        let printed = run(&store, ContextCommand::Drop, &GlobalOpts::default()).unwrap();
        assert_eq!(printed, "Current context dropped!\n");

        let quiet = GlobalOpts {
            quiet: true,
            ..GlobalOpts::default()
        };
        let printed = run(&store, init(Some("gw:5555")), &quiet).unwrap();
        assert!(printed.is_empty());
        assert!(store.context_path().exists());
    }
}
