/*!
`get.rs`

Implements `cockpit get group`.

Fetches one versioned configuration group (GET core/v1/GetConfigGroup with a
ConfigReference body), prints it and saves it next to the caller as both
`<name>-<version>.yaml` and `<name>-<version>.json`.

Output:
  --output yaml (default) | json   machine-readable dump on stdout
  --table                          boxed header + PARAM SET / KEY / VALUE table
  --save-dir DIR / --no-save       where (whether) to write the two files
*/

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::format::{StyleOptions, TableOpts, box_header, emoji, table};
use super::output::{OutputFormat, file_stem, render, save_both};
use super::shared::{GlobalOpts, Session};
use crate::client::{Endpoint, Method, send_request};
use crate::log_info;
use crate::model::{ConfigGroup, ConfigGroupResponse, ConfigReference};

#[derive(Subcommand, Debug)]
pub enum GetCommand {
    /// Retrieve and display a configuration group
    Group(GroupArgs),
}

/// CLI arguments for `cockpit get group`
#[derive(Args, Debug)]
pub struct GroupArgs {
    /// Organization name
    #[arg(short = 'o', long)]
    pub org: String,

    /// Configuration name
    #[arg(short = 'n', long)]
    pub name: String,

    /// Configuration version
    #[arg(short = 'v', long)]
    pub version: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,

    /// Print a table instead of YAML/JSON
    #[arg(long)]
    pub table: bool,

    /// Directory for the saved .yaml/.json copies
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub save_dir: PathBuf,

    /// Do not save the response to files
    #[arg(long)]
    pub no_save: bool,
}

/// Entrypoint for `get` subcommand.
pub fn execute_get(cmd: GetCommand, globals: &GlobalOpts) -> Result<()> {
    match cmd {
        GetCommand::Group(args) => {
            let session = Session::open(globals)?;
            let resp = fetch_group(&session, &args)?;
            print!("{}", show_group(&resp, &args)?);
            for path in save_group(&resp, &args)? {
                globals.note(format!("Saved {}", path.display()));
            }
            Ok(())
        }
    }
}

pub(crate) fn fetch_group(session: &Session, args: &GroupArgs) -> Result<ConfigGroupResponse> {
    let reference = ConfigReference {
        org: args.org.clone(),
        name: args.name.clone(),
        version: args.version.clone(),
    };
    log_info!(
        "fetching config group {}/{} {}",
        reference.org,
        reference.name,
        reference.version
    );
    let spec = session
        .authorized(Method::Get, Endpoint::GetConfigGroup)?
        .with_body(&reference);
    send_request(&spec).context("Failed to fetch config group")
}

/// Writes `<name>-<version>.yaml` and `.json` into `--save-dir`; nothing with `--no-save`.
pub(crate) fn save_group(resp: &ConfigGroupResponse, args: &GroupArgs) -> Result<Vec<PathBuf>> {
    if args.no_save {
        return Ok(Vec::new());
    }
    let stem = file_stem(&[args.name.as_str(), args.version.as_str()]);
    save_both(resp, &args.save_dir, &stem).context("Failed to save response to files")
}

fn show_group(resp: &ConfigGroupResponse, args: &GroupArgs) -> Result<String> {
    if args.table {
        Ok(group_table(&resp.group, &StyleOptions::detect()))
    } else {
        render(resp, args.output)
    }
}

/// Boxed summary followed by one row per parameter.
pub(crate) fn group_table(group: &ConfigGroup, style: &StyleOptions) -> String {
    let title = format!("{} {}/{}", emoji("gear", style), group.org, group.name);
    let subtitle = if group.created_at.is_empty() {
        group.version.clone()
    } else {
        format!("{} • created {}", group.version, group.created_at)
    };
    let mut out = box_header(title.trim(), Some(subtitle), style);
    out.push('\n');

    let rows: Vec<Vec<String>> = group
        .param_sets
        .iter()
        .flat_map(|set| {
            set.param_set
                .iter()
                .map(|p| vec![set.name.clone(), p.key.clone(), p.value.clone()])
        })
        .collect();
    if rows.is_empty() {
        out.push_str("(no parameters)\n");
        return out;
    }
    out.push_str(&table(
        &["PARAM SET", "KEY", "VALUE"],
        &rows,
        TableOpts::default(),
        style,
    ));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockServer;
    use crate::model::{NamedParamSet, Param};
    use crate::store::Store;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn args() -> GroupArgs {
        GroupArgs {
            org: "c12s".into(),
            name: "app_config".into(),
            version: "v1.0.0".into(),
            output: OutputFormat::Yaml,
            table: false,
            save_dir: PathBuf::from("."),
            no_save: true,
        }
    }

    #[test]
    fn fetch_sends_reference_with_token() {
        let server = MockServer::respond(
            200,
            r#"{"group":{"org":"c12s","name":"app_config","version":"v1.0.0",
               "param_sets":[{"name":"db","param_set":[{"key":"host","value":"pg"}]}]}}"#,
        );
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        store.save_token("tok").unwrap();
        let globals = GlobalOpts::with_address(server.base.to_string());
        let session = Session::with_store(store, &globals).unwrap();

        let resp = fetch_group(&session, &args()).unwrap();
        assert_eq!(resp.group.param_sets[0].param_set[0].value, "pg");

        let got = server.received();
        assert_eq!(got.method, "GET");
        assert_eq!(got.path, "/apis/core/v1/GetConfigGroup");
        assert_eq!(got.header("authorization"), Some("Bearer tok"));
        let body: Value = serde_json::from_str(&got.body).unwrap();
        assert_eq!(
            body,
            json!({"org":"c12s","name":"app_config","version":"v1.0.0"})
        );
    }

    #[test]
    fn fetched_group_is_saved_as_yaml_and_json() {
        let server = MockServer::respond(
            200,
            r#"{"group":{"org":"c12s","name":"app_config","version":"v1.0.0",
               "param_sets":[{"name":"db","param_set":[{"key":"host","value":"pg"}]}]}}"#,
        );
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        store.save_token("tok").unwrap();
        let globals = GlobalOpts::with_address(server.base.to_string());
        let session = Session::with_store(store, &globals).unwrap();

        let out_dir = home.path().join("out");
        let args = GroupArgs {
            save_dir: out_dir.clone(),
            no_save: false,
            ..args()
        };
        let resp = fetch_group(&session, &args).unwrap();
        let written = save_group(&resp, &args).unwrap();
        assert_eq!(
            written,
            vec![
                out_dir.join("app_config-v1.0.0.yaml"),
                out_dir.join("app_config-v1.0.0.json")
            ]
        );

        let yaml = std::fs::read_to_string(&written[0]).unwrap();
        assert!(yaml.starts_with("group:\n  org: c12s\n"));
        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&written[1]).unwrap())
            .unwrap();
        assert_eq!(saved["group"]["param_sets"][0]["param_set"][0]["value"], "pg");
    }

    #[test]
    fn no_save_writes_nothing() {
        let home = TempDir::new().unwrap();
        let args = GroupArgs {
            save_dir: home.path().join("out"),
            no_save: true,
            ..args()
        };
        let written = save_group(&ConfigGroupResponse::default(), &args).unwrap();
        assert!(written.is_empty());
        assert!(!home.path().join("out").exists());
    }

    #[test]
    fn fetch_without_login_fails_before_sending() {
        let home = TempDir::new().unwrap();
        let session =
            Session::with_store(Store::in_home(home.path()), &GlobalOpts::default()).unwrap();
        let err = fetch_group(&session, &args()).unwrap_err();
        assert!(format!("{err:#}").contains("cockpit login"));
    }

    #[test]
    fn table_lists_every_param() {
        let group = ConfigGroup {
            org: "c12s".into(),
            name: "app_config".into(),
            version: "v1.0.0".into(),
            created_at: String::new(),
            param_sets: vec![
                NamedParamSet {
                    name: "db".into(),
                    param_set: vec![
                        Param {
                            key: "host".into(),
                            value: "pg".into(),
                        },
                        Param {
                            key: "port".into(),
                            value: "5432".into(),
                        },
                    ],
                },
                NamedParamSet {
                    name: "cache".into(),
                    param_set: vec![Param {
                        key: "ttl".into(),
                        value: "60s".into(),
                    }],
                },
            ],
        };
        let out = group_table(&group, &StyleOptions::plain(100));
        assert!(out.contains("c12s/app_config"));
        assert!(out.contains("PARAM SET"));
        assert_eq!(out.lines().filter(|l| l.starts_with("db ")).count(), 2);
        assert!(out.lines().any(|l| l.starts_with("cache") && l.ends_with("60s")));
    }

    #[test]
    fn empty_group_table() {
        let out = group_table(&ConfigGroup::default(), &StyleOptions::plain(80));
        assert!(out.ends_with("(no parameters)\n"));
    }
}
