/*!
Output format selection and rendering for responses.

  - OutputFormat (yaml | json), case-insensitive, Display
  - render / render_titled: serialise any response in the chosen format
  - save_both: write `<stem>.yaml` and `<stem>.json`
*/

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Format used to print (and name) a response.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub const fn variants() -> &'static [OutputFormat] {
        &[OutputFormat::Yaml, OutputFormat::Json]
    }

    /// Case-insensitive parser not relying on `clap`.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    /// Infer from a file extension (`.yaml`, `.yml`, `.json`).
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_str_ci)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "YAML",
            OutputFormat::Json => "JSON",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Pretty JSON (2-space indent) or YAML. Always ends with a newline.
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    let mut out = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Error converting response to JSON")?
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).context("Error converting response to YAML")?
        }
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// `render` preceded by a `<title> (<FORMAT>):` line.
pub fn render_titled<T: Serialize + ?Sized>(
    title: &str,
    value: &T,
    format: OutputFormat,
) -> Result<String> {
    Ok(format!("{title} ({}):\n{}", format.label(), render(value, format)?))
}

/// Write `<dir>/<stem>.yaml` and `<dir>/<stem>.json`, returning both paths.
pub fn save_both<T: Serialize + ?Sized>(value: &T, dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let mut written = Vec::with_capacity(2);
    for format in OutputFormat::variants() {
        let path = dir.join(format!("{stem}.{}", format.extension()));
        fs::write(&path, render(value, *format)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// File-name-safe stem: anything but `[A-Za-z0-9._-]` becomes `_`.
pub fn file_stem(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

/* --------------------------------- Tests ---------------------------------- */
