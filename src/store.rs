//! Local state under `~/.constellations`: the context file and the login token.
//!
//! Layout:
//!   <home>/.constellations/context.yml   (gateway address, namespace, user)
//!   <home>/.constellations/token.txt     (bearer token written by `login`)
//!
//! `COCKPIT_HOME` replaces the home directory (tests, CI, multiple profiles).

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::client::{self, DEFAULT_ADDRESS};
use crate::log_debug;

pub const HOME_ENV: &str = "COCKPIT_HOME";
pub const CONTEXT_DIR: &str = ".constellations";
pub const CONTEXT_FILE: &str = "context.yml";
pub const TOKEN_FILE: &str = "token.txt";

/// On-disk shape of `context.yml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextFile {
    pub context: ContextContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextContent {
    pub version: String,
    pub address: String,
    pub namespace: String,
    #[serde(default)]
    pub user: String,
}

impl ContextFile {
    pub fn new(address: impl Into<String>) -> Self {
        ContextFile {
            context: ContextContent {
                version: "v1".into(),
                address: address.into(),
                namespace: "default".into(),
                user: String::new(),
            },
        }
    }
}

/// Handle on the `.constellations` directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// `$COCKPIT_HOME/.constellations`, else `~/.constellations`.
    pub fn locate() -> Result<Self> {
        let home = std::env::var_os(HOME_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .context("Could not determine home directory (set COCKPIT_HOME)")?;
        Ok(Self::in_home(home))
    }

    pub fn in_home(home: impl AsRef<Path>) -> Self {
        Store {
            dir: home.as_ref().join(CONTEXT_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn context_path(&self) -> PathBuf {
        self.dir.join(CONTEXT_FILE)
    }

    pub fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    /* ---- Context ---- */

    /// Create the directory and a fresh `context.yml`. Refuses to overwrite an
    /// existing context; a directory holding only the token is fine.
    pub fn init(&self, address: &str) -> Result<ContextFile> {
        if self.context_path().exists() {
            bail!("Context already exists in {}", self.dir.display());
        }
        // Reject garbage before anything touches the disk.
        client::parse_address(address)?;

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let ctx = ContextFile::new(address.trim());
        let yaml = serde_yaml::to_string(&ctx).context("Failed to serialize context")?;
        fs::write(self.context_path(), yaml)
            .with_context(|| format!("Failed to write {}", self.context_path().display()))?;
        log_debug!("context initialized at {}", self.dir.display());
        Ok(ctx)
    }

    pub fn load(&self) -> Result<ContextFile> {
        let path = self.context_path();
        let raw = fs::read_to_string(&path).with_context(|| {
            format!(
                "No context found at {} (run 'cockpit context init')",
                path.display()
            )
        })?;
        serde_yaml::from_str(&raw).with_context(|| format!("Malformed context file {}", path.display()))
    }

    /// `None` when no context has been initialized.
    pub fn load_optional(&self) -> Result<Option<ContextFile>> {
        if !self.context_path().exists() {
            return Ok(None);
        }
        self.load().map(Some)
    }

    /// Remove the whole directory, token included.
    pub fn drop_context(&self) -> Result<()> {
        if !self.dir.exists() {
            bail!("No context to drop at {}", self.dir.display());
        }
        fs::remove_dir_all(&self.dir)
            .with_context(|| format!("Failed to remove {}", self.dir.display()))
    }

    /* ---- Token ---- */

    pub fn save_token(&self, token: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.token_path();
        write_private(&path, token.as_bytes())
            .with_context(|| format!("Failed to save token to {}", path.display()))?;
        log_debug!("token saved to {}", path.display());
        Ok(())
    }

    pub fn read_token(&self) -> Result<String> {
        let path = self.token_path();
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("No token at {} (run 'cockpit login')", path.display()))?;
        let token = raw.trim();
        if token.is_empty() {
            bail!("Token file {} is empty (run 'cockpit login')", path.display());
        }
        Ok(token.to_string())
    }

    /// Returns whether a token was present.
    pub fn clear_token(&self) -> Result<bool> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
        Ok(true)
    }

    /* ---- Address resolution ---- */

    /// flag > `COCKPIT_ADDRESS` (folded into the flag by clap) > context file > default.
    pub fn resolve_address(&self, flag: Option<&str>) -> Result<Url> {
        if let Some(a) = flag.filter(|a| !a.trim().is_empty()) {
            return client::parse_address(a);
        }
        if let Some(ctx) = self.load_optional()?
            && !ctx.context.address.trim().is_empty()
        {
            return client::parse_address(&ctx.context.address);
        }
        client::parse_address(DEFAULT_ADDRESS)
    }
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut f = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    f.set_permissions(fs::Permissions::from_mode(0o600))?;
    f.write_all(data)
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(path, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_writes_default_context() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        store.init("gw.local:5555").unwrap();

        let raw = fs::read_to_string(store.context_path()).unwrap();
        assert!(raw.contains("address: gw.local:5555"));
        assert!(raw.contains("namespace: default"));

        let ctx = store.load().unwrap();
        assert_eq!(ctx, ContextFile::new("gw.local:5555"));
        assert_eq!(ctx.context.version, "v1");
    }

    #[test]
    fn init_twice_fails() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        store.init("localhost:5555").unwrap();
        let err = store.init("localhost:5555").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn init_after_login_keeps_token() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        store.save_token("tok").unwrap();

        store.init("gw:5555").unwrap();
        assert_eq!(store.load().unwrap(), ContextFile::new("gw:5555"));
        assert_eq!(store.read_token().unwrap(), "tok");
    }

    #[test]
    fn init_rejects_empty_address_without_creating_dir() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        assert!(store.init("  ").is_err());
        assert!(!store.dir().exists());
    }

    #[test]
    fn drop_removes_everything() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        store.init("localhost:5555").unwrap();
        store.save_token("tok").unwrap();
        store.drop_context().unwrap();
        assert!(!store.dir().exists());
        assert!(store.drop_context().is_err());
    }

    #[test]
    fn token_roundtrip_and_clear() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        assert!(store.read_token().is_err());

        store.save_token("eyJhbGciOi\n").unwrap();
        assert_eq!(store.read_token().unwrap(), "eyJhbGciOi");

        assert!(store.clear_token().unwrap());
        assert!(!store.clear_token().unwrap());
        assert!(store.read_token().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());
        store.save_token("tok").unwrap();
        let mode = fs::metadata(store.token_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn address_precedence() {
        let home = TempDir::new().unwrap();
        let store = Store::in_home(home.path());

        let default = store.resolve_address(None).unwrap();
        assert_eq!(default.as_str(), "http://localhost:5555/");

        store.init("ctx-host:7000").unwrap();
        let from_ctx = store.resolve_address(None).unwrap();
        assert_eq!(from_ctx.as_str(), "http://ctx-host:7000/");

        let from_flag = store.resolve_address(Some("https://flag-host")).unwrap();
        assert_eq!(from_flag.as_str(), "https://flag-host/");
    }
}
