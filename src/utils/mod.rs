//! Utilities: logging (dynamic level, stderr only), interactive password prompt.
//!
//! Key items:
//!   init_logging / derive_level
//!   log_info! / log_debug! / log_trace!
//!   prompt::password

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Logging helpers.
///
/// Every line goes to stderr: stdout is reserved for rendered YAML/JSON so
/// it can be piped into other tools.
pub mod logging {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "ERROR",
                LogLevel::Info => "INFO",
                LogLevel::Debug => "DEBUG",
                LogLevel::Trace => "TRACE",
            }
        }
    }

    static GLOBAL_LEVEL: OnceLock<AtomicU8> = OnceLock::new();

    fn level_cell() -> &'static AtomicU8 {
        // Quiet by default: the progress chatter of a one-shot HTTP call is
        // only interesting with --verbose.
        GLOBAL_LEVEL.get_or_init(|| AtomicU8::new(LogLevel::Error as u8))
    }

    pub fn init_logging(level: LogLevel) {
        level_cell().store(level as u8, Ordering::Relaxed);
    }

    pub fn current_log_level() -> LogLevel {
        match level_cell().load(Ordering::Relaxed) {
            0 => LogLevel::Error,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// `-q` wins over any number of `--verbose`.
    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Error,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    fn timestamp() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
    }

    pub fn enabled(level: LogLevel) -> bool {
        level <= current_log_level()
    }

    pub fn log(level: LogLevel, msg: impl AsRef<str>) {
        if enabled(level) {
            eprintln!("[{}][{}] {}", level.as_str(), timestamp(), msg.as_ref());
        }
    }

    pub fn info(msg: impl AsRef<str>) {
        log(LogLevel::Info, msg);
    }
    pub fn debug(msg: impl AsRef<str>) {
        log(LogLevel::Debug, msg);
    }
    pub fn trace(msg: impl AsRef<str>) {
        log(LogLevel::Trace, msg);
    }

    #[macro_export]
    macro_rules! log_info {
        ($($t:tt)*) => { $crate::utils::logging::info(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_debug {
        ($($t:tt)*) => { $crate::utils::logging::debug(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_trace {
        ($($t:tt)*) => { $crate::utils::logging::trace(format!($($t)*)) };
    }
}

pub use logging::{derive_level, init_logging};

/// Interactive input.
pub mod prompt {
    use anyhow::{Context, Result, bail};
    use std::io::{self, BufRead, IsTerminal, Write};

    /// Environment variable consulted before prompting (non-interactive use).
    pub const PASSWORD_ENV: &str = "COCKPIT_PASSWORD";

    /// Where the password comes from.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PasswordSource {
        Env(String),
        /// Terminal prompt with echo off.
        Hidden,
        /// One line from piped stdin.
        Piped,
    }

    pub fn source(env_value: Option<String>, stdin_is_terminal: bool) -> PasswordSource {
        match env_value.filter(|p| !p.is_empty()) {
            Some(p) => PasswordSource::Env(p),
            None if stdin_is_terminal => PasswordSource::Hidden,
            None => PasswordSource::Piped,
        }
    }

    /// `COCKPIT_PASSWORD`, else a hidden prompt on a terminal, else a line of stdin.
    pub fn password() -> Result<String> {
        let stdin = io::stdin();
        match source(std::env::var(PASSWORD_ENV).ok(), stdin.is_terminal()) {
            PasswordSource::Env(p) => {
                crate::log_debug!("password taken from {PASSWORD_ENV}");
                Ok(p)
            }
            PasswordSource::Hidden => dialoguer::Password::new()
                .with_prompt("Password")
                .interact()
                .context("Failed to read password"),
            PasswordSource::Piped => password_from(&mut stdin.lock(), &mut io::stderr()),
        }
    }

    /// Prompt on `out`, read a single line from `input`.
    pub fn password_from(input: &mut impl BufRead, out: &mut impl Write) -> Result<String> {
        write!(out, "Password: ").context("Failed to write password prompt")?;
        out.flush().ok();

        let mut line = String::new();
        input
            .read_line(&mut line)
            .context("Failed to read password")?;
        let pw = line.trim_end_matches(['\r', '\n']).to_string();
        if pw.is_empty() {
            bail!("password cannot be empty");
        }
        Ok(pw)
    }
}
