//! Fieldguard Logging
//!
//! Structured, environment-controlled logging shared by the fieldguard
//! crates. Every entry carries a level, a target, a message and an optional
//! set of key/value fields.
//!
//! # Usage
//!
//! ```rust
//! use fieldguard_log::{debug, info, warn, error, trace};
//!
//! // Plain messages
//! debug!("Loading rule table");
//! info!("Serving {} routes", 12);
//!
//! // Structured fields come before the message, separated by `;`
//! let route = "/orders";
//! debug!(route = route, errors = 2; "Request rejected");
//!
//! // Explicit target
//! warn!(target: "fieldguard::rules", "Pattern compiled on first use");
//! error!(target: "fieldguard::rules", field = "amount"; "Length bound on a number");
//! ```
//!
//! # Environment Variables
//!
//! - `FIELDGUARD_DEBUG=1` - Enable debug logging
//! - `FIELDGUARD_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `FIELDGUARD_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `FIELDGUARD_LOG_COLOR=1|0` - Enable/disable colors
//! - `FIELDGUARD_LOG_TIMESTAMPS=1|0` - Include timestamps

use once_cell::sync::Lazy;
use std::env;
use std::fmt::{self, Display, Write as _};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level (least verbose)
    Error = 4,
    /// Off (no logging)
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Upper-case level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    #[cfg(feature = "color")]
    fn colored(&self) -> colored::ColoredString {
        use colored::Colorize;
        match self {
            Level::Trace => "TRACE".magenta(),
            Level::Debug => "DEBUG".blue(),
            Level::Info => "INFO".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERROR".red().bold(),
            Level::Off => "OFF".white(),
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-part human readable line
    Pretty,
    /// Short single-line format
    Compact,
    /// One JSON object per line
    Json,
}

impl Format {
    /// Parse a format name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
    LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);
    config
});

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled (pretty format only)
    pub color: bool,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include the target
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
            module_path: true,
        }
    }
}

impl LogConfig {
    /// Build a configuration from `FIELDGUARD_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests feed a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        let debug = flag("FIELDGUARD_DEBUG").unwrap_or(false);

        let level = lookup("FIELDGUARD_LOG_LEVEL")
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("FIELDGUARD_LOG_FORMAT")
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        let color = flag("FIELDGUARD_LOG_COLOR")
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && lookup("TERM").is_some());

        let timestamps = flag("FIELDGUARD_LOG_TIMESTAMPS").unwrap_or(true);
        let module_path = flag("FIELDGUARD_LOG_MODULE").unwrap_or(true);

        Self {
            debug,
            level,
            format,
            color,
            timestamps,
            module_path,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Initialize the logging system eagerly.
///
/// Log macros initialize lazily on first use; call this at startup to read
/// the environment before any request is served.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// Check if debug mode is enabled.
#[inline]
pub fn is_debug_enabled() -> bool {
    init();
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Check if a log level passes the current threshold.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    init();
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Whether an entry at `level` would be written. Debug entries are also
/// written whenever debug mode is on.
#[inline]
pub fn enabled(level: Level) -> bool {
    is_level_enabled(level) || (level == Level::Debug && is_debug_enabled())
}

/// Get current log level.
pub fn current_level() -> Level {
    init();
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set log level at runtime.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Enable or disable debug mode at runtime.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

/// Get the global configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Records
// ============================================================================

/// Key/value pair attached to a log entry.
pub type Field<'a> = (&'a str, &'a dyn Display);

/// A single log entry, borrowed from the call site.
pub struct Record<'a> {
    pub level: Level,
    pub target: &'a str,
    pub message: &'a str,
    pub fields: &'a [Field<'a>],
}

impl Record<'_> {
    /// Render the entry in the configured format, without a trailing newline.
    pub fn render(&self, config: &LogConfig) -> String {
        match config.format {
            Format::Pretty => render_pretty(self, config),
            Format::Compact => render_compact(self, config),
            Format::Json => render_json(self, config),
        }
    }
}

/// Write a message with no fields.
#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    log_fields(level, target, message, &[]);
}

/// Write a message with structured fields.
#[doc(hidden)]
pub fn log_fields(level: Level, target: &str, message: &str, fields: &[Field<'_>]) {
    if !enabled(level) {
        return;
    }

    let record = Record {
        level,
        target,
        message,
        fields,
    };
    let line = record.render(config());

    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", line);
}

fn render_pretty(record: &Record<'_>, config: &LogConfig) -> String {
    let mut out = String::new();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(out, "{} ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    #[cfg(feature = "color")]
    if config.color {
        let _ = write!(out, "{:5} ", record.level.colored());
    } else {
        let _ = write!(out, "{:5} ", record.level.as_str());
    }

    #[cfg(not(feature = "color"))]
    let _ = write!(out, "{:5} ", record.level.as_str());

    if config.module_path && !record.target.is_empty() {
        let _ = write!(out, "[{}] ", record.target);
    }

    out.push_str(record.message);
    push_pairs(&mut out, record.fields);
    out
}

fn render_compact(record: &Record<'_>, config: &LogConfig) -> String {
    let mut out = String::new();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(out, "{} ", now.format("%H:%M:%S"));
    }

    out.push(record.level.as_str().chars().next().unwrap_or('?'));
    out.push(' ');

    if config.module_path && !record.target.is_empty() {
        let _ = write!(out, "{}: ", record.target);
    }

    out.push_str(record.message);
    push_pairs(&mut out, record.fields);
    out
}

fn push_pairs(out: &mut String, fields: &[Field<'_>]) {
    for (key, value) in fields {
        let _ = write!(out, " {}={}", key, value);
    }
}

#[cfg(feature = "json")]
fn render_json(record: &Record<'_>, config: &LogConfig) -> String {
    let mut entry = serde_json::Map::new();

    if config.timestamps {
        entry.insert(
            "timestamp".to_string(),
            chrono::Utc::now().to_rfc3339().into(),
        );
    }
    entry.insert("level".to_string(), record.level.as_str().into());
    if config.module_path {
        entry.insert("target".to_string(), record.target.into());
    }
    entry.insert("message".to_string(), record.message.into());

    if !record.fields.is_empty() {
        let fields: serde_json::Map<String, serde_json::Value> = record
            .fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string().into()))
            .collect();
        entry.insert("fields".to_string(), fields.into());
    }

    serde_json::Value::Object(entry).to_string()
}

#[cfg(not(feature = "json"))]
fn render_json(record: &Record<'_>, config: &LogConfig) -> String {
    let mut out = String::from("{");

    if config.timestamps {
        let _ = write!(
            out,
            r#""timestamp":"{}","#,
            chrono::Utc::now().to_rfc3339()
        );
    }
    let _ = write!(out, r#""level":"{}","#, record.level.as_str());
    if config.module_path {
        let _ = write!(out, r#""target":"{}","#, escape_json(record.target));
    }
    let _ = write!(out, r#""message":"{}""#, escape_json(record.message));

    if !record.fields.is_empty() {
        out.push_str(r#","fields":{"#);
        for (i, (key, value)) in record.fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(
                out,
                r#""{}":"{}""#,
                escape_json(key),
                escape_json(&value.to_string())
            );
        }
        out.push('}');
    }

    out.push('}');
    out
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, target: $target:expr, $($key:ident = $val:expr),+ ; $($arg:tt)+) => {
        if $crate::enabled($level) {
            $crate::log_fields(
                $level,
                $target,
                &format!($($arg)+),
                &[$((stringify!($key), &$val as &dyn ::std::fmt::Display)),+],
            );
        }
    };
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
    ($level:expr, $($key:ident = $val:expr),+ ; $($arg:tt)+) => {
        if $crate::enabled($level) {
            $crate::log_fields(
                $level,
                module_path!(),
                &format!($($arg)+),
                &[$((stringify!($key), &$val as &dyn ::std::fmt::Display)),+],
            );
        }
    };
    ($level:expr, $($arg:tt)+) => {
        if $crate::enabled($level) {
            $crate::log($level, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a trace message.
///
/// Only written when `FIELDGUARD_LOG_LEVEL=trace`.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Level::Trace, $($arg)+)
    };
}

/// Log a debug message.
///
/// Written when `FIELDGUARD_DEBUG=1` or `FIELDGUARD_LOG_LEVEL=debug`.
///
/// # Example
///
/// ```rust
/// use fieldguard_log::debug;
///
/// let route = "/orders";
/// debug!("No rules for {}", route);
/// debug!(route = route, rules = 3; "Evaluating request");
/// debug!(target: "fieldguard::evaluator", "Table has {} routes", 4);
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Level::Debug, $($arg)+)
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Level::Info, $($arg)+)
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Level::Warn, $($arg)+)
    };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Level::Error, $($arg)+)
    };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! Tracing compatibility layer.
    //!
    //! Builds a `tracing` subscriber whose default filter follows the
    //! `FIELDGUARD_*` configuration, for hosts that already use `tracing`.

    use super::*;

    /// Create a tracing subscriber that respects the fieldguard config.
    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let config = config();
        let level = match config.level {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(config.color))
    }
}

// ============================================================================
// Tests
// ============================================================================
