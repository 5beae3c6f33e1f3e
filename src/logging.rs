//! Logging verbosity and subscriber setup
//!
//! The settings file picks one of five levels. Positive levels behave as
//! thresholds; `Optimization` is negative and only shows timing output.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Target used for tick timing logs
pub const OPTIMIZATION_TARGET: &str = "hotkey_edge::optimization";

/// How much gets logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LoggingLevel {
    /// Only timing output, for finding bottlenecks
    Optimization = -1,
    #[default]
    None = 0,
    Error = 1,
    /// Enough for players to see things work as expected
    Info = 2,
    /// Developer output
    Verbose = 3,
}

impl LoggingLevel {
    /// Whether a message logged at `at` is shown under this level
    ///
    /// Negative levels show only messages at exactly their value;
    /// non-negative levels show everything at or below them.
    pub fn allows(&self, at: LoggingLevel) -> bool {
        let current = *self as i8;
        current >= at as i8 || (current < 0 && current == at as i8)
    }

    /// Read the level from a settings value
    ///
    /// A missing or non-string value means `None`; an unknown level
    /// name means `Verbose`.
    pub fn from_setting(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => s.parse().unwrap_or(LoggingLevel::Verbose),
            _ => LoggingLevel::None,
        }
    }

    /// Filter directives for this level
    pub fn filter_directives(&self) -> String {
        match self {
            LoggingLevel::Optimization => format!("off,{}=trace", OPTIMIZATION_TARGET),
            LoggingLevel::None => "off".to_string(),
            LoggingLevel::Error => "error".to_string(),
            LoggingLevel::Info => "info".to_string(),
            LoggingLevel::Verbose => "debug".to_string(),
        }
    }
}

impl FromStr for LoggingLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "optimization" => Ok(LoggingLevel::Optimization),
            "none" => Ok(LoggingLevel::None),
            "error" => Ok(LoggingLevel::Error),
            "info" => Ok(LoggingLevel::Info),
            "verbose" => Ok(LoggingLevel::Verbose),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LoggingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingLevel::Optimization => write!(f, "Optimization"),
            LoggingLevel::None => write!(f, "None"),
            LoggingLevel::Error => write!(f, "Error"),
            LoggingLevel::Info => write!(f, "Info"),
            LoggingLevel::Verbose => write!(f, "Verbose"),
        }
    }
}

/// Build the subscriber filter: `RUST_LOG` wins, otherwise `level`
pub fn env_filter(level: LoggingLevel) -> EnvFilter {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter(directives.as_deref(), level)
}

/// Use `directives` when they parse, otherwise fall back to `level`
fn build_filter(directives: Option<&str>, level: LoggingLevel) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level.filter_directives()))
}

/// Install the global fmt subscriber
pub fn init(level: LoggingLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .init();
}

/// Run `f` under a plain-text subscriber filtered at `level` and return
/// what it logged
#[cfg(test)]
pub(crate) fn capture_logs<T>(level: LoggingLevel, f: impl FnOnce() -> T) -> (T, String) {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_env_filter(EnvFilter::new(level.filter_directives()))
        .finish();

    let out = tracing::subscriber::with_default(subscriber, f);
    let logged = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    (out, logged)
}
