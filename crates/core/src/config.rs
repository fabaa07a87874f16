//! Runtime configuration
//!
//! Values are read once at startup and passed explicitly into the engine
//! adapter, the sweeper and the commentary client. Each setting follows the
//! same precedence:
//! 1. environment variable if set and parseable
//! 2. built-in default

use std::path::PathBuf;

pub const DEFAULT_ENGINE_PATH: &str = "/usr/games/stockfish";
pub const DEFAULT_DEPTH: u8 = 18;
pub const DEFAULT_MULTIPV: u32 = 3;
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// How to launch the engine and what to ask it by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Executable to spawn
    pub path: PathBuf,
    /// Extra arguments passed to the executable
    pub args: Vec<String>,
    pub default_depth: u8,
    pub default_multipv: u32,
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            default_depth: DEFAULT_DEPTH,
            default_multipv: DEFAULT_MULTIPV,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup("STOCKFISH_PATH").unwrap_or_else(|| DEFAULT_ENGINE_PATH.to_string());
        let args = lookup("STOCKFISH_ARGS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            path: PathBuf::from(path),
            args,
            default_depth: parsed(lookup, "ANALYZER_DEPTH").unwrap_or(DEFAULT_DEPTH),
            default_multipv: parsed(lookup, "ANALYZER_MULTIPV").unwrap_or(DEFAULT_MULTIPV),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE_PATH)
    }
}

/// Settings for the language model collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryConfig {
    /// Commentary is disabled when no key is configured
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl CommentaryConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup("GOOGLE_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: lookup("GEMINI_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub commentary: CommentaryConfig,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            engine: EngineConfig::from_lookup(&lookup),
            commentary: CommentaryConfig::from_lookup(&lookup),
            bind_addr: lookup("ANALYZER_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
