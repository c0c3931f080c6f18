use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Bundled default configuration, validated by `build.rs`.
pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub grammar: Grammar,
    pub render: RenderConfig,
}

/// The math grammar the segmenter scans for.
///
/// Delimiter pairs are tried in declaration order at every scan offset, so
/// longer openers that share a prefix with shorter ones (`$$` vs `$`) must
/// come first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Grammar {
    pub delimiters: Vec<Delimiter>,
    pub symbols: Vec<char>,
    pub commands: bool,
    pub command_arguments: bool,
    pub command_whitelist: Vec<String>,
}

/// An explicit math delimiter pair such as `$$ ... $$`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Delimiter {
    pub open: String,
    pub close: String,
    #[serde(default)]
    pub block: bool,
}

impl Delimiter {
    pub fn new(open: &str, close: &str, block: bool) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
            block,
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            delimiters: vec![Delimiter::new("$$", "$$", true), Delimiter::new("$", "$", false)],
            symbols: vec![
                '∫', '∑', '∏', '√', '∞', 'α', 'β', 'γ', 'δ', 'ε', 'θ', 'λ', 'μ', 'π', 'σ', 'τ',
                'φ', 'ψ', 'ω',
            ],
            commands: true,
            command_arguments: true,
            command_whitelist: Vec::new(),
        }
    }
}

impl Grammar {
    /// Only `$$...$$` and `$...$` are recognised.
    pub fn delimited_only() -> Self {
        Self {
            symbols: Vec::new(),
            commands: false,
            ..Self::default()
        }
    }

    /// Delimiters plus the symbol whitelist, but no implicit commands.
    pub fn with_symbols() -> Self {
        Self {
            commands: false,
            ..Self::default()
        }
    }

    pub fn is_symbol(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }

    pub fn allows_command(&self, name: &str) -> bool {
        self.commands
            && (self.command_whitelist.is_empty()
                || self.command_whitelist.iter().any(|allowed| allowed == name))
    }

    /// Drop delimiter entries that could never match.
    fn sanitize(&mut self) {
        self.delimiters.retain(|d| {
            let usable = !d.open.is_empty() && !d.close.is_empty();
            if !usable {
                log::warn!("ignoring math delimiter with an empty open or close marker");
            }
            usable
        });
    }
}

/// Settings for the bundled HTML renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub error_color: String,
    pub math_class: String,
    pub block_math_class: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            error_color: "#d32f2f".to_string(),
            math_class: "math".to_string(),
            block_math_class: "math-block".to_string(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        config.grammar.sanitize();
        Ok(config)
    }

    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load config from a TOML file, or return defaults if it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Read { .. }) => Self::default(),
            Err(e) => {
                log::warn!("{}; using default config", e);
                Self::default()
            }
        }
    }
}
