//! Configuration
//!
//! Two kinds of settings:
//! 1. [`CompilerConfig`]: how the printer lays out source (indent width, trailing newline)
//! 2. [`ProcessingConfig`]: named pipelines the executor can run, each stopping at a
//!    [`TargetSpec`] (tokens, parse tree, AST, symbol table or rendered text)
//!
//! Both deserialize with serde, so they can be loaded from YAML or JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Layout settings for the printer grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Spaces per nesting level
    pub indent_width: usize,
    /// Whether rendered text ends with a line break
    pub trailing_newline: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            indent_width: 2,
            trailing_newline: true,
        }
    }
}

impl CompilerConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Leading whitespace for `depth` levels of nesting.
    pub fn indent(&self, depth: usize) -> String {
        " ".repeat(self.indent_width * depth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Yaml(String),
    Json(String),
    NotFound(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Yaml(msg) => write!(f, "invalid YAML configuration: {}", msg),
            ConfigError::Json(msg) => write!(f, "invalid JSON configuration: {}", msg),
            ConfigError::NotFound(name) => write!(f, "Config '{}' not found", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where a pipeline stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSpec {
    /// Folded, validated tokens
    Tokens,
    /// The full parse tree
    Tree,
    /// The simplified tree
    Ast,
    Symbols,
    /// Canonically formatted source
    Render,
}

/// A named pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target: TargetSpec,
}

/// Registry of processing configurations
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    configs: HashMap<String, ProcessingConfig>,
}

impl ConfigRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ConfigRegistry {
            configs: HashMap::new(),
        }
    }

    /// Register a configuration, replacing any with the same name
    pub fn register(&mut self, config: ProcessingConfig) {
        self.configs.insert(config.name.clone(), config);
    }

    pub fn get(&self, name: &str) -> Option<&ProcessingConfig> {
        self.configs.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    /// List all configurations (sorted by name)
    pub fn list_all(&self) -> Vec<&ProcessingConfig> {
        let mut configs: Vec<_> = self.configs.values().collect();
        configs.sort_by(|a, b| a.name.cmp(&b.name));
        configs
    }

    /// Create registry with one configuration per target
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults = [
            ("tokens", "Lex and fold, output tokens", TargetSpec::Tokens),
            ("tree", "Parse, output the full parse tree", TargetSpec::Tree),
            ("ast", "Parse and simplify, output the AST", TargetSpec::Ast),
            (
                "symbols",
                "Run the semantic pass, output the symbol table",
                TargetSpec::Symbols,
            ),
            (
                "render",
                "Run the printer, output formatted source",
                TargetSpec::Render,
            ),
        ];
        for (name, description, target) in defaults {
            registry.register(ProcessingConfig {
                name: name.into(),
                description: description.into(),
                target,
            });
        }
        registry
    }

    /// Adds the configurations listed in a YAML sequence to the defaults.
    ///
    /// ```yaml
    /// - name: outline
    ///   description: Simplified tree
    ///   target: ast
    /// ```
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let configs: Vec<ProcessingConfig> =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        let mut registry = Self::with_defaults();
        for config in configs {
            registry.register(config);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
