//! Pipeline executor that runs named processing configurations

use crate::jproc::attributes::AttributeGrammar;
use crate::jproc::config::{
    CompilerConfig, ConfigError, ConfigRegistry, ProcessingConfig, TargetSpec,
};
use crate::jproc::error::CompileError;
use crate::jproc::language::definition::standard_tokenizer;
use crate::jproc::language::semantic::SymbolTable;
use crate::jproc::lexing::Token;
use crate::jproc::transforms::standard;
use crate::jproc::tree::ParseTree;
use std::sync::Arc;

/// Output from pipeline execution
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutput {
    Tokens(Vec<Token>),
    Tree(ParseTree),
    Symbols(SymbolTable),
    Text(String),
}

/// Executes processing configurations against one attribute grammar
pub struct PipelineExecutor {
    registry: ConfigRegistry,
    config: CompilerConfig,
    grammar: Option<Arc<AttributeGrammar>>,
}

impl PipelineExecutor {
    /// Executor over the standard language with the default configurations
    pub fn new() -> Self {
        Self::with_registry(ConfigRegistry::with_defaults())
    }

    pub fn with_registry(registry: ConfigRegistry) -> Self {
        PipelineExecutor {
            registry,
            config: CompilerConfig::default(),
            grammar: None,
        }
    }

    /// Printer layout for `render` targets
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs with `grammar` instead of the standard tokenizer grammar
    pub fn with_grammar(mut self, grammar: Arc<AttributeGrammar>) -> Self {
        self.grammar = Some(grammar);
        self
    }

    /// Execute a named configuration
    pub fn execute(
        &self,
        config_name: &str,
        source: &str,
    ) -> Result<ExecutionOutput, CompileError> {
        let config = self
            .registry
            .get(config_name)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_string()))?;
        let grammar = match &self.grammar {
            Some(grammar) => grammar.clone(),
            None => standard_tokenizer()?,
        };
        log::debug!("executing '{}' with the {} grammar", config.name, grammar.name());

        let source = source.to_string();
        Ok(match config.target {
            TargetSpec::Tokens => ExecutionOutput::Tokens(standard::lexing(grammar).run(source)?),
            TargetSpec::Tree => ExecutionOutput::Tree(standard::to_tree(grammar).run(source)?),
            TargetSpec::Ast => ExecutionOutput::Tree(standard::to_ast(grammar).run(source)?),
            TargetSpec::Symbols => {
                ExecutionOutput::Symbols(standard::to_symbols(grammar).run(source)?)
            }
            TargetSpec::Render => {
                ExecutionOutput::Text(standard::to_text(grammar, &self.config).run(source)?)
            }
        })
    }

    /// Execute a named configuration and serialize its output: JSON for tokens and
    /// symbol tables, s-expressions for trees, rendered text as is.
    pub fn execute_to_string(
        &self,
        config_name: &str,
        source: &str,
    ) -> Result<String, CompileError> {
        match self.execute(config_name, source)? {
            ExecutionOutput::Tokens(tokens) => to_json(&tokens),
            ExecutionOutput::Symbols(symbols) => to_json(&symbols),
            ExecutionOutput::Tree(tree) => Ok(tree.to_sexp()),
            ExecutionOutput::Text(text) => Ok(text),
        }
    }

    /// List all available configurations
    pub fn list_configs(&self) -> Vec<&ProcessingConfig> {
        self.registry.list_all()
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }
}

impl Default for PipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CompileError> {
    serde_json::to_string_pretty(value).map_err(|e| CompileError::Output(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jproc::language::semantic::Value;

    #[test]
    fn test_executor_lists_defaults() {
        let executor = PipelineExecutor::default();
        assert_eq!(executor.list_configs().len(), 5);
        assert!(executor.registry().has("render"));
    }

    #[test]
    fn test_unknown_config() {
        let err = PipelineExecutor::new().execute("nope", "{}").unwrap_err();
        assert_eq!(err, CompileError::Config(ConfigError::NotFound("nope".into())));
    }

    #[test]
    fn test_execute_each_target() {
        let executor = PipelineExecutor::new();
        let source = r#"{"a": [1], "b": {"c": "d"}}"#;

        match executor.execute("tokens", source).unwrap() {
            ExecutionOutput::Tokens(tokens) => assert_eq!(tokens.len(), 13),
            other => panic!("unexpected output {:?}", other),
        }
        assert_eq!(
            executor.execute_to_string("ast", source).unwrap(),
            "(program (bind string array) (bind string (object (bind string string))))"
        );
        match executor.execute("symbols", source).unwrap() {
            ExecutionOutput::Symbols(symbols) => {
                assert_eq!(symbols.get("b.c"), Some(&Value::String("d".into())));
            }
            other => panic!("unexpected output {:?}", other),
        }
        assert!(executor
            .execute_to_string("tree", source)
            .unwrap()
            .starts_with("(document (program lbrace"));
    }

    #[test]
    fn test_render_follows_executor_config() {
        let executor = PipelineExecutor::new().with_config(CompilerConfig {
            indent_width: 3,
            trailing_newline: true,
        });
        let text = executor.execute_to_string("render", r#"{"a":{"b":1}}"#).unwrap();
        assert_eq!(text, "{\n   \"a\": {\n      \"b\": 1\n   }\n}\n");
    }

    #[test]
    fn test_symbols_serialize_in_order() {
        let json = PipelineExecutor::new()
            .execute_to_string("symbols", r#"{"z": true, "&let": ["a"]}"#)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(value["a"]["type"], "unbound");
    }
}
