//! Integration tests for PipelineExecutor
//!
//! Every default configuration must run on every sample program.

use jproc::jproc::config::ConfigRegistry;
use jproc::jproc::executor::{ExecutionOutput, PipelineExecutor};
use jproc::jproc::testing::{sample, sample_names, SAMPLE_PROGRAM, SAMPLE_SYMBOLS};
use rstest::rstest;

#[rstest]
#[case::tokens("tokens")]
#[case::tree("tree")]
#[case::ast("ast")]
#[case::symbols("symbols")]
#[case::render("render")]
fn test_default_config_runs_on_all_samples(#[case] config: &str) {
    let executor = PipelineExecutor::new();
    for name in sample_names() {
        let source = sample(name).unwrap();
        let result = executor.execute_to_string(config, source);
        assert!(result.is_ok(), "'{}' failed on {}: {:?}", config, name, result);
    }
}

#[test]
fn test_symbols_output_on_reference_sample() {
    let executor = PipelineExecutor::new();
    match executor.execute("symbols", SAMPLE_PROGRAM).unwrap() {
        ExecutionOutput::Symbols(symbols) => {
            let names: Vec<&str> = symbols.names().collect();
            assert_eq!(names, SAMPLE_SYMBOLS.to_vec());
        }
        other => panic!("expected symbols, got {:?}", other),
    }
}

#[test]
fn test_render_output_on_reference_sample() {
    let executor = PipelineExecutor::new();
    let text = executor.execute_to_string("render", SAMPLE_PROGRAM).unwrap();
    assert_eq!(text, SAMPLE_PROGRAM);
}

#[test]
fn test_empty_sample_targets() {
    let executor = PipelineExecutor::new();
    let source = sample("empty.json").unwrap();
    assert_eq!(executor.execute_to_string("ast", source).unwrap(), "empty_object");
    assert_eq!(executor.execute_to_string("render", source).unwrap(), "{}\n");
    match executor.execute("symbols", source).unwrap() {
        ExecutionOutput::Symbols(symbols) => assert!(symbols.is_empty()),
        other => panic!("expected symbols, got {:?}", other),
    }
}

#[test]
fn test_custom_registry_from_yaml() {
    let registry =
        ConfigRegistry::from_yaml_str("- name: outline\n  description: AST only\n  target: ast\n")
            .unwrap();
    let executor = PipelineExecutor::with_registry(registry);
    assert_eq!(
        executor
            .execute_to_string("outline", "{\"a\": {\"b\": null}}")
            .unwrap(),
        "(program (bind string (object (bind string null))))"
    );
}
