//! Compilation pipelines
//!
//! A compilation is a chain of stages (input check, scan, fold, parse, evaluate...), each a
//! [`Runnable`]. [`Transform`] strings stages together and keeps their names, so a pipeline
//! can report what it runs and which stage stopped it:
//!
//! ```rust,ignore
//! let pipeline = Transform::start()
//!     .then(InputCheck::new())                 // String → String
//!     .then(Tokenization::new(grammar.clone())) // String → Vec<Token>
//!     .then(TreeBuilding::new(grammar));        // Vec<Token> → ParseTree
//! assert_eq!(pipeline.stages(), ["InputCheck", "Tokenization", "TreeBuilding"]);
//! ```
//!
//! Stages share [`CompileError`]. The first failing stage ends the run and its error comes
//! back unchanged.
//!
//! - [`stages`]: one stage per compilation step
//! - [`standard`]: the pipelines the executor and the compiler entry points run

pub mod stages;
pub mod standard;

use crate::jproc::error::CompileError;

/// One compilation step from `I` to `O`.
pub trait Runnable<I, O> {
    fn run(&self, input: I) -> Result<O, CompileError>;

    /// The name pipelines list this stage under: the bare type name.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }
}

type StageFn<I, O> = Box<dyn Fn(I) -> Result<O, CompileError> + Send + Sync>;

/// A chain of stages turning an `I` into an `O`.
pub struct Transform<I, O> {
    stages: Vec<&'static str>,
    run_fn: StageFn<I, O>,
}

impl<I: 'static> Transform<I, I> {
    /// The empty pipeline, passing its input through.
    pub fn start() -> Self {
        Transform {
            stages: Vec::new(),
            run_fn: Box::new(Ok),
        }
    }
}

impl<I, O> Transform<I, O> {
    /// An unnamed step built from a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(I) -> Result<O, CompileError> + Send + Sync + 'static,
    {
        Transform {
            stages: Vec::new(),
            run_fn: Box::new(f),
        }
    }

    /// Appends `stage`, fed with this pipeline's output.
    pub fn then<O2, S>(self, stage: S) -> Transform<I, O2>
    where
        S: Runnable<O, O2> + Send + Sync + 'static,
        I: 'static,
        O: 'static,
        O2: 'static,
    {
        let name = stage.name();
        let mut stages = self.stages;
        stages.push(name);
        let prev = self.run_fn;
        Transform {
            stages,
            run_fn: Box::new(move |input| {
                let intermediate = prev(input)?;
                log::trace!("running stage {}", name);
                stage.run(intermediate).map_err(|err| {
                    log::debug!("stage {} failed: {}", name, err);
                    err
                })
            }),
        }
    }

    /// Appends every stage of `next`.
    pub fn then_transform<O2>(self, next: Transform<O, O2>) -> Transform<I, O2>
    where
        I: 'static,
        O: 'static,
        O2: 'static,
    {
        let mut stages = self.stages;
        stages.extend(next.stages);
        let (prev, next) = (self.run_fn, next.run_fn);
        Transform {
            stages,
            run_fn: Box::new(move |input| next(prev(input)?)),
        }
    }

    /// Stage names in run order. Closures from [`Transform::from_fn`] are not listed.
    pub fn stages(&self) -> &[&'static str] {
        &self.stages
    }

    pub fn run(&self, input: I) -> Result<O, CompileError> {
        (self.run_fn)(input)
    }
}

impl<I, O> Runnable<I, O> for Transform<I, O>
where
    I: 'static,
    O: 'static,
{
    fn run(&self, input: I) -> Result<O, CompileError> {
        Transform::run(self, input)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

#[cfg(test)]
mod tests {
    use super::stages::{Folding, InputCheck, Tokenization, TreeBuilding};
    use super::*;
    use crate::jproc::input::InputError;
    use crate::jproc::language::definition::standard_tokenizer;
    use crate::jproc::lexing::Token;
    use crate::jproc::testing::{sample, token_names};

    #[test]
    fn test_stages_run_over_a_sample() {
        let grammar = standard_tokenizer().unwrap();
        let pipeline = Transform::start()
            .then(InputCheck::new())
            .then(Tokenization::new(grammar.clone()))
            .then(Folding::new(grammar));
        assert_eq!(pipeline.stages(), ["InputCheck", "Tokenization", "Folding"]);

        let source = sample("compact.json").unwrap().to_string();
        let tokens = pipeline.run(source).unwrap();
        let names = token_names(&tokens);
        assert_eq!(names.first(), Some(&"lbrace"));
        assert_eq!(names.last(), Some(&"rbrace"));
        assert!(names.contains(&"array"));
        assert!(!names.contains(&"lbracket"));
    }

    #[test]
    fn test_first_failing_stage_ends_the_run() {
        let grammar = standard_tokenizer().unwrap();
        let pipeline = Transform::start()
            .then(InputCheck::new())
            .then(Tokenization::new(grammar))
            .then(Transform::from_fn(|_: Vec<Token>| -> Result<Vec<Token>, CompileError> {
                Err(CompileError::Output("not reached".to_string()))
            }));
        assert_eq!(pipeline.stages(), ["InputCheck", "Tokenization", "pipeline"]);

        assert_eq!(
            pipeline.run("[1, 2]".to_string()),
            Err(CompileError::Input(InputError::NotAnObject))
        );
        assert_eq!(
            pipeline.run("{}".to_string()),
            Err(CompileError::Output("not reached".to_string()))
        );
    }

    #[test]
    fn test_then_transform_joins_stage_lists() {
        let grammar = standard_tokenizer().unwrap();
        let lexing = Transform::start()
            .then(Tokenization::new(grammar.clone()))
            .then(Folding::new(grammar.clone()));
        let parsing = Transform::start().then(TreeBuilding::new(grammar));

        let pipeline = lexing.then_transform(parsing);
        assert_eq!(pipeline.stages(), ["Tokenization", "Folding", "TreeBuilding"]);
        let tree = pipeline.run(r#"{"a": [1, 2]}"#.to_string()).unwrap();
        assert!(tree.to_sexp().starts_with("(document (program lbrace"));
    }
}
