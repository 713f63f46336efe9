//! Reed - a small functional language with open records and open unions.
//!
//! The pipeline is lex → parse → infer → evaluate. Inference is
//! bidirectional with an ordered context (rows and variants included), and
//! evaluation is a call-by-value normalizer over the unannotated tree.

pub mod ast;
pub mod import;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod types;

use ast::{Annotation, Syntax};
use interpreter::{Environment, Value};
use types::{Infer, Type, TypeError};

/// Infer the principal type of an expression under an empty context.
pub fn type_of(syntax: &Syntax) -> Result<Type, TypeError> {
    Infer::new().infer(syntax)
}

/// Evaluate an expression under the given environment.
pub fn evaluate(environment: &Environment, syntax: &Syntax) -> Value {
    interpreter::evaluate(environment, syntax)
}

/// Infer and evaluate in one step, optionally checking against a
/// caller-supplied annotation first.
pub fn interpret(annotation: Option<Type>, syntax: Syntax) -> Result<(Type, Value), TypeError> {
    let syntax = match annotation {
        Some(annotation) => {
            let position = syntax.position();
            Syntax::Annotation(Annotation {
                expression: Box::new(syntax),
                annotation,
                position,
            })
        }
        None => syntax,
    };
    let ty = type_of(&syntax)?;
    let value = evaluate(&Environment::new(), &syntax);
    Ok((ty, value))
}
