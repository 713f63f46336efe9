//! Call-by-value normalizer.
//!
//! Runs after inference succeeded, so any ill-typed state reached here is an
//! implementation bug and panics rather than returning an error. The only
//! sanctioned stuck states are free variables and builtins over neutrals.

use crate::ast::{Builtin, Operator, ScalarValue, Syntax};

use super::environment::Environment;
use super::value::{Closure, Value};

/// Evaluate an expression under the given environment. Free variables
/// evaluate to neutral values.
pub fn evaluate(environment: &Environment, syntax: &Syntax) -> Value {
    match syntax {
        Syntax::Variable(variable) => environment
            .lookup(&variable.name, variable.index)
            .cloned()
            .unwrap_or_else(|| Value::Variable(variable.name.clone(), variable.index)),
        Syntax::Lambda(lambda) => Value::Closure(Closure {
            parameter: lambda.parameter.clone(),
            environment: environment.clone(),
            body: (*lambda.body).clone(),
        }),
        Syntax::Application(application) => {
            let function = evaluate(environment, &application.function);
            let argument = evaluate(environment, &application.argument);
            apply(function, argument)
        }
        Syntax::Let(let_) => {
            let mut environment = environment.clone();
            for binding in &let_.bindings {
                let value = evaluate(&environment, &binding.value);
                environment.bind(binding.name.clone(), value);
            }
            evaluate(&environment, &let_.body)
        }
        Syntax::Annotation(annotation) => evaluate(environment, &annotation.expression),
        Syntax::List(list) => Value::List(
            list.elements
                .iter()
                .map(|element| evaluate(environment, element))
                .collect(),
        ),
        Syntax::Record(record) => Value::Record(
            record
                .fields
                .iter()
                .map(|(label, value)| (label.clone(), evaluate(environment, value)))
                .collect(),
        ),
        Syntax::Projection(projection) => {
            let record = evaluate(environment, &projection.record);
            match record {
                Value::Record(fields) => fields
                    .into_iter()
                    .find(|(label, _)| label == &projection.label)
                    .map(|(_, value)| value)
                    .unwrap_or_else(|| {
                        panic!("field {} missing after type checking", projection.label)
                    }),
                other => panic!("projected from a non-record value: {}", other),
            }
        }
        Syntax::Alternative(alternative) => Value::Alternative(alternative.name.clone()),
        Syntax::Merge(merge) => Value::Merge(Box::new(evaluate(environment, &merge.handlers))),
        Syntax::If(if_) => match evaluate(environment, &if_.predicate) {
            Value::Bool(true) => evaluate(environment, &if_.if_true),
            Value::Bool(false) => evaluate(environment, &if_.if_false),
            other => panic!("if predicate was not a boolean: {}", other),
        },
        Syntax::Scalar(scalar) => match &scalar.value {
            ScalarValue::Bool(value) => Value::Bool(*value),
            ScalarValue::Natural(value) => Value::Natural(*value),
            ScalarValue::Text(value) => Value::Text(value.clone()),
        },
        Syntax::Operator(operator) => evaluate_operator(environment, operator),
        Syntax::Builtin(builtin) => Value::Builtin(builtin.builtin, Vec::new()),
        Syntax::Embedded(embedded) => evaluate(environment, &embedded.inner),
    }
}

/// Apply a function value to an argument value.
pub fn apply(function: Value, argument: Value) -> Value {
    match function {
        Value::Closure(closure) => {
            let mut environment = closure.environment;
            environment.bind(closure.parameter, argument);
            evaluate(&environment, &closure.body)
        }
        Value::Alternative(tag) => Value::Tagged(tag, Box::new(argument)),
        Value::Merge(handlers) => match argument {
            Value::Tagged(tag, payload) => {
                let handler = match handlers.as_ref() {
                    Value::Record(fields) => fields
                        .iter()
                        .find(|(label, _)| label == &tag)
                        .map(|(_, handler)| handler.clone()),
                    _ => None,
                };
                match handler {
                    Some(handler) => apply(handler, *payload),
                    None => panic!("no handler for alternative {} after type checking", tag),
                }
            }
            neutral @ (Value::Variable(..) | Value::Application(..)) => {
                Value::Application(Box::new(Value::Merge(handlers)), Box::new(neutral))
            }
            other => panic!("merge applied to a non-tagged value: {}", other),
        },
        Value::Builtin(builtin, mut arguments) => {
            arguments.push(argument);
            if arguments.len() == builtin_arity(builtin) {
                run_builtin(builtin, arguments)
            } else {
                Value::Builtin(builtin, arguments)
            }
        }
        neutral @ (Value::Variable(..) | Value::Application(..)) => {
            Value::Application(Box::new(neutral), Box::new(argument))
        }
        other => panic!("applied a non-function value: {}", other),
    }
}

fn evaluate_operator(
    environment: &Environment,
    operator: &crate::ast::OperatorExpr,
) -> Value {
    match operator.operator {
        // Short-circuiting: the right operand only runs when needed.
        Operator::And => match evaluate(environment, &operator.left) {
            Value::Bool(false) => Value::Bool(false),
            Value::Bool(true) => match evaluate(environment, &operator.right) {
                Value::Bool(value) => Value::Bool(value),
                other => panic!("&& applied to a non-boolean: {}", other),
            },
            other => panic!("&& applied to a non-boolean: {}", other),
        },
        Operator::Or => match evaluate(environment, &operator.left) {
            Value::Bool(true) => Value::Bool(true),
            Value::Bool(false) => match evaluate(environment, &operator.right) {
                Value::Bool(value) => Value::Bool(value),
                other => panic!("|| applied to a non-boolean: {}", other),
            },
            other => panic!("|| applied to a non-boolean: {}", other),
        },
        Operator::Plus | Operator::Times => {
            let left = evaluate(environment, &operator.left);
            let right = evaluate(environment, &operator.right);
            match (left, right) {
                (Value::Natural(left), Value::Natural(right)) => match operator.operator {
                    Operator::Plus => Value::Natural(left + right),
                    _ => Value::Natural(left * right),
                },
                (left, right) => panic!(
                    "{} applied to non-naturals: {} and {}",
                    operator.operator.symbol(),
                    left,
                    right
                ),
            }
        }
        Operator::Append => {
            let left = evaluate(environment, &operator.left);
            let right = evaluate(environment, &operator.right);
            match (left, right) {
                (Value::Text(mut left), Value::Text(right)) => {
                    left.push_str(&right);
                    Value::Text(left)
                }
                (Value::List(mut left), Value::List(right)) => {
                    left.extend(right);
                    Value::List(left)
                }
                (left, right) => panic!("++ applied to {} and {}", left, right),
            }
        }
    }
}

fn builtin_arity(builtin: Builtin) -> usize {
    match builtin {
        Builtin::Not | Builtin::Even | Builtin::Odd | Builtin::Length => 1,
        Builtin::Map => 2,
    }
}

/// Run a saturated builtin. A neutral argument leaves the whole application
/// stuck instead of producing a value.
fn run_builtin(builtin: Builtin, arguments: Vec<Value>) -> Value {
    let stuck = |arguments: Vec<Value>| Value::Builtin(builtin, arguments);
    match builtin {
        Builtin::Not => match &arguments[0] {
            Value::Bool(value) => Value::Bool(!value),
            Value::Variable(..) | Value::Application(..) => stuck(arguments),
            other => panic!("not applied to a non-boolean: {}", other),
        },
        Builtin::Even => match &arguments[0] {
            Value::Natural(value) => Value::Bool(value % 2 == 0),
            Value::Variable(..) | Value::Application(..) => stuck(arguments),
            other => panic!("even applied to a non-natural: {}", other),
        },
        Builtin::Odd => match &arguments[0] {
            Value::Natural(value) => Value::Bool(value % 2 == 1),
            Value::Variable(..) | Value::Application(..) => stuck(arguments),
            other => panic!("odd applied to a non-natural: {}", other),
        },
        Builtin::Length => match &arguments[0] {
            Value::List(elements) => Value::Natural(elements.len() as u64),
            Value::Variable(..) | Value::Application(..) => stuck(arguments),
            other => panic!("length applied to a non-list: {}", other),
        },
        Builtin::Map => match &arguments[1] {
            Value::List(elements) => Value::List(
                elements
                    .iter()
                    .map(|element| apply(arguments[0].clone(), element.clone()))
                    .collect(),
            ),
            Value::Variable(..) | Value::Application(..) => stuck(arguments),
            other => panic!("map applied to a non-list: {}", other),
        },
    }
}
