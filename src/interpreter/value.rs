use std::fmt;

use crate::ast::{Builtin, Syntax};

use super::environment::Environment;

/// Runtime values. Immutable; sharing happens through cloning, which is
/// cheap enough for a reference evaluator.
///
/// `Variable` and `Application` are the neutral (stuck) forms: they only
/// appear when evaluating an open term or when a builtin meets a neutral
/// argument.
#[derive(Debug, Clone)]
pub enum Value {
    /// A free variable; evaluation got stuck here.
    Variable(String, usize),
    Closure(Closure),
    /// An application whose head is neutral.
    Application(Box<Value>, Box<Value>),
    List(Vec<Value>),
    Record(Vec<(String, Value)>),
    /// A union constructor that has not received its payload yet.
    Alternative(String),
    /// A union constructor applied to its payload.
    Tagged(String, Box<Value>),
    /// `merge handlers`, waiting for a tagged value.
    Merge(Box<Value>),
    /// A builtin, possibly partially applied.
    Builtin(Builtin, Vec<Value>),
    Bool(bool),
    Natural(u64),
    Text(String),
}

/// A lambda together with its captured environment.
#[derive(Debug, Clone)]
pub struct Closure {
    pub parameter: String,
    pub environment: Environment,
    pub body: Syntax,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Variable(name, 0) => write!(f, "{}", name),
            Value::Variable(name, index) => write!(f, "{}@{}", name, index),
            Value::Closure(closure) => write!(f, "\\{} -> ...", closure.parameter),
            Value::Application(function, argument) => {
                write!(f, "{} {}", function, argument)
            }
            Value::List(elements) => {
                let rendered = elements
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{}]", rendered)
            }
            Value::Record(fields) => {
                if fields.is_empty() {
                    return write!(f, "{{ }}");
                }
                let rendered = fields
                    .iter()
                    .map(|(label, value)| format!("{} = {}", label, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{ {} }}", rendered)
            }
            Value::Alternative(tag) => write!(f, "{}", tag),
            Value::Tagged(tag, payload) => write!(f, "{} {}", tag, payload),
            Value::Merge(handlers) => write!(f, "merge {}", handlers),
            Value::Builtin(builtin, arguments) => {
                write!(f, "{}", builtin.name())?;
                for argument in arguments {
                    write!(f, " {}", argument)?;
                }
                Ok(())
            }
            Value::Bool(value) => write!(f, "{}", value),
            Value::Natural(value) => write!(f, "{}", value),
            Value::Text(value) => write!(f, "{:?}", value),
        }
    }
}
