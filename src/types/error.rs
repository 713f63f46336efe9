use std::fmt;

use lachs::Span;

use super::ty::Type;

/// Errors reported by type inference. One error ends the inference session;
/// there is no multi-error recovery.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    UnboundVariable {
        name: String,
        index: usize,
        span: Span,
    },
    /// The head of an application is not a function, a quantifier reducible
    /// to one, or an unsolved existential.
    NotAFunction {
        ty: Type,
        span: Span,
    },
    NotSubtype {
        actual: Type,
        expected: Type,
        span: Span,
    },
    MissingField {
        label: String,
        record: Type,
        span: Span,
    },
    MissingAlternative {
        label: String,
        union: Type,
        span: Span,
    },
    /// Solving the existential would build an infinite type.
    OccursCheck {
        existential: String,
        ty: Type,
    },
    /// An annotation mentions a variable with no binder in scope.
    NotWellFormed {
        ty: Type,
        span: Span,
    },
    /// A solution referenced an entry right of the existential being solved.
    OutOfScope {
        existential: String,
    },
    /// `merge` applied to something that is not a closed record of handlers.
    MergeNotAUnionHandler {
        ty: Type,
        span: Span,
    },
}

impl TypeError {
    pub fn unbound_variable(name: impl Into<String>, index: usize, span: Span) -> Self {
        TypeError::UnboundVariable {
            name: name.into(),
            index,
            span,
        }
    }

    pub fn not_a_function(ty: Type, span: Span) -> Self {
        TypeError::NotAFunction { ty, span }
    }

    pub fn not_subtype(actual: Type, expected: Type, span: Span) -> Self {
        TypeError::NotSubtype {
            actual,
            expected,
            span,
        }
    }

    pub fn missing_field(label: impl Into<String>, record: Type, span: Span) -> Self {
        TypeError::MissingField {
            label: label.into(),
            record,
            span,
        }
    }

    pub fn missing_alternative(label: impl Into<String>, union: Type, span: Span) -> Self {
        TypeError::MissingAlternative {
            label: label.into(),
            union,
            span,
        }
    }

    pub fn occurs_check(existential: impl Into<String>, ty: Type) -> Self {
        TypeError::OccursCheck {
            existential: existential.into(),
            ty,
        }
    }

    pub fn not_well_formed(ty: Type, span: Span) -> Self {
        TypeError::NotWellFormed { ty, span }
    }

    pub fn out_of_scope(existential: impl Into<String>) -> Self {
        TypeError::OutOfScope {
            existential: existential.into(),
        }
    }

    pub fn merge_not_a_union_handler(ty: Type, span: Span) -> Self {
        TypeError::MergeNotAUnionHandler { ty, span }
    }

    fn message(&self) -> String {
        match self {
            TypeError::UnboundVariable { name, index, .. } => {
                if *index == 0 {
                    format!("unbound variable: {}", name)
                } else {
                    format!("unbound variable: {}@{}", name, index)
                }
            }
            TypeError::NotAFunction { ty, .. } => {
                format!("cannot apply an expression of type {}", ty.pretty())
            }
            TypeError::NotSubtype {
                actual, expected, ..
            } => {
                format!(
                    "type mismatch: {} is not a subtype of {}",
                    actual.pretty(),
                    expected.pretty()
                )
            }
            TypeError::MissingField { label, record, .. } => {
                format!("record {} has no field named {}", record.pretty(), label)
            }
            TypeError::MissingAlternative { label, union, .. } => {
                format!(
                    "union {} has no alternative named {}",
                    union.pretty(),
                    label
                )
            }
            TypeError::OccursCheck { existential, ty } => {
                format!(
                    "cannot construct infinite type: {}? = {}",
                    existential,
                    ty.pretty()
                )
            }
            TypeError::NotWellFormed { ty, .. } => {
                format!("annotation {} is not well formed here", ty.pretty())
            }
            TypeError::OutOfScope { existential } => {
                format!("existential {}? solved out of scope", existential)
            }
            TypeError::MergeNotAUnionHandler { ty, .. } => {
                format!(
                    "merge expects a record of handler functions, not {}",
                    ty.pretty()
                )
            }
        }
    }

    fn span(&self) -> Option<&Span> {
        match self {
            TypeError::UnboundVariable { span, .. }
            | TypeError::NotAFunction { span, .. }
            | TypeError::NotSubtype { span, .. }
            | TypeError::MissingField { span, .. }
            | TypeError::MissingAlternative { span, .. }
            | TypeError::NotWellFormed { span, .. }
            | TypeError::MergeNotAUnionHandler { span, .. } => Some(span),
            TypeError::OccursCheck { .. } | TypeError::OutOfScope { .. } => None,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = self.message();
        match self.span() {
            Some(span) if !span.source.is_empty() => write!(f, "{}", span.to_string(&msg)),
            _ => write!(f, "Type error: {}", msg),
        }
    }
}

impl std::error::Error for TypeError {}
