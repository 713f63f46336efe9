//! # Monomorphic Types
//!
//! Quantifier-free types. These are the only shapes an existential may be
//! solved to, which is what keeps the inference algorithm predicative: a
//! placeholder never stands for a polymorphic type.
//!
//! Records and unions are *rows*: a list of labelled entries plus a tail.
//! A closed record `{ x: Natural }` has an empty tail; an open record
//! `{ x: Natural | r }` ends in a row variable or an unsolved row
//! existential. Unions mirror records exactly, with their own tail kind.
//!
//! Label order is preserved (it drives pretty-printing) but is irrelevant to
//! equality: `{ x: A, y: B }` equals `{ y: B, x: A }`.

use std::fmt;

use super::existential::{Existential, RowDomain, TypeDomain, VariantDomain};

/// A monomorphic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Monotype {
    /// A rigid type variable bound by a quantifier somewhere in scope.
    Variable(String),
    /// A unification placeholder that has not been solved yet.
    Unsolved(Existential<TypeDomain>),
    /// `A -> B`
    Function(Box<Monotype>, Box<Monotype>),
    /// `List A`
    List(Box<Monotype>),
    /// `{ x: A, y: B | tail }`
    Record(Fields),
    /// `< X: A, Y: B | tail >`
    Union(Alternatives),
    Bool,
    Natural,
    Text,
}

/// The fields of a record type together with its tail.
#[derive(Debug, Clone, Eq)]
pub struct Fields {
    pub fields: Vec<(String, Monotype)>,
    pub row: Row,
}

/// The tail of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// The record has exactly the listed fields.
    Empty,
    /// The remaining fields are a pending existential.
    Unsolved(Existential<RowDomain>),
    /// The remaining fields are a rigid row variable.
    Variable(String),
}

/// The alternatives of a union type together with its tail.
#[derive(Debug, Clone, Eq)]
pub struct Alternatives {
    pub alternatives: Vec<(String, Monotype)>,
    pub variant: Variant,
}

/// The tail of a union type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    Empty,
    Unsolved(Existential<VariantDomain>),
    Variable(String),
}

impl Monotype {
    pub fn function(input: Monotype, output: Monotype) -> Self {
        Monotype::Function(Box::new(input), Box::new(output))
    }

    pub fn list(element: Monotype) -> Self {
        Monotype::List(Box::new(element))
    }

    /// Pretty form at the lowest precedence (function types bare).
    pub fn pretty(&self) -> String {
        match self {
            Monotype::Function(input, output) => {
                format!("{} -> {}", input.pretty_application(), output.pretty())
            }
            _ => self.pretty_application(),
        }
    }

    fn pretty_application(&self) -> String {
        match self {
            Monotype::List(element) => format!("List {}", element.pretty_primitive()),
            _ => self.pretty_primitive(),
        }
    }

    fn pretty_primitive(&self) -> String {
        match self {
            Monotype::Variable(name) => name.clone(),
            Monotype::Unsolved(existential) => format!("{}?", existential.label()),
            Monotype::Record(fields) => fields.pretty(),
            Monotype::Union(alternatives) => alternatives.pretty(),
            Monotype::Bool => "Bool".to_string(),
            Monotype::Natural => "Natural".to_string(),
            Monotype::Text => "Text".to_string(),
            other => format!("({})", other.pretty()),
        }
    }
}

impl Fields {
    pub fn closed(fields: Vec<(String, Monotype)>) -> Self {
        Fields {
            fields,
            row: Row::Empty,
        }
    }

    pub fn pretty(&self) -> String {
        let entries = self
            .fields
            .iter()
            .map(|(label, ty)| format!("{}: {}", label, ty.pretty()))
            .collect::<Vec<_>>()
            .join(", ");
        match (&self.row, self.fields.is_empty()) {
            (Row::Empty, true) => "{ }".to_string(),
            (Row::Empty, false) => format!("{{ {} }}", entries),
            (tail, true) => format!("{{ | {} }}", tail.pretty()),
            (tail, false) => format!("{{ {} | {} }}", entries, tail.pretty()),
        }
    }
}

impl Row {
    pub fn pretty(&self) -> String {
        match self {
            Row::Empty => String::new(),
            Row::Unsolved(existential) => format!("{}?", existential.label()),
            Row::Variable(name) => name.clone(),
        }
    }
}

impl Alternatives {
    pub fn closed(alternatives: Vec<(String, Monotype)>) -> Self {
        Alternatives {
            alternatives,
            variant: Variant::Empty,
        }
    }

    pub fn pretty(&self) -> String {
        let entries = self
            .alternatives
            .iter()
            .map(|(label, ty)| format!("{}: {}", label, ty.pretty()))
            .collect::<Vec<_>>()
            .join(", ");
        match (&self.variant, self.alternatives.is_empty()) {
            (Variant::Empty, true) => "< >".to_string(),
            (Variant::Empty, false) => format!("< {} >", entries),
            (tail, true) => format!("< | {} >", tail.pretty()),
            (tail, false) => format!("< {} | {} >", entries, tail.pretty()),
        }
    }
}

impl Variant {
    pub fn pretty(&self) -> String {
        match self {
            Variant::Empty => String::new(),
            Variant::Unsolved(existential) => format!("{}?", existential.label()),
            Variant::Variable(name) => name.clone(),
        }
    }
}

fn sorted_entries(entries: &[(String, Monotype)]) -> Vec<(&String, &Monotype)> {
    let mut sorted: Vec<_> = entries.iter().map(|(label, ty)| (label, ty)).collect();
    sorted.sort_by_key(|(label, _)| label.as_str());
    sorted
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && sorted_entries(&self.fields) == sorted_entries(&other.fields)
    }
}

impl PartialEq for Alternatives {
    fn eq(&self, other: &Self) -> bool {
        self.variant == other.variant
            && sorted_entries(&self.alternatives) == sorted_entries(&other.alternatives)
    }
}

impl fmt::Display for Monotype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_function_associativity() {
        let ty = Monotype::function(
            Monotype::function(Monotype::Natural, Monotype::Natural),
            Monotype::Bool,
        );
        assert_eq!(ty.pretty(), "(Natural -> Natural) -> Bool");

        let ty = Monotype::function(
            Monotype::Natural,
            Monotype::function(Monotype::Natural, Monotype::Bool),
        );
        assert_eq!(ty.pretty(), "Natural -> Natural -> Bool");
    }

    #[test]
    fn test_pretty_list() {
        let ty = Monotype::list(Monotype::Natural);
        assert_eq!(ty.pretty(), "List Natural");

        let ty = Monotype::function(Monotype::list(Monotype::Natural), Monotype::Bool);
        assert_eq!(ty.pretty(), "List Natural -> Bool");

        let ty = Monotype::list(Monotype::function(Monotype::Natural, Monotype::Bool));
        assert_eq!(ty.pretty(), "List (Natural -> Bool)");
    }

    #[test]
    fn test_pretty_record() {
        let closed = Monotype::Record(Fields::closed(vec![
            ("x".to_string(), Monotype::Natural),
            ("y".to_string(), Monotype::Bool),
        ]));
        assert_eq!(closed.pretty(), "{ x: Natural, y: Bool }");

        let empty = Monotype::Record(Fields::closed(vec![]));
        assert_eq!(empty.pretty(), "{ }");

        let open = Monotype::Record(Fields {
            fields: vec![("x".to_string(), Monotype::Natural)],
            row: Row::Unsolved(Existential::new(1)),
        });
        assert_eq!(open.pretty(), "{ x: Natural | b? }");
    }

    #[test]
    fn test_pretty_union() {
        let union = Monotype::Union(Alternatives {
            alternatives: vec![("Some".to_string(), Monotype::Natural)],
            variant: Variant::Variable("v".to_string()),
        });
        assert_eq!(union.pretty(), "< Some: Natural | v >");
    }

    #[test]
    fn test_field_order_ignored_by_equality() {
        let left = Monotype::Record(Fields::closed(vec![
            ("x".to_string(), Monotype::Natural),
            ("y".to_string(), Monotype::Bool),
        ]));
        let right = Monotype::Record(Fields::closed(vec![
            ("y".to_string(), Monotype::Bool),
            ("x".to_string(), Monotype::Natural),
        ]));
        assert_eq!(left, right);
    }
}
