//! # Polymorphic Types
//!
//! The full type language. Unlike [`Monotype`](super::mono::Monotype),
//! quantifiers may appear in any position, so annotations such as
//! `List (exists a . a)` or `{ f: forall a . a -> a }` are representable.
//! Existential placeholders are only ever *solved* to monotypes; the
//! conversions between the two layers live here.
//!
//! A quantifier binds a variable of one of three kinds:
//!
//! - `Type`: an ordinary type variable
//! - `Fields`: a row variable (the open tail of a record)
//! - `Alternatives`: a variant variable (the open tail of a union)

use std::fmt;

use super::existential::{Existential, RowDomain, TypeDomain, VariantDomain};
use super::mono::{self, Monotype, Row, Variant};

/// The kind of variable a quantifier binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Type,
    Fields,
    Alternatives,
}

impl Kind {
    pub fn pretty(&self) -> &'static str {
        match self {
            Kind::Type => "Type",
            Kind::Fields => "Fields",
            Kind::Alternatives => "Alternatives",
        }
    }
}

/// A possibly-polymorphic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Variable(String),
    Unsolved(Existential<TypeDomain>),
    /// `forall (a : k) . A`
    Forall(String, Kind, Box<Type>),
    /// `exists (a : k) . A`
    Exists(String, Kind, Box<Type>),
    Function(Box<Type>, Box<Type>),
    List(Box<Type>),
    Record(Fields),
    Union(Alternatives),
    Bool,
    Natural,
    Text,
}

/// Record fields over polymorphic types. The tail is shared with the
/// monotype layer: quantifiers cannot occur in a tail.
#[derive(Debug, Clone, Eq)]
pub struct Fields {
    pub fields: Vec<(String, Type)>,
    pub row: Row,
}

/// Union alternatives over polymorphic types.
#[derive(Debug, Clone, Eq)]
pub struct Alternatives {
    pub alternatives: Vec<(String, Type)>,
    pub variant: Variant,
}

impl Type {
    pub fn function(input: Type, output: Type) -> Self {
        Type::Function(Box::new(input), Box::new(output))
    }

    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn forall(name: impl Into<String>, kind: Kind, body: Type) -> Self {
        Type::Forall(name.into(), kind, Box::new(body))
    }

    pub fn exists(name: impl Into<String>, kind: Kind, body: Type) -> Self {
        Type::Exists(name.into(), kind, Box::new(body))
    }

    /// Embed a monotype into the full type language.
    pub fn from_monotype(monotype: &Monotype) -> Type {
        match monotype {
            Monotype::Variable(name) => Type::Variable(name.clone()),
            Monotype::Unsolved(existential) => Type::Unsolved(*existential),
            Monotype::Function(input, output) => {
                Type::function(Type::from_monotype(input), Type::from_monotype(output))
            }
            Monotype::List(element) => Type::list(Type::from_monotype(element)),
            Monotype::Record(fields) => Type::Record(Fields {
                fields: fields
                    .fields
                    .iter()
                    .map(|(label, ty)| (label.clone(), Type::from_monotype(ty)))
                    .collect(),
                row: fields.row.clone(),
            }),
            Monotype::Union(alternatives) => Type::Union(Alternatives {
                alternatives: alternatives
                    .alternatives
                    .iter()
                    .map(|(label, ty)| (label.clone(), Type::from_monotype(ty)))
                    .collect(),
                variant: alternatives.variant.clone(),
            }),
            Monotype::Bool => Type::Bool,
            Monotype::Natural => Type::Natural,
            Monotype::Text => Type::Text,
        }
    }

    /// Project back to a monotype. Returns `None` if a quantifier occurs
    /// anywhere in the type.
    pub fn to_monotype(&self) -> Option<Monotype> {
        match self {
            Type::Variable(name) => Some(Monotype::Variable(name.clone())),
            Type::Unsolved(existential) => Some(Monotype::Unsolved(*existential)),
            Type::Forall(..) | Type::Exists(..) => None,
            Type::Function(input, output) => Some(Monotype::function(
                input.to_monotype()?,
                output.to_monotype()?,
            )),
            Type::List(element) => Some(Monotype::list(element.to_monotype()?)),
            Type::Record(fields) => {
                let mut entries = Vec::with_capacity(fields.fields.len());
                for (label, ty) in &fields.fields {
                    entries.push((label.clone(), ty.to_monotype()?));
                }
                Some(Monotype::Record(mono::Fields {
                    fields: entries,
                    row: fields.row.clone(),
                }))
            }
            Type::Union(alternatives) => {
                let mut entries = Vec::with_capacity(alternatives.alternatives.len());
                for (label, ty) in &alternatives.alternatives {
                    entries.push((label.clone(), ty.to_monotype()?));
                }
                Some(Monotype::Union(mono::Alternatives {
                    alternatives: entries,
                    variant: alternatives.variant.clone(),
                }))
            }
            Type::Bool => Some(Monotype::Bool),
            Type::Natural => Some(Monotype::Natural),
            Type::Text => Some(Monotype::Text),
        }
    }

    /// Capture-avoiding substitution of the type variable `name`.
    pub fn substitute_type(&self, name: &str, replacement: &Type) -> Type {
        match self {
            Type::Variable(found) if found == name => replacement.clone(),
            Type::Variable(_) | Type::Unsolved(_) | Type::Bool | Type::Natural | Type::Text => {
                self.clone()
            }
            Type::Forall(bound, Kind::Type, _) | Type::Exists(bound, Kind::Type, _)
                if bound == name =>
            {
                // Shadowed: the inner occurrences refer to the inner binder.
                self.clone()
            }
            Type::Forall(bound, kind, body) => Type::forall(
                bound.clone(),
                *kind,
                body.substitute_type(name, replacement),
            ),
            Type::Exists(bound, kind, body) => Type::exists(
                bound.clone(),
                *kind,
                body.substitute_type(name, replacement),
            ),
            Type::Function(input, output) => Type::function(
                input.substitute_type(name, replacement),
                output.substitute_type(name, replacement),
            ),
            Type::List(element) => Type::list(element.substitute_type(name, replacement)),
            Type::Record(fields) => Type::Record(Fields {
                fields: fields
                    .fields
                    .iter()
                    .map(|(label, ty)| (label.clone(), ty.substitute_type(name, replacement)))
                    .collect(),
                row: fields.row.clone(),
            }),
            Type::Union(alternatives) => Type::Union(Alternatives {
                alternatives: alternatives
                    .alternatives
                    .iter()
                    .map(|(label, ty)| (label.clone(), ty.substitute_type(name, replacement)))
                    .collect(),
                variant: alternatives.variant.clone(),
            }),
        }
    }

    /// Capture-avoiding substitution of the row variable `name` in record
    /// tails.
    pub fn substitute_row(&self, name: &str, replacement: &Row) -> Type {
        match self {
            Type::Variable(_) | Type::Unsolved(_) | Type::Bool | Type::Natural | Type::Text => {
                self.clone()
            }
            Type::Forall(bound, Kind::Fields, _) | Type::Exists(bound, Kind::Fields, _)
                if bound == name =>
            {
                self.clone()
            }
            Type::Forall(bound, kind, body) => {
                Type::forall(bound.clone(), *kind, body.substitute_row(name, replacement))
            }
            Type::Exists(bound, kind, body) => {
                Type::exists(bound.clone(), *kind, body.substitute_row(name, replacement))
            }
            Type::Function(input, output) => Type::function(
                input.substitute_row(name, replacement),
                output.substitute_row(name, replacement),
            ),
            Type::List(element) => Type::list(element.substitute_row(name, replacement)),
            Type::Record(fields) => {
                let row = match &fields.row {
                    Row::Variable(found) if found == name => replacement.clone(),
                    other => other.clone(),
                };
                Type::Record(Fields {
                    fields: fields
                        .fields
                        .iter()
                        .map(|(label, ty)| (label.clone(), ty.substitute_row(name, replacement)))
                        .collect(),
                    row,
                })
            }
            Type::Union(alternatives) => Type::Union(Alternatives {
                alternatives: alternatives
                    .alternatives
                    .iter()
                    .map(|(label, ty)| (label.clone(), ty.substitute_row(name, replacement)))
                    .collect(),
                variant: alternatives.variant.clone(),
            }),
        }
    }

    /// Capture-avoiding substitution of the variant variable `name` in union
    /// tails.
    pub fn substitute_variant(&self, name: &str, replacement: &Variant) -> Type {
        match self {
            Type::Variable(_) | Type::Unsolved(_) | Type::Bool | Type::Natural | Type::Text => {
                self.clone()
            }
            Type::Forall(bound, Kind::Alternatives, _)
            | Type::Exists(bound, Kind::Alternatives, _)
                if bound == name =>
            {
                self.clone()
            }
            Type::Forall(bound, kind, body) => Type::forall(
                bound.clone(),
                *kind,
                body.substitute_variant(name, replacement),
            ),
            Type::Exists(bound, kind, body) => Type::exists(
                bound.clone(),
                *kind,
                body.substitute_variant(name, replacement),
            ),
            Type::Function(input, output) => Type::function(
                input.substitute_variant(name, replacement),
                output.substitute_variant(name, replacement),
            ),
            Type::List(element) => Type::list(element.substitute_variant(name, replacement)),
            Type::Record(fields) => Type::Record(Fields {
                fields: fields
                    .fields
                    .iter()
                    .map(|(label, ty)| (label.clone(), ty.substitute_variant(name, replacement)))
                    .collect(),
                row: fields.row.clone(),
            }),
            Type::Union(alternatives) => {
                let variant = match &alternatives.variant {
                    Variant::Variable(found) if found == name => replacement.clone(),
                    other => other.clone(),
                };
                Type::Union(Alternatives {
                    alternatives: alternatives
                        .alternatives
                        .iter()
                        .map(|(label, ty)| (label.clone(), ty.substitute_variant(name, replacement)))
                        .collect(),
                    variant,
                })
            }
        }
    }

    /// Does the type existential occur anywhere in this type?
    pub fn references_type(&self, existential: Existential<TypeDomain>) -> bool {
        match self {
            Type::Unsolved(found) => *found == existential,
            Type::Variable(_) | Type::Bool | Type::Natural | Type::Text => false,
            Type::Forall(_, _, body) | Type::Exists(_, _, body) => {
                body.references_type(existential)
            }
            Type::Function(input, output) => {
                input.references_type(existential) || output.references_type(existential)
            }
            Type::List(element) => element.references_type(existential),
            Type::Record(fields) => fields
                .fields
                .iter()
                .any(|(_, ty)| ty.references_type(existential)),
            Type::Union(alternatives) => alternatives
                .alternatives
                .iter()
                .any(|(_, ty)| ty.references_type(existential)),
        }
    }

    /// Does the row existential occur in any record tail in this type?
    pub fn references_row(&self, existential: Existential<RowDomain>) -> bool {
        match self {
            Type::Variable(_) | Type::Unsolved(_) | Type::Bool | Type::Natural | Type::Text => {
                false
            }
            Type::Forall(_, _, body) | Type::Exists(_, _, body) => body.references_row(existential),
            Type::Function(input, output) => {
                input.references_row(existential) || output.references_row(existential)
            }
            Type::List(element) => element.references_row(existential),
            Type::Record(fields) => {
                fields.row == Row::Unsolved(existential)
                    || fields
                        .fields
                        .iter()
                        .any(|(_, ty)| ty.references_row(existential))
            }
            Type::Union(alternatives) => alternatives
                .alternatives
                .iter()
                .any(|(_, ty)| ty.references_row(existential)),
        }
    }

    /// Does the variant existential occur in any union tail in this type?
    pub fn references_variant(&self, existential: Existential<VariantDomain>) -> bool {
        match self {
            Type::Variable(_) | Type::Unsolved(_) | Type::Bool | Type::Natural | Type::Text => {
                false
            }
            Type::Forall(_, _, body) | Type::Exists(_, _, body) => {
                body.references_variant(existential)
            }
            Type::Function(input, output) => {
                input.references_variant(existential) || output.references_variant(existential)
            }
            Type::List(element) => element.references_variant(existential),
            Type::Record(fields) => fields
                .fields
                .iter()
                .any(|(_, ty)| ty.references_variant(existential)),
            Type::Union(alternatives) => {
                alternatives.variant == Variant::Unsolved(existential)
                    || alternatives
                        .alternatives
                        .iter()
                        .any(|(_, ty)| ty.references_variant(existential))
            }
        }
    }

    /// Pretty form at the lowest precedence layer.
    pub fn pretty(&self) -> String {
        match self {
            Type::Forall(name, kind, body) => match kind {
                Kind::Type => format!("forall {} . {}", name, body.pretty()),
                other => format!("forall ({} : {}) . {}", name, other.pretty(), body.pretty()),
            },
            Type::Exists(name, kind, body) => match kind {
                Kind::Type => format!("exists {} . {}", name, body.pretty()),
                other => format!("exists ({} : {}) . {}", name, other.pretty(), body.pretty()),
            },
            Type::Function(input, output) => {
                format!("{} -> {}", input.pretty_application(), output.pretty())
            }
            _ => self.pretty_application(),
        }
    }

    fn pretty_application(&self) -> String {
        match self {
            Type::List(element) => format!("List {}", element.pretty_primitive()),
            _ => self.pretty_primitive(),
        }
    }

    fn pretty_primitive(&self) -> String {
        match self {
            Type::Variable(name) => name.clone(),
            Type::Unsolved(existential) => format!("{}?", existential.label()),
            Type::Record(fields) => fields.pretty(),
            Type::Union(alternatives) => alternatives.pretty(),
            Type::Bool => "Bool".to_string(),
            Type::Natural => "Natural".to_string(),
            Type::Text => "Text".to_string(),
            other => format!("({})", other.pretty()),
        }
    }
}

impl Fields {
    pub fn closed(fields: Vec<(String, Type)>) -> Self {
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

impl Alternatives {
    pub fn closed(alternatives: Vec<(String, Type)>) -> Self {
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

fn sorted_entries(entries: &[(String, Type)]) -> Vec<(&String, &Type)> {
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

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_forall() {
        let ty = Type::forall(
            "a",
            Kind::Type,
            Type::function(Type::Variable("a".to_string()), Type::Variable("a".to_string())),
        );
        assert_eq!(ty.pretty(), "forall a . a -> a");
    }

    #[test]
    fn test_pretty_row_quantifier() {
        let ty = Type::forall(
            "r",
            Kind::Fields,
            Type::Record(Fields {
                fields: vec![("x".to_string(), Type::Natural)],
                row: Row::Variable("r".to_string()),
            }),
        );
        assert_eq!(ty.pretty(), "forall (r : Fields) . { x: Natural | r }");
    }

    #[test]
    fn test_pretty_nested_quantifier() {
        let ty = Type::list(Type::exists("a", Kind::Type, Type::Variable("a".to_string())));
        assert_eq!(ty.pretty(), "List (exists a . a)");
    }

    #[test]
    fn test_substitute_type_shadowing() {
        // (forall a . a -> b)[b := Natural] leaves the bound a alone
        let ty = Type::forall(
            "a",
            Kind::Type,
            Type::function(Type::Variable("a".to_string()), Type::Variable("b".to_string())),
        );
        let substituted = ty.substitute_type("b", &Type::Natural);
        assert_eq!(
            substituted,
            Type::forall(
                "a",
                Kind::Type,
                Type::function(Type::Variable("a".to_string()), Type::Natural),
            )
        );

        // (forall a . a)[a := Natural] is unchanged
        let shadowed = Type::forall("a", Kind::Type, Type::Variable("a".to_string()));
        assert_eq!(shadowed.substitute_type("a", &Type::Natural), shadowed);
    }

    #[test]
    fn test_substitute_row() {
        let ty = Type::Record(Fields {
            fields: vec![("x".to_string(), Type::Natural)],
            row: Row::Variable("r".to_string()),
        });
        let substituted = ty.substitute_row("r", &Row::Empty);
        assert_eq!(
            substituted,
            Type::Record(Fields::closed(vec![("x".to_string(), Type::Natural)]))
        );
    }

    #[test]
    fn test_monotype_round_trip() {
        let ty = Type::function(Type::list(Type::Natural), Type::Bool);
        let monotype = ty.to_monotype().unwrap();
        assert_eq!(Type::from_monotype(&monotype), ty);
    }

    #[test]
    fn test_to_monotype_rejects_quantifiers() {
        let ty = Type::list(Type::forall("a", Kind::Type, Type::Variable("a".to_string())));
        assert_eq!(ty.to_monotype(), None);
    }

    #[test]
    fn test_references_type() {
        let existential = Existential::new(0);
        let other = Existential::new(1);
        let ty = Type::function(Type::Unsolved(existential), Type::Bool);
        assert!(ty.references_type(existential));
        assert!(!ty.references_type(other));
    }
}
