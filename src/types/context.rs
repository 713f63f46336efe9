//! # The Ordered Typing Context
//!
//! Inference works by splicing an ordered list of entries. The ordering is
//! load-bearing: whenever an existential is solved in terms of another, the
//! referenced one must already appear to its *left*. `solve_*` enforce this
//! by checking the solution against the prefix, which is what keeps the
//! algorithm decidable and its results principal.
//!
//! Entries come in three families: rigid variables and term annotations
//! (scope), unsolved/solved existentials of each domain (pending work), and
//! markers (checkpoints that bound the lifetime of local existentials).

use super::error::TypeError;
use super::existential::{Existential, RowDomain, TypeDomain, VariantDomain};
use super::mono::{self, Monotype, Row, Variant};
use super::ty::{self, Kind, Type};

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A rigid variable in scope, introduced by a quantifier.
    Variable(String, Kind),
    /// A term variable together with its type.
    Annotation(String, Type),
    UnsolvedType(Existential<TypeDomain>),
    SolvedType(Existential<TypeDomain>, Monotype),
    UnsolvedRow(Existential<RowDomain>),
    SolvedRow(Existential<RowDomain>, mono::Fields),
    UnsolvedVariant(Existential<VariantDomain>),
    SolvedVariant(Existential<VariantDomain>, mono::Alternatives),
    /// A checkpoint for [`Context::discard`].
    Marker(Existential<TypeDomain>),
}

/// The ordered inference context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: Vec<Entry>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Look up the annotation for a term variable. The index skips that many
    /// bindings of the same name, rightmost first.
    pub fn lookup(&self, name: &str, index: usize) -> Option<Type> {
        self.entries
            .iter()
            .rev()
            .filter_map(|entry| match entry {
                Entry::Annotation(found, ty) if found == name => Some(ty),
                _ => None,
            })
            .nth(index)
            .cloned()
    }

    /// Truncate the context at the rightmost occurrence of `entry`,
    /// discarding it and everything to its right.
    pub fn discard(mut self, entry: &Entry) -> Context {
        if let Some(index) = self.entries.iter().rposition(|found| found == entry) {
            self.entries.truncate(index);
        }
        self
    }

    /// Remove only the rightmost occurrence of `entry`, keeping everything
    /// around it. Used for annotations whose scope ends while existentials
    /// introduced after them must survive.
    pub fn delete(mut self, entry: &Entry) -> Context {
        if let Some(index) = self.entries.iter().rposition(|found| found == entry) {
            self.entries.remove(index);
        }
        self
    }

    pub fn has_unsolved_type(&self, existential: Existential<TypeDomain>) -> bool {
        self.entries
            .iter()
            .any(|entry| *entry == Entry::UnsolvedType(existential))
    }

    pub fn has_unsolved_row(&self, existential: Existential<RowDomain>) -> bool {
        self.entries
            .iter()
            .any(|entry| *entry == Entry::UnsolvedRow(existential))
    }

    pub fn has_unsolved_variant(&self, existential: Existential<VariantDomain>) -> bool {
        self.entries
            .iter()
            .any(|entry| *entry == Entry::UnsolvedVariant(existential))
    }

    /// Does the unsolved entry for `left` appear strictly before the one for
    /// `right`?
    pub fn type_precedes(
        &self,
        left: Existential<TypeDomain>,
        right: Existential<TypeDomain>,
    ) -> bool {
        let position = |target: &Entry| self.entries.iter().position(|entry| entry == target);
        match (
            position(&Entry::UnsolvedType(left)),
            position(&Entry::UnsolvedType(right)),
        ) {
            (Some(l), Some(r)) => l < r,
            _ => false,
        }
    }

    pub fn row_precedes(
        &self,
        left: Existential<RowDomain>,
        right: Existential<RowDomain>,
    ) -> bool {
        let position = |target: &Entry| self.entries.iter().position(|entry| entry == target);
        match (
            position(&Entry::UnsolvedRow(left)),
            position(&Entry::UnsolvedRow(right)),
        ) {
            (Some(l), Some(r)) => l < r,
            _ => false,
        }
    }

    pub fn variant_precedes(
        &self,
        left: Existential<VariantDomain>,
        right: Existential<VariantDomain>,
    ) -> bool {
        let position = |target: &Entry| self.entries.iter().position(|entry| entry == target);
        match (
            position(&Entry::UnsolvedVariant(left)),
            position(&Entry::UnsolvedVariant(right)),
        ) {
            (Some(l), Some(r)) => l < r,
            _ => false,
        }
    }

    /// Assign a monotype to a pending existential. The solution may only
    /// mention entries to the *left* of the existential; anything else is an
    /// ordering violation.
    pub fn solve_type(
        mut self,
        existential: Existential<TypeDomain>,
        solution: Monotype,
    ) -> Result<Context, TypeError> {
        let target = Entry::UnsolvedType(existential);
        let index = self
            .entries
            .iter()
            .position(|entry| *entry == target)
            .ok_or_else(|| TypeError::out_of_scope(existential.label()))?;
        if !monotype_well_formed(&self.entries[..index], &solution) {
            return Err(TypeError::out_of_scope(existential.label()));
        }
        self.entries[index] = Entry::SolvedType(existential, solution);
        Ok(self)
    }

    pub fn solve_row(
        mut self,
        existential: Existential<RowDomain>,
        solution: mono::Fields,
    ) -> Result<Context, TypeError> {
        let target = Entry::UnsolvedRow(existential);
        let index = self
            .entries
            .iter()
            .position(|entry| *entry == target)
            .ok_or_else(|| TypeError::out_of_scope(existential.label()))?;
        if !fields_well_formed(&self.entries[..index], &solution) {
            return Err(TypeError::out_of_scope(existential.label()));
        }
        self.entries[index] = Entry::SolvedRow(existential, solution);
        Ok(self)
    }

    pub fn solve_variant(
        mut self,
        existential: Existential<VariantDomain>,
        solution: mono::Alternatives,
    ) -> Result<Context, TypeError> {
        let target = Entry::UnsolvedVariant(existential);
        let index = self
            .entries
            .iter()
            .position(|entry| *entry == target)
            .ok_or_else(|| TypeError::out_of_scope(existential.label()))?;
        if !alternatives_well_formed(&self.entries[..index], &solution) {
            return Err(TypeError::out_of_scope(existential.label()));
        }
        self.entries[index] = Entry::SolvedVariant(existential, solution);
        Ok(self)
    }

    /// Splice `replacements` in place of the unsolved entry for
    /// `existential`. Used when a solution needs fresh existentials of its
    /// own, which must live to the left of the entry they support.
    pub fn replace_unsolved_type(
        mut self,
        existential: Existential<TypeDomain>,
        replacements: Vec<Entry>,
    ) -> Result<Context, TypeError> {
        let target = Entry::UnsolvedType(existential);
        let index = self
            .entries
            .iter()
            .position(|entry| *entry == target)
            .ok_or_else(|| TypeError::out_of_scope(existential.label()))?;
        self.entries.splice(index..=index, replacements);
        Ok(self)
    }

    pub fn replace_unsolved_row(
        mut self,
        existential: Existential<RowDomain>,
        replacements: Vec<Entry>,
    ) -> Result<Context, TypeError> {
        let target = Entry::UnsolvedRow(existential);
        let index = self
            .entries
            .iter()
            .position(|entry| *entry == target)
            .ok_or_else(|| TypeError::out_of_scope(existential.label()))?;
        self.entries.splice(index..=index, replacements);
        Ok(self)
    }

    pub fn replace_unsolved_variant(
        mut self,
        existential: Existential<VariantDomain>,
        replacements: Vec<Entry>,
    ) -> Result<Context, TypeError> {
        let target = Entry::UnsolvedVariant(existential);
        let index = self
            .entries
            .iter()
            .position(|entry| *entry == target)
            .ok_or_else(|| TypeError::out_of_scope(existential.label()))?;
        self.entries.splice(index..=index, replacements);
        Ok(self)
    }

    fn lookup_solved_type(&self, existential: Existential<TypeDomain>) -> Option<&Monotype> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::SolvedType(found, solution) if *found == existential => Some(solution),
            _ => None,
        })
    }

    fn lookup_solved_row(&self, existential: Existential<RowDomain>) -> Option<&mono::Fields> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::SolvedRow(found, solution) if *found == existential => Some(solution),
            _ => None,
        })
    }

    fn lookup_solved_variant(
        &self,
        existential: Existential<VariantDomain>,
    ) -> Option<&mono::Alternatives> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::SolvedVariant(found, solution) if *found == existential => Some(solution),
            _ => None,
        })
    }

    /// Substitute every solved existential occurring in `ty`, recursively,
    /// so the result mentions only unsolved ones. Idempotent.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Unsolved(existential) => match self.lookup_solved_type(*existential) {
                Some(solution) => {
                    let solution = solution.clone();
                    self.apply(&Type::from_monotype(&solution))
                }
                None => ty.clone(),
            },
            Type::Variable(_) | Type::Bool | Type::Natural | Type::Text => ty.clone(),
            Type::Forall(name, kind, body) => {
                Type::forall(name.clone(), *kind, self.apply(body))
            }
            Type::Exists(name, kind, body) => {
                Type::exists(name.clone(), *kind, self.apply(body))
            }
            Type::Function(input, output) => {
                Type::function(self.apply(input), self.apply(output))
            }
            Type::List(element) => Type::list(self.apply(element)),
            Type::Record(fields) => {
                let mut entries: Vec<(String, Type)> = fields
                    .fields
                    .iter()
                    .map(|(label, ty)| (label.clone(), self.apply(ty)))
                    .collect();
                let mut row = fields.row.clone();
                // Chase solved tails, splicing their fields in.
                while let Row::Unsolved(existential) = row {
                    match self.lookup_solved_row(existential) {
                        Some(solution) => {
                            let solution = solution.clone();
                            for (label, ty) in &solution.fields {
                                entries
                                    .push((label.clone(), self.apply(&Type::from_monotype(ty))));
                            }
                            row = solution.row;
                        }
                        None => break,
                    }
                }
                Type::Record(ty::Fields {
                    fields: entries,
                    row,
                })
            }
            Type::Union(alternatives) => {
                let mut entries: Vec<(String, Type)> = alternatives
                    .alternatives
                    .iter()
                    .map(|(label, ty)| (label.clone(), self.apply(ty)))
                    .collect();
                let mut variant = alternatives.variant.clone();
                while let Variant::Unsolved(existential) = variant {
                    match self.lookup_solved_variant(existential) {
                        Some(solution) => {
                            let solution = solution.clone();
                            for (label, ty) in &solution.alternatives {
                                entries
                                    .push((label.clone(), self.apply(&Type::from_monotype(ty))));
                            }
                            variant = solution.variant;
                        }
                        None => break,
                    }
                }
                Type::Union(ty::Alternatives {
                    alternatives: entries,
                    variant,
                })
            }
        }
    }

    /// Is every variable and existential mentioned in `ty` in scope here?
    pub fn well_formed(&self, ty: &Type) -> bool {
        self.well_formed_inner(ty, &mut Vec::new())
    }

    fn well_formed_inner(&self, ty: &Type, bound: &mut Vec<(String, Kind)>) -> bool {
        let variable_in_scope = |bound: &[(String, Kind)], name: &str, kind: Kind| {
            bound
                .iter()
                .rev()
                .any(|(found, found_kind)| found == name && *found_kind == kind)
                || self
                    .entries
                    .iter()
                    .any(|entry| *entry == Entry::Variable(name.to_string(), kind))
        };
        let row_in_scope = |bound: &[(String, Kind)], row: &Row| match row {
            Row::Empty => true,
            Row::Variable(name) => variable_in_scope(bound, name, Kind::Fields),
            Row::Unsolved(existential) => self.entries.iter().any(|entry| {
                matches!(entry, Entry::UnsolvedRow(found) | Entry::SolvedRow(found, _) if found == existential)
            }),
        };
        let variant_in_scope = |bound: &[(String, Kind)], variant: &Variant| match variant {
            Variant::Empty => true,
            Variant::Variable(name) => variable_in_scope(bound, name, Kind::Alternatives),
            Variant::Unsolved(existential) => self.entries.iter().any(|entry| {
                matches!(entry, Entry::UnsolvedVariant(found) | Entry::SolvedVariant(found, _) if found == existential)
            }),
        };

        match ty {
            Type::Variable(name) => variable_in_scope(bound, name, Kind::Type),
            Type::Unsolved(existential) => self.entries.iter().any(|entry| {
                matches!(entry, Entry::UnsolvedType(found) | Entry::SolvedType(found, _) if found == existential)
            }),
            Type::Bool | Type::Natural | Type::Text => true,
            Type::Forall(name, kind, body) | Type::Exists(name, kind, body) => {
                bound.push((name.clone(), *kind));
                let result = self.well_formed_inner(body, bound);
                bound.pop();
                result
            }
            Type::Function(input, output) => {
                self.well_formed_inner(input, bound) && self.well_formed_inner(output, bound)
            }
            Type::List(element) => self.well_formed_inner(element, bound),
            Type::Record(fields) => {
                row_in_scope(bound, &fields.row)
                    && fields
                        .fields
                        .iter()
                        .all(|(_, ty)| self.well_formed_inner(ty, bound))
            }
            Type::Union(alternatives) => {
                variant_in_scope(bound, &alternatives.variant)
                    && alternatives
                        .alternatives
                        .iter()
                        .all(|(_, ty)| self.well_formed_inner(ty, bound))
            }
        }
    }

    /// Generalize: quantify every unsolved existential still free in `ty`,
    /// in left-to-right context order (leftmost outermost).
    pub fn complete(&self, ty: &Type) -> Type {
        self.generalize_from(0, ty)
    }

    /// Generalize only the existentials introduced after `marker`. The
    /// binding's own placeholders become quantifiers; anything older stays
    /// free for the enclosing scope to solve.
    pub fn generalize_since(&self, marker: &Entry, ty: &Type) -> Type {
        match self.entries.iter().rposition(|found| found == marker) {
            Some(index) => self.generalize_from(index + 1, ty),
            None => self.apply(ty),
        }
    }

    fn generalize_from(&self, start: usize, ty: &Type) -> Type {
        let mut ty = self.apply(ty);
        for entry in self.entries[start..].iter().rev() {
            match entry {
                Entry::UnsolvedType(existential) if ty.references_type(*existential) => {
                    let name = self.generalized_name(&ty, *existential);
                    let solution = Context {
                        entries: vec![Entry::SolvedType(
                            *existential,
                            Monotype::Variable(name.clone()),
                        )],
                    };
                    ty = Type::forall(name, Kind::Type, solution.apply(&ty));
                }
                Entry::UnsolvedRow(existential) if ty.references_row(*existential) => {
                    let name = self.generalized_name(&ty, *existential);
                    let solution = Context {
                        entries: vec![Entry::SolvedRow(
                            *existential,
                            mono::Fields {
                                fields: Vec::new(),
                                row: Row::Variable(name.clone()),
                            },
                        )],
                    };
                    ty = Type::forall(name, Kind::Fields, solution.apply(&ty));
                }
                Entry::UnsolvedVariant(existential) if ty.references_variant(*existential) => {
                    let name = self.generalized_name(&ty, *existential);
                    let solution = Context {
                        entries: vec![Entry::SolvedVariant(
                            *existential,
                            mono::Alternatives {
                                alternatives: Vec::new(),
                                variant: Variant::Variable(name.clone()),
                            },
                        )],
                    };
                    ty = Type::forall(name, Kind::Alternatives, solution.apply(&ty));
                }
                _ => {}
            }
        }
        ty
    }

    /// A fresh variable name for generalization, starting from the
    /// existential's own label and skipping names the type already mentions.
    fn generalized_name<D>(&self, ty: &Type, existential: Existential<D>) -> String {
        let mut index = existential.index();
        loop {
            let name = Existential::<TypeDomain>::new(index).label();
            if !mentions_name(ty, &name) {
                return name;
            }
            index += 1;
        }
    }
}

fn mentions_name(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Variable(found) => found == name,
        Type::Unsolved(_) | Type::Bool | Type::Natural | Type::Text => false,
        Type::Forall(bound, _, body) | Type::Exists(bound, _, body) => {
            bound == name || mentions_name(body, name)
        }
        Type::Function(input, output) => mentions_name(input, name) || mentions_name(output, name),
        Type::List(element) => mentions_name(element, name),
        Type::Record(fields) => {
            matches!(&fields.row, Row::Variable(found) if found == name)
                || fields.fields.iter().any(|(_, ty)| mentions_name(ty, name))
        }
        Type::Union(alternatives) => {
            matches!(&alternatives.variant, Variant::Variable(found) if found == name)
                || alternatives
                    .alternatives
                    .iter()
                    .any(|(_, ty)| mentions_name(ty, name))
        }
    }
}

fn variable_bound(entries: &[Entry], name: &str, kind: Kind) -> bool {
    entries
        .iter()
        .any(|entry| *entry == Entry::Variable(name.to_string(), kind))
}

fn row_well_formed(entries: &[Entry], row: &Row) -> bool {
    match row {
        Row::Empty => true,
        Row::Variable(name) => variable_bound(entries, name, Kind::Fields),
        Row::Unsolved(existential) => entries.iter().any(|entry| {
            matches!(entry, Entry::UnsolvedRow(found) | Entry::SolvedRow(found, _) if found == existential)
        }),
    }
}

fn variant_well_formed(entries: &[Entry], variant: &Variant) -> bool {
    match variant {
        Variant::Empty => true,
        Variant::Variable(name) => variable_bound(entries, name, Kind::Alternatives),
        Variant::Unsolved(existential) => entries.iter().any(|entry| {
            matches!(entry, Entry::UnsolvedVariant(found) | Entry::SolvedVariant(found, _) if found == existential)
        }),
    }
}

/// Well-formedness of a solution against the prefix left of the entry being
/// solved.
fn monotype_well_formed(entries: &[Entry], monotype: &Monotype) -> bool {
    match monotype {
        Monotype::Variable(name) => variable_bound(entries, name, Kind::Type),
        Monotype::Unsolved(existential) => entries.iter().any(|entry| {
            matches!(entry, Entry::UnsolvedType(found) | Entry::SolvedType(found, _) if found == existential)
        }),
        Monotype::Bool | Monotype::Natural | Monotype::Text => true,
        Monotype::Function(input, output) => {
            monotype_well_formed(entries, input) && monotype_well_formed(entries, output)
        }
        Monotype::List(element) => monotype_well_formed(entries, element),
        Monotype::Record(fields) => fields_well_formed(entries, fields),
        Monotype::Union(alternatives) => alternatives_well_formed(entries, alternatives),
    }
}

fn fields_well_formed(entries: &[Entry], fields: &mono::Fields) -> bool {
    row_well_formed(entries, &fields.row)
        && fields
            .fields
            .iter()
            .all(|(_, ty)| monotype_well_formed(entries, ty))
}

fn alternatives_well_formed(entries: &[Entry], alternatives: &mono::Alternatives) -> bool {
    variant_well_formed(entries, &alternatives.variant)
        && alternatives
            .alternatives
            .iter()
            .all(|(_, ty)| monotype_well_formed(entries, ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_existential(index: usize) -> Existential<TypeDomain> {
        Existential::new(index)
    }

    #[test]
    fn test_lookup_shadowing() {
        let mut context = Context::new();
        context.push(Entry::Annotation("x".to_string(), Type::Natural));
        context.push(Entry::Annotation("x".to_string(), Type::Bool));

        assert_eq!(context.lookup("x", 0), Some(Type::Bool));
        assert_eq!(context.lookup("x", 1), Some(Type::Natural));
        assert_eq!(context.lookup("x", 2), None);
        assert_eq!(context.lookup("y", 0), None);
    }

    #[test]
    fn test_solve_respects_ordering() {
        // b may be solved to a (a is left of b), but not the reverse.
        let a = type_existential(0);
        let b = type_existential(1);
        let mut context = Context::new();
        context.push(Entry::UnsolvedType(a));
        context.push(Entry::UnsolvedType(b));

        let solved = context.clone().solve_type(b, Monotype::Unsolved(a));
        assert!(solved.is_ok());

        let violation = context.solve_type(a, Monotype::Unsolved(b));
        assert!(matches!(violation, Err(TypeError::OutOfScope { .. })));
    }

    #[test]
    fn test_apply_resolves_chains() {
        let a = type_existential(0);
        let b = type_existential(1);
        let mut context = Context::new();
        context.push(Entry::SolvedType(a, Monotype::Natural));
        context.push(Entry::SolvedType(b, Monotype::Unsolved(a)));

        let ty = Type::function(Type::Unsolved(b), Type::Unsolved(a));
        assert_eq!(
            context.apply(&ty),
            Type::function(Type::Natural, Type::Natural)
        );
    }

    #[test]
    fn test_apply_is_idempotent() {
        let a = type_existential(0);
        let b = type_existential(1);
        let rho = Existential::<RowDomain>::new(2);
        let mut context = Context::new();
        context.push(Entry::SolvedType(a, Monotype::Natural));
        context.push(Entry::UnsolvedType(b));
        context.push(Entry::SolvedRow(
            rho,
            mono::Fields {
                fields: vec![("y".to_string(), Monotype::Unsolved(a))],
                row: Row::Empty,
            },
        ));

        let ty = Type::Record(ty::Fields {
            fields: vec![
                ("x".to_string(), Type::Unsolved(a)),
                ("z".to_string(), Type::Unsolved(b)),
            ],
            row: Row::Unsolved(rho),
        });
        let once = context.apply(&ty);
        let twice = context.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_splices_solved_row() {
        let rho = Existential::<RowDomain>::new(0);
        let mut context = Context::new();
        context.push(Entry::SolvedRow(
            rho,
            mono::Fields {
                fields: vec![("y".to_string(), Monotype::Bool)],
                row: Row::Empty,
            },
        ));

        let ty = Type::Record(ty::Fields {
            fields: vec![("x".to_string(), Type::Natural)],
            row: Row::Unsolved(rho),
        });
        assert_eq!(
            context.apply(&ty),
            Type::Record(ty::Fields::closed(vec![
                ("x".to_string(), Type::Natural),
                ("y".to_string(), Type::Bool),
            ]))
        );
    }

    #[test]
    fn test_discard_truncates() {
        let a = type_existential(0);
        let b = type_existential(1);
        let mut context = Context::new();
        context.push(Entry::UnsolvedType(a));
        context.push(Entry::Marker(b));
        context.push(Entry::UnsolvedType(b));

        let context = context.discard(&Entry::Marker(b));
        assert_eq!(context.entries(), &[Entry::UnsolvedType(a)]);
    }

    #[test]
    fn test_well_formed() {
        let mut context = Context::new();
        context.push(Entry::Variable("a".to_string(), Kind::Type));

        assert!(context.well_formed(&Type::Variable("a".to_string())));
        assert!(!context.well_formed(&Type::Variable("b".to_string())));
        // A quantifier brings its own variable into scope.
        assert!(context.well_formed(&Type::forall(
            "b",
            Kind::Type,
            Type::Variable("b".to_string())
        )));
        // A row variable needs a Fields binder, not a Type one.
        assert!(!context.well_formed(&Type::Record(ty::Fields {
            fields: vec![],
            row: Row::Variable("a".to_string()),
        })));
    }

    #[test]
    fn test_complete_generalizes_in_order() {
        let a = type_existential(0);
        let b = type_existential(1);
        let mut context = Context::new();
        context.push(Entry::UnsolvedType(a));
        context.push(Entry::UnsolvedType(b));

        let ty = Type::function(Type::Unsolved(a), Type::Unsolved(b));
        let completed = context.complete(&ty);
        assert_eq!(completed.pretty(), "forall a . forall b . a -> b");
    }

    #[test]
    fn test_complete_skips_solved() {
        let a = type_existential(0);
        let mut context = Context::new();
        context.push(Entry::SolvedType(a, Monotype::Natural));

        let ty = Type::Unsolved(a);
        assert_eq!(context.complete(&ty), Type::Natural);
    }
}
