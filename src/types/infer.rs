//! # Bidirectional Type Inference
//!
//! The two judgments are `check` (expression against a known type) and
//! `synthesize` (expression produces a type); both thread the ordered
//! [`Context`]. Subtyping may solve existentials, instantiation solves one
//! existential against a type from the left or from the right, and records
//! and unions get their own label-partitioning subtyping.
//!
//! The only piece of mutable state is the fresh-existential counter; the
//! context itself is passed in and returned from every judgment.

use lachs::Span;

use crate::ast::{Builtin, Operator, Syntax};

use super::context::{Context, Entry};
use super::error::TypeError;
use super::existential::{Existential, RowDomain, TypeDomain, VariantDomain};
use super::mono::{self, Monotype, Row, Variant};
use super::ty::{self, Kind, Type};

/// One inference session. Owns the existential counter; a session is not
/// reusable across independent expressions.
pub struct Infer {
    counter: usize,
}

impl Infer {
    pub fn new() -> Self {
        Infer { counter: 0 }
    }

    /// Infer the principal type of a closed expression, generalizing any
    /// existentials left over at the top level.
    pub fn infer(&mut self, syntax: &Syntax) -> Result<Type, TypeError> {
        let (ty, context) = self.synthesize(Context::new(), syntax)?;
        Ok(context.complete(&ty))
    }

    fn fresh_type(&mut self) -> Existential<TypeDomain> {
        let index = self.counter;
        self.counter += 1;
        Existential::new(index)
    }

    fn fresh_row(&mut self) -> Existential<RowDomain> {
        let index = self.counter;
        self.counter += 1;
        Existential::new(index)
    }

    fn fresh_variant(&mut self) -> Existential<VariantDomain> {
        let index = self.counter;
        self.counter += 1;
        Existential::new(index)
    }

    /// A marker entry backed by a fresh existential, so it can never collide
    /// with another marker.
    fn fresh_marker(&mut self) -> Entry {
        Entry::Marker(self.fresh_type())
    }

    // === check ===

    pub fn check(
        &mut self,
        mut context: Context,
        syntax: &Syntax,
        ty: &Type,
    ) -> Result<Context, TypeError> {
        match (syntax, ty) {
            // Rigid introduction: the variable stays opaque while checking.
            (_, Type::Forall(name, kind, body)) => {
                let entry = Entry::Variable(name.clone(), *kind);
                context.push(entry.clone());
                let context = self.check(context, syntax, body)?;
                Ok(context.discard(&entry))
            }
            // Existential introduction: pick a placeholder witness, scoped
            // by a marker.
            (_, Type::Exists(name, kind, body)) => {
                let marker = self.fresh_marker();
                context.push(marker.clone());
                let body = match kind {
                    Kind::Type => {
                        let existential = self.fresh_type();
                        context.push(Entry::UnsolvedType(existential));
                        body.substitute_type(name, &Type::Unsolved(existential))
                    }
                    Kind::Fields => {
                        let existential = self.fresh_row();
                        context.push(Entry::UnsolvedRow(existential));
                        body.substitute_row(name, &Row::Unsolved(existential))
                    }
                    Kind::Alternatives => {
                        let existential = self.fresh_variant();
                        context.push(Entry::UnsolvedVariant(existential));
                        body.substitute_variant(name, &Variant::Unsolved(existential))
                    }
                };
                let context = self.check(context, syntax, &body)?;
                Ok(context.discard(&marker))
            }
            (Syntax::Lambda(lambda), Type::Function(input, output)) => {
                let entry = Entry::Annotation(lambda.parameter.clone(), (**input).clone());
                context.push(entry.clone());
                let context = self.check(context, &lambda.body, output)?;
                Ok(context.discard(&entry))
            }
            (Syntax::List(list), Type::List(element)) => {
                for item in &list.elements {
                    context = self.check(context, item, element)?;
                }
                Ok(context)
            }
            (Syntax::Record(record), Type::Record(expected)) => {
                self.check_record(context, record, expected)
            }
            _ => {
                let (actual, context) = self.synthesize(context, syntax)?;
                let actual = context.apply(&actual);
                let expected = context.apply(ty);
                self.subtype(context, &actual, &expected, &syntax.position())
            }
        }
    }

    /// Structural check of a record literal against a record type: fields
    /// the type knows about are checked directly, the leftovers go through
    /// row subtyping so open tails absorb what they can.
    fn check_record(
        &mut self,
        mut context: Context,
        record: &crate::ast::RecordLiteral,
        expected: &ty::Fields,
    ) -> Result<Context, TypeError> {
        let mut extra = Vec::new();
        for (label, value) in &record.fields {
            match expected.fields.iter().find(|(found, _)| found == label) {
                Some((_, field_ty)) => {
                    let field_ty = context.apply(field_ty);
                    context = self.check(context, value, &field_ty)?;
                }
                None => {
                    let (ty, next) = self.synthesize(context, value)?;
                    context = next;
                    extra.push((label.clone(), ty));
                }
            }
        }

        let missing: Vec<(String, Type)> = expected
            .fields
            .iter()
            .filter(|(label, _)| !record.fields.iter().any(|(found, _)| found == label))
            .cloned()
            .collect();

        if extra.is_empty() && missing.is_empty() && expected.row == Row::Empty {
            return Ok(context);
        }

        let actual_rest = ty::Fields {
            fields: extra,
            row: Row::Empty,
        };
        let expected_rest = ty::Fields {
            fields: missing,
            row: expected.row.clone(),
        };
        self.subtype_rows(context, &actual_rest, &expected_rest, &record.position)
    }

    // === synthesize ===

    pub fn synthesize(
        &mut self,
        mut context: Context,
        syntax: &Syntax,
    ) -> Result<(Type, Context), TypeError> {
        match syntax {
            Syntax::Variable(variable) => match context.lookup(&variable.name, variable.index) {
                Some(ty) => Ok((ty, context)),
                None => Err(TypeError::unbound_variable(
                    variable.name.clone(),
                    variable.index,
                    variable.position.clone(),
                )),
            },
            Syntax::Lambda(lambda) => {
                let input = self.fresh_type();
                let output = self.fresh_type();
                context.push(Entry::UnsolvedType(input));
                context.push(Entry::UnsolvedType(output));
                let entry = Entry::Annotation(lambda.parameter.clone(), Type::Unsolved(input));
                context.push(entry.clone());
                let context = self.check(context, &lambda.body, &Type::Unsolved(output))?;
                let context = context.discard(&entry);
                Ok((
                    Type::function(Type::Unsolved(input), Type::Unsolved(output)),
                    context,
                ))
            }
            Syntax::Application(application) => {
                let (function_type, context) = self.synthesize(context, &application.function)?;
                let function_type = context.apply(&function_type);
                self.synthesize_application(
                    context,
                    &function_type,
                    &application.argument,
                    &application.position,
                )
            }
            Syntax::Let(let_) => {
                let mut annotations = Vec::new();
                for binding in &let_.bindings {
                    match &binding.annotation {
                        Some(annotation) => {
                            if !context.well_formed(annotation) {
                                return Err(TypeError::not_well_formed(
                                    annotation.clone(),
                                    binding.position.clone(),
                                ));
                            }
                            context = self.check(context, &binding.value, annotation)?;
                            let entry =
                                Entry::Annotation(binding.name.clone(), annotation.clone());
                            context.push(entry.clone());
                            annotations.push(entry);
                        }
                        None => {
                            let marker = self.fresh_marker();
                            context.push(marker.clone());
                            let (ty, next) = self.synthesize(context, &binding.value)?;
                            let generalized = next.generalize_since(&marker, &ty);
                            context = next.discard(&marker);
                            let entry = Entry::Annotation(binding.name.clone(), generalized);
                            context.push(entry.clone());
                            annotations.push(entry);
                        }
                    }
                }
                let (ty, mut context) = self.synthesize(context, &let_.body)?;
                // The bindings fall out of scope, but existentials created
                // while synthesizing the body must stay.
                for entry in annotations.iter().rev() {
                    context = context.delete(entry);
                }
                Ok((ty, context))
            }
            Syntax::Annotation(annotation) => {
                if !context.well_formed(&annotation.annotation) {
                    return Err(TypeError::not_well_formed(
                        annotation.annotation.clone(),
                        annotation.position.clone(),
                    ));
                }
                let context =
                    self.check(context, &annotation.expression, &annotation.annotation)?;
                Ok((annotation.annotation.clone(), context))
            }
            Syntax::List(list) => {
                let element = self.fresh_type();
                context.push(Entry::UnsolvedType(element));
                for item in &list.elements {
                    context = self.check(context, item, &Type::Unsolved(element))?;
                }
                Ok((Type::list(Type::Unsolved(element)), context))
            }
            Syntax::Record(record) => {
                let mut fields = Vec::with_capacity(record.fields.len());
                for (label, value) in &record.fields {
                    let (ty, next) = self.synthesize(context, value)?;
                    context = next;
                    fields.push((label.clone(), ty));
                }
                Ok((Type::Record(ty::Fields::closed(fields)), context))
            }
            Syntax::Projection(projection) => {
                let (record_type, mut context) = self.synthesize(context, &projection.record)?;
                let record_type = context.apply(&record_type);
                let field = self.fresh_type();
                let row = self.fresh_row();
                context.push(Entry::UnsolvedType(field));
                context.push(Entry::UnsolvedRow(row));
                let expected = Type::Record(ty::Fields {
                    fields: vec![(projection.label.clone(), Type::Unsolved(field))],
                    row: Row::Unsolved(row),
                });
                let context =
                    self.subtype(context, &record_type, &expected, &projection.position)?;
                Ok((Type::Unsolved(field), context))
            }
            Syntax::Alternative(alternative) => {
                // A polymorphic constructor: forall a . a -> < Tag: a | tail >
                let variant = self.fresh_variant();
                context.push(Entry::UnsolvedVariant(variant));
                let ty = Type::forall(
                    "a",
                    Kind::Type,
                    Type::function(
                        Type::Variable("a".to_string()),
                        Type::Union(ty::Alternatives {
                            alternatives: vec![(
                                alternative.name.clone(),
                                Type::Variable("a".to_string()),
                            )],
                            variant: Variant::Unsolved(variant),
                        }),
                    ),
                );
                Ok((ty, context))
            }
            Syntax::Merge(merge) => self.synthesize_merge(context, merge),
            Syntax::If(if_) => {
                let context = self.check(context, &if_.predicate, &Type::Bool)?;
                let (if_true, context) = self.synthesize(context, &if_.if_true)?;
                let (if_false, mut context) = self.synthesize(context, &if_.if_false)?;
                let join = self.fresh_type();
                context.push(Entry::UnsolvedType(join));
                let if_true = context.apply(&if_true);
                let context =
                    self.subtype(context, &if_true, &Type::Unsolved(join), &if_.position)?;
                let if_false = context.apply(&if_false);
                let joined = context.apply(&Type::Unsolved(join));
                let context = self.subtype(context, &if_false, &joined, &if_.position)?;
                Ok((Type::Unsolved(join), context))
            }
            Syntax::Scalar(scalar) => {
                let ty = match scalar.value {
                    crate::ast::ScalarValue::Bool(_) => Type::Bool,
                    crate::ast::ScalarValue::Natural(_) => Type::Natural,
                    crate::ast::ScalarValue::Text(_) => Type::Text,
                };
                Ok((ty, context))
            }
            Syntax::Operator(operator) => self.synthesize_operator(context, operator),
            Syntax::Builtin(builtin) => Ok((builtin_type(builtin.builtin), context)),
            Syntax::Embedded(embedded) => self.synthesize(context, &embedded.inner),
        }
    }

    fn synthesize_application(
        &mut self,
        mut context: Context,
        function_type: &Type,
        argument: &Syntax,
        span: &Span,
    ) -> Result<(Type, Context), TypeError> {
        match function_type {
            Type::Forall(name, kind, body) => {
                let body = match kind {
                    Kind::Type => {
                        let existential = self.fresh_type();
                        context.push(Entry::UnsolvedType(existential));
                        body.substitute_type(name, &Type::Unsolved(existential))
                    }
                    Kind::Fields => {
                        let existential = self.fresh_row();
                        context.push(Entry::UnsolvedRow(existential));
                        body.substitute_row(name, &Row::Unsolved(existential))
                    }
                    Kind::Alternatives => {
                        let existential = self.fresh_variant();
                        context.push(Entry::UnsolvedVariant(existential));
                        body.substitute_variant(name, &Variant::Unsolved(existential))
                    }
                };
                self.synthesize_application(context, &body, argument, span)
            }
            Type::Exists(name, kind, body) => {
                // The function works for some unknown instantiation; treat
                // the variable as rigid while applying.
                let entry = Entry::Variable(name.clone(), *kind);
                context.push(entry);
                self.synthesize_application(context, body, argument, span)
            }
            Type::Unsolved(existential) => {
                let input = self.fresh_type();
                let output = self.fresh_type();
                let context = context.replace_unsolved_type(
                    *existential,
                    vec![
                        Entry::UnsolvedType(input),
                        Entry::UnsolvedType(output),
                        Entry::SolvedType(
                            *existential,
                            Monotype::function(Monotype::Unsolved(input), Monotype::Unsolved(output)),
                        ),
                    ],
                )?;
                let context = self.check(context, argument, &Type::Unsolved(input))?;
                Ok((Type::Unsolved(output), context))
            }
            Type::Function(input, output) => {
                let context = self.check(context, argument, input)?;
                Ok(((**output).clone(), context))
            }
            other => Err(TypeError::not_a_function(other.clone(), span.clone())),
        }
    }

    fn synthesize_merge(
        &mut self,
        context: Context,
        merge: &crate::ast::Merge,
    ) -> Result<(Type, Context), TypeError> {
        let (handlers_type, mut context) = self.synthesize(context, &merge.handlers)?;
        let handlers_type = context.apply(&handlers_type);
        let fields = match &handlers_type {
            Type::Record(fields) if fields.row == Row::Empty => fields.clone(),
            other => {
                return Err(TypeError::merge_not_a_union_handler(
                    other.clone(),
                    merge.position.clone(),
                ))
            }
        };

        let output = self.fresh_type();
        context.push(Entry::UnsolvedType(output));
        let mut alternatives = Vec::with_capacity(fields.fields.len());
        for (label, handler) in &fields.fields {
            let input = self.fresh_type();
            context.push(Entry::UnsolvedType(input));
            let handler = context.apply(handler);
            let expected =
                Type::function(Type::Unsolved(input), Type::Unsolved(output));
            context = self.subtype(context, &handler, &expected, &merge.position)?;
            alternatives.push((label.clone(), Type::Unsolved(input)));
        }

        Ok((
            Type::function(
                Type::Union(ty::Alternatives::closed(alternatives)),
                Type::Unsolved(output),
            ),
            context,
        ))
    }

    fn synthesize_operator(
        &mut self,
        context: Context,
        operator: &crate::ast::OperatorExpr,
    ) -> Result<(Type, Context), TypeError> {
        match operator.operator {
            Operator::And | Operator::Or => {
                let context = self.check(context, &operator.left, &Type::Bool)?;
                let context = self.check(context, &operator.right, &Type::Bool)?;
                Ok((Type::Bool, context))
            }
            Operator::Plus | Operator::Times => {
                let context = self.check(context, &operator.left, &Type::Natural)?;
                let context = self.check(context, &operator.right, &Type::Natural)?;
                Ok((Type::Natural, context))
            }
            Operator::Append => {
                let (left, context) = self.synthesize(context, &operator.left)?;
                let left = context.apply(&left);
                match left {
                    Type::Text => {
                        let context = self.check(context, &operator.right, &Type::Text)?;
                        Ok((Type::Text, context))
                    }
                    Type::List(_) => {
                        let context = self.check(context, &operator.right, &left)?;
                        Ok((left, context))
                    }
                    Type::Unsolved(_) => {
                        let (right, context) = self.synthesize(context, &operator.right)?;
                        let right = context.apply(&right);
                        match right {
                            Type::Text | Type::List(_) => {
                                let context = self.subtype(
                                    context,
                                    &left,
                                    &right,
                                    &operator.position,
                                )?;
                                Ok((context.apply(&right), context))
                            }
                            // Nothing pins the operand type down; commit to
                            // text concatenation.
                            Type::Unsolved(_) => {
                                let context =
                                    self.subtype(context, &left, &Type::Text, &operator.position)?;
                                let right = context.apply(&right);
                                let context =
                                    self.subtype(context, &right, &Type::Text, &operator.position)?;
                                Ok((Type::Text, context))
                            }
                            other => Err(TypeError::not_subtype(
                                other,
                                Type::Text,
                                operator.position.clone(),
                            )),
                        }
                    }
                    other => Err(TypeError::not_subtype(
                        other,
                        Type::Text,
                        operator.position.clone(),
                    )),
                }
            }
        }
    }

    // === subtyping ===

    pub fn subtype(
        &mut self,
        mut context: Context,
        actual: &Type,
        expected: &Type,
        span: &Span,
    ) -> Result<Context, TypeError> {
        match (actual, expected) {
            (Type::Unsolved(left), Type::Unsolved(right)) if left == right => Ok(context),
            // Quantifier rules come before instantiation: existentials are
            // never solved to polytypes.
            (_, Type::Forall(name, kind, body)) => {
                let entry = Entry::Variable(name.clone(), *kind);
                context.push(entry.clone());
                let context = self.subtype(context, actual, body, span)?;
                Ok(context.discard(&entry))
            }
            (Type::Exists(name, kind, body), _) => {
                let entry = Entry::Variable(name.clone(), *kind);
                context.push(entry.clone());
                let context = self.subtype(context, body, expected, span)?;
                Ok(context.discard(&entry))
            }
            (Type::Forall(name, kind, body), _) => {
                let marker = self.fresh_marker();
                context.push(marker.clone());
                let body = self.open_quantifier(&mut context, name, *kind, body);
                let context = self.subtype(context, &body, expected, span)?;
                Ok(context.discard(&marker))
            }
            (_, Type::Exists(name, kind, body)) => {
                let marker = self.fresh_marker();
                context.push(marker.clone());
                let body = self.open_quantifier(&mut context, name, *kind, body);
                let context = self.subtype(context, actual, &body, span)?;
                Ok(context.discard(&marker))
            }
            (Type::Variable(left), Type::Variable(right)) if left == right => Ok(context),
            (Type::Bool, Type::Bool) | (Type::Natural, Type::Natural) | (Type::Text, Type::Text) => {
                Ok(context)
            }
            (Type::Function(actual_input, actual_output), Type::Function(expected_input, expected_output)) => {
                let context = self.subtype(context, expected_input, actual_input, span)?;
                let actual_output = context.apply(actual_output);
                let expected_output = context.apply(expected_output);
                self.subtype(context, &actual_output, &expected_output, span)
            }
            (Type::List(actual_element), Type::List(expected_element)) => {
                self.subtype(context, actual_element, expected_element, span)
            }
            (Type::Record(actual_fields), Type::Record(expected_fields)) => {
                self.subtype_rows(context, actual_fields, expected_fields, span)
            }
            (Type::Union(actual_alternatives), Type::Union(expected_alternatives)) => {
                self.subtype_variants(context, actual_alternatives, expected_alternatives, span)
            }
            (Type::Unsolved(existential), _) => {
                if expected.references_type(*existential) {
                    return Err(TypeError::occurs_check(
                        existential.label(),
                        expected.clone(),
                    ));
                }
                self.instantiate_type_left(context, *existential, expected, span)
            }
            (_, Type::Unsolved(existential)) => {
                if actual.references_type(*existential) {
                    return Err(TypeError::occurs_check(existential.label(), actual.clone()));
                }
                self.instantiate_type_right(context, actual, *existential, span)
            }
            _ => Err(TypeError::not_subtype(
                actual.clone(),
                expected.clone(),
                span.clone(),
            )),
        }
    }

    /// Replace a quantified variable with a fresh unsolved placeholder of
    /// its kind.
    fn open_quantifier(
        &mut self,
        context: &mut Context,
        name: &str,
        kind: Kind,
        body: &Type,
    ) -> Type {
        match kind {
            Kind::Type => {
                let existential = self.fresh_type();
                context.push(Entry::UnsolvedType(existential));
                body.substitute_type(name, &Type::Unsolved(existential))
            }
            Kind::Fields => {
                let existential = self.fresh_row();
                context.push(Entry::UnsolvedRow(existential));
                body.substitute_row(name, &Row::Unsolved(existential))
            }
            Kind::Alternatives => {
                let existential = self.fresh_variant();
                context.push(Entry::UnsolvedVariant(existential));
                body.substitute_variant(name, &Variant::Unsolved(existential))
            }
        }
    }

    /// Row subtyping: common labels recurse, the leftovers on each side must
    /// be absorbed by the other side's tail, and the residual tails unify.
    fn subtype_rows(
        &mut self,
        mut context: Context,
        actual: &ty::Fields,
        expected: &ty::Fields,
        span: &Span,
    ) -> Result<Context, TypeError> {
        let mut actual_extra: Vec<(String, Type)> = Vec::new();
        for (label, actual_ty) in &actual.fields {
            match expected.fields.iter().find(|(found, _)| found == label) {
                Some((_, expected_ty)) => {
                    let actual_ty = context.apply(actual_ty);
                    let expected_ty = context.apply(expected_ty);
                    context = self.subtype(context, &actual_ty, &expected_ty, span)?;
                }
                None => actual_extra.push((label.clone(), context.apply(actual_ty))),
            }
        }
        let expected_extra: Vec<(String, Type)> = expected
            .fields
            .iter()
            .filter(|(label, _)| !actual.fields.iter().any(|(found, _)| found == label))
            .map(|(label, ty)| (label.clone(), context.apply(ty)))
            .collect();

        let not_subtype = |actual: &ty::Fields, expected: &ty::Fields, span: &Span| {
            TypeError::not_subtype(
                Type::Record(actual.clone()),
                Type::Record(expected.clone()),
                span.clone(),
            )
        };

        match (actual_extra.is_empty(), expected_extra.is_empty()) {
            (true, true) => self.unify_rows(context, actual, expected, span),
            (false, true) => {
                // The expected record must accept the extra actual fields.
                let &Row::Unsolved(row) = &expected.row else {
                    return Err(TypeError::missing_field(
                        actual_extra[0].0.clone(),
                        Type::Record(expected.clone()),
                        span.clone(),
                    ));
                };
                let extra = monotype_fields(&actual_extra)
                    .ok_or_else(|| not_subtype(actual, expected, span))?;
                match &actual.row {
                    Row::Unsolved(tail) if !context.row_precedes(*tail, row) => {
                        // The residual tail lives right of the row being
                        // solved; link both through a fresh one on the left.
                        let fresh = self.fresh_row();
                        let context = context.replace_unsolved_row(
                            row,
                            vec![Entry::UnsolvedRow(fresh), Entry::UnsolvedRow(row)],
                        )?;
                        let context = context.solve_row(
                            row,
                            mono::Fields {
                                fields: extra,
                                row: Row::Unsolved(fresh),
                            },
                        )?;
                        context.solve_row(
                            *tail,
                            mono::Fields {
                                fields: Vec::new(),
                                row: Row::Unsolved(fresh),
                            },
                        )
                    }
                    tail => context.solve_row(
                        row,
                        mono::Fields {
                            fields: extra,
                            row: tail.clone(),
                        },
                    ),
                }
            }
            (true, false) => {
                // The actual record must be able to provide the expected
                // extra fields.
                let &Row::Unsolved(row) = &actual.row else {
                    return Err(TypeError::missing_field(
                        expected_extra[0].0.clone(),
                        Type::Record(actual.clone()),
                        span.clone(),
                    ));
                };
                let extra = monotype_fields(&expected_extra)
                    .ok_or_else(|| not_subtype(actual, expected, span))?;
                match &expected.row {
                    Row::Unsolved(tail) if !context.row_precedes(*tail, row) => {
                        let fresh = self.fresh_row();
                        let context = context.replace_unsolved_row(
                            row,
                            vec![Entry::UnsolvedRow(fresh), Entry::UnsolvedRow(row)],
                        )?;
                        let context = context.solve_row(
                            row,
                            mono::Fields {
                                fields: extra,
                                row: Row::Unsolved(fresh),
                            },
                        )?;
                        context.solve_row(
                            *tail,
                            mono::Fields {
                                fields: Vec::new(),
                                row: Row::Unsolved(fresh),
                            },
                        )
                    }
                    tail => context.solve_row(
                        row,
                        mono::Fields {
                            fields: extra,
                            row: tail.clone(),
                        },
                    ),
                }
            }
            (false, false) => {
                // Each side has fields the other lacks: both tails must be
                // open, and they share one residual row.
                let &Row::Unsolved(actual_row) = &actual.row else {
                    return Err(TypeError::missing_field(
                        expected_extra[0].0.clone(),
                        Type::Record(actual.clone()),
                        span.clone(),
                    ));
                };
                let &Row::Unsolved(expected_row) = &expected.row else {
                    return Err(TypeError::missing_field(
                        actual_extra[0].0.clone(),
                        Type::Record(expected.clone()),
                        span.clone(),
                    ));
                };
                if actual_row == expected_row {
                    return Err(not_subtype(actual, expected, span));
                }
                let actual_extra = monotype_fields(&actual_extra)
                    .ok_or_else(|| not_subtype(actual, expected, span))?;
                let expected_extra = monotype_fields(&expected_extra)
                    .ok_or_else(|| not_subtype(actual, expected, span))?;
                let first = if context.row_precedes(actual_row, expected_row) {
                    actual_row
                } else {
                    expected_row
                };
                let fresh = self.fresh_row();
                let context = context.replace_unsolved_row(
                    first,
                    vec![Entry::UnsolvedRow(fresh), Entry::UnsolvedRow(first)],
                )?;
                let context = context.solve_row(
                    actual_row,
                    mono::Fields {
                        fields: expected_extra,
                        row: Row::Unsolved(fresh),
                    },
                )?;
                context.solve_row(
                    expected_row,
                    mono::Fields {
                        fields: actual_extra,
                        row: Row::Unsolved(fresh),
                    },
                )
            }
        }
    }

    /// Unify two record tails once neither side has leftover fields.
    fn unify_rows(
        &mut self,
        context: Context,
        actual: &ty::Fields,
        expected: &ty::Fields,
        span: &Span,
    ) -> Result<Context, TypeError> {
        match (&actual.row, &expected.row) {
            (Row::Empty, Row::Empty) => Ok(context),
            (Row::Variable(left), Row::Variable(right)) if left == right => Ok(context),
            (Row::Unsolved(left), Row::Unsolved(right)) => {
                if left == right {
                    Ok(context)
                } else if context.row_precedes(*left, *right) {
                    context.solve_row(
                        *right,
                        mono::Fields {
                            fields: Vec::new(),
                            row: Row::Unsolved(*left),
                        },
                    )
                } else {
                    context.solve_row(
                        *left,
                        mono::Fields {
                            fields: Vec::new(),
                            row: Row::Unsolved(*right),
                        },
                    )
                }
            }
            (Row::Unsolved(existential), tail) | (tail, Row::Unsolved(existential)) => context
                .solve_row(
                    *existential,
                    mono::Fields {
                        fields: Vec::new(),
                        row: tail.clone(),
                    },
                ),
            _ => Err(TypeError::not_subtype(
                Type::Record(actual.clone()),
                Type::Record(expected.clone()),
                span.clone(),
            )),
        }
    }

    /// Variant subtyping mirrors rows; a producer with fewer alternatives is
    /// accepted where more are handled because synthesized unions carry open
    /// tails.
    fn subtype_variants(
        &mut self,
        mut context: Context,
        actual: &ty::Alternatives,
        expected: &ty::Alternatives,
        span: &Span,
    ) -> Result<Context, TypeError> {
        let mut actual_extra: Vec<(String, Type)> = Vec::new();
        for (label, actual_ty) in &actual.alternatives {
            match expected
                .alternatives
                .iter()
                .find(|(found, _)| found == label)
            {
                Some((_, expected_ty)) => {
                    let actual_ty = context.apply(actual_ty);
                    let expected_ty = context.apply(expected_ty);
                    context = self.subtype(context, &actual_ty, &expected_ty, span)?;
                }
                None => actual_extra.push((label.clone(), context.apply(actual_ty))),
            }
        }
        let expected_extra: Vec<(String, Type)> = expected
            .alternatives
            .iter()
            .filter(|(label, _)| {
                !actual
                    .alternatives
                    .iter()
                    .any(|(found, _)| found == label)
            })
            .map(|(label, ty)| (label.clone(), context.apply(ty)))
            .collect();

        let not_subtype = |actual: &ty::Alternatives, expected: &ty::Alternatives, span: &Span| {
            TypeError::not_subtype(
                Type::Union(actual.clone()),
                Type::Union(expected.clone()),
                span.clone(),
            )
        };

        match (actual_extra.is_empty(), expected_extra.is_empty()) {
            (true, true) => self.unify_variants(context, actual, expected, span),
            (false, true) => {
                let &Variant::Unsolved(variant) = &expected.variant else {
                    return Err(TypeError::missing_alternative(
                        actual_extra[0].0.clone(),
                        Type::Union(expected.clone()),
                        span.clone(),
                    ));
                };
                let extra = monotype_alternatives(&actual_extra)
                    .ok_or_else(|| not_subtype(actual, expected, span))?;
                match &actual.variant {
                    Variant::Unsolved(tail) if !context.variant_precedes(*tail, variant) => {
                        let fresh = self.fresh_variant();
                        let context = context.replace_unsolved_variant(
                            variant,
                            vec![Entry::UnsolvedVariant(fresh), Entry::UnsolvedVariant(variant)],
                        )?;
                        let context = context.solve_variant(
                            variant,
                            mono::Alternatives {
                                alternatives: extra,
                                variant: Variant::Unsolved(fresh),
                            },
                        )?;
                        context.solve_variant(
                            *tail,
                            mono::Alternatives {
                                alternatives: Vec::new(),
                                variant: Variant::Unsolved(fresh),
                            },
                        )
                    }
                    tail => context.solve_variant(
                        variant,
                        mono::Alternatives {
                            alternatives: extra,
                            variant: tail.clone(),
                        },
                    ),
                }
            }
            (true, false) => {
                let &Variant::Unsolved(variant) = &actual.variant else {
                    return Err(TypeError::missing_alternative(
                        expected_extra[0].0.clone(),
                        Type::Union(actual.clone()),
                        span.clone(),
                    ));
                };
                let extra = monotype_alternatives(&expected_extra)
                    .ok_or_else(|| not_subtype(actual, expected, span))?;
                match &expected.variant {
                    Variant::Unsolved(tail) if !context.variant_precedes(*tail, variant) => {
                        let fresh = self.fresh_variant();
                        let context = context.replace_unsolved_variant(
                            variant,
                            vec![Entry::UnsolvedVariant(fresh), Entry::UnsolvedVariant(variant)],
                        )?;
                        let context = context.solve_variant(
                            variant,
                            mono::Alternatives {
                                alternatives: extra,
                                variant: Variant::Unsolved(fresh),
                            },
                        )?;
                        context.solve_variant(
                            *tail,
                            mono::Alternatives {
                                alternatives: Vec::new(),
                                variant: Variant::Unsolved(fresh),
                            },
                        )
                    }
                    tail => context.solve_variant(
                        variant,
                        mono::Alternatives {
                            alternatives: extra,
                            variant: tail.clone(),
                        },
                    ),
                }
            }
            (false, false) => {
                let &Variant::Unsolved(actual_variant) = &actual.variant else {
                    return Err(TypeError::missing_alternative(
                        expected_extra[0].0.clone(),
                        Type::Union(actual.clone()),
                        span.clone(),
                    ));
                };
                let &Variant::Unsolved(expected_variant) = &expected.variant else {
                    return Err(TypeError::missing_alternative(
                        actual_extra[0].0.clone(),
                        Type::Union(expected.clone()),
                        span.clone(),
                    ));
                };
                if actual_variant == expected_variant {
                    return Err(not_subtype(actual, expected, span));
                }
                let actual_extra = monotype_alternatives(&actual_extra)
                    .ok_or_else(|| not_subtype(actual, expected, span))?;
                let expected_extra = monotype_alternatives(&expected_extra)
                    .ok_or_else(|| not_subtype(actual, expected, span))?;
                let first = if context.variant_precedes(actual_variant, expected_variant) {
                    actual_variant
                } else {
                    expected_variant
                };
                let fresh = self.fresh_variant();
                let context = context.replace_unsolved_variant(
                    first,
                    vec![Entry::UnsolvedVariant(fresh), Entry::UnsolvedVariant(first)],
                )?;
                let context = context.solve_variant(
                    actual_variant,
                    mono::Alternatives {
                        alternatives: expected_extra,
                        variant: Variant::Unsolved(fresh),
                    },
                )?;
                context.solve_variant(
                    expected_variant,
                    mono::Alternatives {
                        alternatives: actual_extra,
                        variant: Variant::Unsolved(fresh),
                    },
                )
            }
        }
    }

    fn unify_variants(
        &mut self,
        context: Context,
        actual: &ty::Alternatives,
        expected: &ty::Alternatives,
        span: &Span,
    ) -> Result<Context, TypeError> {
        match (&actual.variant, &expected.variant) {
            (Variant::Empty, Variant::Empty) => Ok(context),
            (Variant::Variable(left), Variant::Variable(right)) if left == right => Ok(context),
            (Variant::Unsolved(left), Variant::Unsolved(right)) => {
                if left == right {
                    Ok(context)
                } else if context.variant_precedes(*left, *right) {
                    context.solve_variant(
                        *right,
                        mono::Alternatives {
                            alternatives: Vec::new(),
                            variant: Variant::Unsolved(*left),
                        },
                    )
                } else {
                    context.solve_variant(
                        *left,
                        mono::Alternatives {
                            alternatives: Vec::new(),
                            variant: Variant::Unsolved(*right),
                        },
                    )
                }
            }
            (Variant::Unsolved(existential), tail) | (tail, Variant::Unsolved(existential)) => {
                context.solve_variant(
                    *existential,
                    mono::Alternatives {
                        alternatives: Vec::new(),
                        variant: tail.clone(),
                    },
                )
            }
            _ => Err(TypeError::not_subtype(
                Type::Union(actual.clone()),
                Type::Union(expected.clone()),
                span.clone(),
            )),
        }
    }

    // === instantiation ===

    /// Solve `existential` to a subtype of `ty`.
    fn instantiate_type_left(
        &mut self,
        mut context: Context,
        existential: Existential<TypeDomain>,
        ty: &Type,
        span: &Span,
    ) -> Result<Context, TypeError> {
        match ty {
            Type::Unsolved(other) => {
                // Solve whichever appears further right in terms of the
                // other; both directions respect the ordering discipline.
                if context.type_precedes(existential, *other) {
                    context.solve_type(*other, Monotype::Unsolved(existential))
                } else {
                    context.solve_type(existential, Monotype::Unsolved(*other))
                }
            }
            Type::Forall(name, kind, body) => {
                let entry = Entry::Variable(name.clone(), *kind);
                context.push(entry.clone());
                let context = self.instantiate_type_left(context, existential, body, span)?;
                Ok(context.discard(&entry))
            }
            Type::Exists(name, kind, body) => {
                let marker = self.fresh_marker();
                context.push(marker.clone());
                let body = self.open_quantifier(&mut context, name, *kind, body);
                let context = self.instantiate_type_left(context, existential, &body, span)?;
                Ok(context.discard(&marker))
            }
            Type::Function(input, output) => {
                if let Ok(context) = try_solve(&context, existential, ty) {
                    return Ok(context);
                }
                let input_existential = self.fresh_type();
                let output_existential = self.fresh_type();
                let context = context.replace_unsolved_type(
                    existential,
                    vec![
                        Entry::UnsolvedType(input_existential),
                        Entry::UnsolvedType(output_existential),
                        Entry::SolvedType(
                            existential,
                            Monotype::function(
                                Monotype::Unsolved(input_existential),
                                Monotype::Unsolved(output_existential),
                            ),
                        ),
                    ],
                )?;
                let context =
                    self.instantiate_type_right(context, input, input_existential, span)?;
                let output = context.apply(output);
                self.instantiate_type_left(context, output_existential, &output, span)
            }
            Type::List(element) => {
                if let Ok(context) = try_solve(&context, existential, ty) {
                    return Ok(context);
                }
                let element_existential = self.fresh_type();
                let context = context.replace_unsolved_type(
                    existential,
                    vec![
                        Entry::UnsolvedType(element_existential),
                        Entry::SolvedType(
                            existential,
                            Monotype::list(Monotype::Unsolved(element_existential)),
                        ),
                    ],
                )?;
                let element = context.apply(element);
                self.instantiate_type_left(context, element_existential, &element, span)
            }
            Type::Record(fields) => {
                if let Ok(context) = try_solve(&context, existential, ty) {
                    return Ok(context);
                }
                let row = self.fresh_row();
                let context = context.replace_unsolved_type(
                    existential,
                    vec![
                        Entry::UnsolvedRow(row),
                        Entry::SolvedType(
                            existential,
                            Monotype::Record(mono::Fields {
                                fields: Vec::new(),
                                row: Row::Unsolved(row),
                            }),
                        ),
                    ],
                )?;
                self.instantiate_row(context, row, fields, span, Side::Left)
            }
            Type::Union(alternatives) => {
                if let Ok(context) = try_solve(&context, existential, ty) {
                    return Ok(context);
                }
                let variant = self.fresh_variant();
                let context = context.replace_unsolved_type(
                    existential,
                    vec![
                        Entry::UnsolvedVariant(variant),
                        Entry::SolvedType(
                            existential,
                            Monotype::Union(mono::Alternatives {
                                alternatives: Vec::new(),
                                variant: Variant::Unsolved(variant),
                            }),
                        ),
                    ],
                )?;
                self.instantiate_variant(context, variant, alternatives, span, Side::Left)
            }
            Type::Variable(name) => {
                context.solve_type(existential, Monotype::Variable(name.clone()))
            }
            Type::Bool => context.solve_type(existential, Monotype::Bool),
            Type::Natural => context.solve_type(existential, Monotype::Natural),
            Type::Text => context.solve_type(existential, Monotype::Text),
        }
    }

    /// Solve `existential` to a supertype of `ty`.
    fn instantiate_type_right(
        &mut self,
        mut context: Context,
        ty: &Type,
        existential: Existential<TypeDomain>,
        span: &Span,
    ) -> Result<Context, TypeError> {
        match ty {
            Type::Unsolved(other) => {
                if context.type_precedes(existential, *other) {
                    context.solve_type(*other, Monotype::Unsolved(existential))
                } else {
                    context.solve_type(existential, Monotype::Unsolved(*other))
                }
            }
            Type::Forall(name, kind, body) => {
                let marker = self.fresh_marker();
                context.push(marker.clone());
                let body = self.open_quantifier(&mut context, name, *kind, body);
                let context = self.instantiate_type_right(context, &body, existential, span)?;
                Ok(context.discard(&marker))
            }
            Type::Exists(name, kind, body) => {
                let entry = Entry::Variable(name.clone(), *kind);
                context.push(entry.clone());
                let context = self.instantiate_type_right(context, body, existential, span)?;
                Ok(context.discard(&entry))
            }
            Type::Function(input, output) => {
                if let Ok(context) = try_solve(&context, existential, ty) {
                    return Ok(context);
                }
                let input_existential = self.fresh_type();
                let output_existential = self.fresh_type();
                let context = context.replace_unsolved_type(
                    existential,
                    vec![
                        Entry::UnsolvedType(input_existential),
                        Entry::UnsolvedType(output_existential),
                        Entry::SolvedType(
                            existential,
                            Monotype::function(
                                Monotype::Unsolved(input_existential),
                                Monotype::Unsolved(output_existential),
                            ),
                        ),
                    ],
                )?;
                let context =
                    self.instantiate_type_left(context, input_existential, input, span)?;
                let output = context.apply(output);
                self.instantiate_type_right(context, &output, output_existential, span)
            }
            Type::List(element) => {
                if let Ok(context) = try_solve(&context, existential, ty) {
                    return Ok(context);
                }
                let element_existential = self.fresh_type();
                let context = context.replace_unsolved_type(
                    existential,
                    vec![
                        Entry::UnsolvedType(element_existential),
                        Entry::SolvedType(
                            existential,
                            Monotype::list(Monotype::Unsolved(element_existential)),
                        ),
                    ],
                )?;
                let element = context.apply(element);
                self.instantiate_type_right(context, &element, element_existential, span)
            }
            Type::Record(fields) => {
                if let Ok(context) = try_solve(&context, existential, ty) {
                    return Ok(context);
                }
                let row = self.fresh_row();
                let context = context.replace_unsolved_type(
                    existential,
                    vec![
                        Entry::UnsolvedRow(row),
                        Entry::SolvedType(
                            existential,
                            Monotype::Record(mono::Fields {
                                fields: Vec::new(),
                                row: Row::Unsolved(row),
                            }),
                        ),
                    ],
                )?;
                self.instantiate_row(context, row, fields, span, Side::Right)
            }
            Type::Union(alternatives) => {
                if let Ok(context) = try_solve(&context, existential, ty) {
                    return Ok(context);
                }
                let variant = self.fresh_variant();
                let context = context.replace_unsolved_type(
                    existential,
                    vec![
                        Entry::UnsolvedVariant(variant),
                        Entry::SolvedType(
                            existential,
                            Monotype::Union(mono::Alternatives {
                                alternatives: Vec::new(),
                                variant: Variant::Unsolved(variant),
                            }),
                        ),
                    ],
                )?;
                self.instantiate_variant(context, variant, alternatives, span, Side::Right)
            }
            Type::Variable(name) => {
                context.solve_type(existential, Monotype::Variable(name.clone()))
            }
            Type::Bool => context.solve_type(existential, Monotype::Bool),
            Type::Natural => context.solve_type(existential, Monotype::Natural),
            Type::Text => context.solve_type(existential, Monotype::Text),
        }
    }

    /// Solve a row existential against concrete fields, manufacturing one
    /// fresh field placeholder per label and linking the tails.
    fn instantiate_row(
        &mut self,
        context: Context,
        existential: Existential<RowDomain>,
        fields: &ty::Fields,
        span: &Span,
        side: Side,
    ) -> Result<Context, TypeError> {
        let mut replacements = Vec::new();
        let mut placeholders = Vec::new();
        for (label, _) in &fields.fields {
            let placeholder = self.fresh_type();
            replacements.push(Entry::UnsolvedType(placeholder));
            placeholders.push((label.clone(), placeholder));
        }

        let mut redirect = None;
        let solution_row = match &fields.row {
            Row::Empty => Row::Empty,
            Row::Variable(name) => Row::Variable(name.clone()),
            Row::Unsolved(tail) => {
                if context.row_precedes(*tail, existential) {
                    Row::Unsolved(*tail)
                } else {
                    let fresh = self.fresh_row();
                    replacements.push(Entry::UnsolvedRow(fresh));
                    redirect = Some((*tail, fresh));
                    Row::Unsolved(fresh)
                }
            }
        };
        replacements.push(Entry::UnsolvedRow(existential));

        let context = context.replace_unsolved_row(existential, replacements)?;
        let mut context = context.solve_row(
            existential,
            mono::Fields {
                fields: placeholders
                    .iter()
                    .map(|(label, placeholder)| {
                        (label.clone(), Monotype::Unsolved(*placeholder))
                    })
                    .collect(),
                row: solution_row,
            },
        )?;
        if let Some((tail, fresh)) = redirect {
            context = context.solve_row(
                tail,
                mono::Fields {
                    fields: Vec::new(),
                    row: Row::Unsolved(fresh),
                },
            )?;
        }

        for ((_, placeholder), (_, field_ty)) in placeholders.iter().zip(&fields.fields) {
            let field_ty = context.apply(field_ty);
            context = match side {
                Side::Left => {
                    self.instantiate_type_left(context, *placeholder, &field_ty, span)?
                }
                Side::Right => {
                    self.instantiate_type_right(context, &field_ty, *placeholder, span)?
                }
            };
        }
        Ok(context)
    }

    /// Variant analogue of [`Infer::instantiate_row`].
    fn instantiate_variant(
        &mut self,
        context: Context,
        existential: Existential<VariantDomain>,
        alternatives: &ty::Alternatives,
        span: &Span,
        side: Side,
    ) -> Result<Context, TypeError> {
        let mut replacements = Vec::new();
        let mut placeholders = Vec::new();
        for (label, _) in &alternatives.alternatives {
            let placeholder = self.fresh_type();
            replacements.push(Entry::UnsolvedType(placeholder));
            placeholders.push((label.clone(), placeholder));
        }

        let mut redirect = None;
        let solution_variant = match &alternatives.variant {
            Variant::Empty => Variant::Empty,
            Variant::Variable(name) => Variant::Variable(name.clone()),
            Variant::Unsolved(tail) => {
                if context.variant_precedes(*tail, existential) {
                    Variant::Unsolved(*tail)
                } else {
                    let fresh = self.fresh_variant();
                    replacements.push(Entry::UnsolvedVariant(fresh));
                    redirect = Some((*tail, fresh));
                    Variant::Unsolved(fresh)
                }
            }
        };
        replacements.push(Entry::UnsolvedVariant(existential));

        let context = context.replace_unsolved_variant(existential, replacements)?;
        let mut context = context.solve_variant(
            existential,
            mono::Alternatives {
                alternatives: placeholders
                    .iter()
                    .map(|(label, placeholder)| {
                        (label.clone(), Monotype::Unsolved(*placeholder))
                    })
                    .collect(),
                variant: solution_variant,
            },
        )?;
        if let Some((tail, fresh)) = redirect {
            context = context.solve_variant(
                tail,
                mono::Alternatives {
                    alternatives: Vec::new(),
                    variant: Variant::Unsolved(fresh),
                },
            )?;
        }

        for ((_, placeholder), (_, alternative_ty)) in
            placeholders.iter().zip(&alternatives.alternatives)
        {
            let alternative_ty = context.apply(alternative_ty);
            context = match side {
                Side::Left => {
                    self.instantiate_type_left(context, *placeholder, &alternative_ty, span)?
                }
                Side::Right => {
                    self.instantiate_type_right(context, &alternative_ty, *placeholder, span)?
                }
            };
        }
        Ok(context)
    }
}

impl Default for Infer {
    fn default() -> Self {
        Self::new()
    }
}

/// Which side of the subtyping judgment an instantiation came from.
#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Solve directly when the type is already a monotype that is well formed
/// left of the existential; structural decomposition handles the rest.
fn try_solve(
    context: &Context,
    existential: Existential<TypeDomain>,
    ty: &Type,
) -> Result<Context, TypeError> {
    let monotype = ty
        .to_monotype()
        .ok_or_else(|| TypeError::out_of_scope(existential.label()))?;
    context.clone().solve_type(existential, monotype)
}

fn monotype_fields(fields: &[(String, Type)]) -> Option<Vec<(String, Monotype)>> {
    fields
        .iter()
        .map(|(label, ty)| Some((label.clone(), ty.to_monotype()?)))
        .collect()
}

fn monotype_alternatives(alternatives: &[(String, Type)]) -> Option<Vec<(String, Monotype)>> {
    alternatives
        .iter()
        .map(|(label, ty)| Some((label.clone(), ty.to_monotype()?)))
        .collect()
}

fn builtin_type(builtin: Builtin) -> Type {
    let variable = |name: &str| Type::Variable(name.to_string());
    match builtin {
        Builtin::Not => Type::function(Type::Bool, Type::Bool),
        Builtin::Even | Builtin::Odd => Type::function(Type::Natural, Type::Bool),
        Builtin::Length => Type::forall(
            "a",
            Kind::Type,
            Type::function(Type::list(variable("a")), Type::Natural),
        ),
        Builtin::Map => Type::forall(
            "a",
            Kind::Type,
            Type::forall(
                "b",
                Kind::Type,
                Type::function(
                    Type::function(variable("a"), variable("b")),
                    Type::function(Type::list(variable("a")), Type::list(variable("b"))),
                ),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Lambda, Scalar, ScalarValue, Variable};

    fn scalar_expr(value: ScalarValue) -> Syntax {
        Syntax::Scalar(Scalar {
            value,
            position: Span::default(),
        })
    }

    fn variable_expr(name: &str, index: usize) -> Syntax {
        Syntax::Variable(Variable {
            name: name.to_string(),
            index,
            position: Span::default(),
        })
    }

    fn lambda_expr(parameter: &str, body: Syntax) -> Syntax {
        Syntax::Lambda(Lambda {
            parameter: parameter.to_string(),
            body: Box::new(body),
            position: Span::default(),
        })
    }

    #[test]
    fn test_synthesize_scalars() {
        let mut infer = Infer::new();
        let (ty, _) = infer
            .synthesize(Context::new(), &scalar_expr(ScalarValue::Natural(1)))
            .unwrap();
        assert_eq!(ty, Type::Natural);

        let (ty, _) = infer
            .synthesize(Context::new(), &scalar_expr(ScalarValue::Bool(true)))
            .unwrap();
        assert_eq!(ty, Type::Bool);
    }

    #[test]
    fn test_synthesize_unbound_variable() {
        let mut infer = Infer::new();
        let result = infer.synthesize(Context::new(), &variable_expr("x", 0));
        assert!(matches!(result, Err(TypeError::UnboundVariable { .. })));
    }

    #[test]
    fn test_synthesize_variable_from_context() {
        let mut infer = Infer::new();
        let mut context = Context::new();
        context.push(Entry::Annotation("x".to_string(), Type::Natural));
        let (ty, _) = infer.synthesize(context, &variable_expr("x", 0)).unwrap();
        assert_eq!(ty, Type::Natural);
    }

    #[test]
    fn test_synthesize_lambda_shape() {
        let mut infer = Infer::new();
        let expr = lambda_expr("x", variable_expr("x", 0));
        let (ty, context) = infer.synthesize(Context::new(), &expr).unwrap();
        match context.apply(&ty) {
            Type::Function(input, output) => assert_eq!(input, output),
            other => panic!("expected a function type, got {}", other),
        }
    }

    #[test]
    fn test_check_lambda_against_function() {
        let mut infer = Infer::new();
        let expr = lambda_expr("x", variable_expr("x", 0));
        let expected = Type::function(Type::Natural, Type::Natural);
        assert!(infer.check(Context::new(), &expr, &expected).is_ok());

        let mismatched = Type::function(Type::Natural, Type::Bool);
        assert!(infer.check(Context::new(), &expr, &mismatched).is_err());
    }

    #[test]
    fn test_subtype_primitives_are_reflexive() {
        let mut infer = Infer::new();
        for ty in [Type::Bool, Type::Natural, Type::Text] {
            assert!(infer
                .subtype(Context::new(), &ty, &ty, &Span::default())
                .is_ok());
        }
        assert!(infer
            .subtype(Context::new(), &Type::Bool, &Type::Natural, &Span::default())
            .is_err());
    }

    #[test]
    fn test_subtype_function_is_contravariant() {
        // (forall a . a -> a) <: Natural -> Natural, not the other way.
        let mut infer = Infer::new();
        let polymorphic = Type::forall(
            "a",
            Kind::Type,
            Type::function(
                Type::Variable("a".to_string()),
                Type::Variable("a".to_string()),
            ),
        );
        let monomorphic = Type::function(Type::Natural, Type::Natural);
        assert!(infer
            .subtype(Context::new(), &polymorphic, &monomorphic, &Span::default())
            .is_ok());
        assert!(infer
            .subtype(Context::new(), &monomorphic, &polymorphic, &Span::default())
            .is_err());
    }

    #[test]
    fn test_subtype_solves_existentials() {
        let mut infer = Infer::new();
        let existential = infer.fresh_type();
        let mut context = Context::new();
        context.push(Entry::UnsolvedType(existential));
        let context = infer
            .subtype(
                context,
                &Type::Unsolved(existential),
                &Type::function(Type::Natural, Type::Bool),
                &Span::default(),
            )
            .unwrap();
        assert_eq!(
            context.apply(&Type::Unsolved(existential)),
            Type::function(Type::Natural, Type::Bool)
        );
    }

    #[test]
    fn test_subtype_occurs_check() {
        let mut infer = Infer::new();
        let existential = infer.fresh_type();
        let mut context = Context::new();
        context.push(Entry::UnsolvedType(existential));
        let recursive = Type::function(Type::Unsolved(existential), Type::Natural);
        let result = infer.subtype(
            context,
            &Type::Unsolved(existential),
            &recursive,
            &Span::default(),
        );
        assert!(matches!(result, Err(TypeError::OccursCheck { .. })));
    }

    #[test]
    fn test_row_subtyping_absorbs_extras_into_open_tail() {
        let mut infer = Infer::new();
        let row = infer.fresh_row();
        let mut context = Context::new();
        context.push(Entry::UnsolvedRow(row));

        let actual = Type::Record(ty::Fields::closed(vec![
            ("x".to_string(), Type::Natural),
            ("y".to_string(), Type::Bool),
        ]));
        let expected = Type::Record(ty::Fields {
            fields: vec![("x".to_string(), Type::Natural)],
            row: Row::Unsolved(row),
        });
        let context = infer
            .subtype(context, &actual, &expected, &Span::default())
            .unwrap();
        assert_eq!(context.apply(&expected), actual);
    }

    #[test]
    fn test_row_subtyping_rejects_extras_on_closed_tail() {
        let mut infer = Infer::new();
        let actual = Type::Record(ty::Fields::closed(vec![(
            "x".to_string(),
            Type::Natural,
        )]));
        let expected = Type::Record(ty::Fields::closed(vec![
            ("x".to_string(), Type::Natural),
            ("y".to_string(), Type::Bool),
        ]));
        let result = infer.subtype(Context::new(), &actual, &expected, &Span::default());
        assert!(matches!(result, Err(TypeError::MissingField { .. })));
    }

    #[test]
    fn test_variant_subtyping_widens_into_open_tail() {
        let mut infer = Infer::new();
        let variant = infer.fresh_variant();
        let mut context = Context::new();
        context.push(Entry::UnsolvedVariant(variant));

        let actual = Type::Union(ty::Alternatives {
            alternatives: vec![("Left".to_string(), Type::Natural)],
            variant: Variant::Unsolved(variant),
        });
        let expected = Type::Union(ty::Alternatives::closed(vec![
            ("Left".to_string(), Type::Natural),
            ("Right".to_string(), Type::Bool),
        ]));
        assert!(infer
            .subtype(context, &actual, &expected, &Span::default())
            .is_ok());
    }
}
