//! Type grammar.
//!
//! Mirrors the pretty printer's three precedence layers (function,
//! application, primitive) with quantifiers at the outside. Unsolved
//! existentials (`a?`) are internal to the inference engine and have no
//! surface syntax.

use crate::lexer::Token;
use crate::parser::combinators::{
    expect_colon, expect_comma, expect_dot, expect_lparen, expect_rangle, expect_rbrace,
    expect_rparen, ident, many, separated, BoxedParser,
};
use crate::parser::{ParseState, Parser};
use crate::types::ty::{Alternatives, Fields};
use crate::types::{Kind, Row, Type, Variant};

/// type := quantified | function
pub fn type_expression() -> BoxedParser<Type> {
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(Token::Forall(_) | Token::Exists(_)) => quantified_type().parse(state),
        _ => function_type().parse(state),
    })
}

/// quantified := ("forall" | "exists") binder+ "." type
fn quantified_type() -> BoxedParser<Type> {
    BoxedParser::new(move |state: &mut ParseState| {
        let is_forall = matches!(state.peek(), Some(Token::Forall(_)));
        state.advance();
        let binders = many(binder()).parse(state)?;
        if binders.is_empty() {
            let err = state
                .error_here("unexpected token")
                .expected("quantifier binder");
            state.record_error(err.clone());
            return Err(err);
        }
        expect_dot().parse(state)?;
        let body = type_expression().parse(state)?;
        Ok(binders.into_iter().rev().fold(body, |body, (name, kind)| {
            if is_forall {
                Type::forall(name, kind, body)
            } else {
                Type::exists(name, kind, body)
            }
        }))
    })
}

/// binder := ident | "(" ident ":" kind ")"
fn binder() -> BoxedParser<(String, Kind)> {
    let plain = ident().map(|id| (id.value, Kind::Type));
    let kinded = BoxedParser::new(move |state: &mut ParseState| {
        expect_lparen().parse(state)?;
        let id = ident().parse(state)?;
        expect_colon().parse(state)?;
        let kind = kind_annotation().parse(state)?;
        expect_rparen().parse(state)?;
        Ok((id.value, kind))
    });
    plain.or(kinded)
}

/// kind := "Type" | "Fields" | "Alternatives"
fn kind_annotation() -> BoxedParser<Kind> {
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(Token::TypeKind(_)) => {
            state.advance();
            Ok(Kind::Type)
        }
        Some(Token::FieldsKind(_)) => {
            state.advance();
            Ok(Kind::Fields)
        }
        Some(Token::AlternativesKind(_)) => {
            state.advance();
            Ok(Kind::Alternatives)
        }
        _ => {
            let err = state.error_here("unexpected token").expected("kind");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// function := application ["->" type]
fn function_type() -> BoxedParser<Type> {
    BoxedParser::new(move |state: &mut ParseState| {
        let input = application_type().parse(state)?;
        if matches!(state.peek(), Some(Token::Arrow(_))) {
            state.advance();
            let output = type_expression().parse(state)?;
            Ok(Type::function(input, output))
        } else {
            Ok(input)
        }
    })
}

/// application := "List" primitive | primitive
fn application_type() -> BoxedParser<Type> {
    BoxedParser::new(move |state: &mut ParseState| {
        if matches!(state.peek(), Some(Token::ListType(_))) {
            state.advance();
            let element = primitive_type().parse(state)?;
            Ok(Type::list(element))
        } else {
            primitive_type().parse(state)
        }
    })
}

fn primitive_type() -> BoxedParser<Type> {
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(Token::BoolType(_)) => {
            state.advance();
            Ok(Type::Bool)
        }
        Some(Token::NaturalType(_)) => {
            state.advance();
            Ok(Type::Natural)
        }
        Some(Token::TextType(_)) => {
            state.advance();
            Ok(Type::Text)
        }
        Some(Token::Ident(_)) => {
            let id = ident().parse(state)?;
            Ok(Type::Variable(id.value))
        }
        Some(Token::LBrace(_)) => record_type().parse(state),
        Some(Token::LAngle(_)) => union_type().parse(state),
        Some(Token::LParen(_)) => {
            state.advance();
            let ty = type_expression().parse(state)?;
            expect_rparen().parse(state)?;
            Ok(ty)
        }
        _ => {
            let err = state.error_here("unexpected token").expected("type");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// record := "{" [field ("," field)*] ["|" ident] "}"
fn record_type() -> BoxedParser<Type> {
    BoxedParser::new(move |state: &mut ParseState| {
        state.advance();
        let fields = separated(field_type(), expect_comma()).parse(state)?;
        let row = if matches!(state.peek(), Some(Token::Bar(_))) {
            state.advance();
            let id = ident().parse(state)?;
            Row::Variable(id.value)
        } else {
            Row::Empty
        };
        expect_rbrace().parse(state)?;
        Ok(Type::Record(Fields { fields, row }))
    })
}

/// union := "<" [alternative ("," alternative)*] ["|" ident] ">"
fn union_type() -> BoxedParser<Type> {
    BoxedParser::new(move |state: &mut ParseState| {
        state.advance();
        let alternatives = separated(field_type(), expect_comma()).parse(state)?;
        let variant = if matches!(state.peek(), Some(Token::Bar(_))) {
            state.advance();
            let id = ident().parse(state)?;
            Variant::Variable(id.value)
        } else {
            Variant::Empty
        };
        expect_rangle().parse(state)?;
        Ok(Type::Union(Alternatives {
            alternatives,
            variant,
        }))
    })
}

/// field := ident ":" type
fn field_type() -> BoxedParser<(String, Type)> {
    BoxedParser::new(move |state: &mut ParseState| {
        let label = ident().parse(state)?;
        expect_colon().parse(state)?;
        let ty = type_expression().parse(state)?;
        Ok((label.value, ty))
    })
}
