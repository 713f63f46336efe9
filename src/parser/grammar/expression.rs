//! Expression grammar.
//!
//! Precedence, loosest to tightest: lambda/let/if, annotation, `||`, `&&`,
//! `++`, `+`, `*`, application (juxtaposition), projection, primary.

use crate::ast::{
    Alternative, Annotation, Application, Binding, Builtin, BuiltinRef, If, Lambda, Let,
    ListLiteral, Merge, Operator, OperatorExpr, Projection, RecordLiteral, Scalar, ScalarValue,
    Syntax, Variable,
};
use crate::lexer::Token;
use crate::parser::combinators::{
    expect_arrow, expect_colon, expect_comma, expect_else, expect_equals, expect_in,
    expect_rbrace, expect_rbracket, expect_rparen, expect_then, ident, optional, separated,
    token, BoxedParser,
};
use crate::parser::{ParseState, Parser};

use super::ty::type_expression;

/// expression := lambda | let | if | annotated
pub fn expression() -> BoxedParser<Syntax> {
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(Token::Backslash(_)) => lambda().parse(state),
        Some(Token::Let(_)) => let_expression().parse(state),
        Some(Token::If(_)) => if_expression().parse(state),
        _ => annotated_expression().parse(state),
    })
}

/// lambda := "\" ident "->" expression
fn lambda() -> BoxedParser<Syntax> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = token(|t| matches!(t, Token::Backslash(_)), "'\\'")
            .parse(state)?
            .pos();
        let parameter = ident().parse(state)?;
        expect_arrow().parse(state)?;
        let body = expression().parse(state)?;
        let position = start.merge(&body.position());
        Ok(Syntax::Lambda(Lambda {
            parameter: parameter.value,
            body: Box::new(body),
            position,
        }))
    })
}

/// let := ("let" ident [":" type] "=" expression)+ "in" expression
fn let_expression() -> BoxedParser<Syntax> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut bindings = Vec::new();
        while matches!(state.peek(), Some(Token::Let(_))) {
            let keyword = state.advance().unwrap();
            let name = ident().parse(state)?;
            let annotation = optional(type_annotation()).parse(state)?;
            expect_equals().parse(state)?;
            let value = expression().parse(state)?;
            let position = keyword.pos().merge(&value.position());
            bindings.push(Binding {
                name: name.value,
                annotation,
                value: Box::new(value),
                position,
            });
        }
        if bindings.is_empty() {
            let err = state.error_here("unexpected token").expected("'let'");
            state.record_error(err.clone());
            return Err(err);
        }
        expect_in().parse(state)?;
        let body = expression().parse(state)?;
        let position = bindings[0].position.merge(&body.position());
        Ok(Syntax::Let(Let {
            bindings,
            body: Box::new(body),
            position,
        }))
    })
}

/// if := "if" expression "then" expression "else" expression
fn if_expression() -> BoxedParser<Syntax> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = token(|t| matches!(t, Token::If(_)), "'if'")
            .parse(state)?
            .pos();
        let predicate = expression().parse(state)?;
        expect_then().parse(state)?;
        let if_true = expression().parse(state)?;
        expect_else().parse(state)?;
        let if_false = expression().parse(state)?;
        let position = start.merge(&if_false.position());
        Ok(Syntax::If(If {
            predicate: Box::new(predicate),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            position,
        }))
    })
}

/// annotated := operator [":" type]
fn annotated_expression() -> BoxedParser<Syntax> {
    BoxedParser::new(move |state: &mut ParseState| {
        let expr = or_expression().parse(state)?;
        match optional(type_annotation()).parse(state)? {
            Some(annotation) => {
                let position = expr.position();
                Ok(Syntax::Annotation(Annotation {
                    expression: Box::new(expr),
                    annotation,
                    position,
                }))
            }
            None => Ok(expr),
        }
    })
}

/// ":" type
fn type_annotation() -> BoxedParser<crate::types::Type> {
    BoxedParser::new(move |state: &mut ParseState| {
        expect_colon().parse(state)?;
        type_expression().parse(state)
    })
}

fn binary_level<F>(
    operand: fn() -> BoxedParser<Syntax>,
    accept: F,
    operator: Operator,
) -> BoxedParser<Syntax>
where
    F: Fn(&Token) -> bool + 'static,
{
    BoxedParser::new(move |state: &mut ParseState| {
        let mut left = operand().parse(state)?;
        while state.peek().is_some_and(&accept) {
            state.advance();
            let right = operand().parse(state)?;
            let position = left.position().merge(&right.position());
            left = Syntax::Operator(OperatorExpr {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                position,
            });
        }
        Ok(left)
    })
}

fn or_expression() -> BoxedParser<Syntax> {
    binary_level(and_expression, |t| matches!(t, Token::Or(_)), Operator::Or)
}

fn and_expression() -> BoxedParser<Syntax> {
    binary_level(
        append_expression,
        |t| matches!(t, Token::And(_)),
        Operator::And,
    )
}

fn append_expression() -> BoxedParser<Syntax> {
    binary_level(
        additive_expression,
        |t| matches!(t, Token::Append(_)),
        Operator::Append,
    )
}

fn additive_expression() -> BoxedParser<Syntax> {
    binary_level(
        multiplicative_expression,
        |t| matches!(t, Token::Plus(_)),
        Operator::Plus,
    )
}

fn multiplicative_expression() -> BoxedParser<Syntax> {
    binary_level(
        application_expression,
        |t| matches!(t, Token::Star(_)),
        Operator::Times,
    )
}

/// application := argument+, left associative
fn application_expression() -> BoxedParser<Syntax> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut function = argument_expression().parse(state)?;
        loop {
            let pos = state.position();
            match argument_expression().parse(state) {
                Ok(argument) => {
                    let position = function.position().merge(&argument.position());
                    function = Syntax::Application(Application {
                        function: Box::new(function),
                        argument: Box::new(argument),
                        position,
                    });
                }
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        Ok(function)
    })
}

/// argument := "merge" projection | projection
fn argument_expression() -> BoxedParser<Syntax> {
    BoxedParser::new(move |state: &mut ParseState| {
        if matches!(state.peek(), Some(Token::Merge(_))) {
            let keyword = state.advance().unwrap();
            let handlers = projection_expression().parse(state)?;
            let position = keyword.pos().merge(&handlers.position());
            Ok(Syntax::Merge(Merge {
                handlers: Box::new(handlers),
                position,
            }))
        } else {
            projection_expression().parse(state)
        }
    })
}

/// projection := primary ("." ident)*
fn projection_expression() -> BoxedParser<Syntax> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut expr = primary_expression().parse(state)?;
        while matches!(state.peek(), Some(Token::Dot(_))) {
            state.advance();
            let label = ident().parse(state)?;
            let position = expr.position().merge(&label.position);
            expr = Syntax::Projection(Projection {
                record: Box::new(expr),
                label: label.value,
                position,
            });
        }
        Ok(expr)
    })
}

fn primary_expression() -> BoxedParser<Syntax> {
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(Token::Ident(_)) => {
            let id = ident().parse(state)?;
            if id.value.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                return Ok(Syntax::Alternative(Alternative {
                    name: id.value,
                    position: id.position,
                }));
            }
            // An optional `@n` picks a shadowed binding.
            if matches!(state.peek(), Some(Token::At(_))) {
                state.advance();
                let index = token(|t| matches!(t, Token::Natural(_)), "natural number")
                    .parse(state)?;
                let Token::Natural(index) = index else {
                    unreachable!()
                };
                let position = id.position.merge(&index.position);
                return Ok(Syntax::Variable(Variable {
                    name: id.value,
                    index: index.value.parse().expect("the lexer only accepts digits"),
                    position,
                }));
            }
            Ok(Syntax::Variable(Variable {
                name: id.value,
                index: 0,
                position: id.position,
            }))
        }
        Some(Token::True(_)) => {
            let position = state.advance().unwrap().pos();
            Ok(Syntax::Scalar(Scalar {
                value: ScalarValue::Bool(true),
                position,
            }))
        }
        Some(Token::False(_)) => {
            let position = state.advance().unwrap().pos();
            Ok(Syntax::Scalar(Scalar {
                value: ScalarValue::Bool(false),
                position,
            }))
        }
        Some(Token::Natural(_)) => {
            let Some(Token::Natural(literal)) = state.advance() else {
                unreachable!()
            };
            Ok(Syntax::Scalar(Scalar {
                value: ScalarValue::Natural(
                    literal.value.parse().expect("the lexer only accepts digits"),
                ),
                position: literal.position,
            }))
        }
        Some(Token::Text(_)) => {
            let Some(Token::Text(literal)) = state.advance() else {
                unreachable!()
            };
            Ok(Syntax::Scalar(Scalar {
                value: ScalarValue::Text(unquote(&literal.value)),
                position: literal.position,
            }))
        }
        Some(
            Token::Not(_) | Token::Even(_) | Token::Odd(_) | Token::Length(_) | Token::Map(_),
        ) => {
            let keyword = state.advance().unwrap();
            let builtin = match keyword {
                Token::Not(_) => Builtin::Not,
                Token::Even(_) => Builtin::Even,
                Token::Odd(_) => Builtin::Odd,
                Token::Length(_) => Builtin::Length,
                Token::Map(_) => Builtin::Map,
                _ => unreachable!(),
            };
            Ok(Syntax::Builtin(BuiltinRef {
                builtin,
                position: keyword.pos(),
            }))
        }
        Some(Token::LBracket(_)) => {
            let start = state.advance().unwrap().pos();
            let elements = separated(expression(), expect_comma()).parse(state)?;
            let end = expect_rbracket().parse(state)?.pos();
            Ok(Syntax::List(ListLiteral {
                elements,
                position: start.merge(&end),
            }))
        }
        Some(Token::LBrace(_)) => {
            let start = state.advance().unwrap().pos();
            let fields = separated(record_field(), expect_comma()).parse(state)?;
            let end = expect_rbrace().parse(state)?.pos();
            Ok(Syntax::Record(RecordLiteral {
                fields,
                position: start.merge(&end),
            }))
        }
        Some(Token::LParen(_)) => {
            state.advance();
            let expr = expression().parse(state)?;
            expect_rparen().parse(state)?;
            Ok(expr)
        }
        _ => {
            let err = state.error_here("unexpected token").expected("expression");
            state.record_error(err.clone());
            Err(err)
        }
    })
}

/// record_field := ident "=" expression
fn record_field() -> BoxedParser<(String, Syntax)> {
    BoxedParser::new(move |state: &mut ParseState| {
        let label = ident().parse(state)?;
        expect_equals().parse(state)?;
        let value = expression().parse(state)?;
        Ok((label.value, value))
    })
}

/// Strip the surrounding quotes and resolve escapes in a text literal.
fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}
