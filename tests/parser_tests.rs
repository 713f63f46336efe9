use reed::ast::{Operator, Syntax};
use reed::lexer::Token;
use reed::parser::{parse, parse_type, ParseState};
use reed::types::{Kind, Row, Type};

fn parse_source(source: &str) -> Syntax {
    let tokens = Token::lex(source).expect("lexing should succeed");
    let mut state = ParseState::new(tokens);
    parse(&mut state).unwrap_or_else(|e| panic!("parsing {:?} failed: {}", source, e))
}

fn parse_source_type(source: &str) -> Type {
    let tokens = Token::lex(source).expect("lexing should succeed");
    let mut state = ParseState::new(tokens);
    parse_type(&mut state).unwrap_or_else(|e| panic!("parsing type {:?} failed: {}", source, e))
}

fn parse_fails(source: &str) -> bool {
    let Ok(tokens) = Token::lex(source) else {
        return true;
    };
    let mut state = ParseState::new(tokens);
    parse(&mut state).is_err()
}

#[test]
fn parse_variable_and_index() {
    match parse_source("x") {
        Syntax::Variable(variable) => {
            assert_eq!(variable.name, "x");
            assert_eq!(variable.index, 0);
        }
        other => panic!("expected variable, got {:?}", other),
    }
    match parse_source("x@2") {
        Syntax::Variable(variable) => {
            assert_eq!(variable.name, "x");
            assert_eq!(variable.index, 2);
        }
        other => panic!("expected variable, got {:?}", other),
    }
}

#[test]
fn parse_uppercase_ident_is_alternative() {
    match parse_source("Left") {
        Syntax::Alternative(alternative) => assert_eq!(alternative.name, "Left"),
        other => panic!("expected alternative, got {:?}", other),
    }
}

#[test]
fn parse_lambda() {
    match parse_source(r"\x -> x") {
        Syntax::Lambda(lambda) => {
            assert_eq!(lambda.parameter, "x");
            assert!(matches!(*lambda.body, Syntax::Variable(_)));
        }
        other => panic!("expected lambda, got {:?}", other),
    }
}

#[test]
fn parse_application_is_left_associative() {
    match parse_source("f x y") {
        Syntax::Application(outer) => match *outer.function {
            Syntax::Application(inner) => {
                assert!(matches!(*inner.function, Syntax::Variable(_)));
            }
            other => panic!("expected nested application, got {:?}", other),
        },
        other => panic!("expected application, got {:?}", other),
    }
}

#[test]
fn parse_operator_precedence() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    match parse_source("1 + 2 * 3") {
        Syntax::Operator(plus) => {
            assert_eq!(plus.operator, Operator::Plus);
            match *plus.right {
                Syntax::Operator(times) => assert_eq!(times.operator, Operator::Times),
                other => panic!("expected multiplication, got {:?}", other),
            }
        }
        other => panic!("expected operator, got {:?}", other),
    }
}

#[test]
fn parse_application_binds_tighter_than_operators() {
    // f x + 1 parses as (f x) + 1
    match parse_source("f x + 1") {
        Syntax::Operator(plus) => {
            assert_eq!(plus.operator, Operator::Plus);
            assert!(matches!(*plus.left, Syntax::Application(_)));
        }
        other => panic!("expected operator, got {:?}", other),
    }
}

#[test]
fn parse_annotation_at_lowest_precedence() {
    match parse_source("1 + 2 : Natural") {
        Syntax::Annotation(annotation) => {
            assert!(matches!(*annotation.expression, Syntax::Operator(_)));
            assert_eq!(annotation.annotation, Type::Natural);
        }
        other => panic!("expected annotation, got {:?}", other),
    }
}

#[test]
fn parse_projection_chain() {
    match parse_source("r.a.b") {
        Syntax::Projection(outer) => {
            assert_eq!(outer.label, "b");
            match *outer.record {
                Syntax::Projection(inner) => assert_eq!(inner.label, "a"),
                other => panic!("expected nested projection, got {:?}", other),
            }
        }
        other => panic!("expected projection, got {:?}", other),
    }
}

#[test]
fn parse_let_with_multiple_bindings() {
    match parse_source("let x = 1 let y : Natural = 2 in x") {
        Syntax::Let(let_) => {
            assert_eq!(let_.bindings.len(), 2);
            assert_eq!(let_.bindings[0].name, "x");
            assert!(let_.bindings[0].annotation.is_none());
            assert_eq!(let_.bindings[1].name, "y");
            assert_eq!(let_.bindings[1].annotation, Some(Type::Natural));
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn parse_merge_takes_one_argument() {
    // merge m x parses as (merge m) x
    match parse_source("merge m x") {
        Syntax::Application(application) => {
            assert!(matches!(*application.function, Syntax::Merge(_)));
            assert!(matches!(*application.argument, Syntax::Variable(_)));
        }
        other => panic!("expected application, got {:?}", other),
    }
}

#[test]
fn parse_list_and_record_literals() {
    match parse_source("[1, 2]") {
        Syntax::List(list) => assert_eq!(list.elements.len(), 2),
        other => panic!("expected list, got {:?}", other),
    }
    match parse_source("[ ]") {
        Syntax::List(list) => assert!(list.elements.is_empty()),
        other => panic!("expected list, got {:?}", other),
    }
    match parse_source("{ a = 1, b = true }") {
        Syntax::Record(record) => {
            assert_eq!(record.fields.len(), 2);
            assert_eq!(record.fields[0].0, "a");
        }
        other => panic!("expected record, got {:?}", other),
    }
    match parse_source("{ }") {
        Syntax::Record(record) => assert!(record.fields.is_empty()),
        other => panic!("expected record, got {:?}", other),
    }
}

#[test]
fn parse_text_literal_unescapes() {
    match parse_source(r#""a\"b\nc""#) {
        Syntax::Scalar(scalar) => match scalar.value {
            reed::ast::ScalarValue::Text(text) => assert_eq!(text, "a\"b\nc"),
            other => panic!("expected text, got {:?}", other),
        },
        other => panic!("expected scalar, got {:?}", other),
    }
}

#[test]
fn parse_errors() {
    assert!(parse_fails("(1"));
    assert!(parse_fails("let x = in x"));
    assert!(parse_fails(r"\ -> x"));
    assert!(parse_fails("{ a = }"));
    assert!(parse_fails("1 )"));
}

// === types ===

#[test]
fn parse_function_type_is_right_associative() {
    let ty = parse_source_type("Natural -> Natural -> Bool");
    assert_eq!(
        ty,
        Type::function(
            Type::Natural,
            Type::function(Type::Natural, Type::Bool)
        )
    );
}

#[test]
fn parse_quantified_types() {
    let ty = parse_source_type("forall a . a -> a");
    match ty {
        Type::Forall(name, Kind::Type, _) => assert_eq!(name, "a"),
        other => panic!("expected forall, got {:?}", other),
    }

    let ty = parse_source_type("forall (r : Fields) . { x : Natural | r }");
    match ty {
        Type::Forall(name, Kind::Fields, body) => {
            assert_eq!(name, "r");
            match *body {
                Type::Record(fields) => {
                    assert_eq!(fields.row, Row::Variable("r".to_string()));
                }
                other => panic!("expected record, got {:?}", other),
            }
        }
        other => panic!("expected row forall, got {:?}", other),
    }
}

#[test]
fn parse_multi_binder_quantifier() {
    let ty = parse_source_type("forall a b . a -> b");
    match ty {
        Type::Forall(first, Kind::Type, body) => {
            assert_eq!(first, "a");
            assert!(matches!(*body, Type::Forall(_, Kind::Type, _)));
        }
        other => panic!("expected nested foralls, got {:?}", other),
    }
}

#[test]
fn parse_union_type() {
    let ty = parse_source_type("< Left : Natural, Right : Bool >");
    match ty {
        Type::Union(alternatives) => {
            assert_eq!(alternatives.alternatives.len(), 2);
            assert_eq!(alternatives.alternatives[0].0, "Left");
        }
        other => panic!("expected union, got {:?}", other),
    }
}

#[test]
fn parse_list_type_element_is_primitive() {
    let ty = parse_source_type("List Natural -> Bool");
    assert_eq!(
        ty,
        Type::function(Type::list(Type::Natural), Type::Bool)
    );
}

// === round trip ===

#[test]
fn pretty_printed_types_parse_back() {
    let sources = [
        "Natural",
        "Natural -> Bool",
        "(Natural -> Natural) -> Bool",
        "List (Natural -> Bool)",
        "forall a . a -> a",
        "forall (r : Fields) . { x : Natural | r }",
        "forall (v : Alternatives) . < Left : Natural | v >",
        "exists a . List a",
        "{ a : Natural, b : List Bool }",
        "{ }",
        "< Left : Natural >",
        "forall a . forall b . (a -> b) -> List a -> List b",
    ];
    for source in sources {
        let ty = parse_source_type(source);
        let reparsed = parse_source_type(&ty.pretty());
        assert_eq!(reparsed, ty, "round trip failed for {:?}", source);
    }
}
