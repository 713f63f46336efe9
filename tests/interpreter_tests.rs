use reed::ast::Syntax;
use reed::interpreter::{evaluate, Environment, Value};
use reed::lexer::Token;
use reed::parser::{parse, ParseState};

fn parse_source(source: &str) -> Syntax {
    let tokens = Token::lex(source).expect("lexing should succeed");
    let mut state = ParseState::new(tokens);
    parse(&mut state).unwrap_or_else(|e| panic!("parsing {:?} failed: {}", source, e))
}

fn eval_source(source: &str) -> Value {
    evaluate(&Environment::new(), &parse_source(source))
}

fn assert_natural(value: &Value, expected: u64) {
    match value {
        Value::Natural(found) => assert_eq!(*found, expected),
        other => panic!("expected natural {}, got {}", expected, other),
    }
}

#[test]
fn eval_scalars() {
    assert_natural(&eval_source("42"), 42);
    assert!(matches!(eval_source("true"), Value::Bool(true)));
    match eval_source(r#""hello""#) {
        Value::Text(text) => assert_eq!(text, "hello"),
        other => panic!("expected text, got {}", other),
    }
}

#[test]
fn eval_lambda_application() {
    assert_natural(&eval_source(r"(\x -> x) 1"), 1);
    assert_natural(&eval_source(r"(\x -> \y -> x) 1 2"), 1);
}

#[test]
fn eval_closure_captures_environment() {
    assert_natural(&eval_source(r"let n = 10 in (\x -> x + n) 1"), 11);
}

#[test]
fn eval_let_bindings_in_order() {
    assert_natural(&eval_source("let x = 1 let y = x + 1 in x + y"), 3);
}

#[test]
fn eval_shadowing_with_index() {
    assert_natural(&eval_source(r"(\x -> \x -> x@1) 1 2"), 1);
    assert_natural(&eval_source(r"(\x -> \x -> x) 1 2"), 2);
}

#[test]
fn eval_if_selects_branch() {
    assert_natural(&eval_source("if true then 1 else 2"), 1);
    assert_natural(&eval_source("if false then 1 else 2"), 2);
}

#[test]
fn eval_record_and_projection() {
    assert_natural(&eval_source(r#"{ a = 1, b = "hi" }.a"#), 1);
    match eval_source("{ a = 1, b = true }") {
        Value::Record(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].0, "a");
            assert_eq!(fields[1].0, "b");
        }
        other => panic!("expected record, got {}", other),
    }
}

#[test]
fn eval_list_literal() {
    match eval_source("[1, 2, 3]") {
        Value::List(elements) => {
            assert_eq!(elements.len(), 3);
            assert_natural(&elements[0], 1);
            assert_natural(&elements[2], 3);
        }
        other => panic!("expected list, got {}", other),
    }
}

#[test]
fn eval_operators() {
    assert_natural(&eval_source("2 + 3 * 4"), 14);
    assert!(matches!(eval_source("true && false"), Value::Bool(false)));
    assert!(matches!(eval_source("false || true"), Value::Bool(true)));
    match eval_source(r#""foo" ++ "bar""#) {
        Value::Text(text) => assert_eq!(text, "foobar"),
        other => panic!("expected text, got {}", other),
    }
    match eval_source("[1] ++ [2, 3]") {
        Value::List(elements) => assert_eq!(elements.len(), 3),
        other => panic!("expected list, got {}", other),
    }
}

#[test]
fn eval_boolean_operators_short_circuit() {
    // The right operand would get stuck, so it must never run.
    assert!(matches!(
        eval_source("false && unbound.field"),
        Value::Bool(false)
    ));
    assert!(matches!(
        eval_source("true || unbound.field"),
        Value::Bool(true)
    ));
}

#[test]
fn eval_alternative_and_merge() {
    match eval_source("Left 1") {
        Value::Tagged(tag, payload) => {
            assert_eq!(tag, "Left");
            assert_natural(&payload, 1);
        }
        other => panic!("expected tagged value, got {}", other),
    }
    assert_natural(
        &eval_source(r"merge { Left = \x -> x, Right = \b -> 0 } (Left 1)"),
        1,
    );
    assert_natural(
        &eval_source(r"merge { Left = \x -> x, Right = \b -> 0 } (Right true)"),
        0,
    );
}

#[test]
fn eval_builtins() {
    assert!(matches!(eval_source("not true"), Value::Bool(false)));
    assert!(matches!(eval_source("even 4"), Value::Bool(true)));
    assert!(matches!(eval_source("odd 4"), Value::Bool(false)));
    assert_natural(&eval_source("length [1, 2, 3]"), 3);
    match eval_source(r"map (\x -> x + 1) [1, 2]") {
        Value::List(elements) => {
            assert_natural(&elements[0], 2);
            assert_natural(&elements[1], 3);
        }
        other => panic!("expected list, got {}", other),
    }
}

#[test]
fn eval_partially_applied_builtin() {
    match eval_source(r"map (\x -> x)") {
        Value::Builtin(_, arguments) => assert_eq!(arguments.len(), 1),
        other => panic!("expected partially applied builtin, got {}", other),
    }
}

#[test]
fn eval_free_variable_is_neutral() {
    match eval_source("x") {
        Value::Variable(name, 0) => assert_eq!(name, "x"),
        other => panic!("expected neutral variable, got {}", other),
    }
}

#[test]
fn eval_builtin_over_neutral_is_stuck() {
    match eval_source("not x") {
        Value::Builtin(_, arguments) => {
            assert!(matches!(arguments[0], Value::Variable(..)));
        }
        other => panic!("expected stuck builtin, got {}", other),
    }
}

#[test]
fn eval_neutral_application() {
    match eval_source("f 1") {
        Value::Application(function, argument) => {
            assert!(matches!(*function, Value::Variable(..)));
            assert_natural(&argument, 1);
        }
        other => panic!("expected neutral application, got {}", other),
    }
}

#[test]
fn eval_environment_lookup() {
    let mut environment = Environment::new();
    environment.bind("x", Value::Natural(7));
    let value = evaluate(&environment, &parse_source("x + 1"));
    assert_natural(&value, 8);
}

#[test]
fn eval_annotation_is_transparent() {
    assert_natural(&eval_source("(1 : Natural) + 1"), 2);
}
