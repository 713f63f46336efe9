use lachs::Span;

use reed::ast::Syntax;
use reed::lexer::Token;
use reed::parser::{parse, parse_type, ParseState};
use reed::types::{Context, Infer, Type, TypeError};

fn parse_source(source: &str) -> Syntax {
    let tokens = Token::lex(source).expect("lexing should succeed");
    let mut state = ParseState::new(tokens);
    parse(&mut state).unwrap_or_else(|e| panic!("parsing {:?} failed: {}", source, e))
}

fn parse_annotation(source: &str) -> Type {
    let tokens = Token::lex(source).expect("lexing should succeed");
    let mut state = ParseState::new(tokens);
    parse_type(&mut state).unwrap_or_else(|e| panic!("parsing type {:?} failed: {}", source, e))
}

fn infer_source(source: &str) -> Result<Type, TypeError> {
    reed::type_of(&parse_source(source))
}

fn assert_infers(source: &str, expected: &str) {
    match infer_source(source) {
        Ok(ty) => assert_eq!(ty.pretty(), expected, "wrong type for {:?}", source),
        Err(e) => panic!("inference of {:?} failed: {}", source, e),
    }
}

#[test]
fn infer_identity_lambda() {
    assert_infers(r"\x -> x", "forall a . a -> a");
}

#[test]
fn infer_applied_identity() {
    assert_infers(r"(\x -> x) 1", "Natural");
}

#[test]
fn infer_record_projection() {
    assert_infers(r#"{ a = 1, b = "hi" }.a"#, "Natural");
}

#[test]
fn infer_list_literal() {
    assert_infers("[1, 2, 3]", "List Natural");
}

#[test]
fn infer_heterogeneous_list_with_existential_annotation() {
    assert_infers(
        "[1, true] : List (exists a . a)",
        "List (exists a . a)",
    );
}

#[test]
fn infer_if_branches_join() {
    assert_infers("if true then 1 else 2", "Natural");
}

#[test]
fn infer_polymorphic_let() {
    assert_infers(r"let id = \x -> x in id id 5", "Natural");
}

#[test]
fn infer_scalars() {
    assert_infers("true", "Bool");
    assert_infers("42", "Natural");
    assert_infers(r#""hello""#, "Text");
}

#[test]
fn infer_operators() {
    assert_infers("1 + 2 * 3", "Natural");
    assert_infers("true && false || true", "Bool");
    assert_infers(r#""a" ++ "b""#, "Text");
    assert_infers("[1] ++ [2, 3]", "List Natural");
}

#[test]
fn infer_builtins() {
    assert_infers("not true", "Bool");
    assert_infers("even 4", "Bool");
    assert_infers("length [1, 2]", "Natural");
    assert_infers(r"map (\x -> x + 1) [1, 2]", "List Natural");
}

#[test]
fn infer_annotated_let_binding() {
    assert_infers(r"let n : Natural = 2 in n + n", "Natural");
}

#[test]
fn infer_multiple_let_bindings() {
    assert_infers(r"let x = 1 let y = x + 1 in y", "Natural");
}

#[test]
fn infer_lambda_with_natural_body() {
    assert_infers(r"\x -> x + 1", "Natural -> Natural");
}

#[test]
fn infer_alternative_constructor() {
    let ty = infer_source("Left 1").expect("inference should succeed");
    // The variant tail generalizes, so the shape is
    // forall <tail> . < Left: Natural | <tail> >.
    match ty {
        Type::Forall(_, reed::types::Kind::Alternatives, body) => match *body {
            Type::Union(alternatives) => {
                assert_eq!(alternatives.alternatives.len(), 1);
                assert_eq!(alternatives.alternatives[0].0, "Left");
                assert_eq!(alternatives.alternatives[0].1, Type::Natural);
            }
            other => panic!("expected a union, got {}", other),
        },
        other => panic!("expected a quantified union, got {}", other),
    }
}

#[test]
fn infer_merge_handler() {
    assert_infers(
        r"merge { Left = \x -> x, Right = \b -> 0 } (Left 1)",
        "Natural",
    );
}

#[test]
fn infer_width_subtyping_accepts_fewer_alternatives() {
    assert_infers(
        "Left 1 : < Left : Natural, Right : Bool >",
        "< Left: Natural, Right: Bool >",
    );
}

#[test]
fn infer_open_record_annotation() {
    assert_infers(
        "{ x = 1, y = true } : exists (r : Fields) . { x : Natural | r }",
        "exists (r : Fields) . { x: Natural | r }",
    );
}

#[test]
fn infer_checking_against_forall_row() {
    // The dual polarity: a rigid row variable must not be solved.
    let result = infer_source("{ x = 1 } : forall (r : Fields) . { x : Natural | r }");
    assert!(
        result.is_err(),
        "a closed record is not polymorphic in its tail"
    );
}

#[test]
fn infer_rank_two_annotation() {
    assert_infers(
        r"(\f -> { a = f 1, b = f true }) : (forall a . a -> a) -> { a : Natural, b : Bool }",
        "(forall a . a -> a) -> { a: Natural, b: Bool }",
    );
}

#[test]
fn infer_shadowed_variable_by_index() {
    // x@1 refers to the outer binding, so the whole thing is a constant
    // function in its second argument.
    assert_infers(r"(\x -> \x -> x@1) 1 true", "Natural");
}

// === negative cases ===

#[test]
fn infer_not_a_function() {
    assert!(matches!(
        infer_source("1 true"),
        Err(TypeError::NotAFunction { .. })
    ));
}

#[test]
fn infer_missing_field() {
    assert!(matches!(
        infer_source("{ a = 1 }.b"),
        Err(TypeError::MissingField { .. })
    ));
}

#[test]
fn infer_occurs_check() {
    assert!(matches!(
        infer_source(r"\x -> x x"),
        Err(TypeError::OccursCheck { .. })
    ));
}

#[test]
fn infer_unbound_variable() {
    assert!(matches!(
        infer_source("y"),
        Err(TypeError::UnboundVariable { .. })
    ));
}

#[test]
fn infer_unbound_variable_index() {
    assert!(matches!(
        infer_source(r"\x -> x@1"),
        Err(TypeError::UnboundVariable { index: 1, .. })
    ));
}

#[test]
fn infer_not_subtype() {
    assert!(matches!(
        infer_source("1 : Bool"),
        Err(TypeError::NotSubtype { .. })
    ));
}

#[test]
fn infer_missing_alternative() {
    assert!(matches!(
        infer_source("Left 1 : < Right : Natural >"),
        Err(TypeError::MissingAlternative { .. })
    ));
}

#[test]
fn infer_annotation_not_well_formed() {
    assert!(matches!(
        infer_source("1 : a"),
        Err(TypeError::NotWellFormed { .. })
    ));
}

#[test]
fn infer_merge_of_non_record() {
    assert!(matches!(
        infer_source("merge 5"),
        Err(TypeError::MergeNotAUnionHandler { .. })
    ));
}

#[test]
fn infer_branch_mismatch() {
    assert!(infer_source(r#"if true then 1 else "two""#).is_err());
}

// === properties ===

#[test]
fn principality_inferred_type_subsumes_annotations() {
    let cases = [
        (r"\x -> x", "Natural -> Natural"),
        (r"\x -> x", "forall b . b -> b"),
        (r"\x -> [x]", "Bool -> List Bool"),
        (r"\f -> \x -> f x", "(Natural -> Bool) -> Natural -> Bool"),
    ];
    for (source, annotation) in cases {
        let inferred = infer_source(source).expect("inference should succeed");
        let annotation = parse_annotation(annotation);
        let mut infer = Infer::new();
        let result = infer.subtype(Context::new(), &inferred, &annotation, &Span::default());
        assert!(
            result.is_ok(),
            "{} should subsume {}",
            inferred.pretty(),
            annotation.pretty()
        );
    }
}

#[test]
fn checking_against_valid_annotation_succeeds() {
    let cases = [
        (r"\x -> x", "Natural -> Natural"),
        ("[ ]", "List Bool"),
        ("{ a = 1 }", "{ a : Natural }"),
        (r"\x -> x + 1", "Natural -> Natural"),
    ];
    for (source, annotation) in cases {
        let source = format!("({}) : {}", source, annotation);
        assert!(
            infer_source(&source).is_ok(),
            "{} should typecheck",
            source
        );
    }
}
