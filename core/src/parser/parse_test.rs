//! Unit tests for the parser front-end.

use bumpalo::Bump;

use super::*;

fn parse_ok<'a>(arena: &'a Bump, source: &str) -> &'a Node<'a> {
    parse(arena, source).unwrap_or_else(|e| panic!("parse of {:?} failed: {}", source, e))
}

fn meta<'a>(arena: &'a Bump, source: &str) -> &'a ParsedExpression<'a> {
    parse_expression(arena, source, &ParserOptions::default()).unwrap()
}

// ============================================================================
// Literals and primaries
// ============================================================================

#[test]
fn parses_number_literals() {
    let arena = Bump::new();
    assert_eq!(
        parse_ok(&arena, "42").kind,
        NodeKind::Literal(Lit::Num(42.0))
    );
    assert_eq!(
        parse_ok(&arena, "3.14").kind,
        NodeKind::Literal(Lit::Num(3.14))
    );
    assert_eq!(
        parse_ok(&arena, "1e3").kind,
        NodeKind::Literal(Lit::Num(1000.0))
    );
    assert_eq!(
        parse_ok(&arena, "0xff").kind,
        NodeKind::Literal(Lit::Num(255.0))
    );
    assert_eq!(
        parse_ok(&arena, ".5").kind,
        NodeKind::Literal(Lit::Num(0.5))
    );
}

#[test]
fn parses_string_literals_with_escapes() {
    let arena = Bump::new();
    assert_eq!(
        parse_ok(&arena, r#""a\nb""#).kind,
        NodeKind::Literal(Lit::Str("a\nb"))
    );
    assert_eq!(
        parse_ok(&arena, r#"'it\'s'"#).kind,
        NodeKind::Literal(Lit::Str("it's"))
    );
    assert_eq!(
        parse_ok(&arena, r#""A""#).kind,
        NodeKind::Literal(Lit::Str("A"))
    );
}

#[test]
fn parses_keyword_literals() {
    let arena = Bump::new();
    assert_eq!(
        parse_ok(&arena, "true").kind,
        NodeKind::Literal(Lit::Bool(true))
    );
    assert_eq!(parse_ok(&arena, "null").kind, NodeKind::Literal(Lit::Null));
    // `undefined` stays an identifier; the evaluator resolves it.
    assert_eq!(parse_ok(&arena, "undefined").kind, NodeKind::Ident("undefined"));
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn multiplication_binds_tighter_than_addition() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "1 + 2 * 3");
    let NodeKind::Binary { op, right, .. } = node.kind else {
        panic!("expected binary node");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(right.kind, NodeKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn power_is_right_associative() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "2 ** 3 ** 2");
    let NodeKind::Binary { op, right, .. } = node.kind else {
        panic!("expected binary node");
    };
    assert_eq!(op, BinaryOp::Pow);
    assert!(matches!(right.kind, NodeKind::Binary { op: BinaryOp::Pow, .. }));
}

#[test]
fn logical_operators_bind_looser_than_comparison() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "a < 1 && b > 2");
    assert!(matches!(
        node.kind,
        NodeKind::Logical { op: LogicalOp::And, .. }
    ));
}

#[test]
fn conditional_is_lowest_and_right_associative() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "a ? 1 : b ? 2 : 3");
    let NodeKind::Conditional { alternate, .. } = node.kind else {
        panic!("expected conditional");
    };
    assert!(matches!(alternate.kind, NodeKind::Conditional { .. }));
}

#[test]
fn in_operator_parses_as_relational() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "'key' in obj");
    assert!(matches!(
        node.kind,
        NodeKind::Binary { op: BinaryOp::In, .. }
    ));
}

#[test]
fn parenthesized_expression_unwraps() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "(1 + 2) * 3");
    let NodeKind::Binary { op, left, .. } = node.kind else {
        panic!("expected binary node");
    };
    assert_eq!(op, BinaryOp::Mul);
    assert!(matches!(left.kind, NodeKind::Binary { op: BinaryOp::Add, .. }));
}

// ============================================================================
// Postfix chains
// ============================================================================

#[test]
fn member_chains_and_calls() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "item.prices[0].round()");
    let NodeKind::Call { callee, args } = node.kind else {
        panic!("expected call");
    };
    assert!(args.is_empty());
    let NodeKind::Member { property, .. } = callee.kind else {
        panic!("expected member callee");
    };
    assert_eq!(property, MemberProp::Name("round"));
}

#[test]
fn computed_member_access() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "obj['key']");
    let NodeKind::Member { property, .. } = node.kind else {
        panic!("expected member");
    };
    assert!(matches!(property, MemberProp::Computed(_)));
}

// ============================================================================
// Arrays, objects, arrows
// ============================================================================

#[test]
fn array_literals_with_holes_and_trailing_comma() {
    let arena = Bump::new();
    let NodeKind::Array(elements) = parse_ok(&arena, "[1, , 3, ]").kind else {
        panic!("expected array");
    };
    assert_eq!(elements.len(), 3);
    assert!(elements[0].is_some());
    assert!(elements[1].is_none());
    assert!(elements[2].is_some());
}

#[test]
fn object_literals_with_all_key_shapes() {
    let arena = Bump::new();
    let NodeKind::Object(props) = parse_ok(&arena, "{a: 1, 'b': 2, 3: x, [k]: 4, short}").kind
    else {
        panic!("expected object");
    };
    assert_eq!(props.len(), 5);
    assert_eq!(props[0].key, PropertyKey::Ident("a"));
    assert_eq!(props[1].key, PropertyKey::Str("b"));
    assert_eq!(props[2].key, PropertyKey::Num(3.0));
    assert!(matches!(props[3].key, PropertyKey::Computed(_)));
    // shorthand expands to an identifier value
    assert_eq!(props[4].value.kind, NodeKind::Ident("short"));
}

#[test]
fn arrow_functions_single_and_parenthesized_params() {
    let arena = Bump::new();
    let NodeKind::Arrow { params, .. } = parse_ok(&arena, "x => x + 1").kind else {
        panic!("expected arrow");
    };
    assert_eq!(params, ["x"]);

    let NodeKind::Arrow { params, .. } = parse_ok(&arena, "(a, b) => a * b").kind else {
        panic!("expected arrow");
    };
    assert_eq!(params, ["a", "b"]);

    let NodeKind::Arrow { params, .. } = parse_ok(&arena, "() => 1").kind else {
        panic!("expected arrow");
    };
    assert!(params.is_empty());
}

#[test]
fn parenthesized_expression_is_not_an_arrow() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "(a)");
    assert_eq!(node.kind, NodeKind::Ident("a"));
}

#[test]
fn arrow_as_call_argument() {
    let arena = Bump::new();
    let node = parse_ok(&arena, "items.filter(x => x.active)");
    let NodeKind::Call { args, .. } = node.kind else {
        panic!("expected call");
    };
    assert!(matches!(args[0].kind, NodeKind::Arrow { .. }));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn rejects_trailing_input() {
    let arena = Bump::new();
    let err = parse(&arena, "1 2").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::TrailingInput { .. }));
}

#[test]
fn rejects_unterminated_string() {
    let arena = Bump::new();
    let err = parse(&arena, "'oops").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::UnclosedDelimiter { .. }));
}

#[test]
fn rejects_lone_ampersand() {
    let arena = Bump::new();
    let err = parse(&arena, "a & b").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedChar { .. }));
}

#[test]
fn rejects_excessive_nesting() {
    let arena = Bump::new();
    let source = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    let err = parse(&arena, &source).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::MaxDepthExceeded { .. }));
}

#[test]
fn spans_point_into_the_source() {
    let arena = Bump::new();
    let source = "item.price";
    let node = parse_ok(&arena, source);
    assert_eq!(node.span.str_of(source), "item.price");
    let pos = node.span.position_in(source);
    assert_eq!((pos.line, pos.column), (1, 1));
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn dependencies_collect_only_context_roots() {
    let arena = Bump::new();
    let parsed = meta(&arena, "item.price + inputs.rate + unrelated + undefined");
    assert_eq!(parsed.dependencies, ["inputs", "item"]);
}

#[test]
fn functions_collect_bare_and_qualified_names() {
    let arena = Bump::new();
    let parsed = meta(&arena, "Math.round(trim(item.name)) + custom.thing()");
    // `custom` is not a recognized namespace, so `custom.thing` is absent
    assert_eq!(parsed.functions, ["Math.round", "trim"]);
}

#[test]
fn complexity_weights_are_applied() {
    let arena = Bump::new();
    // literal(0.5) + literal(0.5) + binary(1) = 2.0
    assert_eq!(meta(&arena, "1 + 2").complexity, 2.0);
    // call(3) + ident callee(0.5) + literal arg(0.5) = 4.0
    assert_eq!(meta(&arena, "f(1)").complexity, 4.0);
    // array(2 + 3*0.5) + three literals(1.5) = 5.0
    assert_eq!(meta(&arena, "[1, 2, 3]").complexity, 5.0);
}

#[test]
fn complexity_rounds_to_one_decimal() {
    let arena = Bump::new();
    // array(2 + 0.5) + literal(0.5) = 3.0 exactly; a single element array
    let parsed = meta(&arena, "[1]");
    assert_eq!(parsed.complexity, 3.0);
    assert_eq!((parsed.complexity * 10.0).fract(), 0.0);
}

#[test]
fn depth_tracks_nesting() {
    let arena = Bump::new();
    assert_eq!(meta(&arena, "1").depth, 1);
    assert!(meta(&arena, "a.b.c").depth >= 3);
}

#[test]
fn is_simple_excludes_calls_and_conditionals() {
    let arena = Bump::new();
    assert!(meta(&arena, "item.price > 10 && item.active").is_simple);
    assert!(!meta(&arena, "f()").is_simple);
    assert!(!meta(&arena, "a ? 1 : 2").is_simple);
    assert!(!meta(&arena, "[1]").is_simple);
}

#[test]
fn memory_estimate_counts_string_code_units() {
    let arena = Bump::new();
    let short = meta(&arena, "'ab'").memory_estimate;
    let long = meta(&arena, "'abcdef'").memory_estimate;
    assert_eq!(long - short, 8); // four more chars at two bytes each
}

#[test]
fn has_templates_reflects_hole_syntax() {
    let arena = Bump::new();
    assert!(!meta(&arena, "item.price").has_templates);
}
