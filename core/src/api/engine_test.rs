//! Unit tests for the orchestrator.

use bumpalo::Bump;

use super::*;
use crate::types::{PropKind, Strategy, TypeConfig, TypeSchema};
use crate::values::Value;

fn engine(arena: &Bump) -> Engine<'_> {
    Engine::new(arena)
}

fn ctx(json: serde_json::Value) -> Context {
    Context::from_json(json).expect("context must be an object")
}

fn file_item_config() -> TypeConfig {
    TypeConfig::new(
        TypeSchema {
            required: ["file_id", "workspace_id", "key", "name"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            properties: [
                ("file_id".to_string(), PropKind::String),
                ("workspace_id".to_string(), PropKind::String),
                ("key".to_string(), PropKind::String),
                ("name".to_string(), PropKind::String),
            ]
            .into_iter()
            .collect(),
        },
        Strategy::Json,
    )
}

// ============================================================================
// Direct mode
// ============================================================================

#[test]
fn round_and_multiply() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let out = engine
        .evaluate(
            "Math.round(item.price * 1.2)",
            &ctx(serde_json::json!({"item": {"price": 10.99}})),
        )
        .unwrap();
    assert_eq!(out.value, Value::Number(13.0));
    let info = out.info.unwrap();
    assert!(!info.is_simple);
    assert_eq!(info.dependencies, ["item"]);
    assert_eq!(info.functions, ["Math.round"]);
}

#[test]
fn filter_map_scenario() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let out = engine
        .evaluate(
            "items.filter(x => x.active).map(x => x.name)",
            &ctx(serde_json::json!({
                "items": [{"active": true, "name": "A"}, {"active": false, "name": "B"}]
            })),
        )
        .unwrap();
    assert_eq!(out.value.to_json(), serde_json::json!(["A"]));
}

#[test]
fn strict_mode_blocks_eval() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let err = engine
        .evaluate(r#"eval("1+1")"#, &Context::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Security);

    let report = engine.validate(r#"eval("1+1")"#).unwrap();
    assert!(!report.is_valid());
    assert!(report
        .violations
        .iter()
        .any(|v| v.kind.as_str() == "blocked_identifier"));
}

#[test]
fn error_kinds_are_structural() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let c = Context::new();

    assert_eq!(engine.evaluate("1 +", &c).unwrap_err().kind(), ErrorKind::Syntax);
    assert_eq!(
        engine.evaluate("window", &c).unwrap_err().kind(),
        ErrorKind::Security
    );
    assert_eq!(
        engine.evaluate("trim(1)", &c).unwrap_err().kind(),
        ErrorKind::Type
    );
    assert_eq!(
        engine
            .evaluate("chunk([1], 0)", &c)
            .unwrap_err()
            .kind(),
        ErrorKind::Runtime
    );
}

#[test]
fn complexity_cap_applies_before_validation_or_execution() {
    let arena = Bump::new();
    let mut options = EngineOptions::default();
    options.max_complexity = 3.0;
    let engine = Engine::with_options(&arena, options);
    let err = engine
        .evaluate("1 + 2 + 3 + 4 + 5 + 6", &Context::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Complexity);
}

#[test]
fn depth_cap_applies_from_metadata() {
    let arena = Bump::new();
    let mut options = EngineOptions::default();
    options.max_depth = 3;
    let engine = Engine::with_options(&arena, options);
    let err = engine.evaluate("a.b.c.d.e.f", &Context::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Complexity);
}

#[test]
fn non_strict_mode_skips_validation() {
    let arena = Bump::new();
    let mut options = EngineOptions::default();
    options.strict = false;
    let engine = Engine::with_options(&arena, options);
    // `window` is denylisted but unresolved, so non-strict mode just
    // sees undefined
    let out = engine.evaluate("window", &Context::new()).unwrap();
    assert_eq!(out.value, Value::Undefined);
}

// ============================================================================
// Template mode
// ============================================================================

#[test]
fn template_splices_hole_results() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let out = engine
        .evaluate(
            "Hello {{item.name.toUpperCase()}}!",
            &ctx(serde_json::json!({"item": {"name": "world"}})),
        )
        .unwrap();
    assert_eq!(out.value, Value::str("Hello WORLD!"));
    let holes = out.holes.unwrap();
    assert_eq!(holes.len(), 1);
    assert_eq!(holes[0].original, "item.name.toUpperCase()");
    assert_eq!(holes[0].evaluated, Value::str("WORLD"));
    assert_eq!((holes[0].start, holes[0].end), (6, 33));
}

#[test]
fn template_renders_nullish_as_empty() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let out = engine
        .evaluate("a{{missing}}b{{null ?? missing}}c", &Context::new())
        .unwrap();
    assert_eq!(out.value, Value::str("abc"));
}

#[test]
fn template_hole_errors_abort_the_whole_template() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let err = engine
        .evaluate("ok {{eval('x')}} rest", &Context::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Security);
    assert!(err.to_string().contains("template hole"));
}

#[test]
fn multiple_holes_splice_in_order() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let out = engine
        .evaluate(
            "{{item.a}} + {{item.b}} = {{item.a + item.b}}",
            &ctx(serde_json::json!({"item": {"a": 1, "b": 2}})),
        )
        .unwrap();
    assert_eq!(out.value, Value::str("1 + 2 = 3"));
}

#[test]
fn flagship_json_embedding_round_trip() {
    let arena = Bump::new();
    let mut engine = engine(&arena);
    engine.register_type("FileItem", file_item_config());

    let item = serde_json::json!({
        "file_id": "f-1",
        "workspace_id": "w-9",
        "key": "a/b \"quoted\".txt",
        "name": "report.txt"
    });
    let out = engine
        .evaluate(r#"{"f":"{{item}}"}"#, &ctx(serde_json::json!({"item": item})))
        .unwrap();

    // outer result parses as JSON; the hole embedded safely in a string
    let outer: serde_json::Value =
        serde_json::from_str(out.value.as_str().unwrap()).expect("outer JSON parses");
    let inner: serde_json::Value =
        serde_json::from_str(outer["f"].as_str().unwrap()).expect("inner JSON parses");
    assert_eq!(inner["file_id"], "f-1");
    assert_eq!(inner["workspace_id"], "w-9");
    assert_eq!(inner["key"], "a/b \"quoted\".txt");
    assert_eq!(inner["name"], "report.txt");
}

#[test]
fn string_strategy_types_render_with_string_coercion() {
    let arena = Bump::new();
    let mut engine = engine(&arena);
    engine.register_type(
        "Tag",
        TypeConfig::new(
            TypeSchema {
                required: vec!["tag".to_string()],
                properties: Default::default(),
            },
            Strategy::AsString,
        ),
    );
    let out = engine
        .evaluate(
            "x={{item}}",
            &ctx(serde_json::json!({"item": {"tag": "t"}})),
        )
        .unwrap();
    assert_eq!(out.value, Value::str("x=[object Object]"));
}

#[test]
fn undetected_objects_use_default_coercion() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let out = engine
        .evaluate("x={{item}}", &ctx(serde_json::json!({"item": {"a": 1}})))
        .unwrap();
    assert_eq!(out.value, Value::str("x=[object Object]"));
}

// ============================================================================
// Dependencies
// ============================================================================

#[test]
fn extract_dependencies_direct_and_template() {
    let arena = Bump::new();
    let engine = engine(&arena);
    assert_eq!(
        engine.extract_dependencies("item.a + inputs.b + loose").unwrap(),
        ["inputs", "item"]
    );
    assert_eq!(
        engine
            .extract_dependencies("{{item.a}} and {{outputs.b}} and {{item.c}}")
            .unwrap(),
        ["item", "outputs"]
    );
}

// ============================================================================
// Types surface
// ============================================================================

#[test]
fn type_registry_surface() {
    let arena = Bump::new();
    let mut engine = engine(&arena);
    assert!(!engine.has_type("FileItem"));
    engine.register_type("FileItem", file_item_config());
    assert!(engine.has_type("FileItem"));
    assert_eq!(engine.registered_types(), ["FileItem"]);
}

// ============================================================================
// Functions surface
// ============================================================================

#[test]
fn add_and_remove_functions() {
    use crate::functions::{Category, SafeFunction};

    let arena = Bump::new();
    let mut engine = engine(&arena);
    let c = Context::new();

    // unknown before registration (strict mode rejects it)
    assert!(engine.evaluate("answer()", &c).is_err());

    engine.add_function(SafeFunction::new("answer", Category::Custom, 0, |_| {
        Ok(Value::Number(42.0))
    }));
    assert_eq!(engine.evaluate("answer()", &c).unwrap().value, Value::Number(42.0));
    assert!(engine.list_functions(Some(Category::Custom)).contains(&"answer".to_string()));

    assert!(engine.remove_function("answer"));
    assert!(engine.evaluate("answer()", &c).is_err());
}

// ============================================================================
// Caches and stats
// ============================================================================

#[test]
fn parse_results_are_cached() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let c = ctx(serde_json::json!({"item": {"a": 1}}));

    engine.evaluate("item.a + 1", &c).unwrap();
    engine.evaluate("item.a + 1", &c).unwrap();
    let stats = engine.stats();
    assert_eq!(stats.parse_cache_misses, 1);
    assert!(stats.parse_cache_hits >= 1);
    assert_eq!(stats.evaluations, 2);
}

#[test]
fn negative_parse_results_are_cached() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let c = Context::new();
    assert!(engine.evaluate("1 +", &c).is_err());
    assert!(engine.evaluate("1 +", &c).is_err());
    let stats = engine.stats();
    assert_eq!(stats.parse_cache_misses, 1);
    assert_eq!(stats.parse_cache_hits, 1);
    assert_eq!(stats.errors, 2);
}

#[test]
fn clear_caches_and_reset_stats() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let c = ctx(serde_json::json!({"item": {"a": 1}}));
    engine.evaluate("item.a", &c).unwrap();
    engine.clear_caches();
    engine.evaluate("item.a", &c).unwrap();
    assert_eq!(engine.stats().parse_cache_misses, 2);

    engine.reset_stats();
    assert_eq!(engine.stats(), EngineStats::default());
}

#[test]
fn same_key_set_with_different_values_renders_fresh() {
    // the template cache stores hole layout, not rendered output
    let arena = Bump::new();
    let engine = engine(&arena);
    let a = engine
        .evaluate("v={{item.a}}", &ctx(serde_json::json!({"item": {"a": 1}})))
        .unwrap();
    let b = engine
        .evaluate("v={{item.a}}", &ctx(serde_json::json!({"item": {"a": 2}})))
        .unwrap();
    assert_eq!(a.value, Value::str("v=1"));
    assert_eq!(b.value, Value::str("v=2"));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn repeated_evaluation_with_shared_engine_is_stable() {
    let arena = Bump::new();
    let engine = engine(&arena);
    let c = ctx(serde_json::json!({"items": [1, 2, 3]}));
    let source = "[1,2,3].reduce((s,x) => s + x, 0) + items.length";
    let a = engine.evaluate(source, &c).unwrap().value;
    let b = engine.evaluate(source, &c).unwrap().value;
    assert_eq!(a, Value::Number(9.0));
    assert_eq!(a, b);
}
