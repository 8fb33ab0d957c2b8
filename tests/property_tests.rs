//! Property-based tests for ndjson_logger using proptest

use ndjson_logger::core::{
    format_message, normalize, stringify, Censor, LevelRegistry, LogLevel, Redactor,
    StringifyMode,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 _.-]{0,24}".prop_map(Value::String),
    ]
}

fn arb_flat_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,8}", arb_scalar(), 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

// ============================================================================
// Level registry
// ============================================================================

proptest! {
    /// Enabled/disabled is a pure >= comparison on numeric values
    #[test]
    fn test_is_at_least_matches_comparison(call in 0u32..200, threshold in 0u32..200) {
        assert_eq!(LevelRegistry::is_at_least(call, threshold), call >= threshold);
    }

    /// Standard names and values always collide with custom registrations
    #[test]
    fn test_standard_entries_always_reserved(value in 0u32..100) {
        let reg = LevelRegistry::standard();
        for level in LogLevel::ALL {
            assert!(reg.with_custom(level.to_str(), value).is_err());
            assert!(reg.with_custom("fresh", level.value()).is_err());
        }
    }

    /// Any custom entry that registers can be resolved both ways
    #[test]
    fn test_custom_registration_roundtrip(name in "[a-z]{3,10}", value in 1u32..1000) {
        let reg = LevelRegistry::standard();
        match reg.with_custom(&name, value) {
            Ok(next) => {
                assert_eq!(next.resolve(&name.as_str().into()).unwrap(), value);
                assert_eq!(next.label_for(value), Some(name.as_str()));
            }
            Err(_) => {
                // Only name or value collisions may refuse
                let name_taken = reg.resolve(&name.as_str().into()).is_ok();
                let value_taken = reg.label_for(value).is_some();
                assert!(name_taken || value_taken);
            }
        }
    }
}

// ============================================================================
// Message interpolation
// ============================================================================

proptest! {
    /// A format string without directives is returned verbatim, with any
    /// arguments appended space-joined
    #[test]
    fn test_no_directives_passthrough(
        fmt in "[a-zA-Z0-9 _.-]{0,32}",
        args in prop::collection::vec(arb_scalar(), 0..4),
    ) {
        let out = format_message(&fmt, &args);
        assert!(out.starts_with(&fmt));
        if args.is_empty() {
            assert_eq!(out, fmt);
        }
    }

    /// Directive consumption is bounded by the argument count: with N
    /// directives and N args nothing is left over and every directive is
    /// substituted
    #[test]
    fn test_exact_arity_consumes_all(args in prop::collection::vec(arb_scalar(), 1..5)) {
        let fmt = vec!["%j"; args.len()].join(" ");
        let out = format_message(&fmt, &args);
        assert!(!out.contains("%j"));
        let expected = args
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(out, expected);
    }

    /// Too few args: the unconsumed directive survives literally
    #[test]
    fn test_unfilled_directive_stays_literal(arg in arb_scalar()) {
        let out = format_message("a=%s b=%s", &[arg]);
        assert!(out.ends_with("b=%s"));
    }

    /// %% never consumes an argument
    #[test]
    fn test_percent_escape(args in prop::collection::vec(arb_scalar(), 0..3)) {
        let out = format_message("100%%", &args);
        assert!(out.starts_with("100%"));
    }
}

// ============================================================================
// Normalization
// ============================================================================

proptest! {
    /// A leading object is always the merge object, never part of the message
    #[test]
    fn test_leading_object_is_merge(obj in arb_flat_object(), msg in "[a-z ]{0,16}") {
        let call = normalize(&[obj.clone(), json!(msg)]);
        assert_eq!(Value::Object(call.merge.unwrap()), obj);
        assert_eq!(call.msg.unwrap(), msg);
    }

    /// Non-object first arguments never produce a merge object
    #[test]
    fn test_scalar_first_no_merge(first in arb_scalar(), rest in prop::collection::vec(arb_scalar(), 0..3)) {
        let mut args = vec![first];
        args.extend(rest);
        let call = normalize(&args);
        assert!(call.merge.is_none());
        assert!(call.msg.is_some());
    }
}

// ============================================================================
// Stringify
// ============================================================================

proptest! {
    /// Safe-mode output under a generous depth cap matches serde_json
    /// exactly for flat objects
    #[test]
    fn test_stringify_matches_serde(obj in arb_flat_object()) {
        let ours = stringify(&obj, StringifyMode::default()).unwrap();
        assert_eq!(ours, serde_json::to_string(&obj).unwrap());
    }

    /// Safe mode never fails and always yields parseable JSON, however
    /// deep the value
    #[test]
    fn test_safe_mode_total(depth in 0usize..20, cap in 1usize..8) {
        let mut value = json!(1);
        for _ in 0..depth {
            value = json!({"n": value});
        }
        let out = stringify(&value, StringifyMode::Safe { max_depth: cap }).unwrap();
        let _: Value = serde_json::from_str(&out).unwrap();
    }
}

// ============================================================================
// Redaction
// ============================================================================

proptest! {
    /// Compiling any dot path of plain segments succeeds, and applying it
    /// to a document that contains the path censors exactly that leaf
    #[test]
    fn test_redact_straight_path(segments in prop::collection::vec("[a-z]{1,6}", 1..4)) {
        let path = segments.join(".");
        let redactor = Redactor::compile(&[path], Censor::default()).unwrap();

        // Build a document with the target leaf plus a sibling
        let mut doc = json!("secret");
        for seg in segments.iter().rev() {
            doc = json!({seg.as_str(): doc, "sibling": 1});
        }
        let out = redactor.apply(doc);

        let mut cursor = &out;
        for seg in &segments {
            assert_eq!(cursor["sibling"], json!(1));
            cursor = &cursor[seg.as_str()];
        }
        assert_eq!(*cursor, json!("[Redacted]"));
    }

    /// Paths with empty segments are always rejected at compile time
    #[test]
    fn test_redact_rejects_empty_segments(prefix in "[a-z]{1,5}", suffix in "[a-z]{1,5}") {
        let malformed = format!("{}..{}", prefix, suffix);
        assert!(Redactor::compile(&[malformed], Censor::default()).is_err());
    }

    /// Redaction never alters a document that lacks the target path
    #[test]
    fn test_redact_miss_is_identity(obj in arb_flat_object()) {
        let redactor = Redactor::compile(
            &["definitely.not.present".to_string()],
            Censor::default(),
        )
        .unwrap();
        assert_eq!(redactor.apply(obj.clone()), obj);
    }
}
