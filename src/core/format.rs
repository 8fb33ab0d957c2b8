//! Line formatting
//!
//! Renders one log event into a single JSON line by splicing
//! pre-serialized fragments: level, time, the ancestor bindings chain,
//! event fields, the message, and the trailing format-version marker.
//! Field order in the default case is exactly that sequence.

use super::error::Result;
use super::redact::Redactor;
use super::stringify::{guard_callback, object_fragment, StringifyMode};
use super::timestamp::TimeFormat;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Replaces the default `"level":n` splice with a custom object
pub type LevelFormatterFn = Arc<dyn Fn(&str, u32) -> Map<String, Value> + Send + Sync>;

/// Transforms base bindings before they are frozen into the root fragment
pub type BindingsFormatterFn =
    Arc<dyn Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync>;

/// Last transformation over the merged event object, before the message
/// key is spliced
pub type LogFormatterFn = Arc<dyn Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync>;

/// Pure transformation hooks for the three formatting seams
#[derive(Clone, Default)]
pub struct Formatters {
    pub level: Option<LevelFormatterFn>,
    pub bindings: Option<BindingsFormatterFn>,
    pub log: Option<LogFormatterFn>,
}

impl Formatters {
    /// Override-not-replace merge, per component: a child supplying only
    /// a `log` formatter keeps the parent's `level` and `bindings` hooks.
    #[must_use]
    pub fn merged_with(&self, overrides: &Formatters) -> Formatters {
        Formatters {
            level: overrides.level.clone().or_else(|| self.level.clone()),
            bindings: overrides.bindings.clone().or_else(|| self.bindings.clone()),
            log: overrides.log.clone().or_else(|| self.log.clone()),
        }
    }
}

impl fmt::Debug for Formatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatters")
            .field("level", &self.level.is_some())
            .field("bindings", &self.bindings.is_some())
            .field("log", &self.log.is_some())
            .finish()
    }
}

/// Precedence when mixin fields and event fields share a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixinMergeStrategy {
    /// Event-specific fields win over mixin fields (the default)
    #[default]
    EventWins,
    /// Mixin fields win over event-specific fields
    MixinWins,
}

/// Renders complete NDJSON lines for one logger node
#[derive(Debug, Clone)]
pub struct LineFormatter {
    pub msg_key: String,
    pub terminator: String,
    pub time: TimeFormat,
    /// Trailing format-version field value; `None` omits the field
    pub version: Option<u64>,
    pub formatters: Formatters,
    pub mode: StringifyMode,
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self {
            msg_key: "msg".to_string(),
            terminator: "\n".to_string(),
            time: TimeFormat::default(),
            version: Some(1),
            formatters: Formatters::default(),
            mode: StringifyMode::default(),
        }
    }
}

impl LineFormatter {
    /// Render one event. `event_fields` must already have per-key
    /// serializers applied; redaction and the merged-object formatter run
    /// here, after the mixin merge.
    #[allow(clippy::too_many_arguments)]
    pub fn format_line(
        &self,
        label: &str,
        value: u32,
        chain: &str,
        event_fields: Map<String, Value>,
        mixin_fields: Option<Map<String, Value>>,
        strategy: MixinMergeStrategy,
        redactor: Option<&Redactor>,
        msg: Option<&str>,
    ) -> Result<String> {
        let time_fragment = self.time.fragment();
        self.format_line_with_time(
            label,
            value,
            &time_fragment,
            chain,
            event_fields,
            mixin_fields,
            strategy,
            redactor,
            msg,
        )
    }

    /// [`format_line`](Self::format_line) with the time fragment already
    /// rendered, so the dispatcher can reuse it for write metadata.
    #[allow(clippy::too_many_arguments)]
    pub fn format_line_with_time(
        &self,
        label: &str,
        value: u32,
        time_fragment: &str,
        chain: &str,
        event_fields: Map<String, Value>,
        mixin_fields: Option<Map<String, Value>>,
        strategy: MixinMergeStrategy,
        redactor: Option<&Redactor>,
        msg: Option<&str>,
    ) -> Result<String> {
        let mut merged = match (mixin_fields, strategy) {
            (None, _) => event_fields,
            (Some(mixin), MixinMergeStrategy::EventWins) => {
                let mut base = mixin;
                for (k, v) in event_fields {
                    base.insert(k, v);
                }
                base
            }
            (Some(mixin), MixinMergeStrategy::MixinWins) => {
                let mut base = event_fields;
                for (k, v) in mixin {
                    base.insert(k, v);
                }
                base
            }
        };

        if let Some(r) = redactor {
            if let Value::Object(redacted) = r.apply(Value::Object(merged)) {
                merged = redacted;
            } else {
                merged = Map::new();
            }
        }

        // The log formatter sees the object WITHOUT the message key;
        // message is spliced after.
        if let Some(log_fmt) = &self.formatters.log {
            let input = merged.clone();
            if let Some(transformed) = guard_callback(|| log_fmt(input)) {
                merged = transformed;
            }
        }

        let fields_fragment = object_fragment(&merged, self.mode)?;

        let mut line = String::with_capacity(64 + chain.len() + fields_fragment.len());
        line.push('{');
        line.push_str(&self.level_fragment(label, value)?);
        line.push_str(time_fragment);
        line.push_str(chain);
        line.push_str(&fields_fragment);
        if let Some(msg) = msg {
            line.push_str(",\"");
            line.push_str(&escape_key(&self.msg_key));
            line.push_str("\":");
            line.push_str(&serde_json::to_string(msg)?);
        }
        if let Some(version) = self.version {
            line.push_str(",\"v\":");
            line.push_str(&version.to_string());
        }
        line.push('}');
        line.push_str(&self.terminator);
        Ok(line)
    }

    /// Leading fields without their comma prefix: the default
    /// `"level":n`, or whatever the level formatter returns in its place.
    fn level_fragment(&self, label: &str, value: u32) -> Result<String> {
        if let Some(level_fmt) = &self.formatters.level {
            if let Some(map) = guard_callback(|| level_fmt(label, value)) {
                if !map.is_empty() {
                    let frag = object_fragment(&map, self.mode)?;
                    return Ok(frag[1..].to_string());
                }
            }
        }
        Ok(format!("\"level\":{}", value))
    }
}

fn escape_key(key: &str) -> String {
    // Message keys are configured, not data; still escape defensively
    serde_json::to_string(key)
        .map(|s| s[1..s.len() - 1].to_string())
        .unwrap_or_else(|_| "msg".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::redact::Censor;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    fn parse(line: &str) -> Value {
        serde_json::from_str(line.trim_end()).unwrap()
    }

    fn plain_formatter() -> LineFormatter {
        LineFormatter {
            time: TimeFormat::Off,
            ..LineFormatter::default()
        }
    }

    #[test]
    fn test_default_field_order() {
        let formatter = LineFormatter {
            time: TimeFormat::Custom(Arc::new(|| ",\"time\":123".to_string())),
            ..LineFormatter::default()
        };
        let line = formatter
            .format_line(
                "info",
                30,
                ",\"a\":1",
                obj(json!({"b": 2})),
                None,
                MixinMergeStrategy::default(),
                None,
                Some("hello"),
            )
            .unwrap();
        assert_eq!(
            line,
            "{\"level\":30,\"time\":123,\"a\":1,\"b\":2,\"msg\":\"hello\",\"v\":1}\n"
        );
    }

    #[test]
    fn test_no_message_no_msg_key() {
        let line = plain_formatter()
            .format_line(
                "info",
                30,
                "",
                Map::new(),
                None,
                MixinMergeStrategy::default(),
                None,
                None,
            )
            .unwrap();
        assert_eq!(line, "{\"level\":30,\"v\":1}\n");
    }

    #[test]
    fn test_version_omitted() {
        let formatter = LineFormatter {
            version: None,
            time: TimeFormat::Off,
            ..LineFormatter::default()
        };
        let line = formatter
            .format_line(
                "info",
                30,
                "",
                Map::new(),
                None,
                MixinMergeStrategy::default(),
                None,
                Some("m"),
            )
            .unwrap();
        assert_eq!(line, "{\"level\":30,\"msg\":\"m\"}\n");
    }

    #[test]
    fn test_custom_msg_key_and_terminator() {
        let formatter = LineFormatter {
            msg_key: "message".to_string(),
            terminator: "\r\n".to_string(),
            time: TimeFormat::Off,
            ..LineFormatter::default()
        };
        let line = formatter
            .format_line(
                "info",
                30,
                "",
                Map::new(),
                None,
                MixinMergeStrategy::default(),
                None,
                Some("hi"),
            )
            .unwrap();
        assert!(line.ends_with("\r\n"));
        assert_eq!(parse(&line)["message"], json!("hi"));
    }

    #[test]
    fn test_mixin_event_wins_by_default() {
        let line = plain_formatter()
            .format_line(
                "info",
                30,
                "",
                obj(json!({"shared": "event", "e": 1})),
                Some(obj(json!({"shared": "mixin", "m": 2}))),
                MixinMergeStrategy::EventWins,
                None,
                None,
            )
            .unwrap();
        let parsed = parse(&line);
        assert_eq!(parsed["shared"], json!("event"));
        assert_eq!(parsed["e"], json!(1));
        assert_eq!(parsed["m"], json!(2));
    }

    #[test]
    fn test_mixin_wins_strategy() {
        let line = plain_formatter()
            .format_line(
                "info",
                30,
                "",
                obj(json!({"shared": "event"})),
                Some(obj(json!({"shared": "mixin"}))),
                MixinMergeStrategy::MixinWins,
                None,
                None,
            )
            .unwrap();
        assert_eq!(parse(&line)["shared"], json!("mixin"));
    }

    #[test]
    fn test_level_formatter_replaces_default() {
        let formatter = LineFormatter {
            time: TimeFormat::Off,
            formatters: Formatters {
                level: Some(Arc::new(|label, value| {
                    obj(json!({"severity": label, "levelValue": value}))
                })),
                ..Formatters::default()
            },
            ..LineFormatter::default()
        };
        let line = formatter
            .format_line(
                "warn",
                40,
                "",
                Map::new(),
                None,
                MixinMergeStrategy::default(),
                None,
                None,
            )
            .unwrap();
        assert!(line.starts_with("{\"severity\":\"warn\",\"levelValue\":40"));
    }

    #[test]
    fn test_log_formatter_sees_object_without_msg() {
        let formatter = LineFormatter {
            time: TimeFormat::Off,
            formatters: Formatters {
                log: Some(Arc::new(|map| {
                    assert!(map.get("msg").is_none());
                    let mut out = map;
                    out.insert("seen".to_string(), json!(true));
                    out
                })),
                ..Formatters::default()
            },
            ..LineFormatter::default()
        };
        let line = formatter
            .format_line(
                "info",
                30,
                "",
                obj(json!({"a": 1})),
                None,
                MixinMergeStrategy::default(),
                None,
                Some("the message"),
            )
            .unwrap();
        let parsed = parse(&line);
        assert_eq!(parsed["seen"], json!(true));
        assert_eq!(parsed["msg"], json!("the message"));
    }

    #[test]
    fn test_redaction_covers_mixin_fields() {
        let paths = vec!["token".to_string()];
        let redactor = Redactor::compile(&paths, Censor::default()).unwrap();
        let line = plain_formatter()
            .format_line(
                "info",
                30,
                "",
                Map::new(),
                Some(obj(json!({"token": "s3cret"}))),
                MixinMergeStrategy::default(),
                Some(&redactor),
                None,
            )
            .unwrap();
        assert_eq!(parse(&line)["token"], json!("[Redacted]"));
    }

    #[test]
    fn test_panicking_formatter_falls_back() {
        let formatter = LineFormatter {
            time: TimeFormat::Off,
            formatters: Formatters {
                level: Some(Arc::new(|_, _| panic!("bad level formatter"))),
                log: Some(Arc::new(|_| panic!("bad log formatter"))),
                ..Formatters::default()
            },
            ..LineFormatter::default()
        };
        let line = formatter
            .format_line(
                "info",
                30,
                "",
                obj(json!({"a": 1})),
                None,
                MixinMergeStrategy::default(),
                None,
                None,
            )
            .unwrap();
        let parsed = parse(&line);
        assert_eq!(parsed["level"], json!(30));
        assert_eq!(parsed["a"], json!(1));
    }

    #[test]
    fn test_single_line_output() {
        let line = plain_formatter()
            .format_line(
                "info",
                30,
                "",
                obj(json!({"text": "a\nb"})),
                None,
                MixinMergeStrategy::default(),
                None,
                Some("multi\nline"),
            )
            .unwrap();
        // Exactly one terminator, no embedded raw newlines
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_formatters_merge_override_not_replace() {
        let parent = Formatters {
            level: Some(Arc::new(|_, v| obj(json!({"level": v})))),
            bindings: Some(Arc::new(|m| m)),
            log: None,
        };
        let child = Formatters {
            log: Some(Arc::new(|m| m)),
            ..Formatters::default()
        };
        let merged = parent.merged_with(&child);
        assert!(merged.level.is_some());
        assert!(merged.bindings.is_some());
        assert!(merged.log.is_some());
    }
}
