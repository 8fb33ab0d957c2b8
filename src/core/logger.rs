//! Logger nodes
//!
//! A logger node owns its level registry view, its pre-serialized
//! bindings chain, its serializer map, compiled redaction, formatter
//! hooks, and its destination (single sink or router copy). Children are
//! created with [`Logger::child`] and are structurally independent once
//! forked: a child's customizations never leak into siblings or the
//! parent. The current threshold is the only mutable surface; everything
//! structural is immutable after construction and safe to read from any
//! number of concurrent callers.

use super::bindings::{build_fragment, BindingsChain};
use super::destination::{shared, Destination, SharedDestination, WriteMeta};
use super::dispatch::{normalize, DispatchTable, NormalizedCall};
use super::error::{LoggerError, Result};
use super::format::{Formatters, LineFormatter, MixinMergeStrategy};
use super::level::{LevelChange, LevelObserver, LevelRegistry, LevelSpec, LogLevel};
use super::multisink::{MultiSinkRouter, RouterEntrySpec, SinkError, SinkHandle};
use super::redact::{Censor, Redactor};
use super::serializers::SerializerMap;
use super::stringify::{guard_callback, StringifyMode, DEFAULT_DEPTH_LIMIT};
use super::timestamp::TimeFormat;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Per-call mixin: receives the raw pre-merge context object, the
/// resolved numeric level, and the logger node. Invoked fresh on every
/// enabled call, never cached.
pub type MixinFn = Arc<dyn Fn(&Map<String, Value>, u32, &Logger) -> Map<String, Value> + Send + Sync>;

/// What a log-method hook decides about the pending call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    Suppress,
}

/// Intercepts the normalized argument list before formatting. May
/// rewrite arguments in place or suppress the write; receives the
/// resolved numeric level and the logger node.
pub type LogMethodHook =
    Arc<dyn Fn(&mut Vec<Value>, u32, &Logger) -> HookAction + Send + Sync>;

/// Redaction configuration carried alongside the compiled [`Redactor`]
/// so children can merge paths with their own.
#[derive(Clone)]
pub struct RedactSpec {
    pub paths: Vec<String>,
    pub censor: Censor,
}

/// Per-child configuration for [`Logger::child`]
#[derive(Default)]
pub struct ChildOptions {
    pub level: Option<LevelSpec>,
    pub custom_levels: Vec<(String, u32)>,
    pub serializers: SerializerMap,
    pub redact: Option<RedactSpec>,
    pub formatters: Formatters,
    pub msg_key: Option<String>,
}

struct DispatchState {
    label: String,
    value: u32,
    table: DispatchTable,
}

pub struct Logger {
    name: Option<String>,
    registry: LevelRegistry,
    state: RwLock<DispatchState>,
    chain: BindingsChain,
    serializers: SerializerMap,
    redact_spec: Option<RedactSpec>,
    redactor: Option<Arc<Redactor>>,
    formatter: LineFormatter,
    mixin: Option<MixinFn>,
    mixin_strategy: MixinMergeStrategy,
    hook: Option<LogMethodHook>,
    sink: SinkHandle,
    errors_tx: Sender<SinkError>,
    errors_rx: Receiver<SinkError>,
    observers: RwLock<Vec<LevelObserver>>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// The node's configured name, if any
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current numeric threshold
    #[must_use]
    pub fn level(&self) -> u32 {
        self.state.read().value
    }

    /// Current threshold label
    #[must_use]
    pub fn level_label(&self) -> String {
        self.state.read().label.clone()
    }

    /// The node's registry view
    #[must_use]
    pub fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    /// Whether a call at the given level would produce output
    #[must_use]
    pub fn is_level_enabled(&self, level: impl Into<LevelSpec>) -> bool {
        match self.registry.resolve(&level.into()) {
            Ok(value) => self.state.read().table.is_enabled(value),
            Err(_) => false,
        }
    }

    /// Change the active threshold. Emits a level-change notification to
    /// registered observers; this is the only side effect of level
    /// mutation beyond flipping dispatch state.
    pub fn set_level(&self, level: impl Into<LevelSpec>) -> Result<()> {
        let value = self.registry.resolve(&level.into())?;
        let label = self
            .registry
            .label_for(value)
            .ok_or_else(|| LoggerError::unknown_level(value.to_string()))?
            .to_string();
        let change = {
            let mut state = self.state.write();
            let change = LevelChange {
                new_label: label.clone(),
                new_value: value,
                old_label: state.label.clone(),
                old_value: state.value,
            };
            state.label = label;
            state.value = value;
            state.table = DispatchTable::rebuild(&self.registry, value);
            change
        };
        for observer in self.observers.read().iter() {
            observer(&change);
        }
        Ok(())
    }

    /// Register a level-change observer on this node
    pub fn on_level_change(&self, observer: LevelObserver) {
        self.observers.write().push(observer);
    }

    /// Install a custom level at runtime. The new level is immediately
    /// callable, but stays disabled while the current threshold is
    /// numerically above it.
    pub fn add_level(&mut self, name: &str, value: u32) -> Result<()> {
        self.registry.add_custom(name, value)?;
        let mut state = self.state.write();
        state.table = DispatchTable::rebuild(&self.registry, state.value);
        Ok(())
    }

    /// Receiver for out-of-band sink write failures
    #[must_use]
    pub fn sink_errors(&self) -> Receiver<SinkError> {
        self.errors_rx.clone()
    }

    /// Flush the destination(s). Idempotent; failures go to the sink
    /// error channel.
    pub fn flush(&self) {
        self.sink.flush(&self.errors_tx);
    }

    /// Flush and then invoke the completion callback. The callback runs
    /// even when the sink is fully synchronous and the flush is a no-op.
    pub fn flush_with(&self, callback: impl FnOnce()) {
        self.flush();
        callback();
    }

    /// Log at a level named dynamically (custom levels included) or
    /// given as a registered raw value.
    pub fn log(&self, level: impl Into<LevelSpec>, args: &[Value]) -> Result<()> {
        let spec = level.into();
        let (label, value) = {
            let state = self.state.read();
            match &spec {
                LevelSpec::Name(name) => {
                    let Some(entry) = state.table.entry(name) else {
                        return Err(LoggerError::unknown_level(name.clone()));
                    };
                    if !entry.enabled {
                        return Ok(());
                    }
                    (entry.label.clone(), entry.value)
                }
                LevelSpec::Value(value) => {
                    let Some(label) = self.registry.label_for(*value) else {
                        return Err(LoggerError::unknown_level(value.to_string()));
                    };
                    if !state.table.is_enabled(*value) {
                        return Ok(());
                    }
                    (label.to_string(), *value)
                }
            }
        };
        self.dispatch(&label, value, args)
    }

    #[inline]
    fn builtin(&self, level: LogLevel, args: &[Value]) -> Result<()> {
        // Disabled calls stop here: one lock read and a numeric compare,
        // no formatting, no callbacks, no allocation.
        if !self.state.read().table.is_enabled(level.value()) {
            return Ok(());
        }
        self.dispatch(level.to_str(), level.value(), args)
    }

    #[inline]
    pub fn trace(&self, args: &[Value]) -> Result<()> {
        self.builtin(LogLevel::Trace, args)
    }

    #[inline]
    pub fn debug(&self, args: &[Value]) -> Result<()> {
        self.builtin(LogLevel::Debug, args)
    }

    #[inline]
    pub fn info(&self, args: &[Value]) -> Result<()> {
        self.builtin(LogLevel::Info, args)
    }

    #[inline]
    pub fn warn(&self, args: &[Value]) -> Result<()> {
        self.builtin(LogLevel::Warn, args)
    }

    #[inline]
    pub fn error(&self, args: &[Value]) -> Result<()> {
        self.builtin(LogLevel::Error, args)
    }

    #[inline]
    pub fn fatal(&self, args: &[Value]) -> Result<()> {
        self.builtin(LogLevel::Fatal, args)
    }

    /// Enabled-path dispatch: hook, normalization, serializers, mixin,
    /// formatting, hand-off to the sink.
    fn dispatch(&self, label: &str, value: u32, args: &[Value]) -> Result<()> {
        let call = if let Some(hook) = &self.hook {
            let mut owned = args.to_vec();
            match hook(&mut owned, value, self) {
                HookAction::Suppress => return Ok(()),
                HookAction::Continue => {}
            }
            self.normalize_args(&owned)
        } else {
            self.normalize_args(args)
        };

        let NormalizedCall { merge, msg } = call;
        let mut fields = merge.unwrap_or_default();

        // Mixin sees the raw pre-merge context, fresh on every call
        let mixin_fields = self
            .mixin
            .as_ref()
            .and_then(|mixin| guard_callback(|| mixin(&fields, value, self)));

        let merge_for_meta = (!fields.is_empty()).then(|| Value::Object(fields.clone()));
        self.serializers.apply(&mut fields);

        let time_fragment = self.formatter.time.fragment();
        let line = self.formatter.format_line_with_time(
            label,
            value,
            &time_fragment,
            self.chain.as_str(),
            fields,
            mixin_fields,
            self.mixin_strategy,
            self.redactor.as_deref(),
            msg.as_deref(),
        )?;

        let meta = WriteMeta {
            level: value,
            level_label: label.to_string(),
            message: msg,
            merge_object: merge_for_meta,
            time_fragment,
            logger_name: self.name.clone(),
        };
        self.sink.write(value, &line, &meta, &self.errors_tx);
        Ok(())
    }

    /// Normalize, pre-redacting message arguments so a redacted subtree
    /// interpolated into the message via `%j` is censored there too. The
    /// merge object is redacted later, after the mixin merge.
    fn normalize_args(&self, args: &[Value]) -> NormalizedCall {
        let Some(redactor) = &self.redactor else {
            return normalize(args);
        };
        let redacted: Vec<Value> = args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                let is_merge_object = i == 0 && arg.is_object();
                if !is_merge_object && arg.is_object() {
                    redactor.apply_ref(arg)
                } else {
                    arg.clone()
                }
            })
            .collect();
        normalize(&redacted)
    }

    /// Create a child logger carrying this node's bindings plus its own.
    ///
    /// `bindings` must be a JSON object (an empty object is fine). A
    /// `level` key inside it overrides the inherited level and is
    /// stripped from output.
    pub fn child(&self, bindings: Value) -> Result<Logger> {
        self.child_with(bindings, ChildOptions::default())
    }

    /// [`child`](Self::child) with explicit per-child configuration
    pub fn child_with(&self, bindings: Value, options: ChildOptions) -> Result<Logger> {
        let mut bindings_map = match bindings {
            Value::Object(map) => map,
            Value::Null => return Err(LoggerError::MissingBindings { got: "null" }),
            Value::Bool(_) => return Err(LoggerError::MissingBindings { got: "boolean" }),
            Value::Number(_) => return Err(LoggerError::MissingBindings { got: "number" }),
            Value::String(_) => return Err(LoggerError::MissingBindings { got: "string" }),
            Value::Array(_) => return Err(LoggerError::MissingBindings { got: "array" }),
        };

        // `level` inside the bindings object overrides and never logs
        let inline_level = match bindings_map.shift_remove("level") {
            Some(Value::String(name)) => Some(LevelSpec::Name(name)),
            Some(Value::Number(n)) => {
                let value = n.as_u64().and_then(|v| u32::try_from(v).ok()).ok_or_else(
                    || LoggerError::config("level", "numeric level must be a small integer"),
                )?;
                Some(LevelSpec::Value(value))
            }
            Some(_) => {
                return Err(LoggerError::config(
                    "level",
                    "level binding must be a name or number",
                ))
            }
            None => None,
        };

        // Custom levels validate against the parent's full registry,
        // inherited customs included
        let registry = self.registry.merged_with(&options.custom_levels)?;
        let serializers = self.serializers.merged_with(&options.serializers);

        let (redact_spec, redactor) = match options.redact {
            Some(child_spec) => {
                // Override-not-replace: parent paths stay, child paths
                // add, child censor wins
                let mut paths = self
                    .redact_spec
                    .as_ref()
                    .map(|s| s.paths.clone())
                    .unwrap_or_default();
                for path in &child_spec.paths {
                    if !paths.contains(path) {
                        paths.push(path.clone());
                    }
                }
                let spec = RedactSpec {
                    paths,
                    censor: child_spec.censor,
                };
                let compiled = Redactor::compile(&spec.paths, spec.censor.clone())?;
                (Some(spec), Some(Arc::new(compiled)))
            }
            None => (self.redact_spec.clone(), self.redactor.clone()),
        };

        let mut formatter = self.formatter.clone();
        formatter.formatters = self.formatter.formatters.merged_with(&options.formatters);
        if let Some(msg_key) = options.msg_key {
            formatter.msg_key = msg_key;
        }

        // Level captured by value: later changes to the parent do not
        // retroactively move this child
        let level_spec = options
            .level
            .or(inline_level)
            .unwrap_or(LevelSpec::Value(self.level()));
        let value = registry.resolve(&level_spec)?;
        let label = registry
            .label_for(value)
            .ok_or_else(|| LoggerError::unknown_level(value.to_string()))?
            .to_string();

        // The child's own fragment is computed once, now; later mutation
        // of the caller's map cannot reach it
        let fragment = build_fragment(
            bindings_map,
            &serializers,
            redactor.as_deref(),
            formatter.mode,
        )?;
        let chain = self.chain.extend(&fragment);

        let table = DispatchTable::rebuild(&registry, value);
        Ok(Logger {
            name: self.name.clone(),
            registry,
            state: RwLock::new(DispatchState {
                label,
                value,
                table,
            }),
            chain,
            serializers,
            redact_spec,
            redactor,
            formatter,
            mixin: self.mixin.clone(),
            mixin_strategy: self.mixin_strategy,
            hook: self.hook.clone(),
            sink: self.sink.per_child_copy(),
            errors_tx: self.errors_tx.clone(),
            errors_rx: self.errors_rx.clone(),
            observers: RwLock::new(Vec::new()),
        })
    }
}

/// Builder for constructing a root Logger with a fluent API
///
/// # Example
/// ```
/// use ndjson_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .level("debug")
///     .custom_level("audit", 35)
///     .redact(vec!["req.headers.cookie".to_string()])
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    level: LevelSpec,
    custom_levels: Vec<(String, u32)>,
    serializers: SerializerMap,
    redact: Option<RedactSpec>,
    formatters: Formatters,
    mixin: Option<MixinFn>,
    mixin_strategy: MixinMergeStrategy,
    hook: Option<LogMethodHook>,
    msg_key: String,
    time: TimeFormat,
    terminator: String,
    version: bool,
    mode: StringifyMode,
    base: Option<Map<String, Value>>,
    name: Option<String>,
    sink: Option<SinkHandle>,
    pending_router: Option<(Vec<RouterEntrySpec>, bool)>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: LevelSpec::Value(LogLevel::Info.value()),
            custom_levels: Vec::new(),
            serializers: SerializerMap::new(),
            redact: None,
            formatters: Formatters::default(),
            mixin: None,
            mixin_strategy: MixinMergeStrategy::default(),
            hook: None,
            msg_key: "msg".to_string(),
            time: TimeFormat::default(),
            terminator: "\n".to_string(),
            version: true,
            mode: StringifyMode::default(),
            base: None,
            name: None,
            sink: None,
            pending_router: None,
        }
    }

    /// Set the initial threshold (name or registered numeric value)
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.level = level.into();
        self
    }

    /// Register a custom level; validated against the standard table and
    /// earlier custom entries at build time
    #[must_use = "builder methods return a new value"]
    pub fn custom_level(mut self, name: impl Into<String>, value: u32) -> Self {
        self.custom_levels.push((name.into(), value));
        self
    }

    /// Register a per-field serializer
    #[must_use = "builder methods return a new value"]
    pub fn serializer(
        mut self,
        key: impl Into<String>,
        f: super::serializers::SerializerFn,
    ) -> Self {
        self.serializers.insert(key, f);
        self
    }

    /// Redact the given paths with the default censor
    #[must_use = "builder methods return a new value"]
    pub fn redact(self, paths: Vec<String>) -> Self {
        self.redact_with(paths, Censor::default())
    }

    /// Redact the given paths with an explicit censor (or removal)
    #[must_use = "builder methods return a new value"]
    pub fn redact_with(mut self, paths: Vec<String>, censor: Censor) -> Self {
        self.redact = Some(RedactSpec { paths, censor });
        self
    }

    /// Install formatter hooks
    #[must_use = "builder methods return a new value"]
    pub fn formatters(mut self, formatters: Formatters) -> Self {
        self.formatters = formatters;
        self
    }

    /// Install a per-call mixin
    #[must_use = "builder methods return a new value"]
    pub fn mixin(mut self, mixin: MixinFn) -> Self {
        self.mixin = Some(mixin);
        self
    }

    /// Flip mixin/event-field precedence
    #[must_use = "builder methods return a new value"]
    pub fn mixin_strategy(mut self, strategy: MixinMergeStrategy) -> Self {
        self.mixin_strategy = strategy;
        self
    }

    /// Install a log-method hook
    #[must_use = "builder methods return a new value"]
    pub fn hook(mut self, hook: LogMethodHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Key the message field is written under (default `msg`)
    #[must_use = "builder methods return a new value"]
    pub fn message_key(mut self, key: impl Into<String>) -> Self {
        self.msg_key = key.into();
        self
    }

    /// Field holding error-shaped values; installs the standard error
    /// serializer under that key
    #[must_use = "builder methods return a new value"]
    pub fn error_key(mut self, key: impl Into<String>) -> Self {
        self.serializers
            .insert(key, Arc::new(super::serializers::error_serializer));
        self
    }

    /// Select the time field format
    #[must_use = "builder methods return a new value"]
    pub fn time(mut self, time: TimeFormat) -> Self {
        self.time = time;
        self
    }

    /// Line terminator (default `\n`; `\r\n` is the other supported choice)
    #[must_use = "builder methods return a new value"]
    pub fn terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    /// Whether the trailing `"v":1` format-version field is appended
    #[must_use = "builder methods return a new value"]
    pub fn version_field(mut self, include: bool) -> Self {
        self.version = include;
        self
    }

    /// Strict stringify mode: over-deep values error instead of being
    /// elided, and the line is not written
    #[must_use = "builder methods return a new value"]
    pub fn strict(mut self) -> Self {
        self.mode = StringifyMode::Strict {
            max_depth: DEFAULT_DEPTH_LIMIT,
        };
        self
    }

    /// Override the recursion depth cap, keeping the current mode
    #[must_use = "builder methods return a new value"]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.mode = match self.mode {
            StringifyMode::Safe { .. } => StringifyMode::Safe { max_depth },
            StringifyMode::Strict { .. } => StringifyMode::Strict { max_depth },
        };
        self
    }

    /// Base bindings frozen into the root fragment (default: `pid`)
    #[must_use = "builder methods return a new value"]
    pub fn base(mut self, base: Map<String, Value>) -> Self {
        self.base = Some(base);
        self
    }

    /// Logger name, included in the root bindings and in write metadata
    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Single output destination
    #[must_use = "builder methods return a new value"]
    pub fn destination<D: Destination + 'static>(mut self, destination: D) -> Self {
        self.sink = Some(SinkHandle::Single(shared(destination)));
        self
    }

    /// Single output destination from an existing shared handle
    #[must_use = "builder methods return a new value"]
    pub fn shared_destination(mut self, destination: SharedDestination) -> Self {
        self.sink = Some(SinkHandle::Single(destination));
        self
    }

    /// Multi-destination router; named entry levels resolve against the
    /// final registry (custom levels included) at build time
    #[must_use = "builder methods return a new value"]
    pub fn router(mut self, entries: Vec<RouterEntrySpec>, dedupe: bool) -> Self {
        // Stored unresolved; resolution happens in build()
        self.sink = None;
        self.pending_router = Some((entries, dedupe));
        self
    }

    /// Build the Logger. Configuration errors surface here, immediately
    /// and synchronously.
    pub fn build(self) -> Result<Logger> {
        let registry = LevelRegistry::standard().merged_with(&self.custom_levels)?;

        let (redact_spec, redactor) = match self.redact {
            Some(spec) => {
                let compiled = Redactor::compile(&spec.paths, spec.censor.clone())?;
                (Some(spec), Some(Arc::new(compiled)))
            }
            None => (None, None),
        };

        let formatter = LineFormatter {
            msg_key: self.msg_key,
            terminator: self.terminator,
            time: self.time,
            version: self.version.then_some(1),
            formatters: self.formatters,
            mode: self.mode,
        };

        // Root bindings: name + base fields, run through the bindings
        // formatter before freezing
        let mut root_bindings = Map::new();
        if let Some(name) = &self.name {
            root_bindings.insert("name".to_string(), Value::String(name.clone()));
        }
        match self.base {
            Some(base) => root_bindings.extend(base),
            None => {
                root_bindings.insert(
                    "pid".to_string(),
                    Value::Number(std::process::id().into()),
                );
            }
        }
        if let Some(bindings_fmt) = &formatter.formatters.bindings {
            let input = root_bindings.clone();
            if let Some(transformed) = guard_callback(|| bindings_fmt(input)) {
                root_bindings = transformed;
            }
        }
        let fragment = build_fragment(
            root_bindings,
            &self.serializers,
            redactor.as_deref(),
            formatter.mode,
        )?;
        let chain = BindingsChain::root(&fragment);

        let value = registry.resolve(&self.level)?;
        let label = registry
            .label_for(value)
            .ok_or_else(|| LoggerError::unknown_level(value.to_string()))?
            .to_string();
        let table = DispatchTable::rebuild(&registry, value);

        let sink = match (self.pending_router, self.sink) {
            (Some((entries, dedupe)), _) => {
                SinkHandle::Router(MultiSinkRouter::route(entries, dedupe, &registry)?)
            }
            (None, Some(sink)) => sink,
            (None, None) => SinkHandle::Single(shared(
                crate::destinations::ConsoleDestination::new(),
            )),
        };

        let (errors_tx, errors_rx) = unbounded();
        Ok(Logger {
            name: self.name,
            registry,
            state: RwLock::new(DispatchState {
                label,
                value,
                table,
            }),
            chain,
            serializers: self.serializers,
            redact_spec,
            redactor,
            formatter,
            mixin: self.mixin,
            mixin_strategy: self.mixin_strategy,
            hook: self.hook,
            sink,
            errors_tx,
            errors_rx,
            observers: RwLock::new(Vec::new()),
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
