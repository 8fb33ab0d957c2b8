//! Core logging types and traits

pub mod bindings;
pub mod destination;
pub mod dispatch;
pub mod error;
pub mod finalizer;
pub mod format;
pub mod interp;
pub mod level;
pub mod logger;
pub mod multisink;
pub mod redact;
pub mod serializers;
pub mod stringify;
pub mod timestamp;

pub use bindings::{build_fragment, BindingsChain};
pub use destination::{shared, Destination, SharedDestination, WriteMeta};
pub use dispatch::{normalize, DispatchEntry, DispatchTable, NormalizedCall};
pub use error::{LoggerError, Result};
pub use finalizer::TerminationCoordinator;
pub use format::{
    BindingsFormatterFn, Formatters, LevelFormatterFn, LineFormatter, LogFormatterFn,
    MixinMergeStrategy,
};
pub use interp::{format_message, stringify_arg};
pub use level::{LevelChange, LevelObserver, LevelRegistry, LevelSpec, LogLevel, SILENT};
pub use logger::{ChildOptions, HookAction, LogMethodHook, Logger, LoggerBuilder, MixinFn, RedactSpec};
pub use multisink::{MultiSinkRouter, RouterEntrySpec, SinkError, SinkHandle};
pub use redact::{Censor, CensorFn, Redactor, DEFAULT_CENSOR};
pub use serializers::{error_serializer, SerializerFn, SerializerMap};
pub use stringify::{
    guard_callback, stringify, StringifyMode, DEFAULT_DEPTH_LIMIT, SERIALIZE_ERROR_MARKER,
    TRUNCATED_MARKER,
};
pub use timestamp::{TimeFormat, TimeFragmentFn};
