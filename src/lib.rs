//! # NDJSON Logger
//!
//! A structured logging core that renders each event as a single
//! newline-delimited JSON line.
//!
//! ## Features
//!
//! - **Low Overhead**: disabled levels cost one lock read and a numeric
//!   compare; bindings are serialized once, at logger creation
//! - **Hierarchical Loggers**: cheap child loggers inherit and extend
//!   their parent's bindings, levels, serializers, and redaction
//! - **Redaction**: censor or remove sensitive fields by dot path before
//!   they ever reach a destination
//! - **Multi-Sink Routing**: fan one line out to several destinations
//!   with per-destination minimum levels and optional de-duplication
//! - **Thread Safe**: designed for concurrent callers
//!
//! ## Quick start
//!
//! ```
//! use ndjson_logger::prelude::*;
//! use serde_json::json;
//!
//! let dest = MemoryDestination::new("example");
//! let logger = Logger::builder()
//!     .name("app")
//!     .destination(dest.clone())
//!     .build()
//!     .unwrap();
//!
//! logger.info(&[json!({"port": 8080}), json!("server started")]).unwrap();
//! assert_eq!(dest.line_count(), 1);
//! ```

pub mod core;
pub mod destinations;
pub mod macros;

// Macro support; not part of the public API surface
#[doc(hidden)]
pub use serde_json;

pub mod prelude {
    pub use crate::core::{
        Censor, ChildOptions, Destination, Formatters, HookAction, LevelRegistry, LevelSpec,
        LineFormatter, LogLevel, Logger, LoggerBuilder, LoggerError, MixinMergeStrategy,
        MultiSinkRouter, RedactSpec, Redactor, Result, RouterEntrySpec, SerializerMap, SinkError,
        StringifyMode, TerminationCoordinator, TimeFormat, WriteMeta, SILENT,
    };
    pub use crate::destinations::{ConsoleDestination, FileDestination, MemoryDestination};
}

pub use crate::core::{
    shared, Censor, CensorFn, ChildOptions, Destination, Formatters, HookAction, LevelChange,
    LevelObserver, LevelRegistry, LevelSpec, LineFormatter, LogLevel, LogMethodHook, Logger,
    LoggerBuilder, LoggerError, MixinFn, MixinMergeStrategy, MultiSinkRouter, RedactSpec, Redactor,
    Result, RouterEntrySpec, SerializerFn, SerializerMap, SharedDestination, SinkError, SinkHandle,
    StringifyMode, TerminationCoordinator, TimeFormat, WriteMeta, DEFAULT_CENSOR, SILENT,
};
pub use crate::destinations::{ConsoleDestination, ConsoleStream, FileDestination, MemoryDestination};
