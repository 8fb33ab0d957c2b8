//! Logging macros for ergonomic call sites.
//!
//! Each macro collects its arguments into the JSON argument list the
//! logger methods expect, so a leading object literal becomes the merge
//! object and a leading string becomes the message (with `%s`/`%d`/`%j`
//! interpolation over the remaining arguments).
//!
//! # Examples
//!
//! ```
//! use ndjson_logger::prelude::*;
//! use ndjson_logger::info;
//!
//! let dest = MemoryDestination::new("docs");
//! let logger = Logger::builder().destination(dest.clone()).build().unwrap();
//!
//! // Basic logging
//! info!(logger, "server started").unwrap();
//!
//! // Merge object plus interpolated message
//! info!(logger, {"port": 8080}, "listening on %d", 8080).unwrap();
//!
//! assert_eq!(dest.line_count(), 2);
//! ```

/// Log at a dynamically named or numeric level.
///
/// # Examples
///
/// ```
/// # use ndjson_logger::prelude::*;
/// # let dest = MemoryDestination::new("docs");
/// # let logger = Logger::builder().destination(dest.clone()).build().unwrap();
/// use ndjson_logger::log;
/// log!(logger, "warn", "disk usage at %d%%", 91).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $arg:tt)* $(,)?) => {
        $logger.log($level, &[$($crate::serde_json::json!($arg)),*])
    };
}

/// Log a trace-level event.
#[macro_export]
macro_rules! trace {
    ($logger:expr $(, $arg:tt)* $(,)?) => {
        $logger.trace(&[$($crate::serde_json::json!($arg)),*])
    };
}

/// Log a debug-level event.
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $arg:tt)* $(,)?) => {
        $logger.debug(&[$($crate::serde_json::json!($arg)),*])
    };
}

/// Log an info-level event.
///
/// # Examples
///
/// ```
/// # use ndjson_logger::prelude::*;
/// # let dest = MemoryDestination::new("docs");
/// # let logger = Logger::builder().destination(dest.clone()).build().unwrap();
/// use ndjson_logger::info;
/// info!(logger, "processed %d items", 100).unwrap();
/// info!(logger, {"user": "alice"}, "logged in").unwrap();
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $arg:tt)* $(,)?) => {
        $logger.info(&[$($crate::serde_json::json!($arg)),*])
    };
}

/// Log a warn-level event.
#[macro_export]
macro_rules! warn {
    ($logger:expr $(, $arg:tt)* $(,)?) => {
        $logger.warn(&[$($crate::serde_json::json!($arg)),*])
    };
}

/// Log an error-level event.
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $arg:tt)* $(,)?) => {
        $logger.error(&[$($crate::serde_json::json!($arg)),*])
    };
}

/// Log a fatal-level event.
#[macro_export]
macro_rules! fatal {
    ($logger:expr $(, $arg:tt)* $(,)?) => {
        $logger.fatal(&[$($crate::serde_json::json!($arg)),*])
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use serde_json::json;

    fn logger_with_memory() -> (Logger, MemoryDestination) {
        let dest = MemoryDestination::new("macros");
        let logger = Logger::builder()
            .time(TimeFormat::Off)
            .destination(dest.clone())
            .build()
            .unwrap();
        (logger, dest)
    }

    #[test]
    fn test_message_only() {
        let (logger, dest) = logger_with_memory();
        crate::info!(logger, "hello").unwrap();
        assert_eq!(dest.last_parsed().unwrap()["msg"], json!("hello"));
    }

    #[test]
    fn test_merge_object_and_interpolation() {
        let (logger, dest) = logger_with_memory();
        crate::warn!(logger, {"req": 7}, "took %dms", 42).unwrap();
        let line = dest.last_parsed().unwrap();
        assert_eq!(line["req"], json!(7));
        assert_eq!(line["msg"], json!("took 42ms"));
        assert_eq!(line["level"], json!(40));
    }

    #[test]
    fn test_dynamic_level() {
        let (logger, dest) = logger_with_memory();
        crate::log!(logger, "error", "boom").unwrap();
        assert_eq!(dest.last_parsed().unwrap()["level"], json!(50));
    }

    #[test]
    fn test_disabled_level_writes_nothing() {
        let (logger, dest) = logger_with_memory();
        crate::debug!(logger, "invisible").unwrap();
        assert_eq!(dest.line_count(), 0);
    }
}
