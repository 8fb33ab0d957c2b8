//! Basic usage example
//!
//! Demonstrates the builder, levels, interpolation, and child loggers.
//!
//! Run with: cargo run --example basic_usage

use ndjson_logger::prelude::*;
use serde_json::json;

fn main() -> Result<()> {
    // Lines go to stdout by default
    let logger = Logger::builder().name("demo").level("debug").build()?;

    logger.info(&[json!("service started")])?;
    logger.debug(&[json!({"config": "defaults"}), json!("loaded")])?;

    // printf-style interpolation
    logger.info(&[json!("handled %d requests in %dms"), json!(128), json!(42)])?;

    // Child loggers carry their bindings on every line
    let request_logger = logger.child(json!({"req_id": "abc-123"}))?;
    request_logger.info(&[json!("request received")])?;
    request_logger.warn(&[json!({"elapsed_ms": 950}), json!("slow handler")])?;

    // Thresholds are per node
    logger.set_level("warn")?;
    logger.info(&[json!("suppressed")])?;
    logger.error(&[json!("still visible")])?;

    logger.flush();
    Ok(())
}
