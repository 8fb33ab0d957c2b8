//! Multi-sink routing example
//!
//! Routes routine lines to a file and severe lines to stderr, with
//! de-duplication so severe lines are not double-written.
//!
//! Run with: cargo run --example multi_sink

use ndjson_logger::prelude::*;
use ndjson_logger::shared;
use serde_json::json;

fn main() -> Result<()> {
    let logger = Logger::builder()
        .name("router-demo")
        .redact(vec!["user.token".to_string()])
        .router(
            vec![
                RouterEntrySpec::named(shared(FileDestination::new("app.ndjson")?), "info"),
                RouterEntrySpec::named(shared(ConsoleDestination::stderr()), "error"),
            ],
            true,
        )
        .build()?;

    // Goes to the file only
    logger.info(&[json!({"user": {"id": 1, "token": "secret"}}), json!("login")])?;

    // Goes to stderr only (dedupe suppresses the file entry)
    logger.error(&[json!("database unreachable")])?;

    // Sink failures are reported out-of-band, never thrown from a call
    while let Ok(err) = logger.sink_errors().try_recv() {
        eprintln!("sink '{}' failed: {}", err.destination, err.error);
    }

    logger.flush();
    Ok(())
}
