//! Concrete destinations
//!
//! The core only requires the [`Destination`](crate::core::Destination)
//! contract; these are the sinks shipped with the crate. Transport sinks
//! running in separate execution contexts satisfy the same trait and plug
//! in unchanged.

pub mod console;
pub mod file;
pub mod memory;

pub use console::{ConsoleDestination, ConsoleStream};
pub use file::FileDestination;
pub use memory::MemoryDestination;
