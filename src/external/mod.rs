//! External tool abstractions
//!
//! This module provides the trait-based process runner the diff engine is
//! built on, so git invocations can be exercised against a scripted fake.

pub mod command;
#[cfg(any(test, feature = "testing"))]
pub mod fake;

pub use command::{
    CommandError, CommandExecutor, CommandSpec, ProcessCommandExecutor, ProcessOutcome,
    DEFAULT_COPY_BUFFER_SIZE,
};
