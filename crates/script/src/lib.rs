//! Script execution substrate: typed stack, number codec, builder.

pub mod builder;
pub mod opcodes;
pub mod scriptnum;
pub mod stack;

use std::fmt;

pub use builder::ScriptBuilder;
pub use stack::Stack;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScriptError {
    /// A stack operation reached past the stack depth, or an element could
    /// not be interpreted as a number.
    InvalidStackOperation,
    /// Building the script would produce a non-canonical result, typically
    /// by exceeding a size limit.
    NotCanonical(&'static str),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::InvalidStackOperation => {
                write!(f, "invalid stack operation")
            }
            ScriptError::NotCanonical(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ScriptError {}
