//! Logic execution capability for script-owning entities.
//!
//! The *machine* covers everything between a token stream and a running
//! script: the parser-combinator engine ([`parse`]), the script grammar and
//! compiler ([`script`]), the command vocabulary ([`cmd`]) and the per-entity
//! interpreter ([`exec`]).

pub mod cmd;
pub mod error;
pub mod exec;
pub mod parse;
pub mod script;

pub use error::{Error, ErrorKind, Result};

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::token::Token;
use crate::var::Var;

/// Holds source location information.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// Name of the script
    pub source: Option<String>,
    /// Line number as seen in source text
    pub line: Option<usize>,
    /// Column number as seen in source text
    pub column: Option<usize>,
    /// Index into the compiled command list
    pub command: Option<usize>,
}

impl LocationInfo {
    pub fn empty() -> LocationInfo {
        LocationInfo::default()
    }

    pub fn at_token(token: &Token) -> LocationInfo {
        LocationInfo {
            source: None,
            line: Some(token.line),
            column: Some(token.column),
            command: None,
        }
    }
}

/// Used for controlling the flow of execution.
///
/// Returned by every executed command, tells the context what to do with
/// the instruction pointer and whether the current tick goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ControlResult {
    /// Advance to the next command and end the tick
    Normal = 0,
    /// Advance to the next command and keep executing within the same tick
    Continue = 1,
    /// Keep executing within the same tick without advancing, the command
    /// has already moved the instruction pointer
    ContinueAfterJump = 2,
    /// End the tick without advancing, the same command runs again next tick
    Repeat = 3,
}

impl ControlResult {
    /// Interprets a raw control code as returned by externally defined
    /// commands. Missing code means `Normal`.
    pub fn from_code(code: Option<u8>) -> Result<ControlResult> {
        match code {
            None | Some(0) => Ok(ControlResult::Normal),
            Some(1) => Ok(ControlResult::Continue),
            Some(2) => Ok(ControlResult::ContinueAfterJump),
            Some(3) => Ok(ControlResult::Repeat),
            Some(n) => Err(Error::new(
                LocationInfo::empty(),
                ErrorKind::UnknownControlResult(n),
            )),
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Interface the interpreter requires from the entity owning a script.
///
/// Everything commands do to the world besides flow control goes through
/// this trait.
pub trait Owner {
    /// Locked owners don't receive queued messages.
    fn is_locked(&self) -> bool;

    fn set_locked(&mut self, locked: bool);

    /// Displays a line of text on behalf of the owner.
    fn say(&mut self, text: &str) {
        info!("{}", text);
    }

    /// Executes a command from outside the core vocabulary, written as
    /// `#name args...` in scripts.
    ///
    /// Returns a raw control code, see [`ControlResult::from_code`].
    fn execute_extern(&mut self, name: &str, args: &[Var]) -> Result<Option<u8>> {
        warn!("unhandled command: #{} {:?}", name, args);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_codes() {
        assert_eq!(ControlResult::from_code(None).unwrap(), ControlResult::Normal);
        assert_eq!(
            ControlResult::from_code(Some(2)).unwrap(),
            ControlResult::ContinueAfterJump
        );
        assert_eq!(ControlResult::Repeat.code(), 3);
        let err = ControlResult::from_code(Some(7)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnknownControlResult(7));
    }
}
