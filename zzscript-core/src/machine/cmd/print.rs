use crate::machine::{ControlResult, Owner, Result};
use crate::token::Token;

use super::Command;

pub const COMMAND_NAMES: [&'static str; 1] = ["say"];

/// Displays a line of text through the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Say {
    pub text: String,
}

impl Say {
    pub fn new(text: &Token) -> Result<Command> {
        Ok(Command::Say(Say {
            text: text.value.clone(),
        }))
    }

    pub fn execute<O: Owner + ?Sized>(&self, owner: &mut O) -> ControlResult {
        owner.say(&self.text);
        ControlResult::Normal
    }
}
