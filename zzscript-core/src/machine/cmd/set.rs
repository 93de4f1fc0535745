//! Commands working on the context heap.

use crate::machine::exec::ExecutionContext;
use crate::machine::{ControlResult, Error, ErrorKind, LocationInfo, Result};
use crate::token::Token;
use crate::var::Var;

use super::{label_arg, number_arg, Command};

pub const SET_COMMAND_NAMES: [&'static str; 1] = ["set"];
pub const GIVE_COMMAND_NAMES: [&'static str; 1] = ["give"];
pub const TAKE_COMMAND_NAMES: [&'static str; 1] = ["take"];
pub const CLEAR_COMMAND_NAMES: [&'static str; 1] = ["clear"];

/// Heap keys are case-insensitive.
pub(crate) fn heap_key(token: &Token) -> String {
    token.value.to_lowercase()
}

/// Stores a number under the target key, replacing what was there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub value: Var,
    pub target: String,
}

impl Set {
    pub fn new(value: &Token, target: &Token) -> Result<Command> {
        Ok(Command::Set(Set {
            value: number_arg(value)?,
            target: heap_key(target),
        }))
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> Result<ControlResult> {
        ctx.set_var(&self.target, self.value.clone());
        Ok(ControlResult::Continue)
    }
}

/// Adds to a counter, missing counters start at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Give {
    pub amount: Var,
    pub target: String,
}

impl Give {
    pub fn new(amount: &Token, target: &Token) -> Result<Command> {
        Ok(Command::Give(Give {
            amount: number_arg(amount)?,
            target: heap_key(target),
        }))
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> Result<ControlResult> {
        let current = ctx.get_var(&self.target).cloned().unwrap_or(Var::Int(0));
        let sum = current
            .add(&self.amount)
            .ok_or_else(|| not_a_number(&self.target, &current))?;
        ctx.set_var(&self.target, sum);
        Ok(ControlResult::Continue)
    }
}

/// Subtracts from a counter if there is enough of it. Otherwise jumps to the
/// optional label and leaves the counter untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Take {
    pub amount: Var,
    pub target: String,
    pub otherwise: Option<String>,
}

impl Take {
    pub fn new(amount: &Token, target: &Token, otherwise: Option<&Token>) -> Result<Command> {
        Ok(Command::Take(Take {
            amount: number_arg(amount)?,
            target: heap_key(target),
            otherwise: otherwise.map(label_arg),
        }))
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> Result<ControlResult> {
        let current = ctx.get_var(&self.target).cloned().unwrap_or(Var::Int(0));
        let (have, need) = match (current.as_float(), self.amount.as_float()) {
            (Some(have), Some(need)) => (have, need),
            _ => return Err(not_a_number(&self.target, &current)),
        };
        if have >= need {
            let rest = current
                .sub(&self.amount)
                .ok_or_else(|| not_a_number(&self.target, &current))?;
            ctx.set_var(&self.target, rest);
            return Ok(ControlResult::Continue);
        }
        match &self.otherwise {
            Some(label) if ctx.jump_to_label(label) => Ok(ControlResult::ContinueAfterJump),
            _ => Ok(ControlResult::Continue),
        }
    }
}

/// Removes a key from the heap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clear {
    pub target: String,
}

impl Clear {
    pub fn new(target: &Token) -> Result<Command> {
        Ok(Command::Clear(Clear {
            target: heap_key(target),
        }))
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> Result<ControlResult> {
        ctx.remove_var(&self.target);
        Ok(ControlResult::Continue)
    }
}

fn not_a_number(key: &str, value: &Var) -> Error {
    Error::new(
        LocationInfo::empty(),
        ErrorKind::Other(format!("heap value is not a number: {} = {:?}", key, value)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::script::Script;
    use crate::token::TokenKind;
    use std::sync::Arc;

    fn context(source: &str) -> ExecutionContext {
        let script = Script::compile("heap", source).unwrap();
        ExecutionContext::new(Arc::new(script))
    }

    fn number(value: &str) -> Token {
        Token::new(TokenKind::Number, value, 1, 5)
    }

    fn word(value: &str) -> Token {
        Token::new(TokenKind::Word, value, 1, 7)
    }

    #[test]
    fn set_replaces_value() {
        let mut ctx = context(":a\nIdle\n");
        let cmd = Set::new(&number("3"), &word("Gems")).unwrap();
        match cmd {
            Command::Set(set) => {
                assert_eq!(set.target, "gems");
                assert_eq!(set.execute(&mut ctx).unwrap(), ControlResult::Continue);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(ctx.get_var("gems"), Some(&Var::Int(3)));
    }

    #[test]
    fn set_rejects_bad_number() {
        let err = Set::new(&number("1.2.3"), &word("gems")).unwrap_err();
        assert!(match err.kind() {
            ErrorKind::InvalidCommandBody(_) => true,
            _ => false,
        });
        assert_eq!(err.location().column, Some(5));
    }

    #[test]
    fn give_starts_from_zero() {
        let mut ctx = context("Idle\n");
        let give = Give {
            amount: Var::Int(2),
            target: "gems".to_string(),
        };
        give.execute(&mut ctx).unwrap();
        give.execute(&mut ctx).unwrap();
        assert_eq!(ctx.get_var("gems"), Some(&Var::Int(4)));
    }

    #[test]
    fn give_to_string_fails() {
        let mut ctx = context("Idle\n");
        ctx.set_var("name", Var::Str("bob".to_string()));
        let give = Give {
            amount: Var::Int(2),
            target: "name".to_string(),
        };
        assert!(give.execute(&mut ctx).is_err());
    }

    #[test]
    fn take_subtracts_or_jumps() {
        let mut ctx = context("Idle\n:broke\nIdle\n");
        ctx.set_var("gems", Var::Int(3));
        let take = Take {
            amount: Var::Int(2),
            target: "gems".to_string(),
            otherwise: Some("broke".to_string()),
        };
        assert_eq!(take.execute(&mut ctx).unwrap(), ControlResult::Continue);
        assert_eq!(ctx.get_var("gems"), Some(&Var::Int(1)));
        assert_eq!(ctx.command_index(), 0);

        assert_eq!(
            take.execute(&mut ctx).unwrap(),
            ControlResult::ContinueAfterJump
        );
        assert_eq!(ctx.get_var("gems"), Some(&Var::Int(1)));
        assert_eq!(ctx.command_index(), 1);
    }

    #[test]
    fn take_without_label_just_continues() {
        let mut ctx = context("Idle\n");
        let take = Take {
            amount: Var::Int(1),
            target: "gems".to_string(),
            otherwise: None,
        };
        assert_eq!(take.execute(&mut ctx).unwrap(), ControlResult::Continue);
        assert_eq!(ctx.get_var("gems"), None);
    }

    #[test]
    fn clear_removes_key() {
        let mut ctx = context("Idle\n");
        ctx.set_var("gems", Var::Int(3));
        Clear {
            target: "gems".to_string(),
        }
        .execute(&mut ctx)
        .unwrap();
        assert!(ctx.heap().is_empty());
    }
}
