//! Commands acting on the owner rather than on the script state.

use crate::machine::{ControlResult, Owner, Result};
use crate::token::{Token, TokenKind};
use crate::var::Var;

use super::Command;

pub const LOCK_COMMAND_NAMES: [&'static str; 1] = ["lock"];
pub const UNLOCK_COMMAND_NAMES: [&'static str; 1] = ["unlock"];

/// Toggles whether the owner accepts queued messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lock {
    pub locked: bool,
}

impl Lock {
    pub fn new(locked: bool) -> Command {
        Command::Lock(Lock { locked })
    }

    pub fn execute<O: Owner + ?Sized>(&self, owner: &mut O) -> ControlResult {
        owner.set_locked(self.locked);
        ControlResult::Continue
    }
}

/// Command defined by the owner, written as `#name args...`.
///
/// The owner decides what happens and answers with a raw control code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extern {
    pub name: String,
    pub args: Vec<Var>,
}

impl Extern {
    pub fn new(name: &Token, args: &[Token]) -> Result<Command> {
        Ok(Command::Extern(Extern {
            name: name.value.to_lowercase(),
            args: args.iter().map(arg_to_var).collect(),
        }))
    }

    pub fn execute<O: Owner + ?Sized>(&self, owner: &mut O) -> Result<ControlResult> {
        let code = owner.execute_extern(&self.name, &self.args)?;
        ControlResult::from_code(code)
    }
}

fn arg_to_var(token: &Token) -> Var {
    match token.kind {
        TokenKind::Number => {
            Var::from_number_str(&token.value).unwrap_or_else(|| Var::Str(token.value.clone()))
        }
        TokenKind::Word if token.value.eq_ignore_ascii_case("true") => Var::Bool(true),
        TokenKind::Word if token.value.eq_ignore_ascii_case("false") => Var::Bool(false),
        _ => Var::Str(token.value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::ErrorKind;

    struct Host {
        locked: bool,
        code: Option<u8>,
        calls: Vec<(String, Vec<Var>)>,
    }

    impl Owner for Host {
        fn is_locked(&self) -> bool {
            self.locked
        }
        fn set_locked(&mut self, locked: bool) {
            self.locked = locked;
        }
        fn execute_extern(&mut self, name: &str, args: &[Var]) -> Result<Option<u8>> {
            self.calls.push((name.to_string(), args.to_vec()));
            Ok(self.code)
        }
    }

    fn host(code: Option<u8>) -> Host {
        Host {
            locked: false,
            code,
            calls: Vec::new(),
        }
    }

    #[test]
    fn lock_sets_owner_flag() {
        let mut owner = host(None);
        let lock = match Lock::new(true) {
            Command::Lock(lock) => lock,
            other => panic!("unexpected command: {:?}", other),
        };
        assert_eq!(lock.execute(&mut owner), ControlResult::Continue);
        assert!(owner.is_locked());
    }

    #[test]
    fn extern_passes_typed_args() {
        let tokens = vec![
            Token::new(TokenKind::Number, "2", 1, 7),
            Token::new(TokenKind::Word, "north", 1, 9),
            Token::new(TokenKind::String, "hi there", 1, 15),
            Token::new(TokenKind::Word, "True", 1, 26),
        ];
        let name = Token::new(TokenKind::Word, "Walk", 1, 2);
        let cmd = match Extern::new(&name, &tokens).unwrap() {
            Command::Extern(cmd) => cmd,
            other => panic!("unexpected command: {:?}", other),
        };
        let mut owner = host(Some(1));
        assert_eq!(cmd.execute(&mut owner).unwrap(), ControlResult::Continue);
        assert_eq!(owner.calls[0].0, "walk");
        assert_eq!(
            owner.calls[0].1,
            vec![
                Var::Int(2),
                Var::Str("north".to_string()),
                Var::Str("hi there".to_string()),
                Var::Bool(true),
            ]
        );
    }

    #[test]
    fn unknown_code_is_internal_error() {
        let cmd = Extern {
            name: "boom".to_string(),
            args: vec![],
        };
        let err = cmd.execute(&mut host(Some(42))).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnknownControlResult(42));
        assert!(err.is_internal());
    }
}
