//! Command definitions.
//!
//! Command struct serves as the basic building block for the in-memory logic
//! representation used by the machine. Each command provides a constructor
//! used by the grammar (turning parsed tokens into the target struct) and an
//! implementation for its execution.
//!
//! A compiled script is a flat list of commands. During execution the list
//! is walked by an [`ExecutionContext`], and each command tells the context
//! how to proceed by returning a [`ControlResult`].
//!
//! The vocabulary defined here covers flow control and the script heap.
//! Anything touching the world outside the script goes through the
//! [`Owner`] trait, either with the few owner-facing commands here or with
//! [`ext::Extern`] commands handed over to the owner verbatim.
//!
//! [`ExecutionContext`]: crate::machine::exec::ExecutionContext

pub mod ext;
pub mod flow;
pub mod print;
pub mod set;

use crate::machine::exec::ExecutionContext;
use crate::machine::{ControlResult, Error, ErrorKind, LocationInfo, Owner, Result};
use crate::token::Token;
use crate::var::Var;

/// Defines all the commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    // heap
    Set(set::Set),
    Give(set::Give),
    Take(set::Take),
    Clear(set::Clear),

    // flow control
    If(flow::ifelse::If),
    Send(flow::Send),
    Zap(flow::Zap),
    Restore(flow::Restore),
    Wait(flow::Wait),
    Restart,
    End,
    Idle,

    // owner
    Say(print::Say),
    Lock(ext::Lock),
    Extern(ext::Extern),
}

impl Command {
    /// Executes the command on behalf of the owner.
    pub fn execute<O: Owner + ?Sized>(
        &self,
        owner: &mut O,
        ctx: &mut ExecutionContext,
    ) -> Result<ControlResult> {
        match self {
            Command::Set(cmd) => cmd.execute(ctx),
            Command::Give(cmd) => cmd.execute(ctx),
            Command::Take(cmd) => cmd.execute(ctx),
            Command::Clear(cmd) => cmd.execute(ctx),

            Command::If(cmd) => cmd.execute(ctx),
            Command::Send(cmd) => Ok(cmd.execute(ctx)),
            Command::Zap(cmd) => Ok(cmd.execute(ctx)),
            Command::Restore(cmd) => Ok(cmd.execute(ctx)),
            Command::Wait(cmd) => Ok(cmd.execute(ctx)),
            Command::Restart => Ok(flow::restart(ctx)),
            Command::End => Ok(flow::end(ctx)),
            Command::Idle => Ok(ControlResult::Normal),

            Command::Say(cmd) => Ok(cmd.execute(owner)),
            Command::Lock(cmd) => Ok(cmd.execute(owner)),
            Command::Extern(cmd) => cmd.execute(owner),
        }
    }

    /// Name of the command as written in scripts.
    pub fn name(&self) -> &str {
        match self {
            Command::Set(_) => set::SET_COMMAND_NAMES[0],
            Command::Give(_) => set::GIVE_COMMAND_NAMES[0],
            Command::Take(_) => set::TAKE_COMMAND_NAMES[0],
            Command::Clear(_) => set::CLEAR_COMMAND_NAMES[0],
            Command::If(_) => flow::ifelse::COMMAND_NAMES[0],
            Command::Send(_) => flow::SEND_COMMAND_NAMES[0],
            Command::Zap(_) => flow::ZAP_COMMAND_NAMES[0],
            Command::Restore(_) => flow::RESTORE_COMMAND_NAMES[0],
            Command::Wait(_) => flow::WAIT_COMMAND_NAMES[0],
            Command::Restart => flow::RESTART_COMMAND_NAMES[0],
            Command::End => flow::END_COMMAND_NAMES[0],
            Command::Idle => flow::IDLE_COMMAND_NAMES[0],
            Command::Say(_) => print::COMMAND_NAMES[0],
            Command::Lock(cmd) => {
                if cmd.locked {
                    ext::LOCK_COMMAND_NAMES[0]
                } else {
                    ext::UNLOCK_COMMAND_NAMES[0]
                }
            }
            Command::Extern(cmd) => &cmd.name,
        }
    }
}

/// Reads a number literal argument.
pub(crate) fn number_arg(token: &Token) -> Result<Var> {
    Var::from_number_str(&token.value).ok_or_else(|| {
        Error::new(
            LocationInfo::at_token(token),
            ErrorKind::InvalidCommandBody(format!("expected a number, got: {}", token.value)),
        )
    })
}

/// Label names are case-insensitive.
pub(crate) fn label_arg(token: &Token) -> String {
    token.value.to_lowercase()
}

/// Lists all the keywords starting built-in statements.
pub fn keywords() -> Vec<&'static str> {
    let mut out = Vec::new();
    out.extend(&set::SET_COMMAND_NAMES);
    out.extend(&set::GIVE_COMMAND_NAMES);
    out.extend(&set::TAKE_COMMAND_NAMES);
    out.extend(&set::CLEAR_COMMAND_NAMES);
    out.extend(&flow::ifelse::COMMAND_NAMES);
    out.extend(&flow::SEND_COMMAND_NAMES);
    out.extend(&flow::ZAP_COMMAND_NAMES);
    out.extend(&flow::RESTORE_COMMAND_NAMES);
    out.extend(&flow::WAIT_COMMAND_NAMES);
    out.extend(&flow::RESTART_COMMAND_NAMES);
    out.extend(&flow::END_COMMAND_NAMES);
    out.extend(&flow::IDLE_COMMAND_NAMES);
    out.extend(&print::COMMAND_NAMES);
    out.extend(&ext::LOCK_COMMAND_NAMES);
    out.extend(&ext::UNLOCK_COMMAND_NAMES);
    out
}
