//! Flow control commands.
//!
//! Commands that move the instruction pointer never return a result that
//! would advance it afterwards.

pub mod ifelse;

use crate::machine::exec::ExecutionContext;
use crate::machine::{ControlResult, Result};
use crate::token::Token;
use crate::var::Var;

use super::{label_arg, number_arg, Command};

pub const SEND_COMMAND_NAMES: [&'static str; 1] = ["send"];
pub const ZAP_COMMAND_NAMES: [&'static str; 1] = ["zap"];
pub const RESTORE_COMMAND_NAMES: [&'static str; 1] = ["restore"];
pub const WAIT_COMMAND_NAMES: [&'static str; 1] = ["wait"];
pub const RESTART_COMMAND_NAMES: [&'static str; 1] = ["restart"];
pub const END_COMMAND_NAMES: [&'static str; 1] = ["end"];
pub const IDLE_COMMAND_NAMES: [&'static str; 1] = ["idle"];

/// Transient heap key holding the ticks left to wait.
pub const WAIT_KEY: &str = "<wait>";

/// Jumps to the next available occurrence of a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Send {
    pub label: String,
}

impl Send {
    pub fn new(label: &Token) -> Result<Command> {
        Ok(Command::Send(Send {
            label: label_arg(label),
        }))
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> ControlResult {
        if ctx.jump_to_label(&self.label) {
            ControlResult::ContinueAfterJump
        } else {
            ControlResult::Continue
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zap {
    pub label: String,
}

impl Zap {
    pub fn new(label: &Token) -> Result<Command> {
        Ok(Command::Zap(Zap {
            label: label_arg(label),
        }))
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> ControlResult {
        ctx.zap_label(&self.label);
        ControlResult::Continue
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restore {
    pub label: String,
}

impl Restore {
    pub fn new(label: &Token) -> Result<Command> {
        Ok(Command::Restore(Restore {
            label: label_arg(label),
        }))
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> ControlResult {
        ctx.restore_label(&self.label);
        ControlResult::Continue
    }
}

/// Holds the script in place for a number of ticks.
///
/// The countdown lives under a transient key, so a jump away from the
/// waiting command cancels it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wait {
    pub ticks: Var,
}

impl Wait {
    pub fn new(ticks: &Token) -> Result<Command> {
        Ok(Command::Wait(Wait {
            ticks: number_arg(ticks)?,
        }))
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> ControlResult {
        let remaining = ctx
            .get_var(WAIT_KEY)
            .and_then(|v| v.as_int())
            .or_else(|| self.ticks.as_int())
            .unwrap_or(0);
        if remaining <= 0 {
            ctx.remove_var(WAIT_KEY);
            ControlResult::Normal
        } else {
            ctx.set_var(WAIT_KEY, Var::Int(remaining - 1));
            ControlResult::Repeat
        }
    }
}

/// Moves the instruction pointer back to the first command.
pub fn restart(ctx: &mut ExecutionContext) -> ControlResult {
    ctx.jump_to_index(0);
    ControlResult::ContinueAfterJump
}

/// Stops the script for good. Nothing advances a stopped context, the
/// result only ends the tick.
pub fn end(ctx: &mut ExecutionContext) -> ControlResult {
    ctx.stop();
    ControlResult::Repeat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::script::Script;
    use std::sync::Arc;

    fn context(source: &str) -> ExecutionContext {
        let script = Script::compile("flow", source).unwrap();
        ExecutionContext::new(Arc::new(script))
    }

    #[test]
    fn send_reports_whether_it_jumped() {
        let mut ctx = context("Idle\n:there\nIdle\n");
        let send = Send {
            label: "there".to_string(),
        };
        assert_eq!(send.execute(&mut ctx), ControlResult::ContinueAfterJump);
        assert_eq!(ctx.command_index(), 1);

        let miss = Send {
            label: "nowhere".to_string(),
        };
        assert_eq!(miss.execute(&mut ctx), ControlResult::Continue);
        assert_eq!(ctx.command_index(), 1);
    }

    #[test]
    fn wait_counts_down_then_advances() {
        let mut ctx = context("Idle\n");
        let wait = Wait { ticks: Var::Int(2) };
        assert_eq!(wait.execute(&mut ctx), ControlResult::Repeat);
        assert_eq!(wait.execute(&mut ctx), ControlResult::Repeat);
        assert_eq!(wait.execute(&mut ctx), ControlResult::Normal);
        assert!(ctx.get_var(WAIT_KEY).is_none());

        let none = Wait { ticks: Var::Int(0) };
        assert_eq!(none.execute(&mut ctx), ControlResult::Normal);
    }

    #[test]
    fn end_stops_and_restart_rewinds() {
        let mut ctx = context("Idle\nIdle\n");
        ctx.jump_to_index(1);
        assert_eq!(restart(&mut ctx), ControlResult::ContinueAfterJump);
        assert_eq!(ctx.command_index(), 0);
        assert_eq!(end(&mut ctx), ControlResult::Repeat);
        assert!(!ctx.is_running());
        assert_eq!(ctx.command_index(), -1);
    }
}
