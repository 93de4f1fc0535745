use crate::machine::cmd::{label_arg, number_arg, set::heap_key, Command};
use crate::machine::exec::ExecutionContext;
use crate::machine::{ControlResult, Error, ErrorKind, LocationInfo, Result};
use crate::token::Token;
use crate::var::Var;

pub const COMMAND_NAMES: [&'static str; 1] = ["if"];

/// Operators accepted between the heap key and the number.
pub const COMPARISON_SYMBOLS: [&'static str; 7] = ["=", "==", "!=", "<", ">", "<=", ">="];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl Comparison {
    pub fn from_token(token: &Token) -> Result<Comparison> {
        match token.value.as_str() {
            "=" | "==" => Ok(Comparison::Equal),
            "!=" => Ok(Comparison::NotEqual),
            "<" => Ok(Comparison::Less),
            ">" => Ok(Comparison::Greater),
            "<=" => Ok(Comparison::LessOrEqual),
            ">=" => Ok(Comparison::GreaterOrEqual),
            _ => Err(Error::new(
                LocationInfo::at_token(token),
                ErrorKind::InvalidCommandBody(format!(
                    "not a comparison operator: {}",
                    token.value
                )),
            )),
        }
    }

    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Equal => left == right,
            Comparison::NotEqual => left != right,
            Comparison::Less => left < right,
            Comparison::Greater => left > right,
            Comparison::LessOrEqual => left <= right,
            Comparison::GreaterOrEqual => left >= right,
        }
    }
}

/// Conditional jump.
///
/// Missing heap keys read as zero. A key holding something that isn't a
/// number never satisfies the condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct If {
    pub target: String,
    pub comparison: Comparison,
    pub value: Var,
    pub label: String,
}

impl If {
    pub fn new(target: &Token, comparison: &Token, value: &Token, label: &Token) -> Result<Command> {
        Ok(Command::If(If {
            target: heap_key(target),
            comparison: Comparison::from_token(comparison)?,
            value: number_arg(value)?,
            label: label_arg(label),
        }))
    }

    pub fn evaluate(&self, ctx: &ExecutionContext) -> bool {
        let left = match ctx.get_var(&self.target) {
            Some(var) => var.as_float(),
            None => Some(0.),
        };
        match (left, self.value.as_float()) {
            (Some(l), Some(r)) => self.comparison.holds(l, r),
            _ => false,
        }
    }

    pub fn execute(&self, ctx: &mut ExecutionContext) -> Result<ControlResult> {
        if self.evaluate(ctx) && ctx.jump_to_label(&self.label) {
            Ok(ControlResult::ContinueAfterJump)
        } else {
            Ok(ControlResult::Continue)
        }
    }
}
