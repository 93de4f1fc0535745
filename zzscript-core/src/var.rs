//! Script variable values.

use std::fmt;

use crate::{Float, Int};

/// Value stored on a context heap or passed as a command argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Var {
    Int(Int),
    Float(Float),
    Str(String),
    Bool(bool),
}

impl Var {
    /// Creates a numeric `Var` from a number literal, preferring integers.
    pub fn from_number_str(s: &str) -> Option<Var> {
        if let Ok(i) = s.parse::<Int>() {
            Some(Var::Int(i))
        } else if let Ok(f) = s.parse::<Float>() {
            Some(Var::Float(f))
        } else {
            None
        }
    }

    pub fn as_int(&self) -> Option<Int> {
        match self {
            Var::Int(i) => Some(*i),
            Var::Float(f) => Some(*f as Int),
            Var::Bool(b) => Some(*b as Int),
            Var::Str(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<Float> {
        match self {
            Var::Int(i) => Some(*i as Float),
            Var::Float(f) => Some(*f),
            Var::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Var::Str(_) => None,
        }
    }

    /// Adds a number, keeping integers integral.
    pub fn add(&self, other: &Var) -> Option<Var> {
        match (self, other) {
            (Var::Int(a), Var::Int(b)) => Some(Var::Int(a.saturating_add(*b))),
            _ => Some(Var::Float(self.as_float()? + other.as_float()?)),
        }
    }

    /// Subtracts a number, keeping integers integral.
    pub fn sub(&self, other: &Var) -> Option<Var> {
        match (self, other) {
            (Var::Int(a), Var::Int(b)) => Some(Var::Int(a.saturating_sub(*b))),
            _ => Some(Var::Float(self.as_float()? - other.as_float()?)),
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Var::Int(i) => write!(f, "{}", i),
            Var::Float(v) => write!(f, "{}", v),
            Var::Str(s) => write!(f, "{}", s),
            Var::Bool(b) => write!(f, "{}", b),
        }
    }
}
