//! Matcher tree definitions and the candidate matching protocol.

use std::fmt;
use std::rc::Rc;

use crate::machine::error::{Error, Result};
use crate::machine::script::Node;

use super::terminal::{Terminal, TerminalKind};
use super::{find_best_assembly, Assembly, Candidates};

/// Callback run on every successful candidate, usually turning raw tokens on
/// top of the stack into a syntax node.
pub type Action = Rc<dyn Fn(&mut Assembly) -> Result<()>>;

#[derive(Debug, Clone)]
pub enum MatcherKind {
    Terminal(Terminal),
    Sequence(Vec<Matcher>),
    Alternation(Vec<Matcher>),
    Repetition(Box<Matcher>),
    Empty,
}

/// Single node of a grammar.
#[derive(Clone)]
pub struct Matcher {
    kind: MatcherKind,
    action: Option<Action>,
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("kind", &self.kind)
            .field("action", &self.action.is_some())
            .finish()
    }
}

impl Matcher {
    fn new(kind: MatcherKind) -> Self {
        Matcher { kind, action: None }
    }

    fn terminal(kind: TerminalKind) -> Self {
        Matcher::new(MatcherKind::Terminal(Terminal::new(kind)))
    }

    /// Case-insensitive keyword or symbol.
    pub fn literal(text: &str) -> Self {
        Matcher::terminal(TerminalKind::Literal {
            text: text.to_string(),
            case_sensitive: false,
        })
    }

    pub fn literal_case_sensitive(text: &str) -> Self {
        Matcher::terminal(TerminalKind::Literal {
            text: text.to_string(),
            case_sensitive: true,
        })
    }

    pub fn word() -> Self {
        Matcher::terminal(TerminalKind::Word)
    }

    pub fn number() -> Self {
        Matcher::terminal(TerminalKind::Number)
    }

    pub fn string() -> Self {
        Matcher::terminal(TerminalKind::String)
    }

    pub fn newline() -> Self {
        Matcher::terminal(TerminalKind::NewLine)
    }

    pub fn sequence(children: Vec<Matcher>) -> Self {
        Matcher::new(MatcherKind::Sequence(children))
    }

    pub fn alternation(children: Vec<Matcher>) -> Self {
        Matcher::new(MatcherKind::Alternation(children))
    }

    pub fn repetition(child: Matcher) -> Self {
        Matcher::new(MatcherKind::Repetition(Box::new(child)))
    }

    pub fn empty() -> Self {
        Matcher::new(MatcherKind::Empty)
    }

    pub fn optional(child: Matcher) -> Self {
        Matcher::alternation(vec![child, Matcher::empty()])
    }

    pub fn choice(a: Matcher, b: Matcher) -> Self {
        Matcher::alternation(vec![a, b])
    }

    /// Marks a terminal as consuming its token without pushing it.
    /// Has no effect on combinators.
    pub fn discard(mut self) -> Self {
        if let MatcherKind::Terminal(ref mut terminal) = self.kind {
            terminal.discard = true;
        }
        self
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut Assembly) -> Result<()> + 'static,
    {
        self.action = Some(Rc::new(action));
        self
    }

    pub fn kind(&self) -> &MatcherKind {
        &self.kind
    }

    /// Matches against every input candidate, returning all the ways the
    /// input could be consumed.
    ///
    /// An empty result is a silent failure, which lets enclosing
    /// alternations try sibling branches. An `Err` is a hard parse error.
    pub fn match_candidates(&self, input: &Candidates) -> Result<Candidates> {
        let mut out = match &self.kind {
            MatcherKind::Terminal(terminal) => match_terminal(terminal, input),
            MatcherKind::Sequence(children) => match_sequence(children, input)?,
            MatcherKind::Alternation(children) => match_alternation(children, input)?,
            MatcherKind::Repetition(child) => match_repetition(child, input)?,
            MatcherKind::Empty => input.clone(),
        };
        if let Some(action) = &self.action {
            for candidate in out.iter_mut() {
                action(candidate)?;
            }
        }
        Ok(out)
    }
}

fn match_terminal(terminal: &Terminal, input: &Candidates) -> Candidates {
    let mut out = Candidates::new();
    for candidate in input {
        let accepted = candidate
            .current()
            .map_or(false, |token| terminal.qualifies(token));
        if !accepted {
            continue;
        }
        let mut next = candidate.clone();
        if let Some(token) = next.next() {
            if !terminal.discard {
                next.push(Node::Token(token));
            }
        }
        out.push(next);
    }
    out
}

fn match_sequence(children: &[Matcher], input: &Candidates) -> Result<Candidates> {
    let mut current = input.clone();
    for (n, child) in children.iter().enumerate() {
        let next = child.match_candidates(&current)?;
        if next.is_empty() {
            if n == 0 {
                return Ok(next);
            }
            return Err(match find_best_assembly(&current) {
                Some(best) => best.unexpected(),
                None => Error::internal("sequence lost all candidates"),
            });
        }
        current = next;
    }
    Ok(current)
}

fn match_alternation(children: &[Matcher], input: &Candidates) -> Result<Candidates> {
    let mut out = Candidates::new();
    let mut first_error = None;
    for child in children {
        match child.match_candidates(input) {
            Ok(matched) => out.extend(matched),
            Err(e) if e.is_parse_error() => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => return Err(e),
        }
    }
    if out.is_empty() {
        if let Some(e) = first_error {
            return Err(e);
        }
    }
    Ok(out)
}

/// Each candidate is matched on its own so that only results which moved
/// past that candidate's own cursor carry on. Parse errors of stuck
/// candidates only surface when no candidate made progress.
fn match_repetition(child: &Matcher, input: &Candidates) -> Result<Candidates> {
    let mut out = input.clone();
    let mut current = input.clone();
    loop {
        let mut next = Candidates::new();
        let mut first_error = None;
        for candidate in &current {
            let mut single = Candidates::new();
            single.push(candidate.clone());
            match child.match_candidates(&single) {
                Ok(matched) => next.extend(
                    matched
                        .into_iter()
                        .filter(|a| a.cursor() > candidate.cursor()),
                ),
                Err(e) if e.is_parse_error() => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        if next.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
            break;
        }
        out.extend(next.iter().cloned());
        current = next;
    }
    Ok(out)
}
