//! Parser-combinator engine.
//!
//! Grammars are trees of [`Matcher`]s. Instead of backtracking, every matcher
//! maps a set of candidate [`Assembly`]s to the set of all candidates it can
//! produce from them. Ambiguity shows up as several live candidates, and the
//! one that consumed the most input wins in the end.

mod assembly;
mod matcher;
mod terminal;

pub use self::assembly::{Assembly, Stack};
pub use self::matcher::{Action, Matcher, MatcherKind};
pub use self::terminal::{Terminal, TerminalKind};

use std::rc::Rc;

use smallvec::SmallVec;

use crate::machine::error::Result;
use crate::token::Token;

/// Collection of parallel parse candidates.
pub type Candidates = SmallVec<[Assembly; 2]>;

/// Picks the candidate that advanced furthest, the first one on ties.
pub fn find_best_assembly(candidates: &Candidates) -> Option<&Assembly> {
    let mut best: Option<&Assembly> = None;
    for candidate in candidates {
        match best {
            Some(b) if b.cursor() >= candidate.cursor() => (),
            _ => best = Some(candidate),
        }
    }
    best
}

/// Runs the matcher over the whole token list.
///
/// Succeeds only if the best candidate consumed every token, otherwise
/// reports the token the best candidate got stuck on.
pub fn complete_match(matcher: &Matcher, tokens: Vec<Token>) -> Result<Assembly> {
    let tokens: Rc<[Token]> = tokens.into();
    let initial = Assembly::new(tokens);
    let mut input = Candidates::new();
    input.push(initial.clone());

    let out = matcher.match_candidates(&input)?;
    match find_best_assembly(&out) {
        Some(best) if best.is_done() => Ok(best.clone()),
        Some(best) => Err(best.unexpected()),
        None => Err(initial.unexpected()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::machine::error::ErrorKind;

    #[test]
    fn best_assembly_is_furthest_then_first() {
        let tokens: Rc<[Token]> = tokenize("a b").unwrap().into();
        let mut far = Assembly::new(tokens.clone());
        far.next();
        far.next();
        let mut near = Assembly::new(tokens);
        near.next();
        let mut candidates = Candidates::new();
        candidates.push(near);
        candidates.push(far.clone());
        candidates.push(far);
        let best = find_best_assembly(&candidates).unwrap();
        assert_eq!(best.cursor(), 2);
        assert!(find_best_assembly(&Candidates::new()).is_none());
    }

    #[test]
    fn incomplete_match_reports_leftover_token() {
        let grammar = Matcher::sequence(vec![Matcher::word(), Matcher::newline()]);
        let err = complete_match(&grammar, tokenize("a b").unwrap()).unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(err.location().column, Some(3));
    }

    #[test]
    fn exhausted_input_reports_token_expected() {
        let grammar = Matcher::sequence(vec![Matcher::word(), Matcher::word()]);
        let tokens = vec![Token::new(crate::token::TokenKind::Word, "a", 1, 1)];
        let err = complete_match(&grammar, tokens).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::TokenExpected);
    }

    #[test]
    fn nothing_matched_points_at_first_token() {
        let err = complete_match(&Matcher::number(), tokenize("word").unwrap()).unwrap_err();
        assert_eq!(err.location().line, Some(1));
        assert_eq!(err.location().column, Some(1));
    }
}
