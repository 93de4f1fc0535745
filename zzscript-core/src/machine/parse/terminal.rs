//! Terminal matchers, each consuming exactly one token.

use crate::token::{Token, TokenKind};
use crate::util;

/// Predicate deciding whether a terminal accepts a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalKind {
    /// Word or symbol with the given text
    Literal { text: String, case_sensitive: bool },
    /// Word that doesn't read as a number
    Word,
    Number,
    String,
    NewLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Terminal {
    pub kind: TerminalKind,
    /// Consume the token without pushing it to the stack
    pub discard: bool,
}

impl Terminal {
    pub fn new(kind: TerminalKind) -> Self {
        Terminal {
            kind,
            discard: false,
        }
    }

    pub fn qualifies(&self, token: &Token) -> bool {
        match &self.kind {
            TerminalKind::Literal {
                text,
                case_sensitive,
            } => {
                (token.is(TokenKind::Word) || token.is(TokenKind::Symbol))
                    && if *case_sensitive {
                        &token.value == text
                    } else {
                        token.value.eq_ignore_ascii_case(text)
                    }
            }
            TerminalKind::Word => token.is(TokenKind::Word) && !util::is_numeric(&token.value),
            TerminalKind::Number => token.is(TokenKind::Number),
            TerminalKind::String => token.is(TokenKind::String),
            TerminalKind::NewLine => token.is(TokenKind::NewLine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str, case_sensitive: bool) -> Terminal {
        Terminal::new(TerminalKind::Literal {
            text: text.to_string(),
            case_sensitive,
        })
    }

    #[test]
    fn literal_case_rules() {
        let token = Token::new(TokenKind::Word, "SET", 1, 1);
        assert!(literal("set", false).qualifies(&token));
        assert!(!literal("set", true).qualifies(&token));
        let colon = Token::new(TokenKind::Symbol, ":", 1, 1);
        assert!(literal(":", false).qualifies(&colon));
        let string = Token::new(TokenKind::String, "set", 1, 1);
        assert!(!literal("set", false).qualifies(&string));
    }

    #[test]
    fn word_rejects_numbers() {
        let word = Terminal::new(TerminalKind::Word);
        assert!(word.qualifies(&Token::new(TokenKind::Word, "counter", 1, 1)));
        assert!(!word.qualifies(&Token::new(TokenKind::Word, "12", 1, 1)));
        assert!(!word.qualifies(&Token::new(TokenKind::Number, "12", 1, 1)));
    }

    #[test]
    fn kind_terminals() {
        let nl = Token::new(TokenKind::NewLine, "\n", 1, 1);
        assert!(Terminal::new(TerminalKind::NewLine).qualifies(&nl));
        assert!(!Terminal::new(TerminalKind::String).qualifies(&nl));
        assert!(!Terminal::new(TerminalKind::Number).qualifies(&nl));
    }
}
