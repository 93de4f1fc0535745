//! Reference lexer turning script text into tokens.
//!
//! Rules in short:
//!
//! - spaces and tabs separate tokens, line breaks become `NewLine` tokens
//! - `'` starts a comment running until the end of the line
//! - `"..."` is a string, with `\"`, `\\`, `\n` and `\t` escapes
//! - a digit, or a `-` directly followed by a digit, starts a number
//! - a letter or `_` starts a word, a word in angle brackets like `<x>`
//!   is a single word too (transient heap keys)
//! - anything else is a symbol, comparison operators like `<=` are
//!   a single symbol
//!
//! The token list always ends with a `NewLine`.

use std::iter::Peekable;
use std::str::Chars;

use crate::machine::error::{Error, ErrorKind, Result};
use crate::machine::LocationInfo;
use crate::token::{Token, TokenKind};

static COMMENT_SYMBOL: char = '\'';
static QUOTE_SYMBOL: char = '"';
static ESCAPE_SYMBOL: char = '\\';
static TWO_CHAR_SYMBOLS: &[&str] = &["<=", ">=", "!=", "=="];

/// Tokenizes the given text.
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    Lexer::new(text).run()
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Lexer {
            chars: text.chars().peekable(),
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(&c) = self.chars.peek() {
            let (line, column) = (self.line, self.column);
            if c == '\n' {
                self.bump();
                self.push(TokenKind::NewLine, "\n", line, column);
            } else if c == '\r' || c == ' ' || c == '\t' {
                self.bump();
            } else if c == COMMENT_SYMBOL {
                while let Some(&n) = self.chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else if c == QUOTE_SYMBOL {
                let value = self.string(line, column)?;
                self.push(TokenKind::String, value, line, column);
            } else if c.is_ascii_digit() || (c == '-' && self.next_is_digit()) {
                let value = self.number();
                self.push(TokenKind::Number, value, line, column);
            } else if c == '<' && self.bracketed_word_ahead() {
                let value = self.bracketed_word();
                self.push(TokenKind::Word, value, line, column);
            } else if c.is_alphabetic() || c == '_' {
                let value = self.word();
                self.push(TokenKind::Word, value, line, column);
            } else {
                let value = self.symbol();
                self.push(TokenKind::Symbol, value, line, column);
            }
        }

        if self.tokens.last().map(|t| t.kind) != Some(TokenKind::NewLine) {
            let (line, column) = (self.line, self.column);
            self.push(TokenKind::NewLine, "\n", line, column);
        }
        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, value: impl Into<String>, line: usize, column: usize) {
        self.tokens.push(Token::new(kind, value, line, column));
    }

    fn next_is_digit(&self) -> bool {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map_or(false, |c| c.is_ascii_digit())
    }

    fn bracketed_word_ahead(&self) -> bool {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        match lookahead.next() {
            Some(c) if c.is_alphabetic() || c == '_' => (),
            _ => return false,
        }
        for c in lookahead {
            if c == '>' {
                return true;
            }
            if !(c.is_alphanumeric() || c == '_') {
                return false;
            }
        }
        false
    }

    fn bracketed_word(&mut self) -> String {
        let mut value = String::new();
        while let Some(c) = self.bump() {
            value.push(c);
            if c == '>' {
                break;
            }
        }
        value
    }

    fn string(&mut self, line: usize, column: usize) -> Result<String> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == QUOTE_SYMBOL => return Ok(value),
                Some(c) if c == ESCAPE_SYMBOL => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(e) if e != '\n' => value.push(e),
                    _ => break,
                },
                Some('\n') | None => break,
                Some(c) => value.push(c),
            }
        }
        Err(Error::new(
            LocationInfo {
                line: Some(line),
                column: Some(column),
                ..LocationInfo::empty()
            },
            ErrorKind::MissingEndQuotes,
        ))
    }

    fn number(&mut self) -> String {
        let mut value = String::new();
        if let Some(&'-') = self.chars.peek() {
            value.push('-');
            self.bump();
        }
        let mut seen_dot = false;
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                value.push(c);
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                value.push(c);
            } else {
                break;
            }
            self.bump();
        }
        value
    }

    fn word(&mut self) -> String {
        let mut value = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                value.push(c);
                self.bump();
            } else {
                break;
            }
        }
        value
    }

    fn symbol(&mut self) -> String {
        let mut value = String::new();
        if let Some(c) = self.bump() {
            value.push(c);
        }
        if let Some(&next) = self.chars.peek() {
            let mut pair = value.clone();
            pair.push(next);
            if TWO_CHAR_SYMBOLS.contains(&pair.as_str()) {
                self.bump();
                return pair;
            }
        }
        value
    }
}
